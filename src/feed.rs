//! The ranked pick feed, recomputed from the current snapshot on every read.
use crate::aggregate::{aggregate, PickCard};
use crate::client::Client;
use crate::error::Result;
use crate::models::PickedComment;
use crate::query::ThreadQuery;
use crate::store::{write_atomic, Store};
use crate::thread::annotate;
use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// What a serving layer renders: the ranked cards under a `comments` key.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedDocument {
    #[serde(with = "ts_seconds")]
    pub generated_at: DateTime<Utc>,
    pub comments: Vec<PickCard>,
}

impl FeedDocument {
    /// Writes the document as JSON, replacing `path` atomically.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(std::io::Error::from)?;
        write_atomic(path, &json)?;
        Ok(())
    }
}

/// Read side of the pipeline over a [`Store`].
///
/// Holds no state besides the store; every call re-reads the snapshot.
#[derive(Clone, Debug)]
pub struct Feed {
    store: Store,
}

impl Feed {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Every comment in the snapshot that names at least one pick, flattened in
    /// thread order (parents before their replies).
    pub fn comments(&self) -> Result<Vec<PickedComment>> {
        let comments = self.store.load()?.unwrap_or_default();
        Ok(annotate(&comments))
    }

    /// The ranked pick cards for the current snapshot.
    ///
    /// No snapshot yet yields an empty list; an unreadable one is an error.
    pub fn cards(&self) -> Result<Vec<PickCard>> {
        Ok(aggregate(&self.comments()?))
    }

    pub fn document(&self) -> Result<FeedDocument> {
        Ok(FeedDocument {
            generated_at: Utc::now(),
            comments: self.cards()?,
        })
    }
}

/// Fetches the thread once and replaces the snapshot, returning the payload size.
pub async fn refresh(
    client: &Client,
    store: &Store,
    url: &str,
    query: &ThreadQuery,
) -> Result<usize> {
    let payload = client.fetch_thread(url, query).await?;
    store.save(&payload)?;
    info!(bytes = payload.len(), path = %store.path().display(), "snapshot refreshed");
    Ok(payload.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    fn tmp_feed(name: &str) -> Feed {
        let mut dir = std::env::temp_dir();
        dir.push(format!("pickfeed_feed_{}", name));
        let _ = fs::remove_dir_all(&dir);
        Feed::new(Store::new(dir.join("comments.json")))
    }

    const PAYLOAD: &str = r#"[
        {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"id": "post"}}]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {"id": "a", "author": "alice", "body": "Al Nassr ML", "ups": 10, "downs": 0, "replies": ""}},
            {"kind": "t1", "data": {"id": "b", "author": "bob", "body": "Sporting ML @ 2.38\nlocks", "ups": 12, "downs": 1, "replies": ""}},
            {"kind": "t1", "data": {"id": "c", "author": null, "body": "gl all", "ups": 40, "replies": ""}}
        ]}}
    ]"#;

    #[test]
    fn test_no_snapshot_yields_empty_feed() {
        let feed = tmp_feed("empty");
        assert!(feed.cards().unwrap().is_empty());
        assert!(feed.comments().unwrap().is_empty());
    }

    #[test]
    fn test_cards_from_snapshot() {
        let feed = tmp_feed("cards");
        feed.store().save(PAYLOAD.as_bytes()).unwrap();

        let comments = feed.comments().unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].notes, "Sporting ML @ 2.38\nlocks");

        let cards = feed.cards().unwrap();
        let ids: Vec<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["sporting:moneyline", "al_nassr:moneyline"]);
        assert_eq!(cards[0].downs, 1);
    }

    #[test]
    fn test_corrupt_snapshot_is_not_an_empty_feed() {
        let feed = tmp_feed("corrupt");
        write_atomic(feed.store().path(), b"{\"kind\": ").unwrap();
        assert!(matches!(feed.cards(), Err(Error::CorruptSnapshot { .. })));
    }

    #[test]
    fn test_document_serializes_under_comments() {
        let feed = tmp_feed("document");
        feed.store().save(PAYLOAD.as_bytes()).unwrap();

        let document = feed.document().unwrap();
        let out = feed.store().path().with_file_name("feed.json");
        document.write_to(&out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(value["comments"][0]["author"], "Community");
        assert_eq!(value["comments"][0]["contributors"][0], "bob");
        assert!(value["generated_at"].is_i64());
    }
}
