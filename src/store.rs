//! On-disk snapshot of the last fetched thread payload.
use crate::error::{Error, Result};
use crate::models::RawComment;
use crate::thread::parse_payload;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The raw payload of the last successful fetch, stored as-is.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// snapshot, so readers see either the old payload or the new one.
#[derive(Clone, Debug)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the snapshot with `payload`. Payloads that are not JSON are rejected.
    pub fn save(&self, payload: &[u8]) -> Result<()> {
        serde_json::from_slice::<Value>(payload).map_err(Error::InvalidPayload)?;
        write_atomic(&self.path, payload)?;
        debug!(path = %self.path.display(), bytes = payload.len(), "snapshot saved");
        Ok(())
    }

    /// The stored payload, or `None` if nothing has been fetched yet.
    pub fn load_payload(&self) -> Result<Option<Value>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| Error::CorruptSnapshot {
                path: self.path.clone(),
                source,
            })
    }

    /// The stored comment forest, or `None` if nothing has been fetched yet.
    pub fn load(&self) -> Result<Option<Vec<RawComment>>> {
        Ok(self.load_payload()?.map(parse_payload))
    }
}

/// Writes `bytes` next to `path` and renames the result into place.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    let tmp = path.with_file_name(name);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_store(name: &str) -> Store {
        let mut dir = std::env::temp_dir();
        dir.push(format!("pickfeed_store_{}", name));
        let _ = fs::remove_dir_all(&dir);
        Store::new(dir.join("comments.json"))
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        let store = tmp_store("missing");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = tmp_store("roundtrip");
        let payload = br#"{"kind":"Listing","data":{"children":[{"kind":"t1","data":{"id":"a","author":"alice","body":"Porto ML","ups":3}}]}}"#;
        store.save(payload).unwrap();

        let comments = store.load().unwrap().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "alice");
        assert!(!store.path().with_file_name("comments.json.tmp").exists());
    }

    #[test]
    fn test_invalid_payload_keeps_previous_snapshot() {
        let store = tmp_store("invalid");
        store.save(b"[]").unwrap();

        let err = store.save(b"<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
        assert_eq!(fs::read(store.path()).unwrap(), b"[]");
    }

    #[test]
    fn test_corrupt_snapshot_is_distinguishable() {
        let store = tmp_store("corrupt");
        write_atomic(store.path(), b"{ not json").unwrap();

        match store.load() {
            Err(Error::CorruptSnapshot { path, .. }) => assert_eq!(path, store.path()),
            other => panic!("expected a corrupt snapshot error, got {:?}", other),
        }
    }
}
