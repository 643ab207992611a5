//! The data model underlying a discussion thread and the picks found in it.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Display name used when the source omits a comment's author.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// A page of things as returned by the thread endpoint.
///
/// Children are kept as raw JSON so that one malformed entry only degrades
/// itself rather than the whole listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Value>,
}

/// A single entry of a [`Listing`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Thing {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl Thing {
    /// The kind tag the source uses for comments.
    pub const COMMENT: &'static str = "t1";

    pub fn is_comment(&self) -> bool {
        self.kind == Self::COMMENT
    }
}

/// A single reply in a discussion thread.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawComment {
    /// An identifier unique within one fetch.
    #[serde(default)]
    pub id: String,

    #[serde(default = "deleted_author", deserialize_with = "author_or_deleted")]
    pub author: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ups: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub downs: i64,

    /// Direct replies, in thread order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub replies: Vec<RawComment>,
}

impl Default for RawComment {
    fn default() -> Self {
        Self {
            id: String::new(),
            author: deleted_author(),
            body: String::new(),
            ups: 0,
            downs: 0,
            replies: Vec::new(),
        }
    }
}

// Flattens the reply tree while dropping so deep threads don't exhaust the stack.
impl Drop for RawComment {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut comment) = pending.pop() {
            pending.append(&mut comment.replies);
        }
    }
}

/// A [`RawComment`] decorated with the picks found in its body.
///
/// `picks` and `notes` are newline-joined; see
/// [`extract_picks_and_notes`](crate::segment::extract_picks_and_notes).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PickedComment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub picks: String,
    pub notes: String,
    pub ups: i64,
    pub downs: i64,
}

fn deleted_author() -> String {
    DELETED_AUTHOR.to_string()
}

fn author_or_deleted<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let author = Option::<String>::deserialize(deserializer)?;
    Ok(author
        .filter(|name| !name.is_empty())
        .unwrap_or_else(deleted_author))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
