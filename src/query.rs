use serde::{Deserialize, Serialize};

/// Order in which the thread endpoint returns comments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    Confidence,
    Top,
    New,
    Controversial,
    Old,
    Qa,
}

/// Query parameters sent along with a thread fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThreadQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<CommentSort>,
}

impl ThreadQuery {
    pub fn new() -> Self {
        Self {
            limit: None,
            depth: None,
            sort: None,
        }
    }

    /// Maximum number of comments to return.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Maximum depth of the reply tree to return.
    #[must_use]
    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: CommentSort) -> Self {
        self.sort = Some(sort);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_serializes_nothing() {
        let value = serde_json::to_value(ThreadQuery::new()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_builder() {
        let query = ThreadQuery::new().limit(500).sort(CommentSort::Top);
        let value = serde_json::to_value(query).unwrap();
        assert_eq!(value, serde_json::json!({ "limit": 500, "sort": "top" }));
    }
}
