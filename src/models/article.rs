use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Publication state of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArticleStatus {
    #[default]
    Unknown,
    Draft,
    Withdraw,
    Published,
    Deleted,
}

impl ArticleStatus {
    pub fn as_u8(self) -> u8 {
        match self {
            ArticleStatus::Unknown => 0,
            ArticleStatus::Draft => 1,
            ArticleStatus::Withdraw => 2,
            ArticleStatus::Published => 3,
            ArticleStatus::Deleted => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArticleStatus::Unknown => "unknown",
            ArticleStatus::Draft => "draft",
            ArticleStatus::Withdraw => "withdrawn",
            ArticleStatus::Published => "published",
            ArticleStatus::Deleted => "deleted",
        }
    }
}

impl From<u8> for ArticleStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => ArticleStatus::Draft,
            2 => ArticleStatus::Withdraw,
            3 => ArticleStatus::Published,
            4 => ArticleStatus::Deleted,
            _ => ArticleStatus::Unknown,
        }
    }
}

impl Serialize for ArticleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ArticleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Out-of-range values are unknown, not an error
        let value = u64::deserialize(deserializer)?;
        Ok(u8::try_from(value).map(ArticleStatus::from).unwrap_or_default())
    }
}

/// Article list entry from `/articles/list` and `/articles/pub/list`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleItem {
    pub id: i64,
    pub title: String,
    pub status: ArticleStatus,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub read_cnt: i64,
    pub like_cnt: i64,
    pub collect_cnt: i64,
    pub liked: bool,
    pub collected: bool,
}

impl ArticleItem {
    /// Drafts and withdrawn articles, the author's unpublished work
    pub fn is_unpublished(&self) -> bool {
        matches!(self.status, ArticleStatus::Draft | ArticleStatus::Withdraw)
    }
}

/// Body of `/articles/withdraw`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ArticleStatus::from(0), ArticleStatus::Unknown);
        assert_eq!(ArticleStatus::from(1), ArticleStatus::Draft);
        assert_eq!(ArticleStatus::from(3), ArticleStatus::Published);
        assert_eq!(ArticleStatus::from(99), ArticleStatus::Unknown);
        assert_eq!(ArticleStatus::Deleted.as_u8(), 4);
    }

    #[test]
    fn test_article_from_server() {
        let json = r#"{
            "id": 12,
            "title": "Hello",
            "abstract": "short",
            "content": "ignored",
            "author": "duck",
            "createdAt": 1700000000000,
            "updatedAt": 1700000001000,
            "status": 2,
            "readCnt": 5
        }"#;
        let item: ArticleItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 12);
        assert_eq!(item.status, ArticleStatus::Withdraw);
        assert_eq!(item.abstract_text, "short");
        assert_eq!(item.author.as_deref(), Some("duck"));
        assert_eq!(item.read_cnt, 5);
        assert!(item.is_unpublished());
    }

    #[test]
    fn test_out_of_range_status_is_unknown() {
        let item: ArticleItem = serde_json::from_str(r#"{"id":1,"status":300}"#).unwrap();
        assert_eq!(item.status, ArticleStatus::Unknown);
    }

    #[test]
    fn test_status_serializes_as_number() {
        let item = ArticleItem {
            status: ArticleStatus::Published,
            ..Default::default()
        };
        let value = serde_json::to_value(item).unwrap();
        assert_eq!(value["status"], 3);
        assert!(value.get("author").is_none());
    }
}
