use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Status, StatusTogglable, timestamp};
use crate::types::{ArticleId, CommentId, EntityId};

/// A reader comment on an article, stored in `news_comments`. Replies point at their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub news_id: ArticleId,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub author_name: String,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub author_website: Option<String>,
    pub content: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Comment {
    const COLLECTION: &'static str = "news_comments";
    const NAME: &'static str = "Comment";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl StatusTogglable for Comment {
    fn status(&self) -> Status {
        self.status
    }
}
