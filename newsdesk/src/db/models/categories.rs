use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Status, StatusTogglable, timestamp};
use crate::types::{CategoryId, EntityId};

/// A news category as stored in the `news_categories` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const COLLECTION: &'static str = "news_categories";
    const NAME: &'static str = "Category";
    const UNIQUE_FIELDS: &'static [&'static str] = &["slug"];

    fn id(&self) -> EntityId {
        self.id
    }
}

impl StatusTogglable for Category {
    fn status(&self) -> Status {
        self.status
    }
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
