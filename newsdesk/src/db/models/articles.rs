use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Status, StatusTogglable, timestamp};
use crate::text;
use crate::types::{ArticleId, CategoryId, EntityId};

/// Average reading speed used for `reading_time`.
const WORDS_PER_MINUTE: usize = 200;

/// A news article as stored in the `news` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Article {
    const COLLECTION: &'static str = "news";
    const NAME: &'static str = "Article";
    const UNIQUE_FIELDS: &'static [&'static str] = &["slug"];

    fn id(&self) -> EntityId {
        self.id
    }
}

impl StatusTogglable for Article {
    fn status(&self) -> Status {
        self.status
    }
}

impl Article {
    /// Live status with a publish time that is not in the future.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.status.is_live() && self.published_at.is_some_and(|at| at <= now)
    }

    /// Stored excerpt, or the start of the tag-stripped content.
    pub fn excerpt_or_summary(&self) -> String {
        match self.excerpt.as_deref() {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt.to_string(),
            _ => summarize(&self.content),
        }
    }

    pub fn reading_time(&self) -> String {
        let words = text::word_count(&text::strip_tags(&self.content));
        format!("{} min read", words.div_ceil(WORDS_PER_MINUTE))
    }
}

/// Excerpt derived from HTML content: tags removed, 200 characters at most.
pub fn summarize(content: &str) -> String {
    text::limit_chars(&text::strip_tags(content), 200)
}
