//! API request/response models for news articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::validation::{nullable_id, tag_list};
use crate::db::models::{Status, articles::Article, now, paging::FilterField, timestamp};
use crate::types::{ArticleId, CategoryId};

/// Query keys accepted as filters on the admin article list.
pub const FILTERS: &[FilterField] = &[
    FilterField::field("title"),
    FilterField::field("slug"),
    FilterField::field("status"),
    FilterField::alias("category", "category_id"),
    FilterField::field("category_id"),
    FilterField::field("tags"),
    FilterField::field("author_id"),
    FilterField::field("is_featured"),
];

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn tag_lengths(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.chars().count() > 50) {
        return Err(ValidationError::new("tag_length"));
    }
    Ok(())
}

/// Request body for creating an article.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ArticleCreate {
    #[validate(
        required(message = "News title is required."),
        length(max = 255, message = "News title cannot exceed 255 characters.")
    )]
    #[schema(example = "Rust 2024 edition released")]
    pub title: Option<String>,
    /// Derived from the title when omitted
    #[validate(length(max = 255, message = "Slug cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Derived from the content when omitted
    #[validate(length(max = 500, message = "Excerpt cannot exceed 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// HTML body
    #[validate(required(message = "News content is required."))]
    pub content: Option<String>,
    #[validate(length(max = 255, message = "Featured image path cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[validate(length(max = 255, message = "Meta title cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[validate(length(max = 500, message = "Meta description cannot exceed 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[validate(length(max = 255, message = "Meta keywords cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable_id")]
    pub category_id: Option<Option<CategoryId>>,
    /// List of tags, or a comma separated string
    #[validate(custom(function = "tag_lengths", message = "Each tag cannot exceed 50 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "tag_list::deserialize")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Stamped with the current time when a live article has none
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[validate(range(min = 0, message = "Sort order must be at least 0."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

/// Request body for updating an article. Only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ArticleUpdate {
    #[validate(
        custom(function = "not_blank", message = "News title is required."),
        length(max = 255, message = "News title cannot exceed 255 characters.")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Regenerated from a changed title when empty
    #[validate(length(max = 255, message = "Slug cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[validate(length(max = 500, message = "Excerpt cannot exceed 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[validate(custom(function = "not_blank", message = "News content is required."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[validate(length(max = 255, message = "Featured image path cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[validate(length(max = 255, message = "Meta title cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[validate(length(max = 500, message = "Meta description cannot exceed 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[validate(length(max = 255, message = "Meta keywords cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable_id")]
    pub category_id: Option<Option<CategoryId>>,
    #[validate(custom(function = "tag_lengths", message = "Each tag cannot exceed 50 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "tag_list::deserialize")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// `null` clears the publish time
    #[schema(value_type = Option<String>, format = DateTime)]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::nullable")]
    pub published_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[validate(range(min = 0, message = "Sort order must be at least 0."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

/// Search-engine metadata of an article.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// Article as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleView {
    #[schema(value_type = String, format = "uuid")]
    pub id: ArticleId,
    pub title: String,
    pub slug: Option<String>,
    /// Stored excerpt, or a summary of the content
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub meta: ArticleMeta,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
    pub tags: Vec<String>,
    pub author_id: Option<String>,
    pub status: Status,
    pub status_label: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Live and past its publish time
    pub is_published: bool,
    pub view_count: i64,
    pub is_featured: bool,
    pub sort_order: i64,
    /// e.g. "3 min read"
    pub reading_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            excerpt: article.excerpt_or_summary(),
            reading_time: article.reading_time(),
            status_label: article.status.label().to_string(),
            is_published: article.is_published(now()),
            id: article.id,
            title: article.title,
            slug: article.slug,
            content: article.content,
            featured_image: article.featured_image,
            meta: ArticleMeta {
                title: article.meta_title,
                description: article.meta_description,
                keywords: article.meta_keywords,
            },
            category_id: article.category_id,
            tags: article.tags,
            author_id: article.author_id,
            status: article.status,
            published_at: article.published_at,
            view_count: article.view_count,
            is_featured: article.is_featured,
            sort_order: article.sort_order,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::validation::validate_payload;
    use serde_json::json;

    #[test]
    fn test_create_requires_title_and_content() {
        let errors = validate_payload::<ArticleCreate>(json!({})).unwrap_err();
        assert_eq!(errors["title"], vec!["News title is required.".to_string()]);
        assert_eq!(errors["content"], vec!["News content is required.".to_string()]);
    }

    #[test]
    fn test_create_limits() {
        let errors = validate_payload::<ArticleCreate>(json!({
            "title": "t".repeat(256),
            "content": "c",
            "meta_description": "d".repeat(501),
            "tags": ["x".repeat(51)],
            "sort_order": -1
        }))
        .unwrap_err();
        assert_eq!(errors["title"], vec!["News title cannot exceed 255 characters.".to_string()]);
        assert_eq!(errors["meta_description"], vec!["Meta description cannot exceed 500 characters.".to_string()]);
        assert_eq!(errors["tags"], vec!["Each tag cannot exceed 50 characters.".to_string()]);
        assert_eq!(errors["sort_order"], vec!["Sort order must be at least 0.".to_string()]);
    }

    #[test]
    fn test_update_passes_only_sent_fields() {
        let fields = validate_payload::<ArticleUpdate>(json!({"title": "New", "tags": "a,b"})).unwrap();
        assert_eq!(serde_json::Value::Object(fields), json!({"title": "New", "tags": ["a", "b"]}));
    }

    #[test]
    fn test_published_at_is_normalized() {
        let fields = validate_payload::<ArticleCreate>(json!({
            "title": "T",
            "content": "c",
            "published_at": "2024-05-01T10:00:00+02:00"
        }))
        .unwrap();
        assert_eq!(fields["published_at"], json!("2024-05-01T08:00:00.000000Z"));
    }

    #[test]
    fn test_update_can_clear_published_at() {
        let fields = validate_payload::<ArticleUpdate>(json!({"published_at": null})).unwrap();
        assert_eq!(serde_json::Value::Object(fields), json!({"published_at": null}));

        let fields = validate_payload::<ArticleUpdate>(json!({"published_at": "2024-05-01T08:00:00Z"})).unwrap();
        assert_eq!(fields["published_at"], json!("2024-05-01T08:00:00.000000Z"));

        let fields = validate_payload::<ArticleUpdate>(json!({"title": "T"})).unwrap();
        assert!(!fields.contains_key("published_at"));
    }

    #[test]
    fn test_view_reports_publication() {
        let mut article: Article = serde_json::from_value(json!({
            "id": uuid::Uuid::new_v4(),
            "title": "T",
            "content": "c",
            "status": "published",
            "published_at": "2024-01-01T00:00:00.000000Z",
            "created_at": "2024-01-01T00:00:00.000000Z",
            "updated_at": "2024-01-01T00:00:00.000000Z"
        }))
        .unwrap();
        assert!(ArticleView::from(article.clone()).is_published);

        article.status = Status::Draft;
        assert!(!ArticleView::from(article).is_published);
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let errors = validate_payload::<ArticleUpdate>(json!({"title": "  "})).unwrap_err();
        assert_eq!(errors["title"], vec!["News title is required.".to_string()]);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(validate_payload::<ArticleUpdate>(json!({"status": "archived"})).is_err());
    }
}
