//! API request/response models for article comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::validation::nullable_id;
use crate::db::models::{Status, comments::Comment, paging::FilterField};
use crate::services::comments::CommentThread;
use crate::types::{ArticleId, CommentId};

/// Query keys accepted as filters on the admin comment list.
pub const FILTERS: &[FilterField] = &[
    FilterField::alias("news", "news_id"),
    FilterField::field("news_id"),
    FilterField::field("parent_id"),
    FilterField::field("status"),
    FilterField::field("author_name"),
    FilterField::field("author_email"),
];

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request body for creating a comment. New comments wait for moderation unless a status is given.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CommentCreate {
    #[validate(required(message = "The news_id field is required."))]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub news_id: Option<ArticleId>,
    /// Comment being replied to; must belong to the same article
    #[schema(value_type = Option<String>, format = "uuid")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable_id")]
    pub parent_id: Option<Option<CommentId>>,
    #[validate(
        required(message = "Author name is required."),
        custom(function = "not_blank", message = "Author name is required."),
        length(max = 255, message = "Author name cannot exceed 255 characters.")
    )]
    pub author_name: Option<String>,
    #[validate(email(message = "Author email must be a valid email address."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[validate(length(max = 255, message = "Author website cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_website: Option<String>,
    #[validate(
        required(message = "Comment content is required."),
        custom(function = "not_blank", message = "Comment content is required."),
        length(max = 5000, message = "Comment content cannot exceed 5000 characters.")
    )]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[validate(length(max = 45, message = "IP address cannot exceed 45 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[validate(length(max = 500, message = "User agent cannot exceed 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Request body for updating a comment. Only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CommentUpdate {
    #[schema(value_type = Option<String>, format = "uuid")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_id: Option<ArticleId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable_id")]
    pub parent_id: Option<Option<CommentId>>,
    #[validate(
        custom(function = "not_blank", message = "Author name is required."),
        length(max = 255, message = "Author name cannot exceed 255 characters.")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[validate(email(message = "Author email must be a valid email address."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[validate(length(max = 255, message = "Author website cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_website: Option<String>,
    #[validate(
        custom(function = "not_blank", message = "Comment content is required."),
        length(max = 5000, message = "Comment content cannot exceed 5000 characters.")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Comment as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentView {
    #[schema(value_type = String, format = "uuid")]
    pub id: CommentId,
    #[schema(value_type = String, format = "uuid")]
    pub news_id: ArticleId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub parent_id: Option<CommentId>,
    pub author_name: String,
    pub author_email: Option<String>,
    pub author_website: Option<String>,
    pub content: String,
    pub status: Status,
    pub status_label: String,
    /// Only present on approved threads
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub replies: Option<Vec<CommentView>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            status_label: comment.status.label().to_string(),
            id: comment.id,
            news_id: comment.news_id,
            parent_id: comment.parent_id,
            author_name: comment.author_name,
            author_email: comment.author_email,
            author_website: comment.author_website,
            content: comment.content,
            status: comment.status,
            replies: None,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl From<CommentThread> for CommentView {
    fn from(thread: CommentThread) -> Self {
        Self {
            replies: Some(thread.replies.into_iter().map(CommentView::from).collect()),
            ..CommentView::from(thread.comment)
        }
    }
}
