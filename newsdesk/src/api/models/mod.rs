//! API request and response data models.
//!
//! Request types carry the validation rules for incoming bodies (see [`validation`]); view types
//! shape stored entities for responses. Both are annotated with `utoipa` for the API docs.
//!
//! - [`articles`]: news article payloads and [`articles::ArticleView`]
//! - [`categories`]: category payloads, including the nested tree view
//! - [`comments`]: comment payloads and threaded replies
//! - [`pagination`]: list query parsing and the shared collection shape

pub mod articles;
pub mod categories;
pub mod comments;
pub mod pagination;
pub mod validation;
