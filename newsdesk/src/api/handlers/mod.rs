//! HTTP handlers for the public News endpoints.
//!
//! Admin CRUD goes through the generic [`crate::api::resource`] controller; the handlers here
//! cover the read-only reader surface plus the article featured toggle. They return
//! [`crate::errors::Result`], so failures become error envelopes through `IntoResponse`.
//!
//! - [`articles`]: published, featured, popular, archive, by-slug and related articles
//! - [`categories`]: active list, tree, counts and category pages
//! - [`comments`]: approved comment threads

pub mod articles;
pub mod categories;
pub mod comments;
