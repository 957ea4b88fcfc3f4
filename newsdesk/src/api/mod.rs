//! API layer for HTTP request handling and data models.
//!
//! - **[`envelope`]**: the `{success, message, data, errors}` response shape
//! - **[`resource`]**: generic admin CRUD controller and router
//! - **[`handlers`]**: public News endpoints
//! - **[`models`]**: request validation and response view models
//!
//! # API Structure
//!
//! - **Admin** (`/api/v1/admin/{news,categories,comments}`): uniform CRUD, bulk delete and
//!   status toggles
//! - **Public** (`/api/v1/news/*`, `/api/v1/categories/*`, `/api/v1/comments/*`): reader-facing
//!   listings of published content
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa`. When `enable_docs` is set the OpenAPI document is served at
//! `/api-docs/openapi.json` and an interactive reference at `/docs`.

pub mod envelope;
pub mod handlers;
pub mod models;
pub mod resource;
