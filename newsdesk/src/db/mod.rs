//! Data persistence and access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Services   │  (business rules)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - typed CRUD & paging)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - documents as entities)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ RecordStore │  (db::store - memory or PostgreSQL)
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository trait and the generic repository
//! - [`models`]: Entity structures, statuses and paging types
//! - [`store`]: Record store interface and its implementations
//! - [`errors`]: Storage error types

pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
