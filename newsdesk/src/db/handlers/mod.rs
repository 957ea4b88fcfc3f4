//! Repository implementations for data access.
//!
//! Every collection is served by the same generic repository, [`Records<E>`], which implements the
//! [`Repository`] trait for any [`Entity`](crate::db::models::Entity) over a shared
//! [`RecordStore`](crate::db::store::RecordStore).
//!
//! # Design Pattern
//!
//! A repository:
//! - Wraps a handle to the record store
//! - Provides strongly-typed CRUD operations
//! - Turns filters and page requests into store queries
//! - Returns domain models from [`crate::db::models`]
//!
//! Status toggling is only available when the entity implements
//! [`StatusTogglable`](crate::db::models::StatusTogglable).
//!
//! # Common Pattern
//!
//! ```ignore
//! use newsdesk::db::handlers::{Records, Repository};
//! use newsdesk::db::models::articles::Article;
//!
//! let articles = Records::<Article>::new(store.clone());
//! let article = articles.find_or_fail(id).await?;
//! ```

pub mod records;
pub mod repository;

pub use records::Records;
pub use repository::Repository;
