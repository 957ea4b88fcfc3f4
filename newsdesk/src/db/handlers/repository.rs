//! Base repository trait for data access.

/// Contains the Repository trait.
///
/// A repository is the data access layer for one collection of records. It provides methods for
/// creating, reading, updating and deleting entities, as well as paging through them with
/// allow-listed filters.
use crate::db::{
    errors::Result,
    models::{
        Fields,
        paging::{Filters, PageRequest, Paginated},
    },
};

/// Base repository trait providing the uniform CRUD and query surface
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// The entity type stored in the collection
    type Entity: Send;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Every record, unfiltered, in no guaranteed order
    async fn all(&self) -> Result<Vec<Self::Entity>>;

    /// Get an entity by ID, `None` if absent
    async fn find(&self, id: Self::Id) -> Result<Option<Self::Entity>>;

    /// Get an entity by ID, failing with `NotFound` if absent
    async fn find_or_fail(&self, id: Self::Id) -> Result<Self::Entity>;

    /// Create a new entity from field data
    async fn create(&self, data: Fields) -> Result<Self::Entity>;

    /// Merge the supplied fields into an existing entity
    async fn update(&self, id: Self::Id, data: Fields) -> Result<Self::Entity>;

    /// Delete an entity by ID, failing with `NotFound` if absent
    async fn delete(&self, id: Self::Id) -> Result<bool>;

    /// First page of all records, newest first
    async fn paginate(&self, per_page: u64) -> Result<Paginated<Self::Entity>>;

    /// Entities whose fields equal every supplied criterion
    async fn find_by(&self, criteria: Fields) -> Result<Vec<Self::Entity>>;

    /// First entity whose fields equal every supplied criterion
    async fn find_one_by(&self, criteria: Fields) -> Result<Option<Self::Entity>>;

    async fn count(&self) -> Result<u64>;

    async fn exists(&self, id: Self::Id) -> Result<bool>;

    /// Filter, sort and paginate
    async fn get_paginated_with_filters(&self, page: &PageRequest, filters: &Filters) -> Result<Paginated<Self::Entity>>;

    /// Delete every listed entity that exists, returning how many were removed
    async fn bulk_delete(&self, ids: &[Self::Id]) -> Result<u64>;
}
