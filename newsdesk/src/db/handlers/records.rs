//! Generic repository over any [`Entity`] collection.

use serde_json::Value;
use std::{marker::PhantomData, sync::Arc};
use tracing::instrument;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::{
        Entity, Fields, StatusTogglable, now,
        paging::{Filters, PageRequest, Paginated},
        strip_reserved, timestamp,
    },
    store::{Criterion, Document, Query, RecordStore},
};
use crate::types::{EntityId, abbrev_uuid};

/// Repository for the collection of `E`, backed by any [`RecordStore`].
pub struct Records<E> {
    store: Arc<dyn RecordStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Records<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Records<E> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn decode(documents: Vec<Document>) -> Result<Vec<E>> {
        documents.into_iter().map(Document::into_entity).collect()
    }

    /// Build and validate an entity from a complete field map.
    fn materialize(fields: Fields) -> Result<(E, Document)> {
        let entity: E = serde_json::from_value(Value::Object(fields)).map_err(|e| DbError::InvalidDocument {
            message: format!("{}: {e}", E::NAME),
        })?;
        let document = Document::from_entity(&entity)?;
        Ok((entity, document))
    }

    /// Run an arbitrary store query against this collection.
    #[instrument(skip(self, query), fields(collection = E::COLLECTION), err)]
    pub async fn search(&self, query: &Query) -> Result<Vec<E>> {
        Self::decode(self.store.query(E::COLLECTION, query).await?)
    }

    /// Page through the records matching `criteria`, sorted as the page request asks.
    #[instrument(skip(self, criteria, page), fields(collection = E::COLLECTION, page = page.page(), per_page = page.per_page()), err)]
    pub async fn search_page(&self, criteria: Vec<Criterion>, page: &PageRequest) -> Result<Paginated<E>> {
        let total = self.store.count(E::COLLECTION, &criteria).await?;
        let query = Query::new()
            .filters(criteria)
            .sort_by(page.sort_field(), page.sort_direction())
            .offset(page.offset())
            .limit(page.per_page());
        let items = self.search(&query).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn count_where(&self, criteria: &[Criterion]) -> Result<u64> {
        self.store.count(E::COLLECTION, criteria).await
    }
}

impl<E: StatusTogglable> Records<E> {
    /// Flip active to inactive; any other status becomes active.
    #[instrument(skip(self), fields(collection = E::COLLECTION, id = %abbrev_uuid(&id)), err)]
    pub async fn toggle_status(&self, id: EntityId) -> Result<E> {
        let current = self.find_or_fail(id).await?;
        let mut data = Fields::new();
        data.insert("status".to_string(), serde_json::to_value(current.status().toggled())?);
        self.update(id, data).await
    }
}

#[async_trait::async_trait]
impl<E: Entity> Repository for Records<E> {
    type Entity = E;
    type Id = EntityId;

    #[instrument(skip(self), fields(collection = E::COLLECTION), err)]
    async fn all(&self) -> Result<Vec<E>> {
        self.search(&Query::new()).await
    }

    #[instrument(skip(self), fields(collection = E::COLLECTION, id = %abbrev_uuid(&id)), err)]
    async fn find(&self, id: EntityId) -> Result<Option<E>> {
        self.store
            .get(E::COLLECTION, id)
            .await?
            .map(Document::into_entity)
            .transpose()
    }

    async fn find_or_fail(&self, id: EntityId) -> Result<E> {
        self.find(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self, data), fields(collection = E::COLLECTION), err)]
    async fn create(&self, data: Fields) -> Result<E> {
        let mut fields = strip_reserved(data);
        let stamp = Value::String(timestamp::format(&now()));
        fields.insert("id".to_string(), Value::String(EntityId::new_v4().to_string()));
        fields.insert("created_at".to_string(), stamp.clone());
        fields.insert("updated_at".to_string(), stamp);

        let (entity, document) = Self::materialize(fields)?;
        self.store.insert(E::COLLECTION, document, E::UNIQUE_FIELDS).await?;
        Ok(entity)
    }

    #[instrument(skip(self, data), fields(collection = E::COLLECTION, id = %abbrev_uuid(&id)), err)]
    async fn update(&self, id: EntityId, data: Fields) -> Result<E> {
        let existing = self.store.get(E::COLLECTION, id).await?.ok_or(DbError::NotFound)?;

        let mut fields = existing.fields;
        fields.extend(strip_reserved(data));
        fields.insert("updated_at".to_string(), Value::String(timestamp::format(&now())));

        let (entity, document) = Self::materialize(fields)?;
        if !self.store.replace(E::COLLECTION, document, E::UNIQUE_FIELDS).await? {
            return Err(DbError::NotFound);
        }
        Ok(entity)
    }

    #[instrument(skip(self), fields(collection = E::COLLECTION, id = %abbrev_uuid(&id)), err)]
    async fn delete(&self, id: EntityId) -> Result<bool> {
        if self.store.remove(E::COLLECTION, id).await? {
            Ok(true)
        } else {
            Err(DbError::NotFound)
        }
    }

    async fn paginate(&self, per_page: u64) -> Result<Paginated<E>> {
        self.get_paginated_with_filters(&PageRequest::new(1, per_page), &Filters::none())
            .await
    }

    #[instrument(skip(self, criteria), fields(collection = E::COLLECTION), err)]
    async fn find_by(&self, criteria: Fields) -> Result<Vec<E>> {
        let query = Query::new().filters(criteria.into_iter().map(|(field, value)| Criterion::eq(field, value)));
        self.search(&query).await
    }

    async fn find_one_by(&self, criteria: Fields) -> Result<Option<E>> {
        let query = Query::new()
            .filters(criteria.into_iter().map(|(field, value)| Criterion::eq(field, value)))
            .limit(1);
        Ok(self.search(&query).await?.into_iter().next())
    }

    async fn count(&self) -> Result<u64> {
        self.count_where(&[]).await
    }

    async fn exists(&self, id: EntityId) -> Result<bool> {
        Ok(self.store.get(E::COLLECTION, id).await?.is_some())
    }

    async fn get_paginated_with_filters(&self, page: &PageRequest, filters: &Filters) -> Result<Paginated<E>> {
        self.search_page(filters.criteria(), page).await
    }

    #[instrument(skip(self, ids), fields(collection = E::COLLECTION, count = ids.len()), err)]
    async fn bulk_delete(&self, ids: &[EntityId]) -> Result<u64> {
        self.store.remove_many(E::COLLECTION, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        Status,
        paging::{FilterField, SortDirection},
    };
    use crate::db::store::MemoryStore;
    use crate::test_utils::fields;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: EntityId,
        title: String,
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        status: Status,
        #[serde(with = "timestamp")]
        created_at: DateTime<Utc>,
        #[serde(with = "timestamp")]
        updated_at: DateTime<Utc>,
    }

    impl Entity for Note {
        const COLLECTION: &'static str = "notes";
        const NAME: &'static str = "Note";
        const UNIQUE_FIELDS: &'static [&'static str] = &["slug"];

        fn id(&self) -> EntityId {
            self.id
        }
    }

    impl StatusTogglable for Note {
        fn status(&self) -> Status {
            self.status
        }
    }

    fn notes() -> Records<Note> {
        Records::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let repo = notes();
        let note = repo
            .create(fields(json!({"title": "hello", "id": "ignored", "created_at": "ignored"})))
            .await
            .unwrap();
        assert_eq!(note.title, "hello");
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(repo.find(note.id).await.unwrap(), Some(note.clone()));
        assert!(repo.exists(note.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_documents() {
        let repo = notes();
        let err = repo.create(fields(json!({"tags": "not-a-list"}))).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidDocument { .. }));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let repo = notes();
        let note = repo.create(fields(json!({"title": "a", "tags": ["x"]}))).await.unwrap();
        let updated = repo.update(note.id, fields(json!({"title": "b"}))).await.unwrap();
        assert_eq!(updated.title, "b");
        assert_eq!(updated.tags, vec!["x".to_string()]);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let repo = notes();
        let id = EntityId::new_v4();
        assert!(repo.find(id).await.unwrap().is_none());
        assert!(matches!(repo.find_or_fail(id).await, Err(DbError::NotFound)));
        assert!(matches!(repo.update(id, Fields::new()).await, Err(DbError::NotFound)));
        assert!(matches!(repo.delete(id).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_and_bulk_delete() {
        let repo = notes();
        let a = repo.create(fields(json!({"title": "a"}))).await.unwrap();
        let b = repo.create(fields(json!({"title": "b"}))).await.unwrap();
        let c = repo.create(fields(json!({"title": "c"}))).await.unwrap();

        assert!(repo.delete(c.id).await.unwrap());
        let removed = repo.bulk_delete(&[a.id, b.id, EntityId::new_v4()]).await.unwrap();
        assert_eq!(removed, 2);
        assert!(!repo.exists(a.id).await.unwrap());
        assert!(!repo.exists(b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_requires_every_criterion() {
        let repo = notes();
        repo.create(fields(json!({"title": "a", "status": "draft"}))).await.unwrap();
        repo.create(fields(json!({"title": "a", "status": "active"}))).await.unwrap();
        repo.create(fields(json!({"title": "b", "status": "draft"}))).await.unwrap();

        let found = repo.find_by(fields(json!({"title": "a", "status": "draft"}))).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, Status::Draft);

        let one = repo.find_one_by(fields(json!({"title": "zzz"}))).await.unwrap();
        assert!(one.is_none());
    }

    #[tokio::test]
    async fn test_toggle_status_round_trips() {
        let repo = notes();
        let note = repo.create(fields(json!({"title": "a"}))).await.unwrap();
        assert_eq!(note.status, Status::Active);
        let once = repo.toggle_status(note.id).await.unwrap();
        assert_eq!(once.status, Status::Inactive);
        let twice = repo.toggle_status(note.id).await.unwrap();
        assert_eq!(twice.status, Status::Active);

        let draft = repo.create(fields(json!({"title": "d", "status": "draft"}))).await.unwrap();
        assert_eq!(repo.toggle_status(draft.id).await.unwrap().status, Status::Active);
    }

    #[tokio::test]
    async fn test_unique_slug_is_enforced() {
        let repo = notes();
        repo.create(fields(json!({"title": "a", "slug": "a"}))).await.unwrap();
        let err = repo.create(fields(json!({"title": "b", "slug": "a"}))).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_paginated_with_filters() {
        let repo = notes();
        for i in 0..5 {
            let status = if i % 2 == 0 { "active" } else { "draft" };
            repo.create(fields(json!({"title": format!("note {i}"), "status": status})))
                .await
                .unwrap();
        }
        repo.create(fields(json!({"title": "other"}))).await.unwrap();

        const ALLOWED: &[FilterField] = &[FilterField::field("title")];
        let filters = Filters::from_pairs([("title", "NOTE"), ("status", "draft")], ALLOWED);
        let request = PageRequest::new(1, 2).sorted_by("title", SortDirection::Asc);
        let page = repo.get_paginated_with_filters(&request, &filters).await.unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_more_pages());
        let titles: Vec<_> = page.items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["note 0", "note 1"]);
    }

    #[tokio::test]
    async fn test_default_order_is_newest_first() {
        let repo = notes();
        for title in ["first", "second", "third"] {
            repo.create(fields(json!({"title": title}))).await.unwrap();
        }
        let page = repo.paginate(500).await.unwrap();
        assert_eq!(page.per_page, 100);
        let titles: Vec<_> = page.items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_empty_collection_page() {
        let page = notes().paginate(15).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages(), 1);
        assert!(page.items.is_empty());
    }
}
