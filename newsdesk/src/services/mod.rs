//! Business-rule layer between the HTTP handlers and the repositories.
//!
//! A [`Service`] wraps one [`Records`] repository. Its default methods delegate straight to the
//! repository; the single extension point is [`Service::validate_data`], which every create and
//! update passes through before anything is written. The News services use it to derive slugs,
//! fill defaults and check references.

pub mod articles;
pub mod categories;
pub mod comments;
pub mod slug;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::{
    handlers::{Records, Repository},
    models::{
        Entity, Fields, Status, StatusTogglable,
        paging::{Filters, PageRequest, Paginated},
    },
};
use crate::errors::Result;
use crate::types::EntityId;

pub use articles::ArticleService;
pub use categories::CategoryService;
pub use comments::CommentService;

/// The mutation a payload is being validated for.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a, E> {
    Create,
    /// Update of the given current record
    Update(&'a E),
}

#[async_trait]
pub trait Service<E: Entity>: Send + Sync {
    fn repository(&self) -> &Records<E>;

    /// Check and complete incoming data before it is written. Identity by default.
    async fn validate_data(&self, data: Fields, _operation: Operation<'_, E>) -> Result<Fields> {
        Ok(data)
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        Ok(self.repository().all().await?)
    }

    async fn get_by_id(&self, id: EntityId) -> Result<Option<E>> {
        Ok(self.repository().find(id).await?)
    }

    async fn create(&self, data: Fields) -> Result<E> {
        let data = self.validate_data(data, Operation::Create).await?;
        Ok(self.repository().create(data).await?)
    }

    async fn update(&self, id: EntityId, data: Fields) -> Result<E> {
        let current = self.repository().find_or_fail(id).await?;
        let data = self.validate_data(data, Operation::Update(&current)).await?;
        Ok(self.repository().update(id, data).await?)
    }

    async fn delete(&self, id: EntityId) -> Result<bool> {
        Ok(self.repository().delete(id).await?)
    }

    async fn get_paginated(&self, per_page: u64) -> Result<Paginated<E>> {
        Ok(self.repository().paginate(per_page).await?)
    }

    async fn get_paginated_with_filters(&self, page: &PageRequest, filters: &Filters) -> Result<Paginated<E>> {
        Ok(self.repository().get_paginated_with_filters(page, filters).await?)
    }

    async fn bulk_delete(&self, ids: &[EntityId]) -> Result<u64> {
        Ok(self.repository().bulk_delete(ids).await?)
    }

    /// Flip the status like [`Records::toggle_status`], passing the change through
    /// [`Service::validate_data`] so status-dependent rules still apply.
    async fn toggle_status(&self, id: EntityId) -> Result<E>
    where
        E: StatusTogglable,
    {
        let current = self.repository().find_or_fail(id).await?;
        let mut data = Fields::new();
        data.insert("status".to_string(), Value::String(current.status().toggled().as_str().to_string()));
        let data = self.validate_data(data, Operation::Update(&current)).await?;
        Ok(self.repository().update(id, data).await?)
    }

    async fn get_by_status(&self, status: Status) -> Result<Vec<E>> {
        let mut criteria = Fields::new();
        criteria.insert("status".to_string(), Value::String(status.as_str().to_string()));
        Ok(self.repository().find_by(criteria).await?)
    }
}

/// Non-empty string value of a field, if any.
pub(crate) fn text_field<'a>(data: &'a Fields, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// True when the key is absent, null or an empty string.
pub(crate) fn is_blank(data: &Fields, key: &str) -> bool {
    match data.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Replace an empty-string reference with null so it deserializes as "no reference".
pub(crate) fn clear_blank(data: &mut Fields, key: &str) {
    if data.contains_key(key) && is_blank(data, key) {
        data.insert(key.to_string(), Value::Null);
    }
}

/// Normalize a comma separated tag string into a trimmed list. Null clears the tags.
pub(crate) fn split_tags(data: &mut Fields) {
    let tags: Vec<Value> = match data.get("tags") {
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(|tag| Value::String(tag.to_string()))
            .collect(),
        Some(Value::Null) => Vec::new(),
        _ => return,
    };
    data.insert("tags".to_string(), Value::Array(tags));
}

/// Parse an optional id reference from the payload. Blank means "no reference".
pub(crate) fn id_field(data: &Fields, key: &str) -> Result<Option<EntityId>> {
    if is_blank(data, key) {
        return Ok(None);
    }
    text_field(data, key)
        .and_then(crate::types::parse_id)
        .map(Some)
        .ok_or_else(|| crate::errors::Error::rule(format!("The {key} must be a valid identifier.")))
}
