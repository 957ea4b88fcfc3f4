//! Record stores: the narrow document interface every repository talks to.
//!
//! A store keeps JSON documents grouped by collection and answers a small query language
//! ([`Query`]): conjunctive [`Criterion`]s (with [`Match::Any`] for the occasional OR), an optional [`Sort`] and an offset/limit window. Two
//! implementations exist:
//!
//! - [`MemoryStore`]: in-process, used for development and tests
//! - [`PgStore`]: PostgreSQL, one `records` table with a JSONB `data` column
//!
//! ## Ordering
//!
//! Both stores order values the way PostgreSQL orders `jsonb`: missing/null < string < number <
//! boolean < array < object. Ties are broken by insertion sequence in the same direction as the
//! sort, and an unsorted query returns records in insertion order.
//!
//! ## Unique fields
//!
//! `insert` and `replace` take the list of fields whose non-null values must be unique within the
//! collection and fail with [`DbError::UniqueViolation`](crate::db::errors::DbError) when another
//! record already holds the value.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use std::ops::Bound;

use crate::db::errors::{DbError, Result};
use crate::db::models::{Entity, Fields, paging::SortDirection};
use crate::types::EntityId;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A stored document. `fields` holds the full serialized entity, including `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: EntityId,
    pub fields: Fields,
}

impl Document {
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        match serde_json::to_value(entity)? {
            Value::Object(fields) => Ok(Self { id: entity.id(), fields }),
            other => Err(DbError::InvalidDocument {
                message: format!("{} serialized to a non-object value: {other}", E::NAME),
            }),
        }
    }

    pub fn into_entity<E: Entity>(self) -> Result<E> {
        Ok(serde_json::from_value(Value::Object(self.fields))?)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    /// JSON equality; an array field matches when any element is equal
    Equals(Value),
    /// Missing and null fields are distinct from every non-null value
    NotEquals(Value),
    /// Case-insensitive substring of the value's text form
    Contains(String),
    /// The value's text form is one of the given strings
    In(Vec<String>),
    /// Byte-wise string comparison against the value's text form
    Range { lower: Bound<String>, upper: Bound<String> },
    /// Missing or null
    IsNull,
    /// At least one nested criterion holds; the outer field is unused
    Any(Vec<Criterion>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub field: String,
    pub matcher: Match,
}

impl Criterion {
    pub fn new(field: impl Into<String>, matcher: Match) -> Self {
        Self {
            field: field.into(),
            matcher,
        }
    }

    /// Equality criterion; comparing against null means "missing or null".
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => Self::new(field, Match::IsNull),
            value => Self::new(field, Match::Equals(value)),
        }
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Match::NotEquals(value.into()))
    }

    /// Disjunction of the given criteria.
    pub fn any(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Self::new(String::new(), Match::Any(criteria.into_iter().collect()))
    }

    pub fn one_of<S: Into<String>>(field: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(field, Match::In(values.into_iter().map(Into::into).collect()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub criteria: Vec<Criterion>,
    pub sort: Vec<Sort>,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn filters(mut self, criteria: impl IntoIterator<Item = Criterion>) -> Self {
        self.criteria.extend(criteria);
        self
    }

    /// Add a sort key. Keys apply in the order they are added.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Direction of the insertion-sequence tie-break.
    pub(crate) fn tie_break(&self) -> SortDirection {
        self.sort.last().map(|s| s.direction).unwrap_or(SortDirection::Asc)
    }
}

/// Text form of a scalar JSON value, as used by `Contains`, `In` and `Range`.
pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new document
    async fn insert(&self, collection: &str, document: Document, unique: &[&str]) -> Result<()>;

    /// Fetch one document by id
    async fn get(&self, collection: &str, id: EntityId) -> Result<Option<Document>>;

    /// Replace an existing document, returning false if it does not exist
    async fn replace(&self, collection: &str, document: Document, unique: &[&str]) -> Result<bool>;

    /// Remove one document, returning false if it does not exist
    async fn remove(&self, collection: &str, id: EntityId) -> Result<bool>;

    /// Remove every listed document that exists, returning how many were removed
    async fn remove_many(&self, collection: &str, ids: &[EntityId]) -> Result<u64>;

    /// Run a query
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;

    /// Count the documents matching all criteria
    async fn count(&self, collection: &str, criteria: &[Criterion]) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_null_means_missing() {
        assert_eq!(Criterion::eq("parent_id", Value::Null).matcher, Match::IsNull);
        assert_eq!(Criterion::eq("status", "active").matcher, Match::Equals(json!("active")));
    }

    #[test]
    fn test_text_of_scalars() {
        assert_eq!(text_of(&json!("a")).as_deref(), Some("a"));
        assert_eq!(text_of(&json!(3)).as_deref(), Some("3"));
        assert_eq!(text_of(&json!(true)).as_deref(), Some("true"));
        assert_eq!(text_of(&json!(null)), None);
        assert_eq!(text_of(&json!([1])), None);
    }

    #[test]
    fn test_tie_break_follows_last_sort() {
        assert_eq!(Query::new().tie_break(), SortDirection::Asc);
        let q = Query::new().sort_by("created_at", SortDirection::Desc);
        assert_eq!(q.tie_break(), SortDirection::Desc);
    }
}
