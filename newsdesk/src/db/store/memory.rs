//! In-process record store backed by a [`DashMap`] of collections.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::{
    cmp::Ordering,
    collections::HashSet,
    ops::Bound,
    sync::atomic::{self, AtomicU64},
};
use tracing::instrument;

use super::{Criterion, Document, Match, Query, RecordStore, text_of};
use crate::db::errors::{DbError, Result};
use crate::db::models::paging::SortDirection;
use crate::types::{EntityId, abbrev_uuid};

#[derive(Debug, Clone)]
struct Stored {
    seq: u64,
    document: Document,
}

/// Documents live in one vector per collection, in insertion order. Every write happens under
/// the collection's map entry lock, so unique-field checks and the write are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Stored>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_unique(records: &[Stored], document: &Document, unique: &[&str]) -> Result<()> {
    for field in unique {
        let Some(value) = document.get(field) else {
            continue;
        };
        let taken = records
            .iter()
            .any(|s| s.document.id != document.id && s.document.get(field) == Some(value));
        if taken {
            return Err(DbError::unique_violation(field));
        }
    }
    Ok(())
}

/// Scalar text forms of a field; array fields contribute every element.
fn elements(value: Option<&Value>) -> impl Iterator<Item = String> + '_ {
    let items: &[Value] = match value {
        Some(Value::Array(items)) => items,
        Some(v) => std::slice::from_ref(v),
        None => &[],
    };
    items.iter().filter_map(text_of)
}

fn in_range(text: &str, lower: &Bound<String>, upper: &Bound<String>) -> bool {
    let above = match lower {
        Bound::Included(l) => text >= l.as_str(),
        Bound::Excluded(l) => text > l.as_str(),
        Bound::Unbounded => true,
    };
    let below = match upper {
        Bound::Included(u) => text <= u.as_str(),
        Bound::Excluded(u) => text < u.as_str(),
        Bound::Unbounded => true,
    };
    above && below
}

pub(crate) fn matches(document: &Document, criterion: &Criterion) -> bool {
    let value = document.get(&criterion.field);
    match &criterion.matcher {
        Match::Equals(expected) => value.is_some_and(|v| {
            v == expected || matches!(v, Value::Array(items) if items.contains(expected))
        }),
        Match::NotEquals(expected) => value.unwrap_or(&Value::Null) != expected,
        Match::Contains(needle) => {
            let needle = needle.to_lowercase();
            elements(value).any(|text| text.to_lowercase().contains(&needle))
        }
        Match::In(options) => elements(value).any(|text| options.contains(&text)),
        Match::Range { lower, upper } => value
            .and_then(text_of)
            .is_some_and(|text| in_range(&text, lower, upper)),
        Match::IsNull => value.is_none(),
        Match::Any(alternatives) => alternatives.iter().any(|c| matches(document, c)),
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::String(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::Bool(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Same ordering as PostgreSQL applies to `jsonb`, with missing treated as null.
pub(crate) fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x @ (Value::Array(_) | Value::Object(_))), Some(y)) if rank(Some(x)) == rank(Some(y)) => {
            x.to_string().cmp(&y.to_string())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    #[instrument(skip(self, document, unique), fields(id = %abbrev_uuid(&document.id)), err)]
    async fn insert(&self, collection: &str, document: Document, unique: &[&str]) -> Result<()> {
        let mut records = self.collections.entry(collection.to_string()).or_default();

        if records.iter().any(|s| s.document.id == document.id) {
            return Err(DbError::unique_violation("id"));
        }
        check_unique(&records, &document, unique)?;

        let seq = self.next_seq.fetch_add(1, atomic::Ordering::Relaxed);
        records.push(Stored { seq, document });
        Ok(())
    }

    #[instrument(skip(self), fields(id = %abbrev_uuid(&id)), err)]
    async fn get(&self, collection: &str, id: EntityId) -> Result<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|records| records.iter().find(|s| s.document.id == id).map(|s| s.document.clone())))
    }

    #[instrument(skip(self, document, unique), fields(id = %abbrev_uuid(&document.id)), err)]
    async fn replace(&self, collection: &str, document: Document, unique: &[&str]) -> Result<bool> {
        let Some(mut records) = self.collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(position) = records.iter().position(|s| s.document.id == document.id) else {
            return Ok(false);
        };
        check_unique(&records, &document, unique)?;

        records[position].document = document;
        Ok(true)
    }

    #[instrument(skip(self), fields(id = %abbrev_uuid(&id)), err)]
    async fn remove(&self, collection: &str, id: EntityId) -> Result<bool> {
        Ok(self.remove_many(collection, &[id]).await? > 0)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn remove_many(&self, collection: &str, ids: &[EntityId]) -> Result<u64> {
        let Some(mut records) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        let ids: HashSet<&EntityId> = ids.iter().collect();
        let before = records.len();
        records.retain(|s| !ids.contains(&s.document.id));
        Ok((before - records.len()) as u64)
    }

    #[instrument(skip(self, query), fields(criteria = query.criteria.len()), err)]
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let Some(records) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<&Stored> = records
            .iter()
            .filter(|s| query.criteria.iter().all(|c| matches(&s.document, c)))
            .collect();

        let tie_break = query.tie_break();
        hits.sort_by(|a, b| {
            query
                .sort
                .iter()
                .map(|sort| {
                    let ordering = compare(a.document.get(&sort.field), b.document.get(&sort.field));
                    directed(ordering, sort.direction)
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| directed(a.seq.cmp(&b.seq), tie_break))
        });

        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(hits
            .into_iter()
            .skip(query.offset as usize)
            .take(limit)
            .map(|s| s.document.clone())
            .collect())
    }

    #[instrument(skip(self, criteria), fields(criteria = criteria.len()), err)]
    async fn count(&self, collection: &str, criteria: &[Criterion]) -> Result<u64> {
        Ok(self
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|s| criteria.iter().all(|c| matches(&s.document, c)))
                    .count() as u64
            })
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn doc(fields: Value) -> Document {
        let id = Uuid::new_v4();
        let Value::Object(mut fields) = fields else {
            panic!("document must be an object")
        };
        fields.insert("id".into(), json!(id));
        Document { id, fields }
    }

    fn titles(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.fields["title"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_insert_get_replace_remove() {
        let store = MemoryStore::new();
        let mut d = doc(json!({"title": "first"}));
        store.insert("c", d.clone(), &[]).await.unwrap();
        assert_eq!(store.get("c", d.id).await.unwrap(), Some(d.clone()));

        d.fields.insert("title".into(), json!("changed"));
        assert!(store.replace("c", d.clone(), &[]).await.unwrap());
        assert_eq!(store.get("c", d.id).await.unwrap().unwrap().fields["title"], "changed");

        assert!(store.remove("c", d.id).await.unwrap());
        assert!(!store.remove("c", d.id).await.unwrap());
        assert!(store.get("c", d.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_fields_are_enforced() {
        let store = MemoryStore::new();
        store.insert("c", doc(json!({"slug": "a"})), &["slug"]).await.unwrap();
        let err = store.insert("c", doc(json!({"slug": "a"})), &["slug"]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { field: Some(ref f), .. } if f == "slug"));

        // Nulls never collide
        store.insert("c", doc(json!({"slug": null})), &["slug"]).await.unwrap();
        store.insert("c", doc(json!({"slug": null})), &["slug"]).await.unwrap();

        // Other collections are independent
        store.insert("other", doc(json!({"slug": "a"})), &["slug"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_keeps_own_unique_value() {
        let store = MemoryStore::new();
        let mut d = doc(json!({"slug": "a", "title": "x"}));
        store.insert("c", d.clone(), &["slug"]).await.unwrap();
        d.fields.insert("title".into(), json!("y"));
        assert!(store.replace("c", d, &["slug"]).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_many_skips_missing() {
        let store = MemoryStore::new();
        let a = doc(json!({}));
        let b = doc(json!({}));
        store.insert("c", a.clone(), &[]).await.unwrap();
        store.insert("c", b.clone(), &[]).await.unwrap();
        let removed = store.remove_many("c", &[a.id, b.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count("c", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_contains_and_in_matchers() {
        let store = MemoryStore::new();
        store
            .insert("c", doc(json!({"title": "Rust News", "tags": ["lang", "Systems"], "n": 5})), &[])
            .await
            .unwrap();
        store
            .insert("c", doc(json!({"title": "Cooking", "tags": ["food"], "n": 7})), &[])
            .await
            .unwrap();

        let q = Query::new().filter(Criterion::new("title", Match::Contains("rust".into())));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["Rust News"]);

        let q = Query::new().filter(Criterion::new("tags", Match::Contains("system".into())));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["Rust News"]);

        let q = Query::new().filter(Criterion::one_of("tags", ["food", "none"]));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["Cooking"]);

        let q = Query::new().filter(Criterion::one_of("n", ["7"]));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["Cooking"]);

        let q = Query::new().filter(Criterion::eq("tags", "lang"));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["Rust News"]);

        let either = Criterion::any([
            Criterion::new("title", Match::Contains("cook".into())),
            Criterion::new("tags", Match::Contains("lang".into())),
        ]);
        let q = Query::new().filter(either);
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["Rust News", "Cooking"]);
    }

    #[tokio::test]
    async fn test_range_and_null_matchers() {
        let store = MemoryStore::new();
        store
            .insert("c", doc(json!({"title": "jan", "at": "2024-01-15T00:00:00.000000Z"})), &[])
            .await
            .unwrap();
        store
            .insert("c", doc(json!({"title": "feb", "at": "2024-02-01T00:00:00.000000Z"})), &[])
            .await
            .unwrap();
        store.insert("c", doc(json!({"title": "none"})), &[]).await.unwrap();

        let january = Match::Range {
            lower: Bound::Included("2024-01-01T00:00:00.000000Z".into()),
            upper: Bound::Excluded("2024-02-01T00:00:00.000000Z".into()),
        };
        let q = Query::new().filter(Criterion::new("at", january));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["jan"]);

        let q = Query::new().filter(Criterion::new("at", Match::IsNull));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["none"]);

        let q = Query::new().filter(Criterion::ne("title", "jan"));
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["feb", "none"]);
    }

    #[tokio::test]
    async fn test_sort_with_tie_break_and_window() {
        let store = MemoryStore::new();
        for (title, rank) in [("a", 2), ("b", 1), ("c", 2), ("d", 3)] {
            store.insert("c", doc(json!({"title": title, "rank": rank})), &[]).await.unwrap();
        }

        let q = Query::new().sort_by("rank", SortDirection::Asc);
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["b", "a", "c", "d"]);

        let q = Query::new().sort_by("rank", SortDirection::Desc);
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["d", "c", "a", "b"]);

        let q = Query::new().sort_by("rank", SortDirection::Asc).offset(1).limit(2);
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["a", "c"]);

        let q = Query::new();
        assert_eq!(titles(&store.query("c", &q).await.unwrap()), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_in_range_honours_bound_kinds() {
        let b = |s: &str| s.to_string();
        assert!(in_range("b", &Bound::Included(b("b")), &Bound::Included(b("b"))));
        assert!(!in_range("b", &Bound::Excluded(b("b")), &Bound::Unbounded));
        assert!(!in_range("b", &Bound::Unbounded, &Bound::Excluded(b("b"))));
        assert!(in_range("m", &Bound::Excluded(b("a")), &Bound::Excluded(b("z"))));
        assert!(in_range("anything", &Bound::Unbounded, &Bound::Unbounded));
    }

    #[test]
    fn test_compare_follows_jsonb_type_order() {
        assert_eq!(compare(None, Some(&json!("a"))), Ordering::Less);
        assert_eq!(compare(Some(&json!("z")), Some(&json!(1))), Ordering::Less);
        assert_eq!(compare(Some(&json!(10)), Some(&json!(9))), Ordering::Greater);
        assert_eq!(compare(Some(&json!(1)), Some(&json!(true))), Ordering::Less);
        assert_eq!(compare(Some(&json!(null)), None), Ordering::Equal);
    }
}
