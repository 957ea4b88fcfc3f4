//! PostgreSQL record store.
//!
//! Every collection shares the `records` table (see `migrations/`): one row per document with the
//! full document in a JSONB `data` column and a `seq` column recording insertion order. Field
//! names are always bound as parameters, never spliced into the SQL text.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use std::ops::Bound;
use tracing::instrument;

use super::{Criterion, Document, Match, Query, RecordStore};
use crate::db::errors::{DbError, Result};
use crate::db::models::{Fields, paging::SortDirection};
use crate::types::{EntityId, abbrev_uuid};

/// Elements of a field as a set of jsonb values: array fields expand, anything else is a
/// one-element set.
const ELEMENTS: &str = "jsonb_array_elements(CASE WHEN jsonb_typeof(data -> f.name) = 'array' \
                        THEN data -> f.name ELSE jsonb_build_array(data -> f.name) END)";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_element_test(qb: &mut QueryBuilder<'_, Postgres>, field: &str) {
    qb.push("EXISTS (SELECT 1 FROM (SELECT ");
    qb.push_bind(field.to_string());
    qb.push("::text AS name) AS f, ");
    qb.push(ELEMENTS);
    qb.push(" AS e(v) WHERE jsonb_typeof(e.v) IN ('string', 'number', 'boolean') AND (e.v #>> '{}') ");
}

fn push_criterion(qb: &mut QueryBuilder<'_, Postgres>, criterion: &Criterion) {
    let field = criterion.field.clone();
    match &criterion.matcher {
        Match::Equals(value) => {
            qb.push("(data -> ");
            qb.push_bind(field.clone());
            qb.push(" = ");
            qb.push_bind(Json(value.clone()));
            qb.push(" OR (jsonb_typeof(data -> ");
            qb.push_bind(field.clone());
            qb.push(") = 'array' AND data -> ");
            qb.push_bind(field);
            qb.push(" @> jsonb_build_array(");
            qb.push_bind(Json(value.clone()));
            qb.push(")))");
        }
        Match::NotEquals(value) => {
            qb.push("COALESCE(data -> ");
            qb.push_bind(field);
            qb.push(", 'null'::jsonb) IS DISTINCT FROM ");
            qb.push_bind(Json(value.clone()));
        }
        Match::Contains(needle) => {
            push_element_test(qb, &field);
            qb.push("ILIKE ");
            qb.push_bind(like_pattern(needle));
            qb.push(")");
        }
        Match::In(options) => {
            push_element_test(qb, &field);
            qb.push("= ANY(");
            qb.push_bind(options.clone());
            qb.push("))");
        }
        Match::Range { lower, upper } => {
            qb.push("(data ->> ");
            qb.push_bind(field.clone());
            qb.push(") IS NOT NULL");
            for (bound, inclusive, exclusive) in [(lower, " >= ", " > "), (upper, " <= ", " < ")] {
                let (op, value) = match bound {
                    Bound::Included(v) => (inclusive, v),
                    Bound::Excluded(v) => (exclusive, v),
                    Bound::Unbounded => continue,
                };
                qb.push(" AND (data ->> ");
                qb.push_bind(field.clone());
                qb.push(") COLLATE \"C\"");
                qb.push(op);
                qb.push_bind(value.clone());
            }
        }
        Match::IsNull => {
            qb.push("COALESCE(data -> ");
            qb.push_bind(field);
            qb.push(", 'null'::jsonb) = 'null'::jsonb");
        }
        Match::Any(alternatives) if alternatives.is_empty() => {
            qb.push("FALSE");
        }
        Match::Any(alternatives) => {
            qb.push("(");
            for (i, alternative) in alternatives.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                push_criterion(qb, alternative);
            }
            qb.push(")");
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, collection: &str, criteria: &[Criterion]) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.to_string());
    for criterion in criteria {
        qb.push(" AND ");
        push_criterion(qb, criterion);
    }
}

pub(crate) fn select_query(collection: &str, query: &Query) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT id, data FROM records");
    push_where(&mut qb, collection, &query.criteria);

    qb.push(" ORDER BY ");
    for sort in &query.sort {
        push_sort_key(&mut qb, &sort.field, sort.direction);
    }
    qb.push("seq ");
    qb.push(query.tie_break().as_sql());

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(bigint(limit));
    }
    if query.offset > 0 {
        qb.push(" OFFSET ");
        qb.push_bind(bigint(query.offset));
    }
    qb
}

/// LIMIT and OFFSET take a signed bigint; larger values saturate.
fn bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Sort by JSON type first (null, string, number, boolean, array, object), then strings byte-wise
/// under the "C" collation, then by the jsonb value. This matches the in-memory store whatever the
/// database's default collation is.
fn push_sort_key(qb: &mut QueryBuilder<'static, Postgres>, field: &str, direction: SortDirection) {
    let dir = match direction {
        SortDirection::Asc => " ASC",
        SortDirection::Desc => " DESC",
    };
    qb.push("CASE jsonb_typeof(data -> ");
    qb.push_bind(field.to_string());
    qb.push(") WHEN 'string' THEN 1 WHEN 'number' THEN 2 WHEN 'boolean' THEN 3 WHEN 'array' THEN 4 WHEN 'object' THEN 5 ELSE 0 END");
    qb.push(dir);
    qb.push(", (CASE WHEN jsonb_typeof(data -> ");
    qb.push_bind(field.to_string());
    qb.push(") = 'string' THEN data ->> ");
    qb.push_bind(field.to_string());
    qb.push(" END) COLLATE \"C\"");
    qb.push(dir);
    qb.push(", data -> ");
    qb.push_bind(field.to_string());
    qb.push(match direction {
        SortDirection::Asc => " ASC NULLS FIRST, ",
        SortDirection::Desc => " DESC NULLS LAST, ",
    });
}

pub(crate) fn count_query(collection: &str, criteria: &[Criterion]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM records");
    push_where(&mut qb, collection, criteria);
    qb
}

/// Look for another document holding one of the unique values. The partial unique index on
/// `slug` still rejects a racing writer that passes this check.
async fn check_unique(
    tx: &mut sqlx::PgConnection,
    collection: &str,
    document: &Document,
    unique: &[&str],
) -> Result<()> {
    for field in unique {
        let Some(value) = document.get(field) else {
            continue;
        };
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM records WHERE collection = $1 AND data -> $2 = $3 AND id <> $4)",
        )
        .bind(collection)
        .bind(*field)
        .bind(Json(value.clone()))
        .bind(document.id)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            return Err(DbError::unique_violation(field));
        }
    }
    Ok(())
}

fn into_document((id, Json(fields)): (EntityId, Json<Fields>)) -> Document {
    Document { id, fields }
}

#[async_trait]
impl RecordStore for PgStore {
    #[instrument(skip(self, document, unique), fields(id = %abbrev_uuid(&document.id)), err)]
    async fn insert(&self, collection: &str, document: Document, unique: &[&str]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        check_unique(&mut tx, collection, &document, unique).await?;

        sqlx::query("INSERT INTO records (id, collection, data) VALUES ($1, $2, $3)")
            .bind(document.id)
            .bind(collection)
            .bind(Json(Value::Object(document.fields)))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(id = %abbrev_uuid(&id)), err)]
    async fn get(&self, collection: &str, id: EntityId) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, (EntityId, Json<Fields>)>(
            "SELECT id, data FROM records WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_document))
    }

    #[instrument(skip(self, document, unique), fields(id = %abbrev_uuid(&document.id)), err)]
    async fn replace(&self, collection: &str, document: Document, unique: &[&str]) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        check_unique(&mut tx, collection, &document, unique).await?;

        let result = sqlx::query("UPDATE records SET data = $3, updated_at = NOW() WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(document.id)
            .bind(Json(Value::Object(document.fields)))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(id = %abbrev_uuid(&id)), err)]
    async fn remove(&self, collection: &str, id: EntityId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn remove_many(&self, collection: &str, ids: &[EntityId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = ANY($2)")
            .bind(collection)
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, query), fields(criteria = query.criteria.len()), err)]
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let mut qb = select_query(collection, query);
        tracing::debug!("Executing SQL: {}", qb.sql());

        let rows = qb
            .build_query_as::<(EntityId, Json<Fields>)>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(into_document).collect())
    }

    #[instrument(skip(self, criteria), fields(criteria = criteria.len()), err)]
    async fn count(&self, collection: &str, criteria: &[Criterion]) -> Result<u64> {
        let mut qb = count_query(collection, criteria);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }
}
