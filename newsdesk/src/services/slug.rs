//! Unique slug generation.

use crate::db::{
    handlers::Records,
    models::Entity,
    store::Criterion,
};
use crate::errors::{Error, Result};
use crate::text::slugify;
use crate::types::EntityId;

/// Candidates tried before giving up: the bare slug, then `-1` through `-999`.
pub const MAX_SLUG_CANDIDATES: usize = 1000;

/// Slugify `source` and append `-1`, `-2`, ... until no other record holds the slug.
///
/// `exclude` names the record being updated, so it never collides with itself. The store's
/// unique constraint still has the final word if another writer takes the slug concurrently.
pub async fn unique_slug<E: Entity>(records: &Records<E>, source: &str, exclude: Option<EntityId>) -> Result<String> {
    let base = slugify(source);
    if base.is_empty() {
        return Err(Error::rule(format!(
            "Cannot derive a slug from '{source}': it has no letters or digits."
        )));
    }

    for n in 0..MAX_SLUG_CANDIDATES {
        let candidate = if n == 0 { base.clone() } else { format!("{base}-{n}") };
        if !slug_taken(records, &candidate, exclude).await? {
            return Ok(candidate);
        }
    }

    Err(Error::rule(format!("No free slug left for '{base}'.")))
}

async fn slug_taken<E: Entity>(records: &Records<E>, slug: &str, exclude: Option<EntityId>) -> Result<bool> {
    let mut criteria = vec![Criterion::eq("slug", slug)];
    if let Some(id) = exclude {
        criteria.push(Criterion::ne("id", id.to_string()));
    }
    Ok(records.count_where(&criteria).await? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Repository, models::categories::Category, store::MemoryStore};
    use crate::test_utils::fields;
    use serde_json::json;
    use std::sync::Arc;

    fn categories() -> Records<Category> {
        Records::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_suffixes_until_free() {
        let repo = categories();
        assert_eq!(unique_slug(&repo, "A", None).await.unwrap(), "a");

        repo.create(fields(json!({"name": "A", "slug": "a"}))).await.unwrap();
        assert_eq!(unique_slug(&repo, "A", None).await.unwrap(), "a-1");

        repo.create(fields(json!({"name": "A", "slug": "a-1"}))).await.unwrap();
        assert_eq!(unique_slug(&repo, "A", None).await.unwrap(), "a-2");
    }

    #[tokio::test]
    async fn test_own_slug_is_not_a_collision() {
        let repo = categories();
        let own = repo.create(fields(json!({"name": "A", "slug": "a"}))).await.unwrap();
        assert_eq!(unique_slug(&repo, "A", Some(own.id)).await.unwrap(), "a");
    }

    #[tokio::test]
    async fn test_unsluggable_source_is_rejected() {
        let repo = categories();
        let err = unique_slug(&repo, "!!!", None).await.unwrap_err();
        assert!(matches!(err, Error::DomainRuleViolation { .. }));
    }
}
