use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::{Operation, Service, articles::published_criteria, clear_blank, id_field, is_blank, slug::unique_slug, text_field};
use crate::db::{
    handlers::{Records, Repository},
    models::{
        Fields, Status,
        articles::Article,
        categories::Category,
        now,
        paging::{PageRequest, Paginated, SortDirection},
    },
    store::{Criterion, Query},
};
use crate::errors::{Error, Result};
use crate::types::CategoryId;

/// An active root category with its active children.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBranch {
    pub category: Category,
    pub children: Vec<Category>,
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Records<Category>,
    articles: Records<Article>,
}

impl CategoryService {
    pub fn new(categories: Records<Category>, articles: Records<Article>) -> Self {
        Self { categories, articles }
    }

    fn active_query() -> Query {
        Query::new()
            .filter(Criterion::eq("status", Status::Active.as_str()))
            .sort_by("sort_order", SortDirection::Asc)
            .sort_by("name", SortDirection::Asc)
    }

    /// Active categories ordered by `sort_order`, then name.
    #[instrument(skip(self), err)]
    pub async fn active(&self) -> Result<Vec<Category>> {
        Ok(self.categories.search(&Self::active_query()).await?)
    }

    /// Active root categories, each with its active children.
    #[instrument(skip(self), err)]
    pub async fn tree(&self) -> Result<Vec<CategoryBranch>> {
        let roots = self
            .categories
            .search(&Self::active_query().filter(Criterion::eq("parent_id", Value::Null)))
            .await?;
        if roots.is_empty() {
            return Ok(Vec::new());
        }

        let children = self
            .categories
            .search(&Self::active_query().filter(Criterion::one_of("parent_id", roots.iter().map(|r| r.id.to_string()))))
            .await?;

        Ok(roots
            .into_iter()
            .map(|category| {
                let children = children
                    .iter()
                    .filter(|child| child.parent_id == Some(category.id))
                    .cloned()
                    .collect();
                CategoryBranch { category, children }
            })
            .collect())
    }

    /// Active category by slug together with one page of its published articles.
    #[instrument(skip(self), err)]
    pub async fn by_slug_with_news(&self, slug: &str, page: u64, per_page: u64) -> Result<Option<(Category, Paginated<Article>)>> {
        let query = Query::new()
            .filter(Criterion::eq("slug", slug))
            .filter(Criterion::eq("status", Status::Active.as_str()))
            .limit(1);
        let Some(category) = self.categories.search(&query).await?.into_iter().next() else {
            return Ok(None);
        };

        let mut criteria = published_criteria(now());
        criteria.push(Criterion::eq("category_id", category.id.to_string()));
        let request = PageRequest::new(page, per_page).sorted_by("published_at", SortDirection::Desc);
        let news = self.articles.search_page(criteria, &request).await?;
        Ok(Some((category, news)))
    }

    /// Active categories with the number of published articles in each.
    #[instrument(skip(self), err)]
    pub async fn with_news_count(&self) -> Result<Vec<(Category, u64)>> {
        let categories = self.active().await?;
        let at = now();
        let mut counted = Vec::with_capacity(categories.len());
        for category in categories {
            let mut criteria = published_criteria(at);
            criteria.push(Criterion::eq("category_id", category.id.to_string()));
            let count = self.articles.count_where(&criteria).await?;
            counted.push((category, count));
        }
        Ok(counted)
    }

    async fn check_parent(&self, data: &Fields, own_id: Option<CategoryId>) -> Result<()> {
        let Some(parent) = id_field(data, "parent_id")? else {
            return Ok(());
        };
        if own_id == Some(parent) {
            return Err(Error::rule("A category cannot be its own parent."));
        }
        let Some(mut ancestor) = self.categories.find(parent).await? else {
            return Err(Error::rule("Selected parent category does not exist."));
        };
        let Some(own_id) = own_id else {
            return Ok(());
        };

        // Stops on an already corrupt chain.
        let mut seen = HashSet::from([parent]);
        while let Some(next) = ancestor.parent_id {
            if next == own_id {
                return Err(Error::rule("A category cannot be nested under its own descendant."));
            }
            if !seen.insert(next) {
                break;
            }
            match self.categories.find(next).await? {
                Some(found) => ancestor = found,
                None => break,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Service<Category> for CategoryService {
    fn repository(&self) -> &Records<Category> {
        &self.categories
    }

    async fn validate_data(&self, mut data: Fields, operation: Operation<'_, Category>) -> Result<Fields> {
        clear_blank(&mut data, "parent_id");

        match operation {
            Operation::Create => {
                self.check_parent(&data, None).await?;
                let name = text_field(&data, "name")
                    .map(str::to_string)
                    .ok_or_else(|| Error::rule("Category name is required."))?;

                if is_blank(&data, "slug") {
                    let slug = unique_slug(&self.categories, &name, None).await?;
                    data.insert("slug".to_string(), Value::String(slug));
                }
                if is_blank(&data, "meta_title") {
                    data.insert("meta_title".to_string(), Value::String(name));
                }
            }
            Operation::Update(current) => {
                self.check_parent(&data, Some(current.id)).await?;
                let name = text_field(&data, "name").map(str::to_string);

                if is_blank(&data, "slug") {
                    match &name {
                        Some(name) if *name != current.name => {
                            let slug = unique_slug(&self.categories, name, Some(current.id)).await?;
                            data.insert("slug".to_string(), Value::String(slug));
                        }
                        _ => {
                            data.remove("slug");
                        }
                    }
                }
                if let Some(name) = name {
                    if is_blank(&data, "meta_title") {
                        data.insert("meta_title".to_string(), Value::String(name));
                    }
                }
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;
    use crate::services::ArticleService;
    use crate::test_utils::fields;
    use serde_json::json;
    use std::sync::Arc;

    fn services() -> (CategoryService, ArticleService) {
        let store = Arc::new(MemoryStore::new());
        (
            CategoryService::new(Records::new(store.clone()), Records::new(store.clone())),
            ArticleService::new(Records::new(store.clone()), Records::new(store)),
        )
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_meta_title() {
        let (categories, _) = services();
        let tech = categories.create(fields(json!({"name": "Công nghệ"}))).await.unwrap();
        assert_eq!(tech.slug.as_deref(), Some("cong-nghe"));
        assert_eq!(tech.meta_title.as_deref(), Some("Công nghệ"));

        let again = categories.create(fields(json!({"name": "Công nghệ"}))).await.unwrap();
        assert_eq!(again.slug.as_deref(), Some("cong-nghe-1"));
    }

    #[tokio::test]
    async fn test_parent_rules() {
        let (categories, _) = services();
        let err = categories
            .create(fields(json!({"name": "Child", "parent_id": uuid::Uuid::new_v4()})))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Selected parent category does not exist.");

        let root = categories.create(fields(json!({"name": "Root", "parent_id": ""}))).await.unwrap();
        assert!(root.is_root());
        let err = categories
            .update(root.id, fields(json!({"parent_id": root.id})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DomainRuleViolation { .. }));
    }

    #[tokio::test]
    async fn test_parent_cannot_be_a_descendant() {
        let (categories, _) = services();
        let a = categories.create(fields(json!({"name": "A"}))).await.unwrap();
        let b = categories.create(fields(json!({"name": "B", "parent_id": a.id}))).await.unwrap();
        let c = categories.create(fields(json!({"name": "C", "parent_id": b.id}))).await.unwrap();

        let err = categories
            .update(a.id, fields(json!({"parent_id": c.id})))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "A category cannot be nested under its own descendant.");
        assert!(categories.get_by_id(a.id).await.unwrap().unwrap().is_root());

        let d = categories.create(fields(json!({"name": "D"}))).await.unwrap();
        let moved = categories.update(c.id, fields(json!({"parent_id": d.id}))).await.unwrap();
        assert_eq!(moved.parent_id, Some(d.id));
    }

    #[tokio::test]
    async fn test_active_ordering_and_tree() {
        let (categories, _) = services();
        let b = categories.create(fields(json!({"name": "B", "sort_order": 1}))).await.unwrap();
        let a = categories.create(fields(json!({"name": "A", "sort_order": 1}))).await.unwrap();
        let first = categories.create(fields(json!({"name": "Z", "sort_order": 0}))).await.unwrap();
        categories
            .create(fields(json!({"name": "Hidden", "status": "inactive"})))
            .await
            .unwrap();
        let child = categories
            .create(fields(json!({"name": "Child", "parent_id": a.id})))
            .await
            .unwrap();
        categories
            .create(fields(json!({"name": "Off", "parent_id": a.id, "status": "inactive"})))
            .await
            .unwrap();

        let active: Vec<_> = categories.active().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(active, vec!["Child", "Z", "A", "B"]);

        let tree = categories.tree().await.unwrap();
        let roots: Vec<_> = tree.iter().map(|b| b.category.id).collect();
        assert_eq!(roots, vec![first.id, a.id, b.id]);
        assert_eq!(tree[1].children.iter().map(|c| c.id).collect::<Vec<_>>(), vec![child.id]);
        assert!(tree[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_slug_lookup_and_news_count() {
        let (categories, articles) = services();
        let tech = categories.create(fields(json!({"name": "Tech"}))).await.unwrap();
        let empty = categories.create(fields(json!({"name": "Empty", "sort_order": 1}))).await.unwrap();
        for title in ["One", "Two"] {
            articles
                .create(fields(json!({"title": title, "content": "x", "category_id": tech.id})))
                .await
                .unwrap();
        }
        articles
            .create(fields(json!({"title": "Draft", "content": "x", "category_id": tech.id, "status": "draft"})))
            .await
            .unwrap();

        let (category, news) = categories.by_slug_with_news("tech", 1, 15).await.unwrap().unwrap();
        assert_eq!(category.id, tech.id);
        assert_eq!(news.total, 2);
        assert!(categories.by_slug_with_news("nope", 1, 15).await.unwrap().is_none());

        let counts: Vec<_> = categories
            .with_news_count()
            .await
            .unwrap()
            .into_iter()
            .map(|(c, n)| (c.id, n))
            .collect();
        assert_eq!(counts, vec![(tech.id, 2), (empty.id, 0)]);
    }
}
