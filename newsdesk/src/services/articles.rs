//! Articles: slug derivation, publish stamping, SEO defaults and the public read queries.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde_json::Value;
use std::ops::Bound;
use tracing::instrument;

use super::{Operation, Service, clear_blank, id_field, is_blank, slug::unique_slug, split_tags, text_field};
use crate::db::{
    handlers::{Records, Repository},
    models::{
        Fields, Status,
        articles::{Article, summarize},
        categories::Category,
        now,
        paging::{PageRequest, Paginated, SortDirection},
        timestamp,
    },
    store::{Criterion, Match, Query},
};
use crate::errors::{Error, Result};
use crate::types::{ArticleId, CategoryId, abbrev_uuid};

pub const DEFAULT_FEATURED_LIMIT: u64 = 5;
pub const DEFAULT_RELATED_LIMIT: u64 = 5;
pub const DEFAULT_POPULAR_LIMIT: u64 = 10;

/// Criteria selecting articles visible to readers at `at`: a live status and a publish time that
/// has been reached.
pub fn published_criteria(at: DateTime<Utc>) -> Vec<Criterion> {
    vec![
        Criterion::one_of("status", [Status::Active.as_str(), Status::Published.as_str()]),
        Criterion::new(
            "published_at",
            Match::Range {
                lower: Bound::Unbounded,
                upper: Bound::Included(timestamp::format(&at)),
            },
        ),
    ]
}

/// Optional narrowing of the published listing.
#[derive(Debug, Clone, Default)]
pub struct PublishedFilter {
    pub category: Option<CategoryId>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl PublishedFilter {
    fn criteria(&self) -> Vec<Criterion> {
        let mut criteria = Vec::new();
        if let Some(category) = self.category {
            criteria.push(Criterion::eq("category_id", category.to_string()));
        }
        if let Some(tag) = &self.tag {
            criteria.push(Criterion::eq("tags", tag.as_str()));
        }
        if let Some(search) = &self.search {
            criteria.push(Criterion::any([
                Criterion::new("title", Match::Contains(search.clone())),
                Criterion::new("content", Match::Contains(search.clone())),
            ]));
        }
        criteria
    }
}

#[derive(Clone)]
pub struct ArticleService {
    articles: Records<Article>,
    categories: Records<Category>,
}

impl ArticleService {
    pub fn new(articles: Records<Article>, categories: Records<Category>) -> Self {
        Self { articles, categories }
    }

    fn newest_published(criteria: Vec<Criterion>) -> Query {
        Query::new()
            .filters(published_criteria(now()))
            .filters(criteria)
            .sort_by("published_at", SortDirection::Desc)
    }

    /// Published articles, newest publication first.
    #[instrument(skip(self, filter), err)]
    pub async fn published(&self, page: u64, per_page: u64, filter: &PublishedFilter) -> Result<Paginated<Article>> {
        let mut criteria = published_criteria(now());
        criteria.extend(filter.criteria());
        let request = PageRequest::new(page, per_page).sorted_by("published_at", SortDirection::Desc);
        Ok(self.articles.search_page(criteria, &request).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn featured(&self, limit: u64) -> Result<Vec<Article>> {
        let query = Self::newest_published(vec![Criterion::eq("is_featured", true)]).limit(limit);
        Ok(self.articles.search(&query).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn popular(&self, limit: u64) -> Result<Vec<Article>> {
        let query = Query::new()
            .filters(published_criteria(now()))
            .sort_by("view_count", SortDirection::Desc)
            .limit(limit);
        Ok(self.articles.search(&query).await?)
    }

    /// Published article by slug. Each successful lookup counts as one view.
    #[instrument(skip(self), err)]
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let query = Self::newest_published(vec![Criterion::eq("slug", slug)]).limit(1);
        let Some(article) = self.articles.search(&query).await?.into_iter().next() else {
            return Ok(None);
        };

        let mut data = Fields::new();
        data.insert("view_count".to_string(), Value::from(article.view_count + 1));
        Ok(Some(self.articles.update(article.id, data).await?))
    }

    /// Other published articles from the same category. Uncategorized articles have no relations.
    #[instrument(skip(self), fields(id = %abbrev_uuid(&id)), err)]
    pub async fn related(&self, id: ArticleId, limit: u64) -> Result<Vec<Article>> {
        let article = self.articles.find_or_fail(id).await?;
        let Some(category) = article.category_id else {
            return Ok(Vec::new());
        };

        let query = Self::newest_published(vec![
            Criterion::ne("id", id.to_string()),
            Criterion::eq("category_id", category.to_string()),
        ])
        .limit(limit);
        Ok(self.articles.search(&query).await?)
    }

    /// Articles published within the given calendar month (UTC).
    #[instrument(skip(self), err)]
    pub async fn archive(&self, year: i32, month: u32) -> Result<Vec<Article>> {
        let (start, end) = month_bounds(year, month)?;
        let query = Self::newest_published(vec![Criterion::new(
            "published_at",
            Match::Range {
                lower: Bound::Included(timestamp::format(&start)),
                upper: Bound::Excluded(timestamp::format(&end)),
            },
        )]);
        Ok(self.articles.search(&query).await?)
    }

    #[instrument(skip(self), fields(id = %abbrev_uuid(&id)), err)]
    pub async fn toggle_featured(&self, id: ArticleId) -> Result<Article> {
        let article = self.articles.find_or_fail(id).await?;
        let mut data = Fields::new();
        data.insert("is_featured".to_string(), Value::Bool(!article.is_featured));
        Ok(self.articles.update(id, data).await?)
    }

    async fn check_category(&self, data: &Fields) -> Result<()> {
        if let Some(category) = id_field(data, "category_id")? {
            if !self.categories.exists(category).await? {
                return Err(Error::rule("Selected category does not exist."));
            }
        }
        Ok(())
    }
}

/// First instant of the month and of the month after it.
fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::BadRequest {
            message: "Invalid month".to_string(),
        })?;
    let (next_year, next_month) = if start.month() == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::BadRequest {
            message: "Invalid month".to_string(),
        })?;
    Ok((start, end))
}

/// Status the record will have once `data` is applied.
fn incoming_status(data: &Fields, current: Option<Status>) -> Status {
    data.get("status")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .or(current)
        .unwrap_or_default()
}

#[async_trait]
impl Service<Article> for ArticleService {
    fn repository(&self) -> &Records<Article> {
        &self.articles
    }

    async fn validate_data(&self, mut data: Fields, operation: Operation<'_, Article>) -> Result<Fields> {
        clear_blank(&mut data, "category_id");
        split_tags(&mut data);
        self.check_category(&data).await?;

        match operation {
            Operation::Create => {
                let title = text_field(&data, "title")
                    .map(str::to_string)
                    .ok_or_else(|| Error::rule("News title is required."))?;

                if is_blank(&data, "slug") {
                    let slug = unique_slug(&self.articles, &title, None).await?;
                    data.insert("slug".to_string(), Value::String(slug));
                }
                if incoming_status(&data, None).is_live() && is_blank(&data, "published_at") {
                    data.insert("published_at".to_string(), Value::String(timestamp::format(&now())));
                }
                if is_blank(&data, "meta_title") {
                    data.insert("meta_title".to_string(), Value::String(title));
                }
                if is_blank(&data, "excerpt") {
                    let content = data.get("content").and_then(Value::as_str).unwrap_or_default();
                    data.insert("excerpt".to_string(), Value::String(summarize(content)));
                }
            }
            Operation::Update(current) => {
                let title = text_field(&data, "title").map(str::to_string);

                if is_blank(&data, "slug") {
                    match &title {
                        Some(title) if *title != current.title => {
                            let slug = unique_slug(&self.articles, title, Some(current.id)).await?;
                            data.insert("slug".to_string(), Value::String(slug));
                        }
                        _ => {
                            data.remove("slug");
                        }
                    }
                }
                if incoming_status(&data, Some(current.status)).is_live()
                    && current.published_at.is_none()
                    && is_blank(&data, "published_at")
                {
                    data.insert("published_at".to_string(), Value::String(timestamp::format(&now())));
                }
                if let Some(title) = title {
                    if is_blank(&data, "meta_title") {
                        data.insert("meta_title".to_string(), Value::String(title));
                    }
                }
            }
        }

        Ok(data)
    }
}
