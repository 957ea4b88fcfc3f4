use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use utoipa::IntoParams;

use crate::AppState;
use crate::api::envelope::{self, Envelope, Reply, SUCCESS};
use crate::api::models::{
    articles::ArticleView,
    pagination::{CollectionView, LimitQuery},
};
use crate::db::models::{articles::Article, paging::DEFAULT_PER_PAGE};
use crate::errors::{Error, Result};
use crate::services::articles::{DEFAULT_FEATURED_LIMIT, DEFAULT_POPULAR_LIMIT, DEFAULT_RELATED_LIMIT, PublishedFilter};
use crate::types::parse_id;

fn views(articles: Vec<Article>) -> Vec<ArticleView> {
    articles.into_iter().map(ArticleView::from).collect()
}

/// Query parameters of the published listing.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PublishedQuery {
    /// Page number, starting at 1
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<u64>,

    /// Items per page (default: 15, max: 100)
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub per_page: Option<u64>,

    /// Only articles in this category (id)
    pub category: Option<String>,

    /// Only articles carrying this tag
    pub tag: Option<String>,

    /// Case-insensitive text matched against title and content
    pub search: Option<String>,
}

impl PublishedQuery {
    fn filter(&self) -> Result<PublishedFilter> {
        let non_empty = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        let category = match non_empty(&self.category) {
            Some(raw) => Some(parse_id(&raw).ok_or_else(|| Error::BadRequest {
                message: format!("Invalid category '{raw}'"),
            })?),
            None => None,
        };
        Ok(PublishedFilter {
            category,
            tag: non_empty(&self.tag),
            search: non_empty(&self.search),
        })
    }
}

#[utoipa::path(
    get,
    path = "/news/published",
    tag = "news",
    summary = "List published articles",
    description = "Articles with a live status whose publish time has passed, newest first.",
    params(PublishedQuery),
    responses(
        (status = 200, description = "Page of published articles", body = Envelope<CollectionView<ArticleView>>),
        (status = 400, description = "Invalid filter"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn published(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PublishedQuery>,
) -> Result<Reply<CollectionView<ArticleView>>> {
    let filter = query.filter()?;
    let page = state
        .articles
        .published(
            query.page.unwrap_or(1).max(1),
            query.per_page.unwrap_or(DEFAULT_PER_PAGE),
            &filter,
        )
        .await?;
    Ok(envelope::success(CollectionView::new(page, &uri), SUCCESS, StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/news/featured",
    tag = "news",
    summary = "List featured articles",
    params(LimitQuery),
    responses(
        (status = 200, description = "Featured published articles", body = Envelope<Vec<ArticleView>>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn featured(State(state): State<AppState>, Query(query): Query<LimitQuery>) -> Result<Reply<Vec<ArticleView>>> {
    let articles = state.articles.featured(query.limit_or(DEFAULT_FEATURED_LIMIT)).await?;
    Ok(envelope::success(views(articles), SUCCESS, StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/news/popular",
    tag = "news",
    summary = "List the most viewed articles",
    params(LimitQuery),
    responses(
        (status = 200, description = "Published articles by view count", body = Envelope<Vec<ArticleView>>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn popular(State(state): State<AppState>, Query(query): Query<LimitQuery>) -> Result<Reply<Vec<ArticleView>>> {
    let articles = state.articles.popular(query.limit_or(DEFAULT_POPULAR_LIMIT)).await?;
    Ok(envelope::success(views(articles), SUCCESS, StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/news/archive/{year}/{month}",
    tag = "news",
    summary = "List articles published in a month",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month, 1 to 12"),
    ),
    responses(
        (status = 200, description = "Articles published that month", body = Envelope<Vec<ArticleView>>),
        (status = 400, description = "Invalid month"),
    )
)]
#[tracing::instrument(skip_all, fields(year = %year, month = %month))]
pub async fn archive(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Reply<Vec<ArticleView>>> {
    let articles = state.articles.archive(year, month).await?;
    Ok(envelope::success(views(articles), SUCCESS, StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/news/slug/{slug}",
    tag = "news",
    summary = "Get a published article by slug",
    description = "Every successful lookup increments the article's view count.",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "The article", body = Envelope<ArticleView>),
        (status = 404, description = "No published article with this slug"),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Reply<ArticleView>> {
    let article = state
        .articles
        .by_slug(&slug)
        .await?
        .ok_or_else(|| Error::not_found::<Article>(&slug))?;
    Ok(envelope::success(ArticleView::from(article), SUCCESS, StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/news/{id}/related",
    tag = "news",
    summary = "List related articles",
    description = "Other published articles from the same category.",
    params(("id" = String, Path, description = "Article ID"), LimitQuery),
    responses(
        (status = 200, description = "Related articles", body = Envelope<Vec<ArticleView>>),
        (status = 404, description = "Article not found"),
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn related(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Reply<Vec<ArticleView>>> {
    let article_id = parse_id(&id).ok_or_else(|| Error::not_found::<Article>(&id))?;
    let articles = state
        .articles
        .related(article_id, query.limit_or(DEFAULT_RELATED_LIMIT))
        .await?;
    Ok(envelope::success(views(articles), SUCCESS, StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/admin/news/{id}/toggle-featured",
    tag = "news",
    summary = "Flip the featured flag of an article",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Updated article", body = Envelope<ArticleView>),
        (status = 404, description = "Article not found"),
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn toggle_featured(State(state): State<AppState>, Path(id): Path<String>) -> Result<Reply<ArticleView>> {
    let article_id = parse_id(&id).ok_or_else(|| Error::not_found::<Article>(&id))?;
    let article = state.articles.toggle_featured(article_id).await?;
    Ok(envelope::success(
        ArticleView::from(article),
        "Featured status updated successfully",
        StatusCode::OK,
    ))
}
