use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::envelope::{self, Envelope, Reply, SUCCESS};
use crate::api::models::{
    articles::ArticleView,
    categories::CategoryView,
    pagination::{CollectionView, PageQuery},
};
use crate::db::models::categories::Category;
use crate::errors::{Error, Result};

/// A category together with a page of its published articles.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithNews {
    pub category: CategoryView,
    pub news: CollectionView<ArticleView>,
}

#[utoipa::path(
    get,
    path = "/categories/active",
    tag = "categories",
    summary = "List active categories",
    responses(
        (status = 200, description = "Active categories by sort order, then name", body = Envelope<Vec<CategoryView>>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn active(State(state): State<AppState>) -> Result<Reply<Vec<CategoryView>>> {
    let categories = state.categories.active().await?;
    Ok(envelope::success(
        categories.into_iter().map(CategoryView::from).collect(),
        SUCCESS,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/categories/tree",
    tag = "categories",
    summary = "Get the category tree",
    description = "Active root categories, each with its active children.",
    responses(
        (status = 200, description = "Category tree", body = Envelope<Vec<CategoryView>>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn tree(State(state): State<AppState>) -> Result<Reply<Vec<CategoryView>>> {
    let branches = state.categories.tree().await?;
    Ok(envelope::success(
        branches.into_iter().map(CategoryView::from).collect(),
        SUCCESS,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/categories/with-news-count",
    tag = "categories",
    summary = "List active categories with article counts",
    responses(
        (status = 200, description = "Active categories with their published article count", body = Envelope<Vec<CategoryView>>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn with_news_count(State(state): State<AppState>) -> Result<Reply<Vec<CategoryView>>> {
    let counted = state.categories.with_news_count().await?;
    Ok(envelope::success(
        counted.into_iter().map(CategoryView::from).collect(),
        SUCCESS,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/categories/slug/{slug}",
    tag = "categories",
    summary = "Get an active category by slug with its articles",
    params(("slug" = String, Path, description = "Category slug"), PageQuery),
    responses(
        (status = 200, description = "Category and a page of its published articles", body = Envelope<CategoryWithNews>),
        (status = 404, description = "No active category with this slug"),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn by_slug(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Reply<CategoryWithNews>> {
    let (category, news) = state
        .categories
        .by_slug_with_news(&slug, query.page(), query.per_page())
        .await?
        .ok_or_else(|| Error::not_found::<Category>(&slug))?;

    Ok(envelope::success(
        CategoryWithNews {
            category: CategoryView::from(category),
            news: CollectionView::new(news, &uri),
        },
        SUCCESS,
        StatusCode::OK,
    ))
}
