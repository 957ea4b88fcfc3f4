//! Stub handlers documenting the admin CRUD routes.
//!
//! The routes are served by the generic [`crate::api::resource`] controller, which cannot carry
//! `#[utoipa::path]` itself; these functions exist only to describe them.

use super::extra_types::{AdminListQuery, BulkDeleteRequest, BulkDeleteResult, ErrorEnvelope};
use crate::api::{self, envelope::Envelope, models::pagination::CollectionView};

#[utoipa::path(
    get,
    path = "/admin/news",
    tag = "news",
    summary = "List articles",
    description = "Paginated, sortable and filterable. Filter keys outside the allow-list are ignored.",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Data retrieved successfully", body = Envelope<CollectionView<api::models::articles::ArticleView>>),
        (status = 400, description = "Invalid sort field or direction", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn list_articles() {}

#[utoipa::path(
    post,
    path = "/admin/news",
    tag = "news",
    summary = "Create an article",
    request_body = api::models::articles::ArticleCreate,
    responses(
        (status = 201, description = "Resource created successfully", body = Envelope<api::models::articles::ArticleView>),
        (status = 400, description = "A domain rule was violated", body = ErrorEnvelope),
        (status = 409, description = "Slug already exists", body = ErrorEnvelope),
        (status = 422, description = "Validation failed", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn create_article() {}

#[utoipa::path(
    get,
    path = "/admin/news/{id}",
    tag = "news",
    summary = "Get an article",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Resource retrieved successfully", body = Envelope<api::models::articles::ArticleView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn get_article() {}

#[utoipa::path(
    put,
    path = "/admin/news/{id}",
    tag = "news",
    summary = "Update an article",
    params(("id" = String, Path, description = "Article ID")),
    request_body = api::models::articles::ArticleUpdate,
    responses(
        (status = 200, description = "Resource updated successfully", body = Envelope<api::models::articles::ArticleView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
        (status = 422, description = "Validation failed", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn update_article() {}

#[utoipa::path(
    delete,
    path = "/admin/news/{id}",
    tag = "news",
    summary = "Delete an article",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Resource deleted successfully", body = ErrorEnvelope),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn delete_article() {}

#[utoipa::path(
    post,
    path = "/admin/news/bulk-delete",
    tag = "news",
    summary = "Delete several articles",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Number of deleted resources", body = Envelope<BulkDeleteResult>),
        (status = 400, description = "No IDs provided", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn bulk_delete_articles() {}

#[utoipa::path(
    post,
    path = "/admin/news/{id}/toggle-status",
    tag = "news",
    summary = "Flip an article between active and inactive",
    params(("id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Status updated successfully", body = Envelope<api::models::articles::ArticleView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn toggle_article_status() {}

#[utoipa::path(
    get,
    path = "/admin/categories",
    tag = "categories",
    summary = "List categories",
    description = "Paginated, sortable and filterable. Filter keys outside the allow-list are ignored.",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Data retrieved successfully", body = Envelope<CollectionView<api::models::categories::CategoryView>>),
        (status = 400, description = "Invalid sort field or direction", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn list_categories() {}

#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "categories",
    summary = "Create a category",
    request_body = api::models::categories::CategoryCreate,
    responses(
        (status = 201, description = "Resource created successfully", body = Envelope<api::models::categories::CategoryView>),
        (status = 400, description = "A domain rule was violated", body = ErrorEnvelope),
        (status = 409, description = "Slug already exists", body = ErrorEnvelope),
        (status = 422, description = "Validation failed", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn create_category() {}

#[utoipa::path(
    get,
    path = "/admin/categories/{id}",
    tag = "categories",
    summary = "Get a category",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Resource retrieved successfully", body = Envelope<api::models::categories::CategoryView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn get_category() {}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    tag = "categories",
    summary = "Update a category",
    params(("id" = String, Path, description = "Category ID")),
    request_body = api::models::categories::CategoryUpdate,
    responses(
        (status = 200, description = "Resource updated successfully", body = Envelope<api::models::categories::CategoryView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
        (status = 422, description = "Validation failed", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn update_category() {}

#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    tag = "categories",
    summary = "Delete a category",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Resource deleted successfully", body = ErrorEnvelope),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn delete_category() {}

#[utoipa::path(
    post,
    path = "/admin/categories/bulk-delete",
    tag = "categories",
    summary = "Delete several categories",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Number of deleted resources", body = Envelope<BulkDeleteResult>),
        (status = 400, description = "No IDs provided", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn bulk_delete_categories() {}

#[utoipa::path(
    post,
    path = "/admin/categories/{id}/toggle-status",
    tag = "categories",
    summary = "Flip a category between active and inactive",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Status updated successfully", body = Envelope<api::models::categories::CategoryView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn toggle_category_status() {}

#[utoipa::path(
    get,
    path = "/admin/comments",
    tag = "comments",
    summary = "List comments",
    description = "Paginated, sortable and filterable. Filter keys outside the allow-list are ignored.",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Data retrieved successfully", body = Envelope<CollectionView<api::models::comments::CommentView>>),
        (status = 400, description = "Invalid sort field or direction", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn list_comments() {}

#[utoipa::path(
    post,
    path = "/admin/comments",
    tag = "comments",
    summary = "Create a comment",
    request_body = api::models::comments::CommentCreate,
    responses(
        (status = 201, description = "Resource created successfully", body = Envelope<api::models::comments::CommentView>),
        (status = 400, description = "A domain rule was violated", body = ErrorEnvelope),
        (status = 422, description = "Validation failed", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn create_comment() {}

#[utoipa::path(
    get,
    path = "/admin/comments/{id}",
    tag = "comments",
    summary = "Get a comment",
    params(("id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Resource retrieved successfully", body = Envelope<api::models::comments::CommentView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn get_comment() {}

#[utoipa::path(
    put,
    path = "/admin/comments/{id}",
    tag = "comments",
    summary = "Update a comment",
    params(("id" = String, Path, description = "Comment ID")),
    request_body = api::models::comments::CommentUpdate,
    responses(
        (status = 200, description = "Resource updated successfully", body = Envelope<api::models::comments::CommentView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
        (status = 422, description = "Validation failed", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn update_comment() {}

#[utoipa::path(
    delete,
    path = "/admin/comments/{id}",
    tag = "comments",
    summary = "Delete a comment",
    params(("id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Resource deleted successfully", body = ErrorEnvelope),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn delete_comment() {}

#[utoipa::path(
    post,
    path = "/admin/comments/bulk-delete",
    tag = "comments",
    summary = "Delete several comments",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Number of deleted resources", body = Envelope<BulkDeleteResult>),
        (status = 400, description = "No IDs provided", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn bulk_delete_comments() {}

#[utoipa::path(
    post,
    path = "/admin/comments/{id}/toggle-status",
    tag = "comments",
    summary = "Flip a comment between active and inactive",
    params(("id" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Status updated successfully", body = Envelope<api::models::comments::CommentView>),
        (status = 404, description = "Resource not found", body = ErrorEnvelope),
    )
)]
#[allow(unused)]
fn toggle_comment_status() {}
