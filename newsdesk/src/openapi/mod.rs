//! OpenAPI documentation for the News API.
//!
//! [`ApiDoc`] covers the public reader endpoints under `/api/v1` and the admin CRUD surface
//! under `/api/v1/admin`. The admin routes are documented through stubs in [`resources`].

mod extra_types;
mod resources;

use utoipa::OpenApi;

use crate::api;
use crate::db::models::Status;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::articles::published,
        api::handlers::articles::featured,
        api::handlers::articles::popular,
        api::handlers::articles::archive,
        api::handlers::articles::by_slug,
        api::handlers::articles::related,
        api::handlers::articles::toggle_featured,
        api::handlers::categories::active,
        api::handlers::categories::tree,
        api::handlers::categories::with_news_count,
        api::handlers::categories::by_slug,
        api::handlers::comments::approved,
        resources::list_articles,
        resources::create_article,
        resources::get_article,
        resources::update_article,
        resources::delete_article,
        resources::bulk_delete_articles,
        resources::toggle_article_status,
        resources::list_categories,
        resources::create_category,
        resources::get_category,
        resources::update_category,
        resources::delete_category,
        resources::bulk_delete_categories,
        resources::toggle_category_status,
        resources::list_comments,
        resources::create_comment,
        resources::get_comment,
        resources::update_comment,
        resources::delete_comment,
        resources::bulk_delete_comments,
        resources::toggle_comment_status,
    ),
    components(schemas(
        Status,
        api::models::articles::ArticleCreate,
        api::models::articles::ArticleUpdate,
        api::models::articles::ArticleView,
        api::models::articles::ArticleMeta,
        api::models::categories::CategoryCreate,
        api::models::categories::CategoryUpdate,
        api::models::categories::CategoryView,
        api::models::categories::CategoryMeta,
        api::models::comments::CommentCreate,
        api::models::comments::CommentUpdate,
        api::models::comments::CommentView,
        api::models::pagination::PageMeta,
        api::models::pagination::PageLinks,
        api::handlers::categories::CategoryWithNews,
        extra_types::BulkDeleteRequest,
        extra_types::BulkDeleteResult,
        extra_types::ErrorEnvelope,
    )),
    servers((url = "/api/v1")),
    tags(
        (name = "news", description = "News articles. Admin routes manage every article; public routes only ever return published ones (status active or published, publish time reached)."),
        (name = "categories", description = "Hierarchical article categories."),
        (name = "comments", description = "Reader comments on articles. New comments wait for moderation."),
    ),
    info(
        title = "Newsdesk API",
        version = "1.0.0",
        description = "CRUD and reader API for news articles, categories and comments.

## Responses

Every response uses the same envelope:

```json
{
  \"success\": true,
  \"message\": \"Resource retrieved successfully\",
  \"data\": { }
}
```

Validation failures answer `422` and add an `errors` object mapping field names to messages.",
    ),
)]
pub struct ApiDoc;
