use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::AppState;
use crate::api::envelope::{self, Envelope, Reply, SUCCESS};
use crate::api::models::comments::CommentView;
use crate::db::models::articles::Article;
use crate::errors::{Error, Result};
use crate::types::parse_id;

#[utoipa::path(
    get,
    path = "/comments/approved/{news_id}",
    tag = "comments",
    summary = "List the approved discussion of an article",
    description = "Approved top-level comments, oldest first, each with its approved replies.",
    params(("news_id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Comment threads", body = Envelope<Vec<CommentView>>),
        (status = 404, description = "Malformed article ID"),
    )
)]
#[tracing::instrument(skip_all, fields(news_id = %news_id))]
pub async fn approved(State(state): State<AppState>, Path(news_id): Path<String>) -> Result<Reply<Vec<CommentView>>> {
    let article_id = parse_id(&news_id).ok_or_else(|| Error::not_found::<Article>(&news_id))?;
    let threads = state.comments.approved(article_id).await?;
    Ok(envelope::success(
        threads.into_iter().map(CommentView::from).collect(),
        SUCCESS,
        StatusCode::OK,
    ))
}
