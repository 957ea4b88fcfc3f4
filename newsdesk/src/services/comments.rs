use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::{Operation, Service, clear_blank, id_field, is_blank};
use crate::db::{
    handlers::{Records, Repository},
    models::{Fields, Status, articles::Article, comments::Comment, paging::SortDirection},
    store::{Criterion, Query},
};
use crate::errors::{Error, Result};
use crate::types::{ArticleId, CommentId, abbrev_uuid};

/// An approved top-level comment and its approved replies, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

#[derive(Clone)]
pub struct CommentService {
    comments: Records<Comment>,
    articles: Records<Article>,
}

impl CommentService {
    pub fn new(comments: Records<Comment>, articles: Records<Article>) -> Self {
        Self { comments, articles }
    }

    /// Approved discussion of one article.
    #[instrument(skip(self), fields(news_id = %abbrev_uuid(&news_id)), err)]
    pub async fn approved(&self, news_id: ArticleId) -> Result<Vec<CommentThread>> {
        let approved = || {
            Query::new()
                .filter(Criterion::eq("news_id", news_id.to_string()))
                .filter(Criterion::eq("status", Status::Active.as_str()))
                .sort_by("created_at", SortDirection::Asc)
        };

        let top = self
            .comments
            .search(&approved().filter(Criterion::eq("parent_id", Value::Null)))
            .await?;
        if top.is_empty() {
            return Ok(Vec::new());
        }

        let replies = self
            .comments
            .search(&approved().filter(Criterion::one_of("parent_id", top.iter().map(|c| c.id.to_string()))))
            .await?;

        Ok(top
            .into_iter()
            .map(|comment| {
                let replies = replies
                    .iter()
                    .filter(|reply| reply.parent_id == Some(comment.id))
                    .cloned()
                    .collect();
                CommentThread { comment, replies }
            })
            .collect())
    }

    async fn check_references(&self, data: &Fields, news_id: Option<ArticleId>, own_id: Option<CommentId>) -> Result<()> {
        if let Some(news_id) = id_field(data, "news_id")? {
            if !self.articles.exists(news_id).await? {
                return Err(Error::rule("Selected news does not exist."));
            }
        }

        let Some(parent_id) = id_field(data, "parent_id")? else {
            return Ok(());
        };
        if own_id == Some(parent_id) {
            return Err(Error::rule("A comment cannot reply to itself."));
        }
        let parent = self
            .comments
            .find(parent_id)
            .await?
            .ok_or_else(|| Error::rule("Selected parent comment does not exist."))?;
        let news_id = id_field(data, "news_id")?.or(news_id);
        if news_id != Some(parent.news_id) {
            return Err(Error::rule("A reply must belong to the same news as its parent."));
        }
        Ok(())
    }
}

#[async_trait]
impl Service<Comment> for CommentService {
    fn repository(&self) -> &Records<Comment> {
        &self.comments
    }

    async fn validate_data(&self, mut data: Fields, operation: Operation<'_, Comment>) -> Result<Fields> {
        clear_blank(&mut data, "parent_id");

        match operation {
            Operation::Create => {
                if is_blank(&data, "news_id") {
                    return Err(Error::rule("The news_id field is required."));
                }
                self.check_references(&data, None, None).await?;
                if is_blank(&data, "status") {
                    data.insert("status".to_string(), Value::String(Status::Pending.as_str().to_string()));
                }
            }
            Operation::Update(current) => {
                self.check_references(&data, Some(current.news_id), Some(current.id)).await?;
            }
        }

        Ok(data)
    }
}
