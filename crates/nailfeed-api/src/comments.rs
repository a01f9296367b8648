use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use nailfeed_core::{CommentInput, CommentsService, Result};
use nailfeed_types::api::{
    CommentCount, NewCommentRequest, ReportCommentRequest, UpdateCommentRequest,
};
use nailfeed_types::{Comment, Page, ReportReason};

use crate::client::{Payload, StrapiClient};
use crate::query::StrapiQuery;

/// Comments plugin collection of one post.
pub(crate) fn thread_path(post_id: &str) -> String {
    format!("/api/comments/api::post.post:{}", post_id)
}

pub(crate) fn comment_path(post_id: &str, comment_id: u64) -> String {
    format!("{}/comment/{}", thread_path(post_id), comment_id)
}

#[async_trait]
impl CommentsService for StrapiClient {
    async fn get_comments(&self, post_id: &str, page: u32, page_size: u32) -> Result<Page<Comment>> {
        let query = StrapiQuery::new()
            .page(page, page_size)
            .sort("createdAt:desc");
        debug!("Fetching comments of {} (page {})", post_id, page);
        let payload: Payload<Vec<Comment>> = self
            .json(self.request(Method::GET, &thread_path(post_id)).query(query.pairs()))
            .await?;
        let (data, meta) = payload.into_parts();
        Ok(Page {
            data,
            pagination: meta.pagination,
        })
    }

    async fn add_comment(&self, post_id: &str, input: &CommentInput) -> Result<Comment> {
        let body = NewCommentRequest {
            content: input.content.clone(),
            thread_of: input.parent_id,
            attachment: input.attachment.as_ref().map(|m| m.id),
        };
        let payload: Payload<Comment> = self
            .json(self.request(Method::POST, &thread_path(post_id)).json(&body))
            .await?;
        Ok(payload.into_data())
    }

    async fn update_comment(&self, post_id: &str, comment_id: u64, input: &CommentInput) -> Result<Comment> {
        let body = UpdateCommentRequest {
            content: input.content.clone(),
            attachment: input.attachment.as_ref().map(|m| m.id),
        };
        let payload: Payload<Comment> = self
            .json(
                self.request(Method::PUT, &comment_path(post_id, comment_id))
                    .json(&body),
            )
            .await?;
        Ok(payload.into_data())
    }

    async fn delete_comment(&self, post_id: &str, comment_id: u64, author_id: u64) -> Result<()> {
        self.send(
            self.request(Method::DELETE, &comment_path(post_id, comment_id))
                .query(&[("authorId", author_id)]),
        )
        .await?;
        Ok(())
    }

    async fn report_comment_abuse(
        &self,
        post_id: &str,
        comment_id: u64,
        reason: ReportReason,
        content: &str,
    ) -> Result<()> {
        let body = ReportCommentRequest {
            reason,
            content: content.to_string(),
        };
        let path = format!("{}/report-abuse", comment_path(post_id, comment_id));
        self.send(self.request(Method::POST, &path).json(&body)).await?;
        Ok(())
    }

    async fn count_total_comments(&self, post_id: &str) -> Result<u64> {
        let path = format!("{}/count", thread_path(post_id));
        let payload: Payload<CommentCount> = self.json(self.request(Method::GET, &path)).await?;
        Ok(payload.into_data().count)
    }
}
