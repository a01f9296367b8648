//! Backend collaborators. The REST client in `nailfeed-api` implements these;
//! tests substitute in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;

use nailfeed_types::{Comment, Page, Post, ReactionKind, ReactionPage, ReportReason, UploadedMedia};

use crate::error::Result;
use crate::notifier::Notifier;
use crate::session::Session;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Payload for creating or editing a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInput {
    pub content: String,
    pub parent_id: Option<u64>,
    pub attachment: Option<UploadedMedia>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionQuery {
    pub page: u32,
    pub page_size: u32,
    pub type_filter: Option<ReactionKind>,
}

#[async_trait]
pub trait PostsService: Send + Sync {
    async fn list_posts(&self, page: u32, page_size: u32) -> Result<Page<Post>>;

    async fn get_post(&self, document_id: &str) -> Result<Post>;

    async fn update_post(&self, document_id: &str, description: &str) -> Result<Post>;

    async fn delete_post(&self, document_id: &str) -> Result<()>;
}

#[async_trait]
pub trait CommentsService: Send + Sync {
    async fn get_comments(&self, post_id: &str, page: u32, page_size: u32) -> Result<Page<Comment>>;

    async fn add_comment(&self, post_id: &str, input: &CommentInput) -> Result<Comment>;

    async fn update_comment(&self, post_id: &str, comment_id: u64, input: &CommentInput) -> Result<Comment>;

    /// The backend checks ownership, so the author id travels with the request.
    async fn delete_comment(&self, post_id: &str, comment_id: u64, author_id: u64) -> Result<()>;

    async fn report_comment_abuse(
        &self,
        post_id: &str,
        comment_id: u64,
        reason: ReportReason,
        content: &str,
    ) -> Result<()>;

    async fn count_total_comments(&self, post_id: &str) -> Result<u64>;
}

#[async_trait]
pub trait ReactionService: Send + Sync {
    /// `None` removes the viewer's reaction.
    async fn add_reaction(&self, post_id: &str, kind: Option<ReactionKind>) -> Result<()>;

    async fn fetch_post_likes(&self, post_id: &str, query: ReactionQuery) -> Result<ReactionPage>;

    async fn get_emoji(&self, kind: ReactionKind) -> Result<String>;
}

#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(&self, file: &Attachment) -> Result<UploadedMedia>;
}

/// Everything a controller needs, handed in explicitly. One per application
/// session; clones share the same collaborators.
#[derive(Clone)]
pub struct Services {
    pub posts: Arc<dyn PostsService>,
    pub comments: Arc<dyn CommentsService>,
    pub reactions: Arc<dyn ReactionService>,
    pub uploads: Arc<dyn UploadService>,
    pub session: Arc<Session>,
    pub notifier: Notifier,
}
