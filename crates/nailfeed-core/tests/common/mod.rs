#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use nailfeed_core::{
    Attachment, CommentInput, CommentsService, FeedError, Notifier, PostsService, ReactionQuery,
    ReactionService, Result, Services, Session, UploadService, Viewer,
};
use nailfeed_types::{
    Author, Comment, Page, Pagination, Post, ReactionKind, ReactionPage, ReportReason,
    UploadedMedia,
};

pub const VIEWER_ID: u64 = 42;

/// Pauses one operation until the test lets it continue.
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory stand-in for every backend service.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    gates: Mutex<HashMap<&'static str, Arc<Gate>>>,
    comment_pages: Mutex<HashMap<u32, Page<Comment>>>,
    post_pages: Mutex<HashMap<u32, Page<Post>>>,
    reaction_pages: Mutex<HashMap<(u32, Option<ReactionKind>), ReactionPage>>,
    next_id: AtomicU64,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1000),
            ..Default::default()
        })
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn succeed(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn gate(&self, op: &'static str) -> Arc<Gate> {
        let gate = Arc::new(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self.gates.lock().unwrap().insert(op, gate.clone());
        gate
    }

    pub fn set_comment_page(&self, page: u32, data: Vec<Comment>, pagination: Option<Pagination>) {
        self.comment_pages
            .lock()
            .unwrap()
            .insert(page, Page { data, pagination });
    }

    pub fn set_post_page(&self, page: u32, data: Vec<Post>, pagination: Option<Pagination>) {
        self.post_pages.lock().unwrap().insert(page, Page { data, pagination });
    }

    pub fn set_reaction_page(&self, page: u32, filter: Option<ReactionKind>, result: ReactionPage) {
        self.reaction_pages.lock().unwrap().insert((page, filter), result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    async fn enter(&self, op: &'static str, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().get(op).cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(FeedError::Server {
                status: 500,
                body: format!("{} failed", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PostsService for FakeBackend {
    async fn list_posts(&self, page: u32, page_size: u32) -> Result<Page<Post>> {
        self.enter("list_posts", format!("list_posts {} {}", page, page_size)).await?;
        Ok(self
            .post_pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or(Page { data: vec![], pagination: None }))
    }

    async fn get_post(&self, document_id: &str) -> Result<Post> {
        self.enter("get_post", format!("get_post {}", document_id)).await?;
        self.post_pages
            .lock()
            .unwrap()
            .values()
            .flat_map(|p| p.data.iter())
            .find(|p| p.document_id == document_id)
            .cloned()
            .ok_or_else(|| FeedError::NotFound(document_id.to_string()))
    }

    async fn update_post(&self, document_id: &str, description: &str) -> Result<Post> {
        self.enter("update_post", format!("update_post {}", document_id)).await?;
        let mut post = post(document_id);
        post.description = Some(description.to_string());
        Ok(post)
    }

    async fn delete_post(&self, document_id: &str) -> Result<()> {
        self.enter("delete_post", format!("delete_post {}", document_id)).await
    }
}

#[async_trait]
impl CommentsService for FakeBackend {
    async fn get_comments(&self, post_id: &str, page: u32, page_size: u32) -> Result<Page<Comment>> {
        self.enter("get_comments", format!("get_comments {} {} {}", post_id, page, page_size))
            .await?;
        Ok(self
            .comment_pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or(Page { data: vec![], pagination: None }))
    }

    async fn add_comment(&self, post_id: &str, input: &CommentInput) -> Result<Comment> {
        self.enter("add_comment", format!("add_comment {} {}", post_id, input.content))
            .await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut created = comment(id, &input.content);
        created.thread_of = input.parent_id;
        created.author = Some(author(VIEWER_ID));
        Ok(created)
    }

    async fn update_comment(&self, post_id: &str, comment_id: u64, input: &CommentInput) -> Result<Comment> {
        self.enter("update_comment", format!("update_comment {} {}", post_id, comment_id))
            .await?;
        let mut updated = comment(comment_id, &input.content);
        updated.author = Some(author(VIEWER_ID));
        Ok(updated)
    }

    async fn delete_comment(&self, post_id: &str, comment_id: u64, author_id: u64) -> Result<()> {
        self.enter(
            "delete_comment",
            format!("delete_comment {} {} {}", post_id, comment_id, author_id),
        )
        .await
    }

    async fn report_comment_abuse(
        &self,
        _post_id: &str,
        comment_id: u64,
        reason: ReportReason,
        _content: &str,
    ) -> Result<()> {
        self.enter("report", format!("report {} {:?}", comment_id, reason)).await
    }

    async fn count_total_comments(&self, post_id: &str) -> Result<u64> {
        self.enter("count", format!("count {}", post_id)).await?;
        Ok(17)
    }
}

#[async_trait]
impl ReactionService for FakeBackend {
    async fn add_reaction(&self, post_id: &str, kind: Option<ReactionKind>) -> Result<()> {
        self.enter("add_reaction", format!("add_reaction {} {:?}", post_id, kind)).await
    }

    async fn fetch_post_likes(&self, post_id: &str, query: ReactionQuery) -> Result<ReactionPage> {
        self.enter(
            "fetch_post_likes",
            format!("fetch_post_likes {} {} {:?}", post_id, query.page, query.type_filter),
        )
        .await?;
        Ok(self
            .reaction_pages
            .lock()
            .unwrap()
            .get(&(query.page, query.type_filter))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_emoji(&self, kind: ReactionKind) -> Result<String> {
        self.enter("get_emoji", format!("get_emoji {}", kind)).await?;
        Ok(format!(":{}:", kind))
    }
}

#[async_trait]
impl UploadService for FakeBackend {
    async fn upload(&self, file: &Attachment) -> Result<UploadedMedia> {
        self.enter("upload", format!("upload {}", file.file_name)).await?;
        Ok(UploadedMedia {
            id: 77,
            url: format!("/uploads/{}", file.file_name),
        })
    }
}

pub fn viewer() -> Viewer {
    Viewer {
        id: VIEWER_ID,
        document_id: Some("viewer-doc".into()),
        username: "polish_pro".into(),
        jwt: "jwt-token".into(),
    }
}

pub fn services(backend: &Arc<FakeBackend>, signed_in: bool) -> Services {
    let session = if signed_in {
        Session::signed_in(viewer())
    } else {
        Session::anonymous()
    };
    Services {
        posts: backend.clone(),
        comments: backend.clone(),
        reactions: backend.clone(),
        uploads: backend.clone(),
        session: Arc::new(session),
        notifier: Notifier::new(),
    }
}

pub fn author(id: u64) -> Author {
    Author {
        id,
        document_id: Some(format!("user-{}", id)),
        username: format!("user{}", id),
        avatar: None,
    }
}

pub fn comment(id: u64, content: &str) -> Comment {
    Comment {
        id: Some(id),
        document_id: format!("c-{}", id),
        author: Some(author(id + 100)),
        content: content.to_string(),
        attachment: None,
        thread_of: None,
        children: vec![],
        created_at: None,
        blocked: false,
        removed: false,
    }
}

pub fn reply(id: u64, parent: u64, content: &str) -> Comment {
    let mut c = comment(id, content);
    c.thread_of = Some(parent);
    c
}

pub fn post(document_id: &str) -> Post {
    Post {
        id: 1,
        document_id: document_id.to_string(),
        author: Some(author(7)),
        description: Some("chrome french tips".into()),
        media: vec![],
        likes_count: 0,
        comments_count: 0,
        reaction_summary: Default::default(),
        created_at: None,
    }
}

pub fn pagination(page: u32, page_count: u32, total: u64) -> Pagination {
    Pagination {
        page,
        page_size: 10,
        page_count,
        total,
    }
}
