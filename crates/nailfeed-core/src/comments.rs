//! Comment thread of one post: paged loading, threaded replies and the
//! optimistic create/edit/delete protocol.
//!
//! Locks are never held across a request. A failed create removes its
//! optimistic entry; every other failed mutation falls back to a full reload
//! so local state converges on the server's.

use std::collections::HashSet;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use nailfeed_types::models::TEMP_ID_PREFIX;
use nailfeed_types::{Author, Comment, Media, Notice, Page, ReportReason, UploadedMedia};

use crate::error::{FeedError, Result};
use crate::reporting;
use crate::services::{Attachment, CommentInput, Services};
use crate::session::Viewer;
use crate::tree;
use crate::validation::ContentValidator;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// The comment box: what the viewer is typing and what it applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDraft {
    pub content: String,
    /// Server id of the comment being replied to.
    pub reply_to: Option<u64>,
    pub attachment: Option<Attachment>,
    /// Server id of the comment being edited.
    pub editing: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadState {
    pub comments: Vec<Comment>,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub total: u64,
    /// Creates sent but not yet settled. Already counted in `total`.
    pub pending_creates: u64,
    pub scroll_offset: f64,
    pub draft: CommentDraft,
}

pub type CountListener = Box<dyn Fn(u64) + Send + Sync>;

pub struct CommentThread {
    post_id: String,
    page_size: u32,
    services: Services,
    validator: ContentValidator,
    state: Mutex<ThreadState>,
    on_count_change: Option<CountListener>,
}

impl CommentThread {
    pub fn new(post_id: impl Into<String>, services: Services) -> Self {
        Self {
            post_id: post_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            services,
            validator: ContentValidator::default(),
            state: Mutex::new(ThreadState {
                page: 1,
                ..Default::default()
            }),
            on_count_change: None,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_validator(mut self, validator: ContentValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Called with the new total whenever a mutation settles and changes it.
    pub fn on_count_change(mut self, listener: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.on_count_change = Some(Box::new(listener));
        self
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn snapshot(&self) -> ThreadState {
        self.state.lock().clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state.lock().comments.clone()
    }

    pub fn total(&self) -> u64 {
        self.state.lock().total
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    pub fn find(&self, comment_id: u64) -> Option<Comment> {
        let state = self.state.lock();
        tree::find(&state.comments, |c| c.id == Some(comment_id)).cloned()
    }

    // -- Draft --

    pub fn draft(&self) -> CommentDraft {
        self.state.lock().draft.clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.state.lock().draft.content = content.into();
    }

    pub fn reply_to(&self, parent_id: Option<u64>) {
        let mut state = self.state.lock();
        state.draft.reply_to = parent_id;
        state.draft.editing = None;
    }

    pub fn attach(&self, attachment: Option<Attachment>) {
        self.state.lock().draft.attachment = attachment;
    }

    /// Put an existing comment into the box for editing. Returns false if it is not held.
    pub fn start_edit(&self, comment_id: u64) -> bool {
        let mut state = self.state.lock();
        let Some(content) = tree::find(&state.comments, |c| c.id == Some(comment_id))
            .map(|c| c.content.clone())
        else {
            return false;
        };
        state.draft = CommentDraft {
            content,
            editing: Some(comment_id),
            ..Default::default()
        };
        true
    }

    pub fn clear_draft(&self) {
        self.state.lock().draft = CommentDraft::default();
    }

    pub fn set_scroll_offset(&self, offset: f64) {
        self.state.lock().scroll_offset = offset;
    }

    // -- Loading --

    /// Fetch `page`. With `reset` the held list is replaced; otherwise new
    /// comments are appended, skipping any documentId already held.
    pub async fn load_comments(&self, page: u32, reset: bool) -> Result<()> {
        let page = if reset { 1 } else { page.max(1) };
        {
            let mut state = self.state.lock();
            if state.loading && !reset {
                debug!("Comments of {} already loading", self.post_id);
                return Ok(());
            }
            state.loading = true;
        }

        let fetched = self
            .services
            .comments
            .get_comments(&self.post_id, page, self.page_size)
            .await;

        let mut state = self.state.lock();
        state.loading = false;
        match fetched {
            Ok(result) => {
                merge_page(&mut state, result, page, reset);
                debug!(
                    "Comments of {}: page {} held, {} total, more: {}",
                    self.post_id, state.page, state.total, state.has_more
                );
                Ok(())
            }
            Err(FeedError::AuthenticationRequired) => {
                // Logged-out view, not an error.
                debug!("Comments of {} need a viewer; showing none", self.post_id);
                state.comments.clear();
                state.page = 1;
                state.has_more = false;
                state.total = 0;
                Ok(())
            }
            Err(e) => {
                drop(state);
                warn!("Loading comments of {} failed: {}", self.post_id, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not load comments. {}", e.user_message())));
                Err(e)
            }
        }
    }

    /// Infinite-scroll hook for the sentinel below the list. Returns whether a page was requested.
    pub async fn on_sentinel_visible(&self) -> Result<bool> {
        let next = {
            let state = self.state.lock();
            if !state.has_more || state.loading {
                return Ok(false);
            }
            state.page + 1
        };
        self.load_comments(next, false).await?;
        Ok(true)
    }

    /// Reload from page 1, keeping the list's scroll offset.
    pub async fn reload(&self) -> Result<()> {
        let offset = self.state.lock().scroll_offset;
        let result = self.load_comments(1, true).await;
        self.state.lock().scroll_offset = offset;
        result
    }

    /// Ask the backend for the authoritative total.
    pub async fn refresh_total(&self) -> Result<u64> {
        let total = self.services.comments.count_total_comments(&self.post_id).await?;
        self.state.lock().total = total;
        self.emit_count(total);
        Ok(total)
    }

    // -- Mutations --

    /// Send the current draft: a new comment, a reply, or an edit.
    pub async fn submit_comment(&self) -> Result<Comment> {
        let viewer = match self.services.session.require_viewer() {
            Ok(viewer) => viewer,
            Err(e) => {
                self.services.notifier.notify(Notice::login_required("comment"));
                return Err(e);
            }
        };

        let draft = self.draft();
        if let Err(e) = self.validator.check(&draft.content, draft.attachment.is_some()) {
            self.services.notifier.notify(Notice::error(e.user_message()));
            return Err(e);
        }

        if let Some(comment_id) = draft.editing {
            return self.submit_edit(comment_id, draft).await;
        }

        if let Some(parent_id) = draft.reply_to {
            if self.find(parent_id).is_none() {
                return Err(self.stale(&format!("reply target {} not held", parent_id)).await);
            }
        }

        let media = self.upload(draft.attachment.as_ref()).await?;

        let temp_id = format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4());
        let content = draft.content.trim().to_string();
        let optimistic = optimistic_comment(&temp_id, &viewer, &content, draft.reply_to, media.as_ref());
        let placed = {
            let mut state = self.state.lock();
            let placed = match draft.reply_to {
                None => {
                    state.comments.insert(0, optimistic);
                    true
                }
                Some(parent_id) => {
                    tree::insert_under(&mut state.comments, |c| c.id == Some(parent_id), optimistic).is_ok()
                }
            };
            if placed {
                state.total += 1;
                state.pending_creates += 1;
                state.draft = CommentDraft::default();
            }
            placed
        };
        if !placed {
            // A reload during the upload dropped the parent.
            let parent_id = draft.reply_to.unwrap_or_default();
            return Err(self.stale(&format!("reply target {} gone after upload", parent_id)).await);
        }
        debug!("Optimistic comment {} on {}", temp_id, self.post_id);

        let input = CommentInput {
            content,
            parent_id: draft.reply_to,
            attachment: media,
        };
        match self.services.comments.add_comment(&self.post_id, &input).await {
            Ok(created) => {
                let total = {
                    let mut state = self.state.lock();
                    state.pending_creates = state.pending_creates.saturating_sub(1);
                    if replace_pending(&mut state.comments, &temp_id, created.clone()) {
                        // The page that brought it in already counted it.
                        state.total = state.total.saturating_sub(1);
                    }
                    state.total
                };
                info!("Comment {} posted on {}", created.document_id, self.post_id);
                self.emit_count(total);
                self.services.notifier.notify(Notice::success("Comment posted"));
                Ok(created)
            }
            Err(e) => {
                {
                    let mut state = self.state.lock();
                    tree::remove(&mut state.comments, |c| c.document_id == temp_id);
                    state.pending_creates = state.pending_creates.saturating_sub(1);
                    state.total = state.total.saturating_sub(1);
                }
                warn!("Posting comment on {} failed: {}", self.post_id, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not post your comment. {}", e.user_message())));
                Err(e)
            }
        }
    }

    async fn submit_edit(&self, comment_id: u64, draft: CommentDraft) -> Result<Comment> {
        let Some(original) = self.find(comment_id) else {
            return Err(self.stale(&format!("edit target {} not held", comment_id)).await);
        };

        let media = self.upload(draft.attachment.as_ref()).await?;
        let content = draft.content.trim().to_string();
        {
            let mut state = self.state.lock();
            if let Some(comment) = tree::find_mut(&mut state.comments, |c| c.id == Some(comment_id)) {
                comment.content = content.clone();
                if let Some(media) = &media {
                    comment.attachment = Some(media_ref(media));
                }
            }
            state.draft = CommentDraft::default();
        }

        let input = CommentInput {
            content,
            parent_id: original.thread_of,
            attachment: media,
        };
        match self
            .services
            .comments
            .update_comment(&self.post_id, comment_id, &input)
            .await
        {
            Ok(updated) => {
                {
                    let mut state = self.state.lock();
                    if let Some(comment) =
                        tree::find_mut(&mut state.comments, |c| c.id == Some(comment_id))
                    {
                        let children = std::mem::take(&mut comment.children);
                        *comment = updated.clone();
                        if comment.children.is_empty() {
                            comment.children = children;
                        }
                    }
                }
                info!("Comment {} on {} updated", comment_id, self.post_id);
                self.services.notifier.notify(Notice::success("Comment updated"));
                if let Err(e) = self.reload().await {
                    warn!("Reload after edit of {} failed: {}", comment_id, e);
                }
                Ok(updated)
            }
            Err(e) => {
                {
                    let mut state = self.state.lock();
                    if let Some(comment) =
                        tree::find_mut(&mut state.comments, |c| c.id == Some(comment_id))
                    {
                        *comment = original;
                    }
                }
                warn!("Editing comment {} failed: {}", comment_id, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not update your comment. {}", e.user_message())));
                if let Err(reload_err) = self.reload().await {
                    warn!("Reload after failed edit failed: {}", reload_err);
                }
                Err(e)
            }
        }
    }

    /// Delete one of the viewer's comments. The backend wants the author id,
    /// which is read from the held tree.
    pub async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        if !self.services.session.is_authenticated() {
            self.services.notifier.notify(Notice::login_required("delete comments"));
            return Err(FeedError::AuthenticationRequired);
        }

        let author_id = self.find(comment_id).and_then(|c| c.author_id());
        let Some(author_id) = author_id else {
            return Err(self.stale(&format!("delete target {} not held", comment_id)).await);
        };

        match self
            .services
            .comments
            .delete_comment(&self.post_id, comment_id, author_id)
            .await
        {
            Ok(()) => {
                let total = {
                    let mut state = self.state.lock();
                    if let Some(removed) = tree::remove(&mut state.comments, |c| c.id == Some(comment_id)) {
                        let gone = 1 + tree::count(&removed.children) as u64;
                        state.total = state.total.saturating_sub(gone);
                    }
                    state.total
                };
                info!("Comment {} on {} deleted", comment_id, self.post_id);
                self.emit_count(total);
                self.services.notifier.notify(Notice::success("Comment deleted"));
                Ok(())
            }
            Err(e) => {
                warn!("Deleting comment {} failed: {}", comment_id, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not delete the comment. {}", e.user_message())));
                if let Err(reload_err) = self.reload().await {
                    warn!("Reload after failed delete failed: {}", reload_err);
                }
                Err(e)
            }
        }
    }

    /// Report a comment. `reason` outside the known set is sent as `OTHER`.
    pub async fn report_comment(&self, comment_id: u64, reason: &str) -> Result<()> {
        let content = self.find(comment_id).map(|c| c.content).unwrap_or_default();
        reporting::report_comment(
            &self.services,
            &self.post_id,
            comment_id,
            ReportReason::from_str_lossy(reason),
            &content,
        )
        .await
    }

    // -- Helpers --

    async fn upload(&self, attachment: Option<&Attachment>) -> Result<Option<UploadedMedia>> {
        let Some(file) = attachment else {
            return Ok(None);
        };
        match self.services.uploads.upload(file).await {
            Ok(media) => {
                debug!("Uploaded {} as media {}", file.file_name, media.id);
                Ok(Some(media))
            }
            Err(e) => {
                let e = match e {
                    FeedError::Upload(_) => e,
                    other => FeedError::Upload(other.to_string()),
                };
                warn!("Attachment upload for {} failed: {}", self.post_id, e);
                self.services.notifier.notify(Notice::error(e.user_message()));
                Err(e)
            }
        }
    }

    /// Local tree does not know the target: reload and tell the caller to retry.
    async fn stale(&self, what: &str) -> FeedError {
        info!("Comments of {} are stale ({}); reloading", self.post_id, what);
        if let Err(e) = self.reload().await {
            warn!("Reload of stale comments failed: {}", e);
        }
        let err = FeedError::CommentRefreshed;
        self.services.notifier.notify(Notice::info(err.user_message()));
        err
    }

    fn emit_count(&self, total: u64) {
        if let Some(listener) = &self.on_count_change {
            listener(total);
        }
    }
}

fn media_ref(media: &UploadedMedia) -> Media {
    Media {
        id: media.id,
        url: media.url.clone(),
        mime: None,
        width: None,
        height: None,
        alternative_text: None,
    }
}

fn optimistic_comment(
    temp_id: &str,
    viewer: &Viewer,
    content: &str,
    parent_id: Option<u64>,
    media: Option<&UploadedMedia>,
) -> Comment {
    Comment {
        id: None,
        document_id: temp_id.to_string(),
        author: Some(Author {
            id: viewer.id,
            document_id: viewer.document_id.clone(),
            username: viewer.username.clone(),
            avatar: None,
        }),
        content: content.to_string(),
        attachment: media.map(media_ref),
        thread_of: parent_id,
        children: vec![],
        created_at: Some(Utc::now()),
        blocked: false,
        removed: false,
    }
}

/// Swap the pending entry for the server's copy in place. If a page load
/// already brought the server copy in, the pending entry is just dropped and
/// `true` is returned.
fn replace_pending(comments: &mut Vec<Comment>, temp_id: &str, created: Comment) -> bool {
    let already_held = tree::find(comments, |c| c.document_id == created.document_id).is_some();
    if already_held {
        tree::remove(comments, |c| c.document_id == temp_id);
        return true;
    }
    if let Some(slot) = tree::find_mut(comments, |c| c.document_id == temp_id) {
        *slot = created;
    }
    false
}

/// Fold a fetched page into the held state. Creates still in flight are
/// added on top of the fetched total.
fn merge_page(state: &mut ThreadState, result: Page<Comment>, page: u32, reset: bool) {
    if reset {
        state.comments = result.data;
    } else {
        let mut held: HashSet<String> = tree::iter(&state.comments)
            .map(|c| c.document_id.clone())
            .collect();
        let fresh = dedup_against(&mut held, result.data);
        state.comments.extend(fresh);
    }
    state.page = page;

    match result.pagination {
        Some(pagination) => {
            state.has_more = pagination.has_more();
            state.total = pagination.total + state.pending_creates;
        }
        None => {
            state.has_more = false;
            let settled = tree::iter(&state.comments).filter(|c| !c.is_pending()).count() as u64;
            state.total = settled + state.pending_creates;
        }
    }
}

/// Drop every fetched comment, at any depth, whose documentId is already in `held`.
fn dedup_against(held: &mut HashSet<String>, fetched: Vec<Comment>) -> Vec<Comment> {
    let mut fresh: Vec<Comment> = fetched
        .into_iter()
        .filter(|c| held.insert(c.document_id.clone()))
        .collect();

    let mut stack: Vec<&mut Comment> = fresh.iter_mut().collect();
    while let Some(node) = stack.pop() {
        node.children.retain(|c| held.insert(c.document_id.clone()));
        stack.extend(node.children.iter_mut());
    }
    fresh
}
