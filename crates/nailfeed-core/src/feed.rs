use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use nailfeed_types::{Notice, Page, Post};

use crate::comments::CommentThread;
use crate::error::{FeedError, Result};
use crate::reaction_listing::ReactionListing;
use crate::reactions::ReactionController;
use crate::services::Services;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A post in the feed with the controller that owns its reaction state.
#[derive(Clone)]
pub struct FeedItem {
    pub post: Post,
    pub reactions: Arc<ReactionController>,
}

#[derive(Default)]
struct FeedInner {
    items: Vec<FeedItem>,
    page: u32,
    has_more: bool,
    loading: bool,
    total: u64,
}

/// The paged post feed.
pub struct Feed {
    services: Services,
    page_size: u32,
    inner: Mutex<FeedInner>,
}

impl Feed {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            page_size: DEFAULT_PAGE_SIZE,
            inner: Mutex::new(FeedInner {
                page: 1,
                ..Default::default()
            }),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn posts(&self) -> Vec<Post> {
        self.inner.lock().items.iter().map(|i| i.post.clone()).collect()
    }

    pub fn item(&self, document_id: &str) -> Option<FeedItem> {
        self.inner
            .lock()
            .items
            .iter()
            .find(|i| i.post.document_id == document_id)
            .cloned()
    }

    pub fn reactions(&self, document_id: &str) -> Option<Arc<ReactionController>> {
        self.item(document_id).map(|i| i.reactions)
    }

    pub fn has_more(&self) -> bool {
        self.inner.lock().has_more
    }

    pub fn total(&self) -> u64 {
        self.inner.lock().total
    }

    /// Same merge rules as comments: `reset` replaces, otherwise documentIds
    /// already held are skipped. Held posts keep their reaction controller.
    pub async fn load_posts(&self, page: u32, reset: bool) -> Result<()> {
        let page = if reset { 1 } else { page.max(1) };
        {
            let mut inner = self.inner.lock();
            if inner.loading && !reset {
                return Ok(());
            }
            inner.loading = true;
        }

        let fetched = self.services.posts.list_posts(page, self.page_size).await;

        let mut inner = self.inner.lock();
        inner.loading = false;
        match fetched {
            Ok(result) => {
                self.merge(&mut inner, result, page, reset);
                debug!("Feed: page {} held, {} posts", inner.page, inner.items.len());
                Ok(())
            }
            Err(e) => {
                drop(inner);
                warn!("Loading feed page {} failed: {}", page, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not load posts. {}", e.user_message())));
                Err(e)
            }
        }
    }

    pub async fn load_next_page(&self) -> Result<bool> {
        let next = {
            let inner = self.inner.lock();
            if !inner.has_more || inner.loading {
                return Ok(false);
            }
            inner.page + 1
        };
        self.load_posts(next, false).await?;
        Ok(true)
    }

    /// Fetch one post and fold it into the feed.
    pub async fn get_post(&self, document_id: &str) -> Result<Post> {
        let post = self.services.posts.get_post(document_id).await?;
        self.upsert(post.clone());
        Ok(post)
    }

    pub async fn update_post(&self, document_id: &str, description: &str) -> Result<Post> {
        if !self.services.session.is_authenticated() {
            self.services.notifier.notify(Notice::login_required("edit posts"));
            return Err(FeedError::AuthenticationRequired);
        }
        match self.services.posts.update_post(document_id, description).await {
            Ok(post) => {
                info!("Post {} updated", document_id);
                self.upsert(post.clone());
                self.services.notifier.notify(Notice::success("Post updated"));
                Ok(post)
            }
            Err(e) => {
                warn!("Updating post {} failed: {}", document_id, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not update the post. {}", e.user_message())));
                Err(e)
            }
        }
    }

    pub async fn delete_post(&self, document_id: &str) -> Result<()> {
        if !self.services.session.is_authenticated() {
            self.services.notifier.notify(Notice::login_required("delete posts"));
            return Err(FeedError::AuthenticationRequired);
        }
        match self.services.posts.delete_post(document_id).await {
            Ok(()) => {
                let mut inner = self.inner.lock();
                let before = inner.items.len();
                inner.items.retain(|i| i.post.document_id != document_id);
                if inner.items.len() < before {
                    inner.total = inner.total.saturating_sub(1);
                }
                drop(inner);
                info!("Post {} deleted", document_id);
                self.services.notifier.notify(Notice::success("Post deleted"));
                Ok(())
            }
            Err(e) => {
                warn!("Deleting post {} failed: {}", document_id, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not delete the post. {}", e.user_message())));
                Err(e)
            }
        }
    }

    pub fn set_comment_count(&self, document_id: &str, count: u64) {
        let mut inner = self.inner.lock();
        if let Some(item) = inner.items.iter_mut().find(|i| i.post.document_id == document_id) {
            item.post.comments_count = count;
        }
    }

    /// Comment thread of a post, wired to keep the post's comment count current.
    pub fn comment_thread(self: &Arc<Self>, document_id: &str) -> CommentThread {
        let feed = Arc::clone(self);
        let post_id = document_id.to_string();
        CommentThread::new(document_id, self.services.clone())
            .on_count_change(move |count| feed.set_comment_count(&post_id, count))
    }

    pub fn reaction_listing(&self, document_id: &str) -> ReactionListing {
        ReactionListing::new(document_id, self.services.clone())
    }

    fn upsert(&self, post: Post) {
        let mut inner = self.inner.lock();
        match inner
            .items
            .iter_mut()
            .find(|i| i.post.document_id == post.document_id)
        {
            Some(item) => {
                item.reactions.sync(&post);
                item.post = post;
            }
            None => {
                let reactions = Arc::new(ReactionController::for_post(&post, self.services.clone()));
                inner.items.push(FeedItem { post, reactions });
            }
        }
    }

    fn merge(&self, inner: &mut FeedInner, result: Page<Post>, page: u32, reset: bool) {
        if reset {
            let previous = std::mem::take(&mut inner.items);
            inner.items = result
                .data
                .into_iter()
                .map(|post| {
                    let reactions = match previous.iter().find(|i| i.post.document_id == post.document_id) {
                        Some(held) => {
                            held.reactions.sync(&post);
                            Arc::clone(&held.reactions)
                        }
                        None => Arc::new(ReactionController::for_post(&post, self.services.clone())),
                    };
                    FeedItem { post, reactions }
                })
                .collect();
        } else {
            let mut held: HashSet<String> = inner
                .items
                .iter()
                .map(|i| i.post.document_id.clone())
                .collect();
            for post in result.data {
                if held.insert(post.document_id.clone()) {
                    let reactions = Arc::new(ReactionController::for_post(&post, self.services.clone()));
                    inner.items.push(FeedItem { post, reactions });
                }
            }
        }
        inner.page = page;
        match result.pagination {
            Some(pagination) => {
                inner.has_more = pagination.has_more();
                inner.total = pagination.total;
            }
            None => {
                inner.has_more = false;
                inner.total = inner.items.len() as u64;
            }
        }
    }
}
