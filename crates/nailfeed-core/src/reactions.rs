use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use nailfeed_types::{Notice, Post, ReactionCounts, ReactionKind};

use crate::error::{FeedError, Result};
use crate::services::Services;

/// Viewer-facing reaction state of one post.
///
/// `total_reactions` and `likes_count` come from different server-side
/// aggregates and are tracked independently; they are not assumed equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionState {
    pub current: Option<ReactionKind>,
    pub counts: ReactionCounts,
    pub total_reactions: u64,
    pub likes_count: u64,
}

impl ReactionState {
    pub fn from_post(post: &Post) -> Self {
        let summary = &post.reaction_summary;
        Self {
            current: summary.user_reaction,
            counts: summary.counts_by_type.clone(),
            total_reactions: summary.total,
            likes_count: post.likes_count,
        }
    }

    /// Picking the reaction already held clears it.
    pub fn resolve(&self, requested: Option<ReactionKind>) -> Option<ReactionKind> {
        if requested == self.current {
            None
        } else {
            requested
        }
    }

    /// Move the viewer's reaction to `next`, adjusting every aggregate.
    pub fn apply(&mut self, next: Option<ReactionKind>) {
        if next == self.current {
            return;
        }
        if let Some(prev) = self.current {
            self.counts.decrement(prev);
            self.total_reactions = self.total_reactions.saturating_sub(1);
            self.likes_count = self.likes_count.saturating_sub(1);
        }
        if let Some(kind) = next {
            self.counts.increment(kind);
            self.total_reactions += 1;
            self.likes_count += 1;
        }
        self.current = next;
    }
}

/// Clears the busy flag when the mutation ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the reaction state of a single post and runs the optimistic
/// toggle protocol against the backend.
pub struct ReactionController {
    post_id: String,
    state: watch::Sender<ReactionState>,
    busy: AtomicBool,
    /// Serializes toggles on this post; each one sees the settled result of the last.
    turn: Mutex<()>,
    services: Services,
}

impl ReactionController {
    pub fn new(post_id: impl Into<String>, initial: ReactionState, services: Services) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            post_id: post_id.into(),
            state,
            busy: AtomicBool::new(false),
            turn: Mutex::new(()),
            services,
        }
    }

    pub fn for_post(post: &Post, services: Services) -> Self {
        Self::new(post.document_id.clone(), ReactionState::from_post(post), services)
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn state(&self) -> ReactionState {
        self.state.borrow().clone()
    }

    /// Observers see optimistic values as soon as they are applied.
    pub fn subscribe(&self) -> watch::Receiver<ReactionState> {
        self.state.subscribe()
    }

    /// True while a toggle is in flight; front ends disable the control.
    pub fn is_reaction_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Adopt an authoritative server copy. Ignored while a toggle is in flight.
    pub fn sync(&self, post: &Post) {
        if self.is_reaction_loading() {
            debug!("Skipping reaction sync for {} during a toggle", self.post_id);
            return;
        }
        self.state.send_replace(ReactionState::from_post(post));
    }

    /// Toggle the viewer's reaction toward `requested` (`None` clears it).
    ///
    /// The local state changes before the request is sent. If the request
    /// fails, the exact pre-toggle state is restored.
    pub async fn set_reaction(&self, requested: Option<ReactionKind>) -> Result<ReactionState> {
        if !self.services.session.is_authenticated() {
            self.services.notifier.notify(Notice::login_required("react to posts"));
            return Err(FeedError::AuthenticationRequired);
        }

        let _turn = self.turn.lock().await;
        let _busy = BusyGuard::enter(&self.busy);

        let snapshot = self.state.borrow().clone();
        let next = snapshot.resolve(requested);
        self.state.send_modify(|state| state.apply(next));
        debug!(
            "Reaction on {}: {:?} -> {:?} (optimistic)",
            self.post_id, snapshot.current, next
        );

        match self.services.reactions.add_reaction(&self.post_id, next).await {
            Ok(()) => {
                info!("Reaction on {} saved as {:?}", self.post_id, next);
                Ok(self.state())
            }
            Err(e) => {
                warn!("Reaction on {} failed, rolling back: {}", self.post_id, e);
                self.state.send_replace(snapshot);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not save your reaction. {}", e.user_message())));
                Err(e)
            }
        }
    }

    /// Glyph for a reaction type, falling back to the built-in table.
    pub async fn emoji(&self, kind: ReactionKind) -> String {
        match self.services.reactions.get_emoji(kind).await {
            Ok(emoji) if !emoji.is_empty() => emoji,
            Ok(_) => kind.default_emoji().to_string(),
            Err(e) => {
                debug!("Emoji lookup for {} failed: {}", kind, e);
                kind.default_emoji().to_string()
            }
        }
    }
}
