use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, warn};

use nailfeed_types::{Notice, ReactionCounts, ReactionKind, ReactionPage, ReactionUser};

use crate::error::Result;
use crate::services::{ReactionQuery, Services};

/// Distance from the bottom, in pixels, at which the next page is requested.
pub const SCROLL_THRESHOLD_PX: f64 = 100.0;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionTab {
    All,
    Kind(ReactionKind),
}

impl ReactionTab {
    fn filter(self) -> Option<ReactionKind> {
        match self {
            Self::All => None,
            Self::Kind(kind) => Some(kind),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabState {
    pub users: Vec<ReactionUser>,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub loaded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollPosition {
    pub fn near_bottom(&self, threshold: f64) -> bool {
        self.scroll_height - (self.scroll_top + self.client_height) <= threshold
    }
}

struct ListingInner {
    active: ReactionTab,
    tabs: HashMap<ReactionTab, TabState>,
    counts: ReactionCounts,
    total: u64,
}

/// The "who reacted" list of a post, one lazily paged list per tab.
pub struct ReactionListing {
    post_id: String,
    page_size: u32,
    services: Services,
    inner: Mutex<ListingInner>,
}

impl ReactionListing {
    pub fn new(post_id: impl Into<String>, services: Services) -> Self {
        Self {
            post_id: post_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            services,
            inner: Mutex::new(ListingInner {
                active: ReactionTab::All,
                tabs: HashMap::new(),
                counts: ReactionCounts::default(),
                total: 0,
            }),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Load the "all" tab.
    pub async fn open(&self) -> Result<()> {
        self.select_tab(ReactionTab::All).await
    }

    /// "All" first, then one tab per type that has reactions. Counts come
    /// from the unfiltered listing only.
    pub fn tabs(&self) -> Vec<(ReactionTab, u64)> {
        let inner = self.inner.lock();
        let mut tabs = vec![(ReactionTab::All, inner.total)];
        tabs.extend(
            inner
                .counts
                .present()
                .into_iter()
                .map(|kind| (ReactionTab::Kind(kind), inner.counts.get(kind))),
        );
        tabs
    }

    pub fn counts(&self) -> ReactionCounts {
        self.inner.lock().counts.clone()
    }

    pub fn active_tab(&self) -> ReactionTab {
        self.inner.lock().active
    }

    pub fn tab(&self, tab: ReactionTab) -> TabState {
        self.inner.lock().tabs.get(&tab).cloned().unwrap_or_default()
    }

    /// Switch tabs; the first page is fetched only the first time.
    pub async fn select_tab(&self, tab: ReactionTab) -> Result<()> {
        let needs_load = {
            let mut inner = self.inner.lock();
            inner.active = tab;
            !inner.tabs.get(&tab).is_some_and(|t| t.loaded)
        };
        if needs_load {
            self.load_page(tab, 1).await?;
        }
        Ok(())
    }

    /// Feed scroll events of the active tab's list. Returns whether a page was requested.
    pub async fn on_scroll(&self, position: ScrollPosition) -> Result<bool> {
        if !position.near_bottom(SCROLL_THRESHOLD_PX) {
            return Ok(false);
        }
        let tab = self.active_tab();
        self.load_more(tab).await
    }

    pub async fn load_more(&self, tab: ReactionTab) -> Result<bool> {
        let next = {
            let inner = self.inner.lock();
            match inner.tabs.get(&tab) {
                Some(state) if state.has_more && !state.loading => state.page + 1,
                _ => return Ok(false),
            }
        };
        self.load_page(tab, next).await?;
        Ok(true)
    }

    async fn load_page(&self, tab: ReactionTab, page: u32) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            let state = inner.tabs.entry(tab).or_default();
            if state.loading {
                return Ok(());
            }
            state.loading = true;
        }

        let query = ReactionQuery {
            page,
            page_size: self.page_size,
            type_filter: tab.filter(),
        };
        debug!("Fetching reactions of {} ({:?}, page {})", self.post_id, tab, page);
        let fetched = self.services.reactions.fetch_post_likes(&self.post_id, query).await;

        let mut inner = self.inner.lock();
        match fetched {
            Ok(result) => {
                Self::apply_page(&mut inner, tab, page, result);
                Ok(())
            }
            Err(e) => {
                inner.tabs.entry(tab).or_default().loading = false;
                drop(inner);
                warn!("Loading reactions of {} failed: {}", self.post_id, e);
                self.services
                    .notifier
                    .notify(Notice::error(format!("Could not load reactions. {}", e.user_message())));
                Err(e)
            }
        }
    }

    fn apply_page(inner: &mut ListingInner, tab: ReactionTab, page: u32, result: ReactionPage) {
        if tab == ReactionTab::All {
            if let Some(counts) = &result.counts_by_type {
                inner.counts = counts.clone();
            }
            inner.total = result
                .pagination
                .map(|p| p.total)
                .unwrap_or_else(|| inner.counts.sum());
        }

        let state = inner.tabs.entry(tab).or_default();
        if page <= 1 {
            state.users = result.users;
        } else {
            state.users.extend(result.users);
        }
        state.page = page;
        state.loaded = true;
        state.loading = false;
        state.has_more = result.pagination.is_some_and(|p| p.has_more());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_bottom_uses_threshold() {
        let pos = ScrollPosition {
            scroll_top: 850.0,
            client_height: 100.0,
            scroll_height: 1000.0,
        };
        assert!(pos.near_bottom(SCROLL_THRESHOLD_PX));

        let far = ScrollPosition {
            scroll_top: 100.0,
            ..pos
        };
        assert!(!far.near_bottom(SCROLL_THRESHOLD_PX));
    }
}
