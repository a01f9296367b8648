mod common;

use nailfeed_core::{ReactionListing, ReactionTab, ScrollPosition};
use nailfeed_types::{ReactionCounts, ReactionKind, ReactionPage, ReactionUser};

use common::{FakeBackend, author, pagination, services};

fn users(ids: &[u64], kind: ReactionKind) -> Vec<ReactionUser> {
    ids.iter()
        .map(|&id| ReactionUser {
            user: author(id),
            reaction_type: kind,
        })
        .collect()
}

fn seed(backend: &FakeBackend) {
    let counts: ReactionCounts = [(ReactionKind::Like, 2), (ReactionKind::Love, 1)]
        .into_iter()
        .collect();
    backend.set_reaction_page(
        1,
        None,
        ReactionPage {
            users: users(&[1, 2], ReactionKind::Like),
            pagination: Some(pagination(1, 2, 3)),
            counts_by_type: Some(counts),
        },
    );
    backend.set_reaction_page(
        2,
        None,
        ReactionPage {
            users: users(&[3], ReactionKind::Love),
            pagination: Some(pagination(2, 2, 3)),
            counts_by_type: None,
        },
    );
    // A filtered response that must not overwrite the tab counts.
    backend.set_reaction_page(
        1,
        Some(ReactionKind::Love),
        ReactionPage {
            users: users(&[3], ReactionKind::Love),
            pagination: Some(pagination(1, 1, 1)),
            counts_by_type: Some([(ReactionKind::Love, 1)].into_iter().collect()),
        },
    );
}

const NEAR_BOTTOM: ScrollPosition = ScrollPosition {
    scroll_top: 900.0,
    client_height: 50.0,
    scroll_height: 1000.0,
};

#[tokio::test]
async fn tabs_follow_unfiltered_counts() {
    let backend = FakeBackend::new();
    seed(&backend);
    let listing = ReactionListing::new("post-1", services(&backend, true));
    listing.open().await.unwrap();

    assert_eq!(
        listing.tabs(),
        vec![
            (ReactionTab::All, 3),
            (ReactionTab::Kind(ReactionKind::Like), 2),
            (ReactionTab::Kind(ReactionKind::Love), 1),
        ]
    );

    listing.select_tab(ReactionTab::Kind(ReactionKind::Love)).await.unwrap();
    assert_eq!(listing.counts().get(ReactionKind::Like), 2);
    assert_eq!(listing.tabs()[0], (ReactionTab::All, 3));
}

#[tokio::test]
async fn revisiting_a_tab_does_not_refetch() {
    let backend = FakeBackend::new();
    seed(&backend);
    let listing = ReactionListing::new("post-1", services(&backend, true));
    listing.open().await.unwrap();

    let love = ReactionTab::Kind(ReactionKind::Love);
    listing.select_tab(love).await.unwrap();
    listing.select_tab(ReactionTab::All).await.unwrap();
    listing.select_tab(love).await.unwrap();

    assert_eq!(backend.count_calls("fetch_post_likes"), 2);
    assert_eq!(listing.active_tab(), love);
    assert_eq!(listing.tab(love).users.len(), 1);
}

#[tokio::test]
async fn scrolling_near_bottom_appends_next_page() {
    let backend = FakeBackend::new();
    seed(&backend);
    let listing = ReactionListing::new("post-1", services(&backend, true));
    listing.open().await.unwrap();

    let far = ScrollPosition {
        scroll_top: 0.0,
        ..NEAR_BOTTOM
    };
    assert!(!listing.on_scroll(far).await.unwrap());

    assert!(listing.on_scroll(NEAR_BOTTOM).await.unwrap());
    let all = listing.tab(ReactionTab::All);
    assert_eq!(all.users.len(), 3);
    assert_eq!(all.page, 2);
    assert!(!all.has_more);

    // Last page reached.
    assert!(!listing.on_scroll(NEAR_BOTTOM).await.unwrap());
    assert_eq!(backend.count_calls("fetch_post_likes"), 2);
}

#[tokio::test]
async fn failed_fetch_leaves_tab_retryable() {
    let backend = FakeBackend::new();
    seed(&backend);
    backend.fail("fetch_post_likes");
    let listing = ReactionListing::new("post-1", services(&backend, true));

    assert!(listing.open().await.is_err());
    let all = listing.tab(ReactionTab::All);
    assert!(!all.loaded);
    assert!(!all.loading);

    backend.succeed("fetch_post_likes");
    listing.open().await.unwrap();
    assert_eq!(listing.tab(ReactionTab::All).users.len(), 2);
}
