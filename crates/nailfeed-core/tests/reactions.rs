mod common;

use std::sync::Arc;

use nailfeed_core::{FeedError, ReactionController, ReactionState};
use nailfeed_types::{Notice, ReactionCounts, ReactionKind};

use common::{FakeBackend, services};

fn initial() -> ReactionState {
    let counts: ReactionCounts = [(ReactionKind::Like, 4), (ReactionKind::Love, 2)]
        .into_iter()
        .collect();
    ReactionState {
        current: None,
        total_reactions: counts.sum(),
        likes_count: 6,
        counts,
    }
}

#[tokio::test]
async fn toggling_twice_returns_to_none() {
    let backend = FakeBackend::new();
    let controller = ReactionController::new("post-1", initial(), services(&backend, true));

    let after_first = controller.set_reaction(Some(ReactionKind::Love)).await.unwrap();
    assert_eq!(after_first.current, Some(ReactionKind::Love));
    assert_eq!(after_first.counts.get(ReactionKind::Love), 3);

    let after_second = controller.set_reaction(Some(ReactionKind::Love)).await.unwrap();
    assert_eq!(after_second, initial());
    assert_eq!(
        backend.calls(),
        vec!["add_reaction post-1 Some(Love)", "add_reaction post-1 None"]
    );
}

#[tokio::test]
async fn counts_sum_to_total_after_every_toggle() {
    let backend = FakeBackend::new();
    let controller = ReactionController::new("post-1", initial(), services(&backend, true));

    let sequence = [
        Some(ReactionKind::Wow),
        Some(ReactionKind::Wow),
        Some(ReactionKind::Like),
        Some(ReactionKind::Angry),
        None,
        Some(ReactionKind::Sad),
        Some(ReactionKind::Haha),
        Some(ReactionKind::Haha),
    ];
    for requested in sequence {
        let state = controller.set_reaction(requested).await.unwrap();
        assert_eq!(state.counts.sum(), state.total_reactions, "after {:?}", requested);
    }
}

#[tokio::test]
async fn failed_persist_restores_snapshot_exactly() {
    let backend = FakeBackend::new();
    let svc = services(&backend, true);
    let mut notices = svc.notifier.subscribe();
    let controller = ReactionController::new("post-1", initial(), svc);

    controller.set_reaction(Some(ReactionKind::Like)).await.unwrap();
    let before = controller.state();

    backend.fail("add_reaction");
    let err = controller.set_reaction(Some(ReactionKind::Sad)).await.unwrap_err();
    assert!(matches!(err, FeedError::Server { status: 500, .. }));
    assert_eq!(controller.state(), before);
    assert!(!controller.is_reaction_loading());

    let mut saw_error = false;
    while let Ok(notice) = notices.try_recv() {
        saw_error |= notice.is_error();
    }
    assert!(saw_error);
}

#[tokio::test]
async fn optimistic_value_is_visible_while_in_flight() {
    let backend = FakeBackend::new();
    let gate = backend.gate("add_reaction");
    let controller = Arc::new(ReactionController::new("post-1", initial(), services(&backend, true)));
    let mut watcher = controller.subscribe();

    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.set_reaction(Some(ReactionKind::Wow)).await })
    };

    gate.entered.notified().await;
    assert!(controller.is_reaction_loading());
    assert_eq!(watcher.borrow_and_update().current, Some(ReactionKind::Wow));
    assert_eq!(controller.state().counts.get(ReactionKind::Wow), 1);

    gate.release.notify_one();
    task.await.unwrap().unwrap();
    assert!(!controller.is_reaction_loading());
}

#[tokio::test]
async fn anonymous_viewer_gets_prompt_and_no_change() {
    let backend = FakeBackend::new();
    let svc = services(&backend, false);
    let mut notices = svc.notifier.subscribe();
    let controller = ReactionController::new("post-1", initial(), svc);

    let err = controller.set_reaction(Some(ReactionKind::Like)).await.unwrap_err();
    assert_eq!(err, FeedError::AuthenticationRequired);
    assert_eq!(controller.state(), initial());
    assert!(backend.calls().is_empty());
    assert!(matches!(notices.try_recv(), Ok(Notice::LoginRequired { .. })));
}

#[tokio::test]
async fn overlapping_toggles_are_serialized() {
    let backend = FakeBackend::new();
    let gate = backend.gate("add_reaction");
    let controller = Arc::new(ReactionController::new("post-1", initial(), services(&backend, true)));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.set_reaction(Some(ReactionKind::Like)).await })
    };
    gate.entered.notified().await;

    // The first toggle fails once released; the second must start from the rolled-back state.
    backend.fail("add_reaction");
    let second = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.set_reaction(Some(ReactionKind::Love)).await })
    };
    tokio::task::yield_now().await;
    assert_eq!(backend.count_calls("add_reaction"), 1);

    gate.release.notify_one();
    assert!(first.await.unwrap().is_err());

    backend.succeed("add_reaction");
    gate.entered.notified().await;
    gate.release.notify_one();
    let state = second.await.unwrap().unwrap();

    assert_eq!(state.current, Some(ReactionKind::Love));
    assert_eq!(state.counts.get(ReactionKind::Like), 4);
    assert_eq!(state.counts.get(ReactionKind::Love), 3);
    assert_eq!(state.counts.sum(), state.total_reactions);
}

#[tokio::test]
async fn emoji_lookup_uses_backend() {
    let backend = FakeBackend::new();
    let controller = ReactionController::new("post-1", initial(), services(&backend, true));
    assert_eq!(controller.emoji(ReactionKind::Haha).await, ":haha:");

    backend.fail("get_emoji");
    assert_eq!(controller.emoji(ReactionKind::Haha).await, "😆");
}
