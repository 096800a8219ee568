use std::sync::Arc;

use tracing_test::traced_test;

use crate::test_utils::wait_until;
use crate::test_utils::InMemoryStore;
use crate::Error;
use crate::SyncContext;
use crate::WatchEventKind;
use crate::WatchRegistry;

fn context_for(
    store: Arc<InMemoryStore>,
    dir: &tempfile::TempDir,
    root: &str,
) -> Arc<SyncContext> {
    Arc::new(SyncContext::new(
        store,
        root.to_string(),
        dir.path().join("mirror"),
    ))
}

#[tokio::test]
async fn register_all_should_watch_every_leaf() {
    let store = InMemoryStore::new(&[
        ("/cfg/a", "1"),
        ("/cfg/b", "2"),
        ("/cfg/group/x", "v"),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_for(store, &dir, "/cfg");
    let registry = WatchRegistry::new();

    registry.register_all(&ctx).await.unwrap();

    assert_eq!(registry.len(), 3);
    assert!(registry.contains("/cfg/a"));
    assert!(registry.contains("/cfg/b"));
    assert!(registry.contains("/cfg/group/x"));
    registry.shutdown();
}

#[tokio::test]
async fn register_all_should_skip_branches_that_fail_to_list() {
    let store = InMemoryStore::new(&[
        ("/cfg/a", "1"),
        ("/cfg/b", "2"),
        ("/cfg/group/x", "v"),
    ]);
    store.break_path("/cfg/group");
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_for(store, &dir, "/cfg");
    let registry = WatchRegistry::new();

    registry.register_all(&ctx).await.unwrap();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains("/cfg/a"));
    assert!(registry.contains("/cfg/b"));
    assert!(!registry.contains("/cfg/group/x"));
    registry.shutdown();
}

#[tokio::test]
async fn register_all_should_fail_when_root_listing_fails() {
    let store = InMemoryStore::new(&[("/cfg/a", "1")]);
    store.break_path("/cfg");
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_for(store, &dir, "/cfg");
    let registry = WatchRegistry::new();

    let err = registry.register_all(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Traversal(_)), "got {err:?}");
    assert!(registry.is_empty());
}

#[tokio::test]
#[traced_test]
async fn change_event_should_trigger_a_full_rebuild() {
    let store = InMemoryStore::new(&[("/cfg/a", "1"), ("/cfg/b", "2")]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_for(store.clone(), &dir, "/cfg");
    ctx.rebuild().await.unwrap();

    let registry = WatchRegistry::new();
    registry.register_all(&ctx).await.unwrap();
    store.wait_until_armed("/cfg/a").await;

    let snapshot = ctx.snapshot();
    assert_eq!(snapshot.get_int("a").unwrap(), 1);

    store.set_leaf("/cfg/a", "9");
    assert_eq!(store.fire("/cfg/a", WatchEventKind::DataChanged), 1);

    wait_until("snapshot refresh", || {
        snapshot.get_int("a").map(|v| v == 9).unwrap_or(false)
    })
    .await;

    // No other key changed
    assert_eq!(snapshot.get_int("b").unwrap(), 2);
    assert!(logs_contain("rebuilding document"));
    assert!(logs_contain("wrote"));
    registry.shutdown();
}

#[tokio::test]
async fn reactor_should_rearm_after_every_fire() {
    let store = InMemoryStore::new(&[("/cfg/a", "1")]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_for(store.clone(), &dir, "/cfg");
    ctx.rebuild().await.unwrap();

    let registry = WatchRegistry::new();
    registry.register_all(&ctx).await.unwrap();

    let snapshot = ctx.snapshot();
    for round in 2_i64..5 {
        store.wait_until_armed("/cfg/a").await;
        store.set_leaf("/cfg/a", &round.to_string());
        store.fire("/cfg/a", WatchEventKind::DataChanged);
        wait_until("snapshot refresh", || {
            snapshot.get_int("a").map(|v| v == round).unwrap_or(false)
        })
        .await;
    }
    registry.shutdown();
}

#[tokio::test]
#[traced_test]
async fn failed_rebuild_should_keep_previous_snapshot_and_rearm() {
    let store = InMemoryStore::new(&[("/cfg/a", "1")]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_for(store.clone(), &dir, "/cfg");
    ctx.rebuild().await.unwrap();

    let registry = WatchRegistry::new();
    registry.register_all(&ctx).await.unwrap();
    store.wait_until_armed("/cfg/a").await;

    // The next materialization pass will fail on the root listing.
    store.break_path("/cfg");
    store.set_leaf("/cfg/a", "9");
    store.fire("/cfg/a", WatchEventKind::DataChanged);

    // The reactor swallows the failure and arms itself again.
    store.wait_until_armed("/cfg/a").await;

    let snapshot = ctx.snapshot();
    assert_eq!(snapshot.get_int("a").unwrap(), 1);
    assert!(logs_contain("keeping previous snapshot"));
    registry.shutdown();
}

#[tokio::test]
async fn shutdown_should_stop_all_reactors() {
    let store = InMemoryStore::new(&[("/cfg/a", "1"), ("/cfg/b", "2")]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_for(store.clone(), &dir, "/cfg");
    ctx.rebuild().await.unwrap();

    let registry = WatchRegistry::new();
    registry.register_all(&ctx).await.unwrap();
    store.wait_until_armed("/cfg/a").await;
    store.wait_until_armed("/cfg/b").await;

    registry.shutdown();

    // Cancelled reactors drop their subscriptions and never re-arm, so
    // eventually a fire reaches nobody.
    wait_until("reactors to stop", || {
        store.fire("/cfg/a", WatchEventKind::DataChanged) == 0
    })
    .await;
    wait_until("reactors to stop", || {
        store.fire("/cfg/b", WatchEventKind::DataChanged) == 0
    })
    .await;
}
