use tracing_test::traced_test;

use crate::test_utils::wait_until;
use crate::test_utils::InMemoryStore;
use crate::Error;
use crate::MirrorConfig;
use crate::WatchEventKind;
use crate::ZkMirror;

fn config_for(
    dir: &tempfile::TempDir,
    root: &str,
) -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.sync.root_path = root.to_string();
    config.sync.output_path = dir.path().join("zk-config");
    config
}

#[test]
fn build_should_require_a_store_client() {
    let dir = tempfile::tempdir().unwrap();

    let result = ZkMirror::builder(config_for(&dir, "/cfg")).build();

    assert!(matches!(result.unwrap_err(), Error::Fatal(_)));
}

#[test]
fn build_should_validate_the_config() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryStore::new(&[]);

    let result = ZkMirror::builder(config_for(&dir, "not-absolute"))
        .store(store)
        .build();

    assert!(matches!(result.unwrap_err(), Error::Config(_)));
}

#[tokio::test]
async fn start_should_publish_document_and_register_watchers() {
    let store = InMemoryStore::new(&[
        ("/cfg/a", "1"),
        ("/cfg/b", "2"),
        ("/cfg/group/x", "v"),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let mirror = ZkMirror::builder(config_for(&dir, "/cfg"))
        .store(store)
        .build()
        .unwrap();

    mirror.start().await.unwrap();

    let published = std::fs::read_to_string(dir.path().join("zk-config.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&published).unwrap();
    assert_eq!(parsed["a"], "1");
    assert_eq!(parsed["b"], "2");
    assert_eq!(parsed["group"]["x"], "v");

    let snapshot = mirror.snapshot();
    assert_eq!(snapshot.get_int("a").unwrap(), 1);
    assert_eq!(snapshot.get_string("group.x").unwrap(), "v");

    assert_eq!(mirror.registry().len(), 3);
    mirror.shutdown();
}

#[tokio::test]
async fn start_should_fail_without_writing_when_root_listing_fails() {
    let store = InMemoryStore::new(&[("/cfg/a", "1")]);
    store.break_path("/cfg");
    let dir = tempfile::tempdir().unwrap();
    let mirror = ZkMirror::builder(config_for(&dir, "/cfg"))
        .store(store)
        .build()
        .unwrap();

    let err = mirror.start().await.unwrap_err();

    assert!(matches!(err, Error::Traversal(_)), "got {err:?}");
    assert!(!dir.path().join("zk-config.json").exists());
    assert!(!mirror.snapshot().is_initialized());
    assert!(mirror.registry().is_empty());
}

#[tokio::test]
#[traced_test]
async fn changed_leaf_should_refresh_the_snapshot() {
    let store = InMemoryStore::new(&[("/cfg/a", "1"), ("/cfg/b", "2")]);
    let dir = tempfile::tempdir().unwrap();
    let mirror = ZkMirror::builder(config_for(&dir, "/cfg"))
        .store(store.clone())
        .build()
        .unwrap();
    mirror.start().await.unwrap();
    store.wait_until_armed("/cfg/a").await;

    store.set_leaf("/cfg/a", "9");
    store.fire("/cfg/a", WatchEventKind::DataChanged);

    let snapshot = mirror.snapshot();
    wait_until("snapshot refresh", || {
        snapshot.get_int("a").map(|v| v == 9).unwrap_or(false)
    })
    .await;

    assert_eq!(snapshot.get_int("b").unwrap(), 2);
    assert!(logs_contain("wrote"));
    mirror.shutdown();
}

#[tokio::test]
async fn structural_changes_should_not_extend_the_watched_set() {
    let store = InMemoryStore::new(&[("/cfg/a", "1")]);
    let dir = tempfile::tempdir().unwrap();
    let mirror = ZkMirror::builder(config_for(&dir, "/cfg"))
        .store(store.clone())
        .build()
        .unwrap();
    mirror.start().await.unwrap();
    assert_eq!(mirror.registry().len(), 1);
    store.wait_until_armed("/cfg/a").await;

    // A leaf that appears after registration is picked up by the next full
    // rebuild, but nobody watches it.
    store.set_leaf("/cfg/fresh", "new");
    store.fire("/cfg/a", WatchEventKind::DataChanged);

    let snapshot = mirror.snapshot();
    wait_until("rebuild to include the new leaf", || {
        snapshot.get_string("fresh").is_ok()
    })
    .await;

    assert_eq!(mirror.registry().len(), 1);
    assert!(!mirror.registry().contains("/cfg/fresh"));
    mirror.shutdown();
}
