//! Behavioural tests for the guarded lifecycle verbs, driven through the
//! in-memory provider double.

use rstest::rstest;
use snapkeep::test_support::FakeProvider;
use snapkeep::{LifecycleError, LifecycleManager, ResourceKind};

fn snapshot_fixture() -> (LifecycleManager<FakeProvider>, FakeProvider) {
    let provider = FakeProvider::new();
    provider.seed(ResourceKind::Volume, "vol-1111", "data-volume");
    let manager = LifecycleManager::snapshots(provider.clone());
    (manager, provider)
}

fn image_fixture() -> (LifecycleManager<FakeProvider>, FakeProvider) {
    let provider = FakeProvider::new();
    provider.seed(ResourceKind::Instance, "i-2222", "build-server");
    let manager = LifecycleManager::images(provider.clone());
    (manager, provider)
}

#[tokio::test]
async fn create_delete_round_trip_enforces_both_guards() {
    let (manager, _provider) = snapshot_fixture();

    let created = manager
        .create("data-volume", "snap-1", Some("round trip"))
        .await
        .expect("first create succeeds");
    assert_eq!(created.name, "snap-1");
    assert!(manager.exists("snap-1").await.expect("exists after create"));

    let second = manager
        .create("data-volume", "snap-1", None)
        .await
        .expect_err("second create with the same name must fail");
    assert!(matches!(second, LifecycleError::AlreadyExists { .. }));

    manager.delete("snap-1").await.expect("delete succeeds");
    assert!(!manager.exists("snap-1").await.expect("exists after delete"));

    let second_delete = manager
        .delete("snap-1")
        .await
        .expect_err("delete of an absent name must fail, never silently succeed");
    assert!(matches!(second_delete, LifecycleError::NotFound { .. }));
}

#[tokio::test]
async fn delete_issues_no_post_condition_check() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-9", "nightly", "vol-1111");

    manager.delete("nightly").await.expect("delete succeeds");

    let last = provider.calls().pop().expect("calls were recorded");
    assert_eq!(last.verb, "delete", "no describe may follow the delete call");
}

#[tokio::test]
async fn image_lifecycle_uses_the_instance_parent() {
    let (manager, _provider) = image_fixture();

    let created = manager
        .create("build-server", "team-backup-1", None)
        .await
        .expect("image create succeeds");
    assert_eq!(created.kind, ResourceKind::Image);

    let children = manager
        .find_all_by_parent("build-server")
        .await
        .expect("children listed");
    assert_eq!(children.len(), 1);
    assert_eq!(
        children.first().and_then(|child| child.source_id.as_deref()),
        Some("i-2222")
    );
}

#[tokio::test]
async fn policies_share_the_uniform_verbs() {
    let provider = FakeProvider::new();
    provider.seed(ResourceKind::Instance, "i-2222", "build-server");
    let manager = LifecycleManager::policies(provider);

    let created = manager
        .create("build-server", "rotation", None)
        .await
        .expect("policy create succeeds");
    assert_eq!(created.kind, ResourceKind::LifecyclePolicy);
    assert!(manager.exists("rotation").await.expect("exists"));
    manager.delete("rotation").await.expect("policy delete succeeds");
    assert!(!manager.exists("rotation").await.expect("exists"));
}

#[tokio::test]
async fn find_all_by_parent_scopes_to_one_parent() {
    let (manager, provider) = snapshot_fixture();
    provider.seed(ResourceKind::Volume, "vol-2222", "other-volume");
    provider.seed_child(ResourceKind::Snapshot, "snap-a", "keep-a", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-b", "keep-b", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-c", "other", "vol-2222");

    let children = manager
        .find_all_by_parent("data-volume")
        .await
        .expect("children listed");
    let ids: Vec<&str> = children.iter().map(|child| child.id.as_str()).collect();
    assert_eq!(ids, ["snap-a", "snap-b"]);
}

#[tokio::test]
async fn bulk_verbs_on_a_childless_parent_touch_nothing() {
    let (manager, provider) = snapshot_fixture();

    let children = manager
        .find_all_by_parent("data-volume")
        .await
        .expect("empty listing succeeds");
    assert!(children.is_empty());

    let deleted = manager
        .delete_all_by_parent("data-volume")
        .await
        .expect("empty purge succeeds");
    assert!(deleted.is_empty());
    assert!(
        provider.calls().iter().all(|call| call.verb != "delete"),
        "no delete call may be issued for a childless parent"
    );
}

#[tokio::test]
async fn bulk_verbs_require_a_live_parent() {
    let (manager, _provider) = snapshot_fixture();

    let err = manager
        .find_all_by_parent("missing-volume")
        .await
        .expect_err("listing under an absent parent must fail");
    assert!(matches!(err, LifecycleError::ParentNotFound { .. }));

    let purge_err = manager
        .delete_all_by_parent("missing-volume")
        .await
        .expect_err("purging under an absent parent must fail");
    assert!(matches!(purge_err, LifecycleError::ParentNotFound { .. }));
}

#[tokio::test]
async fn purge_deletes_children_sequentially_by_name() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-a", "keep-a", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-b", "keep-b", "vol-1111");

    let deleted = manager
        .delete_all_by_parent("data-volume")
        .await
        .expect("purge succeeds");
    let names: Vec<&str> = deleted.iter().map(|gone| gone.name.as_str()).collect();
    assert_eq!(names, ["keep-a", "keep-b"]);
    assert_eq!(provider.count(ResourceKind::Snapshot), 0);
}

#[tokio::test]
async fn purge_aborts_on_the_first_failing_child() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-a", "keep-a", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-b", "keep-b", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-c", "keep-c", "vol-1111");
    provider.fail_delete_of("snap-b", "dependency violation");

    let err = manager
        .delete_all_by_parent("data-volume")
        .await
        .expect_err("a mid-sequence failure must abort the purge");
    assert!(
        matches!(err, LifecycleError::DeletionFailed { ref name, .. } if name == "keep-b")
    );

    // The first child is gone; the failing child and everything after it
    // remain untouched.
    assert!(!provider.contains(ResourceKind::Snapshot, "keep-a"));
    assert!(provider.contains(ResourceKind::Snapshot, "keep-b"));
    assert!(provider.contains(ResourceKind::Snapshot, "keep-c"));
}

#[rstest]
#[case(0, true)]
#[case(2, true)]
#[case(3, true)]
#[case(4, false)]
#[tokio::test]
async fn threshold_counts_children_inclusively(#[case] threshold: i64, #[case] expected: bool) {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-a", "keep-a", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-b", "keep-b", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-c", "keep-c", "vol-1111");

    let outcome = manager
        .has_more_than_by_parent("data-volume", threshold)
        .await
        .expect("threshold check succeeds");
    assert_eq!(outcome, expected);
}

#[tokio::test]
async fn zero_threshold_is_satisfied_by_a_childless_parent() {
    let (manager, _provider) = snapshot_fixture();

    assert!(
        manager
            .has_more_than_by_parent("data-volume", 0)
            .await
            .expect("zero threshold check succeeds")
    );
}
