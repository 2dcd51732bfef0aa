use super::*;
use crate::resource::ResourceKind;
use crate::test_support::FakeProvider;

fn snapshot_fixture() -> (LifecycleManager<FakeProvider>, FakeProvider) {
    let provider = FakeProvider::new();
    provider.seed(ResourceKind::Volume, "vol-1111", "data-volume");
    let manager = LifecycleManager::snapshots(provider.clone());
    (manager, provider)
}

#[tokio::test]
async fn find_returns_none_for_unknown_name() {
    let (manager, _provider) = snapshot_fixture();
    let found = manager.find("missing").await.expect("find should succeed");
    assert!(found.is_none());
}

#[tokio::test]
async fn find_returns_first_match() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-a", "dup", "vol-1111");
    provider.seed_child(ResourceKind::Snapshot, "snap-b", "dup", "vol-1111");

    let found = manager
        .find("dup")
        .await
        .expect("find should succeed")
        .expect("a match should be returned");
    assert_eq!(found.id, "snap-a");
}

#[tokio::test]
async fn exists_is_defined_by_find() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-1", "nightly", "vol-1111");

    assert!(manager.exists("nightly").await.expect("exists"));
    assert!(!manager.exists("weekly").await.expect("exists"));
}

#[tokio::test]
async fn create_refuses_taken_name() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-1", "nightly", "vol-1111");

    let err = manager
        .create("data-volume", "nightly", None)
        .await
        .expect_err("second create must fail");
    assert_eq!(
        err,
        LifecycleError::AlreadyExists {
            kind: ResourceKind::Snapshot,
            name: String::from("nightly"),
        }
    );
    // The guard fires before any mutating call.
    assert!(
        provider.calls().iter().all(|call| call.verb != "create"),
        "no create call should have been issued"
    );
}

#[tokio::test]
async fn create_requires_live_parent() {
    let (manager, _provider) = snapshot_fixture();

    let err = manager
        .create("missing-volume", "nightly", None)
        .await
        .expect_err("create must fail without a parent");
    assert_eq!(
        err,
        LifecycleError::ParentNotFound {
            kind: ResourceKind::Volume,
            name: String::from("missing-volume"),
        }
    );
}

#[tokio::test]
async fn create_wraps_transport_failure() {
    let (manager, provider) = snapshot_fixture();
    provider.fail_next_create("socket closed");

    let err = manager
        .create("data-volume", "nightly", None)
        .await
        .expect_err("create must surface the transport failure");
    assert!(
        matches!(
            err,
            LifecycleError::CreationFailed { kind: ResourceKind::Snapshot, ref message, .. }
                if message == "socket closed"
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn create_prefers_authoritative_id_from_refind() {
    let (manager, _provider) = snapshot_fixture();

    let created = manager
        .create("data-volume", "nightly", Some("nightly backup"))
        .await
        .expect("create should succeed");
    assert_eq!(created.kind, ResourceKind::Snapshot);
    assert_eq!(created.name, "nightly");
    assert!(created.id.starts_with("snap-"));
}

#[tokio::test]
async fn create_falls_back_to_receipt_id_during_consistency_gap() {
    let (manager, provider) = snapshot_fixture();
    provider.hide_created();

    let created = manager
        .create("data-volume", "nightly", None)
        .await
        .expect("create should succeed on the receipt id");
    assert_eq!(created.id, "snap-0001");
}

#[tokio::test]
async fn create_fails_when_nothing_identifies_the_resource() {
    let (manager, provider) = snapshot_fixture();
    provider.hide_created();
    provider.omit_receipt_ids();

    let err = manager
        .create("data-volume", "nightly", None)
        .await
        .expect_err("no id and no re-find match must fail");
    assert!(matches!(err, LifecycleError::CreationFailed { .. }));
}

#[tokio::test]
async fn delete_requires_existing_target() {
    let (manager, _provider) = snapshot_fixture();

    let err = manager
        .delete("missing")
        .await
        .expect_err("delete of an absent name must fail");
    assert_eq!(
        err,
        LifecycleError::NotFound {
            kind: ResourceKind::Snapshot,
            name: String::from("missing"),
        }
    );
}

#[tokio::test]
async fn delete_uses_resolved_identifier() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-9", "nightly", "vol-1111");

    let deleted = manager.delete("nightly").await.expect("delete");
    assert_eq!(deleted.id, "snap-9");
    let delete_calls: Vec<_> = provider
        .calls()
        .into_iter()
        .filter(|call| call.verb == "delete")
        .collect();
    assert_eq!(delete_calls.len(), 1);
    assert_eq!(
        delete_calls.first().map(|call| call.argument.as_str()),
        Some("snap-9")
    );
}

#[tokio::test]
async fn delete_wraps_transport_failure() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_child(ResourceKind::Snapshot, "snap-9", "nightly", "vol-1111");
    provider.fail_next_delete("throttled");

    let err = manager
        .delete("nightly")
        .await
        .expect_err("delete must surface the transport failure");
    assert!(
        matches!(err, LifecycleError::DeletionFailed { ref message, .. } if message == "throttled")
    );
}

#[tokio::test]
async fn query_failure_is_wrapped_not_leaked() {
    let (manager, provider) = snapshot_fixture();
    provider.fail_next_describe("connection reset");

    let err = manager
        .find("nightly")
        .await
        .expect_err("describe failure must surface");
    assert_eq!(
        err,
        LifecycleError::Query {
            kind: ResourceKind::Snapshot,
            message: String::from("connection reset"),
        }
    );
}

#[tokio::test]
async fn bulk_delete_aborts_on_nameless_child() {
    let (manager, provider) = snapshot_fixture();
    provider.seed_nameless_child(ResourceKind::Snapshot, "snap-x", "vol-1111");

    let err = manager
        .delete_all_by_parent("data-volume")
        .await
        .expect_err("a nameless child cannot be deleted by name");
    assert!(matches!(err, LifecycleError::DeletionFailed { ref name, .. } if name == "snap-x"));
}

#[tokio::test]
async fn threshold_rejects_negative_values() {
    let (manager, _provider) = snapshot_fixture();

    let err = manager
        .has_more_than_by_parent("data-volume", -1)
        .await
        .expect_err("negative thresholds are invalid");
    assert_eq!(err, LifecycleError::InvalidThreshold { value: -1 });
}

#[tokio::test]
async fn managed_kind_constructors_pair_kinds_with_parents() {
    let provider = FakeProvider::new();
    let snapshots = LifecycleManager::snapshots(provider.clone());
    let images = LifecycleManager::images(provider.clone());
    let policies = LifecycleManager::policies(provider);

    assert_eq!(snapshots.kind(), ResourceKind::Snapshot);
    assert_eq!(snapshots.parent_kind(), ResourceKind::Volume);
    assert_eq!(images.kind(), ResourceKind::Image);
    assert_eq!(images.parent_kind(), ResourceKind::Instance);
    assert_eq!(policies.kind(), ResourceKind::LifecyclePolicy);
    assert_eq!(policies.parent_kind(), ResourceKind::Instance);
}
