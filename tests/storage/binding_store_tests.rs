//! BindingStore interface tests.
//!
//! These tests verify the contract of the BindingStore trait.
//! Each storage implementation should run these tests. Every test uses its
//! own deployment and generation names so they can share one database.

use placebind::storage::{
    BindingStore, Deployment, DeploymentStore, PlaceholderMapping, StorageError,
};

async fn deployment_at<D: DeploymentStore>(deployments: &D, name: &str) -> Deployment {
    deployments.create(name).await.expect("create should succeed");
    deployments
        .start_generation(name)
        .await
        .expect("start_generation should succeed");
    deployments
        .find_by_name(name)
        .await
        .expect("find_by_name should succeed")
        .expect("deployment should exist")
}

// =============================================================================
// BindingStore::record_binding tests
// =============================================================================

pub async fn test_record_and_find<B: BindingStore, D: DeploymentStore>(bindings: &B, deployments: &D) {
    let deployment = deployment_at(deployments, "test_record_find").await;
    let mapping = PlaceholderMapping::new(
        "/db_password",
        "11",
        deployment.id,
        deployment.placeholder_set_id.as_str(),
    );

    bindings
        .record_binding(&mapping)
        .await
        .expect("record should succeed");

    let found = bindings
        .find_binding("/db_password", &deployment.placeholder_set_id)
        .await
        .expect("find should succeed")
        .expect("binding should exist");
    assert_eq!(found, mapping, "should return the recorded binding");
}

pub async fn test_find_nonexistent<B: BindingStore>(bindings: &B) {
    let result = bindings
        .find_binding("/nope", "test_no_such_set")
        .await
        .expect("find should succeed");
    assert!(result.is_none(), "nonexistent binding should be None");
}

pub async fn test_duplicate_rejected_regardless_of_deployment<B: BindingStore, D: DeploymentStore>(
    bindings: &B,
    deployments: &D,
) {
    let first = deployment_at(deployments, "test_dup_first").await;
    let second = deployment_at(deployments, "test_dup_second").await;
    let set_id = "test_dup_shared_set";

    bindings
        .record_binding(&PlaceholderMapping::new("/shared", "1", first.id, set_id))
        .await
        .expect("first record should succeed");

    let err = bindings
        .record_binding(&PlaceholderMapping::new("/shared", "2", second.id, set_id))
        .await
        .expect_err("second record should fail");

    match err {
        StorageError::BindingAlreadyExists { name, set_id: conflict_set } => {
            assert_eq!(name, "/shared");
            assert_eq!(conflict_set, set_id);
        }
        other => panic!("expected BindingAlreadyExists, got {:?}", other),
    }

    let kept = bindings
        .find_binding("/shared", set_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.placeholder_id, "1", "original binding should be kept");
    assert_eq!(kept.deployment_id, first.id);
}

pub async fn test_duplicate_rejected_with_same_id<B: BindingStore, D: DeploymentStore>(
    bindings: &B,
    deployments: &D,
) {
    let deployment = deployment_at(deployments, "test_dup_same_id").await;
    let mapping = PlaceholderMapping::new(
        "/same",
        "7",
        deployment.id,
        deployment.placeholder_set_id.as_str(),
    );

    bindings.record_binding(&mapping).await.unwrap();
    let result = bindings.record_binding(&mapping).await;

    assert!(
        matches!(result, Err(StorageError::BindingAlreadyExists { .. })),
        "identical binding should still be rejected"
    );
}

pub async fn test_same_name_in_different_generations<B: BindingStore, D: DeploymentStore>(
    bindings: &B,
    deployments: &D,
) {
    let deployment = deployment_at(deployments, "test_two_gens").await;

    bindings
        .record_binding(&PlaceholderMapping::new("/rotated", "1", deployment.id, "test_gen_a"))
        .await
        .expect("gen a record should succeed");
    bindings
        .record_binding(&PlaceholderMapping::new("/rotated", "2", deployment.id, "test_gen_b"))
        .await
        .expect("gen b record should succeed");

    let a = bindings.find_binding("/rotated", "test_gen_a").await.unwrap().unwrap();
    let b = bindings.find_binding("/rotated", "test_gen_b").await.unwrap().unwrap();
    assert_eq!(a.placeholder_id, "1");
    assert_eq!(b.placeholder_id, "2");
}

// =============================================================================
// BindingStore::bindings_for_generation tests
// =============================================================================

pub async fn test_bindings_for_generation<B: BindingStore, D: DeploymentStore>(
    bindings: &B,
    deployments: &D,
) {
    let first = deployment_at(deployments, "test_gen_list_first").await;
    let second = deployment_at(deployments, "test_gen_list_second").await;
    let set_id = "test_gen_list_set";

    bindings
        .record_binding(&PlaceholderMapping::new("/a", "1", first.id, set_id))
        .await
        .unwrap();
    bindings
        .record_binding(&PlaceholderMapping::new("/b", "2", second.id, set_id))
        .await
        .unwrap();
    bindings
        .record_binding(&PlaceholderMapping::new("/a", "3", first.id, "test_gen_list_other"))
        .await
        .unwrap();

    let listed = bindings
        .bindings_for_generation(set_id)
        .await
        .expect("list should succeed");

    assert_eq!(listed.len(), 2, "should span deployments sharing the set");
    assert_eq!(listed.get("/a").map(String::as_str), Some("1"));
    assert_eq!(listed.get("/b").map(String::as_str), Some("2"));
}

pub async fn test_bindings_for_unknown_generation<B: BindingStore>(bindings: &B) {
    let listed = bindings
        .bindings_for_generation("test_unknown_set")
        .await
        .expect("list should succeed");
    assert!(listed.is_empty(), "unknown generation should be empty");
}

// =============================================================================
// BindingStore::bindings_for_deployment tests
// =============================================================================

pub async fn test_bindings_for_deployment<B: BindingStore, D: DeploymentStore>(
    bindings: &B,
    deployments: &D,
) {
    let deployment = deployment_at(deployments, "test_history").await;
    let other = deployment_at(deployments, "test_history_other").await;

    for (name, id, set_id) in [
        ("/x", "1", "test_history_gen_1"),
        ("/y", "2", "test_history_gen_1"),
        ("/x", "3", "test_history_gen_2"),
    ] {
        bindings
            .record_binding(&PlaceholderMapping::new(name, id, deployment.id, set_id))
            .await
            .unwrap();
    }
    bindings
        .record_binding(&PlaceholderMapping::new("/x", "9", other.id, "test_history_other_gen"))
        .await
        .unwrap();

    let history = bindings
        .bindings_for_deployment(deployment.id)
        .await
        .expect("history should succeed");

    let ids: Vec<&str> = history.iter().map(|m| m.placeholder_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"], "should be in insertion order");
    assert!(history.iter().all(|m| m.deployment_id == deployment.id));
}

// =============================================================================
// Concurrency tests
// =============================================================================

pub async fn test_concurrent_record_single_winner<B: BindingStore, D: DeploymentStore>(
    bindings: &B,
    deployments: &D,
) {
    let deployment = deployment_at(deployments, "test_race").await;
    let set_id = deployment.placeholder_set_id.as_str();

    let first = PlaceholderMapping::new("/raced", "11", deployment.id, set_id);
    let second = PlaceholderMapping::new("/raced", "99", deployment.id, set_id);

    let (a, b) = tokio::join!(bindings.record_binding(&first), bindings.record_binding(&second));

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1, "exactly one insert should win");

    let loser = if a.is_err() { a } else { b };
    assert!(matches!(loser, Err(StorageError::BindingAlreadyExists { .. })));

    let listed = bindings.bindings_for_generation(set_id).await.unwrap();
    assert_eq!(listed.len(), 1, "no duplicate rows");
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all BindingStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_binding_store_tests {
    ($bindings:expr, $deployments:expr) => {
        use $crate::storage::binding_store_tests::*;

        // record_binding tests
        test_record_and_find($bindings, $deployments).await;
        println!("  test_record_and_find: PASSED");

        test_find_nonexistent($bindings).await;
        println!("  test_find_nonexistent: PASSED");

        test_duplicate_rejected_regardless_of_deployment($bindings, $deployments).await;
        println!("  test_duplicate_rejected_regardless_of_deployment: PASSED");

        test_duplicate_rejected_with_same_id($bindings, $deployments).await;
        println!("  test_duplicate_rejected_with_same_id: PASSED");

        test_same_name_in_different_generations($bindings, $deployments).await;
        println!("  test_same_name_in_different_generations: PASSED");

        // bindings_for_generation tests
        test_bindings_for_generation($bindings, $deployments).await;
        println!("  test_bindings_for_generation: PASSED");

        test_bindings_for_unknown_generation($bindings).await;
        println!("  test_bindings_for_unknown_generation: PASSED");

        // bindings_for_deployment tests
        test_bindings_for_deployment($bindings, $deployments).await;
        println!("  test_bindings_for_deployment: PASSED");

        // concurrency tests
        test_concurrent_record_single_winner($bindings, $deployments).await;
        println!("  test_concurrent_record_single_winner: PASSED");
    };
}
