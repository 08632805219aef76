//! DeploymentStore interface tests.
//!
//! These tests verify the contract of the DeploymentStore trait.
//! Each storage implementation should run these tests.

use placebind::storage::{DeploymentStore, StorageError, INITIAL_SET_ID};

// =============================================================================
// DeploymentStore::create / find_by_name tests
// =============================================================================

pub async fn test_create_starts_at_initial<D: DeploymentStore>(deployments: &D) {
    let created = deployments
        .create("test_dep_create")
        .await
        .expect("create should succeed");

    assert_eq!(created.name, "test_dep_create");
    assert_eq!(created.placeholder_set_id, INITIAL_SET_ID);
    assert!(created.successful_placeholder_set_id.is_none());

    let found = deployments
        .find_by_name("test_dep_create")
        .await
        .expect("find should succeed")
        .expect("deployment should exist");
    assert_eq!(found, created);
}

pub async fn test_create_duplicate<D: DeploymentStore>(deployments: &D) {
    deployments.create("test_dep_dup").await.unwrap();

    let result = deployments.create("test_dep_dup").await;
    assert!(
        matches!(result, Err(StorageError::DeploymentAlreadyExists(name)) if name == "test_dep_dup"),
        "duplicate create should fail"
    );
}

pub async fn test_find_nonexistent<D: DeploymentStore>(deployments: &D) {
    let result = deployments
        .find_by_name("test_dep_missing")
        .await
        .expect("find should succeed");
    assert!(result.is_none(), "nonexistent deployment should be None");
}

// =============================================================================
// Generation tests
// =============================================================================

pub async fn test_start_generation<D: DeploymentStore>(deployments: &D) {
    deployments.create("test_dep_gen").await.unwrap();

    let first = deployments
        .start_generation("test_dep_gen")
        .await
        .expect("start_generation should succeed");
    let second = deployments.start_generation("test_dep_gen").await.unwrap();

    assert_ne!(first, INITIAL_SET_ID);
    assert_ne!(first, second, "each generation gets a fresh id");
    assert!(uuid::Uuid::parse_str(&second).is_ok(), "set id should be a UUID");

    let found = deployments
        .find_by_name("test_dep_gen")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.placeholder_set_id, second);
    assert!(
        found.successful_placeholder_set_id.is_none(),
        "starting a generation does not mark success"
    );
}

pub async fn test_start_generation_nonexistent<D: DeploymentStore>(deployments: &D) {
    let result = deployments.start_generation("test_dep_gen_missing").await;
    assert!(matches!(result, Err(StorageError::DeploymentNotFound(_))));
}

pub async fn test_mark_generation_successful<D: DeploymentStore>(deployments: &D) {
    deployments.create("test_dep_success").await.unwrap();
    let good = deployments.start_generation("test_dep_success").await.unwrap();

    deployments
        .mark_generation_successful("test_dep_success")
        .await
        .expect("mark should succeed");

    // A later failed attempt leaves the successful generation alone
    let attempted = deployments.start_generation("test_dep_success").await.unwrap();

    let found = deployments
        .find_by_name("test_dep_success")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.placeholder_set_id, attempted);
    assert_eq!(found.successful_placeholder_set_id, Some(good));
}

pub async fn test_mark_generation_successful_nonexistent<D: DeploymentStore>(deployments: &D) {
    let result = deployments
        .mark_generation_successful("test_dep_success_missing")
        .await;
    assert!(matches!(result, Err(StorageError::DeploymentNotFound(_))));
}

// =============================================================================
// DeploymentStore::delete tests
// =============================================================================

pub async fn test_delete<D: DeploymentStore>(deployments: &D) {
    deployments.create("test_dep_delete").await.unwrap();

    deployments
        .delete("test_dep_delete")
        .await
        .expect("delete should succeed");

    assert!(deployments
        .find_by_name("test_dep_delete")
        .await
        .unwrap()
        .is_none());

    // Deleting again is not an error
    deployments.delete("test_dep_delete").await.unwrap();
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all DeploymentStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_deployment_store_tests {
    ($deployments:expr) => {
        use $crate::storage::deployment_store_tests::*;

        test_create_starts_at_initial($deployments).await;
        println!("  test_create_starts_at_initial: PASSED");

        test_create_duplicate($deployments).await;
        println!("  test_create_duplicate: PASSED");

        test_find_nonexistent($deployments).await;
        println!("  test_find_nonexistent: PASSED");

        test_start_generation($deployments).await;
        println!("  test_start_generation: PASSED");

        test_start_generation_nonexistent($deployments).await;
        println!("  test_start_generation_nonexistent: PASSED");

        test_mark_generation_successful($deployments).await;
        println!("  test_mark_generation_successful: PASSED");

        test_mark_generation_successful_nonexistent($deployments).await;
        println!("  test_mark_generation_successful_nonexistent: PASSED");

        test_delete($deployments).await;
        println!("  test_delete: PASSED");
    };
}
