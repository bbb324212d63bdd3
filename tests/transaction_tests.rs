//! Interactive transaction semantics through the client facade: atomic
//! commit, rollback on error, and the raw SQL escape hatch.

use anyhow::Result;
use ticketstore::repositories::user::{CreateUserRequest, UserFilter, UserRepository};
use ticketstore::{StoreError, TransactionOptions};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{seed_user, setup_client};

fn user(name: &str, email: &str) -> CreateUserRequest {
    CreateUserRequest {
        id: None,
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        image: None,
    }
}

#[tokio::test]
async fn multi_write_transaction_is_atomic() -> Result<()> {
    let client = setup_client().await?;

    client
        .transaction(|txn| {
            Box::pin(async move {
                let repo = UserRepository::new(txn);
                repo.create(user("Ann", "ann@x.com")).await?;
                repo.create(user("Bob", "bob@x.com")).await?;
                Ok(())
            })
        })
        .await?;

    assert_eq!(client.users().count(&UserFilter::default()).await?, 2);
    Ok(())
}

#[tokio::test]
async fn failed_transaction_leaves_no_trace() -> Result<()> {
    let client = setup_client().await?;
    seed_user(&client, "Ann", "ann@x.com").await?;

    let result: Result<(), StoreError> = client
        .transaction(|txn| {
            Box::pin(async move {
                let repo = UserRepository::new(txn);
                repo.create(user("Bob", "bob@x.com")).await?;
                // Second write hits the unique email and aborts the whole batch
                repo.create(user("Imposter", "ann@x.com")).await?;
                Ok(())
            })
        })
        .await;

    assert_eq!(result.unwrap_err().error_code(), "UNIQUE_VIOLATION");
    assert_eq!(client.users().count(&UserFilter::default()).await?, 1);
    assert!(client.users().find_by_email("bob@x.com").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn deadline_overrides_apply_per_call() -> Result<()> {
    let client = setup_client().await?;

    let defaults = client.transaction_defaults();
    assert_eq!(defaults.max_wait_ms, 2000);
    assert_eq!(defaults.timeout_ms, 5000);

    let options = TransactionOptions {
        timeout_ms: 20,
        ..defaults
    };
    let result: Result<(), StoreError> = client
        .transaction_with_options(options, |_txn| {
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                Ok(())
            })
        })
        .await;

    assert_eq!(result.unwrap_err().error_code(), "TRANSACTION_TIMEOUT");
    Ok(())
}

#[tokio::test]
async fn raw_statements_run_against_the_same_schema() -> Result<()> {
    let client = setup_client().await?;
    seed_user(&client, "Ann", "ann@x.com").await?;
    seed_user(&client, "Bob", "bob@x.com").await?;

    let rows = client
        .query_raw("SELECT email FROM users ORDER BY email", vec![])
        .await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["email"], "ann@x.com");

    let affected = client
        .execute_raw("DELETE FROM users WHERE email = ?", vec!["bob@x.com".into()])
        .await?;
    assert_eq!(affected, 1);
    assert_eq!(client.users().count(&UserFilter::default()).await?, 1);
    Ok(())
}

#[tokio::test]
async fn health_check_succeeds_on_live_pool() -> Result<()> {
    let client = setup_client().await?;
    client.health_check().await?;
    Ok(())
}
