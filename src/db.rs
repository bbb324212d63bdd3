//! Database connection and pool management for the ticketstore client.
//!
//! This module provides functionality to initialize and manage a SeaORM
//! connection pool to the configured datasource with configurable
//! parameters. Connection bring-up is the only retried path in the crate.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::StoreConfig;
use crate::error::StoreError;

/// Initializes a database connection pool with the given configuration.
///
/// Creates a connection pool using SeaORM with configurable maximum
/// connections and acquire timeout, retrying transient failures with
/// exponential backoff. All failures surface as
/// [`StoreError::Initialization`].
pub async fn init_pool(cfg: &StoreConfig) -> Result<DatabaseConnection, StoreError> {
    if cfg.database_url.trim().is_empty() {
        return Err(StoreError::Initialization {
            message: "database URL cannot be empty".to_string(),
        });
    }

    let mut opt = ConnectOptions::new(&cfg.database_url);
    opt.max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(cfg.query_logging)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let max_retries = 5;
    let mut retry_delay = Duration::from_millis(100);

    for attempt in 1..=max_retries {
        match Database::connect(opt.clone()).await {
            Ok(conn) => {
                log::info!("connected to datasource (attempt {})", attempt);
                return Ok(conn);
            }
            Err(e) => {
                if attempt == max_retries {
                    log::error!(
                        "failed to connect to datasource after {} attempts: {}",
                        max_retries,
                        e
                    );
                    return Err(StoreError::Initialization {
                        message: e.to_string(),
                    });
                }

                log::warn!(
                    "datasource connection attempt {} failed: {}, retrying in {:?}",
                    attempt,
                    e,
                    retry_delay
                );

                sleep(retry_delay).await;
                retry_delay *= 2;
            }
        }
    }

    Err(StoreError::Initialization {
        message: format!(
            "connection retries exhausted after {}ms acquire timeout",
            cfg.db_acquire_timeout_ms
        ),
    })
}

/// Health check for the database connection.
///
/// Verifies that the connection is still usable by executing a trivial
/// query.
pub async fn health_check(db: &DatabaseConnection) -> Result<(), StoreError> {
    use sea_orm::Statement;

    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .map_err(StoreError::database_error)?;

    Ok(())
}
