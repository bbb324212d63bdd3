//! # Client Facade
//!
//! The [`Client`] owns the connection pool and hands out per-entity
//! repositories, interactive transactions with deadlines, and a raw SQL
//! escape hatch for the queries the typed API does not cover.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, FromQueryResult, IsolationLevel,
    JsonValue, Statement, TransactionTrait, Value,
};
use tokio::time::timeout;

use crate::config::{StoreConfig, TransactionConfig, TxIsolationLevel};
use crate::db;
use crate::error::{StoreError, TxPhase};
use crate::repositories::{
    AccountRepository, EventRepository, ParticipantRepository, PaymentRepository,
    TicketRepository, TicketSendResultRepository, TicketSettingRepository,
    TicketUsageRepository, UserRepository,
};

/// Per-call transaction parameters, seeded from configuration defaults
#[derive(Debug, Clone, Copy)]
pub struct TransactionOptions {
    /// Isolation level; None defers to the store's default
    pub isolation_level: Option<TxIsolationLevel>,
    /// Maximum time to wait to begin the transaction
    pub max_wait_ms: u64,
    /// Deadline for the transaction body; on expiry the transaction is
    /// rolled back
    pub timeout_ms: u64,
}

impl From<&TransactionConfig> for TransactionOptions {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            isolation_level: config.isolation_level,
            max_wait_ms: config.max_wait_ms,
            timeout_ms: config.timeout_ms,
        }
    }
}

fn isolation_level(level: TxIsolationLevel) -> IsolationLevel {
    match level {
        TxIsolationLevel::ReadUncommitted => IsolationLevel::ReadUncommitted,
        TxIsolationLevel::ReadCommitted => IsolationLevel::ReadCommitted,
        TxIsolationLevel::RepeatableRead => IsolationLevel::RepeatableRead,
        TxIsolationLevel::Serializable => IsolationLevel::Serializable,
    }
}

/// Boxed future returned by transaction closures
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'c>>;

/// Entry point for all store operations
pub struct Client {
    db: DatabaseConnection,
    tx_defaults: TransactionConfig,
}

impl Client {
    /// Connect to the configured datasource and verify the connection
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = db::init_pool(config).await?;
        db::health_check(&db).await?;

        Ok(Self {
            db,
            tx_defaults: config.transaction.clone(),
        })
    }

    /// Wrap an existing connection, keeping default transaction parameters
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            db,
            tx_defaults: TransactionConfig::default(),
        }
    }

    /// The underlying pooled connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Transaction parameters used when no per-call override is given
    pub fn transaction_defaults(&self) -> TransactionOptions {
        TransactionOptions::from(&self.tx_defaults)
    }

    pub fn users(&self) -> UserRepository<'_, DatabaseConnection> {
        UserRepository::new(&self.db)
    }

    pub fn accounts(&self) -> AccountRepository<'_, DatabaseConnection> {
        AccountRepository::new(&self.db)
    }

    pub fn events(&self) -> EventRepository<'_, DatabaseConnection> {
        EventRepository::new(&self.db)
    }

    pub fn participants(&self) -> ParticipantRepository<'_, DatabaseConnection> {
        ParticipantRepository::new(&self.db)
    }

    pub fn ticket_settings(&self) -> TicketSettingRepository<'_, DatabaseConnection> {
        TicketSettingRepository::new(&self.db)
    }

    pub fn tickets(&self) -> TicketRepository<'_, DatabaseConnection> {
        TicketRepository::new(&self.db)
    }

    pub fn ticket_usages(&self) -> TicketUsageRepository<'_, DatabaseConnection> {
        TicketUsageRepository::new(&self.db)
    }

    pub fn ticket_send_results(&self) -> TicketSendResultRepository<'_, DatabaseConnection> {
        TicketSendResultRepository::new(&self.db)
    }

    pub fn payments(&self) -> PaymentRepository<'_, DatabaseConnection> {
        PaymentRepository::new(&self.db)
    }

    /// Run a closure inside a transaction with the default parameters.
    ///
    /// Commits when the closure returns Ok, rolls back when it returns Err
    /// or exceeds the deadline.
    pub async fn transaction<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    {
        self.transaction_with_options(self.transaction_defaults(), f)
            .await
    }

    /// Run a closure inside a transaction with explicit parameters
    pub async fn transaction_with_options<T, F>(
        &self,
        options: TransactionOptions,
        f: F,
    ) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    {
        let started = Instant::now();
        let txn = self.begin(options).await?;

        match timeout(Duration::from_millis(options.timeout_ms), f(&txn)).await {
            Ok(Ok(value)) => {
                txn.commit().await.map_err(StoreError::database_error)?;
                Ok(value)
            }
            Ok(Err(err)) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
            Err(_) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(StoreError::TransactionTimeout {
                    phase: TxPhase::Execute,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                })
            }
        }
    }

    /// Begin a transaction the caller commits or rolls back itself.
    /// Dropping the returned handle rolls back.
    pub async fn begin(
        &self,
        options: TransactionOptions,
    ) -> Result<DatabaseTransaction, StoreError> {
        let started = Instant::now();
        let isolation = options.isolation_level.map(isolation_level);

        match timeout(
            Duration::from_millis(options.max_wait_ms),
            self.db.begin_with_config(isolation, None),
        )
        .await
        {
            Ok(result) => result.map_err(StoreError::database_error),
            Err(_) => Err(StoreError::TransactionTimeout {
                phase: TxPhase::Acquire,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }),
        }
    }

    /// Execute a raw SQL statement with positional binds, returning the
    /// number of affected rows
    pub async fn execute_raw(&self, sql: &str, values: Vec<Value>) -> Result<u64, StoreError> {
        let stmt = Statement::from_sql_and_values(self.db.get_database_backend(), sql, values);

        let result = self
            .db
            .execute(stmt)
            .await
            .map_err(StoreError::database_error)?;

        Ok(result.rows_affected())
    }

    /// Run a raw SQL query with positional binds, returning each row as a
    /// JSON object
    pub async fn query_raw(
        &self,
        sql: &str,
        values: Vec<Value>,
    ) -> Result<Vec<JsonValue>, StoreError> {
        let stmt = Statement::from_sql_and_values(self.db.get_database_backend(), sql, values);

        JsonValue::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Verify the pooled connection is still usable
    pub async fn health_check(&self) -> Result<(), StoreError> {
        db::health_check(&self.db).await
    }

    /// Driver-level liveness probe
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(StoreError::database_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user::{CreateUserRequest, UserFilter};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_client() -> Client {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Client::from_connection(db)
    }

    fn ann() -> CreateUserRequest {
        CreateUserRequest {
            id: None,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            phone: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_transaction_commits_on_ok() {
        let client = setup_client().await;

        client
            .transaction(|txn| {
                Box::pin(async move {
                    UserRepository::new(txn).create(ann()).await?;
                    Ok(())
                })
            })
            .await
            .unwrap();

        assert_eq!(client.users().count(&UserFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_err() {
        let client = setup_client().await;

        let result: Result<(), StoreError> = client
            .transaction(|txn| {
                Box::pin(async move {
                    UserRepository::new(txn).create(ann()).await?;
                    Err(StoreError::validation_error("abort"))
                })
            })
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(client.users().count(&UserFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transaction_timeout_rolls_back() {
        let client = setup_client().await;

        let options = TransactionOptions {
            timeout_ms: 50,
            ..client.transaction_defaults()
        };
        let result: Result<(), StoreError> = client
            .transaction_with_options(options, |txn| {
                Box::pin(async move {
                    UserRepository::new(txn).create(ann()).await?;
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok(())
                })
            })
            .await;

        match result {
            Err(StoreError::TransactionTimeout { phase, .. }) => {
                assert_eq!(phase, TxPhase::Execute);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(client.users().count(&UserFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_manual_begin_drop_rolls_back() {
        let client = setup_client().await;

        {
            let txn = client.begin(client.transaction_defaults()).await.unwrap();
            UserRepository::new(&txn).create(ann()).await.unwrap();
            // Dropped without commit
        }

        assert_eq!(client.users().count(&UserFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_raw_execute_and_query() {
        let client = setup_client().await;
        client.users().create(ann()).await.unwrap();

        let affected = client
            .execute_raw(
                "UPDATE users SET name = ? WHERE email = ?",
                vec!["Ann Lee".into(), "ann@x.com".into()],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = client
            .query_raw(
                "SELECT name, email FROM users WHERE email = ?",
                vec!["ann@x.com".into()],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Ann Lee");
    }

    #[tokio::test]
    async fn test_health_check() {
        let client = setup_client().await;
        client.health_check().await.unwrap();
    }
}
