//! Unified SQL storage implementations.
//!
//! This module provides shared implementations for SQL-based storage backends
//! (PostgreSQL, SQLite). The implementations are parameterized by database type
//! using the `SqlDatabase` trait.

mod binding_store;
mod deployment_store;
mod query;

pub use binding_store::SqlBindingStore;
pub use deployment_store::SqlDeploymentStore;
pub use query::SqlDatabase;

use crate::storage::StorageError;

/// Whether a database error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Map an insert failure, turning unique violations into `conflict`.
pub(crate) fn map_insert_error(err: sqlx::Error, conflict: impl FnOnce() -> StorageError) -> StorageError {
    if is_unique_violation(&err) {
        conflict()
    } else {
        StorageError::Database(err)
    }
}

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::PostgresQueryBuilder;
    use sqlx::PgPool;

    use crate::storage::Result;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_delete(stmt: sea_query::DeleteStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }
    }

    /// Apply the PostgreSQL migrations.
    pub async fn migrate(pool: &PgPool) -> Result<()> {
        sqlx::migrate!("migrations/postgres").run(pool).await?;
        Ok(())
    }

    /// PostgreSQL binding store.
    pub type PostgresBindingStore = super::SqlBindingStore<Postgres>;

    /// PostgreSQL deployment store.
    pub type PostgresDeploymentStore = super::SqlDeploymentStore<Postgres>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use sea_query::SqliteQueryBuilder;
    use sqlx::SqlitePool;

    use crate::storage::Result;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_delete(stmt: sea_query::DeleteStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }
    }

    /// Apply the SQLite migrations.
    pub async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("migrations/sqlite").run(pool).await?;
        Ok(())
    }

    /// SQLite binding store.
    pub type SqliteBindingStore = super::SqlBindingStore<Sqlite>;

    /// SQLite deployment store.
    pub type SqliteDeploymentStore = super::SqlDeploymentStore<Sqlite>;
}
