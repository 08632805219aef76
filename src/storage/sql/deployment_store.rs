//! Unified SQL DeploymentStore implementation.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of DeploymentStore.
pub struct SqlDeploymentStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlDeploymentStore<DB> {
    /// Create a new SQL deployment store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }
}

/// Macro to implement DeploymentStore for a specific SQL backend.
macro_rules! impl_deployment_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::DeploymentStore for SqlDeploymentStore<$db_type> {
            async fn find_by_name(
                &self,
                name: &str,
            ) -> crate::storage::Result<Option<crate::storage::Deployment>> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                use crate::storage::schema::Deployments;
                use crate::storage::Deployment;

                let stmt = Query::select()
                    .columns([
                        Deployments::Id,
                        Deployments::Name,
                        Deployments::PlaceholderSetId,
                        Deployments::SuccessfulPlaceholderSetId,
                    ])
                    .from(Deployments::Table)
                    .and_where(Expr::col(Deployments::Name).eq(name))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                Ok(row.map(|row| Deployment {
                    id: row.get("id"),
                    name: row.get("name"),
                    placeholder_set_id: row.get("placeholder_set_id"),
                    successful_placeholder_set_id: row.get("successful_placeholder_set_id"),
                }))
            }

            async fn create(&self, name: &str) -> crate::storage::Result<crate::storage::Deployment> {
                use sea_query::Query;

                use crate::storage::schema::Deployments;
                use crate::storage::{StorageError, INITIAL_SET_ID};

                let stmt = Query::insert()
                    .into_table(Deployments::Table)
                    .columns([Deployments::Name, Deployments::PlaceholderSetId])
                    .values_panic([name.into(), INITIAL_SET_ID.into()])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        super::map_insert_error(e, || {
                            StorageError::DeploymentAlreadyExists(name.to_string())
                        })
                    })?;

                self.find_by_name(name)
                    .await?
                    .ok_or_else(|| StorageError::DeploymentNotFound(name.to_string()))
            }

            async fn start_generation(&self, name: &str) -> crate::storage::Result<String> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Deployments;
                use crate::storage::{new_set_id, StorageError};

                let set_id = new_set_id();
                let stmt = Query::update()
                    .table(Deployments::Table)
                    .value(Deployments::PlaceholderSetId, set_id.as_str())
                    .and_where(Expr::col(Deployments::Name).eq(name))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::DeploymentNotFound(name.to_string()));
                }

                tracing::info!(deployment = %name, set_id = %set_id, "Started placeholder generation");
                Ok(set_id)
            }

            async fn mark_generation_successful(&self, name: &str) -> crate::storage::Result<()> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Deployments;
                use crate::storage::StorageError;

                let stmt = Query::update()
                    .table(Deployments::Table)
                    .value(
                        Deployments::SuccessfulPlaceholderSetId,
                        Expr::col(Deployments::PlaceholderSetId),
                    )
                    .and_where(Expr::col(Deployments::Name).eq(name))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::DeploymentNotFound(name.to_string()));
                }

                Ok(())
            }

            async fn delete(&self, name: &str) -> crate::storage::Result<()> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Deployments;

                let stmt = Query::delete()
                    .from_table(Deployments::Table)
                    .and_where(Expr::col(Deployments::Name).eq(name))
                    .to_owned();

                let sql = <$db_type>::build_delete(stmt);
                sqlx::query(&sql).execute(&self.pool).await?;

                Ok(())
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_deployment_store!(super::postgres::Postgres, "postgres");
impl_deployment_store!(super::sqlite::Sqlite, "sqlite");
