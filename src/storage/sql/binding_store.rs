//! Unified SQL BindingStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of BindingStore.
///
/// Uniqueness of `(placeholder_name, set_id)` comes from the `placeholder_set`
/// index; concurrent inserts are arbitrated by the database, not here.
pub struct SqlBindingStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlBindingStore<DB> {
    /// Create a new SQL binding store with the given pool.
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

/// Macro to implement BindingStore for a specific SQL backend.
macro_rules! impl_binding_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::BindingStore for SqlBindingStore<$db_type> {
            async fn record_binding(
                &self,
                mapping: &crate::storage::PlaceholderMapping,
            ) -> crate::storage::Result<()> {
                use sea_query::Query;

                use crate::storage::schema::PlaceholderMappings;
                use crate::storage::StorageError;

                let stmt = Query::insert()
                    .into_table(PlaceholderMappings::Table)
                    .columns([
                        PlaceholderMappings::PlaceholderName,
                        PlaceholderMappings::PlaceholderId,
                        PlaceholderMappings::DeploymentId,
                        PlaceholderMappings::SetId,
                    ])
                    .values_panic([
                        mapping.placeholder_name.as_str().into(),
                        mapping.placeholder_id.as_str().into(),
                        mapping.deployment_id.into(),
                        mapping.set_id.as_str().into(),
                    ])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        super::map_insert_error(e, || StorageError::BindingAlreadyExists {
                            name: mapping.placeholder_name.clone(),
                            set_id: mapping.set_id.clone(),
                        })
                    })?;

                Ok(())
            }

            async fn bindings_for_generation(
                &self,
                set_id: &str,
            ) -> crate::storage::Result<std::collections::HashMap<String, String>> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                use crate::storage::schema::PlaceholderMappings;

                let stmt = Query::select()
                    .columns([
                        PlaceholderMappings::PlaceholderName,
                        PlaceholderMappings::PlaceholderId,
                    ])
                    .from(PlaceholderMappings::Table)
                    .and_where(Expr::col(PlaceholderMappings::SetId).eq(set_id))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

                let mut mappings = std::collections::HashMap::with_capacity(rows.len());
                for row in rows {
                    let name: String = row.get("placeholder_name");
                    let id: String = row.get("placeholder_id");
                    mappings.insert(name, id);
                }

                Ok(mappings)
            }

            async fn find_binding(
                &self,
                name: &str,
                set_id: &str,
            ) -> crate::storage::Result<Option<crate::storage::PlaceholderMapping>> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                use crate::storage::schema::PlaceholderMappings;
                use crate::storage::PlaceholderMapping;

                let stmt = Query::select()
                    .columns([
                        PlaceholderMappings::PlaceholderName,
                        PlaceholderMappings::PlaceholderId,
                        PlaceholderMappings::DeploymentId,
                        PlaceholderMappings::SetId,
                    ])
                    .from(PlaceholderMappings::Table)
                    .and_where(Expr::col(PlaceholderMappings::PlaceholderName).eq(name))
                    .and_where(Expr::col(PlaceholderMappings::SetId).eq(set_id))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                Ok(row.map(|row| PlaceholderMapping {
                    placeholder_name: row.get("placeholder_name"),
                    placeholder_id: row.get("placeholder_id"),
                    deployment_id: row.get("deployment_id"),
                    set_id: row.get("set_id"),
                }))
            }

            async fn bindings_for_deployment(
                &self,
                deployment_id: i64,
            ) -> crate::storage::Result<Vec<crate::storage::PlaceholderMapping>> {
                use sea_query::{Expr, Order, Query};
                use sqlx::Row;

                use crate::storage::schema::PlaceholderMappings;
                use crate::storage::PlaceholderMapping;

                let stmt = Query::select()
                    .columns([
                        PlaceholderMappings::PlaceholderName,
                        PlaceholderMappings::PlaceholderId,
                        PlaceholderMappings::DeploymentId,
                        PlaceholderMappings::SetId,
                    ])
                    .from(PlaceholderMappings::Table)
                    .and_where(Expr::col(PlaceholderMappings::DeploymentId).eq(deployment_id))
                    .order_by(PlaceholderMappings::Id, Order::Asc)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

                Ok(rows
                    .into_iter()
                    .map(|row| PlaceholderMapping {
                        placeholder_name: row.get("placeholder_name"),
                        placeholder_id: row.get("placeholder_id"),
                        deployment_id: row.get("deployment_id"),
                        set_id: row.get("set_id"),
                    })
                    .collect())
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_binding_store!(super::postgres::Postgres, "postgres");
impl_binding_store!(super::sqlite::Sqlite, "sqlite");
