//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! The DDL itself lives in the versioned migrations under `migrations/`.

use sea_query::Iden;

/// Placeholder bindings table schema.
#[derive(Iden)]
pub enum PlaceholderMappings {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "placeholder_name"]
    PlaceholderName,
    #[iden = "placeholder_id"]
    PlaceholderId,
    #[iden = "deployment_id"]
    DeploymentId,
    #[iden = "set_id"]
    SetId,
}

/// Deployments table schema (the columns this crate touches).
#[derive(Iden)]
pub enum Deployments {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "placeholder_set_id"]
    PlaceholderSetId,
    #[iden = "successful_placeholder_set_id"]
    SuccessfulPlaceholderSetId,
}
