//! placebind: operator CLI for placeholder bindings
//!
//! ## Commands
//! - `migrate`: apply storage migrations
//! - `create <deployment>`: register a deployment
//! - `start-generation <deployment>`: move a deployment to a fresh generation
//! - `mark-successful <deployment>`: record the current generation as successful
//! - `bindings <set_id>`: list name -> id bindings of a generation
//! - `diff <from_set> <to_set>`: binding changes between two generations
//! - `changes <deployment>`: changes since the deployment's last successful generation
//! - `resolve <deployment> <name>`: resolve a name through the config server and record it
//!
//! ## Configuration
//! - PLACEBIND_CONFIG: path to a YAML config file (optional)
//! - PLACEBIND__*: config overrides, e.g. PLACEBIND__CONFIG_SERVER__URL
//! - PLACEBIND_CONFIG_SERVER_TOKEN: bearer token for the config server
//! - PLACEBIND_LOG: log filter (default: info)
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::collections::BTreeMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use placebind::config::Config;
use placebind::config_server::{build_deployment_client, StaticTokenProvider};
use placebind::interfaces::ConfigServerClient;
use placebind::placeholder::{GenerationDiff, PlaceholderManager};
use placebind::storage::{init_storage, Deployment, Storage, StorageError};
use placebind::utils::bootstrap::init_tracing;

/// Inspect and record config server placeholder bindings.
#[derive(Debug, Parser)]
#[command(name = "placebind", version)]
struct Args {
    /// YAML config file, layered over ./placebind.yaml.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending storage migrations.
    Migrate,
    /// Register a deployment and start its first generation.
    Create {
        deployment: String,
    },
    /// Move a deployment to a fresh generation before a deploy.
    StartGeneration {
        deployment: String,
    },
    /// Record a deployment's current generation as successfully deployed.
    MarkSuccessful {
        deployment: String,
    },
    /// List the bindings recorded under a generation.
    Bindings {
        set_id: String,
    },
    /// Show binding changes between two generations.
    Diff {
        from_set: String,
        to_set: String,
    },
    /// Show binding changes since a deployment's last successful generation.
    Changes {
        deployment: String,
    },
    /// Resolve a variable by name and record the binding for a deployment.
    Resolve {
        deployment: String,
        name: String,
    },
}

#[derive(Serialize)]
struct Resolution<'a> {
    deployment: &'a str,
    status: u16,
    name: Option<String>,
    id: Option<String>,
    set_id: String,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn require_deployment(storage: &Storage, name: &str) -> Result<Deployment, StorageError> {
    storage
        .deployments
        .find_by_name(name)
        .await?
        .ok_or_else(|| StorageError::DeploymentNotFound(name.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    // Storage init always migrates
    let storage = init_storage(&config.storage).await?;

    match args.command {
        Command::Migrate => {
            info!("Storage migrations applied");
        }
        Command::Create { deployment } => {
            storage.deployments.create(&deployment).await?;
            // Leave the shared 'initial' set
            storage.deployments.start_generation(&deployment).await?;
            print_json(&require_deployment(&storage, &deployment).await?)?;
        }
        Command::StartGeneration { deployment } => {
            storage.deployments.start_generation(&deployment).await?;
            print_json(&require_deployment(&storage, &deployment).await?)?;
        }
        Command::MarkSuccessful { deployment } => {
            storage.deployments.mark_generation_successful(&deployment).await?;
            print_json(&require_deployment(&storage, &deployment).await?)?;
        }
        Command::Bindings { set_id } => {
            let bindings: BTreeMap<String, String> = storage
                .bindings
                .bindings_for_generation(&set_id)
                .await?
                .into_iter()
                .collect();
            print_json(&bindings)?;
        }
        Command::Diff { from_set, to_set } => {
            let from = storage.bindings.bindings_for_generation(&from_set).await?;
            let to = storage.bindings.bindings_for_generation(&to_set).await?;
            print_json(&GenerationDiff::between(&from, &to))?;
        }
        Command::Changes { deployment } => {
            let placeholders =
                PlaceholderManager::new(deployment, storage.deployments, storage.bindings);
            print_json(&placeholders.changes_since_last_success().await?)?;
        }
        Command::Resolve { deployment, name } => {
            let credentials = Arc::new(StaticTokenProvider::from_config(&config.config_server)?);
            let placeholders = PlaceholderManager::new(
                deployment.as_str(),
                storage.deployments,
                storage.bindings,
            );
            let client = build_deployment_client(&config, credentials, placeholders.clone())?;

            let response = client.fetch_current_by_name(&name).await?;
            let var = if response.is_success() {
                Some(response.first_match()?)
            } else {
                None
            };

            print_json(&Resolution {
                deployment: &deployment,
                status: response.status.as_u16(),
                name: var.as_ref().map(|v| v.name.clone()),
                id: var.map(|v| v.id),
                set_id: placeholders.current_generation().await?,
            })?;
        }
    }

    Ok(())
}
