/// k8scluster - container cluster worker management
///
/// A Rust command-line client for the worker endpoints of a container
/// cluster management API.
mod config;
mod k8scluster;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use reqwest::StatusCode;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{SessionConfig, IAM_TOKEN_ENV};
use crate::k8scluster::client::ApiError;
use crate::k8scluster::models::{ClusterTargetHeader, Worker, WorkerAction, WorkerParam};
use crate::k8scluster::{ClusterClient, WorkerManager};

#[derive(Parser)]
#[command(name = "k8scluster")]
#[command(about = "Manage container cluster workers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "cluster.yaml")]
    config: PathBuf,

    /// Organization ID (overrides config)
    #[arg(long, global = true)]
    org: Option<String>,

    /// Space ID (overrides config)
    #[arg(long, global = true)]
    space: Option<String>,

    /// Account ID (overrides config)
    #[arg(long, global = true)]
    account: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate example configuration file
    Init,

    /// Add workers to a cluster
    Add {
        /// Cluster name or ID
        #[arg(long)]
        cluster: String,

        /// Number of workers to add
        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Show one or more workers
    Get {
        /// Worker IDs
        #[arg(required = true)]
        workers: Vec<String>,
    },

    /// List the workers of a cluster
    List {
        /// Cluster name or ID
        #[arg(long)]
        cluster: String,
    },

    /// Reboot, reload or otherwise update a worker
    Update {
        /// Cluster name or ID
        #[arg(long)]
        cluster: String,

        /// Action to perform on the worker
        #[arg(long)]
        action: WorkerAction,

        /// Worker count passed along with the action
        #[arg(long, default_value_t = 0)]
        count: u32,

        /// Worker ID
        worker: String,
    },

    /// Remove a worker from a cluster
    Delete {
        /// Cluster name or ID
        #[arg(long)]
        cluster: String,

        /// Worker ID
        worker: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("k8scluster={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = match &cli.command {
        Commands::Init => init_config(&cli).await,
        Commands::Add { cluster, count } => add_workers(&cli, cluster, *count).await,
        Commands::Get { workers } => get_workers(&cli, workers).await,
        Commands::List { cluster } => list_workers(&cli, cluster).await,
        Commands::Update {
            cluster,
            action,
            count,
            worker,
        } => {
            let params = WorkerParam::new(action.clone(), *count);
            update_worker(&cli, cluster, worker, params).await
        }
        Commands::Delete { cluster, worker } => delete_worker(&cli, cluster, worker).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        if let Some(api_error) = e.downcast_ref::<ApiError>() {
            let status = api_error.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                error!("Check that {} holds a valid IAM token", IAM_TOKEN_ENV);
            }
        }
        std::process::exit(1);
    }
}

/// Load the session and build the worker manager and request target
fn connect(cli: &Cli) -> Result<(WorkerManager, ClusterTargetHeader)> {
    let config = SessionConfig::from_file(&cli.config).context("Failed to load configuration")?;

    let client = ClusterClient::from_config(&config)?;
    let target = resolve_target(cli, config.target);

    Ok((WorkerManager::new(client), target))
}

/// Apply command-line overrides to the configured target
fn resolve_target(cli: &Cli, mut target: ClusterTargetHeader) -> ClusterTargetHeader {
    if let Some(org) = &cli.org {
        target.org_id = org.clone();
    }
    if let Some(space) = &cli.space {
        target.space_id = space.clone();
    }
    if let Some(account) = &cli.account {
        target.account_id = account.clone();
    }
    target
}

fn log_worker(worker: &Worker) {
    let or_na = |s: &str| {
        if s.is_empty() {
            "N/A".to_string()
        } else {
            s.to_string()
        }
    };
    info!(
        "  - {} (State: {}, Status: {}, Type: {}, Version: {})",
        or_na(&worker.id),
        or_na(&worker.state),
        or_na(&worker.status),
        or_na(&worker.machine_type),
        or_na(&worker.kube_version)
    );
    info!(
        "    Public IP: {} (VLAN: {}), Private IP: {} (VLAN: {})",
        or_na(&worker.public_ip),
        or_na(&worker.public_vlan),
        or_na(&worker.private_ip),
        or_na(&worker.private_vlan)
    );
    if !worker.error_message.is_empty() {
        warn!("    Error: {}", worker.error_message);
    }
}

/// Initialize example configuration file
async fn init_config(cli: &Cli) -> Result<()> {
    if cli.config.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            cli.config.display()
        );
    }

    let yaml = serde_yaml::to_string(&SessionConfig::example())?;

    tokio::fs::write(&cli.config, yaml)
        .await
        .context("Failed to write configuration file")?;

    info!("Example configuration created: {}", cli.config.display());
    info!("");
    info!("Next steps:");
    info!("  1. Set the API endpoint and target IDs in the configuration file");
    info!("  2. Set your IAM token:");
    info!("     export {}=your-token-here", IAM_TOKEN_ENV);
    info!("  3. List the workers of a cluster:");
    info!("     k8scluster list --cluster my-cluster");

    Ok(())
}

/// Add workers to a cluster
async fn add_workers(cli: &Cli, cluster: &str, count: u32) -> Result<()> {
    let (workers, target) = connect(cli)?;

    workers
        .add(cluster, &WorkerParam::new(WorkerAction::Add, count), &target)
        .await?;

    info!("✓ Requested {} new worker(s) for cluster {}", count, cluster);
    Ok(())
}

/// Show workers by ID
async fn get_workers(cli: &Cli, ids: &[String]) -> Result<()> {
    let (workers, target) = connect(cli)?;

    let results = join_all(ids.iter().map(|id| workers.get(id, &target))).await;

    let mut failed = 0;
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(worker) => log_worker(&worker),
            Err(e) => {
                warn!("Could not get worker {}: {:#}", id, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} worker lookups failed", failed, ids.len());
    }
    Ok(())
}

/// List the workers of a cluster
async fn list_workers(cli: &Cli, cluster: &str) -> Result<()> {
    let (workers, target) = connect(cli)?;

    let mut list = workers.list(cluster, &target).await?;

    if list.is_empty() {
        info!("No workers found for cluster: {}", cluster);
        return Ok(());
    }

    list.sort_by(|a, b| a.id.cmp(&b.id));

    info!("Cluster: {}", cluster);
    info!("Workers:");
    for worker in &list {
        log_worker(worker);
    }

    Ok(())
}

/// Apply an action to a worker
async fn update_worker(cli: &Cli, cluster: &str, worker: &str, params: WorkerParam) -> Result<()> {
    let (workers, target) = connect(cli)?;

    workers.update(cluster, worker, &params, &target).await?;

    info!("✓ Worker {} {} requested", worker, params.action);
    Ok(())
}

/// Remove a worker from a cluster
async fn delete_worker(cli: &Cli, cluster: &str, worker: &str) -> Result<()> {
    let (workers, target) = connect(cli)?;

    workers.delete(cluster, worker, &target).await?;

    info!("✓ Worker {} removed from cluster {}", worker, cluster);
    Ok(())
}
