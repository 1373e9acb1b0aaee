/// Worker node operations for container clusters
use anyhow::{Context, Result};
use tracing::info;

use super::client::ClusterClient;
use super::models::{ClusterTargetHeader, Worker, WorkerParam};

/// Worker manager for adding, inspecting and removing cluster workers
#[derive(Clone)]
pub struct WorkerManager {
    client: ClusterClient,
}

impl WorkerManager {
    /// Create a new worker manager
    pub fn new(client: ClusterClient) -> Self {
        Self { client }
    }

    /// Add workers to a cluster
    pub async fn add(
        &self,
        cluster_name: &str,
        params: &WorkerParam,
        target: &ClusterTargetHeader,
    ) -> Result<()> {
        info!(
            "Adding workers to cluster {} (action: {}, count: {})",
            cluster_name, params.action, params.count
        );
        self.client
            .post(&["v1", "clusters", cluster_name, "workers"], params, target)
            .await
            .with_context(|| format!("Failed to add workers to cluster {}", cluster_name))
    }

    /// Get a worker by ID
    pub async fn get(&self, worker_id: &str, target: &ClusterTargetHeader) -> Result<Worker> {
        self.client
            .get(&["v1", "workers", worker_id], target)
            .await
            .with_context(|| format!("Failed to get worker {}", worker_id))
    }

    /// List all workers of a cluster
    pub async fn list(
        &self,
        cluster_name: &str,
        target: &ClusterTargetHeader,
    ) -> Result<Vec<Worker>> {
        self.client
            .get(&["v1", "clusters", cluster_name, "workers"], target)
            .await
            .with_context(|| format!("Failed to list workers of cluster {}", cluster_name))
    }

    /// Update a worker, e.g. reboot or reload it
    pub async fn update(
        &self,
        cluster_name: &str,
        worker_id: &str,
        params: &WorkerParam,
        target: &ClusterTargetHeader,
    ) -> Result<()> {
        info!(
            "Updating worker {} in cluster {} (action: {})",
            worker_id, cluster_name, params.action
        );
        self.client
            .put(
                &["v1", "clusters", cluster_name, "workers", worker_id],
                params,
                target,
            )
            .await
            .with_context(|| format!("Failed to update worker {}", worker_id))
    }

    /// Remove a worker from a cluster
    pub async fn delete(
        &self,
        cluster_name: &str,
        worker_id: &str,
        target: &ClusterTargetHeader,
    ) -> Result<()> {
        info!("Deleting worker {} from cluster {}", worker_id, cluster_name);
        self.client
            .delete(
                &["v1", "clusters", cluster_name, "workers", worker_id],
                target,
            )
            .await
            .with_context(|| format!("Failed to delete worker {}", worker_id))
    }
}
