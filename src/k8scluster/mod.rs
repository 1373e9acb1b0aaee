/// Container cluster management API client implementation
pub mod client;
pub mod models;
#[cfg(test)]
pub(crate) mod stub;
pub mod workers;

pub use client::ClusterClient;
pub use workers::WorkerManager;
