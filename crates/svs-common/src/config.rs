use serde::{Deserialize, Serialize};

use crate::metrics::ScoreMetric;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardConfig {
    pub port: u16,
    pub dimensions: usize,
    #[serde(default)]
    pub metric: ScoreMetric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub port: u16,
    pub dimensions: usize,
    /// Maximum number of vectors each shard may own.
    pub shard_capacity: u32,
    /// Shard endpoints in fill order; position is shard identity.
    pub shard_addrs: Vec<String>,
}
