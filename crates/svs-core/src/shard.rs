use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use svs_common::error::{Result, SvsError};
use svs_common::metrics::ScoreMetric;
use svs_common::types::{IndexStats, Neighbor, Vector};
use svs_index::flat::FlatIndex;
use svs_index::traits::VectorIndex;

use crate::service::{check_dimensions, IndexService};

/// A shard: one partition of the vector set, served by a local index.
///
/// `ids_seen` records every ID this shard has ever observed, which makes
/// insert idempotent and tells upsert which IDs need removal before re-add.
pub struct ShardNode {
    dimension: usize,
    state: Mutex<ShardState>,
}

struct ShardState {
    ids_seen: HashSet<i64>,
    index: Box<dyn VectorIndex>,
}

impl ShardNode {
    pub fn new(dimension: usize, index: Box<dyn VectorIndex>) -> Self {
        Self {
            dimension,
            state: Mutex::new(ShardState {
                ids_seen: HashSet::new(),
                index,
            }),
        }
    }

    /// Convenience constructor backed by a brute-force index.
    pub fn with_metric(dimension: usize, metric: ScoreMetric) -> Self {
        Self::new(dimension, Box::new(FlatIndex::new(dimension, metric)))
    }
}

#[async_trait]
impl IndexService for ShardNode {
    async fn describe(&self) -> Result<IndexStats> {
        let state = self.state.lock();
        Ok(IndexStats {
            dimensions: self.dimension,
            num_vectors: state.index.ntotal() as u64,
        })
    }

    async fn insert(&self, vectors: Vec<Vector>) -> Result<()> {
        check_dimensions(&vectors, self.dimension)?;

        let mut state = self.state.lock();
        let mut ids = Vec::new();
        let mut staged = Vec::new();
        for vector in &vectors {
            if state.ids_seen.insert(vector.id) {
                ids.push(vector.id);
                staged.push(vector.raw.as_slice());
            } else {
                tracing::debug!("vector id={} already present, ignoring", vector.id);
            }
        }
        state.index.add(&ids, &staged)?;

        tracing::info!(
            "inserted {} of {} requested vectors, ntotal={}",
            ids.len(),
            vectors.len(),
            state.index.ntotal()
        );
        Ok(())
    }

    async fn upsert(&self, vectors: Vec<Vector>) -> Result<()> {
        check_dimensions(&vectors, self.dimension)?;
        let vectors = collapse_to_last(vectors);

        let mut state = self.state.lock();
        let to_replace: Vec<i64> = vectors
            .iter()
            .map(|v| v.id)
            .filter(|id| state.ids_seen.contains(id))
            .collect();
        state.index.remove(&to_replace)?;

        let ids: Vec<i64> = vectors.iter().map(|v| v.id).collect();
        let slices: Vec<&[f32]> = vectors.iter().map(|v| v.raw.as_slice()).collect();
        state.index.add(&ids, &slices)?;
        state.ids_seen.extend(ids.iter().copied());

        tracing::info!(
            "upserted {} vectors ({} updated, {} new), ntotal={}",
            ids.len(),
            to_replace.len(),
            ids.len() - to_replace.len(),
            state.index.ntotal()
        );
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(SvsError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let hits = {
            let state = self.state.lock();
            state.index.search(query, k)?
        };

        let mut neighbors: Vec<Neighbor> = hits
            .into_iter()
            .map(|(id, score)| Neighbor::new(id, score))
            .collect();
        neighbors.resize(k, Neighbor::SENTINEL);
        Ok(neighbors)
    }
}

/// Keep only the last occurrence of each ID, preserving request order
/// otherwise. Upsert semantics are last-write-wins within a request.
pub(crate) fn collapse_to_last(vectors: Vec<Vector>) -> Vec<Vector> {
    let mut last: HashMap<i64, usize> = HashMap::with_capacity(vectors.len());
    for (pos, vector) in vectors.iter().enumerate() {
        last.insert(vector.id, pos);
    }
    vectors
        .into_iter()
        .enumerate()
        .filter(|(pos, vector)| last[&vector.id] == *pos)
        .map(|(_, vector)| vector)
        .collect()
}
