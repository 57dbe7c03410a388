use std::collections::HashSet;

use parking_lot::RwLock;
use svs_common::error::{Result, SvsError};
use svs_common::metrics::ScoreMetric;

use crate::traits::{ScoredId, VectorIndex};

/// Brute-force vector index scoring every stored vector against the query.
pub struct FlatIndex {
    dimension: usize,
    metric: ScoreMetric,
    data: RwLock<FlatData>,
}

struct FlatData {
    ids: Vec<i64>,
    vectors: Vec<f32>, // flattened: len = ids.len() * dimension
}

impl FlatIndex {
    pub fn new(dimension: usize, metric: ScoreMetric) -> Self {
        Self {
            dimension,
            metric,
            data: RwLock::new(FlatData {
                ids: Vec::new(),
                vectors: Vec::new(),
            }),
        }
    }
}

impl VectorIndex for FlatIndex {
    fn add(&self, ids: &[i64], vectors: &[&[f32]]) -> Result<()> {
        if ids.len() != vectors.len() {
            return Err(SvsError::InvalidArgument(
                "ids and vectors length mismatch".to_string(),
            ));
        }
        let mut data = self.data.write();
        for (id, vec) in ids.iter().zip(vectors.iter()) {
            if vec.len() != self.dimension {
                return Err(SvsError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vec.len(),
                });
            }
            data.ids.push(*id);
            data.vectors.extend_from_slice(vec);
        }
        Ok(())
    }

    fn remove(&self, ids: &[i64]) -> Result<usize> {
        let doomed: HashSet<i64> = ids.iter().copied().collect();
        let mut data = self.data.write();

        let mut kept_ids = Vec::with_capacity(data.ids.len());
        let mut kept_vectors = Vec::with_capacity(data.vectors.len());
        let mut removed = 0;
        for (row, id) in data.ids.iter().enumerate() {
            if doomed.contains(id) {
                removed += 1;
                continue;
            }
            kept_ids.push(*id);
            let start = row * self.dimension;
            kept_vectors.extend_from_slice(&data.vectors[start..start + self.dimension]);
        }
        data.ids = kept_ids;
        data.vectors = kept_vectors;
        Ok(removed)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredId>> {
        if query.len() != self.dimension {
            return Err(SvsError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let data = self.data.read();
        let n = data.ids.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut results: Vec<ScoredId> = (0..n)
            .map(|i| {
                let start = i * self.dimension;
                let vec = &data.vectors[start..start + self.dimension];
                (data.ids[i], self.metric.compute(query, vec))
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    fn ntotal(&self) -> usize {
        self.data.read().ids.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
