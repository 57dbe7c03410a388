use svs_common::error::Result;

/// A scored hit: (vector id, similarity score).
pub type ScoredId = (i64, f32);

/// Trait for shard-local vector index implementations.
pub trait VectorIndex: Send + Sync {
    /// Add vectors under the given IDs. `ids` and `vectors` run in lockstep.
    fn add(&self, ids: &[i64], vectors: &[&[f32]]) -> Result<()>;

    /// Remove the vectors with the given IDs, returning how many were
    /// actually removed. Unknown IDs are ignored.
    fn remove(&self, ids: &[i64]) -> Result<usize>;

    /// Return up to `k` hits for `query`, best first (descending score).
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredId>>;

    /// Number of vectors currently in the index.
    fn ntotal(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.ntotal() == 0
    }

    /// Dimension of vectors in this index.
    fn dimension(&self) -> usize;
}
