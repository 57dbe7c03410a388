use async_trait::async_trait;
use svs_common::error::Result;
use svs_common::types::{IndexStats, Neighbor, Vector};

/// The capability every index node exposes: the router in front of a cluster
/// and each shard within it speak exactly this contract, so a router can sit
/// on top of local nodes, remote clients, or other routers interchangeably.
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Report the configured dimension and the number of vectors held.
    async fn describe(&self) -> Result<IndexStats>;

    /// Add vectors whose IDs are not yet present; known IDs are silently
    /// ignored.
    async fn insert(&self, vectors: Vec<Vector>) -> Result<()>;

    /// Update vectors in place where the ID is known, add the rest.
    async fn upsert(&self, vectors: Vec<Vector>) -> Result<()>;

    /// Return exactly `k` neighbors of `query`, best first, padded with
    /// sentinels when fewer than `k` vectors exist.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

// Shared handles speak the contract too, so a caller can keep a reference to
// a shard it hands to a router.
#[async_trait]
impl<S: IndexService + ?Sized> IndexService for std::sync::Arc<S> {
    async fn describe(&self) -> Result<IndexStats> {
        (**self).describe().await
    }

    async fn insert(&self, vectors: Vec<Vector>) -> Result<()> {
        (**self).insert(vectors).await
    }

    async fn upsert(&self, vectors: Vec<Vector>) -> Result<()> {
        (**self).upsert(vectors).await
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        (**self).search(query, k).await
    }
}

/// Reject any vector whose length differs from the configured dimension.
pub(crate) fn check_dimensions(vectors: &[Vector], expected: usize) -> Result<()> {
    for vector in vectors {
        if vector.raw.len() != expected {
            return Err(svs_common::error::SvsError::DimensionMismatch {
                expected,
                actual: vector.raw.len(),
            });
        }
    }
    Ok(())
}
