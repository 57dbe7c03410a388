use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use svs_common::error::{Result, SvsError};
use svs_common::metrics::ScoreMetric;
use svs_common::types::{IndexStats, Neighbor, Vector};
use svs_core::router::Router;
use svs_core::service::IndexService;
use svs_core::shard::ShardNode;

fn shard(dimensions: usize) -> Arc<ShardNode> {
    Arc::new(ShardNode::with_metric(dimensions, ScoreMetric::InnerProduct))
}

/// Two-shard cluster with shared handles so tests can observe each shard
/// directly alongside the router.
fn two_shard_cluster(
    dimensions: usize,
    shard_capacity: u32,
) -> (Router<Arc<ShardNode>>, Arc<ShardNode>, Arc<ShardNode>) {
    let a = shard(dimensions);
    let b = shard(dimensions);
    let router = Router::new(dimensions, shard_capacity, vec![a.clone(), b.clone()]);
    (router, a, b)
}

fn v(id: i64, raw: &[f32]) -> Vector {
    Vector::new(id, raw.to_vec())
}

#[tokio::test]
async fn test_insert_fills_shards_in_order() {
    let (router, a, b) = two_shard_cluster(2, 2);

    router
        .insert(vec![
            v(1, &[1.0, 0.0]),
            v(2, &[0.0, 1.0]),
            v(3, &[0.5, 0.5]),
        ])
        .await
        .unwrap();

    assert_eq!(a.describe().await.unwrap().num_vectors, 2);
    assert_eq!(b.describe().await.unwrap().num_vectors, 1);

    let stats = router.describe().await.unwrap();
    assert_eq!(stats.dimensions, 2);
    assert_eq!(stats.num_vectors, 3);
}

#[tokio::test]
async fn test_insert_past_capacity_leaves_state_unchanged() {
    let (router, a, b) = two_shard_cluster(2, 2);
    router
        .insert(vec![
            v(1, &[1.0, 0.0]),
            v(2, &[0.0, 1.0]),
            v(3, &[0.5, 0.5]),
        ])
        .await
        .unwrap();

    // One free slot left; three new vectors cannot fit.
    let err = router
        .insert(vec![
            v(4, &[1.0, 0.0]),
            v(5, &[0.0, 1.0]),
            v(6, &[0.5, 0.5]),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, SvsError::CapacityExhausted));

    assert_eq!(a.describe().await.unwrap().num_vectors, 2);
    assert_eq!(b.describe().await.unwrap().num_vectors, 1);
    assert_eq!(router.describe().await.unwrap().num_vectors, 3);
}

#[tokio::test]
async fn test_insert_ignores_duplicates_without_charging_capacity() {
    let (router, a, b) = two_shard_cluster(2, 2);
    router
        .insert(vec![
            v(1, &[1.0, 0.0]),
            v(2, &[0.0, 1.0]),
            v(3, &[0.5, 0.5]),
        ])
        .await
        .unwrap();

    // All three IDs are placed; only id=4 is new and the single free slot
    // holds it. The duplicates must not count toward the capacity check.
    router
        .insert(vec![
            v(1, &[9.0, 9.0]),
            v(2, &[9.0, 9.0]),
            v(3, &[9.0, 9.0]),
            v(4, &[0.25, 0.75]),
        ])
        .await
        .unwrap();

    assert_eq!(a.describe().await.unwrap().num_vectors, 2);
    assert_eq!(b.describe().await.unwrap().num_vectors, 2);
    assert_eq!(router.describe().await.unwrap().num_vectors, 4);
}

#[tokio::test]
async fn test_insert_is_idempotent() {
    let (router, a, b) = two_shard_cluster(2, 4);
    let batch = vec![v(1, &[1.0, 0.0]), v(2, &[0.0, 1.0]), v(3, &[0.5, 0.5])];

    router.insert(batch.clone()).await.unwrap();
    router.insert(batch).await.unwrap();

    assert_eq!(a.describe().await.unwrap().num_vectors, 3);
    assert_eq!(b.describe().await.unwrap().num_vectors, 0);
    assert_eq!(router.describe().await.unwrap().num_vectors, 3);
}

#[tokio::test]
async fn test_upsert_updates_in_place_and_packs_new() {
    let (router, a, b) = two_shard_cluster(2, 2);
    router
        .insert(vec![
            v(1, &[1.0, 0.0]),
            v(2, &[0.0, 1.0]),
            v(3, &[0.5, 0.5]),
        ])
        .await
        .unwrap();

    // id=2 lives on shard 0 and is updated there; id=4 is new and fills
    // shard 1 to capacity.
    router
        .upsert(vec![v(2, &[0.1, 0.9]), v(4, &[0.6, 0.4])])
        .await
        .unwrap();

    assert_eq!(a.describe().await.unwrap().num_vectors, 2);
    assert_eq!(b.describe().await.unwrap().num_vectors, 2);
    assert_eq!(router.describe().await.unwrap().num_vectors, 4);

    // The update reached id=2's owning shard.
    let hits = a.search(&[0.0, 1.0], 1).await.unwrap();
    assert_eq!(hits[0].id, 2);
    assert!((hits[0].score - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let (router, a, b) = two_shard_cluster(2, 4);
    let batch = vec![v(1, &[1.0, 0.0]), v(2, &[0.0, 1.0])];

    router.upsert(batch.clone()).await.unwrap();
    let first_a = a.describe().await.unwrap().num_vectors;
    let first_b = b.describe().await.unwrap().num_vectors;

    router.upsert(batch).await.unwrap();
    assert_eq!(a.describe().await.unwrap().num_vectors, first_a);
    assert_eq!(b.describe().await.unwrap().num_vectors, first_b);
    assert_eq!(router.describe().await.unwrap().num_vectors, 2);
}

#[tokio::test]
async fn test_upsert_past_capacity_leaves_state_unchanged() {
    let (router, a, b) = two_shard_cluster(2, 1);
    router.insert(vec![v(1, &[1.0, 0.0])]).await.unwrap();

    let err = router
        .upsert(vec![
            v(1, &[0.0, 1.0]),
            v(2, &[1.0, 0.0]),
            v(3, &[0.5, 0.5]),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, SvsError::CapacityExhausted));

    assert_eq!(a.describe().await.unwrap().num_vectors, 1);
    assert_eq!(b.describe().await.unwrap().num_vectors, 0);

    // The rejected update must not have touched id=1 either.
    let hits = a.search(&[1.0, 0.0], 1).await.unwrap();
    assert_eq!(hits[0].id, 1);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_search_merges_across_shards() {
    let (router, _a, _b) = two_shard_cluster(2, 2);
    router
        .insert(vec![
            v(10, &[1.0, 0.0]),
            v(11, &[0.9, 0.1]),
            v(12, &[0.2, 0.8]),
        ])
        .await
        .unwrap();

    let neighbors = router.search(&[1.0, 0.0], 2).await.unwrap();
    assert_eq!(neighbors.len(), 2);
    assert_eq!(neighbors[0], Neighbor::new(10, 1.0));
    assert!((neighbors[1].score - 0.9).abs() < 1e-6);
    assert_eq!(neighbors[1].id, 11);
}

#[tokio::test]
async fn test_search_skips_empty_shards() {
    let (router, _a, b) = two_shard_cluster(2, 4);
    // Both vectors fit on shard 0; shard 1 stays empty and is never queried.
    router
        .insert(vec![v(10, &[1.0, 0.0]), v(11, &[0.9, 0.1])])
        .await
        .unwrap();
    assert_eq!(b.describe().await.unwrap().num_vectors, 0);

    let neighbors = router.search(&[1.0, 0.0], 2).await.unwrap();
    assert_eq!(neighbors[0].id, 10);
    assert!((neighbors[0].score - 1.0).abs() < 1e-6);
    assert_eq!(neighbors[1].id, 11);
    assert!((neighbors[1].score - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_search_empty_cluster_returns_sentinels() {
    let (router, _a, _b) = two_shard_cluster(2, 2);

    let neighbors = router.search(&[1.0, 0.0], 2).await.unwrap();
    assert_eq!(neighbors.len(), 2);
    assert!(neighbors.iter().all(|n| n.is_sentinel()));
}

#[tokio::test]
async fn test_search_pads_when_cluster_has_fewer_than_k() {
    let (router, _a, _b) = two_shard_cluster(2, 2);
    router.insert(vec![v(1, &[1.0, 0.0])]).await.unwrap();

    let neighbors = router.search(&[1.0, 0.0], 4).await.unwrap();
    assert_eq!(neighbors.len(), 4);
    assert_eq!(neighbors[0].id, 1);
    assert!(neighbors[1..].iter().all(|n| n.is_sentinel()));
}

#[tokio::test]
async fn test_dimension_mismatch_rejected_without_mutation() {
    let (router, a, b) = two_shard_cluster(2, 2);

    let err = router
        .insert(vec![v(1, &[1.0, 0.0]), v(2, &[1.0, 0.0, 0.0])])
        .await
        .unwrap_err();
    assert!(matches!(err, SvsError::DimensionMismatch { .. }));

    let err = router.upsert(vec![v(3, &[1.0])]).await.unwrap_err();
    assert!(matches!(err, SvsError::DimensionMismatch { .. }));

    let err = router.search(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
    assert!(matches!(err, SvsError::DimensionMismatch { .. }));

    assert_eq!(a.describe().await.unwrap().num_vectors, 0);
    assert_eq!(b.describe().await.unwrap().num_vectors, 0);
}

#[tokio::test]
async fn test_capacity_bound_holds_after_mixed_operations() {
    let (router, a, b) = two_shard_cluster(2, 3);

    router
        .insert(vec![v(1, &[1.0, 0.0]), v(2, &[0.0, 1.0])])
        .await
        .unwrap();
    router
        .upsert(vec![v(2, &[0.3, 0.7]), v(3, &[0.5, 0.5]), v(4, &[0.7, 0.3])])
        .await
        .unwrap();
    router.insert(vec![v(5, &[0.2, 0.8])]).await.unwrap();

    let on_a = a.describe().await.unwrap().num_vectors;
    let on_b = b.describe().await.unwrap().num_vectors;
    assert!(on_a <= 3);
    assert!(on_b <= 3);
    assert_eq!(on_a + on_b, 5);
    assert_eq!(router.describe().await.unwrap().num_vectors, 5);
}

/// Delegates to a real shard until told to fail, for exercising partial
/// commit semantics.
struct FlakyShard {
    inner: ShardNode,
    failing: AtomicBool,
}

impl FlakyShard {
    fn new(dimensions: usize) -> Self {
        Self {
            inner: ShardNode::with_metric(dimensions, ScoreMetric::InnerProduct),
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SvsError::Transport("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IndexService for FlakyShard {
    async fn describe(&self) -> Result<IndexStats> {
        self.check()?;
        self.inner.describe().await
    }

    async fn insert(&self, vectors: Vec<Vector>) -> Result<()> {
        self.check()?;
        self.inner.insert(vectors).await
    }

    async fn upsert(&self, vectors: Vec<Vector>) -> Result<()> {
        self.check()?;
        self.inner.upsert(vectors).await
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check()?;
        self.inner.search(query, k).await
    }
}

#[tokio::test]
async fn test_insert_partial_failure_commits_earlier_shards_and_retry_heals() {
    let a = Arc::new(FlakyShard::new(2));
    let b = Arc::new(FlakyShard::new(2));
    let router = Router::new(2, 2, vec![a.clone(), b.clone()]);

    b.set_failing(true);
    let batch = vec![
        v(1, &[1.0, 0.0]),
        v(2, &[0.0, 1.0]),
        v(3, &[0.5, 0.5]),
    ];
    let err = router.insert(batch.clone()).await.unwrap_err();
    assert!(matches!(err, SvsError::ShardUnavailable { shard: 1, .. }));

    // Shard 0's batch stays committed.
    assert_eq!(a.describe().await.unwrap().num_vectors, 2);

    // The client retries the identical request once the shard recovers; the
    // committed IDs are ignored and only the missing one lands.
    b.set_failing(false);
    router.insert(batch).await.unwrap();
    assert_eq!(a.describe().await.unwrap().num_vectors, 2);
    assert_eq!(b.describe().await.unwrap().num_vectors, 1);
    assert_eq!(router.describe().await.unwrap().num_vectors, 3);
}

#[tokio::test]
async fn test_search_fails_when_a_queried_shard_is_down() {
    let a = Arc::new(FlakyShard::new(2));
    let b = Arc::new(FlakyShard::new(2));
    let router = Router::new(2, 2, vec![a.clone(), b.clone()]);

    router
        .insert(vec![
            v(1, &[1.0, 0.0]),
            v(2, &[0.0, 1.0]),
            v(3, &[0.5, 0.5]),
        ])
        .await
        .unwrap();

    b.set_failing(true);
    let err = router.search(&[1.0, 0.0], 2).await.unwrap_err();
    assert!(matches!(err, SvsError::ShardUnavailable { shard: 1, .. }));

    b.set_failing(false);
    let neighbors = router.search(&[1.0, 0.0], 2).await.unwrap();
    assert_eq!(neighbors[0].id, 1);
}

#[tokio::test]
async fn test_describe_fails_when_any_shard_is_down() {
    let a = Arc::new(FlakyShard::new(2));
    let b = Arc::new(FlakyShard::new(2));
    let router = Router::new(2, 2, vec![a.clone(), b.clone()]);

    a.set_failing(true);
    let err = router.describe().await.unwrap_err();
    assert!(matches!(err, SvsError::ShardUnavailable { shard: 0, .. }));
}
