use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use svs_common::error::{Result, SvsError};
use svs_common::types::{IndexStats, Neighbor, Vector};
use tokio::sync::RwLock;

use crate::pack::greedy_fill;
use crate::placement::Placement;
use crate::service::{check_dimensions, IndexService};
use crate::shard::collapse_to_last;
use crate::topk::TopK;

/// Front-end over a fixed set of shards. Writes are greedy-packed across
/// shards in index order under a single placement lock; reads fan out to the
/// non-empty shards and merge through a bounded top-k heap.
///
/// `Router` itself implements [`IndexService`], so a cluster node is
/// indistinguishable from a shard to its own clients.
pub struct Router<S> {
    dimensions: usize,
    shard_capacity: u32,
    shards: Vec<S>,
    placement: RwLock<Placement>,
}

impl<S: IndexService> Router<S> {
    pub fn new(dimensions: usize, shard_capacity: u32, shards: Vec<S>) -> Self {
        let placement = RwLock::new(Placement::new(shards.len()));
        tracing::info!("registered {} shards", shards.len());
        Self {
            dimensions,
            shard_capacity,
            shards,
            placement,
        }
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    fn unavailable(shard: usize, cause: impl std::fmt::Display) -> SvsError {
        SvsError::ShardUnavailable {
            shard: shard as u32,
            cause: cause.to_string(),
        }
    }
}

#[async_trait]
impl<S: IndexService> IndexService for Router<S> {
    async fn describe(&self) -> Result<IndexStats> {
        tracing::info!("received describe request");

        let mut total = 0u64;
        for (shard_idx, shard) in self.shards.iter().enumerate() {
            let stats = shard
                .describe()
                .await
                .map_err(|e| Self::unavailable(shard_idx, e))?;
            tracing::debug!(
                "described shard {shard_idx}: dimensions={} num_vectors={}",
                stats.dimensions,
                stats.num_vectors
            );
            total += stats.num_vectors;
        }

        Ok(IndexStats {
            dimensions: self.dimensions,
            num_vectors: total,
        })
    }

    async fn insert(&self, vectors: Vec<Vector>) -> Result<()> {
        tracing::info!("received insert request, num_vectors={}", vectors.len());
        check_dimensions(&vectors, self.dimensions)?;

        // Serializes every placement mutation: capacity check, assignment
        // decision, per-shard commit, and bookkeeping happen atomically with
        // respect to other requests.
        let mut placement = self.placement.write().await;

        // IDs already placed anywhere in the cluster are silently ignored and
        // must not count against capacity; within a request the first
        // occurrence of an ID wins.
        let mut fresh = Vec::with_capacity(vectors.len());
        let mut fresh_ids = HashSet::new();
        for vector in vectors {
            if placement.contains(vector.id) || !fresh_ids.insert(vector.id) {
                tracing::debug!("vector id={} already placed, ignoring", vector.id);
                continue;
            }
            fresh.push(vector);
        }

        let (leftover, fills) = greedy_fill(
            fresh.len() as u32,
            self.shard_capacity,
            placement.shard_sizes(),
        );
        if leftover > 0 {
            tracing::info!("insufficient capacity, num_unassigned={leftover}");
            return Err(SvsError::CapacityExhausted);
        }

        let mut pending = fresh.into_iter();
        for (shard_idx, count) in fills {
            let batch: Vec<Vector> = pending.by_ref().take(count as usize).collect();
            let ids: Vec<i64> = batch.iter().map(|v| v.id).collect();

            self.shards[shard_idx]
                .insert(batch)
                .await
                .map_err(|e| Self::unavailable(shard_idx, e))?;

            for id in ids {
                placement.assign(id, shard_idx);
            }
            placement.bump(shard_idx, count);
            tracing::info!(
                "inserted {count} vectors into shard {shard_idx}, shard at {}/{} capacity",
                placement.shard_sizes()[shard_idx],
                self.shard_capacity
            );
        }

        Ok(())
    }

    async fn upsert(&self, vectors: Vec<Vector>) -> Result<()> {
        tracing::info!("received upsert request, num_vectors={}", vectors.len());
        check_dimensions(&vectors, self.dimensions)?;

        let mut placement = self.placement.write().await;

        // Vectors with a known placement go back to their owning shard and
        // are never migrated; the rest are packed like an insert.
        let mut batches: BTreeMap<usize, Vec<Vector>> = BTreeMap::new();
        let mut fresh = Vec::new();
        for vector in collapse_to_last(vectors) {
            match placement.lookup(vector.id) {
                Some(shard_idx) => batches.entry(shard_idx).or_default().push(vector),
                None => fresh.push(vector),
            }
        }
        tracing::info!("identified {} new vectors to place", fresh.len());

        let (leftover, fills) = greedy_fill(
            fresh.len() as u32,
            self.shard_capacity,
            placement.shard_sizes(),
        );
        if leftover > 0 {
            tracing::info!("insufficient capacity, num_unassigned={leftover}");
            return Err(SvsError::CapacityExhausted);
        }

        let mut fresh_counts: BTreeMap<usize, u32> = BTreeMap::new();
        let mut pending = fresh.into_iter();
        for (shard_idx, count) in fills {
            batches
                .entry(shard_idx)
                .or_default()
                .extend(pending.by_ref().take(count as usize));
            fresh_counts.insert(shard_idx, count);
        }

        for (shard_idx, batch) in batches {
            let num_sent = batch.len();
            let ids: Vec<i64> = batch.iter().map(|v| v.id).collect();

            self.shards[shard_idx]
                .upsert(batch)
                .await
                .map_err(|e| Self::unavailable(shard_idx, e))?;

            for id in ids {
                placement.assign(id, shard_idx);
            }
            let num_new = fresh_counts.get(&shard_idx).copied().unwrap_or(0);
            placement.bump(shard_idx, num_new);
            tracing::info!(
                "upserted {num_sent} vectors into shard {shard_idx} ({} updated, {num_new} new)",
                num_sent - num_new as usize
            );
        }

        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        tracing::info!("received search request, k={k}");
        if query.len() != self.dimensions {
            return Err(SvsError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        // Snapshot under the read lock, then release: the fan-out must not
        // hold up writers, and the snapshot stays consistent for this
        // request.
        let candidates = self.placement.read().await.non_empty_shards();
        if candidates.is_empty() {
            tracing::info!("all shards empty, returning sentinel neighbors");
            return Ok(vec![Neighbor::SENTINEL; k]);
        }
        tracing::info!(
            "searching {} non-empty shards out of {}",
            candidates.len(),
            self.shards.len()
        );

        // Shards return k locally-best neighbors sorted descending, so the
        // first response seeds the heap directly and each later candidate is
        // a single heap-replace.
        let first = candidates[0];
        let seed = self.shards[first]
            .search(query, k)
            .await
            .map_err(|e| Self::unavailable(first, e))?;
        let mut best = TopK::seeded(k, &seed);

        for &shard_idx in &candidates[1..] {
            let batch = self.shards[shard_idx]
                .search(query, k)
                .await
                .map_err(|e| Self::unavailable(shard_idx, e))?;
            tracing::debug!("merging {} neighbors from shard {shard_idx}", batch.len());
            for candidate in batch {
                best.offer(candidate);
            }
        }

        Ok(best.into_sorted())
    }
}
