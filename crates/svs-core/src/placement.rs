use std::collections::HashMap;

/// Router-local bookkeeping of which shard owns which vector ID, plus
/// per-shard occupancy. Mutated only while the router holds its placement
/// lock.
///
/// Invariant: after every successful mutation the shard sizes sum to the
/// number of placed IDs, and no size exceeds the configured shard capacity.
#[derive(Debug)]
pub struct Placement {
    shard_of: HashMap<i64, usize>,
    shard_sizes: Vec<u32>,
}

impl Placement {
    pub fn new(num_shards: usize) -> Self {
        Self {
            shard_of: HashMap::new(),
            shard_sizes: vec![0; num_shards],
        }
    }

    pub fn lookup(&self, id: i64) -> Option<usize> {
        self.shard_of.get(&id).copied()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.shard_of.contains_key(&id)
    }

    /// Record that `shard` owns `id`. Idempotent for an ID already owned by
    /// the same shard; callers check placement first, so an ID never moves.
    pub fn assign(&mut self, id: i64, shard: usize) {
        let prev = self.shard_of.insert(id, shard);
        debug_assert!(prev.is_none() || prev == Some(shard));
    }

    pub fn bump(&mut self, shard: usize, delta: u32) {
        self.shard_sizes[shard] += delta;
    }

    pub fn shard_sizes(&self) -> &[u32] {
        &self.shard_sizes
    }

    pub fn num_placed(&self) -> usize {
        self.shard_of.len()
    }

    /// Shard indices with at least one vector, ascending.
    pub fn non_empty_shards(&self) -> Vec<usize> {
        self.shard_sizes
            .iter()
            .enumerate()
            .filter(|(_, &size)| size > 0)
            .map(|(idx, _)| idx)
            .collect()
    }
}
