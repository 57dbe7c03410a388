/// A vector to be indexed, identified by a caller-chosen integer ID.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    pub id: i64,
    pub raw: Vec<f32>,
}

impl Vector {
    pub fn new(id: i64, raw: Vec<f32>) -> Self {
        Self { id, raw }
    }
}

/// A search hit. Higher score = better match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: i64,
    pub score: f32,
}

impl Neighbor {
    /// Placeholder returned when a shard (or the cluster) holds fewer than k
    /// vectors. Any real candidate outranks it.
    pub const SENTINEL: Neighbor = Neighbor {
        id: -1,
        score: f32::NEG_INFINITY,
    };

    pub fn new(id: i64, score: f32) -> Self {
        Self { id, score }
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == -1 && self.score == f32::NEG_INFINITY
    }
}

/// Payload of a describe call, for one shard or the whole cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub dimensions: usize,
    pub num_vectors: u64,
}
