use serde::{Deserialize, Serialize};

/// Similarity metric where a larger score means a closer match. The top-k
/// ordering across shards is only defined for higher-is-better metrics, so
/// distance-style metrics (e.g. L2) are not offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMetric {
    #[default]
    InnerProduct,
    Cosine,
}

impl ScoreMetric {
    pub fn compute(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            ScoreMetric::InnerProduct => inner_product(a, b),
            ScoreMetric::Cosine => cosine_similarity(a, b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMetric::InnerProduct => "inner_product",
            ScoreMetric::Cosine => "cosine",
        }
    }
}

impl std::fmt::Display for ScoreMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScoreMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner_product" | "ip" | "dot" => Ok(ScoreMetric::InnerProduct),
            "cosine" => Ok(ScoreMetric::Cosine),
            _ => Err(format!("unknown score metric: {s}")),
        }
    }
}

fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
