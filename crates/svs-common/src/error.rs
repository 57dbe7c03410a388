use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvsError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("insufficient cluster capacity")]
    CapacityExhausted,

    #[error("shard {shard} unavailable: {cause}")]
    ShardUnavailable { shard: u32, cause: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SvsError>;
