use thiserror::Error;

/// Ranking pipeline errors. These are deterministic pure-computation
/// failures; there is nothing to retry.
#[derive(Debug, Error)]
pub enum RankError {
    /// Missing query, empty corpus, or a degenerate configuration.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Query and document vectors come from different vector spaces.
    /// Unreachable through `rank`, but guarded for direct ranker use.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
