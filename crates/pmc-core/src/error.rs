//! Error types for PMC

use thiserror::Error;

/// PMC error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Distribution parameters outside the family's domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A draw or derived value was non-finite.
    #[error("Sampling error: {0}")]
    Sampling(String),

    /// Aligned inputs of unequal length.
    #[error("Misaligned sample: input {input} has length {got}, expected {expected}")]
    MisalignedSample {
        /// Position of the offending input.
        input: usize,
        /// Length of the first input.
        expected: usize,
        /// Length of the offending input.
        got: usize,
    },

    /// Statistic undefined for the given sample size.
    #[error("Insufficient sample: need at least {required} values, got {got}")]
    InsufficientSample {
        /// Minimum number of values.
        required: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// HDR target mass outside (0, 1].
    #[error("Invalid mass: target mass must be in (0, 1], got {0}")]
    InvalidMass(f64),

    /// Any other violated precondition.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
