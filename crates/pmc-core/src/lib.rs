//! # pmc-core
//!
//! Core types and traits shared by every PMC crate: the error type, the
//! [`Distribution`] capability trait, and [`EmpiricalSample`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{Distribution, DistributionFamily};
pub use types::{EmpiricalSample, EstimateResult, PointEstimate, Provenance};

/// Crate version, reported by `pmc version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
