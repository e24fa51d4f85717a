//! # pmc-inference
//!
//! Monte Carlo inference on empirical samples.
//!
//! This crate provides:
//! - i.i.d. sampling from any [`pmc_core::Distribution`], sequential or block-parallel
//! - elementwise transforms of aligned samples
//! - means, tail probabilities, quantiles and their Monte Carlo errors
//! - highest-density regions with pluggable density estimation
//! - posterior predictive checks
//!
//! ## Reproducibility
//!
//! Every randomized call takes `seed: Option<u64>`. Parallel work derives one
//! generator per unit from the base seed, so seeded output does not depend on
//! the rayon thread count.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Density estimation on a grid (Gaussian KDE, histogram).
pub mod density;
/// Point estimates, standard errors, intervals, running means.
pub mod estimator;
/// Highest-density regions.
pub mod hdr;
/// Posterior predictive checks.
pub mod ppc;
/// Seeded random streams.
pub mod rng;
/// Fixed-size sampling.
pub mod sampler;
/// Discrepancy statistics.
pub mod statistics;
/// Elementwise transforms of aligned samples.
pub mod transform;
/// Online mean/variance accumulator.
pub mod welford;

pub use density::{Bandwidth, BinRule, DensityEstimator, DensityGrid, GaussianKde, Histogram};
pub use estimator::{
    IntervalExt, RunningEstimate, RunningPoint, SampleSummary, interval, mean, percentile_interval,
    quantile, required_sample_size, required_sample_size_at, running_estimate, summarize,
    tail_probability, with_interval, z_score,
};
pub use hdr::{HdrInterval, HdrResult, highest_density_region};
pub use ppc::{PredictiveCheck, PredictiveCheckResult, Tail};
pub use sampler::{sample, sample_parallel, sample_with_rng};
pub use statistics::Statistic;
pub use transform::Op;
