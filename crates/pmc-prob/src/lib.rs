//! Distribution families for PMC.
//!
//! Each family module hosts:
//! - the scalar log-density helper (`logpdf` / `logpmf`),
//! - a parameter-validated struct implementing [`pmc_core::Distribution`]
//!   (sampling via `rand_distr`, exact CDF/quantile oracles via `statrs`).
//!
//! [`Family`] gathers them into one tagged union usable from configs.

pub mod beta;
pub mod distributions;
pub mod exponential;
pub mod gamma;
pub mod math;
pub mod normal;
pub mod poisson;

pub use beta::Beta;
pub use distributions::Family;
pub use exponential::Exponential;
pub use gamma::Gamma;
pub use normal::Normal;
pub use poisson::Poisson;
