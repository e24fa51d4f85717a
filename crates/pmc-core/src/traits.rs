//! Core traits for PMC
//!
//! The engine in `pmc-inference` only sees these traits, never a concrete
//! family. New families plug in by implementing [`Distribution`] (and
//! [`DistributionFamily`] when they should be usable as a data-generating
//! model in predictive checks).

use rand::RngCore;

use crate::{EmpiricalSample, Error, Provenance, Result};

/// A parametric distribution: an i.i.d. draw source plus optional exact
/// oracles used only to validate Monte Carlo estimates.
pub trait Distribution: Send + Sync {
    /// Family name (e.g. `"gamma"`).
    fn family(&self) -> &str;

    /// Parameter vector, in the family's canonical order.
    fn params(&self) -> Vec<f64>;

    /// One draw.
    fn draw_one(&self, rng: &mut dyn RngCore) -> f64;

    /// `n` i.i.d. draws. Fails on `n == 0` or on any non-finite draw.
    fn draw(&self, n: usize, rng: &mut dyn RngCore) -> Result<EmpiricalSample> {
        if n == 0 {
            return Err(Error::Validation("number of draws must be >= 1".to_string()));
        }
        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            let x = self.draw_one(rng);
            if !x.is_finite() {
                return Err(Error::Sampling(format!(
                    "{} draw {i} is non-finite ({x})",
                    self.family()
                )));
            }
            values.push(x);
        }
        EmpiricalSample::new(values, self.provenance())
    }

    /// Provenance tag for samples drawn from this distribution.
    fn provenance(&self) -> Provenance {
        Provenance::Distribution { family: self.family().to_string(), params: self.params() }
    }

    /// Exact mean, if known.
    fn mean(&self) -> Option<f64> {
        None
    }

    /// Exact CDF at `x`, if known.
    fn cdf(&self, _x: f64) -> Option<f64> {
        None
    }

    /// Exact `P(X < x)`, if known. Equals [`Distribution::cdf`] for
    /// continuous families; lattice families override it.
    fn cdf_below(&self, x: f64) -> Option<f64> {
        self.cdf(x)
    }

    /// Exact quantile at probability `p`, if known.
    fn quantile(&self, _p: f64) -> Option<f64> {
        None
    }

    /// Exact log-density (or log-mass) at `x`, if known.
    fn ln_pdf(&self, _x: f64) -> Option<f64> {
        None
    }
}

/// A distribution family without fixed parameters.
pub trait DistributionFamily: Send + Sync {
    /// Family name.
    fn name(&self) -> &str;

    /// Number of parameters `build` expects.
    fn n_params(&self) -> usize;

    /// Instantiate the family at `params`.
    fn build(&self, params: &[f64]) -> Result<Box<dyn Distribution>>;
}

impl<D: Distribution + ?Sized> Distribution for Box<D> {
    fn family(&self) -> &str {
        (**self).family()
    }
    fn params(&self) -> Vec<f64> {
        (**self).params()
    }
    fn draw_one(&self, rng: &mut dyn RngCore) -> f64 {
        (**self).draw_one(rng)
    }
    fn mean(&self) -> Option<f64> {
        (**self).mean()
    }
    fn cdf(&self, x: f64) -> Option<f64> {
        (**self).cdf(x)
    }
    fn cdf_below(&self, x: f64) -> Option<f64> {
        (**self).cdf_below(x)
    }
    fn quantile(&self, p: f64) -> Option<f64> {
        (**self).quantile(p)
    }
    fn ln_pdf(&self, x: f64) -> Option<f64> {
        (**self).ln_pdf(x)
    }
}
