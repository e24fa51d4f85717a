//! Exponential distribution utilities.

use pmc_core::{Distribution, Error, Result};
use rand::RngCore;
use statrs::distribution::ContinuousCDF;

use crate::math::check_positive;

/// Log-PDF of an Exponential distribution at `x` with rate `rate`.
///
/// Support: `x >= 0`.
pub fn logpdf(x: f64, rate: f64) -> Result<f64> {
    check_positive("rate", rate)?;
    if x < 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    Ok(rate.ln() - rate * x)
}

/// Exponential(`rate`).
#[derive(Debug, Clone)]
pub struct Exponential {
    rate: f64,
    sampler: rand_distr::Exp<f64>,
    exact: statrs::distribution::Exp,
}

impl Exponential {
    /// Build from a finite, positive rate.
    pub fn new(rate: f64) -> Result<Self> {
        check_positive("rate", rate)?;
        let sampler = rand_distr::Exp::new(rate)
            .map_err(|e| Error::InvalidParameter(format!("exponential({rate}): {e}")))?;
        let exact = statrs::distribution::Exp::new(rate)
            .map_err(|e| Error::InvalidParameter(format!("exponential({rate}): {e}")))?;
        Ok(Self { rate, sampler, exact })
    }
}

impl Distribution for Exponential {
    fn family(&self) -> &str {
        "exponential"
    }

    fn params(&self) -> Vec<f64> {
        vec![self.rate]
    }

    fn draw_one(&self, rng: &mut dyn RngCore) -> f64 {
        rand_distr::Distribution::sample(&self.sampler, rng)
    }

    fn mean(&self) -> Option<f64> {
        Some(1.0 / self.rate)
    }

    fn cdf(&self, x: f64) -> Option<f64> {
        Some(self.exact.cdf(x.max(0.0)))
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        if !(0.0..=1.0).contains(&p) {
            return None;
        }
        // Closed form: -ln(1 - p) / rate.
        Some(-(-p).ln_1p() / self.rate)
    }

    fn ln_pdf(&self, x: f64) -> Option<f64> {
        logpdf(x, self.rate).ok()
    }
}
