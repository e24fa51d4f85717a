//! Poisson distribution utilities.

use pmc_core::{Distribution, Error, Result};
use rand::RngCore;
use statrs::distribution::DiscreteCDF;
use statrs::function::gamma::ln_gamma;

use crate::math::check_positive;

/// Log-PMF of Poisson(`k` | `lambda`).
pub fn logpmf(k: u64, lambda: f64) -> Result<f64> {
    check_positive("lambda", lambda)?;
    let kf = k as f64;
    Ok(kf * lambda.ln() - lambda - ln_gamma(kf + 1.0))
}

/// Poisson(`lambda`). Draws are returned as `f64` counts.
#[derive(Debug, Clone)]
pub struct Poisson {
    lambda: f64,
    sampler: rand_distr::Poisson<f64>,
    exact: statrs::distribution::Poisson,
}

impl Poisson {
    /// Build from a finite, positive rate.
    pub fn new(lambda: f64) -> Result<Self> {
        check_positive("lambda", lambda)?;
        let sampler = rand_distr::Poisson::new(lambda)
            .map_err(|e| Error::InvalidParameter(format!("poisson({lambda}): {e}")))?;
        let exact = statrs::distribution::Poisson::new(lambda)
            .map_err(|e| Error::InvalidParameter(format!("poisson({lambda}): {e}")))?;
        Ok(Self { lambda, sampler, exact })
    }

    /// Smallest `k` with `P(X <= k) >= p`, for `p` in `[0, 1)`.
    fn inverse_cdf(&self, p: f64) -> u64 {
        let mut hi: u64 = (self.lambda.ceil() as u64).max(1);
        while self.exact.cdf(hi) < p {
            hi = hi.saturating_mul(2);
        }
        let mut lo: u64 = 0;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.exact.cdf(mid) >= p {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }
}

impl Distribution for Poisson {
    fn family(&self) -> &str {
        "poisson"
    }

    fn params(&self) -> Vec<f64> {
        vec![self.lambda]
    }

    fn draw_one(&self, rng: &mut dyn RngCore) -> f64 {
        rand_distr::Distribution::<f64>::sample(&self.sampler, rng)
    }

    fn mean(&self) -> Option<f64> {
        Some(self.lambda)
    }

    fn cdf(&self, x: f64) -> Option<f64> {
        if x < 0.0 {
            return Some(0.0);
        }
        Some(self.exact.cdf(x.floor() as u64))
    }

    fn cdf_below(&self, x: f64) -> Option<f64> {
        // P(X < x) = P(X <= ceil(x) - 1)
        if x <= 0.0 {
            return Some(0.0);
        }
        self.cdf(x.ceil() - 1.0)
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        match p {
            p if p == 1.0 => Some(f64::INFINITY),
            p if (0.0..1.0).contains(&p) => Some(self.inverse_cdf(p) as f64),
            _ => None,
        }
    }

    fn ln_pdf(&self, x: f64) -> Option<f64> {
        if x < 0.0 || x.fract() != 0.0 {
            return Some(f64::NEG_INFINITY);
        }
        logpmf(x as u64, self.lambda).ok()
    }
}
