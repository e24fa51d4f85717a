//! Normal distribution utilities.

use pmc_core::{Distribution, Error, Result};
use rand::RngCore;
use statrs::distribution::ContinuousCDF;

use crate::math::{check_finite, check_positive};

/// Natural log of `sqrt(2π)`.
///
/// `ln(sqrt(2π)) = 0.5*ln(2π)` (precomputed to keep this crate const-friendly).
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

/// Log-PDF of a Normal distribution `N(mu, sigma)` at `x`.
///
/// `log p(x) = -0.5 * ((x-mu)/sigma)^2 - ln(sigma) - ln(sqrt(2π))`
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> Result<f64> {
    check_positive("sigma", sigma)?;
    let z = (x - mu) / sigma;
    Ok(-0.5 * z * z - sigma.ln() - LN_SQRT_2PI)
}

/// Normal(`mu`, `sigma`).
#[derive(Debug, Clone)]
pub struct Normal {
    mu: f64,
    sigma: f64,
    sampler: rand_distr::Normal<f64>,
    exact: statrs::distribution::Normal,
}

impl Normal {
    /// Build from a finite location and a finite, positive scale.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        check_finite("mu", mu)?;
        check_positive("sigma", sigma)?;
        let sampler = rand_distr::Normal::new(mu, sigma)
            .map_err(|e| Error::InvalidParameter(format!("normal({mu}, {sigma}): {e}")))?;
        let exact = statrs::distribution::Normal::new(mu, sigma)
            .map_err(|e| Error::InvalidParameter(format!("normal({mu}, {sigma}): {e}")))?;
        Ok(Self { mu, sigma, sampler, exact })
    }

    /// Standard normal `N(0, 1)`.
    pub fn standard() -> Self {
        // Safe by construction for mu=0, sigma=1.
        Self::new(0.0, 1.0).expect("standard normal should be constructible")
    }

    /// Scale parameter.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Distribution for Normal {
    fn family(&self) -> &str {
        "normal"
    }

    fn params(&self) -> Vec<f64> {
        vec![self.mu, self.sigma]
    }

    fn draw_one(&self, rng: &mut dyn RngCore) -> f64 {
        rand_distr::Distribution::sample(&self.sampler, rng)
    }

    fn mean(&self) -> Option<f64> {
        Some(self.mu)
    }

    fn cdf(&self, x: f64) -> Option<f64> {
        Some(self.exact.cdf(x))
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        match p {
            p if p == 0.0 => Some(f64::NEG_INFINITY),
            p if p == 1.0 => Some(f64::INFINITY),
            p if p > 0.0 && p < 1.0 => Some(self.exact.inverse_cdf(p)),
            _ => None,
        }
    }

    fn ln_pdf(&self, x: f64) -> Option<f64> {
        logpdf(x, self.mu, self.sigma).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_at_zero() {
        let lp = logpdf(0.0, 0.0, 1.0).unwrap();
        assert!((lp + LN_SQRT_2PI).abs() < 1e-12);
    }

    #[test]
    fn test_symmetry() {
        let lp1 = logpdf(1.3, 0.0, 2.0).unwrap();
        let lp2 = logpdf(-1.3, 0.0, 2.0).unwrap();
        assert!((lp1 - lp2).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(logpdf(0.0, 0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
        assert!(Normal::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_quantile_975() {
        let n = Normal::standard();
        assert!((n.quantile(0.975).unwrap() - 1.959_963_984_540_054).abs() < 1e-6);
        assert!(n.quantile(-0.1).is_none());
    }
}
