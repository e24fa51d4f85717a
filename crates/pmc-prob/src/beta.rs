//! Beta distribution utilities.

use pmc_core::{Distribution, Error, Result};
use rand::RngCore;
use statrs::distribution::ContinuousCDF;
use statrs::function::gamma::ln_gamma;

use crate::math::check_positive;

#[inline]
fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Log-PDF of a Beta(`a`, `b`) distribution at `x`.
///
/// Support: `0 <= x <= 1`.
pub fn logpdf(x: f64, a: f64, b: f64) -> Result<f64> {
    check_positive("a", a)?;
    check_positive("b", b)?;
    if !(0.0..=1.0).contains(&x) {
        return Ok(f64::NEG_INFINITY);
    }

    let ln_norm = -ln_beta(a, b);
    if x == 0.0 {
        if a < 1.0 {
            return Ok(f64::INFINITY);
        }
        if a > 1.0 {
            return Ok(f64::NEG_INFINITY);
        }
        // a == 1: x term is 0.
        return Ok(ln_norm);
    }
    if x == 1.0 {
        if b < 1.0 {
            return Ok(f64::INFINITY);
        }
        if b > 1.0 {
            return Ok(f64::NEG_INFINITY);
        }
        return Ok(ln_norm);
    }

    Ok(ln_norm + (a - 1.0) * x.ln() + (b - 1.0) * (1.0 - x).ln())
}

/// Beta(`a`, `b`) on `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Beta {
    a: f64,
    b: f64,
    sampler: rand_distr::Beta<f64>,
    exact: statrs::distribution::Beta,
}

impl Beta {
    /// Build from two finite, positive shape parameters.
    pub fn new(a: f64, b: f64) -> Result<Self> {
        check_positive("a", a)?;
        check_positive("b", b)?;
        let sampler = rand_distr::Beta::new(a, b)
            .map_err(|e| Error::InvalidParameter(format!("beta({a}, {b}): {e}")))?;
        let exact = statrs::distribution::Beta::new(a, b)
            .map_err(|e| Error::InvalidParameter(format!("beta({a}, {b}): {e}")))?;
        Ok(Self { a, b, sampler, exact })
    }
}

impl Distribution for Beta {
    fn family(&self) -> &str {
        "beta"
    }

    fn params(&self) -> Vec<f64> {
        vec![self.a, self.b]
    }

    fn draw_one(&self, rng: &mut dyn RngCore) -> f64 {
        rand_distr::Distribution::sample(&self.sampler, rng)
    }

    fn mean(&self) -> Option<f64> {
        Some(self.a / (self.a + self.b))
    }

    fn cdf(&self, x: f64) -> Option<f64> {
        Some(self.exact.cdf(x.clamp(0.0, 1.0)))
    }

    fn quantile(&self, p: f64) -> Option<f64> {
        match p {
            p if p == 0.0 => Some(0.0),
            p if p == 1.0 => Some(1.0),
            p if p > 0.0 && p < 1.0 => Some(self.exact.inverse_cdf(p)),
            _ => None,
        }
    }

    fn ln_pdf(&self, x: f64) -> Option<f64> {
        logpdf(x, self.a, self.b).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform() {
        for x in [0.0, 0.2, 0.5, 0.9, 1.0] {
            let lp = logpdf(x, 1.0, 1.0).unwrap();
            assert!((lp - 0.0).abs() < 1e-12, "x={}", x);
        }
    }

    #[test]
    fn test_symmetry_when_a_equals_b() {
        let lp1 = logpdf(0.2, 2.0, 2.0).unwrap();
        let lp2 = logpdf(0.8, 2.0, 2.0).unwrap();
        assert!((lp1 - lp2).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_support() {
        let lp = logpdf(-0.1, 2.0, 3.0).unwrap();
        assert!(lp.is_infinite() && lp.is_sign_negative());
    }

    #[test]
    fn test_invalid_params() {
        assert!(Beta::new(0.0, 1.0).is_err());
        assert!(Beta::new(1.0, 0.0).is_err());
    }

    #[test]
    fn test_oracles() {
        let d = Beta::new(2.0, 2.0).unwrap();
        assert!((d.mean().unwrap() - 0.5).abs() < 1e-12);
        assert!((d.cdf(0.5).unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(d.quantile(1.0), Some(1.0));
    }
}
