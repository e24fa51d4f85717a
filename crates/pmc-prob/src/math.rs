//! Small numerically-stable math utilities used across probability code.

use pmc_core::{Error, Result};

/// Stable sigmoid: `1 / (1 + exp(-x))`.
///
/// Branchless core: single `exp(-|x|)`, then `cmov` for the sign flip.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    let abs_x = x.abs();
    let e = (-abs_x).exp();
    let recip = 1.0 / (1.0 + e);
    // x >= 0: sigmoid = 1/(1+exp(-x)) = recip
    // x <  0: sigmoid = exp(x)/(1+exp(x)) = e/(1+e) = e*recip
    if x >= 0.0 { recip } else { e * recip }
}

/// Log-odds `ln(p / (1 - p))`.
///
/// Returns `-inf`/`+inf` at `p = 0`/`p = 1` and `NaN` outside `[0, 1]`.
#[inline]
pub fn logit(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    p.ln() - (-p).ln_1p()
}

/// Require `value` finite and strictly positive.
pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

/// Require `value` finite.
pub(crate) fn check_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidParameter(format!("{name} must be finite, got {value}")));
    }
    Ok(())
}

/// Require exactly `expected` parameters.
pub(crate) fn check_arity(family: &str, params: &[f64], expected: usize) -> Result<()> {
    if params.len() != expected {
        return Err(Error::InvalidParameter(format!(
            "{family} expects {expected} parameter(s), got {}",
            params.len()
        )));
    }
    Ok(())
}
