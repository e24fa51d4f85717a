//! Elementwise transforms of aligned samples.
//!
//! Output element `i` is `f(x1[i], ..., xk[i])`: index `i` is the same
//! simulation draw in every input. Pairing draws by index (not by
//! cartesian product) is what makes the output a sample of the transformed
//! random variable.

use std::fmt;

use pmc_core::{EmpiricalSample, Error, Provenance, Result};
use pmc_prob::math::{logit, sigmoid};
use serde::{Deserialize, Serialize};

/// Check every input has the length of the first.
pub fn check_aligned(inputs: &[&EmpiricalSample]) -> Result<usize> {
    let first = inputs
        .first()
        .ok_or_else(|| Error::Validation("transform requires at least one input".to_string()))?;
    let expected = first.len();
    for (input, s) in inputs.iter().enumerate().skip(1) {
        if s.len() != expected {
            return Err(Error::MisalignedSample { input, expected, got: s.len() });
        }
    }
    Ok(expected)
}

/// Apply an n-ary function elementwise across aligned samples.
pub fn apply<F>(name: &str, f: F, inputs: &[&EmpiricalSample]) -> Result<EmpiricalSample>
where
    F: Fn(&[f64]) -> f64,
{
    let n = check_aligned(inputs)?;
    let k = inputs.len();
    let mut row = vec![0.0; k];
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        for (slot, s) in row.iter_mut().zip(inputs) {
            *slot = s.values()[i];
        }
        let y = f(&row);
        if !y.is_finite() {
            return Err(Error::Sampling(format!(
                "transform '{name}' produced non-finite value {y} at index {i} (inputs {row:?})"
            )));
        }
        out.push(y);
    }
    let provenance = Provenance::Transform {
        name: name.to_string(),
        inputs: inputs.iter().map(|s| s.provenance().clone()).collect(),
    };
    EmpiricalSample::new(out, provenance)
}

/// Unary elementwise map.
pub fn map<F>(name: &str, f: F, a: &EmpiricalSample) -> Result<EmpiricalSample>
where
    F: Fn(f64) -> f64,
{
    apply(name, |x| f(x[0]), &[a])
}

/// Binary elementwise combination of two aligned samples.
pub fn zip_with<F>(
    name: &str,
    f: F,
    a: &EmpiricalSample,
    b: &EmpiricalSample,
) -> Result<EmpiricalSample>
where
    F: Fn(f64, f64) -> f64,
{
    apply(name, |x| f(x[0], x[1]), &[a, b])
}

/// `a[i] / b[i]`.
pub fn ratio(a: &EmpiricalSample, b: &EmpiricalSample) -> Result<EmpiricalSample> {
    Op::Ratio.apply(&[a, b])
}

/// `a[i] - b[i]`.
pub fn difference(a: &EmpiricalSample, b: &EmpiricalSample) -> Result<EmpiricalSample> {
    Op::Difference.apply(&[a, b])
}

/// `ln(p[i] / (1 - p[i]))`.
pub fn log_odds(p: &EmpiricalSample) -> Result<EmpiricalSample> {
    Op::LogOdds.apply(&[p])
}

/// Named transforms, selectable from configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// `x / y`
    Ratio,
    /// `x - y`
    Difference,
    /// `x + y + ...`
    Sum,
    /// `x * y * ...`
    Product,
    /// `ln(x / (1 - x))`
    LogOdds,
    /// `1 / (1 + exp(-x))`
    InvLogit,
    /// `ln(x)`
    Ln,
    /// `exp(x)`
    Exp,
}

impl Op {
    /// Required number of inputs; `None` means any number >= 1.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Op::Ratio | Op::Difference => Some(2),
            Op::Sum | Op::Product => None,
            Op::LogOdds | Op::InvLogit | Op::Ln | Op::Exp => Some(1),
        }
    }

    /// Config name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Ratio => "ratio",
            Op::Difference => "difference",
            Op::Sum => "sum",
            Op::Product => "product",
            Op::LogOdds => "log_odds",
            Op::InvLogit => "inv_logit",
            Op::Ln => "ln",
            Op::Exp => "exp",
        }
    }

    /// Evaluate on one aligned row.
    #[inline]
    pub fn eval(&self, x: &[f64]) -> f64 {
        match self {
            Op::Ratio => x[0] / x[1],
            Op::Difference => x[0] - x[1],
            Op::Sum => x.iter().sum(),
            Op::Product => x.iter().product(),
            Op::LogOdds => logit(x[0]),
            Op::InvLogit => sigmoid(x[0]),
            Op::Ln => x[0].ln(),
            Op::Exp => x[0].exp(),
        }
    }

    /// Apply elementwise, checking arity first.
    pub fn apply(&self, inputs: &[&EmpiricalSample]) -> Result<EmpiricalSample> {
        if let Some(k) = self.arity() {
            if inputs.len() != k {
                return Err(Error::Validation(format!(
                    "transform '{}' takes {k} input(s), got {}",
                    self.as_str(),
                    inputs.len()
                )));
            }
        }
        apply(self.as_str(), |x| self.eval(x), inputs)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
