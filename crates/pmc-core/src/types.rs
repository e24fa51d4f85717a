//! Common data types for PMC

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where a sample came from. Carried for diagnostics only; never read by
/// any computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Direct draws from a parametric distribution.
    Distribution {
        /// Family name (e.g. `"gamma"`).
        family: String,
        /// Parameter vector the distribution was built with.
        params: Vec<f64>,
    },
    /// Elementwise transform of one or more aligned samples.
    Transform {
        /// Transform name.
        name: String,
        /// Provenance of each input, in argument order.
        inputs: Vec<Provenance>,
    },
    /// Statistic values from simulated replicate datasets.
    Simulated {
        /// Statistic name.
        statistic: String,
    },
    /// Caller-supplied values.
    Observed,
}

/// An ordered, fixed-length sequence of finite draws.
///
/// Invariants: `len() >= 1` and every value is finite. Both are checked by
/// [`EmpiricalSample::new`], the only public constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalSample {
    values: Vec<f64>,
    provenance: Provenance,
}

impl EmpiricalSample {
    /// Build a sample, rejecting empty input and non-finite values.
    pub fn new(values: Vec<f64>, provenance: Provenance) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InsufficientSample { required: 1, got: 0 });
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::Sampling(format!(
                "non-finite value {} at index {i}",
                values[i]
            )));
        }
        Ok(Self { values, provenance })
    }

    /// Wrap caller-supplied values (`Provenance::Observed`).
    pub fn observed(values: Vec<f64>) -> Result<Self> {
        Self::new(values, Provenance::Observed)
    }

    /// Sample values in draw order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of draws `S`.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a constructed sample; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Provenance tag.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Values sorted ascending (copy).
    pub fn sorted(&self) -> Vec<f64> {
        let mut v = self.values.clone();
        v.sort_by(f64::total_cmp);
        v
    }

    /// Consume into the raw values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for EmpiricalSample {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Point estimate with its Monte Carlo standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    /// Estimated value.
    pub estimate: f64,
    /// Standard error of the estimator.
    pub standard_error: f64,
    /// Sample size used.
    pub n: usize,
}

/// Point estimate together with an approximate confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    /// Estimated value.
    pub estimate: f64,
    /// Standard error of the estimator.
    pub standard_error: f64,
    /// Lower interval bound.
    pub lower: f64,
    /// Upper interval bound.
    pub upper: f64,
    /// Confidence level of the interval, in (0, 1).
    pub confidence_level: f64,
    /// Sample size used.
    pub n: usize,
}

impl EstimateResult {
    /// Whether `value` lies in the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Interval width.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}
