//! Discrepancy statistics for predictive checks.
//!
//! Each helper maps a dataset to one number. They are total over non-empty
//! input: callers guarantee at least one value.

use std::fmt;
use std::str::FromStr;

use pmc_core::Error;
use serde::{Deserialize, Serialize};

use crate::estimator::quantile_linear_sorted;

/// Arithmetic mean.
pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Unbiased variance; `0` for fewer than two values.
pub fn variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64
}

/// Square root of [`variance`].
pub fn std_dev(xs: &[f64]) -> f64 {
    variance(xs).sqrt()
}

/// Smallest value.
pub fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Largest value.
pub fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Median (linear interpolation between the middle pair).
pub fn median(xs: &[f64]) -> f64 {
    let mut v = xs.to_vec();
    v.sort_by(f64::total_cmp);
    quantile_linear_sorted(&v, 0.5)
}

/// Fraction of exact zeros; the usual check for zero-inflated counts.
pub fn zero_fraction(xs: &[f64]) -> f64 {
    xs.iter().filter(|&&x| x == 0.0).count() as f64 / xs.len() as f64
}

/// Named statistics, selectable from configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// [`mean`]
    Mean,
    /// [`variance`]
    Variance,
    /// [`std_dev`]
    StdDev,
    /// [`min`]
    Min,
    /// [`max`]
    Max,
    /// [`median`]
    Median,
    /// [`zero_fraction`]
    ZeroFraction,
}

impl Statistic {
    /// Every named statistic.
    pub const ALL: [Statistic; 7] = [
        Statistic::Mean,
        Statistic::Variance,
        Statistic::StdDev,
        Statistic::Min,
        Statistic::Max,
        Statistic::Median,
        Statistic::ZeroFraction,
    ];

    /// Config name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Variance => "variance",
            Statistic::StdDev => "std_dev",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Median => "median",
            Statistic::ZeroFraction => "zero_fraction",
        }
    }

    /// Evaluate on a dataset.
    pub fn eval(&self, xs: &[f64]) -> f64 {
        match self {
            Statistic::Mean => mean(xs),
            Statistic::Variance => variance(xs),
            Statistic::StdDev => std_dev(xs),
            Statistic::Min => min(xs),
            Statistic::Max => max(xs),
            Statistic::Median => median(xs),
            Statistic::ZeroFraction => zero_fraction(xs),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL.into_iter().find(|st| st.as_str() == s).ok_or_else(|| {
            let known: Vec<&str> = Statistic::ALL.iter().map(Statistic::as_str).collect();
            Error::Validation(format!("unknown statistic '{s}' (expected one of {known:?})"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_helpers() {
        let xs = [0.0, 3.0, 1.0, 0.0, 6.0];
        assert_relative_eq!(mean(&xs), 2.0, epsilon = 1e-12);
        assert_relative_eq!(variance(&xs), 6.5, epsilon = 1e-12);
        assert_relative_eq!(std_dev(&xs), 6.5f64.sqrt(), epsilon = 1e-12);
        assert_eq!(min(&xs), 0.0);
        assert_eq!(max(&xs), 6.0);
        assert_eq!(median(&xs), 1.0);
        assert_relative_eq!(zero_fraction(&xs), 0.4, epsilon = 1e-12);
        assert_eq!(variance(&[5.0]), 0.0);
    }

    #[test]
    fn test_named_round_trip() {
        for st in Statistic::ALL {
            assert_eq!(st.as_str().parse::<Statistic>().unwrap(), st);
        }
        assert!("kurtosis".parse::<Statistic>().is_err());
        assert_eq!(Statistic::Max.eval(&[1.0, 9.0]), 9.0);
    }
}
