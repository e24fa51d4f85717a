//! Point estimates, standard errors and intervals from an empirical sample.
//!
//! This module provides:
//! - the mean with its Monte Carlo standard error,
//! - tail (indicator) probabilities as Bernoulli proportions,
//! - normal-approximation intervals (valid by the CLT for large `S` only),
//! - sample quantiles and equal-tailed credible intervals,
//! - running (cumulative) means for convergence inspection,
//! - an advisory required-sample-size calculation.

use pmc_core::{EmpiricalSample, Error, EstimateResult, PointEstimate, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::welford::Welford;

/// Below this size a normal-approximation interval is logged as unreliable.
const SMALL_SAMPLE_WARN: usize = 30;

#[inline]
fn standard_normal() -> Normal {
    // Safe by construction for mean=0, sigma=1.
    Normal::new(0.0, 1.0).expect("standard normal should be constructible")
}

fn check_confidence(confidence_level: f64) -> Result<()> {
    if !(confidence_level.is_finite() && confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(Error::Validation(format!(
            "confidence_level must be in (0,1), got {confidence_level}"
        )));
    }
    Ok(())
}

/// Two-sided standard normal critical value, e.g. `z(0.95) ≈ 1.96`.
pub fn z_score(confidence_level: f64) -> Result<f64> {
    check_confidence(confidence_level)?;
    Ok(standard_normal().inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Mean and its standard error `sqrt(s² / S)` with unbiased `s²`.
pub fn mean(sample: &EmpiricalSample) -> Result<PointEstimate> {
    let w = Welford::from_slice(sample.values());
    let se = w
        .standard_error()
        .ok_or(Error::InsufficientSample { required: 2, got: sample.len() })?;
    Ok(PointEstimate { estimate: w.mean(), standard_error: se, n: w.count() })
}

/// Unbiased sample variance. Requires `S >= 2`.
pub fn variance(sample: &EmpiricalSample) -> Result<f64> {
    Welford::from_slice(sample.values())
        .variance()
        .ok_or(Error::InsufficientSample { required: 2, got: sample.len() })
}

/// Fraction of draws satisfying `predicate`, SE `sqrt(p(1-p)/S)`.
pub fn tail_probability<P>(sample: &EmpiricalSample, predicate: P) -> PointEstimate
where
    P: Fn(f64) -> bool,
{
    let n = sample.len();
    let hits = sample.values().iter().filter(|&&x| predicate(x)).count();
    let p = hits as f64 / n as f64;
    PointEstimate { estimate: p, standard_error: (p * (1.0 - p) / n as f64).sqrt(), n }
}

/// `estimate ± z(confidence_level) · standard_error`.
pub fn interval(estimate: f64, standard_error: f64, confidence_level: f64) -> Result<(f64, f64)> {
    if !(standard_error.is_finite() && standard_error >= 0.0) {
        return Err(Error::Validation(format!(
            "standard_error must be finite and >= 0, got {standard_error}"
        )));
    }
    let z = z_score(confidence_level)?;
    Ok((estimate - z * standard_error, estimate + z * standard_error))
}

/// Attach a normal-approximation interval to a point estimate.
pub fn with_interval(point: PointEstimate, confidence_level: f64) -> Result<EstimateResult> {
    let (lower, upper) = interval(point.estimate, point.standard_error, confidence_level)?;
    if point.n < SMALL_SAMPLE_WARN {
        log::warn!(
            "normal-approximation interval on {} draws; coverage is not reliable below {SMALL_SAMPLE_WARN}",
            point.n
        );
    }
    Ok(EstimateResult {
        estimate: point.estimate,
        standard_error: point.standard_error,
        lower,
        upper,
        confidence_level,
        n: point.n,
    })
}

/// Method form of [`with_interval`] on [`PointEstimate`].
pub trait IntervalExt {
    /// Attach a normal-approximation interval at `confidence_level`.
    fn with_interval(self, confidence_level: f64) -> Result<EstimateResult>;
}

impl IntervalExt for PointEstimate {
    fn with_interval(self, confidence_level: f64) -> Result<EstimateResult> {
        with_interval(self, confidence_level)
    }
}

/// Quantile for sorted data via linear interpolation.
///
/// - `q=0` returns min
/// - `q=1` returns max
/// - empty input returns `NaN`
pub fn quantile_linear_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let i = pos.floor() as usize;
    let j = pos.ceil() as usize;
    if i == j {
        return sorted[i];
    }
    let t = pos - i as f64;
    (1.0 - t) * sorted[i] + t * sorted[j]
}

/// Sample quantile at probability `p` in `[0, 1]`.
pub fn quantile(sample: &EmpiricalSample, p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::Validation(format!("quantile probability must be in [0,1], got {p}")));
    }
    Ok(quantile_linear_sorted(&sample.sorted(), p))
}

/// Equal-tailed credible interval from sample quantiles.
pub fn percentile_interval(sample: &EmpiricalSample, confidence_level: f64) -> Result<(f64, f64)> {
    if sample.len() < 2 {
        return Err(Error::InsufficientSample { required: 2, got: sample.len() });
    }
    check_confidence(confidence_level)?;

    let sorted = sample.sorted();
    let alpha = (1.0 - confidence_level) / 2.0;
    let lo = quantile_linear_sorted(&sorted, alpha);
    let hi = quantile_linear_sorted(&sorted, 1.0 - alpha);
    Ok((lo.min(hi), lo.max(hi)))
}

/// One step of a running estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningPoint {
    /// Number of leading draws included.
    pub n: usize,
    /// Mean of the first `n` draws.
    pub mean: f64,
    /// Standard error of that mean (`None` for `n = 1`).
    pub standard_error: Option<f64>,
}

/// Lazy cumulative-mean sequence over a sample, `n = 1..=S`.
///
/// Each step is O(1) (Welford update). Cloning restarts nothing and shares
/// nothing mutable; call [`running_estimate`] again to restart from `n = 1`.
#[derive(Debug, Clone)]
pub struct RunningEstimate<'a> {
    values: &'a [f64],
    acc: Welford,
}

impl Iterator for RunningEstimate<'_> {
    type Item = RunningPoint;

    fn next(&mut self) -> Option<RunningPoint> {
        let x = *self.values.get(self.acc.count())?;
        self.acc.update(x);
        Some(RunningPoint {
            n: self.acc.count(),
            mean: self.acc.mean(),
            standard_error: self.acc.standard_error(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.values.len() - self.acc.count();
        (left, Some(left))
    }
}

impl ExactSizeIterator for RunningEstimate<'_> {}

/// Cumulative mean of the first `n` draws for every `n`.
pub fn running_estimate(sample: &EmpiricalSample) -> RunningEstimate<'_> {
    RunningEstimate { values: sample.values(), acc: Welford::new() }
}

/// Smallest `n` with `1.96 · sqrt(var_hat / n) <= target_precision`.
///
/// Advisory: the pilot variance is itself an estimate, so treat the result
/// as a lower bound.
pub fn required_sample_size(pilot: &EmpiricalSample, target_precision: f64) -> Result<usize> {
    required_sample_size_at(pilot, target_precision, 0.95)
}

/// [`required_sample_size`] at an arbitrary confidence level.
pub fn required_sample_size_at(
    pilot: &EmpiricalSample,
    target_precision: f64,
    confidence_level: f64,
) -> Result<usize> {
    if !(target_precision.is_finite() && target_precision > 0.0) {
        return Err(Error::Validation(format!(
            "target_precision must be finite and > 0, got {target_precision}"
        )));
    }
    let var = variance(pilot)?;
    let z = z_score(confidence_level)?;
    let half_width = |n: usize| z * (var / n as f64).sqrt();

    let guess = (z * z * var / (target_precision * target_precision)).ceil();
    if !guess.is_finite() || guess >= usize::MAX as f64 {
        return Err(Error::Validation(format!(
            "required sample size overflows for variance {var} and precision {target_precision}"
        )));
    }
    // Correct the closed form for floating-point rounding in either direction.
    let mut n = (guess as usize).max(1);
    while half_width(n) > target_precision {
        n += 1;
    }
    while n > 1 && half_width(n - 1) <= target_precision {
        n -= 1;
    }
    log::debug!("required sample size {n} (pilot S={}, var={var:.6e})", pilot.len());
    Ok(n)
}

/// One-call summary of a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    /// Mean with normal-approximation interval.
    pub mean: EstimateResult,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Sample median.
    pub median: f64,
    /// Equal-tailed credible interval at the same confidence level.
    pub equal_tailed: (f64, f64),
    /// Smallest draw.
    pub min: f64,
    /// Largest draw.
    pub max: f64,
}

/// Mean, spread, median and equal-tailed interval. Requires `S >= 2`.
pub fn summarize(sample: &EmpiricalSample, confidence_level: f64) -> Result<SampleSummary> {
    let m = with_interval(mean(sample)?, confidence_level)?;
    let sorted = sample.sorted();
    let alpha = (1.0 - confidence_level) / 2.0;
    Ok(SampleSummary {
        mean: m,
        std_dev: variance(sample)?.sqrt(),
        median: quantile_linear_sorted(&sorted, 0.5),
        equal_tailed: (
            quantile_linear_sorted(&sorted, alpha),
            quantile_linear_sorted(&sorted, 1.0 - alpha),
        ),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn obs(v: &[f64]) -> EmpiricalSample {
        EmpiricalSample::observed(v.to_vec()).unwrap()
    }

    #[test]
    fn test_method_form_matches_free_function() {
        let p = PointEstimate { estimate: 2.0, standard_error: 0.5, n: 100 };
        let a = p.with_interval(0.95).unwrap();
        let b = with_interval(p, 0.95).unwrap();
        assert_eq!(a, b);
        assert_relative_eq!(a.upper - a.lower, 2.0 * 0.5 * z_score(0.95).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_mean_and_standard_error() {
        let s = obs(&[1.0, 2.0, 3.0, 4.0]);
        let m = mean(&s).unwrap();
        assert_relative_eq!(m.estimate, 2.5, epsilon = 1e-12);
        // var = 5/3, se = sqrt(5/12)
        assert_relative_eq!(m.standard_error, (5.0f64 / 12.0).sqrt(), epsilon = 1e-12);
        assert_eq!(m.n, 4);
    }

    #[test]
    fn test_mean_needs_two_draws() {
        let s = obs(&[1.0]);
        assert_eq!(mean(&s).unwrap_err(), Error::InsufficientSample { required: 2, got: 1 });
    }

    #[test]
    fn test_tail_probability() {
        let s = obs(&[0.1, 0.2, 0.7, 0.9]);
        let p = tail_probability(&s, |x| x < 0.5);
        assert_relative_eq!(p.estimate, 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.standard_error, (0.25f64 / 4.0).sqrt(), epsilon = 1e-12);

        let none = tail_probability(&s, |x| x > 10.0);
        assert_eq!(none.estimate, 0.0);
        assert_eq!(none.standard_error, 0.0);
    }

    #[test]
    fn test_z_score_and_interval() {
        assert_relative_eq!(z_score(0.95).unwrap(), 1.959_964, epsilon = 1e-5);
        assert_relative_eq!(z_score(0.99).unwrap(), 2.575_829, epsilon = 1e-5);
        let (lo, hi) = interval(10.0, 1.0, 0.95).unwrap();
        assert_relative_eq!(lo, 10.0 - 1.959_964, epsilon = 1e-5);
        assert_relative_eq!(hi, 10.0 + 1.959_964, epsilon = 1e-5);
        assert!(interval(1.0, 1.0, 1.0).is_err());
        assert!(interval(1.0, 1.0, 0.0).is_err());
        assert!(interval(1.0, -1.0, 0.9).is_err());
    }

    #[test]
    fn test_quantile_linear_sorted_edges() {
        let s = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((quantile_linear_sorted(&s, 0.0) - 1.0).abs() < 1e-12);
        assert!((quantile_linear_sorted(&s, 1.0) - 5.0).abs() < 1e-12);
        assert!((quantile_linear_sorted(&s, 0.5) - 3.0).abs() < 1e-12);
        assert!((quantile_linear_sorted(&s, 0.25) - 2.0).abs() < 1e-12);
        assert!(quantile_linear_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn test_quantile_rejects_bad_probability() {
        let s = obs(&[1.0, 2.0]);
        assert!(quantile(&s, 1.1).is_err());
        assert_relative_eq!(quantile(&s, 0.5).unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_interval_smoke() {
        let s = obs(&[5.0, 1.0, 4.0, 2.0, 3.0]);
        let (lo, hi) = percentile_interval(&s, 0.8).unwrap();
        assert!(lo < hi);
        assert_relative_eq!(lo, 1.4, epsilon = 1e-12);
        assert_relative_eq!(hi, 4.6, epsilon = 1e-12);
    }

    #[test]
    fn test_running_estimate_matches_prefix_means() {
        let xs = [4.0, 2.0, 6.0, 0.0, 3.0];
        let s = obs(&xs);
        let run: Vec<RunningPoint> = running_estimate(&s).collect();
        assert_eq!(run.len(), xs.len());
        for (k, p) in run.iter().enumerate() {
            let prefix = &xs[..=k];
            let m = prefix.iter().sum::<f64>() / prefix.len() as f64;
            assert_eq!(p.n, k + 1);
            assert_relative_eq!(p.mean, m, epsilon = 1e-12);
        }
        assert!(run[0].standard_error.is_none());
        assert!(run[1].standard_error.is_some());
    }

    #[test]
    fn test_running_estimate_is_restartable() {
        let s = obs(&[1.0, 2.0, 3.0]);
        let it = running_estimate(&s);
        assert_eq!(it.len(), 3);
        let a: Vec<_> = it.clone().collect();
        let b: Vec<_> = it.collect();
        let c: Vec<_> = running_estimate(&s).collect();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_required_sample_size_is_minimal() {
        let s = obs(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let var = variance(&s).unwrap();
        let z = z_score(0.95).unwrap();
        let target = 0.1;
        let n = required_sample_size(&s, target).unwrap();
        assert!(z * (var / n as f64).sqrt() <= target);
        assert!(z * (var / (n - 1) as f64).sqrt() > target);
    }

    #[test]
    fn test_required_sample_size_validates() {
        let s = obs(&[1.0, 2.0]);
        assert!(required_sample_size(&s, 0.0).is_err());
        assert!(required_sample_size(&obs(&[1.0]), 0.1).is_err());
        // Constant pilot: any n meets the target.
        assert_eq!(required_sample_size(&obs(&[2.0, 2.0, 2.0]), 0.1).unwrap(), 1);
    }

    #[test]
    fn test_summarize() {
        let s = obs(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let sum = summarize(&s, 0.9).unwrap();
        assert_relative_eq!(sum.mean.estimate, 3.0, epsilon = 1e-12);
        assert_relative_eq!(sum.median, 3.0, epsilon = 1e-12);
        assert_eq!(sum.min, 1.0);
        assert_eq!(sum.max, 5.0);
        assert!(sum.mean.contains(3.0));
        assert_eq!(sum.mean.confidence_level, 0.9);
    }
}
