//! Posterior predictive checks.
//!
//! For each joint parameter draw θ_i a synthetic dataset the size of the
//! observed one is drawn from the data-generating family at θ_i, and the
//! discrepancy statistic is evaluated on it. The observed statistic's
//! position within those replicates gives a Bayesian p-value. Values near 0
//! or 1 signal misfit; interpretation is left to the caller.

use std::fmt;

use pmc_core::{DistributionFamily, EmpiricalSample, Error, Provenance, Result};
use serde::{Deserialize, Serialize};

use crate::rng::{resolve_seed, stream};
use crate::transform::check_aligned;

/// Which replicates count as "at least as extreme" as the observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tail {
    /// `T_sim >= T_obs`.
    Greater,
    /// `T_sim <= T_obs`.
    Less,
    /// `min(1, 2 · min(p_greater, p_less))`.
    #[default]
    TwoSided,
}

impl Tail {
    /// Config name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tail::Greater => "greater",
            Tail::Less => "less",
            Tail::TwoSided => "two_sided",
        }
    }
}

impl fmt::Display for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a predictive check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveCheckResult {
    /// Statistic on the observed data.
    pub observed: f64,
    /// Statistic on each replicate, in parameter-draw order.
    pub simulated: EmpiricalSample,
    /// Tail convention used for `p_value`.
    pub tail: Tail,
    /// Bayesian p-value under `tail`.
    pub p_value: f64,
    /// Fraction of replicates `>= observed`.
    pub p_greater: f64,
    /// Fraction of replicates `<= observed`.
    pub p_less: f64,
}

/// Predictive check settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictiveCheck {
    /// Tail convention.
    pub tail: Tail,
    /// Base seed; replicate `i` uses stream `seed + i`.
    pub seed: Option<u64>,
}

impl PredictiveCheck {
    /// Settings with a tail convention and seed.
    pub fn new(tail: Tail, seed: Option<u64>) -> Self {
        Self { tail, seed }
    }

    /// Run the check with an anonymous statistic.
    pub fn check(
        &self,
        parameters: &[&EmpiricalSample],
        family: &dyn DistributionFamily,
        observed: &[f64],
        statistic: &(dyn Fn(&[f64]) -> f64 + Sync),
    ) -> Result<PredictiveCheckResult> {
        self.check_named(parameters, family, observed, "statistic", statistic)
    }

    /// Run the check; `name` labels the simulated sample's provenance.
    ///
    /// `parameters[k][i]` is parameter `k` of joint draw `i`, so all
    /// parameter samples must have equal length.
    pub fn check_named(
        &self,
        parameters: &[&EmpiricalSample],
        family: &dyn DistributionFamily,
        observed: &[f64],
        name: &str,
        statistic: &(dyn Fn(&[f64]) -> f64 + Sync),
    ) -> Result<PredictiveCheckResult> {
        use rayon::prelude::*;

        if observed.is_empty() {
            return Err(Error::Validation("observed dataset must be non-empty".to_string()));
        }
        if parameters.len() != family.n_params() {
            return Err(Error::InvalidParameter(format!(
                "{} takes {} parameter(s), got {} parameter sample(s)",
                family.name(),
                family.n_params(),
                parameters.len()
            )));
        }
        let s = check_aligned(parameters)?;

        let t_obs = statistic(observed);
        if !t_obs.is_finite() {
            return Err(Error::Sampling(format!(
                "statistic '{name}' is non-finite on the observed data ({t_obs})"
            )));
        }

        let base = resolve_seed(self.seed);
        let m = observed.len();
        log::debug!(
            "predictive check: {s} replicates of {m} draws from {} (base seed {base}, statistic '{name}')",
            family.name()
        );

        let results: Vec<Result<f64>> = (0..s)
            .into_par_iter()
            .map(|i| {
                let theta: Vec<f64> = parameters.iter().map(|p| p.values()[i]).collect();
                let dist = family.build(&theta)?;
                let mut rng = stream(base, i as u64);
                let replicate = dist.draw(m, &mut rng)?;
                let t = statistic(replicate.values());
                if !t.is_finite() {
                    return Err(Error::Sampling(format!(
                        "statistic '{name}' is non-finite on replicate {i} (theta={theta:?})"
                    )));
                }
                Ok(t)
            })
            .collect();

        let mut simulated = Vec::with_capacity(s);
        for r in results {
            simulated.push(r?);
        }

        let n = simulated.len() as f64;
        let p_greater = simulated.iter().filter(|&&t| t >= t_obs).count() as f64 / n;
        let p_less = simulated.iter().filter(|&&t| t <= t_obs).count() as f64 / n;
        let p_value = match self.tail {
            Tail::Greater => p_greater,
            Tail::Less => p_less,
            Tail::TwoSided => (2.0 * p_greater.min(p_less)).min(1.0),
        };

        let simulated = EmpiricalSample::new(
            simulated,
            Provenance::Simulated { statistic: name.to_string() },
        )?;

        Ok(PredictiveCheckResult {
            observed: t_obs,
            simulated,
            tail: self.tail,
            p_value,
            p_greater,
            p_less,
        })
    }
}
