//! Execute a validated analysis config and assemble the JSON report.

use anyhow::{Context, Result};
use pmc_core::{Distribution, DistributionFamily, EmpiricalSample, EstimateResult};
use pmc_inference::rng::{child_seeds, resolve_seed};
use pmc_inference::{
    HdrResult, PredictiveCheck, RunningPoint, SampleSummary, percentile_interval,
    required_sample_size_at, running_estimate, sample_parallel, summarize, tail_probability,
    with_interval,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::config::AnalysisConfigV0;

pub const REPORT_V0: &str = "pmc_report_v0";

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub schema_version: &'static str,
    pub seed: u64,
    pub draws: usize,
    pub confidence_level: f64,
    pub summaries: Vec<QuantityReport>,
    pub checks: Vec<CheckReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuantityReport {
    pub variable: String,
    pub summary: SampleSummary,
    /// Oracle mean, when the quantity is a base distribution that has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<TailReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdr: Option<HdrResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_draws: Option<RequiredDraws>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<Vec<RunningPoint>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TailReport {
    pub threshold: f64,
    pub direction: &'static str,
    pub probability: EstimateResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequiredDraws {
    pub precision: f64,
    pub draws: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub family: String,
    pub statistic: String,
    pub tail: String,
    pub observed_n: usize,
    pub observed: f64,
    pub p_value: f64,
    pub p_greater: f64,
    pub p_less: f64,
    /// Equal-tailed interval of the replicated statistic at the run's confidence level.
    pub simulated_interval: (f64, f64),
    pub simulated_mean: f64,
}

struct Quantity {
    sample: EmpiricalSample,
    dist: Option<Box<dyn Distribution>>,
}

pub fn run_analysis(
    cfg: &AnalysisConfigV0,
    observed: &[Vec<f64>],
    seed_override: Option<u64>,
) -> Result<AnalysisReport> {
    let base = resolve_seed(seed_override.or(cfg.seed));
    let seeds = child_seeds(base, cfg.variables.len() + cfg.checks.len());
    let (var_seeds, check_seeds) = seeds.split_at(cfg.variables.len());
    tracing::info!(seed = base, draws = cfg.draws, "analysis started");

    let mut quantities: HashMap<&str, Quantity> = HashMap::new();
    for (v, &seed) in cfg.variables.iter().zip(var_seeds) {
        let dist = v.family.build(&v.params).with_context(|| format!("variable '{}'", v.name))?;
        let sample = sample_parallel(dist.as_ref(), cfg.draws, Some(seed))
            .with_context(|| format!("sampling '{}'", v.name))?;
        tracing::info!(variable = %v.name, family = %v.family, "sampled");
        quantities.insert(v.name.as_str(), Quantity { sample, dist: Some(dist) });
    }

    for d in &cfg.derived {
        let inputs: Vec<&EmpiricalSample> =
            d.inputs.iter().map(|name| &quantities[name.as_str()].sample).collect();
        let sample = d.op.apply(&inputs).with_context(|| format!("derived '{}'", d.name))?;
        tracing::info!(derived = %d.name, op = %d.op, "transformed");
        quantities.insert(d.name.as_str(), Quantity { sample, dist: None });
    }

    let mut summaries = Vec::with_capacity(cfg.summaries.len());
    for s in &cfg.summaries {
        let q = &quantities[s.variable.as_str()];
        let ctx = || format!("summary '{}'", s.variable);
        let summary = summarize(&q.sample, cfg.confidence_level).with_context(ctx)?;
        let exact_mean = q.dist.as_ref().and_then(|d| d.mean());

        let tail = match &s.tail {
            Some(t) => {
                let (threshold, below) = t.threshold()?;
                let point = if below {
                    tail_probability(&q.sample, |x| x < threshold)
                } else {
                    tail_probability(&q.sample, |x| x > threshold)
                };
                let exact = q.dist.as_ref().and_then(|d| {
                    if below { d.cdf_below(threshold) } else { d.cdf(threshold).map(|c| 1.0 - c) }
                });
                Some(TailReport {
                    threshold,
                    direction: if below { "below" } else { "above" },
                    probability: with_interval(point, cfg.confidence_level).with_context(ctx)?,
                    exact,
                })
            }
            None => None,
        };

        let hdr = match s.hdr_mass {
            Some(mass) => {
                let estimator = s.hdr.unwrap_or_default().estimator();
                let r = pmc_inference::highest_density_region(&q.sample, mass, estimator.as_ref())
                    .with_context(ctx)?;
                tracing::info!(variable = %s.variable, intervals = r.intervals.len(), "hdr");
                Some(r)
            }
            None => None,
        };

        let required_draws = match s.precision {
            Some(precision) => Some(RequiredDraws {
                precision,
                draws: required_sample_size_at(&q.sample, precision, cfg.confidence_level)
                    .with_context(ctx)?,
            }),
            None => None,
        };

        let running = s.running_every.map(|every| {
            let n = q.sample.len();
            running_estimate(&q.sample)
                .filter(|p| p.n % every == 0 || p.n == n)
                .collect::<Vec<_>>()
        });

        summaries.push(QuantityReport {
            variable: s.variable.clone(),
            summary,
            exact_mean,
            tail,
            hdr,
            required_draws,
            running,
        });
    }

    let mut checks = Vec::with_capacity(cfg.checks.len());
    for ((c, data), &seed) in cfg.checks.iter().zip(observed).zip(check_seeds) {
        let params: Vec<&EmpiricalSample> =
            c.parameters.iter().map(|p| &quantities[p.as_str()].sample).collect();
        let statistic = c.statistic;
        let r = PredictiveCheck::new(c.tail, Some(seed))
            .check_named(&params, &c.family, data, statistic.as_str(), &|xs| statistic.eval(xs))
            .with_context(|| format!("check '{}'", c.name))?;
        tracing::info!(check = %c.name, p_value = r.p_value, "predictive check");

        let simulated_interval = if r.simulated.len() >= 2 {
            percentile_interval(&r.simulated, cfg.confidence_level)?
        } else {
            (r.simulated.values()[0], r.simulated.values()[0])
        };
        checks.push(CheckReport {
            name: c.name.clone(),
            family: c.family.name().to_string(),
            statistic: statistic.to_string(),
            tail: c.tail.to_string(),
            observed_n: data.len(),
            observed: r.observed,
            p_value: r.p_value,
            p_greater: r.p_greater,
            p_less: r.p_less,
            simulated_interval,
            simulated_mean: pmc_inference::statistics::mean(r.simulated.values()),
        });
    }

    tracing::info!(summaries = summaries.len(), checks = checks.len(), "analysis complete");
    Ok(AnalysisReport {
        schema_version: REPORT_V0,
        seed: base,
        draws: cfg.draws,
        confidence_level: cfg.confidence_level,
        summaries,
        checks,
    })
}
