//! Analysis config v0 (YAML or JSON) parsing + semantic validation.
//!
//! One file declares the distributions to sample, the transforms that derive
//! new quantities from them, what to estimate on each quantity, and which
//! predictive checks to run. Validation runs before any sampling.

use anyhow::{Context, Result};
use pmc_core::DistributionFamily;
use pmc_inference::{
    Bandwidth, BinRule, DensityEstimator, GaussianKde, Histogram, Op, Statistic, Tail,
};
use pmc_prob::Family;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SCHEMA_V0: &str = "pmc_analysis_v0";

fn default_draws() -> usize {
    10_000
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_grid_points() -> usize {
    pmc_inference::density::DEFAULT_GRID_POINTS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfigV0 {
    pub schema_version: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_draws")]
    pub draws: usize,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub derived: Vec<DerivedSpec>,
    #[serde(default)]
    pub summaries: Vec<SummarySpec>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableSpec {
    pub name: String,
    pub family: Family,
    pub params: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedSpec {
    pub name: String,
    pub op: Op,
    pub inputs: Vec<String>,
}

/// Indicator threshold: exactly one of `below` / `above`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TailSpec {
    #[serde(default)]
    pub below: Option<f64>,
    #[serde(default)]
    pub above: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthRule {
    Silverman,
    Scott,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum BandwidthSpec {
    Fixed(f64),
    Rule(BandwidthRule),
}

impl Default for BandwidthSpec {
    fn default() -> Self {
        BandwidthSpec::Rule(BandwidthRule::Silverman)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinsRule {
    Sturges,
    FreedmanDiaconis,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum BinsSpec {
    Fixed(usize),
    Rule(BinsRule),
}

impl Default for BinsSpec {
    fn default() -> Self {
        BinsSpec::Rule(BinsRule::FreedmanDiaconis)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "estimator", rename_all = "snake_case")]
pub enum HdrSpec {
    Kde {
        #[serde(default)]
        bandwidth: BandwidthSpec,
        #[serde(default = "default_grid_points")]
        grid_points: usize,
    },
    Histogram {
        #[serde(default)]
        bins: BinsSpec,
    },
}

impl Default for HdrSpec {
    fn default() -> Self {
        HdrSpec::Kde { bandwidth: BandwidthSpec::default(), grid_points: default_grid_points() }
    }
}

impl HdrSpec {
    pub fn estimator(&self) -> Box<dyn DensityEstimator> {
        match *self {
            HdrSpec::Kde { bandwidth, grid_points } => {
                let bandwidth = match bandwidth {
                    BandwidthSpec::Fixed(h) => Bandwidth::Fixed(h),
                    BandwidthSpec::Rule(BandwidthRule::Silverman) => Bandwidth::Silverman,
                    BandwidthSpec::Rule(BandwidthRule::Scott) => Bandwidth::Scott,
                };
                Box::new(GaussianKde { bandwidth, grid_points })
            }
            HdrSpec::Histogram { bins } => {
                let bins = match bins {
                    BinsSpec::Fixed(k) => BinRule::Fixed(k),
                    BinsSpec::Rule(BinsRule::Sturges) => BinRule::Sturges,
                    BinsSpec::Rule(BinsRule::FreedmanDiaconis) => BinRule::FreedmanDiaconis,
                };
                Box::new(Histogram { bins })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummarySpec {
    pub variable: String,
    #[serde(default)]
    pub tail: Option<TailSpec>,
    #[serde(default)]
    pub hdr_mass: Option<f64>,
    #[serde(default)]
    pub hdr: Option<HdrSpec>,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub running_every: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ObservedSpec {
    Inline(Vec<f64>),
    File { file: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    pub name: String,
    pub parameters: Vec<String>,
    pub family: Family,
    pub observed: ObservedSpec,
    pub statistic: Statistic,
    #[serde(default)]
    pub tail: Tail,
}

pub fn read_config(path: &Path) -> Result<AnalysisConfigV0> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;

    // YAML parser can also read JSON (YAML is a superset).
    let probe: serde_yaml_ng::Value = serde_yaml_ng::from_slice(&bytes)
        .with_context(|| format!("parsing config {}", path.display()))?;
    let schema_version = probe.get("schema_version").and_then(|v| v.as_str());
    if schema_version != Some(SCHEMA_V0) {
        anyhow::bail!(
            "unsupported schema_version for analysis config: got={} expected={SCHEMA_V0}",
            schema_version.unwrap_or("<missing>")
        );
    }

    let cfg: AnalysisConfigV0 = serde_yaml_ng::from_slice(&bytes)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

/// Numbers separated by whitespace and/or commas; `#` starts a comment.
pub fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("");
        for tok in line.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
            let x: f64 = tok
                .parse()
                .with_context(|| format!("line {}: not a number: {tok:?}", lineno + 1))?;
            if !x.is_finite() {
                anyhow::bail!("line {}: non-finite value {tok:?}", lineno + 1);
            }
            out.push(x);
        }
    }
    Ok(out)
}

fn contains_duplicates<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    names.into_iter().find(|n| !seen.insert(*n))
}

impl ObservedSpec {
    pub fn load(&self, base_dir: &Path) -> Result<Vec<f64>> {
        match self {
            ObservedSpec::Inline(v) => Ok(v.clone()),
            ObservedSpec::File { file } => {
                let path = if file.is_absolute() { file.clone() } else { base_dir.join(file) };
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading observed data {}", path.display()))?;
                parse_numbers(&text).with_context(|| format!("parsing {}", path.display()))
            }
        }
    }
}

impl TailSpec {
    /// `(threshold, is_below)`.
    pub fn threshold(&self) -> Result<(f64, bool)> {
        match (self.below, self.above) {
            (Some(x), None) => Ok((x, true)),
            (None, Some(x)) => Ok((x, false)),
            _ => anyhow::bail!("tail must set exactly one of `below` or `above`"),
        }
    }
}

impl AnalysisConfigV0 {
    /// Semantic checks; returns observed datasets per check, in order.
    pub fn validate(&self, config_path: &Path) -> Result<Vec<Vec<f64>>> {
        if self.schema_version != SCHEMA_V0 {
            anyhow::bail!(
                "unsupported schema_version: got={} expected={SCHEMA_V0}",
                self.schema_version
            );
        }
        if self.draws == 0 {
            anyhow::bail!("draws must be >= 1");
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            anyhow::bail!("confidence_level must be in (0,1), got {}", self.confidence_level);
        }
        if self.variables.is_empty() {
            anyhow::bail!("variables must be non-empty");
        }

        let all_names = self
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .chain(self.derived.iter().map(|d| d.name.as_str()));
        if let Some(dup) = contains_duplicates(all_names) {
            anyhow::bail!("duplicate quantity name: {dup}");
        }

        let mut known: HashSet<&str> = HashSet::new();
        for v in &self.variables {
            if v.name.trim().is_empty() {
                anyhow::bail!("variable name cannot be empty");
            }
            v.family.build(&v.params).with_context(|| format!("variable '{}'", v.name))?;
            known.insert(v.name.as_str());
        }

        for d in &self.derived {
            if d.name.trim().is_empty() {
                anyhow::bail!("derived name cannot be empty");
            }
            match d.op.arity() {
                Some(k) if d.inputs.len() != k => anyhow::bail!(
                    "derived '{}': op {} takes {k} input(s), got {}",
                    d.name,
                    d.op,
                    d.inputs.len()
                ),
                None if d.inputs.is_empty() => {
                    anyhow::bail!("derived '{}': op {} needs at least one input", d.name, d.op)
                }
                _ => {}
            }
            for input in &d.inputs {
                if !known.contains(input.as_str()) {
                    anyhow::bail!(
                        "derived '{}' references unknown or later-defined quantity '{input}'",
                        d.name
                    );
                }
            }
            known.insert(d.name.as_str());
        }

        for s in &self.summaries {
            if !known.contains(s.variable.as_str()) {
                anyhow::bail!("summary references unknown quantity '{}'", s.variable);
            }
            if let Some(t) = &s.tail {
                t.threshold().with_context(|| format!("summary '{}'", s.variable))?;
            }
            if let Some(m) = s.hdr_mass {
                if !(m > 0.0 && m <= 1.0) {
                    anyhow::bail!("summary '{}': hdr_mass must be in (0,1], got {m}", s.variable);
                }
            }
            if s.hdr.is_some() && s.hdr_mass.is_none() {
                anyhow::bail!("summary '{}': hdr requires hdr_mass", s.variable);
            }
            if let Some(p) = s.precision {
                if !(p.is_finite() && p > 0.0) {
                    anyhow::bail!("summary '{}': precision must be > 0, got {p}", s.variable);
                }
            }
            if s.running_every == Some(0) {
                anyhow::bail!("summary '{}': running_every must be >= 1", s.variable);
            }
        }

        if let Some(dup) = contains_duplicates(self.checks.iter().map(|c| c.name.as_str())) {
            anyhow::bail!("duplicate check name: {dup}");
        }
        let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        let mut observed = Vec::with_capacity(self.checks.len());
        for c in &self.checks {
            if c.parameters.len() != c.family.n_params() {
                anyhow::bail!(
                    "check '{}': {} takes {} parameter(s) ({}), got {}",
                    c.name,
                    c.family,
                    c.family.n_params(),
                    c.family.param_names().join(", "),
                    c.parameters.len()
                );
            }
            for p in &c.parameters {
                if !known.contains(p.as_str()) {
                    anyhow::bail!("check '{}' references unknown quantity '{p}'", c.name);
                }
            }
            let data = c.observed.load(base_dir).with_context(|| format!("check '{}'", c.name))?;
            if data.is_empty() {
                anyhow::bail!("check '{}': observed data must be non-empty", c.name);
            }
            observed.push(data);
        }

        Ok(observed)
    }
}
