//! PMC CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pmc_core::{Distribution, DistributionFamily};
use pmc_prob::Family;
use std::path::PathBuf;

mod config;
mod report;

#[derive(Parser)]
#[command(name = "pmc")]
#[command(about = "PMC - Monte Carlo inference on posterior samples")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an analysis config (YAML or JSON)
    Run {
        /// Analysis config (`schema_version: pmc_analysis_v0`)
        #[arg(short, long)]
        config: PathBuf,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// RNG seed; overrides the config's `seed`.
        #[arg(long)]
        seed: Option<u64>,

        /// Threads (0 = auto).
        #[arg(long, default_value = "0")]
        threads: usize,
    },

    /// Draw from one distribution and summarize it next to its exact values
    Sample {
        /// Distribution family (gamma, beta, normal, poisson, exponential)
        #[arg(long)]
        family: Family,

        /// Comma-separated parameters, e.g. `68,45` for gamma(shape, rate)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        params: Vec<f64>,

        /// Number of draws
        #[arg(long, default_value = "10000")]
        draws: usize,

        /// Confidence level for intervals
        #[arg(long, default_value = "0.95")]
        confidence_level: f64,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { config, output, seed, threads } => {
            cmd_run(&config, output.as_ref(), seed, threads)
        }
        Commands::Sample { family, params, draws, confidence_level, seed, output } => {
            cmd_sample(family, &params, draws, confidence_level, seed, output.as_ref())
        }
        Commands::Version => {
            println!("pmc {}", pmc_core::VERSION);
            Ok(())
        }
    }
}

fn configure_threads(threads: usize) {
    if threads > 0 {
        // Best-effort; if a global pool already exists, keep going.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global();
    }
}

fn cmd_run(
    config_path: &PathBuf,
    output: Option<&PathBuf>,
    seed: Option<u64>,
    threads: usize,
) -> Result<()> {
    configure_threads(threads);

    tracing::info!(path = %config_path.display(), "loading config");
    let cfg = config::read_config(config_path)?;
    let observed = cfg
        .validate(config_path)
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    tracing::info!(
        variables = cfg.variables.len(),
        derived = cfg.derived.len(),
        summaries = cfg.summaries.len(),
        checks = cfg.checks.len(),
        "config validated"
    );

    let report = report::run_analysis(&cfg, &observed, seed)?;
    write_json(output, serde_json::to_value(&report)?)
}

fn cmd_sample(
    family: Family,
    params: &[f64],
    draws: usize,
    confidence_level: f64,
    seed: Option<u64>,
    output: Option<&PathBuf>,
) -> Result<()> {
    let dist = family.build(params).with_context(|| format!("{family}{params:?}"))?;
    let seed = pmc_inference::rng::resolve_seed(seed);
    let sample = pmc_inference::sample_parallel(dist.as_ref(), draws, Some(seed))?;
    let summary = pmc_inference::summarize(&sample, confidence_level)?;
    tracing::info!(family = %family, draws, seed, "sampled");

    let alpha = (1.0 - confidence_level) / 2.0;
    let output_json = serde_json::json!({
        "family": family.as_str(),
        "param_names": family.param_names(),
        "params": params,
        "draws": draws,
        "seed": seed,
        "confidence_level": confidence_level,
        "summary": summary,
        "exact": {
            "mean": dist.mean(),
            "median": dist.quantile(0.5),
            "equal_tailed": [dist.quantile(alpha), dist.quantile(1.0 - alpha)],
        },
    });

    write_json(output, output_json)
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
