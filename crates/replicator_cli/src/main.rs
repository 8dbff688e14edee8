//! Energy-mix scenario runner.
//!
//! Integrates the replicator model for one or all built-in scenarios (or a
//! JSON-described custom one) and writes CSV tables and SVG charts.

mod chart;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use replicator_core::{
    Horizon, IntegrationSettings, RunOptions, Scenario, ScenarioConfig, ScenarioRun,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "energy-mix")]
#[command(about = "Simulate energy-mix transitions with replicator dynamics", long_about = None)]
struct Args {
    /// Scenario to run (baseline, renewable, nuclear_phaseout, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Start time
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    t0: f64,

    /// End time
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    t_end: f64,

    /// Integration step size
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Time of the nuclear phase-out shock
    #[arg(long, default_value_t = replicator_core::scenarios::DEFAULT_PHASEOUT_TIME)]
    phaseout_time: f64,

    /// Directory for CSV and chart output
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Do not render charts
    #[arg(long)]
    no_show: bool,

    /// Write one CSV file per scenario
    #[arg(long)]
    save_csv: bool,

    /// JSON file describing a custom scenario (overrides --scenario)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip input validation before integrating
    #[arg(long)]
    no_validate: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            horizon: Horizon {
                t0: self.t0,
                t_end: self.t_end,
                dt: self.dt,
            },
            phaseout_time: self.phaseout_time,
            settings: IntegrationSettings {
                validate: !self.no_validate,
                ..IntegrationSettings::default()
            },
        }
    }
}

fn select_scenarios(name: &str) -> Result<Vec<Scenario>> {
    if name.eq_ignore_ascii_case("all") {
        return Ok(Scenario::all());
    }
    let scenario = name.parse::<Scenario>()?;
    Ok(vec![scenario])
}

fn load_config(path: &Path) -> Result<ScenarioConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario config {}", path.display()))?;
    let config = ScenarioConfig::from_json(&text)
        .with_context(|| format!("failed to parse scenario config {}", path.display()))?;
    Ok(config)
}

fn run_scenarios(args: &Args) -> Result<Vec<ScenarioRun>> {
    let options = args.run_options();
    debug!(?options, "resolved run options");

    if let Some(path) = &args.config {
        let config = load_config(path)?;
        let run = config
            .run(&options)
            .with_context(|| format!("scenario {} failed", config.name))?;
        return Ok(vec![run]);
    }

    select_scenarios(&args.scenario)?
        .into_iter()
        .map(|scenario| {
            scenario
                .run(&options)
                .with_context(|| format!("scenario {scenario} failed"))
        })
        .collect()
}

/// Runs the selected scenarios and returns the paths of every file written.
fn run(args: &Args) -> Result<Vec<PathBuf>> {
    let runs = run_scenarios(args)?;
    let mut written = Vec::new();

    for run in &runs {
        info!(
            "{} ({} samples): {}",
            run.title,
            run.trajectory.len(),
            output::final_mix_summary(run)
        );
        if args.save_csv {
            written.push(output::write_csv(run, &args.output_dir)?);
        }
        if !args.no_show {
            written.push(output::write_chart(run, &args.output_dir)?);
        }
    }

    Ok(written)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {err}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(written) => {
            debug!(files = written.len(), "done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
