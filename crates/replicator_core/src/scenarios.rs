//! Energy-transition scenarios for the Spanish generation mix.
//!
//! Three built-in parameter sets share the same payoffs and initial mix and
//! differ only in growth rates:
//! - baseline: status-quo growth,
//! - renewable: policy support for wind and solar,
//! - nuclear_phaseout: nuclear growth turns negative after a policy shock.
//!
//! Custom scenarios can be described in JSON and loaded with
//! [`ScenarioConfig::from_json`].

use crate::error::ScenarioError;
use crate::integrator::{integrate, IntegrationSettings};
use crate::model::{GrowthRate, ReplicatorParams};
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Generation technologies, in state-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technology {
    Fossil,
    Nuclear,
    Wind,
    Solar,
    Hydro,
}

impl Technology {
    pub const ALL: [Technology; 5] = [
        Technology::Fossil,
        Technology::Nuclear,
        Technology::Wind,
        Technology::Solar,
        Technology::Hydro,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Technology::Fossil => "Fossil",
            Technology::Nuclear => "Nuclear",
            Technology::Wind => "Wind",
            Technology::Solar => "Solar",
            Technology::Hydro => "Hydro",
        }
    }

    /// Position of this technology in a share vector.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

pub const TECHNOLOGY_LABELS: [&str; 5] = ["Fossil", "Nuclear", "Wind", "Solar", "Hydro"];

/// Current Spanish generation shares, as close to reality as available data allows.
pub const SPAIN_INITIAL_SHARES: [f64; 5] = [0.038, 0.256, 0.244, 0.295, 0.167];

pub const DEFAULT_PAYOFFS: [f64; 5] = [1.0, 1.0, 0.9, 0.9, 0.6];
pub const BASELINE_GROWTH: [f64; 5] = [0.02, 0.015, 0.03, 0.035, 0.01];
pub const RENEWABLE_GROWTH: [f64; 5] = [0.01, 0.015, 0.05, 0.06, 0.01];
pub const PHASEOUT_GROWTH: [f64; 5] = [0.02, -0.03, 0.035, 0.04, 0.01];

pub const DEFAULT_PHASEOUT_TIME: f64 = 40.0;

/// Time span and step of a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Horizon {
    pub t0: f64,
    pub t_end: f64,
    pub dt: f64,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t_end: 100.0,
            dt: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub horizon: Horizon,
    /// Shock time used by the nuclear phase-out scenario.
    pub phaseout_time: f64,
    pub settings: IntegrationSettings,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            horizon: Horizon::default(),
            phaseout_time: DEFAULT_PHASEOUT_TIME,
            settings: IntegrationSettings::default(),
        }
    }
}

/// Built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Baseline,
    RenewablePolicy,
    NuclearPhaseout,
}

impl Scenario {
    pub fn all() -> Vec<Scenario> {
        vec![
            Scenario::Baseline,
            Scenario::RenewablePolicy,
            Scenario::NuclearPhaseout,
        ]
    }

    /// Registry key, also used for output file names.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::RenewablePolicy => "renewable",
            Scenario::NuclearPhaseout => "nuclear_phaseout",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Scenario::Baseline => "Baseline scenario",
            Scenario::RenewablePolicy => "Renewable support scenario",
            Scenario::NuclearPhaseout => "Nuclear phase-out scenario",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Baseline => "Current mix with constant growth rates, no policy intervention",
            Scenario::RenewablePolicy => "Policies favouring wind and solar growth over fossil",
            Scenario::NuclearPhaseout => "Nuclear growth turns negative after a policy shock",
        }
    }

    /// Parameter bundle for this scenario. `phaseout_time` only affects
    /// [`Scenario::NuclearPhaseout`].
    pub fn params(&self, phaseout_time: f64) -> ReplicatorParams {
        let payoffs = DEFAULT_PAYOFFS.to_vec();
        match self {
            Scenario::Baseline => ReplicatorParams {
                payoffs,
                growth: GrowthRate::Constant(BASELINE_GROWTH.to_vec()),
                shock_time: None,
            },
            Scenario::RenewablePolicy => ReplicatorParams {
                payoffs,
                growth: GrowthRate::Constant(RENEWABLE_GROWTH.to_vec()),
                shock_time: None,
            },
            Scenario::NuclearPhaseout => ReplicatorParams {
                payoffs,
                growth: GrowthRate::step_change(
                    BASELINE_GROWTH.to_vec(),
                    PHASEOUT_GROWTH.to_vec(),
                    phaseout_time,
                ),
                shock_time: Some(phaseout_time),
            },
        }
    }

    pub fn run(&self, options: &RunOptions) -> Result<ScenarioRun, ScenarioError> {
        let params = self.params(options.phaseout_time);
        debug!(scenario = self.name(), "running built-in scenario");
        let trajectory = run_params(&params, &SPAIN_INITIAL_SHARES, options)?;
        Ok(ScenarioRun {
            name: self.name().to_string(),
            title: self.title().to_string(),
            labels: TECHNOLOGY_LABELS.iter().map(|s| s.to_string()).collect(),
            shock_time: params.shock_time,
            trajectory,
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "baseline" => Ok(Scenario::Baseline),
            "renewable" | "renewable_policy" => Ok(Scenario::RenewablePolicy),
            "nuclear_phaseout" | "nuclear" => Ok(Scenario::NuclearPhaseout),
            _ => Err(ScenarioError::UnknownScenario(s.to_string())),
        }
    }
}

/// Runs every built-in scenario with the same options.
pub fn run_all(options: &RunOptions) -> Result<Vec<ScenarioRun>, ScenarioError> {
    Scenario::all().iter().map(|s| s.run(options)).collect()
}

fn run_params(
    params: &ReplicatorParams,
    initial: &[f64],
    options: &RunOptions,
) -> Result<Trajectory, ScenarioError> {
    let Horizon { t0, t_end, dt } = options.horizon;
    Ok(integrate(params, initial, t0, t_end, dt, options.settings)?)
}

/// Result of running one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub name: String,
    pub title: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shock_time: Option<f64>,
    pub trajectory: Trajectory,
}

impl ScenarioRun {
    pub fn final_shares(&self) -> Option<&[f64]> {
        self.trajectory.final_state()
    }

    /// Share series of the column named `label`.
    pub fn series(&self, label: &str) -> Option<Vec<f64>> {
        let idx = self.labels.iter().position(|l| l == label)?;
        Some(self.trajectory.column(idx))
    }
}

/// Growth rates that take over from `time` onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthShock {
    pub time: f64,
    pub growth: Vec<f64>,
}

/// User-defined scenario, typically read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    #[serde(default = "default_initial_shares")]
    pub initial_shares: Vec<f64>,
    #[serde(default = "default_payoffs")]
    pub payoffs: Vec<f64>,
    pub growth: Vec<f64>,
    #[serde(default)]
    pub shock: Option<GrowthShock>,
}

fn default_labels() -> Vec<String> {
    TECHNOLOGY_LABELS.iter().map(|s| s.to_string()).collect()
}

fn default_initial_shares() -> Vec<f64> {
    SPAIN_INITIAL_SHARES.to_vec()
}

fn default_payoffs() -> Vec<f64> {
    DEFAULT_PAYOFFS.to_vec()
}

impl ScenarioConfig {
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(text).map_err(|e| ScenarioError::InvalidConfig(e.to_string()))
    }

    pub fn params(&self) -> Result<ReplicatorParams, ScenarioError> {
        let n = self.payoffs.len();
        if self.labels.len() != n {
            return Err(ScenarioError::InvalidConfig(format!(
                "expected {n} labels, got {}",
                self.labels.len()
            )));
        }
        if self.initial_shares.len() != n {
            return Err(ScenarioError::InvalidConfig(format!(
                "expected {n} initial shares, got {}",
                self.initial_shares.len()
            )));
        }
        let params = ReplicatorParams::new(self.payoffs.clone(), self.growth.clone())?;
        match &self.shock {
            None => Ok(params),
            Some(shock) => {
                if shock.growth.len() != n {
                    return Err(ScenarioError::InvalidConfig(format!(
                        "expected {n} shock growth rates, got {}",
                        shock.growth.len()
                    )));
                }
                Ok(ReplicatorParams {
                    growth: GrowthRate::step_change(
                        self.growth.clone(),
                        shock.growth.clone(),
                        shock.time,
                    ),
                    ..params
                }
                .with_shock_time(shock.time))
            }
        }
    }

    /// Runs the scenario. `options.phaseout_time` is ignored; the shock time
    /// comes from the config.
    pub fn run(&self, options: &RunOptions) -> Result<ScenarioRun, ScenarioError> {
        let params = self.params()?;
        debug!(scenario = %self.name, "running configured scenario");
        let trajectory = run_params(&params, &self.initial_shares, options)?;
        Ok(ScenarioRun {
            name: self.name.clone(),
            title: self.title.clone().unwrap_or_else(|| self.name.clone()),
            labels: self.labels.clone(),
            shock_time: params.shock_time,
            trajectory,
        })
    }
}
