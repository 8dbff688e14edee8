//! Built-in scenario runs for the browser front end.

use replicator_core::scenarios::TECHNOLOGY_LABELS;
use replicator_core::{Horizon, IntegrationSettings, RunOptions, Scenario, ScenarioRun};
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

pub(crate) fn run_named(
    name: &str,
    t0: f64,
    t_end: f64,
    dt: f64,
    phaseout_time: f64,
) -> Result<ScenarioRun, String> {
    let scenario: Scenario = name.parse().map_err(|e| format!("{e}"))?;
    let options = RunOptions {
        horizon: Horizon { t0, t_end, dt },
        phaseout_time,
        settings: IntegrationSettings::default(),
    };
    scenario
        .run(&options)
        .map_err(|e| format!("Scenario {name} failed: {e}"))
}

/// Runs a built-in scenario and returns the serialized `ScenarioRun`.
#[wasm_bindgen]
pub fn run_scenario(
    name: &str,
    t0: f64,
    t_end: f64,
    dt: f64,
    phaseout_time: f64,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let run = run_named(name, t0, t_end, dt, phaseout_time).map_err(|e| JsValue::from_str(&e))?;
    to_value(&run).map_err(|err| JsValue::from_str(&format!("Failed to serialize run: {err}")))
}

#[wasm_bindgen]
pub fn scenario_names() -> Vec<String> {
    Scenario::all().iter().map(|s| s.name().to_string()).collect()
}

#[wasm_bindgen]
pub fn technology_labels() -> Vec<String> {
    TECHNOLOGY_LABELS.iter().map(|s| s.to_string()).collect()
}
