//! Steppable replicator system exposed to JavaScript.

use replicator_core::integrator::{integrate, renormalize_shares};
use replicator_core::solvers::RK4;
use replicator_core::traits::{DynamicalSystem, Steppable};
use replicator_core::{IntegrationSettings, ReplicatorParams};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmReplicator {
    pub(crate) params: ReplicatorParams,
    state: Vec<f64>,
    t: f64,
    pub(crate) solver: SolverType,
}

pub(crate) enum SolverType {
    RK4(RK4<f64>),
}

pub(crate) fn build_params(
    payoffs: Vec<f64>,
    growth: Vec<f64>,
) -> Result<ReplicatorParams, JsValue> {
    ReplicatorParams::new(payoffs, growth).map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
impl WasmReplicator {
    #[wasm_bindgen(constructor)]
    pub fn new(
        payoffs: Vec<f64>,
        growth: Vec<f64>,
        solver_name: &str,
    ) -> Result<WasmReplicator, JsValue> {
        console_error_panic_hook::set_once();

        let params = build_params(payoffs, growth)?;
        let dim = params.dimension();

        let solver = match solver_name {
            "rk4" => SolverType::RK4(RK4::new(dim)),
            _ => return Err(JsValue::from_str("Unknown solver")),
        };

        // Start from the uniform mix until the caller sets a state.
        Ok(WasmReplicator {
            params,
            state: vec![1.0 / dim as f64; dim],
            t: 0.0,
            solver,
        })
    }

    pub fn set_state(&mut self, state: &[f64]) -> Result<(), JsValue> {
        let dim = self.params.dimension();
        if state.len() != dim {
            return Err(JsValue::from_str(&format!(
                "State dimension mismatch. Expected {}, got {}",
                dim,
                state.len()
            )));
        }
        self.state = state.to_vec();
        Ok(())
    }

    pub fn get_state(&self) -> Vec<f64> {
        self.state.clone()
    }

    pub fn set_t(&mut self, t: f64) {
        self.t = t;
    }

    pub fn get_t(&self) -> f64 {
        self.t
    }

    pub fn set_shock_time(&mut self, time: f64) {
        self.params.shock_time = Some(time);
    }

    /// Advances one step and projects the state back onto the share simplex.
    pub fn step(&mut self, dt: f64) -> Result<(), JsValue> {
        match &mut self.solver {
            SolverType::RK4(s) => s.step(&self.params, &mut self.t, &mut self.state, dt),
        }
        renormalize_shares(&mut self.state, self.t).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// dx/dt at the current time and state.
    pub fn derivative(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.state.len()];
        self.params.apply(self.t, &self.state, &mut out);
        out
    }

    pub fn fitness(&self) -> Vec<f64> {
        self.params.fitness(self.t)
    }

    pub fn mean_fitness(&self) -> f64 {
        self.params.mean_fitness(self.t, &self.state)
    }

    /// Integrates from the current time and state up to `t_end` and returns the
    /// serialized trajectory. The system's own state is left unchanged.
    pub fn integrate(&self, t_end: f64, dt: f64, validate: bool) -> Result<JsValue, JsValue> {
        let settings = IntegrationSettings {
            validate,
            ..IntegrationSettings::default()
        };
        let trajectory = integrate(&self.params, &self.state, self.t, t_end, dt, settings)
            .map_err(|e| JsValue::from_str(&format!("Integration failed: {}", e)))?;
        serde_wasm_bindgen::to_value(&trajectory)
            .map_err(|err| JsValue::from_str(&format!("Failed to serialize trajectory: {err}")))
    }
}
