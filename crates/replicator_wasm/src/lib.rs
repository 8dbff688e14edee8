//! WASM bindings for the energy-mix replicator core.

mod scenarios;
mod system;

pub use scenarios::{run_scenario, scenario_names, technology_labels};
pub use system::WasmReplicator;
