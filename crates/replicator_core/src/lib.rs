pub mod error;
pub mod export;
pub mod integrator;
pub mod model;
pub mod scenarios;
pub mod solvers;
/// The `replicator_core` crate simulates how market shares of competing
/// energy-generation technologies evolve under replicator dynamics.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem` (vector fields), `Steppable` (solvers).
/// - **Model**: replicator right-hand side with constant or time-varying growth rates.
/// - **Solvers**: fixed-step RK4.
/// - **Integrator**: validated trajectory integration that keeps the state on the simplex.
/// - **Scenarios**: built-in Spanish energy-mix scenarios and JSON-configured ones.
/// - **Export**: CSV formatting of trajectories.
pub mod traits;
pub mod trajectory;

pub use error::{ExportError, IntegrationError, ScenarioError};
pub use integrator::{integrate, IntegrationSettings};
pub use model::{replicator_rhs, GrowthRate, ReplicatorParams};
pub use scenarios::{Horizon, RunOptions, Scenario, ScenarioConfig, ScenarioRun};
pub use solvers::{rk4_step, RK4};
pub use trajectory::Trajectory;
