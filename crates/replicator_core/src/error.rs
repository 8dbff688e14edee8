//! Error types for the replicator core.

use thiserror::Error;

/// Failures reported by the trajectory integrator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// A precondition on the inputs was violated. Raised before any step is taken.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Every share was clamped to zero, so the state cannot be renormalized.
    #[error("share vector collapsed to zero at t = {time}")]
    CollapsedState { time: f64 },
}

impl IntegrationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}

/// Failures while resolving or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("invalid scenario config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Failures while formatting a trajectory for export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("expected {expected} column labels, got {found}")]
    LabelMismatch { expected: usize, found: usize },
}
