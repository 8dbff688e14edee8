//! Fixed-step trajectory integration on the share simplex.

use crate::error::IntegrationError;
use crate::solvers::RK4;
use crate::trajectory::Trajectory;
use crate::traits::{DynamicalSystem, Steppable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fraction of a step below which the grid does not add another sample.
const GRID_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSettings {
    /// Check inputs before integrating. Disable only when the caller already
    /// guarantees valid inputs.
    pub validate: bool,
    /// Allowed deviation of the initial state's sum from 1.0.
    pub sum_tolerance: f64,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            validate: true,
            sum_tolerance: 1e-6,
        }
    }
}

impl IntegrationSettings {
    pub fn unchecked() -> Self {
        Self {
            validate: false,
            ..Self::default()
        }
    }
}

/// Checks the preconditions of [`integrate`].
pub fn validate_inputs(
    system: &impl DynamicalSystem<f64>,
    x0: &[f64],
    t0: f64,
    t_end: f64,
    dt: f64,
    sum_tolerance: f64,
) -> Result<(), IntegrationError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(IntegrationError::invalid("step size must be positive"));
    }
    if !t0.is_finite() || !t_end.is_finite() {
        return Err(IntegrationError::invalid(
            "start and end times must be finite",
        ));
    }
    if t_end <= t0 {
        return Err(IntegrationError::invalid(
            "end time must be greater than start time",
        ));
    }
    if x0.is_empty() || x0.len() != system.dimension() {
        return Err(IntegrationError::invalid(format!(
            "initial state dimension mismatch. Expected {}, got {}",
            system.dimension(),
            x0.len()
        )));
    }
    if x0.iter().any(|&v| v < 0.0) {
        return Err(IntegrationError::invalid(
            "initial state contains negative values",
        ));
    }
    let sum: f64 = x0.iter().sum();
    if sum.is_nan() || (sum - 1.0).abs() > sum_tolerance {
        return Err(IntegrationError::invalid(format!(
            "initial state must sum to 1.0 (got {sum})"
        )));
    }
    Ok(())
}

/// Number of samples on the grid t0, t0 + dt, ... up to the first point at or
/// past t_end.
///
/// A span that is empty or undefined yields the single sample at t0. A span
/// whose step count does not fit in `usize` is rejected.
pub fn grid_len(t0: f64, t_end: f64, dt: f64) -> Result<usize, IntegrationError> {
    let span = (t_end - t0) / dt;
    if span.is_nan() || span <= 0.0 {
        return Ok(1);
    }
    let steps = (span - GRID_SLACK).ceil();
    if steps >= usize::MAX as f64 {
        return Err(too_many_samples(span));
    }
    (steps as usize)
        .checked_add(1)
        .ok_or_else(|| too_many_samples(span))
}

fn too_many_samples(span: f64) -> IntegrationError {
    IntegrationError::invalid(format!(
        "time grid of {span} steps is too large to sample"
    ))
}

/// Integrates `system` from `x0` over `[t0, t_end]` with RK4 steps of `dt`.
///
/// After every step negative entries are floored to zero and the state is
/// rescaled to sum to one. The first sample is `x0` as given.
pub fn integrate(
    system: &impl DynamicalSystem<f64>,
    x0: &[f64],
    t0: f64,
    t_end: f64,
    dt: f64,
    settings: IntegrationSettings,
) -> Result<Trajectory, IntegrationError> {
    if settings.validate {
        validate_inputs(system, x0, t0, t_end, dt, settings.sum_tolerance)?;
    }

    let dim = x0.len();
    if dim == 0 {
        return Err(IntegrationError::invalid("initial state must not be empty"));
    }
    let samples = grid_len(t0, t_end, dt)?;
    let buffer_bytes = samples
        .checked_mul(dim)
        .and_then(|values| values.checked_mul(std::mem::size_of::<f64>()));
    if !matches!(buffer_bytes, Some(bytes) if bytes <= isize::MAX as usize) {
        return Err(too_many_samples((t_end - t0) / dt));
    }
    debug!(samples, dim, t0, t_end, dt, "integrating trajectory");

    let mut trajectory = Trajectory::with_capacity(samples, dim);
    let mut stepper = RK4::new(dim);
    let mut state = x0.to_vec();

    for k in 0..samples {
        let t = t0 + k as f64 * dt;
        trajectory.push(t, &state);
        if k + 1 == samples {
            break;
        }
        let mut t_step = t;
        stepper.step(system, &mut t_step, &mut state, dt);
        renormalize_shares(&mut state, t_step)?;
    }

    Ok(trajectory)
}

/// Floors negative shares to zero and rescales the vector to sum to one.
///
/// NaN entries are left in place and propagate through the sum.
pub fn renormalize_shares(state: &mut [f64], time: f64) -> Result<(), IntegrationError> {
    for value in state.iter_mut() {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
    let sum: f64 = state.iter().sum();
    if sum == 0.0 {
        return Err(IntegrationError::CollapsedState { time });
    }
    for value in state.iter_mut() {
        *value /= sum;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{grid_len, integrate, renormalize_shares, IntegrationSettings};
    use crate::error::IntegrationError;
    use crate::model::ReplicatorParams;
    use crate::traits::DynamicalSystem;

    struct Frozen {
        dim: usize,
    }

    impl DynamicalSystem<f64> for Frozen {
        fn dimension(&self) -> usize {
            self.dim
        }

        fn apply(&self, _t: f64, _x: &[f64], out: &mut [f64]) {
            out.fill(0.0);
        }
    }

    struct Decay;

    impl DynamicalSystem<f64> for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = -x[0];
        }
    }

    /// Drives the first component strongly negative within one step.
    struct Drain;

    impl DynamicalSystem<f64> for Drain {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, _t: f64, _x: &[f64], out: &mut [f64]) {
            out[0] = -10.0;
            out[1] = 0.0;
        }
    }

    fn mix_params() -> ReplicatorParams {
        ReplicatorParams::new(
            vec![1.0, 1.0, 0.9, 0.9, 0.6],
            vec![0.02, 0.015, 0.03, 0.035, 0.01],
        )
        .expect("params")
    }

    fn assert_invalid<T: std::fmt::Debug>(result: Result<T, IntegrationError>, needle: &str) {
        let err = result.expect_err("expected error");
        assert!(err.is_invalid_parameter(), "unexpected error kind: {err:?}");
        let message = err.to_string();
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn integrate_rejects_invalid_inputs() {
        let system = Frozen { dim: 5 };
        let x0 = [0.2, 0.3, 0.2, 0.2, 0.1];
        let settings = IntegrationSettings::default();
        assert_invalid(integrate(&system, &x0, 0.0, 100.0, -0.1, settings), "positive");
        assert_invalid(integrate(&system, &x0, 0.0, 100.0, 0.0, settings), "positive");
        assert_invalid(integrate(&system, &x0, 100.0, 0.0, 0.1, settings), "greater than");
        assert_invalid(integrate(&system, &x0, 5.0, 5.0, 0.1, settings), "greater than");
        assert_invalid(
            integrate(&system, &[0.2, -0.1, 0.3, 0.3, 0.3], 0.0, 100.0, 0.1, settings),
            "negative",
        );
        assert_invalid(
            integrate(&system, &[0.3; 5], 0.0, 100.0, 0.1, settings),
            "sum to 1.0",
        );
        assert_invalid(
            integrate(&system, &[0.5, 0.5], 0.0, 100.0, 0.1, settings),
            "dimension mismatch",
        );
    }

    #[test]
    fn nan_initial_state_fails_the_sum_check() {
        let system = Frozen { dim: 2 };
        let settings = IntegrationSettings::default();
        assert_invalid(
            integrate(&system, &[f64::NAN, 0.5], 0.0, 1.0, 0.1, settings),
            "sum to 1.0",
        );
    }

    #[test]
    fn validation_can_be_disabled() {
        let system = Frozen { dim: 2 };
        let x0 = [0.3, 0.3];
        assert_invalid(
            integrate(&system, &x0, 0.0, 10.0, 0.1, IntegrationSettings::default()),
            "sum to 1.0",
        );
        let trajectory =
            integrate(&system, &x0, 0.0, 10.0, 0.1, IntegrationSettings::unchecked())
                .expect("unchecked integration should run");
        assert!(!trajectory.is_empty());
        assert_eq!(trajectory.state(0), &x0);
        let last = trajectory.final_state().expect("final state");
        assert!((last[0] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn trajectory_shapes_are_aligned() {
        let system = Frozen { dim: 3 };
        let trajectory = integrate(
            &system,
            &[0.5, 0.3, 0.2],
            0.0,
            10.0,
            0.1,
            IntegrationSettings::default(),
        )
        .expect("integration");
        assert_eq!(trajectory.len(), 101);
        assert_eq!(trajectory.dimension, 3);
        assert_eq!(trajectory.states.len(), 101 * 3);
    }

    #[test]
    fn time_grid_starts_at_t0_and_reaches_t_end() {
        let system = Frozen { dim: 2 };
        let trajectory = integrate(
            &system,
            &[0.5, 0.5],
            0.0,
            10.0,
            0.1,
            IntegrationSettings::default(),
        )
        .expect("integration");
        assert_eq!(trajectory.times[0], 0.0);
        assert!(trajectory.final_time().expect("time") >= 10.0 - 0.1);
        assert!(trajectory.times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn grid_len_overshoots_uneven_spans() {
        assert_eq!(grid_len(0.0, 100.0, 0.1), Ok(1001));
        assert_eq!(grid_len(10.0, 20.0, 0.5), Ok(21));
        assert_eq!(grid_len(0.0, 1.0, 0.3), Ok(5));
        assert_eq!(grid_len(0.0, 0.0, 0.1), Ok(1));
        assert_eq!(grid_len(5.0, 0.0, 0.1), Ok(1));
        assert_eq!(grid_len(f64::NAN, 1.0, 0.1), Ok(1));
    }

    #[test]
    fn grid_len_rejects_unbounded_spans() {
        assert_invalid(grid_len(0.0, 1e20, 1.0), "too large");
        assert_invalid(grid_len(0.0, f64::INFINITY, 0.1), "too large");
        assert_invalid(grid_len(0.0, 1.0, 0.0), "too large");
    }

    #[test]
    fn non_finite_times_are_rejected() {
        let system = Frozen { dim: 2 };
        let x0 = [0.5, 0.5];
        let settings = IntegrationSettings::default();
        assert_invalid(
            integrate(&system, &x0, 0.0, f64::INFINITY, 0.1, settings),
            "must be finite",
        );
        assert_invalid(
            integrate(&system, &x0, f64::NAN, 10.0, 0.1, settings),
            "must be finite",
        );
        assert_invalid(
            integrate(&system, &x0, f64::NEG_INFINITY, 10.0, 0.1, settings),
            "must be finite",
        );
    }

    #[test]
    fn empty_state_fails_even_without_validation() {
        let system = Frozen { dim: 0 };
        assert_invalid(
            integrate(&system, &[], 0.0, 1.0, 0.1, IntegrationSettings::unchecked()),
            "must not be empty",
        );
    }

    #[test]
    fn oversized_span_fails_even_without_validation() {
        let system = Frozen { dim: 2 };
        let settings = IntegrationSettings::unchecked();
        assert_invalid(
            integrate(&system, &[0.5, 0.5], 0.0, 1e20, 1.0, settings),
            "too large",
        );
        assert_invalid(
            integrate(&system, &[0.5, 0.5], 0.0, f64::INFINITY, 0.1, settings),
            "too large",
        );
        // Fits in usize, but the state buffer would not.
        assert_invalid(
            integrate(&system, &[0.5, 0.5], 0.0, 1e18, 1.0, settings),
            "too large",
        );
    }

    #[test]
    fn first_sample_is_the_untouched_initial_state() {
        // Not normalized to machine precision; the first row must not be corrected.
        let x0 = [0.1, 0.2, 0.3, 0.4 + 1e-9];
        let system = Frozen { dim: 4 };
        let trajectory =
            integrate(&system, &x0, 0.0, 1.0, 0.1, IntegrationSettings::default()).expect("run");
        assert_eq!(trajectory.state(0), &x0);
        let corrected: f64 = trajectory.state(1).iter().sum();
        assert!((corrected - 1.0).abs() < 1e-15);
    }

    #[test]
    fn replicator_trajectory_stays_on_simplex() {
        let x0 = [0.2, 0.3, 0.2, 0.2, 0.1];
        let trajectory = integrate(
            &mix_params(),
            &x0,
            0.0,
            100.0,
            0.1,
            IntegrationSettings::default(),
        )
        .expect("integration");
        for (_, state) in trajectory.samples() {
            let sum: f64 = state.iter().sum();
            assert!((sum - 1.0).abs() < 1e-10);
            assert!(state.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn single_component_state_is_pinned_at_one() {
        // Renormalization maps any positive scalar back to 1.
        let trajectory = integrate(&Decay, &[1.0], 0.0, 1.0, 0.01, IntegrationSettings::default())
            .expect("integration");
        assert_eq!(trajectory.len(), 101);
        assert!(trajectory.samples().all(|(_, x)| x[0] == 1.0));
    }

    #[test]
    fn negative_overshoot_is_clamped_then_renormalized() {
        let settings = IntegrationSettings::default();
        let trajectory =
            integrate(&Drain, &[0.5, 0.5], 0.0, 1.0, 0.5, settings).expect("integration");
        assert_eq!(trajectory.state(1), &[0.0, 1.0]);
    }

    #[test]
    fn collapsed_state_is_reported() {
        let mut state = [-0.5, -0.5];
        let err = renormalize_shares(&mut state, 3.0).expect_err("collapse");
        assert_eq!(err, IntegrationError::CollapsedState { time: 3.0 });
        assert!(!err.is_invalid_parameter());
    }

    #[test]
    fn renormalize_leaves_nan_to_propagate() {
        let mut state = [f64::NAN, 0.5];
        renormalize_shares(&mut state, 0.0).expect("nan passes through");
        assert!(state.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn caller_state_is_not_mutated() {
        let x0 = vec![0.2, 0.3, 0.2, 0.2, 0.1];
        let snapshot = x0.clone();
        integrate(&mix_params(), &x0, 0.0, 5.0, 0.1, IntegrationSettings::default())
            .expect("integration");
        assert_eq!(x0, snapshot);
    }
}
