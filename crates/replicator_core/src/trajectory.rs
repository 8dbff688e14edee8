use serde::{Deserialize, Serialize};

/// Sampled solution of an integration: one state per grid time.
///
/// States are stored row-major, `dimension` values per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<f64>,
    pub dimension: usize,
}

impl Trajectory {
    pub fn with_capacity(samples: usize, dimension: usize) -> Self {
        debug_assert!(dimension > 0, "trajectory needs at least one component");
        Self {
            times: Vec::with_capacity(samples),
            states: Vec::with_capacity(samples * dimension),
            dimension,
        }
    }

    pub(crate) fn push(&mut self, t: f64, state: &[f64]) {
        debug_assert_eq!(state.len(), self.dimension);
        self.times.push(t);
        self.states.extend_from_slice(state);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// State recorded at sample `index`.
    pub fn state(&self, index: usize) -> &[f64] {
        let start = index * self.dimension;
        &self.states[start..start + self.dimension]
    }

    pub fn initial_state(&self) -> Option<&[f64]> {
        (!self.is_empty()).then(|| self.state(0))
    }

    pub fn final_state(&self) -> Option<&[f64]> {
        (!self.is_empty()).then(|| self.state(self.len() - 1))
    }

    pub fn final_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Iterates over `(time, state)` pairs in time order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.times
            .iter()
            .copied()
            .zip(self.states.chunks_exact(self.dimension.max(1)))
    }

    /// Time series of a single component.
    pub fn column(&self, component: usize) -> Vec<f64> {
        self.samples().map(|(_, x)| x[component]).collect()
    }

    /// Index of the sample whose time is closest to `t`.
    pub fn nearest_index(&self, t: f64) -> Option<usize> {
        self.times
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - t).abs().total_cmp(&(*b - t).abs()))
            .map(|(idx, _)| idx)
    }

    /// Returns true when every recorded value is finite.
    pub fn is_finite(&self) -> bool {
        self.times.iter().chain(&self.states).all(|v| v.is_finite())
    }
}
