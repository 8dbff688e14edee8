//! Replicator dynamics for technology market shares.
//!
//! Each technology i has fitness f_i = R_i * g_i(t). Shares evolve as
//! dx_i/dt = x_i * (f_i - Phi), where Phi = x . f is the share-weighted mean
//! fitness. Total share is conserved and a zero share stays zero.

use crate::error::IntegrationError;
use crate::traits::DynamicalSystem;
use std::fmt;
use std::sync::Arc;

/// Growth-rate function of time, returning one rate per technology.
pub type GrowthFn = Arc<dyn Fn(f64) -> Vec<f64> + Send + Sync>;

/// Per-technology growth rates, either fixed or a function of time.
#[derive(Clone)]
pub enum GrowthRate {
    Constant(Vec<f64>),
    TimeVarying(GrowthFn),
}

impl GrowthRate {
    pub fn time_varying(f: impl Fn(f64) -> Vec<f64> + Send + Sync + 'static) -> Self {
        GrowthRate::TimeVarying(Arc::new(f))
    }

    /// Piecewise-constant growth: `before` while t < switch_time, `after` from then on.
    pub fn step_change(before: Vec<f64>, after: Vec<f64>, switch_time: f64) -> Self {
        Self::time_varying(move |t| {
            if t < switch_time {
                before.clone()
            } else {
                after.clone()
            }
        })
    }

    /// Resolves the growth vector in effect at time `t`.
    pub fn at(&self, t: f64) -> Vec<f64> {
        match self {
            GrowthRate::Constant(g) => g.clone(),
            GrowthRate::TimeVarying(f) => f(t),
        }
    }

    pub fn is_time_varying(&self) -> bool {
        matches!(self, GrowthRate::TimeVarying(_))
    }
}

impl fmt::Debug for GrowthRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthRate::Constant(g) => f.debug_tuple("Constant").field(g).finish(),
            GrowthRate::TimeVarying(_) => f.write_str("TimeVarying(<fn>)"),
        }
    }
}

impl From<Vec<f64>> for GrowthRate {
    fn from(value: Vec<f64>) -> Self {
        GrowthRate::Constant(value)
    }
}

/// Parameter bundle of a replicator scenario.
#[derive(Debug, Clone)]
pub struct ReplicatorParams {
    /// Payoff coefficients R, one per technology.
    pub payoffs: Vec<f64>,
    pub growth: GrowthRate,
    /// Time of a policy shock, if the scenario has one.
    pub shock_time: Option<f64>,
}

impl ReplicatorParams {
    pub fn new(payoffs: Vec<f64>, growth: impl Into<GrowthRate>) -> Result<Self, IntegrationError> {
        let growth = growth.into();
        if payoffs.is_empty() {
            return Err(IntegrationError::invalid("payoff vector must not be empty"));
        }
        if let GrowthRate::Constant(g) = &growth {
            if g.len() != payoffs.len() {
                return Err(IntegrationError::invalid(format!(
                    "payoff and growth vectors must have the same length ({} vs {})",
                    payoffs.len(),
                    g.len()
                )));
            }
        }
        Ok(Self {
            payoffs,
            growth,
            shock_time: None,
        })
    }

    pub fn with_shock_time(mut self, time: f64) -> Self {
        self.shock_time = Some(time);
        self
    }

    /// Fitness vector R * g(t).
    pub fn fitness(&self, t: f64) -> Vec<f64> {
        let g = self.growth.at(t);
        self.payoffs.iter().zip(&g).map(|(r, g)| r * g).collect()
    }

    /// Share-weighted mean fitness Phi = x . f.
    pub fn mean_fitness(&self, t: f64, x: &[f64]) -> f64 {
        dot(x, &self.fitness(t))
    }
}

impl DynamicalSystem<f64> for ReplicatorParams {
    fn dimension(&self) -> usize {
        self.payoffs.len()
    }

    fn apply(&self, t: f64, x: &[f64], out: &mut [f64]) {
        let fitness = self.fitness(t);
        let phi = dot(x, &fitness);
        for ((o, xi), fi) in out.iter_mut().zip(x).zip(&fitness) {
            *o = xi * (fi - phi);
        }
    }
}

/// dx/dt of the replicator equation at (t, x).
pub fn replicator_rhs(t: f64, x: &[f64], params: &ReplicatorParams) -> Vec<f64> {
    let mut out = vec![0.0; x.len()];
    params.apply(t, x, &mut out);
    out
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(a, b)| a * b).sum()
}
