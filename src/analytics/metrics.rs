//! Metrics calculation for controller runs

use crate::error::MetricsError;
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};

/// Scalar summary of one trajectory
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub total_reward: f64,
    pub total_revenue: f64,
    pub total_heat_cost: f64,
    pub total_co2_cost: f64,
    pub total_elec_cost: f64,
    /// Timesteps with air temperature outside its band
    pub temp_violations: f64,
    /// Timesteps with CO2 outside its band
    pub co2_violations: f64,
    /// Timesteps with relative humidity outside its band
    pub rh_violations: f64,
    /// Number of timesteps aggregated
    pub timesteps: usize,
}

impl ScenarioMetrics {
    /// Sum every economic signal and violation indicator in record order.
    ///
    /// NaN and infinite inputs propagate into the totals; use
    /// [`ScenarioMetrics::ensure_finite`] to surface them.
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        trajectory
            .records()
            .iter()
            .fold(Self::default(), |mut acc, r| {
                acc.total_reward += r.reward;
                acc.total_revenue += r.revenue;
                acc.total_heat_cost += r.heat_cost;
                acc.total_co2_cost += r.co2_cost;
                acc.total_elec_cost += r.elec_cost;
                acc.temp_violations += r.temp_violation;
                acc.co2_violations += r.co2_violation;
                acc.rh_violations += r.rh_violation;
                acc.timesteps += 1;
                acc
            })
    }

    pub fn total_cost(&self) -> f64 {
        self.total_heat_cost + self.total_co2_cost + self.total_elec_cost
    }

    /// Combined violation count over all three constraint types
    pub fn total_violations(&self) -> f64 {
        self.temp_violations + self.co2_violations + self.rh_violations
    }

    pub fn economic(&self) -> EconomicSummary {
        EconomicSummary {
            reward: self.total_reward,
            revenue: self.total_revenue,
            heat_cost: self.total_heat_cost,
            co2_cost: self.total_co2_cost,
            elec_cost: self.total_elec_cost,
        }
    }

    /// Named view of every total, in a stable order
    pub fn named_totals(&self) -> [(&'static str, f64); 8] {
        [
            ("total_reward", self.total_reward),
            ("total_revenue", self.total_revenue),
            ("total_heat_cost", self.total_heat_cost),
            ("total_co2_cost", self.total_co2_cost),
            ("total_elec_cost", self.total_elec_cost),
            ("temp_violations", self.temp_violations),
            ("co2_violations", self.co2_violations),
            ("rh_violations", self.rh_violations),
        ]
    }

    /// Fails on the first NaN or infinite total
    pub fn ensure_finite(&self) -> Result<(), MetricsError> {
        match self.named_totals().into_iter().find(|(_, v)| !v.is_finite()) {
            Some((metric, value)) => Err(MetricsError::NonFinite { metric, value }),
            None => Ok(()),
        }
    }
}

/// The five economic totals, used for differences and improvements
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicSummary {
    pub reward: f64,
    pub revenue: f64,
    pub heat_cost: f64,
    pub co2_cost: f64,
    pub elec_cost: f64,
}

impl EconomicSummary {
    /// Apply `f` field by field to `self` and `other`
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            reward: f(self.reward, other.reward),
            revenue: f(self.revenue, other.revenue),
            heat_cost: f(self.heat_cost, other.heat_cost),
            co2_cost: f(self.co2_cost, other.co2_cost),
            elec_cost: f(self.elec_cost, other.elec_cost),
        }
    }

    pub fn labeled(&self) -> [(&'static str, f64); 5] {
        [
            ("Total Reward", self.reward),
            ("Total Revenue", self.revenue),
            ("Total Heat Cost", self.heat_cost),
            ("Total CO2 Cost", self.co2_cost),
            ("Total Elec Cost", self.elec_cost),
        ]
    }
}

/// Relative change of `candidate` over `baseline`, in percent.
///
/// A baseline of exactly zero yields 0.
pub fn improvement_pct(candidate: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (candidate - baseline) / baseline.abs() * 100.0
    }
}

/// Calculator for chart series derived from trajectories
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn aggregate(trajectory: &Trajectory) -> ScenarioMetrics {
        ScenarioMetrics::from_trajectory(trajectory)
    }

    /// Running reward total per timestep
    pub fn cumulative_rewards(trajectory: &Trajectory) -> Vec<CumulativeDataPoint> {
        let mut cumulative = 0.0;
        trajectory
            .records()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                cumulative += r.reward;
                CumulativeDataPoint {
                    timestep: i as u32,
                    value: cumulative,
                }
            })
            .collect()
    }

    /// State variables and cumulative reward, every `stride`-th timestep
    pub fn state_trace(trajectory: &Trajectory, stride: usize) -> StateTrace {
        let stride = stride.max(1);
        let cumulative = Self::cumulative_rewards(trajectory);
        let mut trace = StateTrace::default();

        for (i, r) in trajectory.records().iter().enumerate().step_by(stride) {
            trace.timestep.push(i as u32);
            trace.temp_air.push(sample(r.temp_air));
            trace.rh_air.push(sample(r.rh_air));
            trace.co2_air.push(sample(r.co2_air));
            trace.cumulative_reward.push(sample(cumulative[i].value));
        }

        trace
    }
}

/// Chart sample; non-finite readings become gaps
fn sample(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Data point for cumulative charts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeDataPoint {
    pub timestep: u32,
    pub value: f64,
}

/// Column-oriented state series for trajectory charts.
///
/// `None` marks a NaN/Inf reading, persisted as `null` and drawn as a gap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateTrace {
    pub timestep: Vec<u32>,
    pub temp_air: Vec<Option<f64>>,
    pub rh_air: Vec<Option<f64>>,
    pub co2_air: Vec<Option<f64>>,
    pub cumulative_reward: Vec<Option<f64>>,
}
