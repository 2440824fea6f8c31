//! Candidate-versus-baseline comparison

use crate::analytics::metrics::{improvement_pct, EconomicSummary, ScenarioMetrics};
use crate::comparison::analyzer::ComparisonResult;
use crate::comparison::scenario::ScenarioIdentity;
use serde::{Deserialize, Serialize};

/// Cross-scenario values for a pair where both sides produced metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseDelta {
    /// candidate - baseline, per economic metric
    pub difference: EconomicSummary,
    /// (candidate - baseline) / |baseline| * 100, 0 where the baseline is 0
    pub improvement_pct: EconomicSummary,
    pub candidate_violations: f64,
    pub baseline_violations: f64,
}

impl PairwiseDelta {
    pub fn between(candidate: &ScenarioMetrics, baseline: &ScenarioMetrics) -> Self {
        let c = candidate.economic();
        let b = baseline.economic();
        Self {
            difference: c.zip_with(&b, |x, y| x - y),
            improvement_pct: c.zip_with(&b, improvement_pct),
            candidate_violations: candidate.total_violations(),
            baseline_violations: baseline.total_violations(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairwiseOutcome {
    Compared(PairwiseDelta),
    /// Only one side produced metrics
    MissingCounterpart {
        available: ScenarioIdentity,
        metrics: ScenarioMetrics,
        missing: ScenarioIdentity,
    },
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseReport {
    pub candidate: ScenarioIdentity,
    pub baseline: ScenarioIdentity,
    pub outcome: PairwiseOutcome,
    pub result: ComparisonResult,
}

impl PairwiseReport {
    pub fn from_result(
        candidate: ScenarioIdentity,
        baseline: ScenarioIdentity,
        result: ComparisonResult,
    ) -> Self {
        let outcome = match (result.metrics(&candidate), result.metrics(&baseline)) {
            (Some(c), Some(b)) => PairwiseOutcome::Compared(PairwiseDelta::between(c, b)),
            (Some(c), None) => PairwiseOutcome::MissingCounterpart {
                available: candidate.clone(),
                metrics: *c,
                missing: baseline.clone(),
            },
            (None, Some(b)) => PairwiseOutcome::MissingCounterpart {
                available: baseline.clone(),
                metrics: *b,
                missing: candidate.clone(),
            },
            (None, None) => PairwiseOutcome::NoData,
        };

        Self {
            candidate,
            baseline,
            outcome,
            result,
        }
    }

    pub fn delta(&self) -> Option<&PairwiseDelta> {
        match &self.outcome {
            PairwiseOutcome::Compared(delta) => Some(delta),
            _ => None,
        }
    }

    pub fn candidate_metrics(&self) -> Option<&ScenarioMetrics> {
        self.result.metrics(&self.candidate)
    }

    pub fn baseline_metrics(&self) -> Option<&ScenarioMetrics> {
        self.result.metrics(&self.baseline)
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.outcome, PairwiseOutcome::NoData)
    }
}
