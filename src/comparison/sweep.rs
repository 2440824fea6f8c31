//! Sensitivity sweep across uncertainty scales

use crate::analytics::metrics::ScenarioMetrics;
use crate::comparison::analyzer::ComparisonResult;
use crate::comparison::scenario::UncertaintyScale;
use serde::{Deserialize, Serialize};

/// Metrics at one uncertainty scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub scale: UncertaintyScale,
    pub metrics: ScenarioMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Points ascending by scale; unavailable scales are absent
    Series { points: Vec<SweepPoint> },
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub controller: String,
    /// Scales as requested, in input order
    pub requested: Vec<UncertaintyScale>,
    pub outcome: SweepOutcome,
    pub result: ComparisonResult,
}

impl SweepReport {
    pub fn from_result(
        controller: String,
        requested: Vec<UncertaintyScale>,
        result: ComparisonResult,
    ) -> Self {
        let mut points: Vec<SweepPoint> = result
            .scenarios
            .iter()
            .filter_map(|s| {
                s.identity.scale.map(|scale| SweepPoint {
                    scale,
                    metrics: s.metrics,
                })
            })
            .collect();
        points.sort_by_key(|p| p.scale);

        let outcome = if points.is_empty() {
            SweepOutcome::NoData
        } else {
            SweepOutcome::Series { points }
        };

        Self {
            controller,
            requested,
            outcome,
            result,
        }
    }

    pub fn points(&self) -> &[SweepPoint] {
        match &self.outcome {
            SweepOutcome::Series { points } => points,
            SweepOutcome::NoData => &[],
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.outcome, SweepOutcome::NoData)
    }

    /// Requested scales that produced no point
    pub fn skipped(&self) -> Vec<UncertaintyScale> {
        self.requested
            .iter()
            .copied()
            .filter(|s| !self.points().iter().any(|p| p.scale == *s))
            .collect()
    }
}
