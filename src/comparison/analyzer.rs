//! Comparative analyzer
//!
//! Loads and aggregates a set of scenarios, then assembles the per-scenario
//! metrics into a [`ComparisonResult`]. Each invocation moves through
//! `Requested -> Loading -> {FullyAvailable | PartiallyAvailable | Unavailable}
//! -> Aggregated -> Reported`; the availability reached is kept on the result.
//! Scenarios are independent, so the load-and-aggregate step is a parallel map.

use crate::analytics::metrics::{MetricsCalculator, ScenarioMetrics, StateTrace};
use crate::comparison::pairwise::PairwiseReport;
use crate::comparison::scenario::{
    ScenarioIdentity, ScenarioSet, ScenarioSpec, SweepTemplate, UncertaintyScale,
};
use crate::comparison::sweep::SweepReport;
use crate::error::{ConfigError, FailureKind};
use crate::trajectory::TrajectoryLoader;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// How much of the requested scenario set produced metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Every scenario loaded and aggregated
    Full,
    /// Some scenarios failed; the rest were aggregated
    Partial,
    /// Nothing to report
    Unavailable,
}

/// Metrics of one scenario that loaded successfully
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub identity: ScenarioIdentity,
    pub locator: PathBuf,
    /// SHA-256 of the source log
    pub digest: Option<String>,
    pub metrics: ScenarioMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<StateTrace>,
}

/// Manifest entry for a scenario that did not contribute metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFailure {
    pub identity: ScenarioIdentity,
    pub locator: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Best-effort metrics for a scenario set plus the failure manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub availability: Availability,
    /// Successful scenarios, ordered by identity
    pub scenarios: Vec<ScenarioReport>,
    /// Failed scenarios, ordered by identity
    pub failures: Vec<ScenarioFailure>,
}

impl ComparisonResult {
    pub fn get(&self, identity: &ScenarioIdentity) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| &s.identity == identity)
    }

    pub fn metrics(&self, identity: &ScenarioIdentity) -> Option<&ScenarioMetrics> {
        self.get(identity).map(|s| &s.metrics)
    }

    pub fn failure(&self, identity: &ScenarioIdentity) -> Option<&ScenarioFailure> {
        self.failures.iter().find(|f| &f.identity == identity)
    }

    pub fn has_data(&self) -> bool {
        self.availability != Availability::Unavailable
    }
}

/// Everything produced by one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub generated_at: DateTime<Utc>,
    pub pairwise: Option<PairwiseReport>,
    pub sweep: Option<SweepReport>,
}

impl EvaluationResults {
    pub fn new(pairwise: Option<PairwiseReport>, sweep: Option<SweepReport>) -> Self {
        Self {
            generated_at: Utc::now(),
            pairwise,
            sweep,
        }
    }
}

/// Runs load-and-aggregate over scenario sets
#[derive(Debug, Clone, Default)]
pub struct ComparativeAnalyzer {
    /// Keep state traces (every n-th timestep) for trajectory charts
    trace_stride: Option<usize>,
}

impl ComparativeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_traces(stride: usize) -> Self {
        Self {
            trace_stride: Some(stride.max(1)),
        }
    }

    /// Analyse every scenario of the set independently
    pub fn analyze(&self, set: &ScenarioSet) -> ComparisonResult {
        info!("Loading {} scenarios", set.len());

        let outcomes: Vec<Result<ScenarioReport, ScenarioFailure>> = set
            .specs()
            .par_iter()
            .map(|spec| self.evaluate(spec))
            .collect();

        let (mut scenarios, mut failures): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
        for outcome in outcomes {
            match outcome {
                Ok(report) => scenarios.push(report),
                Err(failure) => failures.push(failure),
            }
        }
        scenarios.sort_by(|a, b| a.identity.cmp(&b.identity));
        failures.sort_by(|a, b| a.identity.cmp(&b.identity));

        let availability = if scenarios.is_empty() {
            Availability::Unavailable
        } else if failures.is_empty() {
            Availability::Full
        } else {
            Availability::Partial
        };

        match availability {
            Availability::Unavailable => warn!("No scenario produced metrics, nothing to report"),
            Availability::Partial => info!(
                "Aggregated {} of {} scenarios ({} failed)",
                scenarios.len(),
                set.len(),
                failures.len()
            ),
            Availability::Full => info!("Aggregated all {} scenarios", scenarios.len()),
        }

        ComparisonResult {
            availability,
            scenarios,
            failures,
        }
    }

    /// Compare a candidate controller against a baseline
    pub fn compare_pair(
        &self,
        candidate: ScenarioSpec,
        baseline: ScenarioSpec,
    ) -> Result<PairwiseReport, ConfigError> {
        let candidate_id = candidate.identity.clone();
        let baseline_id = baseline.identity.clone();
        let set = ScenarioSet::new(vec![candidate, baseline])?;

        let result = self.analyze(&set);
        Ok(PairwiseReport::from_result(candidate_id, baseline_id, result))
    }

    /// Analyse one controller across a set of uncertainty scales
    pub fn sweep(
        &self,
        template: &SweepTemplate,
        scales: &[UncertaintyScale],
    ) -> Result<SweepReport, ConfigError> {
        let specs = scales.iter().map(|&s| template.spec_for(s)).collect();
        let set = ScenarioSet::new(specs)?;

        let result = self.analyze(&set);
        Ok(SweepReport::from_result(
            template.controller.clone(),
            scales.to_vec(),
            result,
        ))
    }

    fn evaluate(&self, spec: &ScenarioSpec) -> Result<ScenarioReport, ScenarioFailure> {
        let failure = |kind: FailureKind, message: String| ScenarioFailure {
            identity: spec.identity.clone(),
            locator: spec.locator.clone(),
            kind,
            message,
        };

        let trajectory = TrajectoryLoader::load(&spec.locator).map_err(|e| {
            if e.is_unavailable() {
                warn!("Skipping {}: {}", spec.identity, e);
            } else {
                warn!("Aborting {}: {}", spec.identity, e);
            }
            failure(e.kind(), e.to_string())
        })?;

        let metrics = ScenarioMetrics::from_trajectory(&trajectory);
        metrics.ensure_finite().map_err(|e| {
            warn!("Discarding {}: {}", spec.identity, e);
            failure(FailureKind::NonFinite, e.to_string())
        })?;

        debug!(
            "{}: {} timesteps, reward {:.3}",
            spec.identity, metrics.timesteps, metrics.total_reward
        );

        Ok(ScenarioReport {
            identity: spec.identity.clone(),
            locator: spec.locator.clone(),
            digest: trajectory.digest().map(str::to_string),
            metrics,
            trace: self
                .trace_stride
                .map(|stride| MetricsCalculator::state_trace(&trajectory, stride)),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    pub(crate) const HEADER: &str = "temp_air,rh_air,co2_air,Rewards,Revenue,Heat costs,CO2 costs,Elec costs,temp_violation,co2_violation,rh_violation";

    /// Per-test scratch directory
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gh_eval_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write a log with the given rewards and violation indicators
    pub(crate) fn write_log(path: &Path, rewards: &[f64], violations: &[(u8, u8, u8)]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut s = String::from(HEADER);
        for (i, reward) in rewards.iter().enumerate() {
            let (t, c, r) = violations.get(i).copied().unwrap_or((0, 0, 0));
            s.push_str(&format!(
                "\n20.0,80.0,500.0,{},{},1.0,0.5,0.25,{},{},{}",
                reward,
                reward * 2.0,
                t,
                c,
                r
            ));
        }
        s.push('\n');
        fs::write(path, s).unwrap();
    }

    #[test]
    fn test_full_availability() {
        let dir = scratch_dir("analyze_full");
        write_log(&dir.join("a.csv"), &[1.0, 2.0], &[]);
        write_log(&dir.join("b.csv"), &[3.0], &[]);

        let set = ScenarioSet::new(vec![
            ScenarioSpec::new(ScenarioIdentity::controller("b"), dir.join("b.csv")),
            ScenarioSpec::new(ScenarioIdentity::controller("a"), dir.join("a.csv")),
        ])
        .unwrap();
        let result = ComparativeAnalyzer::new().analyze(&set);

        assert_eq!(result.availability, Availability::Full);
        assert_eq!(result.scenarios.len(), 2);
        assert_eq!(result.scenarios[0].identity.controller, "a");
        assert_eq!(result.metrics(&ScenarioIdentity::controller("a")).unwrap().total_reward, 3.0);
        assert!(result.scenarios[0].digest.is_some());
        assert!(result.scenarios[0].trace.is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_availability_records_manifest() {
        let dir = scratch_dir("analyze_partial");
        write_log(&dir.join("ok.csv"), &[1.0], &[]);
        fs::write(dir.join("bad.csv"), "temp_air,Rewards\n1,2\n").unwrap();

        let set = ScenarioSet::new(vec![
            ScenarioSpec::new(ScenarioIdentity::controller("ok"), dir.join("ok.csv")),
            ScenarioSpec::new(ScenarioIdentity::controller("bad"), dir.join("bad.csv")),
            ScenarioSpec::new(ScenarioIdentity::controller("gone"), dir.join("gone.csv")),
        ])
        .unwrap();
        let result = ComparativeAnalyzer::new().analyze(&set);

        assert_eq!(result.availability, Availability::Partial);
        assert_eq!(result.scenarios.len(), 1);
        assert_eq!(
            result.failure(&ScenarioIdentity::controller("bad")).unwrap().kind,
            FailureKind::Malformed
        );
        assert_eq!(
            result.failure(&ScenarioIdentity::controller("gone")).unwrap().kind,
            FailureKind::Unavailable
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unreadable_locator_is_unavailable() {
        let dir = scratch_dir("analyze_unreadable");
        write_log(&dir.join("ok.csv"), &[1.0], &[]);
        fs::create_dir_all(dir.join("run.csv")).unwrap();

        let set = ScenarioSet::new(vec![
            ScenarioSpec::new(ScenarioIdentity::controller("ok"), dir.join("ok.csv")),
            ScenarioSpec::new(ScenarioIdentity::controller("dir"), dir.join("run.csv")),
        ])
        .unwrap();
        let result = ComparativeAnalyzer::new().analyze(&set);

        assert_eq!(result.availability, Availability::Partial);
        let failure = result.failure(&ScenarioIdentity::controller("dir")).unwrap();
        assert_eq!(failure.kind, FailureKind::Unavailable);
        assert!(failure.message.contains("unreadable"), "{}", failure.message);
        assert!(result.metrics(&ScenarioIdentity::controller("dir")).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_non_finite_total_is_reported() {
        let dir = scratch_dir("analyze_nan");
        write_log(&dir.join("nan.csv"), &[1.0, f64::NAN], &[]);

        let set = ScenarioSet::new(vec![ScenarioSpec::new(
            ScenarioIdentity::controller("nan"),
            dir.join("nan.csv"),
        )])
        .unwrap();
        let result = ComparativeAnalyzer::new().analyze(&set);

        assert_eq!(result.availability, Availability::Unavailable);
        assert!(!result.has_data());
        assert_eq!(result.failures[0].kind, FailureKind::NonFinite);
        assert!(result.failures[0].message.contains("total_reward"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_traces_kept_when_requested() {
        let dir = scratch_dir("analyze_trace");
        write_log(&dir.join("a.csv"), &[1.0, 2.0, 3.0, 4.0], &[]);

        let set = ScenarioSet::new(vec![ScenarioSpec::new(
            ScenarioIdentity::controller("a"),
            dir.join("a.csv"),
        )])
        .unwrap();
        let result = ComparativeAnalyzer::with_traces(2).analyze(&set);

        let trace = result.scenarios[0].trace.as_ref().unwrap();
        assert_eq!(trace.timestep, vec![0, 2]);
        assert_eq!(trace.cumulative_reward, vec![Some(1.0), Some(6.0)]);
        fs::remove_dir_all(&dir).ok();
    }
}
