//! Persistence of evaluation results

use crate::analytics::metrics::EconomicSummary;
use crate::comparison::{
    ComparisonResult, EvaluationResults, PairwiseOutcome, PairwiseReport, SweepReport,
};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Handles writing evaluation results to files
pub struct ResultsLogger {
    output_dir: String,
}

impl ResultsLogger {
    /// Create a new logger with the specified output directory
    pub fn new(output_dir: &str) -> Self {
        Self {
            output_dir: output_dir.to_string(),
        }
    }

    /// Ensure output directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(format!("{}/logs", self.output_dir))
            .context("Failed to create logs directory")?;
        fs::create_dir_all(format!("{}/reports", self.output_dir))
            .context("Failed to create reports directory")?;
        Ok(())
    }

    /// Save evaluation results to a timestamped JSON file
    pub fn save_results(&self, results: &EvaluationResults) -> Result<String> {
        self.ensure_dirs()?;

        let timestamp = results.generated_at.format("%Y%m%d_%H%M%S");
        let filename = format!("{}/logs/evaluation_{}.json", self.output_dir, timestamp);

        let json = serde_json::to_string_pretty(results)
            .context("Failed to serialize results")?;

        let mut file = File::create(&filename)
            .context("Failed to create results file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write results file")?;

        info!("Results saved to: {}", filename);
        Ok(filename)
    }

    /// Load results from a JSON file
    pub fn load_results(path: &Path) -> Result<EvaluationResults> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read results file {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse results file {}", path.display()))
    }

    /// Save a summary text file
    pub fn save_summary(&self, results: &EvaluationResults) -> Result<String> {
        self.ensure_dirs()?;

        let timestamp = results.generated_at.format("%Y%m%d_%H%M%S");
        let filename = format!("{}/logs/summary_{}.txt", self.output_dir, timestamp);

        let mut file = File::create(&filename)
            .context("Failed to create summary file")?;
        file.write_all(format_summary(results).as_bytes())
            .context("Failed to write summary file")?;

        info!("Summary saved to: {}", filename);
        Ok(filename)
    }
}

const RULE: &str = "══════════════════════════════════════════════════════════════════";

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("╠{}╣\n", RULE));
    out.push_str(&format!("║  {:<64}║\n", title));
    out.push_str(&format!("║  {:<64}║\n", "─".repeat(title.chars().count())));
}

fn line(out: &mut String, text: String) {
    out.push_str(&format!("║  {:<64}║\n", text));
}

fn manifest(out: &mut String, result: &ComparisonResult) {
    for failure in &result.failures {
        line(out, format!("✗ {} [{}]", failure.identity, failure.kind));
    }
}

fn pairwise_section(out: &mut String, report: &PairwiseReport) {
    section(
        out,
        &format!("PAIRWISE: {} vs {}", report.candidate, report.baseline),
    );

    match &report.outcome {
        PairwiseOutcome::NoData => line(out, "No data: neither scenario could be loaded".to_string()),
        PairwiseOutcome::MissingCounterpart {
            available,
            metrics,
            missing,
        } => {
            line(out, format!("Only {} available ({} missing)", available, missing));
            economic_rows(out, &metrics.economic(), None, None);
            line(
                out,
                format!("{:<18}{:>14.0}", "Total Violations", metrics.total_violations()),
            );
        }
        PairwiseOutcome::Compared(delta) => {
            if let (Some(c), Some(b)) = (report.candidate_metrics(), report.baseline_metrics()) {
                line(
                    out,
                    format!(
                        "{:<18}{:>14}{:>14}{:>14}",
                        "", report.candidate.controller, report.baseline.controller, "Δ %"
                    ),
                );
                economic_rows(out, &c.economic(), Some(&b.economic()), Some(&delta.improvement_pct));
                line(
                    out,
                    format!(
                        "{:<18}{:>14.0}{:>14.0}",
                        "Total Violations", delta.candidate_violations, delta.baseline_violations
                    ),
                );
            }
        }
    }
    manifest(out, &report.result);
}

fn economic_rows(
    out: &mut String,
    values: &EconomicSummary,
    baseline: Option<&EconomicSummary>,
    improvement: Option<&EconomicSummary>,
) {
    let base = baseline.map(|b| b.labeled());
    let pct = improvement.map(|p| p.labeled());

    for (i, (label, value)) in values.labeled().iter().enumerate() {
        let mut row = format!("{:<18}{:>14.3}", label, value);
        if let Some(base) = &base {
            row.push_str(&format!("{:>14.3}", base[i].1));
        }
        if let Some(pct) = &pct {
            row.push_str(&format!("{:>13.2}%", pct[i].1));
        }
        line(out, row);
    }
}

fn sweep_section(out: &mut String, report: &SweepReport) {
    section(out, &format!("UNCERTAINTY SWEEP: {}", report.controller));

    if report.is_no_data() {
        line(out, "No data: no stochastic runs found".to_string());
    } else {
        line(
            out,
            format!("{:<10}{:>16}{:>16}{:>14}", "Scale", "Reward", "Revenue", "Violations"),
        );
        for point in report.points() {
            line(
                out,
                format!(
                    "{:<10}{:>16.3}{:>16.3}{:>14.0}",
                    point.scale.label(),
                    point.metrics.total_reward,
                    point.metrics.total_revenue,
                    point.metrics.total_violations()
                ),
            );
        }
    }
    manifest(out, &report.result);
}

/// Format results as a text summary
pub fn format_summary(results: &EvaluationResults) -> String {
    let mut out = String::new();
    out.push_str(&format!("╔{}╗\n", RULE));
    out.push_str(&format!("║  {:<64}║\n", "GREENHOUSE CONTROLLER EVALUATION"));

    if let Some(pairwise) = &results.pairwise {
        pairwise_section(&mut out, pairwise);
    }
    if let Some(sweep) = &results.sweep {
        sweep_section(&mut out, sweep);
    }

    out.push_str(&format!("╚{}╝\n", RULE));
    out.push_str(&format!(
        "\nGenerated: {}\n",
        results.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

/// Print summary to terminal
pub fn print_summary(results: &EvaluationResults) {
    println!("{}", format_summary(results));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::metrics::ScenarioMetrics;
    use crate::comparison::{
        Availability, ScenarioIdentity, ScenarioReport, SweepReport, UncertaintyScale,
    };
    use std::path::PathBuf;

    fn report(identity: ScenarioIdentity, reward: f64) -> ScenarioReport {
        ScenarioReport {
            identity,
            locator: PathBuf::from("run.csv"),
            digest: Some("ab".repeat(32)),
            metrics: ScenarioMetrics {
                total_reward: reward,
                total_revenue: reward * 2.0,
                temp_violations: 1.0,
                timesteps: 3,
                ..Default::default()
            },
            trace: None,
        }
    }

    fn sample_results() -> EvaluationResults {
        let policy = ScenarioIdentity::controller("policy");
        let baseline = ScenarioIdentity::controller("baseline");
        let pairwise = PairwiseReport::from_result(
            policy.clone(),
            baseline.clone(),
            ComparisonResult {
                availability: Availability::Full,
                scenarios: vec![report(baseline, 15.0), report(policy, 25.0)],
                failures: vec![],
            },
        );

        let scale = UncertaintyScale::new(0.1).unwrap();
        let sweep = SweepReport::from_result(
            "policy".to_string(),
            vec![scale],
            ComparisonResult {
                availability: Availability::Full,
                scenarios: vec![report(ScenarioIdentity::scaled("policy", scale), 12.0)],
                failures: vec![],
            },
        );

        EvaluationResults::new(Some(pairwise), Some(sweep))
    }

    #[test]
    fn test_summary_mentions_both_sections() {
        let summary = format_summary(&sample_results());
        assert!(summary.contains("PAIRWISE: policy vs baseline"));
        assert!(summary.contains("UNCERTAINTY SWEEP: policy"));
        assert!(summary.contains("66.67%"));
        assert!(summary.contains("0.1"));
    }

    #[test]
    fn test_summary_no_data_sections() {
        let empty = ComparisonResult {
            availability: Availability::Unavailable,
            scenarios: vec![],
            failures: vec![],
        };
        let results = EvaluationResults::new(
            Some(PairwiseReport::from_result(
                ScenarioIdentity::controller("a"),
                ScenarioIdentity::controller("b"),
                empty.clone(),
            )),
            Some(SweepReport::from_result("a".to_string(), vec![], empty)),
        );

        let summary = format_summary(&results);
        assert!(summary.contains("No data: neither scenario"));
        assert!(summary.contains("No data: no stochastic runs"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("gh_eval_logger_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let logger = ResultsLogger::new(dir.to_str().unwrap());
        let results = sample_results();

        let path = logger.save_results(&results).unwrap();
        let loaded = ResultsLogger::load_results(Path::new(&path)).unwrap();

        let pairwise = loaded.pairwise.unwrap();
        assert_eq!(pairwise.candidate, ScenarioIdentity::controller("policy"));
        assert_eq!(pairwise.candidate_metrics().unwrap().total_reward, 25.0);
        let delta = pairwise.delta().unwrap();
        assert!((delta.improvement_pct.reward - 200.0 / 3.0).abs() < 1e-9);

        let sweep = loaded.sweep.unwrap();
        assert_eq!(sweep.points().len(), 1);
        assert_eq!(sweep.points()[0].scale, UncertaintyScale::new(0.1).unwrap());
        assert_eq!(sweep.points()[0].metrics.timesteps, 3);
        assert!(logger.save_summary(&results).is_ok());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_round_trip_with_nan_state_reading() {
        use crate::comparison::analyzer::tests::{scratch_dir, write_log, HEADER};
        use crate::comparison::{ComparativeAnalyzer, ScenarioSpec};

        let dir = scratch_dir("logger_nan_state");
        fs::write(
            dir.join("policy.csv"),
            format!(
                "{}\n20.0,80.0,500.0,10,20,1,0.5,0.25,0,0,0\nNaN,81.0,510.0,20,40,1,0.5,0.25,1,0,0\n",
                HEADER
            ),
        )
        .unwrap();
        write_log(&dir.join("baseline.csv"), &[5.0, 5.0], &[]);

        let pairwise = ComparativeAnalyzer::with_traces(1)
            .compare_pair(
                ScenarioSpec::new(ScenarioIdentity::controller("policy"), dir.join("policy.csv")),
                ScenarioSpec::new(ScenarioIdentity::controller("baseline"), dir.join("baseline.csv")),
            )
            .unwrap();
        assert!(pairwise.delta().is_some());

        let logger = ResultsLogger::new(dir.join("out").to_str().unwrap());
        let path = logger
            .save_results(&EvaluationResults::new(Some(pairwise), None))
            .unwrap();
        let loaded = ResultsLogger::load_results(Path::new(&path)).unwrap();

        let policy = loaded
            .pairwise
            .unwrap()
            .result
            .get(&ScenarioIdentity::controller("policy"))
            .and_then(|s| s.trace.clone())
            .unwrap();
        assert_eq!(policy.temp_air, vec![Some(20.0), None]);
        assert_eq!(policy.co2_air, vec![Some(500.0), Some(510.0)]);
        assert_eq!(policy.cumulative_reward, vec![Some(10.0), Some(30.0)]);
        fs::remove_dir_all(&dir).ok();
    }
}
