//! HTML Report Generation with Chart.js

use crate::analytics::metrics::StateTrace;
use crate::comparison::{
    ComparisonResult, EvaluationResults, PairwiseOutcome, PairwiseReport, ScenarioReport,
    SweepReport,
};
use anyhow::{Context, Result};
use minijinja::{context, Environment};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use tracing::info;

const PALETTE: [&str; 6] = ["#8b5cf6", "#22d3ee", "#10b981", "#f59e0b", "#ef4444", "#ec4899"];

const REPORT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Greenhouse Controller Evaluation</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        :root {
            --bg-primary: #0a0a0a;
            --bg-card: #1c1c1c;
            --text-primary: #ffffff;
            --text-secondary: #888888;
            --accent-green: #10b981;
            --accent-red: #ef4444;
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        header {
            text-align: center;
            padding: 3rem 2rem;
            background: linear-gradient(180deg, rgba(16, 185, 129, 0.15) 0%, transparent 100%);
            border-bottom: 1px solid rgba(255, 255, 255, 0.08);
            margin-bottom: 2rem;
        }
        header h1 { font-size: 2.5rem; font-weight: 800; }
        header .timestamp { font-size: 0.875rem; color: rgba(255,255,255,0.4); }
        h2.section-title { font-size: 1.5rem; margin: 2rem 0 1.25rem; }
        .stats-grid {
            display: grid;
            grid-template-columns: repeat(3, 1fr);
            gap: 1.25rem;
            margin-bottom: 2rem;
        }
        @media (max-width: 900px) { .stats-grid { grid-template-columns: 1fr; } }
        .stat-card {
            background: var(--bg-card);
            border-radius: 1rem;
            padding: 1.5rem;
            border: 1px solid rgba(255, 255, 255, 0.06);
        }
        .stat-card h3 {
            font-size: 0.75rem;
            text-transform: uppercase;
            letter-spacing: 0.1em;
            color: var(--text-secondary);
        }
        .stat-card .value { font-size: 2rem; font-weight: 700; }
        .stat-card .label { font-size: 0.875rem; color: var(--text-secondary); }
        .stat-card.good .value { color: var(--accent-green); }
        .stat-card.bad .value { color: var(--accent-red); }
        .chart-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 1.5rem; }
        @media (max-width: 900px) { .chart-grid { grid-template-columns: 1fr; } }
        .chart-card {
            background: var(--bg-card);
            border-radius: 1.25rem;
            padding: 1.5rem;
            border: 1px solid rgba(255, 255, 255, 0.06);
        }
        .chart-card h3 { font-size: 1.1rem; margin-bottom: 1rem; }
        .chart-container { position: relative; height: 320px; width: 100%; }
        .notice {
            background: rgba(245, 158, 11, 0.1);
            border: 1px solid rgba(245, 158, 11, 0.3);
            border-radius: 1rem;
            padding: 1.25rem 1.5rem;
            margin-bottom: 1.5rem;
        }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid rgba(255,255,255,0.08); }
        th { color: var(--text-secondary); font-weight: 600; }
        footer {
            text-align: center;
            padding: 2rem;
            color: var(--text-secondary);
            border-top: 1px solid rgba(255, 255, 255, 0.06);
            margin-top: 2rem;
        }
    </style>
</head>
<body>
    <header>
        <h1>Greenhouse Controller Evaluation</h1>
        <p class="timestamp">Generated: {{ generated }}</p>
    </header>

    <div class="container">
    {% for section in sections %}
        <h2 class="section-title">{{ section.title }}</h2>
        {% if section.notice %}<div class="notice">{{ section.notice }}</div>{% endif %}
        {% if section.cards %}
        <div class="stats-grid">
            {% for card in section.cards %}
            <div class="stat-card {{ card.class }}">
                <h3>{{ card.title }}</h3>
                <div class="value">{{ card.value }}</div>
                <div class="label">{{ card.label }}</div>
            </div>
            {% endfor %}
        </div>
        {% endif %}
        {% if section.charts %}
        <div class="chart-grid">
            {% for chart in section.charts %}
            <div class="chart-card">
                <h3>{{ chart.title }}</h3>
                <div class="chart-container"><canvas id="{{ chart.id }}"></canvas></div>
            </div>
            {% endfor %}
        </div>
        {% endif %}
    {% endfor %}

    {% if failures %}
        <h2 class="section-title">Scenario Manifest</h2>
        <div class="chart-card">
            <table>
                <tr><th>Scenario</th><th>Status</th><th>Detail</th></tr>
                {% for failure in failures %}
                <tr><td>{{ failure.scenario }}</td><td>{{ failure.kind }}</td><td>{{ failure.message }}</td></tr>
                {% endfor %}
            </table>
        </div>
    {% endif %}
    </div>

    <footer>
        <p>Built with Rust + Chart.js</p>
    </footer>

    <script>
        Chart.defaults.color = '#888888';
        Chart.defaults.borderColor = 'rgba(255, 255, 255, 0.08)';
        {% for section in sections %}{% for chart in section.charts %}
        new Chart(document.getElementById('{{ chart.id }}'), {{ chart.config|safe }});
        {% endfor %}{% endfor %}
    </script>
</body>
</html>
"##;

#[derive(Debug, Serialize)]
struct Card {
    title: String,
    value: String,
    label: String,
    class: &'static str,
}

#[derive(Debug, Serialize)]
struct ChartView {
    id: String,
    title: String,
    config: String,
}

#[derive(Debug, Serialize)]
struct Section {
    title: String,
    notice: Option<String>,
    cards: Vec<Card>,
    charts: Vec<ChartView>,
}

#[derive(Debug, Serialize)]
struct FailureRow {
    scenario: String,
    kind: String,
    message: String,
}

/// Generate an HTML report with interactive charts
pub fn generate_report(results: &EvaluationResults, output_path: &str) -> Result<String> {
    if let Some(parent) = std::path::Path::new(output_path).parent() {
        fs::create_dir_all(parent)?;
    }

    let html = render_html(results)?;

    let mut file = File::create(output_path)
        .context("Failed to create report file")?;
    file.write_all(html.as_bytes())
        .context("Failed to write report file")?;

    info!("Report generated: {}", output_path);
    Ok(output_path.to_string())
}

/// Render the report page
pub fn render_html(results: &EvaluationResults) -> Result<String> {
    let mut sections = Vec::new();
    let mut failures = Vec::new();

    if let Some(pairwise) = &results.pairwise {
        sections.extend(pairwise_sections(pairwise));
        failures.extend(failure_rows(&pairwise.result));
    }
    if let Some(sweep) = &results.sweep {
        sections.push(sweep_section(sweep));
        failures.extend(failure_rows(&sweep.result));
    }

    let mut env = Environment::new();
    env.add_template("report.html", REPORT_TEMPLATE)
        .context("Failed to parse report template")?;
    let template = env.get_template("report.html")?;

    template
        .render(context! {
            generated => results.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            sections => sections,
            failures => failures,
        })
        .context("Failed to render report")
}

fn failure_rows(result: &ComparisonResult) -> Vec<FailureRow> {
    result
        .failures
        .iter()
        .map(|f| FailureRow {
            scenario: f.identity.to_string(),
            kind: f.kind.to_string(),
            message: f.message.clone(),
        })
        .collect()
}

fn dataset(label: &str, data: Value, color: &str) -> Value {
    json!({
        "label": label,
        "data": data,
        "borderColor": color,
        "backgroundColor": color,
        "borderWidth": 2,
        "pointRadius": 0,
    })
}

fn line_chart(labels: Value, datasets: Vec<Value>, x_title: &str, y_title: &str) -> Value {
    json!({
        "type": "line",
        "data": { "labels": labels, "datasets": datasets },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "interaction": { "intersect": false, "mode": "index" },
            "scales": {
                "x": { "title": { "display": true, "text": x_title }, "ticks": { "maxTicksLimit": 12 } },
                "y": { "title": { "display": true, "text": y_title } }
            }
        }
    })
}

fn bar_chart(labels: &[&str], datasets: Vec<Value>, y_title: &str) -> Value {
    json!({
        "type": "bar",
        "data": { "labels": labels, "datasets": datasets },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": {
                "y": { "beginAtZero": true, "title": { "display": true, "text": y_title } }
            }
        }
    })
}

fn chart(id: &str, title: &str, config: Value) -> ChartView {
    ChartView {
        id: id.to_string(),
        title: title.to_string(),
        config: config.to_string(),
    }
}

/// Scenarios of the pair that loaded, candidate first
fn pair_members<'a>(report: &'a PairwiseReport) -> Vec<&'a ScenarioReport> {
    [&report.candidate, &report.baseline]
        .into_iter()
        .filter_map(|id| report.result.get(id))
        .collect()
}

fn trajectory_charts(members: &[&ScenarioReport]) -> Vec<ChartView> {
    let traced: Vec<(&ScenarioReport, &StateTrace)> = members
        .iter()
        .filter_map(|s| s.trace.as_ref().map(|t| (*s, t)))
        .collect();
    let Some(longest) = traced.iter().map(|(_, t)| t).max_by_key(|t| t.timestep.len()) else {
        return Vec::new();
    };
    let labels = json!(longest.timestep);

    let series = |pick: fn(&StateTrace) -> &Vec<Option<f64>>| -> Vec<Value> {
        traced
            .iter()
            .enumerate()
            .map(|(i, &(s, t))| {
                dataset(&s.identity.to_string(), json!(pick(t)), PALETTE[i % PALETTE.len()])
            })
            .collect()
    };

    vec![
        chart(
            "tempChart",
            "Air Temperature (°C)",
            line_chart(labels.clone(), series(|t| &t.temp_air), "Timestep", "Temperature (°C)"),
        ),
        chart(
            "rhChart",
            "Relative Humidity (%)",
            line_chart(labels.clone(), series(|t| &t.rh_air), "Timestep", "Humidity (%)"),
        ),
        chart(
            "co2Chart",
            "CO2 Concentration (ppm)",
            line_chart(labels.clone(), series(|t| &t.co2_air), "Timestep", "CO2 (ppm)"),
        ),
        chart(
            "rewardChart",
            "Cumulative Rewards",
            line_chart(labels, series(|t| &t.cumulative_reward), "Timestep", "Cumulative Reward"),
        ),
    ]
}

fn performance_charts(members: &[&ScenarioReport]) -> Vec<ChartView> {
    let economic_labels = ["Total Reward", "Total Revenue", "Total Heat Cost", "Total CO2 Cost", "Total Elec Cost"];
    let violation_labels = ["Temp Violations", "CO2 Violations", "RH Violations"];
    let summary_labels = ["Total Reward", "Total Revenue", "Total Violations"];

    let bars = |values: &dyn Fn(&ScenarioReport) -> Vec<f64>| -> Vec<Value> {
        members
            .iter()
            .enumerate()
            .map(|(i, &s)| dataset(&s.identity.to_string(), json!(values(s)), PALETTE[i % PALETTE.len()]))
            .collect()
    };

    vec![
        chart(
            "economicChart",
            "Economic Metrics",
            bar_chart(
                &economic_labels,
                bars(&|s| s.metrics.economic().labeled().iter().map(|(_, v)| *v).collect()),
                "Value",
            ),
        ),
        chart(
            "violationChart",
            "Constraint Violations",
            bar_chart(
                &violation_labels,
                bars(&|s| vec![s.metrics.temp_violations, s.metrics.co2_violations, s.metrics.rh_violations]),
                "Violation Count",
            ),
        ),
        chart(
            "summaryChart",
            "Performance Summary",
            bar_chart(
                &summary_labels,
                bars(&|s| vec![s.metrics.total_reward, s.metrics.total_revenue, s.metrics.total_violations()]),
                "Value",
            ),
        ),
    ]
}

fn pairwise_sections(report: &PairwiseReport) -> Vec<Section> {
    let title = format!("{} vs {}", report.candidate, report.baseline);
    let members = pair_members(report);

    let mut performance = Section {
        title: format!("Performance Metrics: {}", title),
        notice: None,
        cards: Vec::new(),
        charts: Vec::new(),
    };

    match &report.outcome {
        PairwiseOutcome::NoData => {
            performance.notice = Some(
                "Nothing to report: neither scenario could be loaded.".to_string(),
            );
            return vec![performance];
        }
        PairwiseOutcome::MissingCounterpart { available, missing, .. } => {
            performance.notice = Some(format!(
                "Only {} is available; {} could not be loaded, so no improvement is computed.",
                available, missing
            ));
        }
        PairwiseOutcome::Compared(delta) => {
            let pct = delta.improvement_pct;
            let class = |v: f64| if v >= 0.0 { "good" } else { "bad" };
            performance.cards = vec![
                Card {
                    title: "Reward Improvement".to_string(),
                    value: format!("{:+.2}%", pct.reward),
                    label: format!("{} over {}", report.candidate, report.baseline),
                    class: class(pct.reward),
                },
                Card {
                    title: "Revenue Improvement".to_string(),
                    value: format!("{:+.2}%", pct.revenue),
                    label: format!("{} over {}", report.candidate, report.baseline),
                    class: class(pct.revenue),
                },
                Card {
                    title: "Total Violations".to_string(),
                    value: format!("{:.0} / {:.0}", delta.candidate_violations, delta.baseline_violations),
                    label: format!("{} / {}", report.candidate, report.baseline),
                    class: class(delta.baseline_violations - delta.candidate_violations),
                },
            ];
            performance.charts.push(chart(
                "improvementChart",
                &format!("{} Improvement over {} (%)", report.candidate, report.baseline),
                bar_chart(
                    &["Total Reward", "Total Revenue", "Total Heat Cost", "Total CO2 Cost", "Total Elec Cost"],
                    vec![dataset(
                        "Improvement (%)",
                        json!(pct.labeled().iter().map(|(_, v)| *v).collect::<Vec<f64>>()),
                        "#10b981",
                    )],
                    "Improvement (%)",
                ),
            ));
        }
    }
    let mut charts = performance_charts(&members);
    charts.append(&mut performance.charts);
    performance.charts = charts;

    let mut sections = Vec::new();
    let trajectories = trajectory_charts(&members);
    if !trajectories.is_empty() {
        sections.push(Section {
            title: format!("State Trajectories: {}", title),
            notice: None,
            cards: Vec::new(),
            charts: trajectories,
        });
    }
    sections.push(performance);
    sections
}

fn sweep_section(report: &SweepReport) -> Section {
    let title = format!("{} Performance under Parameter Uncertainty", report.controller);

    if report.is_no_data() {
        return Section {
            title,
            notice: Some("Nothing to report: no stochastic runs were found.".to_string()),
            cards: Vec::new(),
            charts: Vec::new(),
        };
    }

    let points = report.points();
    let scales = json!(points.iter().map(|p| p.scale.label()).collect::<Vec<_>>());
    let series = |label: &str, values: Vec<f64>, color: &str| {
        let mut ds = dataset(label, json!(values), color);
        ds["pointRadius"] = json!(5);
        vec![ds]
    };

    let skipped = report.skipped();
    let notice = (!skipped.is_empty()).then(|| {
        let list: Vec<String> = skipped.iter().map(|s| s.label()).collect();
        format!("No data for scales {}; those points are omitted.", list.join(", "))
    });

    Section {
        title,
        notice,
        cards: Vec::new(),
        charts: vec![
            chart(
                "sweepRewardChart",
                "Total Reward vs Uncertainty",
                line_chart(
                    scales.clone(),
                    series("Total Reward", points.iter().map(|p| p.metrics.total_reward).collect(), "#8b5cf6"),
                    "Uncertainty Scale",
                    "Total Reward",
                ),
            ),
            chart(
                "sweepRevenueChart",
                "Total Revenue vs Uncertainty",
                line_chart(
                    scales.clone(),
                    series("Total Revenue", points.iter().map(|p| p.metrics.total_revenue).collect(), "#10b981"),
                    "Uncertainty Scale",
                    "Total Revenue",
                ),
            ),
            chart(
                "sweepViolationChart",
                "Total Violations vs Uncertainty",
                line_chart(
                    scales,
                    series("Total Violations", points.iter().map(|p| p.metrics.total_violations()).collect(), "#ef4444"),
                    "Uncertainty Scale",
                    "Total Violations",
                ),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::metrics::{ScenarioMetrics, StateTrace};
    use crate::comparison::{Availability, ScenarioFailure, ScenarioIdentity, UncertaintyScale};
    use crate::error::FailureKind;
    use std::path::PathBuf;

    fn scenario(identity: ScenarioIdentity, reward: f64, trace: bool) -> ScenarioReport {
        ScenarioReport {
            identity,
            locator: PathBuf::from("run.csv"),
            digest: None,
            metrics: ScenarioMetrics {
                total_reward: reward,
                timesteps: 2,
                ..Default::default()
            },
            trace: trace.then(|| StateTrace {
                timestep: vec![0, 1],
                temp_air: vec![Some(18.0), None],
                rh_air: vec![Some(80.0), Some(81.0)],
                co2_air: vec![Some(400.0), Some(410.0)],
                cumulative_reward: vec![Some(1.0), Some(reward)],
            }),
        }
    }

    fn missing(identity: ScenarioIdentity) -> ScenarioFailure {
        ScenarioFailure {
            identity,
            locator: PathBuf::from("gone.csv"),
            kind: FailureKind::Unavailable,
            message: "trajectory log not found: gone.csv".to_string(),
        }
    }

    #[test]
    fn test_full_report_renders_all_charts() {
        let policy = ScenarioIdentity::controller("PPO");
        let baseline = ScenarioIdentity::controller("Rule-Based");
        let pairwise = PairwiseReport::from_result(
            policy.clone(),
            baseline.clone(),
            ComparisonResult {
                availability: Availability::Full,
                scenarios: vec![scenario(policy, 25.0, true), scenario(baseline, 15.0, true)],
                failures: vec![],
            },
        );
        let s0 = UncertaintyScale::new(0.0).unwrap();
        let s1 = UncertaintyScale::new(0.1).unwrap();
        let s2 = UncertaintyScale::new(0.2).unwrap();
        let sweep = SweepReport::from_result(
            "PPO".to_string(),
            vec![s2, s0, s1],
            ComparisonResult {
                availability: Availability::Partial,
                scenarios: vec![
                    scenario(ScenarioIdentity::scaled("PPO", s0), 30.0, false),
                    scenario(ScenarioIdentity::scaled("PPO", s2), 10.0, false),
                ],
                failures: vec![missing(ScenarioIdentity::scaled("PPO", s1))],
            },
        );

        let html = render_html(&EvaluationResults::new(Some(pairwise), Some(sweep))).unwrap();

        for id in ["tempChart", "rewardChart", "economicChart", "improvementChart", "sweepRewardChart"] {
            assert!(html.contains(&format!("id=\"{}\"", id)), "missing {}", id);
        }
        assert!(html.contains("+66.67%"));
        assert!(html.contains("No data for scales 0.1"));
        assert!(html.contains("Scenario Manifest"));
        assert!(html.contains("PPO@0.1"));
    }

    #[test]
    fn test_no_data_renders_notice_without_charts() {
        let empty = ComparisonResult {
            availability: Availability::Unavailable,
            scenarios: vec![],
            failures: vec![],
        };
        let results = EvaluationResults::new(
            Some(PairwiseReport::from_result(
                ScenarioIdentity::controller("PPO"),
                ScenarioIdentity::controller("Rule-Based"),
                empty.clone(),
            )),
            Some(SweepReport::from_result("PPO".to_string(), vec![], empty)),
        );

        let html = render_html(&results).unwrap();
        assert!(html.contains("Nothing to report: neither scenario"));
        assert!(html.contains("Nothing to report: no stochastic runs"));
        assert!(!html.contains("<canvas"));
    }

    #[test]
    fn test_missing_counterpart_renders_available_side() {
        let policy = ScenarioIdentity::controller("PPO");
        let baseline = ScenarioIdentity::controller("Rule-Based");
        let pairwise = PairwiseReport::from_result(
            policy.clone(),
            baseline.clone(),
            ComparisonResult {
                availability: Availability::Partial,
                scenarios: vec![scenario(policy, 25.0, false)],
                failures: vec![missing(baseline)],
            },
        );

        let html = render_html(&EvaluationResults::new(Some(pairwise), None)).unwrap();
        assert!(html.contains("Only PPO is available"));
        assert!(html.contains("id=\"economicChart\""));
        assert!(!html.contains("id=\"improvementChart\""));
    }

    #[test]
    fn test_generate_report_writes_file() {
        let dir = std::env::temp_dir().join(format!("gh_eval_report_{}", std::process::id()));
        let path = dir.join("reports/report.html");
        let results = EvaluationResults::new(None, None);

        let written = generate_report(&results, path.to_str().unwrap()).unwrap();
        assert!(fs::read_to_string(&written).unwrap().contains("Greenhouse Controller Evaluation"));
        fs::remove_dir_all(&dir).ok();
    }
}
