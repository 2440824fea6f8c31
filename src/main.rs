//! Greenhouse Evaluation CLI
//!
//! Command-line interface for comparing greenhouse climate controllers from
//! their simulation logs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use greenhouse_eval::{
    analytics::{
        logger::{print_summary, ResultsLogger},
        report::generate_report,
    },
    comparison::{ComparativeAnalyzer, EvaluationResults, PairwiseReport, SweepReport},
    config::AnalysisConfig,
};

#[derive(Parser)]
#[command(name = "gh-eval")]
#[command(version = "0.1.0")]
#[command(about = "Greenhouse controller comparison and uncertainty analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root used when a relative log path does not resolve
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Output directory for results and reports
    #[arg(long, global = true)]
    output_dir: Option<String>,

    /// Skip HTML report generation
    #[arg(long, global = true)]
    no_report: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a learned policy against a rule-based baseline
    Compare {
        /// Policy run log
        #[arg(long)]
        candidate: Option<String>,

        /// Baseline run log
        #[arg(long)]
        baseline: Option<String>,

        #[arg(long)]
        candidate_label: Option<String>,

        #[arg(long)]
        baseline_label: Option<String>,
    },

    /// Analyse one controller across uncertainty scales
    Sweep {
        /// Log path containing a {scale} placeholder
        #[arg(short, long)]
        template: Option<String>,

        /// Comma-separated uncertainty scales, e.g. 0.0,0.1,0.2
        #[arg(short, long, value_delimiter = ',')]
        scales: Option<Vec<f64>>,

        /// Controller label
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Run the pairwise comparison and the sweep from configuration
    Run,

    /// Generate report from saved evaluation results
    Report {
        /// Input JSON file with evaluation results
        #[arg(short, long)]
        input: PathBuf,

        /// Output HTML file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print configuration info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(root) = cli.root {
        config.project_root = root;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if cli.no_report {
        config.generate_report = false;
    }

    match cli.command {
        Commands::Compare {
            candidate,
            baseline,
            candidate_label,
            baseline_label,
        } => {
            if let Some(path) = candidate {
                config.candidate.path = path;
            }
            if let Some(path) = baseline {
                config.baseline.path = path;
            }
            if let Some(label) = candidate_label {
                config.candidate.label = label;
            }
            if let Some(label) = baseline_label {
                config.baseline.label = label;
            }
            let pairwise = run_pairwise(&config)?;
            finish(&config, EvaluationResults::new(Some(pairwise), None))?;
        }

        Commands::Sweep {
            template,
            scales,
            label,
        } => {
            if let Some(template) = template {
                config.sweep.template = template;
            }
            if let Some(scales) = scales {
                config.sweep.scales = scales;
            }
            if let Some(label) = label {
                config.sweep.label = label;
            }
            let sweep = run_sweep(&config)?;
            finish(&config, EvaluationResults::new(None, Some(sweep)))?;
        }

        Commands::Run => {
            let pairwise = run_pairwise(&config)?;
            let sweep = run_sweep(&config)?;
            finish(&config, EvaluationResults::new(Some(pairwise), Some(sweep)))?;
        }

        Commands::Report { input, output } => {
            generate_report_from_file(&input, output.as_deref(), &config)?;
        }

        Commands::Info => print_info(&config),
    }

    Ok(())
}

fn run_pairwise(config: &AnalysisConfig) -> Result<PairwiseReport> {
    info!(
        "Comparing {} against {}",
        config.candidate.label, config.baseline.label
    );
    let analyzer = ComparativeAnalyzer::with_traces(config.trace_stride);
    Ok(analyzer.compare_pair(config.candidate_spec(), config.baseline_spec())?)
}

fn run_sweep(config: &AnalysisConfig) -> Result<SweepReport> {
    let template = config.sweep_template()?;
    let scales = config.sweep_scales()?;
    info!(
        "Sweeping {} over {} uncertainty scales",
        template.controller,
        scales.len()
    );
    Ok(ComparativeAnalyzer::new().sweep(&template, &scales)?)
}

fn finish(config: &AnalysisConfig, results: EvaluationResults) -> Result<()> {
    print_summary(&results);

    let logger = ResultsLogger::new(&config.output_dir);
    let json_path = logger.save_results(&results)?;
    logger.save_summary(&results)?;

    let nothing_to_report = results.pairwise.as_ref().map_or(true, |p| p.is_no_data())
        && results.sweep.as_ref().map_or(true, |s| s.is_no_data());

    if nothing_to_report {
        warn!("No scenario data found; skipping report generation");
    } else if config.generate_report {
        let report_path = format!("{}/reports/report.html", config.output_dir);
        generate_report(&results, &report_path)?;

        println!();
        println!("📊 Report generated: {}", report_path);
        println!("   Open in browser to view interactive charts");
    }

    println!();
    println!("📁 Results saved to: {}", json_path);
    println!();

    Ok(())
}

fn generate_report_from_file(
    input: &Path,
    output: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<()> {
    info!("Loading results from: {:?}", input);

    let results = ResultsLogger::load_results(input)?;

    let output_path = output
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("{}/reports/report.html", config.output_dir));

    generate_report(&results, &output_path)?;

    println!("📊 Report generated: {}", output_path);

    Ok(())
}

fn print_info(config: &AnalysisConfig) {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       Greenhouse Controller Evaluation - Info            ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
    println!("Aggregates per-timestep simulation logs into reward, revenue,");
    println!("cost and constraint-violation totals, and compares controllers.");
    println!();
    println!("CONFIGURED SCENARIOS:");
    println!("  Candidate:  {} ({})", config.candidate.label, config.candidate.path);
    println!("  Baseline:   {} ({})", config.baseline.label, config.baseline.path);
    println!("  Sweep:      {} ({})", config.sweep.label, config.sweep.template);
    println!("  Scales:     {:?}", config.sweep.scales);
    println!("  Root:       {}", config.project_root.display());
    println!();
    println!("USAGE:");
    println!("  gh-eval run                                  # Pairwise + sweep");
    println!("  gh-eval compare --candidate a.csv --baseline b.csv");
    println!("  gh-eval sweep -t 'runs/{{scale}}/ppo.csv' -s 0.0,0.1,0.2");
    println!("  gh-eval report -i output/logs/evaluation.json");
    println!();
}
