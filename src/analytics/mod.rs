//! Analytics modules for metrics, persistence and report generation

pub mod logger;
pub mod metrics;
pub mod report;

pub use logger::ResultsLogger;
pub use metrics::{MetricsCalculator, ScenarioMetrics};
pub use report::generate_report;
