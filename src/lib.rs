//! Greenhouse Controller Evaluation
//!
//! Aggregates per-timestep greenhouse simulation logs into summary metrics
//! and compares controllers: a learned policy against a rule-based baseline,
//! and one controller across a sweep of parameter-uncertainty scales.

pub mod analytics;
pub mod comparison;
pub mod config;
pub mod error;
pub mod trajectory;

pub use analytics::metrics::ScenarioMetrics;
pub use analytics::report::generate_report;
pub use comparison::ComparativeAnalyzer;
pub use config::AnalysisConfig;
pub use trajectory::{Trajectory, TrajectoryLoader};
