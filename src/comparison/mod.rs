//! Scenario comparison: pairwise and sensitivity sweep

pub mod analyzer;
pub mod pairwise;
pub mod scenario;
pub mod sweep;

pub use analyzer::{
    Availability, ComparativeAnalyzer, ComparisonResult, EvaluationResults, ScenarioFailure,
    ScenarioReport,
};
pub use pairwise::{PairwiseDelta, PairwiseOutcome, PairwiseReport};
pub use scenario::{ScenarioIdentity, ScenarioSet, ScenarioSpec, SweepTemplate, UncertaintyScale};
pub use sweep::{SweepOutcome, SweepPoint, SweepReport};
