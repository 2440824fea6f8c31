//! Scenario identities and locators

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Placeholder substituted with the scale in sweep locator templates
pub const SCALE_PLACEHOLDER: &str = "{scale}";

/// Magnitude of injected parameter perturbation; 0.0 is nominal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct UncertaintyScale(f64);

impl UncertaintyScale {
    pub const NOMINAL: Self = Self(0.0);

    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && value >= 0.0 {
            // normalise -0.0 so equal scales share one identity
            Ok(Self(value + 0.0))
        } else {
            Err(ConfigError::InvalidScale(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Directory-style label: shortest round-trip form, always with a fraction
    /// (`0.0`, `0.05`, `0.1`).
    pub fn label(&self) -> String {
        format!("{:?}", self.0)
    }
}

impl TryFrom<f64> for UncertaintyScale {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UncertaintyScale> for f64 {
    fn from(scale: UncertaintyScale) -> Self {
        scale.0
    }
}

impl PartialEq for UncertaintyScale {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UncertaintyScale {}

impl PartialOrd for UncertaintyScale {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UncertaintyScale {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for UncertaintyScale {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for UncertaintyScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Key identifying one scenario in a comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScenarioIdentity {
    /// Controller label, e.g. "policy" or "baseline"
    pub controller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<UncertaintyScale>,
}

impl ScenarioIdentity {
    pub fn controller(label: impl Into<String>) -> Self {
        Self {
            controller: label.into(),
            scale: None,
        }
    }

    pub fn scaled(label: impl Into<String>, scale: UncertaintyScale) -> Self {
        Self {
            controller: label.into(),
            scale: Some(scale),
        }
    }
}

impl fmt::Display for ScenarioIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scale {
            Some(scale) => write!(f, "{}@{}", self.controller, scale),
            None => f.write_str(&self.controller),
        }
    }
}

/// A scenario to analyse: who it is and where its log lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub identity: ScenarioIdentity,
    /// Already-resolved log path
    pub locator: PathBuf,
}

impl ScenarioSpec {
    pub fn new(identity: ScenarioIdentity, locator: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            locator: locator.into(),
        }
    }
}

/// Scenarios with pairwise-distinct identities
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    specs: Vec<ScenarioSpec>,
}

impl ScenarioSet {
    pub fn new(specs: Vec<ScenarioSpec>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(&spec.identity) {
                return Err(ConfigError::DuplicateScenario(spec.identity.clone()));
            }
        }
        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[ScenarioSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// A controller's log location with `{scale}` left open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepTemplate {
    pub controller: String,
    pub locator: String,
}

impl SweepTemplate {
    pub fn new(controller: impl Into<String>, locator: impl Into<String>) -> Result<Self, ConfigError> {
        let locator = locator.into();
        if !locator.contains(SCALE_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(locator));
        }
        Ok(Self {
            controller: controller.into(),
            locator,
        })
    }

    /// Locator string for one point of the sweep
    pub fn locator_for(&self, scale: UncertaintyScale) -> String {
        self.locator.replace(SCALE_PLACEHOLDER, &scale.label())
    }

    pub fn spec_for(&self, scale: UncertaintyScale) -> ScenarioSpec {
        ScenarioSpec::new(
            ScenarioIdentity::scaled(self.controller.clone(), scale),
            self.locator_for(scale),
        )
    }
}
