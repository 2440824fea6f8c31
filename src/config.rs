//! Analysis configuration

use crate::comparison::scenario::{
    ScenarioIdentity, ScenarioSpec, SweepTemplate, UncertaintyScale,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One controller run to compare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSource {
    /// Controller label shown in reports
    pub label: String,
    /// Log path, relative to the working directory or the project root
    pub path: String,
}

/// Uncertainty sweep settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub label: String,
    /// Log path with a `{scale}` placeholder
    pub template: String,
    pub scales: Vec<f64>,
}

/// Main analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fallback directory for relative log paths that do not resolve as given
    pub project_root: PathBuf,

    /// Learned policy run
    pub candidate: ScenarioSource,

    /// Rule-based baseline run
    pub baseline: ScenarioSource,

    pub sweep: SweepConfig,

    /// Keep every n-th timestep for trajectory charts
    pub trace_stride: usize,

    /// Output directory for logs and reports
    pub output_dir: String,

    pub generate_report: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            candidate: ScenarioSource {
                label: "PPO".to_string(),
                path: "data/AgriControl/deterministic/ppo/dummy-cg4axdls-201059-Amsterdam.csv"
                    .to_string(),
            },
            baseline: ScenarioSource {
                label: "Rule-Based".to_string(),
                path: "data/AgriControl/deterministic/rb_baseline/rb_baseline-201059-Amsterdam.csv"
                    .to_string(),
            },
            sweep: SweepConfig {
                label: "PPO".to_string(),
                template:
                    "data/AgriControl/stochastic/ppo/{scale}/dummy-nbw883du-201059-Amsterdam.csv"
                        .to_string(),
                scales: vec![0.0, 0.05, 0.1, 0.15, 0.2, 0.25, 0.3],
            },
            trace_stride: 1,
            output_dir: "output".to_string(),
            generate_report: true,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config; absent fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config for a project checkout at `root`
    pub fn for_project(root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            ..Default::default()
        }
    }

    pub fn candidate_spec(&self) -> ScenarioSpec {
        ScenarioSpec::new(
            ScenarioIdentity::controller(self.candidate.label.clone()),
            resolve_locator(&self.candidate.path, &self.project_root),
        )
    }

    pub fn baseline_spec(&self) -> ScenarioSpec {
        ScenarioSpec::new(
            ScenarioIdentity::controller(self.baseline.label.clone()),
            resolve_locator(&self.baseline.path, &self.project_root),
        )
    }

    /// Sweep template with the project root applied when the relative
    /// template would not resolve from the working directory
    pub fn sweep_template(&self) -> Result<SweepTemplate, ConfigError> {
        let relative = SweepTemplate::new(self.sweep.label.clone(), self.sweep.template.clone())?;
        let rooted = SweepTemplate::new(
            self.sweep.label.clone(),
            self.project_root
                .join(&self.sweep.template)
                .to_string_lossy()
                .into_owned(),
        )?;

        let resolves = |t: &SweepTemplate| {
            self.sweep_scales()
                .map(|scales| scales.iter().any(|&s| Path::new(&t.locator_for(s)).exists()))
                .unwrap_or(false)
        };

        if Path::new(&self.sweep.template).is_relative() && !resolves(&relative) && resolves(&rooted) {
            Ok(rooted)
        } else {
            Ok(relative)
        }
    }

    pub fn sweep_scales(&self) -> Result<Vec<UncertaintyScale>, ConfigError> {
        self.sweep
            .scales
            .iter()
            .map(|&s| UncertaintyScale::new(s))
            .collect()
    }
}

/// Resolve a log path: as given if it exists, else under `root` if it exists
/// there. Falls back to the path as given so the loader reports it missing.
pub fn resolve_locator(path: &str, root: &Path) -> PathBuf {
    let direct = PathBuf::from(path);
    if direct.exists() {
        return direct;
    }

    if direct.is_relative() {
        let rooted = root.join(&direct);
        if rooted.exists() {
            debug!("Resolved {} under {}", path, root.display());
            return rooted;
        }
    }

    direct
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gh_eval_cfg_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_sweep_scales_are_valid() {
        let config = AnalysisConfig::default();
        let scales = config.sweep_scales().unwrap();
        assert_eq!(scales.len(), 7);
        assert_eq!(scales[0], UncertaintyScale::NOMINAL);
        assert!(config.sweep_template().is_ok());
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let mut config = AnalysisConfig::default();
        config.sweep.scales.push(-0.5);
        assert!(matches!(
            config.sweep_scales(),
            Err(ConfigError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = scratch("partial_json");
        let path = dir.join("config.json");
        fs::write(&path, r#"{ "output_dir": "out", "trace_stride": 24 }"#).unwrap();

        let config = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.trace_stride, 24);
        assert_eq!(config.candidate, AnalysisConfig::default().candidate);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let dir = scratch("bad_json");
        let path = dir.join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AnalysisConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            AnalysisConfig::from_file(&dir.join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_locator_falls_back_to_root() {
        let root = scratch("resolve");
        fs::create_dir_all(root.join("data")).unwrap();
        fs::write(root.join("data/run.csv"), "x").unwrap();

        let resolved = resolve_locator("data/run.csv", &root);
        assert_eq!(resolved, root.join("data/run.csv"));

        let unresolved = resolve_locator("data/other.csv", &root);
        assert_eq!(unresolved, PathBuf::from("data/other.csv"));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_sweep_template_rooted_when_only_root_resolves() {
        let root = scratch("sweep_root");
        fs::create_dir_all(root.join("runs/0.1")).unwrap();
        fs::write(root.join("runs/0.1/log.csv"), "x").unwrap();

        let mut config = AnalysisConfig::for_project(&root);
        config.sweep.template = "runs/{scale}/log.csv".to_string();
        config.sweep.scales = vec![0.0, 0.1];

        let template = config.sweep_template().unwrap();
        let scale = UncertaintyScale::new(0.1).unwrap();
        assert_eq!(
            PathBuf::from(template.locator_for(scale)),
            root.join("runs/0.1/log.csv")
        );
        fs::remove_dir_all(&root).ok();
    }
}
