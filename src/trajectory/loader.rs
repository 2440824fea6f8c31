//! Trajectory loading
//!
//! Reads one controller run's per-timestep CSV log into memory. Missing or
//! unreadable files are reported as unavailable; files that resolve but break
//! the column schema are reported as malformed.

use crate::error::LoadError;
use crate::trajectory::record::{TimestepRecord, REQUIRED_COLUMNS};
use csv::{ReaderBuilder, Trim};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One simulation run, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    source: PathBuf,
    digest: Option<String>,
    records: Vec<TimestepRecord>,
}

impl Trajectory {
    /// Build a trajectory from records already in memory
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<TimestepRecord>) -> Self {
        Self {
            source: source.into(),
            digest: None,
            records,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// SHA-256 of the bytes this trajectory was parsed from
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn records(&self) -> &[TimestepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loader for simulation logs
pub struct TrajectoryLoader;

impl TrajectoryLoader {
    /// Load a trajectory from an already-resolved path
    pub fn load(path: &Path) -> Result<Trajectory, LoadError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No log at {}", path.display());
                return Err(LoadError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(LoadError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_bytes(path, &bytes)
    }

    /// Parse a trajectory from raw CSV bytes, attributing errors to `locator`
    pub fn from_bytes(locator: impl Into<PathBuf>, bytes: &[u8]) -> Result<Trajectory, LoadError> {
        let path = locator.into();
        let malformed = |reason: String| LoadError::Malformed {
            path: path.clone(),
            reason,
        };

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| malformed(format!("unreadable header: {}", e)))?
            .clone();

        if headers.is_empty() {
            return Err(malformed("no header row".to_string()));
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(malformed(format!("missing columns: {}", missing.join(", "))));
        }

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<TimestepRecord>().enumerate() {
            let record = row.map_err(|e| malformed(format!("row {}: {}", idx + 1, e)))?;
            records.push(record);
        }

        let digest = hex::encode(Sha256::digest(bytes));
        debug!(
            "Loaded {} timesteps from {} (sha256 {})",
            records.len(),
            path.display(),
            &digest[..12]
        );

        Ok(Trajectory {
            source: path,
            digest: Some(digest),
            records,
        })
    }
}
