//! Simulation log schema and loading

pub mod loader;
pub mod record;

pub use loader::{Trajectory, TrajectoryLoader};
pub use record::{TimestepRecord, REQUIRED_COLUMNS};
