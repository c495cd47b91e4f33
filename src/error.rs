//! Error types for the trajectory engine.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::trajectory_data::TrajectoryRow;

/// Invalid inputs, rejected before any integration starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("drag table needs at least 2 points, got {len}")]
    DragTableTooShort { len: usize },

    #[error("drag table Mach values must be strictly increasing (index {index})")]
    NonIncreasingMach { index: usize },

    #[error("drag table point {index} is negative or not finite")]
    InvalidDragPoint { index: usize },

    #[error("ballistic coefficient must be positive and finite, got {value}")]
    InvalidBallisticCoefficient { value: f64 },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("wind segment {index} does not extend past the previous segment")]
    UnorderedWindSegments { index: usize },

    #[error("wind segment {index} has a non-finite velocity or direction")]
    InvalidWindSegment { index: usize },
}

/// Why an integration stopped before reaching the requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TerminationReason {
    MinimumVelocityReached,
    MaximumDropReached,
    MinimumAltitudeReached,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::MinimumVelocityReached => "Minimum velocity reached",
            TerminationReason::MaximumDropReached => "Maximum drop reached",
            TerminationReason::MinimumAltitudeReached => "Minimum altitude reached",
        };
        f.write_str(text)
    }
}

/// Early termination, carrying the rows produced up to the stop.
#[derive(Error, Debug, Clone)]
#[error("{reason} after {} trajectory rows", incomplete_trajectory.len())]
pub struct RangeError {
    pub reason: TerminationReason,
    pub incomplete_trajectory: Vec<TrajectoryRow>,
}

impl RangeError {
    /// Downrange distance of the last row, if any row was produced.
    pub fn last_distance_ft(&self) -> Option<f64> {
        self.incomplete_trajectory.last().map(|row| row.distance_ft)
    }
}

#[derive(Error, Debug)]
pub enum BallisticsError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("zero finding failed: vertical error {vertical_error_ft} ft after {iterations} iterations")]
    ZeroFinding {
        vertical_error_ft: f64,
        iterations: usize,
        last_termination: Option<TerminationReason>,
    },

    #[error("downrange velocity {velocity_x_fps} ft/s is not positive at t = {time_s} s")]
    DownrangeStalled {
        velocity_x_fps: f64,
        time_s: f64,
        incomplete_trajectory: Vec<TrajectoryRow>,
    },

    #[error("integration exceeded {limit} steps")]
    StepLimitExceeded {
        limit: usize,
        incomplete_trajectory: Vec<TrajectoryRow>,
    },
}
