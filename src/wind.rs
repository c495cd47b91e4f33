use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Default extent of a wind segment when none is given, ft
pub const DEFAULT_WIND_UNTIL_FT: f64 = 1e8;

/// Wind blowing at a constant speed and direction until a downrange distance.
///
/// `direction_from_rad` is the direction the wind comes from, measured from
/// the line of fire: 0 is a tailwind, π/2 blows from the shooter's left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub velocity_fps: f64,
    pub direction_from_rad: f64,
    #[serde(default = "default_until")]
    pub until_distance_ft: f64,
}

fn default_until() -> f64 {
    DEFAULT_WIND_UNTIL_FT
}

impl Wind {
    pub fn new(velocity_fps: f64, direction_from_rad: f64) -> Self {
        Self {
            velocity_fps,
            direction_from_rad,
            until_distance_ft: DEFAULT_WIND_UNTIL_FT,
        }
    }

    pub fn until(mut self, until_distance_ft: f64) -> Self {
        self.until_distance_ft = until_distance_ft;
        self
    }

    /// Wind velocity in the shot frame (x downrange, y up, z right)
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(
            self.velocity_fps * self.direction_from_rad.cos(),
            0.0,
            self.velocity_fps * self.direction_from_rad.sin(),
        )
    }
}

/// Ordered wind segments, looked up by downrange distance.
#[derive(Debug, Clone, Default)]
pub struct WindSock {
    /// (until_distance_ft, vector), ascending by distance
    segments: Vec<(f64, Vector3<f64>)>,
}

impl WindSock {
    /// Segments must be listed nearest first with strictly increasing
    /// `until_distance_ft`.
    pub fn new(winds: &[Wind]) -> Result<Self, ConfigurationError> {
        let mut segments: Vec<(f64, Vector3<f64>)> = Vec::with_capacity(winds.len());
        for (index, wind) in winds.iter().enumerate() {
            if !wind.velocity_fps.is_finite() || !wind.direction_from_rad.is_finite() {
                return Err(ConfigurationError::InvalidWindSegment { index });
            }
            if wind.until_distance_ft.is_nan() {
                return Err(ConfigurationError::InvalidWindSegment { index });
            }
            if let Some((previous, _)) = segments.last() {
                if wind.until_distance_ft <= *previous {
                    return Err(ConfigurationError::UnorderedWindSegments { index });
                }
            }
            segments.push((wind.until_distance_ft, wind.vector()));
        }
        Ok(Self { segments })
    }

    /// Wind vector in effect at `range_ft`; zero beyond the last segment.
    pub fn vector_for_range(&self, range_ft: f64) -> Vector3<f64> {
        if range_ft.is_nan() {
            return Vector3::zeros();
        }
        let index = self.segments.partition_point(|(until, _)| *until <= range_ft);
        self.segments
            .get(index)
            .map(|(_, vector)| *vector)
            .unwrap_or_else(Vector3::zeros)
    }

}
