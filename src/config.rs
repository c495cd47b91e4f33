//! Engine configuration.
//!
//! A single immutable value passed into every integration and zero search.
//! Partial JSON documents fill the missing fields from the defaults.

use serde::{Deserialize, Serialize};

use crate::constants::GRAVITY_FPS2;
use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Vertical gravity component, ft/s²
    pub gravity_fps2: f64,
    /// Upper bound on the integration step, ft
    pub max_calc_step_size_ft: f64,
    /// Vertical tolerance for the zero search, ft
    pub zero_finding_accuracy_ft: f64,
    pub max_zero_iterations: usize,
    pub minimum_velocity_fps: f64,
    /// Absolute altitude floor, ft
    pub minimum_altitude_ft: f64,
    /// Drop floor relative to the muzzle, ft
    pub maximum_drop_ft: f64,
    /// Hard ceiling on integration steps for a single call
    pub max_integration_steps: usize,
    /// Record step used when every row flag is requested, ft
    pub chart_resolution_ft: f64,
    pub use_powder_sensitivity: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity_fps2: GRAVITY_FPS2,
            max_calc_step_size_ft: 0.5,
            zero_finding_accuracy_ft: 0.000005,
            max_zero_iterations: 20,
            minimum_velocity_fps: 50.0,
            minimum_altitude_ft: -1500.0,
            maximum_drop_ft: -15000.0,
            max_integration_steps: 10_000_000,
            chart_resolution_ft: 0.2,
            use_powder_sensitivity: false,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON, applying defaults to absent fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        positive("max_calc_step_size_ft", self.max_calc_step_size_ft)?;
        positive("zero_finding_accuracy_ft", self.zero_finding_accuracy_ft)?;
        positive("chart_resolution_ft", self.chart_resolution_ft)?;
        if self.max_zero_iterations == 0 {
            return Err(ConfigurationError::NonPositive {
                name: "max_zero_iterations",
                value: 0.0,
            });
        }
        if self.max_integration_steps == 0 {
            return Err(ConfigurationError::NonPositive {
                name: "max_integration_steps",
                value: 0.0,
            });
        }
        for (name, value) in [
            ("gravity_fps2", self.gravity_fps2),
            ("minimum_velocity_fps", self.minimum_velocity_fps),
            ("minimum_altitude_ft", self.minimum_altitude_ft),
            ("maximum_drop_ft", self.maximum_drop_ft),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::NotFinite { name, value });
            }
        }
        Ok(())
    }

    /// Integration step for a given record step: half the smaller of the
    /// record step and the configured maximum. A zero record step means
    /// "no preference" and yields half the maximum.
    pub fn calc_step(&self, record_step_ft: f64) -> f64 {
        if record_step_ft == 0.0 {
            self.max_calc_step_size_ft / 2.0
        } else {
            record_step_ft.min(self.max_calc_step_size_ft) / 2.0
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositive { name, value })
    }
}
