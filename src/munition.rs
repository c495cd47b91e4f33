use serde::{Deserialize, Serialize};

use crate::drag_model::DragModel;
use crate::error::ConfigurationError;

/// Firearm description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Height of the sight above the bore axis, ft
    pub sight_height_ft: f64,
    /// Inches per turn; positive for right-hand twist, negative for left, 0 if unknown
    pub twist_in: f64,
    /// Barrel elevation relative to the line of sight when zeroed, rad
    pub zero_elevation_rad: f64,
}

impl Weapon {
    pub fn new(sight_height_ft: f64, twist_in: f64) -> Self {
        Self {
            sight_height_ft,
            twist_in,
            zero_elevation_rad: 0.0,
        }
    }

    pub fn with_zero_elevation(mut self, zero_elevation_rad: f64) -> Self {
        self.zero_elevation_rad = zero_elevation_rad;
        self
    }
}

impl Default for Weapon {
    fn default() -> Self {
        Self::new(2.0 / 12.0, 0.0)
    }
}

/// Cartridge description: projectile plus muzzle velocity.
#[derive(Debug, Clone)]
pub struct Ammo {
    pub dm: DragModel,
    pub muzzle_velocity_fps: f64,
    /// Powder temperature at which `muzzle_velocity_fps` was measured, °F
    pub powder_temp_f: f64,
    /// Velocity change per 15 °C of powder temperature, as a fraction
    pub temp_modifier: f64,
}

impl Ammo {
    pub fn new(dm: DragModel, muzzle_velocity_fps: f64) -> Self {
        Self {
            dm,
            muzzle_velocity_fps,
            powder_temp_f: 59.0,
            temp_modifier: 0.0,
        }
    }

    pub fn with_powder_temperature(mut self, powder_temp_f: f64, temp_modifier: f64) -> Self {
        self.powder_temp_f = powder_temp_f;
        self.temp_modifier = temp_modifier;
        self
    }

    /// Derive the powder sensitivity from a second velocity measured at
    /// another powder temperature. Returns the stored modifier.
    pub fn calc_powder_sens(
        &mut self,
        other_velocity_fps: f64,
        other_temperature_f: f64,
    ) -> Result<f64, ConfigurationError> {
        let v0 = self.muzzle_velocity_fps;
        let t_delta_c = fahrenheit_delta_to_celsius((self.powder_temp_f - other_temperature_f).abs());
        if t_delta_c == 0.0 {
            return Err(ConfigurationError::NonPositive {
                name: "powder temperature difference",
                value: 0.0,
            });
        }
        let v_delta = (v0 - other_velocity_fps).abs();
        let v_lower = v0.min(other_velocity_fps);
        if v_lower <= 0.0 {
            return Err(ConfigurationError::NonPositive {
                name: "muzzle velocity",
                value: v_lower,
            });
        }
        self.temp_modifier = v_delta / t_delta_c * (15.0 / v_lower);
        Ok(self.temp_modifier)
    }

    /// Muzzle velocity adjusted linearly for the current powder temperature.
    pub fn velocity_for_temperature(&self, temperature_f: f64) -> f64 {
        let v0 = self.muzzle_velocity_fps;
        let t_delta_c = fahrenheit_delta_to_celsius(temperature_f - self.powder_temp_f);
        self.temp_modifier / (15.0 / v0) * t_delta_c + v0
    }
}

fn fahrenheit_delta_to_celsius(delta_f: f64) -> f64 {
    delta_f * 5.0 / 9.0
}
