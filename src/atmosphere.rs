//! Atmospheric models for trajectory integration.
//!
//! The engine only needs two quantities at a given altitude: air density
//! relative to the standard sea-level density, and the local speed of sound.
//! Both come from an [`AtmosphereModel`], so callers can plug in anything
//! from a flat constant atmosphere to a full lapse-rate model.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ATMOSPHERE_REUSE_BAND_FT, DEGREES_F_TO_R, LAPSE_RATE_F_PER_FT, PRESSURE_EXPONENT,
    SPEED_OF_SOUND_IMPERIAL, STANDARD_PRESSURE_INHG, STANDARD_TEMPERATURE_F,
    STANDARD_TEMPERATURE_R, VAPOUR_A0, VAPOUR_A1, VAPOUR_A2, VAPOUR_A3, VAPOUR_A4, VAPOUR_A5,
};

/// Source of density ratio and speed of sound by absolute altitude.
pub trait AtmosphereModel: Debug + Send + Sync {
    /// Altitude of the shooter, ft
    fn altitude_ft(&self) -> f64;

    /// `(density_ratio, speed_of_sound_fps)` at an absolute altitude in feet.
    fn density_ratio_and_speed_of_sound(&self, altitude_ft: f64) -> (f64, f64);

    /// Temperature at the shooter, °F
    fn temperature_f(&self) -> f64 {
        STANDARD_TEMPERATURE_F
    }

    /// Station pressure at the shooter, inHg
    fn pressure_inhg(&self) -> f64 {
        STANDARD_PRESSURE_INHG
    }
}

/// Standard atmosphere with a linear temperature lapse rate and barometric
/// pressure decay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atmosphere {
    pub altitude_ft: f64,
    pub pressure_inhg: f64,
    pub temperature_f: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    density_ratio: f64,
    speed_of_sound_fps: f64,
}

impl Atmosphere {
    pub fn new(altitude_ft: f64, pressure_inhg: f64, temperature_f: f64, humidity: f64) -> Self {
        let density_ratio = base_density_ratio(pressure_inhg, temperature_f, humidity);
        Self {
            altitude_ft,
            pressure_inhg,
            temperature_f,
            humidity,
            density_ratio,
            speed_of_sound_fps: speed_of_sound_fps(temperature_f),
        }
    }

    /// ICAO conditions at sea level: 59 °F, 29.92 inHg, dry air.
    pub fn icao() -> Self {
        Self::new(0.0, STANDARD_PRESSURE_INHG, STANDARD_TEMPERATURE_F, 0.0)
    }

    /// Standard conditions extrapolated to the given altitude.
    pub fn icao_at(altitude_ft: f64) -> Self {
        let temperature_f = STANDARD_TEMPERATURE_F + altitude_ft * LAPSE_RATE_F_PER_FT;
        let pressure_inhg = STANDARD_PRESSURE_INHG
            * ((temperature_f + DEGREES_F_TO_R) / STANDARD_TEMPERATURE_R).powf(PRESSURE_EXPONENT);
        Self::new(altitude_ft, pressure_inhg, temperature_f, 0.0)
    }

    pub fn density_ratio(&self) -> f64 {
        self.density_ratio
    }

    pub fn speed_of_sound_fps(&self) -> f64 {
        self.speed_of_sound_fps
    }
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::icao()
    }
}

impl AtmosphereModel for Atmosphere {
    fn altitude_ft(&self) -> f64 {
        self.altitude_ft
    }

    fn density_ratio_and_speed_of_sound(&self, altitude_ft: f64) -> (f64, f64) {
        let height_diff = altitude_ft - self.altitude_ft;
        if height_diff.abs() < ATMOSPHERE_REUSE_BAND_FT {
            return (self.density_ratio, self.speed_of_sound_fps);
        }

        let base_temp_r = self.temperature_f + DEGREES_F_TO_R;
        let temp_f = self.temperature_f + LAPSE_RATE_F_PER_FT * height_diff;
        let temp_r = temp_f + DEGREES_F_TO_R;
        let pressure = self.pressure_inhg * (temp_r / base_temp_r).powf(PRESSURE_EXPONENT);

        let density_ratio =
            self.density_ratio * (base_temp_r * pressure) / (self.pressure_inhg * temp_r);
        (density_ratio, speed_of_sound_fps(temp_f))
    }

    fn temperature_f(&self) -> f64 {
        self.temperature_f
    }

    fn pressure_inhg(&self) -> f64 {
        self.pressure_inhg
    }
}

/// Flat atmosphere: the same density and speed of sound at every altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantAtmosphere {
    pub altitude_ft: f64,
    pub density_ratio: f64,
    pub speed_of_sound_fps: f64,
}

impl ConstantAtmosphere {
    pub fn new(density_ratio: f64, speed_of_sound_fps: f64) -> Self {
        Self {
            altitude_ft: 0.0,
            density_ratio,
            speed_of_sound_fps,
        }
    }
}

impl AtmosphereModel for ConstantAtmosphere {
    fn altitude_ft(&self) -> f64 {
        self.altitude_ft
    }

    fn density_ratio_and_speed_of_sound(&self, _altitude_ft: f64) -> (f64, f64) {
        (self.density_ratio, self.speed_of_sound_fps)
    }
}

/// Density relative to standard, corrected for water vapour pressure.
fn base_density_ratio(pressure_inhg: f64, temperature_f: f64, humidity: f64) -> f64 {
    let vapour = if temperature_f > 0.0 {
        let t = temperature_f;
        let saturation = VAPOUR_A0 + t * (VAPOUR_A1 + t * (VAPOUR_A2 + t * (VAPOUR_A3 + t * VAPOUR_A4)));
        VAPOUR_A5 * humidity * saturation
    } else {
        0.0
    };
    let pressure_correction = (pressure_inhg - 0.3783 * vapour) / STANDARD_PRESSURE_INHG;
    STANDARD_TEMPERATURE_R / (temperature_f + DEGREES_F_TO_R) * pressure_correction
}

#[inline]
fn speed_of_sound_fps(temperature_f: f64) -> f64 {
    (temperature_f + DEGREES_F_TO_R).sqrt() * SPEED_OF_SOUND_IMPERIAL
}
