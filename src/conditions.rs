use std::sync::Arc;

use crate::atmosphere::{Atmosphere, AtmosphereModel};
use crate::munition::{Ammo, Weapon};
use crate::wind::Wind;

/// Everything needed to fire one shot.
#[derive(Debug, Clone)]
pub struct Shot {
    pub weapon: Weapon,
    pub ammo: Ammo,
    pub atmo: Arc<dyn AtmosphereModel>,
    /// Wind segments, nearest first
    pub winds: Vec<Wind>,
    /// Angle of the line of sight above horizontal, rad
    pub look_angle_rad: f64,
    /// Rotation of the sight about the bore axis, rad
    pub cant_angle_rad: f64,
    /// Horizontal bore angle from the line of fire, rad
    pub barrel_azimuth_rad: f64,
    /// Bore angle above horizontal, rad
    pub barrel_elevation_rad: f64,
}

impl Shot {
    /// A level shot in standard conditions with the weapon's stored zero.
    pub fn new(weapon: Weapon, ammo: Ammo) -> Self {
        Self {
            barrel_elevation_rad: weapon.zero_elevation_rad,
            weapon,
            ammo,
            atmo: Arc::new(Atmosphere::icao()),
            winds: Vec::new(),
            look_angle_rad: 0.0,
            cant_angle_rad: 0.0,
            barrel_azimuth_rad: 0.0,
        }
    }

    pub fn with_atmosphere(mut self, atmo: Arc<dyn AtmosphereModel>) -> Self {
        self.atmo = atmo;
        self
    }

    pub fn with_winds(mut self, winds: Vec<Wind>) -> Self {
        self.winds = winds;
        self
    }

    /// Set the look angle, keeping the barrel at the weapon's zero relative to it.
    pub fn with_look_angle(mut self, look_angle_rad: f64) -> Self {
        self.look_angle_rad = look_angle_rad;
        self.barrel_elevation_rad = look_angle_rad + self.weapon.zero_elevation_rad;
        self
    }

    pub fn with_cant(mut self, cant_angle_rad: f64) -> Self {
        self.cant_angle_rad = cant_angle_rad;
        self
    }

    pub fn with_barrel_elevation(mut self, barrel_elevation_rad: f64) -> Self {
        self.barrel_elevation_rad = barrel_elevation_rad;
        self
    }

    pub fn with_barrel_azimuth(mut self, barrel_azimuth_rad: f64) -> Self {
        self.barrel_azimuth_rad = barrel_azimuth_rad;
        self
    }

    /// Barrel elevation relative to the line of sight, rad
    pub fn relative_elevation_rad(&self) -> f64 {
        self.barrel_elevation_rad - self.look_angle_rad
    }
}
