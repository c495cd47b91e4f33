//! Integration engine interface and the per-call shot context shared by
//! every integration scheme.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::atmosphere::AtmosphereModel;
use crate::conditions::Shot;
use crate::config::EngineConfig;
use crate::constants::RANGE_SLACK_FT;
use crate::distance_step::DistanceStepEngine;
use crate::drag_model::DragModel;
use crate::error::{BallisticsError, ConfigurationError, TerminationReason};
use crate::leapfrog::LeapFrogEngine;
use crate::stability::{compute_spin_drift, compute_stability_coefficient};
use crate::trajectory_data::{create_trajectory_row, HitResult, TrajFlag, TrajectoryRow};
use crate::wind::WindSock;

/// A trajectory integration scheme.
pub trait IntegrationEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Integrate the shot out to `maximum_range_ft`.
    ///
    /// Rows are recorded every `record_step_ft` downrange (and every
    /// `time_step_s` seconds when that is positive) for the flags in `mask`.
    /// A stop condition ends the run early with
    /// [`HitResult::termination`] set; that is not an `Err`.
    fn integrate(
        &self,
        props: &ShotProps,
        maximum_range_ft: f64,
        record_step_ft: f64,
        mask: TrajFlag,
        time_step_s: f64,
    ) -> Result<HitResult, BallisticsError>;
}

/// Selectable integration schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Fixed downrange step, semi-implicit update
    #[default]
    DistanceStep,
    /// Fixed time step, symplectic leapfrog
    LeapFrog,
}

impl EngineKind {
    pub fn engine(&self) -> Box<dyn IntegrationEngine> {
        match self {
            EngineKind::DistanceStep => Box::new(DistanceStepEngine),
            EngineKind::LeapFrog => Box::new(LeapFrogEngine::default()),
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "distance_step" | "euler" => Ok(EngineKind::DistanceStep),
            "leapfrog" | "leap_frog" => Ok(EngineKind::LeapFrog),
            other => Err(format!("unknown integration engine: {other}")),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::DistanceStep => f.write_str("distance_step"),
            EngineKind::LeapFrog => f.write_str("leapfrog"),
        }
    }
}

/// Shot values resolved once per integration call.
#[derive(Debug, Clone)]
pub struct ShotProps {
    pub barrel_elevation_rad: f64,
    pub barrel_azimuth_rad: f64,
    pub look_angle_rad: f64,
    pub cant_cosine: f64,
    pub cant_sine: f64,
    pub sight_height_ft: f64,
    pub muzzle_velocity_fps: f64,
    pub weight_gr: f64,
    pub twist_in: f64,
    pub stability_coefficient: f64,
    /// Integration step: feet downrange for the distance scheme, and the
    /// basis of the time step for the leapfrog scheme
    pub calc_step_ft: f64,
    /// Altitude of the muzzle, ft
    pub alt0_ft: f64,
    pub gravity: Vector3<f64>,
    pub minimum_velocity_fps: f64,
    pub maximum_drop_ft: f64,
    pub minimum_altitude_ft: f64,
    pub max_integration_steps: usize,
    dm: DragModel,
    atmo: Arc<dyn AtmosphereModel>,
    winds: WindSock,
}

impl ShotProps {
    pub fn new(shot: &Shot, config: &EngineConfig, calc_step_ft: f64) -> Result<Self, BallisticsError> {
        config.validate()?;
        if !calc_step_ft.is_finite() || calc_step_ft <= 0.0 {
            return Err(ConfigurationError::NonPositive {
                name: "calc_step_ft",
                value: calc_step_ft,
            }
            .into());
        }
        let winds = WindSock::new(&shot.winds)?;

        let muzzle_velocity_fps = if config.use_powder_sensitivity {
            shot.ammo.velocity_for_temperature(shot.atmo.temperature_f())
        } else {
            shot.ammo.muzzle_velocity_fps
        };
        if !muzzle_velocity_fps.is_finite() || muzzle_velocity_fps <= 0.0 {
            return Err(ConfigurationError::NonPositive {
                name: "muzzle_velocity_fps",
                value: muzzle_velocity_fps,
            }
            .into());
        }

        let dm = shot.ammo.dm.clone();
        let stability_coefficient = compute_stability_coefficient(
            dm.weight_gr,
            dm.diameter_in,
            dm.length_in,
            shot.weapon.twist_in,
            muzzle_velocity_fps,
            shot.atmo.temperature_f(),
            shot.atmo.pressure_inhg(),
        );

        Ok(Self {
            barrel_elevation_rad: shot.barrel_elevation_rad,
            barrel_azimuth_rad: shot.barrel_azimuth_rad,
            look_angle_rad: shot.look_angle_rad,
            cant_cosine: shot.cant_angle_rad.cos(),
            cant_sine: shot.cant_angle_rad.sin(),
            sight_height_ft: shot.weapon.sight_height_ft,
            muzzle_velocity_fps,
            weight_gr: dm.weight_gr,
            twist_in: shot.weapon.twist_in,
            stability_coefficient,
            calc_step_ft,
            alt0_ft: shot.atmo.altitude_ft(),
            gravity: Vector3::new(0.0, config.gravity_fps2, 0.0),
            minimum_velocity_fps: config.minimum_velocity_fps,
            maximum_drop_ft: config.maximum_drop_ft,
            minimum_altitude_ft: config.minimum_altitude_ft,
            max_integration_steps: config.max_integration_steps,
            dm,
            atmo: Arc::clone(&shot.atmo),
            winds,
        })
    }

    /// Muzzle position: the bore sits one sight height below the sight, rotated by cant.
    pub fn initial_position(&self) -> Vector3<f64> {
        Vector3::new(
            0.0,
            -self.cant_cosine * self.sight_height_ft,
            -self.cant_sine * self.sight_height_ft,
        )
    }

    pub fn initial_velocity(&self) -> Vector3<f64> {
        let elevation = self.barrel_elevation_rad;
        let azimuth = self.barrel_azimuth_rad;
        Vector3::new(
            elevation.cos() * azimuth.cos(),
            elevation.sin(),
            elevation.cos() * azimuth.sin(),
        ) * self.muzzle_velocity_fps
    }

    #[inline]
    pub fn drag_by_mach(&self, mach: f64) -> f64 {
        self.dm.drag_by_mach(mach)
    }

    /// `(density_ratio, speed_of_sound_fps)` at a height relative to the muzzle.
    #[inline]
    pub fn atmosphere_at(&self, height_ft: f64) -> (f64, f64) {
        self.atmo.density_ratio_and_speed_of_sound(self.alt0_ft + height_ft)
    }

    #[inline]
    pub fn wind_at(&self, range_ft: f64) -> Vector3<f64> {
        self.winds.vector_for_range(range_ft)
    }

    pub fn spin_drift(&self, time_s: f64) -> f64 {
        compute_spin_drift(time_s, self.stability_coefficient, self.twist_in)
    }

    /// Drag scale `km` and acceleration for a velocity relative to the air.
    pub fn acceleration(
        &self,
        relative_velocity: &Vector3<f64>,
        density_ratio: f64,
        speed_of_sound_fps: f64,
    ) -> (Vector3<f64>, f64) {
        let relative_speed = relative_velocity.norm();
        let km = density_ratio * self.drag_by_mach(relative_speed / speed_of_sound_fps);
        (self.gravity - relative_velocity * (km * relative_speed), km)
    }

    /// First stop condition met, in priority order.
    pub fn termination(&self, speed_fps: f64, position: &Vector3<f64>) -> Option<TerminationReason> {
        if speed_fps < self.minimum_velocity_fps {
            Some(TerminationReason::MinimumVelocityReached)
        } else if position.y < self.maximum_drop_ft {
            Some(TerminationReason::MaximumDropReached)
        } else if self.alt0_ft + position.y < self.minimum_altitude_ft {
            Some(TerminationReason::MinimumAltitudeReached)
        } else {
            None
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn make_row(
        &self,
        time_s: f64,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        speed_of_sound_fps: f64,
        density_ratio: f64,
        drag: f64,
        flag: TrajFlag,
    ) -> TrajectoryRow {
        create_trajectory_row(
            time_s,
            position,
            velocity,
            velocity.norm() / speed_of_sound_fps,
            self.spin_drift(time_s),
            self.look_angle_rad,
            density_ratio,
            drag,
            self.weight_gr,
            flag,
        )
    }
}

/// Reject ranges and steps an integrator cannot work with.
pub(crate) fn validate_request(
    maximum_range_ft: f64,
    record_step_ft: f64,
    time_step_s: f64,
) -> Result<(), ConfigurationError> {
    if !maximum_range_ft.is_finite() || maximum_range_ft < 0.0 {
        return Err(ConfigurationError::NonPositive {
            name: "maximum_range_ft",
            value: maximum_range_ft,
        });
    }
    if !record_step_ft.is_finite() || record_step_ft <= 0.0 {
        return Err(ConfigurationError::NonPositive {
            name: "record_step_ft",
            value: record_step_ft,
        });
    }
    if !time_step_s.is_finite() || time_step_s < 0.0 {
        return Err(ConfigurationError::NonPositive {
            name: "time_step_s",
            value: time_step_s,
        });
    }
    Ok(())
}

/// Loop condition shared by the integrators: run to the maximum range plus
/// one step, and past it while recording has not yet reached the maximum
/// range (near-vertical shots gain range slowly).
#[inline]
pub(crate) fn keep_integrating(
    range_ft: f64,
    maximum_range_ft: f64,
    step_ft: f64,
    mask: TrajFlag,
    last_recorded_range_ft: f64,
) -> bool {
    range_ft <= maximum_range_ft + step_ft
        || (!mask.is_empty() && last_recorded_range_ft <= maximum_range_ft - RANGE_SLACK_FT)
}
