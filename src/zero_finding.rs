//! Zero-angle solver.
//!
//! Repeatedly integrates the shot out to the zero distance and corrects the
//! barrel elevation by the vertical miss at that point until the trajectory
//! crosses the sight line within the configured accuracy.
//!
//! Corrections are Newton steps. The first uses the flat-fire slope of the
//! miss with respect to elevation, `x / cos²(elevation)`; later ones use the
//! secant through the last two accepted trial shots when it agrees in sign and
//! magnitude. A trial that misses by more than the one before it is rejected
//! and the previous correction is halved.

use std::f64::consts::FRAC_PI_2;

use tracing::{debug, warn};

use crate::conditions::Shot;
use crate::config::EngineConfig;
use crate::constants::{APEX_IS_MAX_RANGE_RADIANS, MIN_DIVISION_THRESHOLD, MIN_ZERO_DISTANCE_FT};
use crate::engine::{IntegrationEngine, ShotProps};
use crate::error::{BallisticsError, ConfigurationError};
use crate::trajectory_data::TrajFlag;

/// Bounds on the secant slope relative to the flat-fire slope
const SECANT_SLOPE_RANGE: (f64, f64) = (0.2, 5.0);

#[derive(Debug, Clone, Copy)]
struct Trial {
    elevation: f64,
    vertical_error: f64,
}

/// Barrel elevation (absolute, rad) that puts the trajectory on the sight
/// line `distance_ft` feet away along the line of sight.
///
/// The look angle of `shot` is honoured; its current barrel elevation is
/// ignored. A zero distance returns the look angle without integrating, as
/// does a zero lying less than one integration step downrange of the muzzle.
/// That covers near-vertical look angles, where the apex is the maximum range
/// and the sight line is the answer.
pub fn find_zero_angle(
    engine: &dyn IntegrationEngine,
    shot: &Shot,
    config: &EngineConfig,
    distance_ft: f64,
) -> Result<f64, BallisticsError> {
    if !distance_ft.is_finite() || distance_ft < 0.0 {
        return Err(ConfigurationError::NonPositive {
            name: "zero distance",
            value: distance_ft,
        }
        .into());
    }

    let look_angle = shot.look_angle_rad;
    if distance_ft < MIN_ZERO_DISTANCE_FT {
        return Ok(look_angle);
    }

    // Finer pass than a regular trajectory run
    let calc_step = config.calc_step(0.0) / 2.0;
    let zero_distance = look_angle.cos() * distance_ft;
    if (look_angle.abs() - FRAC_PI_2).abs() < APEX_IS_MAX_RANGE_RADIANS || zero_distance < calc_step {
        debug!(look_angle, zero_distance, "zero lies within one step downrange of the muzzle");
        return Ok(look_angle);
    }

    let mut props = ShotProps::new(shot, config, calc_step)?;
    let height_at_zero = look_angle.sin() * distance_ft;
    // With the boundary half a step short of the zero distance, the single
    // recorded row past it lies within half a step of the zero distance.
    let boundary = (zero_distance - 0.5 * calc_step).max(0.5 * calc_step);
    let look_tan = look_angle.tan();
    let elevation_limit = FRAC_PI_2 - APEX_IS_MAX_RANGE_RADIANS;

    let mut elevation = height_at_zero.atan2(zero_distance);
    let mut vertical_error = f64::INFINITY;
    let mut last_termination = None;
    let mut accepted: Option<Trial> = None;
    let mut correction = 0.0;
    let mut iterations = 0;

    while iterations < config.max_zero_iterations {
        iterations += 1;
        props.barrel_elevation_rad = elevation;
        let hit = engine.integrate(&props, boundary, boundary, TrajFlag::RANGE, 0.0)?;
        last_termination = hit.termination;

        let Some(row) = hit.rows.last() else {
            break;
        };
        let x = row.distance_ft;
        vertical_error = row.height_ft - x * look_tan;
        debug!(
            engine = engine.name(),
            iteration = iterations,
            elevation,
            x,
            vertical_error,
            termination = ?hit.termination,
            "zero finding iteration"
        );

        // A trajectory stopped short of the zero distance only steers the search
        if x >= boundary && vertical_error.abs() <= config.zero_finding_accuracy_ft {
            return Ok(elevation);
        }
        if x <= MIN_DIVISION_THRESHOLD {
            // The trajectory never left the muzzle; no correction can help
            break;
        }

        if let Some(previous) = accepted {
            if vertical_error.abs() >= previous.vertical_error.abs() {
                correction *= 0.5;
                elevation = (previous.elevation - correction).clamp(-elevation_limit, elevation_limit);
                continue;
            }
        }

        let cos_elevation = elevation.cos();
        let flat_fire_slope = x / (cos_elevation * cos_elevation).max(MIN_DIVISION_THRESHOLD);
        let slope = accepted
            .map(|previous| {
                (vertical_error - previous.vertical_error) / (elevation - previous.elevation)
            })
            .filter(|secant| {
                let ratio = secant / flat_fire_slope;
                ratio.is_finite() && ratio >= SECANT_SLOPE_RANGE.0 && ratio <= SECANT_SLOPE_RANGE.1
            })
            .unwrap_or(flat_fire_slope);

        accepted = Some(Trial {
            elevation,
            vertical_error,
        });
        correction = vertical_error / slope;
        elevation = (elevation - correction).clamp(-elevation_limit, elevation_limit);
    }

    warn!(
        distance_ft,
        vertical_error,
        iterations,
        ?last_termination,
        "zero finding did not converge"
    );
    Err(BallisticsError::ZeroFinding {
        vertical_error_ft: vertical_error.abs(),
        iterations,
        last_termination,
    })
}
