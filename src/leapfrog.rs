//! Fixed-time-step leapfrog integrator.
//!
//! Velocity is kicked half a step ahead of position at the start, then each
//! iteration drifts position a full step, re-evaluates the forces at the new
//! position and kicks velocity a full step. Keeping the updates staggered is
//! what makes the scheme symplectic.

use tracing::debug;

use crate::engine::{keep_integrating, validate_request, IntegrationEngine, ShotProps};
use crate::error::{BallisticsError, ConfigurationError};
use crate::trajectory_data::{HitResult, TrajFlag};
use crate::trajectory_filter::TrajectoryDataFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct LeapFrogEngine {
    time_step_s: Option<f64>,
}

impl LeapFrogEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed integration time step instead of deriving one from the
    /// calculation step and the initial relative speed.
    pub fn with_time_step(time_step_s: f64) -> Result<Self, ConfigurationError> {
        if !time_step_s.is_finite() || time_step_s <= 0.0 {
            return Err(ConfigurationError::NonPositive {
                name: "integration time step",
                value: time_step_s,
            });
        }
        Ok(Self {
            time_step_s: Some(time_step_s),
        })
    }
}

impl IntegrationEngine for LeapFrogEngine {
    fn name(&self) -> &'static str {
        "leapfrog"
    }

    fn integrate(
        &self,
        props: &ShotProps,
        maximum_range_ft: f64,
        record_step_ft: f64,
        mask: TrajFlag,
        time_step_s: f64,
    ) -> Result<HitResult, BallisticsError> {
        validate_request(maximum_range_ft, record_step_ft, time_step_s)?;

        let min_step = props.calc_step_ft.min(record_step_ft);
        let mut position = props.initial_position();
        let mut velocity = props.initial_velocity();
        let mut time = 0.0;

        let mut filter = TrajectoryDataFilter::new(
            mask,
            record_step_ft,
            time_step_s,
            &position,
            props.barrel_elevation_rad,
            props.look_angle_rad,
        );

        let (mut density, mut sound) = props.atmosphere_at(position.y);
        let relative_velocity = velocity - props.wind_at(position.x);
        let initial_relative_speed = relative_velocity.norm();
        let delta_time = self
            .time_step_s
            .unwrap_or(props.calc_step_ft / initial_relative_speed.max(1.0));

        let (acceleration, km) = props.acceleration(&relative_velocity, density, sound);
        let mut drag = km * initial_relative_speed;
        let initial_row = props.make_row(time, &position, &velocity, sound, density, drag, TrajFlag::NONE);
        velocity += acceleration * (delta_time * 0.5);

        let mut rows = Vec::new();
        let mut last_recorded_range = 0.0;
        let mut termination = None;
        let mut iterations = 0usize;

        while keep_integrating(position.x, maximum_range_ft, min_step, mask, last_recorded_range) {
            iterations += 1;
            if iterations > props.max_integration_steps {
                return Err(BallisticsError::StepLimitExceeded {
                    limit: props.max_integration_steps,
                    incomplete_trajectory: rows,
                });
            }

            let mach = velocity.norm() / sound;
            if let Some(flag) = filter.should_record(&position, velocity.y, mach, time) {
                rows.push(props.make_row(time, &position, &velocity, sound, density, drag, flag));
                last_recorded_range = position.x;
            }

            // Drift
            position += velocity * delta_time;

            (density, sound) = props.atmosphere_at(position.y);
            let relative_velocity = velocity - props.wind_at(position.x);
            let (acceleration, km) = props.acceleration(&relative_velocity, density, sound);
            drag = km * relative_velocity.norm();

            // Kick
            velocity += acceleration * delta_time;
            time += delta_time;

            let speed = velocity.norm();
            if let Some(reason) = props.termination(speed, &position) {
                rows.push(props.make_row(time, &position, &velocity, sound, density, drag, TrajFlag::NONE));
                debug!(
                    engine = self.name(),
                    %reason,
                    x = position.x,
                    y = position.y,
                    time_s = time,
                    "trajectory terminated early"
                );
                termination = Some(reason);
                break;
            }
        }

        if rows.len() < 2 {
            if rows.first().map_or(true, |row| row.time_s > 0.0) {
                rows.insert(0, initial_row);
            }
            if rows.len() < 2 {
                rows.push(props.make_row(time, &position, &velocity, sound, density, drag, TrajFlag::NONE));
            }
        }

        debug!(
            engine = self.name(),
            iterations,
            rows = rows.len(),
            dt = delta_time,
            "integration finished"
        );
        Ok(HitResult::new(rows, termination, mask == TrajFlag::ALL))
    }
}
