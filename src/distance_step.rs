//! Distance-stepped semi-implicit integrator.
//!
//! Every step advances exactly `calc_step_ft` downrange; the time step
//! follows from the current downrange velocity. Velocity is updated from the
//! forces at the current state, then position moves with the updated
//! velocity.

use nalgebra::Vector3;
use tracing::debug;

use crate::constants::MIN_DIVISION_THRESHOLD;
use crate::engine::{keep_integrating, validate_request, IntegrationEngine, ShotProps};
use crate::error::BallisticsError;
use crate::trajectory_data::{HitResult, TrajFlag};
use crate::trajectory_filter::TrajectoryDataFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceStepEngine;

impl IntegrationEngine for DistanceStepEngine {
    fn name(&self) -> &'static str {
        "distance_step"
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

        let step = props.calc_step_ft;
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
        let mut rows = Vec::new();
        let mut last_recorded_range = 0.0;
        let mut termination = None;
        let mut iterations = 0usize;

        while keep_integrating(position.x, maximum_range_ft, step, mask, last_recorded_range) {
            iterations += 1;
            if iterations > props.max_integration_steps {
                return Err(BallisticsError::StepLimitExceeded {
                    limit: props.max_integration_steps,
                    incomplete_trajectory: rows,
                });
            }

            let wind = props.wind_at(position.x);
            let (density, sound) = props.atmosphere_at(position.y);
            let relative_velocity = velocity - wind;
            let relative_speed = relative_velocity.norm();
            let drag = density * props.drag_by_mach(relative_speed / sound) * relative_speed;
            let mach = velocity.norm() / sound;

            if let Some(flag) = filter.should_record(&position, velocity.y, mach, time) {
                rows.push(props.make_row(time, &position, &velocity, sound, density, drag, flag));
                last_recorded_range = position.x;
            }

            if velocity.x <= 0.0 {
                return Err(BallisticsError::DownrangeStalled {
                    velocity_x_fps: velocity.x,
                    time_s: time,
                    incomplete_trajectory: rows,
                });
            }
            let delta_time = step / velocity.x;

            velocity -= (relative_velocity * drag - props.gravity) * delta_time;
            let delta_range = Vector3::new(step, velocity.y * delta_time, velocity.z * delta_time);
            position += delta_range;

            let speed = velocity.norm();
            time += if speed > MIN_DIVISION_THRESHOLD {
                delta_range.norm() / speed
            } else {
                delta_time
            };

            if let Some(reason) = props.termination(speed, &position) {
                let (density, sound) = props.atmosphere_at(position.y);
                let relative_velocity = velocity - props.wind_at(position.x);
                let relative_speed = relative_velocity.norm();
                let drag = density * props.drag_by_mach(relative_speed / sound) * relative_speed;
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

        debug!(
            engine = self.name(),
            iterations,
            rows = rows.len(),
            step_ft = step,
            "integration finished"
        );
        Ok(HitResult::new(rows, termination, mask == TrajFlag::ALL))
    }
}
