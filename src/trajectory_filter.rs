//! Decides which integration steps become trajectory rows.

use nalgebra::Vector3;
use tracing::trace;

use crate::trajectory_data::TrajFlag;

/// Per-call recording state.
///
/// Fed every integration step in order. Tracks the next range boundary,
/// which sight-line crossings have already happened, and the previous Mach
/// and vertical velocity so that transitions fire once.
#[derive(Debug, Clone)]
pub struct TrajectoryDataFilter {
    mask: TrajFlag,
    range_step_ft: f64,
    time_step_s: f64,
    look_angle_tan: f64,
    next_range_boundary_ft: f64,
    last_record_time_s: f64,
    previous_mach: f64,
    previous_velocity_y: f64,
    seen_zero_up: bool,
    seen_zero_down: bool,
}

impl TrajectoryDataFilter {
    /// `time_step_s` of zero disables time-based recording.
    pub fn new(
        mask: TrajFlag,
        range_step_ft: f64,
        time_step_s: f64,
        initial_position: &Vector3<f64>,
        barrel_elevation_rad: f64,
        look_angle_rad: f64,
    ) -> Self {
        let mut seen_zero_up = false;
        let mut seen_zero_down = false;
        if initial_position.y >= 0.0 {
            seen_zero_up = true;
        } else if barrel_elevation_rad < look_angle_rad {
            seen_zero_down = true;
        }

        Self {
            mask,
            range_step_ft,
            time_step_s,
            look_angle_tan: look_angle_rad.tan(),
            next_range_boundary_ft: 0.0,
            last_record_time_s: 0.0,
            previous_mach: 0.0,
            previous_velocity_y: 0.0,
            seen_zero_up,
            seen_zero_down,
        }
    }

    /// Flags raised by this step, whether or not the mask requests them.
    pub fn compute_flags(
        &mut self,
        position: &Vector3<f64>,
        velocity_y: f64,
        mach: f64,
        time_s: f64,
    ) -> TrajFlag {
        let mut flags = TrajFlag::NONE;

        if position.x >= self.next_range_boundary_ft {
            flags |= TrajFlag::RANGE;
            self.next_range_boundary_ft += self.range_step_ft;
        }
        if self.time_step_s > 0.0 && time_s - self.last_record_time_s >= self.time_step_s {
            flags |= TrajFlag::RANGE;
        }
        if flags.contains(TrajFlag::RANGE) {
            self.last_record_time_s = time_s;
        }

        if position.x > 0.0 {
            let reference_height = position.x * self.look_angle_tan;
            if !self.seen_zero_up && position.y >= reference_height {
                flags |= TrajFlag::ZERO_UP;
                self.seen_zero_up = true;
            } else if self.seen_zero_up && !self.seen_zero_down && position.y < reference_height {
                flags |= TrajFlag::ZERO_DOWN;
                self.seen_zero_down = true;
            }
        }

        if self.previous_mach > 1.0 && mach <= 1.0 {
            flags |= TrajFlag::MACH;
        }
        self.previous_mach = mach;

        if self.previous_velocity_y > 0.0 && velocity_y <= 0.0 {
            flags |= TrajFlag::APEX;
        }
        self.previous_velocity_y = velocity_y;

        flags
    }

    /// Requested flags for this step, if any; `None` means skip the row.
    pub fn should_record(
        &mut self,
        position: &Vector3<f64>,
        velocity_y: f64,
        mach: f64,
        time_s: f64,
    ) -> Option<TrajFlag> {
        let requested = self.compute_flags(position, velocity_y, mach, time_s) & self.mask;
        if requested.is_empty() {
            None
        } else {
            trace!(flag = %requested, x = position.x, time_s, "recording row");
            Some(requested)
        }
    }
}
