use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{ENERGY_DIVISOR, OGW_FACTOR};
use crate::error::{RangeError, TerminationReason};

/// Bit set of notable trajectory events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrajFlag(u8);

impl TrajFlag {
    pub const NONE: TrajFlag = TrajFlag(0);
    pub const ZERO_UP: TrajFlag = TrajFlag(1);
    pub const ZERO_DOWN: TrajFlag = TrajFlag(2);
    pub const ZERO: TrajFlag = TrajFlag(1 | 2);
    pub const MACH: TrajFlag = TrajFlag(4);
    pub const RANGE: TrajFlag = TrajFlag(8);
    pub const APEX: TrajFlag = TrajFlag(16);
    pub const ALL: TrajFlag = TrajFlag(1 | 2 | 4 | 8 | 16);

    const NAMES: [(TrajFlag, &'static str); 5] = [
        (TrajFlag::ZERO_UP, "ZERO_UP"),
        (TrajFlag::ZERO_DOWN, "ZERO_DOWN"),
        (TrajFlag::MACH, "MACH"),
        (TrajFlag::RANGE, "RANGE"),
        (TrajFlag::APEX, "APEX"),
    ];

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        TrajFlag(bits & TrajFlag::ALL.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if any bit of `other` is set in `self`.
    pub const fn intersects(self, other: TrajFlag) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: TrajFlag) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TrajFlag {
    type Output = TrajFlag;

    fn bitor(self, rhs: TrajFlag) -> TrajFlag {
        TrajFlag(self.0 | rhs.0)
    }
}

impl BitOrAssign for TrajFlag {
    fn bitor_assign(&mut self, rhs: TrajFlag) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TrajFlag {
    type Output = TrajFlag;

    fn bitand(self, rhs: TrajFlag) -> TrajFlag {
        TrajFlag(self.0 & rhs.0)
    }
}

impl fmt::Display for TrajFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names: Vec<&str> = TrajFlag::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

/// One recorded trajectory sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryRow {
    pub time_s: f64,
    /// Downrange distance (x), ft
    pub distance_ft: f64,
    /// Distance along the line of sight, ft
    pub look_distance_ft: f64,
    pub velocity_fps: f64,
    /// Velocity over local speed of sound
    pub mach: f64,
    /// Height relative to the bore line origin (y), ft
    pub height_ft: f64,
    /// Height above (+) or below (-) the line of sight, ft
    pub target_drop_ft: f64,
    pub drop_adj_rad: f64,
    /// Lateral offset including spin drift, ft
    pub windage_ft: f64,
    pub windage_adj_rad: f64,
    /// Trajectory angle to horizontal
    pub angle_rad: f64,
    pub density_ratio: f64,
    pub drag: f64,
    pub energy_ftlb: f64,
    /// Optimal game weight, lb
    pub ogw_lb: f64,
    pub flag: TrajFlag,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// Angle subtended by `offset` at `distance`; 0 at the muzzle.
pub fn get_correction(distance: f64, offset: f64) -> f64 {
    if distance != 0.0 {
        (offset / distance).atan()
    } else {
        0.0
    }
}

/// Kinetic energy in ft·lbf
pub fn calculate_energy(weight_gr: f64, velocity_fps: f64) -> f64 {
    weight_gr * velocity_fps.powi(2) / ENERGY_DIVISOR
}

/// Optimal game weight in pounds
pub fn calculate_ogw(weight_gr: f64, velocity_fps: f64) -> f64 {
    weight_gr.powi(2) * velocity_fps.powi(3) * OGW_FACTOR
}

/// Build a row from the raw integration state.
#[allow(clippy::too_many_arguments)]
pub fn create_trajectory_row(
    time_s: f64,
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    mach: f64,
    spin_drift_ft: f64,
    look_angle_rad: f64,
    density_ratio: f64,
    drag: f64,
    weight_gr: f64,
    flag: TrajFlag,
) -> TrajectoryRow {
    let speed = velocity.norm();
    let reference_height = position.x * look_angle_rad.tan();
    let target_drop = position.y - reference_height;
    let windage = position.z + spin_drift_ft;
    let angle = if velocity.x != 0.0 {
        (velocity.y / velocity.x).atan()
    } else {
        velocity.y.atan2(velocity.x)
    };

    TrajectoryRow {
        time_s,
        distance_ft: position.x,
        look_distance_ft: position.x / look_angle_rad.cos(),
        velocity_fps: speed,
        mach,
        height_ft: position.y,
        target_drop_ft: target_drop,
        drop_adj_rad: get_correction(position.x, target_drop),
        windage_ft: windage,
        windage_adj_rad: get_correction(position.x, windage),
        angle_rad: angle,
        density_ratio,
        drag,
        energy_ftlb: calculate_energy(weight_gr, speed),
        ogw_lb: calculate_ogw(weight_gr, speed),
        flag,
        position: *position,
        velocity: *velocity,
    }
}

/// Outcome of one integration call.
#[derive(Debug, Clone, Serialize)]
pub struct HitResult {
    pub rows: Vec<TrajectoryRow>,
    /// Set when a stop condition ended the run early
    pub termination: Option<TerminationReason>,
    /// True when every flag kind was requested
    pub extra: bool,
}

impl HitResult {
    pub fn new(rows: Vec<TrajectoryRow>, termination: Option<TerminationReason>, extra: bool) -> Self {
        Self {
            rows,
            termination,
            extra,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.termination.is_none()
    }

    /// Rows on success; the partial rows wrapped in a [`RangeError`] on early termination.
    pub fn into_result(self) -> Result<Vec<TrajectoryRow>, RangeError> {
        match self.termination {
            None => Ok(self.rows),
            Some(reason) => Err(RangeError {
                reason,
                incomplete_trajectory: self.rows,
            }),
        }
    }

    /// First row carrying any bit of `flag`.
    pub fn flag(&self, flag: TrajFlag) -> Option<&TrajectoryRow> {
        self.rows.iter().find(|row| row.flag.intersects(flag))
    }

    pub fn zeros(&self) -> Vec<&TrajectoryRow> {
        self.rows
            .iter()
            .filter(|row| row.flag.intersects(TrajFlag::ZERO))
            .collect()
    }

    /// Row nearest to a downrange distance.
    pub fn get_at_distance(&self, distance_ft: f64) -> Option<&TrajectoryRow> {
        closest_row_index(&self.rows, distance_ft).map(|index| &self.rows[index])
    }
}

/// Binary search over rows ordered by non-decreasing distance.
fn closest_row_index(rows: &[TrajectoryRow], target_distance: f64) -> Option<usize> {
    if rows.is_empty() {
        return None;
    }

    let left = rows.partition_point(|row| row.distance_ft < target_distance);
    let mut best = left.min(rows.len() - 1);
    if left > 0 {
        let below = (rows[left - 1].distance_ft - target_distance).abs();
        let above = (rows[best].distance_ft - target_distance).abs();
        if below < above {
            best = left - 1;
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_at(x: f64, flag: TrajFlag) -> TrajectoryRow {
        create_trajectory_row(
            x / 2500.0,
            &Vector3::new(x, -0.1 * x, 0.0),
            &Vector3::new(2500.0, -10.0, 0.0),
            2.2,
            0.0,
            0.0,
            1.0,
            0.0,
            168.0,
            flag,
        )
    }

    #[test]
    fn test_flag_operations() {
        let flags = TrajFlag::ZERO_UP | TrajFlag::RANGE;
        assert!(flags.intersects(TrajFlag::ZERO));
        assert!(!flags.intersects(TrajFlag::MACH));
        assert!(TrajFlag::ALL.contains(flags));
        assert_eq!((flags & TrajFlag::RANGE), TrajFlag::RANGE);
        assert_eq!(TrajFlag::ALL.bits(), 31);
        assert_eq!(TrajFlag::from_bits(0xff), TrajFlag::ALL);
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(TrajFlag::NONE.to_string(), "NONE");
        assert_eq!((TrajFlag::ZERO_DOWN | TrajFlag::RANGE).to_string(), "ZERO_DOWN|RANGE");
        assert_eq!(
            serde_json::to_string(&(TrajFlag::MACH | TrajFlag::RANGE)).unwrap(),
            "12"
        );
    }

    #[test]
    fn test_get_correction() {
        assert_eq!(get_correction(0.0, 5.0), 0.0);
        assert!((get_correction(100.0, 100.0) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_energy_and_ogw() {
        // 168 gr at 2750 ft/s is about 2821 ft·lbf
        let energy = calculate_energy(168.0, 2750.0);
        assert!((energy - 2821.0).abs() < 1.0, "energy {energy}");
        let ogw = calculate_ogw(168.0, 2750.0);
        assert!((ogw - 168.0f64.powi(2) * 2750.0f64.powi(3) * 1.5e-12).abs() < 1e-9);
    }

    #[test]
    fn test_row_derived_fields() {
        let look = 0.1f64;
        let position = Vector3::new(300.0, 20.0, -1.5);
        let velocity = Vector3::new(2000.0, 100.0, 0.0);
        let row = create_trajectory_row(0.2, &position, &velocity, 1.8, 0.5, look, 0.97, 0.02, 150.0, TrajFlag::RANGE);

        let reference = 300.0 * look.tan();
        assert!((row.target_drop_ft - (20.0 - reference)).abs() < 1e-12);
        assert!((row.windage_ft - (-1.0)).abs() < 1e-12);
        assert!((row.drop_adj_rad - ((20.0 - reference) / 300.0).atan()).abs() < 1e-12);
        assert!((row.angle_rad - (100.0f64 / 2000.0).atan()).abs() < 1e-12);
        assert!((row.velocity_fps - velocity.norm()).abs() < 1e-12);
        assert!((row.look_distance_ft - 300.0 / look.cos()).abs() < 1e-9);
        assert_eq!(row.flag, TrajFlag::RANGE);
    }

    #[test]
    fn test_row_angle_for_vertical_velocity() {
        let row = create_trajectory_row(
            1.0,
            &Vector3::new(0.0, 100.0, 0.0),
            &Vector3::new(0.0, 50.0, 0.0),
            0.05,
            0.0,
            0.0,
            1.0,
            0.0,
            100.0,
            TrajFlag::APEX,
        );
        assert!((row.angle_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(row.drop_adj_rad, 0.0);
    }

    #[test]
    fn test_hit_result_lookup() {
        let result = HitResult::new(
            vec![
                row_at(0.0, TrajFlag::RANGE),
                row_at(300.0, TrajFlag::RANGE | TrajFlag::ZERO_DOWN),
                row_at(600.0, TrajFlag::RANGE),
            ],
            None,
            false,
        );
        assert_eq!(result.get_at_distance(100.0).unwrap().distance_ft, 0.0);
        assert_eq!(result.get_at_distance(200.0).unwrap().distance_ft, 300.0);
        assert_eq!(result.get_at_distance(5000.0).unwrap().distance_ft, 600.0);
        assert_eq!(result.flag(TrajFlag::ZERO).unwrap().distance_ft, 300.0);
        assert_eq!(result.zeros().len(), 1);
        assert!(result.flag(TrajFlag::MACH).is_none());
        assert_eq!(result.into_result().unwrap().len(), 3);
    }

    #[test]
    fn test_hit_result_into_range_error() {
        let result = HitResult::new(
            vec![row_at(0.0, TrajFlag::RANGE), row_at(40.0, TrajFlag::NONE)],
            Some(TerminationReason::MinimumVelocityReached),
            false,
        );
        assert!(!result.is_complete());
        let err = result.into_result().unwrap_err();
        assert_eq!(err.reason, TerminationReason::MinimumVelocityReached);
        assert_eq!(err.last_distance_ft(), Some(40.0));
    }
}
