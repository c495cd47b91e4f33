use std::fmt;

use tracing::info;

use crate::conditions::Shot;
use crate::config::EngineConfig;
use crate::engine::{EngineKind, IntegrationEngine, ShotProps};
use crate::error::BallisticsError;
use crate::trajectory_data::{HitResult, TrajFlag};
use crate::zero_finding::find_zero_angle;

/// Front end tying an integration engine to an engine configuration.
pub struct Calculator {
    config: EngineConfig,
    engine: Box<dyn IntegrationEngine>,
}

impl Calculator {
    pub fn new(config: EngineConfig, kind: EngineKind) -> Result<Self, BallisticsError> {
        Self::with_engine(config, kind.engine())
    }

    pub fn with_engine(config: EngineConfig, engine: Box<dyn IntegrationEngine>) -> Result<Self, BallisticsError> {
        config.validate()?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Run `shot` out to `trajectory_range_ft`.
    ///
    /// Rows are recorded every `trajectory_step_ft` (the whole range when
    /// zero) and, if `time_step_s` is positive, at least that often in time.
    /// `extra_data` switches to the chart resolution and records every flag.
    /// Early termination is reported through [`HitResult::termination`].
    pub fn fire(
        &self,
        shot: &Shot,
        trajectory_range_ft: f64,
        trajectory_step_ft: f64,
        extra_data: bool,
        time_step_s: f64,
    ) -> Result<HitResult, BallisticsError> {
        let (record_step, mask) = if extra_data {
            (self.config.chart_resolution_ft, TrajFlag::ALL)
        } else if trajectory_step_ft > 0.0 {
            (trajectory_step_ft, TrajFlag::RANGE)
        } else {
            (trajectory_range_ft, TrajFlag::RANGE)
        };
        self.integrate(shot, trajectory_range_ft, record_step, mask, time_step_s)
    }

    /// Integrate with an explicit record step and flag mask.
    pub fn integrate(
        &self,
        shot: &Shot,
        maximum_range_ft: f64,
        record_step_ft: f64,
        mask: TrajFlag,
        time_step_s: f64,
    ) -> Result<HitResult, BallisticsError> {
        let props = ShotProps::new(shot, &self.config, self.config.calc_step(record_step_ft))?;
        self.engine
            .integrate(&props, maximum_range_ft, record_step_ft, mask, time_step_s)
    }

    /// Absolute barrel elevation that zeroes `shot` at `distance_ft` along
    /// the line of sight.
    pub fn zero_angle(&self, shot: &Shot, distance_ft: f64) -> Result<f64, BallisticsError> {
        find_zero_angle(self.engine.as_ref(), shot, &self.config, distance_ft)
    }

    /// Zero the weapon at `distance_ft`: the shot's barrel elevation and the
    /// weapon's stored zero are both updated. Returns the zero elevation
    /// relative to the line of sight.
    pub fn set_weapon_zero(&self, shot: &mut Shot, distance_ft: f64) -> Result<f64, BallisticsError> {
        let elevation = self.zero_angle(shot, distance_ft)?;
        shot.barrel_elevation_rad = elevation;
        shot.weapon.zero_elevation_rad = elevation - shot.look_angle_rad;
        info!(
            engine = self.engine.name(),
            distance_ft,
            zero_elevation_rad = shot.weapon.zero_elevation_rad,
            "weapon zeroed"
        );
        Ok(shot.weapon.zero_elevation_rad)
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            engine: EngineKind::default().engine(),
        }
    }
}

impl fmt::Debug for Calculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calculator")
            .field("config", &self.config)
            .field("engine", &self.engine.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::rifle_shot;
    use crate::error::TerminationReason;

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            max_calc_step_size_ft: 0.0,
            ..EngineConfig::default()
        };
        assert!(Calculator::new(config, EngineKind::DistanceStep).is_err());
    }

    #[test]
    fn test_fire_records_requested_steps() {
        let calc = Calculator::default();
        let hit = calc.fire(&rifle_shot(), 3000.0, 300.0, false, 0.0).unwrap();
        assert_eq!(hit.rows.len(), 11);
        assert!(!hit.extra);
        assert!(hit.rows.iter().all(|row| row.flag == TrajFlag::RANGE));
    }

    #[test]
    fn test_fire_without_step_records_ends() {
        let calc = Calculator::default();
        let hit = calc.fire(&rifle_shot(), 1500.0, 0.0, false, 0.0).unwrap();
        assert_eq!(hit.rows.len(), 2);
        assert!(hit.rows[1].distance_ft >= 1500.0);
    }

    #[test]
    fn test_set_weapon_zero_crosses_sight_line_at_zero_distance() {
        let calc = Calculator::new(EngineConfig::default(), EngineKind::DistanceStep).unwrap();
        let mut shot = rifle_shot();
        let zero = calc.set_weapon_zero(&mut shot, 300.0).unwrap();
        assert!(zero > 0.0);
        assert_eq!(shot.barrel_elevation_rad, zero);

        let hit = calc.fire(&shot, 600.0, 0.0, true, 0.0).unwrap();
        assert!(hit.extra);
        let up = hit.flag(TrajFlag::ZERO_UP).expect("upward crossing");
        let down = hit.flag(TrajFlag::ZERO_DOWN).expect("downward crossing");
        assert!(up.distance_ft < down.distance_ft);
        assert!((down.distance_ft - 300.0).abs() < 1.0, "zero at {} ft", down.distance_ft);
        assert_eq!(hit.zeros().len(), 2);
    }

    #[test]
    fn test_zero_survives_look_angle_change() {
        let calc = Calculator::new(EngineConfig::default(), EngineKind::LeapFrog).unwrap();
        let look = 0.1;
        let mut shot = rifle_shot().with_look_angle(look);
        let zero = calc.set_weapon_zero(&mut shot, 600.0).unwrap();
        assert!((shot.barrel_elevation_rad - (look + zero)).abs() < 1e-15);
        assert!((shot.relative_elevation_rad() - zero).abs() < 1e-15);
    }

    #[test]
    fn test_early_termination_is_not_an_error() {
        let config = EngineConfig {
            minimum_velocity_fps: 2000.0,
            ..EngineConfig::default()
        };
        let calc = Calculator::new(config, EngineKind::DistanceStep).unwrap();
        let hit = calc.fire(&rifle_shot(), 6000.0, 300.0, false, 0.0).unwrap();
        assert_eq!(hit.termination, Some(TerminationReason::MinimumVelocityReached));
        assert!(hit.rows.last().unwrap().distance_ft < 6000.0);
    }
}
