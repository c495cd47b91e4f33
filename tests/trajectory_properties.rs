// End-to-end properties of the trajectory engine, exercised through the public API.

use std::f64::consts::FRAC_PI_2;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ballistics_trajectory::{
    find_zero_angle, Ammo, BallisticsError, Calculator, ConstantAtmosphere, DistanceStepEngine,
    DragCurve, DragModel, DragTablePoint, EngineConfig, EngineKind, HitResult, IntegrationEngine,
    LeapFrogEngine, Shot, ShotProps, StandardDragTable, TerminationReason, TrajFlag, Weapon,
};

fn rifle_shot() -> Shot {
    let dm = DragModel::standard(0.223, StandardDragTable::G7)
        .unwrap()
        .with_dimensions(168.0, 0.308, 1.282);
    Shot::new(Weapon::new(2.0 / 12.0, 10.0), Ammo::new(dm, 2750.0))
}

fn flat(shot: Shot) -> Shot {
    shot.with_atmosphere(Arc::new(ConstantAtmosphere::new(1.0, 1116.45)))
}

fn vacuum_shot(velocity_fps: f64, elevation_rad: f64) -> Shot {
    let table = [DragTablePoint::new(0.0, 0.0), DragTablePoint::new(5.0, 0.0)];
    let dm = DragModel::from_table(1.0, &table).unwrap();
    flat(Shot::new(Weapon::new(0.0, 0.0), Ammo::new(dm, velocity_fps))).with_barrel_elevation(elevation_rad)
}

/// Delegates to another engine, counting `integrate` calls.
struct CountingEngine<E> {
    inner: E,
    calls: Arc<AtomicUsize>,
}

impl<E: IntegrationEngine> IntegrationEngine for CountingEngine<E> {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn integrate(
        &self,
        props: &ShotProps,
        maximum_range_ft: f64,
        record_step_ft: f64,
        mask: TrajFlag,
        time_step_s: f64,
    ) -> Result<HitResult, BallisticsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .integrate(props, maximum_range_ft, record_step_ft, mask, time_step_s)
    }
}

fn five_point_table() -> Vec<DragTablePoint> {
    vec![
        DragTablePoint::new(0.0, 0.2),
        DragTablePoint::new(0.8, 0.21),
        DragTablePoint::new(1.0, 0.4),
        DragTablePoint::new(1.4, 0.36),
        DragTablePoint::new(3.0, 0.25),
    ]
}

#[test]
fn test_drag_curve_is_continuous_at_breakpoints() {
    let table = five_point_table();
    let curve = DragCurve::new(&table).unwrap();
    let segments = curve.segments();
    for k in 1..table.len() {
        let mach = table[k].mach;
        let left = segments[k - 1].evaluate(mach);
        let right = segments[k].evaluate(mach);
        assert!(
            (left - right).abs() <= 1e-9 * right.abs().max(1.0),
            "breakpoint {k}: {left} vs {right}"
        );
    }
}

#[test]
fn test_drag_curve_reproduces_stored_values() {
    let table = five_point_table();
    let curve = DragCurve::new(&table).unwrap();
    for point in &table {
        let cd = curve.drag_coefficient(point.mach);
        assert!((cd - point.cd).abs() < 1e-12, "Mach {}: {cd} vs {}", point.mach, point.cd);
    }
}

#[test]
fn test_downrange_distance_never_decreases() {
    for max_step in [0.1, 0.25, 0.5] {
        let config = EngineConfig {
            max_calc_step_size_ft: max_step,
            ..EngineConfig::default()
        };
        let calc = Calculator::new(config, EngineKind::DistanceStep).unwrap();
        let shot = rifle_shot().with_barrel_elevation(0.05);
        let hit = calc.integrate(&shot, 4000.0, 1.0, TrajFlag::ALL, 0.0).unwrap();
        assert!(hit.rows.len() > 4000);
        for pair in hit.rows.windows(2) {
            assert!(pair[1].distance_ft >= pair[0].distance_ft, "step {max_step}");
            assert!(pair[1].time_s >= pair[0].time_s, "step {max_step}");
        }
    }
}

#[test]
fn test_leapfrog_conserves_energy_in_vacuum() {
    let config = EngineConfig {
        minimum_velocity_fps: 0.0,
        maximum_drop_ft: -1e9,
        minimum_altitude_ft: -1e9,
        ..EngineConfig::default()
    };
    let engine = LeapFrogEngine::with_time_step(1e-3).unwrap();
    let calc = Calculator::with_engine(config.clone(), Box::new(engine)).unwrap();
    let shot = vacuum_shot(1200.0, 0.4);
    // 12,000 ft at about 1105 ft/s downrange is nearly 11,000 steps
    let hit = calc.integrate(&shot, 12000.0, 250.0, TrajFlag::RANGE, 0.0).unwrap();
    assert!(hit.is_complete());
    assert!(hit.rows.last().unwrap().time_s > 10.0);

    let initial = 0.5 * 1200.0f64.powi(2);
    for row in &hit.rows {
        let energy = 0.5 * row.velocity.norm_squared() - config.gravity_fps2 * row.position.y;
        let relative_error = ((energy - initial) / initial).abs();
        assert!(relative_error < 1e-3, "{relative_error} at {} ft", row.distance_ft);
    }
}

#[test]
fn test_range_error_only_when_a_stop_condition_holds() {
    for kind in [EngineKind::DistanceStep, EngineKind::LeapFrog] {
        let calc = Calculator::new(EngineConfig::default(), kind).unwrap();
        let complete = calc.fire(&rifle_shot(), 3000.0, 300.0, false, 0.0).unwrap();
        assert!(complete.is_complete());
        assert!(complete.into_result().is_ok());

        let config = EngineConfig {
            minimum_velocity_fps: 2200.0,
            ..EngineConfig::default()
        };
        let calc = Calculator::new(config, kind).unwrap();
        let hit = calc.fire(&rifle_shot(), 3000.0, 300.0, false, 0.0).unwrap();
        let last = hit.rows.last().unwrap().clone();
        assert!(last.velocity_fps < 2200.0, "{kind}: last velocity {}", last.velocity_fps);

        let err = hit.into_result().unwrap_err();
        assert_eq!(err.reason, TerminationReason::MinimumVelocityReached);
        let minimum_rows = if kind == EngineKind::LeapFrog { 2 } else { 1 };
        assert!(err.incomplete_trajectory.len() >= minimum_rows);
        assert_eq!(err.incomplete_trajectory.last(), Some(&last));
    }
}

#[test]
fn test_time_step_records_steep_shot_between_range_boundaries() {
    for kind in [EngineKind::DistanceStep, EngineKind::LeapFrog] {
        let calc = Calculator::new(EngineConfig::default(), kind).unwrap();
        let shot = rifle_shot().with_look_angle(1.5).with_barrel_elevation(1.5);
        let hit = calc.integrate(&shot, 1000.0, 100.0, TrajFlag::RANGE, 1.0).unwrap();
        let last = hit.rows.last().unwrap();
        assert!(
            hit.termination.is_some() || last.distance_ft >= 1000.0 - 1e-6,
            "{kind}: stopped at {} ft without a reason",
            last.distance_ft
        );

        // Downrange speed starts under 200 ft/s and keeps falling, so later
        // 100 ft boundaries are more than a second apart
        let off_boundary = hit
            .rows
            .iter()
            .filter(|row| {
                let nearest = (row.distance_ft / 100.0).round() * 100.0;
                (row.distance_ft - nearest).abs() > 1.0
            })
            .count();
        assert!(off_boundary > 0, "{kind}: no time-step rows");
        assert!(hit.rows.len() > 11, "{kind}: {} rows", hit.rows.len());

        for pair in hit.rows.windows(2) {
            let gap = pair[1].time_s - pair[0].time_s;
            assert!(gap > 0.0 && gap <= 1.05, "{kind}: {gap} s between rows at {} ft", pair[0].distance_ft);
        }
    }
}

#[test]
fn test_minimum_altitude_stops_a_downhill_shot() {
    let config = EngineConfig {
        minimum_altitude_ft: -50.0,
        ..EngineConfig::default()
    };
    let calc = Calculator::new(config, EngineKind::DistanceStep).unwrap();
    let shot = rifle_shot().with_look_angle(-0.1);
    let hit = calc.fire(&shot, 3000.0, 100.0, false, 0.0).unwrap();
    assert_eq!(hit.termination, Some(TerminationReason::MinimumAltitudeReached));
    assert!(hit.rows.last().unwrap().height_ft < -50.0);
}

#[test]
fn test_zero_crossings_are_ordered_and_unique() {
    for kind in [EngineKind::DistanceStep, EngineKind::LeapFrog] {
        let calc = Calculator::new(EngineConfig::default(), kind).unwrap();
        let mut shot = rifle_shot();
        calc.set_weapon_zero(&mut shot, 900.0).unwrap();
        let hit = calc.fire(&shot, 1800.0, 0.0, true, 0.0).unwrap();

        let ups: Vec<usize> = hit
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.flag.contains(TrajFlag::ZERO_UP))
            .map(|(i, _)| i)
            .collect();
        let downs: Vec<usize> = hit
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.flag.contains(TrajFlag::ZERO_DOWN))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(ups.len(), 1, "{kind}");
        assert_eq!(downs.len(), 1, "{kind}");
        assert!(ups[0] < downs[0], "{kind}");

        let down = &hit.rows[downs[0]];
        assert!((down.distance_ft - 900.0).abs() < 1.0, "{kind}: zero at {}", down.distance_ft);
        let apex = hit.flag(TrajFlag::APEX).expect("apex row");
        assert!(apex.distance_ft > hit.rows[ups[0]].distance_ft && apex.distance_ft < down.distance_ft);
    }
}

#[test]
fn test_mach_flag_marks_transonic_crossing() {
    let calc = Calculator::default();
    let shot = rifle_shot().with_barrel_elevation(0.02);
    let hit = calc.fire(&shot, 5000.0, 0.0, true, 0.0).unwrap();
    let index = hit
        .rows
        .iter()
        .position(|row| row.flag.contains(TrajFlag::MACH))
        .expect("mach crossing");
    assert!(hit.rows[index].mach <= 1.0);
    assert!(hit.rows[index - 1].mach > 1.0);
}

#[test]
fn test_zero_at_300_ft_in_flat_atmosphere() {
    let config = EngineConfig::default();
    for engine in [
        Box::new(DistanceStepEngine) as Box<dyn IntegrationEngine>,
        Box::new(LeapFrogEngine::new()),
    ] {
        let shot = flat(rifle_shot());
        let elevation = find_zero_angle(engine.as_ref(), &shot, &config, 300.0).unwrap();

        // Re-run the trial shot the solver converged on
        let calc_step = config.calc_step(0.0) / 2.0;
        let mut props = ShotProps::new(&shot, &config, calc_step).unwrap();
        props.barrel_elevation_rad = elevation;
        let boundary = 300.0 - 0.5 * calc_step;
        let hit = engine
            .integrate(&props, boundary, boundary, TrajFlag::RANGE, 0.0)
            .unwrap();
        let row = hit.rows.last().unwrap();
        assert!((row.distance_ft - 300.0).abs() < 0.5 * calc_step + 1e-9);
        assert!(
            row.height_ft.abs() <= config.zero_finding_accuracy_ft,
            "{}: height {} at {} ft",
            engine.name(),
            row.height_ft,
            row.distance_ft
        );
    }
}

#[test]
fn test_zero_distance_zero_skips_integration() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = CountingEngine {
        inner: DistanceStepEngine,
        calls: Arc::clone(&calls),
    };
    let calc = Calculator::with_engine(EngineConfig::default(), Box::new(engine)).unwrap();
    let shot = rifle_shot().with_look_angle(0.05);
    assert_eq!(calc.zero_angle(&shot, 0.0).unwrap(), 0.05);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    calc.zero_angle(&shot, 300.0).unwrap();
    let trials = calls.load(Ordering::SeqCst);
    assert!(trials >= 1 && trials <= 20, "{trials} integrations");
}

#[test]
fn test_vertical_look_angle_returns_vertical() {
    let calc = Calculator::default();
    let mut shot = rifle_shot().with_look_angle(FRAC_PI_2);
    let zero = calc.set_weapon_zero(&mut shot, 3000.0).unwrap();
    assert!(zero.abs() < 0.0003);
    assert!((shot.barrel_elevation_rad - FRAC_PI_2).abs() < 0.0003);
}

#[test]
fn test_vacuum_range_matches_closed_form() {
    let elevation = 0.3f64;
    let velocity = 1000.0;
    let calc = Calculator::default();
    let hit = calc
        .integrate(&vacuum_shot(velocity, elevation), 30000.0, 1.0, TrajFlag::ZERO_DOWN, 0.0)
        .unwrap();
    let landing = hit.flag(TrajFlag::ZERO_DOWN).expect("lands on the sight line");
    let expected = velocity * velocity * (2.0 * elevation).sin() / -EngineConfig::default().gravity_fps2;
    assert!(
        (landing.distance_ft - expected).abs() / expected < 1e-3,
        "{} vs {expected}",
        landing.distance_ft
    );
}
