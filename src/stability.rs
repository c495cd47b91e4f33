use crate::constants::{
    INCHES_PER_FOOT, MILLER_CONSTANT, MILLER_REFERENCE_VELOCITY_FPS,
    SPIN_DRIFT_COEFFICIENT, SPIN_DRIFT_STABILITY_OFFSET, SPIN_DRIFT_TIME_EXPONENT,
    STANDARD_PRESSURE_INHG, STANDARD_TEMPERATURE_F,
};

/// Calculate the gyroscopic stability coefficient (Sg) for the bullet.
///
/// Uses the Miller stability formula with velocity and atmospheric
/// corrections. An Sg above 1.5 is generally considered adequately stable.
///
/// # Arguments
/// * `weight_gr` - Bullet weight in grains
/// * `diameter_in` - Bullet diameter in inches
/// * `length_in` - Bullet length in inches
/// * `twist_in` - Barrel twist, inches per turn (sign gives direction)
/// * `muzzle_velocity_fps` - Muzzle velocity
/// * `temperature_f`, `pressure_inhg` - Conditions at the shooter
///
/// # Returns
/// * Stability coefficient, or 0 when twist or bullet dimensions are unknown
pub fn compute_stability_coefficient(
    weight_gr: f64,
    diameter_in: f64,
    length_in: f64,
    twist_in: f64,
    muzzle_velocity_fps: f64,
    temperature_f: f64,
    pressure_inhg: f64,
) -> f64 {
    if twist_in == 0.0 || length_in == 0.0 || diameter_in == 0.0 || pressure_inhg <= 0.0 {
        return 0.0;
    }

    let twist_calibers = twist_in.abs() / diameter_in;
    let length_calibers = length_in / diameter_in;

    let geom_term = twist_calibers.powi(2)
        * diameter_in.powi(3)
        * length_calibers
        * (1.0 + length_calibers.powi(2));
    if geom_term == 0.0 {
        return 0.0;
    }
    let sd = MILLER_CONSTANT * weight_gr / geom_term;

    let fv = (muzzle_velocity_fps / MILLER_REFERENCE_VELOCITY_FPS).powf(1.0 / 3.0);

    // Ratio of standard to current air density
    let ftp = ((temperature_f + 460.0) / (STANDARD_TEMPERATURE_F + 460.0))
        * (STANDARD_PRESSURE_INHG / pressure_inhg);

    sd * fv * ftp
}

/// Spin drift in feet after `time_s` seconds of flight (Litz approximation).
///
/// Positive twist drifts right (+z), negative twist drifts left.
pub fn compute_spin_drift(time_s: f64, stability: f64, twist_in: f64) -> f64 {
    if stability == 0.0 || time_s <= 0.0 || twist_in == 0.0 {
        return 0.0;
    }
    let sign = if twist_in > 0.0 { 1.0 } else { -1.0 };
    let drift_in = sign
        * SPIN_DRIFT_COEFFICIENT
        * (stability + SPIN_DRIFT_STABILITY_OFFSET)
        * time_s.powf(SPIN_DRIFT_TIME_EXPONENT);
    drift_in / INCHES_PER_FOOT
}
