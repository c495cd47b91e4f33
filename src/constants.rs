/// Physical and numerical constants used by the trajectory engine.
///
/// All values are imperial: feet, feet per second, grains, inches.

/// Gravitational acceleration in ft/s² (negative, pointing down the y axis)
pub const GRAVITY_FPS2: f64 = -32.17405;

/// Drag coefficient to retardation conversion constant
///
/// Converts `Cd / BC` into the drag scale applied to `v²` when velocity is in
/// ft/s and the ballistic coefficient is in lb/in².
pub const CD_TO_RETARD: f64 = 2.08551e-4;

/// Divisor for muzzle energy in ft·lbf from grains and ft/s
pub const ENERGY_DIVISOR: f64 = 450_400.0;

/// Optimal game weight factor: `weight² · v³ · OGW_FACTOR`
pub const OGW_FACTOR: f64 = 1.5e-12;

/// Litz spin drift coefficient (inches)
pub const SPIN_DRIFT_COEFFICIENT: f64 = 1.25;

/// Stability offset added to Sg in the Litz spin drift approximation
pub const SPIN_DRIFT_STABILITY_OFFSET: f64 = 1.2;

/// Time-of-flight exponent in the Litz spin drift approximation
pub const SPIN_DRIFT_TIME_EXPONENT: f64 = 1.83;

/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Feet per yard
pub const FEET_PER_YARD: f64 = 3.0;

/// Tolerance, in radians, within which a look angle is treated as vertical.
///
/// For a vertical shot the maximum range is the apex, so the zero solver
/// returns the look angle unchanged.
pub const APEX_IS_MAX_RANGE_RADIANS: f64 = 0.0003;

/// Zero distances closer than this (ft) are treated as the muzzle itself
pub const MIN_ZERO_DISTANCE_FT: f64 = 1e-3;

/// Slack used when comparing the last recorded range against the maximum range
pub const RANGE_SLACK_FT: f64 = 1e-6;

/// Minimum threshold for preventing division by zero in general calculations
pub const MIN_DIVISION_THRESHOLD: f64 = 1e-12;

// Standard atmosphere (imperial)

/// Standard sea level temperature, °F
pub const STANDARD_TEMPERATURE_F: f64 = 59.0;

/// Standard sea level pressure, inHg
pub const STANDARD_PRESSURE_INHG: f64 = 29.92;

/// Offset from °F to °R
pub const DEGREES_F_TO_R: f64 = 459.67;

/// Standard temperature in °R
pub const STANDARD_TEMPERATURE_R: f64 = 518.67;

/// Temperature lapse rate, °F per foot
pub const LAPSE_RATE_F_PER_FT: f64 = -3.56616e-03;

/// Barometric exponent `g / (L · R)` for the troposphere
pub const PRESSURE_EXPONENT: f64 = 5.255876;

/// Speed of sound per square root of absolute temperature, ft/s per √°R
pub const SPEED_OF_SOUND_IMPERIAL: f64 = 49.0223;

/// Altitude band (ft) around the base altitude where base values are reused
pub const ATMOSPHERE_REUSE_BAND_FT: f64 = 30.0;

/// Saturation vapour pressure polynomial coefficients (°F → inHg)
pub const VAPOUR_A0: f64 = 1.24871;
pub const VAPOUR_A1: f64 = 0.0988438;
pub const VAPOUR_A2: f64 = 0.00152907;
pub const VAPOUR_A3: f64 = -3.07031e-06;
pub const VAPOUR_A4: f64 = 4.21329e-07;
pub const VAPOUR_A5: f64 = 3.342e-04;

// Miller stability reference conditions

/// Reference velocity for the Miller velocity correction, ft/s
pub const MILLER_REFERENCE_VELOCITY_FPS: f64 = 2800.0;

/// Miller stability formula constant
pub const MILLER_CONSTANT: f64 = 30.0;
