//! # Ballistics Trajectory
//!
//! Point-mass projectile trajectory engine: piecewise-quadratic drag curves,
//! two interchangeable integration schemes (distance-stepped semi-implicit and
//! fixed-time-step leapfrog), event flagging of trajectory rows, and an
//! iterative zero-angle solver.
//!
//! Units are imperial throughout: feet, feet per second, grains, inches,
//! degrees Fahrenheit and inches of mercury. Angles are radians.

// Re-export the main types and functions
pub use atmosphere::{Atmosphere, AtmosphereModel, ConstantAtmosphere};
pub use calculator::Calculator;
pub use conditions::Shot;
pub use config::EngineConfig;
pub use distance_step::DistanceStepEngine;
pub use drag::{CurvePoint, DragCurve, DragTablePoint};
pub use drag_model::{DragModel, StandardDragTable};
pub use engine::{EngineKind, IntegrationEngine, ShotProps};
pub use error::{BallisticsError, ConfigurationError, RangeError, TerminationReason};
pub use leapfrog::LeapFrogEngine;
pub use munition::{Ammo, Weapon};
pub use trajectory_data::{HitResult, TrajFlag, TrajectoryRow};
pub use wind::Wind;
pub use zero_finding::find_zero_angle;

// Module declarations
pub mod atmosphere;
pub mod calculator;
pub mod conditions;
pub mod config;
pub mod constants;
pub mod distance_step;
pub mod drag;
pub mod drag_model;
pub mod engine;
pub mod error;
pub mod leapfrog;
pub mod munition;
pub mod stability;
pub mod trajectory_data;
pub mod trajectory_filter;
pub mod wind;
pub mod zero_finding;
