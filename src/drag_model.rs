use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::CD_TO_RETARD;
use crate::drag::{DragCurve, DragTablePoint, G1_CURVE, G7_CURVE, TABLE_G1, TABLE_G7};
use crate::error::ConfigurationError;

/// Built-in standard drag tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardDragTable {
    G1,
    G7,
}

impl StandardDragTable {
    pub fn table(&self) -> &'static [DragTablePoint] {
        match self {
            StandardDragTable::G1 => TABLE_G1,
            StandardDragTable::G7 => TABLE_G7,
        }
    }

    /// Shared compiled curve for this table
    pub fn curve(&self) -> Arc<DragCurve> {
        match self {
            StandardDragTable::G1 => Arc::clone(&*G1_CURVE),
            StandardDragTable::G7 => Arc::clone(&*G7_CURVE),
        }
    }
}

impl FromStr for StandardDragTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "G1" => Ok(StandardDragTable::G1),
            "G7" => Ok(StandardDragTable::G7),
            other => Err(format!("unknown drag table: {other}")),
        }
    }
}

impl fmt::Display for StandardDragTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Projectile drag description: ballistic coefficient, drag curve and the
/// physical dimensions used for energy and stability.
#[derive(Debug, Clone)]
pub struct DragModel {
    /// Ballistic coefficient, lb/in²
    pub bc: f64,
    pub curve: Arc<DragCurve>,
    pub weight_gr: f64,
    pub diameter_in: f64,
    pub length_in: f64,
}

impl DragModel {
    pub fn new(bc: f64, curve: Arc<DragCurve>) -> Result<Self, ConfigurationError> {
        if !bc.is_finite() || bc <= 0.0 {
            return Err(ConfigurationError::InvalidBallisticCoefficient { value: bc });
        }
        Ok(Self {
            bc,
            curve,
            weight_gr: 0.0,
            diameter_in: 0.0,
            length_in: 0.0,
        })
    }

    pub fn standard(bc: f64, table: StandardDragTable) -> Result<Self, ConfigurationError> {
        Self::new(bc, table.curve())
    }

    /// Build from a custom drag table.
    pub fn from_table(bc: f64, table: &[DragTablePoint]) -> Result<Self, ConfigurationError> {
        Self::new(bc, Arc::new(DragCurve::new(table)?))
    }

    pub fn with_dimensions(mut self, weight_gr: f64, diameter_in: f64, length_in: f64) -> Self {
        self.weight_gr = weight_gr;
        self.diameter_in = diameter_in;
        self.length_in = length_in;
        self
    }

    /// Drag scale per unit density at the given Mach number.
    pub fn drag_by_mach(&self, mach: f64) -> f64 {
        self.curve.drag_coefficient(mach) * CD_TO_RETARD / self.bc
    }
}
