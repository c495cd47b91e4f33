/// Drag curve construction and evaluation from tabulated drag coefficients.
///
/// A table of (Mach, Cd) points is compiled once into piecewise polynomial
/// segments, one per table point. Interior segments are quadratics through
/// the point and its two neighbours; the two end segments are straight lines
/// through the outermost pairs so that queries outside the table extrapolate
/// linearly.
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// One tabulated drag coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragTablePoint {
    pub mach: f64,
    pub cd: f64,
}

impl DragTablePoint {
    pub const fn new(mach: f64, cd: f64) -> Self {
        Self { mach, cd }
    }
}

/// Polynomial segment `cd = c + mach * (b + a * mach)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl CurvePoint {
    #[inline]
    pub fn evaluate(&self, mach: f64) -> f64 {
        self.c + mach * (self.b + self.a * mach)
    }

    fn linear(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let rate = (y2 - y1) / (x2 - x1);
        Self {
            a: 0.0,
            b: rate,
            c: y1 - x1 * rate,
        }
    }

    fn quadratic((x1, y1): (f64, f64), (x2, y2): (f64, f64), (x3, y3): (f64, f64)) -> Self {
        let a = ((y3 - y1) * (x2 - x1) - (y2 - y1) * (x3 - x1))
            / ((x3 * x3 - x1 * x1) * (x2 - x1) - (x2 * x2 - x1 * x1) * (x3 - x1));
        let b = (y2 - y1 - a * (x2 * x2 - x1 * x1)) / (x2 - x1);
        let c = y1 - (a * x1 * x1 + b * x1);
        Self { a, b, c }
    }
}

/// Compiled drag curve. Immutable once built and safe to share across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCurve {
    table: Vec<DragTablePoint>,
    segments: Vec<CurvePoint>,
}

impl DragCurve {
    /// Build the curve, rejecting tables with fewer than two points,
    /// non-increasing Mach values, or negative / non-finite entries.
    pub fn new(table: &[DragTablePoint]) -> Result<Self, ConfigurationError> {
        let n = table.len();
        if n < 2 {
            return Err(ConfigurationError::DragTableTooShort { len: n });
        }
        for (index, point) in table.iter().enumerate() {
            if !point.mach.is_finite() || !point.cd.is_finite() || point.mach < 0.0 || point.cd < 0.0 {
                return Err(ConfigurationError::InvalidDragPoint { index });
            }
            if index > 0 && point.mach <= table[index - 1].mach {
                return Err(ConfigurationError::NonIncreasingMach { index });
            }
        }

        Ok(Self::compile(table))
    }

    /// Fit the segments. Callers guarantee at least two increasing points.
    fn compile(table: &[DragTablePoint]) -> Self {
        let n = table.len();
        let mut segments = Vec::with_capacity(n);
        segments.push(CurvePoint::linear(table[0].mach, table[0].cd, table[1].mach, table[1].cd));
        for window in table.windows(3) {
            segments.push(CurvePoint::quadratic(
                (window[0].mach, window[0].cd),
                (window[1].mach, window[1].cd),
                (window[2].mach, window[2].cd),
            ));
        }
        segments.push(CurvePoint::linear(
            table[n - 2].mach,
            table[n - 2].cd,
            table[n - 1].mach,
            table[n - 1].cd,
        ));

        Self {
            table: table.to_vec(),
            segments,
        }
    }

    /// Drag coefficient at the given Mach number.
    ///
    /// Bisects the breakpoints down to a bracketing pair and evaluates the
    /// segment of the nearer breakpoint. An exact tie goes to the upper one.
    pub fn drag_coefficient(&self, mach: f64) -> f64 {
        self.segments[self.segment_index(mach)].evaluate(mach)
    }

    fn segment_index(&self, mach: f64) -> usize {
        let mut lo = 0;
        let mut hi = self.table.len() - 1;
        while hi - lo > 1 {
            let mid = (hi + lo) / 2;
            if self.table[mid].mach < mach {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        if self.table[hi].mach - mach > mach - self.table[lo].mach {
            lo
        } else {
            hi
        }
    }

    pub fn segments(&self) -> &[CurvePoint] {
        &self.segments
    }
}

/// G1 standard projectile drag table
pub const TABLE_G1: &[DragTablePoint] = &[
    DragTablePoint::new(0.0, 0.2629),
    DragTablePoint::new(0.5, 0.2695),
    DragTablePoint::new(0.6, 0.2752),
    DragTablePoint::new(0.7, 0.2817),
    DragTablePoint::new(0.8, 0.2902),
    DragTablePoint::new(0.9, 0.3012),
    DragTablePoint::new(1.0, 0.4805),
    DragTablePoint::new(1.1, 0.5933),
    DragTablePoint::new(1.2, 0.6318),
    DragTablePoint::new(1.3, 0.6440),
    DragTablePoint::new(1.4, 0.6444),
    DragTablePoint::new(1.5, 0.6372),
    DragTablePoint::new(1.6, 0.6252),
    DragTablePoint::new(1.7, 0.6105),
    DragTablePoint::new(1.8, 0.5956),
    DragTablePoint::new(1.9, 0.5815),
    DragTablePoint::new(2.0, 0.5934),
    DragTablePoint::new(2.5, 0.5598),
    DragTablePoint::new(3.0, 0.5133),
    DragTablePoint::new(4.0, 0.4811),
    DragTablePoint::new(5.0, 0.4988),
];

/// G7 boat-tail projectile drag table
pub const TABLE_G7: &[DragTablePoint] = &[
    DragTablePoint::new(0.0, 0.1198),
    DragTablePoint::new(0.5, 0.1197),
    DragTablePoint::new(0.6, 0.1202),
    DragTablePoint::new(0.7, 0.1213),
    DragTablePoint::new(0.8, 0.1240),
    DragTablePoint::new(0.9, 0.1294),
    DragTablePoint::new(1.0, 0.3803),
    DragTablePoint::new(1.1, 0.4015),
    DragTablePoint::new(1.2, 0.4043),
    DragTablePoint::new(1.3, 0.3956),
    DragTablePoint::new(1.4, 0.3814),
    DragTablePoint::new(1.5, 0.3663),
    DragTablePoint::new(1.6, 0.3520),
    DragTablePoint::new(1.7, 0.3398),
    DragTablePoint::new(1.8, 0.3297),
    DragTablePoint::new(1.9, 0.3221),
    DragTablePoint::new(2.0, 0.2980),
    DragTablePoint::new(2.5, 0.2731),
    DragTablePoint::new(3.0, 0.2424),
    DragTablePoint::new(4.0, 0.2196),
    DragTablePoint::new(5.0, 0.1618),
];

/// G1 curve, compiled on first use
pub static G1_CURVE: Lazy<Arc<DragCurve>> = Lazy::new(|| Arc::new(DragCurve::compile(TABLE_G1)));

/// G7 curve, compiled on first use
pub static G7_CURVE: Lazy<Arc<DragCurve>> = Lazy::new(|| Arc::new(DragCurve::compile(TABLE_G7)));

#[cfg(test)]
mod tests {
    use super::*;

    fn points(data: &[(f64, f64)]) -> Vec<DragTablePoint> {
        data.iter().map(|&(mach, cd)| DragTablePoint::new(mach, cd)).collect()
    }

    #[test]
    fn test_segment_count_matches_table() {
        let curve = DragCurve::new(TABLE_G1).unwrap();
        assert_eq!(curve.segments().len(), TABLE_G1.len());
        assert_eq!(curve.segments()[0].a, 0.0);
        assert_eq!(curve.segments()[TABLE_G1.len() - 1].a, 0.0);
    }

    #[test]
    fn test_reproduces_breakpoints() {
        for table in [TABLE_G1, TABLE_G7] {
            let curve = DragCurve::new(table).unwrap();
            for point in table {
                let cd = curve.drag_coefficient(point.mach);
                assert!(
                    (cd - point.cd).abs() <= 1e-9 * point.cd.abs().max(1.0),
                    "Mach {}: expected {}, got {cd}",
                    point.mach,
                    point.cd
                );
            }
        }
    }

    #[test]
    fn test_adjacent_segments_agree_at_shared_breakpoints() {
        let curve = DragCurve::new(TABLE_G7).unwrap();
        let segments = curve.segments();
        for i in 0..TABLE_G7.len() - 1 {
            for point in [TABLE_G7[i], TABLE_G7[i + 1]] {
                let left = segments[i].evaluate(point.mach);
                let right = segments[i + 1].evaluate(point.mach);
                assert!(
                    (left - right).abs() <= 1e-9 * point.cd.max(1.0),
                    "segments {i} and {} disagree at Mach {}",
                    i + 1,
                    point.mach
                );
            }
        }
    }

    #[test]
    fn test_two_point_table_is_linear() {
        let curve = DragCurve::new(&points(&[(0.5, 0.2), (1.5, 0.4)])).unwrap();
        assert!((curve.drag_coefficient(1.0) - 0.3).abs() < 1e-12);
        // Linear extrapolation on both sides
        assert!((curve.drag_coefficient(0.0) - 0.1).abs() < 1e-12);
        assert!((curve.drag_coefficient(2.5) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolation_uses_end_lines() {
        let curve = DragCurve::new(&points(&[(0.5, 0.2), (1.0, 0.5), (1.5, 0.4), (2.0, 0.3)])).unwrap();
        // Beyond the last breakpoint: line through (1.5, 0.4) and (2.0, 0.3)
        assert!((curve.drag_coefficient(3.0) - 0.1).abs() < 1e-12);
        // Below the first: line through (0.5, 0.2) and (1.0, 0.5)
        assert!((curve.drag_coefficient(0.0) - (-0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_upper_breakpoint() {
        let table = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 5.0)]);
        let curve = DragCurve::new(&table).unwrap();
        let midpoint = 1.5;
        let upper = curve.segments()[2].evaluate(midpoint);
        assert_eq!(curve.drag_coefficient(midpoint), upper);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert_eq!(
            DragCurve::new(&points(&[(1.0, 0.3)])),
            Err(ConfigurationError::DragTableTooShort { len: 1 })
        );
        assert_eq!(
            DragCurve::new(&points(&[(1.0, 0.3), (1.0, 0.4)])),
            Err(ConfigurationError::NonIncreasingMach { index: 1 })
        );
        assert_eq!(
            DragCurve::new(&points(&[(0.5, 0.3), (1.0, -0.4)])),
            Err(ConfigurationError::InvalidDragPoint { index: 1 })
        );
        assert_eq!(
            DragCurve::new(&points(&[(0.5, 0.3), (f64::NAN, 0.4)])),
            Err(ConfigurationError::InvalidDragPoint { index: 1 })
        );
    }

    #[test]
    fn test_standard_curves() {
        let cd = G1_CURVE.drag_coefficient(1.0);
        assert!(cd > 0.4 && cd < 0.6, "G1 CD at Mach 1.0: {cd}");
        let cd = G7_CURVE.drag_coefficient(2.0);
        assert!((cd - 0.2980).abs() < 1e-9, "G7 CD at Mach 2.0: {cd}");
        let subsonic = G7_CURVE.drag_coefficient(0.7);
        let supersonic = G7_CURVE.drag_coefficient(1.2);
        assert!(supersonic > subsonic);
    }
}
