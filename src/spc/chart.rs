//! Core XmR chart types.
//!
//! Defines the building blocks shared by limit calculation and signal
//! detection: limit lines (flat or sloped), the computed [`LimitSet`], and
//! the points, runs and merged paths produced by the detectors.
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation: The Key to Managing Chaos*, 2nd ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateMethod;

/// A single vertex of a sloped limit line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Zero-based position in the full series.
    pub index: usize,
    /// Line value at that position.
    pub value: f64,
}

/// A center line or natural process limit.
///
/// Flat limits hold one value for the whole chart. Sloped limits hold one
/// vertex per position of the full series, ordered by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LimitLine {
    /// Constant value across the chart.
    Flat(f64),
    /// Per-index values following a linear trend.
    Sloped(Vec<LinePoint>),
}

impl LimitLine {
    /// Value of the line at position `index`.
    ///
    /// A sloped line queried past its last vertex yields `NaN`, which never
    /// compares true against a measurement.
    pub fn at(&self, index: usize) -> f64 {
        match self {
            LimitLine::Flat(v) => *v,
            LimitLine::Sloped(points) => points.get(index).map_or(f64::NAN, |p| p.value),
        }
    }

    /// Returns `true` for a sloped line.
    pub fn is_sloped(&self) -> bool {
        matches!(self, LimitLine::Sloped(_))
    }

    /// Smallest value on the line, or `None` for an empty sloped line.
    pub fn min_value(&self) -> Option<f64> {
        match self {
            LimitLine::Flat(v) => Some(*v),
            LimitLine::Sloped(points) => points.iter().map(|p| p.value).reduce(f64::min),
        }
    }

    /// Largest value on the line, or `None` for an empty sloped line.
    pub fn max_value(&self) -> Option<f64> {
        match self {
            LimitLine::Flat(v) => Some(*v),
            LimitLine::Sloped(points) => points.iter().map(|p| p.value).reduce(f64::max),
        }
    }
}

/// Limits computed for one XmR chart.
///
/// # Invariants
///
/// - `lower_natural_limit <= center <= upper_natural_limit` at every index
///   for non-degenerate data with a non-negative center
/// - All three lines share a shape: all flat or all sloped
/// - In flat mode `lower_natural_limit >= 0`; sloped lines are not floored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitSet {
    /// Center line (mean or median of the in-sample values, or the fitted trend).
    pub center: LimitLine,
    /// Upper natural process limit.
    pub upper_natural_limit: LimitLine,
    /// Lower natural process limit.
    pub lower_natural_limit: LimitLine,
    /// Average (or median) moving range of the in-sample values.
    pub moving_range_center: f64,
    /// Upper limit of the moving range chart.
    pub moving_range_upper_limit: f64,
    /// Aggregate the limits were estimated with.
    pub method: AggregateMethod,
    /// Number of leading observations used for estimation.
    pub in_sample_len: usize,
}

impl LimitSet {
    /// Returns `true` when the limits follow a linear trend.
    pub fn is_sloped(&self) -> bool {
        self.center.is_sloped()
    }

    /// Threshold halfway between the center line and the upper limit.
    pub fn upper_midrange(&self, index: usize) -> f64 {
        let c = self.center.at(index);
        c + (self.upper_natural_limit.at(index) - c) / 2.0
    }

    /// Threshold halfway between the center line and the lower limit.
    pub fn lower_midrange(&self, index: usize) -> f64 {
        let c = self.center.at(index);
        c - (c - self.lower_natural_limit.at(index)) / 2.0
    }

    /// Threshold halfway between the moving range center and its upper limit.
    pub fn moving_range_midrange(&self) -> f64 {
        self.moving_range_center + (self.moving_range_upper_limit - self.moving_range_center) / 2.0
    }
}

/// Side of the center line a signal falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalTag {
    /// Above the center line or at/above the upper limit.
    High,
    /// Below the center line or at/below the lower limit.
    Low,
}

impl fmt::Display for SignalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalTag::High => f.write_str("High"),
            SignalTag::Low => f.write_str("Low"),
        }
    }
}

/// A point reported by signal detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    /// Zero-based position in the full series.
    pub index: usize,
    /// Observed value.
    pub value: f64,
    /// Classification, if the detector assigns one.
    pub tag: Option<SignalTag>,
}

/// A window of consecutive points flagged by a run rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Points in the window, ordered by index.
    pub points: Vec<SignalPoint>,
}

impl Run {
    /// Index of the first point, or `None` for an empty run.
    pub fn first_index(&self) -> Option<usize> {
        self.points.first().map(|p| p.index)
    }

    /// Index of the last point, or `None` for an empty run.
    pub fn last_index(&self) -> Option<usize> {
        self.points.last().map(|p| p.index)
    }

    /// Tag of the window, taken from its last point.
    pub fn tag(&self) -> Option<SignalTag> {
        self.points.last().and_then(|p| p.tag)
    }
}

/// An `(index, value)` pair on a merged path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Zero-based position in the full series.
    pub index: usize,
    /// Observed value.
    pub value: f64,
}

/// Union of overlapping or index-adjacent runs, used for region highlighting.
///
/// # Invariants
///
/// - Points are sorted ascending by index with no duplicate indices
/// - No two merged paths from one detection share or neighbor an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPath {
    /// Points on the path, ordered by index.
    pub points: Vec<PathPoint>,
}

impl MergedPath {
    /// Index of the first point, or `None` for an empty path.
    pub fn first_index(&self) -> Option<usize> {
        self.points.first().map(|p| p.index)
    }

    /// Index of the last point, or `None` for an empty path.
    pub fn last_index(&self) -> Option<usize> {
        self.points.last().map(|p| p.index)
    }

    /// Number of points on the path.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_limits(ucl: f64, cl: f64, lcl: f64) -> LimitSet {
        LimitSet {
            center: LimitLine::Flat(cl),
            upper_natural_limit: LimitLine::Flat(ucl),
            lower_natural_limit: LimitLine::Flat(lcl),
            moving_range_center: 2.0,
            moving_range_upper_limit: 6.536,
            method: AggregateMethod::Mean,
            in_sample_len: 10,
        }
    }

    #[test]
    fn test_flat_line_is_constant() {
        let line = LimitLine::Flat(25.0);
        assert!((line.at(0) - 25.0).abs() < f64::EPSILON);
        assert!((line.at(1000) - 25.0).abs() < f64::EPSILON);
        assert!(!line.is_sloped());
    }

    #[test]
    fn test_sloped_line_lookup() {
        let line = LimitLine::Sloped(vec![
            LinePoint { index: 0, value: 1.0 },
            LinePoint { index: 1, value: 2.0 },
        ]);
        assert!((line.at(1) - 2.0).abs() < f64::EPSILON);
        assert!(line.at(2).is_nan());
        assert_eq!(line.min_value(), Some(1.0));
        assert_eq!(line.max_value(), Some(2.0));
    }

    #[test]
    fn test_midranges() {
        let limits = flat_limits(10.0, 0.0, -10.0);
        assert!((limits.upper_midrange(0) - 5.0).abs() < f64::EPSILON);
        assert!((limits.lower_midrange(0) + 5.0).abs() < f64::EPSILON);
        assert!((limits.moving_range_midrange() - 4.268).abs() < 1e-12);
    }

    #[test]
    fn test_signal_tag_display() {
        assert_eq!(SignalTag::High.to_string(), "High");
        assert_eq!(SignalTag::Low.to_string(), "Low");
    }

    #[test]
    fn test_run_bounds_and_tag() {
        let run = Run {
            points: vec![
                SignalPoint { index: 3, value: 1.0, tag: Some(SignalTag::Low) },
                SignalPoint { index: 4, value: 1.5, tag: Some(SignalTag::Low) },
            ],
        };
        assert_eq!(run.first_index(), Some(3));
        assert_eq!(run.last_index(), Some(4));
        assert_eq!(run.tag(), Some(SignalTag::Low));
    }

    #[test]
    fn test_empty_merged_path() {
        let path = MergedPath { points: Vec::new() };
        assert!(path.is_empty());
        assert_eq!(path.first_index(), None);
    }
}
