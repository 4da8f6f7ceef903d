//! Axis ranges for the two chart panels.
//!
//! The individuals panel range determines the vertical buffer of highlight
//! outlines, so it is part of the computed output rather than a renderer
//! detail. Ranges are rounded outward to a "nice" multiple of the spread.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::chart::LimitSet;
use crate::error::{XmrError, XmrResult};

/// Direction used when rounding to a multiple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingDirection {
    /// Toward positive infinity.
    Up,
    /// Toward negative infinity.
    #[default]
    Down,
}

impl fmt::Display for RoundingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingDirection::Up => f.write_str("up"),
            RoundingDirection::Down => f.write_str("down"),
        }
    }
}

impl FromStr for RoundingDirection {
    type Err = XmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(RoundingDirection::Up),
            "down" => Ok(RoundingDirection::Down),
            _ => Err(XmrError::invalid(format!(
                "{s} not a valid rounding direction, must be 'up' or 'down'"
            ))),
        }
    }
}

/// Value range and tick step of one panel's y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    /// Lower bound of the axis.
    pub min: f64,
    /// Upper bound of the axis.
    pub max: f64,
    /// Tick step, or `None` when the plotted spread is degenerate.
    pub dtick: Option<f64>,
}

impl AxisRange {
    /// Distance between the bounds.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// A rounding multiple scaled to the order of magnitude of `value`.
///
/// With `o = log10(value) - 1` and `r = 10^floor(o) / 2`, values with
/// `o > 0` round `10^o / r` to a whole count of `r` (counts such as 5, 50,
/// 500); smaller values give `10^o` rounded to `-floor(o)` decimals.
///
/// # Errors
///
/// Returns [`XmrError::InvalidArgument`] unless `value` is finite and positive.
pub fn rounding_multiple(value: f64, direction: RoundingDirection) -> XmrResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(XmrError::invalid(format!(
            "rounding multiple requires a positive finite value, got {value}"
        )));
    }

    let magnitude = value.log10() - 1.0;
    let multiple = 10f64.powf(magnitude.floor()) / 2.0;
    let dtick_multiple = 10f64.powf(magnitude) / multiple;

    if magnitude > 0.0 {
        let steps = match direction {
            RoundingDirection::Down => dtick_multiple.floor(),
            RoundingDirection::Up => dtick_multiple.ceil(),
        };
        Ok((steps * multiple).trunc())
    } else {
        let decimals = -magnitude.floor();
        let scale = 10f64.powf(decimals);
        Ok((dtick_multiple * multiple * scale).round() / scale)
    }
}

/// Round `value` to a multiple of `multiple` in the given direction.
///
/// Results are truncated to whole numbers when `multiple >= 1`.
///
/// # Errors
///
/// Returns [`XmrError::InvalidArgument`] unless `multiple` is finite and positive.
pub fn rounded_value(value: f64, multiple: f64, direction: RoundingDirection) -> XmrResult<f64> {
    if !multiple.is_finite() || multiple <= 0.0 {
        return Err(XmrError::invalid(format!(
            "rounding requires a positive finite multiple, got {multiple}"
        )));
    }

    let rounded = match direction {
        RoundingDirection::Down => (value / multiple).floor() * multiple,
        RoundingDirection::Up => (value / multiple).ceil() * multiple,
    };
    if multiple >= 1.0 {
        Ok(rounded.trunc())
    } else {
        Ok(rounded)
    }
}

/// Range of the individuals panel.
///
/// Flat limits widen the range to cover every value and 10% of the limit
/// spread beyond each limit. Sloped limits span from the lowest point of the
/// lower limit line to the highest point of the upper one. A non-positive
/// spread (for example a constant series) falls back to the raw extent of the
/// values and limits with no tick step.
pub fn value_axis_range(values: &[f64], limits: &LimitSet) -> XmrResult<AxisRange> {
    let lower = limits.lower_natural_limit.min_value().unwrap_or(f64::NAN);
    let upper = limits.upper_natural_limit.max_value().unwrap_or(f64::NAN);
    let (lo, hi) = extent(values);
    let spread = upper - lower;

    if !(spread.is_finite() && spread > 0.0) {
        return Ok(AxisRange {
            min: lo.min(lower),
            max: hi.max(upper),
            dtick: None,
        });
    }

    let dtick = rounding_multiple(spread, RoundingDirection::Down)?;
    if !(dtick.is_finite() && dtick > 0.0) {
        return Ok(AxisRange {
            min: lo.min(lower),
            max: hi.max(upper),
            dtick: None,
        });
    }

    let (min, max) = if limits.is_sloped() {
        (
            rounded_value(lower, dtick, RoundingDirection::Down)?,
            rounded_value(upper, dtick, RoundingDirection::Up)?,
        )
    } else {
        (
            rounded_value(lo, dtick, RoundingDirection::Down)?
                .min(rounded_value(lower - spread * 0.1, dtick, RoundingDirection::Down)?),
            rounded_value(hi, dtick, RoundingDirection::Up)?
                .max(rounded_value(upper + spread * 0.1, dtick, RoundingDirection::Up)?),
        )
    };

    Ok(AxisRange {
        min,
        max,
        dtick: Some(dtick),
    })
}

/// Range of the moving range panel, anchored at zero.
///
/// The top covers the moving range upper limit and 110% of the largest
/// moving range. The leading `NaN` of the moving range series is ignored.
pub fn moving_range_axis_range(moving_range: &[f64], limits: &LimitSet) -> XmrResult<AxisRange> {
    let upper = limits.moving_range_upper_limit;
    let (_, largest) = extent(moving_range);

    if !(upper.is_finite() && upper > 0.0) {
        return Ok(AxisRange {
            min: 0.0,
            max: largest.max(upper).max(0.0),
            dtick: None,
        });
    }

    let dtick = rounding_multiple(upper, RoundingDirection::Down)?;
    if !(dtick.is_finite() && dtick > 0.0) {
        return Ok(AxisRange {
            min: 0.0,
            max: largest.max(upper),
            dtick: None,
        });
    }

    let mut max = rounded_value(upper, dtick, RoundingDirection::Up)?;
    if largest.is_finite() {
        max = max.max(rounded_value(largest * 1.1, dtick, RoundingDirection::Up)?);
    }

    Ok(AxisRange {
        min: 0.0,
        max,
        dtick: Some(dtick),
    })
}

/// Smallest and largest finite values, or `(NaN, NaN)` when there are none.
fn extent(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::NAN, f64::NAN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
