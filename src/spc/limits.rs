//! XmR limit calculation.
//!
//! Derives the center line, natural process limits and moving range limits
//! of an Individuals and Moving Range chart. Limits are estimated from an
//! in-sample prefix of the series (everything up to an inclusive cutoff) and
//! then applied to the full series.
//!
//! # Scaling Constants
//!
//! | Aggregate | mR upper multiplier | Natural limit multiplier |
//! |-----------|---------------------|--------------------------|
//! | mean      | 3.268               | 2.660                    |
//! | median    | 3.865               | 3.145                    |
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation: The Key to Managing Chaos*, 2nd ed.
//! - Wheeler, D.J. & Chambers, D.S. (1992). *Understanding Statistical Process Control*, 2nd ed.

use tracing::debug;

use super::chart::{LimitLine, LimitSet, LinePoint};
use crate::aggregate::{aggregate, AggregateMethod};
use crate::error::{XmrError, XmrResult};

/// Scaling constants for one aggregate method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XmrConstants {
    /// Multiplier applied to the moving range center for the mR upper limit.
    pub moving_range_upper: f64,
    /// Multiplier applied to the moving range center for the natural limits.
    pub natural_limit: f64,
}

impl XmrConstants {
    /// Constants for limits built on the mean.
    pub const MEAN: XmrConstants = XmrConstants {
        moving_range_upper: 3.268,
        natural_limit: 2.660,
    };

    /// Constants for limits built on the median.
    pub const MEDIAN: XmrConstants = XmrConstants {
        moving_range_upper: 3.865,
        natural_limit: 3.145,
    };

    /// Look up the constants for `method`.
    pub fn for_method(method: AggregateMethod) -> Self {
        match method {
            AggregateMethod::Mean => Self::MEAN,
            AggregateMethod::Median => Self::MEDIAN,
        }
    }
}

/// Full-length moving range series.
///
/// Element `i` is `|values[i] - values[i - 1]|`; element 0 is `NaN` because
/// the first observation has no predecessor. An empty input gives an empty
/// output.
pub fn moving_range(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    std::iter::once(f64::NAN)
        .chain(values.windows(2).map(|w| (w[1] - w[0]).abs()))
        .collect()
}

/// Computes XmR limits from a value series.
///
/// # Algorithm
///
/// 1. Take the in-sample prefix `values[..=cutoff]` (the whole series when no cutoff is given).
/// 2. Moving ranges of the prefix: `mR[i] = |Y[i] - Y[i-1]|`.
/// 3. `mR center = agg(mR)`, `mR upper = mR center * mR multiplier`.
/// 4. Flat: `CL = agg(Y)`, `UNPL = CL + k * mR center`, `LNPL = max(0, CL - k * mR center)`.
/// 5. Sloped: fit a line through the aggregates of the two halves of the prefix and
///    offset it by `± mR upper` at every index of the full series.
///
/// # Examples
///
/// ```
/// use spc_xmr::aggregate::AggregateMethod;
/// use spc_xmr::spc::{LimitCalculator, LimitLine};
///
/// let calc = LimitCalculator::new(AggregateMethod::Mean);
/// let limits = calc.calculate(&[95.0, 105.0], None).unwrap();
///
/// assert_eq!(limits.center, LimitLine::Flat(100.0));
/// assert!((limits.upper_natural_limit.at(0) - 126.6).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LimitCalculator {
    method: AggregateMethod,
    constants: XmrConstants,
    sloped: bool,
}

impl LimitCalculator {
    /// Create a flat-mode calculator with the standard constants for `method`.
    pub fn new(method: AggregateMethod) -> Self {
        Self {
            method,
            constants: XmrConstants::for_method(method),
            sloped: false,
        }
    }

    /// Create a calculator with explicitly supplied constants.
    pub fn with_constants(method: AggregateMethod, constants: XmrConstants) -> Self {
        Self {
            method,
            constants,
            sloped: false,
        }
    }

    /// Switch between flat and sloped (linear trend) limits.
    pub fn sloped(mut self, sloped: bool) -> Self {
        self.sloped = sloped;
        self
    }

    /// The aggregate method in use.
    pub fn method(&self) -> AggregateMethod {
        self.method
    }

    /// The scaling constants in use.
    pub fn constants(&self) -> XmrConstants {
        self.constants
    }

    /// Compute limits for `values`, estimating from positions `0..=cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`XmrError::InvalidArgument`] if `cutoff` lies outside the
    /// series, if fewer than 2 in-sample points remain, or if the in-sample
    /// values are not finite.
    pub fn calculate(&self, values: &[f64], cutoff: Option<usize>) -> XmrResult<LimitSet> {
        let in_sample = match cutoff {
            Some(c) if c >= values.len() => {
                return Err(XmrError::invalid(format!(
                    "cutoff position {c} is outside a series of {} points",
                    values.len()
                )));
            }
            Some(c) => &values[..=c],
            None => values,
        };
        if in_sample.len() < 2 {
            return Err(XmrError::invalid(format!(
                "at least 2 in-sample points are required for a moving range, got {}",
                in_sample.len()
            )));
        }

        let mr_values: Vec<f64> = in_sample
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .collect();
        let mr_center = aggregate(&mr_values, self.method)?;
        let mr_upper = mr_center * self.constants.moving_range_upper;

        let (center, upper, lower) = if self.sloped {
            self.sloped_lines(in_sample, values.len(), mr_upper)?
        } else {
            let cl = aggregate(in_sample, self.method)?;
            let spread = self.constants.natural_limit * mr_center;
            (
                LimitLine::Flat(cl),
                LimitLine::Flat(cl + spread),
                LimitLine::Flat((cl - spread).max(0.0)),
            )
        };

        debug!(
            method = %self.method,
            sloped = self.sloped,
            in_sample = in_sample.len(),
            total = values.len(),
            mr_center,
            mr_upper,
            "computed xmr limits"
        );

        Ok(LimitSet {
            center,
            upper_natural_limit: upper,
            lower_natural_limit: lower,
            moving_range_center: mr_center,
            moving_range_upper_limit: mr_upper,
            method: self.method,
            in_sample_len: in_sample.len(),
        })
    }

    /// Fit the trend line through the two half-aggregates and build the
    /// center and limit lines over `total_len` positions.
    fn sloped_lines(
        &self,
        in_sample: &[f64],
        total_len: usize,
        mr_upper: f64,
    ) -> XmrResult<(LimitLine, LimitLine, LimitLine)> {
        let (slope, intercept) = trend_line(in_sample, self.method)?;

        let center: Vec<LinePoint> = (0..total_len)
            .map(|i| LinePoint {
                index: i,
                value: slope * (i + 1) as f64 + intercept,
            })
            .collect();
        let upper = center
            .iter()
            .map(|p| LinePoint {
                index: p.index,
                value: p.value + mr_upper,
            })
            .collect();
        let lower = center
            .iter()
            .map(|p| LinePoint {
                index: p.index,
                value: p.value - mr_upper,
            })
            .collect();

        debug!(slope, intercept, "fitted sloped center line");

        Ok((
            LimitLine::Sloped(center),
            LimitLine::Sloped(upper),
            LimitLine::Sloped(lower),
        ))
    }
}

/// Slope and intercept of the line through the half-aggregates.
///
/// The first half is `values[..n/2]`, located at its midpoint `(n/2)/2`; the
/// second half is `values[n/2..]`, located at `n/2 + (n - n/2)/2`. The
/// intercept places the line through the first-half point.
fn trend_line(values: &[f64], method: AggregateMethod) -> XmrResult<(f64, f64)> {
    let n = values.len();
    let half = n / 2;
    let first_mid = half / 2;
    let second_mid = half + (n - half) / 2;

    let first_agg = aggregate(&values[..half], method)?;
    let second_agg = aggregate(&values[half..], method)?;

    let slope = (second_agg - first_agg) / (second_mid - first_mid) as f64;
    let intercept = first_agg - slope * first_mid as f64;
    Ok((slope, intercept))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn flat_limits_ordered(
            data in proptest::collection::vec(0.0_f64..1e3, 2..=60)
        ) {
            let limits = LimitCalculator::new(AggregateMethod::Mean)
                .calculate(&data, None)
                .expect("should compute");
            let (u, c, l) = (
                limits.upper_natural_limit.at(0),
                limits.center.at(0),
                limits.lower_natural_limit.at(0),
            );
            prop_assert!(l <= c && c <= u, "l={l} c={c} u={u}");
        }

        #[test]
        fn flat_lower_never_negative(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=60),
            median in any::<bool>(),
        ) {
            let method = if median { AggregateMethod::Median } else { AggregateMethod::Mean };
            let limits = LimitCalculator::new(method)
                .calculate(&data, None)
                .expect("should compute");
            prop_assert!(limits.lower_natural_limit.at(0) >= 0.0);
        }

        #[test]
        fn sloped_limits_ordered(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=60),
        ) {
            let limits = LimitCalculator::new(AggregateMethod::Median)
                .sloped(true)
                .calculate(&data, None)
                .expect("should compute");
            for i in 0..data.len() {
                let (u, c, l) = (
                    limits.upper_natural_limit.at(i),
                    limits.center.at(i),
                    limits.lower_natural_limit.at(i),
                );
                prop_assert!(l <= c && c <= u, "i={i} l={l} c={c} u={u}");
            }
        }

        #[test]
        fn calculation_is_deterministic(
            data in proptest::collection::vec(0.0_f64..1e3, 2..=40),
            sloped in any::<bool>(),
        ) {
            let calc = LimitCalculator::new(AggregateMethod::Mean).sloped(sloped);
            let a = calc.calculate(&data, None).expect("should compute");
            let b = calc.calculate(&data, None).expect("should compute");
            prop_assert_eq!(a, b);
        }
    }
}
