//! Central-tendency aggregation for XmR limits.
//!
//! XmR charts are built around either the mean or the median of the
//! individual values and of the moving ranges. [`AggregateMethod`] selects
//! which one; [`aggregate`] applies it.
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation: The Key to Managing Chaos*, 2nd ed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::error::{XmrError, XmrResult};

/// The aggregate used for center lines and the average moving range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMethod {
    /// Arithmetic mean.
    #[default]
    Mean,
    /// Median; the average of the two middle order statistics for even lengths.
    Median,
}

impl AggregateMethod {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateMethod::Mean => "mean",
            AggregateMethod::Median => "median",
        }
    }
}

impl fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateMethod {
    type Err = XmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(AggregateMethod::Mean),
            "median" => Ok(AggregateMethod::Median),
            _ => Err(XmrError::invalid(format!(
                "{s} not a valid aggregate method, must be 'mean' or 'median'"
            ))),
        }
    }
}

/// Aggregate `values` with the given method.
///
/// # Errors
///
/// Returns [`XmrError::InvalidArgument`] if `values` is empty or contains a
/// non-finite value.
///
/// # Examples
///
/// ```
/// use spc_xmr::aggregate::{aggregate, AggregateMethod};
///
/// let data = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(aggregate(&data, AggregateMethod::Mean).unwrap(), 2.5);
/// assert_eq!(aggregate(&data, AggregateMethod::Median).unwrap(), 2.5);
/// ```
pub fn aggregate(values: &[f64], method: AggregateMethod) -> XmrResult<f64> {
    if values.is_empty() {
        return Err(XmrError::invalid(format!(
            "cannot compute {method} of an empty sequence"
        )));
    }
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(XmrError::invalid(format!(
            "cannot compute {method}: value {} at position {pos} is not finite",
            values[pos]
        )));
    }

    let result = match method {
        AggregateMethod::Mean => stats::mean(values),
        AggregateMethod::Median => stats::median(values),
    };
    result.ok_or_else(|| XmrError::invalid(format!("{method} undefined for the given values")))
}

/// Aggregate `values` using a method given by name ("mean" or "median").
///
/// # Errors
///
/// Returns [`XmrError::InvalidArgument`] for an unknown method name, in
/// addition to the conditions of [`aggregate`].
pub fn aggregate_by_name(values: &[f64], method: &str) -> XmrResult<f64> {
    aggregate(values, method.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_four() {
        let v = aggregate(&[1.0, 2.0, 3.0, 4.0], AggregateMethod::Mean).unwrap();
        assert!((v - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_median_even_length_averages_middle() {
        let v = aggregate(&[1.0, 2.0, 3.0, 4.0], AggregateMethod::Median).unwrap();
        assert!((v - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_median_odd_length() {
        let v = aggregate(&[1.0, 2.0, 3.0], AggregateMethod::Median).unwrap();
        assert!((v - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_median_unsorted_input() {
        let v = aggregate(&[9.0, 1.0, 5.0, 3.0, 7.0], AggregateMethod::Median).unwrap();
        assert!((v - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_is_invalid() {
        let err = aggregate(&[], AggregateMethod::Mean).unwrap_err();
        assert!(matches!(err, XmrError::InvalidArgument(_)));
    }

    #[test]
    fn test_nan_is_invalid() {
        let err = aggregate(&[1.0, f64::NAN], AggregateMethod::Median).unwrap_err();
        assert!(matches!(err, XmrError::InvalidArgument(_)));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("mean".parse::<AggregateMethod>().unwrap(), AggregateMethod::Mean);
        assert_eq!("MEDIAN".parse::<AggregateMethod>().unwrap(), AggregateMethod::Median);
    }

    #[test]
    fn test_unknown_method_names_value() {
        let err = aggregate_by_name(&[1.0, 2.0], "mode").unwrap_err();
        match err {
            XmrError::InvalidArgument(msg) => assert!(msg.contains("mode"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_method_display_round_trips() {
        for m in [AggregateMethod::Mean, AggregateMethod::Median] {
            assert_eq!(m.to_string().parse::<AggregateMethod>().unwrap(), m);
        }
    }
}
