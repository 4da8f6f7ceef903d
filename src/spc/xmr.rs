//! End-to-end XmR chart construction.
//!
//! [`XmrChart::build`] runs the whole pipeline on a keyed [`Series`]:
//! limits from the in-sample prefix, the moving range series, axis ranges and
//! every signal. The result is immutable and holds everything a renderer
//! needs to draw both panels.

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::axes::{moving_range_axis_range, value_axis_range, AxisRange};
use super::chart::LimitSet;
use super::limits::{moving_range, LimitCalculator};
use super::rules::{LongRunRule, ShortRunRule};
use super::signals::{SignalDetector, Signals};
use crate::aggregate::AggregateMethod;
use crate::error::{XmrError, XmrResult};

/// Time-ordered measurements keyed by a strictly increasing key.
///
/// # Invariants
///
/// - Non-empty, with one value per key
/// - Keys strictly increasing
/// - All values finite
#[derive(Debug, Clone, PartialEq)]
pub struct Series<K> {
    keys: Vec<K>,
    values: Vec<f64>,
}

impl<K: PartialOrd + Debug> Series<K> {
    /// Create a series from parallel key and value vectors.
    ///
    /// # Errors
    ///
    /// - [`XmrError::TypeConversion`] if two neighboring keys cannot be ordered
    /// - [`XmrError::InvalidArgument`] if the series is empty, the lengths
    ///   differ, keys are not strictly increasing, or a value is not finite
    pub fn new(keys: Vec<K>, values: Vec<f64>) -> XmrResult<Self> {
        if values.is_empty() {
            return Err(XmrError::invalid("series must contain at least one value"));
        }
        if keys.len() != values.len() {
            return Err(XmrError::invalid(format!(
                "series has {} keys but {} values",
                keys.len(),
                values.len()
            )));
        }
        for (i, w) in keys.windows(2).enumerate() {
            match w[0].partial_cmp(&w[1]) {
                Some(Ordering::Less) => {}
                Some(_) => {
                    return Err(XmrError::invalid(format!(
                        "series keys must be strictly increasing: \
                         {:?} at position {} is not before {:?}",
                        w[0],
                        i,
                        w[1]
                    )));
                }
                None => {
                    return Err(XmrError::conversion(format!(
                        "series keys {:?} and {:?} at positions {} and {} cannot be ordered",
                        w[0],
                        w[1],
                        i,
                        i + 1
                    )));
                }
            }
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(XmrError::invalid(format!(
                "value {} at key {:?} is not finite",
                values[pos], keys[pos]
            )));
        }
        Ok(Self { keys, values })
    }

    /// Create a series from `(raw key, value)` pairs, converting each key.
    ///
    /// # Errors
    ///
    /// Returns [`XmrError::TypeConversion`] naming the first key that fails to
    /// convert, in addition to the conditions of [`Series::new`].
    pub fn try_from_pairs<R, I>(pairs: I) -> XmrResult<Self>
    where
        I: IntoIterator<Item = (R, f64)>,
        R: TryInto<K> + Debug + Clone,
    {
        let mut keys: Vec<K> = Vec::new();
        let mut values = Vec::new();
        for (raw, value) in pairs {
            let key = TryInto::<K>::try_into(raw.clone())
                .map_err(|_| XmrError::conversion(format!("key {raw:?} cannot be converted")))?;
            keys.push(key);
            values.push(value);
        }
        Self::new(keys, values)
    }

    /// Position of `key`, if present.
    pub fn position_of(&self, key: &K) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k.partial_cmp(key) == Some(Ordering::Equal))
    }
}

impl Series<usize> {
    /// Create a series keyed by position `0..n`.
    ///
    /// # Errors
    ///
    /// See [`Series::new`].
    pub fn from_values(values: Vec<f64>) -> XmrResult<Self> {
        let keys = (0..values.len()).collect();
        Self::new(keys, values)
    }
}

impl<K> Series<K> {
    /// Keys in order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Values in key order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; a series is never empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Settings for an XmR chart build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmrConfig {
    /// Aggregate for center lines and the moving range center.
    pub method: AggregateMethod,
    /// Fit a linear trend instead of flat limits.
    pub sloped: bool,
    /// Highlight buffer as a fraction of the value axis span.
    pub buffer_pct: f64,
    /// Consecutive points on one side of center for a long run.
    pub long_run_length: usize,
    /// Trailing window size for short runs.
    pub short_run_window: usize,
    /// Points beyond a midrange within the window for a short run.
    pub short_run_required: usize,
}

impl Default for XmrConfig {
    fn default() -> Self {
        Self {
            method: AggregateMethod::Mean,
            sloped: false,
            buffer_pct: 0.05,
            long_run_length: 8,
            short_run_window: 4,
            short_run_required: 3,
        }
    }
}

impl XmrConfig {
    /// Parse a JSON configuration document; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`XmrError::InvalidArgument`] for malformed JSON, unknown
    /// method names or values rejected by [`XmrConfig::validate`].
    pub fn from_json(json: &str) -> XmrResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| XmrError::invalid(format!("invalid xmr configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings describe a usable chart.
    ///
    /// # Errors
    ///
    /// Returns [`XmrError::InvalidArgument`] naming the offending setting.
    pub fn validate(&self) -> XmrResult<()> {
        if !self.buffer_pct.is_finite() || self.buffer_pct < 0.0 {
            return Err(XmrError::invalid(format!(
                "buffer_pct must be a non-negative finite number, got {}",
                self.buffer_pct
            )));
        }
        if self.long_run_length == 0 {
            return Err(XmrError::invalid("long_run_length must be at least 1"));
        }
        if self.short_run_window == 0 || self.short_run_required == 0 {
            return Err(XmrError::invalid(
                "short_run_window and short_run_required must be at least 1",
            ));
        }
        if self.short_run_required > self.short_run_window {
            return Err(XmrError::invalid(format!(
                "short_run_required ({}) exceeds short_run_window ({})",
                self.short_run_required, self.short_run_window
            )));
        }
        Ok(())
    }

    /// The limit calculator these settings describe.
    pub fn limit_calculator(&self) -> LimitCalculator {
        LimitCalculator::new(self.method).sloped(self.sloped)
    }

    /// The signal detector these settings describe.
    pub fn signal_detector(&self) -> SignalDetector {
        SignalDetector {
            long_run: LongRunRule {
                length: self.long_run_length,
            },
            short_run: ShortRunRule {
                window: self.short_run_window,
                required: self.short_run_required,
            },
            buffer_pct: self.buffer_pct,
        }
    }
}

/// A fully computed XmR chart.
#[derive(Debug, Clone, PartialEq)]
pub struct XmrChart<K> {
    series: Series<K>,
    cutoff: usize,
    limits: LimitSet,
    moving_range: Vec<f64>,
    value_axis: AxisRange,
    moving_range_axis: AxisRange,
    signals: Signals,
}

impl<K: PartialOrd + Debug + Clone> XmrChart<K> {
    /// Build the chart for `series`.
    ///
    /// Limits are estimated from every observation whose key is at or before
    /// `cutoff` (inclusive); with no cutoff the whole series is used. Signals
    /// are evaluated across the full series.
    ///
    /// # Errors
    ///
    /// Returns [`XmrError::InvalidArgument`] if the configuration is invalid,
    /// `cutoff` is not a key of the series, or fewer than 2 observations are
    /// in sample.
    ///
    /// # Examples
    ///
    /// ```
    /// use spc_xmr::spc::{Series, XmrChart, XmrConfig};
    ///
    /// let values = vec![10.0, 12.0, 11.0, 13.0, 10.0, 14.0, 11.0, 12.0, 13.0, 10.0, 40.0];
    /// let series = Series::from_values(values).unwrap();
    /// let chart = XmrChart::build(&series, Some(&9), &XmrConfig::default()).unwrap();
    ///
    /// assert_eq!(chart.limits().in_sample_len, 10);
    /// assert_eq!(chart.signals().anomalies.len(), 1);
    /// assert_eq!(chart.signals().anomalies[0].index, 10);
    /// ```
    pub fn build(series: &Series<K>, cutoff: Option<&K>, config: &XmrConfig) -> XmrResult<Self> {
        config.validate()?;

        let cutoff = match cutoff {
            Some(key) => series
                .position_of(key)
                .ok_or_else(|| XmrError::invalid(format!("cutoff {key:?} not present in series")))?,
            None => series.len() - 1,
        };

        let values = series.values();
        let limits = config.limit_calculator().calculate(values, Some(cutoff))?;
        let moving_range = moving_range(values);
        let value_axis = value_axis_range(values, &limits)?;
        let moving_range_axis = moving_range_axis_range(&moving_range, &limits)?;
        let signals = config
            .signal_detector()
            .detect(values, &moving_range, &limits, &value_axis);

        debug!(
            points = series.len(),
            cutoff,
            method = %config.method,
            sloped = config.sloped,
            in_control = signals.is_in_control(),
            "built xmr chart"
        );

        Ok(Self {
            series: series.clone(),
            cutoff,
            limits,
            moving_range,
            value_axis,
            moving_range_axis,
            signals,
        })
    }
}

impl<K> XmrChart<K> {
    /// The charted series.
    pub fn series(&self) -> &Series<K> {
        &self.series
    }

    /// Key of the last in-sample observation.
    pub fn cutoff_key(&self) -> &K {
        &self.series.keys[self.cutoff]
    }

    /// Position of the last in-sample observation.
    pub fn cutoff_position(&self) -> usize {
        self.cutoff
    }

    /// Computed limits.
    pub fn limits(&self) -> &LimitSet {
        &self.limits
    }

    /// Full moving range series, `NaN` at position 0.
    pub fn moving_range(&self) -> &[f64] {
        &self.moving_range
    }

    /// Individuals panel axis range.
    pub fn value_axis(&self) -> &AxisRange {
        &self.value_axis
    }

    /// Moving range panel axis range.
    pub fn moving_range_axis(&self) -> &AxisRange {
        &self.moving_range_axis
    }

    /// Detected signals.
    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    /// Returns `true` if no signal of any class was found.
    pub fn is_in_control(&self) -> bool {
        self.signals.is_in_control()
    }
}
