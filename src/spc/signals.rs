//! Signal detection over a computed [`LimitSet`].
//!
//! [`SignalDetector`] applies the point and run rules, merges the overlapping
//! run windows and attaches a highlight [`Outline`] to every merged path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::axes::AxisRange;
use super::chart::{LimitSet, MergedPath, Run, SignalPoint};
use super::outline::Outline;
use super::paths::merge_paths;
use super::rules::{beyond_limits, moving_range_beyond_limit, LongRunRule, RunRule, ShortRunRule};

/// A merged run path with its highlight outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRegion {
    /// Points covered by the region.
    pub path: MergedPath,
    /// Buffered polygon around `path`.
    pub outline: Outline,
}

/// Every signal found on one chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signals {
    /// Individual values at or beyond the natural process limits.
    pub anomalies: Vec<SignalPoint>,
    /// Moving ranges at or above the moving range upper limit.
    pub moving_range_anomalies: Vec<SignalPoint>,
    /// Merged long-run regions.
    pub long_runs: Vec<HighlightRegion>,
    /// Merged short-run regions.
    pub short_runs: Vec<HighlightRegion>,
}

impl Signals {
    /// Returns `true` if no signal of any class was found.
    pub fn is_in_control(&self) -> bool {
        self.anomalies.is_empty()
            && self.moving_range_anomalies.is_empty()
            && self.long_runs.is_empty()
            && self.short_runs.is_empty()
    }
}

/// Detects out-of-limit points, long runs and short runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDetector {
    /// Long run rule.
    pub long_run: LongRunRule,
    /// Short run rule.
    pub short_run: ShortRunRule,
    /// Outline buffer as a fraction of the value axis span.
    pub buffer_pct: f64,
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self {
            long_run: LongRunRule::default(),
            short_run: ShortRunRule::default(),
            buffer_pct: 0.05,
        }
    }
}

impl SignalDetector {
    /// Detect all signals.
    ///
    /// `values` is the full individuals series, `moving_range` its full moving
    /// range series and `value_axis` the individuals panel range that scales
    /// the outline buffer.
    pub fn detect(
        &self,
        values: &[f64],
        moving_range: &[f64],
        limits: &LimitSet,
        value_axis: &AxisRange,
    ) -> Signals {
        let buffer = value_axis.span() * self.buffer_pct;

        let anomalies = beyond_limits(values, limits);
        let moving_range_anomalies =
            moving_range_beyond_limit(moving_range, limits.moving_range_upper_limit);
        let long_runs = highlight(self.long_run.check(values, limits), buffer);
        let short_runs = highlight(self.short_run.check(values, limits), buffer);

        debug!(
            anomalies = anomalies.len(),
            moving_range_anomalies = moving_range_anomalies.len(),
            long_runs = long_runs.len(),
            short_runs = short_runs.len(),
            buffer,
            "detected xmr signals"
        );

        Signals {
            anomalies,
            moving_range_anomalies,
            long_runs,
            short_runs,
        }
    }
}

/// Merge `runs` and outline each merged path.
fn highlight(runs: Vec<Run>, buffer: f64) -> Vec<HighlightRegion> {
    merge_paths(runs)
        .into_iter()
        .map(|path| {
            let outline = Outline::around(&path, buffer);
            HighlightRegion { path, outline }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateMethod;
    use crate::spc::chart::{LimitLine, SignalTag};

    fn flat_limits(ucl: f64, cl: f64, lcl: f64) -> LimitSet {
        LimitSet {
            center: LimitLine::Flat(cl),
            upper_natural_limit: LimitLine::Flat(ucl),
            lower_natural_limit: LimitLine::Flat(lcl),
            moving_range_center: 2.0,
            moving_range_upper_limit: 6.536,
            method: AggregateMethod::Mean,
            in_sample_len: 0,
        }
    }

    fn axis(min: f64, max: f64) -> AxisRange {
        AxisRange {
            min,
            max,
            dtick: None,
        }
    }

    #[test]
    fn test_long_run_merged_to_one_region() {
        let limits = flat_limits(10.0, 0.0, -10.0);
        let values = [1.0; 10];
        let signals = SignalDetector::default().detect(&values, &[], &limits, &axis(-10.0, 10.0));
        assert_eq!(signals.long_runs.len(), 1);
        let region = &signals.long_runs[0];
        assert_eq!(region.path.first_index(), Some(0));
        assert_eq!(region.path.last_index(), Some(9));
        // buffer = 20 * 0.05 = 1
        assert!((region.outline.vertices[0].value - 2.0).abs() < f64::EPSILON);
        assert!((region.outline.vertices[19].value).abs() < f64::EPSILON);
    }

    #[test]
    fn test_separate_short_runs() {
        let limits = flat_limits(10.0, 0.0, -10.0);
        let values = [6.0, 6.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0, -6.0, -6.0, -6.0];
        let signals = SignalDetector::default().detect(&values, &[], &limits, &axis(-20.0, 20.0));
        assert_eq!(signals.short_runs.len(), 2);
        assert_eq!(signals.short_runs[0].path.last_index(), Some(3));
        assert_eq!(signals.short_runs[1].path.first_index(), Some(7));
        assert_eq!(signals.short_runs[1].path.last_index(), Some(10));
    }

    #[test]
    fn test_anomalies_and_moving_range() {
        let limits = flat_limits(10.0, 0.0, 0.0);
        let values = [1.0, 12.0, 1.0];
        let mr = [f64::NAN, 11.0, 11.0];
        let signals = SignalDetector::default().detect(&values, &mr, &limits, &axis(0.0, 15.0));
        assert_eq!(signals.anomalies.len(), 1);
        assert_eq!(signals.anomalies[0].tag, Some(SignalTag::High));
        assert_eq!(signals.moving_range_anomalies.len(), 2);
        assert!(!signals.is_in_control());
    }

    #[test]
    fn test_quiet_series_in_control() {
        let limits = flat_limits(10.0, 5.0, 0.0);
        let values = [5.0, 4.0, 6.0, 5.0, 4.0, 6.0];
        let mr = [f64::NAN, 1.0, 2.0, 1.0, 1.0, 2.0];
        let signals = SignalDetector::default().detect(&values, &mr, &limits, &axis(0.0, 10.0));
        assert!(signals.is_in_control());
        assert_eq!(signals, Signals::default());
    }
}
