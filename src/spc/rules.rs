//! Signal rules for XmR charts.
//!
//! Three classes of signal are detected on the individuals chart:
//!
//! - points at or beyond the natural process limits,
//! - long runs: 8 consecutive points strictly on one side of the center line,
//! - short runs: 3 of 4 consecutive points strictly beyond a midrange line.
//!
//! Points on the moving range chart at or above its upper limit are reported
//! separately. Run rules emit one trailing window per triggering point; the
//! windows overlap and are consolidated by [`merge_paths`](super::merge_paths).
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation: The Key to Managing Chaos*, 2nd ed.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

use super::chart::{LimitSet, Run, SignalPoint, SignalTag};

/// Trait for rules that flag windows of consecutive points.
pub trait RunRule {
    /// Check `values` against `limits` and return every flagged window,
    /// ordered by the index of the window's last point.
    fn check(&self, values: &[f64], limits: &LimitSet) -> Vec<Run>;
}

/// Consecutive points strictly on one side of the center line.
///
/// For each index `i` the trailing window `[i - length + 1, i]` (clamped at 0)
/// is inspected, and it must contain `length` points above (or below) the
/// center. Windows clipped at the start of the series are therefore never
/// flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongRunRule {
    /// Required run length.
    pub length: usize,
}

impl Default for LongRunRule {
    fn default() -> Self {
        Self { length: 8 }
    }
}

/// Most points of a short window strictly beyond a midrange line.
///
/// The midrange lines sit halfway between the center line and each natural
/// limit. The upper side is checked first; a window is flagged at most once.
/// Series shorter than `window` are never flagged, but once the series is long
/// enough the clipped windows at its start are still checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortRunRule {
    /// Trailing window size.
    pub window: usize,
    /// Points in the window required beyond the midrange.
    pub required: usize,
}

impl Default for ShortRunRule {
    fn default() -> Self {
        Self {
            window: 4,
            required: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Point rules
// ---------------------------------------------------------------------------

/// Points at or beyond the natural process limits.
///
/// A point with `value >= upper` is tagged `High`; otherwise a point with
/// `value <= lower` is tagged `Low`. Both bounds are inclusive, and when
/// degenerate limits satisfy both conditions `High` wins.
pub fn beyond_limits(values: &[f64], limits: &LimitSet) -> Vec<SignalPoint> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, &v)| {
            let tag = if v >= limits.upper_natural_limit.at(i) {
                SignalTag::High
            } else if v <= limits.lower_natural_limit.at(i) {
                SignalTag::Low
            } else {
                return None;
            };
            Some(SignalPoint {
                index: i,
                value: v,
                tag: Some(tag),
            })
        })
        .collect()
}

/// Moving range points at or above the moving range upper limit.
///
/// `NaN` entries (the leading undefined range) never qualify. Points are
/// untagged since the moving range has only an upper limit.
pub fn moving_range_beyond_limit(moving_range: &[f64], upper_limit: f64) -> Vec<SignalPoint> {
    moving_range
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v >= upper_limit)
        .map(|(i, &v)| SignalPoint {
            index: i,
            value: v,
            tag: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// RunRule implementations
// ---------------------------------------------------------------------------

impl RunRule for LongRunRule {
    /// Flag every full trailing window lying strictly on one side of the center.
    ///
    /// Each point in a flagged window is tagged against its own center value:
    /// `High` when `value >= center`, else `Low`.
    fn check(&self, values: &[f64], limits: &LimitSet) -> Vec<Run> {
        let mut runs = Vec::new();
        if self.length == 0 || values.len() < self.length {
            return runs;
        }

        let above: Vec<bool> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| v > limits.center.at(i))
            .collect();
        let below: Vec<bool> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| v < limits.center.at(i))
            .collect();

        for i in 0..values.len() {
            let start = (i + 1).saturating_sub(self.length);
            let above_count = above[start..=i].iter().filter(|&&b| b).count();
            let below_count = below[start..=i].iter().filter(|&&b| b).count();
            if above_count < self.length && below_count < self.length {
                continue;
            }

            let points = (start..=i)
                .map(|j| {
                    let tag = if values[j] >= limits.center.at(j) {
                        SignalTag::High
                    } else {
                        SignalTag::Low
                    };
                    SignalPoint {
                        index: j,
                        value: values[j],
                        tag: Some(tag),
                    }
                })
                .collect();
            runs.push(Run { points });
        }
        runs
    }
}

impl RunRule for ShortRunRule {
    /// Flag trailing windows with at least `required` points beyond a midrange.
    ///
    /// Every point in a flagged window carries the window's tag.
    fn check(&self, values: &[f64], limits: &LimitSet) -> Vec<Run> {
        let mut runs = Vec::new();
        if self.window == 0 || self.required == 0 || values.len() < self.window {
            return runs;
        }

        let beyond_upper: Vec<bool> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| v > limits.upper_midrange(i))
            .collect();
        let beyond_lower: Vec<bool> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| v < limits.lower_midrange(i))
            .collect();

        for i in 0..values.len() {
            let start = (i + 1).saturating_sub(self.window);

            // Upper side takes priority
            let upper_count = beyond_upper[start..=i].iter().filter(|&&b| b).count();
            let tag = if upper_count >= self.required {
                SignalTag::High
            } else {
                let lower_count = beyond_lower[start..=i].iter().filter(|&&b| b).count();
                if lower_count >= self.required {
                    SignalTag::Low
                } else {
                    continue;
                }
            };

            let points = (start..=i)
                .map(|j| SignalPoint {
                    index: j,
                    value: values[j],
                    tag: Some(tag),
                })
                .collect();
            runs.push(Run { points });
        }
        runs
    }
}
