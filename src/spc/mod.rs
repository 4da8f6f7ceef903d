//! XmR (Individuals and Moving Range) control charts.
//!
//! Computes the limits of an XmR chart from a time-ordered series and detects
//! the signals that mark a process as out of control.
//!
//! # Limits
//!
//! - [`LimitCalculator`] — center line, natural process limits and moving range
//!   limits, flat or sloped (linear trend)
//! - [`XmrConstants`] — scaling constants for mean- and median-based limits
//!
//! # Signals
//!
//! - [`beyond_limits`] — points at or beyond the natural process limits
//! - [`LongRunRule`] — 8 consecutive points on one side of the center line
//! - [`ShortRunRule`] — 3 of 4 consecutive points beyond a midrange line
//! - [`merge_paths`] — consolidates overlapping run windows into regions
//! - [`SignalDetector`] — applies all of the above
//!
//! # Pipeline
//!
//! - [`XmrChart`] — builds limits, axis ranges and signals for a keyed [`Series`]
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation: The Key to Managing Chaos*, 2nd ed.
//! - Wheeler, D.J. & Chambers, D.S. (1992). *Understanding Statistical Process Control*, 2nd ed.

mod axes;
mod chart;
mod limits;
mod outline;
mod paths;
mod rules;
mod signals;
mod xmr;

pub use axes::{
    moving_range_axis_range, rounded_value, rounding_multiple, value_axis_range, AxisRange,
    RoundingDirection,
};
pub use chart::{
    LimitLine, LimitSet, LinePoint, MergedPath, PathPoint, Run, SignalPoint, SignalTag,
};
pub use limits::{moving_range, LimitCalculator, XmrConstants};
pub use outline::{Outline, OutlineVertex};
pub use paths::merge_paths;
pub use rules::{beyond_limits, moving_range_beyond_limit, LongRunRule, RunRule, ShortRunRule};
pub use signals::{HighlightRegion, SignalDetector, Signals};
pub use xmr::{Series, XmrChart, XmrConfig};
