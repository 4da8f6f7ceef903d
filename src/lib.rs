//! # spc-xmr
//!
//! XmR (Individuals and Moving Range) control limits and signal detection for
//! statistical process control.
//!
//! The crate computes center lines, natural process limits and moving range
//! limits from a time-ordered series, then finds points beyond the limits,
//! long runs and short runs. Its output is plain numeric data: drawing the
//! chart is left to the caller.
//!
//! ## Modules
//!
//! - [`aggregate`] — Mean or median aggregation
//! - [`spc`] — Limits, signal rules, run merging and the chart pipeline
//! - [`error`] — Error type shared by all fallible operations
//!
//! ## Example
//!
//! ```
//! use spc_xmr::spc::{Series, XmrChart, XmrConfig};
//!
//! let series = Series::from_values(vec![5.0, 6.0, 5.5, 6.5, 5.0, 6.0, 5.5, 6.0]).unwrap();
//! let chart = XmrChart::build(&series, None, &XmrConfig::default()).unwrap();
//!
//! assert!(chart.is_in_control());
//! ```

pub mod aggregate;
pub mod error;
pub mod spc;

pub use error::{XmrError, XmrResult};
