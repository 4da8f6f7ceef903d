//! Highlight outlines around merged run paths.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::chart::MergedPath;

/// A vertex of a highlight outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlineVertex {
    /// Zero-based position in the full series (the x coordinate).
    pub index: usize,
    /// Buffered value (the y coordinate).
    pub value: f64,
}

/// Closed polygon enclosing a merged path.
///
/// The upper edge traces `(index, value + buffer)` left to right and the
/// lower edge traces `(index, value - buffer)` right to left, so walking the
/// vertices and returning to the first one closes the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Vertices in drawing order.
    pub vertices: Vec<OutlineVertex>,
}

impl Outline {
    /// Build the outline of `path`, offset vertically by `buffer`.
    pub fn around(path: &MergedPath, buffer: f64) -> Self {
        let upper = path.points.iter().map(|p| OutlineVertex {
            index: p.index,
            value: p.value + buffer,
        });
        let lower = path.points.iter().rev().map(|p| OutlineVertex {
            index: p.index,
            value: p.value - buffer,
        });
        Self {
            vertices: upper.chain(lower).collect(),
        }
    }

    /// Returns `true` if the outline has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Render as an SVG path string: `M x y L x y ... Z`.
    ///
    /// An empty outline renders as an empty string.
    pub fn to_svg_path(&self) -> String {
        let mut out = String::new();
        for (i, v) in self.vertices.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            // Writing to a String cannot fail
            let _ = write!(out, "{cmd} {} {}", v.index, v.value);
        }
        if !out.is_empty() {
            out.push_str(" Z");
        }
        out
    }
}
