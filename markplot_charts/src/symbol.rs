// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dot symbols.

use kurbo::{BezPath, Circle, Shape};

/// Shape drawn at each dot position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A circle.
    #[default]
    Circle,
    /// An axis-aligned square.
    Square,
}

impl Symbol {
    /// Returns a path for this symbol centered at `(cx, cy)` with radius `r`.
    pub fn path(self, cx: f64, cy: f64, r: f64) -> BezPath {
        match self {
            Self::Circle => Circle::new((cx, cy), r).path_elements(0.1).collect(),
            Self::Square => {
                let mut p = BezPath::new();
                p.move_to((cx - r, cy - r));
                p.line_to((cx + r, cy - r));
                p.line_to((cx + r, cy + r));
                p.line_to((cx - r, cy + r));
                p.close_path();
                p
            }
        }
    }
}
