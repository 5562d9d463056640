// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plot dimensions.
//!
//! Layout is a two-step measure/arrange: axes report how much room they need along their
//! normal ([`GuideExtents`]), then [`Dimensions::new`] grows the default margins to fit,
//! unless the caller pinned a margin explicitly.

use kurbo::Rect;

use crate::options::PlotOptions;

/// Default width in pixels.
pub const DEFAULT_WIDTH: f64 = 640.0;
/// Default height in pixels.
pub const DEFAULT_HEIGHT: f64 = 400.0;

/// Room requested by guides on each side, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct GuideExtents {
    pub(crate) top: f64,
    pub(crate) right: f64,
    pub(crate) bottom: f64,
    pub(crate) left: f64,
}

/// Outer size and margins of a plot (or of one facet panel).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Top margin.
    pub margin_top: f64,
    /// Right margin.
    pub margin_right: f64,
    /// Bottom margin.
    pub margin_bottom: f64,
    /// Left margin.
    pub margin_left: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            margin_top: 20.0,
            margin_right: 20.0,
            margin_bottom: 30.0,
            margin_left: 40.0,
        }
    }
}

impl Dimensions {
    /// Arranges the plot: explicit options win, otherwise default margins grow to fit the
    /// guides.
    pub(crate) fn new(options: &PlotOptions, guides: GuideExtents) -> Self {
        let d = Self::default();
        Self {
            width: options.width.unwrap_or(d.width),
            height: options.height.unwrap_or(d.height),
            margin_top: options
                .margin_top
                .unwrap_or_else(|| d.margin_top.max(guides.top)),
            margin_right: options
                .margin_right
                .unwrap_or_else(|| d.margin_right.max(guides.right)),
            margin_bottom: options
                .margin_bottom
                .unwrap_or_else(|| d.margin_bottom.max(guides.bottom)),
            margin_left: options
                .margin_left
                .unwrap_or_else(|| d.margin_left.max(guides.left)),
        }
    }

    /// The frame: the area inside the margins.
    pub fn frame(&self) -> Rect {
        Rect::new(
            self.margin_left,
            self.margin_top,
            (self.width - self.margin_right).max(self.margin_left),
            (self.height - self.margin_bottom).max(self.margin_top),
        )
    }

    /// Dimensions of one facet panel: each present facet axis replaces the extent with its
    /// bandwidth and zeroes the margins along it.
    pub fn facet(&self, fx_bandwidth: Option<f64>, fy_bandwidth: Option<f64>) -> Self {
        let mut d = *self;
        if let Some(bw) = fx_bandwidth {
            d.width = bw;
            d.margin_left = 0.0;
            d.margin_right = 0.0;
        }
        if let Some(bw) = fy_bandwidth {
            d.height = bw;
            d.margin_top = 0.0;
            d.margin_bottom = 0.0;
        }
        d
    }
}
