// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical bar mark.
//!
//! Bars sit in the bands of the `x` scale and span `y1..y2` on the `y` scale. By default
//! `y1` is zero and `y2` is the value.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec;

use kurbo::Rect;
use markplot_core::{Node, RectChannels};
use markplot_transforms::{Data, Value};

use crate::channel::{ChannelSpec, ChannelValue, Values, split_tuple};
use crate::error::Error;
use crate::layout::Dimensions;
use crate::mark::{Mark, MarkCore, MarkOptions};
use crate::scales::ScaleFunctions;
use crate::style::{StyleDefaults, title_at};

/// Options for [`BarY`].
#[derive(Clone, Debug, Default)]
pub struct BarYOptions {
    /// Band position.
    pub x: Option<ChannelValue>,
    /// Value; becomes `y2`.
    pub y: Option<ChannelValue>,
    /// Baseline; zero when unset.
    pub y1: Option<ChannelValue>,
    /// Shared mark options.
    pub mark: MarkOptions,
}

impl BarYOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `x`.
    pub fn with_x(mut self, x: impl Into<ChannelValue>) -> Self {
        self.x = Some(x.into());
        self
    }

    /// Sets `y`.
    pub fn with_y(mut self, y: impl Into<ChannelValue>) -> Self {
        self.y = Some(y.into());
        self
    }

    /// Sets the baseline.
    pub fn with_y1(mut self, y1: impl Into<ChannelValue>) -> Self {
        self.y1 = Some(y1.into());
        self
    }

    /// Sets the shared mark options.
    pub fn with_mark(mut self, mark: MarkOptions) -> Self {
        self.mark = mark;
        self
    }
}

/// A vertical bar per row.
#[derive(Debug)]
pub struct BarY {
    core: MarkCore,
}

impl BarY {
    /// Builds vertical bars. Without `x` and `y`, rows are `(x, y)` tuples.
    pub fn new(data: Option<Data>, options: BarYOptions) -> Result<Self, Error> {
        let (x, y) = split_tuple(options.x, options.y);
        let y1 = options
            .y1
            .unwrap_or(ChannelValue::Constant(Value::Number(0.0)));
        let channels = vec![
            ChannelSpec::new("x", x).with_scale("x").with_band(),
            ChannelSpec::new("y1", Some(y1)).with_scale("y"),
            ChannelSpec::new("y2", y).with_scale("y"),
        ];
        let core = MarkCore::new(data, channels, options.mark, &StyleDefaults::filled("bar"))?;
        Ok(Self { core })
    }
}

impl Mark for BarY {
    fn core(&self) -> &MarkCore {
        &self.core
    }

    fn render(
        &self,
        index: Option<&[usize]>,
        scales: &ScaleFunctions,
        values: &Values,
        dimensions: &Dimensions,
    ) -> Option<Node> {
        let index = index?;
        let bandwidth = scales.get("x").map_or(0.0, |s| s.bandwidth());
        let style = self.core.style();
        let mut group = self.core.group(dimensions);
        for &i in index {
            let (Some(x), Some(y1), Some(y2)) = (
                values.number("x", i),
                values.number("y1", i),
                values.number("y2", i),
            ) else {
                continue;
            };
            let mut node = Node::rect(RectChannels {
                rect: Rect::new(x, y1.min(y2), x + bandwidth, y1.max(y2)),
                fill: style.fill_at(values, i),
                stroke: style.stroke_at(values, i),
                stroke_width: style.stroke_width,
            });
            if let Some(title) = title_at(values, i) {
                node.append(Node::title(title));
            }
            group.append(node);
        }
        Some(group)
    }
}

/// Vertical bars over `data`.
pub fn bar_y(data: Data, options: BarYOptions) -> Result<Arc<BarY>, Error> {
    BarY::new(Some(data), options).map(Arc::new)
}
