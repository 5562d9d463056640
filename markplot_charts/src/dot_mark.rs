// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dot mark.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec;

use markplot_core::{Node, PathChannels};
use markplot_transforms::{Data, Value};

use crate::channel::{ChannelFilter, ChannelSpec, ChannelValue, Values, split_tuple};
use crate::error::Error;
use crate::layout::Dimensions;
use crate::mark::{Mark, MarkCore, MarkOptions};
use crate::scales::ScaleFunctions;
use crate::style::{StyleDefaults, title_at};
use crate::symbol::Symbol;

/// Radius used without an `r` channel.
pub const DEFAULT_DOT_RADIUS: f64 = 3.0;

/// Options for [`Dot`].
#[derive(Clone, Debug, Default)]
pub struct DotOptions {
    /// Horizontal position; the frame center when absent.
    pub x: Option<ChannelValue>,
    /// Vertical position; the frame center when absent.
    pub y: Option<ChannelValue>,
    /// Radius. A constant number is a fixed radius; anything else is encoded by the `r`
    /// scale.
    pub r: Option<ChannelValue>,
    /// Symbol shape.
    pub symbol: Symbol,
    /// Shared mark options.
    pub mark: MarkOptions,
}

impl DotOptions {
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

    /// Sets the radius.
    pub fn with_r(mut self, r: impl Into<ChannelValue>) -> Self {
        self.r = Some(r.into());
        self
    }

    /// Sets the symbol.
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    /// Sets the shared mark options.
    pub fn with_mark(mut self, mark: MarkOptions) -> Self {
        self.mark = mark;
        self
    }
}

/// A symbol at each `(x, y)`.
#[derive(Debug)]
pub struct Dot {
    core: MarkCore,
    radius: f64,
    symbol: Symbol,
}

impl Dot {
    /// Builds a dot mark. Without `x` and `y`, rows are `(x, y)` tuples.
    pub fn new(data: Option<Data>, options: DotOptions) -> Result<Self, Error> {
        let (x, y) = split_tuple(options.x, options.y);
        let (radius, r) = match options.r {
            Some(ChannelValue::Constant(Value::Number(r))) => (r, None),
            r => (DEFAULT_DOT_RADIUS, r),
        };
        let positive =
            ChannelFilter::Custom(Arc::new(|v: &Value| v.as_f64().is_some_and(|n| n > 0.0)));
        let channels = vec![
            ChannelSpec::new("x", x).with_scale("x").optional(),
            ChannelSpec::new("y", y).with_scale("y").optional(),
            ChannelSpec::new("r", r)
                .with_scale("r")
                .optional()
                .with_filter(positive),
        ];
        let core = MarkCore::new(data, channels, options.mark, &StyleDefaults::stroked("dot"))?;
        Ok(Self {
            core,
            radius,
            symbol: options.symbol,
        })
    }
}

impl Mark for Dot {
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
        let frame = dimensions.frame();
        let center = frame.center();
        let half_band = |name: &str| scales.get(name).map_or(0.0, |s| s.bandwidth() * 0.5);
        let (bx, by) = (half_band("x"), half_band("y"));
        let style = self.core.style();
        let mut group = self.core.group(dimensions);
        group.append_all(index.iter().copied(), |i| {
            let cx = values.number("x", i).map_or(center.x, |x| x + bx);
            let cy = values.number("y", i).map_or(center.y, |y| y + by);
            let r = values.number("r", i).unwrap_or(self.radius);
            let mut node = Node::path(PathChannels {
                path: self.symbol.path(cx, cy, r),
                fill: style.fill_at(values, i),
                stroke: style.stroke_at(values, i),
                stroke_width: style.stroke_width,
            });
            if let Some(title) = title_at(values, i) {
                node.append(Node::title(title));
            }
            node
        });
        Some(group)
    }
}

/// A dot mark over `data`.
pub fn dot(data: Data, options: DotOptions) -> Result<Arc<Dot>, Error> {
    Dot::new(Some(data), options).map(Arc::new)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;

    use markplot_core::Payload;
    use markplot_transforms::Table;

    use super::*;
    use crate::channel::ChannelMap;
    use crate::warnings::Warnings;

    #[test]
    fn constant_radius_is_not_a_channel() {
        let data = Table::from_rows([vec![Value::from(1), Value::from(2)]]).into_data();
        let mark = dot(data.clone(), DotOptions::new().with_r(5.0)).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert!(!state.channels.contains("r"));
        assert_eq!(mark.radius, 5.0);

        let mark = dot(data, DotOptions::new().with_r(ChannelValue::Index)).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert_eq!(state.channels.get("r").unwrap().scale.as_deref(), Some("r"));
    }

    #[test]
    fn zero_radius_dots_are_filtered() {
        let data = Table::from_rows([
            vec![Value::from(1), Value::from(2)],
            vec![Value::from(3), Value::from(4)],
        ])
        .into_data();
        let mark = dot(data, DotOptions::new().with_r(ChannelValue::Index)).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        let values = Values::from_channels(&state.channels, &ScaleFunctions::new());
        assert_eq!(mark.filter(&[0, 1], &state.channels, &values), [1]);
    }

    #[test]
    fn missing_positions_fall_back_to_frame_center() {
        let data = Table::from_values([Value::from("a")]).into_data();
        let mark = dot(data, DotOptions::new().with_x(ChannelValue::Identity)).unwrap();
        let dims = Dimensions::default();
        let mut values = Values::default();
        values.insert("x", vec![Value::Number(100.0)]);
        let node = mark
            .render(Some(&[0]), &ScaleFunctions::new(), &values, &dims)
            .unwrap();
        let centers: Vec<_> = node
            .children
            .iter()
            .filter_map(|c| match c.payload() {
                Some(Payload::Path(p)) => Some(kurbo::Shape::bounding_box(&p.path).center()),
                _ => None,
            })
            .collect();
        assert_eq!(centers.len(), 1);
        assert!((centers[0].x - 100.0).abs() < 1e-6);
        assert!((centers[0].y - dims.frame().center().y).abs() < 1e-6);
        assert_eq!(mark.filter(&[0], &ChannelMap::new(), &values), [0]);
    }
}
