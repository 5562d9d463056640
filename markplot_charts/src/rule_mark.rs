// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule mark.
//!
//! A "rule" is a straight line segment across the frame, often used for baselines and
//! reference values. Vertical rules sit at `x` and span `y1..y2`; horizontal rules sit at
//! `y` and span `x1..x2`. A missing end spans the frame.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec;

use kurbo::BezPath;
use markplot_core::{Node, PathChannels};
use markplot_transforms::Data;
use peniko::{Brush, Color};

use crate::channel::{ChannelSpec, ChannelValue, Values};
use crate::error::Error;
use crate::layout::Dimensions;
use crate::mark::{Mark, MarkCore, MarkOptions};
use crate::scales::ScaleFunctions;
use crate::style::{StyleDefaults, title_at};

/// Rule direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleAxis {
    /// Vertical rules at `x` (a `ruleX`).
    X,
    /// Horizontal rules at `y` (a `ruleY`).
    Y,
}

/// Options for [`Rule`].
#[derive(Clone, Debug, Default)]
pub struct RuleOptions {
    /// Position along the rule's axis; the datum when unset.
    pub value: Option<ChannelValue>,
    /// Start along the other axis.
    pub start: Option<ChannelValue>,
    /// End along the other axis.
    pub end: Option<ChannelValue>,
    /// Shared mark options.
    pub mark: MarkOptions,
}

impl RuleOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the position.
    pub fn with_value(mut self, value: impl Into<ChannelValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the extent along the other axis.
    pub fn with_extent(
        mut self,
        start: impl Into<ChannelValue>,
        end: impl Into<ChannelValue>,
    ) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    /// Sets the shared mark options.
    pub fn with_mark(mut self, mark: MarkOptions) -> Self {
        self.mark = mark;
        self
    }
}

/// A rule per row.
#[derive(Debug)]
pub struct Rule {
    core: MarkCore,
    axis: RuleAxis,
}

impl Rule {
    /// Builds a vertical ([`RuleAxis::X`]) or horizontal ([`RuleAxis::Y`]) rule.
    pub fn new(data: Option<Data>, axis: RuleAxis, options: RuleOptions) -> Result<Self, Error> {
        let (at, other, label) = match axis {
            RuleAxis::X => ("x", "y", "rule-x"),
            RuleAxis::Y => ("y", "x", "rule-y"),
        };
        let value = options.value.or(Some(ChannelValue::Identity));
        let channels = vec![
            ChannelSpec::new(at, value).with_scale(at),
            ChannelSpec::new(alloc::format!("{other}1"), options.start)
                .with_scale(other)
                .optional(),
            ChannelSpec::new(alloc::format!("{other}2"), options.end)
                .with_scale(other)
                .optional(),
        ];
        let core = MarkCore::new(data, channels, options.mark, &StyleDefaults::stroked(label))?;
        Ok(Self { core, axis })
    }
}

impl Mark for Rule {
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
        let half_band = |name: &str| scales.get(name).map_or(0.0, |s| s.bandwidth() * 0.5);
        let style = self.core.style();
        let mut group = self.core.group(dimensions);
        group.append_all(index.iter().copied(), |i| {
            let mut path = BezPath::new();
            match self.axis {
                RuleAxis::X => {
                    let x = values.number("x", i).unwrap_or(frame.x0) + half_band("x");
                    path.move_to((x, values.number("y1", i).unwrap_or(frame.y1)));
                    path.line_to((x, values.number("y2", i).unwrap_or(frame.y0)));
                }
                RuleAxis::Y => {
                    let y = values.number("y", i).unwrap_or(frame.y1) + half_band("y");
                    path.move_to((values.number("x1", i).unwrap_or(frame.x0), y));
                    path.line_to((values.number("x2", i).unwrap_or(frame.x1), y));
                }
            }
            let mut node = Node::path(PathChannels {
                path,
                fill: Brush::Solid(Color::TRANSPARENT),
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

/// Vertical rules at each datum (or `options.value`).
pub fn rule_x(data: Data, options: RuleOptions) -> Result<Arc<Rule>, Error> {
    Rule::new(Some(data), RuleAxis::X, options).map(Arc::new)
}

/// Horizontal rules at each datum (or `options.value`).
pub fn rule_y(data: Data, options: RuleOptions) -> Result<Arc<Rule>, Error> {
    Rule::new(Some(data), RuleAxis::Y, options).map(Arc::new)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use kurbo::{PathEl, Point};
    use markplot_core::Payload;
    use markplot_transforms::{Table, Value};

    use super::*;
    use crate::warnings::Warnings;

    #[test]
    fn rule_y_spans_the_frame() {
        let data = Table::from_values([Value::from(0)]).into_data();
        let mark = rule_y(data, RuleOptions::new()).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        let names: alloc::vec::Vec<_> = state.channels.names().collect();
        assert_eq!(names, ["y"]);

        let dims = Dimensions::default();
        let mut values = Values::default();
        values.insert("y", vec![Value::Number(50.0)]);
        let node = mark
            .render(Some(&[0]), &ScaleFunctions::new(), &values, &dims)
            .unwrap();
        assert_eq!(node.attr("aria-label"), Some("rule-y"));
        let Some(Payload::Path(p)) = node.children[0].payload() else {
            panic!("expected a path payload");
        };
        let frame = dims.frame();
        assert_eq!(
            p.path.elements(),
            [
                PathEl::MoveTo(Point::new(frame.x0, 50.0)),
                PathEl::LineTo(Point::new(frame.x1, 50.0)),
            ]
        );
    }

    #[test]
    fn rule_x_extent_channels_use_the_y_scale() {
        let data = Table::from_values([Value::from(1)]).into_data();
        let mark = rule_x(data, RuleOptions::new().with_extent(0.0, 10.0)).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert_eq!(state.channels.get("y1").unwrap().scale.as_deref(), Some("y"));
        assert_eq!(state.channels.get("y2").unwrap().value, [Value::from(10)]);
    }
}
