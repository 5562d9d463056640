// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line mark.
//!
//! A line connects its points in index order. Undefined points break the path instead of
//! being filtered out, and an optional `z` channel splits the index into series.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{BezPath, Point};
use markplot_core::{Node, PathChannels};
use markplot_transforms::{Data, Index, Value};
use peniko::Brush;
use peniko::Color;

use crate::channel::{ChannelFilter, ChannelMap, ChannelSpec, ChannelValue, Values, split_tuple};
use crate::error::Error;
use crate::layout::Dimensions;
use crate::mark::{Mark, MarkCore, MarkOptions};
use crate::scales::ScaleFunctions;
use crate::style::{StyleDefaults, title_at};

/// How consecutive points are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Curve {
    /// Straight segments.
    #[default]
    Linear,
    /// Horizontal then vertical, switching halfway between points.
    Step,
}

/// Options for [`Line`].
#[derive(Clone, Debug, Default)]
pub struct LineOptions {
    /// Horizontal position.
    pub x: Option<ChannelValue>,
    /// Vertical position.
    pub y: Option<ChannelValue>,
    /// Series key.
    pub z: Option<ChannelValue>,
    /// Curve.
    pub curve: Curve,
    /// Shared mark options.
    pub mark: MarkOptions,
}

impl LineOptions {
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

    /// Sets the series key.
    pub fn with_z(mut self, z: impl Into<ChannelValue>) -> Self {
        self.z = Some(z.into());
        self
    }

    /// Sets the curve.
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// Sets the shared mark options.
    pub fn with_mark(mut self, mark: MarkOptions) -> Self {
        self.mark = mark;
        self
    }
}

/// A polyline through `(x, y)` per series.
#[derive(Debug)]
pub struct Line {
    core: MarkCore,
    curve: Curve,
}

impl Line {
    /// Builds a line. Without `x` and `y`, rows are `(x, y)` tuples.
    pub fn new(data: Option<Data>, options: LineOptions) -> Result<Self, Error> {
        let (x, y) = split_tuple(options.x, options.y);
        let channels = vec![
            ChannelSpec::new("x", x).with_scale("x"),
            ChannelSpec::new("y", y).with_scale("y"),
            ChannelSpec::new("z", options.z)
                .optional()
                .with_filter(ChannelFilter::None),
        ];
        let core = MarkCore::new(data, channels, options.mark, &StyleDefaults::stroked("line"))?;
        Ok(Self {
            core,
            curve: options.curve,
        })
    }

    /// Index split into series by `z` (or `stroke`), in first-appearance order.
    fn series(&self, index: &[usize], values: &Values) -> Vec<Index> {
        let Some(keys) = values.get("z").or_else(|| values.get("stroke")) else {
            return vec![index.to_vec()];
        };
        let mut positions: HashMap<Option<&Value>, usize> = HashMap::new();
        let mut groups: Vec<Index> = Vec::new();
        for &i in index {
            let g = *positions.entry(keys.get(i)).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[g].push(i);
        }
        groups
    }

    fn path(&self, series: &[usize], values: &Values) -> BezPath {
        let mut path = BezPath::new();
        let mut last: Option<Point> = None;
        for &i in series {
            let p = values
                .number("x", i)
                .zip(values.number("y", i))
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .map(|(x, y)| Point::new(x, y));
            match (p, last) {
                (None, _) => last = None,
                (Some(p), None) => {
                    path.move_to(p);
                    last = Some(p);
                }
                (Some(p), Some(prev)) => {
                    if self.curve == Curve::Step {
                        let mid = (prev.x + p.x) * 0.5;
                        path.line_to((mid, prev.y));
                        path.line_to((mid, p.y));
                    }
                    path.line_to(p);
                    last = Some(p);
                }
            }
        }
        path
    }
}

impl Mark for Line {
    fn core(&self) -> &MarkCore {
        &self.core
    }

    fn filter(&self, index: &[usize], _channels: &ChannelMap, _values: &Values) -> Index {
        index.to_vec()
    }

    fn render(
        &self,
        index: Option<&[usize]>,
        _scales: &ScaleFunctions,
        values: &Values,
        dimensions: &Dimensions,
    ) -> Option<Node> {
        let index = index?;
        let style = self.core.style();
        let mut group = self.core.group(dimensions);
        for series in self.series(index, values) {
            let Some(&first) = series.first() else {
                continue;
            };
            let mut node = Node::path(PathChannels {
                path: self.path(&series, values),
                fill: Brush::Solid(Color::TRANSPARENT),
                stroke: style.stroke_at(values, first),
                stroke_width: style.stroke_width,
            });
            if let Some(title) = title_at(values, first) {
                node.append(Node::title(title));
            }
            group.append(node);
        }
        Some(group)
    }
}

/// A line through tuple rows, or through `options.x`/`options.y`.
pub fn line(data: Data, options: LineOptions) -> Result<Arc<Line>, Error> {
    Line::new(Some(data), options).map(Arc::new)
}

/// A horizontal line: `x` defaults to the datum, `y` to the index.
pub fn line_x(data: Data, mut options: LineOptions) -> Result<Arc<Line>, Error> {
    options.x.get_or_insert(ChannelValue::Identity);
    options.y.get_or_insert(ChannelValue::Index);
    line(data, options)
}

/// A vertical line: `y` defaults to the datum, `x` to the index.
pub fn line_y(data: Data, mut options: LineOptions) -> Result<Arc<Line>, Error> {
    options.x.get_or_insert(ChannelValue::Index);
    options.y.get_or_insert(ChannelValue::Identity);
    line(data, options)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use kurbo::PathEl;
    use markplot_core::Payload;
    use markplot_transforms::Table;

    use super::*;
    use crate::warnings::Warnings;

    fn numbers(xs: &[f64]) -> Vec<Value> {
        xs.iter().copied().map(Value::Number).collect()
    }

    fn paths(node: &Node) -> Vec<&BezPath> {
        node.children
            .iter()
            .filter_map(|c| match c.payload() {
                Some(Payload::Path(p)) => Some(&p.path),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tuple_rows_split_into_x_and_y() {
        let data = Table::from_rows([
            vec![Value::from(1), Value::from(10)],
            vec![Value::from(2), Value::from(20)],
        ])
        .into_data();
        let mark = line(data, LineOptions::new()).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert_eq!(state.channels.get("x").unwrap().value, numbers(&[1.0, 2.0]));
        assert_eq!(state.channels.get("y").unwrap().value, numbers(&[10.0, 20.0]));
        assert!(!state.channels.contains("z"));
    }

    #[test]
    fn line_y_defaults_to_index_and_identity() {
        let data = Table::from_values([Value::from(5), Value::from(7)]).into_data();
        let mark = line_y(data, LineOptions::new()).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert_eq!(state.channels.get("x").unwrap().value, numbers(&[0.0, 1.0]));
        assert_eq!(state.channels.get("y").unwrap().value, numbers(&[5.0, 7.0]));
    }

    #[test]
    fn undefined_points_break_the_path() {
        let mark = Line::new(None, LineOptions::new()).unwrap();
        let mut values = Values::default();
        values.insert("x", numbers(&[0.0, 1.0, 2.0, 3.0]));
        values.insert("y", numbers(&[0.0, 1.0, f64::NAN, 3.0]));
        let index = [0, 1, 2, 3];
        let kept = mark.filter(&index, &ChannelMap::new(), &values);
        assert_eq!(kept, index);
        let node = mark
            .render(Some(&kept), &ScaleFunctions::new(), &values, &Dimensions::default())
            .unwrap();
        let paths = paths(&node);
        assert_eq!(paths.len(), 1);
        let moves = paths[0]
            .elements()
            .iter()
            .filter(|e| matches!(e, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn z_splits_series_in_first_appearance_order() {
        let mark = Line::new(None, LineOptions::new().with_curve(Curve::Step)).unwrap();
        let mut values = Values::default();
        values.insert("x", numbers(&[0.0, 1.0, 2.0, 3.0]));
        values.insert("y", numbers(&[0.0, 1.0, 2.0, 3.0]));
        values.insert(
            "z",
            vec![Value::from("b"), Value::from("a"), Value::from("b"), Value::from("a")],
        );
        let series = mark.series(&[0, 1, 2, 3], &values);
        assert_eq!(series, [vec![0, 2], vec![1, 3]]);
        let node = mark
            .render(Some(&[0, 1, 2, 3]), &ScaleFunctions::new(), &values, &Dimensions::default())
            .unwrap();
        // Step curves add two corners per segment.
        assert_eq!(paths(&node)[0].elements().len(), 4);
        assert_eq!(node.attr("aria-label"), Some("line"));
    }

    #[test]
    fn series_keep_row_order_across_many_keys() {
        let mark = Line::new(None, LineOptions::new()).unwrap();
        let mut values = Values::default();
        values.insert("z", (0..300).map(|i| Value::from(i % 100)).collect());
        let index: Vec<usize> = (0..301).collect();
        let series = mark.series(&index, &values);
        // 100 keys plus one series for the row past the end of `z`.
        assert_eq!(series.len(), 101);
        assert_eq!(series[7], [7, 107, 207]);
        assert_eq!(series[100], [300]);
    }
}
