// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axes.
//!
//! An axis has one of four orients: `x` sits at the bottom, `y` on the left, `fx` on top and
//! `fy` on the right. Each axis can be measured (for margins) before ranges exist and
//! rendered once the scale function is built.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{BezPath, Point};
use markplot_core::{Node, PathChannels, TextAnchor, TextBaseline, TextChannels};
use markplot_transforms::Value;
use peniko::Brush;
use peniko::color::palette::css;

use crate::format::format_tick_with_step;
use crate::layout::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Dimensions};
use crate::measure::TextMeasurer;
use crate::options::ScaleOptions;
use crate::scales::{LabelAnchor, ScaleDescriptor, ScaleDescriptors, ScaleFunction};
use crate::time::format_time_ms;

/// Axis placement relative to the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// Above the frame.
    Top,
    /// Below the frame.
    Bottom,
    /// Left of the frame.
    Left,
    /// Right of the frame.
    Right,
}

impl AxisOrient {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Axis styling.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Tick stroke.
    pub stroke: Brush,
    /// Tick and label fill.
    pub fill: Brush,
    /// Tick label font size.
    pub font_size: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            stroke: Brush::Solid(css::BLACK),
            fill: Brush::Solid(css::BLACK),
            font_size: 10.0,
        }
    }
}

/// One axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisSpec {
    /// Scale name.
    pub scale: String,
    /// Placement.
    pub orient: AxisOrient,
    /// Label text, already decorated with a direction arrow for continuous scales.
    pub label: Option<String>,
    /// Label position along the axis.
    pub label_anchor: LabelAnchor,
    /// Approximate tick count; derived from the axis length when `None`.
    pub tick_count: Option<usize>,
    /// Tick length in pixels.
    pub tick_size: f64,
    /// Gap between tick and label.
    pub tick_padding: f64,
    /// Styling.
    pub style: AxisStyle,
}

impl AxisSpec {
    /// Creates an unlabeled axis.
    pub fn new(scale: impl Into<String>, orient: AxisOrient) -> Self {
        Self {
            scale: scale.into(),
            orient,
            label: None,
            label_anchor: LabelAnchor::Center,
            tick_count: None,
            tick_size: 6.0,
            tick_padding: 3.0,
            style: AxisStyle::default(),
        }
    }

    /// Builds the axis for a scale descriptor. Facet axes have no tick lines.
    pub(crate) fn from_descriptor(d: &ScaleDescriptor, orient: AxisOrient) -> Self {
        let continuous = d.kind.is_continuous();
        let label_anchor = d.label_anchor.unwrap_or(match (continuous, orient) {
            (true, AxisOrient::Left | AxisOrient::Right) => LabelAnchor::Top,
            (true, _) => LabelAnchor::Right,
            _ => LabelAnchor::Center,
        });
        let label = d.label.as_ref().map(|l| {
            if !continuous {
                return l.clone();
            }
            let increasing = match d.range {
                Some(crate::scales::Range::Continuous(a, b)) => b >= a,
                _ => true,
            };
            match (orient.is_horizontal(), increasing) {
                (true, true) => alloc::format!("{l} →"),
                (true, false) => alloc::format!("← {l}"),
                (false, true) => alloc::format!("↓ {l}"),
                (false, false) => alloc::format!("↑ {l}"),
            }
        });
        let facet = d.name == "fx" || d.name == "fy";
        Self {
            scale: d.name.clone(),
            orient,
            label,
            label_anchor,
            tick_count: d.tick_count,
            tick_size: if facet { 0.0 } else { 6.0 },
            tick_padding: 3.0,
            style: AxisStyle::default(),
        }
    }

    /// A copy without the label, for facet panels that do not carry it.
    pub fn without_label(&self) -> Self {
        Self {
            label: None,
            ..self.clone()
        }
    }

    fn tick_count_for(&self, extent: f64) -> usize {
        self.tick_count.unwrap_or_else(|| {
            let spacing = if self.orient.is_horizontal() { 80.0 } else { 35.0 };
            let n = (extent.abs() / spacing).max(2.0).min(1_000.0);
            #[allow(clippy::cast_possible_truncation, reason = "clamped to a small range")]
            {
                n as usize
            }
        })
    }

    fn tick_labels(&self, scale: &ScaleFunction, extent: f64) -> Vec<(Value, String)> {
        let ticks = scale.ticks(self.tick_count_for(extent));
        let step = ticks
            .windows(2)
            .filter_map(|w| Some((w[1].as_f64()? - w[0].as_f64()?).abs()))
            .fold(f64::INFINITY, f64::min);
        let step = if step.is_finite() { step } else { 0.0 };
        ticks
            .into_iter()
            .map(|t| {
                let label = match &t {
                    Value::Number(v) => format_tick_with_step(*v, step),
                    Value::Date(ms) => format_time_ms(*ms as f64, step),
                    other => other.to_string(),
                };
                (t, label)
            })
            .collect()
    }

    /// Thickness needed along the axis normal, measured before ranges are known.
    pub fn measure(&self, descriptor: &ScaleDescriptor, measurer: &dyn TextMeasurer) -> f64 {
        let scale = ScaleFunction::new(descriptor);
        let extent = if self.orient.is_horizontal() {
            DEFAULT_WIDTH
        } else {
            DEFAULT_HEIGHT
        };
        let labels = self.tick_labels(&scale, extent);
        let widest = labels
            .iter()
            .map(|(_, l)| measurer.measure(l, self.style.font_size))
            .fold((0.0_f64, 0.0_f64), |(w, h), (lw, lh)| (w.max(lw), h.max(lh)));
        let gap = self.tick_size + self.tick_padding;
        if self.orient.is_horizontal() {
            gap + widest.1 + if self.label.is_some() { 11.0 } else { 0.0 }
        } else {
            gap + widest.0 + 4.0
        }
    }

    /// Renders the axis against `dims`.
    pub fn render(&self, scale: &ScaleFunction, dims: &Dimensions) -> Node {
        let frame = dims.frame();
        let extent = if self.orient.is_horizontal() {
            frame.width()
        } else {
            frame.height()
        };
        let offset = scale.bandwidth() * 0.5;
        let mut ticks = BezPath::new();
        let mut labels = Node::group().with_attr("aria-label", "tick-label");
        for (value, text) in self.tick_labels(scale, extent) {
            let Some(p) = scale.apply(&value).as_f64().filter(|p| p.is_finite()) else {
                continue;
            };
            let p = p + offset;
            let (tick, label_pos, anchor, baseline) = match self.orient {
                AxisOrient::Bottom => (
                    (Point::new(p, frame.y1), Point::new(p, frame.y1 + self.tick_size)),
                    Point::new(p, frame.y1 + self.tick_size + self.tick_padding),
                    TextAnchor::Middle,
                    TextBaseline::Hanging,
                ),
                AxisOrient::Top => (
                    (Point::new(p, frame.y0), Point::new(p, frame.y0 - self.tick_size)),
                    Point::new(p, frame.y0 - self.tick_size - self.tick_padding),
                    TextAnchor::Middle,
                    TextBaseline::Alphabetic,
                ),
                AxisOrient::Left => (
                    (Point::new(frame.x0, p), Point::new(frame.x0 - self.tick_size, p)),
                    Point::new(frame.x0 - self.tick_size - self.tick_padding, p),
                    TextAnchor::End,
                    TextBaseline::Middle,
                ),
                AxisOrient::Right => (
                    (Point::new(frame.x1, p), Point::new(frame.x1 + self.tick_size, p)),
                    Point::new(frame.x1 + self.tick_size + self.tick_padding, p),
                    TextAnchor::Start,
                    TextBaseline::Middle,
                ),
            };
            if self.tick_size > 0.0 {
                ticks.move_to(tick.0);
                ticks.line_to(tick.1);
            }
            labels.append(Node::text(TextChannels {
                pos: label_pos,
                text,
                font_size: self.style.font_size,
                anchor,
                baseline,
                fill: self.style.fill.clone(),
                ..TextChannels::default()
            }));
        }

        let mut group =
            Node::group().with_attr("aria-label", alloc::format!("{}-axis", self.scale));
        if !ticks.elements().is_empty() {
            group.append(
                Node::path(PathChannels {
                    path: ticks,
                    stroke: self.style.stroke.clone(),
                    ..PathChannels::default()
                })
                .with_attr("aria-label", "tick"),
            );
        }
        group.append(labels);
        if let Some(label) = &self.label {
            group.append(self.label_node(label, dims));
        }
        group
    }

    fn label_node(&self, label: &str, dims: &Dimensions) -> Node {
        let frame = dims.frame();
        let (pos, anchor, baseline, angle) = match (self.orient, self.label_anchor) {
            (AxisOrient::Bottom | AxisOrient::Top, anchor) => {
                let y = if self.orient == AxisOrient::Bottom {
                    (frame.y1 + dims.margin_bottom - 3.0).max(frame.y1)
                } else {
                    (frame.y0 - dims.margin_top + 3.0).min(frame.y0)
                };
                let baseline = if self.orient == AxisOrient::Bottom {
                    TextBaseline::Alphabetic
                } else {
                    TextBaseline::Hanging
                };
                let (x, anchor) = match anchor {
                    LabelAnchor::Right => (frame.x1, TextAnchor::End),
                    LabelAnchor::Left => (frame.x0, TextAnchor::Start),
                    _ => ((frame.x0 + frame.x1) * 0.5, TextAnchor::Middle),
                };
                (Point::new(x, y), anchor, baseline, 0.0)
            }
            (AxisOrient::Left | AxisOrient::Right, LabelAnchor::Top) => {
                let x = if self.orient == AxisOrient::Left {
                    (frame.x0 - dims.margin_left + 3.0).min(frame.x0)
                } else {
                    frame.x1 + dims.margin_right - 3.0
                };
                let anchor = if self.orient == AxisOrient::Left {
                    TextAnchor::Start
                } else {
                    TextAnchor::End
                };
                (
                    Point::new(x, (frame.y0 - 6.0).max(0.0)),
                    anchor,
                    TextBaseline::Alphabetic,
                    0.0,
                )
            }
            (AxisOrient::Left | AxisOrient::Right, anchor) => {
                let x = if self.orient == AxisOrient::Left {
                    (frame.x0 - dims.margin_left + 3.0).min(frame.x0)
                } else {
                    frame.x1 + dims.margin_right - 3.0
                };
                let (y, anchor) = match anchor {
                    LabelAnchor::Bottom => (frame.y1, TextAnchor::Start),
                    _ => ((frame.y0 + frame.y1) * 0.5, TextAnchor::Middle),
                };
                (Point::new(x, y), anchor, TextBaseline::Hanging, -90.0)
            }
        };
        Node::text(TextChannels {
            pos,
            text: label.to_string(),
            font_size: self.style.font_size,
            angle,
            anchor,
            baseline,
            fill: self.style.fill.clone(),
        })
        .with_attr("aria-label", "axis-label")
    }
}

/// The position axes of a plot.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Axes {
    /// Bottom axis.
    pub(crate) x: Option<AxisSpec>,
    /// Left axis.
    pub(crate) y: Option<AxisSpec>,
    /// Top facet axis.
    pub(crate) fx: Option<AxisSpec>,
    /// Right facet axis.
    pub(crate) fy: Option<AxisSpec>,
}

impl Axes {
    /// An axis for each position scale present, unless turned off.
    pub(crate) fn new(
        descriptors: &ScaleDescriptors,
        options: &alloc::collections::BTreeMap<String, ScaleOptions>,
    ) -> Self {
        let axis = |name: &str, orient| {
            let d = descriptors.get(name)?;
            let enabled = options.get(name).and_then(|o| o.axis).unwrap_or(true);
            enabled.then(|| AxisSpec::from_descriptor(d, orient))
        };
        Self {
            x: axis("x", AxisOrient::Bottom),
            y: axis("y", AxisOrient::Left),
            fx: axis("fx", AxisOrient::Top),
            fy: axis("fy", AxisOrient::Right),
        }
    }

    /// Re-derives labels once ranges are known (arrow direction depends on the range).
    pub(crate) fn relabel(&mut self, descriptors: &ScaleDescriptors) {
        for slot in [&mut self.x, &mut self.y, &mut self.fx, &mut self.fy] {
            if let Some(axis) = slot
                && let Some(d) = descriptors.get(&axis.scale)
            {
                axis.label = AxisSpec::from_descriptor(d, axis.orient).label;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::measure::HeuristicTextMeasurer;
    use crate::scales::{Domain, Range, ScaleType};

    fn descriptor(name: &str, kind: ScaleType, domain: Domain, range: Range) -> ScaleDescriptor {
        ScaleDescriptor {
            name: name.into(),
            kind,
            domain,
            range: Some(range),
            label: Some(name.into()),
            label_anchor: None,
            tick_count: Some(5),
            percent: false,
            padding: None,
            legend: false,
        }
    }

    #[test]
    fn continuous_labels_point_along_increasing_values() {
        let x = descriptor(
            "x",
            ScaleType::Linear,
            Domain::Continuous(0.0, 10.0),
            Range::Continuous(40.0, 620.0),
        );
        let y = descriptor(
            "y",
            ScaleType::Linear,
            Domain::Continuous(0.0, 10.0),
            Range::Continuous(370.0, 20.0),
        );
        let ax = AxisSpec::from_descriptor(&x, AxisOrient::Bottom);
        let ay = AxisSpec::from_descriptor(&y, AxisOrient::Left);
        assert_eq!(ax.label.as_deref(), Some("x →"));
        assert_eq!(ax.label_anchor, LabelAnchor::Right);
        assert_eq!(ay.label.as_deref(), Some("↑ y"));
        assert_eq!(ay.label_anchor, LabelAnchor::Top);
    }

    #[test]
    fn render_emits_one_label_per_tick_and_an_axis_label() {
        let d = descriptor(
            "x",
            ScaleType::Point,
            Domain::Discrete(vec![Value::from("a"), Value::from("b")]),
            Range::Continuous(40.0, 620.0),
        );
        let axis = AxisSpec::from_descriptor(&d, AxisOrient::Bottom);
        let node = axis.render(&ScaleFunction::new(&d), &Dimensions::default());
        assert_eq!(node.attr("aria-label"), Some("x-axis"));
        let labels = node.children_labeled("tick-label").next().unwrap();
        assert_eq!(labels.children.len(), 2);
        assert_eq!(node.children_labeled("axis-label").count(), 1);
        let unlabeled = axis
            .without_label()
            .render(&ScaleFunction::new(&d), &Dimensions::default());
        assert_eq!(unlabeled.children_labeled("axis-label").count(), 0);
    }

    #[test]
    fn left_axis_measures_widest_label() {
        let d = descriptor(
            "y",
            ScaleType::Linear,
            Domain::Continuous(0.0, 100_000.0),
            Range::Continuous(370.0, 20.0),
        );
        let axis = AxisSpec::from_descriptor(&d, AxisOrient::Left);
        let width = axis.measure(&d, &HeuristicTextMeasurer);
        // "100000" at 10px is 36px wide.
        assert!(width >= 36.0 + 9.0);
    }
}
