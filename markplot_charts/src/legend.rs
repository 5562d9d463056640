// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color legends.
//!
//! Ordinal scales get a row of swatches, sequential scales a ramp with ticks. Legends are
//! standalone roots placed next to the plot in the figure.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use markplot_core::{Node, RectChannels, TextAnchor, TextBaseline, TextChannels};
use peniko::color::palette::css;
use peniko::{Brush, Color};

use crate::format::format_tick_with_step;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::scale::{ScaleLinear, interpolate_colors};
use crate::scales::{ScaleDescriptor, ScaleFunction, ScaleType};
use crate::style::value_to_color;

/// One swatch.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendItem {
    /// Text next to the swatch.
    pub label: String,
    /// Swatch paint.
    pub fill: Brush,
}

impl LegendItem {
    /// A solid swatch.
    pub fn solid(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            fill: Brush::Solid(color),
        }
    }
}

/// Swatches laid out left to right, wrapping at `width`.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendSwatches {
    /// Optional leading label.
    pub label: Option<String>,
    /// Swatch side.
    pub swatch_size: f64,
    /// Gap between swatch and its label.
    pub label_dx: f64,
    /// Gap between items.
    pub item_gap: f64,
    /// Wrap width.
    pub width: f64,
    /// Label font size.
    pub font_size: f64,
    /// Items in domain order.
    pub items: Vec<LegendItem>,
}

impl LegendSwatches {
    /// Swatches with default metrics.
    pub fn new(items: Vec<LegendItem>) -> Self {
        Self {
            label: None,
            swatch_size: 10.0,
            label_dx: 4.0,
            item_gap: 12.0,
            width: crate::layout::DEFAULT_WIDTH,
            font_size: 10.0,
            items,
        }
    }

    /// Sets the leading label.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    fn row_height(&self) -> f64 {
        self.swatch_size.max(self.font_size) + 4.0
    }

    /// Positions of each item's swatch, and the total height.
    fn arrange(&self, measurer: &impl TextMeasurer) -> (Vec<Point>, f64) {
        let mut x = 0.0;
        let mut y = 0.0;
        if let Some(label) = &self.label {
            x = measurer.measure(label, self.font_size).0 + self.item_gap;
        }
        let mut out = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let label_width = measurer.measure(&item.label, self.font_size).0;
            let w = self.swatch_size + self.label_dx + label_width;
            if x > 0.0 && x + w > self.width {
                x = 0.0;
                y += self.row_height();
            }
            out.push(Point::new(x, y));
            x += w + self.item_gap;
        }
        (out, y + self.row_height())
    }

    /// Renders the legend as a standalone root.
    pub fn node(&self) -> Node {
        let (positions, height) = self.arrange(&HeuristicTextMeasurer);
        let mut root = Node::root(self.width, height).with_attr("class", "legend-swatches");
        let mid = |p: Point| p.y + self.row_height() * 0.5;
        if let Some(label) = &self.label {
            root.append(text(label, Point::new(0.0, self.row_height() * 0.5), self.font_size));
        }
        for (item, p) in self.items.iter().zip(positions) {
            let mut swatch = Node::group().with_attr("aria-label", "swatch");
            let top = mid(p) - self.swatch_size * 0.5;
            swatch.append(Node::rect(RectChannels {
                rect: Rect::new(p.x, top, p.x + self.swatch_size, top + self.swatch_size),
                fill: item.fill.clone(),
                ..RectChannels::default()
            }));
            swatch.append(text(
                &item.label,
                Point::new(p.x + self.swatch_size + self.label_dx, mid(p)),
                self.font_size,
            ));
            root.append(swatch);
        }
        root
    }
}

/// A horizontal color ramp with tick labels.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendRamp {
    /// Label above the ramp.
    pub label: Option<String>,
    /// Input interval.
    pub domain: (f64, f64),
    /// Ramp stops.
    pub colors: Vec<Color>,
    /// Ramp width.
    pub width: f64,
    /// Ramp height.
    pub height: f64,
    /// Number of ramp slices.
    pub steps: usize,
    /// Approximate tick count.
    pub tick_count: usize,
}

impl LegendRamp {
    /// A 240×10 ramp.
    pub fn new(domain: (f64, f64), colors: Vec<Color>) -> Self {
        Self {
            label: None,
            domain,
            colors,
            width: 240.0,
            height: 10.0,
            steps: 32,
            tick_count: 5,
        }
    }

    /// Renders the ramp as a standalone root.
    pub fn node(&self) -> Node {
        let top = if self.label.is_some() { 16.0 } else { 0.0 };
        let mut root = Node::root(self.width, top + self.height + 16.0)
            .with_attr("class", "legend-ramp");
        if let Some(label) = &self.label {
            root.append(text(label, Point::new(0.0, 8.0), 10.0));
        }
        let n = self.steps.max(1);
        let slice = self.width / n as f64;
        let mut ramp = Node::group().with_attr("aria-label", "ramp");
        ramp.append_all(0..n, |i| {
            let t = (i as f64 + 0.5) / n as f64;
            let fill = interpolate_colors(&self.colors, t).unwrap_or(css::BLACK);
            Node::rect(RectChannels {
                rect: Rect::new(
                    i as f64 * slice,
                    top,
                    (i + 1) as f64 * slice,
                    top + self.height,
                ),
                fill: Brush::Solid(fill),
                ..RectChannels::default()
            })
        });
        root.append(ramp);

        let scale = ScaleLinear::new(self.domain, (0.0, self.width));
        let ticks = scale.ticks(self.tick_count);
        let step = ticks.get(1).zip(ticks.first()).map_or(0.0, |(b, a)| b - a);
        let mut labels = Node::group().with_attr("aria-label", "tick-label");
        labels.append_all(ticks, |t| {
            Node::text(TextChannels {
                pos: Point::new(scale.map(t), top + self.height + 3.0),
                text: format_tick_with_step(t, step),
                baseline: TextBaseline::Hanging,
                ..TextChannels::default()
            })
        });
        root.append(labels);
        root
    }
}

fn text(s: &str, pos: Point, font_size: f64) -> Node {
    Node::text(TextChannels {
        pos,
        text: s.to_string(),
        font_size,
        anchor: TextAnchor::Start,
        baseline: TextBaseline::Middle,
        ..TextChannels::default()
    })
}

/// The legend of a color scale: swatches for ordinal, a ramp for sequential, none otherwise.
pub fn legend(descriptor: &ScaleDescriptor, function: &ScaleFunction) -> Option<Node> {
    match (descriptor.kind, function) {
        (ScaleType::Ordinal, ScaleFunction::Ordinal(index, _)) => {
            let items = index
                .domain()
                .iter()
                .map(|v| {
                    let fill = value_to_color(&function.apply(v)).unwrap_or(css::BLACK);
                    LegendItem::solid(v.to_string(), fill)
                })
                .collect();
            Some(
                LegendSwatches::new(items)
                    .with_label(descriptor.label.clone())
                    .node(),
            )
        }
        (ScaleType::Sequential, ScaleFunction::Sequential { domain, colors }) => {
            let mut ramp = LegendRamp::new(*domain, colors.clone());
            ramp.label = descriptor.label.clone();
            if let Some(count) = descriptor.tick_count {
                ramp.tick_count = count;
            }
            Some(ramp.node())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use markplot_transforms::Value;

    use super::*;
    use crate::scale::{CATEGORY10, SEQUENTIAL};
    use crate::scales::{Domain, Range};

    fn descriptor(kind: ScaleType, domain: Domain, range: Range) -> ScaleDescriptor {
        ScaleDescriptor {
            name: "color".into(),
            kind,
            domain,
            range: Some(range),
            label: Some("species".into()),
            label_anchor: None,
            tick_count: None,
            percent: false,
            padding: None,
            legend: true,
        }
    }

    #[test]
    fn swatches_follow_domain_order() {
        let d = descriptor(
            ScaleType::Ordinal,
            Domain::Discrete(vec![Value::from("a"), Value::from("b")]),
            Range::Colors(CATEGORY10.to_vec()),
        );
        let node = legend(&d, &ScaleFunction::new(&d)).unwrap();
        let swatches: Vec<_> = node.children_labeled("swatch").collect();
        assert_eq!(swatches.len(), 2);
        let first = swatches[0].children[0].payload();
        assert!(matches!(
            first,
            Some(markplot_core::Payload::Rect(r)) if r.fill == Brush::Solid(CATEGORY10[0])
        ));
    }

    #[test]
    fn swatches_wrap_at_width() {
        let items = (0..40)
            .map(|i| LegendItem::solid(alloc::format!("item {i}"), css::BLACK))
            .collect();
        let (positions, height) = LegendSwatches::new(items).arrange(&HeuristicTextMeasurer);
        assert!(height > 14.0);
        assert!(positions.iter().all(|p| p.x < crate::layout::DEFAULT_WIDTH));
    }

    #[test]
    fn sequential_scales_get_a_ramp_and_others_none() {
        let d = descriptor(
            ScaleType::Sequential,
            Domain::Continuous(0.0, 100.0),
            Range::Colors(SEQUENTIAL.to_vec()),
        );
        let node = legend(&d, &ScaleFunction::new(&d)).unwrap();
        assert_eq!(node.children_labeled("ramp").next().unwrap().children.len(), 32);

        let identity = descriptor(
            ScaleType::Identity,
            Domain::Discrete(vec![]),
            Range::Colors(vec![]),
        );
        assert!(legend(&identity, &ScaleFunction::new(&identity)).is_none());
    }
}
