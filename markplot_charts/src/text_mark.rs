// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text mark.
//!
//! Labels are positioned by `x`/`y`, or pinned to a point of the frame with a
//! [`FrameAnchor`]. Without a `text` channel the label is the row index (positioned text)
//! or the datum itself (frame-anchored text).

extern crate alloc;

use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec;

use kurbo::Point;
use markplot_core::{Node, TextAnchor, TextBaseline, TextChannels};
use markplot_transforms::Data;

use crate::channel::{ChannelSpec, ChannelValue, Values, split_tuple};
use crate::error::Error;
use crate::layout::Dimensions;
use crate::mark::{Mark, MarkCore, MarkOptions};
use crate::scales::ScaleFunctions;
use crate::style::{StyleDefaults, title_at};

/// A point of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameAnchor {
    /// Center.
    Middle,
    /// Top edge, centered.
    Top,
    /// Right edge, centered.
    Right,
    /// Bottom edge, centered.
    Bottom,
    /// Left edge, centered.
    Left,
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

impl FrameAnchor {
    fn resolve(self, dims: &Dimensions) -> (Point, TextAnchor, TextBaseline) {
        let f = dims.frame();
        let c = f.center();
        match self {
            Self::Middle => (c, TextAnchor::Middle, TextBaseline::Middle),
            Self::Top => (Point::new(c.x, f.y0), TextAnchor::Middle, TextBaseline::Hanging),
            Self::Right => (Point::new(f.x1, c.y), TextAnchor::End, TextBaseline::Middle),
            Self::Bottom => (Point::new(c.x, f.y1), TextAnchor::Middle, TextBaseline::Alphabetic),
            Self::Left => (Point::new(f.x0, c.y), TextAnchor::Start, TextBaseline::Middle),
            Self::TopLeft => (Point::new(f.x0, f.y0), TextAnchor::Start, TextBaseline::Hanging),
            Self::TopRight => (Point::new(f.x1, f.y0), TextAnchor::End, TextBaseline::Hanging),
            Self::BottomLeft => (
                Point::new(f.x0, f.y1),
                TextAnchor::Start,
                TextBaseline::Alphabetic,
            ),
            Self::BottomRight => (
                Point::new(f.x1, f.y1),
                TextAnchor::End,
                TextBaseline::Alphabetic,
            ),
        }
    }
}

/// Options for [`Text`].
#[derive(Clone, Debug, Default)]
pub struct TextOptions {
    /// Horizontal position.
    pub x: Option<ChannelValue>,
    /// Vertical position.
    pub y: Option<ChannelValue>,
    /// Label content.
    pub text: Option<ChannelValue>,
    /// Pins every label to a point of the frame.
    pub frame_anchor: Option<FrameAnchor>,
    /// Font size; 10 when unset.
    pub font_size: Option<f64>,
    /// Shared mark options.
    pub mark: MarkOptions,
}

impl TextOptions {
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

    /// Sets the label content.
    pub fn with_text(mut self, text: impl Into<ChannelValue>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Pins labels to the frame.
    pub fn with_frame_anchor(mut self, anchor: FrameAnchor) -> Self {
        self.frame_anchor = Some(anchor);
        self
    }

    /// Sets the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Sets the shared mark options.
    pub fn with_mark(mut self, mark: MarkOptions) -> Self {
        self.mark = mark;
        self
    }
}

/// A text label per row.
#[derive(Debug)]
pub struct Text {
    core: MarkCore,
    frame_anchor: Option<FrameAnchor>,
    font_size: f64,
}

impl Text {
    /// Builds a text mark.
    pub fn new(data: Option<Data>, options: TextOptions) -> Result<Self, Error> {
        let (x, y, text) = match options.frame_anchor {
            Some(_) => (
                options.x,
                options.y,
                options.text.unwrap_or(ChannelValue::Identity),
            ),
            None => {
                let (x, y) = split_tuple(options.x, options.y);
                (x, y, options.text.unwrap_or(ChannelValue::Index))
            }
        };
        let channels = vec![
            ChannelSpec::new("x", x).with_scale("x").optional(),
            ChannelSpec::new("y", y).with_scale("y").optional(),
            ChannelSpec::new("text", Some(text)),
        ];
        let core = MarkCore::new(data, channels, options.mark, &StyleDefaults::filled("text"))?;
        Ok(Self {
            core,
            frame_anchor: options.frame_anchor,
            font_size: options.font_size.unwrap_or(10.0),
        })
    }
}

impl Mark for Text {
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
        let (origin, anchor, baseline) = self
            .frame_anchor
            .unwrap_or(FrameAnchor::Middle)
            .resolve(dimensions);
        let (anchor, baseline) = match self.frame_anchor {
            Some(_) => (anchor, baseline),
            None => (TextAnchor::Middle, TextBaseline::Middle),
        };
        let half_band = |name: &str| scales.get(name).map_or(0.0, |s| s.bandwidth() * 0.5);
        let (bx, by) = (half_band("x"), half_band("y"));
        let style = self.core.style();
        let mut group = self.core.group(dimensions);
        group.append_all(index.iter().copied(), |i| {
            let pos = Point::new(
                values.number("x", i).map_or(origin.x, |x| x + bx),
                values.number("y", i).map_or(origin.y, |y| y + by),
            );
            let mut node = Node::text(TextChannels {
                pos,
                text: values.value("text", i).map(ToString::to_string).unwrap_or_default(),
                font_size: self.font_size,
                angle: 0.0,
                anchor,
                baseline,
                fill: style.fill_at(values, i),
            });
            if let Some(title) = title_at(values, i) {
                node.append(Node::title(title));
            }
            node
        });
        Some(group)
    }
}

/// A text mark over `data`.
pub fn text(data: Data, options: TextOptions) -> Result<Arc<Text>, Error> {
    Text::new(Some(data), options).map(Arc::new)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use markplot_core::Payload;
    use markplot_transforms::{Table, Value};

    use super::*;
    use crate::warnings::Warnings;

    #[test]
    fn positioned_text_defaults_to_tuples_and_index() {
        let data = Table::from_rows([
            vec![Value::from(1), Value::from(2)],
            vec![Value::from(3), Value::from(4)],
        ])
        .into_data();
        let mark = text(data, TextOptions::new()).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert_eq!(state.channels.get("x").unwrap().value[1], Value::from(3));
        assert_eq!(state.channels.get("y").unwrap().value[0], Value::from(2));
        assert_eq!(state.channels.get("text").unwrap().value[1], Value::from(1));
    }

    #[test]
    fn frame_anchored_text_shows_the_datum() {
        let data = Table::from_values([Value::from("hello")]).into_data();
        let mark = text(data, TextOptions::new().with_frame_anchor(FrameAnchor::TopRight)).unwrap();
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert!(!state.channels.contains("x"));
        let values = Values::from_channels(&state.channels, &ScaleFunctions::new());
        let dims = Dimensions::default();
        let node = mark
            .render(Some(&[0]), &ScaleFunctions::new(), &values, &dims)
            .unwrap();
        let Some(Payload::Text(t)) = node.children[0].payload() else {
            panic!("expected a text payload");
        };
        assert_eq!(t.text, "hello");
        assert_eq!(t.pos, Point::new(dims.frame().x1, dims.frame().y0));
        assert_eq!(t.anchor, TextAnchor::End);
    }
}
