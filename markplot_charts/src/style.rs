// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared visual options for marks.
//!
//! A paint is either a constant or a channel. Channel paints become extra optional channels
//! named `fill`/`stroke` on the `color` scale; constant paints are resolved once into a
//! [`MarkStyle`].

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use markplot_transforms::Value;
use peniko::color::palette::css;
use peniko::{Brush, Color};

use crate::channel::{ChannelFilter, ChannelSpec, ChannelValue, Values};

/// A fill or stroke.
#[derive(Clone, Debug)]
pub enum Paint {
    /// Nothing is painted.
    None,
    /// One color for every element.
    Constant(Color),
    /// A channel encoded through the `color` scale.
    Channel(ChannelValue),
}

impl From<Color> for Paint {
    fn from(c: Color) -> Self {
        Self::Constant(c)
    }
}

impl From<&str> for Paint {
    fn from(field: &str) -> Self {
        Self::Channel(ChannelValue::field(field))
    }
}

/// Caller-facing style options shared by every mark.
#[derive(Clone, Debug, Default)]
pub struct StyleOptions {
    /// Fill paint; the mark's default when `None`.
    pub fill: Option<Paint>,
    /// Stroke paint; the mark's default when `None`.
    pub stroke: Option<Paint>,
    /// Stroke width.
    pub stroke_width: Option<f64>,
    /// Group opacity in `[0, 1]`.
    pub opacity: Option<f64>,
    /// Per-element tooltip channel.
    pub title: Option<ChannelValue>,
    /// Overrides the mark's `aria-label`.
    pub aria_label: Option<String>,
}

impl StyleOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fill.
    pub fn with_fill(mut self, fill: impl Into<Paint>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Sets the stroke.
    pub fn with_stroke(mut self, stroke: impl Into<Paint>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    /// Sets the stroke width.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    /// Sets the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Sets the tooltip channel.
    pub fn with_title(mut self, title: impl Into<ChannelValue>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the `aria-label`.
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }
}

/// Per-mark-type paint defaults.
#[derive(Clone, Debug)]
pub struct StyleDefaults {
    /// `aria-label` of the mark's group.
    pub aria_label: &'static str,
    /// Default fill.
    pub fill: Paint,
    /// Default stroke.
    pub stroke: Paint,
    /// Default stroke width.
    pub stroke_width: f64,
}

impl StyleDefaults {
    /// Filled shapes (bars, text).
    pub fn filled(aria_label: &'static str) -> Self {
        Self {
            aria_label,
            fill: Paint::Constant(css::BLACK),
            stroke: Paint::None,
            stroke_width: 1.0,
        }
    }

    /// Stroked shapes (lines, rules, hollow dots).
    pub fn stroked(aria_label: &'static str) -> Self {
        Self {
            aria_label,
            fill: Paint::None,
            stroke: Paint::Constant(css::BLACK),
            stroke_width: 1.5,
        }
    }
}

/// Resolved constant style of a mark.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkStyle {
    /// `aria-label` of the mark's group.
    pub aria_label: String,
    /// Constant fill, used where no `fill` channel value applies.
    pub fill: Brush,
    /// Constant stroke, used where no `stroke` channel value applies.
    pub stroke: Brush,
    /// Stroke width.
    pub stroke_width: f64,
    /// Group opacity.
    pub opacity: Option<f64>,
}

impl MarkStyle {
    /// Resolves `options` over `defaults`, returning the constant style and the channels
    /// that channel paints and titles contribute.
    pub fn resolve(options: &StyleOptions, defaults: &StyleDefaults) -> (Self, Vec<ChannelSpec>) {
        let mut channels = Vec::new();
        let mut paint = |name: &str, p: &Paint| match p {
            Paint::None => Brush::Solid(Color::TRANSPARENT),
            Paint::Constant(c) => Brush::Solid(*c),
            Paint::Channel(v) => {
                channels.push(
                    ChannelSpec::new(name, Some(v.clone()))
                        .with_scale("color")
                        .optional(),
                );
                Brush::Solid(Color::TRANSPARENT)
            }
        };
        let fill = paint("fill", options.fill.as_ref().unwrap_or(&defaults.fill));
        let stroke = paint("stroke", options.stroke.as_ref().unwrap_or(&defaults.stroke));
        if let Some(title) = &options.title {
            channels.push(
                ChannelSpec::new("title", Some(title.clone()))
                    .optional()
                    .with_filter(ChannelFilter::None),
            );
        }
        let style = Self {
            aria_label: options
                .aria_label
                .clone()
                .unwrap_or_else(|| defaults.aria_label.into()),
            fill,
            stroke,
            stroke_width: options.stroke_width.unwrap_or(defaults.stroke_width),
            opacity: options.opacity,
        };
        (style, channels)
    }

    /// Fill of element `i`: the scaled `fill` channel if present, else the constant.
    pub fn fill_at(&self, values: &Values, i: usize) -> Brush {
        paint_at(values, "fill", i).unwrap_or_else(|| self.fill.clone())
    }

    /// Stroke of element `i`: the scaled `stroke` channel if present, else the constant.
    pub fn stroke_at(&self, values: &Values, i: usize) -> Brush {
        paint_at(values, "stroke", i).unwrap_or_else(|| self.stroke.clone())
    }
}

fn paint_at(values: &Values, channel: &str, i: usize) -> Option<Brush> {
    values.get(channel)?;
    Some(Brush::Solid(
        values
            .value(channel, i)
            .and_then(value_to_color)
            .unwrap_or(Color::TRANSPARENT),
    ))
}

/// Tooltip text of element `i`, if the mark has a defined `title` channel value there.
pub fn title_at(values: &Values, i: usize) -> Option<String> {
    values
        .value("title", i)
        .filter(|v| v.is_defined())
        .map(alloc::string::ToString::to_string)
}

/// Encodes a paint color as a [`Value`].
pub fn color_to_value(c: Color) -> Value {
    let rgba = c.to_rgba8();
    Value::Color([rgba.r, rgba.g, rgba.b, rgba.a])
}

/// Decodes a [`Value::Color`].
pub fn value_to_color(v: &Value) -> Option<Color> {
    match v {
        Value::Color([r, g, b, a]) => Some(Color::from_rgba8(*r, *g, *b, *a)),
        _ => None,
    }
}
