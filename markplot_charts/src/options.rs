// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-level plot configuration.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use markplot_transforms::{Data, Value};

use crate::channel::ChannelValue;
use crate::mark::MarkItem;
use crate::scales::{Domain, LabelAnchor, Range, ScaleType};

/// Maps a raw channel value before domain inference.
pub type ValueTransform = dyn Fn(&Value) -> Value + Send + Sync;

/// Per-scale options. Every field left `None` is inferred.
#[derive(Clone, Default)]
pub struct ScaleOptions {
    /// Scale type.
    pub kind: Option<ScaleType>,
    /// Explicit domain.
    pub domain: Option<Domain>,
    /// Explicit range.
    pub range: Option<Range>,
    /// Multiply raw values by 100 and mark the label as a percentage.
    pub percent: bool,
    /// Maps raw values before domain inference; applied after `percent`.
    pub transform: Option<Arc<ValueTransform>>,
    /// Axis or legend label; defaults to the first channel's field name.
    pub label: Option<String>,
    /// Where the axis label sits along its axis.
    pub label_anchor: Option<LabelAnchor>,
    /// Extend a continuous domain to nice round values.
    pub nice: bool,
    /// Include zero in a continuous domain.
    pub zero: bool,
    /// Band/point padding in step units.
    pub padding: Option<f64>,
    /// Approximate number of ticks.
    pub tick_count: Option<usize>,
    /// Render a legend for this (color) scale.
    pub legend: bool,
    /// Render an axis for this (position) scale; defaults to on for `x`, `y`, `fx`, `fy`.
    pub axis: Option<bool>,
}

impl fmt::Debug for ScaleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleOptions")
            .field("kind", &self.kind)
            .field("domain", &self.domain)
            .field("range", &self.range)
            .field("percent", &self.percent)
            .field("transform", &self.transform.as_ref().map(|_| ".."))
            .field("label", &self.label)
            .field("label_anchor", &self.label_anchor)
            .field("nice", &self.nice)
            .field("zero", &self.zero)
            .field("padding", &self.padding)
            .field("tick_count", &self.tick_count)
            .field("legend", &self.legend)
            .field("axis", &self.axis)
            .finish()
    }
}

impl ScaleOptions {
    /// Creates options with everything inferred.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the scale type.
    pub fn with_kind(mut self, kind: ScaleType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets an explicit domain.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Sets an explicit range.
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Treats values as proportions to display as percentages.
    pub fn with_percent(mut self, percent: bool) -> Self {
        self.percent = percent;
        self
    }

    /// Sets the raw value transform.
    pub fn with_transform(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the label anchor.
    pub fn with_label_anchor(mut self, anchor: LabelAnchor) -> Self {
        self.label_anchor = Some(anchor);
        self
    }

    /// Enables nice domain rounding.
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    /// Forces zero into the domain.
    pub fn with_zero(mut self, zero: bool) -> Self {
        self.zero = zero;
        self
    }

    /// Sets band/point padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Sets the approximate tick count.
    pub fn with_tick_count(mut self, count: usize) -> Self {
        self.tick_count = Some(count);
        self
    }

    /// Enables a legend.
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Turns the axis on or off.
    pub fn with_axis(mut self, axis: bool) -> Self {
        self.axis = Some(axis);
        self
    }
}

/// Top-level faceting: the facet driver's data and its `fx`/`fy` bindings.
#[derive(Clone, Debug)]
pub struct FacetOptions {
    /// Data partitioned into panels; marks sharing this `Arc` facet automatically.
    pub data: Data,
    /// Horizontal facet channel (`fx`).
    pub x: Option<ChannelValue>,
    /// Vertical facet channel (`fy`).
    pub y: Option<ChannelValue>,
}

impl FacetOptions {
    /// Creates facet options over `data` with no bindings yet.
    pub fn new(data: Data) -> Self {
        Self {
            data,
            x: None,
            y: None,
        }
    }

    /// Sets the `fx` binding.
    pub fn with_x(mut self, x: impl Into<ChannelValue>) -> Self {
        self.x = Some(x.into());
        self
    }

    /// Sets the `fy` binding.
    pub fn with_y(mut self, y: impl Into<ChannelValue>) -> Self {
        self.y = Some(y.into());
        self
    }
}

/// Everything [`plot`](crate::plot) needs.
#[derive(Clone, Debug)]
pub struct PlotOptions {
    /// Marks in paint order.
    pub marks: Vec<MarkItem>,
    /// Top-level faceting.
    pub facet: Option<FacetOptions>,
    /// Per-scale options keyed by scale name. Declaring a scale materializes it even if no
    /// channel uses it; `fx`/`fy` declarations are ignored without faceting.
    pub scales: BTreeMap<String, ScaleOptions>,
    /// Inline stylesheet for the root.
    pub style: Option<String>,
    /// Class name of the root.
    pub class_name: String,
    /// Figure caption.
    pub caption: Option<String>,
    /// `aria-label` of the root.
    pub aria_label: Option<String>,
    /// `aria-description` of the root.
    pub aria_description: Option<String>,
    /// Width in pixels.
    pub width: Option<f64>,
    /// Height in pixels.
    pub height: Option<f64>,
    /// Top margin override.
    pub margin_top: Option<f64>,
    /// Right margin override.
    pub margin_right: Option<f64>,
    /// Bottom margin override.
    pub margin_bottom: Option<f64>,
    /// Left margin override.
    pub margin_left: Option<f64>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            marks: Vec::new(),
            facet: None,
            scales: BTreeMap::new(),
            style: None,
            class_name: String::from("plot"),
            caption: None,
            aria_label: None,
            aria_description: None,
            width: None,
            height: None,
            margin_top: None,
            margin_right: None,
            margin_bottom: None,
            margin_left: None,
        }
    }
}

impl PlotOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mark (or a group of marks).
    pub fn with_mark(mut self, mark: impl Into<MarkItem>) -> Self {
        self.marks.push(mark.into());
        self
    }

    /// Sets faceting.
    pub fn with_facet(mut self, facet: FacetOptions) -> Self {
        self.facet = Some(facet);
        self
    }

    /// Declares (or configures) a scale.
    pub fn with_scale(mut self, name: impl Into<String>, options: ScaleOptions) -> Self {
        self.scales.insert(name.into(), options);
        self
    }

    /// Sets the inline stylesheet.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Sets the root class name.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Sets the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Sets the root `aria-label`.
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    /// Sets the root `aria-description`.
    pub fn with_aria_description(mut self, description: impl Into<String>) -> Self {
        self.aria_description = Some(description.into());
        self
    }

    /// Sets the size in pixels.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Overrides all four margins.
    pub fn with_margins(mut self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        self.margin_top = Some(top);
        self.margin_right = Some(right);
        self.margin_bottom = Some(bottom);
        self.margin_left = Some(left);
        self
    }
}
