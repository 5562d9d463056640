// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grammar-of-graphics composition for `markplot_core`.
//!
//! A plot is a list of marks over tabular data. [`plot`] turns [`PlotOptions`] into a
//! [`Figure`]:
//! - **Marks** declare channels: bindings from rows to values, optionally through a scale.
//! - **Scales** are inferred once per plot from every channel bound to the same name.
//! - **Facets** split the frame into panels keyed by the `fx`/`fy` values of a shared
//!   facet dataset.
//!
//! The output is a `markplot_core::Node` tree; serializing it (to SVG, or anything else)
//! is left to the caller. Text is measured heuristically and never shaped.
//!
//! ```
//! use markplot_charts::{DotOptions, PlotOptions, dot, plot};
//! use markplot_transforms::{Table, Value};
//!
//! let data = Table::from_rows([
//!     vec![Value::from(0), Value::from(0)],
//!     vec![Value::from(1), Value::from(1)],
//! ])
//! .into_data();
//! let options = PlotOptions::new().with_mark(dot(data, DotOptions::new()).unwrap());
//! let figure = plot(&options).unwrap();
//! assert!(figure.scale("x").is_some());
//! ```

#![no_std]

extern crate alloc;

mod axis;
mod bar_mark;
mod channel;
mod dot_mark;
mod error;
mod facet;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod initializer;
mod layout;
mod legend;
mod line_mark;
mod mark;
mod measure;
mod options;
mod plot;
#[cfg(test)]
mod plot_tests;
mod render_mark;
mod rule_mark;
mod scale;
mod scales;
mod style;
mod symbol;
mod text_mark;
mod time;
mod warnings;

pub use axis::{AxisOrient, AxisSpec, AxisStyle};
pub use bar_mark::{BarY, BarYOptions, bar_y};
pub use channel::{
    Accessor, Channel, ChannelFilter, ChannelMap, ChannelSpec, ChannelValue, SortKey, SortSpec,
    Values,
};
pub use dot_mark::{DEFAULT_DOT_RADIUS, Dot, DotOptions, dot};
pub use error::Error;
pub use facet::FacetKey;
pub use initializer::quantize_fill;
pub use layout::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Dimensions};
pub use legend::{LegendItem, LegendRamp, LegendSwatches, legend};
pub use line_mark::{Curve, Line, LineOptions, line, line_x, line_y};
pub use mark::{
    Clip, FacetMode, Initializer, Mark, MarkCore, MarkItem, MarkOptions, MarkState, Reinitialized,
    RenderFn, filter_defined,
};
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use options::{FacetOptions, PlotOptions, ScaleOptions, ValueTransform};
pub use plot::{Figure, plot};
pub use render_mark::RenderMark;
pub use rule_mark::{Rule, RuleAxis, RuleOptions, rule_x, rule_y};
pub use scale::{
    CATEGORY10, SEQUENTIAL, ScaleBand, ScaleContinuous, ScaleLinear, ScaleLog, ScalePoint,
    ScaleTime, interpolate_colors, nice_domain,
};
pub use scales::{
    DiscreteIndex, Domain, LabelAnchor, Range, ScaleDescriptor, ScaleDescriptors, ScaleFunction,
    ScaleFunctions, ScaleInfo, ScaleType,
};
pub use style::{
    MarkStyle, Paint, StyleDefaults, StyleOptions, color_to_value, title_at, value_to_color,
};
pub use symbol::Symbol;
pub use text_mark::{FrameAnchor, Text, TextOptions, text};
pub use time::{format_time_ms, nice_time_step_ms, nice_time_ticks_ms};
pub use warnings::Warnings;
