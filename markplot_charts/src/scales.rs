// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scale registry.
//!
//! Channels are grouped by scale name across every mark. For each name a
//! [`ScaleDescriptor`] is inferred (type, domain, label) from the aggregate of its channels'
//! raw values and any [`ScaleOptions`]. Ranges are filled in once dimensions are known, and
//! each descriptor is then instantiated as a [`ScaleFunction`].

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use markplot_transforms::Value;
use peniko::Color;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::channel::{Channel, ChannelMap};
use crate::layout::Dimensions;
use crate::options::ScaleOptions;
use crate::scale::{
    CATEGORY10, SEQUENTIAL, ScaleBand, ScaleContinuous, ScaleLinear, ScaleLog, ScalePoint,
    ScaleTime, interpolate_colors, nice_domain,
};
use crate::style::color_to_value;
use crate::warnings::Warnings;

/// Scale kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleType {
    /// Continuous linear position.
    Linear,
    /// Continuous base-10 log position.
    Log,
    /// Continuous time position (epoch milliseconds).
    Time,
    /// Discrete positions with zero-width steps.
    Point,
    /// Discrete bands.
    Band,
    /// Discrete values to palette colors.
    Ordinal,
    /// Continuous values to an interpolated color ramp.
    Sequential,
    /// Values are used as given.
    Identity,
}

impl ScaleType {
    /// Returns `true` for scales over a numeric interval.
    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            Self::Linear | Self::Log | Self::Time | Self::Sequential
        )
    }

    /// Returns `true` for scales over a list of values.
    pub fn is_discrete(self) -> bool {
        matches!(self, Self::Point | Self::Band | Self::Ordinal)
    }
}

/// A scale's input space.
#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    /// A numeric interval `(start, end)`.
    Continuous(f64, f64),
    /// Distinct values in order.
    Discrete(Vec<Value>),
}

/// A scale's output space.
#[derive(Clone, Debug, PartialEq)]
pub enum Range {
    /// Pixel extent `(start, end)`.
    Continuous(f64, f64),
    /// Colors: a palette for ordinal scales, ramp stops for sequential ones.
    Colors(Vec<Color>),
}

/// Where an axis label sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelAnchor {
    /// Top end of a vertical axis.
    Top,
    /// Right end of a horizontal axis.
    Right,
    /// Bottom end of a vertical axis.
    Bottom,
    /// Left end of a horizontal axis.
    Left,
    /// Middle of the axis.
    Center,
}

/// Everything the builder derived for one scale name.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleDescriptor {
    /// Scale name.
    pub name: String,
    /// Scale type.
    pub kind: ScaleType,
    /// Input space.
    pub domain: Domain,
    /// Output space; `None` until ranges are assigned (and always for identity scales).
    pub range: Option<Range>,
    /// Axis or legend label.
    pub label: Option<String>,
    /// Axis label anchor.
    pub label_anchor: Option<LabelAnchor>,
    /// Requested tick count.
    pub tick_count: Option<usize>,
    /// Whether values were converted to percentages.
    pub percent: bool,
    /// Band/point padding.
    pub padding: Option<f64>,
    /// Whether a legend was requested.
    pub legend: bool,
}

/// Descriptors keyed by scale name.
pub type ScaleDescriptors = BTreeMap<String, ScaleDescriptor>;

/// Scale functions keyed by scale name.
pub type ScaleFunctions = BTreeMap<String, ScaleFunction>;

/// Channels grouped by scale name. Declared scales with no channels have empty lists.
pub(crate) type ScaleChannels<'a> = BTreeMap<String, Vec<&'a Channel>>;

/// The public view of a built scale.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleInfo {
    /// Scale type.
    pub kind: ScaleType,
    /// Input space.
    pub domain: Domain,
    /// Output space.
    pub range: Option<Range>,
    /// Label.
    pub label: Option<String>,
}

impl From<&ScaleDescriptor> for ScaleInfo {
    fn from(d: &ScaleDescriptor) -> Self {
        Self {
            kind: d.kind,
            domain: d.domain.clone(),
            range: d.range.clone(),
            label: d.label.clone(),
        }
    }
}

/// A scale instantiated from a descriptor with a range.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleFunction {
    /// Linear, log and time position scales.
    Continuous(ScaleContinuous),
    /// A numeric interval onto a color ramp.
    Sequential {
        /// Input interval.
        domain: (f64, f64),
        /// Ramp stops.
        colors: Vec<Color>,
    },
    /// Bands.
    Band(ScaleBand, DiscreteIndex),
    /// Points.
    Point(ScalePoint, DiscreteIndex),
    /// Domain values onto palette colors, cycling.
    Ordinal(DiscreteIndex, Vec<Color>),
    /// Pass-through.
    Identity,
}

/// Position of each domain value, for discrete scales.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiscreteIndex {
    domain: Vec<Value>,
    positions: HashMap<Value, usize>,
}

impl DiscreteIndex {
    fn new(domain: &[Value]) -> Self {
        let mut positions = HashMap::with_capacity(domain.len());
        for (i, v) in domain.iter().enumerate() {
            positions.entry(v.clone()).or_insert(i);
        }
        Self {
            domain: domain.to_vec(),
            positions,
        }
    }

    /// Returns the domain position of `v`.
    pub fn position(&self, v: &Value) -> Option<usize> {
        self.positions.get(v).copied()
    }

    /// Returns the domain in order.
    pub fn domain(&self) -> &[Value] {
        &self.domain
    }
}

impl ScaleFunction {
    /// Instantiates `descriptor`. Missing ranges fall back to the unit interval.
    pub fn new(descriptor: &ScaleDescriptor) -> Self {
        let (r0, r1) = match descriptor.range {
            Some(Range::Continuous(a, b)) => (a, b),
            _ => (0.0, 1.0),
        };
        let colors = |fallback: &[Color]| match &descriptor.range {
            Some(Range::Colors(c)) if !c.is_empty() => c.clone(),
            _ => fallback.to_vec(),
        };
        let (d0, d1) = match descriptor.domain {
            Domain::Continuous(a, b) => (a, b),
            Domain::Discrete(_) => (0.0, 1.0),
        };
        let discrete: &[Value] = match &descriptor.domain {
            Domain::Discrete(values) => values,
            Domain::Continuous(..) => &[],
        };
        match descriptor.kind {
            ScaleType::Linear => {
                Self::Continuous(ScaleContinuous::Linear(ScaleLinear::new((d0, d1), (r0, r1))))
            }
            ScaleType::Log => {
                Self::Continuous(ScaleContinuous::Log(ScaleLog::new((d0, d1), (r0, r1))))
            }
            ScaleType::Time => {
                Self::Continuous(ScaleContinuous::Time(ScaleTime::new((d0, d1), (r0, r1))))
            }
            ScaleType::Sequential => Self::Sequential {
                domain: (d0, d1),
                colors: colors(&SEQUENTIAL),
            },
            ScaleType::Band => {
                let padding = descriptor.padding.unwrap_or(0.1);
                Self::Band(
                    ScaleBand::new((r0, r1), discrete.len()).with_padding(padding, padding),
                    DiscreteIndex::new(discrete),
                )
            }
            ScaleType::Point => {
                let mut point = ScalePoint::new((r0, r1), discrete.len());
                if let Some(padding) = descriptor.padding {
                    point = point.with_padding(padding);
                }
                Self::Point(point, DiscreteIndex::new(discrete))
            }
            ScaleType::Ordinal => Self::Ordinal(DiscreteIndex::new(discrete), colors(&CATEGORY10)),
            ScaleType::Identity => Self::Identity,
        }
    }

    /// Maps one raw value; values outside a discrete domain map to [`Value::Null`].
    pub fn apply(&self, v: &Value) -> Value {
        match self {
            Self::Continuous(s) => match numeric(v) {
                Some(x) => Value::Number(s.map(x)),
                None => Value::Null,
            },
            Self::Sequential {
                domain: (d0, d1),
                colors,
            } => {
                let Some(x) = numeric(v) else {
                    return Value::Null;
                };
                let t = if d1 == d0 { 0.5 } else { (x - d0) / (d1 - d0) };
                interpolate_colors(colors, t).map_or(Value::Null, color_to_value)
            }
            Self::Band(band, index) => index
                .position(v)
                .map_or(Value::Null, |i| Value::Number(band.x(i))),
            Self::Point(point, index) => index
                .position(v)
                .map_or(Value::Null, |i| Value::Number(point.x(i))),
            Self::Ordinal(index, colors) => match (index.position(v), colors.len()) {
                (Some(i), n) if n > 0 => color_to_value(colors[i % n]),
                _ => Value::Null,
            },
            Self::Identity => v.clone(),
        }
    }

    /// Band width for band scales, zero otherwise.
    pub fn bandwidth(&self) -> f64 {
        match self {
            Self::Band(band, _) => band.band_width(),
            _ => 0.0,
        }
    }

    /// Tick values in domain space: nice ticks for continuous scales, the domain for
    /// discrete ones.
    pub fn ticks(&self, count: usize) -> Vec<Value> {
        match self {
            Self::Continuous(ScaleContinuous::Time(s)) => {
                s.ticks(count).into_iter().map(date_tick).collect()
            }
            Self::Continuous(s) => s.ticks(count).into_iter().map(Value::Number).collect(),
            Self::Sequential { domain, .. } => ScaleLinear::new(*domain, (0.0, 1.0))
                .ticks(count)
                .into_iter()
                .map(Value::Number)
                .collect(),
            Self::Band(_, index) | Self::Point(_, index) | Self::Ordinal(index, _) => {
                index.domain().to_vec()
            }
            Self::Identity => Vec::new(),
        }
    }

    /// The pixel range of a position scale.
    pub fn range_extent(&self) -> Option<(f64, f64)> {
        match self {
            Self::Continuous(s) => Some(s.range()),
            Self::Band(band, _) => Some(band.range()),
            Self::Point(point, _) => Some(point.range()),
            _ => None,
        }
    }
}

fn date_tick(ms: f64) -> Value {
    let ms = ms.round().clamp(i64::MIN as f64, i64::MAX as f64);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to the i64 range")]
    {
        Value::Date(ms as i64)
    }
}

/// Numbers, dates and booleans as `f64`; numeric-looking text is parsed.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Text(s) => s.trim().parse().ok(),
        _ => v.as_f64(),
    }
}

/// Collects every channel of `channels` whose scale passes `filter`, grouped by scale name.
pub(crate) fn add_scale_channels<'a>(
    out: &mut ScaleChannels<'a>,
    channels: &'a ChannelMap,
    filter: impl Fn(&str) -> bool,
) {
    for channel in channels.iter() {
        if let Some(scale) = channel.scale.as_deref()
            && filter(scale)
        {
            out.entry(scale.to_string()).or_default().push(channel);
        }
    }
}

/// Applies `percent` and explicit value transforms to raw channel values, in place.
pub(crate) fn apply_scale_transforms(
    channels: &mut ChannelMap,
    options: &BTreeMap<String, ScaleOptions>,
) {
    for channel in channels.iter_mut() {
        let Some(opts) = channel.scale.as_deref().and_then(|s| options.get(s)) else {
            continue;
        };
        if opts.percent {
            for v in &mut channel.value {
                if let Some(x) = numeric(v) {
                    *v = Value::Number(x * 100.0);
                }
            }
        }
        if let Some(f) = &opts.transform {
            for v in &mut channel.value {
                *v = f(v);
            }
        }
    }
}

/// Builds a descriptor for every name in `channels`.
pub(crate) fn build_descriptors(
    channels: &ScaleChannels<'_>,
    options: &BTreeMap<String, ScaleOptions>,
    warnings: &Warnings,
) -> ScaleDescriptors {
    channels
        .iter()
        .map(|(name, list)| {
            let descriptor = describe(name, list, options.get(name), warnings);
            (name.clone(), descriptor)
        })
        .collect()
}

fn describe(
    name: &str,
    channels: &[&Channel],
    options: Option<&ScaleOptions>,
    warnings: &Warnings,
) -> ScaleDescriptor {
    let defaults = ScaleOptions::default();
    let options = options.unwrap_or(&defaults);
    let values = || {
        channels
            .iter()
            .flat_map(|c| c.value.iter())
            .filter(|v| v.is_defined())
    };

    let kind = options.kind.unwrap_or_else(|| infer_kind(name, channels));

    if kind.is_continuous() && values().any(Value::looks_numeric) {
        warnings.warn(format_args!(
            "some data associated with the {name} scale are strings that appear to be numbers; \
             convert them to numbers"
        ));
    }
    if kind == ScaleType::Log && values().filter_map(numeric).any(|x| x <= 0.0) {
        warnings.warn(format_args!(
            "the {name} scale is a log scale but its data include non-positive values"
        ));
    }

    let domain = match &options.domain {
        Some(domain) => domain.clone(),
        None if kind.is_discrete() => {
            let mut seen = HashSet::new();
            let mut distinct: Vec<Value> = values()
                .filter(|v| seen.insert(*v))
                .cloned()
                .collect();
            distinct.sort();
            Domain::Discrete(distinct)
        }
        None if kind == ScaleType::Identity => Domain::Discrete(Vec::new()),
        None => {
            let positive_only = kind == ScaleType::Log;
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for x in values().filter_map(numeric) {
                if !x.is_finite() || (positive_only && x <= 0.0) {
                    continue;
                }
                lo = lo.min(x);
                hi = hi.max(x);
            }
            let (mut lo, mut hi) = if lo <= hi {
                (lo, hi)
            } else if positive_only {
                (1.0, 10.0)
            } else {
                (0.0, 1.0)
            };
            if (options.zero || name == "r") && kind != ScaleType::Log {
                lo = lo.min(0.0);
                hi = hi.max(0.0);
            }
            let nice = options.nice && matches!(kind, ScaleType::Linear | ScaleType::Sequential);
            let (lo, hi) = if nice {
                nice_domain((lo, hi), options.tick_count.unwrap_or(10))
            } else {
                (lo, hi)
            };
            Domain::Continuous(lo, hi)
        }
    };

    let label = options
        .label
        .clone()
        .or_else(|| channels.iter().find_map(|c| c.label.clone()))
        .map(|l| if options.percent { l + " (%)" } else { l });

    ScaleDescriptor {
        name: name.to_string(),
        kind,
        domain,
        range: options.range.clone(),
        label,
        label_anchor: options.label_anchor,
        tick_count: options.tick_count,
        percent: options.percent,
        padding: options.padding,
        legend: options.legend,
    }
}

fn infer_kind(name: &str, channels: &[&Channel]) -> ScaleType {
    if name == "fx" || name == "fy" {
        return ScaleType::Band;
    }
    let is_color = name == "color";
    let values = || {
        channels
            .iter()
            .flat_map(|c| c.value.iter())
            .filter(|v| v.is_defined())
    };
    let continuous = if is_color {
        ScaleType::Sequential
    } else {
        ScaleType::Linear
    };
    if name == "r" {
        return ScaleType::Linear;
    }
    if values().next().is_none() {
        return continuous;
    }
    if values().all(|v| matches!(v, Value::Color(_))) {
        return ScaleType::Identity;
    }
    if values().all(|v| matches!(v, Value::Number(_))) {
        return continuous;
    }
    if values().all(|v| matches!(v, Value::Date(_))) {
        return if is_color {
            ScaleType::Sequential
        } else {
            ScaleType::Time
        };
    }
    match name {
        "x" | "y" if channels.iter().any(|c| c.band) => ScaleType::Band,
        "x" | "y" => ScaleType::Point,
        _ => ScaleType::Ordinal,
    }
}

/// Fills in missing ranges from `dims`.
///
/// `fx`/`fy` span the frame; with faceting, `x`/`y` span one panel instead.
pub(crate) fn auto_scale_range(descriptors: &mut ScaleDescriptors, dims: &Dimensions) {
    for name in ["fx", "fy"] {
        if let Some(d) = descriptors.get_mut(name)
            && d.range.is_none()
        {
            d.range = Some(match name {
                "fx" => Range::Continuous(dims.margin_left, dims.width - dims.margin_right),
                _ => Range::Continuous(dims.margin_top, dims.height - dims.margin_bottom),
            });
        }
    }
    let bandwidth = |name: &str| {
        descriptors
            .get(name)
            .map(|d| ScaleFunction::new(d).bandwidth())
    };
    let panel = dims.facet(bandwidth("fx"), bandwidth("fy"));

    for (name, d) in descriptors.iter_mut() {
        if d.range.is_some() || d.kind == ScaleType::Identity {
            continue;
        }
        d.range = match (name.as_str(), d.kind) {
            ("fx" | "fy", _) => continue,
            (_, ScaleType::Ordinal) => Some(Range::Colors(CATEGORY10.to_vec())),
            (_, ScaleType::Sequential) => Some(Range::Colors(SEQUENTIAL.to_vec())),
            ("x", _) => Some(Range::Continuous(
                panel.margin_left,
                panel.width - panel.margin_right,
            )),
            ("y", ScaleType::Band | ScaleType::Point) => Some(Range::Continuous(
                panel.margin_top,
                panel.height - panel.margin_bottom,
            )),
            ("y", _) => Some(Range::Continuous(
                panel.height - panel.margin_bottom,
                panel.margin_top,
            )),
            ("r", _) => Some(Range::Continuous(0.0, 8.0)),
            _ => Some(Range::Continuous(0.0, 1.0)),
        };
    }
}

/// Instantiates every descriptor.
pub(crate) fn build_functions(descriptors: &ScaleDescriptors) -> ScaleFunctions {
    descriptors
        .iter()
        .map(|(name, d)| (name.clone(), ScaleFunction::new(d)))
        .collect()
}
