// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mark contract.
//!
//! A mark is immutable configuration ([`MarkCore`]) plus geometry ([`Mark::render`]). The
//! driver calls [`Mark::initialize`] once per plot, optionally [`Mark::reinitialize`] once
//! scales exist, then [`Mark::filter`] and [`Mark::render`] once per panel. All per-call
//! state lives in the returned [`MarkState`], owned by the driver.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use markplot_core::Node;
use markplot_transforms::{Data, Facets, Index, Transform};

use crate::channel::{
    ChannelFilter, ChannelMap, ChannelSpec, SortKey, SortSpec, Values, sort_facets,
};
use crate::error::Error;
use crate::layout::Dimensions;
use crate::scales::ScaleFunctions;
use crate::style::{MarkStyle, StyleDefaults, StyleOptions};
use crate::warnings::Warnings;

/// Channel name that is always rejected.
const RESERVED_CHANNEL_NAME: &str = "__proto__";

/// How a mark participates in top-level faceting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FacetMode {
    /// Faceted iff the mark's data is the facet data (same `Arc`).
    #[default]
    Auto,
    /// Use the facet partition.
    Include,
    /// Use the complement of each facet.
    Exclude,
}

/// Clipping of a mark's group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Clip {
    /// No clipping.
    #[default]
    None,
    /// Clip to the frame.
    Frame,
}

/// Channels and facets computed by a reinitializing mark.
#[derive(Clone, Debug, Default)]
pub struct Reinitialized {
    /// Replacement facets.
    pub facets: Option<Facets>,
    /// Channels to merge over the initial ones; new scale names trigger a scale rebuild.
    pub channels: Option<ChannelMap>,
}

/// Derives new channels once scales are known.
pub type Initializer =
    dyn Fn(Option<&Facets>, &ChannelMap, &ScaleFunctions, &Warnings) -> Reinitialized + Send + Sync;

/// Options shared by every mark.
#[derive(Clone)]
pub struct MarkOptions {
    /// Facet participation; `None` opts out of faceting entirely.
    pub facet: Option<FacetMode>,
    /// Sort keys, applied to every facet index after the transform.
    pub sort: SortSpec,
    /// Horizontal pixel offset.
    pub dx: f64,
    /// Vertical pixel offset.
    pub dy: f64,
    /// Clipping.
    pub clip: Clip,
    /// Data transform.
    pub transform: Option<Transform>,
    /// Reinitialization hook.
    pub initializer: Option<Arc<Initializer>>,
    /// Paints and accessibility.
    pub style: StyleOptions,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            facet: Some(FacetMode::Auto),
            sort: SortSpec::new(),
            dx: 0.0,
            dy: 0.0,
            clip: Clip::None,
            transform: None,
            initializer: None,
            style: StyleOptions::default(),
        }
    }
}

impl fmt::Debug for MarkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkOptions")
            .field("facet", &self.facet)
            .field("sort", &self.sort)
            .field("dx", &self.dx)
            .field("dy", &self.dy)
            .field("clip", &self.clip)
            .field("transform", &self.transform)
            .field("initializer", &self.initializer.as_ref().map(|_| ".."))
            .field("style", &self.style)
            .finish()
    }
}

impl MarkOptions {
    /// Default options: auto faceting, no transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the facet mode.
    pub fn with_facet(mut self, facet: FacetMode) -> Self {
        self.facet = Some(facet);
        self
    }

    /// Opts out of faceting.
    pub fn unfaceted(mut self) -> Self {
        self.facet = None;
        self
    }

    /// Appends a sort key.
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Sets the pixel offset.
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Sets clipping.
    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.clip = clip;
        self
    }

    /// Sets the data transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Sets the reinitialization hook.
    pub fn with_initializer(
        mut self,
        f: impl Fn(Option<&Facets>, &ChannelMap, &ScaleFunctions, &Warnings) -> Reinitialized
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.initializer = Some(Arc::new(f));
        self
    }

    /// Sets style options.
    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }
}

/// Output of [`Mark::initialize`].
#[derive(Clone, Debug)]
pub struct MarkState {
    /// Transformed data.
    pub data: Option<Data>,
    /// Per-facet indexes into `data`; `None` for marks without data.
    pub facets: Option<Facets>,
    /// Materialized channels.
    pub channels: ChannelMap,
}

/// The validated, immutable configuration every mark carries.
#[derive(Clone)]
pub struct MarkCore {
    data: Option<Data>,
    channels: Vec<ChannelSpec>,
    facet: Option<FacetMode>,
    sort: SortSpec,
    dx: f64,
    dy: f64,
    clip: Clip,
    transform: Option<Transform>,
    initializer: Option<Arc<Initializer>>,
    style: MarkStyle,
}

impl fmt::Debug for MarkCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkCore")
            .field("rows", &self.data.as_ref().map(|d| d.len()))
            .field("channels", &self.channels)
            .field("facet", &self.facet)
            .field("sort", &self.sort)
            .field("transform", &self.transform)
            .field("initializer", &self.initializer.is_some())
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl MarkCore {
    /// Validates and stores a mark's configuration.
    ///
    /// Channels contributed by `options.style` are appended after `channels`. Optional
    /// channels without a value are dropped. Fails on a required channel without a value,
    /// an empty or reserved channel name, or a name used twice.
    pub fn new(
        data: Option<Data>,
        channels: Vec<ChannelSpec>,
        options: MarkOptions,
        defaults: &StyleDefaults,
    ) -> Result<Self, Error> {
        let (style, style_channels) = MarkStyle::resolve(&options.style, defaults);
        let mut names = HashSet::new();
        let mut kept = Vec::with_capacity(channels.len() + style_channels.len());
        for spec in channels.into_iter().chain(style_channels) {
            if spec.value.is_none() {
                if spec.optional {
                    continue;
                }
                return Err(Error::MissingChannelValue(spec.name));
            }
            if spec.name.is_empty() {
                return Err(Error::MissingChannelName);
            }
            if spec.name == RESERVED_CHANNEL_NAME {
                return Err(Error::IllegalChannelName(spec.name));
            }
            if !names.insert(spec.name.clone()) {
                return Err(Error::DuplicateChannel(spec.name));
            }
            kept.push(spec);
        }
        Ok(Self {
            data,
            channels: kept,
            facet: options.facet,
            sort: options.sort,
            dx: options.dx,
            dy: options.dy,
            clip: options.clip,
            transform: options.transform,
            initializer: options.initializer,
            style,
        })
    }

    /// A core without data or channels; only channel paints in `options.style` would need
    /// validation, and they are ignored.
    pub(crate) fn without_channels(options: MarkOptions, defaults: &StyleDefaults) -> Self {
        let (style, _) = MarkStyle::resolve(&options.style, defaults);
        Self {
            data: None,
            channels: Vec::new(),
            facet: options.facet,
            sort: options.sort,
            dx: options.dx,
            dy: options.dy,
            clip: options.clip,
            transform: options.transform,
            initializer: options.initializer,
            style,
        }
    }

    /// The mark's own data.
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Validated channel specs in declaration order.
    pub fn channels(&self) -> &[ChannelSpec] {
        &self.channels
    }

    /// Facet participation.
    pub fn facet(&self) -> Option<FacetMode> {
        self.facet
    }

    /// Resolved constant style.
    pub fn style(&self) -> &MarkStyle {
        &self.style
    }

    /// Resolves data, transform, channels and sort into a [`MarkState`].
    ///
    /// Without explicit `facets`, a mark with data gets one facet spanning every row.
    pub fn initialize(
        &self,
        facets: Option<Facets>,
        facet_channels: Option<&ChannelMap>,
    ) -> Result<MarkState, Error> {
        let facets = facets.or_else(|| {
            self.data
                .as_ref()
                .map(|d| Facets::from([(0..d.len()).collect::<Index>()]))
        });
        let (data, facets) = match &self.transform {
            Some(transform) => {
                let had_facets = facets.is_some();
                let (data, out) =
                    transform.apply(self.data.clone(), facets.unwrap_or_else(|| Facets::from([])))?;
                let facets = (had_facets || data.is_some()).then_some(out);
                (data, facets)
            }
            None => (self.data.clone(), facets),
        };
        let channels: ChannelMap = self
            .channels
            .iter()
            .filter_map(|spec| spec.materialize(data.as_deref()))
            .collect();
        let facets = match facets {
            Some(f) if !self.sort.is_empty() => {
                Some(sort_facets(&f, &self.sort, &channels, facet_channels))
            }
            other => other,
        };
        Ok(MarkState {
            data,
            facets,
            channels,
        })
    }

    /// An empty group for this mark's elements: `aria-label`, opacity, offset and clip
    /// applied.
    pub fn group(&self, dimensions: &Dimensions) -> Node {
        let mut group = Node::group()
            .with_attr("aria-label", self.style.aria_label.as_str())
            .translated(self.dx, self.dy);
        if let Some(opacity) = self.style.opacity {
            group.set_attr("opacity", alloc::format!("{opacity}"));
        }
        if self.clip == Clip::Frame {
            group = group.with_clip(dimensions.frame());
        }
        group
    }
}

/// A geometric mark.
pub trait Mark: fmt::Debug {
    /// Immutable configuration.
    fn core(&self) -> &MarkCore;

    /// Resolves the mark against its (or the facet) data. See [`MarkCore::initialize`].
    fn initialize(
        &self,
        facets: Option<Facets>,
        facet_channels: Option<&ChannelMap>,
        _warnings: &Warnings,
    ) -> Result<MarkState, Error> {
        self.core().initialize(facets, facet_channels)
    }

    /// Derives channels that need scales; `None` when the mark has no initializer.
    fn reinitialize(
        &self,
        facets: Option<&Facets>,
        channels: &ChannelMap,
        scales: &ScaleFunctions,
        warnings: &Warnings,
    ) -> Option<Reinitialized> {
        let f = self.core().initializer.as_ref()?;
        Some(f(facets, channels, scales, warnings))
    }

    /// Keeps the indices whose scaled values pass every channel filter.
    fn filter(&self, index: &[usize], channels: &ChannelMap, values: &Values) -> Index {
        filter_defined(index, channels, values)
    }

    /// Draws the elements at `index`; `None` when there is nothing to attach.
    fn render(
        &self,
        index: Option<&[usize]>,
        scales: &ScaleFunctions,
        values: &Values,
        dimensions: &Dimensions,
    ) -> Option<Node>;
}

/// The default [`Mark::filter`].
pub fn filter_defined(index: &[usize], channels: &ChannelMap, values: &Values) -> Index {
    let checks: Vec<(&str, &ChannelFilter)> = channels
        .iter()
        .filter(|c| !matches!(c.filter, ChannelFilter::None))
        .map(|c| (c.name.as_str(), &c.filter))
        .collect();
    index
        .iter()
        .copied()
        .filter(|&i| {
            checks.iter().all(|(name, filter)| {
                values
                    .value(name, i)
                    .is_some_and(|v| filter.accepts(v))
            })
        })
        .collect()
}

/// Draws a panel from scales and values, without channels of its own.
pub type RenderFn = dyn Fn(Option<&[usize]>, &ScaleFunctions, &Values, &Dimensions) -> Option<Node>
    + Send
    + Sync;

/// One entry of [`PlotOptions::marks`](crate::PlotOptions::marks).
#[derive(Clone)]
pub enum MarkItem {
    /// A mark.
    Mark(Arc<dyn Mark>),
    /// A bare render closure, wrapped into a [`RenderMark`](crate::RenderMark).
    Render(Arc<RenderFn>),
    /// Nested marks, flattened in order.
    Group(Vec<MarkItem>),
}

impl fmt::Debug for MarkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mark(m) => f.debug_tuple("Mark").field(m).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
            Self::Group(items) => f.debug_tuple("Group").field(items).finish(),
        }
    }
}

impl MarkItem {
    /// Wraps a render closure.
    pub fn render(
        f: impl Fn(Option<&[usize]>, &ScaleFunctions, &Values, &Dimensions) -> Option<Node>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self::Render(Arc::new(f))
    }
}

impl<M: Mark + 'static> From<Arc<M>> for MarkItem {
    fn from(mark: Arc<M>) -> Self {
        Self::Mark(mark)
    }
}

impl From<Arc<dyn Mark>> for MarkItem {
    fn from(mark: Arc<dyn Mark>) -> Self {
        Self::Mark(mark)
    }
}

impl From<Vec<Self>> for MarkItem {
    fn from(items: Vec<Self>) -> Self {
        Self::Group(items)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use markplot_transforms::{Predicate, Table, Value};

    use super::*;
    use crate::channel::{Channel, ChannelValue};

    #[derive(Debug)]
    struct Probe(MarkCore);

    impl Mark for Probe {
        fn core(&self) -> &MarkCore {
            &self.0
        }

        fn render(
            &self,
            _index: Option<&[usize]>,
            _scales: &ScaleFunctions,
            _values: &Values,
            _dimensions: &Dimensions,
        ) -> Option<Node> {
            None
        }
    }

    fn core(channels: Vec<ChannelSpec>) -> Result<MarkCore, Error> {
        MarkCore::new(
            None,
            channels,
            MarkOptions::new(),
            &StyleDefaults::filled("probe"),
        )
    }

    #[test]
    fn construction_validates_channels() {
        assert_eq!(
            core(vec![ChannelSpec::new("x", None)]).unwrap_err(),
            Error::MissingChannelValue("x".into())
        );
        assert!(core(vec![ChannelSpec::new("x", None).optional()])
            .unwrap()
            .channels()
            .is_empty());
        assert_eq!(
            core(vec![ChannelSpec::new("", Some(ChannelValue::Index))]).unwrap_err(),
            Error::MissingChannelName
        );
        assert_eq!(
            core(vec![ChannelSpec::new("__proto__", Some(ChannelValue::Index))]).unwrap_err(),
            Error::IllegalChannelName("__proto__".into())
        );
        assert_eq!(
            core(vec![
                ChannelSpec::new("x", Some(ChannelValue::Index)),
                ChannelSpec::new("x", Some(ChannelValue::Index)),
            ])
            .unwrap_err(),
            Error::DuplicateChannel("x".into())
        );
    }

    #[test]
    fn initialize_defaults_to_one_facet_and_applies_transform() {
        let data = Table::from_values([Value::from(1), Value::from(5), Value::from(3)]).into_data();
        let options = MarkOptions::new()
            .with_transform(Transform::Filter(Predicate::new(
                "",
                markplot_transforms::CompareOp::Gt,
                Value::from(2),
            )))
            .with_sort(SortKey::descending("x"));
        let core = MarkCore::new(
            Some(data),
            vec![ChannelSpec::new("x", Some(ChannelValue::Identity)).with_scale("x")],
            options,
            &StyleDefaults::filled("probe"),
        )
        .unwrap();
        let state = core.initialize(None, None).unwrap();
        let facets = state.facets.unwrap();
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0], vec![1, 2]);
        assert_eq!(state.channels.get("x").unwrap().value.len(), 3);
    }

    #[test]
    fn marks_without_data_have_no_facets() {
        let probe = Probe(core(vec![]).unwrap());
        let state = probe.initialize(None, None, &Warnings::new()).unwrap();
        assert!(state.facets.is_none());
        assert!(state.data.is_none());
        assert!(probe
            .reinitialize(None, &state.channels, &ScaleFunctions::new(), &Warnings::new())
            .is_none());
    }

    #[test]
    fn default_filter_drops_undefined_scaled_values() {
        let channels: ChannelMap = [Channel::new("x", vec![])].into_iter().collect();
        let mut values = Values::default();
        values.insert("x", vec![Value::from(1), Value::Null, Value::Number(f64::NAN)]);
        assert_eq!(filter_defined(&[0, 1, 2], &channels, &values), vec![0]);
    }
}
