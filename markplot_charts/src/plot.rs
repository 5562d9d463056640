// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composition driver.
//!
//! [`plot`] runs a fixed sequence of stages over per-call state:
//!
//! ```text
//! Collect → Init → BuildScales → Reinit → (RebuildScales)? → MaterializeValues → Layout
//!         → Render → Assemble
//! ```
//!
//! Every piece of mutable state lives in the pipeline and is dropped at the end of the call,
//! so plotting the same options twice produces the same figure.

extern crate alloc;

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::Point;
use markplot_core::{Node, NodeKind, TextAnchor, TextBaseline, TextChannels};
use markplot_transforms::Value;

use crate::axis::{AxisSpec, Axes};
use crate::channel::Values;
use crate::error::Error;
use crate::facet::{FacetKey, Faceting, facet_keys, label_panel, panel_index};
use crate::format::format_count;
use crate::layout::{Dimensions, GuideExtents};
use crate::legend::legend;
use crate::mark::{Mark, MarkItem, MarkState};
use crate::measure::HeuristicTextMeasurer;
use crate::options::PlotOptions;
use crate::render_mark::RenderMark;
use crate::scales::{
    Domain, ScaleChannels, ScaleDescriptors, ScaleFunction, ScaleFunctions, ScaleInfo,
    add_scale_channels, apply_scale_transforms, auto_scale_range, build_descriptors,
    build_functions,
};
use crate::warnings::Warnings;

/// A rendered plot.
#[derive(Clone, Debug)]
pub struct Figure {
    node: Node,
    descriptors: ScaleDescriptors,
    functions: ScaleFunctions,
}

impl Figure {
    /// The root node: the plot, or a figure wrapping legends, the plot and a caption.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Consumes the figure, returning its root node.
    pub fn into_node(self) -> Node {
        self.node
    }

    /// The materialized scale `name`, if any channel or declaration used it.
    pub fn scale(&self, name: &str) -> Option<ScaleInfo> {
        self.descriptors.get(name).map(ScaleInfo::from)
    }

    /// A legend for scale `name`, whether or not the plot shows one.
    pub fn legend(&self, name: &str) -> Option<Node> {
        legend(self.descriptors.get(name)?, self.functions.get(name)?)
    }
}

/// Renders `options` into a [`Figure`].
pub fn plot(options: &PlotOptions) -> Result<Figure, Error> {
    let mut pipeline = Pipeline::new(options);
    let mut stage = Stage::Collect;
    loop {
        log::debug!("plot: {stage:?}");
        stage = match stage {
            Stage::Collect => {
                pipeline.collect()?;
                Stage::Init
            }
            Stage::Init => {
                pipeline.init()?;
                Stage::BuildScales
            }
            Stage::BuildScales => {
                pipeline.build_scales();
                Stage::Reinit
            }
            Stage::Reinit => {
                let names = pipeline.reinit();
                if names.is_empty() {
                    Stage::MaterializeValues
                } else {
                    Stage::RebuildScales(names)
                }
            }
            Stage::RebuildScales(names) => {
                pipeline.rebuild_scales(&names);
                Stage::MaterializeValues
            }
            Stage::MaterializeValues => {
                pipeline.materialize_values();
                Stage::Layout
            }
            Stage::Layout => {
                pipeline.layout();
                Stage::Render
            }
            Stage::Render => {
                pipeline.render();
                Stage::Assemble
            }
            Stage::Assemble => return Ok(pipeline.assemble()),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Stage {
    Collect,
    Init,
    BuildScales,
    Reinit,
    /// Scale names first seen in reinitialized channels.
    RebuildScales(BTreeSet<String>),
    MaterializeValues,
    Layout,
    Render,
    Assemble,
}

/// One facet panel: its group position and its offset in the frame.
#[derive(Clone, Debug)]
struct Panel {
    position: usize,
    dx: f64,
    dy: f64,
}

/// Per-call state of [`plot`].
struct Pipeline<'a> {
    options: &'a PlotOptions,
    warnings: Warnings,
    marks: Vec<Arc<dyn Mark>>,
    faceting: Option<Faceting>,
    states: Vec<MarkState>,
    descriptors: ScaleDescriptors,
    functions: ScaleFunctions,
    /// Scale names that had channels when scales were first built.
    contributed: BTreeSet<String>,
    axes: Axes,
    dims: Dimensions,
    panel_dims: Dimensions,
    values: Vec<Values>,
    panels: Vec<Panel>,
    body: Vec<Node>,
}

impl<'a> Pipeline<'a> {
    fn new(options: &'a PlotOptions) -> Self {
        Self {
            options,
            warnings: Warnings::new(),
            marks: Vec::new(),
            faceting: None,
            states: Vec::new(),
            descriptors: ScaleDescriptors::new(),
            functions: ScaleFunctions::new(),
            contributed: BTreeSet::new(),
            axes: Axes::default(),
            dims: Dimensions::default(),
            panel_dims: Dimensions::default(),
            values: Vec::new(),
            panels: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Flattens groups and wraps render closures; a mark instance may appear once.
    fn collect(&mut self) -> Result<(), Error> {
        fn flatten(
            items: &[MarkItem],
            seen: &mut HashSet<*const ()>,
            out: &mut Vec<Arc<dyn Mark>>,
        ) -> Result<(), Error> {
            for item in items {
                match item {
                    MarkItem::Mark(mark) => {
                        if !seen.insert(Arc::as_ptr(mark).cast::<()>()) {
                            return Err(Error::DuplicateMark);
                        }
                        out.push(mark.clone());
                    }
                    MarkItem::Render(f) => out.push(Arc::new(RenderMark::new(f.clone()))),
                    MarkItem::Group(items) => flatten(items, seen, out)?,
                }
            }
            Ok(())
        }
        flatten(&self.options.marks, &mut HashSet::new(), &mut self.marks)?;
        log::trace!("collected {} marks", self.marks.len());
        Ok(())
    }

    /// Partitions the facet data and initializes every mark against it.
    fn init(&mut self) -> Result<(), Error> {
        self.faceting = self.options.facet.as_ref().and_then(Faceting::new);
        let faceting = self.faceting.as_ref();
        for mark in &self.marks {
            let core = mark.core();
            let facets = faceting.and_then(|f| f.resolve(core.facet(), core.data()));
            let mut state = mark.initialize(
                facets,
                faceting.map(Faceting::channels),
                &self.warnings,
            )?;
            apply_scale_transforms(&mut state.channels, &self.options.scales);
            self.states.push(state);
        }
        Ok(())
    }

    /// Channels grouped by scale: mark channels, facet channels and declared scales.
    /// `fx`/`fy` only exist when faceting.
    fn scale_channels(&self) -> ScaleChannels<'_> {
        let faceted = self.faceting.is_some();
        let allowed = |name: &str| faceted || !matches!(name, "fx" | "fy");
        let mut grouped = ScaleChannels::new();
        for state in &self.states {
            add_scale_channels(&mut grouped, &state.channels, allowed);
        }
        if let Some(faceting) = &self.faceting {
            add_scale_channels(&mut grouped, faceting.channels(), |_| true);
        }
        for name in self.options.scales.keys() {
            if allowed(name.as_str()) {
                grouped.entry(name.clone()).or_default();
            }
        }
        grouped
    }

    fn build_scales(&mut self) {
        let grouped = self.scale_channels();
        let contributed = grouped
            .iter()
            .filter(|(_, channels)| !channels.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        let mut descriptors = build_descriptors(&grouped, &self.options.scales, &self.warnings);
        self.contributed = contributed;
        let mut axes = Axes::new(&descriptors, &self.options.scales);
        let measure = |axis: &Option<AxisSpec>| {
            axis.as_ref().map_or(0.0, |a| {
                descriptors
                    .get(&a.scale)
                    .map_or(0.0, |d| a.measure(d, &HeuristicTextMeasurer))
            })
        };
        let guides = GuideExtents {
            top: measure(&axes.fx),
            right: measure(&axes.fy),
            bottom: measure(&axes.x),
            left: measure(&axes.y),
        };
        self.dims = Dimensions::new(self.options, guides);
        auto_scale_range(&mut descriptors, &self.dims);
        axes.relabel(&descriptors);
        self.functions = build_functions(&descriptors);
        self.descriptors = descriptors;
        self.axes = axes;
    }

    /// Lets marks derive channels from the scales; returns the scale names that had no
    /// channels before.
    fn reinit(&mut self) -> BTreeSet<String> {
        let mut new_names = BTreeSet::new();
        for (mark, state) in self.marks.iter().zip(&mut self.states) {
            let Some(out) = mark.reinitialize(
                state.facets.as_ref(),
                &state.channels,
                &self.functions,
                &self.warnings,
            ) else {
                continue;
            };
            if let Some(facets) = out.facets {
                state.facets = Some(facets);
            }
            if let Some(mut channels) = out.channels {
                apply_scale_transforms(&mut channels, &self.options.scales);
                new_names.extend(
                    channels
                        .iter()
                        .filter_map(|c| c.scale.as_deref())
                        .filter(|s| !self.contributed.contains(*s))
                        .map(String::from),
                );
                state.channels.merge(channels);
            }
        }
        new_names
    }

    /// Builds only `names` and merges them over their earlier (empty) descriptors; other
    /// scales are untouched.
    fn rebuild_scales(&mut self, names: &BTreeSet<String>) {
        log::debug!("rebuilding scales {names:?}");
        let mut grouped = ScaleChannels::new();
        for state in &self.states {
            add_scale_channels(&mut grouped, &state.channels, |s| names.contains(s));
        }
        let fresh = build_descriptors(&grouped, &self.options.scales, &self.warnings);
        self.descriptors.extend(fresh);
        // Only the new descriptors lack a range.
        auto_scale_range(&mut self.descriptors, &self.dims);
        for name in names {
            if let Some(d) = self.descriptors.get(name) {
                self.functions.insert(name.clone(), ScaleFunction::new(d));
            }
        }
    }

    fn materialize_values(&mut self) {
        self.values = self
            .states
            .iter()
            .map(|s| Values::from_channels(&s.channels, &self.functions))
            .collect();
    }

    /// Panel dimensions and the panels to draw, in scale-domain order.
    fn layout(&mut self) {
        let bandwidth = |name: &str| self.functions.get(name).map(|f| f.bandwidth());
        self.panel_dims = self.dims.facet(bandwidth("fx"), bandwidth("fy"));
        let Some(faceting) = &self.faceting else {
            return;
        };
        let fx = self.discrete_domain("fx");
        let fy = self.discrete_domain("fy");
        self.panels = facet_keys(fx, fy)
            .into_iter()
            .filter_map(|key| {
                let position = faceting.position(&key)?;
                let (kx, ky) = match (&key, fx.is_some()) {
                    (FacetKey::Two(x, y), _) => (Some(x), Some(y)),
                    (FacetKey::One(x), true) => (Some(x), None),
                    (FacetKey::One(y), false) => (None, Some(y)),
                };
                Some(Panel {
                    position,
                    dx: self.offset("fx", kx),
                    dy: self.offset("fy", ky),
                })
            })
            .collect();
        log::debug!(
            "{} facet groups, {} panels",
            faceting.keys().len(),
            self.panels.len()
        );
    }

    fn discrete_domain(&self, name: &str) -> Option<&[Value]> {
        match &self.descriptors.get(name)?.domain {
            Domain::Discrete(values) => Some(values),
            Domain::Continuous(..) => None,
        }
    }

    fn offset(&self, scale: &str, key: Option<&Value>) -> f64 {
        key.zip(self.functions.get(scale))
            .and_then(|(k, f)| f.apply(k).as_f64())
            .unwrap_or(0.0)
    }

    /// Filters and renders every mark, once or once per panel.
    fn render(&mut self) {
        if self.faceting.is_none() {
            for (i, mark) in self.marks.iter().enumerate() {
                let facets = self.states[i].facets.as_ref();
                let index = facets.and_then(|f| f.first()).map(Vec::as_slice);
                if let Some(node) = self.render_mark(i, mark, index, &self.dims) {
                    self.body.push(node);
                }
            }
            return;
        }
        for panel in &self.panels {
            let mut group = Node::group()
                .with_attr("aria-label", "facet")
                .translated(panel.dx, panel.dy);
            for (i, mark) in self.marks.iter().enumerate() {
                let index = panel_index(self.states[i].facets.as_ref(), panel.position);
                if let Some(node) = self.render_mark(i, mark, index, &self.panel_dims) {
                    group.append(node);
                }
            }
            self.body.push(group);
        }
    }

    fn render_mark(
        &self,
        i: usize,
        mark: &Arc<dyn Mark>,
        index: Option<&[usize]>,
        dims: &Dimensions,
    ) -> Option<Node> {
        let values = &self.values[i];
        let filtered = index.map(|ix| mark.filter(ix, &self.states[i].channels, values));
        mark.render(filtered.as_deref(), &self.functions, values, dims)
    }

    fn axes(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let axis = |spec: &AxisSpec, dims: &Dimensions| {
            self.functions
                .get(&spec.scale)
                .map(|f| spec.render(f, dims))
        };
        for spec in [&self.axes.fx, &self.axes.fy].into_iter().flatten() {
            out.extend(axis(spec, &self.dims));
        }
        if self.faceting.is_none() {
            for spec in [&self.axes.x, &self.axes.y].into_iter().flatten() {
                out.extend(axis(spec, &self.dims));
            }
            return out;
        }

        // One x axis per facet column (along the last row) and one y axis per facet row
        // (along the first column), skipping cells with no panel; a single axis of each
        // carries the label.
        let columns: Vec<Option<&Value>> = match self.discrete_domain("fx") {
            Some(d) => d.iter().map(Some).collect(),
            None => vec![None],
        };
        let rows: Vec<Option<&Value>> = match self.discrete_domain("fy") {
            Some(d) => d.iter().map(Some).collect(),
            None => vec![None],
        };
        let first_kx = columns.first().copied().flatten();
        let last_ky = rows.last().copied().flatten();
        let last_row = self.offset("fy", last_ky);
        let first_column = self.offset("fx", first_kx);
        let present = |kx: Option<&Value>, ky: Option<&Value>| {
            let key = match (kx, ky) {
                (Some(x), Some(y)) => FacetKey::Two(x.clone(), y.clone()),
                (Some(k), None) | (None, Some(k)) => FacetKey::One(k.clone()),
                (None, None) => return true,
            };
            self.faceting.as_ref().is_some_and(|f| f.position(&key).is_some())
        };
        let columns: Vec<Option<&Value>> =
            columns.into_iter().filter(|kx| present(*kx, last_ky)).collect();
        let rows: Vec<Option<&Value>> =
            rows.into_iter().filter(|ky| present(first_kx, *ky)).collect();
        if let Some(spec) = &self.axes.x {
            let labeled = label_panel(columns.len(), spec.label_anchor, false);
            for (c, kx) in columns.iter().enumerate() {
                let copy = if c == labeled { spec.clone() } else { spec.without_label() };
                if let Some(node) = axis(&copy, &self.panel_dims) {
                    out.push(node.translated(self.offset("fx", *kx), last_row));
                }
            }
        }
        if let Some(spec) = &self.axes.y {
            let labeled = label_panel(rows.len(), spec.label_anchor, true);
            for (r, ky) in rows.iter().enumerate() {
                let copy = if r == labeled { spec.clone() } else { spec.without_label() };
                if let Some(node) = axis(&copy, &self.panel_dims) {
                    out.push(node.translated(first_column, self.offset("fy", *ky)));
                }
            }
        }
        out
    }

    fn assemble(mut self) -> Figure {
        let options = self.options;
        let Dimensions { width, height, .. } = self.dims;
        let mut root = Node::root(width, height)
            .with_attr("class", options.class_name.as_str())
            .with_attr("fill", "currentColor")
            .with_attr("font-family", "system-ui, sans-serif")
            .with_attr("font-size", "10")
            .with_attr("text-anchor", "middle")
            .with_attr("viewBox", alloc::format!("0 0 {width} {height}"))
            .with_optional_attr("aria-label", options.aria_label.as_deref())
            .with_optional_attr("aria-description", options.aria_description.as_deref());
        let class = &options.class_name;
        let mut css = alloc::format!(
            ":where(.{class}) {{ display: block; background: white; height: auto; \
             max-width: 100%; }}"
        );
        if let Some(style) = &options.style {
            css.push(' ');
            css.push_str(style);
        }
        root.append(Node::new(NodeKind::Style(css)));
        for node in self.axes() {
            root.append(node);
        }
        for node in core::mem::take(&mut self.body) {
            root.append(node);
        }
        let warnings = self.warnings.consume();
        if warnings > 0 {
            root.append(warning_indicator(warnings, width));
        }

        let legends: Vec<Node> = self
            .descriptors
            .values()
            .filter(|d| d.legend)
            .filter_map(|d| legend(d, self.functions.get(&d.name)?))
            .collect();
        let node = if legends.is_empty() && options.caption.is_none() {
            root
        } else {
            let mut figure = Node::new(NodeKind::Figure).with_attr("class", class.as_str());
            for legend in legends {
                figure.append(legend);
            }
            figure.append(root);
            if let Some(caption) = &options.caption {
                figure.append(Node::new(NodeKind::Caption(caption.clone())));
            }
            figure
        };
        Figure {
            node,
            descriptors: self.descriptors,
            functions: self.functions,
        }
    }
}

fn warning_indicator(count: usize, width: f64) -> Node {
    let plural = if count == 1 { "" } else { "s" };
    Node::text(TextChannels {
        pos: Point::new(width, 20.0),
        text: "\u{26a0}\u{fe0f}".into(),
        anchor: TextAnchor::End,
        baseline: TextBaseline::Alphabetic,
        ..TextChannels::default()
    })
    .with_attr("aria-label", "warning")
    .with_attr("dy", "-1em")
    .with_attr("font-family", "initial")
    .with_child(Node::title(alloc::format!(
        "{} warning{plural}. Please check the console.",
        format_count(count)
    )))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn warning_title_is_pluralized() {
        let one = warning_indicator(1, 640.0);
        assert_eq!(
            one.children[0].kind,
            NodeKind::Title("1 warning. Please check the console.".into())
        );
        let many = warning_indicator(1200, 640.0);
        assert_eq!(
            many.children[0].kind,
            NodeKind::Title("1,200 warnings. Please check the console.".into())
        );
    }

    #[test]
    fn empty_options_render_a_bare_root() {
        let figure = plot(&PlotOptions::new()).unwrap();
        assert!(matches!(figure.node().kind, NodeKind::Root { .. }));
        assert!(figure.scale("x").is_none());
        assert_eq!(figure.node().children.len(), 1);
    }
}
