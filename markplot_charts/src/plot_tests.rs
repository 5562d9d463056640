// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use markplot_core::{Node, NodeKind, Payload};
use markplot_transforms::{BIN_COUNT, BIN_START, Data, SortOrder, Table, Transform, Value};

use crate::{
    BarYOptions, DotOptions, Error, FacetMode, FacetOptions, FrameAnchor, LabelAnchor,
    LineOptions, MarkItem, MarkOptions, PlotOptions, ScaleOptions, ScaleType, SortKey,
    StyleOptions, TextOptions, bar_y, dot, line, plot, quantize_fill, text,
};
use crate::scales::Domain;

fn tuples(rows: &[[f64; 2]]) -> Data {
    Table::from_rows(
        rows.iter()
            .map(|[x, y]| vec![Value::Number(*x), Value::Number(*y)]),
    )
    .into_data()
}

fn table(columns: Vec<(&str, Vec<Value>)>) -> Data {
    Table::from_columns(columns).unwrap().into_data()
}

fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(Value::Number).collect()
}

fn offset(node: &Node) -> (f64, f64) {
    let t = node.transform.translation();
    (t.x, t.y)
}

fn facets(root: &Node) -> Vec<&Node> {
    root.children_labeled("facet").collect()
}

fn texts(group: &Node) -> Vec<String> {
    group
        .children
        .iter()
        .filter_map(|c| match c.payload() {
            Some(Payload::Text(t)) => Some(t.text.clone()),
            _ => None,
        })
        .collect()
}

fn labeled<'a>(node: &'a Node, label: &'a str) -> &'a Node {
    node.children_labeled(label)
        .next()
        .unwrap_or_else(|| panic!("no child labeled {label}"))
}

#[test]
fn shared_data_builds_one_scale_per_channel_name() {
    let data = tuples(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
    let options = PlotOptions::new()
        .with_mark(dot(data.clone(), DotOptions::new()).unwrap())
        .with_mark(line(data, LineOptions::new()).unwrap());
    let figure = plot(&options).unwrap();

    let x = figure.scale("x").unwrap();
    let y = figure.scale("y").unwrap();
    assert_eq!(x.kind, ScaleType::Linear);
    assert_eq!(x.domain, Domain::Continuous(0.0, 2.0));
    assert_eq!(y.domain, Domain::Continuous(0.0, 1.0));

    let root = figure.node();
    assert!(facets(root).is_empty());
    let position = |label: &str| {
        root.children
            .iter()
            .position(|c| c.attr("aria-label") == Some(label))
    };
    let (dots, lines) = (position("dot").unwrap(), position("line").unwrap());
    assert!(dots < lines, "marks render in declaration order");
    assert_eq!(root.children[dots].children.len(), 3);
}

#[test]
fn one_facet_key_makes_a_panel_per_value() {
    let data = table(vec![
        ("key", strings(&["a", "a", "b"])),
        ("v", numbers(&[1.0, 2.0, 3.0])),
    ]);
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_x("key"))
        .with_mark(dot(data, DotOptions::new().with_x("v")).unwrap());
    let figure = plot(&options).unwrap();

    assert_eq!(
        figure.scale("fx").unwrap().domain,
        Domain::Discrete(strings(&["a", "b"]))
    );
    let panels = facets(figure.node());
    assert_eq!(panels.len(), 2);
    assert_eq!(labeled(panels[0], "dot").children.len(), 2);
    assert_eq!(labeled(panels[1], "dot").children.len(), 1);
    assert!(offset(panels[0]).0 < offset(panels[1]).0);
}

#[test]
fn panels_follow_domain_order_not_appearance() {
    let data = table(vec![
        ("key", strings(&["b", "a", "b"])),
        ("v", numbers(&[1.0, 2.0, 3.0])),
    ]);
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_x("key"))
        .with_mark(dot(data, DotOptions::new().with_x("v")).unwrap());
    let root = plot(&options).unwrap().into_node();
    let panels = facets(&root);
    assert_eq!(labeled(panels[0], "dot").children.len(), 1);
    assert_eq!(labeled(panels[1], "dot").children.len(), 2);
}

#[test]
fn two_facet_keys_cross_in_domain_order() {
    let data = table(vec![
        ("c", strings(&["x2", "x1", "x2", "x1"])),
        ("r", strings(&["y1", "y2", "y2", "y1"])),
        ("v", numbers(&[1.0, 2.0, 3.0, 4.0])),
    ]);
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_x("c").with_y("r"))
        .with_mark(dot(data, DotOptions::new().with_x("v")).unwrap());
    let root = plot(&options).unwrap().into_node();
    let panels = facets(&root);
    assert_eq!(panels.len(), 4);

    let at: Vec<(f64, f64)> = panels.iter().map(|p| offset(p)).collect();
    // (x1,y1), (x1,y2), (x2,y1), (x2,y2)
    assert_eq!(at[0].0, at[1].0);
    assert_eq!(at[2].0, at[3].0);
    assert!(at[0].0 < at[2].0);
    assert_eq!(at[0].1, at[2].1);
    assert!(at[0].1 < at[1].1);
    // Row 1 ("x1", "y2") of the facet data is the only row of the second panel.
    let dots = labeled(panels[1], "dot");
    assert_eq!(dots.children.len(), 1);
}

#[test]
fn warnings_are_local_to_one_call() {
    let warned = PlotOptions::new()
        .with_scale("x", ScaleOptions::new().with_kind(ScaleType::Linear))
        .with_mark(
            dot(
                table(vec![("v", strings(&["1", "2"]))]),
                DotOptions::new().with_x("v"),
            )
            .unwrap(),
        );
    let root = plot(&warned).unwrap().into_node();
    let indicators: Vec<&Node> = root.children_labeled("warning").collect();
    assert_eq!(indicators.len(), 1);
    assert_eq!(
        indicators[0].children[0].kind,
        NodeKind::Title("1 warning. Please check the console.".into())
    );

    let clean = PlotOptions::new().with_mark(
        dot(
            table(vec![("v", numbers(&[1.0, 2.0]))]),
            DotOptions::new().with_x("v"),
        )
        .unwrap(),
    );
    let root = plot(&clean).unwrap().into_node();
    assert_eq!(root.children_labeled("warning").count(), 0);
}

#[test]
fn facet_modes_include_exclude_and_auto() {
    let data = table(vec![
        ("key", strings(&["a", "a", "b"])),
        ("v", numbers(&[1.0, 2.0, 3.0])),
    ]);
    let other = table(vec![("v", numbers(&[5.0, 6.0, 7.0]))]);
    let mark = |data: &Data, facet: FacetMode, label: &str| {
        let style = StyleOptions::new().with_aria_label(label);
        let options = DotOptions::new()
            .with_x("v")
            .with_mark(MarkOptions::new().with_facet(facet).with_style(style));
        MarkItem::from(dot(data.clone(), options).unwrap())
    };
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_x("key"))
        .with_mark(mark(&data, FacetMode::Exclude, "exclude"))
        .with_mark(mark(&other, FacetMode::Include, "include"))
        .with_mark(mark(&other, FacetMode::Auto, "auto"));
    let root = plot(&options).unwrap().into_node();
    let panels = facets(&root);
    let count = |panel: &Node, label: &str| labeled(panel, label).children.len();

    assert_eq!(count(panels[0], "exclude"), 1);
    assert_eq!(count(panels[1], "exclude"), 2);
    assert_eq!(count(panels[0], "include"), 2);
    assert_eq!(count(panels[1], "include"), 1);
    // Different data: not faceted, repeated whole in every panel.
    assert_eq!(count(panels[0], "auto"), 3);
    assert_eq!(count(panels[1], "auto"), 3);
}

#[test]
fn declared_scales_exist_without_channels() {
    let options = PlotOptions::new()
        .with_scale("color", ScaleOptions::new())
        .with_scale("fx", ScaleOptions::new());
    let figure = plot(&options).unwrap();
    let color = figure.scale("color").unwrap();
    assert_eq!(color.kind, ScaleType::Sequential);
    assert_eq!(color.domain, Domain::Continuous(0.0, 1.0));
    assert!(figure.scale("fx").is_none(), "facet scales need faceting");
    assert!(figure.scale("r").is_none());
}

#[test]
fn plotting_twice_gives_the_same_figure() {
    let data = table(vec![
        ("key", strings(&["a", "b", "a"])),
        ("v", numbers(&[3.0, 1.0, 2.0])),
    ]);
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_y("key"))
        .with_mark(dot(data.clone(), DotOptions::new().with_x("v")).unwrap())
        .with_mark(text(data, TextOptions::new().with_x("v").with_text("key")).unwrap());
    let first = plot(&options).unwrap();
    let second = plot(&options).unwrap();
    assert_eq!(first.node(), second.node());
    assert_eq!(first.scale("x"), second.scale("x"));
}

#[test]
fn reinitialized_channels_only_build_new_scales() {
    let data = table(vec![("v", numbers(&[1.0, 2.0, 3.0]))]);
    let plain = PlotOptions::new()
        .with_mark(dot(data.clone(), DotOptions::new().with_x("v")).unwrap());
    let quantized = PlotOptions::new().with_mark(
        dot(
            data,
            DotOptions::new().with_x("v").with_mark(MarkOptions {
                initializer: Some(quantize_fill("x", 3)),
                ..MarkOptions::new()
            }),
        )
        .unwrap(),
    );
    let plain = plot(&plain).unwrap();
    let quantized = plot(&quantized).unwrap();

    assert_eq!(plain.scale("x"), quantized.scale("x"));
    assert!(plain.scale("color").is_none());
    let color = quantized.scale("color").unwrap();
    assert_eq!(color.kind, ScaleType::Sequential);
    assert_eq!(color.domain, Domain::Continuous(0.0, 2.0));
    assert!(color.range.is_some());
}

#[test]
fn declared_scales_without_channels_are_rebuilt_after_reinit() {
    let data = table(vec![("v", numbers(&[1.0, 2.0, 3.0]))]);
    let quantized = MarkOptions {
        initializer: Some(quantize_fill("x", 3)),
        ..MarkOptions::new()
    };
    let options = PlotOptions::new()
        .with_scale("color", ScaleOptions::new().with_legend(true))
        .with_mark(dot(data, DotOptions::new().with_x("v").with_mark(quantized)).unwrap());
    let figure = plot(&options).unwrap();
    assert_eq!(
        figure.scale("color").unwrap().domain,
        Domain::Continuous(0.0, 2.0)
    );
    let node = figure.node();
    assert_eq!(node.kind, NodeKind::Figure);
    assert_eq!(node.children[0].attr("class"), Some("legend-ramp"));
}

#[test]
fn percent_scales_multiply_and_relabel() {
    let data = table(vec![("share", numbers(&[0.25, 0.5]))]);
    let options = PlotOptions::new()
        .with_scale("y", ScaleOptions::new().with_percent(true))
        .with_mark(dot(data, DotOptions::new().with_y("share")).unwrap());
    let y = plot(&options).unwrap().scale("y").unwrap();
    assert_eq!(y.domain, Domain::Continuous(25.0, 50.0));
    assert_eq!(y.label.as_deref(), Some("share (%)"));
}

#[test]
fn sort_reorders_rendering() {
    let data = table(vec![
        ("name", strings(&["b", "a", "c"])),
        ("v", numbers(&[2.0, 1.0, 3.0])),
    ]);
    let sorted = |key: SortKey| {
        let options = TextOptions::new()
            .with_x("v")
            .with_text("name")
            .with_mark(MarkOptions::new().with_sort(key));
        let options = PlotOptions::new().with_mark(text(data.clone(), options).unwrap());
        let root = plot(&options).unwrap().into_node();
        texts(labeled(&root, "text"))
    };
    assert_eq!(sorted(SortKey::ascending("x")), ["a", "b", "c"]);
    assert_eq!(sorted(SortKey::descending("x")), ["c", "b", "a"]);
}

#[test]
fn bins_are_counted_per_facet() {
    let data = table(vec![
        ("key", strings(&["a", "a", "b"])),
        ("v", numbers(&[1.0, 2.0, 11.0])),
    ]);
    let options = TextOptions::new()
        .with_x(BIN_START)
        .with_text(BIN_COUNT)
        .with_mark(MarkOptions::new().with_transform(Transform::Bin {
            field: "v".into(),
            step: 10.0,
        }));
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_x("key"))
        .with_mark(text(data, options).unwrap());
    let figure = plot(&options).unwrap();
    let root = figure.node();
    let panels = facets(root);
    assert_eq!(texts(labeled(panels[0], "text")), ["2"]);
    assert_eq!(texts(labeled(panels[1], "text")), ["1"]);
    assert_eq!(
        figure.scale("x").unwrap().domain,
        Domain::Continuous(0.0, 10.0)
    );
}

#[test]
fn text_defaults_depend_on_frame_anchor() {
    let rows = tuples(&[[1.0, 2.0], [3.0, 4.0]]);
    let options = PlotOptions::new().with_mark(text(rows, TextOptions::new()).unwrap());
    let root = plot(&options).unwrap().into_node();
    assert_eq!(texts(labeled(&root, "text")), ["0", "1"]);

    let note = Table::from_values([Value::from("hello")]).into_data();
    let options = PlotOptions::new().with_mark(
        text(note, TextOptions::new().with_frame_anchor(FrameAnchor::TopLeft)).unwrap(),
    );
    let figure = plot(&options).unwrap();
    assert_eq!(texts(labeled(figure.node(), "text")), ["hello"]);
    assert!(figure.scale("x").is_none());
}

#[test]
fn channel_requirements_are_checked_at_construction() {
    let data = tuples(&[[0.0, 1.0]]);
    assert!(matches!(
        bar_y(data.clone(), BarYOptions::new().with_x("0")),
        Err(Error::MissingChannelValue(name)) if name == "y2"
    ));
    let options = PlotOptions::new().with_mark(dot(data, DotOptions::new()).unwrap());
    let figure = plot(&options).unwrap();
    assert!(figure.scale("r").is_none(), "optional r channel was dropped");
}

#[test]
fn a_mark_instance_may_appear_once() {
    let mark = dot(tuples(&[[0.0, 0.0]]), DotOptions::new()).unwrap();
    let nested = PlotOptions::new()
        .with_mark(mark.clone())
        .with_mark(vec![MarkItem::from(mark)]);
    assert!(matches!(plot(&nested), Err(Error::DuplicateMark)));
}

#[test]
fn render_closures_draw_without_data() {
    let options = PlotOptions::new().with_mark(MarkItem::render(|index, _, _, dims| {
        assert!(index.is_none());
        Some(Node::group().with_attr("aria-label", "custom").translated(dims.width, 0.0))
    }));
    let root = plot(&options).unwrap().into_node();
    assert_eq!(offset(labeled(&root, "custom")).0, 640.0);
}

#[test]
fn facet_axis_label_goes_to_one_column() {
    let data = table(vec![
        ("key", strings(&["a", "b", "c"])),
        ("v", numbers(&[1.0, 2.0, 3.0])),
    ]);
    let labels_for = |anchor: LabelAnchor| {
        let options = PlotOptions::new()
            .with_facet(FacetOptions::new(data.clone()).with_x("key"))
            .with_scale("x", ScaleOptions::new().with_label_anchor(anchor))
            .with_mark(dot(data.clone(), DotOptions::new().with_x("v")).unwrap());
        let root = plot(&options).unwrap().into_node();
        root.children_labeled("x-axis")
            .map(|axis| axis.children_labeled("axis-label").count())
            .collect::<Vec<_>>()
    };
    assert_eq!(labels_for(LabelAnchor::Center), [0, 1, 0]);
    assert_eq!(labels_for(LabelAnchor::Left), [1, 0, 0]);
    assert_eq!(labels_for(LabelAnchor::Right), [0, 0, 1]);
}

#[test]
fn legends_and_captions_wrap_the_plot_in_a_figure() {
    let data = table(vec![
        ("key", strings(&["a", "b"])),
        ("v", numbers(&[1.0, 2.0])),
    ]);
    let stroked = MarkOptions::new().with_style(StyleOptions::new().with_stroke("key"));
    let options = PlotOptions::new()
        .with_scale("color", ScaleOptions::new().with_legend(true))
        .with_caption("Two keys")
        .with_mark(dot(data, DotOptions::new().with_x("v").with_mark(stroked)).unwrap());
    let figure = plot(&options).unwrap();
    let node = figure.node();
    assert_eq!(node.kind, NodeKind::Figure);
    assert_eq!(node.children.len(), 3);
    assert_eq!(node.children[0].attr("class"), Some("legend-swatches"));
    assert!(matches!(node.children[1].kind, NodeKind::Root { .. }));
    assert_eq!(node.children[2].kind, NodeKind::Caption("Two keys".into()));
    assert_eq!(figure.scale("color").unwrap().kind, ScaleType::Ordinal);
}

#[test]
fn included_marks_may_be_shorter_than_the_facet_data() {
    let facet_data = table(vec![("key", strings(&["a", "b", "b"]))]);
    let short = table(vec![("v", numbers(&[2.0, 1.0]))]);
    let options = DotOptions::new().with_x("v").with_mark(
        MarkOptions::new()
            .with_facet(FacetMode::Include)
            .with_transform(Transform::Sort {
                by: "v".into(),
                order: SortOrder::Asc,
            }),
    );
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(facet_data).with_x("key"))
        .with_mark(dot(short, options).unwrap());
    let root = plot(&options).unwrap().into_node();
    let panels = facets(&root);
    assert_eq!(panels.len(), 2);
    assert_eq!(labeled(panels[0], "dot").children.len(), 1);
    // Row 2 of panel "b" has no counterpart in the mark's data.
    assert_eq!(labeled(panels[1], "dot").children.len(), 1);
}

#[test]
fn marks_with_fewer_facets_keep_their_own_per_panel() {
    let data = table(vec![
        ("key", strings(&["a", "b", "c"])),
        ("v", numbers(&[1.0, 2.0, 3.0])),
    ]);
    let first_two =
        Transform::custom(|data, facets| Ok((data.cloned(), facets[..2].to_vec().into())));
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_x("key"))
        .with_mark(
            dot(
                data,
                DotOptions::new()
                    .with_x("v")
                    .with_mark(MarkOptions::new().with_transform(first_two)),
            )
            .unwrap(),
        );
    let root = plot(&options).unwrap().into_node();
    let bounds: Vec<_> = facets(&root)
        .iter()
        .map(|panel| {
            let dots = labeled(panel, "dot");
            assert_eq!(dots.children.len(), 1);
            dots.children[0].payload().and_then(|p| p.bounds()).unwrap()
        })
        .collect();
    assert_eq!(bounds.len(), 3);
    assert!(bounds[0].x0 < bounds[1].x0, "panel b draws its own row");
    assert_eq!(bounds[2], bounds[0], "panel c falls back to the first facet");
}

#[test]
fn facet_axes_skip_missing_cells() {
    let data = table(vec![
        ("c", strings(&["x1", "x2", "x1"])),
        ("r", strings(&["y1", "y1", "y2"])),
        ("v", numbers(&[1.0, 2.0, 3.0])),
    ]);
    let options = PlotOptions::new()
        .with_facet(FacetOptions::new(data.clone()).with_x("c").with_y("r"))
        .with_mark(dot(data, DotOptions::new().with_x("v")).unwrap());
    let root = plot(&options).unwrap().into_node();
    assert_eq!(facets(&root).len(), 3);
    // ("x2", "y2") is empty, so only column "x1" has a panel in the last row.
    let x_axes: Vec<&Node> = root.children_labeled("x-axis").collect();
    assert_eq!(x_axes.len(), 1);
    assert_eq!(x_axes[0].children_labeled("axis-label").count(), 1);
}
