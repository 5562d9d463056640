// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plot demos for `markplot_charts`.

mod svg;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use markplot_charts::{
    BarYOptions, Clip, Curve, DotOptions, FacetOptions, FrameAnchor, LabelAnchor, LineOptions,
    MarkOptions, PlotOptions, RuleOptions, ScaleOptions, SortKey, StyleOptions, Symbol,
    TextOptions, bar_y, dot, line, line_y, quantize_fill, rule_y, text,
};
use markplot_transforms::{
    BIN_COUNT, BIN_START, CompareOp, Data, Predicate, Table, Transform, Value,
};
use peniko::color::palette::css;

type Section = (String, String);
type DemoResult = Result<Section, Box<dyn Error>>;

/// Renders every demo plot into one HTML report.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output path for the HTML report
    #[arg(short, long, default_value = "markplot_demo.html")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let sections = vec![
        scatter_demo()?,
        facet_demo()?,
        bar_demo()?,
        histogram_demo()?,
        series_demo()?,
        quantize_demo()?,
        annotation_demo()?,
    ];

    let html = svg::render_report("markplot demo", &sections);
    std::fs::write(&cli.output, html)?;
    info!("wrote {} sections to {}", sections.len(), cli.output.display());
    Ok(())
}

fn section(heading: &str, options: &PlotOptions) -> DemoResult {
    let figure = markplot_charts::plot(options)?;
    Ok((heading.to_string(), svg::to_markup(figure.node())))
}

fn numbers(values: impl IntoIterator<Item = f64>) -> Vec<Value> {
    values.into_iter().map(Value::Number).collect()
}

fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

/// A small deterministic sample: body mass and flipper length by species and island.
fn penguins() -> Result<Data, Box<dyn Error>> {
    let species = ["Adelie", "Gentoo", "Chinstrap"];
    let islands = ["Biscoe", "Dream"];
    let n = 36;
    let mut s = Vec::with_capacity(n);
    let mut island = Vec::with_capacity(n);
    let mut mass = Vec::with_capacity(n);
    let mut flipper = Vec::with_capacity(n);
    for i in 0..n {
        let k = i % species.len();
        let t = i as f64;
        s.push(Value::from(species[k]));
        island.push(Value::from(islands[(i / 3) % islands.len()]));
        mass.push(Value::Number(3200.0 + 700.0 * k as f64 + 330.0 * (t * 1.7).sin()));
        flipper.push(Value::Number(185.0 + 12.0 * k as f64 + 6.0 * (t * 0.9).cos()));
    }
    Ok(Table::from_columns(vec![
        ("species", s),
        ("island", island),
        ("body_mass", mass),
        ("flipper_length", flipper),
    ])?
    .into_data())
}

fn scatter_demo() -> DemoResult {
    let data = penguins()?;
    let mean = Table::from_values([Value::Number(3900.0)]).into_data();
    let options = PlotOptions::new()
        .with_scale("x", ScaleOptions::new().with_label("Flipper length (mm)"))
        .with_scale("y", ScaleOptions::new().with_nice(true))
        .with_mark(
            dot(
                data,
                DotOptions::new()
                    .with_x("flipper_length")
                    .with_y("body_mass")
                    .with_mark(
                        MarkOptions::new()
                            .with_style(StyleOptions::new().with_stroke("species")),
                    ),
            )?,
        )
        .with_mark(rule_y(
            mean,
            RuleOptions::new().with_mark(
                MarkOptions::new()
                    .with_style(StyleOptions::new().with_stroke(css::CRIMSON).with_opacity(0.6)),
            ),
        )?)
        .with_scale("color", ScaleOptions::new().with_legend(true));
    section("Scatter with a reference rule", &options)
}

fn facet_demo() -> DemoResult {
    let data = penguins()?;
    let options = PlotOptions::new()
        .with_size(720.0, 420.0)
        .with_facet(FacetOptions::new(data.clone()).with_x("species").with_y("island"))
        .with_scale("x", ScaleOptions::new().with_label_anchor(LabelAnchor::Center))
        .with_mark(dot(
            data,
            DotOptions::new()
                .with_x("flipper_length")
                .with_y("body_mass")
                .with_symbol(Symbol::Square)
                .with_mark(MarkOptions::new().with_clip(Clip::Frame)),
        )?);
    section("Faceted by species and island", &options)
}

fn bar_demo() -> DemoResult {
    let data = Table::from_columns(vec![
        ("letter", strings(&["E", "T", "A", "O", "I", "N"])),
        ("frequency", numbers([0.127, 0.091, 0.082, 0.075, 0.07, 0.067])),
    ])?
    .into_data();
    let options = PlotOptions::new()
        .with_scale("y", ScaleOptions::new().with_percent(true))
        .with_mark(bar_y(
            data.clone(),
            BarYOptions::new().with_x("letter").with_y("frequency").with_mark(
                MarkOptions::new()
                    .with_sort(SortKey::descending("y"))
                    .with_style(StyleOptions::new().with_fill(css::STEEL_BLUE)),
            ),
        )?)
        .with_mark(text(
            data,
            TextOptions::new()
                .with_x("letter")
                .with_y("frequency")
                .with_text("letter")
                .with_mark(MarkOptions::new().with_offset(0.0, -8.0).with_transform(
                    Transform::Filter(Predicate::new("frequency", CompareOp::Gt, 0.08)),
                )),
        )?);
    section("Letter frequency", &options)
}

fn histogram_demo() -> DemoResult {
    let data = Table::from_columns(vec![(
        "v",
        numbers((0..200).map(|i| {
            let t = f64::from(i);
            50.0 + 20.0 * (t * 0.37).sin() + 10.0 * (t * 0.11).cos()
        })),
    )])?
    .into_data();
    let options = PlotOptions::new()
        .with_scale("y", ScaleOptions::new().with_zero(true).with_label("count"))
        .with_mark(line(
            data,
            LineOptions::new()
                .with_x(BIN_START)
                .with_y(BIN_COUNT)
                .with_curve(Curve::Step)
                .with_mark(MarkOptions::new().with_transform(Transform::Bin {
                    field: "v".into(),
                    step: 5.0,
                })),
        )?);
    section("Binned counts as a step line", &options)
}

fn series_demo() -> DemoResult {
    const DAY_MS: i64 = 86_400_000;
    let start = 1_704_067_200_000; // 2024-01-01
    let mut date = Vec::new();
    let mut symbol = Vec::new();
    let mut close = Vec::new();
    for (k, name) in ["AAPL", "GOOG", "MSFT"].into_iter().enumerate() {
        for d in 0..60 {
            let t = f64::from(d);
            date.push(Value::Date(start + i64::from(d) * DAY_MS));
            symbol.push(Value::from(name));
            close.push(Value::Number(
                100.0 + 40.0 * k as f64 + 8.0 * (t * 0.2 + k as f64).sin() + t * 0.3,
            ));
        }
    }
    let data = Table::from_columns(vec![("date", date), ("symbol", symbol), ("close", close)])?
        .into_data();
    let options = PlotOptions::new()
        .with_scale("color", ScaleOptions::new().with_legend(true))
        .with_mark(line_y(
            data,
            LineOptions::new().with_x("date").with_y("close").with_z("symbol").with_mark(
                MarkOptions::new().with_style(StyleOptions::new().with_stroke("symbol")),
            ),
        )?);
    section("Daily closes per symbol", &options)
}

fn quantize_demo() -> DemoResult {
    let data = penguins()?;
    let options = PlotOptions::new()
        .with_scale("color", ScaleOptions::new().with_legend(true).with_label("x bucket"))
        .with_mark(dot(
            data,
            DotOptions::new()
                .with_x("flipper_length")
                .with_y("body_mass")
                .with_mark(MarkOptions {
                    initializer: Some(quantize_fill("x", 4)),
                    ..MarkOptions::new()
                }),
        )?);
    section("Fill derived from pixel position", &options)
}

fn annotation_demo() -> DemoResult {
    let points = Table::from_rows(
        [[0.0, 1.0], [1.0, 3.0], [2.0, 2.0], [3.0, 5.0], [4.0, 4.0]]
            .into_iter()
            .map(|[x, y]| vec![Value::Number(x), Value::Number(y)]),
    )
    .into_data();
    let note = Table::from_values([Value::from("five points")]).into_data();
    let options = PlotOptions::new()
        .with_caption("Row indices label each point.")
        .with_aria_label("annotated points")
        .with_mark(line(points.clone(), LineOptions::new())?)
        .with_mark(text(
            points,
            TextOptions::new().with_mark(MarkOptions::new().with_offset(0.0, -10.0)),
        )?)
        .with_mark(text(
            note,
            TextOptions::new()
                .with_frame_anchor(FrameAnchor::TopRight)
                .with_font_size(14.0),
        )?);
    section("Text in data and frame space", &options)
}
