// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG/HTML writer for `markplot_demo`.

use std::fmt::Write as _;

use kurbo::{Affine, Rect};
use markplot_core::{Node, NodeKind, Payload, TextAnchor, TextBaseline};
use peniko::Brush;

/// Serializes a plot (a root, or a figure wrapping one) as markup.
pub(crate) fn to_markup(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match &node.kind {
        NodeKind::Root { width, height } => {
            let _ = write!(out, r#"{indent}<svg xmlns="http://www.w3.org/2000/svg""#);
            let _ = write!(out, r#" width="{width}" height="{height}""#);
            write_common(out, node);
            out.push_str(">\n");
            write_children(out, node, depth);
            let _ = writeln!(out, "{indent}</svg>");
        }
        NodeKind::Group => {
            let _ = write!(out, "{indent}<g");
            write_common(out, node);
            out.push_str(">\n");
            write_children(out, node, depth);
            let _ = writeln!(out, "{indent}</g>");
        }
        NodeKind::Figure => {
            let _ = write!(out, "{indent}<figure");
            write_attrs(out, node);
            out.push_str(">\n");
            write_children(out, node, depth);
            let _ = writeln!(out, "{indent}</figure>");
        }
        NodeKind::Caption(text) => {
            let _ = writeln!(out, "{indent}<figcaption>{}</figcaption>", escape_xml(text));
        }
        NodeKind::Title(text) => {
            let _ = writeln!(out, "{indent}<title>{}</title>", escape_xml(text));
        }
        NodeKind::Style(css) => {
            let _ = writeln!(out, "{indent}<style>{}</style>", escape_xml(css));
        }
        NodeKind::Shape(payload) => write_shape(out, node, payload, &indent, depth),
    }
}

fn write_children(out: &mut String, node: &Node, depth: usize) {
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

fn write_shape(out: &mut String, node: &Node, payload: &Payload, indent: &str, depth: usize) {
    let tag = match payload {
        Payload::Rect(r) => {
            let _ = write!(
                out,
                r#"{indent}<rect x="{}" y="{}" width="{}" height="{}""#,
                r.rect.x0,
                r.rect.y0,
                r.rect.width(),
                r.rect.height(),
            );
            write_paint_attr(out, "fill", &r.fill);
            if r.stroke_width > 0.0 {
                write_paint_attr(out, "stroke", &r.stroke);
                let _ = write!(out, r#" stroke-width="{}""#, r.stroke_width);
            }
            "rect"
        }
        Payload::Text(t) => {
            let baseline = match t.baseline {
                TextBaseline::Middle => "middle",
                TextBaseline::Alphabetic => "alphabetic",
                TextBaseline::Hanging => "hanging",
                TextBaseline::Ideographic => "ideographic",
            };
            let _ = write!(
                out,
                r#"{indent}<text x="{}" y="{}" font-size="{}" dominant-baseline="{}""#,
                t.pos.x, t.pos.y, t.font_size, baseline
            );
            if t.angle != 0.0 {
                let _ = write!(
                    out,
                    r#" transform="rotate({} {} {})""#,
                    t.angle, t.pos.x, t.pos.y
                );
            }
            out.push_str(match t.anchor {
                TextAnchor::Start => r#" text-anchor="start""#,
                TextAnchor::Middle => r#" text-anchor="middle""#,
                TextAnchor::End => r#" text-anchor="end""#,
            });
            write_paint_attr(out, "fill", &t.fill);
            "text"
        }
        Payload::Path(p) => {
            let _ = write!(out, r#"{indent}<path d="{}""#, p.path.to_svg());
            write_paint_attr(out, "fill", &p.fill);
            if p.stroke_width > 0.0 {
                write_paint_attr(out, "stroke", &p.stroke);
                let _ = write!(out, r#" stroke-width="{}""#, p.stroke_width);
            }
            "path"
        }
    };
    write_common(out, node);
    let text = match payload {
        Payload::Text(t) => Some(t.text.as_str()),
        _ => None,
    };
    if node.children.is_empty() && text.is_none() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');
    if let Some(text) = text {
        out.push_str(&escape_xml(text));
    }
    if !node.children.is_empty() {
        out.push('\n');
        write_children(out, node, depth);
        out.push_str(indent);
    }
    let _ = writeln!(out, "</{tag}>");
}

/// Attributes, transform and clip.
fn write_common(out: &mut String, node: &Node) {
    write_attrs(out, node);
    if node.transform != Affine::IDENTITY {
        let [a, b, c, d, e, f] = node.transform.as_coeffs();
        let _ = write!(out, r#" transform="matrix({a} {b} {c} {d} {e} {f})""#);
    }
    if let Some(clip) = node.clip {
        let _ = write!(out, r#" style="clip-path: {}""#, inset(clip));
    }
}

fn write_attrs(out: &mut String, node: &Node) {
    for attr in &node.attrs {
        let _ = write!(out, r#" {}="{}""#, attr.name, escape_xml(&attr.value));
    }
}

fn inset(r: Rect) -> String {
    format!("path('M{} {}H{}V{}H{}Z')", r.x0, r.y0, r.x1, r.y1, r.x0)
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            if rgba.a == 0 {
                return ("none".to_string(), None);
            }
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let opacity = (rgba.a != 255).then(|| f64::from(rgba.a) / 255.0);
            (fill, opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps rendered sections into one standalone HTML page.
pub(crate) fn render_report(title: &str, sections: &[(String, String)]) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>\n</head>\n<body>", escape_xml(title));
    for (heading, markup) in sections {
        let _ = writeln!(out, "<section>\n<h2>{}</h2>", escape_xml(heading));
        out.push_str(markup);
        out.push_str("</section>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_titles_are_escaped() {
        let node = Node::group()
            .with_attr("aria-label", "a<b")
            .with_child(Node::title("x & y"));
        let markup = to_markup(&node);
        assert!(markup.contains(r#"aria-label="a&lt;b""#));
        assert!(markup.contains("<title>x &amp; y</title>"));
    }

    #[test]
    fn transparent_paint_is_none() {
        let (value, opacity) = svg_paint(&Brush::Solid(peniko::Color::TRANSPARENT));
        assert_eq!(value, "none");
        assert!(opacity.is_none());
    }
}
