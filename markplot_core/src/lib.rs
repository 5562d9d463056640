// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `markplot_core`: a minimal retained scene graph.
//!
//! This crate provides:
//! - a tree of [`Node`]s (root, groups, figure wrappers, captions, titles, styles)
//! - per-kind shape payloads ([`Payload`]: rect, text, path)
//! - string attributes for accessibility and styling hooks (`aria-label`, `class`, …)
//! - per-node affine transforms and clip rectangles
//!
//! It intentionally does NOT know about data, scales or marks. A chart frontend builds
//! nodes bottom-up, appends them to groups, and hands the finished tree to a renderer
//! (for example an SVG writer).

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, BezPath, Point, Rect, Shape};
use peniko::{Brush, Color};
use smallvec::SmallVec;

/// Evaluated channels for a rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct RectChannels {
    /// Rectangle geometry in scene coordinates.
    pub rect: Rect,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

/// Evaluated channels for a text item positioned at a point.
#[derive(Clone, Debug, PartialEq)]
pub struct TextChannels {
    /// Anchor position in scene coordinates.
    pub pos: Point,
    /// Text content (unshaped).
    pub text: String,
    /// Font size in scene coordinates.
    pub font_size: f64,
    /// Text rotation angle in degrees, with positive angles rotating clockwise.
    ///
    /// This is consumed by downstream renderers (for example, SVG `transform="rotate(...)"`).
    /// In charting contexts, a left axis title is typically rendered with `-90` degrees.
    pub angle: f64,
    /// Horizontal text anchoring (how the glyphs align relative to [`TextChannels::pos`]).
    pub anchor: TextAnchor,
    /// Vertical alignment for text relative to [`TextChannels::pos`].
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
}

/// Horizontal anchoring for text.
///
/// In SVG terms, this maps to the `text-anchor` attribute. In typical chart usage:
/// - y-axis tick labels use [`TextAnchor::End`] so the label’s right edge sits against the axis.
/// - x-axis tick labels use [`TextAnchor::Middle`] to center labels under ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Anchor at the start (left in LTR).
    Start,
    /// Anchor in the middle.
    Middle,
    /// Anchor at the end (right in LTR).
    End,
}

/// Vertical alignment for text.
///
/// In SVG terms, this maps to the `dominant-baseline` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Baseline is centered on the anchor point.
    Middle,
    /// Baseline is the font’s alphabetic baseline.
    Alphabetic,
    /// Baseline is the font’s hanging baseline.
    Hanging,
    /// Baseline is the font’s ideographic baseline.
    Ideographic,
}

/// Evaluated channels for a vector path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathChannels {
    /// The vector path geometry.
    pub path: BezPath,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

impl Default for RectChannels {
    fn default() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            fill: Brush::Solid(Color::from_rgba8(0, 0, 0, 255)),
            stroke: Brush::Solid(Color::TRANSPARENT),
            stroke_width: 0.0,
        }
    }
}

impl Default for TextChannels {
    fn default() -> Self {
        Self {
            pos: Point::new(0.0, 0.0),
            text: String::new(),
            font_size: 10.0,
            angle: 0.0,
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Alphabetic,
            fill: Brush::Solid(Color::from_rgba8(0, 0, 0, 255)),
        }
    }
}

impl Default for PathChannels {
    fn default() -> Self {
        Self {
            path: BezPath::new(),
            fill: Brush::Solid(Color::TRANSPARENT),
            stroke: Brush::Solid(Color::from_rgba8(0, 0, 0, 255)),
            stroke_width: 1.0,
        }
    }
}

/// Evaluated per-kind channels for a leaf shape.
///
/// This is the “render-facing” data model: it is what downstream renderers consume.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// An axis-aligned rectangle.
    Rect(RectChannels),
    /// A text item positioned at a point.
    Text(TextChannels),
    /// A vector path.
    Path(PathChannels),
}

impl Payload {
    /// Optional bounds hint, in the node's local coordinates.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            // Text shaping/layout is downstream; bounds are not known here.
            Self::Text(_) => None,
            Self::Path(p) => Some(p.path.bounding_box()),
        }
    }
}

/// What a [`Node`] is.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// The root drawing container, with its pixel size.
    Root {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
    /// A grouping container (SVG `g`).
    Group,
    /// A leaf shape.
    Shape(Payload),
    /// A tooltip title attached to its parent.
    Title(String),
    /// An inline stylesheet.
    Style(String),
    /// A figure wrapping a root with legends and a caption.
    Figure,
    /// A figure caption.
    Caption(String),
}

/// A named string attribute on a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, e.g. `aria-label`.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

/// A scene graph node.
///
/// Nodes are plain owned trees: children are drawn after (on top of) earlier siblings.
#[derive(Clone, PartialEq)]
pub struct Node {
    /// The kind of this node.
    pub kind: NodeKind,
    /// Attributes in insertion order; names are unique.
    pub attrs: SmallVec<[Attribute; 2]>,
    /// Transform applied to this node and its children.
    pub transform: Affine,
    /// Optional clip rectangle, in this node's local coordinates.
    pub clip: Option<Rect>,
    /// Child nodes in paint order.
    pub children: Vec<Node>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("kind", &self.kind);
        if !self.attrs.is_empty() {
            s.field("attrs", &self.attrs);
        }
        if self.transform != Affine::IDENTITY {
            s.field("transform", &self.transform);
        }
        if self.clip.is_some() {
            s.field("clip", &self.clip);
        }
        s.field("children", &self.children).finish()
    }
}

impl Node {
    /// Create a childless node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: SmallVec::new(),
            transform: Affine::IDENTITY,
            clip: None,
            children: Vec::new(),
        }
    }

    /// Create a root container of the given pixel size.
    pub fn root(width: f64, height: f64) -> Self {
        Self::new(NodeKind::Root { width, height })
    }

    /// Create an empty group.
    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    /// Create a rectangle leaf.
    pub fn rect(channels: RectChannels) -> Self {
        Self::new(NodeKind::Shape(Payload::Rect(channels)))
    }

    /// Create a text leaf.
    pub fn text(channels: TextChannels) -> Self {
        Self::new(NodeKind::Shape(Payload::Text(channels)))
    }

    /// Create a path leaf.
    pub fn path(channels: PathChannels) -> Self {
        Self::new(NodeKind::Shape(Payload::Path(channels)))
    }

    /// Create a title (tooltip) node.
    pub fn title(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Title(text.into()))
    }

    /// Set an attribute, replacing any previous value with the same name.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(a) = self.attrs.iter_mut().find(|a| a.name == name) {
            a.value = value;
        } else {
            self.attrs.push(Attribute {
                name: name.into(),
                value,
            });
        }
    }

    /// Chainable [`Node::set_attr`].
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Chainable attribute setter that does nothing for `None`.
    pub fn with_optional_attr(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with_attr(name, v),
            None => self,
        }
    }

    /// Returns an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set the transform.
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Pre-multiply a translation onto the current transform.
    pub fn translated(mut self, dx: f64, dy: f64) -> Self {
        if dx != 0.0 || dy != 0.0 {
            self.transform = Affine::translate((dx, dy)) * self.transform;
        }
        self
    }

    /// Set a clip rectangle.
    pub fn with_clip(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    /// Append a child.
    pub fn append(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Chainable [`Node::append`].
    pub fn with_child(mut self, child: Self) -> Self {
        self.append(child);
        self
    }

    /// Append one child per datum, built by `f` (a data join without update/exit).
    pub fn append_all<T>(&mut self, data: impl IntoIterator<Item = T>, f: impl FnMut(T) -> Self) {
        self.children.extend(data.into_iter().map(f));
    }

    /// Returns the shape payload, if this node is a leaf shape.
    pub fn payload(&self) -> Option<&Payload> {
        match &self.kind {
            NodeKind::Shape(p) => Some(p),
            _ => None,
        }
    }

    /// Visit this node and all descendants in paint order (pre-order).
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Collect this node and all descendants matching `pred`, in paint order.
    pub fn find_all(&self, mut pred: impl FnMut(&Self) -> bool) -> Vec<&Self> {
        let mut out = Vec::new();
        self.walk(&mut |n| {
            if pred(n) {
                out.push(n);
            }
        });
        out
    }

    /// Returns the direct children whose `aria-label` equals `label`.
    pub fn children_labeled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children
            .iter()
            .filter(move |c| c.attr("aria-label") == Some(label))
    }
}
