//! In-memory SVG element tree.
//!
//! The renderer inserts groups and primitives, sets attributes, and asks for bounding boxes the
//! way it would against a browser DOM. Elements live in an arena and are addressed by
//! [`ElementId`]; removed slots are never reused, so a stale id fails instead of aliasing.

use crate::model::Bounds;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::fmt::{self, Write as _};
use svgtypes::{PathParser, PathSegment, Transform};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: IndexMap<String, String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    text: Option<String>,
    /// Laid-out box supplied by a text layout pass (for `<text>` and friends).
    intrinsic: Option<Bounds>,
}

impl Element {
    fn new(tag: &str, parent: Option<ElementId>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: IndexMap::new(),
            children: Vec::new(),
            parent,
            text: None,
            intrinsic: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Surface {
    elements: Vec<Option<Element>>,
    root: ElementId,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// Creates a surface holding an empty `<svg>` root.
    pub fn new() -> Self {
        let mut root = Element::new("svg", None);
        root.attrs.insert("xmlns".to_string(), SVG_NS.to_string());
        Self {
            elements: vec![Some(root)],
            root: ElementId(0),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    fn get(&self, id: ElementId) -> Result<&Element> {
        self.elements
            .get(id.0)
            .and_then(|e| e.as_ref())
            .ok_or(Error::UnknownElement { element: id.0 })
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id.0)
            .and_then(|e| e.as_mut())
            .ok_or(Error::UnknownElement { element: id.0 })
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of live elements, the root included.
    pub fn element_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_some()).count()
    }

    fn create(&mut self, parent: ElementId, tag: &str, first: bool) -> Result<ElementId> {
        self.get(parent)?;
        let id = ElementId(self.elements.len());
        self.elements.push(Some(Element::new(tag, Some(parent))));
        let children = &mut self.get_mut(parent)?.children;
        if first {
            children.insert(0, id);
        } else {
            children.push(id);
        }
        Ok(id)
    }

    /// Appends a new `tag` element as the last child of `parent`.
    pub fn append(&mut self, parent: ElementId, tag: &str) -> Result<ElementId> {
        self.create(parent, tag, false)
    }

    /// Inserts a new `tag` element as the first child of `parent`.
    pub fn insert_first(&mut self, parent: ElementId, tag: &str) -> Result<ElementId> {
        self.create(parent, tag, true)
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) -> Result<()> {
        self.get_mut(id)?
            .attrs
            .insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn set_num_attr(&mut self, id: ElementId, name: &str, value: f64) -> Result<()> {
        self.set_attr(id, name, fmt(value))
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id).ok()?.attrs.get(name).map(|s| s.as_str())
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.get(id).ok().map(|e| e.tag.as_str())
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.text = Some(text.into());
        Ok(())
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id).ok()?.text.as_deref()
    }

    /// Records the laid-out box of an element whose geometry is not expressed in attributes.
    pub fn set_intrinsic_bounds(&mut self, id: ElementId, bounds: Bounds) -> Result<()> {
        self.get_mut(id)?.intrinsic = Some(bounds);
        Ok(())
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).ok()?.parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// First descendant (depth-first, document order) with the given tag.
    pub fn find_descendant(&self, id: ElementId, tag: &str) -> Option<ElementId> {
        for &child in self.children(id) {
            if self.tag(child) == Some(tag) {
                return Some(child);
            }
            if let Some(found) = self.find_descendant(child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Detaches `id` from its parent and drops it together with its subtree.
    pub fn remove(&mut self, id: ElementId) -> Result<()> {
        if id == self.root {
            return Err(Error::UnknownElement { element: id.0 });
        }
        let parent = self.get(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(slot) = self.elements.get_mut(cur.0) {
                if let Some(el) = slot.take() {
                    stack.extend(el.children);
                }
            }
        }
        Ok(())
    }

    /// Geometry of `id` in its own user space, like SVG `getBBox()`.
    ///
    /// The element's own `transform` is not applied; children's transforms are.
    pub fn bbox(&self, id: ElementId) -> Result<Bounds> {
        Ok(self.bbox_inner(id)?.unwrap_or(Bounds::EMPTY))
    }

    /// Bounding box of `id` in its parent's coordinate space (own `transform` applied).
    pub fn bbox_in_parent(&self, id: ElementId) -> Result<Bounds> {
        let b = self.bbox(id)?;
        Ok(match self.attr(id, "transform").and_then(parse_transform) {
            Some(ts) => transform_bounds(&ts, &b),
            None => b,
        })
    }

    fn bbox_inner(&self, id: ElementId) -> Result<Option<Bounds>> {
        let el = self.get(id)?;
        if let Some(b) = el.intrinsic {
            return Ok(Some(b));
        }
        let num = |name: &str| -> f64 {
            el.attrs
                .get(name)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        let own = match el.tag.as_str() {
            "rect" | "foreignObject" | "image" => {
                let b = Bounds::from_rect(num("x"), num("y"), num("width"), num("height"));
                (!b.is_degenerate()).then_some(b)
            }
            "path" => el.attrs.get("d").and_then(|d| path_bounds(d)),
            "line" => Bounds::from_points([(num("x1"), num("y1")), (num("x2"), num("y2"))]),
            _ => None,
        };
        if own.is_some() || !matches!(el.tag.as_str(), "g" | "svg" | "text" | "a") {
            return Ok(own);
        }

        let mut acc: Option<Bounds> = None;
        for &child in &el.children {
            let Some(b) = self.bbox_inner(child)? else {
                continue;
            };
            let b = match self.attr(child, "transform").and_then(parse_transform) {
                Some(ts) => transform_bounds(&ts, &b),
                None => b,
            };
            acc = Some(match acc {
                Some(a) => a.union(&b),
                None => b,
            });
        }
        Ok(acc)
    }

    /// Serializes the whole tree.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        self.write_element(&mut out, self.root);
        out
    }

    /// Serializes the subtree rooted at `id`.
    pub fn element_to_svg(&self, id: ElementId) -> Result<String> {
        self.get(id)?;
        let mut out = String::new();
        self.write_element(&mut out, id);
        Ok(out)
    }

    fn write_element(&self, out: &mut String, id: ElementId) {
        let Ok(el) = self.get(id) else {
            return;
        };
        out.push('<');
        out.push_str(&el.tag);
        for (k, v) in &el.attrs {
            let _ = write!(out, r#" {}="{}""#, k, escape_xml(v));
        }
        if el.children.is_empty() && el.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &el.text {
            out.push_str(&escape_xml(text));
        }
        for &child in &el.children {
            self.write_element(out, child);
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

/// Number formatting for attributes: round-trippable, no `-0`, no float noise next to integers.
pub fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }
    format!("{v}")
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn parse_transform(raw: &str) -> Option<Transform> {
    raw.parse::<Transform>().ok()
}

fn transform_bounds(ts: &Transform, b: &Bounds) -> Bounds {
    let apply = |x: f64, y: f64| (ts.a * x + ts.c * y + ts.e, ts.b * x + ts.d * y + ts.f);
    Bounds::from_points([
        apply(b.min_x, b.min_y),
        apply(b.max_x, b.min_y),
        apply(b.max_x, b.max_y),
        apply(b.min_x, b.max_y),
    ])
    .unwrap_or(*b)
}

fn cubic_include_bounds(
    b: &mut Bounds,
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
) {
    fn eval(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
        let mt = 1.0 - t;
        mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
    }
    // Roots of the derivative `3at^2 + 2bt + c` per axis.
    fn extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> Vec<f64> {
        let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        let bb = 3.0 * p0 - 6.0 * p1 + 3.0 * p2;
        let c = -3.0 * p0 + 3.0 * p1;
        let (qa, qb, qc) = (3.0 * a, 2.0 * bb, c);
        const EPS: f64 = 1e-12;
        if qa.abs() <= EPS {
            if qb.abs() <= EPS {
                return Vec::new();
            }
            return vec![-qc / qb];
        }
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return Vec::new();
        }
        let s = disc.sqrt();
        vec![(-qb + s) / (2.0 * qa), (-qb - s) / (2.0 * qa)]
    }

    b.include_point(p0.0, p0.1);
    b.include_point(p3.0, p3.1);
    let ts = extrema(p0.0, p1.0, p2.0, p3.0)
        .into_iter()
        .chain(extrema(p0.1, p1.1, p2.1, p3.1));
    for t in ts.filter(|t| *t > 0.0 && *t < 1.0) {
        b.include_point(
            eval(p0.0, p1.0, p2.0, p3.0, t),
            eval(p0.1, p1.1, p2.1, p3.1, t),
        );
    }
}

/// Bounds of SVG path data.
///
/// Cubic and quadratic segments contribute their exact extrema; elliptical arcs contribute their
/// endpoints only.
pub(crate) fn path_bounds(d: &str) -> Option<Bounds> {
    let mut b: Option<Bounds> = None;
    let mut cur = (0.0_f64, 0.0_f64);
    let mut start = (0.0_f64, 0.0_f64);
    let mut last_ctrl: Option<(f64, f64)> = None;
    let mut last_quad: Option<(f64, f64)> = None;

    fn include(b: &mut Option<Bounds>, p: (f64, f64)) {
        match b {
            Some(b) => b.include_point(p.0, p.1),
            None => *b = Bounds::from_points([p]),
        }
    }

    for seg in PathParser::from(d) {
        // Browsers render up to the first malformed segment.
        let Ok(seg) = seg else {
            break;
        };
        let rel = |abs: bool, x: f64, y: f64, cur: (f64, f64)| {
            if abs { (x, y) } else { (cur.0 + x, cur.1 + y) }
        };
        let mut next_ctrl = None;
        let mut next_quad = None;
        match seg {
            PathSegment::MoveTo { abs, x, y } => {
                cur = rel(abs, x, y, cur);
                start = cur;
                include(&mut b, cur);
            }
            PathSegment::LineTo { abs, x, y } => {
                cur = rel(abs, x, y, cur);
                include(&mut b, cur);
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                cur.0 = if abs { x } else { cur.0 + x };
                include(&mut b, cur);
            }
            PathSegment::VerticalLineTo { abs, y } => {
                cur.1 = if abs { y } else { cur.1 + y };
                include(&mut b, cur);
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let p1 = rel(abs, x1, y1, cur);
                let p2 = rel(abs, x2, y2, cur);
                let p3 = rel(abs, x, y, cur);
                let acc = b.get_or_insert(Bounds::from_rect(cur.0, cur.1, 0.0, 0.0));
                cubic_include_bounds(acc, cur, p1, p2, p3);
                next_ctrl = Some(p2);
                cur = p3;
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let p1 = match last_ctrl {
                    Some(c) => (2.0 * cur.0 - c.0, 2.0 * cur.1 - c.1),
                    None => cur,
                };
                let p2 = rel(abs, x2, y2, cur);
                let p3 = rel(abs, x, y, cur);
                let acc = b.get_or_insert(Bounds::from_rect(cur.0, cur.1, 0.0, 0.0));
                cubic_include_bounds(acc, cur, p1, p2, p3);
                next_ctrl = Some(p2);
                cur = p3;
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let q = rel(abs, x1, y1, cur);
                let p3 = rel(abs, x, y, cur);
                let p1 = (cur.0 + 2.0 / 3.0 * (q.0 - cur.0), cur.1 + 2.0 / 3.0 * (q.1 - cur.1));
                let p2 = (p3.0 + 2.0 / 3.0 * (q.0 - p3.0), p3.1 + 2.0 / 3.0 * (q.1 - p3.1));
                let acc = b.get_or_insert(Bounds::from_rect(cur.0, cur.1, 0.0, 0.0));
                cubic_include_bounds(acc, cur, p1, p2, p3);
                next_quad = Some(q);
                cur = p3;
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let q = match last_quad {
                    Some(c) => (2.0 * cur.0 - c.0, 2.0 * cur.1 - c.1),
                    None => cur,
                };
                let p3 = rel(abs, x, y, cur);
                let p1 = (cur.0 + 2.0 / 3.0 * (q.0 - cur.0), cur.1 + 2.0 / 3.0 * (q.1 - cur.1));
                let p2 = (p3.0 + 2.0 / 3.0 * (q.0 - p3.0), p3.1 + 2.0 / 3.0 * (q.1 - p3.1));
                let acc = b.get_or_insert(Bounds::from_rect(cur.0, cur.1, 0.0, 0.0));
                cubic_include_bounds(acc, cur, p1, p2, p3);
                next_quad = Some(q);
                cur = p3;
            }
            PathSegment::EllipticalArc { abs, x, y, .. } => {
                cur = rel(abs, x, y, cur);
                include(&mut b, cur);
            }
            PathSegment::ClosePath { .. } => {
                cur = start;
            }
        }
        last_ctrl = next_ctrl;
        last_quad = next_quad;
    }
    b
}
