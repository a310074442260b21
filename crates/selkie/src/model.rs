use crate::Error;
use crate::intersect::intersect_rect;
use crate::surface::ElementId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const EMPTY: Self = Self {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    };

    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.include_point(x, y);
        }
        Some(b)
    }

    pub fn include_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_degenerate(&self) -> bool {
        self.width().abs() < 1e-9 && self.height().abs() < 1e-9
    }
}

/// Measured size of a constructed label element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelBBox {
    pub width: f64,
    pub height: f64,
}

impl LabelBBox {
    pub const EMPTY: Self = Self {
        width: 0.0,
        height: 0.0,
    };
}

impl From<Bounds> for LabelBBox {
    fn from(b: Bounds) -> Self {
        Self {
            width: b.width(),
            height: b.height(),
        }
    }
}

/// Finalized rectangle used for edge intersection: center plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ShapeKind {
    #[default]
    Rect,
    SquareRect,
    RoundedWithTitle,
    NoteGroup,
    Divider,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rect => "rect",
            ShapeKind::SquareRect => "squareRect",
            ShapeKind::RoundedWithTitle => "roundedWithTitle",
            ShapeKind::NoteGroup => "noteGroup",
            ShapeKind::Divider => "divider",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rect" => Ok(ShapeKind::Rect),
            "squareRect" => Ok(ShapeKind::SquareRect),
            "roundedWithTitle" => Ok(ShapeKind::RoundedWithTitle),
            "noteGroup" => Ok(ShapeKind::NoteGroup),
            "divider" => Ok(ShapeKind::Divider),
            other => Err(Error::UnknownShapeKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ShapeKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShapeKind> for String {
    fn from(kind: ShapeKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Look {
    #[default]
    Classic,
    #[serde(alias = "handdrawn")]
    HandDrawn,
    Neo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelType {
    #[default]
    #[serde(alias = "string")]
    Text,
    Markdown,
}

/// A cluster node as handed over by the layout engine.
///
/// The render call reads the input fields and writes the derived ones (`diff`, `offset_x`,
/// `offset_y`, `label_bbox`, `geometry`, and the final `width`/`height`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub label_type: LabelType,
    #[serde(default)]
    pub label_style: String,
    #[serde(default)]
    pub css_classes: String,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub shape: Option<ShapeKind>,
    #[serde(default)]
    pub look: Option<Look>,
    #[serde(default)]
    pub seed: Option<u64>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub padding: f64,
    #[serde(default)]
    pub rx: f64,
    #[serde(default)]
    pub ry: f64,

    #[serde(default)]
    pub diff: Option<f64>,
    #[serde(default)]
    pub offset_x: Option<f64>,
    #[serde(default)]
    pub offset_y: Option<f64>,
    #[serde(default)]
    pub label_bbox: Option<LabelBBox>,
    #[serde(default)]
    pub geometry: Option<NodeGeometry>,
}

impl ClusterNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_look(mut self, look: Look) -> Self {
        self.look = Some(look);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_classes(mut self, classes: impl Into<String>) -> Self {
        self.css_classes = classes.into();
        self
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape.unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.css_classes.split_whitespace().any(|c| c == class)
    }

    /// Records the current center and size as the intersection geometry.
    pub(crate) fn finalize_geometry(&mut self) {
        self.geometry = Some(NodeGeometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        });
    }

    /// Boundary point towards `point`, available once the node has been rendered.
    pub fn intersect(&self, point: Point) -> Option<Point> {
        self.geometry.as_ref().map(|g| intersect_rect(g, point))
    }
}

/// A drawn cluster container: the group handle plus the title label's measured size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedCluster {
    pub cluster: ElementId,
    pub label_bbox: LabelBBox,
}
