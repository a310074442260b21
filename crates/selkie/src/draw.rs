//! Background primitives for cluster containers.
//!
//! Shapes describe the rectangle they want once ([`RectPrimitive`]) and hand it to a
//! [`DrawBackend`]. [`ClassicBackend`] emits a plain `<rect>`; [`SketchBackend`] emits a
//! Rough.js-style `<g>` of jittered paths. Both cover the same box, so geometry read back from
//! the primitive agrees within the sketch jitter.

use crate::model::Look;
use crate::rough::{self, SketchPath, SketchPathKind};
use crate::surface::{ElementId, Surface, fmt};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SketchFill {
    Solid,
    #[default]
    Hachure,
}

/// Hand-drawn options. `None` keeps the sketch engine's own default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SketchStyle {
    pub seed: u64,
    pub roughness: Option<f32>,
    pub fill: Option<String>,
    pub fill_style: SketchFill,
    pub fill_weight: Option<f32>,
    pub hachure_gap: Option<f32>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
    pub stroke_line_dash: Vec<f64>,
}

impl SketchStyle {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Outline {
    #[default]
    Rectangle,
    /// A rounded-rectangle path; radius `0` still goes through the path generator.
    RoundedPath { radius: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    FirstChild,
    Append,
}

/// A container rectangle in the parent's user space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RectPrimitive {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub class: Option<String>,
    pub style: Option<String>,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
    pub fill: Option<String>,
    pub outline: Outline,
    pub sketch: SketchStyle,
}

impl RectPrimitive {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_sketch(mut self, outline: Outline, sketch: SketchStyle) -> Self {
        self.outline = outline;
        self.sketch = sketch;
        self
    }
}

pub trait DrawBackend {
    fn draw_rect(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        placement: Placement,
        rect: &RectPrimitive,
    ) -> Result<ElementId>;
}

fn place(
    surface: &mut Surface,
    parent: ElementId,
    placement: Placement,
    tag: &str,
) -> Result<ElementId> {
    match placement {
        Placement::FirstChild => surface.insert_first(parent, tag),
        Placement::Append => surface.append(parent, tag),
    }
}

/// Plain SVG `<rect>` output. Ignores the sketch options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicBackend;

impl DrawBackend for ClassicBackend {
    fn draw_rect(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        placement: Placement,
        rect: &RectPrimitive,
    ) -> Result<ElementId> {
        let el = place(surface, parent, placement, "rect")?;
        if let Some(class) = rect.class.as_deref() {
            surface.set_attr(el, "class", class)?;
        }
        if let Some(style) = rect.style.as_deref() {
            surface.set_attr(el, "style", style)?;
        }
        if let Some(rx) = rect.rx {
            surface.set_num_attr(el, "rx", rx)?;
        }
        if let Some(ry) = rect.ry {
            surface.set_num_attr(el, "ry", ry)?;
        }
        surface.set_num_attr(el, "x", rect.x)?;
        surface.set_num_attr(el, "y", rect.y)?;
        surface.set_num_attr(el, "width", rect.width)?;
        surface.set_num_attr(el, "height", rect.height)?;
        if let Some(fill) = rect.fill.as_deref() {
            surface.set_attr(el, "fill", fill)?;
        }
        Ok(el)
    }
}

/// Rough.js-style output: a bare `<g>` holding the fill path(s) followed by the outline.
///
/// Class, style and corner radii of the primitive are not applied, matching what the sketch
/// generator returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SketchBackend;

impl SketchBackend {
    fn write_path(
        surface: &mut Surface,
        group: ElementId,
        path: &SketchPath,
        sketch: &SketchStyle,
    ) -> Result<()> {
        let el = surface.append(group, "path")?;
        surface.set_attr(el, "d", path.d.as_str())?;
        let stroke_width = sketch.stroke_width.unwrap_or(1.0) as f64;
        match path.kind {
            SketchPathKind::FillPath => {
                surface.set_attr(el, "stroke", "none")?;
                surface.set_attr(el, "stroke-width", "0")?;
                surface.set_attr(el, "fill", sketch.fill.as_deref().unwrap_or("none"))?;
            }
            SketchPathKind::FillSketch => {
                let weight = match sketch.fill_weight {
                    Some(w) if w > 0.0 => w as f64,
                    _ => stroke_width / 2.0,
                };
                surface.set_attr(el, "stroke", sketch.fill.as_deref().unwrap_or("none"))?;
                surface.set_attr(el, "stroke-width", fmt(weight))?;
                surface.set_attr(el, "fill", "none")?;
            }
            SketchPathKind::Outline => {
                surface.set_attr(el, "stroke", sketch.stroke.as_deref().unwrap_or("#000"))?;
                surface.set_attr(el, "stroke-width", fmt(stroke_width))?;
                surface.set_attr(el, "fill", "none")?;
                if !sketch.stroke_line_dash.is_empty() {
                    let dash = sketch
                        .stroke_line_dash
                        .iter()
                        .map(|v| fmt(*v))
                        .collect::<Vec<_>>()
                        .join(" ");
                    surface.set_attr(el, "stroke-dasharray", dash)?;
                }
            }
        }
        Ok(())
    }
}

impl DrawBackend for SketchBackend {
    fn draw_rect(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        placement: Placement,
        rect: &RectPrimitive,
    ) -> Result<ElementId> {
        let paths = match rect.outline {
            Outline::Rectangle => {
                rough::sketch_rectangle(rect.x, rect.y, rect.width, rect.height, &rect.sketch)?
            }
            Outline::RoundedPath { radius } => {
                let d = rough::rounded_rect_path_d(rect.x, rect.y, rect.width, rect.height, radius);
                rough::sketch_path(&d, &rect.sketch)?
            }
        };

        let group = place(surface, parent, placement, "g")?;
        for path in &paths {
            Self::write_path(surface, group, path, &rect.sketch)?;
        }
        tracing::debug!(
            seed = rect.sketch.seed,
            paths = paths.len(),
            "rough node inserted"
        );
        Ok(group)
    }
}

/// The backend a container with the given look draws through.
pub fn backend_for(look: Look) -> &'static dyn DrawBackend {
    match look {
        Look::HandDrawn => &SketchBackend,
        Look::Classic | Look::Neo => &ClassicBackend,
    }
}
