//! RoughJS-compatible sketch generation (via `roughr`).
//!
//! Generation order follows Rough.js' generator: the outline opset is computed first (advancing
//! the seeded PRNG that lives on the options), then the fill. Emission order is fill, then outline.

use crate::draw::{SketchFill, SketchStyle};
use crate::{Error, Result};
use roughr::core::{FillStyle, OpSet, OpType, Options, OptionsBuilder};
use std::fmt::Write as _;
use std::str::FromStr as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SketchPathKind {
    /// Solid fill area (`stroke="none"`, `fill=<fill>`).
    FillPath,
    /// Hachure lines drawn with the fill colour as stroke.
    FillSketch,
    /// The outline.
    Outline,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SketchPath {
    pub(crate) kind: SketchPathKind,
    pub(crate) d: String,
}

/// A paint value roughr can take, or `None` when it has no CSS colour form (`var(...)`).
/// Unparsed values still reach the SVG as written.
fn parse_color(raw: &str) -> Option<roughr::Srgba> {
    let c = svgtypes::Color::from_str(raw.trim()).ok()?;
    Some(roughr::Srgba::new(
        c.red as f32 / 255.0,
        c.green as f32 / 255.0,
        c.blue as f32 / 255.0,
        c.alpha as f32 / 255.0,
    ))
}

/// `none`, `transparent` and fully transparent colours paint nothing.
fn is_no_paint(raw: &str) -> bool {
    let s = raw.trim();
    s.eq_ignore_ascii_case("none") || svgtypes::Color::from_str(s).is_ok_and(|c| c.alpha == 0)
}

/// The fill that is actually painted, if any.
fn painted_fill(o: &SketchStyle) -> Option<&str> {
    o.fill.as_deref().filter(|f| !is_no_paint(f))
}

fn build_options(o: &SketchStyle) -> Result<Options> {
    let mut builder = OptionsBuilder::default();
    builder
        .seed(o.seed)
        .fill_style(match o.fill_style {
            SketchFill::Solid => FillStyle::Solid,
            SketchFill::Hachure => FillStyle::Hachure,
        })
        .fill_line_dash(vec![0.0, 0.0])
        .fill_line_dash_offset(0.0)
        .disable_multi_stroke(false)
        .disable_multi_stroke_fill(false);
    if let Some(roughness) = o.roughness {
        builder.roughness(roughness);
    }
    if let Some(fill) = painted_fill(o).and_then(parse_color) {
        builder.fill(fill);
    }
    if let Some(stroke) = o.stroke.as_deref().and_then(parse_color) {
        builder.stroke(stroke);
    }
    if let Some(w) = o.stroke_width {
        builder.stroke_width(w);
    }
    if let Some(w) = o.fill_weight {
        builder.fill_weight(w);
    }
    if let Some(gap) = o.hachure_gap {
        builder.hachure_gap(gap);
    }
    if !o.stroke_line_dash.is_empty() {
        builder
            .stroke_line_dash(o.stroke_line_dash.clone())
            .stroke_line_dash_offset(0.0);
    }
    builder.build().map_err(|e| Error::Sketch {
        message: e.to_string(),
    })
}

// Rough.js emits path data via `opsToPath(...)` with `Number.toString()` precision.
fn ops_to_svg_path_d(opset: &OpSet<f64>) -> String {
    let mut out = String::new();
    for op in &opset.ops {
        match op.op {
            OpType::Move => {
                let _ = write!(&mut out, "M{} {} ", op.data[0], op.data[1]);
            }
            OpType::BCurveTo => {
                let _ = write!(
                    &mut out,
                    "C{} {}, {} {}, {} {} ",
                    op.data[0], op.data[1], op.data[2], op.data[3], op.data[4], op.data[5]
                );
            }
            OpType::LineTo => {
                let _ = write!(&mut out, "L{} {} ", op.data[0], op.data[1]);
            }
        }
    }
    out.trim_end().to_string()
}

fn fill_kind(o: &SketchStyle) -> SketchPathKind {
    match o.fill_style {
        SketchFill::Solid => SketchPathKind::FillPath,
        SketchFill::Hachure => SketchPathKind::FillSketch,
    }
}

/// Rough.js `generator.rectangle(x, y, w, h, options)`.
pub(crate) fn sketch_rectangle(
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    o: &SketchStyle,
) -> Result<Vec<SketchPath>> {
    let mut opts = build_options(o)?;
    let outline = roughr::renderer::rectangle::<f64>(x, y, w, h, &mut opts);

    let mut paths = Vec::with_capacity(2);
    if painted_fill(o).is_some() {
        let poly = vec![vec![
            roughr::Point2D::new(x, y),
            roughr::Point2D::new(x + w, y),
            roughr::Point2D::new(x + w, y + h),
            roughr::Point2D::new(x, y + h),
        ]];
        let fill = match o.fill_style {
            SketchFill::Solid => roughr::renderer::solid_fill_polygon(&poly, &mut opts),
            SketchFill::Hachure => roughr::renderer::pattern_fill_polygons(poly, &mut opts),
        };
        paths.push(SketchPath {
            kind: fill_kind(o),
            d: ops_to_svg_path_d(&fill),
        });
    }
    paths.push(SketchPath {
        kind: SketchPathKind::Outline,
        d: ops_to_svg_path_d(&outline),
    });
    Ok(paths)
}

/// Rough.js `generator.path(d, options)`.
pub(crate) fn sketch_path(svg_path_data: &str, o: &SketchStyle) -> Result<Vec<SketchPath>> {
    let mut opts = build_options(o)?;
    let base_roughness = opts.roughness.unwrap_or(1.0);
    let distance = (1.0 + base_roughness as f64) / 2.0;
    let sets = roughr::points_on_path::points_on_path::<f64>(
        svg_path_data.to_string(),
        Some(1.0),
        Some(distance),
    );

    let outline = roughr::renderer::svg_path::<f64>(svg_path_data.to_string(), &mut opts);

    let mut paths = Vec::with_capacity(2);
    if painted_fill(o).is_some() {
        let fill = match o.fill_style {
            SketchFill::Solid if sets.len() == 1 => {
                // Single closed shape: re-run the path with a rougher single stroke and keep only
                // the leading move so the result is one fillable outline.
                let mut fill_opts = opts.clone();
                fill_opts.disable_multi_stroke = Some(true);
                fill_opts.roughness = Some(if base_roughness != 0.0 {
                    base_roughness + 0.8
                } else {
                    0.0
                });
                let mut opset =
                    roughr::renderer::svg_path::<f64>(svg_path_data.to_string(), &mut fill_opts);
                let mut idx = 0usize;
                opset.ops.retain(|op| {
                    let keep = idx == 0 || op.op != OpType::Move;
                    idx += 1;
                    keep
                });
                opset
            }
            SketchFill::Solid => roughr::renderer::solid_fill_polygon(&sets, &mut opts),
            SketchFill::Hachure => roughr::renderer::pattern_fill_polygons(sets, &mut opts),
        };
        paths.push(SketchPath {
            kind: fill_kind(o),
            d: ops_to_svg_path_d(&fill),
        });
    }
    paths.push(SketchPath {
        kind: SketchPathKind::Outline,
        d: ops_to_svg_path_d(&outline),
    });
    Ok(paths)
}

/// Path data for a rectangle with circular corners of `radius` (zero gives square corners).
pub(crate) fn rounded_rect_path_d(x: f64, y: f64, width: f64, height: f64, radius: f64) -> String {
    let r = radius;
    format!(
        "M {} {} H {} A {r} {r} 0 0 1 {} {} V {} A {r} {r} 0 0 1 {} {} H {} A {r} {r} 0 0 1 {} {} V {} A {r} {r} 0 0 1 {} {} Z",
        x + r,
        y,
        x + width - r,
        x + width,
        y + r,
        y + height - r,
        x + width - r,
        y + height,
        x + r,
        x,
        y + height - r,
        y + r,
        x + r,
        y,
    )
}
