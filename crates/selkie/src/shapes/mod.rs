//! Cluster shape variants and their dispatch.
//!
//! Every variant draws into a fresh `<g>` under the parent, translated to the node center, so
//! the container's own coordinates are relative to `(0, 0)`.

mod divider;
mod note_group;
mod rect;
mod rounded_with_title;

use crate::config::ClusterConfig;
use crate::draw::{SketchFill, SketchStyle};
use crate::label::LabelBuilder;
use crate::model::{ClusterNode, LabelBBox, Look, RenderedCluster, ShapeKind};
use crate::style::CompiledStyles;
use crate::surface::{ElementId, Surface, fmt};
use crate::Result;

/// What a shape needs beyond the node itself.
#[derive(Debug)]
pub struct ShapeContext<'a, L> {
    pub config: &'a ClusterConfig,
    pub labels: &'a L,
}

impl<L> Clone for ShapeContext<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for ShapeContext<'_, L> {}

impl<'a, L> ShapeContext<'a, L> {
    pub fn new(config: &'a ClusterConfig, labels: &'a L) -> Self {
        Self { config, labels }
    }

    /// The node's own look wins over the site look.
    pub fn look(&self, node: &ClusterNode) -> Look {
        node.look.unwrap_or(self.config.look)
    }

    pub fn seed(&self, node: &ClusterNode) -> u64 {
        node.seed.unwrap_or(self.config.hand_drawn_seed)
    }
}

/// Draws `node` as `kind` under `parent` and writes its derived fields.
pub async fn render<L: LabelBuilder>(
    kind: ShapeKind,
    ctx: ShapeContext<'_, L>,
    surface: &mut Surface,
    parent: ElementId,
    node: &mut ClusterNode,
) -> Result<RenderedCluster> {
    let before = surface.children(parent).len();
    let drawn = match kind {
        ShapeKind::Rect | ShapeKind::SquareRect => rect::render(ctx, surface, parent, node).await,
        ShapeKind::RoundedWithTitle => {
            rounded_with_title::render(ctx, surface, parent, node).await
        }
        ShapeKind::NoteGroup => note_group::render(surface, parent, node),
        ShapeKind::Divider => divider::render(ctx, surface, parent, node),
    };
    if drawn.is_err() {
        // A failed draw leaves nothing under `parent`.
        let partial = surface
            .children(parent)
            .get(before..)
            .unwrap_or_default()
            .to_vec();
        for el in partial {
            surface.remove(el)?;
        }
    }
    drawn
}

pub(crate) fn translate(x: f64, y: f64) -> String {
    format!("translate({}, {})", fmt(x), fmt(y))
}

/// Opens the container group. [`anchor`] moves it to the node center once it is sized.
fn open_group(
    surface: &mut Surface,
    parent: ElementId,
    node: &ClusterNode,
    class: &str,
) -> Result<ElementId> {
    let shape = surface.append(parent, "g")?;
    surface.set_attr(shape, "class", class)?;
    surface.set_attr(shape, "id", node.id.as_str())?;
    Ok(shape)
}

fn anchor(surface: &mut Surface, shape: ElementId, node: &ClusterNode) -> Result<()> {
    surface.set_attr(shape, "transform", translate(node.x, node.y))
}

fn label_bbox(surface: &Surface, label: ElementId) -> Result<LabelBBox> {
    Ok(LabelBBox::from(surface.bbox(label)?))
}

/// Hand-drawn defaults for a node. The shape's `fill` and `stroke` win over the node's own
/// `style` declarations; stroke width and dash still come from the node.
fn node_sketch(
    seed: u64,
    styles: &CompiledStyles,
    fill: &str,
    stroke: &str,
) -> SketchStyle {
    SketchStyle {
        seed,
        roughness: Some(0.7),
        fill: Some(fill.to_string()),
        fill_style: SketchFill::Hachure,
        fill_weight: Some(4.0),
        hachure_gap: Some(5.2),
        stroke: Some(stroke.to_string()),
        stroke_width: Some(styles.stroke_width_px().unwrap_or(1.3)),
        stroke_line_dash: styles.stroke_dash(),
    }
}
