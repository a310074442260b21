use super::{ShapeContext, anchor, open_group};
use crate::draw::{Outline, Placement, RectPrimitive, SketchStyle, backend_for};
use crate::model::{ClusterNode, LabelBBox, Look, RenderedCluster};
use crate::surface::{ElementId, Surface};
use crate::Result;

/// Separator between concurrent regions of a composite state.
pub(super) fn render<L>(
    ctx: ShapeContext<'_, L>,
    surface: &mut Surface,
    parent: ElementId,
    node: &mut ClusterNode,
) -> Result<RenderedCluster> {
    let look = ctx.look(node);
    let shape = open_group(surface, parent, node, &node.css_classes)?;

    let prim = RectPrimitive::new(
        -node.width / 2.0,
        -node.height / 2.0,
        node.width,
        node.height,
    );
    let (prim, placement) = if look == Look::HandDrawn {
        let sketch = SketchStyle {
            fill: Some("lightgrey".to_string()),
            roughness: Some(0.5),
            stroke_line_dash: vec![5.0],
            ..SketchStyle::seeded(ctx.seed(node))
        };
        (prim.with_sketch(Outline::Rectangle, sketch), Placement::Append)
    } else {
        (prim.with_class("divider"), Placement::FirstChild)
    };
    let rect = backend_for(look).draw_rect(surface, shape, placement, &prim)?;

    let rect_box = surface.bbox(rect)?;
    node.width = rect_box.width();
    node.height = rect_box.height() - node.padding;
    node.diff = Some(0.0);
    node.offset_y = Some(0.0);
    node.finalize_geometry();
    anchor(surface, shape, node)?;

    Ok(RenderedCluster {
        cluster: shape,
        label_bbox: LabelBBox::EMPTY,
    })
}
