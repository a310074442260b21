use super::{anchor, open_group};
use crate::draw::{ClassicBackend, DrawBackend, Placement, RectPrimitive};
use crate::model::{ClusterNode, LabelBBox, RenderedCluster};
use crate::surface::{ElementId, Surface};
use crate::Result;

/// Unfilled grouping box around a note and the node it annotates. Has no label.
pub(super) fn render(
    surface: &mut Surface,
    parent: ElementId,
    node: &mut ClusterNode,
) -> Result<RenderedCluster> {
    let shape = open_group(surface, parent, node, "note-cluster")?;

    let mut prim = RectPrimitive::new(
        -node.width / 2.0,
        -node.height / 2.0,
        node.width,
        node.height,
    );
    prim.rx = Some(node.rx);
    prim.ry = Some(node.ry);
    prim.fill = Some("none".to_string());
    let rect = ClassicBackend.draw_rect(surface, shape, Placement::FirstChild, &prim)?;

    let rect_box = surface.bbox(rect)?;
    node.width = rect_box.width();
    node.height = rect_box.height();
    node.finalize_geometry();
    anchor(surface, shape, node)?;

    Ok(RenderedCluster {
        cluster: shape,
        label_bbox: LabelBBox::EMPTY,
    })
}
