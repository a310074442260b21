use super::{ShapeContext, anchor, label_bbox, node_sketch, open_group, translate};
use crate::draw::{Outline, Placement, RectPrimitive, backend_for};
use crate::label::{LabelBuilder, LabelRequest};
use crate::model::{ClusterNode, Look, RenderedCluster};
use crate::style::compile_styles;
use crate::surface::{ElementId, Surface};
use crate::Result;
use tracing::{info, trace};

/// Plain container: grows to fit its title, label sits on the top edge.
pub(super) async fn render<L: LabelBuilder>(
    ctx: ShapeContext<'_, L>,
    surface: &mut Surface,
    parent: ElementId,
    node: &mut ClusterNode,
) -> Result<RenderedCluster> {
    info!(id = %node.id, "creating subgraph rect");
    let config = ctx.config;
    let look = ctx.look(node);
    let styles = compile_styles(&node.styles);
    let html = config.html_labels;

    let shape = open_group(surface, parent, node, &format!("cluster {}", node.css_classes))?;
    let label_group = surface.append(shape, "g")?;
    surface.set_attr(label_group, "class", "cluster-label ")?;

    let request = LabelRequest::for_node(node, &node.label_style, html);
    let text = ctx.labels.build(surface, label_group, &request).await?;
    let bbox = label_bbox(surface, text)?;

    let fit = bbox.width + node.padding;
    let grows = fit > node.width;
    let width = if grows { fit } else { node.width };
    node.diff = Some(if grows {
        (bbox.width - node.width) / 2.0 - node.padding / 2.0
    } else {
        -node.padding / 2.0
    });

    let height = node.height;
    let (x, y) = (-width / 2.0, -height / 2.0);
    trace!(?node, "cluster data");

    let mut prim = RectPrimitive::new(x, y, width, height);
    if look == Look::HandDrawn {
        let theme = &config.theme;
        let mut sketch =
            node_sketch(ctx.seed(node), &styles, &theme.cluster_bkg, &theme.cluster_border);
        sketch.fill_weight = Some(3.0);
        prim = prim.with_sketch(Outline::RoundedPath { radius: 0.0 }, sketch);
    } else {
        prim.style = Some(styles.node_style.clone());
        prim.rx = Some(node.rx);
        prim.ry = Some(node.ry);
    }
    let rect = backend_for(look).draw_rect(surface, shape, Placement::FirstChild, &prim)?;

    let top = config.title_margins.top;
    let label_x = if html { -bbox.width / 2.0 } else { 0.0 };
    surface.set_attr(
        label_group,
        "transform",
        translate(label_x, -node.height / 2.0 + top),
    )?;
    if !styles.label_style.is_empty() {
        if let Some(span) = surface.find_descendant(label_group, "span") {
            surface.set_attr(span, "style", styles.label_style.as_str())?;
        }
    }

    let rect_box = surface.bbox(rect)?;
    node.width = rect_box.width();
    node.height = rect_box.height();
    node.finalize_geometry();
    anchor(surface, shape, node)?;

    Ok(RenderedCluster {
        cluster: shape,
        label_bbox: bbox,
    })
}
