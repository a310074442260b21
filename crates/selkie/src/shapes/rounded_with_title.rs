use super::{ShapeContext, anchor, label_bbox, open_group, translate};
use crate::draw::{
    ClassicBackend, DrawBackend, Outline, Placement, RectPrimitive, SketchBackend, SketchFill,
    SketchStyle,
};
use crate::label::{LabelBuilder, LabelRequest};
use crate::model::{ClusterNode, LabelType, Look, RenderedCluster};
use crate::surface::{ElementId, Surface};
use crate::Result;
use tracing::info;

const ALT_CLASS: &str = "statediagram-cluster-alt";

/// Composite-state container: a title band (outer rect) over an inner body rect.
///
/// Only the height is taken from the drawn outer rect; the width stays as the layout requested.
pub(super) async fn render<L: LabelBuilder>(
    ctx: ShapeContext<'_, L>,
    surface: &mut Surface,
    parent: ElementId,
    node: &mut ClusterNode,
) -> Result<RenderedCluster> {
    info!(id = %node.id, "creating titled cluster");
    let config = ctx.config;
    let theme = &config.theme;
    let look = ctx.look(node);
    let html = config.html_labels;

    let shape = open_group(surface, parent, node, &node.css_classes)?;
    surface.set_attr(shape, "data-et", "node")?;
    surface.set_attr(shape, "data-node", "true")?;
    surface.set_attr(shape, "data-id", node.id.as_str())?;

    let outer_group = surface.insert_first(shape, "g")?;
    let label_group = surface.append(shape, "g")?;
    surface.set_attr(label_group, "class", "cluster-label")?;

    let request = LabelRequest {
        label_type: LabelType::Text,
        ..LabelRequest::for_node(node, &node.label_style, html)
    };
    let text = ctx.labels.build(surface, label_group, &request).await?;
    let bbox = label_bbox(surface, text)?;

    let grows = bbox.width + node.padding > node.width;
    let width = if grows {
        bbox.width + node.padding
    } else {
        node.width
    };
    node.diff = Some(if grows {
        (bbox.width - node.width) / 2.0
    } else {
        -node.padding / 2.0
    });

    let x = -width / 2.0;
    let y = -node.height / 2.0;
    let height = node.height;
    let inner_y = y + bbox.height + 2.0;
    // Not clamped: a title taller than the box leaves a negative body height.
    let inner_height = node.height - bbox.height - 6.0;

    let outer = if look == Look::HandDrawn {
        let seed = ctx.seed(node);
        let outer_prim = if node.rx != 0.0 || node.ry != 0.0 {
            RectPrimitive::new(x, y, width, height).with_sketch(
                Outline::RoundedPath { radius: 10.0 },
                SketchStyle {
                    roughness: Some(0.7),
                    fill: Some(theme.composite_title_background.clone()),
                    fill_style: SketchFill::Solid,
                    stroke: Some(theme.node_border.clone()),
                    ..SketchStyle::seeded(seed)
                },
            )
        } else {
            RectPrimitive::new(x, y, width, height)
                .with_sketch(Outline::Rectangle, SketchStyle::seeded(seed))
        };
        let outer =
            SketchBackend.draw_rect(surface, outer_group, Placement::FirstChild, &outer_prim)?;

        let alt = node.has_class(ALT_CLASS);
        let inner_prim = RectPrimitive::new(x, inner_y, width, inner_height).with_sketch(
            Outline::Rectangle,
            SketchStyle {
                fill: Some(if alt {
                    theme.alt_background.clone()
                } else {
                    theme.composite_background.clone()
                }),
                fill_style: if alt {
                    SketchFill::Hachure
                } else {
                    SketchFill::Solid
                },
                stroke: Some(theme.node_border.clone()),
                ..SketchStyle::seeded(seed)
            },
        );
        SketchBackend.draw_rect(surface, shape, Placement::Append, &inner_prim)?;
        outer
    } else {
        let outer_class = if look == Look::Neo {
            "outer state-shadow-neo"
        } else {
            "outer"
        };
        let outer = ClassicBackend.draw_rect(
            surface,
            outer_group,
            Placement::FirstChild,
            &RectPrimitive::new(x, y, width, height).with_class(outer_class),
        )?;
        ClassicBackend.draw_rect(
            surface,
            shape,
            Placement::Append,
            &RectPrimitive::new(x, inner_y, width, inner_height).with_class("inner"),
        )?;
        outer
    };

    let label_y = y + 1.0 - if html { 0.0 } else { 3.0 };
    surface.set_attr(
        label_group,
        "transform",
        translate(-bbox.width / 2.0, label_y),
    )?;

    let outer_box = surface.bbox(outer)?;
    node.height = outer_box.height();
    node.offset_x = Some(0.0);
    node.offset_y = Some(bbox.height - node.padding / 2.0);
    node.label_bbox = Some(bbox);
    node.finalize_geometry();
    anchor(surface, shape, node)?;

    Ok(RenderedCluster {
        cluster: shape,
        label_bbox: bbox,
    })
}
