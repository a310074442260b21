use futures::executor::block_on;
use selkie::{
    ClusterConfig, ClusterNode, ClusterRenderer, ClusterStore, ElementId, Error, LabelBBox,
    LabelBuilder, LabelRequest, LabelType, Look, Point, ShapeKind, Surface,
};

/// Label whose laid-out box is a fixed size, like a browser measurement would report.
struct FixedLabel {
    width: f64,
    height: f64,
}

impl LabelBuilder for FixedLabel {
    async fn build(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        request: &LabelRequest<'_>,
    ) -> selkie::Result<ElementId> {
        let fo = surface.append(parent, "foreignObject")?;
        surface.set_num_attr(fo, "width", self.width)?;
        surface.set_num_attr(fo, "height", self.height)?;
        let span = surface.append(fo, "span")?;
        surface.set_text(span, request.text)?;
        Ok(fo)
    }
}

struct FailingLabel;

impl LabelBuilder for FailingLabel {
    async fn build(
        &self,
        _surface: &mut Surface,
        _parent: ElementId,
        request: &LabelRequest<'_>,
    ) -> selkie::Result<ElementId> {
        Err(Error::Label {
            id: request.id.to_string(),
            message: "font not loaded".to_string(),
        })
    }
}

fn renderer(config: ClusterConfig) -> ClusterRenderer<FixedLabel> {
    ClusterRenderer::new(
        config,
        FixedLabel {
            width: 60.0,
            height: 20.0,
        },
    )
}

fn node_a(width: f64) -> ClusterNode {
    ClusterNode::new("A", 100.0, 50.0, width, 40.0)
        .with_label("Group A")
        .with_padding(8.0)
}

fn insert(
    renderer: &ClusterRenderer<FixedLabel>,
    store: &mut ClusterStore,
    surface: &mut Surface,
    node: &mut ClusterNode,
) -> selkie::RenderedCluster {
    let root = surface.root();
    block_on(renderer.insert_cluster(store, surface, root, node)).unwrap()
}

#[test]
fn rect_keeps_requested_width_when_the_title_fits() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);

    let rendered = insert(&renderer, &mut store, &mut surface, &mut node);

    assert_eq!(node.width, 80.0);
    assert_eq!(node.height, 40.0);
    assert_eq!(node.diff, Some(-4.0));
    assert_eq!(
        rendered.label_bbox,
        LabelBBox {
            width: 60.0,
            height: 20.0
        }
    );
    let svg = surface.to_svg();
    assert!(svg.contains(r#"<g class="cluster " id="A""#), "{svg}");
    assert!(
        svg.contains(r#"<rect style="" rx="0" ry="0" x="-40" y="-20" width="80" height="40"/>"#),
        "{svg}"
    );
    assert!(
        svg.contains(r#"<g class="cluster-label " transform="translate(-30, -20)">"#),
        "{svg}"
    );
}

#[test]
fn rect_grows_to_fit_a_wide_title() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(40.0);

    insert(&renderer, &mut store, &mut surface, &mut node);

    assert_eq!(node.width, 68.0);
    assert_eq!(node.diff, Some(6.0));
    let geometry = node.geometry.unwrap();
    assert_eq!((geometry.x, geometry.y), (100.0, 50.0));
    assert_eq!(geometry.width, 68.0);
}

#[test]
fn rect_title_margin_and_svg_labels_move_the_title() {
    let config = ClusterConfig::from_value(&serde_json::json!({
        "flowchart": { "htmlLabels": false, "subGraphTitleMargin": { "top": 5 } }
    }));
    let renderer = renderer(config);
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);
    node.styles = vec!["fill:#f9f".to_string(), "color:red".to_string()];

    let rendered = insert(&renderer, &mut store, &mut surface, &mut node);

    let label_group = surface.children(rendered.cluster)[1];
    assert_eq!(
        surface.attr(label_group, "transform"),
        Some("translate(0, -15)")
    );
    let svg = surface.to_svg();
    assert!(svg.contains(r#"style="fill:#f9f !important""#), "{svg}");
    assert!(svg.contains(r#"<span style="color:red !important">"#), "{svg}");
}

#[test]
fn rounded_with_title_offsets_follow_the_title() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = ClusterNode::new("S", 0.0, 0.0, 200.0, 100.0)
        .with_label("State")
        .with_padding(8.0)
        .with_shape(ShapeKind::RoundedWithTitle)
        .with_classes("statediagram-state");

    let rendered = insert(&renderer, &mut store, &mut surface, &mut node);

    assert_eq!(node.height, 100.0);
    assert_eq!(node.width, 200.0);
    assert_eq!(node.offset_x, Some(0.0));
    assert_eq!(node.offset_y, Some(16.0));
    assert_eq!(node.diff, Some(-4.0));
    assert_eq!(node.label_bbox, Some(rendered.label_bbox));

    let kids = surface.children(rendered.cluster).to_vec();
    assert_eq!(kids.len(), 3);
    assert_eq!(surface.attr(rendered.cluster, "data-id"), Some("S"));
    let outer = surface.children(kids[0])[0];
    assert_eq!(surface.attr(outer, "class"), Some("outer"));
    assert_eq!(surface.attr(kids[2], "class"), Some("inner"));
    assert_eq!(surface.attr(kids[2], "y"), Some("-28"));
    assert_eq!(surface.attr(kids[2], "height"), Some("74"));
    assert_eq!(
        surface.attr(kids[1], "transform"),
        Some("translate(-30, -49)")
    );
}

#[test]
fn rounded_with_title_inner_height_is_not_clamped() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = ClusterNode::new("S", 0.0, 0.0, 100.0, 10.0)
        .with_label("State")
        .with_shape(ShapeKind::RoundedWithTitle)
        .with_look(Look::Neo);

    let rendered = insert(&renderer, &mut store, &mut surface, &mut node);

    let kids = surface.children(rendered.cluster).to_vec();
    assert_eq!(surface.attr(kids[2], "height"), Some("-16"));
    let outer = surface.children(kids[0])[0];
    assert_eq!(surface.attr(outer, "class"), Some("outer state-shadow-neo"));
}

#[test]
fn rounded_with_title_grows_without_half_padding() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = ClusterNode::new("S", 0.0, 0.0, 40.0, 100.0)
        .with_label("State")
        .with_padding(8.0)
        .with_shape(ShapeKind::RoundedWithTitle);

    let rendered = insert(&renderer, &mut store, &mut surface, &mut node);

    assert_eq!(node.diff, Some(10.0));
    assert_eq!(node.width, 40.0);
    let kids = surface.children(rendered.cluster).to_vec();
    let outer = surface.children(kids[0])[0];
    assert_eq!(surface.attr(outer, "x"), Some("-34"));
    assert_eq!(surface.attr(outer, "width"), Some("68"));
    assert_eq!(surface.attr(kids[2], "x"), Some("-34"));
    assert_eq!(surface.attr(kids[2], "width"), Some("68"));
}

#[test]
fn markdown_titles_are_formatted_on_rect_only() {
    let renderer = ClusterRenderer::with_default_labels(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let root = surface.root();

    let mut node = ClusterNode::new("M", 0.0, 0.0, 200.0, 60.0).with_label("**Bold** plain");
    node.label_type = LabelType::Markdown;
    block_on(renderer.insert_cluster(&mut store, &mut surface, root, &mut node)).unwrap();
    let svg = surface.to_svg();
    assert!(svg.contains("<strong>Bold</strong>"), "{svg}");
    assert!(svg.contains("<span> plain</span>"), "{svg}");
    assert!(!svg.contains("**"), "{svg}");

    let mut titled = ClusterNode::new("T", 0.0, 0.0, 200.0, 60.0)
        .with_label("**Bold** plain")
        .with_shape(ShapeKind::RoundedWithTitle);
    titled.label_type = LabelType::Markdown;
    let rendered =
        block_on(renderer.insert_cluster(&mut store, &mut surface, root, &mut titled)).unwrap();
    let titled_svg = surface.element_to_svg(rendered.cluster).unwrap();
    assert!(titled_svg.contains("**Bold** plain"), "{titled_svg}");
    assert!(!titled_svg.contains("<strong>"), "{titled_svg}");
}

#[test]
fn hand_drawn_divider_height_drops_the_padding() {
    let config = ClusterConfig {
        look: Look::HandDrawn,
        hand_drawn_seed: 11,
        ..ClusterConfig::default()
    };
    let renderer = renderer(config);
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut divider = ClusterNode::new("D", 0.0, 0.0, 120.0, 60.0)
        .with_shape(ShapeKind::Divider)
        .with_padding(8.0);

    let rendered = insert(&renderer, &mut store, &mut surface, &mut divider);

    let sketch = surface.children(rendered.cluster)[0];
    assert_eq!(surface.tag(sketch), Some("g"));
    let drawn = surface.bbox(sketch).unwrap();
    assert_eq!(divider.height, drawn.height() - 8.0);
    assert_eq!(divider.width, drawn.width());
    assert!((divider.height - 52.0).abs() < 6.0, "height {}", divider.height);
    assert_eq!(divider.diff, Some(0.0));
}

#[test]
fn note_group_and_divider_have_no_title() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();

    let mut note = ClusterNode::new("N", 10.0, 10.0, 50.0, 30.0).with_shape(ShapeKind::NoteGroup);
    let rendered = insert(&renderer, &mut store, &mut surface, &mut note);
    assert_eq!(rendered.label_bbox, LabelBBox::EMPTY);
    assert_eq!((note.width, note.height), (50.0, 30.0));
    assert!(
        surface
            .to_svg()
            .contains(r#"<rect rx="0" ry="0" x="-25" y="-15" width="50" height="30" fill="none"/>"#)
    );

    let mut divider = ClusterNode::new("D", 0.0, 0.0, 120.0, 60.0)
        .with_shape(ShapeKind::Divider)
        .with_padding(8.0)
        .with_classes("divider-region");
    let rendered = insert(&renderer, &mut store, &mut surface, &mut divider);
    assert_eq!(rendered.label_bbox, LabelBBox::EMPTY);
    assert_eq!(divider.width, 120.0);
    assert_eq!(divider.height, 52.0);
    assert_eq!(divider.diff, Some(0.0));
    assert_eq!(divider.offset_y, Some(0.0));
    assert_eq!(store.len(), 2);
}

#[test]
fn position_is_idempotent_and_matches_insert() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);
    insert(&renderer, &mut store, &mut surface, &mut node);
    let after_insert = surface.to_svg();

    store.position_cluster(&mut surface, &node).unwrap();
    assert_eq!(surface.to_svg(), after_insert);

    node.x = 300.0;
    node.y = 120.0;
    store.position_cluster(&mut surface, &node).unwrap();
    let once = surface.to_svg();
    store.position_cluster(&mut surface, &node).unwrap();
    assert_eq!(surface.to_svg(), once);
    let cluster = store.get("A").unwrap().cluster;
    assert_eq!(
        surface.attr(cluster, "transform"),
        Some("translate(300, 120)")
    );
}

#[test]
fn position_after_clear_is_an_unknown_id() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);
    insert(&renderer, &mut store, &mut surface, &mut node);

    store.clear();
    let err = store.position_cluster(&mut surface, &node).unwrap_err();
    assert!(matches!(err, Error::UnknownClusterId { ref id } if id == "A"));
    assert_eq!(err.to_string(), "no cluster registered for id: A");
}

#[test]
fn failed_label_leaves_the_store_untouched() {
    let renderer = ClusterRenderer::new(ClusterConfig::default(), FailingLabel);
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let root = surface.root();
    let mut node = node_a(80.0);

    let err = block_on(renderer.insert_cluster(&mut store, &mut surface, root, &mut node))
        .unwrap_err();
    assert!(matches!(err, Error::Label { .. }));
    assert!(store.is_empty());
    assert!(node.diff.is_none());
    assert!(node.geometry.is_none());
    assert!(surface.children(root).is_empty());
    assert!(!surface.to_svg().contains(r#"id="A""#));
}

#[test]
fn hand_drawn_rect_is_seed_deterministic() {
    let config = ClusterConfig {
        look: Look::HandDrawn,
        ..ClusterConfig::default()
    };
    let renderer = renderer(config);

    let draw = |seed: u64| {
        let mut store = ClusterStore::new();
        let mut surface = Surface::new();
        let mut node = node_a(80.0).with_seed(seed);
        insert(&renderer, &mut store, &mut surface, &mut node);
        (surface.to_svg(), node.width, node.height)
    };

    let (a, aw, ah) = draw(7);
    let (b, bw, bh) = draw(7);
    assert_eq!(a, b);
    assert_eq!((aw, ah), (bw, bh));

    let (c, cw, ch) = draw(8);
    assert_ne!(a, c);
    assert!((cw - 80.0).abs() < 8.0, "width {cw}");
    assert!((ch - 40.0).abs() < 8.0, "height {ch}");
    assert!((aw - cw).abs() < 8.0);
}

#[test]
fn hand_drawn_shapes_use_theme_colours() {
    let config = ClusterConfig::from_value(&serde_json::json!({
        "look": "handDrawn",
        "handDrawnSeed": 3,
        "themeVariables": { "compositeTitleBackground": "#eeeeee" }
    }));
    let renderer = renderer(config);
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();

    let mut titled = ClusterNode::new("T", 0.0, 0.0, 200.0, 100.0)
        .with_label("Composite")
        .with_shape(ShapeKind::RoundedWithTitle)
        .with_classes("statediagram-cluster statediagram-cluster-alt");
    titled.rx = 5.0;
    insert(&renderer, &mut store, &mut surface, &mut titled);
    let svg = surface.to_svg();
    assert!(svg.contains(r##"fill="#eeeeee""##), "{svg}");
    assert!(svg.contains(r##"stroke="#f0f0f0""##), "{svg}");
    assert!((titled.height - 100.0).abs() < 8.0);

    let mut divider = ClusterNode::new("D", 0.0, 0.0, 100.0, 50.0).with_shape(ShapeKind::Divider);
    insert(&renderer, &mut store, &mut surface, &mut divider);
    assert!(surface.to_svg().contains(r#"stroke-dasharray="5""#));
}

#[test]
fn hand_drawn_accepts_any_css_colour() {
    let hsl = "hsl(180, 1.5873015873%, 28.3921568627%)";
    let config = ClusterConfig::from_value(&serde_json::json!({
        "look": "handDrawn",
        "themeVariables": { "clusterBkg": hsl, "clusterBorder": "orange" }
    }));
    let renderer = renderer(config);
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);
    node.styles = vec!["fill:orange".to_string(), "stroke:rgb(1, 2, 3)".to_string()];

    let rendered = insert(&renderer, &mut store, &mut surface, &mut node);

    let sketch = surface.children(rendered.cluster)[0];
    let paths = surface.children(sketch).to_vec();
    assert_eq!(paths.len(), 2);
    assert_eq!(surface.attr(paths[0], "stroke"), Some(hsl));
    assert_eq!(surface.attr(paths[1], "stroke"), Some("orange"));
    assert_eq!(store.len(), 1);
}

#[test]
fn hand_drawn_none_fill_draws_only_the_outline() {
    let config = ClusterConfig::from_value(&serde_json::json!({
        "look": "handDrawn",
        "themeVariables": { "clusterBkg": "none" }
    }));
    let renderer = renderer(config);
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);

    let rendered = insert(&renderer, &mut store, &mut surface, &mut node);

    let sketch = surface.children(rendered.cluster)[0];
    let paths = surface.children(sketch).to_vec();
    assert_eq!(paths.len(), 1);
    assert_eq!(surface.attr(paths[0], "fill"), Some("none"));
    assert!((node.width - 80.0).abs() < 8.0);
}

#[test]
fn intersection_is_available_after_render() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);
    assert!(node.intersect(Point::new(0.0, 0.0)).is_none());

    insert(&renderer, &mut store, &mut surface, &mut node);

    let hit = node.intersect(Point::new(100.0, 0.0)).unwrap();
    assert_eq!((hit.x, hit.y), (100.0, 30.0));
    let hit = node.intersect(Point::new(300.0, 50.0)).unwrap();
    assert_eq!((hit.x, hit.y), (140.0, 50.0));
}

#[test]
fn title_width_measurement_leaves_the_surface_unchanged() {
    let renderer = renderer(ClusterConfig::default());
    let mut store = ClusterStore::new();
    let mut surface = Surface::new();
    let mut node = node_a(80.0);
    insert(&renderer, &mut store, &mut surface, &mut node);
    let before = surface.to_svg();
    let cluster = store.get("A").unwrap().cluster;

    let width = block_on(renderer.cluster_title_width(&mut surface, cluster, &node)).unwrap();

    assert_eq!(width, 60.0);
    assert_eq!(surface.to_svg(), before);
    assert_eq!(store.len(), 1);
}

#[test]
fn unknown_shape_kind_fails_to_deserialize() {
    let err = serde_json::from_value::<ClusterNode>(serde_json::json!({
        "id": "A", "x": 0, "y": 0, "width": 1, "height": 1, "shape": "blob"
    }))
    .unwrap_err();
    assert!(err.to_string().contains("unknown cluster shape kind: blob"));
}
