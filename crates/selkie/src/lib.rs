#![forbid(unsafe_code)]

//! Headless cluster (subgraph container) rendering.
//!
//! Given a [`ClusterNode`] (center, requested size, label, style), [`ClusterRenderer`] draws a
//! container into an in-memory SVG [`Surface`], grows it to fit its title label, writes the
//! derived geometry back onto the node, and registers the drawn group in a [`ClusterStore`] so a
//! layout engine can move it later without re-rendering.

pub mod cluster;
pub mod config;
pub mod draw;
pub mod intersect;
pub mod label;
pub mod model;
mod rough;
pub mod shapes;
pub mod store;
pub mod style;
pub mod surface;
pub mod text;

pub use cluster::ClusterRenderer;
pub use config::{ClusterConfig, SubGraphTitleMargins, ThemeColors};
pub use intersect::intersect_rect;
pub use label::{LabelBuilder, LabelRequest, MeasuredLabelBuilder};
pub use model::{
    Bounds, ClusterNode, LabelBBox, LabelType, Look, NodeGeometry, Point, RenderedCluster,
    ShapeKind,
};
pub use store::ClusterStore;
pub use surface::{ElementId, Surface};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown cluster shape kind: {kind}")]
    UnknownShapeKind { kind: String },
    #[error("no cluster registered for id: {id}")]
    UnknownClusterId { id: String },
    #[error("failed to build label for cluster {id}: {message}")]
    Label { id: String, message: String },
    #[error("hand-drawn rendering failed: {message}")]
    Sketch { message: String },
    #[error("surface element {element} does not exist")]
    UnknownElement { element: usize },
    #[error("config JSON error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
