//! Entry points: insert a cluster, measure a title width.

use crate::config::ClusterConfig;
use crate::label::{LabelBuilder, LabelRequest, MeasuredLabelBuilder};
use crate::model::{ClusterNode, LabelType, RenderedCluster};
use crate::shapes::{self, ShapeContext};
use crate::store::ClusterStore;
use crate::surface::{ElementId, Surface};
use crate::Result;

#[derive(Debug, Clone)]
pub struct ClusterRenderer<L = MeasuredLabelBuilder> {
    pub config: ClusterConfig,
    pub labels: L,
}

impl ClusterRenderer<MeasuredLabelBuilder> {
    /// Renderer with the font-free label builder.
    pub fn with_default_labels(config: ClusterConfig) -> Self {
        Self::new(config, MeasuredLabelBuilder::default())
    }
}

impl<L: LabelBuilder> ClusterRenderer<L> {
    pub fn new(config: ClusterConfig, labels: L) -> Self {
        Self { config, labels }
    }

    fn context(&self) -> ShapeContext<'_, L> {
        ShapeContext::new(&self.config, &self.labels)
    }

    /// Draws `node` under `parent`, writes its derived geometry and registers it in `store`.
    ///
    /// The store is only touched once drawing succeeded.
    pub async fn insert_cluster(
        &self,
        store: &mut ClusterStore,
        surface: &mut Surface,
        parent: ElementId,
        node: &mut ClusterNode,
    ) -> Result<RenderedCluster> {
        let kind = node.shape_kind();
        let rendered = shapes::render(kind, self.context(), surface, parent, node).await?;
        store.insert(node.id.as_str(), rendered);
        Ok(rendered)
    }

    /// Width of `node`'s title as a plain label, measured in a scratch element under `parent`.
    ///
    /// Leaves the surface as it found it.
    pub async fn cluster_title_width(
        &self,
        surface: &mut Surface,
        parent: ElementId,
        node: &ClusterNode,
    ) -> Result<f64> {
        let request = LabelRequest {
            label_type: LabelType::Text,
            ..LabelRequest::for_node(node, &node.label_style, self.config.html_labels)
        };
        let label = self.labels.build(surface, parent, &request).await?;
        let measured = surface.bbox(label);
        surface.remove(label)?;
        Ok(measured?.width())
    }
}
