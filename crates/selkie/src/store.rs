//! Rendered-cluster registry for one render pass.

use crate::model::{ClusterNode, RenderedCluster};
use crate::shapes::translate;
use crate::surface::Surface;
use crate::{Error, Result};
use rustc_hash::FxHashMap;

/// Maps node ids to their drawn containers so layout can move them without redrawing.
#[derive(Debug, Clone, Default)]
pub struct ClusterStore {
    clusters: FxHashMap<String, RenderedCluster>,
}

impl ClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `cluster` under `id`, replacing any earlier entry.
    pub fn insert(&mut self, id: impl Into<String>, cluster: RenderedCluster) {
        self.clusters.insert(id.into(), cluster);
    }

    pub fn get(&self, id: &str) -> Option<&RenderedCluster> {
        self.clusters.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clusters.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Forgets every entry. The drawn elements stay on the surface.
    pub fn clear(&mut self) {
        self.clusters.clear();
    }

    /// Moves the stored container to the node's current center.
    ///
    /// Sets the transform outright, so repeating the call is a no-op.
    pub fn position_cluster(&self, surface: &mut Surface, node: &ClusterNode) -> Result<()> {
        tracing::debug!(id = %node.id, x = node.x, y = node.y, "position cluster");
        let cluster = self
            .clusters
            .get(&node.id)
            .ok_or_else(|| Error::UnknownClusterId {
                id: node.id.clone(),
            })?;
        surface.set_attr(cluster.cluster, "transform", translate(node.x, node.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LabelBBox;

    fn registered(surface: &mut Surface) -> (ClusterStore, RenderedCluster) {
        let root = surface.root();
        let g = surface.append(root, "g").unwrap();
        let rendered = RenderedCluster {
            cluster: g,
            label_bbox: LabelBBox::EMPTY,
        };
        let mut store = ClusterStore::new();
        store.insert("A", rendered);
        (store, rendered)
    }

    #[test]
    fn position_sets_translate_on_the_container() {
        let mut surface = Surface::new();
        let (store, rendered) = registered(&mut surface);
        let node = ClusterNode::new("A", 12.5, -3.0, 10.0, 10.0);
        store.position_cluster(&mut surface, &node).unwrap();
        assert_eq!(
            surface.attr(rendered.cluster, "transform"),
            Some("translate(12.5, -3)")
        );
    }

    #[test]
    fn clear_is_idempotent_and_forgets_ids() {
        let mut surface = Surface::new();
        let (mut store, _) = registered(&mut surface);
        assert_eq!(store.len(), 1);
        store.clear();
        store.clear();
        assert!(store.is_empty());
        let err = store
            .position_cluster(&mut surface, &ClusterNode::new("A", 0.0, 0.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownClusterId { id } if id == "A"));
    }

    #[test]
    fn reinsert_replaces_the_handle() {
        let mut surface = Surface::new();
        let (mut store, first) = registered(&mut surface);
        let root = surface.root();
        let second = RenderedCluster {
            cluster: surface.append(root, "g").unwrap(),
            label_bbox: LabelBBox::EMPTY,
        };
        store.insert("A", second);
        assert_eq!(store.len(), 1);
        assert_ne!(store.get("A"), Some(&first));
        assert!(store.contains("A"));
    }
}
