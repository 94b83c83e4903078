use crate::foundation::ids::SceneId;
use crate::graph::model::NodePayload;
use crate::graph::path;
use crate::graph::scene_graph::SceneGraph;

/// Stateless recomputation of what each scene currently shows.
pub struct ViewSynchronizer;

impl ViewSynchronizer {
    /// Scene-relative paths visible in `scene`, in pre-order.
    ///
    /// Namespace nodes below the scene are always listed; entity nodes are listed when the
    /// entity records `scene` among its scenes. An unattached scene shows nothing.
    #[tracing::instrument(skip(graph))]
    pub fn recompute_visible_content(graph: &SceneGraph, scene: SceneId) -> Vec<String> {
        let Some(scene_node) = graph.scene_node(scene) else {
            return Vec::new();
        };
        let tree = graph.tree();
        let Some(scene_path) = tree.path(scene_node) else {
            return Vec::new();
        };
        tree.preorder(scene_node)
            .into_iter()
            .skip(1)
            .filter_map(|id| {
                let node = tree.node(id)?;
                if !path::is_within(&node.path, scene_path) {
                    return None;
                }
                let visible = match node.payload {
                    NodePayload::Namespace => true,
                    NodePayload::Entity(entity) => graph
                        .entity(entity)
                        .is_some_and(|e| e.scenes.contains(&scene)),
                    NodePayload::Scene(_) => false,
                };
                visible.then(|| path::scene_relative(&node.path, scene_path))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/view.rs"]
mod tests;
