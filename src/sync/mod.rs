//! Deferred backend work produced by scene-graph mutations.

/// Per-scene visible content recomputation.
pub mod view;

use crate::foundation::ids::{EntityId, SceneId};

/// A backend operation requested by a graph mutation.
///
/// Mutations never call the backend themselves; the [`crate::Gui`] applies the returned ops
/// once the tree is consistent again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOp {
    /// Log the entity payload at `path` (scene-relative, `/a/b`) on the scene's channel.
    Render {
        /// Scene whose channel receives the payload.
        scene: SceneId,
        /// Entity to log.
        entity: EntityId,
        /// Scene-relative backend path.
        path: String,
    },
    /// Recompute and declare the visible content of a scene.
    Resync(SceneId),
}
