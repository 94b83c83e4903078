use indexmap::IndexSet;

use crate::foundation::ids::{ChannelId, EntityId, SceneId};
use crate::shapes::Shape;

/// A named recording channel. Bound to the backend once attached to a window.
#[derive(Clone, Debug)]
pub struct Scene {
    pub(crate) name: String,
    pub(crate) channel: Option<ChannelId>,
    pub(crate) window: Option<String>,
}

impl Scene {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channel: None,
            window: None,
        }
    }

    /// Scene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend channel, set once the scene is attached to a window.
    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    /// Window the scene is displayed in, if attached.
    pub fn window(&self) -> Option<&str> {
        self.window.as_deref()
    }

    /// `true` when the scene is attached to a window (and therefore present in the tree).
    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }
}

/// A named display surface. Holds no rendering state, only the scenes shown in it.
#[derive(Clone, Debug)]
pub struct Window {
    pub(crate) name: String,
    pub(crate) scenes: IndexSet<SceneId>,
}

impl Window {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenes: IndexSet::new(),
        }
    }

    /// Window name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenes attached to this window, in attachment order.
    pub fn scenes(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.scenes.iter().copied()
    }
}

/// A renderable node: a shape payload plus where it is placed.
#[derive(Clone, Debug)]
pub struct Entity {
    pub(crate) name: String,
    pub(crate) shape: Shape,
    pub(crate) scenes: IndexSet<SceneId>,
    pub(crate) paths: IndexSet<String>,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            scenes: IndexSet::new(),
            paths: IndexSet::new(),
        }
    }

    /// Registered entity name (unique across the registry).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current payload.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Scenes the entity is currently visible in.
    pub fn scenes(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.scenes.iter().copied()
    }

    /// Full tree paths of every placement.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// `true` while the entity is not placed under any scene.
    pub fn is_pending(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// What a tree node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodePayload {
    /// Pure namespace (group) node.
    Namespace,
    /// Scene-binding node.
    Scene(SceneId),
    /// Entity-binding node; the entity is shared by all its placements.
    Entity(EntityId),
}

/// Payload kind without ids, used in snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// See [`NodePayload::Namespace`].
    Namespace,
    /// See [`NodePayload::Scene`].
    Scene,
    /// See [`NodePayload::Entity`].
    Entity,
}

impl NodePayload {
    /// Payload kind without the id.
    pub fn kind(self) -> NodeKind {
        match self {
            Self::Namespace => NodeKind::Namespace,
            Self::Scene(_) => NodeKind::Scene,
            Self::Entity(_) => NodeKind::Entity,
        }
    }
}
