//! Path-addressed 3-D scene graph synchronized with an append-only visualization backend.
//!
//! Client code builds windows, scenes, groups and entities through the name-based [`Gui`]
//! façade:
//!
//! - Register a window and a scene, then attach the scene with [`Gui::add_scene_to_window`]
//! - Add shapes by path (`scene/name`, `group/name`) or register them pending and place them
//!   later with [`Gui::add_to_group`]
//! - Remove nodes with [`Gui::delete_node`]
//!
//! The [`SceneGraph`] keeps the model consistent; every change is replayed to a [`Backend`]
//! as log calls plus a per-scene visible-content declaration.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Visualization backend contract and recorders.
pub mod backend;
/// Shape constructor tunables.
pub mod config;
/// Node tree, registries and membership mutations.
pub mod graph;
/// Name-based client façade.
pub mod gui;
/// JSON command scripts.
pub mod script;
/// Renderable payloads.
pub mod shapes;
/// Deferred backend operations and visible-content recomputation.
pub mod sync;

pub use crate::foundation::core::{Color, Vec3};
pub use crate::foundation::error::{ErrorKind, ViewerError, ViewerResult};
pub use crate::foundation::ids::{ChannelId, EntityId, NodeId, SceneId};

pub use crate::backend::{Backend, BackendCall, InMemoryBackend, JsonLinesBackend};
pub use crate::config::ViewerConfig;
pub use crate::graph::model::{Entity, NodeKind, NodePayload, Scene, Window};
pub use crate::graph::scene_graph::SceneGraph;
pub use crate::graph::tree::{GroupTree, SnapshotEntry, TreeSnapshot};
pub use crate::gui::{Client, Gui};
pub use crate::script::{Command, CommandOutcome, Script, ScriptReport};
pub use crate::shapes::{FillMode, Shape, ShapeKind};
pub use crate::sync::SyncOp;
pub use crate::sync::view::ViewSynchronizer;
