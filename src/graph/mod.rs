//! The scene graph: node tree, registries and the mutations that keep them consistent.

mod membership;
/// Scenes, windows, entities and node payloads.
pub mod model;
pub mod path;
/// Registries and parse-on-add.
pub mod scene_graph;
/// Arena-backed node tree.
pub mod tree;
