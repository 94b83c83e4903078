//! Public façade: name-based operations over a [`SceneGraph`] and a [`Backend`].
//!
//! Every operation validates and mutates the graph first, then replays the resulting
//! [`SyncOp`]s against the backend. Failures are logged through `tracing` and returned.

use std::path::Path;

use indexmap::IndexSet;

use crate::backend::Backend;
use crate::config::ViewerConfig;
use crate::foundation::core::{Color, Vec3};
use crate::foundation::error::{ErrorKind, ViewerError, ViewerResult};
use crate::foundation::ids::{ChannelId, SceneId};
use crate::graph::scene_graph::SceneGraph;
use crate::shapes::Shape;
use crate::sync::SyncOp;
use crate::sync::view::ViewSynchronizer;

/// Scene-graph client bound to one backend.
#[derive(Debug)]
pub struct Gui<B: Backend> {
    graph: SceneGraph,
    backend: B,
    config: ViewerConfig,
}

impl<B: Backend> Gui<B> {
    /// Create a client with the default [`ViewerConfig`].
    pub fn new(backend: B) -> Self {
        Self {
            graph: SceneGraph::new(),
            backend,
            config: ViewerConfig::default(),
        }
    }

    /// Create a client with a validated configuration.
    pub fn with_config(backend: B, config: ViewerConfig) -> ViewerResult<Self> {
        config.validate()?;
        Ok(Self {
            graph: SceneGraph::new(),
            backend,
            config,
        })
    }

    /// Scene-graph state.
    pub fn scene_graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Backend the client logs to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Active configuration.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Consume the client and return its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Register a window name. The backend creates the actual window when a scene is attached.
    #[tracing::instrument(skip(self))]
    pub fn create_window(&mut self, name: &str) -> ViewerResult<String> {
        let res = self.graph.create_window(name).map(|()| {
            tracing::info!("window registered; it appears once a scene is attached");
            name.to_string()
        });
        report("create_window", res)
    }

    /// Register a scene name.
    #[tracing::instrument(skip(self))]
    pub fn create_scene(&mut self, name: &str) -> ViewerResult<()> {
        let res = self.graph.create_scene(name).map(|_| ());
        report("create_scene", res)
    }

    /// Open the scene's channel in `window` and render everything waiting for it.
    #[tracing::instrument(skip(self))]
    pub fn add_scene_to_window(&mut self, scene: &str, window: &str) -> ViewerResult<()> {
        let res = self.attach(scene, window);
        report("add_scene_to_window", res)
    }

    fn attach(&mut self, scene: &str, window: &str) -> ViewerResult<()> {
        let id = self.graph.check_attach(scene, window)?;
        let channel = self.backend.open_channel(window, scene)?;
        let ops = self.graph.attach_scene(id, window, channel)?;
        self.apply(ops)
    }

    /// Add the floor box configured in [`ViewerConfig`].
    #[tracing::instrument(skip(self))]
    pub fn add_floor(&mut self, name: &str) -> ViewerResult<()> {
        let shape = Shape::floor(self.config.floor_extents(), self.config.floor_color());
        let res = self.insert(name, shape);
        report("add_floor", res)
    }

    /// Add a solid box of extents `sx`, `sy`, `sz`.
    #[tracing::instrument(skip(self))]
    pub fn add_box(
        &mut self,
        name: &str,
        sx: f32,
        sy: f32,
        sz: f32,
        color: Color,
    ) -> ViewerResult<()> {
        let res = self.insert(name, Shape::boxes(name, Vec3::new(sx, sy, sz), color));
        report("add_box", res)
    }

    /// Add an arrow of `length` along +z.
    #[tracing::instrument(skip(self))]
    pub fn add_arrow(
        &mut self,
        name: &str,
        radius: f32,
        length: f32,
        color: Color,
    ) -> ViewerResult<()> {
        let res = self.insert(name, Shape::arrow(name, radius, length, color));
        report("add_arrow", res)
    }

    /// Add a capsule.
    #[tracing::instrument(skip(self))]
    pub fn add_capsule(
        &mut self,
        name: &str,
        radius: f32,
        length: f32,
        color: Color,
    ) -> ViewerResult<()> {
        let res = self.insert(name, Shape::capsule(radius, length, color));
        report("add_capsule", res)
    }

    /// Add a segment from `p1` to `p2`.
    #[tracing::instrument(skip(self))]
    pub fn add_line(&mut self, name: &str, p1: Vec3, p2: Vec3, color: Color) -> ViewerResult<()> {
        let shape = Shape::line(name, p1, p2, self.config.line_radius, color);
        let res = self.insert(name, shape);
        report("add_line", res)
    }

    /// Add a quad face.
    #[tracing::instrument(skip(self))]
    pub fn add_square_face(
        &mut self,
        name: &str,
        p1: Vec3,
        p2: Vec3,
        p3: Vec3,
        p4: Vec3,
        color: Color,
    ) -> ViewerResult<()> {
        let res = self.insert(name, Shape::square_face([p1, p2, p3, p4], color));
        report("add_square_face", res)
    }

    /// Add a triangle face.
    #[tracing::instrument(skip(self))]
    pub fn add_triangle_face(
        &mut self,
        name: &str,
        p1: Vec3,
        p2: Vec3,
        p3: Vec3,
        color: Color,
    ) -> ViewerResult<()> {
        let res = self.insert(name, Shape::triangle_face([p1, p2, p3], color));
        report("add_triangle_face", res)
    }

    /// Add a sphere at the origin.
    #[tracing::instrument(skip(self))]
    pub fn add_sphere(&mut self, name: &str, radius: f32, color: Color) -> ViewerResult<()> {
        let res = self.insert(name, Shape::sphere(name, radius, color));
        report("add_sphere", res)
    }

    /// Add a poly-line through `points`.
    #[tracing::instrument(skip(self, points), fields(points = points.len()))]
    pub fn add_curve(&mut self, name: &str, points: Vec<Vec3>, color: Color) -> ViewerResult<()> {
        let shape = Shape::curve(name, points, self.config.curve_line_width, color);
        let res = self.insert(name, shape);
        report("add_curve", res)
    }

    /// Add a mesh the backend loads from `file`.
    #[tracing::instrument(skip(self))]
    pub fn add_mesh(&mut self, name: &str, file: &Path) -> ViewerResult<()> {
        let res = self.insert(name, Shape::mesh_from_path(file));
        report("add_mesh", res)
    }

    fn insert(&mut self, name: &str, shape: ViewerResult<Shape>) -> ViewerResult<()> {
        let ops = self.graph.add_entity(name, shape?)?;
        self.apply(ops)
    }

    /// Change an arrow's radius and length.
    #[tracing::instrument(skip(self))]
    pub fn resize_arrow(&mut self, name: &str, radius: f32, length: f32) -> ViewerResult<()> {
        let res = self.update(name, |s| s.resize_arrow(radius, length));
        report("resize_arrow", res)
    }

    /// Change a capsule's radius and length.
    #[tracing::instrument(skip(self))]
    pub fn resize_capsule(&mut self, name: &str, radius: f32, length: f32) -> ViewerResult<()> {
        let res = self.update(name, |s| s.resize_capsule(radius, length));
        report("resize_capsule", res)
    }

    /// Recolor a curve with one color, or one per point.
    #[tracing::instrument(skip(self, colors), fields(colors = colors.len()))]
    pub fn set_curve_colors(&mut self, name: &str, colors: Vec<Color>) -> ViewerResult<()> {
        let res = self.update(name, |s| s.set_curve_colors(colors));
        report("set_curve_colors", res)
    }

    /// Change a curve's line width.
    #[tracing::instrument(skip(self))]
    pub fn set_curve_line_width(&mut self, name: &str, width: f32) -> ViewerResult<()> {
        let res = self.update(name, |s| s.set_curve_line_width(width));
        report("set_curve_line_width", res)
    }

    /// Replace a curve's points.
    #[tracing::instrument(skip(self, points), fields(points = points.len()))]
    pub fn set_curve_points(&mut self, name: &str, points: Vec<Vec3>) -> ViewerResult<()> {
        let res = self.update(name, |s| s.set_curve_points(points));
        report("set_curve_points", res)
    }

    fn update(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Shape) -> ViewerResult<()>,
    ) -> ViewerResult<()> {
        let ops = self.graph.update_shape(name, f)?;
        self.apply(ops)
    }

    /// Declare a group name.
    #[tracing::instrument(skip(self))]
    pub fn create_group(&mut self, name: &str) -> ViewerResult<()> {
        let res = self.graph.create_group(name);
        report("create_group", res)
    }

    /// Place entity or group `node_name` under every node matching `group_name`.
    #[tracing::instrument(skip(self))]
    pub fn add_to_group(&mut self, node_name: &str, group_name: &str) -> ViewerResult<()> {
        let res = self
            .graph
            .add_to_group(node_name, group_name)
            .and_then(|ops| self.apply(ops));
        report("add_to_group", res)
    }

    /// Remove every node matching `node_name`; `all` also drops it from the registries.
    #[tracing::instrument(skip(self))]
    pub fn delete_node(&mut self, node_name: &str, all: bool) -> ViewerResult<()> {
        let res = self
            .graph
            .delete_node(node_name, all)
            .and_then(|ops| self.apply(ops));
        report("delete_node", res)
    }

    /// `true` if `name` is known as a window, scene, entity or group, or names a tree node.
    pub fn node_exists(&self, name: &str) -> bool {
        self.graph.node_exists(name)
    }

    /// Window, scene and entity names.
    pub fn get_node_list(&self) -> Vec<String> {
        self.graph.node_names()
    }

    /// Declared group names.
    pub fn group_list(&self) -> Vec<String> {
        self.graph.groups().map(str::to_string).collect()
    }

    fn channel(&self, scene: SceneId) -> Option<ChannelId> {
        self.graph.scene(scene).and_then(|s| s.channel())
    }

    /// Replay graph ops: renders in order, then one visible-content declaration per scene.
    fn apply(&mut self, ops: Vec<SyncOp>) -> ViewerResult<()> {
        let mut resync = IndexSet::new();
        for op in ops {
            match op {
                SyncOp::Render {
                    scene,
                    entity,
                    path,
                } => {
                    let channel = self.channel(scene).ok_or_else(|| {
                        ViewerError::invariant(format!("render into unattached scene at '{path}'"))
                    })?;
                    let entity = self
                        .graph
                        .entity(entity)
                        .ok_or_else(|| ViewerError::invariant(format!("no entity for '{path}'")))?;
                    match entity.shape() {
                        Shape::MeshFromPath { path: file } => {
                            self.backend.log_file_at(channel, file, &path)?
                        }
                        shape => self.backend.log_at(channel, &path, shape)?,
                    }
                    tracing::debug!(channel = channel.0, path = %path, "entity logged");
                }
                SyncOp::Resync(scene) => {
                    resync.insert(scene);
                }
            }
        }
        for scene in resync {
            let Some(channel) = self.channel(scene) else {
                tracing::warn!(?scene, "skipping resync of a detached scene");
                continue;
            };
            let content = ViewSynchronizer::recompute_visible_content(&self.graph, scene);
            self.backend.declare_visible_content(channel, &content)?;
            tracing::debug!(
                channel = channel.0,
                entries = content.len(),
                "visible content declared"
            );
        }
        Ok(())
    }
}

fn report<T>(op: &'static str, res: ViewerResult<T>) -> ViewerResult<T> {
    if let Err(err) = &res {
        if err.kind() == ErrorKind::Invariant {
            tracing::error!(op, invariant = true, error = %err, "scene graph invariant violated");
        } else {
            tracing::error!(op, error = %err, "operation failed");
        }
    }
    res
}

/// Client object holding a [`Gui`], mirroring the viewer client entry point.
#[derive(Debug)]
pub struct Client<B: Backend> {
    /// Scene-graph façade.
    pub gui: Gui<B>,
}

impl<B: Backend> Client<B> {
    /// Create a client with default settings.
    pub fn new(backend: B) -> Self {
        Self {
            gui: Gui::new(backend),
        }
    }

    /// Create a client with a validated configuration.
    pub fn with_config(backend: B, config: ViewerConfig) -> ViewerResult<Self> {
        Ok(Self {
            gui: Gui::with_config(backend, config)?,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/gui.rs"]
mod tests;
