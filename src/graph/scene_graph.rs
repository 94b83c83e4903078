use indexmap::{IndexMap, IndexSet};

use crate::foundation::arena::Arena;
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::foundation::ids::{ChannelId, EntityId, NodeId, SceneId};
use crate::graph::model::{Entity, NodePayload, Scene, Window};
use crate::graph::path;
use crate::graph::tree::GroupTree;
use crate::shapes::Shape;
use crate::sync::SyncOp;

/// Every piece of scene-graph state: the tree plus the flat registries it refers to.
///
/// Mutating operations validate and look everything up before touching the tree, then return
/// the backend work they imply as a list of [`SyncOp`]s.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    pub(crate) tree: GroupTree,
    pub(crate) windows: IndexMap<String, Window>,
    pub(crate) scenes: Arena<SceneId, Scene>,
    pub(crate) scene_names: IndexMap<String, SceneId>,
    pub(crate) entities: Arena<EntityId, Entity>,
    pub(crate) entity_names: IndexMap<String, EntityId>,
    pub(crate) groups: IndexSet<String>,
    /// Entities waiting for a group or scene that is not placed in the tree yet.
    pub(crate) pending: IndexMap<String, Vec<EntityId>>,
}

impl SceneGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The node tree.
    pub fn tree(&self) -> &GroupTree {
        &self.tree
    }

    /// Registered window.
    pub fn window(&self, name: &str) -> Option<&Window> {
        self.windows.get(name)
    }

    /// Registered scene.
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Id of a registered scene.
    pub fn scene_id(&self, name: &str) -> Option<SceneId> {
        self.scene_names.get(name).copied()
    }

    /// Registered entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Id of a registered entity.
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.entity_names.get(name).copied()
    }

    /// Declared group names, in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// Names of the entities parked on `target` until it is placed in the tree.
    pub fn pending_members(&self, target: &str) -> Vec<&str> {
        self.pending
            .get(target)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.entities.get(id).map(|e| e.name.as_str()))
            .collect()
    }

    /// Tree node of an attached scene.
    pub fn scene_node(&self, id: SceneId) -> Option<NodeId> {
        let scene = self.scenes.get(id)?;
        let node = self.tree.get(&scene.name)?;
        match self.tree.payload(node) {
            Some(NodePayload::Scene(s)) if s == id => Some(node),
            _ => None,
        }
    }

    /// `true` if `name` is a window, scene, entity or group name, or names a tree node.
    pub fn node_exists(&self, name: &str) -> bool {
        self.windows.contains_key(name)
            || self.scene_names.contains_key(name)
            || self.entity_names.contains_key(name)
            || self.groups.contains(name)
            || !self.tree.resolve(name).is_empty()
    }

    /// Window, scene and entity names, in that order, without repetition.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: IndexSet<&str> = IndexSet::new();
        names.extend(self.windows.keys().map(String::as_str));
        names.extend(self.scene_names.keys().map(String::as_str));
        names.extend(self.entity_names.keys().map(String::as_str));
        names.into_iter().map(str::to_string).collect()
    }

    /// Register a window name.
    pub fn create_window(&mut self, name: &str) -> ViewerResult<()> {
        path::validate_name(name)?;
        if self.windows.contains_key(name) {
            return Err(ViewerError::duplicate(format!(
                "window '{name}' already exists"
            )));
        }
        self.windows.insert(name.to_string(), Window::new(name));
        Ok(())
    }

    /// Register a scene name. The scene enters the tree once attached to a window.
    pub fn create_scene(&mut self, name: &str) -> ViewerResult<SceneId> {
        path::validate_segment(name)?;
        if self.scene_names.contains_key(name) {
            return Err(ViewerError::duplicate(format!("scene '{name}' already exists")));
        }
        let id = self.scenes.insert(Scene::new(name));
        self.scene_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Check that `scene` can be attached to `window`, before any channel is opened.
    pub fn check_attach(&self, scene: &str, window: &str) -> ViewerResult<SceneId> {
        let id = self
            .scene_id(scene)
            .ok_or_else(|| ViewerError::lookup(format!("unknown scene '{scene}'")))?;
        if !self.windows.contains_key(window) {
            return Err(ViewerError::lookup(format!("unknown window '{window}'")));
        }
        let attached = self.scenes.get(id).is_some_and(Scene::is_attached);
        if attached || self.tree.get(scene).is_some() {
            return Err(ViewerError::duplicate(format!(
                "scene '{scene}' is already attached to a window"
            )));
        }
        let members = self.pending.get(scene).map(Vec::as_slice).unwrap_or(&[]);
        self.check_member_layout(members)?;
        Ok(id)
    }

    /// Place `scene` in the tree, bound to `channel`, and attach the entities parked on it.
    pub fn attach_scene(
        &mut self,
        scene: SceneId,
        window: &str,
        channel: ChannelId,
    ) -> ViewerResult<Vec<SyncOp>> {
        let name = self
            .scenes
            .get(scene)
            .map(|s| s.name.clone())
            .ok_or_else(|| ViewerError::lookup("scene is not registered"))?;
        self.check_attach(&name, window)?;

        let root = self.tree.root();
        let node = self
            .tree
            .insert_child(root, &name, NodePayload::Scene(scene))?;
        if let Some(s) = self.scenes.get_mut(scene) {
            s.channel = Some(channel);
            s.window = Some(window.to_string());
        }
        if let Some(w) = self.windows.get_mut(window) {
            w.scenes.insert(scene);
        }

        let mut ops = Vec::new();
        let mut affected = IndexSet::from([scene]);
        for member in self.pending.shift_remove(&name).unwrap_or_default() {
            self.link_entity(member, node, &mut ops, &mut affected)?;
        }
        ops.extend(affected.into_iter().map(SyncOp::Resync));
        tracing::info!(scene = %name, window, "scene attached");
        Ok(ops)
    }

    /// Declare a group name without placing it in the tree.
    pub fn create_group(&mut self, name: &str) -> ViewerResult<()> {
        path::validate_name(name)?;
        if self.groups.contains(name) {
            return Err(ViewerError::duplicate(format!("group '{name}' already exists")));
        }
        self.groups.insert(name.to_string());
        Ok(())
    }

    /// Register a new entity, placing it according to its name.
    ///
    /// `name` without a separator registers a pending entity. For `group/rest`, the entity is
    /// registered as `rest` and attached under every tree node matching `group`; when nothing
    /// matches, it is parked on `group` (declared on the fly if unknown) until that target is
    /// placed.
    pub fn add_entity(&mut self, name: &str, shape: Shape) -> ViewerResult<Vec<SyncOp>> {
        path::validate_name(name)?;
        let (group_ref, local) = match path::split_group_ref(name) {
            Some((group, local)) => (Some(group), local),
            None => (None, name),
        };
        if self.entity_names.contains_key(local) {
            return Err(ViewerError::duplicate(format!(
                "entity '{local}' already exists"
            )));
        }

        let Some(group_ref) = group_ref else {
            self.register_entity(local, shape);
            tracing::info!(entity = local, "entity registered, waiting for addToGroup");
            return Ok(Vec::new());
        };

        let targets = self.group_targets(group_ref);
        if targets.is_empty() && !self.tree.resolve(group_ref).is_empty() {
            return Err(ViewerError::validation(format!(
                "'{group_ref}' is an entity and cannot hold '{local}'"
            )));
        }
        if targets.is_empty() {
            let id = self.register_entity(local, shape);
            if !self.is_deferred_target(group_ref) {
                self.groups.insert(group_ref.to_string());
                tracing::info!(group = group_ref, "group declared on first use");
            }
            self.pending.entry(group_ref.to_string()).or_default().push(id);
            tracing::info!(
                entity = local,
                group = group_ref,
                "entity parked until its group is placed"
            );
            return Ok(Vec::new());
        }

        for &target in &targets {
            self.plan_entity_link(local, None, target)?;
        }
        let id = self.register_entity(local, shape);
        let mut ops = Vec::new();
        let mut affected = IndexSet::new();
        for target in targets {
            self.link_entity(id, target, &mut ops, &mut affected)?;
        }
        ops.extend(affected.into_iter().map(SyncOp::Resync));
        tracing::info!(entity = local, group = group_ref, "entity created in place");
        Ok(ops)
    }

    /// Replace an entity payload in place and re-render it wherever it is placed.
    ///
    /// `name` is looked up in the registry first, then resolved against the tree.
    pub fn update_shape(
        &mut self,
        name: &str,
        update: impl FnOnce(&mut Shape) -> ViewerResult<()>,
    ) -> ViewerResult<Vec<SyncOp>> {
        let id = self.find_entity(name)?;
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| ViewerError::invariant(format!("entity '{name}' has no slot")))?;
        let mut shape = entity.shape.clone();
        update(&mut shape)?;
        entity.shape = shape;
        Ok(self.render_ops(id))
    }

    /// `Render` ops for every scene placement of an entity.
    pub(crate) fn render_ops(&self, id: EntityId) -> Vec<SyncOp> {
        let Some(entity) = self.entities.get(id) else {
            return Vec::new();
        };
        entity
            .paths
            .iter()
            .filter_map(|p| {
                let node = self.tree.get(p)?;
                let (scene_node, scene) = self.tree.nearest_scene(node)?;
                let scene_path = self.tree.path(scene_node)?;
                Some(SyncOp::Render {
                    scene,
                    entity: id,
                    path: path::scene_relative(p, scene_path),
                })
            })
            .collect()
    }

    pub(crate) fn find_entity(&self, name: &str) -> ViewerResult<EntityId> {
        if let Some(id) = self.entity_id(name) {
            return Ok(id);
        }
        self.tree
            .resolve(name)
            .into_iter()
            .find_map(|n| match self.tree.payload(n)? {
                NodePayload::Entity(id) => Some(id),
                _ => None,
            })
            .ok_or_else(|| ViewerError::lookup(format!("entity '{name}' does not exist")))
    }

    fn register_entity(&mut self, name: &str, shape: Shape) -> EntityId {
        let id = self.entities.insert(Entity::new(name, shape));
        self.entity_names.insert(name.to_string(), id);
        id
    }

    /// Tree nodes matching `group` that may receive children (scenes and namespaces).
    pub(crate) fn group_targets(&self, group: &str) -> Vec<NodeId> {
        self.tree
            .resolve(group)
            .into_iter()
            .filter(|&n| {
                matches!(
                    self.tree.payload(n),
                    Some(NodePayload::Namespace | NodePayload::Scene(_))
                )
            })
            .collect()
    }

    /// `true` for a name that can hold parked entities: an unplaced group or unattached scene.
    pub(crate) fn is_deferred_target(&self, name: &str) -> bool {
        self.groups.contains(name)
            || self
                .scene_id(name)
                .and_then(|id| self.scenes.get(id))
                .is_some_and(|s| !s.is_attached())
    }

    /// Decide whether entity `name` can be linked under `parent`.
    ///
    /// Returns `Ok(false)` when `entity` already sits at that place, and a duplicate error when
    /// the place (or a group on the way to it) is taken by another node.
    pub(crate) fn plan_entity_link(
        &self,
        name: &str,
        entity: Option<EntityId>,
        parent: NodeId,
    ) -> ViewerResult<bool> {
        let parent_path = self
            .tree
            .path(parent)
            .ok_or_else(|| ViewerError::invariant("link target is not in the tree"))?;
        let segs: Vec<&str> = path::segments(name).collect();
        let mut cur = parent_path.to_string();
        for (i, seg) in segs.iter().enumerate() {
            cur = path::join(&cur, seg);
            let Some(existing) = self.tree.get(&cur) else {
                return Ok(true);
            };
            let payload = self.tree.payload(existing);
            let is_leaf = i + 1 == segs.len();
            match payload {
                Some(NodePayload::Namespace) if !is_leaf => {}
                Some(NodePayload::Entity(e)) if is_leaf && Some(e) == entity => return Ok(false),
                _ => {
                    return Err(ViewerError::duplicate(format!(
                        "'{cur}' is already taken by another node"
                    )));
                }
            }
        }
        Ok(true)
    }

    /// Entities drained onto a freshly placed target must not collide with each other.
    pub(crate) fn check_member_layout(&self, members: &[EntityId]) -> ViewerResult<()> {
        let names: Vec<&str> = members
            .iter()
            .filter_map(|&id| self.entities.get(id).map(|e| e.name.as_str()))
            .collect();
        for a in &names {
            for b in &names {
                if a != b && path::is_within(b, a) {
                    return Err(ViewerError::duplicate(format!(
                        "pending entities '{a}' and '{b}' would overlap"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Insert entity `id` under `parent`, creating the namespaces its name implies.
    pub(crate) fn link_entity(
        &mut self,
        id: EntityId,
        parent: NodeId,
        ops: &mut Vec<SyncOp>,
        affected: &mut IndexSet<SceneId>,
    ) -> ViewerResult<()> {
        let name = self
            .entities
            .get(id)
            .map(|e| e.name.clone())
            .ok_or_else(|| ViewerError::invariant("linking an unregistered entity"))?;
        let segs: Vec<&str> = path::segments(&name).collect();
        let Some((leaf, dirs)) = segs.split_last() else {
            return Err(ViewerError::invariant("entity has an empty name"));
        };
        let holder = self.tree.create_path_chain(parent, dirs.iter().copied())?;
        self.place_entity(id, holder, leaf, ops, affected)
    }

    /// Insert the entity node `leaf` for `id` directly under `holder` and record the placement.
    pub(crate) fn place_entity(
        &mut self,
        id: EntityId,
        holder: NodeId,
        leaf: &str,
        ops: &mut Vec<SyncOp>,
        affected: &mut IndexSet<SceneId>,
    ) -> ViewerResult<()> {
        let node = self
            .tree
            .insert_child(holder, leaf, NodePayload::Entity(id))?;
        let full = self.tree.path(node).unwrap_or_default().to_string();
        let scene = self.tree.nearest_scene(node).and_then(|(scene_node, scene)| {
            let scene_path = self.tree.path(scene_node)?;
            Some((scene, path::scene_relative(&full, scene_path)))
        });

        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| ViewerError::invariant("linking an unregistered entity"))?;
        entity.paths.insert(full.clone());
        if let Some((scene, rel)) = scene {
            entity.scenes.insert(scene);
            affected.insert(scene);
            tracing::debug!(entity = %entity.name, path = %full, "entity rendered");
            ops.push(SyncOp::Render {
                scene,
                entity: id,
                path: rel,
            });
        }
        Ok(())
    }

    /// Recompute `entity.scenes` from the entity's remaining placements.
    pub(crate) fn refresh_entity_scenes(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        let scenes: IndexSet<SceneId> = entity
            .paths
            .iter()
            .filter_map(|p| self.tree.nearest_scene(self.tree.get(p)?))
            .map(|(_, scene)| scene)
            .collect();
        if let Some(entity) = self.entities.get_mut(id) {
            entity.scenes = scenes;
        }
    }

    /// Verify tree structure and the bookkeeping that links registries to tree nodes.
    pub fn check_invariants(&self) -> ViewerResult<()> {
        self.tree.check_structure()?;
        let root = self.tree.root();
        for &child in self.tree.children(root) {
            if !matches!(self.tree.payload(child), Some(NodePayload::Scene(_))) {
                return Err(ViewerError::invariant(format!(
                    "'{}' sits under the root but is not a scene",
                    self.tree.path(child).unwrap_or_default()
                )));
            }
        }
        for node in self.tree.preorder(root) {
            if let Some(NodePayload::Entity(id)) = self.tree.payload(node) {
                let path = self.tree.path(node).unwrap_or_default();
                let listed = self.entities.get(id).is_some_and(|e| e.paths.contains(path));
                if !listed {
                    return Err(ViewerError::invariant(format!(
                        "entity node '{path}' is not recorded by its entity"
                    )));
                }
            }
        }
        for (id, entity) in self.entities.iter() {
            if self.entity_names.get(&entity.name) != Some(&id) {
                return Err(ViewerError::invariant(format!(
                    "entity '{}' is missing from the name index",
                    entity.name
                )));
            }
            let mut scenes = IndexSet::new();
            for p in &entity.paths {
                let node = self.tree.get(p).ok_or_else(|| {
                    ViewerError::invariant(format!("'{}' records stale path '{p}'", entity.name))
                })?;
                if self.tree.payload(node) != Some(NodePayload::Entity(id)) {
                    return Err(ViewerError::invariant(format!(
                        "'{p}' does not hold entity '{}'",
                        entity.name
                    )));
                }
                if let Some((_, scene)) = self.tree.nearest_scene(node) {
                    scenes.insert(scene);
                }
            }
            if scenes.len() != entity.scenes.len()
                || !scenes.iter().all(|s| entity.scenes.contains(s))
            {
                return Err(ViewerError::invariant(format!(
                    "entity '{}' records the wrong scene set",
                    entity.name
                )));
            }
        }
        for (id, scene) in self.scenes.iter() {
            let placed = self.scene_node(id).is_some();
            let in_window = scene
                .window
                .as_deref()
                .and_then(|w| self.windows.get(w))
                .is_some_and(|w| w.scenes.contains(&id));
            if placed != scene.is_attached() || placed != in_window {
                return Err(ViewerError::invariant(format!(
                    "scene '{}' attachment state is inconsistent",
                    scene.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/scene_graph.rs"]
mod tests;
