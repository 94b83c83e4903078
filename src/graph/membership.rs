//! Membership mutations: linking entities and groups into the tree, and removing nodes.
//!
//! Both operations look up and validate everything they need before the first mutation, so a
//! failing call leaves the graph untouched.

use indexmap::IndexSet;

use crate::foundation::error::{ViewerError, ViewerResult};
use crate::foundation::ids::{EntityId, NodeId, SceneId};
use crate::graph::model::NodePayload;
use crate::graph::path;
use crate::graph::scene_graph::SceneGraph;
use crate::sync::SyncOp;

impl SceneGraph {
    /// Attach entity or declared group `node_name` under every node matching `group_name`.
    ///
    /// An entity name takes precedence over a group of the same name. When `group_name`
    /// matches nothing but names an unplaced group or an unattached scene, the entity is
    /// parked until that target is placed.
    pub fn add_to_group(&mut self, node_name: &str, group_name: &str) -> ViewerResult<Vec<SyncOp>> {
        path::validate_name(node_name)?;
        path::validate_name(group_name)?;
        let entity = self.entity_id(node_name);
        if entity.is_none() && !self.groups.contains(node_name) {
            return Err(ViewerError::lookup(format!(
                "'{node_name}' is neither an entity nor a declared group"
            )));
        }

        let targets = self.group_targets(group_name);
        if targets.is_empty() {
            return self.defer_membership(node_name, entity, group_name);
        }

        match entity {
            Some(id) => self.link_entity_everywhere(id, node_name, group_name, &targets),
            None => self.link_group_everywhere(node_name, group_name, &targets),
        }
    }

    fn defer_membership(
        &mut self,
        node_name: &str,
        entity: Option<EntityId>,
        group_name: &str,
    ) -> ViewerResult<Vec<SyncOp>> {
        if !self.tree.resolve(group_name).is_empty() {
            return Err(ViewerError::validation(format!(
                "'{group_name}' is an entity and cannot hold children"
            )));
        }
        if !self.is_deferred_target(group_name) {
            return Err(ViewerError::lookup(format!(
                "group or scene '{group_name}' does not exist"
            )));
        }
        let Some(id) = entity else {
            return Err(ViewerError::lookup(format!(
                "group '{node_name}' cannot be nested in '{group_name}' before it is placed"
            )));
        };
        let parked = self.pending.entry(group_name.to_string()).or_default();
        if parked.contains(&id) {
            return Err(ViewerError::duplicate(format!(
                "'{node_name}' is already waiting for '{group_name}'"
            )));
        }
        parked.push(id);
        tracing::info!(
            entity = node_name,
            group = group_name,
            "membership deferred until the target is placed"
        );
        Ok(Vec::new())
    }

    fn link_entity_everywhere(
        &mut self,
        id: EntityId,
        node_name: &str,
        group_name: &str,
        targets: &[NodeId],
    ) -> ViewerResult<Vec<SyncOp>> {
        let mut planned = Vec::with_capacity(targets.len());
        for &target in targets {
            if self.plan_entity_link(node_name, Some(id), target)? {
                planned.push(target);
            }
        }
        if planned.is_empty() {
            return Err(ViewerError::duplicate(format!(
                "'{node_name}' is already in every '{group_name}'"
            )));
        }

        let mut ops = Vec::new();
        let mut affected = IndexSet::new();
        for target in planned {
            self.link_entity(id, target, &mut ops, &mut affected)?;
        }
        ops.extend(affected.into_iter().map(SyncOp::Resync));
        tracing::info!(entity = node_name, group = group_name, "entity added to group");
        Ok(ops)
    }

    fn link_group_everywhere(
        &mut self,
        node_name: &str,
        group_name: &str,
        targets: &[NodeId],
    ) -> ViewerResult<Vec<SyncOp>> {
        let mut planned = Vec::with_capacity(targets.len());
        for &target in targets {
            if self.plan_group_link(node_name, target)? {
                planned.push(target);
            }
        }
        if planned.is_empty() {
            return Err(ViewerError::duplicate(format!(
                "group '{node_name}' is already in every '{group_name}'"
            )));
        }
        let members = self.pending.get(node_name).cloned().unwrap_or_default();
        self.check_member_layout(&members)?;
        let layout = self.group_layout(node_name);

        let mut ops = Vec::new();
        let mut affected = IndexSet::new();
        let mut tails = Vec::with_capacity(planned.len());
        for target in planned {
            let tail = self
                .tree
                .create_path_chain(target, path::segments(node_name))?;
            if let Some((_, scene)) = self.tree.nearest_scene(tail) {
                affected.insert(scene);
            }
            tails.push(tail);
        }
        self.pending.shift_remove(node_name);
        for tail in tails {
            for (rel, payload) in &layout {
                let segs: Vec<&str> = path::segments(rel).collect();
                match payload {
                    NodePayload::Entity(id) => {
                        let Some((leaf, dirs)) = segs.split_last() else {
                            continue;
                        };
                        let holder = self.tree.create_path_chain(tail, dirs.iter().copied())?;
                        self.place_entity(*id, holder, leaf, &mut ops, &mut affected)?;
                    }
                    _ => {
                        self.tree.create_path_chain(tail, segs)?;
                    }
                }
            }
            for &member in &members {
                self.link_entity(member, tail, &mut ops, &mut affected)?;
            }
        }
        ops.extend(affected.into_iter().map(SyncOp::Resync));
        tracing::info!(
            group = node_name,
            parent = group_name,
            copied = layout.len(),
            drained = members.len(),
            "group placed"
        );
        Ok(ops)
    }

    /// Contents of the first existing placement of group `name`, as paths relative to the
    /// group node, in pre-order.
    fn group_layout(&self, name: &str) -> Vec<(String, NodePayload)> {
        let Some(source) = self
            .tree
            .resolve(name)
            .into_iter()
            .find(|&n| self.tree.payload(n) == Some(NodePayload::Namespace))
        else {
            return Vec::new();
        };
        let base = self.tree.path(source).unwrap_or_default();
        self.tree
            .preorder(source)
            .into_iter()
            .skip(1)
            .filter_map(|n| {
                let rel = self.tree.path(n)?.strip_prefix(base)?;
                let rel = rel.strip_prefix(path::SEPARATOR)?;
                Some((rel.to_string(), self.tree.payload(n)?))
            })
            .collect()
    }

    /// `Ok(false)` when the namespace chain for `name` already exists under `parent`.
    fn plan_group_link(&self, name: &str, parent: NodeId) -> ViewerResult<bool> {
        let mut cur = self
            .tree
            .path(parent)
            .ok_or_else(|| ViewerError::invariant("link target is not in the tree"))?
            .to_string();
        for seg in path::segments(name) {
            cur = path::join(&cur, seg);
            match self.tree.get(&cur).and_then(|n| self.tree.payload(n)) {
                None => return Ok(true),
                Some(NodePayload::Namespace) => {}
                Some(_) => {
                    return Err(ViewerError::duplicate(format!(
                        "'{cur}' is already taken by a scene or an entity"
                    )));
                }
            }
        }
        Ok(false)
    }

    /// Remove every node matching `node_name` together with its subtree.
    ///
    /// With `all`, removed entities lose every other placement and leave the registry,
    /// removed scenes leave the registry, and declared groups left without any tree node
    /// are forgotten. An unplaced declared group can only be removed with `all`.
    pub fn delete_node(&mut self, node_name: &str, all: bool) -> ViewerResult<Vec<SyncOp>> {
        let matches = self.tree.resolve(node_name);
        if matches.is_empty() {
            if all && self.groups.contains(node_name) {
                self.groups.shift_remove(node_name);
                self.pending.shift_remove(node_name);
                tracing::info!(group = node_name, "unplaced group removed");
                return Ok(Vec::new());
            }
            return Err(ViewerError::lookup(format!(
                "'{node_name}' does not match any node in the tree"
            )));
        }
        for &m in &matches {
            if self.tree.parent(m).is_none() {
                return Err(ViewerError::invariant(format!(
                    "'{}' matched a node without parent",
                    self.tree.path(m).unwrap_or_default()
                )));
            }
        }

        let mut roots: Vec<(NodeId, String)> = Vec::new();
        for m in matches {
            let Some(p) = self.tree.path(m) else { continue };
            if roots.iter().any(|(_, r)| path::is_within(p, r)) {
                continue;
            }
            roots.push((m, p.to_string()));
        }

        let mut affected: IndexSet<SceneId> = IndexSet::new();
        for &(root, _) in &roots {
            if matches!(self.tree.payload(root), Some(NodePayload::Scene(_))) {
                continue;
            }
            if let Some((_, scene)) = self.tree.nearest_scene(root) {
                affected.insert(scene);
            }
        }

        let parents: Vec<NodeId> = roots
            .iter()
            .filter_map(|&(root, _)| self.tree.parent(root))
            .collect();
        let mut touched: IndexSet<EntityId> = IndexSet::new();
        let mut scenes_out = Vec::new();
        let mut namespaces_out = Vec::new();
        for (root, root_path) in roots {
            if self.tree.get(&root_path) != Some(root) {
                continue;
            }
            for removed in self.tree.detach(root)? {
                match removed.payload {
                    NodePayload::Entity(id) => {
                        if let Some(entity) = self.entities.get_mut(id) {
                            entity.paths.shift_remove(&removed.path);
                        }
                        touched.insert(id);
                    }
                    NodePayload::Scene(id) => scenes_out.push(id),
                    NodePayload::Namespace => namespaces_out.push(removed.path),
                }
            }
        }

        for id in touched {
            if all {
                self.forget_entity(id, &mut affected)?;
            } else {
                self.refresh_entity_scenes(id);
            }
        }
        for id in scenes_out {
            self.detach_scene(id, all);
        }
        if all {
            self.forget_orphan_groups(&namespaces_out);
        }
        self.prune_empty_namespaces(parents)?;

        let ops = affected
            .into_iter()
            .filter(|&s| self.scene_node(s).is_some())
            .map(SyncOp::Resync)
            .collect();
        tracing::info!(node = node_name, all, "node deleted");
        Ok(ops)
    }

    /// Detach the remaining placements of `id` and drop it from every registry.
    fn forget_entity(
        &mut self,
        id: EntityId,
        affected: &mut IndexSet<SceneId>,
    ) -> ViewerResult<()> {
        let remaining: Vec<String> = self
            .entities
            .get(id)
            .map(|e| e.paths.iter().cloned().collect())
            .unwrap_or_default();
        for p in remaining {
            let Some(node) = self.tree.get(&p) else { continue };
            if let Some((_, scene)) = self.tree.nearest_scene(node) {
                affected.insert(scene);
            }
            self.tree.detach(node)?;
        }
        if let Some(entity) = self.entities.remove(id) {
            self.entity_names.shift_remove(&entity.name);
            tracing::debug!(entity = %entity.name, "entity removed from registry");
        }
        for parked in self.pending.values_mut() {
            parked.retain(|&e| e != id);
        }
        self.pending.retain(|_, parked| !parked.is_empty());
        Ok(())
    }

    fn detach_scene(&mut self, id: SceneId, all: bool) {
        let Some(scene) = self.scenes.get_mut(id) else {
            return;
        };
        scene.channel = None;
        if let Some(window) = scene.window.take()
            && let Some(w) = self.windows.get_mut(&window)
        {
            w.scenes.shift_remove(&id);
        }
        if all && let Some(scene) = self.scenes.remove(id) {
            self.scene_names.shift_remove(&scene.name);
            self.pending.shift_remove(&scene.name);
            tracing::debug!(scene = %scene.name, "scene removed from registry");
        }
    }

    /// Remove namespaces left empty by a deletion, walking up from each former parent.
    ///
    /// Scenes and placements of declared groups stay, even when empty.
    fn prune_empty_namespaces(&mut self, parents: Vec<NodeId>) -> ViewerResult<()> {
        for mut node in parents {
            loop {
                let Some(node_path) = self.tree.path(node) else { break };
                let keep = self.tree.payload(node) != Some(NodePayload::Namespace)
                    || !self.tree.children(node).is_empty()
                    || self.groups.iter().any(|g| path::matches_suffix(node_path, g));
                let parent = self.tree.parent(node);
                if keep || parent.is_none() {
                    break;
                }
                tracing::debug!(path = node_path, "empty namespace pruned");
                self.tree.detach(node)?;
                match parent {
                    Some(p) => node = p,
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Forget declared groups whose removed nodes were their last placement.
    fn forget_orphan_groups(&mut self, removed: &[String]) {
        let orphans: Vec<String> = self
            .groups
            .iter()
            .filter(|g| removed.iter().any(|p| path::matches_suffix(p, g)))
            .filter(|g| {
                !self
                    .tree
                    .resolve(g)
                    .into_iter()
                    .any(|n| self.tree.payload(n) == Some(NodePayload::Namespace))
            })
            .cloned()
            .collect();
        for g in orphans {
            self.groups.shift_remove(&g);
            self.pending.shift_remove(&g);
            tracing::debug!(group = %g, "group forgotten");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/membership.rs"]
mod tests;
