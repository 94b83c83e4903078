use std::collections::HashMap;

use crate::foundation::arena::Arena;
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::foundation::ids::{NodeId, SceneId};
use crate::graph::model::{NodeKind, NodePayload};
use crate::graph::path;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) path: String,
    pub(crate) payload: NodePayload,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// A node removed from the tree by [`GroupTree::detach`].
#[derive(Clone, Debug)]
pub(crate) struct DetachedNode {
    pub(crate) path: String,
    pub(crate) payload: NodePayload,
}

/// One line of a [`TreeSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SnapshotEntry {
    /// Full node path.
    pub path: String,
    /// Payload kind.
    pub kind: NodeKind,
}

/// Pre-order listing of every node below the root. Two equal snapshots describe the same tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct TreeSnapshot {
    /// Nodes in pre-order.
    pub nodes: Vec<SnapshotEntry>,
}

impl TreeSnapshot {
    /// Paths of every node, in pre-order.
    pub fn paths(&self) -> Vec<&str> {
        self.nodes.iter().map(|e| e.path.as_str()).collect()
    }
}

/// Rooted tree of named nodes, stored in an arena and indexed by full path and by leaf name.
///
/// The root is a namespace sentinel with the empty path. Children keep insertion order, which
/// makes pre-order traversal (and therefore multi-match resolution) deterministic.
#[derive(Clone, Debug)]
pub struct GroupTree {
    nodes: Arena<NodeId, Node>,
    root: NodeId,
    by_path: HashMap<String, NodeId>,
    by_leaf: HashMap<String, Vec<NodeId>>,
}

impl Default for GroupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTree {
    /// Create a tree holding only the root.
    pub fn new() -> Self {
        let mut nodes = Arena::default();
        let root = nodes.insert(Node {
            path: String::new(),
            payload: NodePayload::Namespace,
            parent: None,
            children: Vec::new(),
        });
        Self {
            nodes,
            root,
            by_path: HashMap::new(),
            by_leaf: HashMap::new(),
        }
    }

    /// Root sentinel.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes below the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// `true` when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Full path of a live node.
    pub fn path(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.path.as_str())
    }

    /// Payload of a live node.
    pub fn payload(&self, id: NodeId) -> Option<NodePayload> {
        self.nodes.get(id).map(|n| n.payload)
    }

    /// Parent of a live node (`None` for the root).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Children of a live node, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Exact path lookup.
    pub fn get(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    /// Every node whose path ends with the whole segments of `query`, in pre-order.
    pub fn resolve(&self, query: &str) -> Vec<NodeId> {
        let Some(candidates) = self.by_leaf.get(path::leaf(query)) else {
            return Vec::new();
        };
        let mut hits: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|&id| self.path(id).is_some_and(|p| path::matches_suffix(p, query)))
            .collect();
        if hits.len() > 1 {
            let order: HashMap<NodeId, usize> = self
                .preorder(self.root)
                .into_iter()
                .enumerate()
                .map(|(i, id)| (id, i))
                .collect();
            hits.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
        }
        hits
    }

    /// Pre-order traversal starting at (and including) `from`.
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.nodes.contains(from) {
            return out;
        }
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Nearest scene-binding node among `id` and its ancestors.
    pub fn nearest_scene(&self, id: NodeId) -> Option<(NodeId, SceneId)> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|n| match self.payload(n)? {
                NodePayload::Scene(scene) => Some((n, scene)),
                _ => None,
            })
    }

    /// Insert a child named `name` (single segment) under `parent`.
    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        name: &str,
        payload: NodePayload,
    ) -> ViewerResult<NodeId> {
        let parent_path = self
            .path(parent)
            .ok_or_else(|| ViewerError::invariant("insert under a node that is not in the tree"))?;
        let path = path::join(parent_path, name);
        if self.by_path.contains_key(&path) {
            return Err(ViewerError::duplicate(format!("node '{path}' already exists")));
        }
        let id = self.nodes.insert(Node {
            path: path.clone(),
            payload,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        self.by_leaf
            .entry(path::leaf(&path).to_string())
            .or_default()
            .push(id);
        self.by_path.insert(path, id);
        Ok(id)
    }

    /// Build the namespace chain `a`, `a/b`, `a/b/c` under `parent` and return its tail.
    ///
    /// Existing namespace nodes along the chain are reused; an existing node with another
    /// payload is a duplicate error.
    pub(crate) fn create_path_chain<'a>(
        &mut self,
        parent: NodeId,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> ViewerResult<NodeId> {
        let mut cur = parent;
        for seg in segments {
            let parent_path = self.path(cur).ok_or_else(|| {
                ViewerError::invariant("path chain parent is not in the tree")
            })?;
            let child_path = path::join(parent_path, seg);
            cur = match self.get(&child_path) {
                Some(existing) => match self.payload(existing) {
                    Some(NodePayload::Namespace) => existing,
                    _ => {
                        return Err(ViewerError::duplicate(format!(
                            "'{child_path}' already exists and is not a group"
                        )));
                    }
                },
                None => self.insert_child(cur, seg, NodePayload::Namespace)?,
            };
        }
        Ok(cur)
    }

    /// Unlink `id` from its parent and drop its whole subtree. Returns the removed nodes in
    /// pre-order.
    pub(crate) fn detach(&mut self, id: NodeId) -> ViewerResult<Vec<DetachedNode>> {
        if id == self.root {
            return Err(ViewerError::invariant("the root node cannot be detached"));
        }
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| ViewerError::lookup("node is not in the tree"))?;
        let parent = node.parent.ok_or_else(|| {
            ViewerError::invariant(format!("node '{}' has no parent", node.path))
        })?;
        let siblings = &mut self
            .nodes
            .get_mut(parent)
            .ok_or_else(|| ViewerError::invariant("parent slot is empty"))?
            .children;
        siblings.retain(|&c| c != id);

        let order = self.preorder(id);
        let mut removed = Vec::with_capacity(order.len());
        for nid in order {
            if let Some(node) = self.nodes.remove(nid) {
                self.unindex(nid, &node.path);
                removed.push(DetachedNode {
                    path: node.path,
                    payload: node.payload,
                });
            }
        }
        Ok(removed)
    }

    fn unindex(&mut self, id: NodeId, node_path: &str) {
        self.by_path.remove(node_path);
        let leaf = path::leaf(node_path);
        if let Some(ids) = self.by_leaf.get_mut(leaf) {
            ids.retain(|&n| n != id);
            if ids.is_empty() {
                self.by_leaf.remove(leaf);
            }
        }
    }

    /// Pre-order listing of all nodes below the root.
    pub fn snapshot(&self) -> TreeSnapshot {
        let nodes = self
            .preorder(self.root)
            .into_iter()
            .skip(1)
            .filter_map(|id| {
                let n = self.nodes.get(id)?;
                Some(SnapshotEntry {
                    path: n.path.clone(),
                    kind: n.payload.kind(),
                })
            })
            .collect();
        TreeSnapshot { nodes }
    }

    /// Verify the structural invariants: single parent, consistent paths, acyclic, indexed.
    pub fn check_structure(&self) -> ViewerResult<()> {
        let reachable = self.preorder(self.root);
        if reachable.len() != self.nodes.len() {
            return Err(ViewerError::invariant(format!(
                "{} nodes stored but {} reachable from the root",
                self.nodes.len(),
                reachable.len()
            )));
        }
        for &id in reachable.iter().skip(1) {
            let Some(node) = self.nodes.get(id) else {
                return Err(ViewerError::invariant("reachable slot is empty"));
            };
            let parent = node.parent.ok_or_else(|| {
                ViewerError::invariant(format!("'{}' has no parent", node.path))
            })?;
            let parent_node = self.nodes.get(parent).ok_or_else(|| {
                ViewerError::invariant(format!("'{}' has a dead parent", node.path))
            })?;
            if parent_node.children.iter().filter(|&&c| c == id).count() != 1 {
                return Err(ViewerError::invariant(format!(
                    "'{}' is not listed exactly once by its parent",
                    node.path
                )));
            }
            if path::join(&parent_node.path, path::leaf(&node.path)) != node.path {
                return Err(ViewerError::invariant(format!(
                    "'{}' does not extend its parent path '{}'",
                    node.path, parent_node.path
                )));
            }
            if self.by_path.get(&node.path) != Some(&id) {
                return Err(ViewerError::invariant(format!(
                    "'{}' is missing from the path index",
                    node.path
                )));
            }
        }
        if self.by_path.len() != self.len() {
            return Err(ViewerError::invariant("path index holds stale entries"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/tree.rs"]
mod tests;
