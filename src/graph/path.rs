//! Slash-delimited node paths.
//!
//! A path is the `/`-joined list of node names from the tree root, without a leading slash
//! (`s1/arm/box`). The root itself has the empty path. Paths handed to the backend are
//! expressed relative to the owning scene and carry a leading slash (`/arm/box`).

use crate::foundation::error::{ViewerError, ViewerResult};

/// Path separator.
pub const SEPARATOR: char = '/';

/// Check that `name` is a well-formed (possibly multi-segment) node name.
pub fn validate_name(name: &str) -> ViewerResult<()> {
    if name.is_empty() {
        return Err(ViewerError::validation("name must be non-empty"));
    }
    if name.starts_with(SEPARATOR) || name.ends_with(SEPARATOR) {
        return Err(ViewerError::validation(format!(
            "name '{name}' must not start or end with '/'"
        )));
    }
    if name.split(SEPARATOR).any(|s| s.trim().is_empty()) {
        return Err(ViewerError::validation(format!(
            "name '{name}' contains an empty segment"
        )));
    }
    Ok(())
}

/// Check that `name` is a well-formed single-segment name (scenes, windows).
pub fn validate_segment(name: &str) -> ViewerResult<()> {
    validate_name(name)?;
    if name.contains(SEPARATOR) {
        return Err(ViewerError::validation(format!(
            "name '{name}' must not contain '/'"
        )));
    }
    Ok(())
}

/// Split `name` into its segments.
pub fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Last segment of a path (the node's own name).
pub fn leaf(path: &str) -> &str {
    path.rsplit(SEPARATOR).next().unwrap_or(path)
}

/// Join a parent path and a child name. The root is the empty path.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}{SEPARATOR}{child}")
    }
}

/// Split `name` at its first separator into `(group reference, local name)`.
///
/// Returns `None` when `name` has a single segment.
pub fn split_group_ref(name: &str) -> Option<(&str, &str)> {
    name.split_once(SEPARATOR)
}

/// `true` when `query` is a whole trailing segment sequence of `path`.
///
/// `s1/arm/box` matches `box`, `arm/box` and `s1/arm/box`, but not `ox` or `m/box`.
pub fn matches_suffix(path: &str, query: &str) -> bool {
    if query.is_empty() || !path.ends_with(query) {
        return false;
    }
    let head = path.len() - query.len();
    head == 0 || path[..head].ends_with(SEPARATOR)
}

/// `true` when `path` is `ancestor` itself or lies below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Express `path` relative to `scene_path` in backend form (`/a/b`).
///
/// The scene itself maps to `/`.
pub fn scene_relative(path: &str, scene_path: &str) -> String {
    let rest = path
        .strip_prefix(scene_path)
        .map(|r| r.trim_start_matches(SEPARATOR))
        .unwrap_or(path);
    format!("{SEPARATOR}{rest}")
}

#[cfg(test)]
#[path = "../../tests/unit/graph/path.rs"]
mod tests;
