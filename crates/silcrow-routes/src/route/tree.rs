/// The validated route tree
///
/// A `RouteTree` owns exactly one root node. Construction walks every node
/// once and rejects trees that break the structural rules, so the resolver
/// can rely on them without re-checking.

use std::collections::HashSet;
use thiserror::Error;

use super::node::{RouteKind, RouteNode};
use super::pattern::{validate_segment, SegmentKind};

/// Structural problems found while assembling a tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("root segment must be empty, found '{0}'")]
    RootSegmentNotEmpty(String),

    #[error("root must be a page or a layout, found a group")]
    RootIsGroup,

    #[error("duplicate segment '{segment}' under '{parent}'")]
    DuplicateSegment { parent: String, segment: String },

    #[error("segment '{segment}' at '{path}' cannot take a parameter validator")]
    ValidatorOnStaticSegment { path: String, segment: String },

    #[error("group '{segment}' at '{path}' must use the (name) syntax")]
    GroupWithoutParentheses { path: String, segment: String },

    #[error("invalid segment '{segment}' at '{path}': {reason}")]
    InvalidSegment {
        path: String,
        segment: String,
        reason: String,
    },
}

/// Immutable route tree with a single root
#[derive(Debug, Clone)]
pub struct RouteTree {
    root: RouteNode,
}

impl RouteTree {
    /// Validates `root` and everything below it
    ///
    /// # Examples
    ///
    /// ```
    /// use silcrow_routes::{layout, page, RouteTree, TreeError};
    ///
    /// let tree = RouteTree::new(layout("").child(page("about")));
    /// assert!(tree.is_ok());
    ///
    /// let duplicate = RouteTree::new(layout("").child(page("a")).child(page("a")));
    /// assert!(matches!(duplicate, Err(TreeError::DuplicateSegment { .. })));
    /// ```
    pub fn new(root: RouteNode) -> Result<Self, TreeError> {
        if !root.segment().is_empty() {
            return Err(TreeError::RootSegmentNotEmpty(root.segment().to_string()));
        }
        if root.kind() == RouteKind::Group {
            return Err(TreeError::RootIsGroup);
        }

        check_node(&root, "")?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &RouteNode {
        &self.root
    }
}

/// Recursively checks a node and its children
///
/// `path` is the authored path of `node` (root is `""`).
fn check_node(node: &RouteNode, path: &str) -> Result<(), TreeError> {
    validate_segment(node.segment()).map_err(|reason| TreeError::InvalidSegment {
        path: path.to_string(),
        segment: node.segment().to_string(),
        reason,
    })?;

    let segment_kind = node.segment_kind();

    match (node.kind(), segment_kind) {
        (RouteKind::Group, SegmentKind::Group) => {}
        (RouteKind::Group, _) => {
            return Err(TreeError::GroupWithoutParentheses {
                path: path.to_string(),
                segment: node.segment().to_string(),
            })
        }
        (RouteKind::Page, SegmentKind::Group) | (RouteKind::Layout, SegmentKind::Group) => {
            return Err(TreeError::InvalidSegment {
                path: path.to_string(),
                segment: node.segment().to_string(),
                reason: format!("a {} cannot use the (name) group syntax", node.kind()),
            })
        }
        (RouteKind::Page, _) | (RouteKind::Layout, _) => {}
    }

    if node.validator().is_some() && !segment_kind.is_dynamic() {
        return Err(TreeError::ValidatorOnStaticSegment {
            path: path.to_string(),
            segment: node.segment().to_string(),
        });
    }

    let mut seen = HashSet::new();
    for child in node.children() {
        if !seen.insert(child.segment()) {
            return Err(TreeError::DuplicateSegment {
                parent: if path.is_empty() { "/".to_string() } else { path.to_string() },
                segment: child.segment().to_string(),
            });
        }
        let child_path = format!("{}/{}", path, child.segment());
        if child.segment().is_empty() {
            return Err(TreeError::InvalidSegment {
                path: child_path,
                segment: String::new(),
                reason: "only the root may have an empty segment".to_string(),
            });
        }
        check_node(child, &child_path)?;
    }

    Ok(())
}
