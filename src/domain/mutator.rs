//! Drag-and-drop reordering of category trees.
//!
//! A move runs in three steps over an owned copy of the tree:
//!
//! 1. detach the dragged subtree (pre-order search),
//! 2. locate the drop target in the tree *without* the dragged subtree,
//! 3. reinsert as a sibling (before/after) or as the target's first child.
//!
//! The input tree is never touched, so a failed move leaves the caller with
//! the tree it started from.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{CategoryNode, CategoryTree};

/// Side of the drop target a gap drop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

impl DropPosition {
    /// Map the drag library's relative offset: `-1` is before, anything
    /// else is after.
    pub fn from_offset(offset: i32) -> Self {
        if offset == -1 {
            DropPosition::Before
        } else {
            DropPosition::After
        }
    }
}

/// Where the dragged node ends up relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Sibling of the target, in the gap before or after it.
    Gap(DropPosition),
    /// First child of the target.
    Child,
}

impl Placement {
    /// Build from raw gesture parameters; `drop_position` only matters
    /// when dropping into a gap.
    pub fn from_gesture(drop_position: i32, drop_to_gap: bool) -> Self {
        if drop_to_gap {
            Placement::Gap(DropPosition::from_offset(drop_position))
        } else {
            Placement::Child
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Gap(DropPosition::Before) => write!(f, "before"),
            Placement::Gap(DropPosition::After) => write!(f, "after"),
            Placement::Child => write!(f, "into"),
        }
    }
}

/// One drop gesture as emitted by the tree widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub drag_key: String,
    pub drop_key: String,
    #[serde(default)]
    pub drop_position: i32,
    pub drop_to_gap: bool,
}

impl MoveRequest {
    pub fn new(
        drag_key: impl Into<String>,
        drop_key: impl Into<String>,
        drop_position: i32,
        drop_to_gap: bool,
    ) -> Self {
        Self {
            drag_key: drag_key.into(),
            drop_key: drop_key.into(),
            drop_position,
            drop_to_gap,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement::from_gesture(self.drop_position, self.drop_to_gap)
    }
}

/// Relocate `drag_key` relative to `drop_key` and return the new tree.
///
/// Fails with [`DomainError::NodeNotFound`] if either key is absent and with
/// [`DomainError::CyclicMove`] if the drop target is the dragged node or one
/// of its descendants.
#[instrument(level = "debug", skip(tree))]
pub fn move_node(
    tree: &CategoryTree,
    drag_key: &str,
    drop_key: &str,
    placement: Placement,
) -> DomainResult<CategoryTree> {
    let mut next = tree.clone();
    relocate(next.roots_mut(), drag_key, drop_key, placement)?;
    Ok(next)
}

/// Apply a sequence of gestures; all succeed or the input is kept.
#[instrument(level = "debug", skip(tree, requests), fields(count = requests.len()))]
pub fn apply_moves(tree: &CategoryTree, requests: &[MoveRequest]) -> DomainResult<CategoryTree> {
    let mut next = tree.clone();
    for (index, request) in requests.iter().enumerate() {
        relocate(
            next.roots_mut(),
            &request.drag_key,
            &request.drop_key,
            request.placement(),
        )
        .map_err(|e| DomainError::BatchMoveFailed {
            index,
            source: Box::new(e),
        })?;
    }
    Ok(next)
}

/// In-place move on a scratch copy. Callers must discard `roots` on error.
fn relocate(
    roots: &mut Vec<CategoryNode>,
    drag_key: &str,
    drop_key: &str,
    placement: Placement,
) -> DomainResult<()> {
    let dragged =
        detach(roots, drag_key).ok_or_else(|| DomainError::NodeNotFound(drag_key.to_string()))?;

    if dragged.subtree_contains(drop_key) {
        return Err(DomainError::CyclicMove {
            drag_key: drag_key.to_string(),
            drop_key: drop_key.to_string(),
        });
    }

    let path =
        locate(roots, drop_key).ok_or_else(|| DomainError::NodeNotFound(drop_key.to_string()))?;
    let (siblings, index) = siblings_at(roots, &path);
    debug!(drag_key, drop_key, %placement, index, "reinserting");

    match placement {
        Placement::Gap(DropPosition::Before) => siblings.insert(index, dragged),
        Placement::Gap(DropPosition::After) => siblings.insert(index + 1, dragged),
        Placement::Child => siblings[index].children.insert(0, dragged),
    }
    Ok(())
}

/// Remove the first node with `key` in pre-order and return its subtree.
fn detach(nodes: &mut Vec<CategoryNode>, key: &str) -> Option<CategoryNode> {
    for i in 0..nodes.len() {
        if nodes[i].key == key {
            return Some(nodes.remove(i));
        }
        if let Some(found) = detach(&mut nodes[i].children, key) {
            return Some(found);
        }
    }
    None
}

/// Index path to the first node with `key` in pre-order.
fn locate(nodes: &[CategoryNode], key: &str) -> Option<Vec<usize>> {
    for (i, node) in nodes.iter().enumerate() {
        if node.key == key {
            return Some(vec![i]);
        }
        if let Some(mut path) = locate(&node.children, key) {
            path.insert(0, i);
            return Some(path);
        }
    }
    None
}

/// Sibling list holding the node at `path`, and its index there.
///
/// `path` comes from [`locate`] on the same list, so it is never empty and
/// every step is in bounds.
fn siblings_at<'a>(
    mut nodes: &'a mut Vec<CategoryNode>,
    path: &[usize],
) -> (&'a mut Vec<CategoryNode>, usize) {
    let Some((&last, parents)) = path.split_last() else {
        return (nodes, 0);
    };
    for &step in parents {
        nodes = &mut nodes[step].children;
    }
    (nodes, last)
}

/// Holder of the current tree snapshot.
///
/// The snapshot is replaced only when a move succeeds.
#[derive(Debug, Clone, Default)]
pub struct TreeMutator {
    tree: CategoryTree,
}

impl TreeMutator {
    pub fn new(tree: CategoryTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn into_tree(self) -> CategoryTree {
        self.tree
    }

    /// Apply one gesture with its raw parameters.
    pub fn apply(
        &mut self,
        drag_key: &str,
        drop_key: &str,
        drop_position: i32,
        drop_to_gap: bool,
    ) -> DomainResult<&CategoryTree> {
        self.apply_placement(
            drag_key,
            drop_key,
            Placement::from_gesture(drop_position, drop_to_gap),
        )
    }

    pub fn apply_placement(
        &mut self,
        drag_key: &str,
        drop_key: &str,
        placement: Placement,
    ) -> DomainResult<&CategoryTree> {
        self.tree = move_node(&self.tree, drag_key, drop_key, placement)?;
        Ok(&self.tree)
    }

    pub fn apply_request(&mut self, request: &MoveRequest) -> DomainResult<&CategoryTree> {
        self.apply_placement(&request.drag_key, &request.drop_key, request.placement())
    }
}
