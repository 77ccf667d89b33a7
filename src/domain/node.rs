//! Category tree entities and read-only queries.

use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// A single category in the hierarchy.
///
/// Only `key` and `children` are structural. Every other field of the
/// backend document (name, description, counters, status, ...) lands in
/// `attributes` and is carried through moves untouched.
///
/// An empty, null or absent `children` field is the same value: deserializing
/// any of them yields an empty `Vec`, and an empty `Vec` is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub key: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "children_or_null",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<CategoryNode>,
}

fn children_or_null<'de, D>(deserializer: D) -> Result<Vec<CategoryNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CategoryNode>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CategoryNode {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attributes: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.attributes
            .insert("name".to_string(), Value::String(name.into()));
        self
    }

    /// Display name, when the payload carries a string `name`.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    pub fn with_children(mut self, children: Vec<CategoryNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if `key` is this node or any of its descendants.
    pub fn subtree_contains(&self, key: &str) -> bool {
        self.key == key || self.children.iter().any(|c| c.subtree_contains(key))
    }

    /// Number of nodes in this subtree, including self.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }

    fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.depth())
            .max()
            .unwrap_or(0)
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a str>) {
        if self.children.is_empty() {
            leaves.push(self.key.as_str());
        } else {
            for child in &self.children {
                child.collect_leaves(leaves);
            }
        }
    }
}

impl fmt::Display for CategoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} [{}]", name, self.key),
            None => write!(f, "[{}]", self.key),
        }
    }
}

/// Ordered forest of root categories.
///
/// Serializes as a bare JSON array, the shape the category listing endpoint
/// returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
}

impl From<Vec<CategoryNode>> for CategoryTree {
    fn from(roots: Vec<CategoryNode>) -> Self {
        Self { roots }
    }
}

impl CategoryTree {
    pub fn new(roots: Vec<CategoryNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<CategoryNode> {
        &mut self.roots
    }

    pub fn into_roots(self) -> Vec<CategoryNode> {
        self.roots
    }

    /// Total number of nodes at all levels.
    pub fn len(&self) -> usize {
        self.roots.iter().map(|r| r.subtree_len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order traversal yielding `(depth, node)`; roots have depth 0.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }

    /// All keys in pre-order.
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(_, node)| node.key.as_str()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// First node with `key` in pre-order.
    pub fn find(&self, key: &str) -> Option<&CategoryNode> {
        self.iter().map(|(_, node)| node).find(|node| node.key == key)
    }

    /// Key of the parent of `key`; `Some(None)` for a root, `None` if absent.
    pub fn parent_of(&self, key: &str) -> Option<Option<&str>> {
        fn search<'a>(
            nodes: &'a [CategoryNode],
            parent: Option<&'a str>,
            key: &str,
        ) -> Option<Option<&'a str>> {
            for node in nodes {
                if node.key == key {
                    return Some(parent);
                }
                if let Some(found) = search(&node.children, Some(node.key.as_str()), key) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.roots, None, key)
    }

    /// Number of levels; an empty tree has depth 0.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots.iter().map(|r| r.depth()).max().unwrap_or(0)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn leaf_keys(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        for root in &self.roots {
            root.collect_leaves(&mut leaves);
        }
        leaves
    }

    /// Check the structural contract: non-empty keys, unique at all levels.
    ///
    /// Reports the first duplicate in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> DomainResult<()> {
        if self.iter().any(|(_, node)| node.key.is_empty()) {
            return Err(DomainError::EmptyKey);
        }
        if let Some(dup) = self.keys().into_iter().duplicates().next() {
            return Err(DomainError::DuplicateKey(dup.to_string()));
        }
        Ok(())
    }

    /// Set of all keys, for comparing trees irrespective of shape.
    pub fn key_set(&self) -> HashSet<&str> {
        self.keys().into_iter().collect()
    }
}

/// Stack-based pre-order iterator over a [`CategoryTree`].
pub struct PreOrderIter<'a> {
    stack: Vec<(usize, &'a CategoryNode)>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a CategoryTree) -> Self {
        // Push in reverse for left-to-right traversal
        let stack = tree.roots.iter().rev().map(|node| (0, node)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = (usize, &'a CategoryNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
