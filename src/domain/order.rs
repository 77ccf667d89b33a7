//! Flat sort-order export for persisting a reordered tree.
//!
//! After a successful move the backend only needs each category's parent
//! and position among its siblings, not the full documents.

use serde::{Deserialize, Serialize};

use crate::domain::node::{CategoryNode, CategoryTree};

/// Position of one category in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortEntry {
    pub key: String,
    /// `None` for root categories
    pub parent_key: Option<String>,
    /// Zero-based index among siblings
    pub sort: usize,
    pub depth: usize,
}

/// Sort entries for every node, in pre-order.
pub fn flatten(tree: &CategoryTree) -> Vec<SortEntry> {
    let mut entries = Vec::with_capacity(tree.len());
    walk(tree.roots(), None, 0, &mut entries);
    entries
}

fn walk(
    nodes: &[CategoryNode],
    parent_key: Option<&str>,
    depth: usize,
    entries: &mut Vec<SortEntry>,
) {
    for (sort, node) in nodes.iter().enumerate() {
        entries.push(SortEntry {
            key: node.key.clone(),
            parent_key: parent_key.map(str::to_string),
            sort,
            depth,
        });
        walk(&node.children, Some(&node.key), depth + 1, entries);
    }
}

/// Entries whose parent or sibling index differ between two trees.
///
/// Used to send only what a move actually changed.
pub fn changed_entries(before: &CategoryTree, after: &CategoryTree) -> Vec<SortEntry> {
    let old = flatten(before);
    flatten(after)
        .into_iter()
        .filter(|entry| {
            !old.iter().any(|prev| {
                prev.key == entry.key
                    && prev.parent_key == entry.parent_key
                    && prev.sort == entry.sort
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutator::{move_node, DropPosition, Placement};

    fn sample() -> CategoryTree {
        CategoryTree::new(vec![
            CategoryNode::new("1").with_children(vec![
                CategoryNode::new("1-1"),
                CategoryNode::new("1-2"),
            ]),
            CategoryNode::new("2"),
        ])
    }

    #[test]
    fn given_tree_when_flattening_then_lists_parent_and_sibling_index() {
        let entries = flatten(&sample());
        let summary: Vec<(&str, Option<&str>, usize, usize)> = entries
            .iter()
            .map(|e| (e.key.as_str(), e.parent_key.as_deref(), e.sort, e.depth))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1", None, 0, 0),
                ("1-1", Some("1"), 0, 1),
                ("1-2", Some("1"), 1, 1),
                ("2", None, 1, 0),
            ]
        );
    }

    #[test]
    fn given_move_when_diffing_then_reports_only_shifted_nodes() {
        let before = sample();
        let after =
            move_node(&before, "1-2", "2", Placement::Gap(DropPosition::Before)).unwrap();
        let changed: Vec<String> = changed_entries(&before, &after)
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(changed, vec!["1-2", "2"]);
    }

    #[test]
    fn given_entry_when_serializing_then_uses_camel_case() {
        let entry = SortEntry {
            key: "1-1".into(),
            parent_key: Some("1".into()),
            sort: 0,
            depth: 1,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"key": "1-1", "parentKey": "1", "sort": 0, "depth": 1})
        );
    }
}
