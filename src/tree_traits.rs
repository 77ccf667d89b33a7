use termtree::Tree;
use tracing::instrument;

use crate::domain::{CategoryNode, CategoryTree};

/// Conversion into a printable `termtree` hierarchy.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for CategoryNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(self.to_string()).with_leaves(leaves)
    }
}

// A forest has no single root, so the roots hang off a synthetic label.
impl TreeNodeConvert for CategoryTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        if self.is_empty() {
            return Tree::new("Empty tree".to_string());
        }
        let leaves: Vec<_> = self.roots().iter().map(|r| r.to_tree_string()).collect();
        Tree::new(".".to_string()).with_leaves(leaves)
    }
}
