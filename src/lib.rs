//! Category tree reordering.
//!
//! The core is [`domain::move_node`]: given a forest of [`domain::CategoryNode`]s
//! and one drag-and-drop gesture, it returns the forest with the dragged
//! subtree relocated before, after or into the drop target. The surrounding
//! layers load trees from JSON documents, write them back and expose the
//! engine on the command line.
//!
//! ```
//! use cattree::domain::{move_node, CategoryNode, CategoryTree, Placement};
//!
//! let tree = CategoryTree::new(vec![
//!     CategoryNode::new("1").with_children(vec![CategoryNode::new("1-1"), CategoryNode::new("1-2")]),
//!     CategoryNode::new("2"),
//! ]);
//! let moved = move_node(&tree, "1-2", "2", Placement::from_gesture(-1, true)).unwrap();
//! assert_eq!(moved.keys(), vec!["1", "1-1", "1-2", "2"]);
//! assert_eq!(moved.roots().len(), 3);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
