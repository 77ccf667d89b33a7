//! Domain layer: category tree entities and the reordering engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod mutator;
pub mod node;
pub mod order;

pub use error::{DomainError, DomainResult};
pub use mutator::{apply_moves, move_node, DropPosition, MoveRequest, Placement, TreeMutator};
pub use node::{CategoryNode, CategoryTree, PreOrderIter};
pub use order::{changed_entries, flatten, SortEntry};
