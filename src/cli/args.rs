//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Reorder hierarchical category trees with drag-and-drop moves
#[derive(Parser, Debug)]
#[command(name = "cattree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project directory for local config (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree
    Show {
        /// Tree document (default: configured tree_file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Validate the tree and print a summary
    Check {
        /// Tree document (default: configured tree_file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Move one node, as a drop gesture would
    Move {
        /// Tree document (default: configured tree_file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Key of the dragged node
        #[arg(long)]
        drag: String,
        /// Key of the node the drop landed on
        #[arg(long)]
        drop: String,
        /// Drop offset for gap drops: -1 inserts before, anything else after
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        position: i32,
        /// Drop into the gap next to the target instead of into it
        #[arg(long)]
        gap: bool,
        /// Print the result without writing it back
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply a JSON array of moves atomically
    Apply {
        /// Tree document (default: configured tree_file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// JSON file with [{dragKey, dropKey, dropPosition, dropToGap}, ...]
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// Print the result without writing it back
        #[arg(long)]
        dry_run: bool,
    },

    /// Print parent and sibling position of every node as JSON
    Order {
        /// Tree document (default: configured tree_file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a commented template config
    Template,
    /// Show config file locations
    Path,
}
