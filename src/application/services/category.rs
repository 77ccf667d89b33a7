//! Category tree service
//!
//! Loads category trees from JSON documents, runs drag-and-drop moves through
//! the domain engine and writes the result back.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{self, CategoryTree, MoveRequest, SortEntry};
use crate::infrastructure::traits::FileSystem;

/// How trees are written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Keep the previous document as `<file>.bak`
    pub backup: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            backup: false,
        }
    }
}

/// Result of one or more moves against a tree document.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// Tree after the move(s)
    pub tree: CategoryTree,
    /// Sort entries whose parent or position changed
    pub changed: Vec<SortEntry>,
    /// Whether the document on disk was updated
    pub saved: bool,
}

/// Service for reordering category tree documents.
pub struct CategoryService {
    fs: Arc<dyn FileSystem>,
    options: SaveOptions,
}

impl CategoryService {
    /// Create a new category service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_options(fs, SaveOptions::default())
    }

    pub fn with_options(fs: Arc<dyn FileSystem>, options: SaveOptions) -> Self {
        Self { fs, options }
    }

    /// Load and validate a tree document.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<CategoryTree> {
        let tree: CategoryTree = self.read_json(path)?;
        tree.validate()?;
        debug!("load: {} nodes, depth {}", tree.len(), tree.depth());
        Ok(tree)
    }

    /// Write a tree document, optionally keeping a backup of the old one.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, path: &Path, tree: &CategoryTree) -> ApplicationResult<()> {
        let mut content = if self.options.pretty {
            serde_json::to_string_pretty(tree)
        } else {
            serde_json::to_string(tree)
        }
        .map_err(|e| ApplicationError::Serialization {
            path: path.to_path_buf(),
            source: e,
        })?;
        content.push('\n');

        if self.options.backup && self.fs.exists(path) {
            let backup = backup_path(path);
            self.fs
                .copy(path, &backup)
                .with_path_context("backup tree", &backup)?;
            debug!("save: backup at {}", backup.display());
        }

        self.fs
            .write_atomic(path, &content)
            .with_path_context("write tree", path)
    }

    /// Run a single gesture against the document at `path`.
    ///
    /// The document is only rewritten when the move succeeds and `persist`
    /// is set.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &self,
        path: &Path,
        request: &MoveRequest,
        persist: bool,
    ) -> ApplicationResult<MoveOutcome> {
        let before = self.load(path)?;
        let after = domain::move_node(
            &before,
            &request.drag_key,
            &request.drop_key,
            request.placement(),
        )?;
        info!(
            "moved {} {} {}",
            request.drag_key,
            request.placement(),
            request.drop_key
        );
        self.finish(path, &before, after, persist)
    }

    /// Run a JSON array of gestures from `script` atomically.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_script(
        &self,
        path: &Path,
        script: &Path,
        persist: bool,
    ) -> ApplicationResult<MoveOutcome> {
        let requests: Vec<MoveRequest> = self.read_json(script)?;
        let before = self.load(path)?;
        let after = domain::apply_moves(&before, &requests)?;
        info!("applied {} moves", requests.len());
        self.finish(path, &before, after, persist)
    }

    /// Flat parent/position listing of the document at `path`.
    pub fn sort_order(&self, path: &Path) -> ApplicationResult<Vec<SortEntry>> {
        Ok(domain::flatten(&self.load(path)?))
    }

    fn finish(
        &self,
        path: &Path,
        before: &CategoryTree,
        after: CategoryTree,
        persist: bool,
    ) -> ApplicationResult<MoveOutcome> {
        let changed = domain::changed_entries(before, &after);
        let saved = persist && !changed.is_empty();
        if saved {
            self.save(path, &after)?;
        }
        Ok(MoveOutcome {
            tree: after,
            changed,
            saved,
        })
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> ApplicationResult<T> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read", path)?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::Serialization {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// `tree.json` -> `tree.json.bak`
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("tree"));
    name.push(".bak");
    path.with_file_name(name)
}
