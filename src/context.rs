//! Per-invocation context passed to every command.
//!
//! Holds the site root (all generated paths are relative to it), the
//! directory drafts are edited in, and whether we run under CI. CI silences
//! status chatter and writes the store document compactly.

use crate::output;
use std::path::{Path, PathBuf};

/// Name of the store document in the site root.
pub const DOCUMENT_FILENAME: &str = "blog.json";
/// Prompt history file, reset by `clean`.
pub const HISTORY_FILENAME: &str = ".blog_history";

#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    pub ci: bool,
    drafts: PathBuf,
}

impl Context {
    pub fn new(root: impl Into<PathBuf>, ci: bool) -> Self {
        Self {
            root: root.into(),
            ci,
            drafts: std::env::temp_dir(),
        }
    }

    /// Edit drafts in `dir` instead of the system temp directory.
    pub fn with_drafts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.drafts = dir.into();
        self
    }

    /// Build a context for `root`, detecting CI from a non-empty `CI` variable.
    pub fn from_env(root: impl Into<PathBuf>) -> Self {
        let ci = std::env::var("CI").is_ok_and(|v| !v.is_empty());
        Self::new(root, ci)
    }

    /// Resolve a path relative to the site root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn document_path(&self) -> PathBuf {
        self.path(DOCUMENT_FILENAME)
    }

    pub fn history_path(&self) -> PathBuf {
        self.path(HISTORY_FILENAME)
    }

    pub fn drafts_dir(&self) -> &Path {
        &self.drafts
    }

    /// Markdown draft file for post `id`.
    pub fn draft_path(&self, id: &str) -> PathBuf {
        self.drafts.join(format!("{id}.md"))
    }

    /// Write a status line to stderr (only `ERROR` lines under CI).
    pub fn log(&self, header: &str, message: &str) {
        output::log(self.ci, header, message);
    }
}
