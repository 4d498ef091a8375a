//! Shared test utilities: sample posts, sample documents, a site in a temp
//! directory, and a scripted [`Interaction`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (tmp, ctx) = sample_site();
//! let mut doc = sample_document();
//! let mut ui = Scripted::new().answer("New title").pick(Some("first-post | \"First post\""));
//! ```

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::context::Context;
use crate::interact::{InteractError, Interaction};
use crate::store::{Document, Post, Posts};

// =========================================================================
// Fixtures
// =========================================================================

/// Three posts, oldest first.
///
/// | id            | created (UTC)       | keywords       |
/// |---------------|---------------------|----------------|
/// | `first-post`  | 2024-03-01 12:00:00 | `rust blog`    |
/// | `second-post` | 2024-04-15 08:30:00 | `notes`        |
/// | `third-post`  | 2024-05-20 18:45:30 | `web <html>`   |
pub fn sample_posts() -> Posts {
    [
        Post::new(
            "first-post",
            "First post",
            "# Hello\n\nWelcome to the blog.\n",
            "rust blog",
            1709294400.0,
        ),
        Post::new(
            "second-post",
            "Second post",
            "## Intro\n\nSee <#details>.\n\n## Details\n\nMore.\n",
            "notes",
            1713169800.0,
        ),
        Post::new(
            "third-post",
            "Third post: a rather long title",
            "> quoted\n\n```\ncode\n```\n",
            "web <html>",
            1716230730.0,
        ),
    ]
    .into_iter()
    .collect()
}

/// Stock settings with [`sample_posts`].
pub fn sample_document() -> Document {
    let mut doc = Document::stock();
    doc.blogs = sample_posts();
    doc
}

/// An empty site root in a temp dir, with drafts kept inside it.
pub fn sample_site() -> (TempDir, Context) {
    let tmp = TempDir::new().unwrap();
    let ctx = Context::new(tmp.path(), true).with_drafts_dir(tmp.path().join("drafts"));
    fs::create_dir_all(ctx.drafts_dir()).unwrap();
    (tmp, ctx)
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// =========================================================================
// Scripted interaction
// =========================================================================

/// An [`Interaction`] that replays canned answers in order.
///
/// - `answer`: next prompt reply (empty keeps the current value)
/// - `pick`: next picker result (`None` = cancelled)
/// - `edit`: next editor result written over the file
///
/// Running out of prompts or picks is [`InteractError::Eof`]; running out of
/// edits leaves the file untouched. Picker choices are recorded in `shown`.
#[derive(Debug, Default)]
pub struct Scripted {
    answers: VecDeque<String>,
    picks: VecDeque<Option<String>>,
    edits: VecDeque<String>,
    pub shown: Vec<Vec<String>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, text: &str) -> Self {
        self.answers.push_back(text.to_string());
        self
    }

    pub fn pick(mut self, choice: Option<&str>) -> Self {
        self.picks.push_back(choice.map(str::to_string));
        self
    }

    pub fn edit(mut self, content: &str) -> Self {
        self.edits.push_back(content.to_string());
        self
    }
}

impl Interaction for Scripted {
    fn prompt(&mut self, _label: &str, current: &str) -> Result<String, InteractError> {
        let answer = self.answers.pop_front().ok_or(InteractError::Eof)?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            current.trim().to_string()
        } else {
            answer.to_string()
        })
    }

    fn pick(&mut self, _label: &str, choices: &[String]) -> Result<Option<String>, InteractError> {
        self.shown.push(choices.to_vec());
        self.picks.pop_front().ok_or(InteractError::Eof)
    }

    fn edit(&mut self, path: &Path) -> Result<(), InteractError> {
        if let Some(content) = self.edits.pop_front() {
            fs::write(path, content)?;
        }
        Ok(())
    }
}
