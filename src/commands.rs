//! Operations behind the CLI subcommands.
//!
//! Every command works on a loaded [`Document`] and a [`Context`]; the caller
//! persists the document afterwards. Commands that need the user go through
//! an [`Interaction`], and each prompt can be skipped by passing the value up
//! front (`CreateArgs`, `EditArgs`, an explicit post id).

use crate::context::Context;
use crate::generate::{self, GenerateError};
use crate::interact::{InteractError, Interaction};
use crate::metadata::{self, HASH_FILENAME, MANIFEST_FILENAME, MetadataError};
use crate::minify::{self, FONTS_DIR, MinifyError};
use crate::output;
use crate::slug::{SlugError, generate_slug};
use crate::store::{Document, Post, StoreError, now_timestamp};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Minify(#[from] MinifyError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Interact(#[from] InteractError),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("No blogs to {0}")]
    NoPosts(&'static str),
    #[error("Blog title cannot be empty")]
    EmptyTitle,
    #[error("Content of a blog cannot be empty")]
    EmptyContent,
    #[error("Keywords cannot be empty")]
    EmptyKeywords,
    #[error("No blog selected")]
    NothingSelected,
    #[error("Blog {0:?} does not exist")]
    UnknownPost(String),
    #[error("Please configure '{}'", .0.display())]
    NotConfigured(PathBuf),
    #[error("Failed to generate static site")]
    StaticFailed(#[source] Box<CommandError>),
}

/// Inputs of `create`; missing ones are asked for.
#[derive(Debug, Default, Clone)]
pub struct CreateArgs {
    pub title: Option<String>,
    pub keywords: Option<String>,
    /// Markdown file to take the content from instead of opening the editor.
    pub content_file: Option<PathBuf>,
}

/// What `edit` changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EditField {
    Quit,
    Title,
    Keywords,
    Content,
}

impl EditField {
    pub const ALL: [EditField; 4] = [
        EditField::Quit,
        EditField::Title,
        EditField::Keywords,
        EditField::Content,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EditField::Quit => "quit",
            EditField::Title => "title",
            EditField::Keywords => "keywords",
            EditField::Content => "content",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name.trim())
    }
}

/// Inputs of `edit`; missing ones are asked for.
#[derive(Debug, Default, Clone)]
pub struct EditArgs {
    pub id: Option<String>,
    pub field: Option<EditField>,
    /// New title, keywords or content, skipping the prompt or editor.
    pub value: Option<String>,
}

// =============================================================================
// Post management
// =============================================================================

/// Create a post and return its id.
pub fn create(
    ctx: &Context,
    doc: &mut Document,
    ui: &mut dyn Interaction,
    args: CreateArgs,
) -> Result<String, CommandError> {
    let title = match args.title {
        Some(title) => title,
        None => ui.prompt("blog title", "")?,
    };
    let title = title.trim();
    if title.is_empty() {
        return Err(CommandError::EmptyTitle);
    }
    let id = generate_slug(title, &doc.blogs)?;

    let content = match args.content_file {
        Some(path) => fs::read_to_string(path)?,
        None => edit_draft(ctx, ui, &id, "")?,
    };
    if content.trim().is_empty() {
        return Err(CommandError::EmptyContent);
    }

    let keywords = match args.keywords {
        Some(keywords) => keywords,
        None => ui.prompt("keywords (separated by spaces)", "")?,
    };

    doc.blogs.insert(Post::new(
        id.clone(),
        title,
        content,
        keywords.trim(),
        now_timestamp(),
    ));
    ctx.log("INFO", &format!("Created blog {id:?}"));
    Ok(id)
}

/// Print every post to stdout.
pub fn list(doc: &Document) -> Result<(), CommandError> {
    if doc.blogs.is_empty() {
        return Err(CommandError::NoPosts("list"));
    }
    output::print_post_listing(&doc.blogs);
    Ok(())
}

/// Remove a post and return it.
pub fn remove(
    ctx: &Context,
    doc: &mut Document,
    ui: &mut dyn Interaction,
    id: Option<String>,
) -> Result<Post, CommandError> {
    if doc.blogs.is_empty() {
        return Err(CommandError::NoPosts("remove"));
    }
    let id = resolve_post_id(doc, ui, id)?;
    let post = doc
        .blogs
        .remove(&id)
        .ok_or_else(|| CommandError::UnknownPost(id.clone()))?;
    ctx.log("INFO", &format!("Removed blog {id:?}"));
    Ok(post)
}

/// Change the title, keywords or content of a post. The id never changes.
pub fn edit(
    ctx: &Context,
    doc: &mut Document,
    ui: &mut dyn Interaction,
    args: EditArgs,
) -> Result<(), CommandError> {
    if doc.blogs.is_empty() {
        return Err(CommandError::NoPosts("edit"));
    }
    let id = resolve_post_id(doc, ui, args.id)?;

    let field = match args.field {
        Some(field) => field,
        None => {
            let choices: Vec<String> = EditField::ALL
                .iter()
                .map(|f| f.as_str().to_string())
                .collect();
            let picked = ui
                .pick("What to edit: ", &choices)?
                .ok_or(CommandError::NothingSelected)?;
            EditField::parse(&picked).ok_or(CommandError::NothingSelected)?
        }
    };

    let post = doc
        .blogs
        .get(&id)
        .ok_or_else(|| CommandError::UnknownPost(id.clone()))?;

    let (title, keywords, content) = match field {
        EditField::Quit => return Ok(()),
        EditField::Title => {
            let title = match args.value {
                Some(value) => value,
                None => ui.prompt("edit title", &post.title)?,
            };
            if title.trim().is_empty() {
                return Err(CommandError::EmptyTitle);
            }
            (Some(title.trim().to_string()), None, None)
        }
        EditField::Keywords => {
            let keywords = match args.value {
                Some(value) => value,
                None => ui.prompt("edit keywords", &post.keywords)?,
            };
            if keywords.trim().is_empty() {
                return Err(CommandError::EmptyKeywords);
            }
            (None, Some(keywords.trim().to_string()), None)
        }
        EditField::Content => {
            let content = match args.value {
                Some(value) => value,
                None => edit_draft(ctx, ui, &id, &post.content)?,
            };
            if content.trim().is_empty() {
                return Err(CommandError::EmptyContent);
            }
            (None, None, Some(content))
        }
    };

    let post = doc
        .blogs
        .get_mut(&id)
        .ok_or_else(|| CommandError::UnknownPost(id.clone()))?;
    if let Some(title) = title {
        post.title = title;
    }
    if let Some(keywords) = keywords {
        post.keywords = keywords;
    }
    if let Some(content) = content {
        post.content = content;
    }
    ctx.log("INFO", &format!("Edited {} of blog {id:?}", field.as_str()));
    Ok(())
}

/// Check an explicit id, or let the user pick a post (newest first).
pub fn resolve_post_id(
    doc: &Document,
    ui: &mut dyn Interaction,
    id: Option<String>,
) -> Result<String, CommandError> {
    let id = match id {
        Some(id) => id,
        None => {
            let choices: Vec<String> = doc
                .blogs
                .iter()
                .rev()
                .map(|p| format!("{} | {:?}", p.id, p.title))
                .collect();
            let picked = ui
                .pick("Pick blog: ", &choices)?
                .ok_or(CommandError::NothingSelected)?;
            picked
                .split_whitespace()
                .next()
                .ok_or(CommandError::NothingSelected)?
                .to_string()
        }
    };

    if !doc.blogs.contains(&id) {
        return Err(CommandError::UnknownPost(id));
    }
    Ok(id)
}

/// Write `initial` to the draft file of `id`, open the editor, and return
/// what the user saved. The draft is removed afterwards.
fn edit_draft(
    ctx: &Context,
    ui: &mut dyn Interaction,
    id: &str,
    initial: &str,
) -> Result<String, CommandError> {
    let draft = ctx.draft_path(id);
    fs::write(&draft, initial)?;
    ui.edit(&draft)?;
    let content = fs::read_to_string(&draft)?;
    fs::remove_file(&draft)?;
    Ok(content)
}

// =============================================================================
// Site generation
// =============================================================================

pub fn build(ctx: &Context, doc: &Document) -> Result<(), CommandError> {
    generate::build(ctx, doc)?;
    Ok(())
}

pub fn css(ctx: &Context) -> Result<(), CommandError> {
    minify::build_css(ctx)?;
    Ok(())
}

pub fn generate_metadata(ctx: &Context, doc: &mut Document) -> Result<(), CommandError> {
    metadata::generate_metadata(ctx, doc)?;
    Ok(())
}

/// Every generated file under the site root that `clean` removes.
pub fn generated_paths(ctx: &Context, doc: &Document) -> Vec<PathBuf> {
    let mut paths = vec![
        ctx.history_path(),
        ctx.path(&doc.config.blog_dir),
        ctx.path("index.html"),
        ctx.path(HASH_FILENAME),
        ctx.path(MANIFEST_FILENAME),
    ];
    paths.extend(minified_files(&ctx.path("content")));
    paths.extend(minified_files(&ctx.path(FONTS_DIR)));
    paths.retain(|p| p.exists());
    paths
}

/// `*.min.*` files directly inside `dir`.
fn minified_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.contains(".min."))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Remove generated files and reset the prompt history.
pub fn clean(ctx: &Context, doc: &Document) -> Result<(), CommandError> {
    for path in generated_paths(ctx, doc) {
        ctx.log("REMOVE", &format!("Removing {:?}", path.display().to_string()));
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    fs::write(ctx.history_path(), "")?;
    Ok(())
}

/// clean → css → build → metadata, stopping at the first failure.
pub fn static_site(ctx: &Context, doc: &mut Document) -> Result<(), CommandError> {
    let steps: [(&str, fn(&Context, &mut Document) -> Result<(), CommandError>); 4] = [
        ("Cleaning up", |ctx: &Context, doc: &mut Document| clean(ctx, doc)),
        ("Building CSS", |ctx: &Context, _: &mut Document| css(ctx)),
        ("Building static site", |ctx: &Context, doc: &mut Document| build(ctx, doc)),
        ("Generating metadata", generate_metadata),
    ];

    for (label, step) in steps {
        ctx.log("STATIC", &format!("{label}..."));
        if let Err(err) = step(ctx, doc) {
            ctx.log(output::ERROR, &err.to_string());
            return Err(CommandError::StaticFailed(Box::new(err)));
        }
    }
    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

/// Write the stock document, asking first when one exists (unless `force`).
///
/// Returns whether the file was written.
pub fn gen_config(
    ctx: &Context,
    ui: &mut dyn Interaction,
    force: bool,
) -> Result<bool, CommandError> {
    let path = ctx.document_path();
    if path.exists() && !force && !ui.confirm("Do you want to overwrite config", false)? {
        ctx.log("INFO", "Not overwriting config");
        return Ok(false);
    }

    ctx.log("INFO", "Making new config...");
    Document::stock().save(&path, !ctx.ci)?;
    Ok(true)
}
