//! HTML site generation.
//!
//! Renders every post and the home page from the store document.
//!
//! ## Output Structure
//!
//! ```text
//! <root>/
//! ├── index.html             # Home page: newest posts first
//! └── b/                     # blog-dir
//!     ├── hello-world/
//!     │   └── index.html     # Post page
//!     └── ...
//! ```
//!
//! `blog-dir` is removed and recreated on every build, so pages of deleted
//! posts do not linger. Posts are rendered on the rayon pool; each render owns
//! its own anchor id registry. Every page is minified before it is written.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Titles, keywords and settings are escaped by maud; only the rendered
//! markdown body is inserted as-is.

use crate::config::SiteConfig;
use crate::context::Context;
use crate::markdown::render_body;
use crate::minify::minify_html;
use crate::slug::SlugError;
use crate::store::{BLOG_VERSION, Document, Post, Posts};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

/// Latest post titles longer than this are cut on the home page.
const LATEST_TITLE_CHARS: usize = 20;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No blogs to build")]
    NoPosts,
    #[error("Markdown error: {0}")]
    Slug(#[from] SlugError),
    #[error("post id {0:?} is not a valid directory name")]
    InvalidId(String),
}

/// `YYYY-MM-DD HH:MM:SS` in UTC for a Unix timestamp in seconds.
pub fn format_time(timestamp: f64) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).clamp(0.0, 999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Cut `text` to `max` chars, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Keywords meta value of a post page: its own keywords, then the defaults.
pub fn post_keywords(post: &Post, config: &SiteConfig) -> String {
    post.keyword_list()
        .chain(config.default_keywords.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keywords meta value of the home page.
pub fn home_keywords(config: &SiteConfig) -> String {
    config
        .home_keywords
        .iter()
        .chain(&config.default_keywords)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Link from the home page to a post page.
fn post_url(config: &SiteConfig, post: &Post) -> String {
    format!("{}/{}", config.blog_dir.trim_end_matches('/'), post.id)
}

fn is_single_component(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Per-page values of the shared `<head>`.
struct PageMeta<'a> {
    title: &'a str,
    description: &'a str,
    og_type: &'a str,
    keywords: &'a str,
}

/// Renders the base HTML document structure
fn base_document(config: &SiteConfig, meta: &PageMeta, extra_head: Markup, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta http-equiv="X-UA-Compatible" content="IE=edge";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta property="og:locale" content=(config.locale);
                meta name="color-scheme" content=(config.colourscheme_type);
                meta name="author" content=(config.full_name);
                meta name="keywords" content=(meta.keywords);
                meta name="robots" content="follow, index, max-snippet:-1, max-video-preview:-1, max-image-preview:large";
                meta name="generator" content={ "penwright " (env!("CARGO_PKG_VERSION")) " (blog version " (BLOG_VERSION) ")" };
                link rel="stylesheet" href="/content/styles.min.css" referrerpolicy="no-referrer" type="text/css" hreflang="en";
                title { (meta.title) }
                meta name="description" content=(meta.description);
                meta property="og:type" content=(meta.og_type);
                (extra_head)
            }
            body {
                (body)
            }
        }
    }
}

fn separator() -> Markup {
    html! { span role="separator" aria-hidden="true" { "|" } }
}

fn skip_link() -> Markup {
    html! { a role="menuitem" aria-label="jump to the main content" href="#main" { "skip" } }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a post page around an already rendered markdown body.
pub fn render_post_page(post: &Post, body_html: &str, config: &SiteConfig) -> Markup {
    let time = format_time(post.created_at);
    let title = format!("{} -> {}", config.page_title, post.title);
    let description = format!("Blog on {} GMT -- {}", time, post.title);
    let keywords = post_keywords(post, config);
    let meta = PageMeta {
        title: &title,
        description: &description,
        og_type: "article",
        keywords: &keywords,
    };

    let content = html! {
        main id="blog-content" {
            header role="group" {
                h1 role="heading" aria-level="1" { (post.title) }
                nav id="info-bar" role="menubar" {
                    (skip_link())
                    (separator())
                    span role="menuitem" { time { (time) } " GMT" }
                    (separator())
                    a role="menuitem" href="/" { "home" }
                    (separator())
                    a role="menuitem" href=(config.comment_url) { "comment" }
                    (separator())
                    a role="menuitem" href=(config.base_homepage) { "website" }
                    (separator())
                    a role="menuitem" href=(config.git_url) { "git" }
                    hr aria-hidden="true" role="separator";
                }
            }
            article id="main" {
                (PreEscaped(body_html))
            }
        }
    };

    base_document(config, &meta, html! {}, content)
}

/// Renders the home page: info bar with the latest post, then every post
/// newest first.
pub fn render_index(posts: &Posts, config: &SiteConfig) -> Markup {
    let keywords = home_keywords(config);
    let meta = PageMeta {
        title: &config.page_title,
        description: &config.page_description,
        og_type: "website",
        keywords: &keywords,
    };
    let manifest = html! {
        link rel="manifest" href="/manifest.json" referrerpolicy="no-referrer" type="application/json" hreflang="en";
    };

    let content = html! {
        header {
            h1 role="heading" aria-level="1" { (config.home_page_header) }
            nav id="info-bar" role="navigation" {
                p role="menubar" {
                    (skip_link())
                    (separator())
                    @if let Some(latest) = posts.latest() {
                        span role="menuitem" {
                            "latest update: " time { (format_time(latest.created_at)) } " GMT"
                        }
                        (separator())
                        span role="menuitem" {
                            "latest blog: "
                            a href=(post_url(config, latest)) { (truncate(&latest.title, LATEST_TITLE_CHARS)) }
                        }
                        (separator())
                    }
                    a role="menuitem" href=(config.git_url) { "git" }
                }
                hr aria-hidden="true" role="separator";
            }
        }
        main id="main" {
            ol reversed aria-label="latest blogs" {
                @for post in posts.iter().rev() {
                    li { a href=(post_url(config, post)) { (post.title) } }
                }
            }
        }
    };

    base_document(config, &meta, manifest, content)
}

// ============================================================================
// Build
// ============================================================================

/// Render every post and the home page under the site root.
pub fn build(ctx: &Context, doc: &Document) -> Result<(), GenerateError> {
    if doc.blogs.is_empty() {
        return Err(GenerateError::NoPosts);
    }
    if let Some(bad) = doc.blogs.iter().find(|p| !is_single_component(&p.id)) {
        return Err(GenerateError::InvalidId(bad.id.clone()));
    }

    let blog_dir = ctx.path(&doc.config.blog_dir);
    if blog_dir.exists() {
        fs::remove_dir_all(&blog_dir)?;
    }
    fs::create_dir_all(&blog_dir)?;

    ctx.log("INFO", "Building blogs...");
    doc.blogs
        .as_slice()
        .par_iter()
        .try_for_each(|post| build_post(ctx, &doc.config, &blog_dir, post))?;

    ctx.log("INFO", "Building blog index...");
    let index = minify_html(&render_index(&doc.blogs, &doc.config).into_string());
    fs::write(ctx.path("index.html"), index)?;
    Ok(())
}

fn build_post(
    ctx: &Context,
    config: &SiteConfig,
    blog_dir: &Path,
    post: &Post,
) -> Result<(), GenerateError> {
    if let Some(warning) = post.version_mismatch() {
        ctx.log("WARNING", &warning);
    }

    let body = render_body(&post.content)?;
    let page = render_post_page(post, &body.html, config).into_string();

    ctx.log("MINIFY", &format!("Minifying {:?} HTML", post.id));
    let html = minify_html(&page);

    let dir = blog_dir.join(&post.id);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), html)?;

    ctx.log("BUILD", &format!("Finished building blog {:?}", post.id));
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
