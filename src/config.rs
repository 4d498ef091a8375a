//! Site configuration.
//!
//! The site settings live at the top level of the store document
//! (`blog.json`), next to the `blogs` object. Keys are kebab-case and all
//! optional: user values are merged on top of the stock defaults, so a
//! document only needs the keys it wants to override.
//!
//! ```json
//! {
//!     "editor-command": "vim -- %s",
//!     "blog-dir": "b",
//!     "git-url": "/git",
//!     "default-keywords": ["website", "blog", "opinion", "article"],
//!     "page-title": "Blog",
//!     "page-description": "My blog page",
//!     "colourscheme-type": "dark",
//!     "short-name": "Blog",
//!     "home-keywords": ["blog", "foss", "linux"],
//!     "base-homepage": "/",
//!     "meta-icons": [{"src": "/favicon.ico", "sizes": "128x128", "type": "image/png"}],
//!     "theme-colour": "#f9f6e8",
//!     "background-colour": "#262220",
//!     "full-name": "Anonymous",
//!     "locale": "en_GB",
//!     "home-page-header": "My blogs",
//!     "comment-url": "/c",
//!     "blogs": {}
//! }
//! ```
//!
//! `editor-command` is run through the shell with `%s` replaced by the path of
//! the draft being edited. `blog-dir` is removed and recreated on every build,
//! so it must be a relative path below the site root.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Global site settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Shell command used to edit drafts; `%s` is replaced by the file path.
    pub editor_command: String,
    /// Output directory for post pages, relative to the site root.
    pub blog_dir: String,
    pub git_url: String,
    /// Keywords appended to every page's keyword list.
    pub default_keywords: Vec<String>,
    pub page_title: String,
    pub page_description: String,
    /// `color-scheme` meta value (`dark`, `light`, `light dark`).
    pub colourscheme_type: String,
    /// Short app name for the web manifest.
    pub short_name: String,
    /// Keywords of the home page.
    pub home_keywords: Vec<String>,
    /// Target of the "website" link on post pages.
    pub base_homepage: String,
    pub meta_icons: Vec<Icon>,
    pub theme_colour: String,
    pub background_colour: String,
    /// Author name for the `author` meta tag.
    pub full_name: String,
    pub locale: String,
    pub home_page_header: String,
    pub comment_url: String,
}

/// A web manifest icon entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

fn default_editor_command() -> String {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    format!("{editor} -- %s")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            editor_command: default_editor_command(),
            blog_dir: "b".to_string(),
            git_url: "/git".to_string(),
            default_keywords: strings(&["website", "blog", "opinion", "article"]),
            page_title: "Blog".to_string(),
            page_description: "My blog page".to_string(),
            colourscheme_type: "dark".to_string(),
            short_name: "Blog".to_string(),
            home_keywords: strings(&["blog", "foss", "linux"]),
            base_homepage: "/".to_string(),
            meta_icons: vec![Icon {
                src: "/favicon.ico".to_string(),
                sizes: "128x128".to_string(),
                mime_type: "image/png".to_string(),
            }],
            theme_colour: "#f9f6e8".to_string(),
            background_colour: "#262220".to_string(),
            full_name: "Anonymous".to_string(),
            locale: "en_GB".to_string(),
            home_page_header: "My blogs".to_string(),
            comment_url: "/c".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate values the build relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.editor_command.contains("%s") {
            return Err(ConfigError::Validation(
                "editor-command must contain %s".into(),
            ));
        }
        let blog_dir = Path::new(&self.blog_dir);
        if self.blog_dir.trim().is_empty() {
            return Err(ConfigError::Validation("blog-dir must not be empty".into()));
        }
        if !blog_dir
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ConfigError::Validation(format!(
                "blog-dir must be a relative path below the site root, got {:?}",
                self.blog_dir
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Merging and resolution
// =============================================================================

/// The stock defaults as a JSON object, the base layer for user overrides.
pub fn stock_defaults_value() -> serde_json::Value {
    serde_json::to_value(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Objects are merged key-by-key (overlay keys override base keys).
/// - Non-object values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_json(base: serde_json::Value, overlay: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge a sparse user document over the stock defaults.
pub fn with_defaults(user: serde_json::Value) -> serde_json::Value {
    merge_json(stock_defaults_value(), user)
}

/// Deserialize and validate a config from a (merged) JSON value.
pub fn resolve_config(value: serde_json::Value) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = serde_json::from_value(with_defaults(value))?;
    config.validate()?;
    Ok(config)
}
