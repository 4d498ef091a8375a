//! HTML and CSS minification.
//!
//! Pages are minified with `minify-html` right before they are written.
//! Stylesheets are minified in place next to their source:
//!
//! ```text
//! content/
//! ├── styles.css          → styles.min.css
//! └── fonts/
//!     ├── inter.css       → inter.min.css
//!     └── inter.min.css   (skipped)
//! ```
//!
//! Missing inputs are skipped, not errors.

use crate::context::Context;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Main stylesheet, relative to the site root.
pub const MAIN_STYLESHEET: &str = "content/styles.css";
/// Directory of font stylesheets, relative to the site root.
pub const FONTS_DIR: &str = "content/fonts";

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to minify {path}: {message}")]
    Css { path: PathBuf, message: String },
}

/// Minify a complete HTML document.
pub fn minify_html(html: &str) -> String {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    String::from_utf8_lossy(&minify_html::minify(html.as_bytes(), &cfg)).into_owned()
}

/// Minify a stylesheet. `path` is only used for the error message.
pub fn minify_css(css: &str, path: &Path) -> Result<String, MinifyError> {
    minifier::css::minify(css)
        .map(|minified| minified.to_string())
        .map_err(|message| MinifyError::Css {
            path: path.to_path_buf(),
            message: message.to_string(),
        })
}

/// `name.css` → `name.min.css`.
pub fn minified_path(path: &Path) -> PathBuf {
    path.with_extension("min.css")
}

fn is_minified(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".min.css"))
}

/// Stylesheets to minify under the site root, main stylesheet first.
pub fn stylesheets(root: &Path) -> Vec<PathBuf> {
    let mut sheets = Vec::new();

    let main = root.join(MAIN_STYLESHEET);
    if main.is_file() {
        sheets.push(main);
    }

    let fonts = root.join(FONTS_DIR);
    if fonts.is_dir() {
        let mut font_sheets: Vec<PathBuf> = WalkDir::new(&fonts)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "css") && !is_minified(p))
            .collect();
        font_sheets.sort();
        sheets.extend(font_sheets);
    }

    sheets
}

/// Minify every stylesheet of the site in parallel.
///
/// Returns the written `.min.css` paths.
pub fn build_css(ctx: &Context) -> Result<Vec<PathBuf>, MinifyError> {
    ctx.log("MINIFY", "Minifying CSS...");

    let written = stylesheets(&ctx.root)
        .par_iter()
        .map(|source| {
            ctx.log("MINIFY", &format!("Minifying {}", source.display()));
            let css = fs::read_to_string(source)?;
            let target = minified_path(source);
            fs::write(&target, minify_css(&css, source)?)?;
            Ok(target)
        })
        .collect::<Result<Vec<_>, MinifyError>>()?;

    ctx.log("MINIFY", "Done minifying CSS");
    Ok(written)
}
