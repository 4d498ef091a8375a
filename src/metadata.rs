//! Site metadata: the web app manifest and the store document hash.
//!
//! - `manifest.json` describes the site as an installable web app, from the
//!   site settings.
//! - `blog_json_hash.txt` holds the SHA-256 of `blog.json` as it is written
//!   back at the end of the run, so clients polling the document can tell
//!   when it changed.

use crate::config::{Icon, SiteConfig};
use crate::context::Context;
use crate::store::{Document, StoreError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use thiserror::Error;

pub const MANIFEST_FILENAME: &str = "manifest.json";
pub const HASH_FILENAME: &str = "blog_json_hash.txt";

const MANIFEST_SCHEMA: &str = "https://json.schemastore.org/web-manifest-combined.json";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Web app manifest.
#[derive(Debug, Serialize)]
pub struct WebManifest<'a> {
    #[serde(rename = "$schema")]
    pub schema: &'a str,
    pub short_name: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub icons: &'a [Icon],
    pub start_url: &'a str,
    pub display: &'a str,
    pub theme_color: &'a str,
    pub background_color: &'a str,
}

impl<'a> WebManifest<'a> {
    pub fn from_config(config: &'a SiteConfig) -> Self {
        Self {
            schema: MANIFEST_SCHEMA,
            short_name: &config.short_name,
            name: &config.page_title,
            description: &config.page_description,
            icons: &config.meta_icons,
            start_url: ".",
            display: "standalone",
            theme_color: &config.theme_colour,
            background_color: &config.background_colour,
        }
    }
}

/// SHA-256 of `bytes` as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write `manifest.json` and `blog_json_hash.txt`.
///
/// The hash covers the document exactly as it will be persisted (posts
/// sorted, CI-dependent formatting), so `doc` is sorted in the process.
pub fn generate_metadata(ctx: &Context, doc: &mut Document) -> Result<(), MetadataError> {
    ctx.log("GENERATE", &format!("Generating {MANIFEST_FILENAME}..."));
    let manifest = serde_json::to_string(&WebManifest::from_config(&doc.config))?;
    fs::write(ctx.path(MANIFEST_FILENAME), manifest)?;

    ctx.log("HASH", "Generating hash for 'blog.json'");
    let persisted = doc.to_json(!ctx.ci)?;
    fs::write(ctx.path(HASH_FILENAME), hash_bytes(&persisted))?;
    Ok(())
}
