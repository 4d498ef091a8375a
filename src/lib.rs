//! # Penwright
//!
//! A small static blog generator. Every post lives in one JSON document,
//! `blog.json`, next to the site settings; the generator renders them through
//! a Markdown pipeline into minified HTML pages plus a home page.
//!
//! # Workflow
//!
//! ```text
//! penwright new        # prompt for a title, write the post in $EDITOR
//! penwright edit       # pick a post, change its title, keywords or content
//! penwright static     # clean → css → build → metadata
//! ```
//!
//! The site root (the current directory, or `--root`) ends up holding:
//!
//! ```text
//! blog.json              # posts + settings (source of truth)
//! index.html             # home page
//! b/<id>/index.html      # one page per post
//! content/styles.min.css # minified stylesheets
//! manifest.json          # web app manifest
//! blog_json_hash.txt     # SHA-256 of blog.json
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`slug`] | Collision-avoiding identifiers for posts and heading anchors |
//! | [`markdown`] | Markdown → HTML with heading anchors and `<#id>` links |
//! | [`store`] | Posts and the `blog.json` document: encoding, ordering, persistence |
//! | [`config`] | Site settings: stock defaults, sparse overrides, validation |
//! | [`generate`] | Post and home pages rendered with Maud, built in parallel |
//! | [`minify`] | HTML and stylesheet minification |
//! | [`metadata`] | Web app manifest and store document hash |
//! | [`interact`] | Prompts, the `fzf` picker and the external editor |
//! | [`commands`] | The operations behind each CLI subcommand |
//! | [`context`] | Site root and CI mode shared by all commands |
//! | [`output`] | Status lines and post listing formatting |
//!
//! # Design Decisions
//!
//! ## One Document
//!
//! Posts and settings share `blog.json`. Titles and bodies are base64 so the
//! document stays one line per field whatever the post contains; keywords are
//! HTML-escaped. The object order of `blogs` is the post order, and it is
//! re-sorted by creation time every time the document is written.
//!
//! ## Stable Ids
//!
//! A post id is derived from its title once, at creation, and never changes.
//! Renaming a post keeps its URL. Collisions get random digits appended until
//! the id is free (see [`slug::generate_slug`]).
//!
//! ## Heading Anchors
//!
//! Top-level headings are demoted from `h1` (the page title is the only `h1`),
//! given an id unique within the post, and wrapped with a permalink. Headings
//! can be linked from the text with `<#id>`.
//!
//! ## CI Mode
//!
//! With `CI` set, only `ERROR` lines are printed and `blog.json` is written
//! compactly.

pub mod commands;
pub mod config;
pub mod context;
pub mod generate;
pub mod interact;
pub mod markdown;
pub mod metadata;
pub mod minify;
pub mod output;
pub mod slug;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
