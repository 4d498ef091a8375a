//! Markdown rendering for post bodies.
//!
//! ```text
//! source ──pulldown-cmark──▶ events ──group──▶ blocks ──headings──▶ blocks ──serialize──▶ HTML
//!                                                                        (<#id> links applied)
//! ```
//!
//! - [`blocks`]: groups the event stream into top-level blocks and back to HTML.
//! - [`headings`]: demotes `h1`, assigns per-document anchor ids, wraps headings.
//! - [`anchors`]: the `<#id>` in-page link shorthand.
//!
//! Each call to [`render_body`] owns its own anchor id registry, so posts can
//! be rendered on parallel workers.

pub mod anchors;
pub mod blocks;
pub mod headings;

use crate::slug::SlugError;
use pulldown_cmark::{Options, Parser, TextMergeStream};

/// A rendered post body.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBody {
    pub html: String,
    /// Heading anchor ids in document order.
    pub anchor_ids: Vec<String>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_SUPERSCRIPT
        | Options::ENABLE_SUBSCRIPT
}

/// Render a markdown post body to HTML.
pub fn render_body(source: &str) -> Result<RenderedBody, SlugError> {
    let events = TextMergeStream::new(Parser::new_ext(source, options()));
    let rewritten = headings::rewrite_headings(blocks::parse_blocks(events))?;
    let html = blocks::to_html(rewritten.blocks);

    Ok(RenderedBody {
        html: focusable_blocks(&html),
        anchor_ids: rewritten.ids,
    })
}

/// Make code blocks and quotes reachable with the keyboard.
fn focusable_blocks(html: &str) -> String {
    html.replace("<pre>", r#"<pre focusable="true" role="code" tabindex="0">"#)
        .replace("<blockquote>", r#"<blockquote focusable="true" tabindex="0">"#)
}
