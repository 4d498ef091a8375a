//! The `<#id>` shorthand for in-page links.
//!
//! `Jump to <#top> now` renders as `Jump to <a href="#top">#top</a> now`.
//! CommonMark treats `<#top>` as literal text (it is neither an autolink nor
//! an HTML tag), so the rewrite runs over text events after parsing. Because
//! it only replaces text events, surrounding emphasis and links are kept:
//! `**<#top>**` is still bold.
//!
//! Code blocks, code spans and the text of existing links are left alone.

use maud::html;
use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

static ANCHOR_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(#[^>]*)>").expect("anchor link pattern is valid"));

/// Render one anchor link; `target` is the captured text, leading `#` included.
pub fn anchor_html(target: &str) -> String {
    let target = if target.is_empty() { "#" } else { target };
    html! { a href=(target) { (target) } }.into_string()
}

/// Rewrite `<#id>` occurrences in the text events of `events`.
pub fn link_anchors<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut code_depth = 0usize;
    let mut link_depth = 0usize;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
            Event::End(TagEnd::CodeBlock) => code_depth = code_depth.saturating_sub(1),
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => {
                link_depth = link_depth.saturating_sub(1)
            }
            Event::Text(ref text) if code_depth == 0 && link_depth == 0 => {
                if ANCHOR_LINK.is_match(text) {
                    split_text(text, &mut out);
                    continue;
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn split_text<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for captures in ANCHOR_LINK.captures_iter(text) {
        let (Some(whole), Some(target)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Event::Text(CowStr::from(text[last..whole.start()].to_string())));
        }
        out.push(Event::InlineHtml(CowStr::from(anchor_html(target.as_str()))));
        last = whole.end();
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}
