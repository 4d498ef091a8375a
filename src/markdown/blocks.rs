//! Top-level block tree over the pulldown-cmark event stream.
//!
//! pulldown-cmark produces a flat stream of events. The heading pass only
//! cares about the *direct children* of the document, so the stream is
//! grouped into one [`Block`] per top-level element: headings keep their
//! inline content separately, everything else keeps its raw events untouched
//! (headings nested in lists or blockquotes stay inside those blocks).

use super::anchors::link_anchors;
use maud::html;
use pulldown_cmark::{Event, HeadingLevel, Tag, TagEnd, html as md_html};

/// One top-level element of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Block<'a> {
    /// A heading that has not been through the heading pass yet.
    Heading {
        level: HeadingLevel,
        content: Vec<Event<'a>>,
    },
    /// A heading wrapped with its anchor id and permalink.
    Anchored(AnchoredHeading<'a>),
    /// Any other block, as the raw events between its start and end tags.
    Other(Vec<Event<'a>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredHeading<'a> {
    pub level: HeadingLevel,
    pub id: String,
    /// Inline events of the original heading.
    pub content: Vec<Event<'a>>,
}

/// Group an event stream into top-level blocks.
pub fn parse_blocks<'a>(events: impl IntoIterator<Item = Event<'a>>) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut current: Vec<Event<'a>> = Vec::new();
    let mut heading: Option<HeadingLevel> = None;
    let mut depth = 0usize;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, .. }) if depth == 0 => {
                heading = Some(level);
                depth += 1;
            }
            Event::End(TagEnd::Heading(_)) if depth == 1 && heading.is_some() => {
                depth -= 1;
                if let Some(level) = heading.take() {
                    blocks.push(Block::Heading {
                        level,
                        content: std::mem::take(&mut current),
                    });
                }
            }
            Event::Start(tag) => {
                depth += 1;
                current.push(Event::Start(tag));
            }
            Event::End(tag) => {
                depth = depth.saturating_sub(1);
                current.push(Event::End(tag));
                if depth == 0 {
                    blocks.push(Block::Other(std::mem::take(&mut current)));
                }
            }
            other => {
                current.push(other);
                if depth == 0 {
                    blocks.push(Block::Other(std::mem::take(&mut current)));
                }
            }
        }
    }

    if !current.is_empty() {
        blocks.push(Block::Other(current));
    }
    blocks
}

/// Plain text of a heading: text runs and code spans, concatenated.
pub fn plain_text(content: &[Event<'_>]) -> String {
    content
        .iter()
        .filter_map(|event| match event {
            Event::Text(text) | Event::Code(text) => Some(text.as_ref()),
            _ => None,
        })
        .collect()
}

/// Serialize blocks to HTML, applying the `<#id>` link syntax to inline text.
pub fn to_html(blocks: Vec<Block<'_>>) -> String {
    let mut events = Vec::new();

    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                events.push(Event::Start(Tag::Heading {
                    level,
                    id: None,
                    classes: Vec::new(),
                    attrs: Vec::new(),
                }));
                events.extend(link_anchors(content));
                events.push(Event::End(TagEnd::Heading(level)));
            }
            Block::Anchored(heading) => events.extend(anchored_events(heading)),
            Block::Other(raw) => events.extend(link_anchors(raw)),
        }
    }

    let mut out = String::new();
    md_html::push_html(&mut out, events.into_iter());
    out
}

/// A wrapped heading as events: the permalink wrapper is raw HTML, the heading
/// itself goes through the same writer as the rest of the document.
fn anchored_events(heading: AnchoredHeading<'_>) -> Vec<Event<'_>> {
    let AnchoredHeading { level, id, content } = heading;
    let permalink = html! {
        a href={ "#" (id) } aria-hidden="true" focusable="false" tabindex="-1" { "#" }
    };
    let opening = format!(
        "<div data-pl=\"\" style=\"font-size:{}em\">{}\n",
        font_size_em(level),
        permalink.into_string()
    );

    let mut events = vec![
        Event::Html(opening.into()),
        Event::Start(Tag::Heading {
            level,
            id: Some(id.into()),
            classes: Vec::new(),
            attrs: Vec::new(),
        }),
    ];
    events.extend(link_anchors(content));
    events.push(Event::End(TagEnd::Heading(level)));
    events.push(Event::Html("</div>\n".into()));
    events
}

/// Wrapper font size for a heading level, in `em`.
///
/// Base sizes (h2 1.32 down to h6 0.76) plus 0.10, printed with two decimals
/// and trimmed of trailing zeros and a trailing point.
pub fn font_size_em(level: HeadingLevel) -> String {
    let base = match level {
        HeadingLevel::H1 | HeadingLevel::H2 => 1.32,
        HeadingLevel::H3 => 1.15,
        HeadingLevel::H4 => 1.0,
        HeadingLevel::H5 => 0.87,
        HeadingLevel::H6 => 0.76,
    };
    let formatted = format!("{:.2}", base + 0.1);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Parser, TextMergeStream};

    fn blocks(source: &str) -> Vec<Block<'_>> {
        parse_blocks(TextMergeStream::new(Parser::new(source)))
    }

    #[test]
    fn groups_top_level_elements() {
        let parsed = blocks("# One\n\nSome text.\n\n- a\n- b\n\n## Two\n");
        assert_eq!(parsed.len(), 4);
        assert!(matches!(parsed[0], Block::Heading { level: HeadingLevel::H1, .. }));
        assert!(matches!(parsed[1], Block::Other(_)));
        assert!(matches!(parsed[2], Block::Other(_)));
        assert!(matches!(parsed[3], Block::Heading { level: HeadingLevel::H2, .. }));
    }

    #[test]
    fn nested_headings_stay_inside_their_block() {
        let parsed = blocks("> # Quoted\n> text\n");
        assert_eq!(parsed.len(), 1);
        assert!(matches!(parsed[0], Block::Other(_)));
    }

    #[test]
    fn standalone_events_are_their_own_block() {
        let parsed = blocks("para\n\n---\n\nmore\n");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1], Block::Other(vec![Event::Rule]));
    }

    #[test]
    fn plain_text_joins_text_and_code() {
        let parsed = blocks("## Using `cargo` *well*\n");
        let Block::Heading { content, .. } = &parsed[0] else {
            panic!("expected a heading, got {:?}", parsed[0]);
        };
        assert_eq!(plain_text(content), "Using cargo well");
    }

    #[test]
    fn unrewritten_blocks_serialize_like_pulldown() {
        let source = "# Title\n\nHello *there*.\n";
        let html = to_html(blocks(source));
        assert_eq!(html, "<h1>Title</h1>\n<p>Hello <em>there</em>.</p>\n");
    }

    #[test]
    fn font_sizes_per_level() {
        assert_eq!(font_size_em(HeadingLevel::H2), "1.42");
        assert_eq!(font_size_em(HeadingLevel::H3), "1.25");
        assert_eq!(font_size_em(HeadingLevel::H4), "1.1");
        assert_eq!(font_size_em(HeadingLevel::H5), "0.97");
        assert_eq!(font_size_em(HeadingLevel::H6), "0.86");
    }

    #[test]
    fn anchored_heading_markup() {
        let heading = AnchoredHeading {
            level: HeadingLevel::H3,
            id: "setup".to_string(),
            content: vec![Event::Text("Setup".into())],
        };
        let html = to_html(vec![Block::Anchored(heading)]);
        assert_eq!(
            html,
            concat!(
                r#"<div data-pl="" style="font-size:1.25em">"#,
                r##"<a href="#setup" aria-hidden="true" focusable="false" tabindex="-1">#</a>"##,
                "\n",
                r#"<h3 id="setup">Setup</h3>"#,
                "\n</div>\n"
            )
        );
    }

    #[test]
    fn anchored_heading_id_is_escaped() {
        let heading = AnchoredHeading {
            level: HeadingLevel::H2,
            id: "a\"b".to_string(),
            content: vec![Event::Text("x".into())],
        };
        let html = to_html(vec![Block::Anchored(heading)]);
        assert!(html.contains(r#"<h2 id="a&quot;b">"#), "got {html}");
        assert!(html.contains(r##"href="#a&quot;b""##), "got {html}");
    }
}
