//! Heading rewrite pass.
//!
//! Runs over the top-level blocks of one post body:
//!
//! - `h1` is demoted to `h2`; the page title is the only `h1` on a page.
//! - every heading gets a slug id, unique within the document, generated from
//!   its text with the ids assigned earlier in the pass as the taken set.
//! - the heading is replaced in place by a wrapper carrying a font size scaled
//!   by level and a `#` permalink to the id.
//!
//! Already wrapped headings are not headings any more, so running the pass on
//! its own output leaves them alone; their ids still count as taken.

use super::blocks::{AnchoredHeading, Block, plain_text};
use crate::slug::{SlugError, generate_slug_with};
use pulldown_cmark::HeadingLevel;
use rand::Rng;

/// Output of the heading pass.
#[derive(Debug)]
pub struct Rewritten<'a> {
    pub blocks: Vec<Block<'a>>,
    /// Every anchor id in the document, in document order.
    pub ids: Vec<String>,
}

pub fn rewrite_headings(blocks: Vec<Block<'_>>) -> Result<Rewritten<'_>, SlugError> {
    rewrite_headings_with(blocks, &mut rand::thread_rng())
}

pub fn rewrite_headings_with<'a, R>(
    blocks: Vec<Block<'a>>,
    rng: &mut R,
) -> Result<Rewritten<'a>, SlugError>
where
    R: Rng + ?Sized,
{
    let mut ids: Vec<String> = blocks
        .iter()
        .filter_map(|block| match block {
            Block::Anchored(heading) => Some(heading.id.clone()),
            _ => None,
        })
        .collect();

    let mut rewritten = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                let id = generate_slug_with(&plain_text(&content), &ids, &mut *rng)?;
                ids.push(id.clone());
                rewritten.push(Block::Anchored(AnchoredHeading {
                    level: demote(level),
                    id,
                    content,
                }));
            }
            other => rewritten.push(other),
        }
    }

    Ok(Rewritten {
        blocks: rewritten,
        ids,
    })
}

fn demote(level: HeadingLevel) -> HeadingLevel {
    match level {
        HeadingLevel::H1 => HeadingLevel::H2,
        other => other,
    }
}
