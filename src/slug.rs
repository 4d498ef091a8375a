//! Slug generation for post ids and heading anchors.
//!
//! A slug is derived from free text by collapsing every run of whitespace
//! or ASCII punctuation into a single `-`, lower-casing, and stripping
//! trailing dashes:
//!
//! - `"Hello, World!"` → `hello-world`
//! - `"  Rust -- the good parts "` → `rust-the-good-parts`
//! - `"Café au lait"` → `café-au-lait` (non-ASCII passes through)
//!
//! ## Collisions
//!
//! When the normalized text is blank or already taken, a random decimal digit
//! is appended and the candidate is normalized and checked again. The first
//! retry adds a `-` before the digit, later retries append digits directly:
//!
//! ```text
//! intro        taken
//! intro-4      taken
//! intro-47     free → returned
//! ```
//!
//! A title made only of punctuation normalizes to the empty string, so its
//! slug is a bare run of digits (`"???"` → `7`).
//!
//! The loop is capped at [`MAX_SLUG_ATTEMPTS`] candidates; past that the
//! generator gives up with [`SlugError::Exhausted`].

use rand::Rng;
use std::collections::HashSet;
use thiserror::Error;

/// Maximum number of candidates checked before giving up.
pub const MAX_SLUG_ATTEMPTS: usize = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("no free slug for {text:?} after {attempts} attempts")]
    Exhausted { text: String, attempts: usize },
}

/// A collection of slugs already in use.
///
/// Implemented for the usual string sets and for the post store, so the same
/// generator serves post ids and per-document heading anchors.
pub trait SlugSet {
    fn contains_slug(&self, slug: &str) -> bool;
}

impl SlugSet for HashSet<String> {
    fn contains_slug(&self, slug: &str) -> bool {
        self.contains(slug)
    }
}

impl SlugSet for [String] {
    fn contains_slug(&self, slug: &str) -> bool {
        self.iter().any(|s| s == slug)
    }
}

impl SlugSet for Vec<String> {
    fn contains_slug(&self, slug: &str) -> bool {
        self.as_slice().contains_slug(slug)
    }
}

impl<T: SlugSet + ?Sized> SlugSet for &T {
    fn contains_slug(&self, slug: &str) -> bool {
        (**self).contains_slug(slug)
    }
}

/// Unicode whitespace (vertical tab and no-break space included) or ASCII
/// punctuation.
fn is_separator(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_whitespace()
}

/// Normalize text into slug form without any uniqueness check.
///
/// Never emits a leading separator, never two separators in a row, and
/// strips trailing separators after lower-casing.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_separator(c) {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let mut lowered = out.to_lowercase();
    let keep = lowered.trim_end_matches('-').len();
    lowered.truncate(keep);
    lowered
}

/// Generate a slug for `text` that is not in `existing`, using the
/// thread-local RNG for collision digits.
pub fn generate_slug<S>(text: &str, existing: &S) -> Result<String, SlugError>
where
    S: SlugSet + ?Sized,
{
    generate_slug_with(text, existing, &mut rand::thread_rng())
}

/// Generate a slug for `text` that is not in `existing`, drawing collision
/// digits from `rng`.
pub fn generate_slug_with<S, R>(text: &str, existing: &S, rng: &mut R) -> Result<String, SlugError>
where
    S: SlugSet + ?Sized,
    R: Rng + ?Sized,
{
    let mut candidate = normalize(text);

    for attempt in 0..MAX_SLUG_ATTEMPTS {
        if !candidate.trim().is_empty() && !existing.contains_slug(&candidate) {
            return Ok(candidate);
        }
        if attempt == 0 {
            candidate.push('-');
        }
        candidate.push(char::from(b'0' + rng.gen_range(0..10u8)));
        candidate = normalize(&candidate);
    }

    Err(SlugError::Exhausted {
        text: text.to_string(),
        attempts: MAX_SLUG_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    /// RNG whose every digit comes out as `0`.
    fn zeros() -> StepRng {
        StepRng::new(0, 0)
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hello_world() {
        assert_eq!(generate_slug("Hello, World!", &set(&[])).unwrap(), "hello-world");
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(normalize("  Rust -- the   good_parts "), "rust-the-good-parts");
    }

    #[test]
    fn no_leading_separator() {
        assert_eq!(normalize("...leading dots"), "leading-dots");
    }

    #[test]
    fn trailing_separators_stripped() {
        assert_eq!(normalize("Done!!!"), "done");
    }

    #[test]
    fn non_ascii_passes_through_lowercased() {
        assert_eq!(normalize("Café AU Lait"), "café-au-lait");
    }

    #[test]
    fn unicode_whitespace_separates() {
        assert_eq!(normalize("\u{a0}Hello\u{2003}World\u{3000}"), "hello-world");
        assert_eq!(normalize("tab\x0bbed"), "tab-bed");
    }

    #[test]
    fn no_break_space_only_yields_digits() {
        assert_eq!(
            generate_slug_with("\u{a0}\u{a0}", &set(&[]), &mut zeros()).unwrap(),
            "0"
        );
    }

    #[test]
    fn punctuation_only_yields_digits() {
        let slug = generate_slug("???", &set(&[])).unwrap();
        assert!(!slug.is_empty());
        assert!(slug.chars().all(|c| c.is_ascii_digit()), "got {slug:?}");
    }

    #[test]
    fn punctuation_only_drops_the_dash() {
        assert_eq!(generate_slug_with("???", &set(&[]), &mut zeros()).unwrap(), "0");
    }

    #[test]
    fn first_collision_adds_dash_and_digit() {
        let existing = set(&["intro"]);
        assert_eq!(generate_slug_with("Intro", &existing, &mut zeros()).unwrap(), "intro-0");
    }

    #[test]
    fn later_collisions_append_digits_directly() {
        let existing = set(&["intro", "intro-0", "intro-00"]);
        assert_eq!(
            generate_slug_with("Intro", &existing, &mut zeros()).unwrap(),
            "intro-000"
        );
    }

    #[test]
    fn random_collision_suffix_shape() {
        let existing = set(&["intro"]);
        let slug = generate_slug("Intro", &existing).unwrap();
        let suffix = slug.strip_prefix("intro-").expect("dash separated suffix");
        assert_eq!(suffix.len(), 1);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn works_with_vec_registry() {
        let ids = vec!["setup".to_string()];
        let slug = generate_slug("Setup", &ids).unwrap();
        assert_ne!(slug, "setup");
    }

    #[test]
    fn exhaustion_is_an_error() {
        struct Everything;
        impl SlugSet for Everything {
            fn contains_slug(&self, _: &str) -> bool {
                true
            }
        }

        let err = generate_slug_with("taken", &Everything, &mut zeros()).unwrap_err();
        assert_eq!(
            err,
            SlugError::Exhausted {
                text: "taken".to_string(),
                attempts: MAX_SLUG_ATTEMPTS,
            }
        );
    }

    proptest! {
        #[test]
        fn output_is_well_formed(text in ".{0,40}") {
            let slug = generate_slug(&text, &set(&[])).unwrap();
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c == '-' || !is_separator(c)));
            prop_assert!(!slug.contains("--"));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.chars().any(char::is_whitespace));
        }

        #[test]
        fn output_is_never_taken(
            text in "[a-zA-Z ?!]{0,12}",
            existing in prop::collection::hash_set("[a-z0-9-]{0,6}", 0..24),
        ) {
            let slug = generate_slug(&text, &existing).unwrap();
            prop_assert!(!existing.contains(&slug));
        }
    }
}
