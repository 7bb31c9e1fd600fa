//! URL/DOM-safe slugs for heading anchors and post addresses.
//!
//! The renderer and the metadata extractor share [`Slugger`], so the ids
//! written into markup and the ids listed in a table of contents always
//! agree.

use std::collections::{HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Anchor used for headings that produce no slug characters.
pub const FALLBACK_ANCHOR: &str = "section";

/// How repeated heading slugs are handled within one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlugPolicy {
    /// Append `-2`, `-3`, ... so every anchor is unique.
    #[default]
    Deduplicate,
    /// Keep duplicates as-is (anchors may collide).
    Preserve,
}

/// Convert text to a slug matching `[a-z0-9]+(-[a-z0-9]+)*`, or an empty
/// string when the text has no usable characters.
///
/// Letters are lower-cased and reduced to their ASCII base (`é` -> `e`);
/// characters other than letters, digits, whitespace and hyphens are
/// dropped; whitespace and hyphen runs become a single hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(lower);
            } else if lower.is_whitespace() || lower == '-' {
                pending_separator = true;
            }
        }
    }

    slug
}

/// Stateful anchor generator for one document.
#[derive(Debug, Clone, Default)]
pub struct Slugger {
    policy: SlugPolicy,
    used: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl Slugger {
    /// Create a slugger with the given collision policy.
    pub fn new(policy: SlugPolicy) -> Self {
        Self {
            policy,
            used: HashSet::new(),
            suffixes: HashMap::new(),
        }
    }

    /// Produce the anchor for the next heading with the given text.
    pub fn anchor_for(&mut self, heading: &str) -> String {
        let mut base = slugify(heading);
        if base.is_empty() {
            base = FALLBACK_ANCHOR.to_string();
        }

        if self.policy == SlugPolicy::Preserve || self.used.insert(base.clone()) {
            return base;
        }

        let suffix = self.suffixes.entry(base.clone()).or_insert(1);
        loop {
            *suffix += 1;
            let candidate = format!("{}-{}", base, suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
