//! Rendering options and configuration.

use crate::metadata::{MetadataOptions, DEFAULT_WORDS_PER_MINUTE};
use crate::slug::SlugPolicy;

/// Markup substituted for a document that cannot be rendered.
pub const FALLBACK_MARKUP: &str = "<p>Unable to render content.</p>";

/// Options for rendering stored documents to markup.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How repeated heading anchors are handled
    pub slug_policy: SlugPolicy,

    /// Reading speed used for the read-time estimate
    pub words_per_minute: u32,

    /// Markup emitted in place of an undecodable document
    pub fallback_markup: String,

    /// `target` attribute for links that carry none of their own
    pub link_target: Option<String>,

    /// `rel` attribute for links
    pub link_rel: Option<String>,

    /// URL schemes links may use; relative references are always allowed
    pub allowed_schemes: Vec<String>,

    /// Render batches on the rayon thread pool
    pub parallel: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading anchor collision policy.
    pub fn with_slug_policy(mut self, policy: SlugPolicy) -> Self {
        self.slug_policy = policy;
        self
    }

    /// Set the reading speed (at least 1 word per minute).
    pub fn with_words_per_minute(mut self, wpm: u32) -> Self {
        self.words_per_minute = wpm.max(1);
        self
    }

    /// Set the fallback markup.
    pub fn with_fallback_markup(mut self, markup: impl Into<String>) -> Self {
        self.fallback_markup = markup.into();
        self
    }

    /// Set the default link target (`None` omits the attribute).
    pub fn with_link_target(mut self, target: Option<&str>) -> Self {
        self.link_target = target.map(str::to_string);
        self
    }

    /// Set the link `rel` attribute (`None` omits the attribute).
    pub fn with_link_rel(mut self, rel: Option<&str>) -> Self {
        self.link_rel = rel.map(str::to_string);
        self
    }

    /// Replace the list of allowed link schemes.
    pub fn with_allowed_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_schemes = schemes
            .into_iter()
            .map(|s| s.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Disable parallel batch rendering.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Metadata extraction options consistent with these render options.
    pub fn metadata_options(&self) -> MetadataOptions {
        MetadataOptions {
            words_per_minute: self.words_per_minute,
            slug_policy: self.slug_policy,
        }
    }

    /// Check whether a link target is safe to emit.
    pub fn is_allowed_href(&self, href: &str) -> bool {
        let cleaned: String = href
            .chars()
            .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
            .collect();
        if cleaned.is_empty() {
            return false;
        }

        match url_scheme(&cleaned) {
            Some(scheme) => self
                .allowed_schemes
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(scheme)),
            None => true,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            slug_policy: SlugPolicy::Deduplicate,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            fallback_markup: FALLBACK_MARKUP.to_string(),
            link_target: Some("_blank".to_string()),
            link_rel: Some("noopener noreferrer nofollow".to_string()),
            allowed_schemes: ["http", "https", "mailto", "tel"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            parallel: true,
        }
    }
}

/// Extract the scheme of an absolute URL, or `None` for relative references.
fn url_scheme(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let candidate = &url[..colon];
    if candidate.contains(|c: char| matches!(c, '/' | '?' | '#')) {
        return None;
    }
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(candidate)
    } else {
        None
    }
}
