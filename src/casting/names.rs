/*!
 * Character name normalization.
 *
 * Cue names come in many shapes: `JASON (V.O.)`, `Jason (CONT'D)`,
 * `OLD MAN (70s)`. The normalized key is what names are compared by; the
 * display form is only ever shown to people.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::IdentityConfig;

/// Voice-over, off-screen and continuation extensions.
static EXTENSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\(\s*(?:v\.?\s*o\.?|o\.?\s*s\.?|o\.?\s*c\.?|cont['’]?d\.?|continued|off(?:-|\s)?screen)\s*\)",
    )
    .unwrap()
});

/// Age parentheticals such as `(45)`, `(30s)` or `(30'S)`.
static AGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(\s*\d{1,3}\s*['’]?s?\s*\)").unwrap());

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Controls when two keys may be merged by containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeGuard {
    /// Require the shorter key to sit on word boundaries of the longer one
    pub enabled: bool,

    /// Minimum length of the shorter key when enabled
    pub min_key_length: usize,
}

impl MergeGuard {
    /// Plain substring containment, no guard.
    pub fn loose() -> Self {
        Self::default()
    }

    /// Word-boundary containment with a minimum key length.
    pub fn strict(min_key_length: usize) -> Self {
        Self {
            enabled: true,
            min_key_length,
        }
    }

    /// Build from the identity settings.
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            enabled: config.guard_containment,
            min_key_length: config.min_key_length,
        }
    }
}

/// Strip cue extensions and age notes, keeping the original casing.
fn strip_annotations(raw: &str) -> String {
    let without_extensions = EXTENSION_REGEX.replace_all(raw, " ");
    let without_age = AGE_REGEX.replace_all(&without_extensions, " ");
    let truncated = match without_age.find('(') {
        Some(pos) => &without_age[..pos],
        None => &without_age[..],
    };
    WHITESPACE_REGEX.replace_all(truncated, " ").trim().to_string()
}

/// Canonical comparison key for a raw name. Idempotent.
pub fn normalize(raw: &str) -> String {
    strip_annotations(raw).to_lowercase()
}

/// Presentation form of a raw name.
///
/// Mixed-case names are kept as written; all-upper or all-lower names are
/// title-cased. Annotations like `(V.O.)` are dropped first.
pub fn display(raw: &str) -> String {
    let stripped = strip_annotations(raw);

    let has_upper = stripped.chars().any(char::is_uppercase);
    let has_lower = stripped.chars().any(char::is_lowercase);
    if has_upper && has_lower {
        return stripped;
    }

    let mut result = String::with_capacity(stripped.len());
    let mut at_word_start = true;
    for c in stripped.chars() {
        if at_word_start {
            result.extend(c.to_uppercase());
        } else {
            result.extend(c.to_lowercase());
        }
        at_word_start = c.is_whitespace() || c == '-';
    }
    result
}

/// Whether two normalized keys refer to the same character.
///
/// Keys overlap when equal or when one contains the other. With an enabled
/// guard the shorter key must also be long enough and match whole words.
pub fn keys_overlap(a: &str, b: &str, guard: &MergeGuard) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if !long.contains(short) {
        return false;
    }
    if !guard.enabled {
        return true;
    }

    short.chars().count() >= guard.min_key_length && contains_whole_words(long, short)
}

/// True when `needle` occurs in `haystack` bounded by non-alphanumerics.
fn contains_whole_words(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
