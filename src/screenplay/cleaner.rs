/*!
 * Cleanup of generated screenplay text.
 *
 * Generated scripts routinely arrive wrapped in markdown or HTML: bold
 * character cues, blockquoted dialogue, quoted transitions. This module
 * strips those artifacts so the classifier only sees screenplay lines.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::assembler::TRANSITION_KEYWORDS;

/// HTML/XML style tags (`<b>`, `</i>`, `<br/>`)
static MARKUP_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>").unwrap()
});

/// Emphasis pairs, longest markers first
static EMPHASIS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\*\*([^*\n]+?)\*\*").unwrap(),
        Regex::new(r"__([^_\n]+?)__").unwrap(),
        Regex::new(r"\*([^*\s](?:[^*\n]*?[^*\s])?)\*").unwrap(),
        Regex::new(r"(?:^|\b)_([^_\s](?:[^_\n]*?[^_\s])?)_(?:\b|$)").unwrap(),
    ]
});

/// Orphaned bold markers left over from unbalanced emphasis
static STRAY_BOLD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*+").unwrap());

/// Leading blockquote markers (`> `, `>> `)
static BLOCKQUOTE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*(?:>[ \t]?)+").unwrap());

/// A transition keyword wrapped in straight or curly quotes
static QUOTED_TRANSITION_REGEX: Lazy<Regex> = Lazy::new(|| {
    let alternatives = TRANSITION_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r#"(?i)^([ \t]*)["'“”‘’]+[ \t]*({})[ \t]*["'“”‘’]+[ \t]*$"#,
        alternatives
    ))
    .unwrap()
});

/// Strip markup artifacts from generated text.
///
/// Total and idempotent: every rewrite only removes characters, so the
/// single-pass cleanup is repeated until nothing changes.
pub fn clean(text: &str) -> String {
    let mut current = text.replace("\r\n", "\n").replace('\r', "\n");

    loop {
        let next = clean_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let without_tags = MARKUP_TAG_REGEX.replace_all(text, "");

    without_tags
        .split('\n')
        .map(clean_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_line(line: &str) -> String {
    let mut result = BLOCKQUOTE_REGEX.replace(line, "").into_owned();

    for pattern in EMPHASIS_PATTERNS.iter() {
        result = pattern.replace_all(&result, "$1").into_owned();
    }
    result = STRAY_BOLD_REGEX.replace_all(&result, "").into_owned();

    result = QUOTED_TRANSITION_REGEX
        .replace(&result, "${1}${2}")
        .into_owned();

    result.trim_end().to_string()
}
