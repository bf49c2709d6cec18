/*!
 * Resilient decoding of batched generation responses.
 *
 * Responses are nominally `{"cast": [...]}` but routinely arrive wrapped in
 * code fences, with trailing commas, or cut off mid-object when the service
 * hits its token limit. Decoding runs three tiers, each only if the previous
 * one failed:
 *
 * 1. Direct parse of the sanitized text
 * 2. Brace balancing: drop a dangling partial property, append missing closers
 * 3. Object salvage: keep every complete object that carries the identifying
 *    field, plus a trailing incomplete one if it can be closed
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use log::debug;

use crate::app_config::CastingConfig;
use crate::errors::DecodeError;

use super::scanner::{object_spans, sanitize, structural_commas, JsonScanner};

/// A loosely-typed per-character record.
pub type Record = Map<String, Value>;

/// Keys that hold the record array in a wrapping object.
const ARRAY_KEYS: &[&str] = &["cast", "characters"];

/// How many comma cut points trailing-object salvage walks back through.
const MAX_CUT_ATTEMPTS: usize = 16;

/// Start of the record array inside a wrapping object.
static ARRAY_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:cast|characters)"\s*:\s*\["#).unwrap());

/// Which tier produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeTier {
    /// The text parsed as-is
    Direct,

    /// Missing closers were appended
    Balanced,

    /// Individual objects were recovered
    Salvaged,
}

impl std::fmt::Display for DecodeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DecodeTier::Direct => "direct",
            DecodeTier::Balanced => "balanced",
            DecodeTier::Salvaged => "salvaged",
        };
        write!(f, "{}", label)
    }
}

/// Records recovered from one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoded {
    /// Valid records, in response order
    pub records: Vec<Record>,

    /// Tier that produced them
    pub tier: DecodeTier,
}

/// Decodes raw response text into records keyed by an identifying field.
#[derive(Debug, Clone)]
pub struct ResponseDecoder {
    identifying_field: String,
}

impl ResponseDecoder {
    /// Create a decoder requiring `identifying_field` on every record.
    pub fn new(identifying_field: impl Into<String>) -> Self {
        Self {
            identifying_field: identifying_field.into(),
        }
    }

    /// Decoder keyed by `characterName`.
    pub fn with_defaults() -> Self {
        Self::new("characterName")
    }

    /// Decoder keyed by the configured field.
    pub fn from_config(config: &CastingConfig) -> Self {
        Self::new(config.identifying_field.clone())
    }

    /// Field every record must carry.
    pub fn identifying_field(&self) -> &str {
        &self.identifying_field
    }

    /// Decode `raw`, falling back through the recovery tiers.
    ///
    /// Fails only when no tier yields a single valid record.
    pub fn decode(&self, raw: &str) -> Result<Decoded, DecodeError> {
        let text = prepare(raw);

        let reason = match self.parse_direct(&text) {
            Ok(records) => return Ok(self.finish(records, DecodeTier::Direct)),
            Err(reason) => reason,
        };
        debug!("Direct parse failed: {}", reason);

        let reason = match self.parse_balanced(&text) {
            Ok(records) => return Ok(self.finish(records, DecodeTier::Balanced)),
            Err(reason) => reason,
        };
        debug!("Brace balancing failed: {}", reason);

        let records = self.salvage(&text);
        if !records.is_empty() {
            return Ok(self.finish(records, DecodeTier::Salvaged));
        }

        Err(DecodeError::NoRecoverableRecords {
            tiers_attempted: 3,
            reason,
        })
    }

    fn finish(&self, records: Vec<Record>, tier: DecodeTier) -> Decoded {
        debug!("Decoded {} record(s) via {} tier", records.len(), tier);
        Decoded { records, tier }
    }

    /// Tier 1: parse the sanitized text as-is.
    fn parse_direct(&self, text: &str) -> Result<Vec<Record>, String> {
        let value = parse_first_value(text)?;
        self.candidate_records(value)
            .ok_or_else(|| "parsed value has no valid record array".to_string())
    }

    /// Tier 2: close whatever the truncation left open.
    fn parse_balanced(&self, text: &str) -> Result<Vec<Record>, String> {
        let trimmed = text.trim_end();
        let scanner = JsonScanner::scan(trimmed);
        if scanner.depth() == 0 && !scanner.in_string() {
            return Err("text has no unclosed brackets".to_string());
        }

        // A text that stops right after a closer lost nothing mid-property
        if !scanner.in_string() && trimmed.ends_with(['}', ']']) {
            if let Some(records) = self.close_and_parse(trimmed) {
                return Ok(records);
            }
        }

        // Otherwise the property after the last comma is incomplete
        let Some(&comma) = structural_commas(trimmed).last() else {
            return Err("no comma to cut the incomplete tail at".to_string());
        };

        self.close_and_parse(&trimmed[..comma])
            .ok_or_else(|| "balanced text has no valid record array".to_string())
    }

    /// Append the missing closers to `text` and validate the result.
    fn close_and_parse(&self, text: &str) -> Option<Vec<Record>> {
        let text = text.trim_end().trim_end_matches(',').trim_end();
        if text.ends_with(':') {
            return None;
        }

        let scanner = JsonScanner::scan(text);
        if scanner.in_string() {
            return None;
        }

        let repaired = format!("{}{}", text, scanner.closers());
        let value = parse_first_value(&repaired).ok()?;
        self.candidate_records(value)
    }

    /// Tier 3: recover objects one by one.
    fn salvage(&self, text: &str) -> Vec<Record> {
        let region_start = ARRAY_START_REGEX
            .find(text)
            .map(|m| m.end())
            .or_else(|| text.starts_with('[').then_some(1))
            .unwrap_or(0);
        let region = &text[region_start..];

        let spans = object_spans(region);
        let mut records: Vec<Record> = spans
            .complete
            .iter()
            .filter_map(|span| serde_json::from_str::<Value>(&region[span.clone()]).ok())
            .filter_map(|value| self.as_record(value))
            .collect();

        if let Some(start) = spans.trailing {
            if let Some(record) = self.close_trailing(&region[start..]) {
                debug!("Salvaged trailing incomplete record");
                records.push(record);
            }
        }

        records
    }

    /// Close a truncated object that already names its character.
    fn close_trailing(&self, fragment: &str) -> Option<Record> {
        let marker = format!("\"{}\"", self.identifying_field);
        if !fragment.contains(&marker) {
            return None;
        }

        let trimmed = fragment.trim_end();
        let mut cut_points: Vec<usize> = vec![trimmed.len()];
        cut_points.extend(structural_commas(trimmed).iter().rev().take(MAX_CUT_ATTEMPTS));

        cut_points.into_iter().find_map(|end| {
            let text = trimmed[..end].trim_end().trim_end_matches(',').trim_end();
            if text.ends_with(':') {
                return None;
            }
            let scanner = JsonScanner::scan(text);
            if scanner.in_string() {
                return None;
            }
            let repaired = format!("{}{}", text, scanner.closers());
            serde_json::from_str::<Value>(&repaired)
                .ok()
                .and_then(|value| self.as_record(value))
        })
    }

    /// Keep `value` if it is an object carrying the identifying field.
    fn as_record(&self, value: Value) -> Option<Record> {
        match value {
            Value::Object(map) if map.contains_key(&self.identifying_field) => Some(map),
            _ => None,
        }
    }

    /// Pull the record array out of a parsed value and validate it.
    fn candidate_records(&self, value: Value) -> Option<Vec<Record>> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => {
                match ARRAY_KEYS.iter().find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                }) {
                    Some(items) => items,
                    None if map.contains_key(&self.identifying_field) => vec![Value::Object(map)],
                    None => return None,
                }
            }
            _ => return None,
        };

        if items.is_empty() {
            return None;
        }

        items
            .into_iter()
            .map(|item| self.as_record(item))
            .collect::<Option<Vec<Record>>>()
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Decode with the default `characterName` field.
pub fn decode(raw: &str) -> Result<Decoded, DecodeError> {
    ResponseDecoder::with_defaults().decode(raw)
}

/// Strip code fences and leading prose, then comments and trailing commas.
fn prepare(raw: &str) -> String {
    let unfenced = strip_code_fences(raw);
    let body = match unfenced.find(['{', '[']) {
        Some(start) => &unfenced[start..],
        None => unfenced,
    };
    sanitize(body)
}

/// Return the content of the first code fence, or the text itself.
///
/// An unterminated fence (a truncated response) yields everything after it.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after = &trimmed[start + 3..];
    let tag_len = after
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after.len());
    let body = &after[tag_len..];

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse the first JSON value in `text`, ignoring anything after it.
fn parse_first_value(text: &str) -> Result<Value, String> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(e.to_string()),
        None => Err("empty response".to_string()),
    }
}
