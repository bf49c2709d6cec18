/*!
 * Character identity resolution.
 *
 * Merges variant spellings of the same character within one script into a
 * single canonical identity:
 * - Names are compared by normalized key
 * - A key that contains (or is contained by) a known key joins that identity
 * - The longest spelling becomes the display name
 * - Line counts and scene indices are aggregated per identity
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::screenplay::{Document, ElementKind};

use super::names::{display, keys_overlap, normalize, MergeGuard};

/// Share of all dialogue lines that makes a character a lead.
const LEAD_LINE_SHARE: f64 = 0.25;

/// Share of all dialogue lines that makes a character supporting.
const SUPPORTING_LINE_SHARE: f64 = 0.05;

/// Importance tier, ordered lead first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Lead,
    Supporting,
    #[default]
    Background,
}

impl Importance {
    /// Parse a free-form role label from a character list or breakdown.
    ///
    /// Unknown labels return `None`.
    pub fn from_role(role: &str) -> Option<Self> {
        let role = role.to_lowercase();
        let words: Vec<&str> = role
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return None;
        }

        let has = |keywords: &[&str]| words.iter().any(|w| keywords.contains(w));
        let day_player = words.windows(2).any(|pair| pair == ["day", "player"]);

        // Qualified labels ("guest star", "featured extra") take the lower tier
        if day_player || has(&["background", "extra", "extras", "minor", "cameo", "guest"]) {
            Some(Importance::Background)
        } else if has(&["supporting", "recurring", "secondary", "featured"]) {
            Some(Importance::Supporting)
        } else if has(&["lead", "main", "protagonist", "antagonist", "star", "principal"]) {
            Some(Importance::Lead)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Importance::Lead => "lead",
            Importance::Supporting => "supporting",
            Importance::Background => "background",
        };
        write!(f, "{}", label)
    }
}

/// A character name as it appeared in source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCharacterMention {
    /// Name exactly as written
    pub name: String,

    /// Scene where the mention occurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,

    /// Dialogue lines attributed to this mention
    #[serde(default)]
    pub line_count: usize,
}

impl RawCharacterMention {
    /// Create a mention.
    pub fn new(name: impl Into<String>, scene: Option<usize>, line_count: usize) -> Self {
        Self {
            name: name.into(),
            scene,
            line_count,
        }
    }

    /// Extract one mention per character cue, counting the dialogue lines
    /// that follow each cue.
    pub fn from_document(document: &Document) -> Vec<Self> {
        let mut mentions: Vec<Self> = Vec::new();
        let mut open = false;

        for element in document.elements() {
            match &element.kind {
                ElementKind::CharacterCue { name } => {
                    mentions.push(Self::new(name.clone(), element.scene, 0));
                    open = true;
                }
                ElementKind::Dialogue if open => {
                    if let Some(last) = mentions.last_mut() {
                        last.line_count += 1;
                    }
                }
                ElementKind::Parenthetical | ElementKind::Dialogue => {}
                _ => open = false,
            }
        }

        mentions
    }
}

/// Canonical identity for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterIdentity {
    /// Canonical display name
    pub name: String,

    /// Normalized keys known to refer to this character
    pub aliases: BTreeSet<String>,

    /// Importance tier
    pub importance: Importance,

    /// Accumulated dialogue line count
    pub line_count: usize,

    /// Scenes the character appears in
    pub scenes: BTreeSet<usize>,

    /// Age from the authoritative character list, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,

    /// Description from the authoritative character list, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CharacterIdentity {
    /// Create an identity with no line or scene data.
    pub fn new(name: impl Into<String>, importance: Importance) -> Self {
        let name = name.into();
        let mut aliases = BTreeSet::new();
        let key = normalize(&name);
        if !key.is_empty() {
            aliases.insert(key);
        }
        Self {
            name,
            aliases,
            importance,
            line_count: 0,
            scenes: BTreeSet::new(),
            age: None,
            description: None,
        }
    }

    /// Normalized key of the canonical name.
    pub fn key(&self) -> String {
        normalize(&self.name)
    }

    /// Whether `raw` normalizes to one of this identity's keys.
    pub fn answers_to(&self, raw: &str) -> bool {
        self.aliases.contains(&normalize(raw))
    }
}

/// Sort identities by importance tier, then by descending line count.
///
/// The sort is stable, so equal entries keep their relative order.
pub fn sort_by_priority(identities: &mut [CharacterIdentity]) {
    identities.sort_by(|a, b| {
        a.importance
            .cmp(&b.importance)
            .then_with(|| b.line_count.cmp(&a.line_count))
    });
}

/// Working state for one canonical entry during resolution.
#[derive(Debug)]
struct Entry {
    raw: String,
    key_len: usize,
    first_seen: usize,
    keys: BTreeSet<String>,
    line_count: usize,
    scenes: BTreeSet<usize>,
}

/// Resolves raw mentions into canonical identities.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    guard: MergeGuard,
}

impl IdentityResolver {
    /// Create a resolver with the given merge guard.
    pub fn new(guard: MergeGuard) -> Self {
        Self { guard }
    }

    /// Resolver using plain containment.
    pub fn loose() -> Self {
        Self::new(MergeGuard::loose())
    }

    /// Get the merge guard.
    pub fn guard(&self) -> &MergeGuard {
        &self.guard
    }

    /// Resolve mentions into a new set of identities.
    ///
    /// Output is ordered by descending line count, then by first appearance.
    pub fn resolve(&self, mentions: &[RawCharacterMention]) -> Vec<CharacterIdentity> {
        // Distinct raw names in first-seen order
        let mut names: Vec<(String, String, usize)> = Vec::new();
        for mention in mentions {
            let raw = mention.name.trim();
            if names.iter().any(|(existing, _, _)| existing == raw) {
                continue;
            }
            let key = normalize(raw);
            if key.is_empty() {
                continue;
            }
            let order = names.len();
            names.push((raw.to_string(), key, order));
        }

        names.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));

        let mut entries: Vec<Entry> = Vec::new();
        let mut key_map: HashMap<String, usize> = HashMap::new();

        for (raw, key, first_seen) in names {
            let key_len = key.chars().count();
            let existing = key_map.get(&key).copied().or_else(|| {
                entries
                    .iter()
                    .position(|e| e.keys.iter().any(|k| keys_overlap(k, &key, &self.guard)))
            });

            match existing {
                Some(index) => {
                    let entry = &mut entries[index];
                    let longer = key_len > entry.key_len
                        || (key_len == entry.key_len && first_seen < entry.first_seen);
                    if longer {
                        debug!("Canonical name for '{}' becomes '{}'", entry.raw, raw);
                        entry.raw = raw;
                        entry.key_len = key_len;
                        entry.first_seen = first_seen;
                    } else {
                        debug!("Merged '{}' into '{}'", raw, entry.raw);
                    }
                    entry.keys.insert(key.clone());
                    key_map.insert(key, index);
                }
                None => {
                    key_map.insert(key.clone(), entries.len());
                    entries.push(Entry {
                        raw,
                        key_len,
                        first_seen,
                        keys: BTreeSet::from([key]),
                        line_count: 0,
                        scenes: BTreeSet::new(),
                    });
                }
            }
        }

        for mention in mentions {
            if let Some(&index) = key_map.get(&normalize(&mention.name)) {
                let entry = &mut entries[index];
                entry.line_count += mention.line_count;
                if let Some(scene) = mention.scene {
                    entry.scenes.insert(scene);
                }
            }
        }

        entries.sort_by(|a, b| {
            b.line_count
                .cmp(&a.line_count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        let total_lines: usize = entries.iter().map(|e| e.line_count).sum();

        entries
            .into_iter()
            .map(|entry| {
                let importance = infer_importance(entry.line_count, entry.scenes.len(), total_lines);
                CharacterIdentity {
                    name: display(&entry.raw),
                    aliases: entry.keys,
                    importance,
                    line_count: entry.line_count,
                    scenes: entry.scenes,
                    age: None,
                    description: None,
                }
            })
            .collect()
    }
}

/// Resolve mentions with plain containment merging.
pub fn resolve(mentions: &[RawCharacterMention]) -> Vec<CharacterIdentity> {
    IdentityResolver::loose().resolve(mentions)
}

/// Tier from a character's share of all dialogue.
fn infer_importance(line_count: usize, scene_count: usize, total_lines: usize) -> Importance {
    let share = if total_lines == 0 {
        0.0
    } else {
        line_count as f64 / total_lines as f64
    };

    if share >= LEAD_LINE_SHARE {
        Importance::Lead
    } else if share >= SUPPORTING_LINE_SHARE || scene_count >= 2 {
        Importance::Supporting
    } else {
        Importance::Background
    }
}
