/*!
 * Casting profiles.
 *
 * A profile is a resolved identity plus whatever the generation service
 * wrote about the character. Every requested character gets exactly one
 * profile: characters whose batch failed, or whose record never came back,
 * get a placeholder flagged for regeneration.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use log::warn;

use crate::decoding::Record;

use super::identity::CharacterIdentity;
use super::names::{keys_overlap, normalize, MergeGuard};

/// Identity plus generated casting content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastingProfile {
    /// The character this profile describes
    #[serde(flatten)]
    pub identity: CharacterIdentity,

    /// Casting archetype ("reluctant hero", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,

    /// Physical or performance requirements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,

    /// Free-form casting notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// True for placeholders that still need generated content
    #[serde(default)]
    pub needs_regeneration: bool,
}

impl CastingProfile {
    /// Build a profile from a decoded record.
    pub fn from_record(identity: CharacterIdentity, record: &Record) -> Self {
        Self {
            identity,
            archetype: text_field(record, &["archetype", "castingArchetype"]),
            requirements: list_field(record, &["requirements", "castingRequirements"]),
            notes: text_field(record, &["notes", "castingNotes"]),
            needs_regeneration: false,
        }
    }

    /// Profile with no generated content, flagged for regeneration.
    pub fn placeholder(identity: CharacterIdentity) -> Self {
        Self {
            identity,
            archetype: None,
            requirements: Vec::new(),
            notes: None,
            needs_regeneration: true,
        }
    }

    /// Canonical character name.
    pub fn name(&self) -> &str {
        &self.identity.name
    }
}

fn text_field(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
}

fn list_field(record: &Record, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}

/// Sort profiles by importance tier, then descending line count.
pub fn sort_profiles(profiles: &mut [CastingProfile]) {
    profiles.sort_by(|a, b| {
        a.identity
            .importance
            .cmp(&b.identity.importance)
            .then_with(|| b.identity.line_count.cmp(&a.identity.line_count))
    });
}

/// Pair requested characters with decoded records.
///
/// Records are matched by the normalized `identifying_field` in two passes:
/// exact alias matches for every character first, then containment over the
/// records still unclaimed. Each record is used at most once; unmatched
/// characters get placeholders.
pub fn merge_batches(
    requested: &[CharacterIdentity],
    records: &[Record],
    identifying_field: &str,
) -> Vec<CastingProfile> {
    let keyed: Vec<(String, &Record)> = records
        .iter()
        .filter_map(|record| {
            let name = record.get(identifying_field)?.as_str()?;
            let key = normalize(name);
            (!key.is_empty()).then_some((key, record))
        })
        .collect();

    let mut used: HashSet<usize> = HashSet::new();
    let mut assigned: Vec<Option<usize>> = vec![None; requested.len()];

    for (slot, identity) in assigned.iter_mut().zip(requested) {
        let exact = (0..keyed.len())
            .find(|i| !used.contains(i) && identity.aliases.contains(&keyed[*i].0));
        if let Some(index) = exact {
            used.insert(index);
            *slot = Some(index);
        }
    }

    let loose = MergeGuard::loose();
    for (slot, identity) in assigned.iter_mut().zip(requested) {
        if slot.is_some() {
            continue;
        }
        let key = identity.key();
        let overlap = (0..keyed.len())
            .find(|i| !used.contains(i) && keys_overlap(&keyed[*i].0, &key, &loose));
        if let Some(index) = overlap {
            used.insert(index);
            *slot = Some(index);
        }
    }

    let mut profiles: Vec<CastingProfile> = requested
        .iter()
        .zip(assigned)
        .map(|(identity, slot)| match slot {
            Some(index) => CastingProfile::from_record(identity.clone(), keyed[index].1),
            None => {
                warn!("No casting record for '{}', using placeholder", identity.name);
                CastingProfile::placeholder(identity.clone())
            }
        })
        .collect();

    sort_profiles(&mut profiles);
    profiles
}
