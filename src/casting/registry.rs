/*!
 * Canonical character registry.
 *
 * Combines three sources into the final, ordered character set:
 * - the authoritative character list (names and roles)
 * - mentions extracted from the script (resolved into identities)
 * - the per-scene breakdown (scene membership and line counts)
 *
 * The authoritative list decides who exists; the other two only contribute
 * data to characters it already names.
 */

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use log::{debug, info};

use super::identity::{
    sort_by_priority, CharacterIdentity, IdentityResolver, Importance, RawCharacterMention,
};
use super::names::{display, keys_overlap, normalize};

/// One entry of the authoritative character list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoritativeCharacter {
    /// Character name
    pub name: String,

    /// Role or importance label ("lead", "supporting", ...)
    #[serde(default, alias = "importance", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Age, written as a number or free text
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,

    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AuthoritativeCharacter {
    /// Create an entry with a name and role.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Some(role.into()),
            age: None,
            description: None,
        }
    }
}

/// Per-scene entry of the breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneCharacterEntry {
    /// Character name as written in the breakdown
    pub name: String,

    /// Lines spoken in this scene
    #[serde(default)]
    pub line_count: usize,

    /// Importance label, if given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
}

/// One scene of the breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneBreakdown {
    /// 1-based scene number
    pub scene_number: usize,

    /// Scene title or slugline
    #[serde(default)]
    pub scene_title: String,

    /// Characters present in the scene
    #[serde(default)]
    pub characters: Vec<SceneCharacterEntry>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Builds the ordered character registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    resolver: IdentityResolver,
}

impl RegistryBuilder {
    /// Create a builder around a resolver.
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    /// Build the registry.
    ///
    /// Without an authoritative list the resolved script mentions are used
    /// as-is. Breakdown entries for unknown characters are ignored.
    pub fn build(
        &self,
        authoritative: &[AuthoritativeCharacter],
        extracted: &[RawCharacterMention],
        breakdown: &[SceneBreakdown],
    ) -> Vec<CharacterIdentity> {
        let resolved = self.resolver.resolve(extracted);

        let mut registry = if authoritative.is_empty() {
            debug!("No authoritative character list, using {} resolved identities", resolved.len());
            resolved
        } else {
            authoritative
                .iter()
                .filter(|a| !normalize(&a.name).is_empty())
                .map(|a| self.merge_authoritative(a, &resolved, breakdown))
                .collect()
        };

        let mut seen = HashSet::new();
        registry.retain(|identity| seen.insert(identity.key()));
        sort_by_priority(&mut registry);

        info!("Character registry built with {} character(s)", registry.len());
        registry
    }

    /// Combine one authoritative entry with script and breakdown data.
    fn merge_authoritative(
        &self,
        entry: &AuthoritativeCharacter,
        resolved: &[CharacterIdentity],
        breakdown: &[SceneBreakdown],
    ) -> CharacterIdentity {
        let key = normalize(&entry.name);
        let mut identity = CharacterIdentity::new(display(&entry.name), Importance::Background);
        identity.age = entry.age.clone();
        identity.description = entry.description.clone();

        let matched = self.best_match(&key, resolved);
        if let Some(found) = matched {
            debug!("Authoritative '{}' matched script identity '{}'", entry.name, found.name);
            identity.scenes = found.scenes.clone();
            identity.line_count = found.line_count;
            identity.aliases.extend(found.aliases.iter().cloned());
        }

        let mut breakdown_importance = None;
        for scene in breakdown {
            for character in &scene.characters {
                if !identity.aliases.contains(&normalize(&character.name)) {
                    continue;
                }
                identity.line_count += character.line_count;
                identity.scenes.insert(scene.scene_number);
                if breakdown_importance.is_none() {
                    breakdown_importance = character
                        .importance
                        .as_deref()
                        .and_then(Importance::from_role);
                }
            }
        }

        identity.importance = entry
            .role
            .as_deref()
            .and_then(Importance::from_role)
            .or(breakdown_importance)
            .or(matched.map(|m| m.importance))
            .unwrap_or_default();

        identity
    }

    /// Find the resolved identity an authoritative key refers to.
    ///
    /// Exact alias matches win; otherwise the identity with the longest
    /// overlapping alias is taken.
    fn best_match<'a>(
        &self,
        key: &str,
        resolved: &'a [CharacterIdentity],
    ) -> Option<&'a CharacterIdentity> {
        if let Some(exact) = resolved.iter().find(|i| i.aliases.contains(key)) {
            return Some(exact);
        }

        let mut best: Option<(&'a CharacterIdentity, usize)> = None;
        for identity in resolved {
            let overlap = identity
                .aliases
                .iter()
                .filter(|alias| keys_overlap(alias, key, self.resolver.guard()))
                .map(|alias| alias.chars().count())
                .max();

            if let Some(len) = overlap {
                if best.is_none_or(|(_, best_len)| len > best_len) {
                    best = Some((identity, len));
                }
            }
        }

        best.map(|(identity, _)| identity)
    }
}

/// Build a registry with plain containment merging.
pub fn build(
    authoritative: &[AuthoritativeCharacter],
    extracted: &[RawCharacterMention],
    breakdown: &[SceneBreakdown],
) -> Vec<CharacterIdentity> {
    RegistryBuilder::default().build(authoritative, extracted, breakdown)
}
