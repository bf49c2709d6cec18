/*!
 * Generation clients.
 *
 * The casting service never talks to a model directly. It hands a
 * `CastingRequest` to an injected `GenerationClient` and decodes whatever
 * text comes back. Concrete network clients live outside this crate; the
 * `mock` module provides a scriptable client for tests.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::casting::identity::CharacterIdentity;
use crate::errors::ProviderError;

/// One batch of characters to generate casting profiles for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastingRequest {
    /// Zero-based position of the batch in the plan
    pub batch_index: usize,

    /// Characters in this batch, in registry order
    pub characters: Vec<CharacterIdentity>,

    /// Token budget for each character's profile
    pub max_tokens_per_character: u32,

    /// Field each returned record must carry
    pub identifying_field: String,
}

impl CastingRequest {
    /// Total token budget for the whole batch.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens_per_character
            .saturating_mul(self.characters.len() as u32)
    }

    /// Render the request as a plain-text prompt.
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Write a casting profile for each character below. Respond with JSON of the form \
             {{\"cast\": [{{\"{}\": ..., \"archetype\": ..., \"requirements\": [...], \"notes\": ...}}]}}. \
             Keep each profile under {} tokens.\n\n",
            self.identifying_field, self.max_tokens_per_character
        );

        for identity in &self.characters {
            prompt.push_str(&format!(
                "- {} ({}, {} lines, {} scenes)",
                identity.name,
                identity.importance,
                identity.line_count,
                identity.scenes.len()
            ));
            if let Some(age) = &identity.age {
                prompt.push_str(&format!(", age {}", age));
            }
            if let Some(description) = &identity.description {
                prompt.push_str(&format!(": {}", description));
            }
            prompt.push('\n');
        }

        prompt
    }
}

/// Source of raw generated text for casting batches.
#[async_trait]
pub trait GenerationClient: Send + Sync + Debug {
    /// Produce raw response text for one batch.
    async fn generate(&self, request: CastingRequest) -> Result<String, ProviderError>;
}

pub mod mock;
