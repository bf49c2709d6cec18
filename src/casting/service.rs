/*!
 * Casting service.
 *
 * Plans batches over an ordered registry, sends them to a generation client
 * with bounded concurrency, decodes each response and merges the results.
 * A batch that fails or cannot be decoded never aborts the run: its
 * characters come back as placeholders.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::CastingConfig;
use crate::decoding::{DecodeTier, Record, ResponseDecoder};
use crate::errors::CastingError;
use crate::providers::{CastingRequest, GenerationClient};

use super::batch::{partition, token_budget};
use super::identity::CharacterIdentity;
use super::profile::{merge_batches, sort_profiles, CastingProfile};

/// Outcome of one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Zero-based batch index
    pub batch_index: usize,

    /// Number of characters requested
    pub requested: usize,

    /// Number of records decoded
    pub decoded: usize,

    /// Decoder tier that produced the records, if any
    pub tier: Option<DecodeTier>,

    /// Failure description, if the batch failed
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary of a casting run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastingReport {
    /// One outcome per batch, in plan order
    pub batches: Vec<BatchOutcome>,

    /// Number of placeholder profiles in the result
    pub placeholders: usize,
}

impl CastingReport {
    pub fn batches_total(&self) -> usize {
        self.batches.len()
    }

    pub fn batches_failed(&self) -> usize {
        self.batches.iter().filter(|b| b.is_failed()).count()
    }
}

/// Drives casting profile generation over an injected client.
#[derive(Debug, Clone)]
pub struct CastingService {
    client: Arc<dyn GenerationClient>,
    config: CastingConfig,
    decoder: ResponseDecoder,
}

impl CastingService {
    /// Create a new service around a generation client
    pub fn new(client: Arc<dyn GenerationClient>, config: CastingConfig) -> Self {
        let decoder = ResponseDecoder::from_config(&config);
        Self {
            client,
            config,
            decoder,
        }
    }

    /// Get the casting configuration
    pub fn config(&self) -> &CastingConfig {
        &self.config
    }

    /// Generate one profile per identity in `registry`.
    ///
    /// The returned profiles are in registry priority order.
    pub async fn cast(&self, registry: &[CharacterIdentity]) -> (Vec<CastingProfile>, CastingReport) {
        let batches = partition(registry, self.config.batch_size);
        let total_batches = batches.len();
        let start_time = Instant::now();

        info!(
            "Casting {} characters in {} batches ({} concurrent)",
            registry.len(),
            total_batches,
            self.config.max_concurrent_requests
        );

        let mut results = stream::iter(batches.into_iter().enumerate())
            .map(|(batch_index, characters)| {
                let service = self.clone();
                async move {
                    let result = service.cast_batch(batch_index, characters.clone()).await;
                    (batch_index, characters, result)
                }
            })
            .buffer_unordered(self.config.max_concurrent_requests.max(1))
            .collect::<Vec<_>>()
            .await;

        // Restore plan order
        results.sort_by_key(|(idx, _, _)| *idx);

        let mut profiles: Vec<CastingProfile> = Vec::with_capacity(registry.len());
        let mut report = CastingReport::default();

        for (batch_index, characters, result) in results {
            match result {
                Ok((decoded, tier)) => {
                    debug!(
                        "Batch {} of {} decoded {} record(s) via {} tier",
                        batch_index + 1,
                        total_batches,
                        decoded.len(),
                        tier
                    );
                    report.batches.push(BatchOutcome {
                        batch_index,
                        requested: characters.len(),
                        decoded: decoded.len(),
                        tier: Some(tier),
                        error: None,
                    });
                    profiles.extend(merge_batches(
                        &characters,
                        &decoded,
                        self.decoder.identifying_field(),
                    ));
                }
                Err(e) => {
                    warn!(
                        "Batch {} of {} failed, using placeholders for {} character(s): {}",
                        batch_index + 1,
                        total_batches,
                        characters.len(),
                        e
                    );
                    report.batches.push(BatchOutcome {
                        batch_index,
                        requested: characters.len(),
                        decoded: 0,
                        tier: None,
                        error: Some(e.to_string()),
                    });
                    profiles.extend(characters.into_iter().map(CastingProfile::placeholder));
                }
            }
        }

        sort_profiles(&mut profiles);
        report.placeholders = profiles.iter().filter(|p| p.needs_regeneration).count();

        info!(
            "Cast {} characters in {:?}: {} of {} batches failed, {} placeholder(s)",
            profiles.len(),
            start_time.elapsed(),
            report.batches_failed(),
            report.batches_total(),
            report.placeholders
        );

        (profiles, report)
    }

    /// Request and decode a single batch.
    pub async fn cast_batch(
        &self,
        batch_index: usize,
        characters: Vec<CharacterIdentity>,
    ) -> Result<(Vec<Record>, DecodeTier), CastingError> {
        let request = CastingRequest {
            batch_index,
            max_tokens_per_character: token_budget(characters.len(), &self.config),
            identifying_field: self.decoder.identifying_field().to_string(),
            characters,
        };

        let raw = self.client.generate(request).await?;
        let decoded = self.decoder.decode(&raw)?;
        Ok((decoded.records, decoded.tier))
    }
}
