/*!
 * Batch planning for casting requests.
 *
 * The ordered registry is cut into contiguous groups so each generation
 * request stays small. Order is preserved, so leads land in the first
 * batches.
 */

use crate::app_config::CastingConfig;

use super::identity::CharacterIdentity;

/// Default number of characters per request.
pub const DEFAULT_BATCH_SIZE: usize = 6;

/// Split `identities` into contiguous groups of at most `batch_size`.
///
/// A batch size of zero is treated as one.
pub fn partition(identities: &[CharacterIdentity], batch_size: usize) -> Vec<Vec<CharacterIdentity>> {
    identities
        .chunks(batch_size.max(1))
        .map(<[CharacterIdentity]>::to_vec)
        .collect()
}

/// Per-character token budget for a batch of `batch_len` characters.
///
/// The batch ceiling is shared evenly, then clamped to the configured floor
/// and ceiling.
pub fn token_budget(batch_len: usize, config: &CastingConfig) -> u32 {
    let floor = config.min_tokens_per_character;
    let ceiling = config.max_tokens_per_character.max(floor);
    let share = config.batch_token_ceiling / batch_len.max(1) as u32;
    share.clamp(floor, ceiling)
}
