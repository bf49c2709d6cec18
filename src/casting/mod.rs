/*!
 * Character casting.
 *
 * From raw cue names to casting profiles:
 * - `names`: name normalization and comparison
 * - `identity`: merging name variants into canonical identities
 * - `registry`: combining the authoritative list, script and breakdown
 * - `batch`: splitting the registry into request-sized groups
 * - `profile`: casting profiles and merging of batch results
 * - `service`: concurrent generation over an injected client
 */

pub mod batch;
pub mod identity;
pub mod names;
pub mod profile;
pub mod registry;
pub mod service;

// Re-export main types
pub use batch::{partition, token_budget, DEFAULT_BATCH_SIZE};
pub use identity::{resolve, CharacterIdentity, IdentityResolver, Importance, RawCharacterMention};
pub use names::{display, keys_overlap, normalize, MergeGuard};
pub use profile::{merge_batches, CastingProfile};
pub use registry::{build, AuthoritativeCharacter, RegistryBuilder, SceneBreakdown, SceneCharacterEntry};
pub use service::{BatchOutcome, CastingReport, CastingService};
