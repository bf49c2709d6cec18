/*!
 * Decoding of generated JSON responses.
 *
 * - `scanner`: string-aware bracket tracking used to repair broken JSON
 * - `decoder`: the three-tier direct / balanced / salvaged decoder
 */

pub mod decoder;
pub mod scanner;

// Re-export main types
pub use decoder::{decode, DecodeTier, Decoded, Record, ResponseDecoder};
pub use scanner::{JsonScanner, LexState, ObjectSpans, ScanEvent};
