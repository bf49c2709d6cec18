/*!
 * Screenplay parsing.
 *
 * Turns loosely-structured generated screenplay text into a typed document:
 *
 * - `cleaner`: strips markdown/HTML artifacts from generated text
 * - `assembler`: classifies lines and paginates them into a document
 * - `model`: the document, page and element types
 */

pub mod assembler;
pub mod cleaner;
pub mod model;

// Re-export main types
pub use assembler::{assemble, ScriptAssembler, TRANSITION_KEYWORDS};
pub use cleaner::clean;
pub use model::{Document, DocumentMetadata, Element, ElementKind, Page, SceneSummary};
