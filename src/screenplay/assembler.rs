/*!
 * Line classification and document assembly for screenplays.
 *
 * A single left-to-right pass over cleaned lines. The only state carried
 * between lines is whether we are inside a dialogue block and the scene of
 * the most recent character cue; everything else is decided per line, with a
 * short lookahead to confirm character cues.
 */

use log::debug;

use crate::app_config::ParserConfig;

use super::cleaner::clean;
use super::model::{Document, Element, ElementKind, Page};

/// Transition lines recognised verbatim (case-insensitive).
pub const TRANSITION_KEYWORDS: &[&str] = &[
    "FADE IN:",
    "FADE OUT.",
    "FADE TO BLACK.",
    "CUT TO:",
    "SMASH CUT TO:",
    "MATCH CUT TO:",
    "DISSOLVE TO:",
];

/// Prefixes that open a scene heading (case-insensitive).
const SCENE_HEADING_PREFIXES: &[&str] = &["INT/EXT.", "EXT/INT.", "I/E.", "INT.", "EXT."];

/// Words that look like cues but never name a speaker.
const RESERVED_CUE_WORDS: &[&str] = &["INT", "EXT", "FADE", "CUT", "DISSOLVE"];

/// Converts screenplay text into a paginated [`Document`].
#[derive(Debug, Clone)]
pub struct ScriptAssembler {
    config: ParserConfig,
}

impl ScriptAssembler {
    /// Create an assembler with the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ParserConfig::default())
    }

    /// Get configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Clean and classify `text` into a document.
    ///
    /// Never fails; unrecognised lines become `Action` elements.
    pub fn assemble(&self, text: &str) -> Document {
        let cleaned = clean(text);
        let lines: Vec<&str> = if cleaned.is_empty() {
            Vec::new()
        } else {
            cleaned.split('\n').collect()
        };

        let threshold = self.config.page_element_threshold.max(1);
        let mut pages = Vec::new();
        let mut page = Page::new(1);

        let mut dialogue_mode = false;
        let mut scene: Option<usize> = None;
        let mut cue_scene: Option<usize> = None;
        let mut scene_counter = 0usize;

        for (index, raw_line) in lines.iter().enumerate() {
            let line = raw_line.trim();

            let element = if line.is_empty() {
                dialogue_mode = false;
                Element::new(ElementKind::Action, "", scene)
            } else if is_scene_heading(line) {
                scene_counter += 1;
                scene = Some(scene_counter);
                dialogue_mode = false;
                Element::new(ElementKind::SceneHeading, line.to_uppercase(), scene)
            } else if is_transition(line) {
                dialogue_mode = false;
                Element::new(ElementKind::Transition, line, scene)
            } else if self.is_character_cue(line, &lines[index + 1..]) {
                dialogue_mode = true;
                cue_scene = scene;
                Element::new(
                    ElementKind::CharacterCue {
                        name: line.to_string(),
                    },
                    line,
                    scene,
                )
            } else if is_parenthetical(line) {
                Element::new(ElementKind::Parenthetical, line, scene)
            } else if dialogue_mode && !is_all_upper(line) {
                Element::new(ElementKind::Dialogue, line, cue_scene)
            } else {
                dialogue_mode = false;
                Element::new(ElementKind::Action, line, scene)
            };

            if page.len() >= threshold {
                let number = page.number + 1;
                pages.push(std::mem::replace(&mut page, Page::new(number)));
            }
            page.elements.push(element);
        }

        if !page.is_empty() || pages.is_empty() {
            pages.push(page);
        }

        let document = Document::from_pages(pages);
        debug!(
            "Assembled screenplay: {} page(s), {} scene(s), {} character(s)",
            document.metadata.page_count,
            document.metadata.scene_count,
            document.metadata.character_count
        );
        document
    }

    /// Whether `line` is a speaker cue, given the lines that follow it.
    fn is_character_cue(&self, line: &str, following: &[&str]) -> bool {
        if !is_all_upper(line) || line.chars().count() >= self.config.max_cue_length {
            return false;
        }

        let base = cue_base(line);
        if base.is_empty() || base.contains('.') || base.contains(':') {
            return false;
        }

        if is_reserved_cue(base) {
            return false;
        }

        following
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .take(self.config.lookahead_lines.max(1))
            .any(|l| !is_all_upper(l) || l.starts_with('('))
    }
}

impl Default for ScriptAssembler {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Assemble a document with default settings.
pub fn assemble(text: &str) -> Document {
    ScriptAssembler::with_defaults().assemble(text)
}

/// Check if a line opens a scene.
fn is_scene_heading(line: &str) -> bool {
    let upper = line.to_uppercase();
    SCENE_HEADING_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
}

/// Check if a line is one of the known transitions.
fn is_transition(line: &str) -> bool {
    let upper = line.to_uppercase();
    TRANSITION_KEYWORDS.iter().any(|k| upper == *k)
}

/// Check if a line is a parenthetical direction.
fn is_parenthetical(line: &str) -> bool {
    line.starts_with('(') && line.ends_with(')')
}

/// True when the line has letters and none of them are lower-case.
fn is_all_upper(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

/// Cue text before any extension such as `(V.O.)`.
fn cue_base(line: &str) -> &str {
    match line.find('(') {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

fn is_reserved_cue(base: &str) -> bool {
    if base == "THE END" {
        return true;
    }
    let first_word = base.split_whitespace().next().unwrap_or("");
    RESERVED_CUE_WORDS.contains(&first_word)
}
