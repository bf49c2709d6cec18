/*!
 * Typed document model for parsed screenplays.
 *
 * A document is an ordered list of pages, each holding classified elements
 * in the same order as the source lines. Every type here is a plain value
 * and serializes to JSON for the rendering layer.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Classification of a single screenplay line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Slugline opening a new scene
    SceneHeading,

    /// Description, blank spacing or anything unclassified
    Action,

    /// Speaker line preceding dialogue
    CharacterCue {
        /// Name exactly as written in the cue, before normalization
        name: String,
    },

    /// Spoken line
    Dialogue,

    /// Actor direction wrapped in parentheses
    Parenthetical,

    /// Editorial transition such as `CUT TO:`
    Transition,
}

/// A classified screenplay element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// What kind of line this is
    pub kind: ElementKind,

    /// Line content (trimmed; upper-cased for scene headings)
    pub content: String,

    /// Scene this element belongs to (None before the first heading)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<usize>,
}

impl Element {
    /// Create an element.
    pub fn new(kind: ElementKind, content: impl Into<String>, scene: Option<usize>) -> Self {
        Self {
            kind,
            content: content.into(),
            scene,
        }
    }

    /// Raw speaker name if this element is a character cue.
    pub fn character_name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::CharacterCue { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether this element is spoken dialogue.
    pub fn is_dialogue(&self) -> bool {
        self.kind == ElementKind::Dialogue
    }
}

/// One approximate screenplay page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: usize,

    /// Elements on this page, in source order
    pub elements: Vec<Element>,
}

impl Page {
    /// Create an empty page.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            elements: Vec::new(),
        }
    }

    /// Number of elements on the page.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the page holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Summary figures for a parsed screenplay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Number of pages
    pub page_count: usize,

    /// Number of scene headings
    pub scene_count: usize,

    /// Number of distinct character cue names
    pub character_count: usize,

    /// One minute per page
    pub estimated_runtime_minutes: usize,
}

/// A scene heading together with its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    /// 1-based scene index
    pub index: usize,

    /// Upper-cased heading text
    pub heading: String,
}

/// Complete parsed screenplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Pages in order; never empty
    pub pages: Vec<Page>,

    /// Summary figures
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Build a document from finished pages and compute its metadata.
    ///
    /// An empty page list is replaced by a single empty page.
    pub fn from_pages(mut pages: Vec<Page>) -> Self {
        if pages.is_empty() {
            pages.push(Page::new(1));
        }

        let mut scene_count = 0;
        let mut characters = HashSet::new();
        for element in pages.iter().flat_map(|p| p.elements.iter()) {
            match &element.kind {
                ElementKind::SceneHeading => scene_count += 1,
                ElementKind::CharacterCue { name } => {
                    characters.insert(name.trim().to_uppercase());
                }
                _ => {}
            }
        }

        let metadata = DocumentMetadata {
            page_count: pages.len(),
            scene_count,
            character_count: characters.len(),
            estimated_runtime_minutes: pages.len(),
        };

        Self { pages, metadata }
    }

    /// Iterate over every element across all pages.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }

    /// Total element count.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// List scene headings with their indices.
    pub fn scenes(&self) -> Vec<SceneSummary> {
        self.elements()
            .filter(|e| e.kind == ElementKind::SceneHeading)
            .filter_map(|e| {
                e.scene.map(|index| SceneSummary {
                    index,
                    heading: e.content.clone(),
                })
            })
            .collect()
    }
}
