/*!
 * Streaming JSON structure scanner.
 *
 * Tracks just enough of JSON's lexical structure to repair broken text:
 * whether we are inside a string (and after a backslash), and the stack of
 * open brackets. It never builds values; the decoder uses it to find
 * complete objects, structural commas and the closers a truncated document
 * is missing.
 */

use std::ops::Range;

/// Lexical state of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexState {
    /// Outside any string literal
    #[default]
    Structural,

    /// Inside a string literal
    InString,

    /// Inside a string literal, right after a backslash
    Escaped,
}

/// What a single character meant structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// `{` or `[` opened; `depth` is the nesting depth after the push
    Open { bracket: char, depth: usize },

    /// `}` or `]` closed; `depth` is the nesting depth after the pop
    Close { bracket: char, depth: usize },

    /// A closer with nothing open
    StrayClose { bracket: char },

    /// A comma outside strings at the given depth
    Comma { depth: usize },

    /// Anything else, including all string content
    Text,
}

/// Character-at-a-time JSON structure tracker.
#[derive(Debug, Clone, Default)]
pub struct JsonScanner {
    state: LexState,
    stack: Vec<char>,
}

impl JsonScanner {
    /// Create a scanner at depth zero, outside any string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a fresh scanner over all of `text`.
    pub fn scan(text: &str) -> Self {
        let mut scanner = Self::new();
        for c in text.chars() {
            scanner.step(c);
        }
        scanner
    }

    /// Advance by one character.
    pub fn step(&mut self, c: char) -> ScanEvent {
        match self.state {
            LexState::Escaped => {
                self.state = LexState::InString;
                ScanEvent::Text
            }
            LexState::InString => {
                match c {
                    '\\' => self.state = LexState::Escaped,
                    '"' => self.state = LexState::Structural,
                    _ => {}
                }
                ScanEvent::Text
            }
            LexState::Structural => match c {
                '"' => {
                    self.state = LexState::InString;
                    ScanEvent::Text
                }
                '{' | '[' => {
                    self.stack.push(c);
                    ScanEvent::Open {
                        bracket: c,
                        depth: self.stack.len(),
                    }
                }
                '}' | ']' => {
                    if self.stack.pop().is_some() {
                        ScanEvent::Close {
                            bracket: c,
                            depth: self.stack.len(),
                        }
                    } else {
                        ScanEvent::StrayClose { bracket: c }
                    }
                }
                ',' => ScanEvent::Comma {
                    depth: self.stack.len(),
                },
                _ => ScanEvent::Text,
            },
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Current lexical state.
    pub fn state(&self) -> LexState {
        self.state
    }

    /// Whether the scanner is inside a string literal.
    pub fn in_string(&self) -> bool {
        self.state != LexState::Structural
    }

    /// Closers that would balance everything still open, innermost first.
    pub fn closers(&self) -> String {
        self.stack
            .iter()
            .rev()
            .map(|open| if *open == '{' { '}' } else { ']' })
            .collect()
    }
}

/// Complete and trailing objects found at the top level of a region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSpans {
    /// Byte ranges of objects that opened and closed at depth zero
    pub complete: Vec<Range<usize>>,

    /// Byte offset of an object that opened but never closed
    pub trailing: Option<usize>,
}

/// Find top-level objects in `text`.
///
/// Scanning stops at the first closer that has no opener, which is how the
/// end of an enclosing array shows up when `text` starts inside it.
pub fn object_spans(text: &str) -> ObjectSpans {
    let mut scanner = JsonScanner::new();
    let mut spans = ObjectSpans::default();
    let mut start: Option<usize> = None;

    for (offset, c) in text.char_indices() {
        match scanner.step(c) {
            ScanEvent::Open { bracket: '{', depth: 1 } => start = Some(offset),
            ScanEvent::Close { bracket, depth: 0 } => {
                if let Some(begin) = start.take() {
                    if bracket == '}' {
                        spans.complete.push(begin..offset + c.len_utf8());
                    }
                }
            }
            ScanEvent::StrayClose { .. } => break,
            _ => {}
        }
    }

    if scanner.depth() > 0 {
        spans.trailing = start;
    }
    spans
}

/// Byte offsets of every comma outside string literals.
pub fn structural_commas(text: &str) -> Vec<usize> {
    let mut scanner = JsonScanner::new();
    text.char_indices()
        .filter(|(_, c)| matches!(scanner.step(*c), ScanEvent::Comma { .. }))
        .map(|(offset, _)| offset)
        .collect()
}

/// Remove `//` and `/* */` comments and trailing commas outside strings.
pub fn sanitize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut scanner = JsonScanner::new();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if !scanner.in_string() {
            if c == '/' && chars.get(i + 1) == Some(&'/') {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }

            if c == '/' && chars.get(i + 1) == Some(&'*') {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
                continue;
            }

            if c == ',' {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if matches!(next, Some('}') | Some(']')) {
                    i += 1;
                    continue;
                }
            }
        }

        scanner.step(c);
        out.push(c);
        i += 1;
    }

    out
}
