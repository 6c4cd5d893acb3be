//! # Modex Syntax
//!
//! Per-line syntax highlighting with a bounded cache.
//!
//! ## Why per-line?
//!
//! A modal editor re-renders the visible lines after every keystroke. A
//! line tokenizer needs no parse state from the lines above it, so each
//! visible line can be tokenized (or fetched from cache) independently:
//! - **Cheap**: only visible lines are touched
//! - **Cacheable**: the same text in the same file always yields the same
//!   tokens, so the key is simply `(filename, line text)`
//! - **Bounded**: overly long lines skip tokenization entirely
//!
//! The trade-off is that constructs spanning lines (a block comment opened
//! on one line and closed three lines later) are only recognized on the line
//! where they start, running to the end of that line.

mod cache;
mod highlighter;
mod language;
mod tokenizer;

pub use cache::{CacheStats, SyntaxCache};
pub use highlighter::{HighlightedLine, Highlighter, SyntaxConfig};
pub use language::Language;
pub use tokenizer::tokenize;

use serde::{Deserialize, Serialize};

/// Errors that can occur during syntax highlighting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
}

/// Types of syntax elements for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    String,
    Comment,
    Number,
    Operator,
    Type,
    Identifier,
}

impl TokenKind {
    /// Returns the theme color key for this kind.
    pub fn theme_key(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Type => "type_name",
            TokenKind::Identifier => "variable",
        }
    }
}

/// A highlighted span of a line.
///
/// `start..end` is a half-open **byte** range into the line, so renderers can
/// slice the text directly with `&line[token.start..token.end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntaxToken {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Kind of syntax element
    pub kind: TokenKind,
}

impl SyntaxToken {
    /// Creates a token.
    pub fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Self { start, end, kind }
    }

    /// Returns the slice of `line` this token covers.
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..self.end]
    }
}
