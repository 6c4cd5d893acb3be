//! Core line buffer.
//!
//! ## Why a Vec of lines?
//!
//! A modal editor thinks in lines: `dd`, `o`, `j`/`k`, line diffs for undo.
//! Keeping one `String` per line makes each of those an index operation and
//! makes the undo log a per-line patch instead of a whole-text snapshot.
//!
//! ## Invariant
//!
//! The buffer is never empty. A document with no content is a single empty
//! line, and every constructor and [`TextBuffer::replace`] enforce that.

use crate::{BufferError, BufferResult, Position};

/// An ordered, never-empty sequence of text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl TextBuffer {
    /// Creates a buffer holding one empty line.
    ///
    /// # Example
    /// ```
    /// use modex_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// assert_eq!(buffer.len_lines(), 1);
    /// ```
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Creates a buffer from already-split lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut buffer = Self { lines };
        buffer.ensure_line();
        buffer
    }

    /// Parses file content into lines.
    ///
    /// Accepts `\n` and `\r\n` line endings. A single trailing newline
    /// terminates the last line rather than starting a new one.
    pub fn from_text(text: &str) -> Self {
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = body
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self::from_lines(lines)
    }

    /// Serializes the buffer for saving.
    ///
    /// Every line is newline-terminated, except that an empty buffer
    /// serializes to the empty string.
    pub fn to_text(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    // ==================== Text Access ====================

    /// Returns all lines.
    #[inline]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns a specific line (0-indexed), without a trailing newline.
    pub fn line(&self, line_idx: usize) -> Option<&str> {
        self.lines.get(line_idx).map(String::as_str)
    }

    /// Returns the character at a position, if any.
    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.line(pos.line)?.chars().nth(pos.column)
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is a single empty line.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Returns the number of lines. Always at least 1.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last line.
    #[inline]
    pub fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    /// Length of a line in characters; 0 for lines that do not exist.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line(line_idx).map_or(0, |l| l.chars().count())
    }

    // ==================== Bounds ====================

    /// Clamps a position into `0 <= line < len` and `0 <= column <= line_len`.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());
        let column = pos.column.min(self.line_len(line));
        Position { line, column }
    }

    /// Verifies a position lies within the buffer.
    ///
    /// # Learning: Bounds Checking
    ///
    /// Primitives validate input before computing anything. An invalid
    /// position is an internal error, never silently "fixed" here; the caller
    /// decides whether to clamp.
    pub fn check(&self, pos: Position) -> BufferResult<()> {
        if pos.line >= self.lines.len() || pos.column > self.line_len(pos.line) {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }
        Ok(())
    }

    /// Verifies a line index exists.
    pub fn check_line(&self, line_idx: usize) -> BufferResult<()> {
        if line_idx >= self.lines.len() {
            return Err(BufferError::LineOutOfBounds(line_idx));
        }
        Ok(())
    }

    // ==================== Mutation ====================

    /// Replaces the content wholesale.
    ///
    /// Returns `false` (and leaves the buffer untouched) when `lines` equals
    /// the current content. This is the single commit point for edits.
    pub fn replace(&mut self, lines: Vec<String>) -> bool {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        if lines == self.lines {
            return false;
        }
        self.lines = lines;
        true
    }

    fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from_text(&s)
    }
}

impl From<Vec<String>> for TextBuffer {
    fn from(lines: Vec<String>) -> Self {
        Self::from_lines(lines)
    }
}

/// Converts a character column into a byte offset within `line`.
///
/// Columns past the end map to `line.len()`.
pub(crate) fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(idx, _)| idx)
}
