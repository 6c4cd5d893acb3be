//! # Modex Buffer
//!
//! Line-oriented text buffer for a modal editor, together with the pure
//! editing primitives, cursor motions and the diff-based undo history.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Ownership & Borrowing
//! - `TextBuffer` owns its lines (`Vec<String>`)
//! - Editing primitives borrow the buffer immutably and return a new
//!   [`Edit`]; nothing is mutated until the caller commits it
//! - Commit happens in exactly one place (`TextBuffer::replace`), which is
//!   what lets the undo log see every change
//!
//! ### Memory Safety
//! - Columns are character offsets, converted to byte offsets only inside
//!   this crate, so callers can never slice through a UTF-8 sequence

mod buffer;
mod cursor;
mod diff;
mod edit;
mod history;
pub mod motion;
mod selection;

pub use buffer::TextBuffer;
pub use cursor::Position;
pub use diff::{DiffOp, LineDiff, apply_diff, compose_diffs, compute_diff};
pub use edit::Edit;
pub use history::{Change, History};
pub use selection::Selection;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Line {0} does not exist")]
    LineOutOfBounds(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_lines(), 1);
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("Hello, World!");
        assert_eq!(buffer.len_lines(), 1);
        assert_eq!(buffer.to_text(), "Hello, World!\n");
    }

    #[test]
    fn test_edit_then_replace() {
        let mut buffer = TextBuffer::from("Hello");
        let edit = buffer.insert_char(Position::new(0, 5), '!').unwrap();
        assert!(buffer.replace(edit.lines));
        assert_eq!(buffer.line(0), Some("Hello!"));
        assert_eq!(edit.cursor, Position::new(0, 6));
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("Line 1\nLine 2\nLine 3");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line(0), Some("Line 1"));
        assert_eq!(buffer.line(2), Some("Line 3"));
        assert_eq!(buffer.line(3), None);
    }
}
