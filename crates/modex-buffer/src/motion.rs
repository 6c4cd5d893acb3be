//! Cursor motions.
//!
//! Every function here is pure: it takes the buffer and a position and
//! returns a new position that already satisfies the buffer bounds
//! (`line < len_lines`, `column <= line_len`). Callers never need to clamp
//! the result again.
//!
//! Word motions use two character classes only: word characters
//! (`[A-Za-z0-9_]`) and everything else. Whitespace is "everything else",
//! so `w` on `foo bar` stops on the space.

use crate::{Position, TextBuffer};

/// Returns true for `[A-Za-z0-9_]`.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn line_chars(buffer: &TextBuffer, line: usize) -> Vec<char> {
    buffer.line(line).map_or_else(Vec::new, |l| l.chars().collect())
}

/// Last column the cursor may occupy in Normal mode (on the last char).
pub fn last_normal_column(buffer: &TextBuffer, line: usize) -> usize {
    buffer.line_len(line).saturating_sub(1)
}

// ==================== Character / Line ====================

/// `h`: one column left, stopping at column 0.
pub fn left(buffer: &TextBuffer, pos: Position) -> Position {
    buffer.clamp(pos.with_column(pos.column.saturating_sub(1)))
}

/// `l`: one column right.
///
/// With `past_end` the cursor may reach the end-of-line position (Insert and
/// Visual); without it, it stops on the last character (Normal).
pub fn right(buffer: &TextBuffer, pos: Position, past_end: bool) -> Position {
    let limit = if past_end {
        buffer.line_len(pos.line)
    } else {
        last_normal_column(buffer, pos.line)
    };
    buffer.clamp(pos.with_column((pos.column + 1).min(limit.max(pos.column))))
}

/// `k`: `count` lines up, keeping the column where the line allows it.
pub fn up(buffer: &TextBuffer, pos: Position, count: usize) -> Position {
    buffer.clamp(Position::new(pos.line.saturating_sub(count), pos.column))
}

/// `j`: `count` lines down, keeping the column where the line allows it.
pub fn down(buffer: &TextBuffer, pos: Position, count: usize) -> Position {
    let line = pos.line.saturating_add(count).min(buffer.last_line());
    buffer.clamp(Position::new(line, pos.column))
}

/// `0`
pub fn line_start(pos: Position) -> Position {
    pos.with_column(0)
}

/// `$`
///
/// Normal mode stops one before the line end; Visual mode lands on the
/// line-end position itself so the selection can include the line break.
pub fn line_end(buffer: &TextBuffer, pos: Position, visual: bool) -> Position {
    let column = if visual {
        buffer.line_len(pos.line)
    } else {
        last_normal_column(buffer, pos.line)
    };
    buffer.clamp(pos.with_column(column))
}

/// `gg` (and a bare `g`)
pub fn first_line(_buffer: &TextBuffer) -> Position {
    Position::ZERO
}

/// `G`
pub fn last_line(buffer: &TextBuffer) -> Position {
    Position::new(buffer.last_line(), 0)
}

// ==================== Words ====================

/// Index of the first class boundary strictly after `from`, if any.
///
/// A boundary at `j` means `chars[j - 1]` and `chars[j]` differ in class.
fn next_boundary(chars: &[char], from: usize) -> Option<usize> {
    (from + 1..chars.len()).find(|&j| is_word_char(chars[j - 1]) != is_word_char(chars[j]))
}

/// `w`: next class boundary after the cursor.
///
/// At end-of-line the cursor wraps to column 0 of the next line; on the last
/// line it stops at end-of-line.
pub fn word_forward(buffer: &TextBuffer, pos: Position) -> Position {
    let pos = buffer.clamp(pos);
    let chars = line_chars(buffer, pos.line);
    if let Some(j) = next_boundary(&chars, pos.column) {
        return pos.with_column(j);
    }
    if pos.line < buffer.last_line() {
        Position::new(pos.line + 1, 0)
    } else {
        pos.with_column(chars.len())
    }
}

/// `b`: start of the class run before the cursor.
///
/// At column 0 the cursor wraps to the end of the previous line.
pub fn word_backward(buffer: &TextBuffer, pos: Position) -> Position {
    let pos = buffer.clamp(pos);
    if pos.column == 0 {
        if pos.line == 0 {
            return pos;
        }
        let prev = pos.line - 1;
        return Position::new(prev, buffer.line_len(prev));
    }
    let chars = line_chars(buffer, pos.line);
    let mut j = pos.column - 1;
    while j > 0 && is_word_char(chars[j - 1]) == is_word_char(chars[j]) {
        j -= 1;
    }
    pos.with_column(j)
}

/// `e`: one column before the next class boundary.
///
/// Repeated presses advance from run end to run end; when the current line
/// is exhausted the search continues on the next line.
pub fn word_end(buffer: &TextBuffer, pos: Position) -> Position {
    let pos = buffer.clamp(pos);
    let chars = line_chars(buffer, pos.line);
    if pos.column + 1 < chars.len() {
        let end = next_boundary(&chars, pos.column + 1).map_or(chars.len() - 1, |j| j - 1);
        return pos.with_column(end);
    }
    if pos.line < buffer.last_line() {
        let next = pos.line + 1;
        let chars = line_chars(buffer, next);
        let end = next_boundary(&chars, 0).map_or(chars.len().saturating_sub(1), |j| j - 1);
        return Position::new(next, end);
    }
    pos
}
