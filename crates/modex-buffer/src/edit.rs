//! Editing primitives.
//!
//! ## Learning: Compute, then Commit
//!
//! Every primitive borrows the buffer immutably (`&self`) and returns an
//! [`Edit`]: the complete new line vector plus where the cursor should land.
//! Nothing is written until the caller hands `edit.lines` to
//! [`TextBuffer::replace`]. If a primitive fails halfway, there is no
//! half-applied state to clean up.

use crate::buffer::byte_offset;
use crate::{BufferResult, Position, TextBuffer};

/// The result of an editing primitive: new content and new cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Complete buffer content after the edit
    pub lines: Vec<String>,
    /// Cursor position after the edit
    pub cursor: Position,
}

impl TextBuffer {
    fn edit(&self, lines: Vec<String>, cursor: Position) -> Edit {
        Edit { lines, cursor }
    }

    /// Inserts a character at `pos`; the column advances by one.
    pub fn insert_char(&self, pos: Position, ch: char) -> BufferResult<Edit> {
        self.check(pos)?;
        let mut lines = self.lines().to_vec();
        let line = &mut lines[pos.line];
        let at = byte_offset(line, pos.column);
        line.insert(at, ch);
        Ok(self.edit(lines, pos.with_column(pos.column + 1)))
    }

    /// Inserts (possibly multi-line) text at `pos`.
    ///
    /// The cursor lands on the last inserted character's successor.
    pub fn insert_text(&self, pos: Position, text: &str) -> BufferResult<Edit> {
        self.check(pos)?;
        let mut lines = self.lines().to_vec();
        let current = &lines[pos.line];
        let split = byte_offset(current, pos.column);
        let head = current[..split].to_string();
        let tail = current[split..].to_string();

        let mut pieces: Vec<String> = text.split('\n').map(str::to_string).collect();
        let last_len = pieces.last().map_or(0, |p| p.chars().count());
        let added_lines = pieces.len() - 1;
        let cursor = if added_lines == 0 {
            pos.with_column(pos.column + last_len)
        } else {
            Position::new(pos.line + added_lines, last_len)
        };

        pieces[0] = head + &pieces[0];
        if let Some(last) = pieces.last_mut() {
            last.push_str(&tail);
        }
        lines.splice(pos.line..=pos.line, pieces);
        Ok(self.edit(lines, cursor))
    }

    /// Backspace.
    ///
    /// Removes the character before the cursor, or joins with the previous
    /// line when the cursor is at column 0. At the very start of the buffer
    /// the edit is a no-op.
    pub fn delete_before(&self, pos: Position) -> BufferResult<Edit> {
        self.check(pos)?;
        let mut lines = self.lines().to_vec();
        if pos.column > 0 {
            let line = &mut lines[pos.line];
            let at = byte_offset(line, pos.column - 1);
            line.remove(at);
            return Ok(self.edit(lines, pos.with_column(pos.column - 1)));
        }
        if pos.line == 0 {
            return Ok(self.edit(lines, pos));
        }
        let current = lines.remove(pos.line);
        let prev = &mut lines[pos.line - 1];
        let join = prev.chars().count();
        prev.push_str(&current);
        Ok(self.edit(lines, Position::new(pos.line - 1, join)))
    }

    /// Forward delete.
    ///
    /// Removes the character under the cursor, or joins the next line onto
    /// this one when the cursor is at end-of-line. The cursor never moves.
    pub fn delete_after(&self, pos: Position) -> BufferResult<Edit> {
        self.check(pos)?;
        let mut lines = self.lines().to_vec();
        if pos.column < self.line_len(pos.line) {
            let line = &mut lines[pos.line];
            let at = byte_offset(line, pos.column);
            line.remove(at);
        } else if pos.line < self.last_line() {
            let next = lines.remove(pos.line + 1);
            lines[pos.line].push_str(&next);
        }
        Ok(self.edit(lines, pos))
    }

    /// Deletes the character under the cursor (`x`), returning it.
    ///
    /// Unlike [`TextBuffer::delete_after`] this never joins lines. The cursor
    /// is pulled back onto the last character when the line gets shorter.
    pub fn delete_char(&self, pos: Position) -> BufferResult<(Edit, Option<String>)> {
        self.check(pos)?;
        let len = self.line_len(pos.line);
        if pos.column >= len {
            return Ok((self.edit(self.lines().to_vec(), pos), None));
        }
        let mut lines = self.lines().to_vec();
        let line = &mut lines[pos.line];
        let at = byte_offset(line, pos.column);
        let removed = line.remove(at);
        let column = pos.column.min(len.saturating_sub(2));
        Ok((self.edit(lines, pos.with_column(column)), Some(removed.to_string())))
    }

    /// Enter: splits the line at the cursor; the cursor moves to column 0
    /// of the new line.
    pub fn split_line(&self, pos: Position) -> BufferResult<Edit> {
        self.check(pos)?;
        let mut lines = self.lines().to_vec();
        let line = &mut lines[pos.line];
        let at = byte_offset(line, pos.column);
        let tail = line.split_off(at);
        lines.insert(pos.line + 1, tail);
        Ok(self.edit(lines, Position::new(pos.line + 1, 0)))
    }

    /// Opens an empty line below (`o`) or above (`O`) `line_idx`.
    pub fn open_line(&self, line_idx: usize, below: bool) -> BufferResult<Edit> {
        self.check_line(line_idx)?;
        let mut lines = self.lines().to_vec();
        let at = if below { line_idx + 1 } else { line_idx };
        lines.insert(at, String::new());
        Ok(self.edit(lines, Position::new(at, 0)))
    }

    /// Deletes a whole line, returning its content.
    ///
    /// The only line of the buffer is cleared instead of removed.
    pub fn delete_line(&self, line_idx: usize) -> BufferResult<(Edit, String)> {
        self.check_line(line_idx)?;
        let mut lines = self.lines().to_vec();
        if lines.len() == 1 {
            let removed = std::mem::take(&mut lines[0]);
            return Ok((self.edit(lines, Position::ZERO), removed));
        }
        let removed = lines.remove(line_idx);
        let line = line_idx.min(lines.len() - 1);
        Ok((self.edit(lines, Position::new(line, 0)), removed))
    }

    /// Deletes the inclusive character range `start..=end`.
    ///
    /// `end` may sit at end-of-line, in which case the line break is part of
    /// the range and the following line is joined. Returns the removed text
    /// with `\n` for each removed line break.
    pub fn delete_range(&self, start: Position, end: Position) -> BufferResult<(Edit, String)> {
        self.check(start)?;
        self.check(end)?;
        let (start, end) = if end.is_before(&start) {
            (end, start)
        } else {
            (start, end)
        };

        // Convert the inclusive end into an exclusive one.
        let end_exclusive = if end.column < self.line_len(end.line) {
            end.with_column(end.column + 1)
        } else if end.line < self.last_line() {
            Position::new(end.line + 1, 0)
        } else {
            end
        };

        let lines_ref = self.lines();
        let first = &lines_ref[start.line];
        let last = &lines_ref[end_exclusive.line];
        let head = &first[..byte_offset(first, start.column)];
        let tail = &last[byte_offset(last, end_exclusive.column)..];

        let removed = if start.line == end_exclusive.line {
            first[byte_offset(first, start.column)..byte_offset(first, end_exclusive.column)]
                .to_string()
        } else {
            let mut text = first[byte_offset(first, start.column)..].to_string();
            for line in &lines_ref[start.line + 1..end_exclusive.line] {
                text.push('\n');
                text.push_str(line);
            }
            text.push('\n');
            text.push_str(&last[..byte_offset(last, end_exclusive.column)]);
            text
        };

        let joined = format!("{head}{tail}");
        let mut lines = lines_ref.to_vec();
        lines.splice(start.line..=end_exclusive.line, std::iter::once(joined));
        Ok((self.edit(lines, start), removed))
    }

    /// Inserts whole lines below (`p`) or above (`P`) `line_idx`.
    ///
    /// The cursor lands at column 0 of the first inserted line.
    pub fn put_lines(&self, line_idx: usize, new_lines: &[String], below: bool) -> BufferResult<Edit> {
        self.check_line(line_idx)?;
        let mut lines = self.lines().to_vec();
        let at = if below { line_idx + 1 } else { line_idx };
        lines.splice(at..at, new_lines.iter().cloned());
        Ok(self.edit(lines, Position::new(at, 0)))
    }
}
