//! Normal mode: motions, operators and mode entry.

use modex_buffer::{Position, TextBuffer, motion};

use crate::CoreResult;
use crate::keymap::{Action, KeyPress, Keymap};
use crate::state::{EditorState, Mode, Register, Severity};

use super::Transition;

/// Pulls the cursor back onto the last character; Normal mode never rests
/// on the end-of-line position.
pub(super) fn settle(buffer: &TextBuffer, pos: Position) -> Position {
    let pos = buffer.clamp(pos);
    pos.with_column(pos.column.min(motion::last_normal_column(buffer, pos.line)))
}

/// Where a motion action moves the cursor, or `None` for non-motions.
///
/// `visual` lets `l` and `$` reach the end-of-line position.
pub(super) fn motion_target(state: &EditorState, action: Action, visual: bool) -> Option<Position> {
    if !action.is_motion() {
        return None;
    }
    let buffer = &state.buffer;
    let pos = state.cursor;
    let page = state.viewport.height;
    let target = match action {
        Action::MoveLeft => motion::left(buffer, pos),
        Action::MoveRight => motion::right(buffer, pos, visual),
        Action::MoveUp => motion::up(buffer, pos, 1),
        Action::MoveDown => motion::down(buffer, pos, 1),
        Action::WordForward => motion::word_forward(buffer, pos),
        Action::WordBackward => motion::word_backward(buffer, pos),
        Action::WordEnd => motion::word_end(buffer, pos),
        Action::LineStart => motion::line_start(pos),
        Action::LineEnd => motion::line_end(buffer, pos, visual),
        Action::FirstLine => motion::first_line(buffer),
        Action::LastLine => motion::last_line(buffer),
        Action::PageDown => motion::down(buffer, pos, page),
        Action::PageUp => motion::up(buffer, pos, page),
        _ => return None,
    };
    Some(target)
}

pub(super) fn handle(
    state: &mut EditorState,
    keymap: &Keymap,
    key: &KeyPress,
) -> CoreResult<Transition> {
    let Some(action) = keymap.action_for(key) else {
        return Ok(Transition::Ignored);
    };
    tracing::trace!("Normal {} -> {}", key, action);

    if let Some(target) = motion_target(state, action, false) {
        state.cursor = settle(&state.buffer, target);
        return Ok(Transition::Handled);
    }

    match action {
        Action::DeleteChar => {
            let (edit, removed) = state.buffer.delete_char(state.cursor)?;
            if let Some(text) = removed {
                state.register = Some(Register::charwise(text));
            }
            state.commit(edit);
        }
        Action::DeleteLine => {
            let (edit, removed) = state.buffer.delete_line(state.cursor.line)?;
            state.register = Some(Register::linewise(removed));
            state.commit(edit);
        }
        Action::YankLine => {
            state.buffer.check_line(state.cursor.line)?;
            let line = state.buffer.line(state.cursor.line).unwrap_or_default();
            state.register = Some(Register::linewise(line));
        }
        Action::PutAfter => put(state, true)?,
        Action::PutBefore => put(state, false)?,
        Action::Undo => step_history(state, false),
        Action::Redo => step_history(state, true),
        Action::InsertBefore => {
            state.set_mode(Mode::Insert);
        }
        Action::InsertLineStart => {
            state.cursor = motion::line_start(state.cursor);
            state.set_mode(Mode::Insert);
        }
        Action::Append => {
            state.cursor = motion::right(&state.buffer, state.cursor, true);
            state.set_mode(Mode::Insert);
        }
        Action::AppendLineEnd => {
            state.cursor = motion::line_end(&state.buffer, state.cursor, true);
            state.set_mode(Mode::Insert);
        }
        Action::OpenBelow | Action::OpenAbove => {
            let below = action == Action::OpenBelow;
            let edit = state.buffer.open_line(state.cursor.line, below)?;
            // Enter Insert first so the new line joins the insert session's
            // undo step
            state.set_mode(Mode::Insert);
            state.commit(edit);
        }
        Action::VisualMode => {
            state.set_mode(Mode::Visual);
        }
        Action::CommandMode => {
            state.set_mode(Mode::Command);
        }
        _ => return Ok(Transition::Ignored),
    }

    if state.mode == Mode::Normal {
        state.cursor = settle(&state.buffer, state.cursor);
    }
    Ok(Transition::Handled)
}

/// `u` / `<C-r>`, warning at either end of the history.
pub(super) fn step_history(state: &mut EditorState, redo: bool) {
    if redo {
        if !state.redo() {
            state.set_status("Already at newest change", Severity::Warning);
        }
    } else if !state.undo() {
        state.set_status("Already at oldest change", Severity::Warning);
    }
}

/// `p` / `P`: linewise registers go below/above the line, charwise ones
/// after/at the cursor.
fn put(state: &mut EditorState, after: bool) -> CoreResult<()> {
    let Some(register) = state.register.clone() else {
        state.set_status("E353: Nothing in register", Severity::Warning);
        return Ok(());
    };

    let edit = if register.linewise {
        let lines: Vec<String> = register.text.split('\n').map(str::to_string).collect();
        state.buffer.put_lines(state.cursor.line, &lines, after)?
    } else {
        let len = state.buffer.line_len(state.cursor.line);
        let column = if after && len > 0 {
            (state.cursor.column + 1).min(len)
        } else {
            state.cursor.column
        };
        let mut edit = state
            .buffer
            .insert_text(state.cursor.with_column(column), &register.text)?;
        // Rest on the last pasted character
        edit.cursor.column = edit.cursor.column.saturating_sub(1);
        edit
    };
    state.commit(edit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &mut EditorState, keys: &str) {
        let keymap = Keymap::new();
        for key in KeyPress::parse_sequence(keys) {
            handle(state, &keymap, &key).unwrap();
        }
    }

    fn state(text: &str) -> EditorState {
        let mut state = EditorState::default();
        state.load(None, text);
        state
    }

    #[test]
    fn test_motions_stay_on_last_char() {
        let mut s = state("abc\nde");
        run(&mut s, "$");
        assert_eq!(s.cursor(), Position::new(0, 2));
        run(&mut s, "j");
        assert_eq!(s.cursor(), Position::new(1, 1));
        run(&mut s, "l");
        assert_eq!(s.cursor(), Position::new(1, 1));
        run(&mut s, "g");
        assert_eq!(s.cursor(), Position::ZERO);
        run(&mut s, "G");
        assert_eq!(s.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_word_motions() {
        let mut s = state("foo bar_1 baz");
        run(&mut s, "w");
        assert_eq!(s.cursor(), Position::new(0, 3));
        run(&mut s, "w");
        assert_eq!(s.cursor(), Position::new(0, 4));
        run(&mut s, "e");
        assert_eq!(s.cursor(), Position::new(0, 8));
        run(&mut s, "b");
        assert_eq!(s.cursor(), Position::new(0, 4));
    }

    #[test]
    fn test_delete_and_put_line() {
        let mut s = state("one\ntwo\nthree");
        run(&mut s, "dp");
        assert_eq!(s.lines(), ["two", "one", "three"]);
        assert_eq!(s.cursor(), Position::new(1, 0));
        assert!(s.register().unwrap().linewise);
    }

    #[test]
    fn test_x_then_put() {
        let mut s = state("abc");
        run(&mut s, "x");
        assert_eq!(s.lines(), ["bc"]);
        assert_eq!(s.register(), Some(&Register::charwise("a")));
        run(&mut s, "p");
        assert_eq!(s.lines(), ["bac"]);
        assert_eq!(s.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_yank_does_not_modify() {
        let mut s = state("abc\ndef");
        run(&mut s, "yP");
        assert_eq!(s.lines(), ["abc", "abc", "def"]);
        assert_eq!(s.history().undo_count(), 1);
    }

    #[test]
    fn test_put_with_empty_register_warns() {
        let mut s = state("abc");
        run(&mut s, "p");
        assert_eq!(s.status().unwrap().severity, Severity::Warning);
        assert!(!s.is_modified());
    }

    #[test]
    fn test_undo_redo_boundaries() {
        let mut s = state("abc");
        run(&mut s, "u");
        assert_eq!(s.status().unwrap().text, "Already at oldest change");
        run(&mut s, "<C-r>");
        assert_eq!(s.status().unwrap().text, "Already at newest change");
        assert_eq!(s.lines(), ["abc"]);
        assert!(!s.is_modified());
    }

    #[test]
    fn test_mode_entry_positions() {
        let mut s = state("abc");
        run(&mut s, "A");
        assert_eq!((s.mode(), s.cursor()), (Mode::Insert, Position::new(0, 3)));

        let mut s = state("abc");
        run(&mut s, "la");
        assert_eq!(s.cursor(), Position::new(0, 2));

        let mut s = state("abc");
        run(&mut s, "$I");
        assert_eq!(s.cursor(), Position::new(0, 0));
    }

    #[test]
    fn test_open_line_above() {
        let mut s = state("abc");
        run(&mut s, "O");
        assert_eq!(s.lines(), ["", "abc"]);
        assert_eq!(s.mode(), Mode::Insert);
        assert_eq!(s.cursor(), Position::ZERO);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut s = state("abc");
        let result = handle(&mut s, &Keymap::new(), &KeyPress::char('z')).unwrap();
        assert_eq!(result, Transition::Ignored);
    }
}
