//! Visual mode: charwise selection between an anchor and the cursor.
//!
//! Motions come from the Normal keymap and extend the selection. Only a
//! handful of operators apply here; every other bound action is ignored.

use modex_buffer::Position;

use crate::CoreResult;
use crate::keymap::{Action, Key, KeyPress, Keymap};
use crate::state::{EditorState, Mode, Register};

use super::Transition;
use super::normal::{motion_target, settle, step_history};

pub(super) fn handle(
    state: &mut EditorState,
    keymap: &Keymap,
    key: &KeyPress,
) -> CoreResult<Transition> {
    if key.key == Key::Escape {
        leave(state);
        return Ok(Transition::Handled);
    }

    let Some(action) = keymap.action_for(key) else {
        return Ok(Transition::Ignored);
    };

    if let Some(target) = motion_target(state, action, true) {
        state.set_cursor(target);
        return Ok(Transition::Handled);
    }

    match action {
        Action::VisualMode => leave(state),
        Action::DeleteChar | Action::DeleteLine => {
            let (start, end) = selected_range(state);
            let (edit, removed) = state.buffer.delete_range(start, end)?;
            state.register = Some(Register::charwise(removed));
            // Commit while still in Visual so undo restores the selection
            state.commit(edit);
            leave(state);
        }
        Action::YankLine => {
            let (start, end) = selected_range(state);
            let (_, text) = state.buffer.delete_range(start, end)?;
            state.register = Some(Register::charwise(text));
            state.cursor = start;
            leave(state);
        }
        // Undo can land back in Visual, so history keys must work here too
        Action::Undo | Action::Redo => {
            step_history(state, action == Action::Redo);
            if state.mode == Mode::Normal {
                state.cursor = settle(&state.buffer, state.cursor);
            }
        }
        _ => return Ok(Transition::Ignored),
    }
    Ok(Transition::Handled)
}

fn selected_range(state: &EditorState) -> (Position, Position) {
    state
        .selection
        .map(|s| s.normalized())
        .unwrap_or((state.cursor, state.cursor))
}

fn leave(state: &mut EditorState) {
    state.set_mode(Mode::Normal);
    state.cursor = settle(&state.buffer, state.cursor);
}

#[cfg(test)]
mod tests {
    use modex_buffer::Selection;

    use super::*;

    fn visual_state(text: &str, at: Position) -> EditorState {
        let mut state = EditorState::default();
        state.load(None, text);
        state.set_cursor(at);
        state.set_mode(Mode::Visual);
        state
    }

    fn run(state: &mut EditorState, keys: &str) {
        let keymap = Keymap::new();
        for key in KeyPress::parse_sequence(keys) {
            handle(state, &keymap, &key).unwrap();
        }
    }

    #[test]
    fn test_motion_extends_selection() {
        let mut s = visual_state("hello world", Position::new(0, 2));
        run(&mut s, "w");
        assert_eq!(
            s.selection(),
            Some(Selection::new(Position::new(0, 2), Position::new(0, 5)))
        );
    }

    #[test]
    fn test_dollar_reaches_line_end() {
        let mut s = visual_state("abc", Position::ZERO);
        run(&mut s, "$");
        assert_eq!(s.cursor(), Position::new(0, 3));
    }

    #[test]
    fn test_delete_selection() {
        let mut s = visual_state("hello world", Position::new(0, 1));
        run(&mut s, "lld");
        assert_eq!(s.lines(), ["ho world"]);
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.cursor(), Position::new(0, 1));
        assert_eq!(s.register(), Some(&Register::charwise("ell")));
    }

    #[test]
    fn test_backward_selection_is_normalized() {
        let mut s = visual_state("abcdef", Position::new(0, 4));
        run(&mut s, "hhx");
        assert_eq!(s.lines(), ["abf"]);
    }

    #[test]
    fn test_delete_across_lines_joins() {
        let mut s = visual_state("ab\ncd", Position::new(0, 1));
        run(&mut s, "jd");
        assert_eq!(s.lines(), ["a"]);
        assert_eq!(s.register().unwrap().text, "b\ncd");
    }

    #[test]
    fn test_undo_restores_selection() {
        let mut s = visual_state("hello", Position::new(0, 1));
        run(&mut s, "ld");
        assert!(s.undo());
        assert_eq!(s.lines(), ["hello"]);
        assert_eq!(s.mode(), Mode::Visual);
        assert_eq!(
            s.selection(),
            Some(Selection::new(Position::new(0, 1), Position::new(0, 2)))
        );
    }

    #[test]
    fn test_history_keys_work_after_undo_into_visual() {
        let mut s = visual_state("hello", Position::ZERO);
        run(&mut s, "ld");
        assert_eq!(s.lines(), ["llo"]);
        assert!(s.undo());
        assert_eq!(s.mode(), Mode::Visual);

        run(&mut s, "<C-r>");
        assert_eq!(s.lines(), ["llo"]);
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.cursor(), Position::ZERO);

        assert!(s.undo());
        run(&mut s, "u");
        assert_eq!(s.lines(), ["hello"]);
        assert_eq!(s.mode(), Mode::Visual);
        assert_eq!(s.status().unwrap().text, "Already at oldest change");
    }

    #[test]
    fn test_yank_leaves_text() {
        let mut s = visual_state("hello", Position::new(0, 3));
        run(&mut s, "hhy");
        assert_eq!(s.lines(), ["hello"]);
        assert!(!s.is_modified());
        assert_eq!(s.cursor(), Position::new(0, 1));
        assert_eq!(s.register().unwrap().text, "ell");
    }

    #[test]
    fn test_escape_and_v_leave() {
        let mut s = visual_state("abc", Position::ZERO);
        run(&mut s, "$<Esc>");
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.selection(), None);
        assert_eq!(s.cursor(), Position::new(0, 2));

        let mut s = visual_state("abc", Position::ZERO);
        run(&mut s, "v");
        assert_eq!(s.mode(), Mode::Normal);
    }
}
