//! Command mode: edits the `:` line and hands it off on Enter.

use crate::CoreResult;
use crate::keymap::{Key, KeyPress, Keymap};
use crate::state::{EditorState, Mode};

use super::Transition;

pub(super) fn handle(
    state: &mut EditorState,
    _keymap: &Keymap,
    key: &KeyPress,
) -> CoreResult<Transition> {
    match key.key {
        Key::Escape => {
            state.set_mode(Mode::Normal);
        }
        Key::Enter => {
            let line = std::mem::take(&mut state.command_line);
            return Ok(Transition::Execute(line));
        }
        Key::Backspace => {
            if state.command_line.pop().is_none() {
                state.set_mode(Mode::Normal);
            }
        }
        _ => match key.text_char() {
            Some(ch) => state.command_line.push(ch),
            None => return Ok(Transition::Ignored),
        },
    }
    Ok(Transition::Handled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_state() -> EditorState {
        let mut state = EditorState::default();
        state.set_mode(Mode::Command);
        state
    }

    fn feed(state: &mut EditorState, keys: &str) -> Vec<Transition> {
        let keymap = Keymap::new();
        KeyPress::parse_sequence(keys)
            .iter()
            .map(|key| handle(state, &keymap, key).unwrap())
            .collect()
    }

    #[test]
    fn test_enter_hands_off_line() {
        let mut s = command_state();
        let transitions = feed(&mut s, "w foo<CR>");
        assert_eq!(
            transitions.last(),
            Some(&Transition::Execute("w foo".to_string()))
        );
        assert_eq!(s.command_line(), "");
    }

    #[test]
    fn test_backspace_edits_then_leaves() {
        let mut s = command_state();
        feed(&mut s, "qa<BS>");
        assert_eq!(s.command_line(), "q");
        feed(&mut s, "<BS>");
        assert_eq!(s.mode(), Mode::Command);
        feed(&mut s, "<BS>");
        assert_eq!(s.mode(), Mode::Normal);
    }

    #[test]
    fn test_escape_discards_line() {
        let mut s = command_state();
        feed(&mut s, "set<Esc>");
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.command_line(), "");
    }

    #[test]
    fn test_navigation_keys_are_ignored() {
        let mut s = command_state();
        assert_eq!(feed(&mut s, "<Up>"), [Transition::Ignored]);
    }
}
