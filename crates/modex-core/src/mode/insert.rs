//! Insert mode: typing goes straight into the buffer.

use modex_buffer::motion;

use crate::CoreResult;
use crate::keymap::{Key, KeyPress, Keymap};
use crate::state::{EditorState, Mode};

use super::Transition;
use super::normal::settle;

pub(super) fn handle(
    state: &mut EditorState,
    _keymap: &Keymap,
    key: &KeyPress,
) -> CoreResult<Transition> {
    let pos = state.cursor;
    let buffer = &state.buffer;

    let edit = match key.key {
        Key::Escape => {
            state.set_mode(Mode::Normal);
            state.cursor = settle(&state.buffer, motion::left(&state.buffer, pos));
            return Ok(Transition::Handled);
        }
        Key::Enter => buffer.split_line(pos)?,
        Key::Backspace => buffer.delete_before(pos)?,
        Key::Delete => buffer.delete_after(pos)?,
        Key::Tab => match state.expand_tab {
            Some(width) => buffer.insert_text(pos, &" ".repeat(width))?,
            None => buffer.insert_char(pos, '\t')?,
        },
        Key::Left | Key::Right | Key::Up | Key::Down | Key::Home | Key::End => {
            state.cursor = match key.key {
                Key::Left => motion::left(buffer, pos),
                Key::Right => motion::right(buffer, pos, true),
                Key::Up => motion::up(buffer, pos, 1),
                Key::Down => motion::down(buffer, pos, 1),
                Key::Home => motion::line_start(pos),
                _ => motion::line_end(buffer, pos, true),
            };
            return Ok(Transition::Handled);
        }
        _ => match key.text_char() {
            Some(ch) => buffer.insert_char(pos, ch)?,
            None => return Ok(Transition::Ignored),
        },
    };

    state.commit(edit);
    Ok(Transition::Handled)
}
