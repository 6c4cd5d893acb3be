//! Per-mode key handlers.
//!
//! ## Learning: Function Pointers as a Dispatch Table
//!
//! Each mode has exactly one handler with the same signature, and
//! [`handler_for`] is the only place that maps a [`Mode`] to its handler.
//! Adding a mode is a compile error until it gets a handler, because the
//! `match` must stay exhaustive.
//!
//! Handlers are synchronous. The one thing that may need to wait on the
//! host, running an ex command, is handed back to the editor as
//! [`Transition::Execute`].

mod command_line;
mod insert;
mod normal;
mod visual;

use crate::CoreResult;
use crate::keymap::{KeyPress, Keymap};
use crate::state::{EditorState, Mode};

/// What a handler did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The key was consumed
    Handled,
    /// The key means nothing in this mode
    Ignored,
    /// Run this ex command line, then return to Normal
    Execute(String),
}

/// Signature shared by all mode handlers.
pub type ModeHandler = fn(&mut EditorState, &Keymap, &KeyPress) -> CoreResult<Transition>;

/// Returns the handler for a mode.
pub fn handler_for(mode: Mode) -> ModeHandler {
    match mode {
        Mode::Normal => normal::handle,
        Mode::Insert => insert::handle,
        Mode::Visual => visual::handle,
        Mode::Command => command_line::handle,
    }
}
