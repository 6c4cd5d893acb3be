//! The state of one editing session.
//!
//! ## Learning: One Commit Point
//!
//! Handlers compute an [`Edit`] from the buffer (a pure function) and hand it
//! to [`EditorState::commit`]. That is the only place the buffer changes
//! during editing, so the undo log, the modified flag and the revision
//! counter can never drift apart.

use modex_buffer::{Edit, History, Position, Selection, TextBuffer};
use serde::{Deserialize, Serialize};

use crate::command::StatePatch;
use crate::config::EditorConfig;

/// Editor modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Navigation and operators
    #[default]
    Normal,
    /// Typing text
    Insert,
    /// Charwise selection
    Visual,
    /// Typing an ex command after `:`
    Command,
}

impl Mode {
    /// Label shown in a status line.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
            Mode::Command => "COMMAND",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// The message shown on the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

/// The single yank register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub text: String,
    /// Whole lines (`dd`, `yy`) rather than a character run
    pub linewise: bool,
}

impl Register {
    pub fn charwise(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            linewise: false,
        }
    }

    pub fn linewise(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            linewise: true,
        }
    }
}

/// Scalar state stored with each undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub cursor: Position,
    pub selection: Option<Selection>,
    pub mode: Mode,
}

/// Visible window onto the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Number of visible lines
    pub height: usize,
    /// First visible line
    pub scroll: usize,
}

/// Scalar state restored when a handler fails.
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    mode: Mode,
    cursor: Position,
    selection: Option<Selection>,
    command_line: String,
    scroll: usize,
    in_group: bool,
}

/// What applying a [`StatePatch`] did, for event emission.
#[derive(Debug, Default)]
pub(crate) struct PatchEffects {
    pub saved: Option<String>,
    pub loaded: Option<String>,
    pub quit: bool,
}

/// Everything one editing session knows about its document.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub(crate) mode: Mode,
    pub(crate) buffer: TextBuffer,
    pub(crate) cursor: Position,
    pub(crate) selection: Option<Selection>,
    pub(crate) modified: bool,
    pub(crate) filename: Option<String>,
    pub(crate) command_line: String,
    pub(crate) history: History<StateSnapshot>,
    pub(crate) register: Option<Register>,
    pub(crate) status: Option<StatusMessage>,
    pub(crate) viewport: Viewport,
    pub(crate) line_numbers: bool,
    /// Spaces inserted for Tab, `None` for a literal tab
    pub(crate) expand_tab: Option<usize>,
    /// Bumped on every buffer change
    pub(crate) revision: u64,
}

impl EditorState {
    /// Creates an empty scratch session.
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            mode: Mode::Normal,
            buffer: TextBuffer::new(),
            cursor: Position::ZERO,
            selection: None,
            modified: false,
            filename: None,
            command_line: String::new(),
            history: History::new(config.undo_limit),
            register: None,
            status: None,
            viewport: Viewport {
                height: config.viewport_height.max(1),
                scroll: 0,
            },
            line_numbers: config.line_numbers,
            expand_tab: config.tab_inserts_spaces.then_some(config.tab_width),
            revision: 0,
        }
    }

    // ==================== Accessors ====================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn history(&self) -> &History<StateSnapshot> {
        &self.history
    }

    pub fn register(&self) -> Option<&Register> {
        self.register.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn line_numbers(&self) -> bool {
        self.line_numbers
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ==================== Setup ====================

    /// Replaces the whole document without recording history.
    ///
    /// Used for the initial load and `:e`. The undo log, selection and
    /// modified flag are reset; the cursor goes to the top.
    pub fn load(&mut self, filename: Option<String>, text: &str) {
        self.buffer = TextBuffer::from_text(text);
        self.filename = filename;
        self.history.clear();
        self.cursor = Position::ZERO;
        self.selection = None;
        self.modified = false;
        self.viewport.scroll = 0;
        self.revision += 1;
    }

    /// Moves the cursor, clamped into the buffer.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.buffer.clamp(pos);
        if let Some(selection) = self.selection.as_mut() {
            selection.extend_to(self.cursor);
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, severity: Severity) {
        self.status = Some(StatusMessage {
            text: text.into(),
            severity,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport.height = height.max(1);
        self.scroll_to_cursor();
    }

    // ==================== Mode ====================

    /// Switches mode. Re-entering the current mode is a no-op.
    ///
    /// Entering Insert opens an undo group that leaving it closes; entering
    /// Visual anchors the selection at the cursor; entering or leaving
    /// Command clears the command line.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.mode == mode {
            return false;
        }
        match self.mode {
            Mode::Insert => self.history.end_group(),
            Mode::Visual => self.selection = None,
            Mode::Command => self.command_line.clear(),
            Mode::Normal => {}
        }
        match mode {
            Mode::Insert => self.history.begin_group(),
            Mode::Visual => self.selection = Some(Selection::anchored(self.cursor)),
            Mode::Command => self.command_line.clear(),
            Mode::Normal => {}
        }
        tracing::debug!("Mode {} -> {}", self.mode, mode);
        self.mode = mode;
        true
    }

    // ==================== Editing ====================

    /// Snapshot stored with an undo step.
    ///
    /// Insert and Command are transient, so they are recorded as Normal: an
    /// undo never drops the user back into the middle of a session.
    pub fn snapshot(&self) -> StateSnapshot {
        let mode = match self.mode {
            Mode::Insert | Mode::Command => Mode::Normal,
            other => other,
        };
        StateSnapshot {
            cursor: self.cursor,
            selection: self.selection,
            mode,
        }
    }

    /// Commits an edit: records the change, replaces the lines, moves the
    /// cursor and marks the document modified.
    ///
    /// Returns `false` when no line changed; in that case only the cursor
    /// moves and neither the history nor the modified flag is touched.
    pub fn commit(&mut self, edit: Edit) -> bool {
        let snapshot = self.snapshot();
        let changed = self
            .history
            .record(self.buffer.lines(), &edit.lines, snapshot);
        if changed {
            self.buffer.replace(edit.lines);
            self.modified = true;
            self.revision += 1;
        }
        self.cursor = self.buffer.clamp(edit.cursor);
        changed
    }

    /// Undoes the newest change. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(self.buffer.lines(), current) {
            Some((lines, snapshot)) => {
                self.apply_history(lines, snapshot);
                true
            }
            None => false,
        }
    }

    /// Redoes the newest undone change. Returns `false` when there is none.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(self.buffer.lines(), current) {
            Some((lines, snapshot)) => {
                self.apply_history(lines, snapshot);
                true
            }
            None => false,
        }
    }

    fn apply_history(&mut self, lines: Vec<String>, snapshot: StateSnapshot) {
        self.buffer.replace(lines);
        self.modified = true;
        self.revision += 1;
        self.mode = snapshot.mode;
        self.selection = match snapshot.mode {
            Mode::Visual => snapshot.selection.map(|s| {
                Selection::new(self.buffer.clamp(s.start), self.buffer.clamp(s.end))
            }),
            _ => None,
        };
        self.cursor = self.buffer.clamp(snapshot.cursor);
    }

    // ==================== Viewport ====================

    /// Scrolls so the cursor line is inside `[scroll, scroll + height)`.
    pub fn scroll_to_cursor(&mut self) {
        let Viewport { height, scroll } = self.viewport;
        let line = self.cursor.line;
        if line < scroll {
            self.viewport.scroll = line;
        } else if line >= scroll + height {
            self.viewport.scroll = line + 1 - height;
        }
        let max_scroll = self.buffer.len_lines().saturating_sub(1);
        self.viewport.scroll = self.viewport.scroll.min(max_scroll);
    }

    /// Line range currently on screen.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = self.viewport.scroll.min(self.buffer.last_line());
        let end = (start + self.viewport.height).min(self.buffer.len_lines());
        start..end
    }

    // ==================== Boundary ====================

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            mode: self.mode,
            cursor: self.cursor,
            selection: self.selection,
            command_line: self.command_line.clone(),
            scroll: self.viewport.scroll,
            in_group: self.history.in_group(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.mode = checkpoint.mode;
        self.cursor = self.buffer.clamp(checkpoint.cursor);
        self.selection = checkpoint.selection;
        self.command_line = checkpoint.command_line;
        self.viewport.scroll = checkpoint.scroll;
        match (checkpoint.in_group, self.history.in_group()) {
            (true, false) => self.history.begin_group(),
            (false, true) => self.history.end_group(),
            _ => {}
        }
    }

    /// Merges a command's patch into the state.
    pub(crate) fn apply_patch(&mut self, patch: StatePatch) -> PatchEffects {
        let mut effects = PatchEffects::default();
        if let Some(file) = patch.load {
            self.load(Some(file.filename.clone()), &file.text);
            effects.loaded = Some(file.filename);
        }
        if let Some(filename) = patch.filename {
            self.filename = Some(filename);
        }
        if let Some(modified) = patch.modified {
            self.modified = modified;
            if !modified {
                effects.saved = self.filename.clone();
            }
        }
        if let Some(line_numbers) = patch.line_numbers {
            self.line_numbers = line_numbers;
        }
        effects.quit = patch.quit;
        effects
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str) -> EditorState {
        let mut state = EditorState::default();
        state.load(None, text);
        state
    }

    #[test]
    fn test_commit_records_and_marks_modified() {
        let mut state = state("abc");
        let edit = state.buffer.insert_char(Position::new(0, 3), 'd').unwrap();
        assert!(state.commit(edit));
        assert!(state.is_modified());
        assert_eq!(state.history.undo_count(), 1);
        assert_eq!(state.cursor(), Position::new(0, 4));
    }

    #[test]
    fn test_noop_commit_only_moves_cursor() {
        let mut state = state("abc");
        let edit = state.buffer.delete_after(Position::new(0, 3)).unwrap();
        assert!(!state.commit(edit));
        assert!(!state.is_modified());
        assert_eq!(state.history.undo_count(), 0);
    }

    #[test]
    fn test_undo_restores_snapshot() {
        let mut state = state("abc");
        state.set_cursor(Position::new(0, 1));
        let (edit, _) = state.buffer.delete_char(Position::new(0, 1)).unwrap();
        state.commit(edit);
        state.set_cursor(Position::new(0, 0));

        assert!(state.undo());
        assert_eq!(state.lines(), ["abc"]);
        assert_eq!(state.cursor(), Position::new(0, 1));
        assert!(!state.undo());
    }

    #[test]
    fn test_set_mode_side_effects() {
        let mut state = state("abc");
        assert!(!state.set_mode(Mode::Normal));

        state.set_cursor(Position::new(0, 1));
        state.set_mode(Mode::Visual);
        assert_eq!(state.selection(), Some(Selection::anchored(Position::new(0, 1))));
        state.set_mode(Mode::Normal);
        assert_eq!(state.selection(), None);

        state.set_mode(Mode::Insert);
        assert!(state.history.in_group());
        state.set_mode(Mode::Normal);
        assert!(!state.history.in_group());
    }

    #[test]
    fn test_snapshot_records_transient_modes_as_normal() {
        let mut state = state("abc");
        state.set_mode(Mode::Insert);
        assert_eq!(state.snapshot().mode, Mode::Normal);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let text = (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut state = state(&text);
        state.set_viewport_height(10);

        state.set_cursor(Position::new(50, 0));
        state.scroll_to_cursor();
        assert_eq!(state.viewport().scroll, 41);
        assert_eq!(state.visible_range(), 41..51);

        state.set_cursor(Position::new(3, 0));
        state.scroll_to_cursor();
        assert_eq!(state.viewport().scroll, 3);
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut state = state("abc");
        let checkpoint = state.checkpoint();
        state.set_mode(Mode::Command);
        state.command_line.push_str("wq");
        state.set_cursor(Position::new(0, 2));

        state.restore(checkpoint);
        assert_eq!(state.mode(), Mode::Normal);
        assert_eq!(state.command_line(), "");
        assert_eq!(state.cursor(), Position::ZERO);
    }
}
