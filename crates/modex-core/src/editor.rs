//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. External code only needs to interact with
//! `Editor`, not individual components.
//!
//! ## The Controller Boundary
//!
//! [`Editor::handle_key`] is where key events enter. It picks the handler
//! for the current mode, runs any ex command the handler hands back, and
//! catches every error: the scalar state is rolled back to a checkpoint
//! and the error becomes a status message. Nothing a key does can make
//! the engine itself fail.

use modex_buffer::Position;
use modex_syntax::{HighlightedLine, Highlighter};
use tokio::sync::broadcast;

use crate::command::{CommandRegistry, OperationResult, builtin};
use crate::config::Config;
use crate::event::{EditorEvent, EventBus};
use crate::host::HostAdapter;
use crate::keymap::{KeyPress, Keymap};
use crate::mode::{self, Transition};
use crate::snapshot::EditorSnapshot;
use crate::state::{EditorState, Mode, Severity, StatusMessage};

/// What subscribers last saw, to decide which events a key produced.
struct Observed {
    mode: Mode,
    revision: u64,
    cursor: Position,
    status: Option<StatusMessage>,
}

impl Observed {
    fn of(state: &EditorState) -> Self {
        Self {
            mode: state.mode(),
            revision: state.revision(),
            cursor: state.cursor(),
            status: state.status().cloned(),
        }
    }
}

/// One editing session over a host.
///
/// ## Thread Safety
///
/// `Editor` is owned by a single task. Host calls are awaited in place, so
/// one event is fully processed before the next one starts.
pub struct Editor<H: HostAdapter> {
    /// Document, cursor, history and the rest of the session
    state: EditorState,

    /// File access and exit
    host: H,

    /// Editor configuration
    config: Config,

    /// Normal/Visual key bindings
    keymap: Keymap,

    /// Ex commands
    commands: CommandRegistry<H>,

    /// Per-line tokenizer with its cache
    highlighter: Highlighter,

    /// Event bus for notifications
    event_bus: EventBus,

    /// Whether the editor should quit
    should_quit: bool,
}

impl<H: HostAdapter> Editor<H> {
    /// Creates an editor with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(host: H, config: Config) -> Self {
        let keymap = Keymap::from_config(&config);
        Self {
            state: EditorState::new(&config.editor),
            host,
            highlighter: Highlighter::new(config.syntax.clone()),
            keymap,
            commands: CommandRegistry::with_builtins(),
            event_bus: EventBus::new(),
            config,
            should_quit: false,
        }
    }

    // ==================== Documents ====================

    /// Loads a file through the host. A file that cannot be read opens as
    /// an empty new file under that name.
    pub async fn open(&mut self, filename: &str) {
        let before = Observed::of(&self.state);
        match self.host.load_file(filename).await {
            Ok(text) => {
                tracing::info!("Opened {} ({} bytes)", filename, text.len());
                self.state.load(Some(filename.to_string()), &text);
                let message = builtin::describe(filename, &text, self.state.buffer().len_lines());
                self.state.set_status(message, Severity::Info);
            }
            Err(e) => {
                tracing::debug!("Opening {} as a new file: {}", filename, e);
                self.state.load(Some(filename.to_string()), "");
                self.state
                    .set_status(format!("\"{filename}\" [New File]"), Severity::Info);
            }
        }
        self.emit(EditorEvent::Loaded(filename.to_string()));
        self.emit_changes(before);
    }

    /// Replaces the document with `text` without touching the host.
    pub fn load_text(&mut self, filename: Option<&str>, text: &str) {
        let before = Observed::of(&self.state);
        self.state.load(filename.map(str::to_string), text);
        self.emit_changes(before);
    }

    // ==================== Input ====================

    /// Processes one key event.
    ///
    /// The status message is cleared first, so after the call it reflects
    /// this key only.
    pub async fn handle_key(&mut self, key: KeyPress) -> Transition {
        self.state.clear_status();
        let before = Observed::of(&self.state);
        let checkpoint = self.state.checkpoint();

        let handler = mode::handler_for(self.state.mode());
        let transition = match handler(&mut self.state, &self.keymap, &key) {
            Ok(Transition::Execute(line)) => {
                self.execute_command(&line).await;
                Transition::Execute(line)
            }
            Ok(transition) => transition,
            Err(e) => {
                tracing::warn!("Key {} failed in {} mode: {}", key, before.mode, e);
                self.state.restore(checkpoint);
                self.state.set_status(e.to_string(), Severity::Error);
                Transition::Handled
            }
        };

        self.state.scroll_to_cursor();
        self.emit_changes(before);
        transition
    }

    /// Processes a sequence of key events in order.
    pub async fn handle_keys(&mut self, keys: impl IntoIterator<Item = KeyPress>) {
        for key in keys {
            self.handle_key(key).await;
        }
    }

    /// Runs an ex command line (without the leading `:`), merges its result
    /// and returns to Normal mode.
    pub async fn execute_command(&mut self, line: &str) -> OperationResult {
        let result = self.commands.execute(line, &self.state, &self.host).await;

        if let Some(message) = &result.message {
            self.state
                .set_status(message.clone(), result.effective_severity());
        }
        if let Some(patch) = result.patch.clone() {
            let effects = self.state.apply_patch(patch);
            if let Some(name) = effects.loaded {
                self.emit(EditorEvent::Loaded(name));
            }
            if let Some(name) = effects.saved {
                self.emit(EditorEvent::Saved(name));
            }
            if effects.quit {
                self.quit();
            }
        }

        self.state.set_mode(Mode::Normal);
        result
    }

    /// Ends the session. Only the first call reaches the host.
    pub fn quit(&mut self) {
        if self.should_quit {
            return;
        }
        tracing::info!("Quitting");
        self.should_quit = true;
        self.host.exit_editor();
        self.emit(EditorEvent::Quit);
    }

    // ==================== Editing ====================

    /// Undoes the newest change, warning when there is none.
    pub fn undo(&mut self) -> bool {
        let before = Observed::of(&self.state);
        let undone = self.state.undo();
        if !undone {
            self.state
                .set_status("Already at oldest change", Severity::Warning);
        }
        self.state.scroll_to_cursor();
        self.emit_changes(before);
        undone
    }

    /// Redoes the newest undone change, warning when there is none.
    pub fn redo(&mut self) -> bool {
        let before = Observed::of(&self.state);
        let redone = self.state.redo();
        if !redone {
            self.state
                .set_status("Already at newest change", Severity::Warning);
        }
        self.state.scroll_to_cursor();
        self.emit_changes(before);
        redone
    }

    /// Moves the cursor, clamped into the buffer.
    pub fn set_cursor(&mut self, pos: Position) {
        let before = Observed::of(&self.state);
        self.state.set_cursor(pos);
        self.state.scroll_to_cursor();
        self.emit_changes(before);
    }

    /// Resizes the viewport, keeping the cursor visible.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.state.set_viewport_height(height);
    }

    // ==================== Rendering ====================

    /// Highlighted lines of the viewport, top to bottom.
    pub fn visible_lines(&mut self) -> Vec<HighlightedLine> {
        let range = self.state.visible_range();
        let lines = &self.state.lines()[range];
        self.highlighter
            .highlight_lines(self.state.filename(), lines.iter().map(String::as_str))
    }

    /// Plain-data copy of the session.
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot::from(&self.state)
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Mutable keymap, for rebinding at runtime.
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// Mutable command registry, for registering host commands.
    pub fn commands_mut(&mut self) -> &mut CommandRegistry<H> {
        &mut self.commands
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    // ==================== Events ====================

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }

    /// Emits one event per observable field that differs from `before`.
    fn emit_changes(&self, before: Observed) {
        let state = &self.state;
        if state.mode() != before.mode {
            self.emit(EditorEvent::ModeChanged(state.mode()));
        }
        if state.revision() != before.revision {
            self.emit(EditorEvent::BufferChanged {
                revision: state.revision(),
            });
        }
        if state.cursor() != before.cursor {
            self.emit(EditorEvent::CursorMoved(state.cursor()));
        }
        if let Some(status) = state.status() {
            if before.status.as_ref() != Some(status) {
                self.emit(EditorEvent::Status(status.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn editor(text: &str) -> Editor<MemoryHost> {
        let mut editor = Editor::new(MemoryHost::new());
        editor.load_text(None, text);
        editor
    }

    async fn keys(editor: &mut Editor<MemoryHost>, seq: &str) {
        editor.handle_keys(KeyPress::parse_sequence(seq)).await;
    }

    #[tokio::test]
    async fn test_open_existing_and_new_file() {
        let host = MemoryHost::new().with_file("a.txt", "one\ntwo\n");
        let mut editor = Editor::new(host);

        editor.open("a.txt").await;
        assert_eq!(editor.state().lines(), ["one", "two"]);
        assert_eq!(editor.state().status().unwrap().text, "\"a.txt\" 2L, 8B");

        editor.open("new.txt").await;
        assert_eq!(editor.state().lines(), [""]);
        assert_eq!(editor.state().filename(), Some("new.txt"));
        assert_eq!(editor.state().status().unwrap().text, "\"new.txt\" [New File]");
    }

    #[tokio::test]
    async fn test_command_returns_to_normal() {
        let mut e = editor("abc");
        keys(&mut e, ":set nonu<CR>").await;
        assert_eq!(e.state().mode(), Mode::Normal);
        assert!(!e.state().line_numbers());
    }

    #[tokio::test]
    async fn test_status_cleared_by_next_key() {
        let mut e = editor("abc");
        keys(&mut e, "u").await;
        assert!(e.state().status().is_some());
        keys(&mut e, "l").await;
        assert!(e.state().status().is_none());
    }

    #[tokio::test]
    async fn test_quit_reaches_host_once() {
        let mut e = editor("abc");
        keys(&mut e, ":q<CR>").await;
        assert!(e.should_quit());
        assert!(e.host().exited());
    }

    #[tokio::test]
    async fn test_quit_refused_when_modified() {
        let mut e = editor("abc");
        keys(&mut e, "x:q<CR>").await;
        assert!(!e.should_quit());
        let status = e.state().status().unwrap();
        assert_eq!(status.severity, Severity::Error);
        assert!(status.text.starts_with("E37"));
    }

    #[tokio::test]
    async fn test_write_clears_modified() {
        let mut e = editor("abc");
        keys(&mut e, "x:w out.txt<CR>").await;
        assert!(!e.state().is_modified());
        assert_eq!(e.state().filename(), Some("out.txt"));
        assert_eq!(e.host().file("out.txt").as_deref(), Some("bc\n"));
    }

    #[tokio::test]
    async fn test_viewport_follows_cursor() {
        let text: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
        let mut e = editor(&text.join("\n"));
        e.set_viewport_height(10);
        keys(&mut e, "G").await;
        assert_eq!(e.state().viewport().scroll, 40);
        let visible = e.visible_lines();
        assert_eq!(visible.len(), 10);
        assert_eq!(visible[0].text, "line 40");
        keys(&mut e, "g").await;
        assert_eq!(e.state().viewport().scroll, 0);
    }

    #[tokio::test]
    async fn test_events_for_insert() {
        let mut e = editor("");
        let mut rx = e.subscribe();
        keys(&mut e, "ia").await;

        assert_eq!(rx.try_recv().unwrap(), EditorEvent::ModeChanged(Mode::Insert));
        assert!(matches!(
            rx.try_recv().unwrap(),
            EditorEvent::BufferChanged { .. }
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            EditorEvent::CursorMoved(Position::new(0, 1))
        );
    }

    #[tokio::test]
    async fn test_handler_error_restores_state() {
        let mut e = editor("abc");
        keys(&mut e, "l").await;
        // Out-of-range cursor makes the buffer primitive fail
        e.state.cursor = Position::new(7, 0);
        let revision = e.state().revision();

        let transition = e.handle_key(KeyPress::char('x')).await;
        assert_eq!(transition, Transition::Handled);
        assert_eq!(e.state().lines(), ["abc"]);
        assert_eq!(e.state().revision(), revision);
        assert!(!e.state().is_modified());
        assert_eq!(e.state().mode(), Mode::Normal);
        assert_eq!(e.state().status().unwrap().severity, Severity::Error);
        assert!(e.state().cursor().line < e.state().buffer().len_lines());
    }
}
