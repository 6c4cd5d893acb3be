//! Serializable view of a session, for hosts and `--dump`.

use modex_buffer::{Position, Selection};
use serde::{Deserialize, Serialize};

use crate::state::{EditorState, Mode, StatusMessage};

/// A plain-data copy of the observable editor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    pub mode: Mode,
    pub cursor: Position,
    pub selection: Option<Selection>,
    pub lines: Vec<String>,
    pub modified: bool,
    pub filename: Option<String>,
    pub command_line: String,
    pub status: Option<StatusMessage>,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub line_numbers: bool,
    pub scroll: usize,
}

impl From<&EditorState> for EditorSnapshot {
    fn from(state: &EditorState) -> Self {
        Self {
            mode: state.mode(),
            cursor: state.cursor(),
            selection: state.selection(),
            lines: state.lines().to_vec(),
            modified: state.is_modified(),
            filename: state.filename().map(str::to_string),
            command_line: state.command_line().to_string(),
            status: state.status().cloned(),
            undo_depth: state.history().undo_count(),
            redo_depth: state.history().redo_count(),
            line_numbers: state.line_numbers(),
            scroll: state.viewport().scroll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_shape() {
        let mut state = EditorState::default();
        state.load(Some("a.ts".into()), "let x = 1;");

        let value = serde_json::to_value(EditorSnapshot::from(&state)).unwrap();
        assert_eq!(value["mode"], "Normal");
        assert_eq!(value["lines"][0], "let x = 1;");
        assert_eq!(value["filename"], "a.ts");
        assert_eq!(value["cursor"]["line"], 0);
        assert_eq!(value["undo_depth"], 0);
    }
}
