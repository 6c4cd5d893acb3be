//! # Modex Core
//!
//! The modal controller, ex-command interpreter and session state.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Editor<H>                         │
//! │  ┌──────────┐  ┌───────────┐  ┌────────────────────────┐ │
//! │  │  Keymap  │  │  Config   │  │    CommandRegistry<H>  │ │
//! │  └──────────┘  └───────────┘  └────────────────────────┘ │
//! │        │                                  │               │
//! │  ┌─────┴─────────────────┐      ┌─────────┴───────────┐  │
//! │  │ mode::handler_for(..) │      │   HostAdapter (H)   │  │
//! │  └─────┬─────────────────┘      └─────────────────────┘  │
//! │  ┌─────┴──────────────────────────────────┐              │
//! │  │ EditorState: buffer, cursor, history… │  Highlighter  │
//! │  └────────────────────────────────────────┘              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod command;
pub mod config;
pub mod editor;
pub mod event;
pub mod host;
pub mod keymap;
pub mod mode;
pub mod snapshot;
pub mod state;

pub use command::{
    CommandContext, CommandHandler, CommandRegistry, OperationResult, ParsedCommand, StatePatch,
};
pub use config::{Config, ConfigError, EditorConfig, KeyboardConfig};
pub use editor::Editor;
pub use event::{EditorEvent, EventBus, EventHandler};
pub use host::{HostAdapter, MemoryHost};
pub use keymap::{Action, Key, KeyBinding, KeyPress, Keymap, Modifiers};
pub use mode::Transition;
pub use snapshot::EditorSnapshot;
pub use state::{EditorState, Mode, Register, Severity, StatusMessage, Viewport};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] modex_buffer::BufferError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] modex_syntax::SyntaxError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
