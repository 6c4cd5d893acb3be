//! Ex-command interpreter.
//!
//! ## Learning: The Command Pattern
//!
//! Each `:` command is an object implementing [`CommandHandler`]. The
//! registry maps names and aliases to handlers, so hosts can add their own
//! commands next to the built-in `:w`, `:q`, `:wq`, `:e` and `:set`.
//!
//! ## Learning: Results, not Mutation
//!
//! A handler gets a shared `&EditorState` and returns an
//! [`OperationResult`] carrying an optional [`StatePatch`]. The editor
//! merges the patch afterwards. A handler therefore cannot leave the state
//! half-updated, whichever `await` it fails at.
//!
//! ## Trait Objects and Futures
//!
//! Handlers live in a `Vec<Box<dyn CommandHandler<H>>>`. A trait object
//! cannot have `async fn` methods, so `execute` returns a boxed future
//! ([`CommandFuture`]) instead; `Box::pin(async move { .. })` builds one.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::CoreResult;
use crate::host::HostAdapter;
use crate::state::{EditorState, Severity};

/// Boxed future returned by [`CommandHandler::execute`].
pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = CoreResult<OperationResult>> + 'a>>;

/// A file read by `:e`, to be swapped into the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub filename: String,
    pub text: String,
}

/// State changes requested by a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub modified: Option<bool>,
    pub filename: Option<String>,
    pub load: Option<LoadedFile>,
    pub line_numbers: Option<bool>,
    pub quit: bool,
}

/// Outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub patch: Option<StatePatch>,
}

impl OperationResult {
    /// Silent success.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            severity: None,
            patch: None,
        }
    }

    /// Success with an informational message.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            severity: Some(Severity::Info),
            ..Self::ok()
        }
    }

    /// Failure with an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            severity: Some(Severity::Error),
            patch: None,
        }
    }

    pub fn with_patch(mut self, patch: StatePatch) -> Self {
        self.patch = Some(patch);
        self
    }

    /// Adds a quit request to the patch.
    pub fn and_quit(mut self) -> Self {
        self.patch.get_or_insert_default().quit = true;
        self
    }

    /// Severity to display: explicit, or derived from `success`.
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or(if self.success {
            Severity::Info
        } else {
            Severity::Error
        })
    }
}

/// Everything a handler may look at.
pub struct CommandContext<'a, H> {
    /// Name as typed (an alias stays an alias)
    pub name: &'a str,
    pub args: &'a [String],
    /// A trailing `!` on the name
    pub bang: bool,
    pub state: &'a EditorState,
    pub host: &'a H,
}

/// Trait for command handlers.
///
/// ## Learning: Trait Objects
///
/// `dyn CommandHandler<H>` allows storing different types that
/// implement this trait in the same collection. The `Send + Sync`
/// bounds keep handlers shareable; the futures they return are not
/// required to be `Send` because the editor awaits them in place.
pub trait CommandHandler<H>: Send + Sync {
    /// Primary name.
    fn name(&self) -> &str;

    /// Alternative names.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description.
    fn description(&self) -> &str {
        self.name()
    }

    /// Runs the command.
    fn execute<'a>(&'a self, ctx: CommandContext<'a, H>) -> CommandFuture<'a>;
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// First token with any trailing `!` removed
    pub name: String,
    /// First token as typed
    pub raw: String,
    pub bang: bool,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Splits a command line on whitespace. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let raw = tokens.next()?;
        let (name, bang) = match raw.strip_suffix('!') {
            Some(name) if !name.is_empty() => (name, true),
            _ => (raw, false),
        };
        Some(Self {
            name: name.to_string(),
            raw: raw.to_string(),
            bang,
            args: tokens.map(str::to_string).collect(),
        })
    }
}

/// Registry for commands.
///
/// ## Learning: Type Erasure
///
/// `Box<dyn CommandHandler<H>>` erases the concrete type, allowing
/// different handler types in the same collection. The vtable (virtual
/// table) enables dynamic dispatch.
pub struct CommandRegistry<H> {
    handlers: Vec<Box<dyn CommandHandler<H>>>,
    /// Name or alias to index into `handlers`
    by_name: HashMap<String, usize>,
}

impl<H: HostAdapter> CommandRegistry<H> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in commands.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(builtin::Write));
        registry.register(Box::new(builtin::Quit));
        registry.register(Box::new(builtin::WriteQuit));
        registry.register(Box::new(builtin::Edit));
        registry.register(Box::new(builtin::Set));
        registry
    }

    /// Registers a handler. Its name and aliases replace earlier entries.
    ///
    /// A handler with the name of an existing one takes over its slot, and
    /// the old handler's aliases stop resolving.
    pub fn register(&mut self, handler: Box<dyn CommandHandler<H>>) {
        let index = match self.by_name.get(handler.name()).copied() {
            Some(old) => {
                tracing::debug!("Replacing command :{}", handler.name());
                self.by_name.retain(|_, index| *index != old);
                self.handlers[old] = handler;
                old
            }
            None => {
                self.handlers.push(handler);
                self.handlers.len() - 1
            }
        };

        let handler = &self.handlers[index];
        self.by_name.insert(handler.name().to_string(), index);
        for alias in handler.aliases() {
            self.by_name.insert(alias.to_string(), index);
        }
    }

    /// Looks up a handler by name or alias. Matching is case-sensitive.
    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler<H>> {
        let index = *self.by_name.get(name)?;
        self.handlers.get(index).map(|h| h.as_ref())
    }

    /// Returns all registered names and aliases, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.by_name.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Parses and runs a command line.
    ///
    /// Never fails: unknown names and handler errors come back as
    /// error results. A blank line is a silent success.
    pub async fn execute(&self, line: &str, state: &EditorState, host: &H) -> OperationResult {
        let Some(parsed) = ParsedCommand::parse(line) else {
            return OperationResult::ok();
        };
        let Some(handler) = self.get(&parsed.name) else {
            tracing::debug!("Unknown command {:?}", parsed.raw);
            return OperationResult::error(format!("E492: Not an editor command: {}", parsed.raw));
        };

        tracing::debug!("Executing :{} {:?}", parsed.raw, parsed.args);
        let ctx = CommandContext {
            name: &parsed.name,
            args: &parsed.args,
            bang: parsed.bang,
            state,
            host,
        };
        match handler.execute(ctx).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Command :{} failed: {}", parsed.name, e);
                OperationResult::error(e.to_string())
            }
        }
    }
}

impl<H: HostAdapter> Default for CommandRegistry<H> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Built-in commands.
pub mod builtin {
    use modex_buffer::TextBuffer;

    use super::*;

    const NO_FILE_NAME: &str = "E32: No file name";
    const NOT_SAVED: &str = "E37: No write since last change (add ! to override)";

    pub(crate) fn describe(name: &str, text: &str, lines: usize) -> String {
        let lines = if text.is_empty() { 0 } else { lines };
        format!("\"{}\" {}L, {}B", name, lines, text.len())
    }

    /// Saves the buffer, to the argument or the current filename.
    async fn write_buffer<H: HostAdapter>(ctx: &CommandContext<'_, H>) -> OperationResult {
        let target = ctx.args.first().map(String::as_str);
        let Some(name) = target.or(ctx.state.filename()) else {
            return OperationResult::error(NO_FILE_NAME);
        };

        let other_file = target.is_some() && target != ctx.state.filename();
        if other_file && !ctx.bang && ctx.host.file_exists(name) {
            return OperationResult::error("E13: File exists (add ! to override)");
        }

        let content = ctx.state.buffer().to_text();
        if !ctx.host.save_file(name, &content).await {
            tracing::warn!("Host failed to save {}", name);
            return OperationResult::error(format!("E212: Can't open file for writing: {name}"));
        }

        tracing::info!("Wrote {} ({} bytes)", name, content.len());
        let message = format!(
            "{} written",
            describe(name, &content, ctx.state.buffer().len_lines())
        );
        OperationResult::info(message).with_patch(StatePatch {
            modified: Some(false),
            filename: Some(name.to_string()),
            ..StatePatch::default()
        })
    }

    /// `:w[rite][!] [file]`
    pub struct Write;

    impl<H: HostAdapter> CommandHandler<H> for Write {
        fn name(&self) -> &str {
            "w"
        }

        fn aliases(&self) -> &[&str] {
            &["write"]
        }

        fn description(&self) -> &str {
            "Write the buffer to a file"
        }

        fn execute<'a>(&'a self, ctx: CommandContext<'a, H>) -> CommandFuture<'a> {
            Box::pin(async move { Ok(write_buffer(&ctx).await) })
        }
    }

    /// `:q[uit][!]`
    pub struct Quit;

    impl<H: HostAdapter> CommandHandler<H> for Quit {
        fn name(&self) -> &str {
            "q"
        }

        fn aliases(&self) -> &[&str] {
            &["quit"]
        }

        fn description(&self) -> &str {
            "Quit, refusing if there are unsaved changes"
        }

        fn execute<'a>(&'a self, ctx: CommandContext<'a, H>) -> CommandFuture<'a> {
            Box::pin(async move {
                if ctx.state.is_modified() && !ctx.bang {
                    return Ok(OperationResult::error(NOT_SAVED));
                }
                Ok(OperationResult::ok().and_quit())
            })
        }
    }

    /// `:wq[!] [file]`, also `:x`
    pub struct WriteQuit;

    impl<H: HostAdapter> CommandHandler<H> for WriteQuit {
        fn name(&self) -> &str {
            "wq"
        }

        fn aliases(&self) -> &[&str] {
            &["x"]
        }

        fn description(&self) -> &str {
            "Write the buffer, then quit"
        }

        fn execute<'a>(&'a self, ctx: CommandContext<'a, H>) -> CommandFuture<'a> {
            Box::pin(async move {
                let written = write_buffer(&ctx).await;
                if !written.success {
                    return Ok(written);
                }
                Ok(written.and_quit())
            })
        }
    }

    /// `:e[dit][!] [file]`
    pub struct Edit;

    impl<H: HostAdapter> CommandHandler<H> for Edit {
        fn name(&self) -> &str {
            "e"
        }

        fn aliases(&self) -> &[&str] {
            &["edit"]
        }

        fn description(&self) -> &str {
            "Edit a file, or reload the current one"
        }

        fn execute<'a>(&'a self, ctx: CommandContext<'a, H>) -> CommandFuture<'a> {
            Box::pin(async move {
                let name = match ctx.args.first() {
                    Some(name) => name.as_str(),
                    None => match ctx.state.filename() {
                        Some(name) => name,
                        None => return Ok(OperationResult::error(NO_FILE_NAME)),
                    },
                };
                if ctx.state.is_modified() && !ctx.bang {
                    return Ok(OperationResult::error(NOT_SAVED));
                }

                let (text, message) = match ctx.host.load_file(name).await {
                    Ok(text) => {
                        tracing::info!("Loaded {} ({} bytes)", name, text.len());
                        let lines = TextBuffer::from_text(&text).len_lines();
                        let message = describe(name, &text, lines);
                        (text, message)
                    }
                    Err(e) => {
                        tracing::debug!("Opening {} as a new file: {}", name, e);
                        (String::new(), format!("\"{name}\" [New File]"))
                    }
                };

                Ok(OperationResult::info(message).with_patch(StatePatch {
                    load: Some(LoadedFile {
                        filename: name.to_string(),
                        text,
                    }),
                    ..StatePatch::default()
                }))
            })
        }
    }

    /// `:set {option}`; supports `number`/`nu` and their `no`/`inv` forms.
    pub struct Set;

    impl<H: HostAdapter> CommandHandler<H> for Set {
        fn name(&self) -> &str {
            "set"
        }

        fn aliases(&self) -> &[&str] {
            &["se"]
        }

        fn description(&self) -> &str {
            "Change an option"
        }

        fn execute<'a>(&'a self, ctx: CommandContext<'a, H>) -> CommandFuture<'a> {
            Box::pin(async move {
                let mut line_numbers = ctx.state.line_numbers();
                if ctx.args.is_empty() {
                    let shown = if line_numbers { "  number" } else { "nonumber" };
                    return Ok(OperationResult::info(shown));
                }

                for arg in ctx.args {
                    line_numbers = match arg.as_str() {
                        "number" | "nu" => true,
                        "nonumber" | "nonu" => false,
                        "invnumber" | "invnu" | "number!" | "nu!" => !line_numbers,
                        _ => return Ok(OperationResult::error(format!("E518: Unknown option: {arg}"))),
                    };
                }

                Ok(OperationResult::ok().with_patch(StatePatch {
                    line_numbers: Some(line_numbers),
                    ..StatePatch::default()
                }))
            })
        }
    }
}
