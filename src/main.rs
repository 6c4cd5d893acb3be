//! # Modex - A Modal Editing Engine
//!
//! Headless front end: opens a file, replays a key sequence through the
//! engine and reports the result.
//!
//! ## Quick Start
//!
//! ```bash
//! # Append a line and save
//! cargo run -- notes.txt --keys 'Go- buy milk<Esc>:w<CR>'
//!
//! # Inspect the final state as JSON
//! cargo run -- src/app.ts --keys 'dd' --dump
//! ```

mod fs_host;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modex_core::{Config, Editor, KeyPress, Severity};

use crate::fs_host::FsHost;

/// Modex - a modal text-editing engine
#[derive(Parser, Debug)]
#[command(name = "modex")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Keys to replay, in Vim notation (`<Esc>`, `<CR>`, `<C-r>`, ...)
    #[arg(short, long, value_name = "SEQ")]
    keys: Option<String>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the final editor state as JSON
    #[arg(short, long)]
    dump: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("Starting Modex v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_ref())?;
    let mut editor = Editor::with_config(FsHost::new(), config);

    if let Some(file) = &args.file {
        editor.open(&file.display().to_string()).await;
    }

    if let Some(keys) = &args.keys {
        for key in KeyPress::parse_sequence(keys) {
            if editor.should_quit() {
                tracing::debug!("Session quit; ignoring remaining keys");
                break;
            }
            editor.handle_key(key).await;
        }
    }

    if let Some(status) = editor.state().status() {
        match status.severity {
            Severity::Info => eprintln!("{}", status.text),
            Severity::Warning => eprintln!("warning: {}", status.text),
            Severity::Error => eprintln!("error: {}", status.text),
        }
    }

    if args.dump {
        let json = serde_json::to_string_pretty(&editor.snapshot())
            .context("Failed to serialize editor state")?;
        println!("{json}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["modex"]);
        assert!(args.file.is_none());
        assert!(args.keys.is_none());
        assert!(!args.dump);
    }

    #[test]
    fn test_args_with_file_and_keys() {
        let args = Args::parse_from(["modex", "test.ts", "--keys", "dd:w<CR>", "--dump", "-vv"]);
        assert_eq!(args.file, Some(PathBuf::from("test.ts")));
        assert_eq!(args.keys.as_deref(), Some("dd:w<CR>"));
        assert!(args.dump);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_explicit_config_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor]\nundo_limit = \"many\"\n").unwrap();
        assert!(load_config(Some(&path)).is_err());

        std::fs::write(&path, "[editor]\nundo_limit = 5\n").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().editor.undo_limit, 5);
    }
}
