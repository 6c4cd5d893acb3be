//! File-system host backed by `tokio::fs`.

use std::io::ErrorKind;
use std::path::PathBuf;

use modex_core::{CoreError, CoreResult, HostAdapter};

/// Resolves file names against a root directory (the working directory by
/// default). Absolute names are used as given.
#[derive(Debug, Clone)]
pub struct FsHost {
    root: PathBuf,
}

impl FsHost {
    pub fn new() -> Self {
        Self::with_root(".")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Default for FsHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for FsHost {
    async fn load_file(&self, name: &str) -> CoreResult<String> {
        match tokio::fs::read_to_string(self.path(name)).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CoreError::FileNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_file(&self, name: &str, content: &str) -> bool {
        match tokio::fs::write(self.path(name), content).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to write {}: {}", name, e);
                false
            }
        }
    }

    fn file_exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    fn exit_editor(&self) {
        tracing::debug!("Host exit requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modex_core::{Editor, KeyPress};

    #[tokio::test]
    async fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let host = FsHost::with_root(dir.path());

        assert!(!host.file_exists("a.txt"));
        assert!(matches!(
            host.load_file("a.txt").await,
            Err(CoreError::FileNotFound(_))
        ));

        assert!(host.save_file("a.txt", "hello\n").await);
        assert!(host.file_exists("a.txt"));
        assert_eq!(host.load_file("a.txt").await.unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let host = FsHost::with_root(dir.path());
        assert!(!host.save_file("missing/a.txt", "x").await);
    }

    #[tokio::test]
    async fn test_edit_session_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "one\ntwo\n").unwrap();

        let mut editor = Editor::new(FsHost::with_root(dir.path()));
        editor.open("notes.txt").await;
        editor
            .handle_keys(KeyPress::parse_sequence("jddggIfirst: <Esc>:wq<CR>"))
            .await;

        assert!(editor.should_quit());
        let saved = std::fs::read_to_string(dir.path().join("notes.txt")).unwrap();
        assert_eq!(saved, "first: one\n");
    }
}
