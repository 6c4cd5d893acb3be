//! The boundary between the engine and whatever hosts it.
//!
//! ## Learning: Traits with Async Methods
//!
//! `HostAdapter` methods that may touch a disk or a network return
//! `impl Future`. Implementors can simply write `async fn`; the editor is
//! generic over the host (`Editor<H: HostAdapter>`), so every call is
//! statically dispatched and no boxing is needed.
//!
//! The engine never assumes a file system exists. The binary plugs in a
//! `tokio::fs`-backed host; tests use [`MemoryHost`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;

use crate::{CoreError, CoreResult};

/// Services the engine needs from its host.
pub trait HostAdapter {
    /// Reads a whole file. An error means the file cannot be read (typically
    /// it does not exist yet).
    fn load_file(&self, name: &str) -> impl Future<Output = CoreResult<String>>;

    /// Writes a whole file. Returns `false` on failure.
    fn save_file(&self, name: &str, content: &str) -> impl Future<Output = bool>;

    /// Returns true if a file with this name exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Called once when the session quits.
    fn exit_editor(&self);
}

/// In-memory host: a map from file name to content.
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: RefCell<HashMap<String, String>>,
    /// Names whose saves fail, for exercising error paths
    read_only: RefCell<Vec<String>>,
    exited: Cell<bool>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds a file.
    pub fn with_file(self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(name.into(), content.into());
        self
    }

    /// Makes saves to `name` fail.
    pub fn set_read_only(&self, name: impl Into<String>) {
        self.read_only.borrow_mut().push(name.into());
    }

    /// Returns a file's content.
    pub fn file(&self, name: &str) -> Option<String> {
        self.files.borrow().get(name).cloned()
    }

    /// Returns true once `exit_editor` has been called.
    pub fn exited(&self) -> bool {
        self.exited.get()
    }
}

impl HostAdapter for MemoryHost {
    async fn load_file(&self, name: &str) -> CoreResult<String> {
        self.file(name)
            .ok_or_else(|| CoreError::FileNotFound(name.to_string()))
    }

    async fn save_file(&self, name: &str, content: &str) -> bool {
        if self.read_only.borrow().iter().any(|n| n == name) {
            return false;
        }
        self.files
            .borrow_mut()
            .insert(name.to_string(), content.to_string());
        true
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.borrow().contains_key(name)
    }

    fn exit_editor(&self) {
        self.exited.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_host_round_trip() {
        let host = MemoryHost::new().with_file("a.txt", "one\n");
        assert!(host.file_exists("a.txt"));
        assert_eq!(host.load_file("a.txt").await.unwrap(), "one\n");

        assert!(host.save_file("b.txt", "two\n").await);
        assert_eq!(host.file("b.txt").as_deref(), Some("two\n"));
    }

    #[tokio::test]
    async fn test_missing_and_read_only() {
        let host = MemoryHost::new();
        assert!(matches!(
            host.load_file("nope").await,
            Err(CoreError::FileNotFound(_))
        ));

        host.set_read_only("locked");
        assert!(!host.save_file("locked", "x").await);
        assert!(!host.file_exists("locked"));
    }

    #[test]
    fn test_exit_flag() {
        let host = MemoryHost::new();
        assert!(!host.exited());
        host.exit_editor();
        assert!(host.exited());
    }
}
