//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky.
//! We use `tokio::sync::broadcast` for a safe, async-friendly event bus.
//!
//! Key differences from OOP observers:
//! - No object references to manage
//! - Events are values, not callbacks
//! - Subscribers receive copies (Clone)
//!
//! The editor emits events after a key or command has been fully processed,
//! so a subscriber never observes a half-applied change.

use modex_buffer::Position;
use tokio::sync::broadcast;

use crate::state::{Mode, StatusMessage};

/// Events that can occur in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The active mode changed
    ModeChanged(Mode),
    /// The buffer content changed; `revision` is the new revision
    BufferChanged { revision: u64 },
    /// The cursor moved
    CursorMoved(Position),
    /// A status message was set
    Status(StatusMessage),
    /// The document was written under this name
    Saved(String),
    /// A document was loaded from this name
    Loaded(String),
    /// The session is ending
    Quit,
}

/// Event bus for broadcasting editor events.
///
/// ## Design
///
/// Using a broadcast channel allows:
/// - Multiple subscribers (renderer, status line, tests)
/// - Async reception
/// - Lagged receivers don't block senders
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Helper for processing events asynchronously.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(editor.subscribe());
///
/// while let Some(event) = handler.next().await {
///     if let EditorEvent::BufferChanged { .. } = event {
///         redraw(&editor.visible_lines());
///     }
/// }
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::ModeChanged(Mode::Insert));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, EditorEvent::ModeChanged(Mode::Insert));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(EditorEvent::Quit);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_drains_queue() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(EditorEvent::BufferChanged { revision: 3 });
        bus.emit(EditorEvent::Saved("a.txt".into()));

        assert_eq!(
            handler.next().await,
            Some(EditorEvent::BufferChanged { revision: 3 })
        );
        assert_eq!(handler.try_next(), Some(EditorEvent::Saved("a.txt".into())));
        assert_eq!(handler.try_next(), None);
    }

    #[tokio::test]
    async fn test_closed_bus_ends_handler() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());
        drop(bus);
        assert_eq!(handler.next().await, None);
    }
}
