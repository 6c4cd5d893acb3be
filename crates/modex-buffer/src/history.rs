//! Undo/redo history management.
//!
//! ## Learning: Diffs, not Snapshots
//!
//! Each undo entry ([`Change`]) stores only the lines that differ between
//! the buffer before and after an edit, plus a small caller-defined snapshot
//! (cursor, selection, mode) to restore alongside the text. Keystrokes on a
//! large file therefore cost a few strings each, not a full copy.
//!
//! ## Design Decisions
//!
//! 1. **Bounded by count**: at most `max_size` changes; the oldest is dropped
//!    silently when a new one arrives
//! 2. **No-op suppression**: an edit that changes no line records nothing and
//!    leaves the redo stack alone
//! 3. **Linear history**: any new change clears the redo stack
//! 4. **Grouping**: `begin_group` / `end_group` fold consecutive changes into
//!    one undo step (an Insert-mode session)
//!
//! ## Learning: Generics
//!
//! `History<S>` does not know what a "mode" is. The snapshot type is chosen
//! by the crate that owns the editor state, which keeps this crate free of
//! any dependency on it.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::diff::{LineDiff, apply_diff, compose_diffs, compute_diff};

/// One undo step: line diffs from "before" to "after" plus the state
/// snapshot that was current before the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<S> {
    /// Diffs from the older buffer to the newer one
    pub diffs: Vec<LineDiff>,
    /// State to restore when this change is applied
    pub snapshot: S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Closed,
    /// `joined` is true once the group owns the newest undo entry
    Open { joined: bool },
}

/// Manages undo/redo history.
///
/// ## Learning: VecDeque
///
/// We use `VecDeque` for the undo stack because we need efficient:
/// - Push to back (new changes)
/// - Pop from front (when at capacity)
/// - Pop from back (for undo)
#[derive(Debug, Clone)]
pub struct History<S> {
    undo_stack: VecDeque<Change<S>>,
    redo_stack: Vec<Change<S>>,
    max_size: usize,
    group: Group,
    /// Entry evicted by the open group's first change, held until the
    /// group closes or cancels out
    displaced: Option<Change<S>>,
}

impl<S: Clone> History<S> {
    /// Creates a new history with the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_size),
            redo_stack: Vec::new(),
            max_size,
            group: Group::Closed,
            displaced: None,
        }
    }

    /// Records the transition `before -> after`.
    ///
    /// Returns `false` without touching either stack when the buffers are
    /// identical.
    pub fn record(&mut self, before: &[String], after: &[String], snapshot: S) -> bool {
        let diffs = compute_diff(before, after);
        if diffs.is_empty() {
            return false;
        }
        self.push(Change { diffs, snapshot });
        true
    }

    /// Pushes a change, clearing the redo stack.
    ///
    /// Inside an open group the change is folded into the group's entry.
    pub fn push(&mut self, change: Change<S>) {
        // Clear redo stack - branching history not supported
        self.redo_stack.clear();

        if self.group == (Group::Open { joined: true }) {
            if let Some(last) = self.undo_stack.back_mut() {
                last.diffs = compose_diffs(&last.diffs, &change.diffs);
                if last.diffs.is_empty() {
                    // The group cancelled itself out
                    self.undo_stack.pop_back();
                    if let Some(oldest) = self.displaced.take() {
                        self.undo_stack.push_front(oldest);
                    }
                    self.group = Group::Open { joined: false };
                }
                return;
            }
        }

        let evicted = self.push_undo(change);
        if let Group::Open { .. } = self.group {
            self.displaced = evicted;
            self.group = Group::Open { joined: true };
        }
    }

    /// Pushes onto the undo stack, returning the oldest entry if the cap
    /// evicted one.
    fn push_undo(&mut self, change: Change<S>) -> Option<Change<S>> {
        self.undo_stack.push_back(change);

        // Enforce capacity
        let mut evicted = None;
        while self.undo_stack.len() > self.max_size {
            evicted = self.undo_stack.pop_front();
        }
        evicted
    }

    /// Starts a group. Changes until `end_group()` form one undo step.
    pub fn begin_group(&mut self) {
        self.group = Group::Open { joined: false };
        self.displaced = None;
    }

    /// Ends the current group.
    pub fn end_group(&mut self) {
        self.group = Group::Closed;
        self.displaced = None;
    }

    /// Returns true while a group is open.
    pub fn in_group(&self) -> bool {
        self.group != Group::Closed
    }

    /// Undoes the newest change.
    ///
    /// `current` / `current_snapshot` describe the state right now; they are
    /// stored on the redo stack so the step can be replayed. Returns the
    /// reconstructed buffer and the snapshot to restore, or `None` when
    /// there is nothing to undo (nothing is modified in that case).
    pub fn undo(&mut self, current: &[String], current_snapshot: S) -> Option<(Vec<String>, S)> {
        self.end_group();
        let change = self.undo_stack.pop_back()?;
        let restored = apply_diff(current, &change.diffs, true);
        self.redo_stack.push(Change {
            diffs: compute_diff(&restored, current),
            snapshot: current_snapshot,
        });
        Some((restored, change.snapshot))
    }

    /// Redoes the newest undone change. Mirror of [`History::undo`].
    pub fn redo(&mut self, current: &[String], current_snapshot: S) -> Option<(Vec<String>, S)> {
        self.end_group();
        let change = self.redo_stack.pop()?;
        let restored = apply_diff(current, &change.diffs, false);
        self.push_undo(Change {
            diffs: compute_diff(current, &restored),
            snapshot: current_snapshot,
        });
        Some((restored, change.snapshot))
    }

    /// Returns true if there are changes to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are changes to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group = Group::Closed;
        self.displaced = None;
    }

    /// Returns the number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Maximum number of undo steps kept.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Iterates the undo stack, oldest first.
    pub fn changes(&self) -> impl Iterator<Item = &Change<S>> {
        self.undo_stack.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use proptest::prelude::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_history_undo_redo() {
        let mut history: History<Position> = History::new(20);
        let a = lines(&["hello"]);
        let b = lines(&["hello world"]);

        assert!(history.record(&a, &b, Position::new(0, 5)));
        let (undone, snap) = history.undo(&b, Position::new(0, 11)).unwrap();
        assert_eq!(undone, a);
        assert_eq!(snap, Position::new(0, 5));

        let (redone, snap) = history.redo(&a, snap).unwrap();
        assert_eq!(redone, b);
        assert_eq!(snap, Position::new(0, 11));
    }

    #[test]
    fn test_noop_is_not_recorded() {
        let mut history: History<()> = History::new(20);
        let a = lines(&["x"]);
        let b = lines(&["y"]);
        history.record(&a, &b, ());
        history.undo(&b, ());
        assert!(history.can_redo());

        assert!(!history.record(&a, &a, ()));
        assert_eq!(history.undo_count(), 0);
        assert!(history.can_redo(), "no-op must not clear redo");
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut history: History<()> = History::new(20);
        let a = lines(&["a"]);
        let b = lines(&["b"]);
        history.record(&a, &b, ());
        history.undo(&b, ());
        history.record(&a, &lines(&["c"]), ());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history: History<usize> = History::new(3);
        let mut current = lines(&["0"]);
        for i in 1..=5 {
            let next = vec![i.to_string()];
            history.record(&current, &next, i);
            current = next;
        }
        assert_eq!(history.undo_count(), 3);
        let snapshots: Vec<_> = history.changes().map(|c| c.snapshot).collect();
        assert_eq!(snapshots, vec![3, 4, 5]);
    }

    #[test]
    fn test_empty_stacks_return_none() {
        let mut history: History<()> = History::new(20);
        let a = lines(&["a"]);
        assert!(history.undo(&a, ()).is_none());
        assert!(history.redo(&a, ()).is_none());
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_group_folds_into_one_step() {
        let mut history: History<Position> = History::new(20);
        let mut current = lines(&["hello"]);
        history.begin_group();
        for (i, ch) in " world".chars().enumerate() {
            let mut next = current.clone();
            next[0].push(ch);
            history.record(&current, &next, Position::new(0, 5 + i));
            current = next;
        }
        history.end_group();

        assert_eq!(history.undo_count(), 1);
        let (undone, snap) = history.undo(&current, Position::new(0, 11)).unwrap();
        assert_eq!(undone, lines(&["hello"]));
        // The group keeps the snapshot of its first change
        assert_eq!(snap, Position::new(0, 5));
    }

    #[test]
    fn test_group_that_cancels_out_leaves_no_entry() {
        let mut history: History<()> = History::new(20);
        let a = lines(&["a"]);
        let b = lines(&["ab"]);
        history.begin_group();
        history.record(&a, &b, ());
        history.record(&b, &a, ());
        assert_eq!(history.undo_count(), 0);
        // Further edits in the same group start a fresh entry
        history.record(&a, &b, ());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_cancelled_group_on_full_stack_keeps_oldest() {
        let mut history: History<usize> = History::new(2);
        let mut current = lines(&["0"]);
        for i in 1..=2 {
            let next = vec![i.to_string()];
            history.record(&current, &next, i);
            current = next;
        }

        let edited = lines(&["2x"]);
        history.begin_group();
        history.record(&current, &edited, 3);
        assert_eq!(history.undo_count(), 2);
        history.record(&edited, &current, 4);
        history.end_group();

        let snapshots: Vec<_> = history.changes().map(|c| c.snapshot).collect();
        assert_eq!(snapshots, vec![1, 2]);

        // A group that survives still evicts the oldest entry
        history.begin_group();
        history.record(&current, &edited, 3);
        history.end_group();
        let snapshots: Vec<_> = history.changes().map(|c| c.snapshot).collect();
        assert_eq!(snapshots, vec![2, 3]);
    }

    proptest! {
        #[test]
        fn prop_undo_redo_round_trip(
            steps in prop::collection::vec(prop::collection::vec("[a-c]{0,3}", 1..5), 1..20)
        ) {
            let mut history: History<usize> = History::new(20);
            let start = lines(&["seed"]);
            let mut current = start.clone();
            let mut snap = 0usize;
            let mut recorded = 0;
            for (i, next) in steps.into_iter().enumerate() {
                if history.record(&current, &next, snap) {
                    recorded += 1;
                }
                current = next;
                snap = i + 1;
            }
            let end = current.clone();
            let end_snap = snap;

            for _ in 0..recorded {
                let (buf, s) = history.undo(&current, snap).unwrap();
                current = buf;
                snap = s;
            }
            prop_assert_eq!(&current, &start);
            prop_assert_eq!(snap, 0);
            prop_assert!(!history.can_undo());

            for _ in 0..recorded {
                let (buf, s) = history.redo(&current, snap).unwrap();
                current = buf;
                snap = s;
            }
            prop_assert_eq!(current, end);
            prop_assert_eq!(snap, end_snap);
        }
    }
}
