//! Line-level diffs.
//!
//! ## Learning: Positional Patches
//!
//! A diff here is not an LCS-style edit script. It compares the two buffers
//! index by index and records every line that differs. That is trivially
//! invertible (swap `old` and `new`) and two diffs over the same buffer
//! compose line by line, which is what undo grouping needs.
//!
//! `old` / `new` are `Option<String>` so that "this line does not exist"
//! is distinguishable from "this line is empty". Without that, a buffer that
//! shrinks could never be restored to its longer form.

use serde::{Deserialize, Serialize};

/// Classification of a single line delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffOp {
    /// Line appeared, or went from empty to non-empty
    Insert,
    /// Line vanished, or went from non-empty to empty
    Delete,
    /// Content changed otherwise
    Replace,
}

/// One changed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    /// 0-indexed line number
    pub line: usize,
    /// Content before the change (`None`: line did not exist)
    pub old: Option<String>,
    /// Content after the change (`None`: line no longer exists)
    pub new: Option<String>,
    /// What kind of change this is
    pub op: DiffOp,
}

impl LineDiff {
    /// Builds a diff record and classifies it.
    pub fn new(line: usize, old: Option<String>, new: Option<String>) -> Self {
        let op = classify(old.as_deref(), new.as_deref());
        Self { line, old, new, op }
    }

    /// Old content, treating a missing line as empty.
    pub fn old_content(&self) -> &str {
        self.old.as_deref().unwrap_or("")
    }

    /// New content, treating a missing line as empty.
    pub fn new_content(&self) -> &str {
        self.new.as_deref().unwrap_or("")
    }
}

fn classify(old: Option<&str>, new: Option<&str>) -> DiffOp {
    match (old, new) {
        (None, _) => DiffOp::Insert,
        (_, None) => DiffOp::Delete,
        (Some(o), Some(n)) if o.is_empty() && !n.is_empty() => DiffOp::Insert,
        (Some(o), Some(n)) if !o.is_empty() && n.is_empty() => DiffOp::Delete,
        _ => DiffOp::Replace,
    }
}

/// Computes the per-line diff from `old` to `new`.
///
/// Walks `0..max(old.len(), new.len())` and emits one record per index
/// whose content differs.
pub fn compute_diff(old: &[String], new: &[String]) -> Vec<LineDiff> {
    let len = old.len().max(new.len());
    (0..len)
        .filter_map(|i| {
            let before = old.get(i);
            let after = new.get(i);
            (before != after).then(|| LineDiff::new(i, before.cloned(), after.cloned()))
        })
        .collect()
}

/// Applies a diff to `buffer`.
///
/// Forward (`reverse == false`) writes each record's `new` side, reverse
/// writes the `old` side. The buffer is extended when a record addresses a
/// line past its end, and truncated at the first line the written side says
/// does not exist.
pub fn apply_diff(buffer: &[String], diffs: &[LineDiff], reverse: bool) -> Vec<String> {
    let mut lines = buffer.to_vec();
    let mut cut: Option<usize> = None;

    for diff in diffs {
        let target = if reverse { &diff.old } else { &diff.new };
        match target {
            Some(content) => {
                if diff.line >= lines.len() {
                    lines.resize(diff.line + 1, String::new());
                }
                lines[diff.line] = content.clone();
            }
            None => {
                cut = Some(cut.map_or(diff.line, |c| c.min(diff.line)));
            }
        }
    }

    if let Some(at) = cut {
        lines.truncate(at);
    }
    lines
}

/// Composes two consecutive diffs (`first` then `second`) into one.
///
/// The result keeps `first`'s old side and `second`'s new side for each
/// line, and drops lines that end up unchanged.
pub fn compose_diffs(first: &[LineDiff], second: &[LineDiff]) -> Vec<LineDiff> {
    let mut by_line: std::collections::BTreeMap<usize, (Option<String>, Option<String>)> =
        first
            .iter()
            .map(|d| (d.line, (d.old.clone(), d.new.clone())))
            .collect();

    for diff in second {
        by_line
            .entry(diff.line)
            .and_modify(|(_, new)| *new = diff.new.clone())
            .or_insert_with(|| (diff.old.clone(), diff.new.clone()));
    }

    by_line
        .into_iter()
        .filter(|(_, (old, new))| old != new)
        .map(|(line, (old, new))| LineDiff::new(line, old, new))
        .collect()
}
