//! Undo/redo storage.
//!
//! The store records whole [`NetworkSet`] snapshots. [`History`] is the seam
//! between the store and how those snapshots are kept, so a structurally
//! shared implementation can replace [`SnapshotStack`] without touching the
//! call sites.

use crate::model::NetworkSet;
use std::collections::VecDeque;

pub trait History {
    /// Records the state before a mutation.
    fn push(&mut self, snapshot: NetworkSet);
    fn pop_undo(&mut self) -> Option<NetworkSet>;
    fn pop_redo(&mut self) -> Option<NetworkSet>;
    /// Records the state an undo moved away from.
    fn push_redo(&mut self, snapshot: NetworkSet);
    fn clear_redo(&mut self);
    fn clear(&mut self);
    fn undo_len(&self) -> usize;
    fn redo_len(&self) -> usize;
}

/// Two stacks of deep copies, optionally capped in depth.
#[derive(Clone, Debug, Default)]
pub struct SnapshotStack {
    undo: VecDeque<NetworkSet>,
    redo: Vec<NetworkSet>,
    max_depth: Option<usize>,
}

impl SnapshotStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Once `max_depth` undo snapshots are held the oldest is dropped.
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        SnapshotStack { max_depth, ..Self::default() }
    }
}

impl History for SnapshotStack {
    fn push(&mut self, snapshot: NetworkSet) {
        if let Some(cap) = self.max_depth {
            if cap == 0 {
                return;
            }
            while self.undo.len() >= cap {
                self.undo.pop_front();
            }
        }
        self.undo.push_back(snapshot);
        log::trace!("snapshot pushed, undo depth {}", self.undo.len());
    }

    fn pop_undo(&mut self) -> Option<NetworkSet> {
        self.undo.pop_back()
    }

    fn pop_redo(&mut self) -> Option<NetworkSet> {
        self.redo.pop()
    }

    fn push_redo(&mut self, snapshot: NetworkSet) {
        self.redo.push(snapshot);
    }

    fn clear_redo(&mut self) {
        self.redo.clear();
    }

    fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn undo_len(&self) -> usize {
        self.undo.len()
    }

    fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
