// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use crate::primitives::TextLocation;

/// How many undo states are retained before the oldest is dropped.
const MAX_UNDO_STATES: usize = 50;

/// A whole-buffer snapshot: the document text plus the cursor and selection
/// anchor to restore with it.
#[derive(Clone, Debug)]
pub struct UndoState {
    /// The full document text at snapshot time.
    pub text: String,
    /// The cursor's interaction location.
    pub cursor: TextLocation,
    /// The selection anchor, if text was selected.
    pub selection_anchor: Option<TextLocation>,
}

/// A bounded stack of snapshots with a linear redo frontier.
///
/// While undoing, the level index walks down the stack; the first undo
/// pushes a synthetic snapshot of the current document so redo can return
/// all the way. Pushing a new state while undone discards everything above
/// the current level.
#[derive(Clone, Debug, Default)]
pub(crate) struct UndoStack {
    states: Vec<UndoState>,
    current_level: Option<usize>,
}

impl UndoStack {
    /// Pushes a pre-edit snapshot.
    pub(crate) fn push(&mut self, state: UndoState) {
        if let Some(level) = self.current_level.take() {
            self.states.truncate(level);
        }
        if self.states.len() >= MAX_UNDO_STATES {
            self.states.remove(0);
        }
        self.states.push(state);
    }

    /// Steps one level down, returning the state to restore. `current` is
    /// called to snapshot the live document when undoing begins, so a later
    /// redo can come back to it.
    pub(crate) fn undo(&mut self, current: impl FnOnce() -> UndoState) -> Option<UndoState> {
        if self.states.is_empty() {
            return None;
        }
        match self.current_level {
            None => {
                let level = self.states.len() - 1;
                self.states.push(current());
                self.current_level = Some(level);
                Some(self.states[level].clone())
            }
            Some(0) => None,
            Some(level) => {
                self.current_level = Some(level - 1);
                Some(self.states[level - 1].clone())
            }
        }
    }

    /// Steps one level up, returning the state to restore. Reaching the
    /// synthetic top snapshot pops it and leaves the stack fully redone.
    pub(crate) fn redo(&mut self) -> Option<UndoState> {
        let level = self.current_level?;
        if level + 1 >= self.states.len() {
            return None;
        }
        if level + 1 == self.states.len() - 1 {
            self.current_level = None;
            self.states.pop()
        } else {
            self.current_level = Some(level + 1);
            Some(self.states[level + 1].clone())
        }
    }

    /// Drops all snapshots.
    pub(crate) fn clear(&mut self) {
        self.states.clear();
        self.current_level = None;
    }

    /// Number of retained snapshots.
    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }
}
