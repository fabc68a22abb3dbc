// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-line text editing on top of a [`TextLayout`](crate::TextLayout).

mod cursor;
mod editor;
mod ime;
mod undo;

pub use cursor::{CursorAlignment, CursorInfo};
pub use editor::{CursorMove, Editor, EditorDriver, JumpScope, MoveGranularity, MoveIntent};
pub use ime::CompositionRange;
pub use undo::UndoState;
