// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-based text layout and multi-line text editing.
//!
//! Galley models a document as a list of lines, each owning its text and a
//! set of contiguous style runs. A [`TextLayout`] lazily flows those lines
//! into positioned line views, soft-wrapping at opportunities reported by a
//! [`LineBreaker`] and sizing everything through an opaque [`TextMeasurer`]
//! supplied by the embedder. An [`Editor`] layers cursor, selection, undo,
//! and input-method state on top of a layout; its operations run through an
//! [`EditorDriver`] that bundles the editor with a measurer so any of them
//! can reflow on demand.
//!
//! Galley never touches fonts, shaping, or rendering. Measurement and x→
//! offset hit testing are the embedder's problem; galley only asks that they
//! be deterministic for a given `(text, style)` pair so its caches stay
//! valid.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod breaking;
mod marshal;
mod measure;
mod primitives;
mod style;

pub mod editing;
pub mod layout;

#[cfg(test)]
mod tests;

pub use breaking::{LineBreaker, UnicodeLineBreaker, WordBreaks};
pub use editing::{
    CompositionRange, CursorAlignment, CursorInfo, CursorMove, Editor, EditorDriver, JumpScope,
    MoveGranularity, MoveIntent, UndoState,
};
pub use layout::{
    HighlightKind, Justification, LayoutBlock, LineHighlight, LineModel, LineView,
    OffsetLocations, RunModel, TextLayout, ViewHighlight,
};
pub use marshal::{Marshaller, PlainTextMarshaller};
pub use measure::TextMeasurer;
pub use primitives::{HitPoint, TextLocation, TextRange, TextSelection};
pub use style::RunStyle;
