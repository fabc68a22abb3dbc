// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use crate::layout::{LineModel, TextLayout};
use crate::style::RunStyle;

/// Converts between a source text representation and the layout's line
/// models.
///
/// A marshaller sits between the widget's bound text value and a
/// [`TextLayout`]: `set_text` (re)populates the layout from a string,
/// `get_text` serializes the layout back. The dirty flag tracks whether the
/// bound value changed behind the layout's back and a repopulation is due.
pub trait Marshaller<S: RunStyle>: core::fmt::Debug {
    /// Replaces the layout's contents from `text`. Implementations must
    /// leave at least one line in the layout, even for empty text.
    fn set_text(&mut self, text: &str, layout: &mut TextLayout<S>);

    /// Serializes the layout's contents into `out`.
    fn get_text(&self, out: &mut String, layout: &TextLayout<S>);

    /// Whether the source value changed since the layout was last populated.
    fn is_dirty(&self) -> bool;

    /// Flags the source value as changed.
    fn make_dirty(&mut self);

    /// Clears the changed flag, typically right after `set_text`.
    fn clear_dirty(&mut self);

    /// Whether the layout must be repopulated on every change to stay
    /// faithful (e.g. markup that re-tokenizes as it is edited). Plain text
    /// does not need this.
    fn requires_live_update(&self) -> bool {
        false
    }
}

/// The identity marshaller: one line model per `\n`-separated line, one run
/// per line, and an exact text round-trip.
#[derive(Clone, Debug, Default)]
pub struct PlainTextMarshaller<S: RunStyle> {
    style: S,
    dirty: bool,
}

impl<S: RunStyle> PlainTextMarshaller<S> {
    /// Creates a marshaller producing runs of `style`.
    #[must_use]
    pub fn new(style: S) -> Self {
        Self {
            style,
            dirty: false,
        }
    }

    /// The style applied to every run.
    #[must_use]
    pub fn style(&self) -> &S {
        &self.style
    }
}

impl<S: RunStyle> Marshaller<S> for PlainTextMarshaller<S> {
    fn set_text(&mut self, text: &str, layout: &mut TextLayout<S>) {
        layout.clear_lines();
        // `split` yields one empty piece for empty text, so the layout
        // always keeps at least one line.
        layout.add_lines(
            text.split('\n')
                .map(|line| LineModel::from_text(line.into(), self.style.clone())),
        );
    }

    fn get_text(&self, out: &mut String, layout: &TextLayout<S>) {
        layout.write_text(out);
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn make_dirty(&mut self) {
        self.dirty = true;
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
