// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test fixtures: a deterministic monospace measurer and editor
//! construction helpers.

use core::cell::Cell;

use peniko::kurbo::Size;

use crate::{Editor, PlainTextMarshaller, TextLocation, TextMeasurer};

/// Advance width of every `char` under [`MonoMeasurer`].
pub(crate) const CHAR_W: f64 = 10.0;
/// Line height under [`MonoMeasurer`].
pub(crate) const LINE_H: f64 = 10.0;

/// A fixed-cell measurer: every `char` is `CHAR_W` wide and `LINE_H` tall.
/// Counts `measure` calls so tests can assert on laziness and caching.
#[derive(Debug, Default)]
pub(crate) struct MonoMeasurer {
    pub(crate) measure_calls: Cell<usize>,
}

impl<S> TextMeasurer<S> for MonoMeasurer {
    fn measure(&self, text: &str, _style: &S) -> Size {
        self.measure_calls.set(self.measure_calls.get() + 1);
        Size::new(text.chars().count() as f64 * CHAR_W, LINE_H)
    }

    fn hit_test(&self, text: &str, _style: &S, x: f64) -> usize {
        let caret = ((x / CHAR_W).round().max(0.0)) as usize;
        text.char_indices()
            .map(|(offset, _)| offset)
            .chain([text.len()])
            .nth(caret)
            .unwrap_or(text.len())
    }
}

/// The style type used throughout the tests.
pub(crate) type TestStyle = u8;

/// An editor over a plain-text marshaller with default style, populated
/// with `text`.
pub(crate) fn editor_with(text: &str) -> Editor<TestStyle> {
    let mut editor = Editor::new(Box::new(PlainTextMarshaller::new(0)));
    editor.set_text(text);
    editor
}

/// Places a selection directly, anchor first, caret at `cursor`.
pub(crate) fn select(editor: &mut Editor<TestStyle>, anchor: TextLocation, cursor: TextLocation) {
    editor.selection_anchor = Some(anchor);
    editor.set_cursor_calculated(cursor);
    editor.refresh_highlights();
}
