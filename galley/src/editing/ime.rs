// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The input-method surface.
//!
//! Platform text input services see the document as one flat string with a
//! single `\n` between lines; everything here speaks byte offsets into that
//! string. A composition session opens one text change transaction, so
//! however many times the input method rewrites the composition text, undo
//! treats the whole session as a single edit.

use alloc::string::String;

use peniko::kurbo::{Point, Rect};

use super::editor::{selection_line_ranges, EditorDriver};
use crate::layout::OffsetLocations;
use crate::measure::TextMeasurer;
use crate::primitives::{HitPoint, TextRange, TextSelection};
use crate::style::RunStyle;

/// An active composition, as byte offsets into the flattened document.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompositionRange {
    /// Flat byte offset of the composition's start.
    pub start: usize,
    /// Byte length of the composition text.
    pub len: usize,
}

impl CompositionRange {
    /// Flat byte offset one past the composition's end.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

fn assert_composition_on_one_line(offsets: &OffsetLocations, range: CompositionRange) {
    assert_eq!(
        offsets.location_of(range.start).line,
        offsets.location_of(range.end()).line,
        "a composition must not span multiple lines"
    );
}

impl<S: RunStyle, M: TextMeasurer<S> + ?Sized> EditorDriver<'_, S, M> {
    /// Byte length of the flattened document.
    #[must_use]
    pub fn text_length(&self) -> usize {
        self.editor.layout.offset_locations().text_len()
    }

    /// The selection as a flat range, plus whether the caret sits at the
    /// range's start.
    #[must_use]
    pub fn selection_range(&self) -> (TextRange, bool) {
        let offsets = self.editor.layout.offset_locations();
        match self.editor.selection() {
            Some(selection) => {
                let start = offsets.offset_of(selection.start);
                let end = offsets.offset_of(selection.end);
                let caret_at_start =
                    self.editor.cursor.interaction_location() == selection.start;
                (TextRange::new(start, end), caret_at_start)
            }
            None => {
                let caret = offsets.offset_of(self.editor.cursor.interaction_location());
                (TextRange::new(caret, caret), true)
            }
        }
    }

    /// Replaces the selection from a flat range; with `caret_at_start` the
    /// anchor goes to the range's end.
    pub fn set_selection_range(&mut self, range: TextRange, caret_at_start: bool) {
        let offsets = self.editor.layout.offset_locations();
        let start = offsets.location_of(range.start);
        let end = offsets.location_of(range.end);
        if start == end {
            self.editor.selection_anchor = None;
            self.editor.set_cursor_calculated(start);
        } else if caret_at_start {
            self.editor.selection_anchor = Some(end);
            self.editor.set_cursor_calculated(start);
        } else {
            self.editor.selection_anchor = Some(start);
            self.editor.set_cursor_calculated(end);
        }
        self.editor.refresh_highlights();
    }

    /// The flattened document text within a flat range.
    #[must_use]
    pub fn text_in_range(&self, range: TextRange) -> String {
        let mut text = String::new();
        self.editor.layout.write_text(&mut text);
        let end = range.end.min(text.len());
        let start = range.start.min(end);
        text.get(start..end).unwrap_or_default().into()
    }

    /// Replaces a flat range with `text`. Joins the open composition
    /// transaction when one is active, otherwise forms its own undoable
    /// edit.
    pub fn set_text_in_range(&mut self, range: TextRange, text: &str) {
        let own_transaction = !self.editor.is_changing_text;
        if own_transaction {
            self.editor.start_changing_text();
        }
        let offsets = self.editor.layout.offset_locations();
        let start = offsets.location_of(range.start);
        let end = offsets.location_of(range.end);
        self.editor.selection_anchor = Some(start);
        self.editor.set_cursor_calculated(end);
        self.editor.delete_selected_impl();
        self.editor.selection_anchor = None;
        self.editor.insert_text_impl(text);
        self.editor.preferred_offset = None;
        self.editor.refresh_highlights();
        if own_transaction {
            self.editor.finish_changing_text();
        }
    }

    /// The flat offset under a document-space point, or `None` when the
    /// point is not over text.
    pub fn character_index_from_point(&mut self, point: Point) -> Option<usize> {
        self.update();
        let (location, hit) = self.editor.layout.text_location_at(point, self.measurer);
        (hit == HitPoint::WithinText)
            .then(|| self.editor.layout.offset_locations().offset_of(location))
    }

    /// The document-space bounding rectangle of a flat range, unioned
    /// across the views it spans.
    pub fn text_bounds(&mut self, range: TextRange) -> Rect {
        self.update();
        let offsets = self.editor.layout.offset_locations();
        let span = TextSelection::new(
            offsets.location_of(range.start),
            offsets.location_of(range.end),
        );
        let mut bounds: Option<Rect> = None;
        for (line_index, line_range) in selection_line_ranges(&self.editor.layout, span) {
            for view in self.editor.layout.views() {
                if view.line_index != line_index {
                    continue;
                }
                let start = line_range.start.max(view.range.start);
                let end = line_range.end.min(view.range.end);
                if start > end || (start == end && !line_range.is_empty()) {
                    continue;
                }
                let x0 = view.offset.x + self.editor.layout.view_x_at(view, start, self.measurer);
                let x1 = view.offset.x + self.editor.layout.view_x_at(view, end, self.measurer);
                let rect = Rect::new(x0, view.offset.y, x1, view.offset.y + view.size.height);
                bounds = Some(match bounds {
                    Some(acc) => acc.union(rect),
                    None => rect,
                });
            }
        }
        bounds.unwrap_or(Rect::ZERO)
    }

    /// Opens a composition session over the selection (or the caret) and
    /// its enclosing transaction.
    ///
    /// # Panics
    ///
    /// Panics if the selection spans multiple lines; a composition is
    /// confined to a single line.
    pub fn begin_composition(&mut self, time: f64) {
        if self.editor.is_composing() {
            return;
        }
        self.editor.start_changing_text();
        let offsets = self.editor.layout.offset_locations();
        let (start, len) = match self.editor.selection() {
            Some(selection) => {
                let start = offsets.offset_of(selection.start);
                (start, offsets.offset_of(selection.end) - start)
            }
            None => (
                offsets.offset_of(self.editor.cursor.interaction_location()),
                0,
            ),
        };
        let range = CompositionRange { start, len };
        assert_composition_on_one_line(&offsets, range);
        self.editor.composition = Some(range);
        self.editor.cursor.touch(time);
        self.editor.refresh_highlights();
    }

    /// Moves the composition range as the input method rewrites its text.
    ///
    /// # Panics
    ///
    /// Panics if the flat range crosses a line separator; a composition is
    /// confined to a single line.
    pub fn update_composition_range(&mut self, start: usize, len: usize) {
        if self.editor.is_composing() {
            let range = CompositionRange { start, len };
            assert_composition_on_one_line(&self.editor.layout.offset_locations(), range);
            self.editor.composition = Some(range);
            self.editor.refresh_highlights();
        }
    }

    /// Commits the composition as typed and closes its transaction.
    pub fn end_composition(&mut self, time: f64) {
        if self.editor.composition.take().is_some() {
            self.editor.finish_changing_text();
            self.editor.cursor.touch(time);
            self.editor.refresh_highlights();
        }
    }
}
