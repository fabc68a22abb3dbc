// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use peniko::kurbo::{Point, Rect, Size};

use super::cursor::{CursorAlignment, CursorInfo};
use super::ime::CompositionRange;
use super::undo::{UndoStack, UndoState};
use crate::layout::{HighlightKind, LineHighlight, LineModel, RunModel, TextLayout};
use crate::marshal::Marshaller;
use crate::measure::TextMeasurer;
use crate::primitives::{HitPoint, TextLocation, TextRange, TextSelection};
use crate::style::RunStyle;

/// How far a cursor movement reaches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveGranularity {
    /// One character (or one visual line, vertically).
    Character,
    /// One word.
    Word,
}

/// Whether a cursor movement extends the selection or collapses it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveIntent {
    /// Move the caret, dropping any selection.
    Move,
    /// Extend the selection from its anchor to the new caret.
    Select,
}

/// A cursor movement request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CursorMove {
    /// Move left (negative) or right (positive).
    Horizontal(i32),
    /// Move up (negative) or down (positive) by visual lines.
    Vertical(i32),
    /// Move to the location nearest a document-space point.
    To(Point),
}

/// A caret jump target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpScope {
    /// Start of the current visual line.
    LineStart,
    /// End of the current visual line.
    LineEnd,
    /// Start of the document.
    DocumentStart,
    /// End of the document.
    DocumentEnd,
    /// One page up, scrolling with the caret.
    PageUp,
    /// One page down, scrolling with the caret.
    PageDown,
}

/// Multi-line editing state over a [`TextLayout`].
///
/// The editor owns the layout, the marshaller that converts between the
/// bound text value and line models, the cursor and selection anchor, the
/// undo stack, and any active input-method composition. Operations that
/// may need to reflow (most of them) live on [`EditorDriver`]; the methods
/// here only touch editor state.
#[derive(Debug)]
pub struct Editor<S: RunStyle> {
    pub(crate) layout: TextLayout<S>,
    pub(crate) marshaller: Box<dyn Marshaller<S>>,
    pub(crate) cursor: CursorInfo,
    pub(crate) selection_anchor: Option<TextLocation>,
    pub(crate) undo: UndoStack,
    pub(crate) state_before_change: Option<UndoState>,
    pub(crate) is_changing_text: bool,
    pub(crate) preferred_offset: Option<f64>,
    pub(crate) composition: Option<CompositionRange>,
    pub(crate) view_size: Size,
    pub(crate) scroll_offset: Point,
}

impl<S: RunStyle> Editor<S> {
    /// Creates an empty editor over `marshaller`.
    #[must_use]
    pub fn new(mut marshaller: Box<dyn Marshaller<S>>) -> Self {
        let mut layout = TextLayout::new();
        marshaller.set_text("", &mut layout);
        Self {
            layout,
            marshaller,
            cursor: CursorInfo::default(),
            selection_anchor: None,
            undo: UndoStack::default(),
            state_before_change: None,
            is_changing_text: false,
            preferred_offset: None,
            composition: None,
            view_size: Size::ZERO,
            scroll_offset: Point::ZERO,
        }
    }

    /// Borrows this editor together with a measurer, unlocking the
    /// operations that may reflow.
    pub fn driver<'a, M: TextMeasurer<S> + ?Sized>(
        &'a mut self,
        measurer: &'a M,
    ) -> EditorDriver<'a, S, M> {
        EditorDriver {
            editor: self,
            measurer,
        }
    }

    // --- Accessors ---

    /// The underlying layout.
    #[must_use]
    pub fn layout(&self) -> &TextLayout<S> {
        &self.layout
    }

    /// The caret.
    #[must_use]
    pub fn cursor(&self) -> &CursorInfo {
        &self.cursor
    }

    /// The current selection, or `None` when nothing is selected.
    #[must_use]
    pub fn selection(&self) -> Option<TextSelection> {
        let anchor = self.selection_anchor?;
        let selection = TextSelection::new(anchor, self.cursor.interaction_location());
        (!selection.is_empty()).then_some(selection)
    }

    /// Whether any text is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    /// The selected text, lines joined with `\n`.
    #[must_use]
    pub fn selected_text(&self) -> String {
        self.selection()
            .map(|selection| self.layout.selection_text(selection))
            .unwrap_or_default()
    }

    /// The document text via the marshaller.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.marshaller.get_text(&mut out, &self.layout);
        out
    }

    /// The marshaller converting between text and line models.
    #[must_use]
    pub fn marshaller(&self) -> &dyn Marshaller<S> {
        &*self.marshaller
    }

    /// Mutable access to the marshaller, e.g. to flag the bound value
    /// dirty.
    pub fn marshaller_mut(&mut self) -> &mut dyn Marshaller<S> {
        &mut *self.marshaller
    }

    /// Whether an input-method composition is active.
    #[must_use]
    pub fn is_composing(&self) -> bool {
        self.composition.is_some()
    }

    /// The active composition, as a range into the flattened document.
    #[must_use]
    pub fn composition(&self) -> Option<CompositionRange> {
        self.composition
    }

    /// The scroll offset maintained by page jumps.
    #[must_use]
    pub fn scroll_offset(&self) -> Point {
        self.scroll_offset
    }

    /// Tells the editor how large the visible region is and where it is
    /// scrolled to; page jumps are sized from this.
    pub fn set_visible_region(&mut self, size: Size, scroll_offset: Point) {
        self.view_size = size;
        self.scroll_offset = scroll_offset;
    }

    // --- Layout configuration pass-throughs ---

    /// Sets the width text wraps at; `None` disables wrapping.
    pub fn set_wrapping_width(&mut self, width: Option<f64>) {
        self.layout.set_wrapping_width(width);
    }

    /// Sets the horizontal alignment of line views.
    pub fn set_justification(&mut self, justification: crate::layout::Justification) {
        self.layout.set_justification(justification);
    }

    /// Sets the multiplier applied to every view's height.
    pub fn set_line_height_percentage(&mut self, percentage: f64) {
        self.layout.set_line_height_percentage(percentage);
    }

    // --- Text value ---

    /// Replaces the document from `text`. Returns `false` when the
    /// document already equals `text`. Does not push an undo state; this
    /// is the host writing its bound value, not a user edit.
    pub fn set_text(&mut self, text: &str) -> bool {
        let mut current = String::new();
        self.layout.write_text(&mut current);
        if current == text {
            return false;
        }
        self.marshaller.set_text(text, &mut self.layout);
        self.marshaller.clear_dirty();
        self.selection_anchor = None;
        let cursor = self.cursor.interaction_location();
        self.set_cursor_calculated(cursor);
        self.refresh_highlights();
        true
    }

    // --- Transactions ---

    /// Opens a text change transaction, snapshotting the document for
    /// undo.
    ///
    /// # Panics
    ///
    /// Panics if a transaction is already open.
    pub fn start_changing_text(&mut self) {
        assert!(
            !self.is_changing_text,
            "text change transaction already open"
        );
        self.is_changing_text = true;
        self.state_before_change = Some(self.make_undo_state());
    }

    /// Closes the transaction; if the text changed, the pre-edit snapshot
    /// becomes an undo state and the marshaller is flagged dirty.
    ///
    /// # Panics
    ///
    /// Panics if no transaction is open.
    pub fn finish_changing_text(&mut self) {
        assert!(self.is_changing_text, "no text change transaction open");
        self.is_changing_text = false;
        let before = self
            .state_before_change
            .take()
            .expect("open transaction must hold a snapshot");
        let mut now = String::new();
        self.layout.write_text(&mut now);
        if now != before.text {
            self.undo.push(before);
            self.marshaller.make_dirty();
        }
    }

    // --- Undo ---

    /// Restores the previous undo state. Returns `false` when there is
    /// nothing to undo or an edit/composition is in flight.
    pub fn undo(&mut self) -> bool {
        if self.is_changing_text || self.is_composing() || self.undo.len() == 0 {
            return false;
        }
        let snapshot = self.make_undo_state();
        match self.undo.undo(move || snapshot) {
            Some(state) => {
                self.restore_state(state);
                true
            }
            None => false,
        }
    }

    /// Re-applies the next undone state. Returns `false` when there is
    /// nothing to redo or an edit/composition is in flight.
    pub fn redo(&mut self) -> bool {
        if self.is_changing_text || self.is_composing() {
            return false;
        }
        match self.undo.redo() {
            Some(state) => {
                self.restore_state(state);
                true
            }
            None => false,
        }
    }

    /// Drops the undo history, e.g. when the host commits the value.
    pub fn clear_undo_states(&mut self) {
        self.undo.clear();
    }

    pub(crate) fn make_undo_state(&self) -> UndoState {
        let mut text = String::new();
        self.layout.write_text(&mut text);
        UndoState {
            text,
            cursor: self.cursor.interaction_location(),
            selection_anchor: self.selection_anchor,
        }
    }

    fn restore_state(&mut self, state: UndoState) {
        self.marshaller.set_text(&state.text, &mut self.layout);
        self.selection_anchor = state.selection_anchor;
        self.set_cursor_calculated(state.cursor);
        self.preferred_offset = None;
        self.refresh_highlights();
    }

    // --- Selection ---

    /// Selects the whole document.
    pub fn select_all(&mut self) {
        self.selection_anchor = Some(TextLocation::default());
        let end = self.document_end();
        self.set_cursor_calculated(end);
        self.refresh_highlights();
    }

    /// Whether a select-all would change anything.
    #[must_use]
    pub fn can_select_all(&self) -> bool {
        let all = TextSelection::new(TextLocation::default(), self.document_end());
        self.selection() != Some(all) && !self.layout.is_empty()
    }

    /// Drops the selection, leaving the caret in place.
    pub fn clear_selection(&mut self) {
        if self.selection_anchor.take().is_some() {
            self.refresh_highlights();
        }
    }

    /// Moves the caret to `location` and drops the selection. No-op when
    /// the location is invalid.
    pub fn goto(&mut self, location: TextLocation, time: f64) -> bool {
        if !self.layout.is_valid_location(location) {
            return false;
        }
        self.selection_anchor = None;
        self.set_cursor_calculated(location);
        self.cursor.touch(time);
        self.preferred_offset = None;
        self.refresh_highlights();
        true
    }

    /// The run the caret sits in; with a selection, the run at its start.
    #[must_use]
    pub fn run_under_cursor(&self) -> Option<&RunModel<S>> {
        let location = self
            .selection()
            .map_or(self.cursor.interaction_location(), |s| s.start);
        let line = self.layout.lines().get(location.line)?;
        Some(&line.runs()[line.run_index_at(location.offset)])
    }

    /// The styled pieces of the selection, per run, in document order.
    #[must_use]
    pub fn selected_runs(&self) -> Vec<(S, String)> {
        let mut out = Vec::new();
        let Some(selection) = self.selection() else {
            return out;
        };
        for (line_index, range) in selection_line_ranges(&self.layout, selection) {
            let line = &self.layout.lines()[line_index];
            for run in line.runs() {
                let Some(piece) = run.range().intersect(&range) else {
                    continue;
                };
                if piece.is_empty() {
                    continue;
                }
                out.push((
                    run.style().clone(),
                    line.text()[piece.start..piece.end].to_string(),
                ));
            }
        }
        out
    }

    // --- Internals shared with the driver ---

    pub(crate) fn document_end(&self) -> TextLocation {
        let lines = self.layout.lines();
        match lines.last() {
            Some(line) => TextLocation::new(lines.len() - 1, line.len()),
            None => TextLocation::default(),
        }
    }

    pub(crate) fn clamp_location(&self, location: TextLocation) -> TextLocation {
        let lines = self.layout.lines();
        if lines.is_empty() {
            return TextLocation::default();
        }
        let line = location.line.min(lines.len() - 1);
        let text = lines[line].text();
        let mut offset = location.offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        TextLocation::new(line, offset)
    }

    pub(crate) fn set_cursor_calculated(&mut self, location: TextLocation) {
        let location = self.clamp_location(location);
        let text = self
            .layout
            .lines()
            .get(location.line)
            .map_or("", |line| line.text());
        self.cursor.set_calculated(text, location);
    }

    pub(crate) fn set_cursor_with_alignment(
        &mut self,
        location: TextLocation,
        alignment: CursorAlignment,
    ) {
        let location = self.clamp_location(location);
        let text = self
            .layout
            .lines()
            .get(location.line)
            .map_or("", |line| line.text());
        self.cursor.set_with_alignment(text, location, alignment);
    }

    /// Rebuilds the selection, composition, and caret highlight records.
    /// The pixel-space projection happens on the next layout update.
    pub(crate) fn refresh_highlights(&mut self) {
        self.layout.clear_highlights(HighlightKind::Selection);
        self.layout.clear_highlights(HighlightKind::Composition);
        self.layout.clear_highlights(HighlightKind::Cursor);

        if let Some(selection) = self.selection() {
            for (line_index, range) in selection_line_ranges(&self.layout, selection) {
                self.layout.add_highlight(
                    line_index,
                    LineHighlight {
                        kind: HighlightKind::Selection,
                        range,
                    },
                );
            }
        }

        if let Some(composition) = self.composition.filter(|c| c.len > 0) {
            let offsets = self.layout.offset_locations();
            let flat_cursor = offsets.offset_of(self.cursor.interaction_location());
            // The underline only shows while the caret is inside the
            // composition.
            if composition.start <= flat_cursor && flat_cursor <= composition.end() {
                let begin = offsets.location_of(composition.start);
                let end = offsets.location_of(composition.end());
                let span = TextSelection::new(begin, end);
                for (line_index, range) in selection_line_ranges(&self.layout, span) {
                    self.layout.add_highlight(
                        line_index,
                        LineHighlight {
                            kind: HighlightKind::Composition,
                            range,
                        },
                    );
                }
            }
        }

        let position = self.cursor.position();
        if let Some(line) = self.layout.lines().get(position.line) {
            let range = if line.is_empty() {
                TextRange::default()
            } else {
                match self.cursor.alignment() {
                    CursorAlignment::Right => TextRange::new(
                        position.offset,
                        self.cursor.interaction_location().offset,
                    ),
                    CursorAlignment::Left => {
                        let end = line.text()[position.offset..]
                            .chars()
                            .next()
                            .map_or(line.len(), |c| position.offset + c.len_utf8());
                        TextRange::new(position.offset, end)
                    }
                }
            };
            self.layout.add_highlight(
                position.line,
                LineHighlight {
                    kind: HighlightKind::Cursor,
                    range,
                },
            );
        }
    }

    /// Removes the selected text from the layout and collapses the caret
    /// to the selection start. Does not open a transaction.
    pub(crate) fn delete_selected_impl(&mut self) {
        let Some(selection) = self.selection() else {
            return;
        };
        self.selection_anchor = None;
        if selection.start.line == selection.end.line {
            self.layout.remove_at(
                selection.start,
                selection.end.offset - selection.start.offset,
            );
        } else {
            for _ in selection.start.line + 1..selection.end.line {
                self.layout.remove_line(selection.start.line + 1);
            }
            let last = selection.start.line + 1;
            self.layout
                .remove_at(TextLocation::new(last, 0), selection.end.offset);
            let first_len = self.layout.lines()[selection.start.line].len();
            self.layout
                .remove_at(selection.start, first_len - selection.start.offset);
            self.layout.join_line_with_next_line(selection.start.line);
        }
        if self.layout.line_count() == 0 {
            self.layout.add_line(LineModel::default());
        }
        self.set_cursor_calculated(selection.start);
    }

    /// Inserts `text` (which may contain `\n`) at the caret, leaving the
    /// caret after it. Does not open a transaction.
    pub(crate) fn insert_text_impl(&mut self, text: &str) {
        for (index, segment) in text.split('\n').enumerate() {
            if index > 0 {
                let location = self.cursor.interaction_location();
                self.layout.split_line_at(location);
                self.set_cursor_calculated(TextLocation::new(location.line + 1, 0));
            }
            if !segment.is_empty() {
                let location = self.cursor.interaction_location();
                self.layout.insert_text_at(location, segment);
                self.set_cursor_calculated(TextLocation::new(
                    location.line,
                    location.offset + segment.len(),
                ));
            }
        }
    }

    pub(crate) fn translated_location(&self, location: TextLocation, dir: i32) -> TextLocation {
        let lines = self.layout.lines();
        let line = &lines[location.line];
        if dir > 0 {
            if location.offset < line.len() {
                let step = line.text()[location.offset..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                TextLocation::new(location.line, location.offset + step)
            } else if location.line + 1 < lines.len() {
                TextLocation::new(location.line + 1, 0)
            } else {
                location
            }
        } else if location.offset > 0 {
            let step = line.text()[..location.offset]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            TextLocation::new(location.line, location.offset - step)
        } else if location.line > 0 {
            TextLocation::new(location.line - 1, lines[location.line - 1].len())
        } else {
            location
        }
    }

    /// Whether `location` sits on a word segment boundary (line edges
    /// count).
    pub(crate) fn at_word_boundary(&self, location: TextLocation) -> bool {
        let line = &self.layout.lines()[location.line];
        if location.offset == 0 || location.offset == line.len() {
            return true;
        }
        self.layout
            .words()
            .boundaries(line.text())
            .contains(&location.offset)
    }

    /// The next word start to the right, or the previous word start to the
    /// left; line edges fall through to plain character movement.
    pub(crate) fn scan_word_boundary(&self, location: TextLocation, dir: i32) -> TextLocation {
        let line = &self.layout.lines()[location.line];
        let text = line.text();
        if dir > 0 {
            if location.offset >= text.len() {
                return self.translated_location(location, 1);
            }
            let boundaries = self.layout.words().boundaries(text);
            for (index, &boundary) in boundaries.iter().enumerate() {
                if boundary <= location.offset {
                    continue;
                }
                if boundary == text.len() {
                    return TextLocation::new(location.line, boundary);
                }
                let segment_end = boundaries.get(index + 1).copied().unwrap_or(text.len());
                if text[boundary..segment_end].chars().any(|c| !c.is_whitespace()) {
                    return TextLocation::new(location.line, boundary);
                }
            }
            TextLocation::new(location.line, text.len())
        } else {
            if location.offset == 0 {
                return self.translated_location(location, -1);
            }
            let boundaries = self.layout.words().boundaries(text);
            for window in boundaries.windows(2).rev() {
                if window[0] >= location.offset {
                    continue;
                }
                if text[window[0]..window[1]].chars().any(|c| !c.is_whitespace()) {
                    return TextLocation::new(location.line, window[0]);
                }
            }
            TextLocation::new(location.line, 0)
        }
    }
}

/// An [`Editor`] bundled with a [`TextMeasurer`], providing every operation
/// that may need to reflow or query geometry.
#[derive(Debug)]
pub struct EditorDriver<'a, S: RunStyle, M: TextMeasurer<S> + ?Sized> {
    /// The editor being driven.
    pub editor: &'a mut Editor<S>,
    /// The measurement oracle.
    pub measurer: &'a M,
}

impl<S: RunStyle, M: TextMeasurer<S> + ?Sized> EditorDriver<'_, S, M> {
    /// Brings the layout up to date.
    pub fn update(&mut self) {
        self.editor.layout.update_if_needed(self.measurer);
    }

    // --- Typing and deletion ---

    /// Types one character at the caret, replacing any selection. Control
    /// characters other than tab are rejected.
    pub fn type_char(&mut self, ch: char, time: f64) -> bool {
        if (ch as u32) < 0x20 && ch != '\t' {
            return false;
        }
        if self.editor.is_composing() {
            return false;
        }
        self.editor.start_changing_text();
        self.editor.delete_selected_impl();
        let location = self.editor.cursor.interaction_location();
        self.editor.layout.insert_char_at(location, ch);
        self.editor.set_cursor_calculated(TextLocation::new(
            location.line,
            location.offset + ch.len_utf8(),
        ));
        self.after_edit(time);
        true
    }

    /// Deletes the selection, or the character before the caret, joining
    /// lines at a line start.
    pub fn backspace(&mut self, time: f64) -> bool {
        if self.editor.is_composing() {
            return false;
        }
        self.editor.start_changing_text();
        let changed = if self.editor.has_selection() {
            self.editor.delete_selected_impl();
            true
        } else {
            let location = self.editor.cursor.interaction_location();
            if location.offset == 0 {
                if location.line > 0 {
                    let previous_len = self.editor.layout.lines()[location.line - 1].len();
                    let joined = self
                        .editor
                        .layout
                        .join_line_with_next_line(location.line - 1);
                    if joined {
                        self.editor
                            .set_cursor_calculated(TextLocation::new(location.line - 1, previous_len));
                    }
                    joined
                } else {
                    false
                }
            } else {
                let target = self.editor.translated_location(location, -1);
                let removed = self
                    .editor
                    .layout
                    .remove_at(target, location.offset - target.offset);
                if removed {
                    self.editor.set_cursor_calculated(target);
                }
                removed
            }
        };
        self.after_edit(time);
        changed
    }

    /// Deletes the selection, or the character after the caret, joining
    /// lines at a line end.
    pub fn delete(&mut self, time: f64) -> bool {
        if self.editor.is_composing() {
            return false;
        }
        self.editor.start_changing_text();
        let changed = if self.editor.has_selection() {
            self.editor.delete_selected_impl();
            true
        } else {
            let location = self.editor.cursor.interaction_location();
            let line_len = self.editor.layout.lines()[location.line].len();
            let changed = if location.offset >= line_len {
                self.editor.layout.join_line_with_next_line(location.line)
            } else {
                let next = self.editor.translated_location(location, 1);
                self.editor
                    .layout
                    .remove_at(location, next.offset - location.offset)
            };
            if changed {
                // Re-derive the alignment against the new line text.
                self.editor.set_cursor_calculated(location);
            }
            changed
        };
        self.after_edit(time);
        changed
    }

    /// Deletes the selected text as one undoable edit.
    pub fn delete_selected_text(&mut self, time: f64) -> bool {
        if self.editor.is_composing() || !self.editor.has_selection() {
            return false;
        }
        self.editor.start_changing_text();
        self.editor.delete_selected_impl();
        self.after_edit(time);
        true
    }

    /// Inserts `text` (may span lines) at the caret, replacing any
    /// selection, as one undoable edit.
    pub fn insert_text_at_cursor(&mut self, text: &str, time: f64) {
        if self.editor.is_composing() {
            return;
        }
        self.editor.start_changing_text();
        self.editor.delete_selected_impl();
        self.editor.insert_text_impl(text);
        self.after_edit(time);
    }

    /// Inserts a styled run at the caret, replacing any selection, as one
    /// undoable edit.
    pub fn insert_run_at_cursor(&mut self, style: S, text: &str, time: f64) {
        if self.editor.is_composing() {
            return;
        }
        self.editor.start_changing_text();
        self.editor.delete_selected_impl();
        let location = self.editor.cursor.interaction_location();
        self.editor
            .layout
            .insert_run_at(location, style, text, true);
        self.editor.set_cursor_calculated(TextLocation::new(
            location.line,
            location.offset + text.len(),
        ));
        self.after_edit(time);
    }

    /// Restyles the selected text, keeping the selection. Returns `false`
    /// without a selection.
    pub fn apply_style_to_selection(&mut self, style: S, time: f64) -> bool {
        if self.editor.is_composing() {
            return false;
        }
        let Some(selection) = self.editor.selection() else {
            return false;
        };
        self.editor.start_changing_text();
        for (line_index, range) in selection_line_ranges(&self.editor.layout, selection) {
            if range.is_empty() {
                continue;
            }
            let text = self.editor.layout.lines()[line_index].text()[range.start..range.end]
                .to_string();
            self.editor
                .layout
                .remove_at(TextLocation::new(line_index, range.start), range.len());
            self.editor.layout.insert_run_at(
                TextLocation::new(line_index, range.start),
                style.clone(),
                &text,
                true,
            );
        }
        // Lengths are preserved, so the cursor and anchor stay valid.
        self.after_edit(time);
        true
    }

    // --- Cursor movement ---

    /// Moves the caret. Returns `false` when the move is blocked (an
    /// active composition swallows keyboard movement).
    pub fn move_cursor(
        &mut self,
        movement: CursorMove,
        granularity: MoveGranularity,
        intent: MoveIntent,
        time: f64,
    ) -> bool {
        if self.editor.is_composing() {
            // A pointer interaction commits the composition; keyboard
            // movement stays with the input method.
            match movement {
                CursorMove::To(_) => self.end_composition(time),
                _ => return false,
            }
        }
        self.update();
        let old = self.editor.cursor.interaction_location();
        let mut explicit_alignment = None;
        let mut reset_preferred = true;

        let new_location = match movement {
            CursorMove::Horizontal(dir) => {
                // Collapsing a selection snaps to its edge first; a word
                // move only keeps scanning when the edge is not already a
                // word boundary.
                let edge = (intent == MoveIntent::Move)
                    .then(|| self.editor.selection())
                    .flatten()
                    .map(|selection| if dir < 0 { selection.start } else { selection.end });
                match (edge, granularity) {
                    (Some(edge), MoveGranularity::Character) => edge,
                    (Some(edge), MoveGranularity::Word) => {
                        if self.editor.at_word_boundary(edge) {
                            edge
                        } else {
                            self.editor.scan_word_boundary(edge, dir)
                        }
                    }
                    (None, MoveGranularity::Word) => self.editor.scan_word_boundary(old, dir),
                    (None, MoveGranularity::Character) => {
                        self.editor.translated_location(old, dir)
                    }
                }
            }
            CursorMove::Vertical(dir) => {
                reset_preferred = false;
                self.ensure_preferred_offset();
                let (location, alignment) = self.translate_vertical(dir);
                explicit_alignment = alignment;
                location
            }
            CursorMove::To(point) => {
                let (location, hit) = self
                    .editor
                    .layout
                    .text_location_at(point, self.measurer);
                explicit_alignment = self.soft_wrap_alignment(location, hit);
                location
            }
        };

        match intent {
            MoveIntent::Select => {
                if self.editor.selection_anchor.is_none() {
                    self.editor.selection_anchor = Some(old);
                }
            }
            MoveIntent::Move => self.editor.selection_anchor = None,
        }
        match explicit_alignment {
            Some(alignment) => self.editor.set_cursor_with_alignment(new_location, alignment),
            None => self.editor.set_cursor_calculated(new_location),
        }
        self.editor.cursor.touch(time);
        if reset_preferred {
            self.editor.preferred_offset = None;
        }
        self.editor.refresh_highlights();
        true
    }

    /// Jumps the caret to `scope`.
    pub fn jump_to(&mut self, scope: JumpScope, intent: MoveIntent, time: f64) -> bool {
        if self.editor.is_composing() {
            return false;
        }
        self.update();
        let old = self.editor.cursor.interaction_location();
        let mut explicit_alignment = None;
        let mut reset_preferred = true;

        let new_location = match scope {
            JumpScope::LineStart => match self.cursor_view_index() {
                Some(index) => {
                    let view = &self.editor.layout.views()[index];
                    TextLocation::new(view.line_index, view.range.start)
                }
                None => old,
            },
            JumpScope::LineEnd => match self.cursor_view_index() {
                Some(index) => {
                    let view = &self.editor.layout.views()[index];
                    let location = TextLocation::new(view.line_index, view.range.end);
                    let line_len = self.editor.layout.lines()[view.line_index].len();
                    if view.range.end < line_len && view.range.end > 0 {
                        explicit_alignment = Some(CursorAlignment::Right);
                    }
                    location
                }
                None => old,
            },
            JumpScope::DocumentStart => TextLocation::default(),
            JumpScope::DocumentEnd => self.editor.document_end(),
            JumpScope::PageUp | JumpScope::PageDown => {
                reset_preferred = false;
                self.ensure_preferred_offset();
                let dir = if scope == JumpScope::PageUp { -1 } else { 1 };
                let (location, alignment) = self.translate_page(dir);
                explicit_alignment = alignment;
                location
            }
        };

        match intent {
            MoveIntent::Select => {
                if self.editor.selection_anchor.is_none() {
                    self.editor.selection_anchor = Some(old);
                }
            }
            MoveIntent::Move => self.editor.selection_anchor = None,
        }
        match explicit_alignment {
            Some(alignment) => self.editor.set_cursor_with_alignment(new_location, alignment),
            None => self.editor.set_cursor_calculated(new_location),
        }
        self.editor.cursor.touch(time);
        if reset_preferred {
            self.editor.preferred_offset = None;
        }
        self.editor.refresh_highlights();
        true
    }

    // --- Granular movement shorthands ---

    /// Moves the caret one character left.
    pub fn move_left(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(-1),
            MoveGranularity::Character,
            MoveIntent::Move,
            time,
        )
    }

    /// Moves the caret one character right.
    pub fn move_right(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(1),
            MoveGranularity::Character,
            MoveIntent::Move,
            time,
        )
    }

    /// Moves the caret up one visual line.
    pub fn move_up(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Vertical(-1),
            MoveGranularity::Character,
            MoveIntent::Move,
            time,
        )
    }

    /// Moves the caret down one visual line.
    pub fn move_down(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Vertical(1),
            MoveGranularity::Character,
            MoveIntent::Move,
            time,
        )
    }

    /// Moves the caret to the previous word start.
    pub fn move_word_left(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(-1),
            MoveGranularity::Word,
            MoveIntent::Move,
            time,
        )
    }

    /// Moves the caret to the next word start.
    pub fn move_word_right(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(1),
            MoveGranularity::Word,
            MoveIntent::Move,
            time,
        )
    }

    /// Moves the caret to the location nearest `point`.
    pub fn move_to_point(&mut self, point: Point, time: f64) -> bool {
        self.move_cursor(
            CursorMove::To(point),
            MoveGranularity::Character,
            MoveIntent::Move,
            time,
        )
    }

    /// Extends the selection one character left.
    pub fn select_left(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(-1),
            MoveGranularity::Character,
            MoveIntent::Select,
            time,
        )
    }

    /// Extends the selection one character right.
    pub fn select_right(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(1),
            MoveGranularity::Character,
            MoveIntent::Select,
            time,
        )
    }

    /// Extends the selection up one visual line.
    pub fn select_up(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Vertical(-1),
            MoveGranularity::Character,
            MoveIntent::Select,
            time,
        )
    }

    /// Extends the selection down one visual line.
    pub fn select_down(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Vertical(1),
            MoveGranularity::Character,
            MoveIntent::Select,
            time,
        )
    }

    /// Extends the selection to the previous word start.
    pub fn select_word_left(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(-1),
            MoveGranularity::Word,
            MoveIntent::Select,
            time,
        )
    }

    /// Extends the selection to the next word start.
    pub fn select_word_right(&mut self, time: f64) -> bool {
        self.move_cursor(
            CursorMove::Horizontal(1),
            MoveGranularity::Word,
            MoveIntent::Select,
            time,
        )
    }

    /// Extends the selection to the location nearest `point`.
    pub fn select_to_point(&mut self, point: Point, time: f64) -> bool {
        self.move_cursor(
            CursorMove::To(point),
            MoveGranularity::Character,
            MoveIntent::Select,
            time,
        )
    }

    /// Moves the caret to the start of its visual line.
    pub fn move_to_line_start(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::LineStart, MoveIntent::Move, time)
    }

    /// Moves the caret to the end of its visual line.
    pub fn move_to_line_end(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::LineEnd, MoveIntent::Move, time)
    }

    /// Extends the selection to the start of the caret's visual line.
    pub fn select_to_line_start(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::LineStart, MoveIntent::Select, time)
    }

    /// Extends the selection to the end of the caret's visual line.
    pub fn select_to_line_end(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::LineEnd, MoveIntent::Select, time)
    }

    /// Moves the caret to the start of the document.
    pub fn move_to_text_start(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::DocumentStart, MoveIntent::Move, time)
    }

    /// Moves the caret to the end of the document.
    pub fn move_to_text_end(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::DocumentEnd, MoveIntent::Move, time)
    }

    /// Extends the selection to the start of the document.
    pub fn select_to_text_start(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::DocumentStart, MoveIntent::Select, time)
    }

    /// Extends the selection to the end of the document.
    pub fn select_to_text_end(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::DocumentEnd, MoveIntent::Select, time)
    }

    /// Moves the caret one page up, scrolling with it.
    pub fn page_up(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::PageUp, MoveIntent::Move, time)
    }

    /// Moves the caret one page down, scrolling with it.
    pub fn page_down(&mut self, time: f64) -> bool {
        self.jump_to(JumpScope::PageDown, MoveIntent::Move, time)
    }

    /// Selects the word at a document-space point.
    pub fn select_word_at(&mut self, point: Point, time: f64) -> bool {
        if self.editor.is_composing() {
            self.end_composition(time);
        }
        self.update();
        let (location, _) = self.editor.layout.text_location_at(point, self.measurer);
        let Some(word) = self.editor.layout.word_at(location) else {
            return false;
        };
        self.editor.selection_anchor = Some(TextLocation::new(location.line, word.start));
        self.editor
            .set_cursor_calculated(TextLocation::new(location.line, word.end));
        self.editor.cursor.touch(time);
        self.editor.preferred_offset = None;
        self.editor.refresh_highlights();
        true
    }

    /// Whether a document-space point falls inside the selection.
    pub fn is_text_selected_at(&mut self, point: Point) -> bool {
        let Some(selection) = self.editor.selection() else {
            return false;
        };
        self.update();
        let (location, hit) = self.editor.layout.text_location_at(point, self.measurer);
        hit == HitPoint::WithinText && selection.contains(location)
    }

    /// The caret's document-space rectangle (zero width), or `None` when
    /// the document has no views.
    pub fn cursor_rect(&mut self) -> Option<Rect> {
        self.update();
        let index = self.cursor_view_index()?;
        let view = &self.editor.layout.views()[index];
        let interaction = self.editor.cursor.interaction_location();
        let x = view.offset.x
            + self
                .editor
                .layout
                .view_x_at(view, interaction.offset, self.measurer);
        Some(Rect::new(
            x,
            view.offset.y,
            x,
            view.offset.y + view.size.height,
        ))
    }

    // --- Helpers ---

    fn after_edit(&mut self, time: f64) {
        self.editor.cursor.touch(time);
        self.editor.preferred_offset = None;
        self.editor.refresh_highlights();
        self.editor.finish_changing_text();
    }

    /// View index the caret is shown on, honoring its alignment at soft
    /// wrap boundaries.
    fn cursor_view_index(&self) -> Option<usize> {
        self.editor
            .layout
            .line_view_index_for_location(self.editor.cursor.position(), true)
    }

    /// Remembers the caret's visual x for vertical movement, measured on
    /// the view it is shown on (not the view after a soft wrap).
    fn ensure_preferred_offset(&mut self) {
        if self.editor.preferred_offset.is_none() {
            if let Some(index) = self.cursor_view_index() {
                let view = &self.editor.layout.views()[index];
                let interaction = self.editor.cursor.interaction_location();
                let x = view.offset.x
                    + self
                        .editor
                        .layout
                        .view_x_at(view, interaction.offset, self.measurer);
                self.editor.preferred_offset = Some(x);
            }
        }
    }

    /// Explicit right alignment when a hit landed at the end of a
    /// soft-wrapped view, so the caret stays on the clicked view.
    fn soft_wrap_alignment(
        &self,
        location: TextLocation,
        hit: HitPoint,
    ) -> Option<CursorAlignment> {
        if hit != HitPoint::RightGutter || location.offset == 0 {
            return None;
        }
        let line_len = self.editor.layout.lines().get(location.line)?.len();
        (location.offset < line_len).then_some(CursorAlignment::Right)
    }

    fn translate_vertical(&self, dir: i32) -> (TextLocation, Option<CursorAlignment>) {
        let current = self.editor.cursor.interaction_location();
        let Some(index) = self.cursor_view_index() else {
            return (current, None);
        };
        let views = self.editor.layout.views();
        let target = index
            .saturating_add_signed(dir as isize)
            .min(views.len() - 1);
        if target == index {
            return (current, None);
        }
        self.hit_view_at_preferred_x(target)
    }

    fn translate_page(&mut self, dir: i32) -> (TextLocation, Option<CursorAlignment>) {
        let current = self.editor.cursor.interaction_location();
        let Some(index) = self.cursor_view_index() else {
            return (current, None);
        };
        let views = self.editor.layout.views();
        let page_height = if self.editor.view_size.height > 0.0 {
            self.editor.view_size.height
        } else {
            views[index].size.height
        };
        // Walk at least one view, then as many as fit in a page.
        let mut target = index;
        let mut travelled = 0.0;
        loop {
            let next = target.saturating_add_signed(dir as isize).min(views.len() - 1);
            if next == target {
                break;
            }
            travelled += views[next].size.height;
            target = next;
            if travelled >= page_height {
                break;
            }
        }
        if target == index {
            return (current, None);
        }
        let delta = views[target].offset.y - views[index].offset.y;
        let result = self.hit_view_at_preferred_x(target);
        self.editor.scroll_offset.y = (self.editor.scroll_offset.y + delta).max(0.0);
        result
    }

    fn hit_view_at_preferred_x(&self, target: usize) -> (TextLocation, Option<CursorAlignment>) {
        let view = &self.editor.layout.views()[target];
        let x = self.editor.preferred_offset.unwrap_or(view.offset.x);
        let point = Point::new(x, view.offset.y + view.size.height * 0.5);
        let (location, hit) = self.editor.layout.text_location_at(point, self.measurer);
        let alignment = self.soft_wrap_alignment(location, hit);
        (location, alignment)
    }
}

/// The per-line byte ranges a document span covers.
pub(crate) fn selection_line_ranges<S: RunStyle>(
    layout: &TextLayout<S>,
    selection: TextSelection,
) -> Vec<(usize, TextRange)> {
    let lines = layout.lines();
    let mut out = Vec::new();
    if lines.is_empty() {
        return out;
    }
    let last = selection.end.line.min(lines.len() - 1);
    for line_index in selection.start.line..=last {
        let len = lines[line_index].len();
        let start = if line_index == selection.start.line {
            selection.start.offset.min(len)
        } else {
            0
        };
        let end = if line_index == selection.end.line {
            selection.end.offset.min(len)
        } else {
            len
        };
        out.push((line_index, TextRange::new(start, end)));
    }
    out
}
