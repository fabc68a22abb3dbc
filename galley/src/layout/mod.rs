// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The retained layout engine.
//!
//! A [`TextLayout`] owns the document's line models and lazily flows them
//! into line views. Mutations only touch the models and set a dirty flag;
//! the next [`update_if_needed`](TextLayout::update_if_needed) performs the
//! actual wrapping, justification, and highlight projection using the
//! caller's [`TextMeasurer`].

mod data;
mod flow;
mod query;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use peniko::kurbo::{Insets, Size};
use smallvec::SmallVec;

use crate::breaking::{LineBreaker, UnicodeLineBreaker, WordBreaks};
use crate::primitives::{TextLocation, TextRange};
use crate::style::RunStyle;

pub use data::{
    HighlightKind, LayoutBlock, LineHighlight, LineModel, LineView, OffsetLocations, RunModel,
    ViewHighlight,
};

/// Horizontal alignment of line views within the layout width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Justification {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center within the layout width.
    Center,
    /// Align to the right edge.
    Right,
    /// Stretch soft-wrapped views to the layout width; the final view of
    /// each hard line stays left-aligned.
    Justified,
}

#[derive(Copy, Clone, Debug, Default)]
struct Dirty {
    layout: bool,
    highlights: bool,
}

/// A line-based text layout: the document model plus the flowed views.
#[derive(Debug)]
pub struct TextLayout<S: RunStyle> {
    lines: Vec<LineModel<S>>,
    views: Vec<LineView>,
    dirty: Dirty,
    margin: Insets,
    justification: Justification,
    line_height_percentage: f64,
    wrapping_width: Option<f64>,
    size: Size,
    breaker: Box<dyn LineBreaker>,
    words: WordBreaks,
}

impl<S: RunStyle> TextLayout<S> {
    /// Creates an empty layout with Unicode line breaking.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            views: Vec::new(),
            dirty: Dirty {
                layout: true,
                highlights: false,
            },
            margin: Insets::ZERO,
            justification: Justification::Left,
            line_height_percentage: 1.0,
            wrapping_width: None,
            size: Size::ZERO,
            breaker: Box::new(UnicodeLineBreaker::new()),
            words: WordBreaks::new(),
        }
    }

    // --- Configuration ---

    /// The width text wraps at, or `None` for no wrapping.
    #[must_use]
    pub fn wrapping_width(&self) -> Option<f64> {
        self.wrapping_width
    }

    /// Sets the wrapping width. Margins are subtracted from it before
    /// wrapping.
    pub fn set_wrapping_width(&mut self, width: Option<f64>) {
        if self.wrapping_width != width {
            self.wrapping_width = width;
            self.dirty.layout = true;
        }
    }

    /// The empty space around the text area.
    #[must_use]
    pub fn margin(&self) -> Insets {
        self.margin
    }

    /// Sets the margin around the text area.
    pub fn set_margin(&mut self, margin: Insets) {
        if self.margin != margin {
            self.margin = margin;
            self.dirty.layout = true;
        }
    }

    /// The horizontal alignment of line views.
    #[must_use]
    pub fn justification(&self) -> Justification {
        self.justification
    }

    /// Sets the horizontal alignment of line views.
    pub fn set_justification(&mut self, justification: Justification) {
        if self.justification != justification {
            self.justification = justification;
            self.dirty.layout = true;
        }
    }

    /// The multiplier applied to every view's height.
    #[must_use]
    pub fn line_height_percentage(&self) -> f64 {
        self.line_height_percentage
    }

    /// Sets the multiplier applied to every view's height.
    pub fn set_line_height_percentage(&mut self, percentage: f64) {
        if self.line_height_percentage != percentage {
            self.line_height_percentage = percentage;
            self.dirty.layout = true;
        }
    }

    /// Replaces the soft-wrap breaker.
    pub fn set_line_breaker(&mut self, breaker: Box<dyn LineBreaker>) {
        self.breaker = breaker;
        for line in &mut self.lines {
            line.break_candidates.clear();
            line.has_break_candidates = false;
        }
        self.dirty.layout = true;
    }

    // --- Accessors ---

    /// The line models.
    #[must_use]
    pub fn lines(&self) -> &[LineModel<S>] {
        &self.lines
    }

    /// The flowed line views from the most recent update.
    #[must_use]
    pub fn views(&self) -> &[LineView] {
        &self.views
    }

    /// The overall size of the layout including margins, from the most
    /// recent update.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of lines in the document.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document holds no text: no lines, or a single empty one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.lines.as_slice() {
            [] => true,
            [line] => line.is_empty(),
            _ => false,
        }
    }

    /// Whether `location` addresses a valid caret position.
    #[must_use]
    pub fn is_valid_location(&self, location: TextLocation) -> bool {
        self.lines.get(location.line).is_some_and(|line| {
            location.offset <= line.len() && line.text.is_char_boundary(location.offset)
        })
    }

    /// Whether the flowed views are out of date with respect to the models.
    #[must_use]
    pub fn needs_flow(&self) -> bool {
        self.dirty.layout || self.dirty.highlights
    }

    // --- Line mutation ---

    /// Appends a line to the document.
    pub fn add_line(&mut self, line: LineModel<S>) {
        line.assert_runs_cover_text();
        self.lines.push(line);
        self.dirty.layout = true;
    }

    /// Appends several lines to the document.
    pub fn add_lines(&mut self, lines: impl IntoIterator<Item = LineModel<S>>) {
        for line in lines {
            self.add_line(line);
        }
    }

    /// Removes every line. The layout is unusable for editing until a line
    /// is added back; marshallers always seed at least one line.
    pub fn clear_lines(&mut self) {
        self.lines.clear();
        self.views.clear();
        self.dirty.layout = true;
    }

    /// Removes the line at `index`. Returns `false` if out of bounds.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        self.dirty.layout = true;
        true
    }

    /// Inserts `ch` at `location`. Returns `false` if the location's line
    /// does not exist.
    ///
    /// # Panics
    ///
    /// Panics if the offset is past the line's end or off a `char`
    /// boundary, or if `ch` is a line separator.
    pub fn insert_char_at(&mut self, location: TextLocation, ch: char) -> bool {
        let mut buffer = [0_u8; 4];
        self.insert_text_at(location, ch.encode_utf8(&mut buffer))
    }

    /// Inserts `text` (which must not contain line separators) at
    /// `location`. Returns `false` if the location's line does not exist.
    pub fn insert_text_at(&mut self, location: TextLocation, text: &str) -> bool {
        assert!(
            !text.contains('\n'),
            "line text must not contain separators; split the line instead"
        );
        let Some(line) = self.lines.get_mut(location.line) else {
            return false;
        };
        let offset = location.offset;
        assert!(
            offset <= line.len() && line.text.is_char_boundary(offset),
            "insert offset must be a char boundary within the line"
        );
        if text.is_empty() {
            return true;
        }
        line.text.insert_str(offset, text);
        let delta = text.len() as isize;
        // Text typed at a run boundary continues the preceding run's style,
        // unless an empty run preserved at that boundary claims it.
        let target = line
            .runs
            .iter()
            .position(|run| run.range().is_empty() && run.range().start == offset)
            .or_else(|| {
                line.runs
                    .iter()
                    .position(|run| run.range().start < offset && offset <= run.range().end)
            })
            .unwrap_or(0);
        for (index, run) in line.runs.iter_mut().enumerate() {
            if index == target {
                let range = run.range();
                run.set_range(TextRange::new(
                    range.start,
                    range.end.wrapping_add_signed(delta),
                ));
            } else if run.range().start >= offset && index > target {
                run.shift(delta);
            }
        }
        line.invalidate();
        line.assert_runs_cover_text();
        self.dirty.layout = true;
        true
    }

    /// Inserts a new styled run at `location`, splitting the run already
    /// there. With `preserve_trailing_empty_run`, the right-hand remainder
    /// of the split run is kept even when empty, so typing after the
    /// inserted run resumes the original style.
    ///
    /// Returns `false` if the location's line does not exist.
    pub fn insert_run_at(
        &mut self,
        location: TextLocation,
        style: S,
        text: &str,
        preserve_trailing_empty_run: bool,
    ) -> bool {
        assert!(
            !text.contains('\n'),
            "run text must not contain separators; split the line instead"
        );
        let Some(line) = self.lines.get_mut(location.line) else {
            return false;
        };
        let offset = location.offset;
        assert!(
            offset <= line.len() && line.text.is_char_boundary(offset),
            "insert offset must be a char boundary within the line"
        );
        line.text.insert_str(offset, text);
        let delta = text.len();
        let target = line.run_index_at(offset);
        let split = line.runs[target].clone();
        let split_range = split.range();

        let mut replacement: SmallVec<[RunModel<S>; 3]> = SmallVec::new();
        let left = TextRange::new(split_range.start, offset);
        if !left.is_empty() {
            replacement.push(RunModel::new(split.style().clone(), left));
        }
        if delta > 0 {
            replacement.push(RunModel::new(style, TextRange::new(offset, offset + delta)));
        }
        let right = TextRange::new(offset + delta, split_range.end + delta);
        if !right.is_empty() || preserve_trailing_empty_run || replacement.is_empty() {
            replacement.push(RunModel::new(split.style().clone(), right));
        }

        let tail = replacement.len();
        line.runs.insert_many(target, replacement);
        line.runs.remove(target + tail);
        for run in line.runs.iter_mut().skip(target + tail) {
            run.shift(delta as isize);
        }
        line.invalidate();
        line.assert_runs_cover_text();
        self.dirty.layout = true;
        true
    }

    /// Removes up to `count` bytes starting at `location`, clamped to the
    /// line's end. Returns `false` if nothing was removed, including when
    /// the location sits at the line's end (removal never crosses line
    /// boundaries; join lines instead).
    pub fn remove_at(&mut self, location: TextLocation, count: usize) -> bool {
        let Some(line) = self.lines.get_mut(location.line) else {
            return false;
        };
        let offset = location.offset;
        assert!(
            offset <= line.len() && line.text.is_char_boundary(offset),
            "removal offset must be a char boundary within the line"
        );
        let count = count.min(line.len() - offset);
        if count == 0 {
            return false;
        }
        let removed = TextRange::new(offset, offset + count);
        assert!(
            line.text.is_char_boundary(removed.end),
            "removal must end on a char boundary"
        );
        line.text.replace_range(removed.start..removed.end, "");

        let map = |o: usize| {
            if o <= removed.start {
                o
            } else if o >= removed.end {
                o - count
            } else {
                removed.start
            }
        };
        let mut seed_style = None;
        line.runs.retain(|run| {
            let range = run.range();
            let new_range = TextRange::new(map(range.start), map(range.end));
            if new_range.is_empty() && range.intersect(&removed).is_some_and(|i| !i.is_empty()) {
                // Run fully consumed by the removal.
                if seed_style.is_none() {
                    seed_style = Some(run.style().clone());
                }
                return false;
            }
            true
        });
        for run in &mut line.runs {
            let range = run.range();
            run.set_range(TextRange::new(map(range.start), map(range.end)));
        }
        if line.runs.is_empty() {
            // Everything was removed; re-seed so the line keeps a style.
            let style = seed_style.unwrap_or_default();
            line.runs.push(RunModel::new(style, TextRange::default()));
        }
        line.invalidate();
        line.assert_runs_cover_text();
        self.dirty.layout = true;
        true
    }

    /// Splits the line at `location` into two lines. Returns `false` if the
    /// location's line does not exist.
    pub fn split_line_at(&mut self, location: TextLocation) -> bool {
        let Some(line) = self.lines.get_mut(location.line) else {
            return false;
        };
        let offset = location.offset;
        assert!(
            offset <= line.len() && line.text.is_char_boundary(offset),
            "split offset must be a char boundary within the line"
        );
        let right_text = line.text.split_off(offset);

        let mut left_runs: SmallVec<[RunModel<S>; 1]> = SmallVec::new();
        let mut right_runs: SmallVec<[RunModel<S>; 1]> = SmallVec::new();
        for run in line.runs.drain(..) {
            let range = run.range();
            if range.start >= offset {
                // An empty run sitting exactly at the split point moves to
                // the new line so its style continues there.
                let mut run = run;
                run.set_range(TextRange::new(range.start - offset, range.end - offset));
                right_runs.push(run);
            } else if range.end <= offset {
                left_runs.push(run);
            } else {
                // The run straddles the split point.
                left_runs.push(RunModel::new(
                    run.style().clone(),
                    TextRange::new(range.start, offset),
                ));
                right_runs.push(RunModel::new(
                    run.style().clone(),
                    TextRange::new(0, range.end - offset),
                ));
            }
        }
        if left_runs.is_empty() {
            let style = right_runs
                .first()
                .map(|run| run.style().clone())
                .unwrap_or_default();
            left_runs.push(RunModel::new(style, TextRange::default()));
        }
        if right_runs.is_empty() {
            let style = left_runs
                .last()
                .map(|run| run.style().clone())
                .unwrap_or_default();
            right_runs.push(RunModel::new(style, TextRange::default()));
        }

        line.runs = left_runs;
        line.highlights.clear();
        line.invalidate();
        line.assert_runs_cover_text();

        let right = LineModel::new(
            right_text,
            right_runs
                .into_iter()
                .map(|run| (run.style().clone(), run.range())),
        );
        self.lines.insert(location.line + 1, right);
        self.dirty.layout = true;
        true
    }

    /// Joins the line at `index` with the one after it. Returns `false` if
    /// there is no next line.
    pub fn join_line_with_next_line(&mut self, index: usize) -> bool {
        if index + 1 >= self.lines.len() {
            return false;
        }
        if self.lines[index + 1].is_empty() {
            return self.remove_line(index + 1);
        }
        let next = self.lines.remove(index + 1);
        let line = &mut self.lines[index];
        let base = line.len();
        line.text.push_str(&next.text);
        for run in next.runs {
            let range = run.range().offset_by(base as isize);
            line.runs.push(RunModel::new(run.style().clone(), range));
        }
        // Drop empty seed runs once real content surrounds them.
        if line.runs.iter().any(|run| !run.range().is_empty()) {
            line.runs.retain(|run| !run.range().is_empty());
        }
        line.invalidate();
        line.assert_runs_cover_text();
        self.dirty.layout = true;
        true
    }

    // --- Highlights ---

    /// Attaches a highlight to the line at `line_index`. No-op if the line
    /// does not exist.
    pub fn add_highlight(&mut self, line_index: usize, highlight: LineHighlight) {
        if let Some(line) = self.lines.get_mut(line_index) {
            line.highlights.push(highlight);
            self.dirty.highlights = true;
        }
    }

    /// Removes every highlight of `kind` across the document.
    pub fn clear_highlights(&mut self, kind: HighlightKind) {
        for line in &mut self.lines {
            line.highlights.retain(|h| h.kind != kind);
        }
        self.dirty.highlights = true;
    }

    /// Removes all highlights across the document.
    pub fn clear_all_highlights(&mut self) {
        for line in &mut self.lines {
            line.highlights.clear();
        }
        self.dirty.highlights = true;
    }

    // --- Text extraction ---

    /// Writes the document text into `out`, lines separated by `\n`.
    pub fn write_text(&self, out: &mut String) {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
    }

    pub(crate) fn words(&self) -> &WordBreaks {
        &self.words
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [LineModel<S>] {
        &mut self.lines
    }

    pub(crate) fn breaker_offsets(&self, text: &str) -> Vec<usize> {
        self.breaker.break_offsets(text)
    }

    pub(crate) fn take_views(&mut self) -> Vec<LineView> {
        core::mem::take(&mut self.views)
    }

    pub(crate) fn restore_views(&mut self, views: Vec<LineView>) {
        self.views = views;
    }

    pub(crate) fn dirty_layout(&self) -> bool {
        self.dirty.layout
    }

    pub(crate) fn dirty_highlights(&self) -> bool {
        self.dirty.highlights
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = Dirty::default();
    }

    pub(crate) fn set_views(&mut self, views: Vec<LineView>, size: Size) {
        self.views = views;
        self.size = size;
    }
}

impl<S: RunStyle> Default for TextLayout<S> {
    fn default() -> Self {
        Self::new()
    }
}
