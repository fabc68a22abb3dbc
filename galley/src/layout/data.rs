// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::HashMap;
use peniko::kurbo::{Point, Size};
use smallvec::{smallvec, SmallVec};

use crate::measure::TextMeasurer;
use crate::primitives::{TextLocation, TextRange};
use crate::style::RunStyle;

/// A contiguous span of one line's text sharing a single style.
///
/// Runs are stored inline in their line, ordered, non-overlapping, and
/// covering the whole line. The run caches the measured size of every range
/// it has been asked about; the cache is dropped whenever the line's text
/// changes.
#[derive(Clone, Debug)]
pub struct RunModel<S> {
    style: S,
    range: TextRange,
    cache: RefCell<HashMap<TextRange, Size>>,
}

impl<S: RunStyle> RunModel<S> {
    pub(crate) fn new(style: S, range: TextRange) -> Self {
        Self {
            style,
            range,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The style shared by every character in the run.
    #[must_use]
    pub fn style(&self) -> &S {
        &self.style
    }

    /// The byte range the run covers within its line.
    #[must_use]
    pub fn range(&self) -> TextRange {
        self.range
    }

    pub(crate) fn set_range(&mut self, range: TextRange) {
        if range != self.range {
            self.range = range;
            self.cache.borrow_mut().clear();
        }
    }

    pub(crate) fn shift(&mut self, delta: isize) {
        self.range = self.range.offset_by(delta);
        self.cache.borrow_mut().clear();
    }

    /// Measures `range` (a subrange of this run) of `line_text`, consulting
    /// the cache first.
    pub(crate) fn measure<M: TextMeasurer<S> + ?Sized>(
        &self,
        line_text: &str,
        range: TextRange,
        measurer: &M,
    ) -> Size {
        assert!(
            self.range.start <= range.start && range.end <= self.range.end,
            "measured range must lie within the run"
        );
        if let Some(size) = self.cache.borrow().get(&range) {
            return *size;
        }
        let size = measurer.measure(&line_text[range.start..range.end], &self.style);
        self.cache.borrow_mut().insert(range, size);
        size
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }
}

/// A wrap candidate: the text between two adjacent break opportunities,
/// measured with and without its trailing whitespace.
#[derive(Copy, Clone, Debug)]
pub(crate) struct BreakCandidate {
    pub(crate) range: TextRange,
    pub(crate) size: Size,
    pub(crate) trimmed_size: Size,
}

/// The kind of a line highlight. The set is closed; embedders drawing their
/// own decorations do so outside the layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HighlightKind {
    /// Selection band, drawn under the text.
    Selection,
    /// Active input-method composition underline, drawn over the text.
    Composition,
    /// The caret, drawn over everything.
    Cursor,
}

impl HighlightKind {
    /// Draw order. Negative kinds render under the text, non-negative kinds
    /// over it; within a side, larger values render later.
    #[must_use]
    pub const fn z_order(self) -> i32 {
        match self {
            Self::Selection => -10,
            Self::Composition => 1,
            Self::Cursor => 2,
        }
    }

    /// Whether this kind renders under the text.
    #[must_use]
    pub const fn is_underlay(self) -> bool {
        self.z_order() < 0
    }
}

/// A highlight attached to a line model, in line byte offsets.
///
/// Highlights survive reflow: each flow pass projects them onto the line
/// views they intersect.
#[derive(Copy, Clone, Debug)]
pub struct LineHighlight {
    /// What the highlight represents.
    pub kind: HighlightKind,
    /// The highlighted byte range. May be empty (an empty-line caret).
    pub range: TextRange,
}

/// One line of the document: its text plus the styled runs covering it.
#[derive(Clone, Debug)]
pub struct LineModel<S: RunStyle> {
    pub(crate) text: String,
    pub(crate) runs: SmallVec<[RunModel<S>; 1]>,
    pub(crate) highlights: Vec<LineHighlight>,
    pub(crate) break_candidates: Vec<BreakCandidate>,
    pub(crate) has_break_candidates: bool,
}

impl<S: RunStyle> LineModel<S> {
    /// Creates a line from text and `(style, range)` pairs. The ranges must
    /// be ordered, contiguous, and cover `text` exactly.
    #[must_use]
    pub fn new(text: String, styled: impl IntoIterator<Item = (S, TextRange)>) -> Self {
        let runs: SmallVec<[RunModel<S>; 1]> = styled
            .into_iter()
            .map(|(style, range)| RunModel::new(style, range))
            .collect();
        let line = Self {
            text,
            runs,
            highlights: Vec::new(),
            break_candidates: Vec::new(),
            has_break_candidates: false,
        };
        line.assert_runs_cover_text();
        line
    }

    /// Creates a line with a single run of `style` covering all of `text`.
    #[must_use]
    pub fn from_text(text: String, style: S) -> Self {
        let range = TextRange::new(0, text.len());
        Self::new(text, [(style, range)])
    }

    /// The line's text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The styled runs covering the line.
    #[must_use]
    pub fn runs(&self) -> &[RunModel<S>] {
        &self.runs
    }

    /// The highlights currently attached to the line.
    #[must_use]
    pub fn highlights(&self) -> &[LineHighlight] {
        &self.highlights
    }

    /// Byte length of the line's text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the line holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn invalidate(&mut self) {
        self.break_candidates.clear();
        self.has_break_candidates = false;
        for run in &self.runs {
            run.clear_cache();
        }
    }

    /// Runs must be ordered, contiguous, and cover the text exactly; the
    /// mutation primitives maintain this and anything else is a programming
    /// error.
    pub(crate) fn assert_runs_cover_text(&self) {
        assert!(!self.runs.is_empty(), "a line must have at least one run");
        let mut cursor = 0;
        for run in &self.runs {
            assert!(
                run.range().start == cursor,
                "runs must be contiguous from the start of the line"
            );
            cursor = run.range().end;
        }
        assert!(
            cursor == self.text.len(),
            "runs must cover the line's text exactly"
        );
    }

    /// Index of the run containing `offset`, treating the line end as
    /// belonging to the final run.
    pub(crate) fn run_index_at(&self, offset: usize) -> usize {
        self.runs
            .iter()
            .position(|run| run.range().contains(offset))
            .unwrap_or(self.runs.len() - 1)
    }
}

impl<S: RunStyle> Default for LineModel<S> {
    fn default() -> Self {
        Self {
            text: String::new(),
            runs: smallvec![RunModel::new(S::default(), TextRange::default())],
            highlights: Vec::new(),
            break_candidates: Vec::new(),
            has_break_candidates: false,
        }
    }
}

/// A measured piece of a line view covering part of a single run.
///
/// Block offsets are relative to their view's origin.
#[derive(Clone, Debug)]
pub struct LayoutBlock {
    /// Index of the run within the line model.
    pub run_index: usize,
    /// The byte range of line text the block renders.
    pub range: TextRange,
    /// Position relative to the view origin.
    pub offset: Point,
    /// Measured size of the block's text.
    pub size: Size,
}

/// A highlight projected onto one line view, in pixels.
#[derive(Copy, Clone, Debug)]
pub struct ViewHighlight {
    /// What the highlight represents.
    pub kind: HighlightKind,
    /// Distance from the view's left edge to the highlight's start.
    pub offset_x: f64,
    /// Highlight width. Zero for an empty-line caret.
    pub width: f64,
}

/// One visual line: a hard line, or one wrapped segment of it.
#[derive(Clone, Debug)]
pub struct LineView {
    /// Index of the line model this view renders.
    pub line_index: usize,
    /// The byte range of the model's text this view renders.
    pub range: TextRange,
    /// Document-space position of the view's top-left corner.
    pub offset: Point,
    /// The view's extent: text width by text height scaled by the layout's
    /// line height percentage.
    pub size: Size,
    /// Unscaled height of the tallest block.
    pub text_height: f64,
    /// The measured blocks making up the view, left to right.
    pub blocks: Vec<LayoutBlock>,
    /// Highlights drawn under the text, in draw order.
    pub underlays: Vec<ViewHighlight>,
    /// Highlights drawn over the text, in draw order.
    pub overlays: Vec<ViewHighlight>,
}

impl LineView {
    /// Total width of the view's text.
    #[must_use]
    pub fn text_width(&self) -> f64 {
        self.blocks.iter().map(|b| b.size.width).sum()
    }
}

/// A map between document locations and offsets into the document flattened
/// to a single string with one separator byte (`\n`) between lines.
///
/// Built by [`TextLayout::offset_locations`](crate::TextLayout::offset_locations);
/// valid until the next mutation.
#[derive(Clone, Debug)]
pub struct OffsetLocations {
    entries: Vec<OffsetEntry>,
}

#[derive(Copy, Clone, Debug)]
struct OffsetEntry {
    flat_start: usize,
    len: usize,
}

impl OffsetLocations {
    pub(crate) fn new(line_lens: impl IntoIterator<Item = usize>) -> Self {
        let mut entries = Vec::new();
        let mut flat_start = 0;
        for len in line_lens {
            entries.push(OffsetEntry { flat_start, len });
            flat_start += len + 1;
        }
        Self { entries }
    }

    /// Length of the flattened document.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.entries
            .last()
            .map_or(0, |entry| entry.flat_start + entry.len)
    }

    /// The flat offset of `location`. Offsets past a line's end clamp to the
    /// line's separator position.
    #[must_use]
    pub fn offset_of(&self, location: TextLocation) -> usize {
        let Some(entry) = self.entries.get(location.line) else {
            return self.text_len();
        };
        entry.flat_start + location.offset.min(entry.len)
    }

    /// The location of a flat offset. A separator byte maps to the end of
    /// the line it terminates; offsets past the document clamp to its end.
    #[must_use]
    pub fn location_of(&self, offset: usize) -> TextLocation {
        for (line, entry) in self.entries.iter().enumerate() {
            if offset <= entry.flat_start + entry.len {
                return TextLocation::new(line, offset - entry.flat_start.min(offset));
            }
        }
        match self.entries.last() {
            Some(entry) => TextLocation::new(self.entries.len() - 1, entry.len),
            None => TextLocation::default(),
        }
    }
}
