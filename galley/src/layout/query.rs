// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-side queries over the flowed views.
//!
//! Everything here operates on the views produced by the most recent
//! [`update_if_needed`](TextLayout::update_if_needed); callers are expected
//! to update first.

use alloc::string::String;

use peniko::kurbo::Point;

use super::data::{LineView, OffsetLocations};
use super::TextLayout;
use crate::measure::TextMeasurer;
use crate::primitives::{HitPoint, TextLocation, TextRange, TextSelection};
use crate::style::RunStyle;

impl<S: RunStyle> TextLayout<S> {
    /// The caret location nearest to `point`, plus whether the point fell
    /// within the text, in the left gutter, or in the right gutter.
    ///
    /// Points above the first view resolve against it, points below the
    /// last view against that.
    pub fn text_location_at<M: TextMeasurer<S> + ?Sized>(
        &self,
        point: Point,
        measurer: &M,
    ) -> (TextLocation, HitPoint) {
        let views = self.views();
        let Some(view) = views
            .iter()
            .find(|view| point.y < view.offset.y + view.size.height)
            .or_else(|| views.last())
        else {
            return (TextLocation::default(), HitPoint::RightGutter);
        };

        let left = view.offset.x;
        let right = left
            + view
                .blocks
                .last()
                .map_or(0.0, |block| block.offset.x + block.size.width);
        if point.x < left {
            return (
                TextLocation::new(view.line_index, view.range.start),
                HitPoint::LeftGutter,
            );
        }
        if point.x >= right {
            return (
                TextLocation::new(view.line_index, view.range.end),
                HitPoint::RightGutter,
            );
        }

        let rel_x = point.x - left;
        let line = &self.lines()[view.line_index];
        let block = view
            .blocks
            .iter()
            .find(|block| rel_x < block.offset.x + block.size.width)
            .or_else(|| view.blocks.last());
        let offset = match block {
            Some(block) if rel_x >= block.offset.x => {
                let run = &line.runs()[block.run_index];
                let text = &line.text()[block.range.start..block.range.end];
                block.range.start + measurer.hit_test(text, run.style(), rel_x - block.offset.x)
            }
            // Between two justified blocks; snap to the next block's start.
            Some(block) => block.range.start,
            None => view.range.start,
        };
        (
            TextLocation::new(view.line_index, offset),
            HitPoint::WithinText,
        )
    }

    /// Index into [`views`](Self::views) of the view showing `location`.
    ///
    /// With `inclusive_end`, an offset equal to a view's end matches that
    /// view; at a soft-wrap boundary this resolves to the earlier view (the
    /// caret at the end of the wrapped text).
    #[must_use]
    pub fn line_view_index_for_location(
        &self,
        location: TextLocation,
        inclusive_end: bool,
    ) -> Option<usize> {
        let views = self.views();
        let exact = views.iter().position(|view| {
            view.line_index == location.line && view.range.contains(location.offset)
        });
        if exact.is_some() || !inclusive_end {
            return exact;
        }
        views.iter().position(|view| {
            view.line_index == location.line && view.range.contains_inclusive(location.offset)
        })
    }

    /// The document-space position of the caret at `location`: the top-left
    /// of the character cell it precedes. `None` when the location is not
    /// shown by any view.
    pub fn location_point<M: TextMeasurer<S> + ?Sized>(
        &self,
        location: TextLocation,
        measurer: &M,
    ) -> Option<Point> {
        let index = self.line_view_index_for_location(location, true)?;
        let view = &self.views()[index];
        let x = view.offset.x + self.view_x_at(view, location.offset, measurer);
        Some(Point::new(x, view.offset.y))
    }

    /// The word at `location`.
    ///
    /// A word is a maximal segment containing at least one non-whitespace
    /// character; over whitespace the lookup walks back to the nearest
    /// preceding word on the same line and returns `None` when there is
    /// none.
    #[must_use]
    pub fn word_at(&self, location: TextLocation) -> Option<TextRange> {
        let line = self.lines().get(location.line)?;
        if line.is_empty() {
            return None;
        }
        let text = line.text();
        let offset = location.offset.min(text.len());
        let (mut start, mut end) = self.words().segment_at(text, offset);
        loop {
            if text[start..end].chars().any(|c| !c.is_whitespace()) {
                return Some(TextRange::new(start, end));
            }
            if start == 0 {
                return None;
            }
            (start, end) = self.words().segment_at(text, start - 1);
        }
    }

    /// Builds the map between locations and offsets into the document
    /// flattened with one `\n` per line break.
    #[must_use]
    pub fn offset_locations(&self) -> OffsetLocations {
        OffsetLocations::new(self.lines().iter().map(|line| line.len()))
    }

    /// The text covered by `selection`, lines joined with `\n`.
    #[must_use]
    pub fn selection_text(&self, selection: TextSelection) -> String {
        let mut out = String::new();
        let lines = self.lines();
        if selection.is_empty() || lines.is_empty() {
            return out;
        }
        let last = selection.end.line.min(lines.len() - 1);
        for line_index in selection.start.line..=last {
            let line = &lines[line_index];
            let start = if line_index == selection.start.line {
                selection.start.offset.min(line.len())
            } else {
                0
            };
            let end = if line_index == selection.end.line {
                selection.end.offset.min(line.len())
            } else {
                line.len()
            };
            if line_index > selection.start.line {
                out.push('\n');
            }
            out.push_str(&line.text()[start..end]);
        }
        out
    }

    /// The view at `index`, if flowed.
    #[must_use]
    pub fn line_view(&self, index: usize) -> Option<&LineView> {
        self.views().get(index)
    }
}
