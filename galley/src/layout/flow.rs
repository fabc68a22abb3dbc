// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The flow pass: wrapping line models into views, justification, and
//! highlight projection.

use alloc::vec;
use alloc::vec::Vec;

use peniko::kurbo::{Point, Size};

use super::data::{BreakCandidate, LayoutBlock, LineModel, LineView, ViewHighlight};
use super::{Justification, TextLayout};
use crate::measure::TextMeasurer;
use crate::primitives::TextRange;
use crate::style::RunStyle;

impl<S: RunStyle> TextLayout<S> {
    /// Brings the views up to date with the models. Cheap when nothing is
    /// dirty; never reflows more than it has to (a highlight change alone
    /// re-projects highlights without re-wrapping).
    pub fn update_if_needed<M: TextMeasurer<S> + ?Sized>(&mut self, measurer: &M) {
        if self.dirty_layout() {
            self.flow_layout(measurer);
            self.flow_highlights(measurer);
        } else if self.dirty_highlights() {
            self.flow_highlights(measurer);
        }
        self.clear_dirty();
    }

    fn effective_wrap_width(&self) -> Option<f64> {
        let margin = self.margin();
        self.wrapping_width()
            .map(|w| (w - (margin.x0 + margin.x1)).max(0.01))
    }

    fn flow_layout<M: TextMeasurer<S> + ?Sized>(&mut self, measurer: &M) {
        let margin = self.margin();
        let wrap = self.effective_wrap_width();
        let mut views = Vec::new();
        let mut y = margin.y0;
        let mut max_width = 0.0_f64;

        for index in 0..self.line_count() {
            if wrap.is_some() {
                self.ensure_break_candidates(index, measurer);
            }
            let line = &self.lines()[index];
            let ranges = match wrap {
                Some(w) => Self::wrap_line(&line.break_candidates, w),
                None => vec![TextRange::new(0, line.len())],
            };
            for range in ranges {
                let mut view = self.create_line_view(index, range, measurer);
                view.offset = Point::new(margin.x0, y);
                y += view.size.height;
                max_width = max_width.max(view.text_width());
                views.push(view);
            }
        }

        let size = Size::new(max_width + margin.x0 + margin.x1, y + margin.y1);
        self.justify(&mut views, max_width);
        self.set_views(views, size);
    }

    /// Greedy fill: a candidate fits if it fits outright, or fits once its
    /// trailing whitespace is ignored (whitespace may hang past the wrap
    /// width). A candidate that fits nowhere gets a view of its own.
    fn wrap_line(candidates: &[BreakCandidate], wrap_width: f64) -> Vec<TextRange> {
        let mut ranges = Vec::new();
        let mut start = 0;
        let mut end = 0;
        let mut width = 0.0_f64;
        for candidate in candidates {
            let fits = width + candidate.size.width <= wrap_width
                || width + candidate.trimmed_size.width <= wrap_width;
            if !fits && end > start {
                ranges.push(TextRange::new(start, end));
                start = candidate.range.start;
                width = 0.0;
            }
            width += candidate.size.width;
            end = candidate.range.end;
        }
        ranges.push(TextRange::new(start, end));
        ranges
    }

    fn ensure_break_candidates<M: TextMeasurer<S> + ?Sized>(
        &mut self,
        index: usize,
        measurer: &M,
    ) {
        let line = &self.lines()[index];
        if line.has_break_candidates {
            return;
        }
        let offsets = self.breaker_offsets(&line.text);
        let mut candidates = Vec::with_capacity(offsets.len());
        let mut prev = 0;
        for offset in offsets {
            let range = TextRange::new(prev, offset);
            let size = Self::measure_line_range(line, range, measurer);
            let trimmed_end = prev + line.text[prev..offset].trim_end().len();
            let trimmed_size = if trimmed_end == offset {
                size
            } else {
                Self::measure_line_range(line, TextRange::new(prev, trimmed_end), measurer)
            };
            candidates.push(BreakCandidate {
                range,
                size,
                trimmed_size,
            });
            prev = offset;
        }
        let line = &mut self.lines_mut()[index];
        line.break_candidates = candidates;
        line.has_break_candidates = true;
    }

    fn measure_line_range<M: TextMeasurer<S> + ?Sized>(
        line: &LineModel<S>,
        range: TextRange,
        measurer: &M,
    ) -> Size {
        let mut width = 0.0_f64;
        let mut height = 0.0_f64;
        for run in line.runs() {
            let Some(piece) = run.range().intersect(&range) else {
                continue;
            };
            if piece.is_empty() {
                continue;
            }
            let size = run.measure(&line.text, piece, measurer);
            width += size.width;
            height = height.max(size.height);
        }
        Size::new(width, height)
    }

    fn create_line_view<M: TextMeasurer<S> + ?Sized>(
        &self,
        line_index: usize,
        range: TextRange,
        measurer: &M,
    ) -> LineView {
        let line = &self.lines()[line_index];
        let mut blocks = Vec::new();
        let mut x = 0.0_f64;
        let mut max_height = 0.0_f64;

        if range.is_empty() {
            // An empty view still occupies a line's height.
            let run_index = line.run_index_at(range.start);
            let height = measurer
                .measure("", line.runs()[run_index].style())
                .height;
            blocks.push(LayoutBlock {
                run_index,
                range,
                offset: Point::ZERO,
                size: Size::new(0.0, height),
            });
            max_height = height;
        } else {
            for (run_index, run) in line.runs().iter().enumerate() {
                let Some(piece) = run.range().intersect(&range) else {
                    continue;
                };
                if piece.is_empty() {
                    continue;
                }
                for sub in self.block_subranges(line, piece) {
                    let size = run.measure(&line.text, sub, measurer);
                    blocks.push(LayoutBlock {
                        run_index,
                        range: sub,
                        offset: Point::new(x, 0.0),
                        size,
                    });
                    x += size.width;
                    max_height = max_height.max(size.height);
                }
            }
        }

        LineView {
            line_index,
            range,
            offset: Point::ZERO,
            size: Size::new(x, max_height * self.line_height_percentage()),
            text_height: max_height,
            blocks,
            underlays: Vec::new(),
            overlays: Vec::new(),
        }
    }

    /// Justified layouts additionally split blocks at wrap candidate
    /// boundaries, so slack can be distributed between words.
    fn block_subranges(&self, line: &LineModel<S>, piece: TextRange) -> Vec<TextRange> {
        if self.justification() != Justification::Justified || line.break_candidates.is_empty() {
            return vec![piece];
        }
        let mut ranges = Vec::new();
        let mut start = piece.start;
        for candidate in &line.break_candidates {
            let boundary = candidate.range.start;
            if boundary > start && boundary < piece.end {
                ranges.push(TextRange::new(start, boundary));
                start = boundary;
            }
        }
        ranges.push(TextRange::new(start, piece.end));
        ranges
    }

    fn justify(&self, views: &mut [LineView], max_width: f64) {
        let justification = self.justification();
        if justification == Justification::Left {
            return;
        }
        let margin = self.margin();
        let target = self.effective_wrap_width().unwrap_or(max_width);
        for view in views {
            let slack = target - view.text_width();
            if slack <= 0.0 {
                continue;
            }
            match justification {
                Justification::Left => {}
                Justification::Center => view.offset.x = margin.x0 + slack * 0.5,
                Justification::Right => view.offset.x = margin.x0 + slack,
                Justification::Justified => {
                    let is_final = view.range.end == self.lines()[view.line_index].len();
                    if is_final || view.blocks.len() < 2 {
                        continue;
                    }
                    let gap = slack / (view.blocks.len() - 1) as f64;
                    for (index, block) in view.blocks.iter_mut().enumerate() {
                        block.offset.x += gap * index as f64;
                    }
                }
            }
        }
    }

    fn flow_highlights<M: TextMeasurer<S> + ?Sized>(&mut self, measurer: &M) {
        let mut views = self.take_views();
        for view in &mut views {
            view.underlays.clear();
            view.overlays.clear();
            let line = &self.lines()[view.line_index];
            for highlight in line.highlights() {
                let start = highlight.range.start.max(view.range.start);
                let end = highlight.range.end.min(view.range.end);
                if start > end || (start == end && !highlight.range.is_empty()) {
                    continue;
                }
                let offset_x = self.view_x_at(view, start, measurer);
                let width = self.view_x_at(view, end, measurer) - offset_x;
                let projected = ViewHighlight {
                    kind: highlight.kind,
                    offset_x,
                    width,
                };
                if highlight.kind.is_underlay() {
                    view.underlays.push(projected);
                } else {
                    view.overlays.push(projected);
                }
            }
            view.underlays.sort_by_key(|h| h.kind.z_order());
            view.overlays.sort_by_key(|h| h.kind.z_order());
        }
        self.restore_views(views);
    }

    /// X position of a caret offset within a view, relative to the view's
    /// left edge.
    pub(crate) fn view_x_at<M: TextMeasurer<S> + ?Sized>(
        &self,
        view: &LineView,
        offset: usize,
        measurer: &M,
    ) -> f64 {
        let line = &self.lines()[view.line_index];
        for block in &view.blocks {
            if offset < block.range.end {
                if offset <= block.range.start {
                    return block.offset.x;
                }
                let run = &line.runs()[block.run_index];
                let prefix = TextRange::new(block.range.start, offset);
                return block.offset.x + run.measure(&line.text, prefix, measurer).width;
            }
        }
        view.blocks
            .last()
            .map_or(0.0, |block| block.offset.x + block.size.width)
    }
}
