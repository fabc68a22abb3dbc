// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Size;

/// The measurement oracle a [`TextLayout`](crate::TextLayout) runs on.
///
/// Galley knows nothing about fonts or shaping; everything pixel-shaped
/// comes from an implementation of this trait supplied by the embedder.
/// Layout operations take the measurer as a parameter rather than storing
/// it, so one measurer can serve many layouts.
///
/// # Contract
///
/// - Results must be deterministic for a given `(text, style)` pair for as
///   long as the layout is alive. The layout caches measurements per run
///   range and only invalidates them when the text or runs change.
/// - `measure("")` must still report the line height for the style, so
///   empty lines occupy vertical space.
/// - Measuring a concatenation must cost the same as the sum of its parts:
///   galley measures runs piecewise and adds widths.
pub trait TextMeasurer<S> {
    /// The size of `text` rendered with `style`: advance width by line
    /// height.
    fn measure(&self, text: &str, style: &S) -> Size;

    /// The caret byte offset within `text` closest to `x` pixels from the
    /// left edge of the rendered text.
    ///
    /// Must return a `char` boundary in `0..=text.len()`: `0` for points at
    /// or left of the text's start, `text.len()` for points at or right of
    /// its end.
    fn hit_test(&self, text: &str, style: &S, x: f64) -> usize;
}
