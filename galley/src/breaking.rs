// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Soft-wrap and word boundary segmentation.

use alloc::vec::Vec;

use icu_segmenter::options::{LineBreakOptions, WordBreakInvariantOptions};
use icu_segmenter::{LineSegmenter, LineSegmenterBorrowed, WordSegmenter, WordSegmenterBorrowed};

/// Produces the offsets at which one line of text may be soft-wrapped.
///
/// Implementations report ascending byte offsets strictly greater than zero
/// and no greater than `text.len()`, each a position where a new wrapped
/// line may start. `text.len()` itself must be included for non-empty text
/// so the final segment terminates.
pub trait LineBreaker: core::fmt::Debug {
    /// Break opportunities for `text`. Empty text yields no offsets.
    fn break_offsets(&self, text: &str) -> Vec<usize>;
}

/// The default [`LineBreaker`], backed by Unicode line breaking (UAX #14)
/// with automatic dictionary/model selection for Southeast Asian scripts.
#[derive(Clone)]
pub struct UnicodeLineBreaker {
    segmenter: LineSegmenterBorrowed<'static>,
}

impl core::fmt::Debug for UnicodeLineBreaker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UnicodeLineBreaker").finish_non_exhaustive()
    }
}

impl UnicodeLineBreaker {
    /// Creates a breaker from the compiled segmentation data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segmenter: LineSegmenter::new_auto(LineBreakOptions::default()),
        }
    }
}

impl Default for UnicodeLineBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBreaker for UnicodeLineBreaker {
    fn break_offsets(&self, text: &str) -> Vec<usize> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut offsets: Vec<usize> = self
            .segmenter
            .segment_str(text)
            .filter(|&offset| offset > 0)
            .collect();
        // The segmenter always reports the end of text as a mandatory break,
        // but guard the contract anyway.
        if offsets.last() != Some(&text.len()) {
            offsets.push(text.len());
        }
        offsets
    }
}

/// Word boundary lookup used for word selection and word-wise cursor
/// movement.
#[derive(Clone)]
pub struct WordBreaks {
    segmenter: WordSegmenterBorrowed<'static>,
}

impl core::fmt::Debug for WordBreaks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WordBreaks").finish_non_exhaustive()
    }
}

impl WordBreaks {
    /// Creates the lookup from the compiled segmentation data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segmenter: WordSegmenter::new_auto(WordBreakInvariantOptions::default()),
        }
    }

    /// All segment boundaries in `text`, starting with `0` and ending with
    /// `text.len()`.
    #[must_use]
    pub fn boundaries(&self, text: &str) -> Vec<usize> {
        self.segmenter.segment_str(text).collect()
    }

    /// The boundaries of the segment containing `offset`, half-open.
    ///
    /// An `offset` at the very end of `text` belongs to the final segment.
    #[must_use]
    pub fn segment_at(&self, text: &str, offset: usize) -> (usize, usize) {
        let boundaries = self.boundaries(text);
        let mut start = 0;
        for window in boundaries.windows(2) {
            if offset < window[1] || window[1] == text.len() {
                start = window[0];
                return (start, window[1]);
            }
        }
        (start, text.len())
    }
}

impl Default for WordBreaks {
    fn default() -> Self {
        Self::new()
    }
}
