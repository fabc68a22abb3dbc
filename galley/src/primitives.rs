// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Location and range vocabulary shared by the layout and editing modules.
//!
//! All offsets are UTF-8 byte offsets lying on `char` boundaries. Methods
//! that take offsets treat a violation of that contract as a programming
//! error.

/// A position within a document: a line index plus a byte offset into that
/// line's text.
///
/// Locations order first by line, then by offset, so comparing two locations
/// answers "which comes first in the document".
///
/// An offset equal to the line's length is valid and addresses the position
/// after the last character (where the caret sits at end of line).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextLocation {
    /// Index of the line in the document.
    pub line: usize,
    /// Byte offset within the line's text.
    pub offset: usize,
}

impl TextLocation {
    /// Creates a location from a line index and a byte offset.
    #[must_use]
    pub const fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }

    /// Returns this location with the offset moved by `delta` bytes.
    ///
    /// # Panics
    ///
    /// Panics if the result would be negative.
    #[must_use]
    pub fn offset_by(self, delta: isize) -> Self {
        let offset = self
            .offset
            .checked_add_signed(delta)
            .expect("location offset out of bounds");
        Self {
            line: self.line,
            offset,
        }
    }
}

/// A half-open byte range `[start, end)` within one line's text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    /// Inclusive start of the range.
    pub start: usize,
    /// Exclusive end of the range.
    pub end: usize,
}

impl TextRange {
    /// Creates a range from start and end byte offsets.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "range start must not exceed end");
        Self { start, end }
    }

    /// The number of bytes covered by the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range covers zero bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` lies within the range (start inclusive, end
    /// exclusive).
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether `offset` lies within the range, counting the end offset as
    /// inside. This is the caret-position test: a caret at `end` still
    /// belongs to this range.
    #[must_use]
    pub const fn contains_inclusive(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// The overlap of two ranges, or `None` if they are disjoint.
    ///
    /// Two ranges that merely touch produce an empty range at the touch
    /// point only when one of them is itself empty there; otherwise
    /// touching ranges are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }

    /// Returns the range shifted by `delta` bytes.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint would become negative.
    #[must_use]
    pub fn offset_by(self, delta: isize) -> Self {
        let start = self
            .start
            .checked_add_signed(delta)
            .expect("range start out of bounds");
        let end = self
            .end
            .checked_add_signed(delta)
            .expect("range end out of bounds");
        Self { start, end }
    }
}

/// A span of the document between two locations, stored normalized so that
/// [`start`](Self::start) never comes after [`end`](Self::end).
///
/// A selection carries no direction; the editor tracks which end is the
/// anchor separately.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TextSelection {
    /// The earlier endpoint.
    pub start: TextLocation,
    /// The later endpoint.
    pub end: TextLocation,
}

impl TextSelection {
    /// Creates a selection from two endpoints in either order.
    #[must_use]
    pub fn new(a: TextLocation, b: TextLocation) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Whether the selection covers no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `location` lies within the selection (end exclusive).
    #[must_use]
    pub fn contains(&self, location: TextLocation) -> bool {
        self.start <= location && location < self.end
    }
}

/// Classification of a pixel-space hit test result.
///
/// Points outside the text area still resolve to the nearest location; the
/// classification records which side of the text the point actually fell on
/// so callers can distinguish a true hit from a gutter hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitPoint {
    /// The point fell within a line's text extents.
    WithinText,
    /// The point fell to the left of the line's text.
    LeftGutter,
    /// The point fell to the right of the line's text.
    RightGutter,
}
