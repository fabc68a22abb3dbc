// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::primitives::TextLocation;

/// Which side of its stored character a cursor attaches to.
///
/// A caret at a soft-wrap boundary is ambiguous: the same logical offset is
/// both the end of one view and the start of the next. A right-aligned
/// cursor stores the preceding character and draws after it, keeping the
/// caret on the earlier view; a left-aligned cursor draws before its stored
/// offset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CursorAlignment {
    /// The caret is drawn before the stored offset.
    #[default]
    Left,
    /// The caret is drawn after the character starting at the stored
    /// offset.
    Right,
}

/// The editor's caret: a visual position plus the logical location editing
/// operations act on.
///
/// The two only differ for right-aligned cursors, where the visual position
/// is the preceding character and the interaction location the offset after
/// it.
#[derive(Copy, Clone, Debug, Default)]
pub struct CursorInfo {
    position: TextLocation,
    interaction: TextLocation,
    alignment: CursorAlignment,
    last_interaction: f64,
}

impl CursorInfo {
    /// The visual position: the character the caret attaches to.
    #[must_use]
    pub fn position(&self) -> TextLocation {
        self.position
    }

    /// The logical location editing operations act on.
    #[must_use]
    pub fn interaction_location(&self) -> TextLocation {
        self.interaction
    }

    /// Which side of the visual position the caret draws on.
    #[must_use]
    pub fn alignment(&self) -> CursorAlignment {
        self.alignment
    }

    /// Host timestamp of the last cursor interaction, for caret blink
    /// phase.
    #[must_use]
    pub fn last_interaction_time(&self) -> f64 {
        self.last_interaction
    }

    /// Records a cursor interaction at `time`.
    pub fn touch(&mut self, time: f64) {
        self.last_interaction = time;
    }

    /// Places the cursor at `location` within `line_text`, deriving the
    /// alignment: a caret at the end of a non-empty line aligns right of
    /// the final character so it stays on the line's last view.
    pub fn set_calculated(&mut self, line_text: &str, location: TextLocation) {
        if location.offset == line_text.len() && !line_text.is_empty() {
            let last = prev_char_start(line_text, location.offset);
            self.position = TextLocation::new(location.line, last);
            self.alignment = CursorAlignment::Right;
        } else {
            self.position = location;
            self.alignment = CursorAlignment::Left;
        }
        self.interaction = location;
    }

    /// Places the cursor at `location` with an explicit alignment, used
    /// when landing exactly on a soft-wrap boundary where the calculated
    /// alignment would pick the wrong view.
    pub fn set_with_alignment(
        &mut self,
        line_text: &str,
        location: TextLocation,
        alignment: CursorAlignment,
    ) {
        match alignment {
            CursorAlignment::Right if location.offset > 0 => {
                let last = prev_char_start(line_text, location.offset);
                self.position = TextLocation::new(location.line, last);
                self.alignment = CursorAlignment::Right;
            }
            _ => {
                self.position = location;
                self.alignment = CursorAlignment::Left;
            }
        }
        self.interaction = location;
    }
}

/// Byte offset of the start of the `char` ending at `offset`.
fn prev_char_start(text: &str, offset: usize) -> usize {
    text[..offset]
        .chars()
        .next_back()
        .map_or(0, |c| offset - c.len_utf8())
}
