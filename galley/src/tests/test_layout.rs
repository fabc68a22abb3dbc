// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Point;

use super::utils::{MonoMeasurer, TestStyle, CHAR_W, LINE_H};
use crate::{
    HighlightKind, HitPoint, Justification, LineHighlight, LineModel, Marshaller,
    PlainTextMarshaller, TextLayout, TextLocation, TextRange,
};

fn layout_with(lines: &[&str]) -> TextLayout<TestStyle> {
    let mut layout = TextLayout::new();
    layout.add_lines(
        lines
            .iter()
            .map(|text| LineModel::from_text((*text).into(), 0)),
    );
    layout
}

fn run_ranges(layout: &TextLayout<TestStyle>, line: usize) -> Vec<(TestStyle, TextRange)> {
    layout.lines()[line]
        .runs()
        .iter()
        .map(|run| (*run.style(), run.range()))
        .collect()
}

#[test]
fn plain_text_round_trip() {
    let mut marshaller = PlainTextMarshaller::new(0_u8);
    let mut layout = TextLayout::new();
    for text in ["", "a", "a\nb", "a\nb\n", "\n\n"] {
        marshaller.set_text(text, &mut layout);
        assert!(layout.line_count() >= 1, "marshaller must seed a line");
        let mut out = String::new();
        marshaller.get_text(&mut out, &layout);
        assert_eq!(out, text);
    }
}

#[test]
fn empty_text_keeps_one_empty_line() {
    let mut marshaller = PlainTextMarshaller::new(0_u8);
    let mut layout = TextLayout::new();
    marshaller.set_text("", &mut layout);
    assert_eq!(layout.line_count(), 1);
    assert!(layout.is_empty());
}

#[test]
fn insert_text_extends_the_surrounding_run() {
    let mut layout = layout_with(&["abc"]);
    assert!(layout.insert_text_at(TextLocation::new(0, 1), "XY"));
    assert_eq!(layout.lines()[0].text(), "aXYbc");
    assert_eq!(run_ranges(&layout, 0), vec![(0, TextRange::new(0, 5))]);
}

#[test]
fn insert_text_on_missing_line_is_rejected() {
    let mut layout = layout_with(&["abc"]);
    assert!(!layout.insert_text_at(TextLocation::new(3, 0), "x"));
}

#[test]
fn insert_run_splits_the_run_under_it() {
    let mut layout = layout_with(&["abcd"]);
    assert!(layout.insert_run_at(TextLocation::new(0, 2), 1, "ZZ", true));
    assert_eq!(layout.lines()[0].text(), "abZZcd");
    assert_eq!(
        run_ranges(&layout, 0),
        vec![
            (0, TextRange::new(0, 2)),
            (1, TextRange::new(2, 4)),
            (0, TextRange::new(4, 6)),
        ]
    );
}

#[test]
fn typing_after_a_preserved_empty_run_keeps_its_style() {
    let mut layout = layout_with(&["ab"]);
    assert!(layout.insert_run_at(TextLocation::new(0, 2), 1, "XY", true));
    assert_eq!(
        run_ranges(&layout, 0),
        vec![
            (0, TextRange::new(0, 2)),
            (1, TextRange::new(2, 4)),
            (0, TextRange::new(4, 4)),
        ]
    );

    // The preserved run absorbs subsequent typing, so the inserted run's
    // style does not bleed onto it.
    assert!(layout.insert_text_at(TextLocation::new(0, 4), "z"));
    assert_eq!(layout.lines()[0].text(), "abXYz");
    assert_eq!(
        run_ranges(&layout, 0),
        vec![
            (0, TextRange::new(0, 2)),
            (1, TextRange::new(2, 4)),
            (0, TextRange::new(4, 5)),
        ]
    );
}

#[test]
fn remove_across_runs_drops_consumed_runs() {
    let mut layout = layout_with(&["abcd"]);
    layout.insert_run_at(TextLocation::new(0, 2), 1, "ZZ", true);
    assert!(layout.remove_at(TextLocation::new(0, 1), 4));
    assert_eq!(layout.lines()[0].text(), "ad");
    assert_eq!(
        run_ranges(&layout, 0),
        vec![(0, TextRange::new(0, 1)), (0, TextRange::new(1, 2))]
    );
}

#[test]
fn remove_at_line_end_is_a_no_op() {
    let mut layout = layout_with(&["ab"]);
    assert!(!layout.remove_at(TextLocation::new(0, 2), 1));
    assert_eq!(layout.lines()[0].text(), "ab");
}

#[test]
fn remove_everything_reseeds_an_empty_run() {
    let mut layout = layout_with(&["abc"]);
    assert!(layout.remove_at(TextLocation::new(0, 0), 3));
    assert_eq!(layout.lines()[0].text(), "");
    assert_eq!(run_ranges(&layout, 0), vec![(0, TextRange::new(0, 0))]);
}

#[test]
fn split_and_join_are_inverse() {
    let mut layout = layout_with(&["hello world"]);
    assert!(layout.split_line_at(TextLocation::new(0, 5)));
    assert_eq!(layout.line_count(), 2);
    assert_eq!(layout.lines()[0].text(), "hello");
    assert_eq!(layout.lines()[1].text(), " world");

    assert!(layout.join_line_with_next_line(0));
    assert_eq!(layout.line_count(), 1);
    assert_eq!(layout.lines()[0].text(), "hello world");
    assert_eq!(
        run_ranges(&layout, 0),
        vec![(0, TextRange::new(0, 5)), (0, TextRange::new(5, 11))]
    );
}

#[test]
fn join_with_empty_next_line_just_removes_it() {
    let mut layout = layout_with(&["a", ""]);
    assert!(layout.join_line_with_next_line(0));
    assert_eq!(layout.line_count(), 1);
    assert_eq!(layout.lines()[0].text(), "a");
}

#[test]
fn join_without_next_line_is_rejected() {
    let mut layout = layout_with(&["a"]);
    assert!(!layout.join_line_with_next_line(0));
}

#[test]
fn offset_locations_flatten_with_single_byte_separators() {
    let layout = layout_with(&["ab", "cd"]);
    let offsets = layout.offset_locations();
    assert_eq!(offsets.text_len(), 5);
    assert_eq!(offsets.offset_of(TextLocation::new(0, 0)), 0);
    assert_eq!(offsets.offset_of(TextLocation::new(1, 1)), 4);
    // The separator byte maps back to the end of the line it terminates.
    assert_eq!(offsets.location_of(2), TextLocation::new(0, 2));
    assert_eq!(offsets.location_of(3), TextLocation::new(1, 0));
    assert_eq!(offsets.location_of(99), TextLocation::new(1, 2));
}

#[test]
fn word_at_finds_words_and_walks_back_over_whitespace() {
    let layout = layout_with(&["hello world"]);
    assert_eq!(
        layout.word_at(TextLocation::new(0, 7)),
        Some(TextRange::new(6, 11))
    );
    // Over the space, the preceding word wins.
    assert_eq!(
        layout.word_at(TextLocation::new(0, 5)),
        Some(TextRange::new(0, 5))
    );
    let spaces = layout_with(&["   "]);
    assert_eq!(spaces.word_at(TextLocation::new(0, 1)), None);
}

#[test]
fn hit_tests_classify_gutters() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["hello"]);
    layout.update_if_needed(&measurer);

    let (location, hit) = layout.text_location_at(Point::new(22.0, 5.0), &measurer);
    assert_eq!((location, hit), (TextLocation::new(0, 2), HitPoint::WithinText));

    let (location, hit) = layout.text_location_at(Point::new(-5.0, 5.0), &measurer);
    assert_eq!((location, hit), (TextLocation::new(0, 0), HitPoint::LeftGutter));

    let (location, hit) = layout.text_location_at(Point::new(100.0, 5.0), &measurer);
    assert_eq!((location, hit), (TextLocation::new(0, 5), HitPoint::RightGutter));
}

#[test]
fn hits_outside_the_vertical_range_clamp_to_edge_views() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aa", "bb"]);
    layout.update_if_needed(&measurer);

    let (location, _) = layout.text_location_at(Point::new(5.0, -20.0), &measurer);
    assert_eq!(location.line, 0);
    let (location, _) = layout.text_location_at(Point::new(5.0, 200.0), &measurer);
    assert_eq!(location.line, 1);
}

#[test]
fn empty_lines_still_occupy_height() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["a", "", "b"]);
    layout.update_if_needed(&measurer);

    let views = layout.views();
    assert_eq!(views.len(), 3);
    assert_eq!(views[1].size.height, LINE_H);
    assert_eq!(views[1].blocks[0].size.width, 0.0);
    assert_eq!(views[2].offset.y, 2.0 * LINE_H);
}

#[test]
fn line_height_percentage_scales_view_spacing() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["a", "b"]);
    layout.set_line_height_percentage(2.0);
    layout.update_if_needed(&measurer);

    let views = layout.views();
    assert_eq!(views[0].size.height, 2.0 * LINE_H);
    assert_eq!(views[0].text_height, LINE_H);
    assert_eq!(views[1].offset.y, 2.0 * LINE_H);
}

#[test]
fn center_justification_splits_the_slack() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["ab"]);
    layout.set_wrapping_width(Some(60.0));
    layout.set_justification(Justification::Center);
    layout.update_if_needed(&measurer);

    assert_eq!(layout.views()[0].offset.x, 20.0);
}

#[test]
fn right_justification_aligns_to_the_wrap_width() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["ab"]);
    layout.set_wrapping_width(Some(60.0));
    layout.set_justification(Justification::Right);
    layout.update_if_needed(&measurer);

    assert_eq!(layout.views()[0].offset.x, 40.0);
}

#[test]
fn highlights_project_to_measured_extents() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["hello"]);
    layout.add_highlight(
        0,
        LineHighlight {
            kind: HighlightKind::Selection,
            range: TextRange::new(1, 3),
        },
    );
    layout.update_if_needed(&measurer);

    let view = &layout.views()[0];
    assert_eq!(view.underlays.len(), 1);
    assert_eq!(view.underlays[0].offset_x, CHAR_W);
    assert_eq!(view.underlays[0].width, 2.0 * CHAR_W);
    assert!(view.overlays.is_empty());
}

#[test]
fn update_is_lazy_and_measurements_are_cached() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["hello", "world"]);
    layout.update_if_needed(&measurer);
    let after_first = measurer.measure_calls.get();
    assert!(after_first > 0);

    // Nothing changed, nothing re-measured.
    layout.update_if_needed(&measurer);
    assert_eq!(measurer.measure_calls.get(), after_first);

    // A mutation invalidates only what it touched.
    layout.insert_text_at(TextLocation::new(0, 0), "x");
    layout.update_if_needed(&measurer);
    assert!(measurer.measure_calls.get() > after_first);
    let after_edit = measurer.measure_calls.get();
    layout.update_if_needed(&measurer);
    assert_eq!(measurer.measure_calls.get(), after_edit);
}

#[test]
fn highlight_changes_do_not_reflow() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["hello"]);
    layout.update_if_needed(&measurer);
    let baseline = measurer.measure_calls.get();

    layout.add_highlight(
        0,
        LineHighlight {
            kind: HighlightKind::Cursor,
            range: TextRange::new(0, 5),
        },
    );
    assert!(layout.needs_flow());
    layout.update_if_needed(&measurer);
    // A full-line highlight projects onto block edges without remeasuring.
    assert_eq!(measurer.measure_calls.get(), baseline);
    assert_eq!(layout.views()[0].overlays.len(), 1);
}
