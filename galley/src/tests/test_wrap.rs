// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Insets;

use super::utils::{MonoMeasurer, TestStyle, LINE_H};
use crate::{Justification, LineModel, TextLayout, TextRange};

fn layout_with(lines: &[&str]) -> TextLayout<TestStyle> {
    let mut layout = TextLayout::new();
    layout.add_lines(
        lines
            .iter()
            .map(|text| LineModel::from_text((*text).into(), 0)),
    );
    layout
}

fn view_ranges(layout: &TextLayout<TestStyle>) -> Vec<TextRange> {
    layout.views().iter().map(|view| view.range).collect()
}

#[test]
fn wraps_greedily_at_break_opportunities() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaa bbb ccc"]);
    layout.set_wrapping_width(Some(40.0));
    layout.update_if_needed(&measurer);

    assert_eq!(
        view_ranges(&layout),
        vec![
            TextRange::new(0, 4),
            TextRange::new(4, 8),
            TextRange::new(8, 11),
        ]
    );
    assert_eq!(layout.views()[1].offset.y, LINE_H);
    assert_eq!(layout.views()[2].offset.y, 2.0 * LINE_H);
}

#[test]
fn trailing_whitespace_may_hang_past_the_wrap_width() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaaa bb"]);
    layout.set_wrapping_width(Some(40.0));
    layout.update_if_needed(&measurer);

    // "aaaa " is 50 wide but only 40 without its trailing space, so the
    // space hangs rather than forcing "aaaa" onto a line of its own.
    assert_eq!(
        view_ranges(&layout),
        vec![TextRange::new(0, 5), TextRange::new(5, 7)]
    );
}

#[test]
fn an_unbreakable_overlong_segment_gets_its_own_view() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaaaaaa"]);
    layout.set_wrapping_width(Some(40.0));
    layout.update_if_needed(&measurer);

    assert_eq!(view_ranges(&layout), vec![TextRange::new(0, 7)]);
    assert_eq!(layout.views()[0].text_width(), 70.0);
}

#[test]
fn no_wrapping_width_means_one_view_per_line() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaa bbb ccc", "x"]);
    layout.update_if_needed(&measurer);

    assert_eq!(
        view_ranges(&layout),
        vec![TextRange::new(0, 11), TextRange::new(0, 1)]
    );
}

#[test]
fn changing_the_wrapping_width_reflows() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaa bbb ccc"]);
    layout.set_wrapping_width(Some(40.0));
    layout.update_if_needed(&measurer);
    assert_eq!(layout.views().len(), 3);

    layout.set_wrapping_width(None);
    layout.update_if_needed(&measurer);
    assert_eq!(layout.views().len(), 1);
}

#[test]
fn views_of_later_lines_stack_below_wrapped_views() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaa bbb ccc", "x"]);
    layout.set_wrapping_width(Some(40.0));
    layout.update_if_needed(&measurer);

    let views = layout.views();
    assert_eq!(views.len(), 4);
    assert_eq!(views[3].line_index, 1);
    assert_eq!(views[3].offset.y, 3.0 * LINE_H);
}

#[test]
fn margins_shrink_the_wrap_width_and_offset_the_views() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaa bbb"]);
    layout.set_margin(Insets::uniform(5.0));
    layout.set_wrapping_width(Some(40.0));
    layout.update_if_needed(&measurer);

    // 40 minus 5 on each side leaves 30: "aaa " hangs, "bbb" wraps.
    assert_eq!(
        view_ranges(&layout),
        vec![TextRange::new(0, 4), TextRange::new(4, 7)]
    );
    let views = layout.views();
    assert_eq!(views[0].offset, peniko::kurbo::Point::new(5.0, 5.0));
    assert_eq!(layout.size().height, 2.0 * LINE_H + 10.0);
}

#[test]
fn justified_views_stretch_to_the_wrap_width() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aa bb cc dd"]);
    layout.set_wrapping_width(Some(70.0));
    layout.set_justification(Justification::Justified);
    layout.update_if_needed(&measurer);

    let views = layout.views();
    assert_eq!(
        view_ranges(&layout),
        vec![TextRange::new(0, 6), TextRange::new(6, 11)]
    );

    // The wrapped view is 60 wide against a 70 target; the 10 of slack
    // goes into the single gap between its two blocks.
    assert_eq!(views[0].blocks.len(), 2);
    assert_eq!(views[0].blocks[0].offset.x, 0.0);
    assert_eq!(views[0].blocks[1].offset.x, 40.0);

    // The final view of the hard line stays left-aligned.
    assert_eq!(views[1].blocks[0].offset.x, 0.0);
    assert_eq!(views[1].blocks[1].offset.x, 30.0);
}

#[test]
fn wrapped_view_heights_scale_with_line_height_percentage() {
    let measurer = MonoMeasurer::default();
    let mut layout = layout_with(&["aaa bbb"]);
    layout.set_wrapping_width(Some(40.0));
    layout.set_line_height_percentage(1.5);
    layout.update_if_needed(&measurer);

    let views = layout.views();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].size.height, 1.5 * LINE_H);
    assert_eq!(views[1].offset.y, 1.5 * LINE_H);
}
