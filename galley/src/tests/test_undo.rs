// Copyright 2025 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::{editor_with, select, MonoMeasurer};
use crate::TextLocation;

#[test]
fn undo_and_redo_walk_the_edit_history() {
    let measurer = MonoMeasurer::default();
    let mut editor = editor_with("");
    let mut drv = editor.driver(&measurer);
    for (i, ch) in ['a', 'b', 'c'].into_iter().enumerate() {
        drv.type_char(ch, i as f64);
    }
    assert_eq!(editor.text(), "abc");

    assert!(editor.undo());
    assert_eq!(editor.text(), "ab");
    assert!(editor.undo());
    assert_eq!(editor.text(), "a");
    assert!(editor.undo());
    assert_eq!(editor.text(), "");
    assert!(!editor.undo());

    assert!(editor.redo());
    assert_eq!(editor.text(), "a");
    assert!(editor.redo());
    assert_eq!(editor.text(), "ab");
    assert!(editor.redo());
    assert_eq!(editor.text(), "abc");
    assert!(!editor.redo());
}

#[test]
fn undo_restores_the_cursor_and_selection() {
    let measurer = MonoMeasurer::default();
    let mut editor = editor_with("hello");
    select(&mut editor, TextLocation::new(0, 1), TextLocation::new(0, 4));
    editor.driver(&measurer).type_char('x', 0.0);
    assert_eq!(editor.text(), "hxo");

    assert!(editor.undo());
    assert_eq!(editor.text(), "hello");
    assert_eq!(
        editor.cursor().interaction_location(),
        TextLocation::new(0, 4)
    );
    assert_eq!(editor.selected_text(), "ell");
}

#[test]
fn editing_after_an_undo_discards_the_redo_branch() {
    let measurer = MonoMeasurer::default();
    let mut editor = editor_with("");
    editor.driver(&measurer).type_char('a', 0.0);
    editor.driver(&measurer).type_char('b', 1.0);

    assert!(editor.undo());
    assert_eq!(editor.text(), "a");

    editor.driver(&measurer).type_char('c', 2.0);
    assert_eq!(editor.text(), "ac");
    assert!(!editor.redo());

    assert!(editor.undo());
    assert_eq!(editor.text(), "a");
    assert!(editor.undo());
    assert_eq!(editor.text(), "");
}

#[test]
fn the_history_is_bounded() {
    let measurer = MonoMeasurer::default();
    let mut editor = editor_with("");
    for i in 0..55 {
        editor.driver(&measurer).type_char('a', i as f64);
    }
    assert_eq!(editor.undo.len(), 50);

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    // The five oldest states were dropped.
    assert_eq!(editor.text(), "aaaaa");
}

#[test]
fn set_text_is_not_an_undoable_edit() {
    let mut editor = editor_with("");
    assert!(editor.set_text("hi"));
    assert!(!editor.undo());
}

#[test]
fn clearing_the_history() {
    let measurer = MonoMeasurer::default();
    let mut editor = editor_with("");
    editor.driver(&measurer).type_char('a', 0.0);
    editor.clear_undo_states();
    assert!(!editor.undo());
    assert_eq!(editor.text(), "a");
}

#[test]
fn a_transaction_without_changes_pushes_nothing() {
    let mut editor = editor_with("ab");
    editor.start_changing_text();
    editor.finish_changing_text();
    assert_eq!(editor.undo.len(), 0);
}

#[test]
fn undo_is_blocked_while_a_transaction_is_open() {
    let measurer = MonoMeasurer::default();
    let mut editor = editor_with("");
    editor.driver(&measurer).type_char('a', 0.0);

    editor.start_changing_text();
    assert!(!editor.undo());
    assert!(!editor.redo());
    editor.finish_changing_text();
    assert!(editor.undo());
    assert_eq!(editor.text(), "");
}
