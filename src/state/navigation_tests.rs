//! Tests for the navigation state machine.

use super::*;
use crate::index::GroupIndex;
use chrono::{DateTime, Utc};

const PAGE: usize = 10;

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).expect("valid timestamp")
}

fn add(index: &mut GroupIndex, key: &str, message: &str, seconds: i64) {
    index.upsert(
        GroupKey::value(key),
        key.to_uppercase(),
        "Request".to_string(),
        LogLine::bare("info", at(seconds), message),
    );
}

/// Index with groups "a" (2 lines, newest) and "b" (3 lines), plus the reserved ones.
fn sample_index() -> GroupIndex {
    let mut index = GroupIndex::with_start_time(at(0));
    add(&mut index, "b", "b1", 10);
    add(&mut index, "b", "b2", 11);
    add(&mut index, "b", "b3", 12);
    add(&mut index, "a", "a1", 20);
    add(&mut index, "a", "a2", 21);
    index
}

fn messages(state: &NavigationState) -> Vec<String> {
    state.lines().iter().map(|l| l.message().to_string()).collect()
}

// ===== Initial state =====

#[test]
fn starts_on_groups_with_first_group_selected() {
    let state = NavigationState::new(sample_index().snapshot());

    assert_eq!(state.focus(), Focus::Groups);
    assert_eq!(state.selected_group_key(), Some(&GroupKey::value("a")));
    assert_eq!(messages(&state), vec!["a1", "a2"]);
    assert_eq!(state.line_cursor(), 0);
    assert!(state.detail_line().is_none());
}

#[test]
fn empty_snapshot_selects_nothing() {
    let mut state = NavigationState::new(Snapshot::default());
    assert_eq!(state.selected_group_key(), None);

    state.handle(KeyAction::Select, PAGE);
    assert_eq!(state.focus(), Focus::Groups, "nothing to select");
}

// ===== Focus transitions =====

#[test]
fn select_and_escape_walk_the_three_levels() {
    let mut state = NavigationState::new(sample_index().snapshot());

    state.handle(KeyAction::Select, PAGE);
    assert_eq!(state.focus(), Focus::Lines);

    state.handle(KeyAction::CursorDown, PAGE);
    state.handle(KeyAction::Select, PAGE);
    assert_eq!(state.focus(), Focus::LineDetail);
    assert_eq!(
        state.detail_line().map(|l| l.message().to_string()),
        Some("a2".to_string())
    );

    state.handle(KeyAction::Escape, PAGE);
    assert_eq!(state.focus(), Focus::Lines);
    assert!(state.detail_line().is_none(), "detail cleared outside LineDetail");

    state.handle(KeyAction::Escape, PAGE);
    assert_eq!(state.focus(), Focus::Groups);

    state.handle(KeyAction::Escape, PAGE);
    assert_eq!(state.focus(), Focus::Groups, "escape at top level is a no-op");
}

#[test]
fn select_on_empty_line_list_stays_in_lines() {
    let mut state = NavigationState::new(GroupIndex::with_start_time(at(0)).snapshot());

    state.handle(KeyAction::Select, PAGE);
    assert_eq!(state.focus(), Focus::Lines);
    state.handle(KeyAction::Select, PAGE);
    assert_eq!(state.focus(), Focus::Lines, "no line to open");
}

// ===== Cursor movement =====

#[test]
fn moving_group_cursor_recomputes_lines() {
    let mut state = NavigationState::new(sample_index().snapshot());

    state.handle(KeyAction::CursorDown, PAGE);
    assert_eq!(state.selected_group_key(), Some(&GroupKey::value("b")));
    assert_eq!(messages(&state), vec!["b1", "b2", "b3"]);
}

#[test]
fn cursor_clamps_at_both_ends() {
    let mut state = NavigationState::new(sample_index().snapshot());

    state.handle(KeyAction::CursorUp, PAGE);
    assert_eq!(state.group_cursor(), 0);

    state.handle(KeyAction::GoToEnd, PAGE);
    assert_eq!(state.group_cursor(), 3, "four groups in total");

    state.handle(KeyAction::NextPage, PAGE);
    assert_eq!(state.group_cursor(), 3);

    state.handle(KeyAction::GoToStart, PAGE);
    assert_eq!(state.group_cursor(), 0);
}

#[test]
fn page_moves_by_page_size() {
    let mut index = GroupIndex::with_start_time(at(0));
    for i in 0..30 {
        add(&mut index, "many", &format!("m{i}"), 100 + i);
    }
    let mut state = NavigationState::new(index.snapshot());
    state.handle(KeyAction::Select, 5);

    state.handle(KeyAction::NextPage, 5);
    assert_eq!(state.line_cursor(), 5);
    state.handle(KeyAction::NextPage, 5);
    state.handle(KeyAction::PrevPage, 5);
    assert_eq!(state.line_cursor(), 5);
}

#[test]
fn line_position_is_remembered_per_group() {
    let mut state = NavigationState::new(sample_index().snapshot());

    // Move to the second line of "a".
    state.handle(KeyAction::Select, PAGE);
    state.handle(KeyAction::CursorDown, PAGE);
    state.handle(KeyAction::Escape, PAGE);

    // Visit "b" and come back.
    state.handle(KeyAction::CursorDown, PAGE);
    assert_eq!(state.line_cursor(), 0, "b starts at its first line");
    state.handle(KeyAction::CursorUp, PAGE);

    assert_eq!(state.selected_group_key(), Some(&GroupKey::value("a")));
    assert_eq!(state.line_cursor(), 1, "a's line position restored");
}

#[test]
fn detail_cursor_scrolls_instead_of_moving_lines() {
    let mut state = NavigationState::new(sample_index().snapshot());
    state.handle(KeyAction::Select, PAGE);
    state.handle(KeyAction::Select, PAGE);

    state.handle(KeyAction::CursorDown, PAGE);
    state.handle(KeyAction::CursorDown, PAGE);
    assert_eq!(state.detail_scroll(), 2);
    assert_eq!(state.line_cursor(), 0);

    state.handle(KeyAction::GoToEnd, PAGE);
    state.clamp_detail_scroll(7);
    assert_eq!(state.detail_scroll(), 7);

    state.handle(KeyAction::GoToStart, PAGE);
    assert_eq!(state.detail_scroll(), 0);
}

// ===== Refresh =====

#[test]
fn refresh_keeps_selected_group_when_order_changes() {
    let mut index = sample_index();
    let mut state = NavigationState::new(index.snapshot());

    // Select "b" (second position).
    state.handle(KeyAction::CursorDown, PAGE);
    assert_eq!(state.group_cursor(), 1);

    // "b" receives a newer line and moves to the top.
    add(&mut index, "b", "b4", 30);
    state.apply_snapshot(index.snapshot());

    assert_eq!(state.selected_group_key(), Some(&GroupKey::value("b")));
    assert_eq!(state.group_cursor(), 0);
    assert_eq!(messages(&state), vec!["b1", "b2", "b3", "b4"]);
}

#[test]
fn refresh_in_lines_focus_keeps_line_cursor() {
    let mut index = sample_index();
    let mut state = NavigationState::new(index.snapshot());
    state.handle(KeyAction::Select, PAGE);
    state.handle(KeyAction::CursorDown, PAGE);

    add(&mut index, "c", "c1", 40);
    add(&mut index, "a", "a3", 35);
    state.apply_snapshot(index.snapshot());

    assert_eq!(state.focus(), Focus::Lines);
    assert_eq!(state.selected_group_key(), Some(&GroupKey::value("a")));
    assert_eq!(state.line_cursor(), 1);
    assert_eq!(messages(&state), vec!["a1", "a2", "a3"]);
}

#[test]
fn refresh_keeps_detail_line() {
    let mut index = sample_index();
    let mut state = NavigationState::new(index.snapshot());
    state.handle(KeyAction::Select, PAGE);
    state.handle(KeyAction::Select, PAGE);

    add(&mut index, "z", "z1", 50);
    state.apply_snapshot(index.snapshot());

    assert_eq!(state.focus(), Focus::LineDetail);
    assert_eq!(
        state.detail_line().map(|l| l.message().to_string()),
        Some("a1".to_string())
    );
    let group = state.selected_group().expect("group selected");
    assert_eq!(group.key(), &GroupKey::value("a"));
}

#[test]
fn first_snapshot_after_empty_selects_top_group() {
    let mut state = NavigationState::default();
    state.apply_snapshot(sample_index().snapshot());
    assert_eq!(state.selected_group_key(), Some(&GroupKey::value("a")));
}
