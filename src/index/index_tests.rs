//! Tests for the group index.

use super::*;

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).expect("valid timestamp")
}

fn line(message: &str, seconds: i64) -> LogLine {
    LogLine::bare("info", at(seconds), message)
}

fn upsert(index: &mut GroupIndex, key: &str, title: &str, message: &str, seconds: i64) {
    index.upsert(
        GroupKey::value(key),
        title.to_string(),
        "Request".to_string(),
        line(message, seconds),
    );
}

fn titles(snapshot: &Snapshot) -> Vec<&str> {
    snapshot.groups().iter().map(GroupSnapshot::title).collect()
}

#[test]
fn new_index_has_reserved_groups() {
    let index = GroupIndex::with_start_time(at(0));

    assert_eq!(index.len(), 2);
    let failures = index.get(&GroupKey::ParseFailures).expect("reserved group");
    assert_eq!(failures.title(), "Parse Failures");
    assert_eq!(failures.description(), "Errors");
    assert!(failures.is_empty());
    assert!(index.get(&GroupKey::PlainText).is_some());
}

#[test]
fn upsert_creates_then_appends() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "abc", "first", "one", 10);
    upsert(&mut index, "abc", "first", "two", 20);

    let group = index.get(&GroupKey::value("abc")).expect("group exists");
    assert_eq!(group.len(), 2);
    assert_eq!(group.timestamp(), at(20), "timestamp follows the last line");
}

#[test]
fn existing_group_keeps_first_title_and_description() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "abc", "first title", "one", 10);
    index.upsert(
        GroupKey::value("abc"),
        "second title".to_string(),
        "Other".to_string(),
        line("two", 20),
    );

    let group = index.get(&GroupKey::value("abc")).expect("group exists");
    assert_eq!(group.title(), "first title");
    assert_eq!(group.description(), "Request");
}

#[test]
fn group_timestamp_can_move_backwards() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "abc", "t", "late", 50);
    upsert(&mut index, "abc", "t", "early", 5);

    let group = index.get(&GroupKey::value("abc")).expect("group exists");
    assert_eq!(group.timestamp(), at(5), "line timestamp is authoritative");
}

#[test]
fn snapshot_orders_newest_first() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "a", "A", "x", 10);
    upsert(&mut index, "b", "B", "x", 30);
    upsert(&mut index, "c", "C", "x", 20);

    let snapshot = index.snapshot();
    assert_eq!(
        titles(&snapshot),
        vec!["B", "C", "A", "Text", "Parse Failures"],
        "reserved groups tie at start time, broken by title descending"
    );
}

#[test]
fn timestamp_ties_break_by_title_descending() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "1", "alpha", "x", 10);
    upsert(&mut index, "2", "gamma", "x", 10);
    upsert(&mut index, "3", "beta", "x", 10);

    let snapshot = index.snapshot();
    assert_eq!(&titles(&snapshot)[..3], &["gamma", "beta", "alpha"]);
}

#[test]
fn repeated_snapshots_are_identical() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "1", "same", "x", 10);
    upsert(&mut index, "2", "same", "x", 10);

    let first: Vec<GroupKey> = index.snapshot().groups().iter().map(|g| g.key().clone()).collect();
    let second: Vec<GroupKey> = index.snapshot().groups().iter().map(|g| g.key().clone()).collect();
    assert_eq!(first, second);
}

#[test]
fn snapshot_is_frozen_against_later_appends() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "abc", "t", "one", 10);
    let snapshot = index.snapshot();
    upsert(&mut index, "abc", "t", "two", 20);

    let position = snapshot.position(&GroupKey::value("abc")).expect("in snapshot");
    let group = snapshot.get(position).expect("group");
    assert_eq!(group.len(), 1);
    assert_eq!(group.lines().len(), 1);
    assert!(group.line(1).is_none(), "line appended after snapshot is hidden");
    assert_eq!(group.line(0).expect("first line").message(), "one");

    let fresh = index.snapshot();
    let position = fresh.position(&GroupKey::value("abc")).expect("in snapshot");
    assert_eq!(fresh.groups()[position].len(), 2);
}

#[test]
fn lines_keep_arrival_order() {
    let mut index = GroupIndex::with_start_time(at(0));
    upsert(&mut index, "abc", "t", "one", 30);
    upsert(&mut index, "abc", "t", "two", 10);
    upsert(&mut index, "abc", "t", "three", 20);

    let snapshot = index.snapshot();
    let group = &snapshot.groups()[0];
    let messages: Vec<String> = group.lines().iter().map(|l| l.message().to_string()).collect();
    assert_eq!(messages, vec!["one", "two", "three"]);
}
