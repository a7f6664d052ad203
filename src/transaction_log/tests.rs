use std::{cell::RefCell, rc::Rc};

use super::*;

fn log_with(values: &[&'static str]) -> TransactionLog<&'static str> {
    let mut log = TransactionLog::new();
    for v in values {
        log.commit(*v);
    }
    log
}

fn record_events(log: &mut TransactionLog<&'static str>) -> Rc<RefCell<Vec<LogEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    log.on(move |e: &LogEvent| sink.borrow_mut().push(*e));
    events
}

#[test]
fn rollback_and_advance() {
    let mut log = log_with(&["a", "b", "c", "d", "e"]);
    assert_eq!(Some(&"e"), log.current_value());
    assert_eq!(Some(4), log.cursor_index());

    log.rollback(1);
    assert_eq!(Some(&"d"), log.current_value());
    log.rollback(2);
    assert_eq!(Some(&"b"), log.current_value());
    log.advance(1);
    assert_eq!(Some(&"c"), log.current_value());
    assert_eq!(Some(2), log.cursor_index());

    // Rolling back and advancing does not remove entries
    assert_eq!(vec!["a", "b", "c", "d", "e"], log.log());
}

#[test]
fn cursor_is_clamped() {
    let mut log = log_with(&["a", "b", "c"]);
    let current = log.get_commit(None).map(|c| c.id);
    assert_eq!(current, log.cursor());

    log.advance(10);
    assert_eq!(Some(&"c"), log.current_value());
    log.rollback(100);
    assert_eq!(Some(&"a"), log.current_value());
    assert_eq!(Some(0), log.cursor_index());
    log.advance(usize::MAX);
    assert_eq!(Some(&"c"), log.current_value());
}

#[test]
fn commit_after_rollback_discards_redo_history() {
    let mut log = log_with(&["A", "B", "C", "D", "E"]);
    log.rollback(2);
    assert_eq!(Some(&"C"), log.current_value());

    let f = log.commit("F");
    assert_eq!(vec!["A", "B", "C", "F"], log.log());
    assert_eq!(Some(f), log.cursor());
    assert_eq!(Some(3), log.cursor_index());

    // There is nothing to redo anymore
    log.advance(1);
    assert_eq!(Some(&"F"), log.current_value());
}

#[test]
fn bounded_log_keeps_most_recent() {
    let mut log = TransactionLog::with_config(TransactionLogConfig::default().max_entries(3))
        .unwrap();
    assert_eq!(Some(3), log.max_entries());
    let ids: Vec<EntryId> = (1..=5).map(|i| log.commit(i)).collect();

    assert_eq!(vec![3, 4, 5], log.log());
    assert_eq!(3, log.len());
    assert_eq!(Some(2), log.cursor_index());

    log.rollback(10);
    assert_eq!(Some(&3), log.current_value());
    assert_eq!(Some(ids[2]), log.cursor());

    // Evicted entries can not be retrieved anymore
    assert!(log.get_commit(Some(ids[0])).is_none());
    assert!(log.commit_index(ids[1]).is_none());
    assert_eq!(Some(0), log.commit_index(ids[2]));
    assert_eq!(Some(2), log.get_commit(Some(ids[4])).map(|c| c.position));
}

#[test]
fn invalid_capacity() {
    assert_eq!(
        Some(Error::InvalidCapacity(0)),
        TransactionLog::<u8>::with_config(TransactionLogConfig::default().max_entries(0)).err()
    );
}

#[test]
fn get_commit_by_id() {
    let mut log = TransactionLog::new();
    let a = log.commit("a".to_string());
    let b = log.commit("b".to_string());
    assert_ne!(a, b);

    let commit = log.get_commit(Some(a)).unwrap();
    assert_eq!(a, commit.id);
    assert_eq!("a", commit.value.as_str());
    assert_eq!(0, commit.position);

    let current = log.get_commit(None).unwrap();
    assert_eq!(b, current.id);
    assert_eq!(1, current.position);
}

#[test]
fn empty_log() {
    let mut log: TransactionLog<u32> = TransactionLog::new();
    assert!(log.is_empty());
    assert!(log.get_commit(None).is_none());
    assert_eq!(None, log.current_value());
    assert_eq!(None, log.cursor());
    assert_eq!(None, log.cursor_index());
    assert_eq!(None, log.advance(1));
    assert_eq!(None, log.rollback(1));
    log.flush();
    assert!(log.log().is_empty());
}

#[test]
fn flush_removes_redo_entries() {
    let mut log = log_with(&["a", "b", "c", "d"]);
    log.rollback(2);
    log.flush();
    assert_eq!(vec!["a", "b"], log.log());
    assert_eq!(Some(&"b"), log.current_value());
    assert_eq!(Some(1), log.cursor_index());

    // Flushing at the tail changes nothing
    log.flush();
    assert_eq!(2, log.len());
}

#[test]
fn reset_log() {
    let mut log = log_with(&["a", "b"]);
    let last = log.cursor().unwrap();
    log.reset();
    assert!(log.is_empty());
    assert_eq!(None, log.cursor());

    // IDs are not reused after a reset
    let next = log.commit("c");
    assert_ne!(last, next);
    assert!(next > last);
    assert_eq!(Some(0), log.cursor_index());
}

#[test]
fn emitted_events() {
    let mut log = TransactionLog::new();
    let events = record_events(&mut log);

    let a = log.commit("a");
    let b = log.commit("b");
    log.rollback(1);
    // Cursor is already at the oldest entry
    log.rollback(1);
    log.advance(0);
    log.advance(3);
    log.reset();

    assert_eq!(
        vec![
            LogEvent::Commit(a),
            LogEvent::Commit(b),
            LogEvent::Rollback(a),
            LogEvent::Advance(b),
            LogEvent::Reset,
            LogEvent::Done,
        ],
        *events.borrow()
    );
}

#[test]
fn snapshot_is_independent() {
    let mut log = log_with(&["a"]);
    let mut snapshot = log.log();
    snapshot.push("b");
    assert_eq!(vec!["a"], log.log());
    log.commit("c");
    assert_eq!(vec!["a", "b"], snapshot);
}
