//! Tests for thread::inbox

use chrono::{DateTime, TimeZone, Utc};
use murmur_core::thread::InboxView;
use murmur_core::{InboxEntry, Message};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_770_000_000 + secs, 0).unwrap()
}

fn entry(chat_id: &str, peer_id: &str, last: Option<i64>, unread: u32) -> InboxEntry {
    InboxEntry {
        chat_id: chat_id.into(),
        peer_id: peer_id.into(),
        last_message_at: last.map(at),
        last_message_id: last.map(|s| format!("m{}", s)),
        last_body: last.map(|_| "preview".to_string()),
        unread_count: unread,
    }
}

fn chat_ids(view: &InboxView) -> Vec<&str> {
    view.entries().iter().map(|e| e.chat_id.as_str()).collect()
}

#[test]
fn test_identical_timestamps_ordered_by_chat_id() {
    let mut view = InboxView::new();
    view.replace(vec![entry("chat-b", "u2", Some(100), 0), entry("chat-a", "u1", Some(100), 0)]);
    assert_eq!(chat_ids(&view), vec!["chat-a", "chat-b"]);

    // Server order flips; local order does not.
    view.replace(vec![entry("chat-a", "u1", Some(100), 0), entry("chat-b", "u2", Some(100), 0)]);
    assert_eq!(chat_ids(&view), vec!["chat-a", "chat-b"]);
}

#[test]
fn test_recent_first_and_inactive_last() {
    let mut view = InboxView::new();
    view.replace(vec![
        entry("quiet", "u4", None, 0),
        entry("old", "u1", Some(10), 0),
        entry("new", "u2", Some(90), 0),
        entry("also-quiet", "u5", None, 0),
    ]);
    assert_eq!(chat_ids(&view), vec!["new", "old", "also-quiet", "quiet"]);
}

#[test]
fn test_replace_is_wholesale() {
    let mut view = InboxView::new();
    view.replace(vec![entry("a", "u1", Some(1), 3)]);
    view.replace(vec![entry("b", "u2", Some(2), 1)]);

    assert_eq!(view.len(), 1);
    assert!(view.find_by_chat("a").is_none());
    assert_eq!(view.find_by_peer("u2").unwrap().chat_id, "b");
}

#[test]
fn test_total_unread() {
    let mut view = InboxView::new();
    view.replace(vec![entry("a", "u1", Some(1), 3), entry("b", "u2", Some(2), 4)]);
    assert_eq!(view.total_unread(), 7);

    view.mark_read("a");
    assert_eq!(view.total_unread(), 4);
}

#[test]
fn test_live_message_moves_chat_to_top() {
    let mut view = InboxView::new();
    view.replace(vec![entry("a", "u1", Some(50), 0), entry("b", "u2", Some(10), 0)]);

    let message = Message {
        id: "m99".into(),
        chat_id: "b".into(),
        sender_id: "u2".into(),
        body: "ping".into(),
        created_at: at(99),
    };
    assert!(view.apply_message(&message));
    assert_eq!(chat_ids(&view), vec!["b", "a"]);

    let top = &view.entries()[0];
    assert_eq!(top.last_body.as_deref(), Some("ping"));
    assert_eq!(top.unread_count, 1);

    // Same message again changes nothing.
    assert!(view.apply_message(&message));
    assert_eq!(view.entries()[0].unread_count, 1);
}

#[test]
fn test_live_message_for_unknown_chat() {
    let mut view = InboxView::new();
    let message = Message {
        id: "m1".into(),
        chat_id: "new-chat".into(),
        sender_id: "u9".into(),
        body: "hi".into(),
        created_at: at(1),
    };
    assert!(!view.apply_message(&message));
    assert!(view.is_empty());
}
