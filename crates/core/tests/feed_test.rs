use chrono::{Duration, Utc};
use counselsync_core::{feed::merge_streams, models::feed::FeedItem};
use pretty_assertions::assert_eq;

#[test]
fn test_same_title_and_url_from_different_sources_are_kept() {
    let global = vec![FeedItem::new("A", "u1", "global")];
    let owned = vec![FeedItem::new("A", "u1", "counsellor")];

    let merged = merge_streams(&global, &owned, None);
    assert_eq!(merged.len(), 2);
}

#[test]
fn test_identical_items_collapse_to_first() {
    let now = Utc::now();
    let first = FeedItem::new("A", "u1", "global").with_created_at(now);
    let mut second = first.clone();
    second.body = Some("later copy".to_string());

    let merged = merge_streams(&[first.clone()], &[second], None);
    assert_eq!(merged, vec![first]);
}

#[test]
fn test_category_filter_keeps_owned_items() {
    let global = vec![
        FeedItem::new("Sleep", "u1", "global").with_category("sleep"),
        FeedItem::new("Stress", "u2", "global").with_category("stress"),
        FeedItem::new("Untagged", "u3", "global"),
    ];
    let owned = vec![FeedItem::new("My worksheet", "u4", "counsellor").with_category("other")];

    let merged = merge_streams(&global, &owned, Some("sleep"));
    let titles: Vec<_> = merged.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["Sleep", "My worksheet"]);
}

#[test]
fn test_sorted_newest_first_with_undated_last() {
    let now = Utc::now();
    let global = vec![
        FeedItem::new("undated-1", "u0", "global"),
        FeedItem::new("old", "u1", "global").with_created_at(now - Duration::days(2)),
        FeedItem::new("new", "u2", "global").with_created_at(now),
    ];
    let owned = vec![
        FeedItem::new("undated-2", "u3", "counsellor"),
        FeedItem::new("middle", "u4", "counsellor").with_created_at(now - Duration::days(1)),
    ];

    let merged = merge_streams(&global, &owned, None);
    let titles: Vec<_> = merged.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "middle", "old", "undated-1", "undated-2"]);
}

#[test]
fn test_merge_is_repeatable() {
    let now = Utc::now();
    let global = vec![
        FeedItem::new("a", "u1", "global").with_created_at(now),
        FeedItem::new("b", "u2", "global"),
    ];
    let owned = vec![FeedItem::new("c", "u3", "counsellor").with_created_at(now)];

    assert_eq!(
        merge_streams(&global, &owned, None),
        merge_streams(&global, &owned, None)
    );
}
