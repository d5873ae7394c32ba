//! Merging of the global resource/notification stream with the
//! counsellor-owned one.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::feed::FeedItem;

/// Combines two streams into one view.
///
/// With a category filter, items from `stream_a` must match the category while
/// items from `stream_b` are always kept. Duplicates by (title, url, source)
/// keep their first occurrence. The result is ordered newest first; items
/// without a timestamp go last and ties keep their input order.
pub fn merge_streams(
    stream_a: &[FeedItem],
    stream_b: &[FeedItem],
    filter_category: Option<&str>,
) -> Vec<FeedItem> {
    let from_a = stream_a.iter().filter(|item| match filter_category {
        Some(category) => item.category.as_deref() == Some(category),
        None => true,
    });

    let mut seen = HashSet::new();
    let mut merged: Vec<FeedItem> = from_a
        .chain(stream_b.iter())
        .filter(|item| seen.insert((item.title.as_str(), item.url.as_str(), item.source.as_str())))
        .cloned()
        .collect();

    merged.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    merged
}
