//! Merging per-source windows into one ordered feed

use std::cmp::Ordering;

use crate::data::types::{ActivityEvent, ActivitySortField, SortOrder};

/// Total order of the feed: sort field, then event id, both in `order`.
///
/// Matches the ORDER BY each source query uses, including NULL user names
/// sorting first in ascending order.
pub fn compare_events(
    a: &ActivityEvent,
    b: &ActivityEvent,
    sort: ActivitySortField,
    order: SortOrder,
) -> Ordering {
    let primary = match sort {
        ActivitySortField::CreatedAt => a.created_at.cmp(&b.created_at),
        ActivitySortField::Action => a.action.cmp(&b.action),
        ActivitySortField::UserName => a.actor.name.cmp(&b.actor.name),
    };
    let ordering = primary.then_with(|| a.id.cmp(&b.id));
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Sort merged source windows and cut out one page.
///
/// Each window holds the first `offset + limit` events of its source, so the
/// page is exact.
pub fn merge_page(
    windows: Vec<Vec<ActivityEvent>>,
    sort: ActivitySortField,
    order: SortOrder,
    offset: u64,
    limit: u32,
) -> Vec<ActivityEvent> {
    let mut events: Vec<ActivityEvent> = windows.into_iter().flatten().collect();
    events.sort_by(|a, b| compare_events(a, b, sort, order));
    events
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(limit as usize)
        .collect()
}
