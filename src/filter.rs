/// Filter predicate evaluation: which channels, and therefore which videos,
/// stay visible under the active category filters
use crate::channel_id::normalize_channel_id;
use crate::model::Channel;
use std::collections::HashSet;

/// Compute the set of channel ids allowed by the active filters
///
/// Returns `None` when no filter is active, which callers must treat as
/// "show everything". An empty set is a real (and possible) result: filters
/// are active but no channel belongs to any of them, so everything hides.
///
/// A channel qualifies if any of its categories is active (union semantics).
/// Stored ids are normalized on the way in so older documents with bare ids
/// still match freshly scanned links.
pub fn allowed_channels(channels: &[Channel], active_filters: &[String]) -> Option<HashSet<String>> {
    if active_filters.is_empty() {
        return None;
    }

    Some(
        channels
            .iter()
            .filter(|channel| {
                channel
                    .category_ids
                    .iter()
                    .any(|id| active_filters.contains(id))
            })
            .map(|channel| normalize_channel_id(&channel.id))
            .collect(),
    )
}

/// Visibility verdict for a single feed item
///
/// `channel_id` is None when no channel link could be resolved for the item;
/// under active filters such items hide rather than show (an unidentified
/// video must never leak through a filter).
pub fn is_visible(allowed: Option<&HashSet<String>>, channel_id: Option<&str>) -> bool {
    match allowed {
        None => true,
        Some(set) => channel_id.is_some_and(|id| set.contains(id)),
    }
}
