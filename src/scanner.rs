/// Feed scanning: locating video items in the subscriptions feed and the
/// channel link inside each one
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

/// Feed container on the subscriptions page
pub const FEED_CONTAINER_SELECTOR: &str = "ytd-browse[page-subtype=\"subscriptions\"]";

/// Video item tags across the host's feed layouts (rich grid, legacy grid,
/// plain list, playlist)
pub const VIDEO_ITEM_TAGS: [&str; 4] = [
    "ytd-rich-item-renderer",
    "ytd-grid-video-renderer",
    "ytd-video-renderer",
    "ytd-playlist-video-renderer",
];

pub const VIDEO_ITEM_SELECTOR: &str =
    "ytd-rich-item-renderer, ytd-grid-video-renderer, ytd-video-renderer, ytd-playlist-video-renderer";

/// One way of finding the channel link inside a video item. The table is
/// ordered narrowest first; the first hit wins.
struct LinkStrategy {
    name: &'static str,
    locate: fn(&Element) -> Option<String>,
}

const LINK_STRATEGIES: [LinkStrategy; 4] = [
    LinkStrategy {
        name: "channel-name",
        locate: channel_name_link,
    },
    LinkStrategy {
        name: "metadata",
        locate: metadata_link,
    },
    LinkStrategy {
        name: "channel-region",
        locate: channel_region_link,
    },
    LinkStrategy {
        name: "any-link",
        locate: any_channel_link,
    },
];

pub fn find_feed_container(document: &Document) -> Option<Element> {
    document.query_selector(FEED_CONTAINER_SELECTOR).ok().flatten()
}

/// All video items currently in the feed. Scoped to the feed container when
/// one exists, otherwise the whole document.
pub fn video_items(document: &Document) -> Vec<Element> {
    let list = match find_feed_container(document) {
        Some(container) => container.query_selector_all(VIDEO_ITEM_SELECTOR),
        None => document.query_selector_all(VIDEO_ITEM_SELECTOR),
    };

    let Ok(list) = list else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Whether a node is, or contains, a video item. Used to discard mutation
/// records about unrelated page churn before they can schedule work.
pub fn involves_video_item(node: &Node) -> bool {
    let Some(element) = node.dyn_ref::<Element>() else {
        return false;
    };

    element.matches(VIDEO_ITEM_SELECTOR).unwrap_or(false)
        || element
            .query_selector(VIDEO_ITEM_SELECTOR)
            .ok()
            .flatten()
            .is_some()
}

/// The channel href for a video item, via the first strategy that succeeds
pub fn channel_href(item: &Element) -> Option<String> {
    LINK_STRATEGIES.iter().find_map(|strategy| {
        let href = (strategy.locate)(item);
        if href.is_some() {
            log::trace!("channel link found via {} strategy", strategy.name);
        }
        href
    })
}

// Link strategies

/// The dedicated channel-name element. Its link is trusted as-is.
fn channel_name_link(item: &Element) -> Option<String> {
    item.query_selector("ytd-channel-name a[href], #channel-name a[href]")
        .ok()
        .flatten()?
        .get_attribute("href")
}

/// Links inside the item's metadata block that look like a channel address
fn metadata_link(item: &Element) -> Option<String> {
    first_channel_link(item, "#metadata a[href], #meta a[href]")
}

/// Links inside any element whose id or class mentions "channel"
fn channel_region_link(item: &Element) -> Option<String> {
    first_channel_link(item, "[id*=\"channel\"] a[href], [class*=\"channel\"] a[href]")
}

/// Last resort: any link in the item that looks like a channel address
fn any_channel_link(item: &Element) -> Option<String> {
    first_channel_link(item, "a[href]")
}

fn first_channel_link(item: &Element, selector: &str) -> Option<String> {
    let links = item.query_selector_all(selector).ok()?;
    (0..links.length())
        .filter_map(|i| links.item(i))
        .filter_map(|node| node.dyn_ref::<Element>()?.get_attribute("href"))
        .find(|href| is_channel_href(href) && !is_content_href(href))
}

/// Channel-address shape: a `/channel/` or `/@` path segment
pub fn is_channel_href(href: &str) -> bool {
    href.contains("/channel/") || href.contains("/@")
}

/// Video, shorts and playlist permalinks that must not be mistaken for
/// channel links
pub fn is_content_href(href: &str) -> bool {
    ["/watch?", "/shorts/", "/playlist?"]
        .iter()
        .any(|prefix| href.contains(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_href_shapes() {
        assert!(is_channel_href("/channel/UC123"));
        assert!(is_channel_href("https://www.youtube.com/channel/UC123/videos"));
        assert!(is_channel_href("/@handle"));
        assert!(!is_channel_href("/watch?v=abc"));
        assert!(!is_channel_href("/feed/subscriptions"));
    }

    #[test]
    fn test_content_href_shapes() {
        assert!(is_content_href("/watch?v=abc"));
        assert!(is_content_href("https://www.youtube.com/watch?v=abc"));
        assert!(is_content_href("/shorts/xyz"));
        assert!(is_content_href("/playlist?list=PL1"));
        assert!(!is_content_href("/channel/UC123"));
    }

    #[test]
    fn test_handle_containing_watch_is_not_content() {
        // "@watchmojo" contains the substring "watch"; the content check must
        // not be fooled by it.
        assert!(is_channel_href("/@watchmojo"));
        assert!(!is_content_href("/@watchmojo"));
    }

    #[test]
    fn test_selector_matches_tag_vocabulary() {
        assert_eq!(VIDEO_ITEM_SELECTOR, VIDEO_ITEM_TAGS.join(", "));
    }
}
