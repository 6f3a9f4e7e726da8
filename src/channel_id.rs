/// Channel identity extraction and normalization for Feed Curator
use regex::Regex;
use std::sync::LazyLock;

/// First channel address segment in a URL or href fragment: either
/// `/channel/<id>` or `/@<handle>`, captured without the leading slash and
/// stopped at `/`, `?`, `&`, `#`.
static CHANNEL_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(channel/[^/?&#]+|@[^/?&#]+)").expect("channel id pattern"));

/// Extract a channel identifier from a URL or path fragment
///
/// Recognized shapes:
/// - canonical id path: `…/channel/UCabc…` → `channel/UCabc…`
/// - handle path: `…/@somehandle/videos` → `@somehandle`
///
/// Works on absolute URLs and on relative hrefs alike; the first matching
/// segment wins. Returns `None` when the input contains neither shape
/// (e.g. a watch-page permalink).
pub fn extract_channel_id(url: &str) -> Option<String> {
    CHANNEL_SEGMENT
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Normalize a raw channel reference into the canonical identifier used as
/// the set-membership key everywhere in the extension
///
/// Rules (idempotent; normalizing an already-normal id is a no-op):
/// 1. Already canonical (`channel/…` or `@…`) → returned unchanged
/// 2. URL or path containing either address shape → extracted
/// 3. Bare token with no path separators (e.g. `UC123`) → assumed to be a
///    canonical id and prefixed with `channel/`
/// 4. Anything else → returned unchanged (best-effort)
///
/// Rule 3 is a heuristic: it exists for identifiers that arrive stripped of
/// their path (older export files, hand-edited data). If the host ever grows
/// a third address shape, this function is the single place to teach it.
/// Channel registration and feed scanning both resolve through here and must
/// never disagree.
pub fn normalize_channel_id(raw: &str) -> String {
    if raw.starts_with("channel/") || raw.starts_with('@') {
        return raw.to_string();
    }

    if let Some(id) = extract_channel_id(raw) {
        return id;
    }

    if !raw.is_empty() && !raw.contains('/') {
        return format!("channel/{raw}");
    }

    raw.to_string()
}
