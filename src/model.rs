/// Data structures for categories and subscribed channels
use serde::{Deserialize, Serialize};

/// Palette offered when creating a category
pub const CATEGORY_COLORS: [&str; 13] = [
    "#ef4444", // red
    "#f97316", // orange
    "#f59e0b", // amber
    "#84cc16", // lime
    "#22c55e", // green
    "#14b8a6", // teal
    "#06b6d4", // cyan
    "#3b82f6", // blue
    "#8b5cf6", // violet
    "#a855f7", // purple
    "#d946ef", // fuchsia
    "#ec4899", // pink
    "#6b7280", // gray
];

/// A user-defined grouping of channels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
}

/// A subscribed channel, keyed by its normalized address-derived id
/// (`channel/<id>` or `@<handle>`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

impl Channel {
    /// Newly discovered channels start out unassigned
    pub fn new(id: String, name: String, thumbnail_url: String) -> Self {
        Channel {
            id,
            name,
            thumbnail_url,
            category_ids: Vec::new(),
        }
    }
}
