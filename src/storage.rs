/// Chrome storage operations for Feed Curator
use crate::model::{Category, Channel};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/content.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    fn onStorageChanged(key: &str, callback: &js_sys::Function);

    fn exportToFile(data: &str, filename: &str);

    #[wasm_bindgen(catch)]
    async fn pickImportFile() -> Result<JsValue, JsValue>;
}

const STORAGE_KEY: &str = "feed_curator_data";

/// Everything the extension persists, kept under a single storage key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageData {
    pub categories: Vec<Category>,
    pub channels: Vec<Channel>,
    pub active_filters: Vec<String>,
}

impl StorageData {
    pub fn new() -> Self {
        StorageData::default()
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn update_category(&mut self, updated: Category) -> bool {
        self.categories
            .iter_mut()
            .find(|c| c.id == updated.id)
            .map(|category| {
                *category = updated;
            })
            .is_some()
    }

    /// Removes a category and every reference to it: channel assignments
    /// and any active filter pointing at it
    pub fn delete_category(&mut self, category_id: &str) -> bool {
        let original_len = self.categories.len();
        self.categories.retain(|c| c.id != category_id);
        if self.categories.len() == original_len {
            return false;
        }

        for channel in &mut self.channels {
            channel.category_ids.retain(|id| id != category_id);
        }
        self.active_filters.retain(|id| id != category_id);
        true
    }

    pub fn set_channel_categories(&mut self, channel_id: &str, category_ids: Vec<String>) -> bool {
        self.channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .map(|channel| {
                channel.category_ids = category_ids;
            })
            .is_some()
    }

    pub fn set_active_filters(&mut self, filter_ids: Vec<String>) {
        self.active_filters = filter_ids;
    }

    pub fn clear_active_filters(&mut self) {
        self.active_filters.clear();
    }

    /// Fold a freshly scraped channel list into the stored one. Known
    /// channels keep their category assignments and get their name and
    /// thumbnail refreshed; new channels are appended unassigned. Channels
    /// missing from the scrape survive, so a partial page load never wipes
    /// out assignments.
    pub fn merge_scraped_channels(&mut self, scraped: Vec<Channel>) {
        for incoming in scraped {
            match self.channels.iter_mut().find(|c| c.id == incoming.id) {
                Some(existing) => {
                    existing.name = incoming.name;
                    existing.thumbnail_url = incoming.thumbnail_url;
                }
                None => self.channels.push(incoming),
            }
        }
    }
}

// Helper functions

pub async fn load_storage() -> Result<StorageData, String> {
    let storage_js = getStorage(STORAGE_KEY)
        .await
        .map_err(|e| format!("Failed to get storage: {:?}", e))?;

    if storage_js.is_null() || storage_js.is_undefined() {
        Ok(StorageData::new())
    } else {
        serde_wasm_bindgen::from_value(storage_js)
            .map_err(|e| format!("Failed to parse storage: {:?}", e))
    }
}

pub async fn save_storage(storage: &StorageData) -> Result<(), String> {
    let storage_js = serde_wasm_bindgen::to_value(storage)
        .map_err(|e| format!("Failed to serialize storage: {:?}", e))?;

    setStorage(STORAGE_KEY, storage_js)
        .await
        .map_err(|e| format!("Failed to save storage: {:?}", e))
}

/// Invoke `on_change` with the parsed document whenever another context
/// writes our storage key. The callback lives for the rest of the page.
pub fn subscribe_changes(on_change: impl Fn(StorageData) + 'static) {
    let callback = Closure::wrap(Box::new(move |value: JsValue| {
        match serde_wasm_bindgen::from_value(value) {
            Ok(data) => on_change(data),
            Err(e) => log::warn!("Ignoring unreadable storage change: {:?}", e),
        }
    }) as Box<dyn Fn(JsValue)>);

    onStorageChanged(STORAGE_KEY, callback.as_ref().unchecked_ref());
    callback.forget();
}

pub fn export_to_file(json: &str, filename: &str) {
    exportToFile(json, filename);
}

/// Prompt the user for a JSON file. Resolves to None if the picker was
/// dismissed.
pub async fn pick_import_file() -> Result<Option<String>, String> {
    let content = pickImportFile()
        .await
        .map_err(|e| format!("Failed to read file: {:?}", e))?;
    Ok(content.as_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: "Circle".to_string(),
            color: "#3b82f6".to_string(),
        }
    }

    fn create_test_channel(id: &str, category_ids: &[&str]) -> Channel {
        Channel {
            id: id.to_string(),
            name: format!("Channel {}", id),
            thumbnail_url: format!("https://example.com/{}.jpg", id.replace('/', "-")),
            category_ids: category_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn create_test_data() -> StorageData {
        let mut data = StorageData::new();
        data.add_category(create_test_category("cat-1", "Music"));
        data.add_category(create_test_category("cat-2", "Gaming"));
        data.channels.push(create_test_channel("channel/UC1", &["cat-1"]));
        data.channels
            .push(create_test_channel("@handle", &["cat-1", "cat-2"]));
        data
    }

    #[test]
    fn test_add_and_update_category() {
        let mut data = create_test_data();
        assert_eq!(data.categories.len(), 2);

        let mut renamed = create_test_category("cat-1", "Concerts");
        renamed.color = "#ef4444".to_string();

        assert!(data.update_category(renamed));
        assert_eq!(data.categories[0].name, "Concerts");
        assert_eq!(data.categories[0].color, "#ef4444");
    }

    #[test]
    fn test_update_nonexistent_category() {
        let mut data = create_test_data();
        assert!(!data.update_category(create_test_category("missing", "X")));
    }

    #[test]
    fn test_delete_category_cascades() {
        let mut data = create_test_data();
        data.set_active_filters(vec!["cat-1".to_string(), "cat-2".to_string()]);

        let deleted = data.delete_category("cat-1");

        assert!(deleted);
        assert_eq!(data.categories.len(), 1);
        assert_eq!(data.categories[0].id, "cat-2");
        // No channel may still reference the deleted category.
        assert!(data.channels[0].category_ids.is_empty());
        assert_eq!(data.channels[1].category_ids, vec!["cat-2".to_string()]);
        // Nor may the active filter set.
        assert_eq!(data.active_filters, vec!["cat-2".to_string()]);
    }

    #[test]
    fn test_delete_nonexistent_category() {
        let mut data = create_test_data();
        assert!(!data.delete_category("missing"));
        assert_eq!(data.categories.len(), 2);
        assert_eq!(data.channels[0].category_ids.len(), 1);
    }

    #[test]
    fn test_set_channel_categories() {
        let mut data = create_test_data();

        assert!(data.set_channel_categories("channel/UC1", vec!["cat-2".to_string()]));
        assert_eq!(data.channels[0].category_ids, vec!["cat-2".to_string()]);

        assert!(!data.set_channel_categories("channel/unknown", Vec::new()));
    }

    #[test]
    fn test_set_and_clear_active_filters() {
        let mut data = create_test_data();

        data.set_active_filters(vec!["cat-1".to_string()]);
        assert_eq!(data.active_filters.len(), 1);

        data.clear_active_filters();
        assert!(data.active_filters.is_empty());
    }

    #[test]
    fn test_merge_preserves_assignments() {
        let mut data = create_test_data();
        let rescraped = vec![Channel::new(
            "channel/UC1".to_string(),
            "Renamed Channel".to_string(),
            "https://example.com/new.jpg".to_string(),
        )];

        data.merge_scraped_channels(rescraped);

        let channel = &data.channels[0];
        assert_eq!(channel.name, "Renamed Channel");
        assert_eq!(channel.thumbnail_url, "https://example.com/new.jpg");
        assert_eq!(channel.category_ids, vec!["cat-1".to_string()]);
    }

    #[test]
    fn test_merge_adds_new_channels_unassigned() {
        let mut data = create_test_data();

        data.merge_scraped_channels(vec![create_test_channel("@newcomer", &[])]);

        assert_eq!(data.channels.len(), 3);
        assert!(data.channels[2].category_ids.is_empty());
    }

    #[test]
    fn test_merge_keeps_channels_missing_from_scrape() {
        let mut data = create_test_data();

        data.merge_scraped_channels(vec![create_test_channel("@newcomer", &[])]);

        assert!(data.channels.iter().any(|c| c.id == "channel/UC1"));
        assert!(data.channels.iter().any(|c| c.id == "@handle"));
    }

    #[test]
    fn test_serialization() {
        let mut data = create_test_data();
        data.set_active_filters(vec!["cat-1".to_string()]);

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("activeFilters"));
        assert!(json.contains("categoryIds"));

        let deserialized: StorageData = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, data);
    }

    #[test]
    fn test_empty_document_parses_to_defaults() {
        let parsed: StorageData = serde_json::from_str("{}").unwrap();
        assert!(parsed.categories.is_empty());
        assert!(parsed.channels.is_empty());
        assert!(parsed.active_filters.is_empty());
    }
}
