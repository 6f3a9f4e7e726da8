/// Import/export of category and channel data as versioned JSON documents
use crate::model::{Category, Channel};
use crate::storage::StorageData;
use serde::{Deserialize, Serialize};

pub const EXPORT_VERSION: &str = "1.0";

/// On-disk export format. Deliberately excludes active filters, which are
/// session state, not data worth carrying between machines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: String,
    pub export_date: String,
    pub categories: Vec<Category>,
    pub channels: Vec<Channel>,
}

/// Counts reported back to the user after an import
#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub categories_added: usize,
    pub channels_updated: usize,
}

pub fn export_document(data: &StorageData, export_date: String) -> ExportData {
    ExportData {
        version: EXPORT_VERSION.to_string(),
        export_date,
        categories: data.categories.clone(),
        channels: data.channels.clone(),
    }
}

pub fn export_json(data: &StorageData, export_date: String) -> Result<String, String> {
    serde_json::to_string_pretty(&export_document(data, export_date))
        .map_err(|e| format!("Failed to serialize export: {:?}", e))
}

/// `feed-curator-YYYY-MM-DD.json`, from an ISO timestamp
pub fn export_filename(iso_date: &str) -> String {
    let date_part = iso_date.split('T').next().unwrap_or(iso_date);
    format!("feed-curator-{}.json", date_part)
}

pub fn parse_import(json: &str) -> Result<ExportData, String> {
    serde_json::from_str(json).map_err(|e| format!("Not a valid export file: {}", e))
}

/// Merge an imported document into the current one
///
/// Unknown categories are added; on id collision the existing category wins.
/// Channel entries contribute only their category memberships, and only to
/// channels already present: the channel list itself comes from scraping the
/// user's own subscriptions, so a foreign export must not plant channels the
/// user never subscribed to. After merging, every channel's membership set is
/// validated against the merged category list, which also scrubs refs that
/// were dangling before the import.
pub fn merge_import(data: &mut StorageData, import: ExportData) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for category in import.categories {
        if !data.categories.iter().any(|c| c.id == category.id) {
            data.categories.push(category);
            summary.categories_added += 1;
        }
    }

    let category_ids: Vec<String> = data.categories.iter().map(|c| c.id.clone()).collect();
    let memberships_before: Vec<Vec<String>> =
        data.channels.iter().map(|c| c.category_ids.clone()).collect();

    for imported in import.channels {
        let Some(existing) = data.channels.iter_mut().find(|c| c.id == imported.id) else {
            continue;
        };
        for id in imported.category_ids {
            if !existing.category_ids.contains(&id) {
                existing.category_ids.push(id);
            }
        }
    }

    for channel in &mut data.channels {
        channel.category_ids.retain(|id| category_ids.contains(id));
    }

    summary.channels_updated = data
        .channels
        .iter()
        .zip(&memberships_before)
        .filter(|(channel, before)| &channel.category_ids != *before)
        .count();

    summary
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
            thumbnail_url: String::new(),
            category_ids: category_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn create_test_data() -> StorageData {
        let mut data = StorageData::new();
        data.add_category(create_test_category("cat-1", "Music"));
        data.channels.push(create_test_channel("channel/UC1", &["cat-1"]));
        data.channels.push(create_test_channel("@handle", &[]));
        data
    }

    #[test]
    fn test_export_document_shape() {
        let data = create_test_data();
        let export = export_document(&data, "2026-08-23T10:00:00.000Z".to_string());

        assert_eq!(export.version, EXPORT_VERSION);
        assert_eq!(export.categories.len(), 1);
        assert_eq!(export.channels.len(), 2);

        let json = export_json(&data, "2026-08-23T10:00:00.000Z".to_string()).unwrap();
        assert!(json.contains("\"exportDate\""));
        assert!(json.contains("\"version\": \"1.0\""));
    }

    #[test]
    fn test_export_filename_uses_date_part() {
        assert_eq!(
            export_filename("2026-08-23T10:00:00.000Z"),
            "feed-curator-2026-08-23.json"
        );
        // Degenerate input still yields a usable name.
        assert_eq!(export_filename("today"), "feed-curator-today.json");
    }

    #[test]
    fn test_parse_round_trip() {
        let data = create_test_data();
        let json = export_json(&data, "2026-08-23T10:00:00.000Z".to_string()).unwrap();

        let parsed = parse_import(&json).unwrap();
        assert_eq!(parsed, export_document(&data, "2026-08-23T10:00:00.000Z".to_string()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_import("not json at all").is_err());
        assert!(parse_import("{\"categories\": []}").is_err());
    }

    #[test]
    fn test_merge_adds_unknown_categories() {
        let mut data = create_test_data();
        let import = ExportData {
            version: EXPORT_VERSION.to_string(),
            export_date: "2026-01-01T00:00:00.000Z".to_string(),
            categories: vec![
                create_test_category("cat-1", "Renamed Music"),
                create_test_category("cat-2", "Gaming"),
            ],
            channels: Vec::new(),
        };

        let summary = merge_import(&mut data, import);

        assert_eq!(summary.categories_added, 1);
        assert_eq!(data.categories.len(), 2);
        // On collision the existing category wins.
        assert_eq!(data.categories[0].name, "Music");
    }

    #[test]
    fn test_merge_unions_memberships_for_known_channels() {
        let mut data = create_test_data();
        let import = ExportData {
            version: EXPORT_VERSION.to_string(),
            export_date: "2026-01-01T00:00:00.000Z".to_string(),
            categories: vec![create_test_category("cat-2", "Gaming")],
            channels: vec![
                create_test_channel("channel/UC1", &["cat-1", "cat-2"]),
                create_test_channel("@handle", &["cat-2"]),
            ],
        };

        let summary = merge_import(&mut data, import);

        assert_eq!(summary.channels_updated, 2);
        assert_eq!(
            data.channels[0].category_ids,
            vec!["cat-1".to_string(), "cat-2".to_string()]
        );
        assert_eq!(data.channels[1].category_ids, vec!["cat-2".to_string()]);
    }

    #[test]
    fn test_merge_skips_unknown_channels() {
        let mut data = create_test_data();
        let import = ExportData {
            version: EXPORT_VERSION.to_string(),
            export_date: "2026-01-01T00:00:00.000Z".to_string(),
            categories: Vec::new(),
            channels: vec![create_test_channel("@stranger", &["cat-1"])],
        };

        let summary = merge_import(&mut data, import);

        assert_eq!(summary.channels_updated, 0);
        assert!(!data.channels.iter().any(|c| c.id == "@stranger"));
    }

    #[test]
    fn test_merge_drops_dangling_category_refs() {
        let mut data = create_test_data();
        let import = ExportData {
            version: EXPORT_VERSION.to_string(),
            export_date: "2026-01-01T00:00:00.000Z".to_string(),
            categories: Vec::new(),
            channels: vec![create_test_channel("@handle", &["cat-deleted"])],
        };

        let summary = merge_import(&mut data, import);

        assert_eq!(summary.channels_updated, 0);
        assert!(data.channels[1].category_ids.is_empty());
    }

    #[test]
    fn test_merge_scrubs_preexisting_dangling_refs() {
        let mut data = create_test_data();
        data.channels[0].category_ids.push("cat-ghost".to_string());

        let import = ExportData {
            version: EXPORT_VERSION.to_string(),
            export_date: "2026-01-01T00:00:00.000Z".to_string(),
            categories: Vec::new(),
            channels: Vec::new(),
        };

        let summary = merge_import(&mut data, import);

        assert_eq!(data.channels[0].category_ids, vec!["cat-1".to_string()]);
        assert_eq!(summary.channels_updated, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut data = create_test_data();
        let import = ExportData {
            version: EXPORT_VERSION.to_string(),
            export_date: "2026-01-01T00:00:00.000Z".to_string(),
            categories: vec![create_test_category("cat-2", "Gaming")],
            channels: vec![create_test_channel("channel/UC1", &["cat-2"])],
        };

        merge_import(&mut data, import.clone());
        let second = merge_import(&mut data, import);

        assert_eq!(second, ImportSummary::default());
        assert_eq!(data.categories.len(), 2);
        assert_eq!(
            data.channels[0].category_ids,
            vec!["cat-1".to_string(), "cat-2".to_string()]
        );
    }
}
