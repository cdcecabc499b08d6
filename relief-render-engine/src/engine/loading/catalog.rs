use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// One named built-in subject image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub path: String,
}

/// Catalog of built-in subjects, loaded from `subjects/catalog.json`.
/// Mirrors the JSON structure exactly.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize)]
pub struct SubjectCatalog {
    pub subjects: Vec<CatalogEntry>,
}

impl SubjectCatalog {
    /// Asset path for a subject by its catalog name.
    pub fn path_for(&self, name: &str) -> Option<&str> {
        self.subjects
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.path.as_str())
    }

    /// The subject shown before any explicit selection.
    pub fn default_entry(&self) -> Option<&CatalogEntry> {
        self.subjects.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parses_and_resolves_names() {
        let json = r#"{
            "subjects": [
                { "name": "buffalo", "path": "subjects/buffalo.jpg" },
                { "name": "bear", "path": "subjects/bear.jpg" }
            ]
        }"#;
        let catalog: SubjectCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.subjects.len(), 2);
        assert_eq!(catalog.path_for("bear"), Some("subjects/bear.jpg"));
        assert_eq!(catalog.path_for("unknown"), None);
        assert_eq!(catalog.default_entry().unwrap().name, "buffalo");
    }
}
