// ─── Version Catalog ───
// Fetches and filters the remote list of installable game versions.

use serde::Deserialize;
use tracing::info;

use crate::core::error::LauncherResult;
use crate::core::mirror::Mirror;

const VERSION_CATALOG_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// Top-level catalog document.
#[derive(Debug, Deserialize)]
pub struct VersionCatalog {
    pub versions: Vec<CatalogEntry>,
}

/// A single installable version.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
}

impl CatalogEntry {
    pub fn is_release(&self) -> bool {
        self.version_type == "release"
    }
}

impl VersionCatalog {
    /// Fetch the catalog using a shared HTTP client, through the mirror.
    pub async fn fetch(client: &reqwest::Client, mirror: Mirror) -> LauncherResult<Self> {
        let url = mirror.rewrite(VERSION_CATALOG_URL);
        let catalog: VersionCatalog = client.get(&url).send().await?.json().await?;
        info!("Loaded {} versions from catalog", catalog.versions.len());
        Ok(catalog)
    }

    /// Find a specific version entry by id (e.g. "1.21.1").
    pub fn find(&self, id: &str) -> Option<&CatalogEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// All stable release entries, catalog order preserved.
    pub fn releases(&self) -> Vec<&CatalogEntry> {
        self.versions.iter().filter(|v| v.is_release()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_catalog_entry() {
        let json = r#"{
            "id": "1.21.1",
            "type": "release",
            "url": "https://example.com/1.21.1.json",
            "time": "2024-08-08T14:24:49+00:00",
            "releaseTime": "2024-08-08T14:24:49+00:00"
        }"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "1.21.1");
        assert!(entry.is_release());
    }

    #[test]
    fn releases_filters_snapshots() {
        let catalog = VersionCatalog {
            versions: vec![
                CatalogEntry {
                    id: "24w33a".into(),
                    version_type: "snapshot".into(),
                    url: String::new(),
                    release_time: String::new(),
                },
                CatalogEntry {
                    id: "1.21.1".into(),
                    version_type: "release".into(),
                    url: String::new(),
                    release_time: String::new(),
                },
            ],
        };
        let releases = catalog.releases();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].id, "1.21.1");
    }
}
