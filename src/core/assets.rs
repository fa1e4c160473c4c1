// ─── Asset Index ───
// Schema for the asset index document and the content-addressed object
// layout it references.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Asset index id whose objects land under the legacy virtual layout.
pub const LEGACY_INDEX_ID: &str = "legacy";

const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Top-level asset index JSON structure.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

impl AssetObject {
    /// Download URL for this object (before mirror rewriting).
    pub fn url(&self) -> String {
        format!("{}/{}/{}", RESOURCES_URL, &self.hash[..2], self.hash)
    }

    /// Local destination: content-addressed under `objects/`, or the flat
    /// name under `virtual/legacy/` for legacy indices.
    pub fn local_path(&self, assets_dir: &Path, index_id: &str, name: &str) -> PathBuf {
        if index_id == LEGACY_INDEX_ID {
            assets_dir.join("virtual").join("legacy").join(name)
        } else {
            assets_dir
                .join("objects")
                .join(&self.hash[..2])
                .join(&self.hash)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> AssetObject {
        AssetObject {
            hash: "abcdef0123456789abcdef0123456789abcdef01".into(),
            size: 42,
        }
    }

    #[test]
    fn url_is_hash_prefixed() {
        assert_eq!(
            object().url(),
            "https://resources.download.minecraft.net/ab/abcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn modern_objects_are_content_addressed() {
        let path = object().local_path(Path::new("/root/assets"), "17", "minecraft/sounds/x.ogg");
        assert_eq!(
            path,
            PathBuf::from("/root/assets/objects/ab/abcdef0123456789abcdef0123456789abcdef01")
        );
    }

    #[test]
    fn legacy_objects_keep_their_names() {
        let path = object().local_path(
            Path::new("/root/assets"),
            LEGACY_INDEX_ID,
            "minecraft/sounds/x.ogg",
        );
        assert_eq!(
            path,
            PathBuf::from("/root/assets/virtual/legacy/minecraft/sounds/x.ogg")
        );
    }
}
