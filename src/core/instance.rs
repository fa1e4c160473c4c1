// ─── Instances ───
// Layout and persistence for game instances under an install root:
//   <root>/versions/<id>/<id>.json    source manifest (base + patches)
//   <root>/versions/<id>/<id>.jar     client jar
//   <root>/versions/<id>/settings.json  per-instance launch settings
//   <root>/assets, <root>/libraries   shared artifact stores

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::platform::Platform;
use crate::core::version::VersionManifest;

pub fn version_dir(root: &Path, game: &str) -> PathBuf {
    root.join("versions").join(game)
}

pub fn manifest_path(root: &Path, game: &str) -> PathBuf {
    version_dir(root, game).join(format!("{}.json", game))
}

pub fn client_jar_path(root: &Path, game: &str) -> PathBuf {
    version_dir(root, game).join(format!("{}.jar", game))
}

pub fn natives_dir(root: &Path, game: &str, platform: &Platform) -> PathBuf {
    version_dir(root, game).join(format!(
        "natives-{}{}",
        platform.os_name,
        platform.arch_suffix()
    ))
}

/// Load a game's source manifest (base + raw patch list).
pub async fn load_manifest(root: &Path, game: &str) -> LauncherResult<VersionManifest> {
    let path = manifest_path(root, game);
    if !path.exists() {
        return Err(LauncherError::GameNotFound(game.to_string()));
    }
    let json = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;
    Ok(serde_json::from_str(&json)?)
}

/// Persist a game's source manifest. The effective manifest is never
/// written; only the base plus its patch list is.
pub async fn save_manifest(
    root: &Path,
    game: &str,
    manifest: &VersionManifest,
) -> LauncherResult<()> {
    let path = manifest_path(root, game);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|source| LauncherError::Io { path, source })?;
    Ok(())
}

/// List installed games: every `versions/<g>/` holding a `<g>.json`.
pub async fn list_games(root: &Path) -> LauncherResult<Vec<String>> {
    let versions_dir = root.join("versions");
    let mut games = Vec::new();
    if !versions_dir.exists() {
        return Ok(games);
    }

    let mut entries = tokio::fs::read_dir(&versions_dir)
        .await
        .map_err(|source| LauncherError::Io {
            path: versions_dir.clone(),
            source,
        })?;
    while let Some(entry) = entries.next_entry().await.map_err(|source| LauncherError::Io {
        path: versions_dir.clone(),
        source,
    })? {
        let name = entry.file_name().to_string_lossy().to_string();
        if manifest_path(root, &name).exists() {
            games.push(name);
        }
    }
    games.sort();
    Ok(games)
}

/// Delete a game instance directory.
pub async fn delete_game(root: &Path, game: &str) -> LauncherResult<()> {
    let dir = version_dir(root, game);
    if !dir.exists() {
        return Err(LauncherError::GameNotFound(game.to_string()));
    }
    tokio::fs::remove_dir_all(&dir)
        .await
        .map_err(|source| LauncherError::Io { path: dir, source })?;
    info!("Deleted game instance {}", game);
    Ok(())
}

// ─── Per-instance launch settings ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    pub isolated: bool,
    pub ram: RamSettings,
    pub size: WindowSize,
    pub java: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RamSettings {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            isolated: false,
            ram: RamSettings {
                min: "1G".into(),
                max: "6G".into(),
            },
            size: WindowSize {
                width: 854,
                height: 480,
            },
            java: None,
        }
    }
}

fn settings_path(root: &Path, game: &str) -> PathBuf {
    version_dir(root, game).join("settings.json")
}

impl GameSettings {
    /// Load an instance's settings, writing the defaults on first read.
    /// A corrupt settings file falls back to defaults with a warning.
    pub async fn load(root: &Path, game: &str) -> LauncherResult<Self> {
        let path = settings_path(root, game);
        if !path.exists() {
            let defaults = Self::default();
            defaults.save(root, game).await?;
            return Ok(defaults);
        }

        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LauncherError::Io {
                path: path.clone(),
                source,
            })?;
        match serde_json::from_str(&json) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Corrupt settings at {:?} ({}), using defaults", path, e);
                Ok(Self::default())
            }
        }
    }

    pub async fn save(&self, root: &Path, game: &str) -> LauncherResult<()> {
        let path = settings_path(root, game);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| LauncherError::Io { path, source })?;
        Ok(())
    }
}

/// Write the default `launcher_profiles.json` at the root when absent;
/// some loader tooling expects the file to exist.
pub async fn ensure_launcher_profiles(root: &Path) -> LauncherResult<()> {
    let path = root.join("launcher_profiles.json");
    if path.exists() {
        return Ok(());
    }
    let stub = serde_json::json!({
        "profiles": {},
        "settings": {},
        "version": 3
    });
    tokio::fs::write(&path, serde_json::to_string_pretty(&stub)?)
        .await
        .map_err(|source| LauncherError::Io { path, source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manifest_round_trips_through_disk() {
        let root = tempfile::tempdir().unwrap();
        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "id": "1.21.1",
            "mainClass": "net.minecraft.client.main.Main",
            "patches": [{"id": "fabric", "priority": 30000,
                         "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient"}]
        }))
        .unwrap();

        save_manifest(root.path(), "my-game", &manifest).await.unwrap();
        let loaded = load_manifest(root.path(), "my-game").await.unwrap();
        assert_eq!(loaded.id.as_deref(), Some("1.21.1"));
        assert_eq!(loaded.patches.len(), 1);
        assert_eq!(loaded.patches[0].id, "fabric");
    }

    #[tokio::test]
    async fn list_games_requires_the_manifest_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("versions/empty-dir")).unwrap();
        let manifest = VersionManifest::default();
        save_manifest(root.path(), "real-game", &manifest).await.unwrap();

        let games = list_games(root.path()).await.unwrap();
        assert_eq!(games, vec!["real-game".to_string()]);
    }

    #[tokio::test]
    async fn missing_game_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = load_manifest(root.path(), "nope").await.unwrap_err();
        assert!(matches!(err, LauncherError::GameNotFound(_)));
    }

    #[tokio::test]
    async fn settings_defaults_are_written_on_first_read() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(version_dir(root.path(), "g")).unwrap();

        let settings = GameSettings::load(root.path(), "g").await.unwrap();
        assert!(!settings.isolated);
        assert_eq!(settings.ram.max, "6G");
        assert!(settings_path(root.path(), "g").exists());

        let reloaded = GameSettings::load(root.path(), "g").await.unwrap();
        assert_eq!(reloaded.size.width, 854);
    }
}
