// ─── Launcher Config ───
// Persisted launcher-wide settings: user records, mirror choice,
// install roots, and the default Java binary. Commands load this once
// and hand resolved values into the core; nothing in the core reads it
// back ambiently.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::mirror::Mirror;
use crate::core::users::User;

const APP_DIR_NAME: &str = "craftcli";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub users: Vec<User>,
    pub mirror: Mirror,
    pub roots: Vec<PathBuf>,
    pub java: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let default_root = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft");
        Self {
            users: Vec::new(),
            mirror: Mirror::Official,
            roots: vec![default_root],
            java: None,
        }
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("config.json")
}

impl LauncherConfig {
    /// Load from the platform config dir; defaults when absent, and a
    /// corrupt file falls back to defaults with a warning.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Corrupt launcher config at {:?} ({}), using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> LauncherResult<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> LauncherResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// The install root commands operate on. `--root` overrides the
    /// first configured root.
    pub fn resolve_root(&self, override_root: Option<&Path>) -> PathBuf {
        match override_root {
            Some(root) => root.to_path_buf(),
            None => self
                .roots
                .first()
                .cloned()
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn find_user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_one_root_and_official_mirror() {
        let config = LauncherConfig::default();
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.mirror, Mirror::Official);
        assert!(config.users.is_empty());
    }

    #[test]
    fn config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = LauncherConfig::default();
        config.users.push(User::offline("Steve"));
        config.mirror = Mirror::Bmclapi;
        config.save_to(&path).unwrap();

        let loaded = LauncherConfig::load_from(&path);
        assert_eq!(loaded.users.len(), 1);
        assert_eq!(loaded.mirror, Mirror::Bmclapi);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let loaded = LauncherConfig::load_from(Path::new("/definitely/not/here.json"));
        assert!(loaded.users.is_empty());
    }

    #[test]
    fn root_override_wins() {
        let config = LauncherConfig::default();
        let resolved = config.resolve_root(Some(Path::new("/tmp/mc")));
        assert_eq!(resolved, PathBuf::from("/tmp/mc"));
    }
}
