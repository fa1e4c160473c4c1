// ─── NeoForge Installer ───
// Same situation as Forge: explicit unsupported result.

use async_trait::async_trait;

use super::context::InstallContext;
use super::installer::{InstallerEntry, LoaderInstaller, LoaderKind};
use crate::core::error::{LauncherError, LauncherResult};

pub struct NeoForgeInstaller;

impl NeoForgeInstaller {
    pub fn new(_client: reqwest::Client) -> Self {
        Self
    }
}

#[async_trait]
impl LoaderInstaller for NeoForgeInstaller {
    async fn list_versions(
        &self,
        _game_version: &str,
    ) -> LauncherResult<Option<Vec<InstallerEntry>>> {
        Err(LauncherError::UnsupportedLoader(
            LoaderKind::NeoForged.to_string(),
        ))
    }

    async fn install(
        &self,
        _entry: &InstallerEntry,
        _ctx: InstallContext<'_>,
    ) -> LauncherResult<()> {
        Err(LauncherError::UnsupportedLoader(
            LoaderKind::NeoForged.to_string(),
        ))
    }
}
