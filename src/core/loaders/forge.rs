// ─── Forge Installer ───
// Forge's installer format (processors, mapped client patches) is not
// implemented. Both operations return an explicit unsupported error
// instead of silently doing nothing.

use async_trait::async_trait;

use super::context::InstallContext;
use super::installer::{InstallerEntry, LoaderInstaller, LoaderKind};
use crate::core::error::{LauncherError, LauncherResult};

pub struct ForgeInstaller;

impl ForgeInstaller {
    pub fn new(_client: reqwest::Client) -> Self {
        Self
    }
}

#[async_trait]
impl LoaderInstaller for ForgeInstaller {
    async fn list_versions(
        &self,
        _game_version: &str,
    ) -> LauncherResult<Option<Vec<InstallerEntry>>> {
        Err(LauncherError::UnsupportedLoader(
            LoaderKind::Forge.to_string(),
        ))
    }

    async fn install(
        &self,
        _entry: &InstallerEntry,
        _ctx: InstallContext<'_>,
    ) -> LauncherResult<()> {
        Err(LauncherError::UnsupportedLoader(
            LoaderKind::Forge.to_string(),
        ))
    }
}
