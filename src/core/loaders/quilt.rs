// ─── Quilt Installer ───
// Quilt's meta API is shape-compatible with Fabric's; this installer is
// the shared implementation pointed at the Quilt endpoints.

use async_trait::async_trait;

use super::context::InstallContext;
use super::fabric::MetaApiInstaller;
use super::installer::{InstallerEntry, LoaderInstaller};
use crate::core::error::LauncherResult;

pub struct QuiltInstaller {
    inner: MetaApiInstaller,
}

impl QuiltInstaller {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            inner: MetaApiInstaller::quilt(client),
        }
    }
}

#[async_trait]
impl LoaderInstaller for QuiltInstaller {
    async fn list_versions(
        &self,
        game_version: &str,
    ) -> LauncherResult<Option<Vec<InstallerEntry>>> {
        self.inner.list_versions(game_version).await
    }

    async fn install(
        &self,
        entry: &InstallerEntry,
        ctx: InstallContext<'_>,
    ) -> LauncherResult<()> {
        self.inner.install(entry, ctx).await
    }
}
