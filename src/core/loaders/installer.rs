use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::VersionManifest;

use super::{
    context::InstallContext, fabric::FabricInstaller, forge::ForgeInstaller,
    neoforge::NeoForgeInstaller, quilt::QuiltInstaller,
};

/// Supported mod loaders — strongly typed, no magic strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Fabric,
    Quilt,
    Forge,
    NeoForged,
}

impl std::fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderKind::Fabric => write!(f, "fabric"),
            LoaderKind::Quilt => write!(f, "quilt"),
            LoaderKind::Forge => write!(f, "forge"),
            LoaderKind::NeoForged => write!(f, "neoforged"),
        }
    }
}

impl std::str::FromStr for LoaderKind {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fabric" => Ok(LoaderKind::Fabric),
            "quilt" => Ok(LoaderKind::Quilt),
            "forge" => Ok(LoaderKind::Forge),
            "neoforged" | "neoforge" => Ok(LoaderKind::NeoForged),
            other => Err(LauncherError::Loader(format!("unknown loader: {}", other))),
        }
    }
}

/// One installable loader build for a specific game version.
#[derive(Debug, Clone)]
pub struct InstallerEntry {
    pub version: String,
    pub mc_version: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait LoaderInstaller: Send + Sync {
    /// Installable loader builds for `game_version`, or `None` when the
    /// loader does not support that game version at all.
    async fn list_versions(
        &self,
        game_version: &str,
    ) -> LauncherResult<Option<Vec<InstallerEntry>>>;

    /// Layer this loader onto the instance as a manifest patch and fetch
    /// the libraries it adds.
    async fn install(&self, entry: &InstallerEntry, ctx: InstallContext<'_>)
        -> LauncherResult<()>;
}

/// Dispatcher without `Box<dyn>`.
pub enum Installer {
    Fabric(FabricInstaller),
    Quilt(QuiltInstaller),
    Forge(ForgeInstaller),
    NeoForged(NeoForgeInstaller),
}

impl Installer {
    pub fn new(kind: LoaderKind, client: reqwest::Client) -> Self {
        match kind {
            LoaderKind::Fabric => Self::Fabric(FabricInstaller::new(client)),
            LoaderKind::Quilt => Self::Quilt(QuiltInstaller::new(client)),
            LoaderKind::Forge => Self::Forge(ForgeInstaller::new(client)),
            LoaderKind::NeoForged => Self::NeoForged(NeoForgeInstaller::new(client)),
        }
    }

    pub async fn list_versions(
        &self,
        game_version: &str,
    ) -> LauncherResult<Option<Vec<InstallerEntry>>> {
        match self {
            Installer::Fabric(i) => i.list_versions(game_version).await,
            Installer::Quilt(i) => i.list_versions(game_version).await,
            Installer::Forge(i) => i.list_versions(game_version).await,
            Installer::NeoForged(i) => i.list_versions(game_version).await,
        }
    }

    pub async fn install(
        &self,
        entry: &InstallerEntry,
        ctx: InstallContext<'_>,
    ) -> LauncherResult<()> {
        match self {
            Installer::Fabric(i) => i.install(entry, ctx).await,
            Installer::Quilt(i) => i.install(entry, ctx).await,
            Installer::Forge(i) => i.install(entry, ctx).await,
            Installer::NeoForged(i) => i.install(entry, ctx).await,
        }
    }
}

/// Heuristic loader detection from an effective manifest.
pub fn detect_loader(manifest: &VersionManifest) -> Option<LoaderKind> {
    let main_class = manifest.main_class.as_deref().unwrap_or_default();
    if main_class.contains("fabricmc") {
        return Some(LoaderKind::Fabric);
    }
    if main_class.contains("quiltmc") {
        return Some(LoaderKind::Quilt);
    }

    let game_args: Vec<String> = manifest
        .arguments
        .as_ref()
        .map(|args| {
            args.game
                .iter()
                .filter_map(|entry| match entry {
                    crate::core::version::schema::ArgumentEntry::Plain(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if game_args.iter().any(|a| a == "neoforgeclient") {
        return Some(LoaderKind::NeoForged);
    }
    if game_args.iter().any(|a| a == "forgeclient") {
        return Some(LoaderKind::Forge);
    }

    None
}

/// The installed version recorded in a loader's patch, if present.
pub fn installed_patch_version(manifest: &VersionManifest, kind: LoaderKind) -> Option<String> {
    manifest
        .patches
        .iter()
        .find(|p| p.id == kind.to_string())
        .and_then(|p| p.version.clone())
}

/// Drop a loader's patch from the source manifest. Errors when no patch
/// with that id exists.
pub fn remove_patch(manifest: &mut VersionManifest, kind: LoaderKind) -> LauncherResult<()> {
    let id = kind.to_string();
    let before = manifest.patches.len();
    manifest.patches.retain(|p| p.id != id);
    if manifest.patches.len() == before {
        return Err(LauncherError::Loader(format!(
            "no {} patch installed on this instance",
            id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(value: serde_json::Value) -> VersionManifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn loader_kind_parses_common_spellings() {
        assert_eq!("fabric".parse::<LoaderKind>().unwrap(), LoaderKind::Fabric);
        assert_eq!(
            "NeoForge".parse::<LoaderKind>().unwrap(),
            LoaderKind::NeoForged
        );
        assert!("rift".parse::<LoaderKind>().is_err());
    }

    #[test]
    fn detects_fabric_from_the_main_class() {
        let m = manifest(serde_json::json!({
            "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient"
        }));
        assert_eq!(detect_loader(&m), Some(LoaderKind::Fabric));
    }

    #[test]
    fn detects_forge_from_game_arguments() {
        let m = manifest(serde_json::json!({
            "mainClass": "cpw.mods.bootstraplauncher.BootstrapLauncher",
            "arguments": {"game": ["--launchTarget", "forgeclient"]}
        }));
        assert_eq!(detect_loader(&m), Some(LoaderKind::Forge));
    }

    #[test]
    fn vanilla_detects_nothing() {
        let m = manifest(serde_json::json!({
            "mainClass": "net.minecraft.client.main.Main"
        }));
        assert_eq!(detect_loader(&m), None);
    }

    #[test]
    fn remove_patch_requires_an_installed_patch() {
        let mut m = manifest(serde_json::json!({
            "mainClass": "Main",
            "patches": [{"id": "fabric", "priority": 30000, "version": "0.16.10"}]
        }));

        assert_eq!(
            installed_patch_version(&m, LoaderKind::Fabric).as_deref(),
            Some("0.16.10")
        );
        remove_patch(&mut m, LoaderKind::Fabric).unwrap();
        assert!(m.patches.is_empty());
        assert!(remove_patch(&mut m, LoaderKind::Fabric).is_err());
    }
}
