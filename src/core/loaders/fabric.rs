// ─── Fabric Installer ───
// Installs the Fabric loader through its meta API and layers the
// resulting profile onto the instance as a manifest patch. Quilt shares
// this implementation; only the API base and patch id differ.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::context::InstallContext;
use super::installer::{InstallerEntry, LoaderInstaller, LoaderKind};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fetch::planner::plan_libraries;
use crate::core::fetch::queue::DownloadQueue;
use crate::core::instance;
use crate::core::maven::MavenArtifact;
use crate::core::version::effective_manifest;
use crate::core::version::schema::{
    Arguments, Library, LibraryDownloads, ManifestPatch, RemoteArtifact, VersionManifest,
};

const FABRIC_META_BASE: &str = "https://meta.fabricmc.net/v2";
const FABRIC_MAVEN: &str = "https://maven.fabricmc.net";

/// Patch priority loader fragments install at.
const LOADER_PATCH_PRIORITY: i64 = 30000;

const MAX_PARALLEL: usize = 16;

pub struct FabricInstaller {
    inner: MetaApiInstaller,
}

impl FabricInstaller {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            inner: MetaApiInstaller {
                client,
                loader: LoaderKind::Fabric,
                meta_base: FABRIC_META_BASE,
                default_maven: FABRIC_MAVEN,
            },
        }
    }
}

#[async_trait]
impl LoaderInstaller for FabricInstaller {
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

// ─── Shared meta-API implementation ───

#[derive(Debug, Deserialize)]
struct SupportedGameVersion {
    version: String,
}

#[derive(Debug, Deserialize)]
struct LoaderListEntry {
    loader: LoaderVersion,
}

#[derive(Debug, Deserialize)]
struct LoaderVersion {
    version: String,
}

/// Loader profile as the meta API serves it: manifest-shaped, but its
/// libraries carry Maven names plus a repository base instead of full
/// artifact descriptors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaProfile {
    main_class: String,
    #[serde(default)]
    libraries: Vec<MetaLibrary>,
    #[serde(default)]
    arguments: Option<Arguments>,
}

#[derive(Debug, Deserialize)]
struct MetaLibrary {
    name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sha1: Option<String>,
    #[serde(default)]
    size: Option<u64>,
}

pub(super) struct MetaApiInstaller {
    client: reqwest::Client,
    loader: LoaderKind,
    meta_base: &'static str,
    default_maven: &'static str,
}

impl MetaApiInstaller {
    pub(super) fn quilt(client: reqwest::Client) -> Self {
        Self {
            client,
            loader: LoaderKind::Quilt,
            meta_base: "https://meta.quiltmc.org/v3",
            default_maven: "https://maven.quiltmc.org/repository/release",
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> LauncherResult<T> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(LauncherError::LoaderApi(format!(
                "{} meta returned {} for {}",
                self.loader,
                resp.status(),
                url
            )));
        }
        Ok(resp.json::<T>().await?)
    }

    pub(super) async fn list_versions(
        &self,
        game_version: &str,
    ) -> LauncherResult<Option<Vec<InstallerEntry>>> {
        let supported: Vec<SupportedGameVersion> = self
            .get_json(&format!("{}/versions/game", self.meta_base))
            .await?;
        if !supported.iter().any(|v| v.version == game_version) {
            return Ok(None);
        }

        let loaders: Vec<LoaderListEntry> = self
            .get_json(&format!("{}/versions/loader/{}", self.meta_base, game_version))
            .await?;

        Ok(Some(
            loaders
                .into_iter()
                .map(|entry| InstallerEntry {
                    version: entry.loader.version,
                    mc_version: game_version.to_string(),
                    url: None,
                })
                .collect(),
        ))
    }

    pub(super) async fn install(
        &self,
        entry: &InstallerEntry,
        ctx: InstallContext<'_>,
    ) -> LauncherResult<()> {
        info!(
            "Installing {} {} for game version {}",
            self.loader, entry.version, entry.mc_version
        );

        let profile: MetaProfile = self
            .get_json(&format!(
                "{}/versions/loader/{}/{}/profile/json",
                self.meta_base, entry.mc_version, entry.version
            ))
            .await?;
        if profile.main_class.is_empty() {
            return Err(LauncherError::LoaderApi(format!(
                "{} profile is missing its main class",
                self.loader
            )));
        }

        let body = profile_to_patch_body(profile, self.default_maven)?;

        let mut source = instance::load_manifest(ctx.root, ctx.game).await?;
        backup_original_manifest(ctx.root, ctx.game).await?;

        // Reinstalling replaces the loader's previous patch.
        let id = self.loader.to_string();
        source.patches.retain(|p| p.id != id);
        source.patches.push(ManifestPatch {
            id,
            priority: LOADER_PATCH_PRIORITY,
            version: Some(entry.version.clone()),
            body,
        });
        instance::save_manifest(ctx.root, ctx.game, &source).await?;

        // Fetch whatever libraries the patched manifest now requires.
        let merged = effective_manifest(&source);
        let plan = plan_libraries(&merged, ctx.root, ctx.mirror, ctx.rule_ctx).await?;
        if !plan.tasks.is_empty() {
            let queue =
                DownloadQueue::new(ctx.client.clone(), MAX_PARALLEL, Some(plan.total_bytes));
            for task in plan.tasks {
                queue.add_task(task);
            }
            queue.wait().await?;
        }

        info!("{} {} installed", self.loader, entry.version);
        Ok(())
    }
}

/// Convert a meta profile into a manifest patch body: every Maven-named
/// library becomes a full artifact descriptor under its repository base.
fn profile_to_patch_body(
    profile: MetaProfile,
    default_maven: &str,
) -> LauncherResult<VersionManifest> {
    let mut libraries = Vec::with_capacity(profile.libraries.len());
    for lib in profile.libraries {
        let artifact = MavenArtifact::parse(&lib.name)?;
        let repo = lib.url.as_deref().unwrap_or(default_maven);
        libraries.push(Library {
            name: Some(lib.name.clone()),
            downloads: Some(LibraryDownloads {
                artifact: Some(RemoteArtifact {
                    path: Some(artifact.repo_path()),
                    sha1: lib.sha1,
                    size: lib.size.unwrap_or(0),
                    url: artifact.url(repo),
                }),
                classifiers: None,
            }),
            rules: None,
            natives: None,
            extra: serde_json::Map::new(),
        });
    }

    Ok(VersionManifest {
        main_class: Some(profile.main_class),
        libraries,
        arguments: profile.arguments,
        ..VersionManifest::default()
    })
}

/// Keep a one-time copy of the unpatched manifest next to the instance.
async fn backup_original_manifest(
    root: &std::path::Path,
    game: &str,
) -> LauncherResult<()> {
    let manifest = instance::manifest_path(root, game);
    let backup = instance::version_dir(root, game).join(format!("{}-original.json", game));
    if backup.exists() {
        return Ok(());
    }
    tokio::fs::copy(&manifest, &backup)
        .await
        .map_err(|source| LauncherError::Io {
            path: backup,
            source,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_libraries_become_artifact_descriptors() {
        let profile = MetaProfile {
            main_class: "net.fabricmc.loader.impl.launch.knot.KnotClient".into(),
            libraries: vec![MetaLibrary {
                name: "net.fabricmc:fabric-loader:0.16.10".into(),
                url: Some("https://maven.fabricmc.net".into()),
                sha1: Some("abc".into()),
                size: Some(123),
            }],
            arguments: None,
        };

        let body = profile_to_patch_body(profile, FABRIC_MAVEN).unwrap();
        assert_eq!(
            body.main_class.as_deref(),
            Some("net.fabricmc.loader.impl.launch.knot.KnotClient")
        );

        let artifact = body.libraries[0]
            .downloads
            .as_ref()
            .unwrap()
            .artifact
            .as_ref()
            .unwrap();
        assert_eq!(
            artifact.path.as_deref(),
            Some("net/fabricmc/fabric-loader/0.16.10/fabric-loader-0.16.10.jar")
        );
        assert_eq!(
            artifact.url,
            "https://maven.fabricmc.net/net/fabricmc/fabric-loader/0.16.10/fabric-loader-0.16.10.jar"
        );
        assert_eq!(artifact.sha1.as_deref(), Some("abc"));
        assert_eq!(artifact.size, 123);
    }

    #[test]
    fn libraries_without_a_repo_use_the_loader_default() {
        let profile = MetaProfile {
            main_class: "Knot".into(),
            libraries: vec![MetaLibrary {
                name: "net.fabricmc:intermediary:1.21.1".into(),
                url: None,
                sha1: None,
                size: None,
            }],
            arguments: None,
        };

        let body = profile_to_patch_body(profile, FABRIC_MAVEN).unwrap();
        let artifact = body.libraries[0]
            .downloads
            .as_ref()
            .unwrap()
            .artifact
            .as_ref()
            .unwrap();
        assert!(artifact.url.starts_with(FABRIC_MAVEN));
    }

    #[test]
    fn malformed_library_names_are_rejected() {
        let profile = MetaProfile {
            main_class: "Knot".into(),
            libraries: vec![MetaLibrary {
                name: "not-a-coordinate".into(),
                url: None,
                sha1: None,
                size: None,
            }],
            arguments: None,
        };
        assert!(profile_to_patch_body(profile, FABRIC_MAVEN).is_err());
    }
}
