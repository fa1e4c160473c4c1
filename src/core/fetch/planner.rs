// ─── Fetch Planner ───
// Computes the set of missing or stale artifacts for an effective
// manifest as download tasks: asset objects, libraries (primary and
// classifier artifacts), and the client jar. Existing files are kept
// when their hash matches; entries without a hash are trusted once
// present. Tasks come out sorted by descending size so the largest
// transfers start first under the queue's fixed concurrency.

use std::path::Path;

use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::core::assets::AssetIndex;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fetch::queue::DownloadTask;
use crate::core::mirror::Mirror;
use crate::core::rules::{evaluate, RuleContext};
use crate::core::version::schema::{RemoteArtifact, VersionManifest};

/// The planned task set plus the byte total used for ETA display.
#[derive(Debug, Default)]
pub struct FetchPlan {
    pub tasks: Vec<DownloadTask>,
    pub total_bytes: u64,
}

impl FetchPlan {
    fn push(&mut self, task: DownloadTask) {
        self.total_bytes += task.size;
        self.tasks.push(task);
    }

    fn merge(&mut self, other: FetchPlan) {
        self.total_bytes += other.total_bytes;
        self.tasks.extend(other.tasks);
    }

    /// Largest expected transfers first.
    fn sort_by_size(&mut self) {
        self.tasks.sort_by(|a, b| b.size.cmp(&a.size));
    }
}

/// Plan the full fetch for one game instance: asset index + objects,
/// libraries, and the client jar (always re-enqueued).
pub async fn plan_fetch(
    client: &reqwest::Client,
    manifest: &VersionManifest,
    root: &Path,
    game: &str,
    mirror: Mirror,
    rule_ctx: &RuleContext,
) -> LauncherResult<FetchPlan> {
    let mut plan = FetchPlan::default();

    if let Some(index_ref) = &manifest.asset_index {
        let assets = plan_assets(client, &index_ref.url, &index_ref.id, root, mirror).await?;
        plan.merge(assets);
    }

    plan.merge(plan_libraries(manifest, root, mirror, rule_ctx).await?);

    if let Some(client_dl) = manifest.downloads.as_ref().and_then(|d| d.client.as_ref()) {
        plan.push(client_jar_task(client_dl, root, game, mirror));
    }

    plan.sort_by_size();
    Ok(plan)
}

/// Fetch the asset index document, persist it into the local index
/// store, and plan a task for every referenced object that is absent or
/// stale on disk.
pub async fn plan_assets(
    client: &reqwest::Client,
    index_url: &str,
    index_id: &str,
    root: &Path,
    mirror: Mirror,
) -> LauncherResult<FetchPlan> {
    let url = mirror.rewrite(index_url);
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(LauncherError::DownloadFailed {
            url,
            status: response.status().as_u16(),
        });
    }
    let index_text = response.text().await?;
    let index: AssetIndex = serde_json::from_str(&index_text)?;

    let assets_dir = root.join("assets");
    let indexes_dir = assets_dir.join("indexes");
    tokio::fs::create_dir_all(&indexes_dir)
        .await
        .map_err(|source| LauncherError::Io {
            path: indexes_dir.clone(),
            source,
        })?;
    let index_path = indexes_dir.join(format!("{}.json", index_id));
    tokio::fs::write(&index_path, &index_text)
        .await
        .map_err(|source| LauncherError::Io {
            path: index_path,
            source,
        })?;

    let mut plan = FetchPlan::default();
    for (name, object) in &index.objects {
        let dest = object.local_path(&assets_dir, index_id, name);
        if needs_fetch(&dest, Some(&object.hash)).await? {
            plan.push(
                DownloadTask::new(mirror.rewrite(&object.url()), dest, object.size)
                    .with_sha1(object.hash.clone()),
            );
        }
    }

    debug!(
        "Asset plan for index {}: {} of {} objects to fetch",
        index_id,
        plan.tasks.len(),
        index.objects.len()
    );
    Ok(plan)
}

/// Plan tasks for every rule-allowed library: the primary artifact plus
/// every classifier variant it declares.
pub async fn plan_libraries(
    manifest: &VersionManifest,
    root: &Path,
    mirror: Mirror,
    rule_ctx: &RuleContext,
) -> LauncherResult<FetchPlan> {
    let libraries_dir = root.join("libraries");
    let mut plan = FetchPlan::default();

    for library in &manifest.libraries {
        if let Some(rules) = &library.rules {
            if !evaluate(rules, rule_ctx) {
                debug!("Skipping library (platform rule): {:?}", library.name);
                continue;
            }
        }

        let Some(downloads) = &library.downloads else {
            continue;
        };

        if let Some(artifact) = &downloads.artifact {
            if let Some(task) = artifact_task(artifact, &libraries_dir, mirror).await? {
                plan.push(task);
            }
        }

        if let Some(classifiers) = &downloads.classifiers {
            for artifact in classifiers.values() {
                if let Some(task) = artifact_task(artifact, &libraries_dir, mirror).await? {
                    plan.push(task);
                }
            }
        }
    }

    Ok(plan)
}

async fn artifact_task(
    artifact: &RemoteArtifact,
    libraries_dir: &Path,
    mirror: Mirror,
) -> LauncherResult<Option<DownloadTask>> {
    let Some(rel_path) = &artifact.path else {
        return Ok(None);
    };
    let dest = libraries_dir.join(rel_path);

    if !needs_fetch(&dest, artifact.sha1.as_deref()).await? {
        return Ok(None);
    }

    let mut task = DownloadTask::new(mirror.rewrite(&artifact.url), dest, artifact.size);
    if let Some(sha1) = &artifact.sha1 {
        task = task.with_sha1(sha1.clone());
    }
    Ok(Some(task))
}

/// The client jar is always re-enqueued, no existence check.
fn client_jar_task(
    client_dl: &RemoteArtifact,
    root: &Path,
    game: &str,
    mirror: Mirror,
) -> DownloadTask {
    let dest = root
        .join("versions")
        .join(game)
        .join(format!("{}.jar", game));
    let mut task = DownloadTask::new(mirror.rewrite(&client_dl.url), dest, client_dl.size);
    if let Some(sha1) = &client_dl.sha1 {
        task = task.with_sha1(sha1.clone());
    }
    task
}

/// Decide whether a local file needs (re-)fetching. Absent files always
/// do; present files without a declared hash never do; a hash mismatch
/// warns and triggers a redownload.
async fn needs_fetch(dest: &Path, expected_sha1: Option<&str>) -> LauncherResult<bool> {
    if !dest.exists() {
        return Ok(true);
    }
    let Some(expected) = expected_sha1 else {
        return Ok(false);
    };

    let actual = file_sha1(dest).await?;
    if actual == expected {
        Ok(false)
    } else {
        warn!(
            "Hash mismatch for {:?} (expected {}, got {}), scheduling redownload",
            dest, expected, actual
        );
        Ok(true)
    }
}

/// SHA-1 of an existing local file.
pub async fn file_sha1(path: &Path) -> LauncherResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let mut hasher = Sha1::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
