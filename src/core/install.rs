// ─── Instance Install ───
// Creates a new game instance from a catalog entry: persist the raw
// version JSON, run the full fetch plan through the queue, and make
// sure the root carries a launcher profiles stub.

use std::path::Path;

use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fetch::planner::plan_fetch;
use crate::core::fetch::queue::DownloadQueue;
use crate::core::instance;
use crate::core::mirror::Mirror;
use crate::core::platform::Platform;
use crate::core::rules::RuleContext;
use crate::core::version::VersionManifest;

const MAX_PARALLEL: usize = 16;

/// Download and install a game version under `root` as instance `game`.
pub async fn install_game(
    client: &reqwest::Client,
    version_url: &str,
    root: &Path,
    game: &str,
    mirror: Mirror,
) -> LauncherResult<()> {
    if instance::manifest_path(root, game).exists() {
        return Err(LauncherError::GameAlreadyExists(game.to_string()));
    }

    let url = mirror.rewrite(version_url);
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(LauncherError::DownloadFailed {
            url,
            status: response.status().as_u16(),
        });
    }
    let raw = response.text().await?;
    let manifest: VersionManifest = serde_json::from_str(&raw)?;

    // Persist the raw document so fields this model does not interpret
    // survive byte-for-byte.
    let manifest_path = instance::manifest_path(root, game);
    if let Some(parent) = manifest_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(&manifest_path, &raw)
        .await
        .map_err(|source| LauncherError::Io {
            path: manifest_path,
            source,
        })?;

    let platform = Platform::current();
    let rule_ctx = RuleContext::from_platform(&platform);
    let plan = plan_fetch(client, &manifest, root, game, mirror, &rule_ctx).await?;

    info!(
        "Installing {}: {} artifacts, {} bytes",
        game,
        plan.tasks.len(),
        plan.total_bytes
    );

    if !plan.tasks.is_empty() {
        let queue = DownloadQueue::new(client.clone(), MAX_PARALLEL, Some(plan.total_bytes));
        for task in plan.tasks {
            queue.add_task(task);
        }
        queue.wait().await?;
    }

    instance::ensure_launcher_profiles(root).await?;
    info!("Installed {}", game);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha1::{Digest, Sha1};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sha1_hex(data: &[u8]) -> String {
        let mut hasher = Sha1::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    #[tokio::test]
    async fn installs_a_version_end_to_end() {
        let client_jar = b"client-jar-bytes".to_vec();
        let library = b"library-bytes".to_vec();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/client.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(client_jar.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lib.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(library.clone()))
            .mount(&server)
            .await;

        let version_json = serde_json::json!({
            "id": "1.21.1",
            "mainClass": "net.minecraft.client.main.Main",
            "downloads": {"client": {
                "sha1": sha1_hex(&client_jar),
                "size": client_jar.len(),
                "url": format!("{}/client.jar", server.uri())
            }},
            "libraries": [{
                "name": "a:b:1.0",
                "downloads": {"artifact": {
                    "path": "a/b/1.0/b-1.0.jar",
                    "sha1": sha1_hex(&library),
                    "size": library.len(),
                    "url": format!("{}/lib.jar", server.uri())
                }}
            }]
        });
        Mock::given(method("GET"))
            .and(path("/1.21.1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(version_json.to_string()))
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        install_game(
            &client,
            &format!("{}/1.21.1.json", server.uri()),
            root.path(),
            "my-game",
            Mirror::Official,
        )
        .await
        .unwrap();

        assert!(root.path().join("versions/my-game/my-game.json").exists());
        assert_eq!(
            std::fs::read(root.path().join("versions/my-game/my-game.jar")).unwrap(),
            client_jar
        );
        assert_eq!(
            std::fs::read(root.path().join("libraries/a/b/1.0/b-1.0.jar")).unwrap(),
            library
        );
        assert!(root.path().join("launcher_profiles.json").exists());

        // A second plan over the same directory finds the library
        // up to date (the client jar alone is always re-enqueued).
        let manifest = instance::load_manifest(root.path(), "my-game").await.unwrap();
        let platform = Platform::current();
        let rule_ctx = RuleContext::from_platform(&platform);
        let plan = plan_fetch(
            &client,
            &manifest,
            root.path(),
            "my-game",
            Mirror::Official,
            &rule_ctx,
        )
        .await
        .unwrap();
        assert_eq!(plan.tasks.len(), 1);
        assert!(plan.tasks[0].dest.ends_with("my-game.jar"));
    }

    #[tokio::test]
    async fn refuses_to_overwrite_an_existing_instance() {
        let root = tempfile::tempdir().unwrap();
        let manifest_path = root.path().join("versions/taken/taken.json");
        std::fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
        std::fs::write(&manifest_path, "{}").unwrap();

        let client = reqwest::Client::new();
        let err = install_game(
            &client,
            "http://127.0.0.1:9/unused.json",
            root.path(),
            "taken",
            Mirror::Official,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LauncherError::GameAlreadyExists(_)));
    }
}
