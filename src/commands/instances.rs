use std::path::Path;

use crate::core::config::LauncherConfig;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::install::install_game;
use crate::core::instance::{self, GameSettings};
use crate::core::launch::{launch, LaunchOptions};
use crate::core::loaders::{detect_loader, installed_patch_version};
use crate::core::version::effective_manifest;
use crate::core::version::VersionCatalog;

/// Instance names become directory names; keep them boring.
fn validate_instance_name(name: &str) -> LauncherResult<()> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && name != "."
        && name != ".."
        && !name.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(LauncherError::Other(format!(
            "invalid instance name: {}",
            name
        )))
    }
}

pub async fn run_install(
    version: &str,
    name: Option<&str>,
    root: &Path,
    config: &LauncherConfig,
) -> LauncherResult<()> {
    let game = name.unwrap_or(version);
    validate_instance_name(game)?;

    let client = build_http_client()?;
    let catalog = VersionCatalog::fetch(&client, config.mirror).await?;
    let entry = catalog.find(version).ok_or_else(|| {
        LauncherError::Other(format!("version {} not found in the catalog", version))
    })?;

    install_game(&client, &entry.url, root, game, config.mirror).await?;
    println!("Installed {} as instance '{}'", version, game);
    Ok(())
}

pub async fn run_list(root: &Path) -> LauncherResult<()> {
    let games = instance::list_games(root).await?;
    if games.is_empty() {
        println!("No instances installed under {:?}", root);
        return Ok(());
    }

    for game in games {
        let source = match instance::load_manifest(root, &game).await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Skipping {} (unreadable manifest): {}", game, e);
                continue;
            }
        };
        let merged = effective_manifest(&source);
        let version = source.id.as_deref().unwrap_or("unknown").to_string();

        match detect_loader(&merged) {
            Some(kind) => {
                let loader_version = installed_patch_version(&source, kind)
                    .unwrap_or_else(|| "?".into());
                println!("{}  ({}, {} {})", game, version, kind, loader_version);
            }
            None => println!("{}  ({})", game, version),
        }
    }
    Ok(())
}

pub async fn run_launch(
    game: &str,
    user_name: Option<&str>,
    root: &Path,
    config: &LauncherConfig,
) -> LauncherResult<()> {
    if !instance::manifest_path(root, game).exists() {
        return Err(LauncherError::GameNotFound(game.to_string()));
    }
    if config.users.is_empty() {
        return Err(LauncherError::Other(
            "no users configured; add one with `craftcli users add <name>`".into(),
        ));
    }

    let user = match user_name {
        Some(name) => config
            .find_user(name)
            .ok_or_else(|| LauncherError::Other(format!("unknown user: {}", name)))?,
        None => &config.users[0],
    };

    let settings = GameSettings::load(root, game).await?;
    let client = build_http_client()?;

    let opts = LaunchOptions {
        root: root.to_path_buf(),
        game: game.to_string(),
        user: user.clone(),
        settings,
        mirror: config.mirror,
        default_java: config.java.clone(),
    };

    let status = launch(&client, &opts).await?;
    if status.success() {
        println!("Game exited cleanly");
    }
    Ok(())
}

pub async fn run_delete(game: &str, root: &Path) -> LauncherResult<()> {
    instance::delete_game(root, game).await?;
    println!("Deleted instance '{}'", game);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_names_reject_path_tricks() {
        assert!(validate_instance_name("my-game_1.21").is_ok());
        assert!(validate_instance_name("").is_err());
        assert!(validate_instance_name("..").is_err());
        assert!(validate_instance_name("a/b").is_err());
        assert!(validate_instance_name(".hidden").is_err());
        assert!(validate_instance_name("has space").is_err());
    }
}
