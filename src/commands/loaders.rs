use std::path::Path;

use crate::core::config::LauncherConfig;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::instance;
use crate::core::loaders::{
    detect_loader, installed_patch_version, remove_patch, InstallContext, Installer, LoaderKind,
};
use crate::core::platform::Platform;
use crate::core::rules::RuleContext;
use crate::core::version::effective_manifest;

pub async fn run_loader_versions(loader: &str, game_version: &str) -> LauncherResult<()> {
    let kind: LoaderKind = loader.parse()?;
    let client = build_http_client()?;
    let installer = Installer::new(kind, client);

    match installer.list_versions(game_version).await? {
        None => println!("No {} builds for game version {}", kind, game_version),
        Some(entries) => {
            for entry in entries {
                println!("{}", entry.version);
            }
        }
    }
    Ok(())
}

pub async fn run_loader_install(
    loader: &str,
    game: &str,
    loader_version: Option<&str>,
    root: &Path,
    config: &LauncherConfig,
) -> LauncherResult<()> {
    let kind: LoaderKind = loader.parse()?;
    let source = instance::load_manifest(root, game).await?;

    if let Some(existing) = detect_loader(&effective_manifest(&source)) {
        if existing != kind {
            return Err(LauncherError::Loader(format!(
                "instance '{}' already uses {}; remove it first",
                game, existing
            )));
        }
    }

    let game_version = source
        .id
        .clone()
        .ok_or_else(|| LauncherError::ManifestShape("manifest has no version id".into()))?;

    let client = build_http_client()?;
    let installer = Installer::new(kind, client.clone());

    let entries = installer
        .list_versions(&game_version)
        .await?
        .ok_or_else(|| {
            LauncherError::Loader(format!(
                "no {} builds for game version {}",
                kind, game_version
            ))
        })?;

    let entry = match loader_version {
        Some(wanted) => entries
            .into_iter()
            .find(|e| e.version == wanted)
            .ok_or_else(|| {
                LauncherError::Loader(format!("{} has no build {}", kind, wanted))
            })?,
        None => entries
            .into_iter()
            .next()
            .ok_or_else(|| LauncherError::Loader(format!("{} lists no builds", kind)))?,
    };

    let platform = Platform::current();
    let rule_ctx = RuleContext::from_platform(&platform);
    installer
        .install(
            &entry,
            InstallContext {
                root,
                game,
                mirror: config.mirror,
                client: &client,
                rule_ctx: &rule_ctx,
            },
        )
        .await?;

    println!("Installed {} {} on '{}'", kind, entry.version, game);
    Ok(())
}

pub async fn run_loader_status(game: &str, root: &Path) -> LauncherResult<()> {
    let source = instance::load_manifest(root, game).await?;
    match detect_loader(&effective_manifest(&source)) {
        Some(kind) => {
            let version = installed_patch_version(&source, kind).unwrap_or_else(|| "?".into());
            println!("{}: {} {}", game, kind, version);
        }
        None => println!("{}: vanilla", game),
    }
    Ok(())
}

pub async fn run_loader_remove(game: &str, root: &Path) -> LauncherResult<()> {
    let mut source = instance::load_manifest(root, game).await?;
    let kind = detect_loader(&effective_manifest(&source)).ok_or_else(|| {
        LauncherError::Loader(format!("instance '{}' has no loader installed", game))
    })?;

    remove_patch(&mut source, kind)?;
    instance::save_manifest(root, game, &source).await?;
    println!("Removed {} from '{}'", kind, game);
    Ok(())
}
