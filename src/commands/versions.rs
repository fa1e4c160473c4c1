use crate::core::config::LauncherConfig;
use crate::core::error::LauncherResult;
use crate::core::http::build_http_client;
use crate::core::version::VersionCatalog;

/// Print the remote catalog, releases only unless asked otherwise.
pub async fn run_versions(snapshots: bool, config: &LauncherConfig) -> LauncherResult<()> {
    let client = build_http_client()?;
    let catalog = VersionCatalog::fetch(&client, config.mirror).await?;

    for entry in catalog
        .versions
        .iter()
        .filter(|v| snapshots || v.is_release())
    {
        println!(
            "{:<24} {:<10} {}",
            entry.id, entry.version_type, entry.release_time
        );
    }
    Ok(())
}
