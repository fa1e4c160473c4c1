use std::path::Path;

use crate::core::config::LauncherConfig;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::mirror::Mirror;

pub fn run_set_mirror(mirror: &str, config: &mut LauncherConfig) -> LauncherResult<()> {
    config.mirror = match mirror.to_ascii_lowercase().as_str() {
        "official" => Mirror::Official,
        "bmclapi" => Mirror::Bmclapi,
        other => {
            return Err(LauncherError::Other(format!(
                "unknown mirror: {} (expected official or bmclapi)",
                other
            )))
        }
    };
    config.save()?;
    println!("Mirror set to {}", config.mirror);
    Ok(())
}

pub fn run_set_java(path: &Path, config: &mut LauncherConfig) -> LauncherResult<()> {
    config.java = Some(path.to_path_buf());
    config.save()?;
    println!("Default Java set to {:?}", path);
    Ok(())
}

pub fn run_add_root(path: &Path, config: &mut LauncherConfig) -> LauncherResult<()> {
    if !path.is_dir() {
        return Err(LauncherError::Other(format!(
            "{:?} is not an existing directory",
            path
        )));
    }
    let resolved = std::fs::canonicalize(path).map_err(|source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if config.roots.contains(&resolved) {
        return Err(LauncherError::Other(format!(
            "{:?} is already configured",
            resolved
        )));
    }
    config.roots.push(resolved.clone());
    config.save()?;
    println!("Added install root {:?}", resolved);
    Ok(())
}

pub fn run_list_roots(config: &LauncherConfig) -> LauncherResult<()> {
    for root in &config.roots {
        println!("{}", root.display());
    }
    Ok(())
}
