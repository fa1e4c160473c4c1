// ─── Native Extraction ───
// Unpacks platform-tagged library archives into a flat natives
// directory. Archives are extracted fully into a scratch subdirectory,
// regular files are copied flat (minus stray packaging metadata), and
// the scratch tree is removed. Later archives may overwrite same-named
// files from earlier ones.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::platform::Platform;
use crate::core::version::schema::VersionManifest;

/// File extensions that must not land next to native binaries.
const EXCLUDED_EXTENSIONS: [&str; 3] = [".git", ".sha1", ".class"];

/// Select every library archive path tagged for the current platform:
/// the plain `natives-<os>` tag plus the arch-suffixed tag when the
/// architecture carries a suffix.
pub fn select_native_paths(manifest: &VersionManifest, platform: &Platform) -> Vec<String> {
    let plain_tag = platform.natives_tag();
    let suffixed_tag = platform.natives_tag_with_suffix();
    let mut tags = vec![plain_tag];
    if suffixed_tag != tags[0] {
        tags.push(suffixed_tag);
    }

    let mut selected = Vec::new();
    for library in &manifest.libraries {
        let Some(downloads) = &library.downloads else {
            continue;
        };

        for tag in &tags {
            if let Some(artifact) = &downloads.artifact {
                if let Some(path) = &artifact.path {
                    if path.contains(tag.as_str()) && !selected.contains(path) {
                        selected.push(path.clone());
                    }
                }
            }
            if let Some(classifiers) = &downloads.classifiers {
                if let Some(native) = classifiers.get(tag.as_str()) {
                    if let Some(path) = &native.path {
                        if !selected.contains(path) {
                            selected.push(path.clone());
                        }
                    }
                }
            }
        }
    }

    selected
}

/// Extract the selected native archives into `dest_dir` (flat, no
/// subdirectories).
pub async fn extract_natives(
    manifest: &VersionManifest,
    platform: &Platform,
    libraries_dir: &Path,
    dest_dir: &Path,
) -> LauncherResult<()> {
    let selected = select_native_paths(manifest, platform);
    debug!("Extracting {} native archives", selected.len());

    let scratch = dest_dir.join("tmp");
    tokio::fs::create_dir_all(&scratch)
        .await
        .map_err(|source| LauncherError::Io {
            path: scratch.clone(),
            source,
        })?;

    for rel_path in &selected {
        let archive_path = libraries_dir.join(rel_path);
        let bytes = tokio::fs::read(&archive_path)
            .await
            .map_err(|source| LauncherError::Io {
                path: archive_path.clone(),
                source,
            })?;

        let scratch_dir = scratch.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = unpack_archive(&bytes, &scratch_dir) {
                warn!("Cannot extract native archive {:?}: {}", archive_path, e);
            }
        })
        .await
        .map_err(|e| LauncherError::Other(format!("Task join error: {}", e)))?;
    }

    flatten_scratch(&scratch, dest_dir)?;

    tokio::fs::remove_dir_all(&scratch)
        .await
        .map_err(|source| LauncherError::Io {
            path: scratch,
            source,
        })?;

    Ok(())
}

fn unpack_archive(bytes: &[u8], dest: &Path) -> LauncherResult<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            continue;
        };
        let out_path = dest.join(rel);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| LauncherError::Io {
                path: out_path,
                source,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut out = std::fs::File::create(&out_path).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|source| LauncherError::Io {
            path: out_path,
            source,
        })?;
    }
    Ok(())
}

/// Copy every regular file under the scratch tree into the flat
/// destination, skipping stray packaging metadata.
fn flatten_scratch(scratch: &Path, dest_dir: &Path) -> LauncherResult<()> {
    let mut stack = vec![scratch.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|source| LauncherError::Io {
            path: dir.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if EXCLUDED_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext)) {
                continue;
            }
            let target = dest_dir.join(file_name);
            std::fs::copy(&path, &target).map_err(|source| LauncherError::Io {
                path: target,
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn linux_platform() -> Platform {
        Platform {
            os_name: "linux",
            arch: "x64",
            os_version: String::new(),
        }
    }

    fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn selects_classifier_and_path_tagged_archives() {
        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "libraries": [
                {
                    "name": "org.lwjgl:lwjgl:3.3.3",
                    "downloads": {"classifiers": {
                        "natives-linux": {"path": "lwjgl-natives-linux.jar", "size": 1, "url": "u"},
                        "natives-windows": {"path": "lwjgl-natives-windows.jar", "size": 1, "url": "u"}
                    }}
                },
                {
                    "name": "org.lwjgl:glfw:3.3.3",
                    "downloads": {"artifact": {
                        "path": "org/lwjgl/glfw-3.3.3-natives-linux.jar", "size": 1, "url": "u"
                    }}
                },
                {
                    "name": "a:plain:1.0",
                    "downloads": {"artifact": {"path": "a/plain-1.0.jar", "size": 1, "url": "u"}}
                }
            ]
        }))
        .unwrap();

        let selected = select_native_paths(&manifest, &linux_platform());
        assert_eq!(
            selected,
            vec![
                "lwjgl-natives-linux.jar".to_string(),
                "org/lwjgl/glfw-3.3.3-natives-linux.jar".to_string()
            ]
        );
    }

    #[test]
    fn suffixed_arch_also_matches_suffixed_tag() {
        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "libraries": [{
                "name": "org.lwjgl:lwjgl:3.3.3",
                "downloads": {"classifiers": {
                    "natives-osx-arm64": {"path": "lwjgl-natives-osx-arm64.jar", "size": 1, "url": "u"}
                }}
            }]
        }))
        .unwrap();

        let platform = Platform {
            os_name: "osx",
            arch: "arm64",
            os_version: String::new(),
        };
        let selected = select_native_paths(&manifest, &platform);
        assert_eq!(selected, vec!["lwjgl-natives-osx-arm64.jar".to_string()]);
    }

    #[tokio::test]
    async fn extraction_flattens_and_filters_metadata() {
        let root = tempfile::tempdir().unwrap();
        let libraries_dir = root.path().join("libraries");
        let dest_dir = root.path().join("natives-linux");

        let archive = build_archive(&[
            ("libfoo.so", b"foo".as_slice()),
            ("sub/dir/libbar.so", b"bar".as_slice()),
            ("META-INF/checksums.sha1", b"x".as_slice()),
            ("Entry.class", b"x".as_slice()),
        ]);
        let jar_path = libraries_dir.join("org/lwjgl/lwjgl-natives-linux.jar");
        std::fs::create_dir_all(jar_path.parent().unwrap()).unwrap();
        std::fs::write(&jar_path, archive).unwrap();

        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "libraries": [{
                "name": "org.lwjgl:lwjgl:3.3.3",
                "downloads": {"artifact": {
                    "path": "org/lwjgl/lwjgl-natives-linux.jar", "size": 1, "url": "u"
                }}
            }]
        }))
        .unwrap();

        extract_natives(&manifest, &linux_platform(), &libraries_dir, &dest_dir)
            .await
            .unwrap();

        assert!(dest_dir.join("libfoo.so").exists());
        assert!(dest_dir.join("libbar.so").exists());
        assert!(!dest_dir.join("checksums.sha1").exists());
        assert!(!dest_dir.join("Entry.class").exists());
        assert!(!dest_dir.join("tmp").exists());
    }
}
