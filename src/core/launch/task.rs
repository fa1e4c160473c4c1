// ─── Launch Task ───
// Brings an instance to launch readiness and spawns the game process:
// reconcile assets and libraries, extract natives, write the logging
// override, build the launch context, assemble the argument vector, and
// hand the command to the child process with inherited stdio.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fetch::planner::{plan_assets, plan_libraries, FetchPlan};
use crate::core::fetch::queue::DownloadQueue;
use crate::core::instance::{self, GameSettings};
use crate::core::launch::args::{build_classpath, build_command_line};
use crate::core::launch::context::LaunchContext;
use crate::core::mirror::Mirror;
use crate::core::natives::extract_natives;
use crate::core::platform::{self, Platform};
use crate::core::rules::RuleContext;
use crate::core::users::User;
use crate::core::version::{effective_manifest, VersionManifest};

const LAUNCHER_NAME: &str = "CraftCLI";
const LAUNCHER_VERSION: &str = env!("CARGO_PKG_VERSION");
const MAX_PARALLEL: usize = 16;

/// Logging configuration written next to the instance before every
/// launch, overriding whatever the manifest references.
const LOG4J2_CONFIG: &str = include_str!("log4j2.xml");

/// Everything launch assembly needs, resolved by the caller. The core
/// never reads config stores itself.
pub struct LaunchOptions {
    pub root: PathBuf,
    pub game: String,
    pub user: User,
    pub settings: GameSettings,
    pub mirror: Mirror,
    pub default_java: Option<PathBuf>,
}

/// Run the full launch pipeline and block until the game exits.
pub async fn launch(
    client: &reqwest::Client,
    opts: &LaunchOptions,
) -> LauncherResult<ExitStatus> {
    let source = instance::load_manifest(&opts.root, &opts.game).await?;
    let manifest = effective_manifest(&source);

    let platform = Platform::current();
    let rule_ctx = RuleContext::from_platform(&platform);

    // Reconcile assets and libraries against the manifest before every
    // launch; a clean install is a no-op here.
    let mut plan = FetchPlan::default();
    if let Some(index_ref) = &manifest.asset_index {
        let assets = plan_assets(
            client,
            &index_ref.url,
            &index_ref.id,
            &opts.root,
            opts.mirror,
        )
        .await?;
        plan.tasks.extend(assets.tasks);
        plan.total_bytes += assets.total_bytes;
    }
    let libraries = plan_libraries(&manifest, &opts.root, opts.mirror, &rule_ctx).await?;
    plan.tasks.extend(libraries.tasks);
    plan.total_bytes += libraries.total_bytes;

    if !plan.tasks.is_empty() {
        info!("Fetching {} missing artifacts before launch", plan.tasks.len());
        let queue = DownloadQueue::new(client.clone(), MAX_PARALLEL, Some(plan.total_bytes));
        for task in plan.tasks.drain(..) {
            queue.add_task(task);
        }
        queue.wait().await?;
    }

    info!("Extracting natives");
    let natives_dir = instance::natives_dir(&opts.root, &opts.game, &platform);
    extract_natives(&manifest, &platform, &opts.root.join("libraries"), &natives_dir).await?;

    let log4j2_path = write_logging_config(&opts.root, &opts.game).await?;

    let classpath = build_classpath(&manifest, &opts.root, &opts.game, &rule_ctx);
    let ctx = build_launch_context(opts, &manifest, &natives_dir, &classpath);

    let mut cmd = fixed_jvm_args(&opts.settings);
    if let Some(logging_arg) = manifest
        .logging
        .as_ref()
        .and_then(|l| l.client.as_ref())
        .map(|c| c.argument.clone())
    {
        cmd.push(logging_arg.replace("${path}", &log4j2_path.to_string_lossy()));
    }
    cmd.push(format!(
        "-Dminecraft.client.jar={}",
        instance::client_jar_path(&opts.root, &opts.game).to_string_lossy()
    ));
    cmd.extend(build_command_line(&manifest, &ctx, &rule_ctx)?);

    let java_bin = resolve_java(&opts.settings, opts.default_java.as_deref());
    let cwd = working_dir(opts);

    info!("Launching {} with {:?}", opts.game, java_bin);
    debug!("Arguments: {:?}", cmd);

    let mut child = std::process::Command::new(&java_bin)
        .args(&cmd)
        .current_dir(&cwd)
        .spawn()
        .map_err(|e| LauncherError::JavaExecution(e.to_string()))?;

    let status = child
        .wait()
        .map_err(|e| LauncherError::JavaExecution(e.to_string()))?;

    if !status.success() {
        report_abnormal_exit(&status, &java_bin, &manifest);
    }

    Ok(status)
}

/// Fixed JVM flags every launch gets, memory sizing first.
fn fixed_jvm_args(settings: &GameSettings) -> Vec<String> {
    vec![
        format!("-Xmn{}", settings.ram.min),
        format!("-Xmx{}", settings.ram.max),
        "-XX:+UnlockExperimentalVMOptions".into(),
        "-XX:+UseG1GC".into(),
        "-XX:G1NewSizePercent=20".into(),
        "-XX:G1ReservePercent=20".into(),
        "-XX:MaxGCPauseMillis=50".into(),
        "-XX:G1HeapRegionSize=32m".into(),
        "-XX:-UseAdaptiveSizePolicy".into(),
        "-XX:-OmitStackTraceInFastThrow".into(),
        "-XX:-DontCompileHugeMethods".into(),
        "-Dfml.ignoreInvalidMinecraftCertificates=true".into(),
        "-Dlog4j2.formatMsgNoLookups=true".into(),
    ]
}

fn build_launch_context(
    opts: &LaunchOptions,
    manifest: &VersionManifest,
    natives_dir: &Path,
    classpath: &str,
) -> LaunchContext {
    let mut ctx = LaunchContext::new();

    let version_name = manifest.id.clone().unwrap_or_else(|| opts.game.clone());
    ctx.set("version_name", version_name);
    ctx.set(
        "version_type",
        format!("{} v{}", LAUNCHER_NAME, LAUNCHER_VERSION),
    );
    ctx.set("game_directory", working_dir(opts).to_string_lossy());
    ctx.set(
        "library_directory",
        opts.root.join("libraries").to_string_lossy(),
    );
    ctx.set("classpath_separator", platform::classpath_separator());
    ctx.set("assets_root", opts.root.join("assets").to_string_lossy());
    ctx.set(
        "assets_index_name",
        manifest.assets.clone().unwrap_or_else(|| "legacy".into()),
    );
    ctx.set("natives_directory", natives_dir.to_string_lossy());
    ctx.set("launcher_name", LAUNCHER_NAME);
    ctx.set("launcher_version", LAUNCHER_VERSION);
    ctx.set("classpath", classpath);
    ctx.set("resolution_width", opts.settings.size.width.to_string());
    ctx.set("resolution_height", opts.settings.size.height.to_string());

    ctx.set("auth_player_name", opts.user.name.clone());
    ctx.set("auth_uuid", opts.user.uuid.clone());
    ctx.set(
        "auth_access_token",
        opts.user.access_token.clone().unwrap_or_else(|| "0".into()),
    );
    ctx.set("user_properties", "{}");
    ctx.set("user_type", "msa");

    ctx
}

/// Isolated instances run inside their own version directory.
fn working_dir(opts: &LaunchOptions) -> PathBuf {
    if opts.settings.isolated {
        instance::version_dir(&opts.root, &opts.game)
    } else {
        opts.root.clone()
    }
}

/// Java binary precedence: instance settings, then launcher default,
/// then whatever `java` resolves to on PATH.
fn resolve_java(settings: &GameSettings, default_java: Option<&Path>) -> PathBuf {
    settings
        .java
        .clone()
        .or_else(|| default_java.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("java"))
}

async fn write_logging_config(root: &Path, game: &str) -> LauncherResult<PathBuf> {
    let path = instance::version_dir(root, game).join("log4j2-craftcli.xml");
    tokio::fs::write(&path, LOG4J2_CONFIG)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Advisory diagnostics on a non-zero child exit: report the exit code,
/// the runtime's own version banner, and the manifest's recommendation.
fn report_abnormal_exit(status: &ExitStatus, java_bin: &Path, manifest: &VersionManifest) {
    warn!("Game exited abnormally: {}", status);
    eprintln!("---");
    eprintln!("exit status: {}", status);

    match std::process::Command::new(java_bin).arg("--version").output() {
        Ok(output) => {
            let banner = String::from_utf8_lossy(&output.stdout);
            eprintln!("java runtime:\n{}", banner.trim_end());
        }
        Err(e) => eprintln!("could not query java version: {}", e),
    }

    if let Some(java_version) = &manifest.java_version {
        eprintln!(
            "recommended java version for this game: {}",
            java_version.major_version
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instance::{RamSettings, WindowSize};

    fn options(root: &Path) -> LaunchOptions {
        LaunchOptions {
            root: root.to_path_buf(),
            game: "test-game".into(),
            user: User::offline("Steve"),
            settings: GameSettings::default(),
            mirror: Mirror::Official,
            default_java: None,
        }
    }

    #[test]
    fn fixed_jvm_args_lead_with_memory_sizing() {
        let settings = GameSettings {
            ram: RamSettings {
                min: "2G".into(),
                max: "8G".into(),
            },
            ..GameSettings::default()
        };
        let args = fixed_jvm_args(&settings);
        assert_eq!(args[0], "-Xmn2G");
        assert_eq!(args[1], "-Xmx8G");
        assert!(args.contains(&"-Dlog4j2.formatMsgNoLookups=true".to_string()));
    }

    #[test]
    fn java_resolution_prefers_instance_settings() {
        let mut settings = GameSettings::default();
        settings.java = Some(PathBuf::from("/opt/jdk21/bin/java"));
        assert_eq!(
            resolve_java(&settings, Some(Path::new("/usr/bin/java"))),
            PathBuf::from("/opt/jdk21/bin/java")
        );

        settings.java = None;
        assert_eq!(
            resolve_java(&settings, Some(Path::new("/usr/bin/java"))),
            PathBuf::from("/usr/bin/java")
        );
        assert_eq!(resolve_java(&settings, None), PathBuf::from("java"));
    }

    #[test]
    fn isolated_instances_switch_the_working_directory() {
        let root = tempfile::tempdir().unwrap();
        let mut opts = options(root.path());
        assert_eq!(working_dir(&opts), root.path());

        opts.settings.isolated = true;
        assert_eq!(
            working_dir(&opts),
            root.path().join("versions").join("test-game")
        );
    }

    #[test]
    fn launch_context_exposes_auth_and_layout_entries() {
        let root = tempfile::tempdir().unwrap();
        let opts = options(root.path());
        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "id": "1.21.1",
            "assets": "17"
        }))
        .unwrap();

        let ctx = build_launch_context(
            &opts,
            &manifest,
            Path::new("/mc/natives-linux"),
            "a.jar:client.jar",
        );

        assert_eq!(ctx.get("version_name"), Some("1.21.1"));
        assert_eq!(ctx.get("assets_index_name"), Some("17"));
        assert_eq!(ctx.get("auth_player_name"), Some("Steve"));
        assert_eq!(ctx.get("auth_access_token"), Some("0"));
        assert_eq!(ctx.get("classpath"), Some("a.jar:client.jar"));
        assert_eq!(ctx.get("natives_directory"), Some("/mc/natives-linux"));
    }

    #[tokio::test]
    async fn logging_config_lands_next_to_the_instance() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(instance::version_dir(root.path(), "g")).unwrap();

        let path = write_logging_config(root.path(), "g").await.unwrap();
        assert!(path.ends_with("log4j2-craftcli.xml"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<Configuration"));
    }
}
