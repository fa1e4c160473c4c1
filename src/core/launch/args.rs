// ─── Argument Templating ───
// Expands the effective manifest's argument templates into a concrete
// argument vector: JVM arguments, then the main class, then game
// arguments. Supports both the modern `arguments` shape and the legacy
// flat `minecraftArguments` string (which gets a hardcoded JVM block the
// modern format normally supplies).

use std::path::Path;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::context::LaunchContext;
use crate::core::platform;
use crate::core::rules::{evaluate, OsConstraint, Rule, RuleAction, RuleContext};
use crate::core::version::schema::{ArgumentEntry, ArgumentValue, VersionManifest};

/// Expand the manifest's argument templates into the final vector:
/// JVM arguments (manifest order) → main class → game arguments.
/// Game-argument rules see the `has_custom_resolution` feature flag.
pub fn build_command_line(
    manifest: &VersionManifest,
    ctx: &LaunchContext,
    rule_ctx: &RuleContext,
) -> LauncherResult<Vec<String>> {
    let main_class = manifest
        .main_class
        .as_deref()
        .ok_or_else(|| LauncherError::ManifestShape("missing main class".into()))?;

    let mut cmd = Vec::new();

    if let Some(arguments) = &manifest.arguments {
        expand_entries(&arguments.jvm, ctx, rule_ctx, &mut cmd);
        cmd.push(main_class.to_string());
        let game_rule_ctx = rule_ctx.clone().with_feature("has_custom_resolution", true);
        expand_entries(&arguments.game, ctx, &game_rule_ctx, &mut cmd);
    } else if let Some(legacy) = &manifest.minecraft_arguments {
        expand_entries(&legacy_jvm_entries(), ctx, rule_ctx, &mut cmd);
        cmd.push(main_class.to_string());
        for token in legacy.split_whitespace() {
            cmd.push(ctx.expand(token));
        }
        // Legacy manifests never carry resolution arguments themselves.
        if let (Some(width), Some(height)) =
            (ctx.get("resolution_width"), ctx.get("resolution_height"))
        {
            cmd.push("--width".into());
            cmd.push(width.to_string());
            cmd.push("--height".into());
            cmd.push(height.to_string());
        }
    } else {
        return Err(LauncherError::ManifestShape(
            "neither modern nor legacy argument shape present".into(),
        ));
    }

    Ok(cmd)
}

fn expand_entries(
    entries: &[ArgumentEntry],
    ctx: &LaunchContext,
    rule_ctx: &RuleContext,
    cmd: &mut Vec<String>,
) {
    for entry in entries {
        match entry {
            ArgumentEntry::Plain(template) => cmd.push(ctx.expand(template)),
            ArgumentEntry::Conditional { rules, value } => {
                if evaluate(rules, rule_ctx) {
                    for token in value.tokens() {
                        cmd.push(ctx.expand(&token));
                    }
                }
            }
        }
    }
}

/// The JVM argument block the modern format normally supplies, applied
/// to legacy manifests.
fn legacy_jvm_entries() -> Vec<ArgumentEntry> {
    fn os_rule(name: Option<&str>, arch: Option<&str>) -> Vec<Rule> {
        vec![Rule {
            action: RuleAction::Allow,
            os: Some(OsConstraint {
                name: name.map(str::to_string),
                arch: arch.map(str::to_string),
                version: None,
            }),
            features: None,
        }]
    }

    vec![
        ArgumentEntry::Conditional {
            rules: os_rule(Some("osx"), None),
            value: ArgumentValue::List(vec!["-XstartOnFirstThread".into()]),
        },
        ArgumentEntry::Conditional {
            rules: os_rule(Some("windows"), None),
            value: ArgumentValue::Single(
                "-XX:HeapDumpPath=MojangTricksIntelDriversForPerformance_javaw.exe_minecraft.exe.heapdump"
                    .into(),
            ),
        },
        ArgumentEntry::Conditional {
            rules: os_rule(None, Some("x86")),
            value: ArgumentValue::Single("-Xss1M".into()),
        },
        ArgumentEntry::Plain("-Djava.library.path=${natives_directory}".into()),
        ArgumentEntry::Plain("-Djna.tmpdir=${natives_directory}".into()),
        ArgumentEntry::Plain(
            "-Dorg.lwjgl.system.SharedLibraryExtractPath=${natives_directory}".into(),
        ),
        ArgumentEntry::Plain("-Dio.netty.native.workdir=${natives_directory}".into()),
        ArgumentEntry::Plain("-Dminecraft.launcher.brand=${launcher_name}".into()),
        ArgumentEntry::Plain("-Dminecraft.launcher.version=${launcher_version}".into()),
        ArgumentEntry::Plain("-cp".into()),
        ArgumentEntry::Plain("${classpath}".into()),
    ]
}

/// Join every rule-allowed library path plus the client jar (appended
/// last) with the platform classpath separator.
pub fn build_classpath(
    manifest: &VersionManifest,
    root: &Path,
    game: &str,
    rule_ctx: &RuleContext,
) -> String {
    let libraries_dir = root.join("libraries");
    let mut entries: Vec<String> = Vec::new();

    for library in &manifest.libraries {
        if let Some(rules) = &library.rules {
            if !evaluate(rules, rule_ctx) {
                continue;
            }
        }
        let Some(path) = library
            .downloads
            .as_ref()
            .and_then(|d| d.artifact.as_ref())
            .and_then(|a| a.path.as_ref())
        else {
            continue;
        };
        entries.push(libraries_dir.join(path).to_string_lossy().to_string());
    }

    entries.push(
        crate::core::instance::client_jar_path(root, game)
            .to_string_lossy()
            .to_string(),
    );

    entries.join(platform::classpath_separator())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn rule_ctx() -> RuleContext {
        RuleContext {
            os_name: "linux".into(),
            arch: "x64".into(),
            os_version: "6.8.0".into(),
            features: HashMap::new(),
        }
    }

    fn manifest(value: serde_json::Value) -> VersionManifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn modern_shape_orders_jvm_main_game() {
        let manifest = manifest(serde_json::json!({
            "mainClass": "net.minecraft.client.main.Main",
            "arguments": {
                "jvm": ["-Xmx${max}"],
                "game": ["--username", "${auth_player_name}"]
            }
        }));

        let mut ctx = LaunchContext::new();
        ctx.set("max", "4G");
        ctx.set("auth_player_name", "Steve");

        let cmd = build_command_line(&manifest, &ctx, &rule_ctx()).unwrap();
        assert_eq!(
            cmd,
            vec![
                "-Xmx4G",
                "net.minecraft.client.main.Main",
                "--username",
                "Steve"
            ]
        );
    }

    #[test]
    fn unresolved_placeholders_stay_verbatim() {
        let manifest = manifest(serde_json::json!({
            "mainClass": "Main",
            "arguments": {"jvm": ["-Dvalue=${unknown}"], "game": []}
        }));

        let cmd = build_command_line(&manifest, &LaunchContext::new(), &rule_ctx()).unwrap();
        assert_eq!(cmd[0], "-Dvalue=${unknown}");
    }

    #[test]
    fn denied_conditional_block_contributes_nothing() {
        let manifest = manifest(serde_json::json!({
            "mainClass": "Main",
            "arguments": {
                "jvm": [{
                    "rules": [{"action": "deny", "os": {"name": "linux"}}],
                    "value": "-Dtest=1"
                }],
                "game": []
            }
        }));

        let cmd = build_command_line(&manifest, &LaunchContext::new(), &rule_ctx()).unwrap();
        assert_eq!(cmd, vec!["Main"]);
    }

    #[test]
    fn allowed_list_value_appends_every_token() {
        let manifest = manifest(serde_json::json!({
            "mainClass": "Main",
            "arguments": {
                "jvm": [],
                "game": [{
                    "rules": [{"action": "allow", "features": {"has_custom_resolution": true}}],
                    "value": ["--width", "${resolution_width}", "--height", "${resolution_height}"]
                }]
            }
        }));

        let mut ctx = LaunchContext::new();
        ctx.set("resolution_width", "854");
        ctx.set("resolution_height", "480");

        let cmd = build_command_line(&manifest, &ctx, &rule_ctx()).unwrap();
        assert_eq!(cmd, vec!["Main", "--width", "854", "--height", "480"]);
    }

    #[test]
    fn legacy_shape_gets_the_hardcoded_jvm_block() {
        let manifest = manifest(serde_json::json!({
            "mainClass": "net.minecraft.client.Minecraft",
            "minecraftArguments": "--username ${auth_player_name} --gameDir ${game_directory}"
        }));

        let mut ctx = LaunchContext::new();
        ctx.set("auth_player_name", "Steve");
        ctx.set("game_directory", "/mc");
        ctx.set("natives_directory", "/mc/natives");
        ctx.set("launcher_name", "CraftCLI");
        ctx.set("launcher_version", "0.1.0");
        ctx.set("classpath", "a.jar:b.jar");
        ctx.set("resolution_width", "854");
        ctx.set("resolution_height", "480");

        let cmd = build_command_line(&manifest, &ctx, &rule_ctx()).unwrap();

        // Platform-conditional entries for other OSes are absent on linux.
        assert!(!cmd.contains(&"-XstartOnFirstThread".to_string()));
        assert!(!cmd.iter().any(|a| a.contains("HeapDumpPath")));

        assert!(cmd.contains(&"-Djava.library.path=/mc/natives".to_string()));
        let cp_flag = cmd.iter().position(|a| a == "-cp").unwrap();
        assert_eq!(cmd[cp_flag + 1], "a.jar:b.jar");

        let main = cmd.iter().position(|a| a == "net.minecraft.client.Minecraft").unwrap();
        assert!(main > cp_flag);
        assert_eq!(cmd[main + 1], "--username");
        assert_eq!(cmd[main + 2], "Steve");

        // Resolution extras are appended after the legacy game arguments.
        assert_eq!(
            cmd[cmd.len() - 4..].to_vec(),
            vec!["--width", "854", "--height", "480"]
        );
    }

    #[test]
    fn missing_both_shapes_is_fatal() {
        let manifest = manifest(serde_json::json!({ "mainClass": "Main" }));
        let err = build_command_line(&manifest, &LaunchContext::new(), &rule_ctx()).unwrap_err();
        assert!(matches!(err, LauncherError::ManifestShape(_)));
    }

    #[test]
    fn missing_main_class_is_fatal() {
        let manifest = manifest(serde_json::json!({
            "arguments": {"jvm": [], "game": []}
        }));
        let err = build_command_line(&manifest, &LaunchContext::new(), &rule_ctx()).unwrap_err();
        assert!(matches!(err, LauncherError::ManifestShape(_)));
    }

    #[test]
    fn classpath_ends_with_the_client_jar() {
        let manifest = manifest(serde_json::json!({
            "libraries": [
                {"name": "a:b:1.0", "downloads": {"artifact": {
                    "path": "a/b/1.0/b-1.0.jar", "size": 1, "url": "u"}}},
                {"name": "a:osx-only:1.0",
                 "rules": [{"action": "allow", "os": {"name": "osx"}}],
                 "downloads": {"artifact": {
                    "path": "a/osx-only/1.0/osx-only-1.0.jar", "size": 1, "url": "u"}}}
            ]
        }));

        let classpath = build_classpath(&manifest, Path::new("/mc"), "g", &rule_ctx());
        let entries: Vec<&str> = classpath.split(platform::classpath_separator()).collect();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("b-1.0.jar"));
        assert!(entries[1].ends_with("g.jar"));
        assert!(!classpath.contains("osx-only"));
    }
}
