// ─── Platform ───
// Platform identity as Mojang manifests spell it: OS name, architecture
// tag, and the arch suffix used for native-library directories.

use std::collections::HashMap;

/// Platform snapshot consulted by the rule engine and native extraction.
#[derive(Debug, Clone)]
pub struct Platform {
    pub os_name: &'static str,
    pub arch: &'static str,
    pub os_version: String,
}

impl Platform {
    /// Detect the current platform once per run.
    pub fn current() -> Self {
        Self {
            os_name: os_name(),
            arch: arch_tag(),
            os_version: os_version(),
        }
    }

    /// Arch suffix for native directories: x64 carries none, everything
    /// else is tagged (e.g. `-arm64`, `-x86`).
    pub fn arch_suffix(&self) -> String {
        if self.arch == "x64" {
            String::new()
        } else {
            format!("-{}", self.arch)
        }
    }

    /// The `natives-<os>` tag without the arch suffix.
    pub fn natives_tag(&self) -> String {
        format!("natives-{}", self.os_name)
    }

    /// The `natives-<os><suffix>` tag, equal to [`Self::natives_tag`] on x64.
    pub fn natives_tag_with_suffix(&self) -> String {
        format!("natives-{}{}", self.os_name, self.arch_suffix())
    }

    /// Feature flags the rule engine sees by default (none).
    pub fn default_features(&self) -> HashMap<String, bool> {
        HashMap::new()
    }
}

/// Get the Mojang OS name for the current platform.
pub fn os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

/// Architecture tag as rule `os.arch` constraints spell it.
pub fn arch_tag() -> &'static str {
    if cfg!(target_arch = "x86_64") {
        "x64"
    } else if cfg!(target_arch = "x86") {
        "x86"
    } else if cfg!(target_arch = "aarch64") {
        "arm64"
    } else {
        std::env::consts::ARCH
    }
}

/// OS version string matched by rule `os.version` regex patterns.
pub fn os_version() -> String {
    sysinfo::System::os_version().unwrap_or_default()
}

/// Platform-specific Java classpath separator.
pub fn classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}
