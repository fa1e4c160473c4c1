// ─── Mirror Rewrite ───
// Pure URL rewriting against a known host table. Applied before every
// network fetch; URLs on unknown hosts pass through untouched.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mirror {
    #[default]
    Official,
    Bmclapi,
}

impl std::fmt::Display for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mirror::Official => write!(f, "official"),
            Mirror::Bmclapi => write!(f, "bmclapi"),
        }
    }
}

/// Official base URLs, paired with their BMCLAPI equivalents.
const HOSTS: [(&str, &str); 5] = [
    (
        "https://launcher.mojang.com",
        "https://bmclapi2.bangbang93.com",
    ),
    (
        "https://launchermeta.mojang.com",
        "https://bmclapi2.bangbang93.com",
    ),
    (
        "https://piston-meta.mojang.com",
        "https://bmclapi2.bangbang93.com",
    ),
    (
        "https://resources.download.minecraft.net",
        "https://bmclapi2.bangbang93.com/assets",
    ),
    (
        "https://libraries.minecraft.net",
        "https://bmclapi2.bangbang93.com/maven",
    ),
];

impl Mirror {
    /// Rewrite `url` onto this mirror when its host is in the table.
    pub fn rewrite(&self, url: &str) -> String {
        if *self == Mirror::Official {
            return url.to_string();
        }
        for (official, mirrored) in HOSTS {
            if let Some(rest) = url.strip_prefix(official) {
                return format!("{}{}", mirrored, rest);
            }
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_mirror_is_identity() {
        let url = "https://libraries.minecraft.net/org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar";
        assert_eq!(Mirror::Official.rewrite(url), url);
    }

    #[test]
    fn known_hosts_are_rewritten() {
        let url = "https://resources.download.minecraft.net/ab/abcdef";
        assert_eq!(
            Mirror::Bmclapi.rewrite(url),
            "https://bmclapi2.bangbang93.com/assets/ab/abcdef"
        );
    }

    #[test]
    fn unknown_hosts_pass_through() {
        let url = "https://meta.fabricmc.net/v2/versions/game";
        assert_eq!(Mirror::Bmclapi.rewrite(url), url);
    }
}
