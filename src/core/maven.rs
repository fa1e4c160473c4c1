use std::fmt;

use crate::core::error::{LauncherError, LauncherResult};

/// Represents a fully parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl MavenArtifact {
    /// Parse a Maven coordinate string.
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let parts: Vec<&str> = coord.split(':').collect();

        match parts.len() {
            3 => Ok(Self {
                group_id: parts[0].to_string(),
                artifact_id: parts[1].to_string(),
                version: parts[2].to_string(),
                classifier: None,
            }),
            4 => Ok(Self {
                group_id: parts[0].to_string(),
                artifact_id: parts[1].to_string(),
                version: parts[2].to_string(),
                classifier: Some(parts[3].to_string()),
            }),
            _ => Err(LauncherError::InvalidMavenCoordinate(coord.to_string())),
        }
    }

    /// Construct the group path portion (`net/fabricmc`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// Build the artifact filename: `artifactId-version[-classifier].jar`.
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}-{}-{}.jar", self.artifact_id, self.version, c),
            None => format!("{}-{}.jar", self.artifact_id, self.version),
        }
    }

    /// Path relative to the libraries root, mirroring the Maven repo
    /// layout: `<group_path>/<artifact_id>/<version>/<filename>`.
    pub fn repo_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Construct the full URL for this artifact under the given repository base.
    pub fn url(&self, repo_base: &str) -> String {
        format!("{}/{}", repo_base.trim_end_matches('/'), self.repo_path())
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(c) => write!(
                f,
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.version, c
            ),
            None => write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_coordinate() {
        let a = MavenArtifact::parse("net.fabricmc:fabric-loader:0.16.10").unwrap();
        assert_eq!(a.group_id, "net.fabricmc");
        assert_eq!(a.artifact_id, "fabric-loader");
        assert_eq!(a.version, "0.16.10");
        assert_eq!(a.classifier, None);
    }

    #[test]
    fn parse_with_classifier() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.3:natives-windows").unwrap();
        assert_eq!(a.classifier, Some("natives-windows".to_string()));
    }

    #[test]
    fn rejects_short_coordinates() {
        assert!(MavenArtifact::parse("just-a-name").is_err());
    }

    #[test]
    fn url_construction() {
        let a = MavenArtifact::parse("net.fabricmc:fabric-loader:0.16.10").unwrap();
        assert_eq!(
            a.url("https://maven.fabricmc.net/"),
            "https://maven.fabricmc.net/net/fabricmc/fabric-loader/0.16.10/fabric-loader-0.16.10.jar"
        );
    }

    #[test]
    fn repo_path_construction() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.3:natives-windows").unwrap();
        assert_eq!(
            a.repo_path(),
            "org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3-natives-windows.jar"
        );
    }
}
