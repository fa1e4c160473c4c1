// ─── Users ───
// Opaque user records consumed by launch assembly. Credentials are
// externally supplied; no authentication protocol lives here.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub user_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl User {
    pub fn offline(name: &str) -> Self {
        Self {
            name: name.to_string(),
            uuid: offline_uuid(name),
            user_type: "offline".into(),
            access_token: None,
        }
    }
}

/// Offline UUID derivation: md5 of `OfflinePlayer:<name>` with the
/// version-3 and RFC 4122 variant bits set.
pub fn offline_uuid(name: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(format!("OfflinePlayer:{}", name).as_bytes());
    let digest: [u8; 16] = hasher.finalize().into();
    uuid::Builder::from_md5_bytes(digest)
        .into_uuid()
        .hyphenated()
        .to_string()
}

/// Validate the hyphenated UUID shape user input must satisfy.
pub fn is_valid_uuid(candidate: &str) -> bool {
    regex::Regex::new(
        r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    )
    .map(|re| re.is_match(&candidate.to_ascii_lowercase()))
    .unwrap_or(false)
}

/// Validate a player name: 3-16 word characters.
pub fn is_valid_player_name(name: &str) -> bool {
    regex::Regex::new(r"^[a-zA-Z0-9_]{3,16}$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_uuid_is_stable_and_well_formed() {
        let first = offline_uuid("Steve");
        let second = offline_uuid("Steve");
        assert_eq!(first, second);
        assert!(is_valid_uuid(&first));
        // Version nibble is 3 (name-based, md5).
        assert_eq!(&first[14..15], "3");
    }

    #[test]
    fn different_names_get_different_uuids() {
        assert_ne!(offline_uuid("Steve"), offline_uuid("Alex"));
    }

    #[test]
    fn uuid_validation_rejects_compact_form() {
        assert!(is_valid_uuid("00000000-0000-3000-8000-000000000000"));
        assert!(!is_valid_uuid("00000000000030008000000000000000"));
    }

    #[test]
    fn player_names_are_length_checked() {
        assert!(is_valid_player_name("Steve_123"));
        assert!(!is_valid_player_name("ab"));
        assert!(!is_valid_player_name("has spaces"));
    }
}
