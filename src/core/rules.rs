// ─── Rule Engine ───
// Evaluates conditional manifest rules against the current platform and
// feature flags. First matching rule decides; an empty or non-matching
// list denies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::platform::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    #[serde(alias = "deny")]
    Disallow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Regex pattern matched against the platform version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Context a rule list is evaluated against. Built once per run from the
/// detected platform, optionally extended with feature flags.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub os_name: String,
    pub arch: String,
    pub os_version: String,
    pub features: HashMap<String, bool>,
}

impl RuleContext {
    pub fn from_platform(platform: &Platform) -> Self {
        Self {
            os_name: platform.os_name.to_string(),
            arch: platform.arch.to_string(),
            os_version: platform.os_version.clone(),
            features: platform.default_features(),
        }
    }

    pub fn with_feature(mut self, name: &str, value: bool) -> Self {
        self.features.insert(name.to_string(), value);
        self
    }
}

/// Evaluate a rule list: the first matching rule's action wins, and a
/// list with no matching rule (including the empty list) denies.
pub fn evaluate(rules: &[Rule], ctx: &RuleContext) -> bool {
    for rule in rules {
        if rule_matches(rule, ctx) {
            return rule.action == RuleAction::Allow;
        }
    }
    false
}

fn rule_matches(rule: &Rule, ctx: &RuleContext) -> bool {
    if let Some(os) = &rule.os {
        if let Some(name) = &os.name {
            if name != &ctx.os_name {
                return false;
            }
        }
        if let Some(arch) = &os.arch {
            if arch != &ctx.arch {
                return false;
            }
        }
        if let Some(pattern) = &os.version {
            let matched = regex::Regex::new(pattern)
                .map(|re| re.is_match(&ctx.os_version))
                .unwrap_or(false);
            if !matched {
                return false;
            }
        }
    }

    if let Some(features) = &rule.features {
        for (key, expected) in features {
            if ctx.features.get(key) != Some(expected) {
                return false;
            }
        }
    }

    true
}
