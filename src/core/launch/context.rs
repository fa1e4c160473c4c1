// ─── Launch Context ───
// The placeholder map consulted during argument expansion. Built once
// per launch, read-only while expanding.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct LaunchContext {
    values: BTreeMap<String, String>,
}

impl LaunchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Substitute every `${placeholder}` occurrence. Placeholders with no
    /// entry in the context are left verbatim.
    pub fn expand(&self, template: &str) -> String {
        let mut out = template.to_string();
        for (key, value) in &self.values {
            let needle = format!("${{{}}}", key);
            if out.contains(&needle) {
                out = out.replace(&needle, value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_placeholders_are_substituted() {
        let mut ctx = LaunchContext::new();
        ctx.set("max", "4G");
        assert_eq!(ctx.expand("-Xmx${max}"), "-Xmx4G");
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let ctx = LaunchContext::new();
        assert_eq!(ctx.expand("${unknown}"), "${unknown}");
    }

    #[test]
    fn multiple_occurrences_are_all_replaced() {
        let mut ctx = LaunchContext::new();
        ctx.set("natives_directory", "/tmp/natives");
        assert_eq!(
            ctx.expand("-Da=${natives_directory} -Db=${natives_directory}"),
            "-Da=/tmp/natives -Db=/tmp/natives"
        );
    }
}
