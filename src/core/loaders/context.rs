use std::path::Path;

use crate::core::mirror::Mirror;
use crate::core::rules::RuleContext;

/// Everything an installer needs about the target instance.
pub struct InstallContext<'a> {
    pub root: &'a Path,
    pub game: &'a str,
    pub mirror: Mirror,
    pub client: &'a reqwest::Client,
    pub rule_ctx: &'a RuleContext,
}
