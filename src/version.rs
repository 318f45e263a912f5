//! Distribution version resolution.

use crate::ci::CiEnv;

/// Sequence number used when a CI pipeline does not expose one.
const MISSING_SEQUENCE: &str = "0";

/// Compute the distribution version from the `package.json` base version.
///
/// First match wins:
/// - tagged release: `base` unchanged, the tagged commit carries the real version;
/// - CI on the unstable branch: `{base}-unstable.{sequence}`;
/// - other CI builds: `{base}-{sequence}`;
/// - anything else is a local build: `{base}-dirty`.
pub fn resolve_version(base: &str, env: &CiEnv) -> String {
    if env.is_tagged_release() {
        return base.to_string();
    }

    if env.is_ci {
        let sequence = env.sequence.as_deref().unwrap_or(MISSING_SEQUENCE);
        if env.is_unstable_branch() {
            return format!("{}-unstable.{}", base, sequence);
        }
        return format!("{}-{}", base, sequence);
    }

    format!("{}-dirty", base)
}
