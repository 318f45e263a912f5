//! CI environment signals.
//!
//! The process environment is read exactly once, into a [`CiEnv`], which is
//! then passed explicitly to the version resolver and the manifest assembly.

mod links;

pub use links::{GitHubLinks, GitLabLinks, LinkStrategy, link_strategy};

#[cfg(test)]
pub use links::MockLinkStrategy;

use clap::ValueEnum;
use log::debug;

use crate::runtime::Runtime;

/// Branch whose builds are published as unstable artifacts.
pub const UNSTABLE_BRANCH: &str = "develop";

/// Branch used for "latest" artifact links when the pipeline has no branch.
pub const DEFAULT_BRANCH: &str = "master";

/// CI platform whose variables and URL scheme are used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CiPlatform {
    #[default]
    Gitlab,
    Github,
}

/// Snapshot of the CI signals relevant to versioning and download links.
///
/// `Default` is a local, non-CI build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnv {
    pub is_ci: bool,
    /// Tag being built, if this is a tagged release.
    pub tag: Option<String>,
    /// Branch or tag name the pipeline runs for.
    pub ref_name: Option<String>,
    /// URL-safe form of `ref_name`.
    pub ref_slug: Option<String>,
    /// Branch the pipeline runs for; absent for tag pipelines.
    pub branch: Option<String>,
    /// Ever-increasing pipeline number.
    pub sequence: Option<String>,
    pub project_url: Option<String>,
    pub job_name: Option<String>,
}

impl CiEnv {
    /// Local build outside CI.
    pub fn local() -> Self {
        Self::default()
    }

    /// Capture the signals of `platform` from the environment.
    ///
    /// A variable counts as set only when present and non-empty.
    #[tracing::instrument(skip(runtime))]
    pub fn capture<R: Runtime + ?Sized>(runtime: &R, platform: CiPlatform) -> Self {
        let var = |key: &str| runtime.env_var(key).ok().filter(|v| !v.is_empty());

        let env = match platform {
            CiPlatform::Gitlab => CiEnv {
                is_ci: var("CI").is_some(),
                tag: var("CI_COMMIT_TAG"),
                ref_name: var("CI_COMMIT_REF_NAME"),
                ref_slug: var("CI_COMMIT_REF_SLUG"),
                branch: var("CI_COMMIT_BRANCH"),
                sequence: var("CI_PIPELINE_IID"),
                project_url: var("CI_PROJECT_URL"),
                job_name: var("CI_JOB_NAME"),
            },
            CiPlatform::Github => {
                let ref_type = var("GITHUB_REF_TYPE");
                let ref_name = var("GITHUB_REF_NAME");
                let is_tag = ref_type.as_deref() == Some("tag");
                let is_branch = ref_type.as_deref() == Some("branch");
                let project_url = match (var("GITHUB_SERVER_URL"), var("GITHUB_REPOSITORY")) {
                    (Some(server), Some(repo)) => {
                        Some(format!("{}/{}", server.trim_end_matches('/'), repo))
                    }
                    _ => None,
                };
                CiEnv {
                    is_ci: var("CI").is_some() || var("GITHUB_ACTIONS").is_some(),
                    tag: ref_name.clone().filter(|_| is_tag),
                    ref_slug: ref_name.as_deref().map(slugify),
                    branch: ref_name.clone().filter(|_| is_branch),
                    ref_name,
                    sequence: var("GITHUB_RUN_NUMBER"),
                    project_url,
                    job_name: var("GITHUB_JOB"),
                }
            }
        };

        debug!("Captured CI environment for {:?}: {:?}", platform, env);
        env
    }

    pub fn is_tagged_release(&self) -> bool {
        self.tag.is_some()
    }

    /// True when the pipeline builds the unstable branch.
    pub fn is_unstable_branch(&self) -> bool {
        self.ref_slug.as_deref() == Some(UNSTABLE_BRANCH)
    }
}

/// Slug a ref name the way GitLab builds `CI_COMMIT_REF_SLUG`: lowercase,
/// anything outside `[a-z0-9]` becomes `-`, at most 63 bytes, no leading or
/// trailing `-`.
pub fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .take(63)
        .collect();
    slug.trim_matches('-').to_string()
}
