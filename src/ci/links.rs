//! Download and update URLs for published artifacts.

use super::{CiEnv, CiPlatform, DEFAULT_BRANCH};

/// URL scheme of a CI platform for the files a build publishes.
#[cfg_attr(test, mockall::automock)]
pub trait LinkStrategy: Send + Sync {
    /// Job artifact of the current ref. Used for unstable builds.
    fn artifact_link(&self, file_name: &str) -> String;

    /// Job artifact of the latest pipeline on the branch.
    fn artifact_link_latest(&self, file_name: &str) -> String;

    /// Asset of the release for the current tag.
    fn release_link(&self, file_name: &str) -> String;

    /// Asset of the latest release.
    fn release_link_latest(&self, file_name: &str) -> String;
}

/// Select the link strategy for `platform`.
pub fn link_strategy(platform: CiPlatform, env: &CiEnv) -> Box<dyn LinkStrategy> {
    match platform {
        CiPlatform::Gitlab => Box::new(GitLabLinks::from_env(env)),
        CiPlatform::Github => Box::new(GitHubLinks::from_env(env)),
    }
}

/// GitLab job artifacts and releases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitLabLinks {
    pub project_url: String,
    pub ref_name: String,
    pub branch: String,
    pub job_name: String,
}

impl GitLabLinks {
    pub fn from_env(env: &CiEnv) -> Self {
        Self {
            project_url: env.project_url.clone().unwrap_or_default(),
            ref_name: env.ref_name.clone().unwrap_or_default(),
            branch: env
                .branch
                .clone()
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            job_name: env.job_name.clone().unwrap_or_default(),
        }
    }
}

impl LinkStrategy for GitLabLinks {
    fn artifact_link(&self, file_name: &str) -> String {
        format!(
            "{}/-/jobs/artifacts/{}/raw/{}?job={}",
            self.project_url, self.ref_name, file_name, self.job_name
        )
    }

    fn artifact_link_latest(&self, file_name: &str) -> String {
        format!(
            "{}/-/jobs/artifacts/{}/raw/{}?job={}",
            self.project_url, self.branch, file_name, self.job_name
        )
    }

    fn release_link(&self, file_name: &str) -> String {
        format!(
            "{}/-/releases/{}/downloads/{}",
            self.project_url, self.ref_name, file_name
        )
    }

    fn release_link_latest(&self, file_name: &str) -> String {
        format!(
            "{}/-/releases/permalink/latest/downloads/{}",
            self.project_url, file_name
        )
    }
}

/// GitHub release assets. Unstable builds are published to a rolling
/// prerelease tagged with the branch name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubLinks {
    pub project_url: String,
    pub ref_name: String,
    pub branch: String,
}

impl GitHubLinks {
    pub fn from_env(env: &CiEnv) -> Self {
        Self {
            project_url: env.project_url.clone().unwrap_or_default(),
            ref_name: env.ref_name.clone().unwrap_or_default(),
            branch: env
                .branch
                .clone()
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        }
    }
}

impl LinkStrategy for GitHubLinks {
    fn artifact_link(&self, file_name: &str) -> String {
        format!(
            "{}/releases/download/{}/{}",
            self.project_url, self.ref_name, file_name
        )
    }

    fn artifact_link_latest(&self, file_name: &str) -> String {
        format!(
            "{}/releases/download/{}/{}",
            self.project_url, self.branch, file_name
        )
    }

    fn release_link(&self, file_name: &str) -> String {
        format!(
            "{}/releases/download/{}/{}",
            self.project_url, self.ref_name, file_name
        )
    }

    fn release_link_latest(&self, file_name: &str) -> String {
        format!(
            "{}/releases/latest/download/{}",
            self.project_url, file_name
        )
    }
}
