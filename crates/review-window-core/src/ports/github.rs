//! RepositoryLookup port - GitHub 上のリポジトリ・Issue・PR の参照
//!
//! Failures are returned to the caller as-is. Nothing on this path retries;
//! the next webhook delivery for the pull request re-evaluates from scratch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{PrNumber, RepoId, Sha};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitHubError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid repository name '{0}', expected owner/name")]
    InvalidRepository(String),

    #[error("GitHub API error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
    },
}

/// An open pull request as seen by the startup replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPullRequest {
    pub number: PrNumber,
    pub head_sha: Sha,
    pub created_at: DateTime<Utc>,
}

/// Read-only view of repositories, issue labels and open pull requests.
#[async_trait]
pub trait RepositoryLookup: Send + Sync {
    /// Resolve a `owner/name` full name to a repository that exists.
    async fn repository(&self, full_name: &str) -> Result<RepoId, GitHubError>;

    /// Label names of an issue or pull request, in the order GitHub lists them.
    async fn issue_labels(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<Vec<String>, GitHubError>;

    async fn open_pull_requests(&self, repo: &RepoId) -> Result<Vec<OpenPullRequest>, GitHubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_mentions_status_when_known() {
        let err = GitHubError::Api {
            status: Some(502),
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "GitHub API error (HTTP 502): bad gateway");

        let err = GitHubError::Api {
            status: None,
            message: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "GitHub API error: connection reset");
    }
}
