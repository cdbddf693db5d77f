//! StatusNotifier port - コミットステータスの送信

use async_trait::async_trait;

use super::github::GitHubError;
use crate::domain::{CommitState, RepoId, Sha};

/// Posts commit statuses under the `review-window` context.
///
/// Callers treat this as fire-and-forget: an error is logged and dropped, a
/// missed status is repaired by the next event for the same pull request.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn post_status(
        &self,
        repo: &RepoId,
        sha: &Sha,
        state: CommitState,
        description: &str,
    ) -> Result<(), GitHubError>;
}
