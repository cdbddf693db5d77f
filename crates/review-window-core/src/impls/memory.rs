//! In-memory collaborators - 開発・テスト用
//!
//! `InMemoryGitHub` answers repository / label / pull request lookups from
//! maps, `RecordingNotifier` keeps every posted status. Both can be told to
//! fail so error paths are testable without a network.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{CommitState, PrNumber, RepoId, Sha};
use crate::ports::{GitHubError, OpenPullRequest, RepositoryLookup, StatusNotifier};

#[derive(Default)]
struct GitHubState {
    repos: HashSet<RepoId>,
    labels: HashMap<(RepoId, PrNumber), Vec<String>>,
    pulls: HashMap<RepoId, Vec<OpenPullRequest>>,
    failing_issues: HashSet<(RepoId, PrNumber)>,
    repository_lookups: usize,
    label_lookups: usize,
}

#[derive(Default)]
pub struct InMemoryGitHub {
    state: Mutex<GitHubState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_repository(&self, repo: RepoId) {
        lock(&self.state).repos.insert(repo);
    }

    /// Replace the label list of an issue. The repository becomes known.
    pub fn set_labels<I, S>(&self, repo: &RepoId, number: PrNumber, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = lock(&self.state);
        state.repos.insert(repo.clone());
        state.labels.insert(
            (repo.clone(), number),
            labels.into_iter().map(Into::into).collect(),
        );
    }

    pub fn add_pull_request(&self, repo: &RepoId, pull: OpenPullRequest) {
        let mut state = lock(&self.state);
        state.repos.insert(repo.clone());
        state.pulls.entry(repo.clone()).or_default().push(pull);
    }

    /// Make label lookups for this issue fail with a 500.
    pub fn fail_issue(&self, repo: &RepoId, number: PrNumber) {
        lock(&self.state).failing_issues.insert((repo.clone(), number));
    }

    pub fn repository_lookups(&self) -> usize {
        lock(&self.state).repository_lookups
    }

    pub fn label_lookups(&self) -> usize {
        lock(&self.state).label_lookups
    }
}

#[async_trait]
impl RepositoryLookup for InMemoryGitHub {
    async fn repository(&self, full_name: &str) -> Result<RepoId, GitHubError> {
        let repo = RepoId::parse(full_name)
            .ok_or_else(|| GitHubError::InvalidRepository(full_name.to_string()))?;
        let mut state = lock(&self.state);
        state.repository_lookups += 1;
        if state.repos.contains(&repo) {
            Ok(repo)
        } else {
            Err(GitHubError::NotFound(format!("repository {full_name}")))
        }
    }

    async fn issue_labels(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<Vec<String>, GitHubError> {
        let mut state = lock(&self.state);
        state.label_lookups += 1;

        let key = (repo.clone(), number);
        if state.failing_issues.contains(&key) {
            return Err(GitHubError::Api {
                status: Some(500),
                message: format!("issue {number} in {repo} is unavailable"),
            });
        }
        if !state.repos.contains(repo) {
            return Err(GitHubError::NotFound(format!("repository {repo}")));
        }
        Ok(state.labels.get(&key).cloned().unwrap_or_default())
    }

    async fn open_pull_requests(&self, repo: &RepoId) -> Result<Vec<OpenPullRequest>, GitHubError> {
        let state = lock(&self.state);
        if !state.repos.contains(repo) {
            return Err(GitHubError::NotFound(format!("repository {repo}")));
        }
        Ok(state.pulls.get(repo).cloned().unwrap_or_default())
    }
}

/// One status post accepted by `RecordingNotifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedStatus {
    pub repo: RepoId,
    pub sha: Sha,
    pub state: CommitState,
    pub description: String,
}

#[derive(Default)]
struct NotifierState {
    posted: Vec<PostedStatus>,
    failing: bool,
    rejected: usize,
}

#[derive(Default)]
pub struct RecordingNotifier {
    state: Mutex<NotifierState>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// While failing, posts are rejected with an API error and not recorded.
    pub fn set_failing(&self, failing: bool) {
        lock(&self.state).failing = failing;
    }

    pub fn posted(&self) -> Vec<PostedStatus> {
        lock(&self.state).posted.clone()
    }

    pub fn posted_for(&self, sha: &Sha) -> Vec<PostedStatus> {
        lock(&self.state)
            .posted
            .iter()
            .filter(|status| &status.sha == sha)
            .cloned()
            .collect()
    }

    pub fn count(&self, sha: &Sha, state: CommitState) -> usize {
        lock(&self.state)
            .posted
            .iter()
            .filter(|status| &status.sha == sha && status.state == state)
            .count()
    }

    pub fn rejected(&self) -> usize {
        lock(&self.state).rejected
    }
}

#[async_trait]
impl StatusNotifier for RecordingNotifier {
    async fn post_status(
        &self,
        repo: &RepoId,
        sha: &Sha,
        state: CommitState,
        description: &str,
    ) -> Result<(), GitHubError> {
        let mut guard = lock(&self.state);
        if guard.failing {
            guard.rejected += 1;
            return Err(GitHubError::Api {
                status: Some(503),
                message: "status API unavailable".to_string(),
            });
        }
        guard.posted.push(PostedStatus {
            repo: repo.clone(),
            sha: sha.clone(),
            state,
            description: description.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn repo() -> RepoId {
        RepoId::new("querydsl", "querydsl")
    }

    #[tokio::test]
    async fn repository_lookup_requires_known_repo() {
        let github = InMemoryGitHub::new();
        github.add_repository(repo());

        assert_eq!(github.repository("querydsl/querydsl").await, Ok(repo()));
        assert!(matches!(
            github.repository("querydsl/other").await,
            Err(GitHubError::NotFound(_))
        ));
        assert!(matches!(
            github.repository("not-a-full-name").await,
            Err(GitHubError::InvalidRepository(_))
        ));
    }

    #[tokio::test]
    async fn labels_keep_their_order() {
        let github = InMemoryGitHub::new();
        github.set_labels(&repo(), PrNumber(7), ["bug", "hotfix", "docs"]);

        let labels = github.issue_labels(&repo(), PrNumber(7)).await.unwrap();
        assert_eq!(labels, vec!["bug", "hotfix", "docs"]);
        assert!(github.issue_labels(&repo(), PrNumber(8)).await.unwrap().is_empty());
        assert_eq!(github.label_lookups(), 2);
    }

    #[tokio::test]
    async fn failing_issue_returns_api_error() {
        let github = InMemoryGitHub::new();
        github.set_labels(&repo(), PrNumber(7), ["bug"]);
        github.fail_issue(&repo(), PrNumber(7));

        let err = github.issue_labels(&repo(), PrNumber(7)).await.unwrap_err();
        assert!(matches!(err, GitHubError::Api { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn open_pull_requests_are_listed() {
        let github = InMemoryGitHub::new();
        let pull = OpenPullRequest {
            number: PrNumber(3),
            head_sha: Sha::from("abc123"),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        github.add_pull_request(&repo(), pull.clone());

        assert_eq!(github.open_pull_requests(&repo()).await.unwrap(), vec![pull]);
    }

    #[tokio::test]
    async fn recording_notifier_records_and_rejects() {
        let notifier = RecordingNotifier::new();
        let sha = Sha::from("abc123");

        notifier
            .post_status(&repo(), &sha, CommitState::Pending, "pending")
            .await
            .unwrap();
        notifier.set_failing(true);
        assert!(
            notifier
                .post_status(&repo(), &sha, CommitState::Success, "done")
                .await
                .is_err()
        );

        assert_eq!(notifier.count(&sha, CommitState::Pending), 1);
        assert_eq!(notifier.count(&sha, CommitState::Success), 0);
        assert_eq!(notifier.rejected(), 1);
        assert_eq!(notifier.posted_for(&sha).len(), 1);
    }
}
