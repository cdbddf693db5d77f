//! CachedRepositoryLookup - リポジトリ解決のキャッシュ
//!
//! Every webhook delivery names its repository, and the answer practically
//! never changes while the process runs. Successful `repository` lookups are
//! kept per full name; failures are not cached. Labels and open pull requests
//! always go to the wrapped lookup.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{PrNumber, RepoId};
use crate::ports::{GitHubError, OpenPullRequest, RepositoryLookup};

pub struct CachedRepositoryLookup {
    inner: Arc<dyn RepositoryLookup>,
    repositories: DashMap<String, RepoId>,
}

impl CachedRepositoryLookup {
    pub fn new(inner: Arc<dyn RepositoryLookup>) -> Self {
        Self {
            inner,
            repositories: DashMap::new(),
        }
    }

    pub fn cached(&self) -> usize {
        self.repositories.len()
    }
}

#[async_trait]
impl RepositoryLookup for CachedRepositoryLookup {
    async fn repository(&self, full_name: &str) -> Result<RepoId, GitHubError> {
        if let Some(repo) = self.repositories.get(full_name) {
            return Ok(repo.clone());
        }

        // 同時に来た初回リクエストはどちらも問い合わせる（結果は同じ）
        let repo = self.inner.repository(full_name).await?;
        debug!(full_name, %repo, "caching repository");
        self.repositories.insert(full_name.to_string(), repo.clone());
        Ok(repo)
    }

    async fn issue_labels(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<Vec<String>, GitHubError> {
        self.inner.issue_labels(repo, number).await
    }

    async fn open_pull_requests(&self, repo: &RepoId) -> Result<Vec<OpenPullRequest>, GitHubError> {
        self.inner.open_pull_requests(repo).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryGitHub;

    fn repo() -> RepoId {
        RepoId::new("querydsl", "querydsl")
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let github = Arc::new(InMemoryGitHub::new());
        github.add_repository(repo());
        let lookup = CachedRepositoryLookup::new(github.clone());

        assert_eq!(lookup.repository("querydsl/querydsl").await, Ok(repo()));
        assert_eq!(lookup.repository("querydsl/querydsl").await, Ok(repo()));

        assert_eq!(github.repository_lookups(), 1);
        assert_eq!(lookup.cached(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let github = Arc::new(InMemoryGitHub::new());
        let lookup = CachedRepositoryLookup::new(github.clone());

        let err = lookup.repository("querydsl/querydsl").await.unwrap_err();
        assert!(matches!(err, GitHubError::NotFound(_)));
        assert_eq!(lookup.cached(), 0);

        github.add_repository(repo());
        assert_eq!(lookup.repository("querydsl/querydsl").await, Ok(repo()));
        assert_eq!(github.repository_lookups(), 2);
    }

    #[tokio::test]
    async fn labels_are_always_fetched() {
        let github = Arc::new(InMemoryGitHub::new());
        github.set_labels(&repo(), PrNumber(7), ["hotfix"]);
        let lookup = CachedRepositoryLookup::new(github.clone());

        for _ in 0..2 {
            assert_eq!(
                lookup.issue_labels(&repo(), PrNumber(7)).await,
                Ok(vec!["hotfix".to_string()])
            );
        }
        assert_eq!(github.label_lookups(), 2);
    }
}
