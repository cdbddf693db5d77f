//! DurationResolver - ラベルからレビュー期間を決める

use std::sync::Arc;
use tracing::debug;

use crate::app::config::DurationConfig;
use crate::domain::{PrNumber, RepoId, ReviewWindow};
use crate::ports::{GitHubError, RepositoryLookup};

pub struct DurationResolver {
    lookup: Arc<dyn RepositoryLookup>,
    durations: DurationConfig,
}

impl DurationResolver {
    pub fn new(lookup: Arc<dyn RepositoryLookup>, durations: DurationConfig) -> Self {
        Self { lookup, durations }
    }

    /// Fetch the issue's labels and pick the window. Lookup failures are
    /// returned unchanged.
    pub async fn resolve(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<ReviewWindow, GitHubError> {
        let labels = self.lookup.issue_labels(repo, number).await?;

        match self.durations.matching_label(&labels) {
            Some((label, window)) => {
                debug!(%repo, pr = %number, label, %window, "window from label");
                Ok(window)
            }
            None => {
                let window = self.durations.default_window();
                debug!(%repo, pr = %number, %window, "default window");
                Ok(window)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryGitHub;

    fn repo() -> RepoId {
        RepoId::new("querydsl", "querydsl")
    }

    fn resolver(github: Arc<InMemoryGitHub>) -> DurationResolver {
        let durations = DurationConfig::new(ReviewWindow::days(3))
            .with_override("hotfix", ReviewWindow::hours(2))
            .with_override("docs", ReviewWindow::minutes(30));
        DurationResolver::new(github, durations)
    }

    #[tokio::test]
    async fn unlabelled_pull_request_gets_default() {
        let github = Arc::new(InMemoryGitHub::new());
        github.set_labels(&repo(), PrNumber(1), Vec::<String>::new());

        let window = resolver(github).resolve(&repo(), PrNumber(1)).await.unwrap();
        assert_eq!(window, ReviewWindow::days(3));
    }

    #[tokio::test]
    async fn first_configured_label_decides() {
        let github = Arc::new(InMemoryGitHub::new());
        github.set_labels(&repo(), PrNumber(2), ["bug", "docs", "hotfix"]);

        let window = resolver(github).resolve(&repo(), PrNumber(2)).await.unwrap();
        assert_eq!(window, ReviewWindow::minutes(30));
    }

    #[tokio::test]
    async fn lookup_failure_propagates() {
        let github = Arc::new(InMemoryGitHub::new());
        github.set_labels(&repo(), PrNumber(3), ["hotfix"]);
        github.fail_issue(&repo(), PrNumber(3));

        let err = resolver(github).resolve(&repo(), PrNumber(3)).await.unwrap_err();
        assert!(matches!(err, GitHubError::Api { status: Some(500), .. }));
    }
}
