//! Octocrab-backed GitHub collaborators.
//!
//! `OctocrabGitHub` serves both ports the core consumes: repository / label /
//! open pull request lookups, and commit status posts.

use async_trait::async_trait;
use octocrab::Octocrab;
use review_window_core::domain::{CommitState, PrNumber, RepoId, STATUS_CONTEXT, Sha};
use review_window_core::ports::{GitHubError, OpenPullRequest, RepositoryLookup, StatusNotifier};
use serde::Serialize;
use tracing::{debug, warn};

const PAGE_SIZE: u8 = 100;

#[derive(Clone)]
pub struct OctocrabGitHub {
    client: Octocrab,
}

impl OctocrabGitHub {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Personal access token client. `base_uri` points at a GitHub Enterprise
    /// API root when set.
    pub fn from_token(
        token: impl Into<String>,
        base_uri: Option<&str>,
    ) -> Result<Self, octocrab::Error> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if let Some(uri) = base_uri {
            builder = builder.base_uri(uri)?;
        }
        Ok(Self::new(builder.build()?))
    }
}

impl std::fmt::Debug for OctocrabGitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabGitHub").finish_non_exhaustive()
    }
}

/// 404 becomes `NotFound(what)`; every other failure is an API error carrying
/// the HTTP status when GitHub returned one.
fn map_error(err: octocrab::Error, what: impl FnOnce() -> String) -> GitHubError {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            if status == 404 {
                GitHubError::NotFound(what())
            } else {
                GitHubError::Api {
                    status: Some(status),
                    message: source.message,
                }
            }
        }
        other => GitHubError::Api {
            status: None,
            message: other.to_string(),
        },
    }
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    state: CommitState,
    description: &'a str,
    context: &'static str,
}

#[async_trait]
impl RepositoryLookup for OctocrabGitHub {
    async fn repository(&self, full_name: &str) -> Result<RepoId, GitHubError> {
        let requested = RepoId::parse(full_name)
            .ok_or_else(|| GitHubError::InvalidRepository(full_name.to_string()))?;

        let repository = self
            .client
            .repos(requested.owner(), requested.name())
            .get()
            .await
            .map_err(|err| map_error(err, || format!("repository {full_name}")))?;

        // GitHub answers with the canonical name (case, renames).
        let owner = repository
            .owner
            .map(|owner| owner.login)
            .unwrap_or_else(|| requested.owner().to_string());
        Ok(RepoId::new(owner, repository.name))
    }

    async fn issue_labels(
        &self,
        repo: &RepoId,
        number: PrNumber,
    ) -> Result<Vec<String>, GitHubError> {
        let issue = self
            .client
            .issues(repo.owner(), repo.name())
            .get(number.0)
            .await
            .map_err(|err| map_error(err, || format!("issue {number} in {repo}")))?;

        let labels: Vec<String> = issue.labels.into_iter().map(|label| label.name).collect();
        debug!(%repo, pr = %number, ?labels, "fetched labels");
        Ok(labels)
    }

    async fn open_pull_requests(&self, repo: &RepoId) -> Result<Vec<OpenPullRequest>, GitHubError> {
        let mut page = 1u32;
        let mut open = Vec::new();

        loop {
            let result = self
                .client
                .pulls(repo.owner(), repo.name())
                .list()
                .state(octocrab::params::State::Open)
                .per_page(PAGE_SIZE)
                .page(page)
                .send()
                .await
                .map_err(|err| map_error(err, || format!("pull requests of {repo}")))?;

            let is_last_page = result.items.len() < usize::from(PAGE_SIZE);
            for pull in result.items {
                let Some(created_at) = pull.created_at else {
                    warn!(%repo, pr = pull.number, "skipping pull request without creation time");
                    continue;
                };
                open.push(OpenPullRequest {
                    number: PrNumber(pull.number),
                    head_sha: Sha::new(pull.head.sha),
                    created_at,
                });
            }

            if is_last_page {
                break;
            }
            page += 1;
        }

        Ok(open)
    }
}

#[async_trait]
impl StatusNotifier for OctocrabGitHub {
    async fn post_status(
        &self,
        repo: &RepoId,
        sha: &Sha,
        state: CommitState,
        description: &str,
    ) -> Result<(), GitHubError> {
        let route = format!("/repos/{}/{}/statuses/{}", repo.owner(), repo.name(), sha);
        let body = StatusRequest {
            state,
            description,
            context: STATUS_CONTEXT,
        };

        let _: serde_json::Value = self
            .client
            .post(route, Some(&body))
            .await
            .map_err(|err| map_error(err, || format!("commit {sha} in {repo}")))?;

        debug!(%repo, sha = %sha.short(), %state, "posted commit status");
        Ok(())
    }
}
