use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repo::{PrNumber, RepoId, Sha};

/// One pull request observation: a webhook delivery or a startup replay entry.
///
/// Immutable once built; every evaluation recomputes the window from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    repo: RepoId,
    number: PrNumber,
    sha: Sha,
    created_at: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn new(
        repo: RepoId,
        number: impl Into<PrNumber>,
        sha: impl Into<Sha>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            repo,
            number: number.into(),
            sha: sha.into(),
            created_at,
        }
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn number(&self) -> PrNumber {
        self.number
    }

    pub fn sha(&self) -> &Sha {
        &self.sha
    }

    /// Pull request creation time. The window is measured from here.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
