//! StartupReplay - 起動時に open な PR を再評価する
//!
//! Registry state does not survive a restart. On startup every open pull
//! request of the configured repositories goes through `WindowScheduler::process`
//! again, exactly like a live event, so pending completions are rebuilt.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::app::scheduler::WindowScheduler;
use crate::domain::ReviewEvent;
use crate::error::ReviewWindowError;
use crate::ports::RepositoryLookup;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub repositories: usize,
    pub processed: usize,
    pub failed: usize,
}

pub struct StartupReplay {
    lookup: Arc<dyn RepositoryLookup>,
    scheduler: Arc<WindowScheduler>,
}

impl StartupReplay {
    pub fn new(lookup: Arc<dyn RepositoryLookup>, scheduler: Arc<WindowScheduler>) -> Self {
        Self { lookup, scheduler }
    }

    /// Replay every open pull request of `repositories` (full names).
    ///
    /// Failing to fetch a repository or its pull request list aborts the
    /// replay. A failure on one pull request is logged and counted; the others
    /// still run.
    pub async fn run<S: AsRef<str>>(
        &self,
        repositories: &[S],
    ) -> Result<ReplaySummary, ReviewWindowError> {
        let mut summary = ReplaySummary::default();

        for full_name in repositories {
            let repo = self.lookup.repository(full_name.as_ref()).await?;
            let pulls = self.lookup.open_pull_requests(&repo).await?;
            info!(%repo, open = pulls.len(), "replaying open pull requests");
            summary.repositories += 1;

            for pull in pulls {
                let event =
                    ReviewEvent::new(repo.clone(), pull.number, pull.head_sha, pull.created_at);
                match self.scheduler.process(&event).await {
                    Ok(_) => summary.processed += 1,
                    Err(err) => {
                        error!(%repo, pr = %pull.number, error = %err, "replay failed for pull request");
                        summary.failed += 1;
                    }
                }
            }
        }

        Ok(summary)
    }
}
