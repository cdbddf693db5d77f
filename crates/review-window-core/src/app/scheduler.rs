//! WindowScheduler - レビュー期間の評価と完了処理の予約
//!
//! # 処理の流れ
//! 1. DurationResolver でラベルから期間を決める
//! 2. `close_time = created_at + window`
//! 3. `now >= close_time` なら即座に完了（success を投稿）
//! 4. そうでなければ pending を投稿し、`close_time` に完了処理を予約する
//!
//! # 完了処理
//! 自分がまだ登録中のエントリのときだけ success を投稿し、そのあと TaskRegistry から外す。
//! 置き換えられた完了処理は何も投稿しない。
//! Status post failures are logged and swallowed on every path; registry
//! bookkeeping always runs.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use crate::app::registry::{ScheduledCompletion, TaskRegistry};
use crate::app::resolver::DurationResolver;
use crate::domain::{
    CommitState, CompletionId, RepoId, ReviewEvent, ReviewWindow, Sha, pending_description,
    success_description,
};
use crate::error::ReviewWindowError;
use crate::ports::{Clock, DeferredAction, IdGenerator, StatusNotifier, Timer};

/// Outcome of one `process` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The window had closed; success was posted right away.
    Elapsed {
        window: ReviewWindow,
        close_time: DateTime<Utc>,
    },
    /// The window is open; a completion is registered for `close_time`.
    Scheduled {
        window: ReviewWindow,
        close_time: DateTime<Utc>,
        completion: CompletionId,
        superseded: Option<CompletionId>,
    },
}

impl Evaluation {
    pub fn close_time(&self) -> DateTime<Utc> {
        match self {
            Evaluation::Elapsed { close_time, .. } | Evaluation::Scheduled { close_time, .. } => {
                *close_time
            }
        }
    }

    pub fn is_elapsed(&self) -> bool {
        matches!(self, Evaluation::Elapsed { .. })
    }
}

pub struct WindowScheduler {
    resolver: DurationResolver,
    registry: Arc<TaskRegistry>,
    notifier: Arc<dyn StatusNotifier>,
    timer: Arc<dyn Timer>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl WindowScheduler {
    pub fn new(
        resolver: DurationResolver,
        registry: Arc<TaskRegistry>,
        notifier: Arc<dyn StatusNotifier>,
        timer: Arc<dyn Timer>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            resolver,
            registry,
            notifier,
            timer,
            clock,
            ids,
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Evaluate one pull request observation.
    ///
    /// Safe to call concurrently, and repeatedly for the same commit: a later
    /// call supersedes the completion registered by an earlier one.
    #[instrument(
        skip_all,
        fields(repo = %event.repo(), pr = %event.number(), sha = %event.sha().short())
    )]
    pub async fn process(&self, event: &ReviewEvent) -> Result<Evaluation, ReviewWindowError> {
        let window = self.resolver.resolve(event.repo(), event.number()).await?;
        let close_time = window.close_time(event.created_at()).ok_or(
            ReviewWindowError::CloseTimeOutOfRange {
                created_at: event.created_at(),
                window,
            },
        )?;
        let now = self.clock.now();

        if now >= close_time {
            info!(%window, %close_time, "review window has passed");
            if let Some(stale) = self.registry.cancel_and_remove(event.sha()) {
                debug!(completion = %stale, "cancelled stale completion");
            }
            post(
                self.notifier.as_ref(),
                event.repo(),
                event.sha(),
                CommitState::Success,
                &success_description(),
            )
            .await;
            return Ok(Evaluation::Elapsed { window, close_time });
        }

        info!(%window, %close_time, "review window has not passed");
        post(
            self.notifier.as_ref(),
            event.repo(),
            event.sha(),
            CommitState::Pending,
            &pending_description(&window),
        )
        .await;

        let completion = self.ids.generate_completion_id();
        let (armed, armed_rx) = oneshot::channel();
        let action = deferred_completion(
            Arc::clone(&self.registry),
            Arc::clone(&self.notifier),
            event.repo().clone(),
            event.sha().clone(),
            completion,
            armed_rx,
        );
        let handle = self.timer.schedule_at(close_time, action);
        let superseded = self.registry.put(
            event.sha().clone(),
            ScheduledCompletion::new(completion, close_time, handle),
        );
        // 登録後に発火を許可する（登録前に完了してエントリが残るのを防ぐ）
        let _ = armed.send(());

        if let Some(previous) = superseded {
            debug!(%completion, %previous, "superseded earlier completion");
        }
        Ok(Evaluation::Scheduled {
            window,
            close_time,
            completion,
            superseded,
        })
    }
}

/// The deferred "complete" action. It waits until its registration is visible
/// so that the identity checks always see it, and posts nothing once a later
/// event has taken over the commit.
fn deferred_completion(
    registry: Arc<TaskRegistry>,
    notifier: Arc<dyn StatusNotifier>,
    repo: RepoId,
    sha: Sha,
    completion: CompletionId,
    armed: oneshot::Receiver<()>,
) -> DeferredAction {
    Box::pin(async move {
        let _ = armed.await;

        if registry.current(&sha) != Some(completion) {
            debug!(%repo, sha = %sha.short(), %completion, "completion was superseded before posting");
            return;
        }

        info!(%repo, sha = %sha.short(), %completion, "review window closed");
        post(
            notifier.as_ref(),
            &repo,
            &sha,
            CommitState::Success,
            &success_description(),
        )
        .await;

        if registry.remove_if_current(&sha, completion) {
            debug!(%completion, "completion retired");
        } else {
            debug!(%completion, "completion was superseded; registry left as is");
        }
    })
}

async fn post(
    notifier: &dyn StatusNotifier,
    repo: &RepoId,
    sha: &Sha,
    state: CommitState,
    description: &str,
) {
    if let Err(err) = notifier.post_status(repo, sha, state, description).await {
        warn!(%repo, sha = %sha.short(), %state, error = %err, "failed to post commit status");
    }
}
