//! Timer port - 遅延実行の抽象化
//!
//! A timer runs a deferred action once at (or after) its due time unless the
//! action was cancelled before it started.
//!
//! # 契約
//! - `cancel()` は「これから始まる」実行だけを止める。実行中のアクションは中断しない
//! - アクションは高々 1 回だけ実行される

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// The work a timer runs when it fires. Futures are lazy, so building one does
/// not start it.
pub type DeferredAction = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Shared handle to one scheduled action.
///
/// Clones refer to the same scheduled action; the timer keeps one clone to
/// observe cancellation, the task registry keeps another.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancel: CancellationToken,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prevent the action from starting. Idempotent; a no-op once it started.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Timer side: resolves when `cancel()` is called.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

/// Scheduling facility for deferred actions.
pub trait Timer: Send + Sync {
    /// Run `action` once `due` has been reached. A due time in the past fires
    /// as soon as possible.
    fn schedule_at(&self, due: DateTime<Utc>, action: DeferredAction) -> TaskHandle;
}
