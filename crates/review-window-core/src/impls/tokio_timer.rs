//! TokioTimer - 本番用のタイマー
//!
//! # 実装詳細
//! - schedule ごとに 1 つの tokio task を spawn する
//! - sleep と CancellationToken を select で競合させる
//! - sleep が勝ったらアクションを最後まで実行する（途中キャンセルなし）

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::ports::{Clock, DeferredAction, TaskHandle, Timer};

/// Timer backed by the Tokio runtime's timer wheel.
///
/// `schedule_at` spawns onto the current runtime, so it must be called from
/// within one.
pub struct TokioTimer<C> {
    clock: C,
}

impl<C: Clock> TokioTimer<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> Timer for TokioTimer<C> {
    fn schedule_at(&self, due: DateTime<Utc>, action: DeferredAction) -> TaskHandle {
        let handle = TaskHandle::new();
        let delay = (due - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
        debug!(%due, delay_secs = delay.as_secs(), "scheduling deferred action");

        let task_handle = handle.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_handle.cancelled() => {
                    debug!(%due, "deferred action cancelled before firing");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            action.await;
        });

        handle
    }
}
