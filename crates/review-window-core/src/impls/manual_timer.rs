//! ManualTimer - テスト用の決定的なタイマー
//!
//! Nothing fires on its own. Tests decide when due actions start, which makes
//! the "fired while being superseded" interleaving reproducible: `start_due`
//! takes the actions out (they count as started, cancellation no longer
//! applies) and the test runs them whenever it wants.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

use crate::ports::{DeferredAction, TaskHandle, Timer};

struct ManualEntry {
    due: DateTime<Utc>,
    handle: TaskHandle,
    action: DeferredAction,
}

/// An action that has started but not yet run.
pub struct StartedAction {
    due: DateTime<Utc>,
    handle: TaskHandle,
    action: DeferredAction,
}

impl StartedAction {
    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Run to completion. Cancelling the handle meanwhile has no effect.
    pub async fn run(self) {
        self.action.await;
    }
}

#[derive(Default)]
pub struct ManualTimer {
    entries: Mutex<Vec<ManualEntry>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ManualEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Actions still waiting to fire (not cancelled, not started).
    pub fn scheduled(&self) -> usize {
        self.lock()
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .count()
    }

    /// Earliest due time among waiting actions.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.lock()
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .map(|entry| entry.due)
            .min()
    }

    /// Start every waiting action due at or before `now`, in due order.
    /// Cancelled actions are discarded here and never start.
    pub fn start_due(&self, now: DateTime<Utc>) -> Vec<StartedAction> {
        let mut entries = self.lock();
        let (ready, waiting): (Vec<_>, Vec<_>) =
            entries.drain(..).partition(|entry| entry.due <= now);
        *entries = waiting;
        drop(entries);

        let mut started: Vec<StartedAction> = ready
            .into_iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .map(|entry| StartedAction {
                due: entry.due,
                handle: entry.handle,
                action: entry.action,
            })
            .collect();
        started.sort_by_key(|action| action.due);
        started
    }

    /// Start and run every action due at or before `now`. Returns how many ran.
    pub async fn fire_due(&self, now: DateTime<Utc>) -> usize {
        let started = self.start_due(now);
        let count = started.len();
        for action in started {
            action.run().await;
        }
        count
    }

    /// Run everything that is still waiting, regardless of due time.
    pub async fn fire_all(&self) -> usize {
        self.fire_due(DateTime::<Utc>::MAX_UTC).await
    }
}

impl Timer for ManualTimer {
    fn schedule_at(&self, due: DateTime<Utc>, action: DeferredAction) -> TaskHandle {
        let handle = TaskHandle::new();
        self.lock().push(ManualEntry {
            due,
            handle: handle.clone(),
            action,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn counting_action(counter: &Arc<AtomicUsize>) -> DeferredAction {
        let counter = Arc::clone(counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn fires_only_due_actions() {
        let timer = ManualTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.schedule_at(start() + TimeDelta::minutes(1), counting_action(&fired));
        timer.schedule_at(start() + TimeDelta::hours(1), counting_action(&fired));
        assert_eq!(timer.scheduled(), 2);
        assert_eq!(timer.next_due(), Some(start() + TimeDelta::minutes(1)));

        assert_eq!(timer.fire_due(start() + TimeDelta::minutes(5)).await, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.scheduled(), 1);
        assert_eq!(timer.next_due(), Some(start() + TimeDelta::hours(1)));

        assert_eq!(timer.fire_all().await, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_actions_are_discarded() {
        let timer = ManualTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let handle = timer.schedule_at(start(), counting_action(&fired));
        handle.cancel();

        assert_eq!(timer.scheduled(), 0);
        assert_eq!(timer.fire_all().await, 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn started_action_ignores_late_cancel() {
        let timer = ManualTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        timer.schedule_at(start(), counting_action(&fired));
        let mut started = timer.start_due(start());
        assert_eq!(started.len(), 1);

        let action = started.remove(0);
        action.handle().cancel();
        action.run().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
