//! TaskRegistry - コミット SHA ごとの予約済み完了処理
//!
//! # 不変条件
//! - 1 つの SHA に対して生きている（未キャンセルの）エントリは高々 1 つ
//! - `put` は古いエントリをキャンセルしてから置き換える（同じシャードロック内）
//! - `remove_if_current` は ID が一致するときだけ削除する
//!
//! The identity check is what keeps a superseded completion, which may already
//! be running, from removing its replacement.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;

use crate::domain::{CompletionId, Sha};
use crate::ports::TaskHandle;

/// Registry entry: one scheduled success post.
#[derive(Debug, Clone)]
pub struct ScheduledCompletion {
    id: CompletionId,
    due: DateTime<Utc>,
    handle: TaskHandle,
}

impl ScheduledCompletion {
    pub fn new(id: CompletionId, due: DateTime<Utc>, handle: TaskHandle) -> Self {
        Self { id, due, handle }
    }

    pub fn id(&self) -> CompletionId {
        self.id
    }

    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }
}

/// Read-only view of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCompletion {
    pub sha: Sha,
    pub id: CompletionId,
    pub due: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: DashMap<Sha, ScheduledCompletion>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `completion` for `sha`. A previous entry is cancelled before it
    /// is replaced; its id is returned.
    pub fn put(&self, sha: Sha, completion: ScheduledCompletion) -> Option<CompletionId> {
        match self.tasks.entry(sha) {
            Entry::Occupied(mut occupied) => {
                occupied.get().handle.cancel();
                let previous = occupied.insert(completion);
                Some(previous.id)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(completion);
                None
            }
        }
    }

    /// Remove the entry for `sha` only if it is still the one identified by
    /// `id`. Returns whether something was removed.
    pub fn remove_if_current(&self, sha: &Sha, id: CompletionId) -> bool {
        self.tasks
            .remove_if(sha, |_, current| current.id == id)
            .is_some()
    }

    /// Cancel and drop whatever is stored for `sha`.
    pub fn cancel_and_remove(&self, sha: &Sha) -> Option<CompletionId> {
        self.tasks.remove(sha).map(|(_, completion)| {
            completion.handle.cancel();
            completion.id
        })
    }

    /// Cancel every entry. Used on shutdown.
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        self.tasks.retain(|_, completion| {
            completion.handle.cancel();
            cancelled += 1;
            false
        });
        cancelled
    }

    pub fn current(&self, sha: &Sha) -> Option<CompletionId> {
        self.tasks.get(sha).map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Snapshot of all entries, earliest due first.
    pub fn pending(&self) -> Vec<PendingCompletion> {
        let mut pending: Vec<PendingCompletion> = self
            .tasks
            .iter()
            .map(|entry| PendingCompletion {
                sha: entry.key().clone(),
                id: entry.id,
                due: entry.due,
            })
            .collect();
        pending.sort_by_key(|completion| completion.due);
        pending
    }
}
