//! Strongly-typed identifiers.
//!
//! # ULID ベースの ID
//! Scheduled completions are identified by a ULID wrapped in a phantom-typed
//! `Id<T>`. The registry compares these ids to decide whether the entry it
//! holds for a commit is still the one a firing completion belongs to.
//!
//! - 時刻でソート可能（timestamp が先頭）
//! - 調整なしで生成可能
//! - `Id<Completion>` と将来の別 ID 型は混同できない

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait supplying the display prefix of an id type.
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "completion-"）
    fn prefix() -> &'static str;
}

/// Generic ULID-backed id.
///
/// `T` is a zero-sized marker; it only exists at compile time.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Scheduled completion のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Completion {}

impl IdMarker for Completion {
    fn prefix() -> &'static str {
        "completion-"
    }
}

/// Identity of one scheduled completion (one registration in the task registry).
pub type CompletionId = Id<Completion>;
