//! Impls - ポートの実装
//!
//! - **TokioTimer**: 本番用の遅延実行
//! - **ManualTimer**: テスト用（発火タイミングをテストが決める）
//! - **InMemoryGitHub / RecordingNotifier**: ネットワーク不要の協調者
//! - **CachedRepositoryLookup**: リポジトリ解決結果のメモ化

pub mod cached_lookup;
pub mod manual_timer;
pub mod memory;
pub mod tokio_timer;

pub use self::cached_lookup::CachedRepositoryLookup;
pub use self::manual_timer::{ManualTimer, StartedAction};
pub use self::memory::{InMemoryGitHub, PostedStatus, RecordingNotifier};
pub use self::tokio_timer::TokioTimer;
