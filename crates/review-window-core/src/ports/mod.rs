//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。各 trait は外部の協調者
//! （GitHub API、時計、タイマー）へのインターフェースで、実装の詳細を隠す。
//! 本番実装は `impls` と server crate に、テスト用の実装は `impls` にある。

pub mod clock;
pub mod github;
pub mod id_generator;
pub mod status_notifier;
pub mod timer;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::github::{GitHubError, OpenPullRequest, RepositoryLookup};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::status_notifier::StatusNotifier;
pub use self::timer::{DeferredAction, TaskHandle, Timer};
