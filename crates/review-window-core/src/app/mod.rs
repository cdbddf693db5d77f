//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **DurationConfig / DurationResolver**: ラベルからレビュー期間を決める
//! - **TaskRegistry**: SHA ごとの予約済み完了処理（置き換え・ID 一致削除）
//! - **WindowScheduler**: 期間の評価、status 投稿、完了処理の予約
//! - **StartupReplay**: 起動時に open な PR を再評価
//! - **AppBuilder**: アプリケーションの構築とワイヤリング

pub mod builder;
pub mod config;
pub mod registry;
pub mod replay;
pub mod resolver;
pub mod scheduler;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::config::{ConfigError, DurationConfig};
pub use self::registry::{PendingCompletion, ScheduledCompletion, TaskRegistry};
pub use self::replay::{ReplaySummary, StartupReplay};
pub use self::resolver::DurationResolver;
pub use self::scheduler::{Evaluation, WindowScheduler};
