//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use crate::app::config::DurationConfig;
use crate::app::registry::TaskRegistry;
use crate::app::replay::StartupReplay;
use crate::app::resolver::DurationResolver;
use crate::app::scheduler::WindowScheduler;
use crate::impls::TokioTimer;
use crate::ports::{
    Clock, IdGenerator, RepositoryLookup, StatusNotifier, SystemClock, Timer, UlidGenerator,
};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .repository_lookup(github.clone())
///     .status_notifier(github)
///     .durations(DurationConfig::from_properties(properties)?)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - repository lookup / status notifier / durations は必須
/// - build() 時に不足している部品を全部まとめて BuildError で返す
/// - clock / timer / id generator は省略するとシステム時計ベースの実装になる
pub struct AppBuilder {
    lookup: Option<Arc<dyn RepositoryLookup>>,
    notifier: Option<Arc<dyn StatusNotifier>>,
    durations: Option<DurationConfig>,
    timer: Option<Arc<dyn Timer>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These must be provided before build().")]
    MissingComponents(Vec<&'static str>),
}

impl AppBuilder {
    /// 新しい AppBuilder を作成
    pub fn new() -> Self {
        Self {
            lookup: None,
            notifier: None,
            durations: None,
            timer: None,
            clock: None,
            ids: None,
        }
    }

    pub fn repository_lookup(mut self, lookup: Arc<dyn RepositoryLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn status_notifier(mut self, notifier: Arc<dyn StatusNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn durations(mut self, durations: DurationConfig) -> Self {
        self.durations = Some(durations);
        self
    }

    pub fn timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = Some(timer);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// # 検証
    /// - 必須の部品が全て設定されているかチェック
    /// - 不足があれば BuildError::MissingComponents を返す
    pub fn build(self) -> Result<App, BuildError> {
        let (lookup, notifier, durations) = match (self.lookup, self.notifier, self.durations) {
            (Some(lookup), Some(notifier), Some(durations)) => (lookup, notifier, durations),
            (lookup, notifier, durations) => {
                let mut missing = Vec::new();
                if lookup.is_none() {
                    missing.push("repository_lookup");
                }
                if notifier.is_none() {
                    missing.push("status_notifier");
                }
                if durations.is_none() {
                    missing.push("durations");
                }
                return Err(BuildError::MissingComponents(missing));
            }
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let timer = self
            .timer
            .unwrap_or_else(|| Arc::new(TokioTimer::new(Arc::clone(&clock))));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        let registry = Arc::new(TaskRegistry::new());
        let scheduler = Arc::new(WindowScheduler::new(
            DurationResolver::new(Arc::clone(&lookup), durations),
            Arc::clone(&registry),
            notifier,
            timer,
            clock,
            ids,
        ));
        let replay = StartupReplay::new(lookup, Arc::clone(&scheduler));

        Ok(App {
            scheduler,
            registry,
            replay,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App はアプリケーションのランタイム
///
/// - scheduler: webhook から呼ばれる評価の入口
/// - registry: 予約中の完了処理（観測・シャットダウン用）
/// - replay: 起動時の再評価
pub struct App {
    pub scheduler: Arc<WindowScheduler>,
    pub registry: Arc<TaskRegistry>,
    pub replay: StartupReplay,
}
