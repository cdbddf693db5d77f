//! review-window-core
//!
//! Core of the review window service: a pull request gets a pending commit
//! status until a configured amount of time has passed since it was opened,
//! then a success status.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, repo, event, window, status）
//! - **ports**: 抽象化レイヤー（RepositoryLookup, StatusNotifier, Timer, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（config, resolver, registry, scheduler, replay, builder）
//! - **impls**: 実装（TokioTimer と、テスト・開発用の ManualTimer / InMemoryGitHub / RecordingNotifier）
//! - **error**: 評価・起動時のエラー型

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use self::error::ReviewWindowError;
