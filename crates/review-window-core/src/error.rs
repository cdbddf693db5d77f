use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::app::ConfigError;
use crate::domain::ReviewWindow;
use crate::ports::GitHubError;

/// Failure of one evaluation or of startup wiring.
///
/// Status post failures never show up here; they are logged where they happen.
#[derive(Debug, Error)]
pub enum ReviewWindowError {
    #[error("repository lookup failed: {0}")]
    GitHub(#[from] GitHubError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("review window of {window} from {created_at} ends past the supported calendar")]
    CloseTimeOutOfRange {
        created_at: DateTime<Utc>,
        window: ReviewWindow,
    },
}
