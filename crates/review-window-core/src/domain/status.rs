use serde::{Deserialize, Serialize};
use std::fmt;

use super::window::ReviewWindow;

/// Commit status context. Re-posting under the same context overwrites the
/// previous status, which keeps repeated posts for one commit harmless.
pub const STATUS_CONTEXT: &str = "review-window";

/// Commit status states this service posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Success => "success",
        }
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description posted while the window is still open.
pub fn pending_description(window: &ReviewWindow) -> String {
    let rendered = window.humanize();
    if rendered.is_empty() {
        "The review window has not passed".to_string()
    } else {
        format!("The review window of {rendered} has not passed")
    }
}

/// Description posted once the window has closed.
pub fn success_description() -> String {
    "The review window has passed".to_string()
}
