//! DurationConfig - レビュー期間の設定
//!
//! Durations come in as properties, the same shape as `-Dkey=value` flags:
//!
//! - `duration`: the default window (required)
//! - `duration.<labelName>`: window for pull requests carrying that label
//!
//! Every `duration*` property is parsed here, at startup. A malformed value is
//! a `ConfigError`, so lookups during event processing cannot fail.

use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{DurationParseError, ReviewWindow};

pub const DEFAULT_DURATION_KEY: &str = "duration";
pub const LABEL_DURATION_PREFIX: &str = "duration.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("required property 'duration' (the default review window) is not set")]
    MissingDefault,

    #[error("property '{key}' has an invalid duration '{value}': {source}")]
    InvalidDuration {
        key: String,
        value: String,
        #[source]
        source: DurationParseError,
    },

    #[error("property '{0}' is not of the form key=value")]
    InvalidProperty(String),

    #[error("property 'duration.' does not name a label")]
    EmptyLabel,
}

/// Default window plus per-label overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationConfig {
    default: ReviewWindow,
    overrides: HashMap<String, ReviewWindow>,
}

impl DurationConfig {
    pub fn new(default: ReviewWindow) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, label: impl Into<String>, window: ReviewWindow) -> Self {
        self.overrides.insert(label.into(), window);
        self
    }

    /// Build from `(key, value)` properties. Keys other than `duration` and
    /// `duration.<label>` are ignored; a later key wins over an earlier one.
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut default = None;
        let mut overrides = HashMap::new();

        for (key, value) in properties {
            let (key, value) = (key.as_ref().trim(), value.as_ref());
            if key == DEFAULT_DURATION_KEY {
                default = Some(parse_window(key, value)?);
            } else if let Some(label) = key.strip_prefix(LABEL_DURATION_PREFIX) {
                if label.is_empty() {
                    return Err(ConfigError::EmptyLabel);
                }
                overrides.insert(label.to_string(), parse_window(key, value)?);
            }
        }

        let default = default.ok_or(ConfigError::MissingDefault)?;
        Ok(Self { default, overrides })
    }

    /// Split a `key=value` argument.
    pub fn parse_property(argument: &str) -> Result<(String, String), ConfigError> {
        let (key, value) = argument
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidProperty(argument.to_string()))?;
        if key.trim().is_empty() {
            return Err(ConfigError::InvalidProperty(argument.to_string()));
        }
        Ok((key.trim().to_string(), value.to_string()))
    }

    pub fn default_window(&self) -> ReviewWindow {
        self.default
    }

    pub fn label_override(&self, label: &str) -> Option<ReviewWindow> {
        self.overrides.get(label).copied()
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, ReviewWindow)> {
        self.overrides
            .iter()
            .map(|(label, window)| (label.as_str(), *window))
    }

    /// The first label (in the given order) that has an override, with its
    /// window. Labels without one are skipped; `None` means the default applies.
    pub fn matching_label<'a, S: AsRef<str>>(
        &self,
        labels: &'a [S],
    ) -> Option<(&'a str, ReviewWindow)> {
        labels.iter().find_map(|label| {
            let label = label.as_ref();
            self.label_override(label).map(|window| (label, window))
        })
    }
}

fn parse_window(key: &str, value: &str) -> Result<ReviewWindow, ConfigError> {
    ReviewWindow::parse(value).map_err(|source| ConfigError::InvalidDuration {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })
}
