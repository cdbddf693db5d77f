//! Command line and environment configuration.

use clap::Parser;
use review_window_core::app::config::DEFAULT_DURATION_KEY;
use review_window_core::app::{ConfigError, DurationConfig};

/// Posts a pending commit status on pull requests until their review window
/// has passed.
#[derive(Debug, Parser)]
#[command(name = "review-window", version)]
pub struct Args {
    /// Port for the webhook listener
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Shared secret for `X-Hub-Signature-256`. Without it deliveries are not verified.
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Token used for GitHub API calls
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// API base URL (GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Repositories (owner/name) whose open pull requests are evaluated at startup
    #[arg(long = "startup-repo", env = "STARTUP_REPOS", value_delimiter = ',')]
    pub startup_repos: Vec<String>,

    /// Duration property, e.g. `-D duration=P3D` or `-D duration.hotfix=PT2H`
    #[arg(short = 'D', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Default review window; same as `-D duration=...`
    #[arg(long, env = "REVIEW_WINDOW_DURATION")]
    pub duration: Option<String>,
}

impl Args {
    /// Build the duration configuration. `-D duration=...` wins over `--duration`.
    pub fn durations(&self) -> Result<DurationConfig, ConfigError> {
        let mut properties = Vec::with_capacity(self.properties.len() + 1);
        if let Some(duration) = &self.duration {
            properties.push((DEFAULT_DURATION_KEY.to_string(), duration.clone()));
        }
        for property in &self.properties {
            properties.push(DurationConfig::parse_property(property)?);
        }
        DurationConfig::from_properties(properties)
    }

    pub fn webhook_secret_bytes(&self) -> Option<Vec<u8>> {
        self.webhook_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| secret.as_bytes().to_vec())
    }
}
