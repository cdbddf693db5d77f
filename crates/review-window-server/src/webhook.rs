//! Webhook endpoint handler.
//!
//! Every `pull_request` delivery, whatever its action, is evaluated right away:
//! the window is re-resolved from the current labels and the commit status is
//! posted or scheduled. `ping` answers with its zen line.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use review_window_core::ReviewWindowError;
use review_window_core::app::Evaluation;
use review_window_core::domain::ReviewEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::signature::verify_signature;

const HEADER_EVENT: &str = "x-github-event";
const HEADER_DELIVERY: &str = "x-github-delivery";
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("evaluation failed: {0}")]
    Evaluation(#[from] ReviewWindowError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) | WebhookError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::Evaluation(ReviewWindowError::GitHub(_)) => StatusCode::BAD_GATEWAY,
            WebhookError::Evaluation(
                ReviewWindowError::Config(_) | ReviewWindowError::CloseTimeOutOfRange { .. },
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PingPayload {
    #[serde(default)]
    pub zen: Option<String>,
}

/// The parts of a `pull_request` delivery this service reads.
#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub action: Option<String>,
    pub repository: RepositoryPayload,
    pub pull_request: PullRequestBody,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryPayload {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestBody {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub head: HeadPayload,
}

#[derive(Debug, Deserialize)]
pub struct HeadPayload {
    pub sha: String,
}

/// Body of a 202 response.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookResponse {
    Elapsed {
        sha: String,
        window: String,
        close_time: DateTime<Utc>,
    },
    Scheduled {
        sha: String,
        window: String,
        close_time: DateTime<Utc>,
        completion: String,
    },
    Ignored {
        event: String,
    },
}

impl WebhookResponse {
    fn from_evaluation(sha: &str, evaluation: &Evaluation) -> Self {
        match evaluation {
            Evaluation::Elapsed { window, close_time } => WebhookResponse::Elapsed {
                sha: sha.to_string(),
                window: window.to_string(),
                close_time: *close_time,
            },
            Evaluation::Scheduled {
                window,
                close_time,
                completion,
                ..
            } => WebhookResponse::Scheduled {
                sha: sha.to_string(),
                window: window.to_string(),
                close_time: *close_time,
                completion: completion.to_string(),
            },
        }
    }
}

/// `POST /webhook`
///
/// - 200: `ping`, body is the zen line
/// - 202: `pull_request` evaluated, or any other event ignored
/// - 400: missing `X-GitHub-Event` (or signature header while a secret is
///   configured), malformed JSON
/// - 401: signature does not match
/// - 502: repository or label lookup failed; no status was posted
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery = get_header(&headers, HEADER_DELIVERY).unwrap_or_default();
    debug!(%delivery, event = %event_type, "received webhook");

    if let Some(secret) = state.webhook_secret() {
        let signature = get_header(&headers, HEADER_SIGNATURE)?;
        if !verify_signature(&body, &signature, secret) {
            warn!(%delivery, "invalid webhook signature");
            return Err(WebhookError::InvalidSignature);
        }
    }

    match event_type.as_str() {
        "ping" => {
            let ping: PingPayload = serde_json::from_slice(&body)?;
            Ok((StatusCode::OK, ping.zen.unwrap_or_default()).into_response())
        }
        "pull_request" => {
            let payload: PullRequestPayload = serde_json::from_slice(&body)?;
            let response = handle_pull_request(&state, payload).await.inspect_err(|err| {
                error!(%delivery, error = %err, "pull request evaluation failed");
            })?;
            Ok((StatusCode::ACCEPTED, Json(response)).into_response())
        }
        other => {
            debug!(%delivery, event = other, "ignoring event");
            let response = WebhookResponse::Ignored {
                event: other.to_string(),
            };
            Ok((StatusCode::ACCEPTED, Json(response)).into_response())
        }
    }
}

async fn handle_pull_request(
    state: &AppState,
    payload: PullRequestPayload,
) -> Result<WebhookResponse, WebhookError> {
    let PullRequestPayload {
        action,
        repository,
        pull_request,
    } = payload;

    let repo = state
        .lookup()
        .repository(&repository.full_name)
        .await
        .map_err(ReviewWindowError::from)?;
    info!(
        %repo,
        pr = pull_request.number,
        action = action.as_deref().unwrap_or("unknown"),
        "pull request event"
    );

    let event = ReviewEvent::new(
        repo,
        pull_request.number,
        pull_request.head.sha,
        pull_request.created_at,
    );
    let evaluation = state.scheduler().process(&event).await?;
    Ok(WebhookResponse::from_evaluation(
        event.sha().as_str(),
        &evaluation,
    ))
}

fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or(WebhookError::MissingHeader(name))
}
