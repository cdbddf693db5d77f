use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use review_window_core::app::AppBuilder;
use review_window_core::impls::CachedRepositoryLookup;
use review_window_core::ports::RepositoryLookup;
use review_window_server::config::Args;
use review_window_server::github::OctocrabGitHub;
use review_window_server::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "review_window_core=info,review_window_server=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let durations = args
        .durations()
        .context("invalid review window configuration")?;
    info!(
        default = %durations.default_window(),
        label_overrides = durations.overrides().count(),
        "review windows configured"
    );

    let github = Arc::new(
        OctocrabGitHub::from_token(args.github_token.clone(), args.github_api_url.as_deref())
            .context("failed to build GitHub client")?,
    );

    let lookup: Arc<dyn RepositoryLookup> = Arc::new(CachedRepositoryLookup::new(github.clone()));

    let app = AppBuilder::new()
        .repository_lookup(Arc::clone(&lookup))
        .status_notifier(github.clone())
        .durations(durations)
        .build()
        .context("failed to wire application")?;

    // Registry state does not survive restarts; rebuild it before taking events.
    if !args.startup_repos.is_empty() {
        let summary = app
            .replay
            .run(&args.startup_repos)
            .await
            .context("startup replay failed")?;
        info!(
            repositories = summary.repositories,
            processed = summary.processed,
            failed = summary.failed,
            "startup replay finished"
        );
    }

    let webhook_secret = args.webhook_secret_bytes();
    if webhook_secret.is_none() {
        warn!("no webhook secret configured; deliveries are not verified");
    }

    let state = AppState::new(Arc::clone(&app.scheduler), lookup, webhook_secret);
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let cancelled = app.registry.cancel_all();
    info!(cancelled, "shut down; pending completions cancelled");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
