use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use train_checker::config::{CONFIG_PATH_VAR, Config, DEFAULT_CONFIG_PATH};
use train_checker::darwin::DarwinClient;
use train_checker::scheduler::TrainCheckScheduler;
use train_checker::service::TrainService;
use train_checker::telegram::TelegramClient;
use train_checker::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(%path, error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let routes = config
        .default_pair()
        .and_then(|pair| config.jobs().map(|jobs| (pair, jobs)));
    let (default_pair, jobs) = match routes {
        Ok(routes) => routes,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let darwin = match DarwinClient::new(config.darwin_config()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to create departures client");
            return ExitCode::FAILURE;
        }
    };
    let telegram = match TelegramClient::new(config.telegram_config()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to create Telegram client");
            return ExitCode::FAILURE;
        }
    };
    let trains = TrainService::new(Arc::new(darwin), Arc::new(telegram));

    let startup = format!(
        "{} v{} started",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    match trains.announce(&startup).await {
        Ok(()) => tracing::info!("{startup}"),
        Err(e) => tracing::warn!(error = %e, "failed to send startup notification"),
    }

    let scheduler = match TrainCheckScheduler::start(trains.clone(), jobs).await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!(error = %e, "failed to start scheduler");
            return ExitCode::FAILURE;
        }
    };

    let app = create_router(AppState::new(trains, default_pair));
    let listener = match tokio::net::TcpListener::bind(config.server.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %config.server.bind, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(addr = %config.server.bind, "listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "server error");
    }

    if let Err(e) = scheduler.shutdown(config.shutdown_grace()).await {
        tracing::error!(error = %e, "failed to stop scheduler");
    }

    if served.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
