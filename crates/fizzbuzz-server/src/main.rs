#![doc = include_str!("../README.md")]

mod server;

use anyhow::{Context, bail};
use clap::Parser;
use core::time::Duration;
use server::config::{CliArgs, ServerConfig};
use server::service::handler::FizzBuzzService;
use server::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let listener = TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("could not listen on {}", config.server_addr))?;
    log_startup_info(&config);

    let service = FizzBuzzService::new(&config);
    let res = run_server(listener, service, config.shutdown_grace).await;

    providers.shutdown();
    res
}

/// Serves until a shutdown signal arrives, then drains in-flight requests for
/// at most `grace`.
///
/// An expired grace period is fatal: outstanding evaluations are cancelled and
/// an error is returned so the process exits with a failure status.
async fn run_server(
    listener: TcpListener,
    service: FizzBuzzService,
    grace: Duration,
) -> anyhow::Result<()> {
    let stop = CancellationToken::new();
    let server = axum::serve(listener, service.clone().router())
        .with_graceful_shutdown(stop.clone().cancelled_owned())
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        res = &mut server => {
            // The listener failed before any signal arrived.
            service.shutdown();
            return res.context("server error");
        }
        () = shutdown_signal() => {}
    }

    tracing::info!(
        "Stopped accepting connections; draining {} in-flight requests (grace {grace:?})",
        service.in_flight()
    );
    stop.cancel();

    let drained = tokio::time::timeout(grace, server).await;

    // Whatever is still queued can be abandoned now.
    service.shutdown();

    match drained {
        Ok(res) => {
            res.context("server error")?;
            tracing::info!("Server gracefully stopped");
            Ok(())
        }
        Err(_) => {
            tracing::error!(
                "Graceful shutdown timed out ({} requests still in flight)",
                service.in_flight()
            );
            bail!("server shutdown failed: grace period of {grace:?} elapsed")
        }
    }
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting FizzBuzz service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting FizzBuzz service on {} (max range {}, {} permits, {:?} timeout)",
            config.server_addr,
            config.max_range,
            config.max_concurrency,
            config.request_timeout
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
