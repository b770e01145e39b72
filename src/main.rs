// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use fleet_dns::{
    config::{Cli, Command, LogFormat},
    constants::{DEFAULT_LOG_LEVEL, TOKIO_WORKER_THREADS},
    fleet_api::FleetApiClient,
    handler::{HandleOutcome, LifecycleHandler},
    lifecycle::{parse_notification, Notification},
    server::{self, AppState},
    store::http::HttpDnsStore,
};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("fleet-dns")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

fn init_logging(format: LogFormat) {
    // Respects RUST_LOG if set, otherwise defaults to INFO level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_LEVEL));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging(cli.log_format);
    info!("Starting fleet DNS reconciler");

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("fleet-dns/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let store = Arc::new(HttpDnsStore::new(
        http_client.clone(),
        cli.store_url.clone(),
        cli.api_token.clone(),
    ));
    let fleet = Arc::new(FleetApiClient::new(
        http_client.clone(),
        cli.fleet_api_url.clone(),
        cli.api_token.clone(),
    ));
    let handler = Arc::new(LifecycleHandler::new(
        store,
        fleet.clone(),
        fleet,
        cli.tag_keys(),
    ));
    debug!(tag_prefix = %cli.tag_prefix, "Lifecycle handler created");

    match cli.command {
        Command::Handle { event } => handle_once(&handler, event.as_deref()).await,
        Command::Serve {
            listen,
            events_token,
        } => {
            let listener = tokio::net::TcpListener::bind(listen)
                .await
                .with_context(|| format!("Failed to bind {listen}"))?;
            server::serve(
                listener,
                AppState {
                    handler,
                    http_client,
                    events_token,
                },
            )
            .await
            .context("Notification server failed")
        }
    }
}

async fn handle_once(handler: &LifecycleHandler, path: Option<&Path>) -> Result<()> {
    let body = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read notification from {}", path.display()))?,
        None => {
            let mut body = String::new();
            tokio::io::stdin()
                .read_to_string(&mut body)
                .await
                .context("Failed to read notification from stdin")?;
            body
        }
    };

    match parse_notification(&body)? {
        Notification::SubscriptionConfirmation { subscribe_url } => {
            anyhow::bail!("Subscription confirmations are only handled by `serve` ({subscribe_url})")
        }
        Notification::Event(event) => match handler.handle(&event).await? {
            HandleOutcome::Ignored { transition } => {
                info!(%transition, "Nothing to do for this notification");
                Ok(())
            }
            HandleOutcome::Completed(result) => {
                info!(%result, instance_id = %event.ec2_instance_id, "Lifecycle event handled");
                Ok(())
            }
        },
    }
}
