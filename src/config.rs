// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command line and environment configuration.
//!
//! Every option can be given as a flag or through its `FLEET_DNS_*`
//! environment variable; flags win.

use crate::constants::{DEFAULT_LISTEN_ADDR, DEFAULT_TAG_PREFIX};
use crate::zone_config::TagKeys;
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Keep DNS records in sync with fleet lifecycle events.
#[derive(Debug, Clone, Parser)]
#[command(name = "fleet-dns", version, about)]
pub struct Cli {
    /// Base URL of the hosted-zone API
    #[arg(long, env = "FLEET_DNS_STORE_URL")]
    pub store_url: Url,

    /// Base URL of the fleet orchestrator API
    #[arg(long, env = "FLEET_DNS_FLEET_API_URL")]
    pub fleet_api_url: Url,

    /// Bearer token sent to both APIs
    #[arg(long, env = "FLEET_DNS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Prefix of the instance tags carrying DNS configuration
    #[arg(long, env = "FLEET_DNS_TAG_PREFIX", default_value = DEFAULT_TAG_PREFIX)]
    pub tag_prefix: String,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Handle a single notification read from a file or stdin
    Handle {
        /// Notification file; stdin when omitted
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Receive notifications over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "FLEET_DNS_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
        listen: SocketAddr,

        /// Shared secret required on every `POST /events` request
        #[arg(long, env = "FLEET_DNS_EVENTS_TOKEN", hide_env_values = true)]
        events_token: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    #[must_use]
    pub fn tag_keys(&self) -> TagKeys {
        TagKeys::with_prefix(&self.tag_prefix)
    }
}
