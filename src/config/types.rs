//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and library configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    MAX_BODY_BYTES, MAX_REDIRECT_HOPS, REQUEST_TIMEOUT, TCP_CONNECT_TIMEOUT_SECS,
    TLS_HANDSHAKE_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Every field has a production default; tests typically only flip
/// `allow_private_targets` so that a local mock server is reachable.
///
/// # Examples
///
/// ```
/// use http_playground::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     request_timeout: Duration::from_secs(10),
///     ..Default::default()
/// };
/// assert_eq!(config.max_redirect_hops, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Overall deadline for one forwarded exchange
    pub request_timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// TLS handshake timeout
    pub tls_handshake_timeout: Duration,

    /// Redirect hops followed before the last response is returned unfollowed
    pub max_redirect_hops: usize,

    /// Cap on request bodies and decompressed response bodies
    pub max_body_bytes: usize,

    /// Skip the private/loopback target check. Only meant for tests and
    /// trusted deployments.
    pub allow_private_targets: bool,

    /// Filter private addresses out of DNS answers before connecting
    pub guard_resolved_addresses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            request_timeout: REQUEST_TIMEOUT,
            connect_timeout: Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            tls_handshake_timeout: Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
            max_redirect_hops: MAX_REDIRECT_HOPS,
            max_body_bytes: MAX_BODY_BYTES,
            allow_private_targets: false,
            guard_resolved_addresses: true,
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Plain GET
/// http_playground GET https://example.com/api
///
/// # POST with headers and a body
/// http_playground POST https://example.com/api -H 'Content-Type: application/json' -d '{"a":1}'
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "http_playground",
    about = "Sends one HTTP request and prints a readable rendering of the response."
)]
pub struct Opt {
    /// HTTP method: GET|POST|PUT|PATCH|DELETE
    #[arg(value_parser)]
    pub method: String,

    /// Target URL
    #[arg(value_parser)]
    pub target: String,

    /// Request header as 'Key: Value' (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short = 'd', long = "data")]
    pub body: Option<String>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Overall request deadline in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,

    /// HTML-escape the rendered response before printing
    #[arg(long)]
    pub html_escape: bool,
}

impl Opt {
    /// Splits each `Key: Value` header argument at the first colon.
    ///
    /// Arguments without a colon become a key with an empty value.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|raw| match raw.split_once(':') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (raw.to_string(), String::new()),
            })
            .collect()
    }
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Self {
            log_level: opt.log_level.clone(),
            log_format: opt.log_format.clone(),
            request_timeout: Duration::from_secs(opt.timeout_seconds),
            ..Default::default()
        }
    }
}
