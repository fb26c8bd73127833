//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `http_playground` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Printing the rendered response
//!
//! All core functionality is implemented in the library crate.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use http_playground::config::Opt;
use http_playground::initialization::{init_client, init_logger_with};
use http_playground::response::escape_html;
use http_playground::{play, Config, PlaygroundInput};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let config = Config::from(&opt);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let client = init_client(&config).context("Failed to initialize HTTP client")?;

    // Ctrl-C aborts the exchange; the rendered timeout is still printed
    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_signal.cancel();
        }
    });

    let input = PlaygroundInput {
        headers: opt.header_pairs(),
        method: opt.method,
        target: opt.target,
        body: opt.body,
    };

    let response = play(&config, &client, input, &cancel).await;

    let rendered = if opt.html_escape {
        escape_html(&response.bytes()).into_bytes()
    } else {
        response.bytes()
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&rendered)
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
        .context("Failed to write response")?;

    Ok(())
}
