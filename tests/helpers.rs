// Shared test helpers for running the pipeline against local mock servers.

use tokio_util::sync::CancellationToken;

use http_playground::initialization::init_client;
use http_playground::{play, Config, PlaygroundInput, ResponseBuilder};

/// Configuration that lets requests reach a mock server on loopback.
#[allow(dead_code)] // Used by other test files
pub fn local_config() -> Config {
    Config {
        allow_private_targets: true,
        ..Default::default()
    }
}

/// Builds caller input without headers or body.
#[allow(dead_code)] // Used by other test files
pub fn input(method: &str, target: &str) -> PlaygroundInput {
    PlaygroundInput {
        method: method.to_string(),
        target: target.to_string(),
        ..Default::default()
    }
}

/// Runs the whole pipeline with a fresh client and an uncancelled token.
#[allow(dead_code)] // Used by other test files
pub async fn run(config: &Config, input: PlaygroundInput) -> ResponseBuilder {
    let client = init_client(config).expect("Failed to build HTTP client");
    play(config, &client, input, &CancellationToken::new()).await
}

/// Asserts that `response` is a synthesized error response carrying `message`.
#[allow(dead_code)] // Used by other test files
pub fn assert_error_response(response: &ResponseBuilder, message: &str) {
    assert_eq!(
        String::from_utf8_lossy(response.body()),
        message,
        "unexpected error body"
    );
    assert_eq!(response.status_line(), "HTTP/1.0 200 OK");

    let keys: Vec<&str> = response.headers().iter().map(|(key, _)| key).collect();
    assert_eq!(
        keys,
        ["Content-Length", "Content-Type", "Date", "Server"],
        "error responses carry exactly the default headers"
    );
    assert_eq!(
        response.headers().get("Content-Length"),
        Some(message.len().to_string().as_str())
    );
}
