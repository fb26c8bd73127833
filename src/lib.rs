//! http_playground library: forward one HTTP request and render the response
//!
//! This library sends a caller-described request (method, target URL, headers,
//! body) to its target and turns the response actually received into a
//! readable text artifact: status line, sorted headers, and a body
//! pretty-printed according to its media type.
//!
//! The pipeline runs strictly forward:
//! - target validation (method allow-list, private and loopback addresses)
//! - forwarding under one deadline, with manual redirect handling
//! - content negotiation (media type to engine, encoding to decoder, size cap)
//! - formatting (text, JSON, XML, HTML)
//! - response assembly, where any failure replaces the body with its message
//!
//! # Example
//!
//! ```no_run
//! use http_playground::initialization::init_client;
//! use http_playground::{play, Config, PlaygroundInput};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let client = init_client(&config)?;
//!
//! let input = PlaygroundInput {
//!     method: "GET".to_string(),
//!     target: "https://example.com/".to_string(),
//!     ..Default::default()
//! };
//!
//! let response = play(&config, &client, input, &CancellationToken::new()).await;
//! println!("{}", response);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Forwarding requires a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod format;
pub mod initialization;
pub mod negotiate;
pub mod response;
pub mod security;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::PlaygroundError;
pub use response::ResponseBuilder;
pub use run::{play, PlaygroundInput};

// Internal run module (the request pipeline)
mod run {
    use tokio_util::sync::CancellationToken;

    use crate::config::Config;
    use crate::error_handling::PlaygroundError;
    use crate::fetch::{Forwarder, InboundResult, OutboundRequest};
    use crate::initialization::HttpClient;
    use crate::negotiate::negotiate;
    use crate::response::ResponseBuilder;

    /// One request as described by the caller.
    #[derive(Debug, Clone, Default)]
    pub struct PlaygroundInput {
        /// HTTP method, matched case-sensitively against the allow-list
        pub method: String,
        /// Target URL
        pub target: String,
        /// Header pairs in the order given; keys are case-insensitive
        pub headers: Vec<(String, String)>,
        /// Optional request body
        pub body: Option<String>,
    }

    /// Forwards `input` and assembles the rendered response.
    ///
    /// This never fails: any error replaces the body with the error's
    /// caller-visible message and resets the headers to the defaults. The
    /// returned response never mixes success content with an error.
    ///
    /// Cancelling `cancel` aborts the exchange; the result then carries the
    /// timeout message.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use http_playground::initialization::init_client;
    /// use http_playground::{play, Config, PlaygroundInput};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config::default();
    /// let client = init_client(&config)?;
    /// let input = PlaygroundInput {
    ///     method: "CONNECT".to_string(),
    ///     target: "https://example.com/".to_string(),
    ///     ..Default::default()
    /// };
    ///
    /// let response = play(&config, &client, input, &CancellationToken::new()).await;
    /// assert_eq!(response.body(), b"method CONNECT is not allowed");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn play(
        config: &Config,
        client: &HttpClient,
        input: PlaygroundInput,
        cancel: &CancellationToken,
    ) -> ResponseBuilder {
        let mut response = ResponseBuilder::new();

        match exchange(config, client, input, cancel).await {
            Ok((inbound, body)) => {
                response.set_start_line(&inbound.proto, &inbound.status);
                response.set_headers(&inbound.headers);
                response.write(&body);
            }
            Err(e) => {
                log::warn!("[{}] {}", e.class(), e.detail());
                response.write_error(&e);
                response.default_headers();
            }
        }

        response
    }

    /// Runs every fallible stage; the response is only touched once this
    /// returns.
    async fn exchange(
        config: &Config,
        client: &HttpClient,
        input: PlaygroundInput,
        cancel: &CancellationToken,
    ) -> Result<(InboundResult, Vec<u8>), PlaygroundError> {
        let PlaygroundInput {
            method,
            target,
            headers,
            body,
        } = input;

        let request = OutboundRequest::new(&method, &target, headers, body)?;
        log::debug!("Forwarding {} {}", request.method(), request.target());

        let forwarder = Forwarder::new(client.clone(), config.clone());
        let mut inbound = forwarder.forward(&request, cancel).await?;

        let raw = std::mem::take(&mut inbound.body);
        let formatted = negotiate(
            inbound.content_type(),
            inbound.content_encoding(),
            raw,
            config.max_body_bytes,
        )?;
        log::debug!(
            "Rendered {} {} with {} engine ({} bytes)",
            inbound.proto,
            inbound.status,
            formatted.engine,
            formatted.bytes.len()
        );

        Ok((inbound, formatted.bytes))
    }
}
