//! HTTP forwarding.
//!
//! This module provides:
//! - `OutboundRequest`, the immutable validated request
//! - `HeaderMultimap`, the canonical-key header store shared with the
//!   response assembler
//! - `Forwarder`, which sends the request, follows redirects, and captures
//!   the final response under one deadline

mod headers;
mod redirects;
mod request;
mod response;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::{PlaygroundError, TransportError};
use crate::initialization::HttpClient;

pub use headers::{canonical_header_key, HeaderMultimap};
pub use request::OutboundRequest;
pub use response::InboundResult;

use redirects::follow_redirects;

/// Sends outbound requests with a shared client.
///
/// Redirects are handled here, never by the client (see `init_client`). A
/// `Forwarder` holds no per-request state, so one instance can serve any
/// number of concurrent calls.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: HttpClient,
    config: Config,
}

impl Forwarder {
    /// Wraps a shared client; `config` supplies the deadline, hop limit,
    /// body cap, and private-target policy.
    pub fn new(client: HttpClient, config: Config) -> Self {
        Self { client, config }
    }

    /// Forwards the request and captures the final response.
    ///
    /// All redirect hops and the body read share the single deadline
    /// `config.request_timeout`. Cancelling `cancel` aborts the exchange
    /// wherever it is; expiry and cancellation both surface as
    /// `TransportError::Timeout`.
    ///
    /// # Errors
    ///
    /// Validation errors for unsafe hops, transport errors for wire
    /// failures, and `ContentError::BodyTooLarge` for an oversized body.
    pub async fn forward(
        &self,
        request: &OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<InboundResult, PlaygroundError> {
        let exchange = async {
            let (response, url) = follow_redirects(&self.client, &self.config, request).await?;
            InboundResult::capture(response, &url, self.config.max_body_bytes).await
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::warn!("Request to {} cancelled", request.target());
                Err(TransportError::Timeout.into())
            }
            result = tokio::time::timeout(self.config.request_timeout, exchange) => {
                result.unwrap_or_else(|_| {
                    log::warn!(
                        "Request to {} exceeded the {:?} deadline",
                        request.target(),
                        self.config.request_timeout
                    );
                    Err(TransportError::Timeout.into())
                })
            }
        }
    }
}
