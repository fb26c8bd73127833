//! HTTP client initialization.
//!
//! This module builds the one connection-pooling client the forwarder uses
//! for every hop of every request. The client is hyper's pooled client used
//! directly, so nothing is added to the headers a caller supplies.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::Uri;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use rustls::{ClientConfig, RootCertStore};
use tower_service::Service;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::security::SafeResolver;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The forwarding client: TLS over TCP, resolved through `SafeResolver`,
/// with the whole connect phase under one timeout.
pub type HttpClient =
    Client<TimeoutConnector<HttpsConnector<HttpConnector<SafeResolver>>>, Full<Bytes>>;

/// Initializes the forwarding HTTP client.
///
/// Creates a client configured with:
/// - No redirect handling at all, so every hop can be validated before it
///   is followed
/// - A connect timeout covering both the TCP connect and the TLS handshake
/// - No automatic decompression (encodings are resolved by the negotiator)
/// - No default headers; only `Host` is filled in when the caller left it out
/// - Rustls with the Mozilla root store, offering HTTP/2 and HTTP/1.1
/// - The SSRF-safe resolver, unless private targets are allowed
///
/// The overall deadline is not set here; the forwarder enforces it around
/// the whole exchange, body read included.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the TLS configuration
/// cannot be built.
pub fn init_client(config: &Config) -> Result<HttpClient, InitializationError> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let tls = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::aws_lc_rs::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(root_store)
    .with_no_client_auth();

    let guard = config.guard_resolved_addresses && !config.allow_private_targets;
    let mut http = HttpConnector::new_with_resolver(SafeResolver::new(guard));
    http.enforce_http(false);
    http.set_connect_timeout(Some(config.connect_timeout));

    let https = HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    let connector = TimeoutConnector::new(
        https,
        config.connect_timeout + config.tls_handshake_timeout,
    );

    Ok(Client::builder(TokioExecutor::new()).build(connector))
}

/// Bounds the whole connect future of the wrapped connector.
///
/// An expired connect fails with an `io::ErrorKind::TimedOut` error, which
/// the transport categorization reports as a timeout.
#[derive(Debug, Clone)]
pub struct TimeoutConnector<C> {
    inner: C,
    timeout: Duration,
}

impl<C> TimeoutConnector<C> {
    /// Wraps `inner` so that each connect fails after `timeout`.
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<C> Service<Uri> for TimeoutConnector<C>
where
    C: Service<Uri>,
    C::Response: Send + 'static,
    C::Error: Into<BoxError>,
    C::Future: Send + 'static,
{
    type Response = C::Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<C::Response, BoxError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let timeout = self.timeout;
        let connecting = self.inner.call(uri);

        Box::pin(async move {
            match tokio::time::timeout(timeout, connecting).await {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(Box::new(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect timed out after {timeout:?}"),
                )) as BoxError),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_default_config() {
        assert!(init_client(&Config::default()).is_ok());
    }

    #[test]
    fn test_init_client_private_targets_allowed() {
        let config = Config {
            allow_private_targets: true,
            ..Default::default()
        };
        assert!(init_client(&config).is_ok());
    }

    #[derive(Clone)]
    struct NeverConnects;

    impl Service<Uri> for NeverConnects {
        type Response = ();
        type Error = io::Error;
        type Future = std::future::Pending<Result<(), io::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _uri: Uri) -> Self::Future {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn test_timeout_connector_expires() {
        let mut connector = TimeoutConnector::new(NeverConnects, Duration::from_millis(50));
        let err = connector
            .call(Uri::from_static("http://example.com/"))
            .await
            .unwrap_err();

        let io = err.downcast_ref::<io::Error>().expect("io error");
        assert_eq!(io.kind(), io::ErrorKind::TimedOut);
    }
}
