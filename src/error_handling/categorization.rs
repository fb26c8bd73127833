//! Transport error categorization.
//!
//! Maps a client, connection, or body-stream error onto the caller-facing
//! error taxonomy. The full error is always logged here; only the classified
//! message travels on.

use std::error::Error as StdError;
use std::io;

use url::Url;

use super::types::{PlaygroundError, TransportError};

/// Categorizes an error raised while talking to `target`.
///
/// The whole source chain is inspected:
/// - a timed-out I/O operation or hyper timeout becomes
///   `TransportError::Timeout`
/// - a failure to resolve or connect becomes `TransportError::Unreachable`
/// - everything else becomes an opaque `PlaygroundError::Internal`
///
/// # Arguments
///
/// * `error` - The error to categorize, usually a
///   `hyper_util::client::legacy::Error` or a `hyper::Error`
/// * `target` - The URL of the hop that failed
pub fn categorize_transport_error(
    error: &(dyn StdError + 'static),
    target: &Url,
) -> PlaygroundError {
    let timed_out = is_timeout(error);
    let connect = is_connect(error);

    log::error!(
        "HTTP request error for {}: {} (is_timeout: {}, is_connect: {})",
        target,
        error_chain(error),
        timed_out,
        connect
    );

    if timed_out {
        TransportError::Timeout.into()
    } else if connect {
        TransportError::Unreachable(describe_target(target)).into()
    } else {
        PlaygroundError::internal(error_chain(error))
    }
}

/// Returns true for the schemes the forwarder can speak.
pub fn is_http_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}

fn sources<'a>(
    error: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(error), |&e| e.source())
}

fn is_timeout(error: &(dyn StdError + 'static)) -> bool {
    sources(error).any(|e| {
        e.downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == io::ErrorKind::TimedOut)
            || e.downcast_ref::<hyper::Error>()
                .is_some_and(hyper::Error::is_timeout)
    })
}

fn is_connect(error: &(dyn StdError + 'static)) -> bool {
    sources(error).any(|e| {
        e.downcast_ref::<hyper_util::client::legacy::Error>()
            .is_some_and(hyper_util::client::legacy::Error::is_connect)
    })
}

/// Names a target by host and, when explicit, port.
fn describe_target(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => url.to_string(),
    }
}

/// Flattens an error and its sources into one line for the log.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    sources(error)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use hyper::Request;

    use crate::config::Config;
    use crate::initialization::init_client;

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct Wrapper(#[source] io::Error);

    #[test]
    fn test_is_http_scheme() {
        assert!(is_http_scheme("http"));
        assert!(is_http_scheme("https"));
        assert!(!is_http_scheme("ftp"));
        assert!(!is_http_scheme("file"));
    }

    #[test]
    fn test_describe_target() {
        let url = Url::parse("https://example.com/path").unwrap();
        assert_eq!(describe_target(&url), "example.com");

        let url = Url::parse("http://example.com:8080/").unwrap();
        assert_eq!(describe_target(&url), "example.com:8080");
    }

    #[test]
    fn test_categorize_nested_timeout() {
        let target = Url::parse("https://example.com/").unwrap();
        let error = Wrapper(io::Error::new(io::ErrorKind::TimedOut, "connect timed out"));

        assert!(matches!(
            categorize_transport_error(&error, &target),
            PlaygroundError::Transport(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_categorize_unknown_is_internal() {
        let target = Url::parse("https://example.com/").unwrap();
        let error = Wrapper(io::Error::new(io::ErrorKind::InvalidData, "garbled frame"));

        match categorize_transport_error(&error, &target) {
            PlaygroundError::Internal { detail } => {
                assert_eq!(detail, "request failed: garbled frame")
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_categorize_connection_refused() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = Config {
            allow_private_targets: true,
            ..Default::default()
        };
        let client = init_client(&config).unwrap();
        let target = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let request = Request::get(target.as_str())
            .body(Full::new(Bytes::new()))
            .unwrap();
        let error = client.request(request).await.unwrap_err();

        match categorize_transport_error(&error, &target) {
            PlaygroundError::Transport(TransportError::Unreachable(name)) => {
                assert_eq!(name, format!("127.0.0.1:{port}"))
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }
}
