//! SSRF-safe DNS resolver for the forwarding client.
//!
//! Delegates to the system resolver and then drops every address the target
//! validator would refuse as a literal. A hostname that resolves only to
//! blocked addresses fails to resolve, so no socket is ever opened towards
//! it. With the guard off the resolver passes every answer through.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use hyper_util::client::legacy::connect::dns::Name;
use tower_service::Service;

use super::url_validation::is_blocked_ip;

/// A DNS resolver that rejects loopback, private, and link-local answers.
#[derive(Debug, Clone, Copy)]
pub struct SafeResolver {
    guard: bool,
}

impl SafeResolver {
    /// A resolver that filters answers when `guard` is set.
    pub fn new(guard: bool) -> Self {
        Self { guard }
    }
}

impl Service<Name> for SafeResolver {
    type Response = std::vec::IntoIter<SocketAddr>;
    type Error = io::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, io::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, name: Name) -> Self::Future {
        let guard = self.guard;
        Box::pin(async move {
            let host = format!("{}:0", name.as_str());
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&host).await?.collect();

            if !guard {
                return Ok(addrs.into_iter());
            }

            let safe_addrs = filter_safe(addrs);
            if safe_addrs.is_empty() {
                log::warn!(
                    "SSRF blocked: all resolved IPs for '{}' are private/reserved",
                    name.as_str()
                );
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!(
                        "all resolved IPs for '{}' are private/reserved",
                        name.as_str()
                    ),
                ));
            }

            Ok(safe_addrs.into_iter())
        })
    }
}

/// Keeps only the addresses that may be contacted.
fn filter_safe(addrs: Vec<SocketAddr>) -> Vec<SocketAddr> {
    addrs
        .into_iter()
        .filter(|addr| !is_blocked_ip(addr.ip()))
        .collect()
}
