//! Target validation and SSRF protection.
//!
//! This module decides whether a request may leave the process at all:
//! - Only GET, POST, PUT, PATCH, and DELETE are forwarded
//! - Literal-IP targets in loopback or private ranges are refused
//!
//! Hostnames are not resolved here. The `SafeResolver` closes that gap at
//! connect time when it is enabled.
//!
//! The same target check runs again for every redirect hop, so a public
//! target cannot bounce the forwarder into an internal service.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hyper::Method;
use url::Url;

use crate::config::ALLOWED_METHODS;
use crate::error_handling::{is_http_scheme, ValidationError};

/// Validates the request method against the allow-list.
///
/// Matching is exact: `get` is not `GET`.
///
/// # Examples
///
/// ```
/// use http_playground::security::validate_method;
///
/// assert!(validate_method("GET").is_ok());
/// assert_eq!(
///     validate_method("CONNECT").unwrap_err().to_string(),
///     "method CONNECT is not allowed"
/// );
/// ```
pub fn validate_method(method: &str) -> Result<Method, ValidationError> {
    if !ALLOWED_METHODS.contains(&method) {
        return Err(ValidationError::MethodNotAllowed(method.to_string()));
    }

    Method::from_bytes(method.as_bytes())
        .map_err(|_| ValidationError::MethodNotAllowed(method.to_string()))
}

/// Validates that a target URL is safe to contact.
///
/// Rejects http(s) URLs without a host, and hosts that are literal IP
/// addresses in a blocked range. Hostnames and public IPs pass. URLs with
/// other schemes are left to the forwarder, which reports them as unsupported.
///
/// # Arguments
///
/// * `url` - The parsed target (or redirect hop) URL
/// * `allow_private` - Skip the address check entirely
///
/// # Examples
///
/// ```
/// use http_playground::security::validate_target;
/// use url::Url;
///
/// let public = Url::parse("http://8.8.8.8/").unwrap();
/// assert!(validate_target(&public, false).is_ok());
///
/// let loopback = Url::parse("http://127.0.0.1/").unwrap();
/// assert!(validate_target(&loopback, false).is_err());
/// ```
pub fn validate_target(url: &Url, allow_private: bool) -> Result<(), ValidationError> {
    if !is_http_scheme(url.scheme()) {
        return Ok(());
    }

    let host = url.host().ok_or(ValidationError::InvalidTarget)?;

    if allow_private {
        return Ok(());
    }

    let blocked = match host {
        url::Host::Domain(_) => false,
        url::Host::Ipv4(ip) => is_blocked_ipv4(ip),
        url::Host::Ipv6(ip) => is_blocked_ipv6(ip),
    };

    if blocked {
        log::warn!("Refusing target with blocked address: {}", url);
        return Err(ValidationError::InvalidTarget);
    }

    Ok(())
}

/// Returns true if the address must never be contacted.
pub fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_ipv4(v4),
        IpAddr::V6(v6) => is_blocked_ipv6(v6),
    }
}

/// Checks if an IPv4 address is loopback, private, link-local, or unspecified.
///
/// Blocked ranges:
/// - 127.0.0.0/8 (loopback)
/// - 10.0.0.0/8
/// - 172.16.0.0/12
/// - 192.168.0.0/16
/// - 169.254.0.0/16 (link-local)
/// - 0.0.0.0/8 (this network)
fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();

    // 127.0.0.0/8 (loopback)
    if octets[0] == 127 {
        return true;
    }

    // 10.0.0.0/8
    if octets[0] == 10 {
        return true;
    }

    // 172.16.0.0/12
    if octets[0] == 172 && (16..=31).contains(&octets[1]) {
        return true;
    }

    // 192.168.0.0/16
    if octets[0] == 192 && octets[1] == 168 {
        return true;
    }

    // 169.254.0.0/16 (link-local)
    if octets[0] == 169 && octets[1] == 254 {
        return true;
    }

    // 0.0.0.0/8 (this network)
    octets[0] == 0
}

/// Checks if an IPv6 address is loopback, unique-local, link-local, or unspecified.
///
/// IPv4-mapped addresses (`::ffff:a.b.c.d`) are judged by their IPv4 part.
fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(v4);
    }

    let segments = ip.segments();

    // ::1 (loopback) and :: (unspecified)
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }

    // fc00::/7 (unique local addresses)
    if (segments[0] & 0xfe00) == 0xfc00 {
        return true;
    }

    // fe80::/10 (link-local)
    (segments[0] & 0xffc0) == 0xfe80
}
