//! Manual redirect following.
//!
//! The client never follows redirects on its own. Each hop is validated with
//! the same target check as the original request before a socket is opened,
//! so a public target cannot bounce the forwarder into a private network.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderMap, AUTHORIZATION, COOKIE, LOCATION, WWW_AUTHENTICATE};
use hyper::{Method, Request, Response, StatusCode, Uri};
use url::Url;

use crate::config::Config;
use crate::error_handling::{
    categorize_transport_error, is_http_scheme, PlaygroundError, TransportError, ValidationError,
};
use crate::fetch::request::OutboundRequest;
use crate::initialization::HttpClient;
use crate::security::validate_target;

/// Sends the request and follows redirects until a final response arrives.
///
/// - Every URL, the first included, must pass `validate_target` and use
///   `http` or `https`
/// - 303, and 301/302 answered to anything but GET or HEAD, continue as a
///   bodiless GET; 307/308 resend the original method and body
/// - Credentials are dropped once the chain leaves the original host
/// - After `max_redirect_hops` followed hops, the next redirect is returned
///   unfollowed, as is a redirect without a `Location` header
///
/// Returns the final response together with the URL it came from.
///
/// # Errors
///
/// `InvalidTarget` when a hop is unsafe or its `Location` cannot be
/// resolved, `UnsupportedScheme` for a hop the client cannot speak, or the
/// categorized transport error of the failing hop.
pub(crate) async fn follow_redirects(
    client: &HttpClient,
    config: &Config,
    request: &OutboundRequest,
) -> Result<(Response<Incoming>, Url), PlaygroundError> {
    let origin = request.target().clone();
    let mut current = origin.clone();
    let mut method = request.method().clone();
    let mut body = request.body().map(Bytes::copy_from_slice);
    let mut headers = request.header_map().clone();
    let mut hops = 0;

    loop {
        validate_target(&current, config.allow_private_targets)?;
        if !is_http_scheme(current.scheme()) {
            return Err(TransportError::UnsupportedScheme(current.scheme().to_string()).into());
        }

        let outbound = build_request(&method, &current, &headers, body.clone())?;
        let response = client
            .request(outbound)
            .await
            .map_err(|e| categorize_transport_error(&e, &current))?;

        let status = response.status();
        if !is_redirect(status) {
            return Ok((response, current));
        }

        if hops >= config.max_redirect_hops {
            log::debug!(
                "Redirect limit of {} reached at {}, returning {} unfollowed",
                config.max_redirect_hops,
                current,
                status
            );
            return Ok((response, current));
        }

        let Some(location) = response.headers().get(LOCATION) else {
            log::warn!(
                "Redirect status {} for {} but no Location header",
                status,
                current
            );
            return Ok((response, current));
        };

        let next = location
            .to_str()
            .ok()
            .and_then(|loc| current.join(loc.trim()).ok())
            .ok_or_else(|| {
                log::warn!("Unusable Location {:?} from {}", location, current);
                ValidationError::InvalidTarget
            })?;

        if switches_to_get(status, &method) {
            method = Method::GET;
            body = None;
        }

        if !same_site(&origin, &next) {
            strip_credentials(&mut headers);
        }

        hops += 1;
        log::debug!("Redirect hop {}: {} -> {} ({})", hops, current, next, status);
        current = next;
    }
}

/// Builds one hop's request. Only the caller's headers are set; the client
/// adds `Host` when they do not carry one.
fn build_request(
    method: &Method,
    target: &Url,
    headers: &HeaderMap,
    body: Option<Bytes>,
) -> Result<Request<Full<Bytes>>, PlaygroundError> {
    let uri: Uri = target.as_str().parse().map_err(|e| {
        log::warn!("Target {} is not a valid request URI: {}", target, e);
        ValidationError::InvalidTarget
    })?;

    let mut outbound = Request::builder()
        .method(method.clone())
        .uri(uri)
        .body(Full::new(body.unwrap_or_default()))
        .map_err(PlaygroundError::internal)?;
    *outbound.headers_mut() = headers.clone();

    Ok(outbound)
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn switches_to_get(status: StatusCode, method: &Method) -> bool {
    match status {
        StatusCode::SEE_OTHER => true,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => {
            *method != Method::GET && *method != Method::HEAD
        }
        _ => false,
    }
}

/// True when `next` is on the origin host or one of its subdomains.
fn same_site(origin: &Url, next: &Url) -> bool {
    match (origin.host_str(), next.host_str()) {
        (Some(origin), Some(next)) => {
            let (origin, next) = (origin.to_ascii_lowercase(), next.to_ascii_lowercase());
            next == origin || next.ends_with(&format!(".{origin}"))
        }
        _ => false,
    }
}

fn strip_credentials(headers: &mut HeaderMap) {
    for name in [AUTHORIZATION, WWW_AUTHENTICATE, COOKIE] {
        headers.remove(name);
    }
    headers.remove("cookie2");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_redirect() {
        for code in [301, 302, 303, 307, 308] {
            assert!(is_redirect(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [200, 300, 304, 305, 404] {
            assert!(!is_redirect(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn test_switches_to_get() {
        assert!(switches_to_get(StatusCode::SEE_OTHER, &Method::PUT));
        assert!(switches_to_get(StatusCode::FOUND, &Method::POST));
        assert!(!switches_to_get(StatusCode::FOUND, &Method::GET));
        assert!(!switches_to_get(StatusCode::TEMPORARY_REDIRECT, &Method::POST));
        assert!(!switches_to_get(StatusCode::PERMANENT_REDIRECT, &Method::PATCH));
    }

    #[test]
    fn test_same_site() {
        let origin = Url::parse("https://example.com/a").unwrap();
        assert!(same_site(&origin, &Url::parse("https://example.com/b").unwrap()));
        assert!(same_site(&origin, &Url::parse("https://api.example.com/").unwrap()));
        assert!(!same_site(&origin, &Url::parse("https://notexample.com/").unwrap()));
        assert!(!same_site(&origin, &Url::parse("https://other.org/").unwrap()));
    }

    #[test]
    fn test_build_request_carries_only_given_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace", "abc".parse().unwrap());
        let target = Url::parse("https://example.com/a?b=c").unwrap();

        let request = build_request(&Method::PUT, &target, &headers, Some(Bytes::from("x"))).unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.uri(), "https://example.com/a?b=c");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()["x-trace"], "abc");
    }

    #[test]
    fn test_strip_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer x".parse().unwrap());
        headers.insert(COOKIE, "a=1".parse().unwrap());
        headers.insert("x-keep", "1".parse().unwrap());
        strip_credentials(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("x-keep"));
    }
}
