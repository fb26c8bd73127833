//! Target validation.
//!
//! This module guards the network boundary:
//! - Method allow-list
//! - Literal-IP SSRF checks on the target and on every redirect hop
//! - A DNS resolver that refuses private answers at connect time

mod safe_resolver;
mod url_validation;

pub use safe_resolver::SafeResolver;
pub use url_validation::{is_blocked_ip, validate_method, validate_target};
