//! Response assembly.
//!
//! The assembled response is a display rendering of what the target sent
//! back (status line, sorted headers, formatted body), or of an error that
//! replaced it.

mod builder;

pub use builder::{escape_html, ResponseBuilder};
