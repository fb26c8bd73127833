//! Response capture.
//!
//! Status line and headers are taken from the final hop before the body is
//! touched; the body is then streamed under the size cap.

mod body;
mod types;

pub use types::InboundResult;
