//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - The logger
//! - The forwarding HTTP client
//!
//! Both are created once per process and are safe to share across
//! concurrent requests.

mod client;
mod logger;

// Re-export public API
pub use client::{init_client, HttpClient, TimeoutConnector};
pub use logger::init_logger_with;
