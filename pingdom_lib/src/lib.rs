//! Pingdom API client library.
//!
//! Provides a typed client for the Pingdom REST API (v3.1): checks, contacts,
//! maintenance windows, occurrences, probes, teams, and transaction (TMS)
//! checks.

pub mod checks;
pub mod client;
pub mod config;
pub mod contacts;
pub mod error;
pub mod helpers;
pub mod maintenance;
pub mod occurrences;
pub mod probes;
pub mod request;
pub mod teams;
pub mod tms;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Client;
pub use config::{ClientConfig, API_KEY_ENV, API_TOKEN_ENV, DEFAULT_BASE_URL};
pub use error::{Error, PingdomError};
pub use helpers::format_timestamp_display;
pub use request::{MultiParams, Params, PingdomResponse, RawResponse, Requester};

/// Library version for User-Agent and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
