//! Integration contracts for request-signing layers.
//!
//! [`AuthConfig`] is the read-only face of a token provider: it hands out bearer tokens and
//! signs outgoing requests, but cannot clear the cache or force a refresh.

pub mod request_signer;

pub use request_signer::*;
