//! Client credentials and the redacted token type handed out by the manager.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
