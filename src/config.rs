//! Environment-driven configuration.
//!
//! Reads `DATTO_API_KEY` and `DATTO_API_SECRET` (both required) and `DATTO_PLATFORM`
//! (optional, defaults to merlot).

// self
use crate::{_prelude::*, auth::ClientCredentials, error::ConfigError, platform::Platform};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "DATTO_API_KEY";
/// Environment variable holding the API secret.
pub const API_SECRET_VAR: &str = "DATTO_API_SECRET";
/// Environment variable naming the platform.
pub const PLATFORM_VAR: &str = "DATTO_PLATFORM";

/// Credentials and platform resolved from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
	/// API key and secret.
	pub credentials: ClientCredentials,
	/// Target platform.
	pub platform: Platform,
}
impl EnvConfig {
	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through `lookup`, which maps variable names to values.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| {
			lookup(name).filter(|value| !value.is_empty()).ok_or(ConfigError::MissingEnv { name })
		};
		let api_key = required(API_KEY_VAR)?;
		let api_secret = required(API_SECRET_VAR)?;
		let platform = match lookup(PLATFORM_VAR).filter(|value| !value.is_empty()) {
			Some(value) => value.parse()?,
			None => Platform::default(),
		};

		Ok(Self { credentials: ClientCredentials::new(api_key, api_secret), platform })
	}
}
