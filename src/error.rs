//! Crate-level error types shared by the token manager, transports, and configuration.
//!
//! Every error is [`Clone`] so a single failed exchange can be handed to each caller that
//! joined it.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint answered with a body that does not describe a usable token.
	#[error(transparent)]
	Parse(#[from] ParseError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint rejected the request with a non-success HTTP status.
	#[error("OAuth token request failed: {status} - {body}")]
	Authentication {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw response body text.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
}
impl Error {
	/// Returns the HTTP status carried by an [`Error::Authentication`] failure.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Authentication { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// HTTP request construction failed.
	#[error("Token request could not be constructed.")]
	HttpRequest {
		/// Underlying request builder failure.
		#[source]
		source: SharedError,
	},
	/// Token endpoint cannot be parsed.
	#[error("Token endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint does not use HTTPS.
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Required environment variable is unset or empty.
	#[error("{name} environment variable is required.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Platform name cannot be parsed.
	#[error(transparent)]
	InvalidPlatform(#[from] crate::platform::PlatformParseError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
impl From<oauth2::http::Error> for ConfigError {
	fn from(e: oauth2::http::Error) -> Self {
		Self::HttpRequest { source: Arc::new(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token response payload problems.
#[derive(Clone, Debug, ThisError)]
pub enum ParseError {
	/// Response body is not JSON or lacks required fields.
	#[error("Token endpoint returned a malformed token response.")]
	Malformed {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// `access_token` was present but empty.
	#[error("Token response is missing access_token.")]
	MissingAccessToken,
	/// `expires_in` was absent or null.
	#[error("Token response is missing expires_in.")]
	MissingExpiresIn,
	/// `expires_in` was below zero.
	#[error("The expires_in value must not be negative, got {0}.")]
	NegativeExpiresIn(i64),
	/// `expires_in` cannot be represented as an expiry instant.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Transport failed without a typed error.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
