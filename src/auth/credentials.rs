//! OAuth 2.0 client credentials (API key + API secret).

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Client identifier and secret exchanged for bearer tokens.
///
/// Datto RMM calls these the API key and API secret. The pair is fixed for the lifetime of a
/// [`TokenManager`](crate::TokenManager); rotate credentials by building a new manager.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	client_id: String,
	client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Creates a credential pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}

	/// Returns the client identifier (API key).
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Returns the client secret (API secret). Callers must avoid logging it.
	pub fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}

	/// Encodes the pair as an HTTP Basic `Authorization` header value.
	///
	/// The identifier and secret are joined verbatim with `:` before encoding; they are not
	/// form-urlencoded first.
	pub fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", BASE64.encode(raw))
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
