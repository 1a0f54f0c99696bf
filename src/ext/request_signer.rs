//! Bearer-token request signing and authentication-failure reporting.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	http::TokenHttpClient,
	manager::TokenManager,
};

/// Boxed future returned by [`TokenSource::token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret>> + 'a + Send>>;

/// Callback invoked when the wrapped API rejects a signed request.
pub type AuthErrorHook = Arc<dyn Fn(&AuthFailure) + Send + Sync>;

/// Anything that can produce a currently valid bearer token.
///
/// Implemented by [`TokenManager`]; custom providers (a token vault, a fixed token for tests)
/// implement it to plug into [`AuthConfig`] directly.
pub trait TokenSource
where
	Self: 'static + Send + Sync,
{
	/// Returns a token suitable for an `Authorization: Bearer` header.
	fn token(&self) -> TokenFuture<'_>;
}
impl<C> TokenSource for TokenManager<C>
where
	C: TokenHttpClient,
{
	fn token(&self) -> TokenFuture<'_> {
		Box::pin(self.get_token())
	}
}

/// Signal raised when the wrapped API answered HTTP 401 to a signed request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Authentication failed - token may be expired.")]
pub struct AuthFailure {
	/// HTTP status returned by the API.
	pub status: u16,
}

/// Read-only token access for request-signing layers.
///
/// Built by [`TokenManager::to_auth_config`] or [`AuthConfig::new`] for custom sources.
#[derive(Clone)]
pub struct AuthConfig {
	source: Arc<dyn TokenSource>,
	on_auth_error: Option<AuthErrorHook>,
}
impl AuthConfig {
	/// Wraps a token source.
	pub fn new(source: impl TokenSource) -> Self {
		Self { source: Arc::new(source), on_auth_error: None }
	}

	/// Registers a callback for HTTP 401 responses seen by [`AuthConfig::inspect_status`].
	///
	/// The callback only observes the failure; whether to clear the cached token is up to the
	/// code that owns the manager.
	pub fn with_on_auth_error<F>(mut self, hook: F) -> Self
	where
		F: 'static + Fn(&AuthFailure) + Send + Sync,
	{
		self.on_auth_error = Some(Arc::new(hook));

		self
	}

	/// Returns the current token from the underlying source.
	pub async fn get_token(&self) -> Result<TokenSecret> {
		self.source.token().await
	}

	/// Returns the `Authorization` header value (`Bearer <token>`).
	pub async fn authorization_header(&self) -> Result<String> {
		Ok(self.get_token().await?.bearer())
	}

	/// Reports a response status; HTTP 401 triggers the registered callback.
	///
	/// Returns the failure so callers can surface it without a callback.
	pub fn inspect_status(&self, status: u16) -> Option<AuthFailure> {
		if status != 401 {
			return None;
		}

		let failure = AuthFailure { status };

		if let Some(hook) = &self.on_auth_error {
			hook(&failure);
		}

		Some(failure)
	}

	/// Attaches `Authorization: Bearer <token>` to a reqwest request.
	#[cfg(feature = "reqwest")]
	pub async fn sign(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
		let token = self.get_token().await?;

		Ok(request.bearer_auth(token.expose()))
	}

	/// Checks a reqwest response through [`AuthConfig::inspect_status`].
	#[cfg(feature = "reqwest")]
	pub fn inspect_response(&self, response: &reqwest::Response) -> Option<AuthFailure> {
		self.inspect_status(response.status().as_u16())
	}
}
impl Debug for AuthConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthConfig")
			.field("on_auth_error_set", &self.on_auth_error.is_some())
			.finish()
	}
}
