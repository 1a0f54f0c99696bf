//! Client-credentials token lifecycle with caching, proactive refresh, and single-flight
//! deduplication.
//!
//! [`TokenManager::get_token`] serves the cached bearer token while it stays valid for at least
//! the safety margin (five minutes by default). Once the token is missing or stale, the first
//! caller claims an in-flight refresh slot and performs the `client_credentials` exchange; any
//! caller arriving while that exchange is outstanding joins the same slot instead of
//! contacting the token endpoint again, and receives the same token or the same error.
//!
//! The start-or-join decision happens under the state lock before the first `.await`, so two
//! callers polled in the same scheduling turn always agree on one exchange. Each caller holds a
//! claim on the slot for as long as it waits. If the caller driving an exchange is dropped (for
//! example by a caller-side timeout), the HTTP future is dropped with it and a remaining
//! claimant takes the exchange over. When the last claimant goes away first, its claim removes
//! the in-flight marker, so the next caller starts a fresh exchange.

mod metrics;

pub use metrics::ExchangeMetrics;

// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenSecret},
	clock::{Clock, SystemClock},
	error::{ConfigError, ParseError, TransportError},
	ext::AuthConfig,
	http::{self, AsyncHttpClient, HttpClientError, HttpRequest, TokenHttpClient},
	obs::{TokenOp, TokenOutcome, TokenSpan, trace_debug, trace_warn},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, platform::Platform};

#[cfg(feature = "reqwest")]
/// Token manager specialized for the crate's default reqwest transport.
pub type ReqwestTokenManager = TokenManager<ReqwestHttpClient>;

type RefreshSlot = AsyncOnceCell<Result<TokenSecret>>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const GRANT_BODY: &str = "grant_type=client_credentials";

/// Caches a bearer token for one credential pair and refreshes it on demand.
///
/// Clones share the same cache, in-flight refresh, and counters; independent managers
/// (one per credential set) share nothing.
pub struct TokenManager<C>
where
	C: TokenHttpClient,
{
	credentials: ClientCredentials,
	endpoint: Url,
	http_client: Arc<C>,
	clock: Arc<dyn Clock>,
	safety_margin: Duration,
	state: Arc<Mutex<TokenState>>,
	metrics: Arc<ExchangeMetrics>,
}
impl<C> TokenManager<C>
where
	C: TokenHttpClient,
{
	/// Default window before expiry in which a cached token counts as stale.
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::minutes(5);

	/// Creates a manager that exchanges `credentials` at `endpoint` through `http_client`.
	///
	/// The endpoint must use HTTPS; plain HTTP is accepted for loopback hosts only.
	pub fn with_http_client(
		credentials: ClientCredentials,
		endpoint: impl AsRef<str>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		Ok(Self {
			credentials,
			endpoint: parse_endpoint(endpoint.as_ref())?,
			http_client: http_client.into(),
			clock: Arc::new(SystemClock),
			safety_margin: Self::DEFAULT_SAFETY_MARGIN,
			state: Default::default(),
			metrics: Default::default(),
		})
	}

	/// Overrides the safety margin (defaults to five minutes). Negative values clamp to zero.
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Replaces the clock used for expiry arithmetic.
	pub fn with_clock(mut self, clock: impl Clock) -> Self {
		self.clock = Arc::new(clock);

		self
	}

	/// Returns a token valid for at least the safety margin, refreshing when needed.
	///
	/// When the endpoint issues a token whose whole lifetime is shorter than the margin, the
	/// freshly issued token is returned anyway; each call performs at most one exchange.
	pub async fn get_token(&self) -> Result<TokenSecret> {
		const OP: TokenOp = TokenOp::GetToken;

		let slot = {
			let mut state = self.state.lock();

			if let Some(token) = state.fresh_token(self.clock.now(), self.safety_margin) {
				self.metrics.record(OP, TokenOutcome::CacheHit);

				return Ok(token);
			}

			trace_debug!(has_token = state.token.is_some(), "Cached token is missing or stale.");

			self.claim_slot(&mut state, OP)
		};

		self.await_slot(OP, slot).await
	}

	/// Performs a token exchange regardless of the cached token's freshness.
	///
	/// If an exchange is already in flight the call joins it rather than starting a second
	/// one; that exchange finishes after this call began, so its token is never older than
	/// the cached one.
	pub async fn refresh_token(&self) -> Result<TokenSecret> {
		const OP: TokenOp = TokenOp::Refresh;

		let slot = self.claim_slot(&mut self.state.lock(), OP);

		self.await_slot(OP, slot).await
	}

	/// Drops the cached token. An exchange already in flight is not cancelled.
	pub fn clear_token(&self) {
		self.state.lock().clear();
	}

	/// Wraps the manager in an [`AuthConfig`] that only exposes [`TokenManager::get_token`].
	pub fn to_auth_config(&self) -> AuthConfig {
		AuthConfig::new(self.clone())
	}

	/// Token endpoint this manager exchanges credentials at.
	pub fn token_endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Client identifier (API key) this manager authenticates as.
	pub fn client_id(&self) -> &str {
		self.credentials.client_id()
	}

	/// Window before expiry in which a cached token counts as stale.
	pub fn safety_margin(&self) -> Duration {
		self.safety_margin
	}

	/// Expiry instant of the cached token, if one is cached.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let state = self.state.lock();

		state.token.as_ref().map(|_| state.expires_at)
	}

	/// Returns `true` while a token is cached, fresh or not.
	pub fn has_token(&self) -> bool {
		self.state.lock().token.is_some()
	}

	/// Returns `true` while an exchange slot is claimed.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().in_flight.is_some()
	}

	/// Exchange counters shared by every clone of this manager.
	pub fn metrics(&self) -> &ExchangeMetrics {
		&self.metrics
	}

	fn claim_slot(&self, state: &mut TokenState, op: TokenOp) -> Arc<RefreshSlot> {
		if let Some(in_flight) = &mut state.in_flight {
			in_flight.claims += 1;

			self.metrics.record(op, TokenOutcome::Joined);
			trace_debug!(op = op.as_str(), "Joining the in-flight token exchange.");

			return in_flight.slot.clone();
		}

		let slot = Arc::new(RefreshSlot::new());

		state.in_flight = Some(InFlight { slot: slot.clone(), claims: 1 });

		slot
	}

	async fn await_slot(&self, op: TokenOp, slot: Arc<RefreshSlot>) -> Result<TokenSecret> {
		let _claim = SlotClaim { state: &self.state, slot: &slot };

		TokenSpan::new(op, &self.endpoint)
			.instrument(slot.get_or_init(|| self.exchange_into(op, &slot)))
			.await
			.clone()
	}

	async fn exchange_into(&self, op: TokenOp, slot: &Arc<RefreshSlot>) -> Result<TokenSecret> {
		self.metrics.record_exchange();

		let result = self.exchange().await;
		let mut state = self.state.lock();

		if state.in_flight.as_ref().is_some_and(|current| Arc::ptr_eq(&current.slot, slot)) {
			state.in_flight = None;
		}

		match result {
			Ok((token, expires_at)) => {
				state.token = Some(token.clone());
				state.expires_at = expires_at;

				self.metrics.record(op, TokenOutcome::Exchanged);

				Ok(token)
			},
			Err(err) => {
				self.metrics.record(op, TokenOutcome::Failure);
				trace_warn!(status = ?err.status(), "Token exchange failed: {err}");

				Err(err)
			},
		}
	}

	async fn exchange(&self) -> Result<(TokenSecret, OffsetDateTime)> {
		let request = self.build_request()?;
		let handle = self.http_client.handle();
		let response = handle.call(request).await.map_err(map_transport_error)?;
		let now = self.clock.now();
		let status = response.status();

		if !status.is_success() {
			return Err(Error::Authentication {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
				retry_after: http::parse_retry_after(response.headers(), now),
			});
		}

		let (token, expires_in) = parse_token_response(status.as_u16(), response.body())?;
		let expires_at = now.checked_add(expires_in).ok_or(ParseError::ExpiresInOutOfRange)?;

		Ok((token, expires_at))
	}

	fn build_request(&self) -> Result<HttpRequest, ConfigError> {
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.endpoint.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.header(AUTHORIZATION, self.credentials.basic_authorization())
			.body(GRANT_BODY.as_bytes().to_vec())?;

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl TokenManager<ReqwestHttpClient> {
	/// Overall timeout applied to each exchange by the default transport.
	pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

	/// Creates a manager backed by a redirect-free reqwest client with a 30 second timeout.
	pub fn new(credentials: ClientCredentials, endpoint: impl AsRef<str>) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(Self::DEFAULT_REQUEST_TIMEOUT)?;

		Self::with_http_client(credentials, endpoint, http_client)
	}

	/// Creates a manager for the token endpoint of `platform`.
	pub fn for_platform(platform: Platform, credentials: ClientCredentials) -> Result<Self> {
		Self::new(credentials, platform.token_endpoint())
	}
}
impl<C> Clone for TokenManager<C>
where
	C: TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			credentials: self.credentials.clone(),
			endpoint: self.endpoint.clone(),
			http_client: self.http_client.clone(),
			clock: self.clock.clone(),
			safety_margin: self.safety_margin,
			state: self.state.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<C> Debug for TokenManager<C>
where
	C: TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("endpoint", &self.endpoint.as_str())
			.field("credentials", &self.credentials)
			.field("safety_margin", &self.safety_margin)
			.field("has_token", &self.has_token())
			.finish()
	}
}

/// Mutable cache owned by one manager (and its clones).
struct TokenState {
	token: Option<TokenSecret>,
	expires_at: OffsetDateTime,
	in_flight: Option<InFlight>,
}
impl TokenState {
	fn fresh_token(&self, now: OffsetDateTime, margin: Duration) -> Option<TokenSecret> {
		let token = self.token.as_ref()?;
		let deadline = self.expires_at.checked_sub(margin)?;

		(now < deadline).then(|| token.clone())
	}

	fn clear(&mut self) {
		self.token = None;
		self.expires_at = OffsetDateTime::UNIX_EPOCH;
	}
}
impl Default for TokenState {
	fn default() -> Self {
		Self { token: None, expires_at: OffsetDateTime::UNIX_EPOCH, in_flight: None }
	}
}

/// Exchange slot plus the number of callers still waiting on it.
struct InFlight {
	slot: Arc<RefreshSlot>,
	claims: usize,
}

/// One caller's hold on an in-flight slot, released when the caller stops waiting.
struct SlotClaim<'a> {
	state: &'a Mutex<TokenState>,
	slot: &'a Arc<RefreshSlot>,
}
impl Drop for SlotClaim<'_> {
	fn drop(&mut self) {
		// A resolved slot was already detached by `exchange_into`.
		if self.slot.is_initialized() {
			return;
		}

		let mut state = self.state.lock();
		let Some(in_flight) = state.in_flight.as_mut() else { return };

		if !Arc::ptr_eq(&in_flight.slot, self.slot) {
			return;
		}

		in_flight.claims = in_flight.claims.saturating_sub(1);

		if in_flight.claims == 0 {
			trace_debug!("Last caller abandoned the token exchange; clearing the in-flight marker.");

			state.in_flight = None;
		}
	}
}

/// Token endpoint payload. `expires_in` accepts any JSON number; fractional seconds are
/// rounded down.
#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<serde_json::Number>,
}

fn parse_token_response(status: u16, body: &[u8]) -> Result<(TokenSecret, Duration), ParseError> {
	let mut de = serde_json::Deserializer::from_slice(body);
	let response: TokenResponse = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ParseError::Malformed { source: Arc::new(source), status })?;
	let token = TokenSecret::new(response.access_token);

	if token.is_empty() {
		return Err(ParseError::MissingAccessToken);
	}

	let expires_in = whole_seconds(&response.expires_in.ok_or(ParseError::MissingExpiresIn)?)?;

	if expires_in < 0 {
		return Err(ParseError::NegativeExpiresIn(expires_in));
	}

	Ok((token, Duration::seconds(expires_in)))
}

fn whole_seconds(number: &serde_json::Number) -> Result<i64, ParseError> {
	if let Some(seconds) = number.as_i64() {
		return Ok(seconds);
	}

	let seconds = number.as_f64().map(f64::floor).ok_or(ParseError::ExpiresInOutOfRange)?;

	// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
	if !seconds.is_finite() || seconds < i64::MIN as f64 || seconds >= i64::MAX as f64 {
		return Err(ParseError::ExpiresInOutOfRange);
	}

	Ok(seconds as i64)
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { source })?;
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	};

	match url.scheme() {
		"https" => Ok(url),
		"http" if loopback => Ok(url),
		_ => Err(ConfigError::InsecureEndpoint { url: url.to_string() }),
	}
}

fn map_transport_error<E>(err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::network(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		_ => TransportError::Other { message: "unrecognized HTTP client failure".into() }.into(),
	}
}
