//! Optional observability helpers for token operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `datto_rmm_auth.token` with the `op`
//!   (operation) and `endpoint` (token URL) fields, plus debug/warn events for misses, joins,
//!   and failures.
//! - Enable `metrics` to increment the `datto_rmm_auth_token_total` counter for every outcome,
//!   labeled by `op` + `outcome`. The counter is fed by
//!   [`ExchangeMetrics`](crate::manager::ExchangeMetrics), alongside its always-on totals.

mod tracing;

pub use tracing::*;

// self
use crate::_prelude::*;

/// Token manager operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOp {
	/// [`TokenManager::get_token`](crate::TokenManager::get_token).
	GetToken,
	/// [`TokenManager::refresh_token`](crate::TokenManager::refresh_token).
	Refresh,
}
impl TokenOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOp::GetToken => "get_token",
			TokenOp::Refresh => "refresh",
		}
	}
}
impl Display for TokenOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOutcome {
	/// Served from the cache without I/O.
	CacheHit,
	/// Joined an exchange another caller started.
	Joined,
	/// Completed a token endpoint exchange.
	Exchanged,
	/// Failure propagated back to the caller.
	Failure,
}
impl TokenOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOutcome::CacheHit => "cache_hit",
			TokenOutcome::Joined => "joined",
			TokenOutcome::Exchanged => "exchanged",
			TokenOutcome::Failure => "failure",
		}
	}
}
impl Display for TokenOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
