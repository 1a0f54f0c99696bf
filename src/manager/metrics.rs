// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{TokenOp, TokenOutcome};

/// Thread-safe counters for token manager activity.
///
/// Every recorded outcome is mirrored to the `datto_rmm_auth_token_total` counter when the
/// `metrics` feature is enabled.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	exchanges: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	cache_hits: AtomicU64,
	joins: AtomicU64,
}
impl ExchangeMetrics {
	/// Returns the number of token endpoint exchanges started.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of exchanges that produced a token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of exchanges that failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of calls served from the cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that joined an exchange started by another caller.
	pub fn joins(&self) -> u64 {
		self.joins.load(Ordering::Relaxed)
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record(&self, op: TokenOp, outcome: TokenOutcome) {
		let counter = match outcome {
			TokenOutcome::CacheHit => &self.cache_hits,
			TokenOutcome::Joined => &self.joins,
			TokenOutcome::Exchanged => &self.success,
			TokenOutcome::Failure => &self.failure,
		};

		counter.fetch_add(1, Ordering::Relaxed);

		#[cfg(feature = "metrics")]
		metrics::counter!(
			"datto_rmm_auth_token_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
		#[cfg(not(feature = "metrics"))]
		let _ = op;
	}
}
