// self
use crate::{_prelude::*, obs::TokenOp};

/// Span wrapped around every wait on a token exchange.
///
/// Without the `tracing` feature the type is empty and [`TokenSpan::instrument`] hands the
/// future back untouched.
#[derive(Clone, Debug)]
pub struct TokenSpan {
	#[cfg(feature = "tracing")]
	inner: tracing::Span,
}
impl TokenSpan {
	/// Opens a `datto_rmm_auth.token` span for `op` against `endpoint`.
	pub fn new(op: TokenOp, endpoint: &Url) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				inner: tracing::info_span!(
					"datto_rmm_auth.token",
					op = op.as_str(),
					endpoint = endpoint.as_str()
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, endpoint);

			Self {}
		}
	}

	/// Enters the span on each poll of `fut`.
	pub fn instrument<F>(self, fut: F) -> impl Future<Output = F::Output>
	where
		F: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.inner)
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			fut
		}
	}
}

/// Emits a debug-level event when tracing is enabled.
macro_rules! trace_debug {
	($($arg:tt)*) => {{
		#[cfg(feature = "tracing")]
		tracing::debug!($($arg)*);
	}};
}
/// Emits a warn-level event when tracing is enabled.
macro_rules! trace_warn {
	($($arg:tt)*) => {{
		#[cfg(feature = "tracing")]
		tracing::warn!($($arg)*);
	}};
}
pub(crate) use {trace_debug, trace_warn};
