// self
use crate::{_prelude::*, obs::CallKind, request::Method};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by integrator calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the call kind, method, and request path.
	pub fn new(kind: CallKind, method: Method, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"api_integrator.call",
				kind = kind.as_str(),
				method = method.as_str(),
				path
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, method, path);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs that an attempt will be repeated after `delay`.
pub(crate) fn retrying(attempt: u32, delay: Duration, cause: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		attempt,
		delay_ms = delay.whole_milliseconds() as u64,
		%cause,
		"retrying request"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (attempt, delay, cause);
}

/// Logs a wait for rate-limit capacity.
pub(crate) fn throttled(wait: Duration) {
	#[cfg(feature = "tracing")]
	tracing::debug!(wait_ms = wait.whole_milliseconds() as u64, "waiting for rate limit capacity");
	#[cfg(not(feature = "tracing"))]
	let _ = wait;
}

/// Logs why a paginated sequence stopped.
pub(crate) fn pagination_finished(pages: u32, items: usize, reason: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(pages, items, reason, "pagination finished");
	#[cfg(not(feature = "tracing"))]
	let _ = (pages, items, reason);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn log_helpers_accept_any_input() {
		retrying(0, Duration::SECOND, &"HTTP 503");
		throttled(Duration::milliseconds(250));
		pagination_finished(3, 25, "exhausted");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::Request, Method::Get, "/users");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
