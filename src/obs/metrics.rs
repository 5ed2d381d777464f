// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{CallKind, CallOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"api_integrator_request_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Thread-safe counters kept by every integrator regardless of feature flags.
#[derive(Debug, Default)]
pub struct IntegratorMetrics {
	attempts: AtomicU64,
	retries: AtomicU64,
	throttled: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl IntegratorMetrics {
	/// Transport calls issued, retries included.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Backoff waits performed before a retry.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Waits performed for rate-limit capacity.
	pub fn throttled_waits(&self) -> u64 {
		self.throttled.load(Ordering::Relaxed)
	}

	/// Requests that returned a response (any status).
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Requests that returned an error.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_throttled(&self) {
		self.throttled.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}
