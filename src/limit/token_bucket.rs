//! Lazily refilled token bucket.

// self
use crate::{_prelude::*, clock::Clock, limit::RateLimiter};

// Absorbs nanosecond truncation when a wait of exactly `1 / refill_rate` is converted to a
// `Duration` and back.
const EPSILON: f64 = 1e-6;

/// Token bucket holding up to `capacity` tokens, refilled at `refill_rate` tokens per second.
///
/// Refill is computed at call time from the elapsed clock reading; there is no background
/// timer. The bucket starts full.
pub struct TokenBucket {
	capacity: f64,
	tokens: f64,
	refill_rate: f64,
	last_refill: Duration,
	clock: Arc<dyn Clock>,
}
impl TokenBucket {
	/// Creates a full bucket. Callers are expected to pass validated parameters; see
	/// [`RateLimitConfig::validate`](crate::limit::RateLimitConfig::validate).
	pub fn new(capacity: u32, refill_rate: f64, clock: Arc<dyn Clock>) -> Self {
		let last_refill = clock.now();

		Self {
			capacity: f64::from(capacity),
			tokens: f64::from(capacity),
			refill_rate,
			last_refill,
			clock,
		}
	}

	/// Tokens currently available after a refill.
	pub fn available(&mut self) -> f64 {
		self.refill();

		self.tokens
	}

	fn refill(&mut self) {
		let now = self.clock.now();
		let elapsed = (now - self.last_refill).as_seconds_f64().max(0.0);

		self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
		self.last_refill = now;
	}
}
impl RateLimiter for TokenBucket {
	fn try_acquire(&mut self) -> bool {
		self.refill();

		if self.tokens + EPSILON >= 1.0 {
			self.tokens = (self.tokens - 1.0).max(0.0);

			true
		} else {
			false
		}
	}

	fn wait_time(&mut self) -> Duration {
		self.refill();

		let secs = ((1.0 - self.tokens) / self.refill_rate).max(0.0);

		Duration::saturating_seconds_f64(secs)
	}
}
impl Debug for TokenBucket {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBucket")
			.field("capacity", &self.capacity)
			.field("tokens", &self.tokens)
			.field("refill_rate", &self.refill_rate)
			.finish()
	}
}
