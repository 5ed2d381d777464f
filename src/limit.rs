//! Request budgeting: token-bucket and sliding-window limiters behind one capability.
//!
//! A limiter owns its state exclusively. The integrator serializes access by holding a
//! mutex around each acquire-or-measure step, so implementations take `&mut self` and never
//! need interior locking of their own.

pub mod sliding_window;
pub mod token_bucket;

pub use sliding_window::SlidingWindow;
pub use token_bucket::TokenBucket;

// self
use crate::{_prelude::*, clock::Clock, config::seconds, error::ConfigError};

/// Capability shared by every rate-limiting algorithm.
pub trait RateLimiter
where
	Self: Send,
{
	/// Consumes one unit of capacity if available; never blocks.
	fn try_acquire(&mut self) -> bool;

	/// Time until the next unit of capacity should become available (zero when available now).
	fn wait_time(&mut self) -> Duration;
}
impl<R> RateLimiter for Box<R>
where
	R: ?Sized + RateLimiter,
{
	fn try_acquire(&mut self) -> bool {
		(**self).try_acquire()
	}

	fn wait_time(&mut self) -> Duration {
		(**self).wait_time()
	}
}

/// Serializable limiter selection; `strategy` picks the algorithm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RateLimitConfig {
	/// Smooths bursts while allowing spikes up to `capacity`.
	TokenBucket {
		/// Maximum stored tokens.
		#[serde(default = "default_capacity")]
		capacity: u32,
		/// Tokens added per second.
		#[serde(default = "default_refill_rate")]
		refill_rate: f64,
	},
	/// Hard cap of `max_requests` per trailing `time_window`.
	SlidingWindow {
		/// Requests permitted per window.
		max_requests: u32,
		/// Window length, in seconds when serialized.
		#[serde(with = "seconds")]
		time_window: Duration,
	},
}
impl RateLimitConfig {
	/// Default bucket capacity.
	pub const DEFAULT_CAPACITY: u32 = 60;
	/// Default refill rate in tokens per second.
	pub const DEFAULT_REFILL_RATE: f64 = 1.0;

	/// Token bucket with the provided parameters.
	pub fn token_bucket(capacity: u32, refill_rate: f64) -> Self {
		Self::TokenBucket { capacity, refill_rate }
	}

	/// Sliding window allowing `max_requests` per `time_window`.
	pub fn sliding_window(max_requests: u32, time_window: Duration) -> Self {
		Self::SlidingWindow { max_requests, time_window }
	}

	/// Checks parameter ranges without building a limiter.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let invalid = |reason: &str| Err(ConfigError::InvalidRateLimit { reason: reason.into() });

		match *self {
			Self::TokenBucket { capacity, .. } if capacity == 0 =>
				invalid("token bucket capacity must be at least 1"),
			Self::TokenBucket { refill_rate, .. }
				if !(refill_rate.is_finite() && refill_rate > 0.0) =>
				invalid("token bucket refill rate must be a positive number"),
			Self::SlidingWindow { max_requests, .. } if max_requests == 0 =>
				invalid("sliding window must allow at least one request"),
			Self::SlidingWindow { time_window, .. } if !time_window.is_positive() =>
				invalid("sliding window length must be positive"),
			_ => Ok(()),
		}
	}

	/// Validates the config and builds the matching limiter on top of `clock`.
	pub fn build(&self, clock: Arc<dyn Clock>) -> Result<Box<dyn RateLimiter>, ConfigError> {
		self.validate()?;

		Ok(match *self {
			Self::TokenBucket { capacity, refill_rate } =>
				Box::new(TokenBucket::new(capacity, refill_rate, clock)),
			Self::SlidingWindow { max_requests, time_window } =>
				Box::new(SlidingWindow::new(max_requests, time_window, clock)),
		})
	}
}
impl Default for RateLimitConfig {
	fn default() -> Self {
		Self::token_bucket(Self::DEFAULT_CAPACITY, Self::DEFAULT_REFILL_RATE)
	}
}

fn default_capacity() -> u32 {
	RateLimitConfig::DEFAULT_CAPACITY
}

fn default_refill_rate() -> f64 {
	RateLimitConfig::DEFAULT_REFILL_RATE
}
