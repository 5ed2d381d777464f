//! Retry decisions and exponential backoff, kept separate from the loop that applies them.
//!
//! [`RetryPolicy`] never sleeps. The integrator asks it whether an attempt should be
//! repeated and for how long to wait, then performs the wait through its injected
//! [`Sleeper`](crate::clock::Sleeper).

// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, config::seconds, error::ConfigError};

/// Backoff parameters. Immutable once handed to a [`RetryPolicy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
	/// Retries allowed after the first attempt.
	pub max_retries: u32,
	/// Delay before the first retry.
	#[serde(with = "seconds")]
	pub base_delay: Duration,
	/// Upper bound for the pre-jitter delay.
	#[serde(with = "seconds")]
	pub max_delay: Duration,
	/// Growth factor applied per attempt.
	pub exponential_base: f64,
	/// Multiplies each delay by a random factor in `[0.5, 1.5)`.
	pub jitter: bool,
}
impl RetryConfig {
	/// Config that never retries.
	pub fn disabled() -> Self {
		Self { max_retries: 0, ..Self::default() }
	}

	/// Overrides the retry budget.
	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;

		self
	}

	/// Overrides the base delay.
	pub fn with_base_delay(mut self, delay: Duration) -> Self {
		self.base_delay = delay;

		self
	}

	/// Overrides the delay ceiling.
	pub fn with_max_delay(mut self, delay: Duration) -> Self {
		self.max_delay = delay;

		self
	}

	/// Overrides the growth factor.
	pub fn with_exponential_base(mut self, base: f64) -> Self {
		self.exponential_base = base;

		self
	}

	/// Enables or disables jitter.
	pub fn with_jitter(mut self, jitter: bool) -> Self {
		self.jitter = jitter;

		self
	}

	/// Checks parameter ranges.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let invalid = |reason: &str| Err(ConfigError::InvalidRetry { reason: reason.into() });

		if self.base_delay.is_negative() || self.max_delay.is_negative() {
			return invalid("delays must not be negative");
		}
		if self.base_delay > self.max_delay {
			return invalid("base delay must not exceed max delay");
		}
		if !(self.exponential_base.is_finite() && self.exponential_base >= 1.0) {
			return invalid("exponential base must be a finite number of at least 1");
		}

		Ok(())
	}
}
impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_delay: Duration::SECOND,
			max_delay: Duration::minutes(1),
			exponential_base: 2.0,
			jitter: true,
		}
	}
}

/// What an attempt produced, reduced to what retry classification needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
	/// The remote service answered with this HTTP status.
	Status(u16),
	/// The transport failed before a status was received.
	TransportFailure,
}
impl Attempt {
	/// HTTP statuses worth repeating.
	pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

	/// Returns true for throttling, gateway/server hiccups, and transport failures.
	pub fn is_retryable(self) -> bool {
		match self {
			Self::Status(status) => Self::RETRYABLE_STATUSES.contains(&status),
			Self::TransportFailure => true,
		}
	}
}

/// Pure retry decision logic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetryPolicy {
	config: RetryConfig,
}
impl RetryPolicy {
	/// Creates a policy after validating `config`.
	pub fn new(config: RetryConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self { config })
	}

	/// Returns the underlying config.
	pub fn config(&self) -> &RetryConfig {
		&self.config
	}

	/// Retry budget.
	pub fn max_retries(&self) -> u32 {
		self.config.max_retries
	}

	/// True only while budget remains and `outcome` is retryable.
	pub fn should_retry(&self, outcome: Attempt, attempt: u32) -> bool {
		attempt < self.config.max_retries && outcome.is_retryable()
	}

	/// Pre-jitter delay: `min(max_delay, base_delay * exponential_base ^ attempt)`.
	///
	/// Monotonically non-decreasing in `attempt` and never above `max_delay`.
	pub fn backoff(&self, attempt: u32) -> Duration {
		let RetryConfig { base_delay, max_delay, exponential_base, .. } = self.config;
		let base = base_delay.as_seconds_f64();
		let max = max_delay.as_seconds_f64();

		if base <= 0.0 {
			return Duration::ZERO;
		}

		let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
		let raw = base * exponential_base.powi(exponent);
		let secs = if raw.is_finite() { raw.min(max) } else { max };

		Duration::saturating_seconds_f64(secs)
	}

	/// Delay before retrying after `attempt`, with jitter applied when enabled.
	pub fn delay(&self, attempt: u32) -> Duration {
		let backoff = self.backoff(attempt);

		if self.config.jitter {
			apply_jitter(backoff, rand::rng().random_range(0.5..1.5))
		} else {
			backoff
		}
	}

	/// Delay honoring an upstream `Retry-After` hint: the larger of [`delay`](Self::delay) and
	/// the hint, with the hint capped at `max_delay`.
	pub fn delay_with_hint(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
		let delay = self.delay(attempt);

		match retry_after {
			Some(hint) if hint.is_positive() => delay.max(hint.min(self.config.max_delay)),
			_ => delay,
		}
	}
}

fn apply_jitter(delay: Duration, factor: f64) -> Duration {
	Duration::saturating_seconds_f64(delay.as_seconds_f64() * factor)
}
