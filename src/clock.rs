//! Injectable time sources and sleep primitives.
//!
//! Rate limiters read time through [`Clock`] and the integrator suspends through
//! [`Sleeper`], so tests can swap both for [`ManualClock`] and observe every wait without
//! performing one.

// std
use std::time::{Duration as StdDuration, Instant};
// self
use crate::_prelude::*;

/// Boxed future returned by [`Sleeper::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Monotonic time source expressed as the offset from an arbitrary fixed origin.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the time elapsed since the clock's origin.
	fn now(&self) -> Duration;
}

/// Timed wait used at the integrator's suspension points.
pub trait Sleeper
where
	Self: Send + Sync,
{
	/// Waits for `duration`; non-positive durations complete immediately.
	fn sleep(&self, duration: Duration) -> SleepFuture<'_>;
}

/// Wall-clock [`Clock`] backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
	origin: Instant,
}
impl Default for SystemClock {
	fn default() -> Self {
		Self { origin: Instant::now() }
	}
}
impl Clock for SystemClock {
	fn now(&self) -> Duration {
		Duration::try_from(self.origin.elapsed()).unwrap_or(Duration::MAX)
	}
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;
impl Sleeper for TokioSleeper {
	fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
		let wait = to_std(duration);

		Box::pin(async move {
			if !wait.is_zero() {
				tokio::time::sleep(wait).await;
			}
		})
	}
}

/// Hand-driven clock that also acts as a [`Sleeper`]: sleeping advances the clock instantly
/// and records the requested duration.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
	state: Arc<Mutex<ManualState>>,
}
#[derive(Debug, Default)]
struct ManualState {
	now: Duration,
	sleeps: Vec<Duration>,
}
impl ManualClock {
	/// Creates a clock positioned at its origin.
	pub fn new() -> Self {
		Self::default()
	}

	/// Moves the clock forward.
	pub fn advance(&self, by: Duration) {
		let mut state = self.state.lock();

		state.now = state.now.saturating_add(by.max(Duration::ZERO));
	}

	/// Every duration passed to [`Sleeper::sleep`] so far, in order.
	pub fn sleeps(&self) -> Vec<Duration> {
		self.state.lock().sleeps.clone()
	}

	/// Sum of all recorded sleeps.
	pub fn total_slept(&self) -> Duration {
		self.state.lock().sleeps.iter().fold(Duration::ZERO, |acc, d| acc.saturating_add(*d))
	}
}
impl Clock for ManualClock {
	fn now(&self) -> Duration {
		self.state.lock().now
	}
}
impl Sleeper for ManualClock {
	fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
		{
			let mut state = self.state.lock();
			let step = duration.max(Duration::ZERO);

			state.sleeps.push(step);
			state.now = state.now.saturating_add(step);
		}

		Box::pin(async {})
	}
}

pub(crate) fn to_std(duration: Duration) -> StdDuration {
	StdDuration::try_from(duration).unwrap_or_default()
}
