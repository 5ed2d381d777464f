//! Sliding-window request counter.

// std
use std::collections::VecDeque;
// self
use crate::{_prelude::*, clock::Clock, limit::RateLimiter};

/// Allows at most `max_requests` acquisitions within any trailing `window`.
///
/// Timestamps are kept oldest first; entries at or beyond the window edge are pruned on
/// every call.
pub struct SlidingWindow {
	window: Duration,
	max_requests: usize,
	timestamps: VecDeque<Duration>,
	clock: Arc<dyn Clock>,
}
impl SlidingWindow {
	/// Creates an empty window. Callers are expected to pass validated parameters; see
	/// [`RateLimitConfig::validate`](crate::limit::RateLimitConfig::validate).
	pub fn new(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
		Self { window, max_requests: max_requests as usize, timestamps: VecDeque::new(), clock }
	}

	/// Requests recorded within the current window.
	pub fn in_window(&mut self) -> usize {
		let now = self.clock.now();

		self.prune(now);

		self.timestamps.len()
	}

	fn prune(&mut self, now: Duration) {
		let edge = now - self.window;

		while self.timestamps.front().is_some_and(|ts| *ts <= edge) {
			self.timestamps.pop_front();
		}
	}
}
impl RateLimiter for SlidingWindow {
	fn try_acquire(&mut self) -> bool {
		let now = self.clock.now();

		self.prune(now);

		if self.timestamps.len() < self.max_requests {
			self.timestamps.push_back(now);

			true
		} else {
			false
		}
	}

	fn wait_time(&mut self) -> Duration {
		let now = self.clock.now();

		self.prune(now);

		if self.timestamps.len() < self.max_requests {
			return Duration::ZERO;
		}

		match self.timestamps.front() {
			Some(oldest) => (self.window - (now - *oldest)).max(Duration::ZERO),
			None => Duration::ZERO,
		}
	}
}
impl Debug for SlidingWindow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SlidingWindow")
			.field("window", &self.window)
			.field("max_requests", &self.max_requests)
			.field("recorded", &self.timestamps.len())
			.finish()
	}
}
