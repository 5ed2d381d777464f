//! Optional observability helpers for integrator calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `api_integrator.call` with the `kind`,
//!   `method`, and `path` fields, plus events for retries, rate-limit waits, and pagination
//!   termination.
//! - Enable `metrics` to increment the `api_integrator_request_total` counter for every
//!   attempt/success/failure/retry/throttle, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call kinds observed by the integrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// A single request, including its retries.
	Request,
	/// One page fetched as part of a paginated sequence.
	Page,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Page => "page",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an integrator call.
	Attempt,
	/// A response was returned to the caller.
	Success,
	/// An error was returned to the caller.
	Failure,
	/// An attempt is being repeated after backoff.
	Retry,
	/// An attempt waited for rate-limit capacity.
	Throttled,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Retry => "retry",
			CallOutcome::Throttled => "throttled",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
