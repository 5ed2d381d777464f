//! Validating builder for [`Integrator`] values.

// self
use crate::{
	_prelude::*,
	auth::{AuthConfig, AuthProvider},
	clock::{Clock, ManualClock, Sleeper, SystemClock, TokioSleeper},
	error::ConfigError,
	http::Transport,
	integrator::Integrator,
	limit::RateLimitConfig,
	request::{self, Params},
	retry::{RetryConfig, RetryPolicy},
};

/// Builder for [`Integrator`] values. Every check runs in [`build`](Self::build), before any
/// network call can happen.
pub struct IntegratorBuilder<T>
where
	T: ?Sized + Transport,
{
	/// Base URL string, parsed during `build`.
	pub base_url: String,
	/// Transport every request goes through.
	pub transport: Arc<T>,
	/// Auth configuration.
	pub auth: AuthConfig,
	/// Reject auth configs whose credentials do not match the scheme.
	pub strict_auth: bool,
	/// Limiter selection.
	pub rate_limit: RateLimitConfig,
	/// Backoff parameters.
	pub retry: RetryConfig,
	/// Headers added to every request unless the request sets them.
	pub default_headers: Params,
	/// Timeout applied to requests that do not set one.
	pub timeout: Option<Duration>,
	clock: Option<Arc<dyn Clock>>,
	sleeper: Option<Arc<dyn Sleeper>>,
}
impl<T> IntegratorBuilder<T>
where
	T: ?Sized + Transport,
{
	/// Creates a builder with default auth (none), limiter, and retry settings.
	pub fn new(base_url: impl Into<String>, transport: impl Into<Arc<T>>) -> Self {
		Self {
			base_url: base_url.into(),
			transport: transport.into(),
			auth: AuthConfig::default(),
			strict_auth: false,
			rate_limit: RateLimitConfig::default(),
			retry: RetryConfig::default(),
			default_headers: Params::new(),
			timeout: None,
			clock: None,
			sleeper: None,
		}
	}

	/// Sets the auth configuration.
	pub fn auth(mut self, auth: AuthConfig) -> Self {
		self.auth = auth;

		self
	}

	/// Fails `build` when credentials do not satisfy the auth scheme.
	pub fn strict_auth(mut self, strict: bool) -> Self {
		self.strict_auth = strict;

		self
	}

	/// Sets the limiter.
	pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
		self.rate_limit = rate_limit;

		self
	}

	/// Sets the retry parameters.
	pub fn retry(mut self, retry: RetryConfig) -> Self {
		self.retry = retry;

		self
	}

	/// Adds a default header, replacing one whose name matches ignoring ASCII case.
	pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		request::insert_header(&mut self.default_headers, name.into(), value.into());

		self
	}

	/// Sets the default timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the time source used by the limiter and elapsed-time measurement.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}

	/// Overrides the sleep primitive used for rate-limit and backoff waits.
	pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
		self.sleeper = Some(sleeper);

		self
	}

	/// Drives both time and sleeps from `clock`, so waits complete instantly and are
	/// recorded on the clock.
	pub fn manual_clock(self, clock: ManualClock) -> Self {
		let shared = Arc::new(clock);

		self.clock(shared.clone()).sleeper(shared)
	}

	/// Validates every setting and assembles the integrator.
	pub fn build(self) -> Result<Integrator<T>, ConfigError> {
		let base_url = parse_base_url(&self.base_url)?;

		if self.strict_auth {
			self.auth.validate()?;
		}
		if let Some(timeout) = self.timeout.filter(|timeout| !timeout.is_positive()) {
			return Err(ConfigError::InvalidTimeout { timeout });
		}
		if let Some(name) = self.default_headers.keys().find(|name| name.trim().is_empty()) {
			return Err(ConfigError::InvalidHeader { name: name.clone() });
		}

		let retry = RetryPolicy::new(self.retry)?;
		let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::default()));
		let sleeper = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));
		let limiter = self.rate_limit.build(clock.clone())?;

		Ok(Integrator {
			base_url,
			transport: self.transport,
			auth: Arc::new(AuthProvider::new(self.auth)),
			limiter: Arc::new(Mutex::new(limiter)),
			retry,
			clock,
			sleeper,
			default_headers: self.default_headers,
			default_timeout: self.timeout,
			metrics: Default::default(),
		})
	}
}
impl<T> Debug for IntegratorBuilder<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IntegratorBuilder")
			.field("base_url", &self.base_url)
			.field("auth_scheme", &self.auth.scheme)
			.field("rate_limit", &self.rate_limit)
			.field("retry", &self.retry)
			.finish()
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let invalid = |source| ConfigError::InvalidBaseUrl { url: raw.to_owned(), source };
	let url = Url::parse(raw).map_err(|e| invalid(Some(e)))?;

	if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
		return Err(invalid(None));
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(invalid(None));
	}

	Ok(url)
}
