//! Request orchestration: auth, rate limiting, retries, and pagination around one transport.
//!
//! [`Integrator::request`] merges auth data into the template, then loops over attempts.
//! Every attempt first acquires rate-limit capacity (sleeping for the limiter's advertised
//! wait when none is available), sends through the [`Transport`], and asks the
//! [`RetryPolicy`] whether to back off and try again. Those two sleeps are the only
//! suspension points outside the transport itself, and both honor an optional
//! [`CancellationToken`].

pub mod builder;

pub use builder::*;

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::AuthProvider,
	clock::{Clock, Sleeper},
	error::ConfigError,
	http::{Transport, TransportRequest},
	limit::RateLimiter,
	obs::{self, CallKind, CallOutcome, CallSpan, IntegratorMetrics},
	paginate::{PaginationConfig, Pages},
	request::{self, Params, Request, Response},
	retry::{Attempt, RetryPolicy},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Integrator specialized for the crate's default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestIntegrator = Integrator<ReqwestTransport>;

// Floor for limiter waits so a hand-driven clock always moves forward.
const MIN_WAIT: Duration = Duration::NANOSECOND;

/// Coordinates calls against one base URL.
///
/// The integrator owns the transport handle, auth provider, limiter, and retry policy so
/// callers only describe *what* to call. Cloning is cheap and clones share the limiter and
/// metrics, so every clone draws from the same request budget.
pub struct Integrator<T>
where
	T: ?Sized + Transport,
{
	base_url: Url,
	transport: Arc<T>,
	auth: Arc<AuthProvider>,
	limiter: Arc<Mutex<Box<dyn RateLimiter>>>,
	retry: RetryPolicy,
	clock: Arc<dyn Clock>,
	sleeper: Arc<dyn Sleeper>,
	default_headers: Params,
	default_timeout: Option<Duration>,
	metrics: Arc<IntegratorMetrics>,
}
impl<T> Integrator<T>
where
	T: ?Sized + Transport,
{
	/// Starts a builder for `base_url` using `transport`.
	pub fn builder(
		base_url: impl Into<String>,
		transport: impl Into<Arc<T>>,
	) -> IntegratorBuilder<T> {
		IntegratorBuilder::new(base_url, transport)
	}

	/// Base URL every relative path is joined onto.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Auth provider shared by every request.
	pub fn auth(&self) -> &AuthProvider {
		&self.auth
	}

	/// Retry policy applied to every request.
	pub fn retry_policy(&self) -> &RetryPolicy {
		&self.retry
	}

	/// In-process counters for this integrator and its clones.
	pub fn metrics(&self) -> &IntegratorMetrics {
		&self.metrics
	}

	/// Sends `template` with auth, rate limiting, and retries applied.
	///
	/// Non-retryable statuses and retryable statuses that outlived the retry budget come back
	/// as `Ok(Response)`. Only transport failures on the final attempt, configuration
	/// problems, and cancellation are errors.
	pub async fn request(&self, template: Request) -> Result<Response> {
		self.call(CallKind::Request, template, None).await
	}

	/// Like [`request`](Self::request), aborting with [`Error::Cancelled`] if `cancel` fires
	/// before or during a wait.
	pub async fn request_with_cancel(
		&self,
		template: Request,
		cancel: &CancellationToken,
	) -> Result<Response> {
		self.call(CallKind::Request, template, Some(cancel)).await
	}

	/// Returns a lazy page sequence for `template`.
	///
	/// Nothing is sent until the first [`Pages::next`]. Calling `paginate` again with the same
	/// template restarts from the first page.
	pub fn paginate(
		&self,
		template: Request,
		config: &PaginationConfig,
	) -> Result<Pages<'_, T>> {
		config.validate()?;

		Ok(Pages::new(self, template, config))
	}

	/// Resolves `path` against the base URL. Absolute `http(s)` URLs are used as-is.
	pub fn url_for(&self, path: &str) -> Result<Url> {
		let invalid =
			|source| Error::from(ConfigError::InvalidUrl { path: path.to_owned(), source });

		if path.starts_with("http://") || path.starts_with("https://") {
			return Url::parse(path).map_err(invalid);
		}

		let joined = format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		Url::parse(&joined).map_err(invalid)
	}

	pub(crate) async fn call(
		&self,
		kind: CallKind,
		template: Request,
		cancel: Option<&CancellationToken>,
	) -> Result<Response> {
		let span = CallSpan::new(kind, template.method, &template.path);

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span.instrument(self.execute(kind, template, cancel)).await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_call_outcome(kind, CallOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_call_outcome(kind, CallOutcome::Failure);
			},
		}

		result
	}

	async fn execute(
		&self,
		kind: CallKind,
		template: Request,
		cancel: Option<&CancellationToken>,
	) -> Result<Response> {
		let prepared = self.prepare(template)?;
		let mut attempt = 0;

		loop {
			self.acquire(kind, cancel).await?;
			self.metrics.record_attempt();

			let started = self.clock.now();
			let outcome = self.transport.send(prepared.clone()).await;
			let elapsed = (self.clock.now() - started).max(Duration::ZERO);

			match outcome {
				Ok(response) => {
					if self.retry.should_retry(Attempt::Status(response.status), attempt) {
						let delay = self.retry.delay_with_hint(attempt, response.retry_after());

						obs::retrying(attempt, delay, &format_args!("HTTP {}", response.status));
						self.backoff(kind, delay, cancel).await?;

						attempt += 1;

						continue;
					}

					return Ok(Response {
						status_code: response.status,
						body: response.body,
						elapsed,
						retry_count: attempt,
						headers: response.headers,
					});
				},
				Err(Error::Transport(err)) => {
					if self.retry.should_retry(Attempt::TransportFailure, attempt) {
						let delay = self.retry.delay(attempt);

						obs::retrying(attempt, delay, &err);
						self.backoff(kind, delay, cancel).await?;

						attempt += 1;

						continue;
					}

					return Err(err.into());
				},
				Err(err) => return Err(err),
			}
		}
	}

	/// Merges auth data and defaults into a transport-ready request.
	fn prepare(&self, template: Request) -> Result<TransportRequest> {
		let url = self.url_for(&template.path)?;
		let mut headers = self.default_headers.clone();
		let mut query = template.query;

		request::merge_headers(&mut headers, template.headers);
		request::merge_headers(&mut headers, self.auth.headers());
		query.extend(self.auth.params());

		Ok(TransportRequest {
			method: template.method,
			url,
			headers,
			query,
			body: template.body,
			timeout: template.timeout.or(self.default_timeout),
		})
	}

	/// Blocks until the limiter hands out one unit of capacity.
	async fn acquire(&self, kind: CallKind, cancel: Option<&CancellationToken>) -> Result<()> {
		loop {
			let wait = {
				let mut limiter = self.limiter.lock();

				if limiter.try_acquire() {
					return Ok(());
				}

				limiter.wait_time().max(MIN_WAIT)
			};

			self.metrics.record_throttled();
			obs::record_call_outcome(kind, CallOutcome::Throttled);
			obs::throttled(wait);
			self.pause(wait, cancel).await?;
		}
	}

	async fn backoff(
		&self,
		kind: CallKind,
		delay: Duration,
		cancel: Option<&CancellationToken>,
	) -> Result<()> {
		self.metrics.record_retry();
		obs::record_call_outcome(kind, CallOutcome::Retry);

		self.pause(delay, cancel).await
	}

	async fn pause(&self, wait: Duration, cancel: Option<&CancellationToken>) -> Result<()> {
		let Some(token) = cancel else {
			self.sleeper.sleep(wait).await;

			return Ok(());
		};

		if token.is_cancelled() {
			return Err(Error::Cancelled);
		}

		tokio::select! {
			biased;

			_ = token.cancelled() => Err(Error::Cancelled),
			_ = self.sleeper.sleep(wait) => Ok(()),
		}
	}
}
impl<T> Clone for Integrator<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			base_url: self.base_url.clone(),
			transport: self.transport.clone(),
			auth: self.auth.clone(),
			limiter: self.limiter.clone(),
			retry: self.retry.clone(),
			clock: self.clock.clone(),
			sleeper: self.sleeper.clone(),
			default_headers: self.default_headers.clone(),
			default_timeout: self.default_timeout,
			metrics: self.metrics.clone(),
		}
	}
}
impl<T> Debug for Integrator<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Integrator")
			.field("base_url", &self.base_url.as_str())
			.field("auth_scheme", &self.auth.scheme())
			.field("retry", self.retry.config())
			.field("default_timeout", &self.default_timeout)
			.finish()
	}
}
