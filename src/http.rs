//! Transport primitives for outbound API calls.
//!
//! [`Transport`] is the integrator's only dependency on an HTTP stack. Implementations send
//! exactly one request per call and report what came back; retries, rate limiting, and
//! auth are layered on top by [`Integrator`](crate::integrator::Integrator). Connection
//! pooling stays inside the implementation (the bundled [`ReqwestTransport`] reuses
//! reqwest's pool).

// crates.io
use time::{OffsetDateTime, format_description::well_known::Rfc2822};
// self
use crate::{
	_prelude::*,
	request::{Method, Params, ResponseBody},
};
#[cfg(feature = "reqwest")]
use crate::{
	clock,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<TransportResponse>> + 'a + Send>>;

/// Abstraction over HTTP clients capable of executing a single request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by many
/// integrators and concurrent callers. Network-level failures should be reported as
/// [`Error::Transport`] so the integrator can retry them; any other error is surfaced to
/// the caller immediately.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` once and returns the raw outcome.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}
impl<T> Transport for Arc<T>
where
	T: ?Sized + Transport,
{
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		(**self).send(request)
	}
}

/// Fully resolved request handed to a [`Transport`].
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL without query string.
	pub url: Url,
	/// Headers, including auth headers.
	pub headers: Params,
	/// Query parameters, including auth params.
	pub query: Params,
	/// Optional JSON body.
	pub body: Option<Value>,
	/// Effective timeout.
	pub timeout: Option<Duration>,
}

/// Raw outcome of a single transport call.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers with lower-cased names.
	pub headers: Params,
	/// Decoded body.
	pub body: ResponseBody,
}
impl TransportResponse {
	/// Creates a response with no headers.
	pub fn new(status: u16, body: ResponseBody) -> Self {
		Self { status, headers: Params::new(), body }
	}

	/// JSON response shorthand.
	pub fn json(status: u16, body: Value) -> Self {
		Self::new(status, ResponseBody::Json(body))
	}

	/// Adds a header; the name is lower-cased.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name.to_ascii_lowercase(), value.into());

		self
	}

	/// `Retry-After` hint expressed as a relative duration.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(self.headers.get("retry-after")?, OffsetDateTime::now_utc())
	}
}

/// Reqwest-backed [`Transport`]. Redirects are not followed; a 3xx is returned to the
/// caller as-is.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a client with redirect following disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`]. Configure it to disable redirects if the
	/// caller relies on seeing 3xx statuses.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};

			let mut builder =
				self.0.request(reqwest_method(request.method), request.url).query(&request.query);

			for (name, value) in &request.headers {
				let header_name = HeaderName::from_bytes(name.as_bytes())
					.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
				let header_value = HeaderValue::from_str(value)
					.map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;

				builder = builder.header(header_name, header_value);
			}
			if let Some(body) = &request.body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body.to_string());
			}
			if let Some(timeout) = request.timeout {
				builder = builder.timeout(clock::to_std(timeout));
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let bytes = response.bytes().await.map_err(TransportError::from)?;

			Ok(TransportResponse { status, headers, body: ResponseBody::from_bytes(&bytes) })
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
		Method::Head => reqwest::Method::HEAD,
		Method::Options => reqwest::Method::OPTIONS,
		Method::Trace => reqwest::Method::TRACE,
	}
}

fn parse_retry_after(raw: &str, now: OffsetDateTime) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
