//! Integrator-level error types shared across auth, limiting, retries, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical integrator error exposed by public APIs.
///
/// Non-retryable HTTP statuses (404, 401, ...) are never errors; they come back as
/// [`Response`](crate::request::Response) values for the caller to inspect.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected before any network call.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout) that survived the retry budget.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The operation was cancelled while waiting for rate-limit capacity or a retry backoff.
	#[error("Operation was cancelled.")]
	Cancelled,
}
impl Error {
	/// Returns true when the error is a cancellation rather than a failure.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

/// Configuration and validation failures raised before any request is sent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed or cannot carry paths.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure, when the string did not parse at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// A request path could not be joined onto the base URL.
	#[error("Request URL could not be built for `{path}`.")]
	InvalidUrl {
		/// Path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A header name or value is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as supplied.
		name: String,
	},
	/// HTTP method is not recognized.
	#[error("HTTP method `{method}` is not supported.")]
	UnsupportedMethod {
		/// Method string as supplied.
		method: String,
	},
	/// Auth scheme requires a credential that was not supplied.
	#[error("The {scheme} auth scheme requires the `{key}` credential.")]
	MissingCredential {
		/// Scheme label.
		scheme: &'static str,
		/// Missing credential key.
		key: &'static str,
	},
	/// Rate limiter parameters are out of range.
	#[error("Rate limit configuration is invalid: {reason}.")]
	InvalidRateLimit {
		/// Human-readable reason.
		reason: String,
	},
	/// Retry parameters are out of range.
	#[error("Retry configuration is invalid: {reason}.")]
	InvalidRetry {
		/// Human-readable reason.
		reason: String,
	},
	/// Default timeout is zero or negative.
	#[error("Timeout must be positive, got {timeout}.")]
	InvalidTimeout {
		/// Offending timeout.
		timeout: Duration,
	},
	/// Pagination parameters are out of range.
	#[error("Pagination configuration is invalid: {reason}.")]
	InvalidPagination {
		/// Human-readable reason.
		reason: String,
	},
	/// OpenAPI document is structurally malformed.
	#[error("API description document is malformed: {reason}.")]
	InvalidDocument {
		/// Human-readable reason.
		reason: String,
	},
	/// Typed configuration failed to decode.
	#[error("Configuration failed to decode at `{path}`.")]
	Deserialize {
		/// JSON path of the offending value.
		path: String,
		/// Structured decoding failure.
		#[source]
		source: serde_json::Error,
	},
	/// JSON input could not be parsed at all.
	#[error("Document is not valid JSON.")]
	Json(#[from] serde_json::Error),
	/// YAML input could not be parsed at all.
	#[error("Document is not valid YAML.")]
	Yaml(#[from] serde_yaml::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn document(reason: impl Into<String>) -> Self {
		Self::InvalidDocument { reason: reason.into() }
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Deserialize { path, source: e.into_inner() }
	}
}

/// Transport-level failures (network, IO). Every variant is retryable.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connection could not be established (refused, DNS, TLS handshake).
	#[error("Connection to the remote service failed.")]
	Connect {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within its timeout.
	#[error("Request to the remote service timed out.")]
	Timeout {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// Any other network failure reported by the HTTP client.
	#[error("Network error occurred while calling the remote service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a connection failure.
	pub fn connect(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Connect { source: Box::new(src) }
	}

	/// Wraps a timeout failure.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Stable label for logs and metrics.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Connect { .. } => "connect",
			Self::Timeout { .. } => "timeout",
			Self::Network { .. } => "network",
			Self::Io(_) => "io",
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_connect() {
			Self::connect(e)
		} else {
			Self::network(e)
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn config_error_converts_into_error_with_source() {
		let reason = "capacity must be positive".to_owned();
		let err = Error::from(ConfigError::InvalidRateLimit { reason });

		assert!(matches!(err, Error::Config(ConfigError::InvalidRateLimit { .. })));
		assert!(err.to_string().contains("capacity must be positive"));
		assert!(!err.is_cancelled());
	}

	#[test]
	fn transport_error_exposes_kind_and_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err = TransportError::connect(io);

		assert_eq!(err.kind(), "connect");
		assert_eq!(
			StdError::source(&err).expect("Connect errors should expose a source.").to_string(),
			"refused"
		);
	}

	#[test]
	fn path_to_error_reports_json_path() {
		#[derive(Debug, Deserialize)]
		struct Inner {
			#[allow(dead_code)]
			capacity: u32,
		}
		#[derive(Debug, Deserialize)]
		struct Outer {
			#[allow(dead_code)]
			limit: Inner,
		}

		let mut de = serde_json::Deserializer::from_str(r#"{"limit":{"capacity":"lots"}}"#);
		let err = serde_path_to_error::deserialize::<_, Outer>(&mut de)
			.expect_err("String capacity should fail to decode.");

		match ConfigError::from(err) {
			ConfigError::Deserialize { path, .. } => assert_eq!(path, "limit.capacity"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
