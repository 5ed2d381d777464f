//! Serde-loadable configuration aggregate for one integrator.
//!
//! Durations are written as floating-point seconds everywhere (`"base_delay": 0.5`), matching
//! how most API quotas are documented.

// self
use crate::{
	_prelude::*,
	auth::AuthConfig,
	error::ConfigError,
	http::Transport,
	integrator::{Integrator, IntegratorBuilder},
	limit::RateLimitConfig,
	request::{self, Params},
	retry::RetryConfig,
};

/// Complete integrator configuration as read from a file or environment blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
	/// Base URL every relative request path is joined onto.
	pub base_url: String,
	/// Auth scheme and credentials.
	#[serde(default)]
	pub auth: AuthConfig,
	/// Reject auth configs whose credentials do not satisfy the scheme.
	#[serde(default)]
	pub strict_auth: bool,
	/// Limiter selection.
	#[serde(default)]
	pub rate_limit: RateLimitConfig,
	/// Backoff parameters.
	#[serde(default)]
	pub retry: RetryConfig,
	/// Default per-request timeout in seconds.
	#[serde(default, with = "seconds_opt", skip_serializing_if = "Option::is_none")]
	pub timeout: Option<Duration>,
	/// Headers added to every request.
	#[serde(default, skip_serializing_if = "Params::is_empty")]
	pub default_headers: Params,
}
impl IntegratorConfig {
	/// Creates a config for `base_url` with every other setting at its default.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			auth: AuthConfig::default(),
			strict_auth: false,
			rate_limit: RateLimitConfig::default(),
			retry: RetryConfig::default(),
			timeout: None,
			default_headers: Params::new(),
		}
	}

	/// Decodes a JSON document; failures name the offending field path.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		Ok(serde_path_to_error::deserialize(&mut de)?)
	}

	/// Decodes a YAML document; failures name the offending field path.
	pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
		let value = serde_yaml::from_str::<Value>(raw)?;

		Ok(serde_path_to_error::deserialize(value)?)
	}

	/// Seeds an [`IntegratorBuilder`] with every setting, leaving room for clock overrides.
	pub fn into_builder<T>(self, transport: impl Into<Arc<T>>) -> IntegratorBuilder<T>
	where
		T: ?Sized + Transport,
	{
		let mut builder = IntegratorBuilder::new(self.base_url, transport)
			.auth(self.auth)
			.strict_auth(self.strict_auth)
			.rate_limit(self.rate_limit)
			.retry(self.retry);

		request::merge_headers(&mut builder.default_headers, self.default_headers);
		builder.timeout = self.timeout;

		builder
	}

	/// Validates the config and builds an integrator over `transport`.
	pub fn build<T>(self, transport: impl Into<Arc<T>>) -> Result<Integrator<T>, ConfigError>
	where
		T: ?Sized + Transport,
	{
		self.into_builder(transport).build()
	}
}

/// `Duration` as floating-point seconds.
pub(crate) mod seconds {
	// crates.io
	use serde::{Deserialize, Deserializer, Serializer};
	// self
	use super::from_secs;
	use crate::_prelude::Duration;

	pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_f64(duration.as_seconds_f64())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		from_secs(f64::deserialize(deserializer)?)
	}
}

/// `Option<Duration>` as optional floating-point seconds.
pub(crate) mod seconds_opt {
	// crates.io
	use serde::{Deserialize, Deserializer, Serializer};
	// self
	use super::from_secs;
	use crate::_prelude::Duration;

	pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match duration {
			Some(duration) => serializer.serialize_some(&duration.as_seconds_f64()),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
	where
		D: Deserializer<'de>,
	{
		Option::<f64>::deserialize(deserializer)?.map(from_secs).transpose()
	}
}

fn from_secs<E>(secs: f64) -> Result<Duration, E>
where
	E: serde::de::Error,
{
	if !secs.is_finite() {
		return Err(E::custom(format!("duration must be a finite number of seconds, got {secs}")));
	}

	Ok(Duration::saturating_seconds_f64(secs))
}
