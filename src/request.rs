//! Request templates and completed responses.

// std
use std::borrow::Cow;
// self
use crate::{_prelude::*, error::ConfigError};

/// Ordered key/value map used for query params and headers.
pub type Params = BTreeMap<String, String>;

/// HTTP methods the integrator can issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
	/// `HEAD`
	Head,
	/// `OPTIONS`
	Options,
	/// `TRACE`
	Trace,
}
impl Method {
	/// Every supported method, in OpenAPI path-item order.
	pub const ALL: [Method; 8] = [
		Method::Get,
		Method::Put,
		Method::Post,
		Method::Delete,
		Method::Options,
		Method::Head,
		Method::Patch,
		Method::Trace,
	];

	/// Upper-case wire name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
			Method::Head => "HEAD",
			Method::Options => "OPTIONS",
			Method::Trace => "TRACE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Method {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Method::ALL
			.into_iter()
			.find(|method| method.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| ConfigError::UnsupportedMethod { method: s.to_owned() })
	}
}

/// Request template. The integrator derives a fresh copy for every attempt and page.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the integrator's base URL, possibly containing `{name}` templates.
	pub path: String,
	/// Query parameters.
	pub query: Params,
	/// Request headers.
	pub headers: Params,
	/// Optional JSON body.
	pub body: Option<Value>,
	/// Per-request timeout; falls back to the integrator default when unset.
	pub timeout: Option<Duration>,
}
impl Request {
	/// Creates a request with no params, headers, or body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Params::new(),
			headers: Params::new(),
			body: None,
			timeout: None,
		}
	}

	/// `GET` shorthand.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// `POST` shorthand.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Adds or replaces a query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.insert(key.into(), value.to_string());

		self
	}

	/// Adds a header, replacing any header whose name matches ignoring ASCII case.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		insert_header(&mut self.headers, name.into(), value.into());

		self
	}

	/// Sets the JSON body.
	pub fn json(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Replaces every `{name}` segment in the path with the percent-encoded `value`.
	pub fn path_param(mut self, name: &str, value: impl AsRef<str>) -> Self {
		let placeholder = format!("{{{name}}}");

		if self.path.contains(&placeholder) {
			self.path = self.path.replace(&placeholder, &urlencoding::encode(value.as_ref()));
		}

		self
	}

	/// Returns true when the path still carries unfilled `{name}` templates.
	pub fn has_unfilled_params(&self) -> bool {
		self.path.find('{').is_some_and(|open| self.path[open..].contains('}'))
	}
}

/// Decoded response payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
	/// Body parsed as JSON.
	Json(Value),
	/// Body that was not valid JSON, kept verbatim.
	Text(String),
}
impl ResponseBody {
	/// Decodes raw bytes, preferring JSON and falling back to lossy UTF-8 text.
	pub fn from_bytes(bytes: &[u8]) -> Self {
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Self::Text(String::new());
		}

		match serde_json::from_slice(bytes) {
			Ok(value) => Self::Json(value),
			Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
		}
	}

	/// JSON value, if the body decoded as JSON.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Self::Json(value) => Some(value),
			Self::Text(_) => None,
		}
	}

	/// Body rendered as text.
	pub fn as_text(&self) -> Cow<'_, str> {
		match self {
			Self::Json(value) => Cow::Owned(value.to_string()),
			Self::Text(text) => Cow::Borrowed(text),
		}
	}
}
impl Default for ResponseBody {
	fn default() -> Self {
		Self::Text(String::new())
	}
}

/// Final outcome of a request after retries resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
	/// HTTP status code of the last attempt.
	pub status_code: u16,
	/// Decoded body of the last attempt.
	pub body: ResponseBody,
	/// Wall time the last attempt spent in the transport.
	pub elapsed: Duration,
	/// Retries performed before this response was accepted.
	pub retry_count: u32,
	/// Response headers of the last attempt, lower-cased names.
	pub headers: Params,
}
impl Response {
	/// True for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status_code)
	}

	/// JSON body, if any.
	pub fn json(&self) -> Option<&Value> {
		self.body.as_json()
	}

	/// Header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

/// Inserts `name: value`, dropping any existing header with the same name in another case.
pub(crate) fn insert_header(headers: &mut Params, name: String, value: String) {
	headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
	headers.insert(name, value);
}

/// Layers `overrides` on top of `headers`; header names compare ignoring ASCII case.
pub(crate) fn merge_headers(headers: &mut Params, overrides: Params) {
	for (name, value) in overrides {
		insert_header(headers, name, value);
	}
}
