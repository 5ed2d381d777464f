//! Pagination styles and the cursor that computes the next page's params.
//!
//! [`PaginationCursor::next_params`] is pure: it looks at the params used for the last page
//! and the body that came back, and either returns the params for the next page or `None`
//! when the sequence is finished. The lazy page sequence itself lives in [`pages`].

pub mod pages;

pub use pages::*;

// self
use crate::{_prelude::*, error::ConfigError, request::Params};

/// How an API splits a collection across responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum PaginationStyle {
	/// `?page=N&per_page=M` with a total count in the body.
	PageNumber {
		/// Query param carrying the 1-based page number.
		#[serde(default = "default_page_param")]
		page_param: String,
		/// Query param carrying the page size.
		#[serde(default = "default_size_param")]
		size_param: String,
		/// Body key holding the total item count.
		#[serde(default = "default_total_key")]
		total_key: String,
		/// Body key holding the page's items.
		#[serde(default = "default_data_key")]
		data_key: String,
		/// Page size assumed when the request does not set `size_param`.
		#[serde(default = "default_page_size")]
		page_size: u32,
	},
	/// Opaque continuation token returned by the server.
	Cursor {
		/// Query param carrying the cursor.
		#[serde(default = "default_cursor_param")]
		cursor_param: String,
		/// Body key holding the next cursor.
		#[serde(default = "default_next_cursor_key")]
		next_cursor_key: String,
		/// Body key holding the page's items.
		#[serde(default = "default_data_key")]
		data_key: String,
	},
}
impl PaginationStyle {
	/// Page-number style with default names.
	pub fn page_number() -> Self {
		Self::PageNumber {
			page_param: default_page_param(),
			size_param: default_size_param(),
			total_key: default_total_key(),
			data_key: default_data_key(),
			page_size: default_page_size(),
		}
	}

	/// Cursor style with default names.
	pub fn cursor() -> Self {
		Self::Cursor {
			cursor_param: default_cursor_param(),
			next_cursor_key: default_next_cursor_key(),
			data_key: default_data_key(),
		}
	}

	/// Body key holding the page's items.
	pub fn data_key(&self) -> &str {
		match self {
			Self::PageNumber { data_key, .. } | Self::Cursor { data_key, .. } => data_key,
		}
	}

	/// Stable label for logs.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::PageNumber { .. } => "page_number",
			Self::Cursor { .. } => "cursor",
		}
	}
}
impl Default for PaginationStyle {
	fn default() -> Self {
		Self::page_number()
	}
}

/// Pagination settings for [`Integrator::paginate`](crate::integrator::Integrator::paginate).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
	/// Selected style and its key names.
	#[serde(flatten)]
	pub style: PaginationStyle,
	/// Hard stop after this many pages.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_pages: Option<u32>,
}
impl PaginationConfig {
	/// Wraps `style` with no page bound.
	pub fn new(style: PaginationStyle) -> Self {
		Self { style, max_pages: None }
	}

	/// Default page-number pagination.
	pub fn page_number() -> Self {
		Self::new(PaginationStyle::page_number())
	}

	/// Default cursor pagination.
	pub fn cursor() -> Self {
		Self::new(PaginationStyle::cursor())
	}

	/// Stops after `max_pages` pages.
	pub fn with_max_pages(mut self, max_pages: u32) -> Self {
		self.max_pages = Some(max_pages);

		self
	}

	/// Checks key names and bounds.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let invalid = |reason: &str| Err(ConfigError::InvalidPagination { reason: reason.into() });

		if self.max_pages == Some(0) {
			return invalid("max pages must be at least 1");
		}

		match &self.style {
			PaginationStyle::PageNumber { page_size: 0, .. } =>
				invalid("page size must be at least 1"),
			PaginationStyle::PageNumber { page_param, size_param, total_key, data_key, .. }
				if [page_param, size_param, total_key, data_key].iter().any(|k| k.is_empty()) =>
				invalid("page number keys must not be empty"),
			PaginationStyle::Cursor { cursor_param, next_cursor_key, data_key }
				if [cursor_param, next_cursor_key, data_key].iter().any(|k| k.is_empty()) =>
				invalid("cursor keys must not be empty"),
			_ => Ok(()),
		}
	}
}

/// Pure next-page computation for one [`PaginationStyle`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationCursor {
	style: PaginationStyle,
}
impl PaginationCursor {
	/// Creates a cursor for `style`.
	pub fn new(style: PaginationStyle) -> Self {
		Self { style }
	}

	/// Returns the style.
	pub fn style(&self) -> &PaginationStyle {
		&self.style
	}

	/// Items of one page, or `None` when the body has no array under the data key.
	pub fn items<'a>(&self, body: &'a Value) -> Option<&'a Vec<Value>> {
		lookup(body, self.style.data_key())?.as_array()
	}

	/// Params that fill in the first page's position when the template leaves it unset.
	pub fn seed(&self, mut params: Params) -> Params {
		if let PaginationStyle::PageNumber { page_param, size_param, page_size, .. } = &self.style
		{
			params.entry(page_param.clone()).or_insert_with(|| "1".into());
			params.entry(size_param.clone()).or_insert_with(|| page_size.to_string());
		}

		params
	}

	/// Params for the page after the one fetched with `current`, or `None` when finished.
	///
	/// `seen` is the cumulative number of items received so far, including this page.
	pub fn next_params(&self, current: &Params, body: &Value, seen: usize) -> Option<Params> {
		let items = self.items(body)?;

		match &self.style {
			PaginationStyle::PageNumber { page_param, size_param, total_key, page_size, .. } => {
				if items.is_empty() {
					return None;
				}

				let page =
					current.get(page_param).and_then(|v| v.parse::<u64>().ok()).unwrap_or(1);
				let size = current
					.get(size_param)
					.and_then(|v| v.parse::<u64>().ok())
					.filter(|size| *size > 0)
					.unwrap_or(u64::from(*page_size));

				match lookup(body, total_key).and_then(as_count) {
					Some(total) =>
						if page.saturating_mul(size) >= total || seen as u64 >= total {
							return None;
						},
					None =>
						if (items.len() as u64) < size {
							return None;
						},
				}

				let mut next = current.clone();

				next.insert(page_param.clone(), (page + 1).to_string());

				Some(next)
			},
			PaginationStyle::Cursor { cursor_param, next_cursor_key, .. } => {
				let token = match lookup(body, next_cursor_key)? {
					Value::String(token) => token.clone(),
					Value::Number(token) => token.to_string(),
					_ => return None,
				};

				if token.is_empty() || current.get(cursor_param) == Some(&token) {
					return None;
				}

				let mut next = current.clone();

				next.insert(cursor_param.clone(), token);

				Some(next)
			},
		}
	}
}
impl From<PaginationStyle> for PaginationCursor {
	fn from(style: PaginationStyle) -> Self {
		Self::new(style)
	}
}

/// Reads `key` from `body`, falling back to a dotted path (`meta.next_cursor`).
fn lookup<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
	if let Some(value) = body.get(key) {
		return Some(value);
	}
	if !key.contains('.') {
		return None;
	}

	key.split('.').try_fold(body, |node, segment| node.get(segment))
}

fn as_count(value: &Value) -> Option<u64> {
	match value {
		Value::Number(n) =>
			n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

fn default_page_param() -> String {
	"page".into()
}

fn default_size_param() -> String {
	"per_page".into()
}

fn default_total_key() -> String {
	"total".into()
}

fn default_data_key() -> String {
	"data".into()
}

fn default_page_size() -> u32 {
	100
}

fn default_cursor_param() -> String {
	"cursor".into()
}

fn default_next_cursor_key() -> String {
	"next_cursor".into()
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn page_cursor(size: u32) -> PaginationCursor {
		PaginationCursor::new(PaginationStyle::PageNumber {
			page_param: "page".into(),
			size_param: "size".into(),
			total_key: "total".into(),
			data_key: "data".into(),
			page_size: size,
		})
	}

	fn params(pairs: &[(&str, &str)]) -> Params {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn page_number_walks_until_total_is_covered() {
		let cursor = page_cursor(10);
		let full = json!({ "total": 25, "data": vec![0; 10] });
		let last = json!({ "total": 25, "data": vec![0; 5] });
		let first = params(&[("page", "1"), ("size", "10"), ("q", "rust")]);
		let second = cursor.next_params(&first, &full, 10).expect("Page 1 should lead to page 2.");

		assert_eq!(second, params(&[("page", "2"), ("size", "10"), ("q", "rust")]));

		let third = cursor.next_params(&second, &full, 20).expect("Page 2 should lead to page 3.");

		assert_eq!(third.get("page").map(String::as_str), Some("3"));
		assert_eq!(cursor.next_params(&third, &last, 25), None);
	}

	#[test]
	fn page_number_defaults_to_first_page() {
		let cursor = page_cursor(2);
		let body = json!({ "total": 10, "data": [1, 2] });
		let next = cursor.next_params(&Params::new(), &body, 2).expect("Should advance.");

		assert_eq!(next.get("page").map(String::as_str), Some("2"));
	}

	#[test]
	fn page_number_without_total_stops_on_short_page() {
		let cursor = page_cursor(3);

		assert!(cursor.next_params(&Params::new(), &json!({ "data": [1, 2, 3] }), 3).is_some());
		assert_eq!(cursor.next_params(&Params::new(), &json!({ "data": [1] }), 4), None);
		assert_eq!(cursor.next_params(&Params::new(), &json!({ "data": [] }), 4), None);
	}

	#[test]
	fn cursor_style_follows_next_cursor() {
		let cursor = PaginationCursor::new(PaginationStyle::cursor());
		let current = params(&[("cursor", "old"), ("limit", "3")]);
		let next = cursor
			.next_params(&current, &json!({ "next_cursor": "abc123", "data": [1, 2, 3] }), 3)
			.expect("A next cursor should produce params.");

		assert_eq!(next, params(&[("cursor", "abc123"), ("limit", "3")]));
		assert_eq!(
			cursor.next_params(&Params::new(), &json!({ "next_cursor": "abc123", "data": [1] }), 1),
			Some(params(&[("cursor", "abc123")]))
		);
	}

	#[test]
	fn cursor_style_terminates_on_missing_null_empty_or_repeated_cursor() {
		let cursor = PaginationCursor::new(PaginationStyle::cursor());
		let current = params(&[("cursor", "same")]);

		for body in [
			json!({ "data": [1] }),
			json!({ "data": [1], "next_cursor": null }),
			json!({ "data": [1], "next_cursor": "" }),
			json!({ "data": [1], "next_cursor": "same" }),
		] {
			assert_eq!(cursor.next_params(&current, &body, 1), None, "{body} should terminate.");
		}
	}

	#[test]
	fn missing_data_key_is_terminal_for_every_style() {
		let body = json!({ "total": 100, "next_cursor": "abc" });

		assert_eq!(page_cursor(10).next_params(&Params::new(), &body, 0), None);
		assert_eq!(
			PaginationCursor::new(PaginationStyle::cursor()).next_params(&Params::new(), &body, 0),
			None
		);
	}

	#[test]
	fn dotted_keys_reach_nested_fields() {
		let cursor = PaginationCursor::new(PaginationStyle::Cursor {
			cursor_param: "after".into(),
			next_cursor_key: "meta.next".into(),
			data_key: "result.items".into(),
		});
		let body = json!({ "result": { "items": [1] }, "meta": { "next": 42 } });

		assert_eq!(cursor.items(&body).map(Vec::len), Some(1));
		assert_eq!(
			cursor.next_params(&Params::new(), &body, 1),
			Some(params(&[("after", "42")]))
		);
	}

	#[test]
	fn seed_fills_first_page_only_when_unset() {
		let cursor = page_cursor(50);

		assert_eq!(cursor.seed(Params::new()), params(&[("page", "1"), ("size", "50")]));
		assert_eq!(
			cursor.seed(params(&[("page", "0")])),
			params(&[("page", "0"), ("size", "50")])
		);
		assert!(PaginationCursor::new(PaginationStyle::cursor()).seed(Params::new()).is_empty());
	}

	#[test]
	fn config_deserializes_with_style_tag_and_defaults() {
		let config: PaginationConfig =
			serde_json::from_str(r#"{"style":"cursor","next_cursor_key":"next","max_pages":5}"#)
				.expect("Cursor pagination config should deserialize.");

		assert_eq!(config.max_pages, Some(5));
		assert_eq!(
			config.style,
			PaginationStyle::Cursor {
				cursor_param: "cursor".into(),
				next_cursor_key: "next".into(),
				data_key: "data".into(),
			}
		);
		assert!(config.validate().is_ok());
		assert!(PaginationConfig::page_number().with_max_pages(0).validate().is_err());
	}

	#[test]
	fn unknown_style_is_rejected_at_decode_time() {
		assert!(serde_json::from_str::<PaginationConfig>(r#"{"style":"offset"}"#).is_err());
	}
}
