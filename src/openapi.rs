//! Flat endpoint catalogue read from OpenAPI 3.x documents.
//!
//! Only `info`, `servers`, and `paths` are consumed. Schemas stay unresolved: a parameter
//! whose schema is a `$ref` reports no `schema_type`, and parameter entries that are
//! themselves `$ref`s are skipped. Endpoints come out sorted by path string, whatever order
//! the document lists them in, and within one path in a fixed method order (`get`, `put`,
//! `post`, `delete`, `options`, `head`, `patch`, `trace`).

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	request::{Method, Request},
};

/// Parsed document: metadata plus one [`Endpoint`] per path/method pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiCatalogue {
	/// Document metadata.
	pub info: ApiInfo,
	/// Declared servers, in document order.
	pub servers: Vec<Server>,
	/// Every operation found under `paths`.
	pub endpoints: Vec<Endpoint>,
}
impl ApiCatalogue {
	/// Builds the catalogue from an already decoded document.
	pub fn parse(document: &Value) -> Result<Self, ConfigError> {
		let root = document
			.as_object()
			.ok_or_else(|| ConfigError::document("top level must be an object"))?;
		let info = root.get("info").map(ApiInfo::from_value).transpose()?.unwrap_or_default();
		let servers = match root.get("servers") {
			None | Some(Value::Null) => Vec::new(),
			Some(Value::Array(entries)) => entries.iter().filter_map(Server::from_value).collect(),
			Some(_) => return Err(ConfigError::document("`servers` must be an array")),
		};
		let endpoints = match root.get("paths") {
			None | Some(Value::Null) => Vec::new(),
			Some(Value::Object(paths)) => {
				let mut endpoints = Vec::new();

				for (path, item) in paths {
					collect_path_item(path, item, &mut endpoints)?;
				}

				endpoints
			},
			Some(_) => return Err(ConfigError::document("`paths` must be an object")),
		};

		Ok(Self { info, servers, endpoints })
	}

	/// Parses a JSON document.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		Self::parse(&serde_json::from_str(raw)?)
	}

	/// Parses a YAML document.
	pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
		Self::parse(&serde_yaml::from_str::<Value>(raw)?)
	}

	/// Looks an endpoint up by operation id.
	pub fn endpoint(&self, operation_id: &str) -> Option<&Endpoint> {
		self.endpoints.iter().find(|endpoint| endpoint.operation_id == operation_id)
	}

	/// Looks an endpoint up by method and templated path.
	pub fn find(&self, method: Method, path: &str) -> Option<&Endpoint> {
		self.endpoints.iter().find(|endpoint| endpoint.method == method && endpoint.path == path)
	}

	/// Endpoints carrying `tag`.
	pub fn by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Endpoint> {
		self.endpoints.iter().filter(move |endpoint| endpoint.tags.iter().any(|t| t == tag))
	}

	/// URL of the first declared server.
	pub fn base_url(&self) -> Option<&str> {
		self.servers.first().map(|server| server.url.as_str())
	}
}

/// Document `info` block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
	/// API title.
	pub title: Option<String>,
	/// API version string.
	pub version: Option<String>,
	/// Long-form description.
	pub description: Option<String>,
}
impl ApiInfo {
	fn from_value(value: &Value) -> Result<Self, ConfigError> {
		if !value.is_object() {
			return Err(ConfigError::document("`info` must be an object"));
		}

		Ok(Self {
			title: text(value, "title"),
			version: text(value, "version"),
			description: text(value, "description"),
		})
	}
}

/// One `servers` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
	/// Server URL, possibly templated.
	pub url: String,
	/// Optional description.
	pub description: Option<String>,
}
impl Server {
	fn from_value(value: &Value) -> Option<Self> {
		Some(Self { url: text(value, "url")?, description: text(value, "description") })
	}
}

/// A single operation in the catalogue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
	/// HTTP method.
	pub method: Method,
	/// Templated path, e.g. `/users/{id}`.
	pub path: String,
	/// `operationId`, or `{method}_{path}` when the document omits it.
	pub operation_id: String,
	/// Short summary.
	pub summary: Option<String>,
	/// Long-form description.
	pub description: Option<String>,
	/// Tags, in document order.
	pub tags: Vec<String>,
	/// Whether the operation is marked deprecated.
	pub deprecated: bool,
	/// Path-level parameters merged with the operation's own.
	pub parameters: Vec<Parameter>,
}
impl Endpoint {
	/// Request template for this operation; fill `{name}` segments with
	/// [`Request::path_param`].
	pub fn request(&self) -> Request {
		Request::new(self.method, self.path.clone())
	}

	/// Parameters declared at `location`.
	pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
		self.parameters.iter().filter(move |parameter| parameter.location == location)
	}
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
	/// Parameter name.
	pub name: String,
	/// Where the parameter travels.
	pub location: ParameterLocation,
	/// Whether the parameter is mandatory. Always true for path parameters.
	pub required: bool,
	/// `schema.type`, when present and not behind a `$ref`.
	pub schema_type: Option<String>,
	/// Optional description.
	pub description: Option<String>,
}

/// The `in` field of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
	/// Templated path segment.
	Path,
	/// Query string.
	Query,
	/// Request header.
	Header,
	/// Cookie.
	Cookie,
}
impl ParameterLocation {
	/// Document spelling.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Path => "path",
			Self::Query => "query",
			Self::Header => "header",
			Self::Cookie => "cookie",
		}
	}
}
impl FromStr for ParameterLocation {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"path" => Ok(Self::Path),
			"query" => Ok(Self::Query),
			"header" => Ok(Self::Header),
			"cookie" => Ok(Self::Cookie),
			other => Err(ConfigError::document(format!("unknown parameter location `{other}`"))),
		}
	}
}

fn collect_path_item(
	path: &str,
	item: &Value,
	endpoints: &mut Vec<Endpoint>,
) -> Result<(), ConfigError> {
	let item = item
		.as_object()
		.ok_or_else(|| ConfigError::document(format!("path item `{path}` must be an object")))?;
	let shared = parameters(item.get("parameters"), path)?;

	for method in Method::ALL {
		let key = method.as_str().to_ascii_lowercase();
		let Some(operation) = item.get(&key) else {
			continue;
		};

		if !operation.is_object() {
			return Err(ConfigError::document(format!(
				"operation `{key} {path}` must be an object"
			)));
		}

		let mut merged = shared.clone();

		for parameter in parameters(operation.get("parameters"), path)? {
			match merged
				.iter_mut()
				.find(|p| p.name == parameter.name && p.location == parameter.location)
			{
				Some(existing) => *existing = parameter,
				None => merged.push(parameter),
			}
		}

		endpoints.push(Endpoint {
			method,
			path: path.to_owned(),
			operation_id: text(operation, "operationId").unwrap_or_else(|| format!("{key}_{path}")),
			summary: text(operation, "summary"),
			description: text(operation, "description"),
			tags: operation
				.get("tags")
				.and_then(Value::as_array)
				.map(|tags| tags.iter().filter_map(|t| t.as_str().map(str::to_owned)).collect())
				.unwrap_or_default(),
			deprecated: operation.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
			parameters: merged,
		});
	}

	Ok(())
}

fn parameters(raw: Option<&Value>, path: &str) -> Result<Vec<Parameter>, ConfigError> {
	let entries = match raw {
		None | Some(Value::Null) => return Ok(Vec::new()),
		Some(Value::Array(entries)) => entries,
		Some(_) =>
			return Err(ConfigError::document(format!("parameters of `{path}` must be an array"))),
	};
	let mut out = Vec::with_capacity(entries.len());

	for entry in entries {
		if entry.get("$ref").is_some() {
			continue;
		}

		let name = text(entry, "name").ok_or_else(|| {
			ConfigError::document(format!("a parameter of `{path}` has no `name`"))
		})?;
		let location = text(entry, "in")
			.ok_or_else(|| ConfigError::document(format!("parameter `{name}` has no `in`")))?
			.parse::<ParameterLocation>()?;

		out.push(Parameter {
			required: location == ParameterLocation::Path
				|| entry.get("required").and_then(Value::as_bool).unwrap_or(false),
			schema_type: entry.get("schema").and_then(|schema| text(schema, "type")),
			description: text(entry, "description"),
			name,
			location,
		});
	}

	Ok(out)
}

fn text(value: &Value, key: &str) -> Option<String> {
	value.get(key)?.as_str().map(str::to_owned)
}
