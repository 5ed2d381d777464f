//! Auth scheme selection and the credentials it consumes.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Credential key holding an API key.
pub const API_KEY: &str = "api_key";
/// Credential key holding a bearer token.
pub const TOKEN: &str = "token";
/// Credential key holding an OAuth 2.0 access token.
pub const ACCESS_TOKEN: &str = "access_token";
/// Credential key holding a Basic auth username.
pub const USERNAME: &str = "username";
/// Credential key holding a Basic auth password.
pub const PASSWORD: &str = "password";

/// Authentication schemes understood by [`AuthProvider`](crate::auth::AuthProvider).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
	/// No authentication.
	#[default]
	None,
	/// API key passed as a query parameter.
	ApiKey,
	/// `Authorization: Bearer <token>`.
	Bearer,
	/// `Authorization: Basic base64(username:password)`.
	Basic,
	/// Pre-acquired OAuth 2.0 access token, sent like a bearer token.
	#[serde(rename = "oauth2")]
	OAuth2,
}
impl AuthScheme {
	/// Returns a stable label suitable for logs and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthScheme::None => "none",
			AuthScheme::ApiKey => "api_key",
			AuthScheme::Bearer => "bearer",
			AuthScheme::Basic => "basic",
			AuthScheme::OAuth2 => "oauth2",
		}
	}
}
impl Display for AuthScheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Named secrets owned by the caller and handed to the provider by value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, Secret>);
impl Credentials {
	/// Creates an empty credential set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a named secret.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Secret>) -> Self {
		self.insert(key, value);

		self
	}

	/// Adds or replaces a named secret in place.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Secret>) {
		self.0.insert(key.into(), value.into());
	}

	/// Returns the secret stored under `key` when it is present and non-empty.
	pub fn get(&self, key: &str) -> Option<&Secret> {
		self.0.get(key).filter(|secret| !secret.is_empty())
	}

	/// Returns the secret stored under `key`, including an empty one.
	pub fn get_present(&self, key: &str) -> Option<&Secret> {
		self.0.get(key)
	}

	/// Returns the first non-empty secret among `keys`.
	pub fn first_of(&self, keys: &[&str]) -> Option<&Secret> {
		keys.iter().find_map(|key| self.get(key))
	}

	/// Number of stored secrets.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no secrets are stored.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for Credentials
where
	K: Into<String>,
	V: Into<Secret>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// Scheme plus the header/param names and credentials it needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
	/// Selected scheme.
	pub scheme: AuthScheme,
	/// Header carrying bearer/basic credentials.
	pub header_name: String,
	/// Query parameter carrying the API key.
	pub api_key_param: String,
	/// Caller-owned secrets.
	pub credentials: Credentials,
}
impl AuthConfig {
	/// Default header used by bearer, OAuth 2.0, and basic schemes.
	pub const DEFAULT_HEADER_NAME: &'static str = "Authorization";
	/// Default query parameter used by the API key scheme.
	pub const DEFAULT_API_KEY_PARAM: &'static str = "api_key";

	/// Creates a config for `scheme` with default names and no credentials.
	pub fn new(scheme: AuthScheme) -> Self {
		Self {
			scheme,
			header_name: Self::DEFAULT_HEADER_NAME.into(),
			api_key_param: Self::DEFAULT_API_KEY_PARAM.into(),
			credentials: Credentials::default(),
		}
	}

	/// Unauthenticated config.
	pub fn none() -> Self {
		Self::new(AuthScheme::None)
	}

	/// API key sent as a query parameter.
	pub fn api_key(key: impl Into<Secret>) -> Self {
		Self::new(AuthScheme::ApiKey).with_credential(API_KEY, key)
	}

	/// Bearer token sent in the auth header.
	pub fn bearer(token: impl Into<Secret>) -> Self {
		Self::new(AuthScheme::Bearer).with_credential(TOKEN, token)
	}

	/// HTTP Basic credentials.
	pub fn basic(username: impl Into<Secret>, password: impl Into<Secret>) -> Self {
		Self::new(AuthScheme::Basic)
			.with_credential(USERNAME, username)
			.with_credential(PASSWORD, password)
	}

	/// Pre-acquired OAuth 2.0 access token.
	pub fn oauth2(access_token: impl Into<Secret>) -> Self {
		Self::new(AuthScheme::OAuth2).with_credential(ACCESS_TOKEN, access_token)
	}

	/// Overrides the header name.
	pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
		self.header_name = name.into();

		self
	}

	/// Overrides the API key query parameter name.
	pub fn with_api_key_param(mut self, name: impl Into<String>) -> Self {
		self.api_key_param = name.into();

		self
	}

	/// Replaces the credential set.
	pub fn with_credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = credentials;

		self
	}

	/// Adds a single credential.
	pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<Secret>) -> Self {
		self.credentials.insert(key, value);

		self
	}

	/// Checks that the credentials satisfy the selected scheme.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let creds = &self.credentials;
		let missing = |key| ConfigError::MissingCredential { scheme: self.scheme.as_str(), key };

		match self.scheme {
			AuthScheme::None => Ok(()),
			AuthScheme::ApiKey => creds.get(API_KEY).map(|_| ()).ok_or_else(|| missing(API_KEY)),
			AuthScheme::Bearer =>
				creds.first_of(&[TOKEN, ACCESS_TOKEN]).map(|_| ()).ok_or_else(|| missing(TOKEN)),
			AuthScheme::OAuth2 => creds
				.first_of(&[ACCESS_TOKEN, TOKEN])
				.map(|_| ())
				.ok_or_else(|| missing(ACCESS_TOKEN)),
			// An empty password is legitimate, e.g. an API key sent as the username.
			AuthScheme::Basic => {
				creds.get_present(USERNAME).ok_or_else(|| missing(USERNAME))?;
				creds.get_present(PASSWORD).ok_or_else(|| missing(PASSWORD))?;

				Ok(())
			},
		}
	}
}
impl Default for AuthConfig {
	fn default() -> Self {
		Self::none()
	}
}
