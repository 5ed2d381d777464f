//! Computes auth headers and query params from a stored [`AuthConfig`].

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{ACCESS_TOKEN, API_KEY, AuthConfig, AuthScheme, PASSWORD, TOKEN, USERNAME},
	error::ConfigError,
};

/// Header and query-param maps produced by the provider.
pub type AuthMap = BTreeMap<String, String>;

/// Read-only auth data source shared by every request an integrator sends.
///
/// Missing credentials yield empty maps so the remote service answers with its own 401;
/// use [`AuthProvider::try_new`] to reject inconsistent configs up front instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthProvider {
	config: AuthConfig,
}
impl AuthProvider {
	/// Creates an advisory provider that never fails.
	pub fn new(config: AuthConfig) -> Self {
		Self { config }
	}

	/// Creates a provider after checking that credentials match the scheme.
	pub fn try_new(config: AuthConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self::new(config))
	}

	/// Returns the stored config.
	pub fn config(&self) -> &AuthConfig {
		&self.config
	}

	/// Returns the selected scheme.
	pub fn scheme(&self) -> AuthScheme {
		self.config.scheme
	}

	/// Headers to merge into every request.
	pub fn headers(&self) -> AuthMap {
		let config = &self.config;
		let creds = &config.credentials;
		let value = match config.scheme {
			AuthScheme::None | AuthScheme::ApiKey => None,
			AuthScheme::Bearer => creds
				.first_of(&[TOKEN, ACCESS_TOKEN])
				.map(|token| format!("Bearer {}", token.expose())),
			AuthScheme::OAuth2 => creds
				.first_of(&[ACCESS_TOKEN, TOKEN])
				.map(|token| format!("Bearer {}", token.expose())),
			AuthScheme::Basic => match (creds.get_present(USERNAME), creds.get_present(PASSWORD)) {
				(Some(user), Some(pass)) =>
					Some(format!("Basic {}", STANDARD.encode(user.pair(pass).as_bytes()))),
				_ => None,
			},
		};

		value.map(|value| AuthMap::from([(config.header_name.clone(), value)])).unwrap_or_default()
	}

	/// Query params to merge into every request.
	pub fn params(&self) -> AuthMap {
		let config = &self.config;

		match config.scheme {
			AuthScheme::ApiKey => config
				.credentials
				.get(API_KEY)
				.map(|key| AuthMap::from([(config.api_key_param.clone(), key.expose().to_owned())]))
				.unwrap_or_default(),
			AuthScheme::None | AuthScheme::Bearer | AuthScheme::Basic | AuthScheme::OAuth2 =>
				AuthMap::new(),
		}
	}
}
impl From<AuthConfig> for AuthProvider {
	fn from(config: AuthConfig) -> Self {
		Self::new(config)
	}
}
