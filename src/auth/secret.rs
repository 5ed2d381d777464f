//! Caller-owned credential material.
//!
//! A [`Secret`] never prints its contents and wipes its buffer when dropped, so credentials
//! handed to an integrator do not outlive it in freed memory.

// crates.io
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};
// self
use crate::_prelude::*;

/// Credential string that is redacted in formatters and zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the secret holds no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Joins two secrets as `self:other` in a buffer that is wiped once the caller drops it.
	pub fn pair(&self, other: &Secret) -> Zeroizing<String> {
		let mut joined = Zeroizing::new(String::with_capacity(self.0.len() + 1 + other.0.len()));

		joined.push_str(&self.0);
		joined.push(':');
		joined.push_str(&other.0);

		joined
	}
}
impl Zeroize for Secret {
	fn zeroize(&mut self) {
		self.0.zeroize();
	}
}
impl ZeroizeOnDrop for Secret {}
impl Drop for Secret {
	fn drop(&mut self) {
		self.zeroize();
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Secret(<redacted>)")
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_never_print_the_value() {
		let secret = Secret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(format!("{:?}", Some(&secret)), "Some(Secret(<redacted>))");
		assert_eq!(secret.expose(), "super-secret");
	}

	#[test]
	fn zeroize_clears_the_buffer() {
		let mut secret = Secret::new("sk_live_abc");

		secret.zeroize();

		assert!(secret.is_empty());
	}

	#[test]
	fn pair_joins_with_a_colon() {
		let user = Secret::new("sk_test_123");

		assert_eq!(user.pair(&Secret::new("")).as_str(), "sk_test_123:");
		assert_eq!(user.pair(&Secret::new("pw")).as_str(), "sk_test_123:pw");
	}

	#[test]
	fn secret_serializes_transparently() {
		let secret: Secret =
			serde_json::from_str("\"abc\"").expect("Secret should deserialize from a string.");

		assert_eq!(secret.expose(), "abc");
		assert_eq!(serde_json::to_string(&secret).expect("Secret should serialize."), "\"abc\"");
	}
}
