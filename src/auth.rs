//! Auth-domain configuration, redacted secrets, and the header/param provider.
//!
//! [`AuthProvider`] is a pure function of its [`AuthConfig`]: no I/O, no mutation, and safe
//! to share across concurrent requests. OAuth 2.0 token acquisition and refresh belong to
//! an external collaborator; this layer only attaches a token it was handed.

pub mod config;
pub mod provider;
pub mod secret;

pub use config::*;
pub use provider::*;
pub use secret::*;
