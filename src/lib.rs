//! Generic third-party API integration engine: authenticate, rate-limit, retry, and paginate
//! HTTP calls to any REST/OpenAPI-described service through one [`integrator::Integrator`].
//!
//! The crate never owns an HTTP stack of its own. Callers inject a [`http::Transport`]
//! (the bundled [`http::ReqwestTransport`] is enabled by the default `reqwest` feature) and
//! the integrator composes [`auth::AuthProvider`], [`limit::RateLimiter`],
//! [`retry::RetryPolicy`], and [`paginate::PaginationCursor`] around it.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod integrator;
pub mod limit;
pub mod obs;
pub mod openapi;
pub mod paginate;
pub mod request;
pub mod retry;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use httpmock as _;
