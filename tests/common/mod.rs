//! Fixtures shared by the integration tests: a scripted in-memory transport and builders that
//! wire it to a hand-driven clock.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use parking_lot::Mutex;
use serde_json::Value;
use time::Duration;
// self
use api_integrator::{
	clock::{ManualClock, SleepFuture, Sleeper},
	error::{Error, TransportError},
	http::{Transport, TransportFuture, TransportRequest, TransportResponse},
	integrator::{Integrator, IntegratorBuilder},
	retry::RetryConfig,
};

pub const BASE_URL: &str = "https://api.example.com/v1";

/// One scripted transport outcome.
pub enum Step {
	Respond(TransportResponse),
	ConnectFailure,
}

/// Transport that replays [`Step`]s in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
	script: Mutex<VecDeque<Step>>,
	requests: Mutex<Vec<TransportRequest>>,
}
impl ScriptedTransport {
	pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
		Self { script: Mutex::new(steps.into_iter().collect()), requests: Mutex::default() }
	}

	pub fn requests(&self) -> Vec<TransportRequest> {
		self.requests.lock().clone()
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}

	pub fn remaining(&self) -> usize {
		self.script.lock().len()
	}
}
impl Transport for ScriptedTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		self.requests.lock().push(request);

		let step = self.script.lock().pop_front();

		Box::pin(async move {
			match step.expect("Transport was called more often than scripted.") {
				Step::Respond(response) => Ok(response),
				Step::ConnectFailure => Err(Error::Transport(TransportError::connect(
					std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
				))),
			}
		})
	}
}

/// Sleeper whose waits never finish; a caller parked in one only leaves through cancellation.
pub struct StalledSleeper;
impl Sleeper for StalledSleeper {
	fn sleep(&self, _duration: Duration) -> SleepFuture<'_> {
		Box::pin(futures::future::pending())
	}
}

pub fn json(status: u16, body: Value) -> Step {
	Step::Respond(TransportResponse::json(status, body))
}

pub fn status(status: u16) -> Step {
	json(status, Value::Null)
}

/// Deterministic retry settings: 1s base, doubling, no jitter.
pub fn no_jitter() -> RetryConfig {
	RetryConfig::default().with_jitter(false)
}

pub fn builder(
	transport: &Arc<ScriptedTransport>,
	clock: &ManualClock,
) -> IntegratorBuilder<ScriptedTransport> {
	IntegratorBuilder::new(BASE_URL, transport.clone())
		.manual_clock(clock.clone())
		.retry(no_jitter())
}

pub fn integrator(
	steps: impl IntoIterator<Item = Step>,
) -> (Integrator<ScriptedTransport>, Arc<ScriptedTransport>, ManualClock) {
	let transport = Arc::new(ScriptedTransport::new(steps));
	let clock = ManualClock::new();
	let integrator = builder(&transport, &clock)
		.build()
		.expect("Scripted integrator should build with default settings.");

	(integrator, transport, clock)
}
