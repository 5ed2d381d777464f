#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::Duration;
// self
use api_integrator::{
	auth::AuthConfig,
	http::ReqwestTransport,
	integrator::{Integrator, ReqwestIntegrator},
	limit::RateLimitConfig,
	paginate::PaginationConfig,
	request::{Request, ResponseBody},
	retry::RetryConfig,
};

fn fast_retries(max_retries: u32) -> RetryConfig {
	RetryConfig::default()
		.with_max_retries(max_retries)
		.with_base_delay(Duration::milliseconds(1))
		.with_max_delay(Duration::milliseconds(5))
		.with_jitter(false)
}

fn build(server: &MockServer, auth: AuthConfig, retry: RetryConfig) -> ReqwestIntegrator {
	let transport = ReqwestTransport::new().expect("Reqwest transport should build.");

	Integrator::builder(server.base_url(), transport)
		.auth(auth)
		.retry(retry)
		.rate_limit(RateLimitConfig::token_bucket(100, 100.0))
		.default_header("user-agent", "api-integrator-it")
		.build()
		.expect("Integrator should build against the mock server.")
}

#[tokio::test]
async fn bearer_request_round_trips_json() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/users/42")
				.query_param("expand", "teams")
				.header("authorization", "Bearer s3cr3t")
				.header("user-agent", "api-integrator-it");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":42,\"name\":\"Ada\"}");
		})
		.await;
	let integrator = build(&server, AuthConfig::bearer("s3cr3t"), RetryConfig::disabled());
	let response = integrator
		.request(Request::get("/users/{id}").path_param("id", "42").query("expand", "teams"))
		.await
		.expect("Mocked request should succeed.");

	mock.assert_async().await;
	assert_eq!(response.status_code, 200);
	assert_eq!(response.json(), Some(&json!({ "id": 42, "name": "Ada" })));
	assert_eq!(response.header("Content-Type"), Some("application/json"));
	assert_eq!(response.retry_count, 0);
}

#[tokio::test]
async fn json_body_is_sent_with_content_type() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/users")
				.header("content-type", "application/json")
				.json_body(json!({ "name": "Grace" }));
			then.status(201).body("created");
		})
		.await;
	let integrator = build(&server, AuthConfig::none(), RetryConfig::disabled());
	let response = integrator
		.request(Request::post("/users").json(json!({ "name": "Grace" })))
		.await
		.expect("POST should succeed.");

	mock.assert_async().await;
	assert_eq!(response.status_code, 201);
	assert_eq!(response.body, ResponseBody::Text("created".into()));
}

#[tokio::test]
async fn unavailable_service_is_retried_until_exhausted() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/flaky");
			then.status(503);
		})
		.await;
	let integrator = build(&server, AuthConfig::api_key("k"), fast_retries(2));
	let response =
		integrator.request(Request::get("/flaky")).await.expect("Exhaustion is not an error.");

	mock.assert_calls_async(3).await;
	assert_eq!(response.status_code, 503);
	assert_eq!(response.retry_count, 2);
}

#[tokio::test]
async fn not_found_is_returned_without_retrying() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/missing");
			then.status(404)
				.header("content-type", "application/json")
				.body("{\"error\":\"nope\"}");
		})
		.await;
	let integrator = build(&server, AuthConfig::none(), fast_retries(3));
	let response = integrator.request(Request::get("/missing")).await.expect("404 is a response.");

	mock.assert_calls_async(1).await;
	assert_eq!(response.status_code, 404);
	assert_eq!(response.json(), Some(&json!({ "error": "nope" })));
}

#[tokio::test]
async fn paginates_over_http() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path("/events").query_param_missing("cursor");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[1,2],\"next_cursor\":\"abc\"}");
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path("/events").query_param("cursor", "abc");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[3],\"next_cursor\":null}");
		})
		.await;
	let integrator = build(&server, AuthConfig::none(), RetryConfig::disabled());
	let collected = integrator
		.paginate(Request::get("/events"), &PaginationConfig::cursor())
		.expect("Pagination config should be valid.")
		.collect()
		.await;

	first.assert_async().await;
	second.assert_async().await;
	assert!(collected.is_complete());
	assert_eq!(collected.items, [json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn unreachable_host_surfaces_transport_error() {
	let transport = ReqwestTransport::new().expect("Reqwest transport should build.");
	let integrator: ReqwestIntegrator = Integrator::builder("http://127.0.0.1:9", transport)
		.retry(fast_retries(1))
		.timeout(Duration::seconds(2))
		.build()
		.expect("Integrator should build.");
	let err = integrator
		.request(Request::get("/"))
		.await
		.expect_err("Nothing listens on the discard port.");

	assert!(matches!(err, api_integrator::error::Error::Transport(_)), "Unexpected: {err:?}.");
	assert_eq!(integrator.metrics().attempts(), 2);
}
