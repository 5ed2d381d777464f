mod common;

// std
use std::sync::Arc;
// crates.io
use serde_json::json;
// self
use api_integrator::{
	auth::AuthScheme,
	clock::ManualClock,
	config::IntegratorConfig,
	error::ConfigError,
	integrator::Integrator,
	openapi::{ApiCatalogue, ParameterLocation},
	request::Method,
};
use common::*;

const PETSTORE: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.2.0
servers:
  - url: https://petstore.example.com/v1
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
    post:
      operationId: createPet
      tags: [pets]
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        schema:
          type: string
    get:
      operationId: showPetById
      tags: [pets]
      summary: Info for a specific pet
    delete:
      deprecated: true
"#;

const CONFIG: &str = r#"{
	"base_url": "https://petstore.example.com/v1",
	"auth": { "scheme": "basic", "credentials": { "username": "ada", "password": "lovelace" } },
	"strict_auth": true,
	"rate_limit": { "strategy": "token_bucket", "capacity": 5, "refill_rate": 0.5 },
	"retry": { "max_retries": 2, "jitter": false },
	"default_headers": { "Accept": "application/json" }
}"#;

#[test]
fn petstore_catalogue_is_flattened() {
	let catalogue = ApiCatalogue::from_yaml_str(PETSTORE).expect("Petstore should parse.");

	assert_eq!(catalogue.info.title.as_deref(), Some("Petstore"));
	assert_eq!(catalogue.base_url(), Some("https://petstore.example.com/v1"));
	assert_eq!(catalogue.endpoints.len(), 4);
	assert_eq!(catalogue.by_tag("pets").count(), 3);

	let show = catalogue.endpoint("showPetById").expect("showPetById should exist.");

	assert_eq!(show.method, Method::Get);
	assert_eq!(show.summary.as_deref(), Some("Info for a specific pet"));
	assert_eq!(show.parameters_in(ParameterLocation::Path).count(), 1);
	assert!(show.parameters[0].required);

	let delete = catalogue.find(Method::Delete, "/pets/{petId}").expect("Delete should exist.");

	assert_eq!(delete.operation_id, "delete_/pets/{petId}");
	assert!(delete.deprecated);
}

#[tokio::test]
async fn catalogue_endpoints_drive_configured_requests() {
	let catalogue = ApiCatalogue::from_yaml_str(PETSTORE).expect("Petstore should parse.");
	let config = IntegratorConfig::from_json_str(CONFIG).expect("Config should decode.");

	assert_eq!(config.auth.scheme, AuthScheme::Basic);

	let transport = Arc::new(ScriptedTransport::new([
		status(429),
		json(200, json!({ "id": "p-1", "name": "Rex" })),
	]));
	let clock = ManualClock::new();
	let integrator: Integrator<ScriptedTransport> = config
		.into_builder(transport.clone())
		.manual_clock(clock.clone())
		.build()
		.expect("Configured integrator should build.");
	let request = catalogue
		.endpoint("showPetById")
		.expect("showPetById should exist.")
		.request()
		.path_param("petId", "p-1");
	let response = integrator.request(request).await.expect("Request should succeed.");

	assert_eq!(response.retry_count, 1);
	assert_eq!(response.json().and_then(|body| body.get("name")), Some(&json!("Rex")));

	let sent = &transport.requests()[1];

	assert_eq!(sent.url.as_str(), "https://petstore.example.com/v1/pets/p-1");
	assert_eq!(
		sent.headers.get("Authorization").map(String::as_str),
		Some("Basic YWRhOmxvdmVsYWNl")
	);
	assert_eq!(sent.headers.get("Accept").map(String::as_str), Some("application/json"));
	assert_eq!(clock.sleeps().len(), 1);
}

#[test]
fn strict_config_rejects_missing_credentials() {
	let mut config = IntegratorConfig::from_json_str(CONFIG).expect("Config should decode.");

	config.auth.credentials = Default::default();

	let err = config
		.build(Arc::new(ScriptedTransport::default()))
		.map(|_: Integrator<ScriptedTransport>| ())
		.expect_err("Missing basic credentials should fail in strict mode.");

	assert!(matches!(err, ConfigError::MissingCredential { key: "username", .. }));
}
