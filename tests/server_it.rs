// crates.io
use axum_test::TestServer;
use httpmock::prelude::*;
// self
use lead_relay::{
	_preludet::*,
	config::CacheMode,
	server::{self, CREATE_ACCOUNT_PATH, HEALTH_PATH},
	store::{ACCESS_TOKEN_KEY, MemoryCache, TokenCache},
};

fn test_server(base: &str) -> (TestServer, Arc<MemoryCache>) {
	let config =
		test_config(base, CacheMode::Memory).expect("Test config should build for the mock server.");
	let (relay, cache) = build_test_relay(config).expect("Relay should build.");
	let server =
		TestServer::new(server::build_router(Arc::new(relay))).expect("Test server should start.");

	(server, cache)
}

#[tokio::test]
async fn health_reports_ok() {
	let (server, _cache) = test_server("http://127.0.0.1:9");
	let response = server.get(HEALTH_PATH).await;

	response.assert_status_ok();
	response.assert_json(&serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn malformed_body_gets_relay_error_shape() {
	let (server, _cache) = test_server("http://127.0.0.1:9");
	let response = server.post(CREATE_ACCOUNT_PATH).text("{\"name\":").await;

	response.assert_status(StatusCode::BAD_REQUEST);
	response.assert_json(&serde_json::json!({ "error": "Invalid JSON body" }));
}

#[tokio::test]
async fn create_account_relays_booking_to_crm() {
	let upstream = MockServer::start_async().await;
	let (server, cache) = test_server(&upstream.base_url());

	cache
		.set(ACCESS_TOKEN_KEY, "access-cached", Some(Duration::hours(1)))
		.await
		.expect("Seeding the access token should succeed.");

	let leads_mock = upstream
		.mock_async(|when, then| {
			when.method(POST)
				.path("/crm/v3/Leads")
				.header("authorization", "Zoho-oauthtoken access-cached");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"code\":\"SUCCESS\"}]}");
		})
		.await;
	let response = server
		.post(CREATE_ACCOUNT_PATH)
		.json(&serde_json::json!({ "name": "Jane Doe", "email": "j@x.com" }))
		.await;

	response.assert_status_ok();
	response.assert_json(&serde_json::json!({
		"success": true,
		"data": { "data": [{ "code": "SUCCESS" }] }
	}));

	leads_mock.assert_async().await;
}

#[tokio::test]
async fn crm_rejection_keeps_upstream_status() {
	let upstream = MockServer::start_async().await;
	let (server, cache) = test_server(&upstream.base_url());

	cache
		.set(ACCESS_TOKEN_KEY, "access-cached", Some(Duration::hours(1)))
		.await
		.expect("Seeding the access token should succeed.");

	let _leads_mock = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/crm/v3/Leads");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"code\":\"INVALID_DATA\"}");
		})
		.await;
	let response = server.post(CREATE_ACCOUNT_PATH).json(&serde_json::json!({})).await;

	response.assert_status(StatusCode::BAD_REQUEST);
	response.assert_json(&serde_json::json!({
		"success": false,
		"zohoError": "{\"code\":\"INVALID_DATA\"}"
	}));
}

#[tokio::test]
async fn other_methods_are_not_allowed() {
	let (server, _cache) = test_server("http://127.0.0.1:9");
	let response = server.get(CREATE_ACCOUNT_PATH).expect_failure().await;

	response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
