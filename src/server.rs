//! HTTP surface: the booking endpoint plus a liveness probe.

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::State,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use tokio::net::TcpListener;
// self
use crate::{_prelude::*, config::RelayConfig, error::ConfigError, relay::LeadRelay};

/// Path the website posts booking forms to.
pub const CREATE_ACCOUNT_PATH: &str = "/api/createAccount";
/// Liveness probe path.
pub const HEALTH_PATH: &str = "/health";

/// Builds the axum `Router` serving the relay.
pub fn build_router(relay: Arc<LeadRelay>) -> Router {
	Router::new()
		.route(CREATE_ACCOUNT_PATH, post(create_account))
		.route(HEALTH_PATH, get(health))
		.with_state(relay)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: RelayConfig) -> Result<()> {
	let addr = config.bind_addr();

	tracing::info!(?config, "Starting lead relay.");

	let relay = Arc::new(LeadRelay::from_config(config)?);
	let listener = TcpListener::bind(&addr).await.map_err(ConfigError::from)?;

	tracing::info!(%addr, "Lead relay listening.");

	axum::serve(listener, build_router(relay))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(ConfigError::from)?;

	tracing::info!("Lead relay stopped.");

	Ok(())
}

// The raw body is taken as bytes so malformed JSON gets the relay's own 400 shape rather than
// axum's extractor rejection.
async fn create_account(State(relay): State<Arc<LeadRelay>>, body: Bytes) -> Response {
	let reply = relay.handle(&body).await;

	(reply.status, Json(reply.body)).into_response()
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for shutdown signal.");
		std::future::pending::<()>().await;
	}
}
