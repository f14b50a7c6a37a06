//! Lead relay server entry point.

// crates.io
use clap::Parser;
use color_eyre::Result;
// self
use lead_relay::{config::RelayConfig, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = RelayConfig::parse();

	obs::init_tracing(config.log_format);
	server::serve(config).await?;

	Ok(())
}
