//! genesis - Snippet catalog client
//!
//! A command-line front for a Genesis snippet server. Every command builds a
//! fresh store, refreshes the parts of the catalog it needs over HTTP and
//! prints what the store then holds.

use genesis_client::{Config, HttpClient, Store, cli, logging};
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;

    let config = Config::load()?;
    logging::init(&config);
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    let transport = HttpClient::new(&config)?;
    let store = Store::new(Arc::new(transport));

    let args: Vec<String> = std::env::args().skip(1).collect();
    cli::execute_cli(&args, &store).await
}
