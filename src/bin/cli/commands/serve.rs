use std::path::Path;

use anyhow::{Context, Result};

use vocabmaster_lib::config::ServerConfig;
use vocabmaster_lib::server;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = ServerConfig::load(config_path).context("Failed to load server config")?;
    server::start_server(&config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Server stopped with an error")
}
