use anyhow::Context;
use tracing::info;
use wine_kernel::config::load_config;
use wine_kernel::prelude::ApiConfig;
use wine_logger::{LevelFilter, Logger};
use wine_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "server".to_owned());
    let cfg: ApiConfig =
        load_config(Some(&path)).context("Critical: Configuration is malformed")?;

    // Logging settings live in the config, so the subscriber is installed after loading it.
    let _log = init_logger(&cfg)?;
    info!(path = %path, "Configuration loaded");

    Server::builder().config(cfg).build()?.run().await
}

fn init_logger(cfg: &ApiConfig) -> anyhow::Result<Logger> {
    let logging = &cfg.logging;
    let level = logging
        .level
        .parse::<LevelFilter>()
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;

    let mut builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level);
    if let Some(filter) = &logging.env_filter {
        builder = builder.env_filter(filter);
    }
    if let Some(directory) = &logging.directory {
        builder = builder.file(directory).max_files(logging.max_files).json(logging.json);
    }

    Ok(builder.init()?)
}
