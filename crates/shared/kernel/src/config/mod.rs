use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;
use wine_domain::error::format_context;

/// Environment prefix for configuration overrides (`WINE__SERVER__PORT`).
pub const ENV_PREFIX: &str = "WINE";

/// Custom error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

trait ConfigResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, ConfigError>;
}

impl<T> ConfigResultExt<T> for Result<T, config::ConfigError> {
    fn context(self, context: &'static str) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Config { source, context: Some(context.into()) })
    }
}

/// Loads configuration from a file layered with environment overrides.
///
/// 1. **Base File**: settings from `path` (any format the `config` crate detects by
///    extension). Defaults to `server` in the working directory.
/// 2. **Environment Overrides**: variables prefixed with `WINE__`; nesting uses double
///    underscores (`WINE__SERVER__PORT` maps to `server.port`).
///
/// # Errors
/// * The file cannot be found.
/// * The merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use wine_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_with_environment(path, environment())
}

/// Values stay strings; typed fields parse them on deserialization so that version
/// strings such as `1.10` survive intact.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__")
}

fn load_with_environment<T>(
    path: Option<impl AsRef<Path>>,
    environment: Environment,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(environment);

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
