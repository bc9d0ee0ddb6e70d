use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{Config, LoggingSettings, RetentionSettings, RevenueSettings};

/// Prefix for environment overrides, e.g. `FURFOLIO__REVENUE__MONTHLY_GOAL=8000`.
const ENV_PREFIX: &str = "FURFOLIO";

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional; environment variables and defaults fill any gaps.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the application configuration from an explicit file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    build(config::File::from(path).required(true))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("revenue.excluded_categories")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Deserializes into our strongly-typed `Config` and validates it.
fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    let config = builder.try_deserialize::<Config>()?;
    config.validate().map_err(ConfigError::ValidationError)?;
    Ok(config)
}
