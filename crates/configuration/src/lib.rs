use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{DatabaseSettings, ExportFormat, ServerSettings, Settings};

/// Prefix for environment overrides, e.g. `VARANT__DATABASE__CATALOG_URL`.
const ENV_PREFIX: &str = "VARANT";

/// Loads the application settings from `config.toml` (optional) and the environment.
///
/// This function is the primary entry point for this crate. A `.env` file, if
/// present, is loaded first so its variables take part in the environment layer.
pub fn load_settings() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    load_settings_from(Path::new("config.toml"))
}

/// Loads settings with an explicit config file path. Missing files are skipped.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("database.connect_timeout_secs", 5)?
        .set_default("server.bind_addr", "0.0.0.0:5001")?
        .set_default("server.max_upload_bytes", 50 * 1024 * 1024)?
        .set_default("fetch_timeout_secs", 30)?
        .set_default("reference_utc_offset", "+03:00")?
        .set_default("ranking_size", 10)?
        .set_default("export_format", "csv")?
        .set_default("log_level", "info")?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
