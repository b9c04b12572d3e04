mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::utils::{Error, Result};

pub use settings::PartialSettings;
pub use settings::{
    DomainSettings, EmitterSettings, LoggingSettings, PublisherSettings, Settings,
    TransportSettings,
};

/// Prefix of environment overrides, e.g. `HELLO__EMITTER__PERIOD_MS=250`.
pub const ENV_PREFIX: &str = "HELLO";

/// Loads the configuration from the default file and environment variables
/// and merges it over `Settings::default()`.
pub fn load_config() -> Result<Settings> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit file stem. The file is optional.
pub fn load_config_from(path: &str) -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    let settings = partial.merge(Settings::default());
    if settings.emitter.period_ms == 0 {
        return Err(Error::Config(ConfigError::Message(
            "emitter.period_ms must be greater than zero".to_string(),
        )));
    }
    Ok(settings)
}

#[cfg(test)]
mod tests;
