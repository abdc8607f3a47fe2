//! Settings loader for reading `FactionSettings` from a config file and the environment.
//!
//! The domain only defines WHAT settings exist; this adapter decides HOW they
//! are read, so engine components never touch files or env vars themselves.
//!
//! # Sources (later wins)
//!
//! 1. `FactionSettings::default()`
//! 2. Optional config file (`territory.toml`, `.json`, `.yaml`, ... by extension)
//! 3. Environment variables prefixed with `TERRITORY__`, e.g.
//!    `TERRITORY__POWER_PER_CLAIM=4.0` or `TERRITORY__BLOCKED_WORLDS=arena,lobby`

use std::path::Path;

use territory_domain::{DomainError, FactionSettings};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    Invalid(#[from] DomainError),
}

/// Load and validate settings from an optional file plus the environment.
pub fn load_settings(path: Option<&Path>) -> Result<FactionSettings, SettingsError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(false));
    }
    builder = builder.add_source(
        config::Environment::with_prefix("TERRITORY")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("allowed_worlds")
            .with_list_parse_key("blocked_worlds"),
    );

    let settings: FactionSettings = builder.build()?.try_deserialize()?;
    settings.validate()?;

    tracing::debug!(
        power_per_claim = settings.power_per_claim,
        max_members = settings.max_members,
        max_power = settings.max_power,
        "Faction settings loaded"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = load_settings(Some(Path::new("/nonexistent/territory.toml"))).unwrap();
        assert_eq!(settings.power_per_claim, FactionSettings::default().power_per_claim);
    }
}
