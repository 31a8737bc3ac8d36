//! `hushwatch-config`: runtime configuration for the Hushwatch bot.
//!
//! Provides:
//! - Typed config schema
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and environment overrides
//! - Redaction for display
//! - Default value application and validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod overrides;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::{apply_all_defaults, starter_config};
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use overrides::{apply_env_overrides, apply_env_overrides_with};
pub use redact::redact;
pub use schema::{
    HushwatchConfig, LoggingConfig, StorageBackend, StorageConfig, TelegramConfig, TrackingConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file and run it through env substitution, environment
/// overrides, defaults and validation.
///
/// Validation warnings are logged. Any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<HushwatchConfig> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: HushwatchConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config)?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("{} config error(s) in {}", report.errors.len(), path.display());
    }

    Ok(config)
}
