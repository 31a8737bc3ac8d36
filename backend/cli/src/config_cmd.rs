//! `hushwatch config init | show`

use std::path::Path;

use anyhow::{bail, Context, Result};
use hushwatch_config::{
    collect_referenced_vars, redact, starter_config, write_config, HushwatchConfig,
};

use crate::terminal_output::{note_success, note_warn};

pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    let config = starter_config();
    write_config(&config, path).await?;
    note_success(&format!("Wrote {}", path.display()));

    let value = serde_json::to_value(&config).context("Failed to serialize config")?;
    for var in collect_referenced_vars(&value) {
        if std::env::var(&var).map(|v| v.is_empty()).unwrap_or(true) {
            note_warn(&format!("{var} is referenced by the config but not set."));
        }
    }
    Ok(())
}

/// Effective config as YAML with secrets masked.
pub fn render(config: &HushwatchConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}

pub fn show(config: &HushwatchConfig, path: &Path) -> Result<()> {
    println!("# {}", path.display());
    print!("{}", render(config)?);
    Ok(())
}
