pub mod init;
pub mod mask;
pub mod render;
pub mod templates;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use medsql_core::{config, Config};

/// `--config PATH` when given, otherwise `~/.medsql/config.yaml` or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("failed to load config '{}'", path.display())),
        None => {
            let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
            config::load_or_default_at(&home).context("failed to load ~/.medsql/config.yaml")
        }
    }
}
