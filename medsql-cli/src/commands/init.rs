//! `medsql init [--schema NAME] [--force]`

use anyhow::{Context, Result};
use clap::Args;

use medsql_core::config::{self, InitOutcome};

/// Write a default config to ~/.medsql/config.yaml.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Warehouse schema to record (default: cmsdesynpuf23m).
    #[arg(long, value_name = "NAME")]
    pub schema: Option<String>,

    /// Overwrite an existing config.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let (config, outcome) = config::init_at(&home, self.schema, self.force)
            .context("failed to initialize ~/.medsql/config.yaml")?;

        match outcome {
            InitOutcome::Created(path) => {
                println!("✓ Wrote config for schema '{}'", config.schema);
                println!("  Saved to: {}", path.display());
            }
            InitOutcome::Existing(path) => {
                println!(
                    "Config already exists at {} (schema '{}'); use --force to overwrite",
                    path.display(),
                    config.schema
                );
            }
        }
        Ok(())
    }
}
