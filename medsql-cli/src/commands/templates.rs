//! `medsql templates`: list the registered template tags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use medsql_renderer::{RegistryEntry, TemplateKind, TemplateRegistry};

/// Arguments for `medsql templates`.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Config file to use instead of ~/.medsql/config.yaml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct TemplateTableRow {
    #[tabled(rename = "tag")]
    tag: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "placeholder")]
    placeholder: String,
    #[tabled(rename = "source")]
    source: String,
}

impl TemplatesArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config(self.config.as_deref())?;
        let registry =
            TemplateRegistry::from_config(&config).context("failed to build template registry")?;
        let entries = registry.entries();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&entries)
                    .context("failed to serialize templates JSON")?
            );
            return Ok(());
        }
        print_table(registry.schema(), entries);
        Ok(())
    }
}

fn print_table(schema: &str, entries: Vec<RegistryEntry>) {
    println!(
        "medsql v{} | schema {} | {} templates",
        env!("CARGO_PKG_VERSION"),
        schema.bold(),
        entries.len(),
    );
    if entries.is_empty() {
        println!("No templates registered.");
        return;
    }
    let rows: Vec<TemplateTableRow> = entries
        .into_iter()
        .map(|entry| TemplateTableRow {
            kind: kind_label(entry.kind),
            tag: entry.tag,
            placeholder: entry.placeholder,
            source: entry.source,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn kind_label(kind: TemplateKind) -> String {
    match kind {
        TemplateKind::WithArg => kind.to_string().cyan().to_string(),
        TemplateKind::WithNoArg => kind.to_string().magenta().to_string(),
    }
}
