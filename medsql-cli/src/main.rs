//! medsql: render generated SQL skeletons against an OMOP warehouse schema.
//!
//! # Usage
//!
//! ```text
//! medsql render [SKELETON] [--config PATH] [--schema NAME] [--args FILE]
//!               [--entities FILE] [--arg DOMAIN=VALUE]... [--strict]
//! medsql mask <QUESTION> --entities FILE [--json]
//! medsql templates [--config PATH] [--json]
//! medsql init [--schema NAME] [--force]
//! ```
//!
//! Rendered SQL goes to stdout; logs go to stderr (`RUST_LOG`, default `warn`).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, mask::MaskArgs, render::RenderArgs, templates::TemplatesArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "medsql",
    version,
    about = "Render placeholder query skeletons into executable clinical SQL",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Expand a query skeleton into SQL.
    Render(RenderArgs),

    /// Replace entity mentions in a question with argument placeholders.
    Mask(MaskArgs),

    /// List the registered template tags.
    Templates(TemplatesArgs),

    /// Write a default ~/.medsql/config.yaml.
    Init(InitArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => args.run(),
        Commands::Mask(args) => args.run(),
        Commands::Templates(args) => args.run(),
        Commands::Init(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
