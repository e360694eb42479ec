//! `medsql render`: expand a query skeleton into SQL.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use medsql_core::{input, ArgumentDictionary};
use medsql_renderer::{find_unrendered, render_template_query, TemplateRegistry};

/// Arguments for `medsql render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Query skeleton. Read from stdin when omitted.
    pub skeleton: Option<String>,

    /// Config file to use instead of ~/.medsql/config.yaml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Warehouse schema, overriding the config.
    #[arg(long, value_name = "NAME", value_parser = parse_schema)]
    pub schema: Option<String>,

    /// JSON or YAML file mapping DOMAIN to a list of values.
    #[arg(long, value_name = "FILE")]
    pub args: Option<PathBuf>,

    /// JSON or YAML file of resolved entities; their query args are appended.
    #[arg(long, value_name = "FILE")]
    pub entities: Option<PathBuf>,

    /// Append VALUE to DOMAIN. Repeatable; applied after --args and --entities.
    #[arg(long = "arg", value_name = "DOMAIN=VALUE", value_parser = parse_arg)]
    pub arg: Vec<(String, String)>,

    /// Fail if anything placeholder-shaped is left in the output.
    #[arg(long)]
    pub strict: bool,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let mut config = super::load_config(self.config.as_deref())?;
        if let Some(schema) = self.schema.clone() {
            config.schema = schema;
        }
        let registry =
            TemplateRegistry::from_config(&config).context("failed to build template registry")?;
        let args = self.arguments()?;
        let skeleton = match self.skeleton {
            Some(skeleton) => skeleton,
            None => read_stdin()?,
        };

        let sql = render_template_query(&skeleton, &registry, &args)
            .context("failed to render query")?;

        if self.strict {
            let leftovers = find_unrendered(&sql);
            if !leftovers.is_empty() {
                let tokens: Vec<&str> = leftovers.iter().map(|t| t.text.as_str()).collect();
                bail!("unrendered tokens left in query: {}", tokens.join(", "));
            }
        }
        println!("{sql}");
        Ok(())
    }

    /// `--args`, then `--entities`, then each `--arg`, appended in that order.
    fn arguments(&self) -> Result<ArgumentDictionary> {
        let mut args = ArgumentDictionary::new();
        if let Some(path) = &self.args {
            let loaded = input::load_arguments(path)
                .with_context(|| format!("failed to load arguments '{}'", path.display()))?;
            tracing::debug!(path = %path.display(), domains = loaded.iter().count(), "loaded --args");
            args.extend(loaded);
        }
        if let Some(path) = &self.entities {
            let entities = input::load_entities(path)
                .with_context(|| format!("failed to load entities '{}'", path.display()))?;
            let from_entities = ArgumentDictionary::from_entities(&entities);
            tracing::debug!(
                path = %path.display(),
                domains = from_entities.iter().count(),
                "loaded --entities"
            );
            args.extend(from_entities);
        }
        for (domain, value) in &self.arg {
            let index = args.push(domain.as_str(), value.as_str());
            tracing::debug!(domain = %domain, index, "appended --arg");
        }
        Ok(args)
    }
}

fn parse_arg(raw: &str) -> std::result::Result<(String, String), String> {
    input::parse_assignment(raw)
        .map(|(domain, value)| (domain.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected DOMAIN=VALUE, got '{raw}'"))
}

fn parse_schema(raw: &str) -> std::result::Result<String, String> {
    let schema = raw.trim();
    if schema.is_empty() {
        return Err("schema must not be empty".to_string());
    }
    Ok(schema.to_string())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read skeleton from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}
