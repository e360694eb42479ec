//! `medsql mask`: turn a question into its placeholder form.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use medsql_core::{input, mask_question, ArgumentDictionary};

/// Arguments for `medsql mask`.
#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Natural-language question.
    pub question: String,

    /// JSON or YAML file of resolved entities for the question.
    #[arg(long, value_name = "FILE")]
    pub entities: PathBuf,

    /// Emit the masked question and its argument dictionary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MaskedJson {
    question: String,
    args: ArgumentDictionary,
}

impl MaskArgs {
    pub fn run(self) -> Result<()> {
        let entities = input::load_entities(&self.entities)
            .with_context(|| format!("failed to load entities '{}'", self.entities.display()))?;
        let masked = mask_question(&self.question, &entities).context("failed to mask question")?;

        if self.json {
            let payload = MaskedJson {
                question: masked,
                args: ArgumentDictionary::from_entities(&entities),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize mask JSON")?
            );
            return Ok(());
        }
        println!("{masked}");
        Ok(())
    }
}
