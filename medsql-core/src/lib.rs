//! medsql core library: domain types, configuration, question masking, errors.
//!
//! - [`types`]: tags, domains, argument dictionaries, resolved entities
//! - [`config`]: `~/.medsql/config.yaml` load / save / init
//! - [`input`]: argument and entity files handed over by the extraction stage
//! - [`question`]: replace entity mentions with `<ARG-DOMAIN><INDEX>` placeholders
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod input;
pub mod question;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use question::{mask_question, MaskError};
pub use types::{ArgumentDictionary, Domain, EntitySet, ResolvedEntity, TemplateTag};
