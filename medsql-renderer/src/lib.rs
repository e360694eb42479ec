//! # medsql-renderer
//!
//! Expands generated query skeletons into executable SQL. A skeleton carries
//! `<SCHEMA>`, `<TAG-TEMPLATE><ARG-DOMAIN><INDEX>`, `<ARG-DOMAIN><INDEX>` and
//! `<TAG-TEMPLATE>` placeholders; [`render_template_query`] resolves them
//! against a [`TemplateRegistry`] and an argument dictionary.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use medsql_core::{ArgumentDictionary, Config};
//! use medsql_renderer::{render_template_query, TemplateRegistry};
//!
//! fn render(skeleton: &str) -> Result<String, medsql_renderer::RenderError> {
//!     let registry = TemplateRegistry::from_config(&Config::default())?;
//!     let mut args = ArgumentDictionary::new();
//!     args.push("GENDER", "FEMALE");
//!     render_template_query(skeleton, &registry, &args)
//! }
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod lint;
pub mod registry;
pub mod scanner;

pub use catalog::{Catalog, CatalogTemplate};
pub use engine::render_template_query;
pub use error::RenderError;
pub use lint::{find_unrendered, UnrenderedToken};
pub use registry::{ArgRenderer, RegistryEntry, TemplateKind, TemplateRegistry};
pub use scanner::{find_first, scan, Grammar, Placeholder, PlaceholderMatch};
