//! Error types for medsql-renderer.

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::TemplateKind;

/// All errors that can arise from building a registry or rendering a query.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A placeholder names a domain missing from the argument dictionary.
    #[error("no arguments for domain '{domain}' (placeholder {placeholder})")]
    UnknownDomain { domain: String, placeholder: String },

    /// A placeholder index is past the end of its domain's values.
    #[error("index {index} out of range for domain '{domain}' with {len} value(s) (placeholder {placeholder})")]
    IndexOutOfRange {
        domain: String,
        index: String,
        len: usize,
        placeholder: String,
    },

    /// A placeholder tag has no entry in the registry half it needs.
    #[error("no {kind} template registered for tag '{tag}'")]
    UnknownTemplate { tag: String, kind: TemplateKind },

    /// A `with_arg` renderer failed.
    #[error("template '{tag}' failed: {source}")]
    Template {
        tag: String,
        #[source]
        source: Box<RenderError>,
    },

    /// Failure reported by a caller-supplied renderer.
    #[error("{0}")]
    Renderer(String),

    /// Expansion did not converge within the configured number of substitutions.
    #[error("gave up after {limit} substitutions; a template probably expands to itself")]
    ExpansionLimit { limit: usize },

    /// Config or catalog references a template name that was never loaded.
    #[error("template '{name}' is not in the catalog")]
    MissingTemplate { name: String },

    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}
