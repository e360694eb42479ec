//! SQL template catalog: tera templates for OMOP concept lookups.
//!
//! # Default mapping
//!
//! | Tag       | Half          | Template                   | Resolves                                   |
//! |-----------|---------------|----------------------------|--------------------------------------------|
//! | GENDER    | `with_arg`    | `gender.sql.tera`          | standard Gender concept id by name         |
//! | RACE      | `with_arg`    | `race.sql.tera`            | standard Race concept id by name           |
//! | ETHNICITY | `with_arg`    | `ethnicity.sql.tera`       | standard Ethnicity concept id by name      |
//! | STATEID   | `with_arg`    | `state_id.sql.tera`        | location ids in a state                    |
//! | CONDITION | `with_arg`    | `condition.sql.tera`       | ICD10CM code → standard concept + descendants |
//! | DRUG      | `with_arg`    | `drug.sql.tera`            | RxNorm code → concept + descendants        |
//! | GENDER    | `with_no_arg` | `gender_names.sql.tera`    | id/name pairs of the Gender domain         |
//! | RACE      | `with_no_arg` | `race_names.sql.tera`      | id/name pairs of the Race domain           |
//! | ETHNICITY | `with_no_arg` | `ethnicity_names.sql.tera` | id/name pairs of the Ethnicity domain      |
//! | STATENAME | `with_no_arg` | `state_name.sql.tera`      | location id / state name pairs             |
//!
//! Templates see `schema` and, for `with_arg`, `concept`. The `sql_string`
//! filter doubles single quotes for use inside a SQL string literal.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tera::{Context, Tera};

use medsql_core::TemplateTag;

use crate::error::RenderError;
use crate::registry::ArgRenderer;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("_macros.sql.tera", include_str!("templates/_macros.sql.tera")),
    ("gender.sql.tera", include_str!("templates/gender.sql.tera")),
    ("race.sql.tera", include_str!("templates/race.sql.tera")),
    ("ethnicity.sql.tera", include_str!("templates/ethnicity.sql.tera")),
    ("state_id.sql.tera", include_str!("templates/state_id.sql.tera")),
    ("condition.sql.tera", include_str!("templates/condition.sql.tera")),
    ("drug.sql.tera", include_str!("templates/drug.sql.tera")),
    ("gender_names.sql.tera", include_str!("templates/gender_names.sql.tera")),
    ("race_names.sql.tera", include_str!("templates/race_names.sql.tera")),
    (
        "ethnicity_names.sql.tera",
        include_str!("templates/ethnicity_names.sql.tera"),
    ),
    ("state_name.sql.tera", include_str!("templates/state_name.sql.tera")),
];

/// Default `with_arg` tag → template mapping.
pub const DEFAULT_WITH_ARG: &[(&str, &str)] = &[
    ("GENDER", "gender.sql.tera"),
    ("RACE", "race.sql.tera"),
    ("ETHNICITY", "ethnicity.sql.tera"),
    ("STATEID", "state_id.sql.tera"),
    ("CONDITION", "condition.sql.tera"),
    ("DRUG", "drug.sql.tera"),
];

/// Default `with_no_arg` tag → template mapping.
pub const DEFAULT_WITH_NO_ARG: &[(&str, &str)] = &[
    ("GENDER", "gender_names.sql.tera"),
    ("RACE", "race_names.sql.tera"),
    ("ETHNICITY", "ethnicity_names.sql.tera"),
    ("STATENAME", "state_name.sql.tera"),
];

/// `defaults` with every entry of `overrides` replacing or adding to it.
pub fn merged_mapping(
    defaults: &[(&str, &str)],
    overrides: &BTreeMap<TemplateTag, String>,
) -> BTreeMap<TemplateTag, String> {
    let mut mapping: BTreeMap<TemplateTag, String> = defaults
        .iter()
        .map(|(tag, name)| (TemplateTag::from(*tag), (*name).to_string()))
        .collect();
    for (tag, name) in overrides {
        mapping.insert(tag.clone(), name.clone());
    }
    mapping
}

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

/// Template names are relative paths with forward slashes, lowercased.
pub fn normalize_template_name(name: &str) -> String {
    name.replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "template directory does not exist, using embedded templates");
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(&rel.to_string_lossy());
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!(template = %name, path = %path.display(), "loaded user template");
        templates.push((name, contents));
    }
    Ok(templates)
}

fn sql_string(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(tera::Error::msg(format!(
                "filter `sql_string` expects a string, got {other}"
            )))
        }
    };
    Ok(Value::String(s.replace('\'', "''")))
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(name), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.register_filter("sql_string", sql_string);
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Loaded set of SQL templates: embedded defaults plus optional user overrides.
///
/// Cheap to clone; every [`CatalogTemplate`] shares the same compiled templates.
#[derive(Clone)]
pub struct Catalog {
    tera: Arc<Tera>,
}

impl Catalog {
    /// Embedded templates only.
    pub fn embedded() -> Result<Self, RenderError> {
        Self::load(None)
    }

    /// Embedded templates, overridden by `.tera` files found under `user_template_dir`.
    pub fn load(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(Catalog { tera: Arc::new(tera) })
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = normalize_template_name(name);
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render template `name` for `schema` (and `concept`, when given), trimmed.
    pub fn render(
        &self,
        name: &str,
        schema: &str,
        concept: Option<&str>,
    ) -> Result<String, RenderError> {
        let name = normalize_template_name(name);
        if !self.contains(&name) {
            return Err(RenderError::MissingTemplate { name });
        }
        let mut ctx = Context::new();
        ctx.insert("schema", schema);
        if let Some(concept) = concept {
            ctx.insert("concept", concept);
        }
        let rendered = self.tera.render(&name, &ctx)?;
        Ok(rendered.trim().to_string())
    }

    /// A `with_arg` renderer backed by template `name`.
    pub fn arg_template(&self, name: &str) -> Result<CatalogTemplate, RenderError> {
        let name = normalize_template_name(name);
        if !self.contains(&name) {
            return Err(RenderError::MissingTemplate { name });
        }
        Ok(CatalogTemplate {
            catalog: self.clone(),
            name,
        })
    }
}

/// A catalog template used as a `with_arg` renderer.
pub struct CatalogTemplate {
    catalog: Catalog,
    name: String,
}

impl ArgRenderer for CatalogTemplate {
    fn render(&self, schema: &str, concept: &str) -> Result<String, RenderError> {
        self.catalog.render(&self.name, schema, Some(concept))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
