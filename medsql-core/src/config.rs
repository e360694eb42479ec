//! YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.medsql/
//!   config.yaml   (mode 0600, created by `medsql init`)
//! ```
//!
//! # API pattern
//!
//! Every function touching the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::TemplateTag;

/// Warehouse schema used when no config file exists.
pub const DEFAULT_SCHEMA: &str = "cmsdesynpuf23m";

/// Contents of `config.yaml`.
///
/// `with_arg` / `with_no_arg` map a tag to a template name and are merged over
/// the built-in catalog mapping; an empty map keeps the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub schema: String,
    /// Directory of `.tera` files overriding or extending the embedded catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    /// Cap on substitutions per render call; unset means no cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expansions: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub with_arg: BTreeMap<TemplateTag, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub with_no_arg: BTreeMap<TemplateTag, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema: DEFAULT_SCHEMA.to_string(),
            template_dir: None,
            max_expansions: None,
            with_arg: BTreeMap::new(),
            with_no_arg: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Config with every default except the schema name.
    pub fn with_schema(schema: impl Into<String>) -> Self {
        Config {
            schema: schema.into(),
            ..Config::default()
        }
    }

    fn validate(self, path: &Path) -> Result<Self, ConfigError> {
        if self.schema.trim().is_empty() {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: "schema must not be empty".to_string(),
            });
        }
        if self.max_expansions == Some(0) {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: "max_expansions must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.medsql/`: pure, no I/O.
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(".medsql")
}

/// `<home>/.medsql/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a config from an explicit file path.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
/// A relative `template_dir` is resolved against the config file's directory.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    if let (Some(dir), Some(parent)) = (config.template_dir.as_ref(), path.parent()) {
        if dir.is_relative() {
            config.template_dir = Some(parent.join(dir));
        }
    }
    config.validate(path)
}

/// Load `<home>/.medsql/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Load `<home>/.medsql/config.yaml`, falling back to [`Config::default`] when
/// the file does not exist. Malformed files are still an error.
pub fn load_or_default_at(home: &Path) -> Result<Config, ConfigError> {
    match load_at(home) {
        Err(ConfigError::ConfigNotFound { path }) => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}

/// `load_or_default_at` convenience wrapper.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_default_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<home>/.medsql/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = config_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(&path, e));
    }
    tracing::info!(path = %path.display(), "wrote config");
    Ok(path)
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Outcome of [`init_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(PathBuf),
    /// File already present and `force` was not set; it was left untouched.
    Existing(PathBuf),
}

/// Write a default config (optionally with `schema`) to `<home>/.medsql/config.yaml`.
///
/// Idempotent: an existing file is loaded and returned unchanged unless `force`.
pub fn init_at(
    home: &Path,
    schema: Option<String>,
    force: bool,
) -> Result<(Config, InitOutcome), ConfigError> {
    let path = config_path_at(home);
    if path.exists() && !force {
        let config = load_from(&path)?;
        return Ok((config, InitOutcome::Existing(path)));
    }
    let config = schema.map(Config::with_schema).unwrap_or_default();
    let path = save_at(home, &config)?;
    Ok((config, InitOutcome::Created(path)))
}

/// `init_at` convenience wrapper.
pub fn init(schema: Option<String>, force: bool) -> Result<(Config, InitOutcome), ConfigError> {
    init_at(&home()?, schema, force)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Home directory used by every no-arg wrapper.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    #[test]
    fn config_path_is_correct() {
        let home = make_home();
        let path = config_path_at(home.path());
        assert!(path.ends_with(".medsql/config.yaml"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let home = make_home();
        let mut config = Config::with_schema("cdm");
        config
            .with_arg
            .insert(TemplateTag::from("DRUG"), "drug_by_name.sql.tera".to_string());
        save_at(home.path(), &config).expect("save");
        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        save_at(home.path(), &Config::default()).expect("save");
        let tmp = config_path_at(home.path()).with_file_name("config.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn config_dir_created_with_perms() {
        let home = make_home();
        save_at(home.path(), &Config::default()).expect("save");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let dir = config_dir_at(home.path());
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700);
            let file = config_path_at(home.path());
            let mode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn load_missing_returns_not_found() {
        let home = make_home();
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }

    #[test]
    fn load_or_default_without_file() {
        let home = make_home();
        let config = load_or_default_at(home.path()).expect("defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.schema, DEFAULT_SCHEMA);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("schema: synpuf\n").expect("parse");
        assert_eq!(config.max_expansions, None);
        assert!(config.with_arg.is_empty());
        assert!(config.template_dir.is_none());
    }

    #[test]
    fn init_is_idempotent_unless_forced() {
        let home = make_home();
        let (first, outcome) = init_at(home.path(), Some("one".into()), false).expect("init");
        assert!(matches!(outcome, InitOutcome::Created(_)));
        assert_eq!(first.schema, "one");

        let (second, outcome) = init_at(home.path(), Some("two".into()), false).expect("init");
        assert!(matches!(outcome, InitOutcome::Existing(_)));
        assert_eq!(second.schema, "one");

        let (third, outcome) = init_at(home.path(), Some("two".into()), true).expect("init");
        assert!(matches!(outcome, InitOutcome::Created(_)));
        assert_eq!(third.schema, "two");
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}
