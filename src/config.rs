//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/taxotree/taxotree.toml`
//! 3. Local config: `<dir>/.taxotree.toml` (usually the working directory)
//! 4. Environment variables: `TAXOTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::TaxId;

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    /// Leaf attributes embedded in persisted Newick, in output order
    pub attributes: Vec<String>,
    /// Default output file for `export`
    pub output: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            attributes: vec!["taxid".into(), "score".into()],
            output: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawExportConfig {
    pub attributes: Option<Vec<String>>,
    pub output: Option<PathBuf>,
}

/// Raw settings for intermediate parsing (`None` → inherit from lower layer).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub taxdump_dir: Option<PathBuf>,
    pub root_id: Option<TaxId>,
    pub indent: Option<usize>,
    #[serde(default)]
    pub export: RawExportConfig,
}

/// Unified configuration for taxotree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `nodes.dmp` and `names.dmp` (default: ~/.taxotree/taxdump)
    pub taxdump_dir: PathBuf,
    /// Identifier of the taxonomy root every lineage starts with
    pub root_id: TaxId,
    /// Spaces per depth level in text listings
    pub indent: usize,
    pub export: ExportConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            taxdump_dir: default_taxdump_dir(),
            root_id: TaxId::ROOT,
            indent: 2,
            export: ExportConfig::default(),
        }
    }
}

/// Get the default taxdump directory (~/.taxotree/taxdump).
fn default_taxdump_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".taxotree").join("taxdump"))
        .unwrap_or_else(|| PathBuf::from("~/.taxotree/taxdump"))
}

/// Get the XDG config directory for taxotree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taxotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("taxotree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".taxotree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path, leaving it untouched on failure.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins for every field it specifies; arrays are replaced, not merged.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            taxdump_dir: overlay
                .taxdump_dir
                .clone()
                .unwrap_or_else(|| self.taxdump_dir.clone()),
            root_id: overlay.root_id.unwrap_or(self.root_id),
            indent: overlay.indent.unwrap_or(self.indent),
            export: ExportConfig {
                attributes: overlay
                    .export
                    .attributes
                    .clone()
                    .unwrap_or_else(|| self.export.attributes.clone()),
                output: overlay
                    .export
                    .output
                    .clone()
                    .or_else(|| self.export.output.clone()),
            },
        }
    }

    fn expand_paths(&mut self) {
        self.taxdump_dir = expand_path(&self.taxdump_dir);
        self.export.output = self.export.output.as_deref().map(expand_path);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.taxotree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TAXOTREE_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`, e.g. `TAXOTREE_EXPORT__ATTRIBUTES=taxid,score`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TAXOTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("export.attributes")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("taxdump_dir") {
            settings.taxdump_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("root_id") {
            settings.root_id = TaxId(u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("TAXOTREE_ROOT_ID must not be negative: {}", val),
            })?);
        }
        if let Ok(val) = config.get_int("indent") {
            settings.indent = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("TAXOTREE_INDENT must not be negative: {}", val),
            })?;
        }
        if let Ok(val) = config.get::<Vec<String>>("export.attributes") {
            settings.export.attributes = val;
        }
        if let Ok(val) = config.get_string("export.output") {
            settings.export.output = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// TOML template with the compiled defaults.
    pub fn template() -> Result<String, ApplicationError> {
        toml::to_string_pretty(&Settings::default()).map_err(|e| ApplicationError::Config {
            message: format!("serialize defaults: {}", e),
        })
    }
}
