use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::libs::emitter::Mode;
use crate::libs::error::ConfigError;
use crate::libs::renderer::Language;

/// Everything a run needs, passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Never serialized back out; may carry credentials.
    #[serde(skip_serializing)]
    pub database_url: Option<String>,
    pub schema: String,
    pub package: String,
    pub mode: Mode,
    pub language: Language,
    pub output_dir: PathBuf,
    /// Exact table names to keep; empty keeps all.
    pub include: Vec<String>,
    /// Exact table names to drop; applied after `include`.
    pub exclude: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            schema: "public".to_string(),
            package: "models".to_string(),
            mode: Mode::default(),
            language: Language::default(),
            output_dir: PathBuf::from("./models"),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Loads a JSON config file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.package) {
            return Err(ConfigError::InvalidPackage(self.package.clone()));
        }
        Ok(())
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    pub fn wants_table(&self, table: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|t| t == table);
        included && !self.exclude.iter().any(|t| t == table)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
