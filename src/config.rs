use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, TranspileError};

pub const DEFAULT_CONFIG_FILE: &str = "solidity-to-move.config.json";
pub const DEFAULT_TARGET: &str = "sui";

/// Whether unsupported types and statements abort generation or degrade to placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Strict,
    #[default]
    Lenient,
}

impl Mode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Mode::Strict
        } else {
            Mode::Lenient
        }
    }

    pub fn is_strict(self) -> bool {
        self == Mode::Strict
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranspilerConfig {
    pub type_mappings: BTreeMap<String, String>,
    pub custom_types: BTreeMap<String, String>,
    pub library_mappings: BTreeMap<String, String>,
    pub strict_mode: bool,
    pub verbose: bool,
    pub target: Option<String>,
    pub module_name: Option<String>,
    pub package_name: Option<String>,
}

impl TranspilerConfig {
    /// Load a config file. A missing file at the default location is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(TranspileError::Config {
                    path: path.display().to_string(),
                    reason: "file not found".to_string(),
                });
            }
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|e| TranspileError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&raw).map_err(|e| TranspileError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn mode(&self) -> Mode {
        Mode::from_strict(self.strict_mode)
    }

    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or(DEFAULT_TARGET)
    }

    /// `typeMappings` and `customTypes` are the same concern; `customTypes` wins on conflicts.
    pub fn merged_custom_types(&self) -> BTreeMap<String, String> {
        let mut merged = self.type_mappings.clone();
        merged.extend(
            self.custom_types
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }
}
