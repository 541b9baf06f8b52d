//! # Engine Configuration
//!
//! Options for the model manager and the resource validator, loadable from
//! a YAML or JSON document:
//!
//! ```yaml
//! model_manager:
//!   import_validation: deferred
//! validator:
//!   run_field_validators: true
//!   max_rendered_value_len: 256
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use std::path::Path;

use cto_core::CtoError;
use cto_introspect::{ModelManager, ModelManagerOptions, ModelRegistry};
use serde::{Deserialize, Serialize};

use crate::resource_validator::ResourceValidator;

/// Options for [`ResourceValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Run range and regex validators attached to primitive fields.
    pub run_field_validators: bool,
    /// Longest rendered value in an error message; zero disables truncation.
    pub max_rendered_value_len: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            run_field_validators: true,
            max_rendered_value_len: 256,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub model_manager: ModelManagerOptions,
    pub validator: ValidatorOptions,
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, CtoError> {
        serde_yaml::from_str(content).map_err(|e| CtoError::Config {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self, CtoError> {
        serde_json::from_str(content).map_err(|e| CtoError::Config {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CtoError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let source_name = path.display().to_string();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content, &source_name),
            _ => Self::from_yaml_str(&content, &source_name),
        }
    }

    /// An empty model manager using these options.
    pub fn model_manager(&self) -> ModelManager {
        ModelManager::with_options(self.model_manager.clone())
    }

    /// A validator over `registry` using these options.
    pub fn validator<'r, R>(&self, registry: &'r R) -> ResourceValidator<'r, R>
    where
        R: ModelRegistry + ?Sized,
    {
        ResourceValidator::with_options(registry, self.validator.clone())
    }
}
