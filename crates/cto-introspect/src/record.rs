//! # Declaration Records
//!
//! The loader-facing input format: one [`NamespaceRecord`] per namespace,
//! holding the ordered import list and the ordered declaration records the
//! grammar produced. Records are plain serde data and can be read from YAML
//! or JSON:
//!
//! ```yaml
//! namespace: org.acme
//! imports:
//!   - org.acme.base.Person
//! declarations:
//!   - kind: asset
//!     name: Vehicle
//!     identified_by: vin
//!     properties:
//!       - { name: vin, type: String }
//!       - { name: mileage, type: Integer, optional: true }
//!       - { name: owner, kind: relationship, type: Person }
//! ```
//!
//! Records are assumed to be syntactically valid. Structural checks happen
//! when a [`ModelFile`](crate::ModelFile) is built from them; type references
//! are checked when the model file is validated against a registry.

use std::path::Path;

use cto_core::ModelError;
use serde::{Deserialize, Serialize};

use crate::declaration::DeclarationKind;
use crate::property::PropertyKind;

/// All declarations and imports of one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceRecord {
    pub namespace: String,
    /// Fully-qualified names of types imported from other namespaces.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub declarations: Vec<DeclarationRecord>,
}

/// One declaration as written in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationRecord {
    pub kind: DeclarationKind,
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Super type, short or qualified.
    #[serde(default)]
    pub extends: Option<String>,
    /// Name of the identifying field for assets, transactions and participants.
    #[serde(default)]
    pub identified_by: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

/// One property as written in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyRecord {
    pub name: String,
    /// Defaults to `enum_value` inside enumerations and `field` elsewhere.
    #[serde(default)]
    pub kind: Option<PropertyKind>,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub validator: Option<ValidatorRecord>,
}

/// A field validator as written in the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidatorRecord {
    Range { range: RangeRecord },
    Regex { regex: String },
}

/// Inclusive numeric bounds; either may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeRecord {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

impl NamespaceRecord {
    /// Decode a record from YAML text. `source_name` labels errors.
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, ModelError> {
        serde_yaml::from_str(content).map_err(|e| ModelError::Load {
            source_name: source_name.to_string(),
            reason: format!("invalid YAML: {e}"),
        })
    }

    /// Decode a record from JSON text. `source_name` labels errors.
    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self, ModelError> {
        serde_json::from_str(content).map_err(|e| ModelError::Load {
            source_name: source_name.to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }

    /// Read a record from a file, choosing the format from the extension
    /// (`.yaml`/`.yml` for YAML, anything else as JSON).
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let source_name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Load {
            source_name: source_name.clone(),
            reason: format!("cannot read file: {e}"),
        })?;

        match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
            "yaml" | "yml" => Self::from_yaml_str(&content, &source_name),
            _ => Self::from_json_str(&content, &source_name),
        }
    }
}
