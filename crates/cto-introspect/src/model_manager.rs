//! # Model Manager
//!
//! The in-memory [`ModelRegistry`]: an owning map from namespace to
//! [`ModelFile`].
//!
//! ## Import Validation
//!
//! Whether type references are checked when files are added is controlled by
//! [`ImportValidation`]:
//!
//! - `Eager` (default) validates every file of a batch once the whole batch
//!   is registered, so files importing each other can be added together. A
//!   failing batch is rolled back and the registry is left as it was.
//!   Updates and deletes revalidate every registered file, since other
//!   namespaces may import from the one that changed; a change that breaks
//!   any of them is undone.
//! - `Deferred` registers files without checking references. Unresolved
//!   imports then surface from [`ModelManager::validate_model_files`] or, as
//!   validation errors, when data is checked.
//!
//! ## Thread Safety
//!
//! `ModelManager` is `Send + Sync`. Mutation needs `&mut self`, so a registry
//! cannot change underneath a validation that borrows it.

use std::collections::BTreeMap;
use std::path::Path;

use cto_core::{CtoError, ModelError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model_file::ModelFile;
use crate::record::NamespaceRecord;
use crate::registry::ModelRegistry;

/// When type references of added model files are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportValidation {
    /// Validate each batch as it is added.
    #[default]
    Eager,
    /// Register without checking; validate on demand.
    Deferred,
}

/// Options for a [`ModelManager`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelManagerOptions {
    pub import_validation: ImportValidation,
}

/// Owns the model files of every loaded namespace.
#[derive(Debug, Default)]
pub struct ModelManager {
    model_files: BTreeMap<String, ModelFile>,
    options: ModelManagerOptions,
}

impl ModelManager {
    /// An empty registry with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry with the given options.
    pub fn with_options(options: ModelManagerOptions) -> Self {
        Self {
            model_files: BTreeMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &ModelManagerOptions {
        &self.options
    }

    /// Register a single model file. See [`ModelManager::add_model_files`].
    pub fn add_model_file(&mut self, model_file: ModelFile) -> Result<(), ModelError> {
        self.add_model_files([model_file]).map(|_| ())
    }

    /// Register a batch of model files and return their namespaces.
    ///
    /// # Errors
    ///
    /// - `DuplicateNamespace` if a namespace is already registered or repeats
    ///   within the batch. Nothing is registered.
    /// - With eager validation, the first error raised while validating the
    ///   batch. The whole batch is removed again.
    pub fn add_model_files<I>(&mut self, model_files: I) -> Result<Vec<String>, ModelError>
    where
        I: IntoIterator<Item = ModelFile>,
    {
        let batch: Vec<ModelFile> = model_files.into_iter().collect();
        let mut added: Vec<String> = Vec::with_capacity(batch.len());
        for mf in &batch {
            let ns = mf.namespace();
            if self.model_files.contains_key(ns) || added.iter().any(|a| a == ns) {
                return Err(ModelError::DuplicateNamespace {
                    namespace: ns.to_string(),
                });
            }
            added.push(ns.to_string());
        }

        for mf in batch {
            debug!(namespace = mf.namespace(), declarations = mf.all_declarations().len(), "adding model file");
            self.model_files.insert(mf.namespace().to_string(), mf);
        }

        if self.options.import_validation == ImportValidation::Eager {
            if let Err(e) = self.validate_namespaces(&added) {
                warn!(namespaces = ?added, error = %e, "model file batch rejected");
                for ns in &added {
                    self.model_files.remove(ns);
                }
                return Err(e);
            }
        }
        Ok(added)
    }

    /// Replace the model file of an already registered namespace and return
    /// the previous one.
    ///
    /// # Errors
    ///
    /// - `NamespaceNotFound` if the namespace is not registered.
    /// - With eager validation, the first error raised while revalidating
    ///   the registry: the new file itself, or another namespace that imports
    ///   a type the new file no longer declares. The previous file is
    ///   restored.
    pub fn update_model_file(&mut self, model_file: ModelFile) -> Result<ModelFile, ModelError> {
        let ns = model_file.namespace().to_string();
        let Some(previous) = self.model_files.insert(ns.clone(), model_file) else {
            self.model_files.remove(&ns);
            return Err(ModelError::NamespaceNotFound { namespace: ns });
        };
        debug!(namespace = %ns, "replaced model file");

        if self.options.import_validation == ImportValidation::Eager {
            if let Err(e) = self.validate_changed(&ns) {
                warn!(namespace = %ns, error = %e, "model file update rejected");
                self.model_files.insert(ns, previous);
                return Err(e);
            }
        }
        Ok(previous)
    }

    /// Remove and return the model file of `namespace`.
    ///
    /// # Errors
    ///
    /// - `NamespaceNotFound` if the namespace is not registered.
    /// - With eager validation, the first error raised by a remaining
    ///   namespace that depended on the removed one. Nothing is removed.
    pub fn delete_model_file(&mut self, namespace: &str) -> Result<ModelFile, ModelError> {
        let removed = self
            .model_files
            .remove(namespace)
            .ok_or_else(|| ModelError::NamespaceNotFound {
                namespace: namespace.to_string(),
            })?;

        if self.options.import_validation == ImportValidation::Eager {
            if let Err(e) = self.validate_model_files() {
                warn!(namespace, error = %e, "model file delete rejected");
                self.model_files.insert(namespace.to_string(), removed);
                return Err(e);
            }
        }
        debug!(namespace, "deleted model file");
        Ok(removed)
    }

    /// Remove every model file.
    pub fn clear(&mut self) {
        self.model_files.clear();
    }

    /// Load every `*.yaml`, `*.yml` and `*.json` namespace record in `dir`
    /// as one batch, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns `CtoError::Io` if the directory cannot be read and
    /// `CtoError::Model` for decode, build or validation failures.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<Vec<String>, CtoError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_record = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e, "yaml" | "yml" | "json"));
            if path.is_file() && is_record {
                paths.push(path);
            }
        }
        paths.sort();

        let mut batch = Vec::with_capacity(paths.len());
        for path in &paths {
            let record = NamespaceRecord::from_path(path)?;
            batch.push(ModelFile::from_record(record)?);
        }
        debug!(dir = %dir.display(), files = batch.len(), "loading model directory");
        Ok(self.add_model_files(batch)?)
    }

    /// Validate every registered model file, in namespace order.
    pub fn validate_model_files(&self) -> Result<(), ModelError> {
        for mf in self.model_files.values() {
            mf.validate(self)?;
        }
        Ok(())
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        self.model_files.keys().map(String::as_str).collect()
    }

    /// Registered model files, in namespace order.
    pub fn model_files(&self) -> impl Iterator<Item = &ModelFile> {
        self.model_files.values()
    }

    pub fn len(&self) -> usize {
        self.model_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model_files.is_empty()
    }

    /// Validate `changed` first so its own errors take precedence, then every
    /// other namespace.
    fn validate_changed(&self, changed: &str) -> Result<(), ModelError> {
        if let Some(mf) = self.model_files.get(changed) {
            mf.validate(self)?;
        }
        self.model_files
            .values()
            .filter(|mf| mf.namespace() != changed)
            .try_for_each(|mf| mf.validate(self))
    }

    fn validate_namespaces(&self, namespaces: &[String]) -> Result<(), ModelError> {
        for ns in namespaces {
            if let Some(mf) = self.model_files.get(ns) {
                mf.validate(self)?;
            }
        }
        Ok(())
    }
}

impl ModelRegistry for ModelManager {
    fn model_file(&self, namespace: &str) -> Option<&ModelFile> {
        self.model_files.get(namespace)
    }
}
