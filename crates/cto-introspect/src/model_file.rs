//! # Model Files: Namespace Resolution
//!
//! A [`ModelFile`] owns the declarations of one namespace and its import list,
//! and answers "which declaration does this type name refer to".
//!
//! ## Resolution Order
//!
//! 1. Primitive names resolve to themselves with no lookup.
//! 2. Local declarations resolve without touching the registry.
//! 3. Imported names go through the registry to the target namespace.
//!
//! Imports are one hop: an import names a type in its own namespace, and is
//! never followed through that namespace's imports.
//!
//! ## Failure Semantics
//!
//! [`ModelFile::resolve_type`] is used while validating the schema and fails
//! with `UndeclaredType`. [`ModelFile::get_type`] and
//! [`ModelFile::get_fully_qualified_type_name`] are non-failing probes that
//! return `None` for anything that does not resolve.

use std::collections::HashSet;

use cto_core::{names, ModelError, PrimitiveType};
use tracing::trace;

use crate::declaration::{Declaration, DeclarationKind};
use crate::record::NamespaceRecord;
use crate::registry::{ModelRegistry, TypeRef};

/// The declarations and imports of a single namespace.
#[derive(Debug, Clone)]
pub struct ModelFile {
    namespace: String,
    imports: Vec<String>,
    declarations: Vec<Declaration>,
}

impl ModelFile {
    /// Build a model file from a namespace record.
    ///
    /// # Errors
    ///
    /// - `Load` if the namespace is empty or an import is not qualified.
    /// - `DuplicateDeclaration` if two declarations share a name.
    /// - Any structural error raised while building a declaration.
    pub fn from_record(record: NamespaceRecord) -> Result<Self, ModelError> {
        let NamespaceRecord {
            namespace,
            imports,
            declarations: records,
        } = record;

        if namespace.is_empty() {
            return Err(ModelError::Load {
                source_name: "<namespace record>".to_string(),
                reason: "namespace must not be empty".to_string(),
            });
        }
        if let Some(bad) = imports.iter().find(|i| !names::is_qualified(i)) {
            return Err(ModelError::Load {
                source_name: namespace.clone(),
                reason: format!("import '{bad}' is not a fully qualified name"),
            });
        }

        let mut seen = HashSet::new();
        let mut declarations = Vec::with_capacity(records.len());
        for decl in records {
            if !seen.insert(decl.name.clone()) {
                return Err(ModelError::DuplicateDeclaration {
                    namespace,
                    name: decl.name,
                });
            }
            declarations.push(Declaration::from_record(&namespace, decl)?);
        }

        Ok(Self {
            namespace,
            imports,
            declarations,
        })
    }

    /// Decode and build a model file from YAML text.
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, ModelError> {
        Self::from_record(NamespaceRecord::from_yaml_str(content, source_name)?)
    }

    /// Decode and build a model file from JSON text.
    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self, ModelError> {
        Self::from_record(NamespaceRecord::from_json_str(content, source_name)?)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully-qualified names of the imported types, in authoring order.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn all_declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Declarations of one kind, in authoring order.
    pub fn declarations_of(&self, kind: DeclarationKind) -> Vec<&Declaration> {
        self.declarations.iter().filter(|d| d.kind() == kind).collect()
    }

    pub fn asset_declarations(&self) -> Vec<&Declaration> {
        self.declarations_of(DeclarationKind::Asset)
    }

    pub fn transaction_declarations(&self) -> Vec<&Declaration> {
        self.declarations_of(DeclarationKind::Transaction)
    }

    pub fn participant_declarations(&self) -> Vec<&Declaration> {
        self.declarations_of(DeclarationKind::Participant)
    }

    pub fn concept_declarations(&self) -> Vec<&Declaration> {
        self.declarations_of(DeclarationKind::Concept)
    }

    pub fn enum_declarations(&self) -> Vec<&Declaration> {
        self.declarations_of(DeclarationKind::Enum)
    }

    /// The local asset called `name`, if there is one.
    pub fn asset_declaration(&self, name: &str) -> Option<&Declaration> {
        self.local_of_kind(name, DeclarationKind::Asset)
    }

    /// The local transaction called `name`, if there is one.
    pub fn transaction_declaration(&self, name: &str) -> Option<&Declaration> {
        self.local_of_kind(name, DeclarationKind::Transaction)
    }

    /// The local participant called `name`, if there is one.
    pub fn participant_declaration(&self, name: &str) -> Option<&Declaration> {
        self.local_of_kind(name, DeclarationKind::Participant)
    }

    fn local_of_kind(&self, name: &str, kind: DeclarationKind) -> Option<&Declaration> {
        self.get_local_type(name).filter(|d| d.kind() == kind)
    }

    /// True for the built-in scalar type names.
    pub fn is_primitive(name: &str) -> bool {
        names::is_primitive_type(name)
    }

    /// True if this namespace declares `name` (short or qualified).
    pub fn is_local_type(&self, name: &str) -> bool {
        self.get_local_type(name).is_some()
    }

    /// True if some import has `name` as its short name.
    pub fn is_imported_type(&self, name: &str) -> bool {
        self.imports.iter().any(|i| names::short_name(i) == name)
    }

    /// True if `name` is primitive or declared locally.
    pub fn is_defined(&self, name: &str) -> bool {
        Self::is_primitive(name) || self.is_local_type(name)
    }

    /// The fully-qualified import whose short name is `name`.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedImport` carrying this namespace and its full import list.
    pub fn resolve_import(&self, name: &str) -> Result<&str, ModelError> {
        self.imports
            .iter()
            .find(|i| names::short_name(i) == name)
            .map(String::as_str)
            .ok_or_else(|| ModelError::UnresolvedImport {
                type_name: name.to_string(),
                namespace: self.namespace.clone(),
                imports: self.imports.clone(),
            })
    }

    /// Check a type reference written in this namespace.
    ///
    /// Primitive and local names pass. An imported name passes if the
    /// registry confirms the target namespace declares it.
    ///
    /// # Errors
    ///
    /// Returns `UndeclaredType` naming `name` and `context` when the name is
    /// neither primitive, local nor imported, or when the import target does
    /// not exist.
    pub fn resolve_type<R>(&self, registry: &R, context: &str, name: &str) -> Result<(), ModelError>
    where
        R: ModelRegistry + ?Sized,
    {
        if Self::is_primitive(name) || self.is_local_type(name) {
            return Ok(());
        }
        if self.is_imported_type(name) {
            let fqn = self.resolve_import(name)?;
            return registry.resolve_type(context, fqn);
        }
        Err(ModelError::UndeclaredType {
            type_name: name.to_string(),
            context: context.to_string(),
        })
    }

    /// Resolve `name` to a primitive or a declaration without failing.
    ///
    /// Returns `None` for unknown names and for imports whose target
    /// namespace is not registered.
    pub fn get_type<'a, R>(&'a self, registry: &'a R, name: &str) -> Option<TypeRef<'a>>
    where
        R: ModelRegistry + ?Sized,
    {
        if let Some(p) = PrimitiveType::from_name(name) {
            return Some(TypeRef::Primitive(p));
        }
        if let Some(local) = self.get_local_type(name) {
            return Some(TypeRef::Declared(local));
        }
        let fqn = self.imported_name(name)?;
        trace!(namespace = %self.namespace, name, target = fqn, "resolving imported type");
        registry
            .model_file(names::namespace_of(fqn))?
            .get_local_type(fqn)
            .map(TypeRef::Declared)
    }

    /// The canonical name `name` refers to, or `None` if it does not resolve.
    /// Primitives are returned unchanged.
    pub fn get_fully_qualified_type_name<R>(&self, registry: &R, name: &str) -> Option<String>
    where
        R: ModelRegistry + ?Sized,
    {
        self.get_type(registry, name).map(|t| t.fully_qualified_name())
    }

    /// The local declaration called `name`.
    ///
    /// An unqualified name is qualified with this namespace first; the match
    /// is on exact fully-qualified equality.
    pub fn get_local_type(&self, name: &str) -> Option<&Declaration> {
        let (namespace, short) = if names::is_qualified(name) {
            (names::namespace_of(name), names::short_name(name))
        } else {
            (self.namespace.as_str(), name)
        };
        if namespace != self.namespace {
            return None;
        }
        self.declarations.iter().find(|d| d.name() == short)
    }

    /// Validate every declaration of this namespace against `registry`.
    pub fn validate<R>(&self, registry: &R) -> Result<(), ModelError>
    where
        R: ModelRegistry + ?Sized,
    {
        for declaration in &self.declarations {
            declaration.validate(self, registry)?;
        }
        Ok(())
    }

    fn imported_name(&self, name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|i| names::short_name(i) == name)
            .map(String::as_str)
    }
}
