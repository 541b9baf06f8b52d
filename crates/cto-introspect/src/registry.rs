//! # Model Registry
//!
//! The registry aggregates one [`ModelFile`] per namespace and is the single
//! source of truth for "does type X exist". Model files never hold pointers
//! to each other: an import is a fully-qualified name, and crossing a
//! namespace boundary always goes back through the registry by key. Import
//! graphs may therefore be cyclic without creating ownership cycles.
//!
//! The trait is the seam between resolution and storage. [`ModelManager`]
//! is the in-memory implementation; tests and embedders can provide their own.
//!
//! [`ModelManager`]: crate::ModelManager

use cto_core::{names, ModelError, PrimitiveType};

use crate::declaration::Declaration;
use crate::model_file::ModelFile;

/// The result of resolving a type name: a primitive or a declaration.
#[derive(Debug, Clone, Copy)]
pub enum TypeRef<'a> {
    Primitive(PrimitiveType),
    Declared(&'a Declaration),
}

impl<'a> TypeRef<'a> {
    pub fn as_declaration(&self) -> Option<&'a Declaration> {
        match self {
            TypeRef::Declared(decl) => Some(decl),
            TypeRef::Primitive(_) => None,
        }
    }

    /// The fully-qualified name, or the bare name for a primitive.
    pub fn fully_qualified_name(&self) -> String {
        match self {
            TypeRef::Primitive(p) => p.as_str().to_string(),
            TypeRef::Declared(decl) => decl.fully_qualified_name(),
        }
    }
}

/// Lookup of model files by namespace.
pub trait ModelRegistry {
    /// The model file registered for `namespace`, if any.
    fn model_file(&self, namespace: &str) -> Option<&ModelFile>;

    /// Check that a fully-qualified type name refers to an existing type.
    ///
    /// Primitives always pass. Otherwise the namespace of `type_name` must be
    /// registered and must declare it locally.
    ///
    /// # Errors
    ///
    /// Returns `UndeclaredType` naming `type_name` and `context`.
    fn resolve_type(&self, context: &str, type_name: &str) -> Result<(), ModelError> {
        if names::is_primitive_type(type_name) {
            return Ok(());
        }
        let declared = self
            .model_file(names::namespace_of(type_name))
            .is_some_and(|mf| mf.is_local_type(type_name));
        if declared {
            Ok(())
        } else {
            Err(ModelError::UndeclaredType {
                type_name: type_name.to_string(),
                context: context.to_string(),
            })
        }
    }

    /// The declaration with fully-qualified name `type_name`, if registered.
    fn get_type(&self, type_name: &str) -> Option<&Declaration> {
        self.model_file(names::namespace_of(type_name))?
            .get_local_type(type_name)
    }
}
