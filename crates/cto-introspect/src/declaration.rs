//! # Declarations
//!
//! A declaration is a named type scoped to one namespace: an asset,
//! transaction, participant, concept or enumeration. It owns its properties
//! in authoring order and refers to its super type by the name written in the
//! model; the super type is resolved lazily through the registry.

use std::collections::HashSet;
use std::fmt;

use cto_core::{names, ModelError, PrimitiveType};
use serde::{Deserialize, Serialize};

use crate::hierarchy;
use crate::model_file::ModelFile;
use crate::property::{Property, PropertyKind};
use crate::record::DeclarationRecord;
use crate::registry::{ModelRegistry, TypeRef};

/// The closed set of declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Asset,
    Transaction,
    Participant,
    Concept,
    Enum,
}

impl DeclarationKind {
    /// Assets, transactions and participants are identified by a field and
    /// can be the target of a relationship.
    pub fn is_identifiable(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Asset | DeclarationKind::Transaction | DeclarationKind::Participant
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Asset => "asset",
            DeclarationKind::Transaction => "transaction",
            DeclarationKind::Participant => "participant",
            DeclarationKind::Concept => "concept",
            DeclarationKind::Enum => "enum",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named type in a namespace.
#[derive(Debug, Clone)]
pub struct Declaration {
    name: String,
    namespace: String,
    kind: DeclarationKind,
    is_abstract: bool,
    super_type: Option<String>,
    id_field: Option<String>,
    properties: Vec<Property>,
}

impl Declaration {
    /// Build a declaration of `namespace` from its record.
    ///
    /// Checks what can be checked without a registry: property names are
    /// unique, property kinds fit the declaration kind, enumerations are not
    /// abstract and do not extend anything, and only identifiable kinds name an
    /// identifying field.
    pub(crate) fn from_record(namespace: &str, record: DeclarationRecord) -> Result<Self, ModelError> {
        let fqn = names::qualify(namespace, &record.name);

        if record.kind == DeclarationKind::Enum && (record.is_abstract || record.extends.is_some()) {
            return Err(ModelError::InvalidSuperType {
                declaration: fqn,
                super_type: record.extends.unwrap_or_default(),
                reason: "enumerations cannot be abstract or extend another type".to_string(),
            });
        }

        if let Some(field) = &record.identified_by {
            if !record.kind.is_identifiable() {
                return Err(ModelError::InvalidIdentifier {
                    declaration: fqn,
                    field: field.clone(),
                    reason: format!("a {} cannot be identified by a field", record.kind),
                });
            }
        }

        let mut seen = HashSet::new();
        let mut properties = Vec::with_capacity(record.properties.len());
        for prop in record.properties {
            if !seen.insert(prop.name.clone()) {
                return Err(ModelError::DuplicateProperty {
                    declaration: fqn,
                    property: prop.name,
                });
            }
            properties.push(Property::from_record(namespace, &record.name, record.kind, prop)?);
        }

        Ok(Self {
            name: record.name,
            namespace: namespace.to_string(),
            kind: record.kind,
            is_abstract: record.is_abstract,
            super_type: record.extends,
            id_field: record.identified_by,
            properties,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `namespace + "." + name`.
    pub fn fully_qualified_name(&self) -> String {
        names::qualify(&self.namespace, &self.name)
    }

    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_enum(&self) -> bool {
        self.kind == DeclarationKind::Enum
    }

    pub fn is_identifiable(&self) -> bool {
        self.kind.is_identifiable()
    }

    /// Super type as written in the model (short or qualified).
    pub fn super_type(&self) -> Option<&str> {
        self.super_type.as_deref()
    }

    /// The identifying field named by this declaration itself.
    ///
    /// Subtypes usually inherit the identifying field; use
    /// [`hierarchy::identifier_field`] to look it up along the chain.
    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    /// Properties declared on this declaration, in authoring order.
    pub fn own_properties(&self) -> &[Property] {
        &self.properties
    }

    /// A property declared on this declaration (not inherited).
    pub fn own_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// The literal names of an enumeration, in authoring order.
    pub fn enum_literals(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|p| p.kind() == PropertyKind::EnumValue)
            .map(Property::name)
    }

    /// Check this declaration's references against the registry.
    ///
    /// `model_file` is the file that owns this declaration; type names are
    /// resolved through it.
    pub fn validate<R>(&self, model_file: &ModelFile, registry: &R) -> Result<(), ModelError>
    where
        R: ModelRegistry + ?Sized,
    {
        let fqn = self.fully_qualified_name();

        if let Some(super_name) = self.super_type() {
            self.validate_super_type(&fqn, super_name, model_file, registry)?;
        }

        let inherited: Vec<&Property> = hierarchy::super_types(registry, self)
            .into_iter()
            .flat_map(|decl| decl.own_properties())
            .collect();

        for property in &self.properties {
            if inherited.iter().any(|p| p.name() == property.name()) {
                return Err(ModelError::DuplicateProperty {
                    declaration: fqn,
                    property: property.name().to_string(),
                });
            }
            self.validate_property(&fqn, property, model_file, registry)?;
        }

        if let Some(field) = self.id_field() {
            let reject = |reason: &str| ModelError::InvalidIdentifier {
                declaration: fqn.clone(),
                field: field.to_string(),
                reason: reason.to_string(),
            };
            let Some(id_property) = hierarchy::property(registry, self, field) else {
                return Err(reject("field is not declared"));
            };
            if id_property.kind() != PropertyKind::Field
                || id_property.primitive_type() != Some(PrimitiveType::String)
                || id_property.is_array()
            {
                return Err(reject("identifying field must be a single String"));
            }
            if id_property.is_optional() {
                return Err(reject("identifying field cannot be optional"));
            }
        }

        Ok(())
    }

    fn validate_super_type<R>(
        &self,
        fqn: &str,
        super_name: &str,
        model_file: &ModelFile,
        registry: &R,
    ) -> Result<(), ModelError>
    where
        R: ModelRegistry + ?Sized,
    {
        let reject = |reason: String| ModelError::InvalidSuperType {
            declaration: fqn.to_string(),
            super_type: super_name.to_string(),
            reason,
        };

        model_file.resolve_type(registry, &format!("super type of {fqn}"), super_name)?;

        match model_file.get_type(registry, super_name) {
            Some(TypeRef::Declared(parent)) => {
                if parent.kind() != self.kind {
                    return Err(reject(format!(
                        "a {} cannot extend a {}",
                        self.kind,
                        parent.kind()
                    )));
                }
            }
            Some(TypeRef::Primitive(p)) => {
                return Err(reject(format!("primitive type {p} cannot be extended")));
            }
            None => return Err(reject("super type is not loaded".to_string())),
        }

        if hierarchy::has_cyclic_inheritance(registry, self) {
            return Err(reject("circular inheritance".to_string()));
        }
        Ok(())
    }

    fn validate_property<R>(
        &self,
        fqn: &str,
        property: &Property,
        model_file: &ModelFile,
        registry: &R,
    ) -> Result<(), ModelError>
    where
        R: ModelRegistry + ?Sized,
    {
        let Some(type_name) = property.type_name() else {
            return Ok(());
        };

        let context = format!("property {} of class {fqn}", property.name());
        model_file.resolve_type(registry, &context, type_name)?;

        if property.is_relationship() {
            let reject = |reason: String| ModelError::InvalidRelationship {
                declaration: fqn.to_string(),
                property: property.name().to_string(),
                target: type_name.to_string(),
                reason,
            };
            match model_file.get_type(registry, type_name) {
                Some(TypeRef::Primitive(_)) => {
                    return Err(reject("relationships cannot target primitive types".to_string()))
                }
                Some(TypeRef::Declared(target)) if !target.is_identifiable() => {
                    return Err(reject(format!("a {} is not identifiable", target.kind())))
                }
                _ => {}
            }
        }

        if let Some(validator) = property.validator() {
            let compatible = property
                .primitive_type()
                .is_some_and(|p| validator.accepts(p));
            if !compatible {
                return Err(ModelError::InvalidValidator {
                    declaration: fqn.to_string(),
                    property: property.name().to_string(),
                    reason: format!("{validator} cannot be used with type {type_name}"),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{id={}", self.kind, self.fully_qualified_name())?;
        if self.is_abstract {
            f.write_str(", abstract")?;
        }
        if let Some(s) = &self.super_type {
            write!(f, ", super={s}")?;
        }
        f.write_str("}")
    }
}
