//! # Properties
//!
//! A property is a named, typed member of exactly one declaration. It keeps
//! the name of its declaring namespace and declaration rather than a pointer,
//! so type references are always resolved through the namespace that
//! declared them, even when the property is inherited by a subtype living
//! elsewhere.

use std::fmt;

use cto_core::{names, ModelError, PrimitiveType};
use serde::{Deserialize, Serialize};

use crate::declaration::DeclarationKind;
use crate::record::{PropertyRecord, ValidatorRecord};
use crate::registry::{ModelRegistry, TypeRef};
use crate::validator::FieldValidator;

/// What a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// An embedded value: a primitive, a concept, an enum literal or a nested resource.
    Field,
    /// A reference by identifier to an identifiable instance.
    Relationship,
    /// A literal of an enumeration.
    EnumValue,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Field => "field",
            PropertyKind::Relationship => "relationship",
            PropertyKind::EnumValue => "enum_value",
        }
    }
}

/// A member of a declaration.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    namespace: String,
    parent: String,
    kind: PropertyKind,
    type_name: Option<String>,
    is_array: bool,
    is_optional: bool,
    validator: Option<FieldValidator>,
}

impl Property {
    /// Build a property of declaration `parent` in `namespace` from its record.
    ///
    /// # Errors
    ///
    /// - `InvalidProperty` if the property kind does not fit `parent_kind`
    ///   (literals outside enumerations, fields inside them).
    /// - `MissingPropertyType` if a field or relationship has no type.
    /// - `InvalidValidator` if the validator cannot be compiled.
    pub(crate) fn from_record(
        namespace: &str,
        parent: &str,
        parent_kind: DeclarationKind,
        record: PropertyRecord,
    ) -> Result<Self, ModelError> {
        let declaration = names::qualify(namespace, parent);
        let is_enum = parent_kind == DeclarationKind::Enum;
        let kind = record.kind.unwrap_or(if is_enum {
            PropertyKind::EnumValue
        } else {
            PropertyKind::Field
        });

        let invalid = |reason: &str| ModelError::InvalidProperty {
            declaration: declaration.clone(),
            property: record.name.clone(),
            reason: reason.to_string(),
        };

        match (is_enum, kind) {
            (true, PropertyKind::EnumValue) => {
                if record.type_name.is_some() || record.validator.is_some() {
                    return Err(invalid("enum literals carry no type or validator"));
                }
                if record.array || record.optional {
                    return Err(invalid("enum literals cannot be arrays or optional"));
                }
            }
            (true, _) => return Err(invalid("enumerations may only declare literals")),
            (false, PropertyKind::EnumValue) => {
                return Err(invalid("literals may only appear in enumerations"))
            }
            (false, _) => {
                if record.type_name.as_deref().map_or(true, str::is_empty) {
                    return Err(ModelError::MissingPropertyType {
                        declaration: declaration.clone(),
                        property: record.name.clone(),
                    });
                }
            }
        }

        if kind == PropertyKind::Relationship && record.validator.is_some() {
            return Err(invalid("relationships cannot carry validators"));
        }

        let validator = match record.validator {
            None => None,
            Some(ValidatorRecord::Range { range }) => Some(
                FieldValidator::range(range.lower, range.upper).map_err(|reason| {
                    ModelError::InvalidValidator {
                        declaration: declaration.clone(),
                        property: record.name.clone(),
                        reason,
                    }
                })?,
            ),
            Some(ValidatorRecord::Regex { regex }) => {
                Some(FieldValidator::pattern(&regex).map_err(|reason| {
                    ModelError::InvalidValidator {
                        declaration: declaration.clone(),
                        property: record.name.clone(),
                        reason,
                    }
                })?)
            }
        };

        Ok(Self {
            name: record.name,
            namespace: namespace.to_string(),
            parent: parent.to_string(),
            kind,
            type_name: record.type_name,
            is_array: record.array,
            is_optional: record.optional,
            validator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace of the declaring declaration.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Short name of the declaring declaration.
    pub fn parent_name(&self) -> &str {
        &self.parent
    }

    /// Fully-qualified name of the declaring declaration.
    pub fn declaring_type(&self) -> String {
        names::qualify(&self.namespace, &self.parent)
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Declared type as written (short or qualified). `None` for enum literals.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn is_relationship(&self) -> bool {
        self.kind == PropertyKind::Relationship
    }

    pub fn validator(&self) -> Option<&FieldValidator> {
        self.validator.as_ref()
    }

    /// The primitive type of this property, if its declared type is one.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        self.type_name().and_then(PrimitiveType::from_name)
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive_type().is_some()
    }

    /// The declared type resolved through the declaring namespace.
    pub fn resolved_type<'r, R>(&self, registry: &'r R) -> Option<TypeRef<'r>>
    where
        R: ModelRegistry + ?Sized,
    {
        let type_name = self.type_name()?;
        registry
            .model_file(&self.namespace)?
            .get_type(registry, type_name)
    }

    /// Fully-qualified declared type, or the primitive name for primitives.
    pub fn fully_qualified_type_name<R>(&self, registry: &R) -> Option<String>
    where
        R: ModelRegistry + ?Sized,
    {
        let type_name = self.type_name()?;
        if names::is_primitive_type(type_name) {
            return Some(type_name.to_string());
        }
        registry
            .model_file(&self.namespace)?
            .get_fully_qualified_type_name(registry, type_name)
    }

    /// True if the declared type resolves to an enumeration.
    pub fn is_type_enum<R>(&self, registry: &R) -> bool
    where
        R: ModelRegistry + ?Sized,
    {
        if self.kind != PropertyKind::Field || self.is_primitive() {
            return false;
        }
        matches!(
            self.resolved_type(registry),
            Some(TypeRef::Declared(decl)) if decl.is_enum()
        )
    }

    /// Declared type as shown in messages: `Integer`, `Person[]`.
    pub fn display_type(&self) -> String {
        let base = self.type_name().unwrap_or_default();
        if self.is_array {
            format!("{base}[]")
        } else {
            base.to_string()
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{name={}", self.kind.as_str(), self.name)?;
        if self.type_name.is_some() {
            write!(f, ", type={}", self.display_type())?;
        }
        if self.is_optional {
            f.write_str(", optional")?;
        }
        if let Some(v) = &self.validator {
            write!(f, ", {v}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(yaml: &str) -> PropertyRecord {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_field_defaults_and_accessors() {
        let p = Property::from_record(
            "org.acme",
            "Vehicle",
            DeclarationKind::Asset,
            record("{ name: mileage, type: Integer, optional: true }"),
        )
        .unwrap();
        assert_eq!(p.kind(), PropertyKind::Field);
        assert_eq!(p.primitive_type(), Some(PrimitiveType::Integer));
        assert!(p.is_optional());
        assert!(!p.is_array());
        assert_eq!(p.declaring_type(), "org.acme.Vehicle");
    }

    #[test]
    fn test_enum_literal_defaults() {
        let p = Property::from_record("org.acme", "Color", DeclarationKind::Enum, record("{ name: RED }"))
            .unwrap();
        assert_eq!(p.kind(), PropertyKind::EnumValue);
        assert_eq!(p.type_name(), None);
    }

    #[test]
    fn test_missing_type_rejected() {
        let err = Property::from_record("org.acme", "Vehicle", DeclarationKind::Asset, record("{ name: vin }"))
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingPropertyType { .. }), "got: {err}");
    }

    #[test]
    fn test_kind_must_match_declaration() {
        let err = Property::from_record(
            "org.acme",
            "Color",
            DeclarationKind::Enum,
            record("{ name: hue, type: String, kind: field }"),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidProperty { .. }));

        let err = Property::from_record(
            "org.acme",
            "Vehicle",
            DeclarationKind::Asset,
            record("{ name: RED, kind: enum_value }"),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidProperty { .. }));
    }

    #[test]
    fn test_bad_regex_rejected() {
        let err = Property::from_record(
            "org.acme",
            "Vehicle",
            DeclarationKind::Asset,
            record(r#"{ name: plate, type: String, validator: { regex: "([" } }"#),
        )
        .unwrap_err();
        match err {
            ModelError::InvalidValidator { declaration, property, .. } => {
                assert_eq!(declaration, "org.acme.Vehicle");
                assert_eq!(property, "plate");
            }
            other => panic!("Expected InvalidValidator, got: {other}"),
        }
    }

    #[test]
    fn test_display_type_marks_arrays() {
        let p = Property::from_record(
            "org.acme",
            "Fleet",
            DeclarationKind::Asset,
            record("{ name: cars, type: Vehicle, kind: relationship, array: true }"),
        )
        .unwrap();
        assert_eq!(p.display_type(), "Vehicle[]");
        assert!(p.is_relationship());
        assert_eq!(p.to_string(), "relationship {name=cars, type=Vehicle[]}");
    }
}
