//! # Error Types: Structured Error Hierarchy
//!
//! Two error families, both terminating the current call immediately:
//!
//! - [`ModelError`] is raised while loading or resolving the schema itself.
//!   It is fatal to using the namespace that produced it.
//! - [`ValidationError`] is raised while checking a data instance against a
//!   loaded schema. It means "this instance is invalid", never a warning.
//!
//! Validation errors carry the identifier of the resource being checked, the
//! offending property where one exists, and values already rendered to text,
//! so a message can be produced without walking the instance again.

use thiserror::Error;

/// Top-level error type for the workspace.
#[derive(Error, Debug)]
pub enum CtoError {
    /// The model could not be loaded or resolved.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// A data instance did not conform to the model.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be read or decoded.
    #[error("config error for '{source_name}': {reason}")]
    Config {
        /// File name or other label of the configuration source.
        source_name: String,
        /// Reason the configuration was rejected.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised while building or resolving the declarations of a namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A type reference is not primitive, not local and not imported.
    #[error("undeclared type '{type_name}' in {context}")]
    UndeclaredType {
        /// The type name as written in the model.
        type_name: String,
        /// Where the reference appears, e.g. `property owner of class org.acme.Car`.
        context: String,
    },

    /// No import of the namespace has the requested short name.
    #[error(
        "failed to find the fully qualified name for '{type_name}' in namespace '{namespace}' with imports [{}]",
        .imports.join(", ")
    )]
    UnresolvedImport {
        /// The short type name that was looked up.
        type_name: String,
        /// The namespace whose imports were searched.
        namespace: String,
        /// The complete import list of that namespace.
        imports: Vec<String>,
    },

    /// Two model files declare the same namespace.
    #[error("namespace '{namespace}' is already registered")]
    DuplicateNamespace {
        /// The conflicting namespace.
        namespace: String,
    },

    /// The requested namespace is not registered.
    #[error("namespace '{namespace}' is not registered")]
    NamespaceNotFound {
        /// The namespace that was looked up.
        namespace: String,
    },

    /// Two declarations in one namespace share a name.
    #[error("duplicate declaration '{name}' in namespace '{namespace}'")]
    DuplicateDeclaration {
        /// Namespace containing both declarations.
        namespace: String,
        /// The repeated short name.
        name: String,
    },

    /// A property name is declared twice on a declaration or its super types.
    #[error("duplicate property '{property}' on '{declaration}'")]
    DuplicateProperty {
        /// Fully-qualified name of the declaration.
        declaration: String,
        /// The repeated property name.
        property: String,
    },

    /// A field or relationship was declared without a type.
    #[error("property '{property}' on '{declaration}' has no type")]
    MissingPropertyType {
        /// Fully-qualified name of the declaration.
        declaration: String,
        /// The untyped property.
        property: String,
    },

    /// A property record does not fit the declaration it appears in.
    #[error("invalid property '{property}' on '{declaration}': {reason}")]
    InvalidProperty {
        /// Fully-qualified name of the declaration.
        declaration: String,
        /// The offending property.
        property: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The super type of a declaration is unusable.
    #[error("invalid super type '{super_type}' for '{declaration}': {reason}")]
    InvalidSuperType {
        /// Fully-qualified name of the declaration.
        declaration: String,
        /// The super type as written in the model.
        super_type: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The identifying field of a declaration is missing or mistyped.
    #[error("invalid identifying field '{field}' for '{declaration}': {reason}")]
    InvalidIdentifier {
        /// Fully-qualified name of the declaration.
        declaration: String,
        /// The `identified by` field name.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A relationship points at something that cannot be referenced by id.
    #[error("relationship '{property}' on '{declaration}' targets '{target}': {reason}")]
    InvalidRelationship {
        /// Fully-qualified name of the declaration.
        declaration: String,
        /// The relationship property.
        property: String,
        /// The target type as written in the model.
        target: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A field validator is malformed or attached to an incompatible type.
    #[error("invalid validator on '{declaration}.{property}': {reason}")]
    InvalidValidator {
        /// Fully-qualified name of the declaration.
        declaration: String,
        /// The property carrying the validator.
        property: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A declaration record could not be decoded.
    #[error("model load error for '{source_name}': {reason}")]
    Load {
        /// File name or other label of the record source.
        source_name: String,
        /// Reason the record could not be decoded.
        reason: String,
    },
}

/// Error raised while validating a data instance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A class-typed value is not a resource.
    #[error("model violation in instance {resource_id}: class {class_name} has value {value}, expected a resource")]
    NotAResource {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// Fully-qualified name of the expected class.
        class_name: String,
        /// The offending value, rendered.
        value: String,
    },

    /// The instance claims a type that is abstract.
    #[error("the class {class_name} is abstract and cannot have instances")]
    AbstractClassViolation {
        /// Fully-qualified name of the abstract class.
        class_name: String,
    },

    /// The instance carries a property its class does not declare.
    #[error("instance {resource_id} has a property named '{property}' which is not declared in {class_name}")]
    UndeclaredField {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// The undeclared property name.
        property: String,
        /// Fully-qualified name of the instance's class.
        class_name: String,
    },

    /// A non-optional property is absent or null.
    #[error("the instance {resource_id} is missing the required field '{property}'")]
    MissingRequiredProperty {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// The missing property name.
        property: String,
    },

    /// An enum-typed value is not one of the declared literals.
    #[error("model violation in instance {resource_id}: the value {value} is not a valid value of {enum_name} for field '{field}'")]
    InvalidEnumValue {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// The field holding the value.
        field: String,
        /// Fully-qualified name of the enumeration.
        enum_name: String,
        /// The offending value, rendered.
        value: String,
    },

    /// A field value has the wrong runtime shape for its declared type.
    #[error("model violation in instance {resource_id}: field '{property}' has value {value} ({actual_type}), expected type {expected_type}")]
    FieldTypeViolation {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// The offending field.
        property: String,
        /// Declared type, suffixed with `[]` for arrays.
        expected_type: String,
        /// The offending value, rendered.
        value: String,
        /// Runtime type of the value.
        actual_type: String,
    },

    /// A relationship property holds something other than a relationship.
    #[error("model violation in instance {resource_id}: class {class_name} has value {value}, expected a relationship")]
    NotARelationship {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// Fully-qualified name of the relationship's target type.
        class_name: String,
        /// The offending value, rendered.
        value: String,
    },

    /// The value's claimed type is not the declared type or a subtype of it.
    #[error("instance {resource_id} has property '{property}' with type {actual_type} that is not derived from {expected_type}")]
    InvalidFieldAssignment {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// The offending property.
        property: String,
        /// Type claimed by the value.
        actual_type: String,
        /// Fully-qualified declared type of the property.
        expected_type: String,
    },

    /// The instance claims a type the registry does not know.
    #[error("instance {resource_id} claims type {type_name} which is not declared")]
    UnknownType {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// The claimed type.
        type_name: String,
    },

    /// A field validator rejected a correctly typed value.
    #[error("validator error for field '{property}' of {resource_id}: {message}")]
    ValidatorViolation {
        /// Identifier of the resource being validated.
        resource_id: String,
        /// The validated field.
        property: String,
        /// What the validator reported.
        message: String,
    },
}

impl ValidationError {
    /// The identifier of the resource being validated when the error was raised.
    ///
    /// `AbstractClassViolation` is raised before any property is examined and
    /// has no identifier.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            ValidationError::AbstractClassViolation { .. } => None,
            ValidationError::NotAResource { resource_id, .. }
            | ValidationError::UndeclaredField { resource_id, .. }
            | ValidationError::MissingRequiredProperty { resource_id, .. }
            | ValidationError::InvalidEnumValue { resource_id, .. }
            | ValidationError::FieldTypeViolation { resource_id, .. }
            | ValidationError::NotARelationship { resource_id, .. }
            | ValidationError::InvalidFieldAssignment { resource_id, .. }
            | ValidationError::UnknownType { resource_id, .. }
            | ValidationError::ValidatorViolation { resource_id, .. } => Some(resource_id),
        }
    }

    /// The property or field the error is about, if any.
    pub fn property(&self) -> Option<&str> {
        match self {
            ValidationError::UndeclaredField { property, .. }
            | ValidationError::MissingRequiredProperty { property, .. }
            | ValidationError::FieldTypeViolation { property, .. }
            | ValidationError::InvalidFieldAssignment { property, .. }
            | ValidationError::ValidatorViolation { property, .. } => Some(property),
            ValidationError::InvalidEnumValue { field, .. } => Some(field),
            ValidationError::NotAResource { .. }
            | ValidationError::AbstractClassViolation { .. }
            | ValidationError::NotARelationship { .. }
            | ValidationError::UnknownType { .. } => None,
        }
    }
}
