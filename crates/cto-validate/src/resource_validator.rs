//! # Resource Validator
//!
//! A recursive visitor that checks a [`Value`] against a declaration. Each
//! step pops the value under examination from the [`ValidationContext`]
//! stack and dispatches on the [`Node`] kind:
//!
//! - **Class**: the value must be a [`Resource`]. Its *claimed* type is
//!   resolved through the registry, so a subtype instance is validated
//!   against the subtype. Abstract types are rejected, undeclared
//!   properties are rejected, then every declared property (own first, then
//!   inherited) is checked for presence and visited.
//! - **Field**: enum-typed fields visit the enumeration, arrays check each
//!   element, primitives check the runtime shape and run any attached
//!   validator, class-typed values recurse into a class visit.
//! - **Relationship**: the value (or each array element) must be a
//!   [`Relationship`] whose claimed type is assignable to the declared one.
//!   The target is never fetched.
//! - **Enumeration**: the value must be a string naming one of the literals.
//!
//! The first violation aborts the walk. Errors carry the identifier of the
//! innermost identifiable resource under examination; it is restored when a
//! nested resource visit returns.
//!
//! [`Relationship`]: crate::instance::Relationship

use cto_core::{PrimitiveType, ValidationError};
use cto_introspect::{hierarchy, Declaration, ModelRegistry, Property, Scalar};
use tracing::trace;

use crate::config::ValidatorOptions;
use crate::context::ValidationContext;
use crate::instance::{is_system_property, Resource, Value};
use crate::node::Node;
use crate::render::render_value;

/// Validates data instances against the declarations of a registry.
///
/// Holds no per-call state; each entry point builds its own context.
pub struct ResourceValidator<'r, R: ModelRegistry + ?Sized> {
    registry: &'r R,
    options: ValidatorOptions,
}

impl<'r, R: ModelRegistry + ?Sized> ResourceValidator<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self::with_options(registry, ValidatorOptions::default())
    }

    pub fn with_options(registry: &'r R, options: ValidatorOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validate `instance` against `declaration`.
    ///
    /// An enumeration declaration checks a single literal; any other
    /// declaration expects a resource whose claimed type is the declaration
    /// or one of its subtypes.
    pub fn validate(&self, declaration: &Declaration, instance: &Value) -> Result<(), ValidationError> {
        let root_identifier = match instance {
            Value::Resource(r) => r.fully_qualified_identifier(),
            _ => declaration.fully_qualified_name(),
        };
        let mut ctx = ValidationContext::new(self.registry, root_identifier);
        ctx.push(instance);
        self.visit(&mut ctx, Node::of_declaration(declaration))
    }

    /// Validate `resource` against the declaration of its own claimed type.
    pub fn validate_resource(&self, resource: &Resource) -> Result<(), ValidationError> {
        let claimed = resource.fully_qualified_type();
        let declaration = self
            .registry
            .get_type(&claimed)
            .ok_or_else(|| ValidationError::UnknownType {
                resource_id: resource.fully_qualified_identifier(),
                type_name: claimed,
            })?;
        let mut ctx = ValidationContext::new(self.registry, resource.fully_qualified_identifier());
        self.check_resource(&mut ctx, declaration, resource)
    }

    /// Validate one property value in isolation, attributing errors to
    /// `resource_id`.
    ///
    /// A null value is accepted for optional properties and reported as
    /// missing otherwise.
    pub fn validate_property(
        &self,
        property: &Property,
        value: &Value,
        resource_id: &str,
    ) -> Result<(), ValidationError> {
        let mut ctx = ValidationContext::new(self.registry, resource_id);
        if value.is_null() {
            return if property.is_optional() {
                Ok(())
            } else {
                Err(ValidationError::MissingRequiredProperty {
                    resource_id: resource_id.to_string(),
                    property: property.name().to_string(),
                })
            };
        }
        ctx.set_current_field(property.name());
        ctx.push(value);
        self.visit(&mut ctx, Node::of_property(property))
    }

    fn visit<'a>(&self, ctx: &mut ValidationContext<'a, R>, node: Node<'_>) -> Result<(), ValidationError> {
        trace!(
            %node,
            depth = ctx.depth(),
            root = ctx.root_identifier(),
            value = %ctx.peek().map(|v| self.render(v)).unwrap_or_default(),
            "visit"
        );
        match node {
            Node::Enumeration(decl) => self.visit_enumeration(ctx, decl),
            Node::Class(decl) => self.visit_class(ctx, decl),
            Node::Relationship(property) => self.visit_relationship(ctx, property),
            Node::Field(property) => self.visit_field(ctx, property),
        }
    }

    fn visit_enumeration<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        decl: &Declaration,
    ) -> Result<(), ValidationError> {
        let value = ctx.pop();
        if let Value::String(literal) = value {
            if decl.enum_literals().any(|l| l == literal) {
                return Ok(());
            }
        }
        Err(ValidationError::InvalidEnumValue {
            resource_id: ctx.root_identifier().to_string(),
            field: ctx.current_field().to_string(),
            enum_name: decl.fully_qualified_name(),
            value: self.render(value),
        })
    }

    fn visit_class<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        decl: &Declaration,
    ) -> Result<(), ValidationError> {
        match ctx.pop() {
            Value::Resource(resource) => self.check_resource(ctx, decl, resource),
            other => Err(ValidationError::NotAResource {
                resource_id: ctx.root_identifier().to_string(),
                class_name: decl.fully_qualified_name(),
                value: self.render(other),
            }),
        }
    }

    /// Check `resource` against its claimed type, which must be assignable
    /// to `expected`.
    fn check_resource<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        expected: &Declaration,
        resource: &'a Resource,
    ) -> Result<(), ValidationError> {
        let previous = match resource.identifier() {
            Some(_) => Some(ctx.enter_resource(resource.fully_qualified_identifier())),
            None => None,
        };
        let result = self.check_resource_properties(ctx, expected, resource);
        if let Some(previous) = previous {
            ctx.restore_root_identifier(previous);
        }
        result
    }

    fn check_resource_properties<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        expected: &Declaration,
        resource: &'a Resource,
    ) -> Result<(), ValidationError> {
        let registry = ctx.registry();
        let claimed = resource.fully_qualified_type();
        let Some(concrete) = registry.get_type(&claimed) else {
            return Err(ValidationError::UnknownType {
                resource_id: ctx.root_identifier().to_string(),
                type_name: claimed,
            });
        };

        if concrete.is_abstract() {
            return Err(ValidationError::AbstractClassViolation { class_name: claimed });
        }
        let expected_name = expected.fully_qualified_name();
        if !hierarchy::is_assignable_to(registry, &claimed, &expected_name) {
            return Err(ValidationError::InvalidFieldAssignment {
                resource_id: ctx.root_identifier().to_string(),
                property: "$class".to_string(),
                actual_type: claimed,
                expected_type: expected_name,
            });
        }
        if concrete.is_enum() {
            return Err(ValidationError::NotAResource {
                resource_id: ctx.root_identifier().to_string(),
                class_name: claimed,
                value: resource.fully_qualified_identifier(),
            });
        }

        for name in resource.property_names() {
            if !is_system_property(name) && hierarchy::property(registry, concrete, name).is_none() {
                return Err(ValidationError::UndeclaredField {
                    resource_id: ctx.root_identifier().to_string(),
                    property: name.to_string(),
                    class_name: claimed,
                });
            }
        }

        for property in hierarchy::properties(registry, concrete) {
            match resource.get(property.name()) {
                Some(value) if !value.is_null() => {
                    ctx.set_current_field(property.name());
                    ctx.push(value);
                    self.visit(ctx, Node::of_property(property))?;
                }
                _ if property.is_optional() => {}
                _ => {
                    return Err(ValidationError::MissingRequiredProperty {
                        resource_id: ctx.root_identifier().to_string(),
                        property: property.name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn visit_field<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        property: &Property,
    ) -> Result<(), ValidationError> {
        let value = ctx.pop();
        if value.is_null() {
            return Err(self.field_type_violation(ctx, property, value));
        }

        if property.is_type_enum(ctx.registry()) {
            return self.check_enum_field(ctx, property, value);
        }

        if property.is_array() {
            let Value::Array(items) = value else {
                return Err(self.field_type_violation(ctx, property, value));
            };
            for item in items {
                self.check_item(ctx, property, item)?;
            }
            Ok(())
        } else {
            self.check_item(ctx, property, value)
        }
    }

    fn check_enum_field<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        property: &Property,
        value: &'a Value,
    ) -> Result<(), ValidationError> {
        let registry = ctx.registry();
        let Some(enum_decl) = property
            .resolved_type(registry)
            .and_then(|t| t.as_declaration())
        else {
            return Err(self.field_type_violation(ctx, property, value));
        };

        match value {
            Value::Array(items) if property.is_array() => {
                for item in items {
                    ctx.push(item);
                    self.visit(ctx, Node::Enumeration(enum_decl))?;
                }
                Ok(())
            }
            _ if property.is_array() => Err(self.field_type_violation(ctx, property, value)),
            _ => {
                ctx.push(value);
                self.visit(ctx, Node::Enumeration(enum_decl))
            }
        }
    }

    /// Check one non-array value (or one array element) of a field.
    fn check_item<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        property: &Property,
        value: &'a Value,
    ) -> Result<(), ValidationError> {
        if value.is_null() {
            return Err(self.field_type_violation(ctx, property, value));
        }

        if let Some(primitive) = property.primitive_type() {
            return self.check_primitive(ctx, property, primitive, value);
        }

        let registry = ctx.registry();
        let target = match value.claimed_type() {
            Some(claimed) => {
                let Some(concrete) = registry.get_type(&claimed) else {
                    return Err(self.field_type_violation(ctx, property, value));
                };
                let declared = property.fully_qualified_type_name(registry);
                let assignable = declared
                    .as_deref()
                    .is_some_and(|d| hierarchy::is_assignable_to(registry, &claimed, d));
                if !assignable {
                    return Err(ValidationError::InvalidFieldAssignment {
                        resource_id: ctx.root_identifier().to_string(),
                        property: property.name().to_string(),
                        actual_type: claimed,
                        expected_type: declared.unwrap_or_else(|| property.display_type()),
                    });
                }
                concrete
            }
            None => match property
                .resolved_type(registry)
                .and_then(|t| t.as_declaration())
            {
                Some(decl) => decl,
                None => return Err(self.field_type_violation(ctx, property, value)),
            },
        };

        ctx.push(value);
        self.visit(ctx, Node::Class(target))
    }

    fn check_primitive<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        property: &Property,
        primitive: PrimitiveType,
        value: &'a Value,
    ) -> Result<(), ValidationError> {
        let scalar = match (primitive, value) {
            (PrimitiveType::String, Value::String(s)) => Some(Scalar::Text(s.as_str())),
            (p, Value::Integer(i)) if p.is_numeric() => Some(Scalar::Number(*i as f64)),
            (p, Value::Double(d)) if p.is_numeric() => Some(Scalar::Number(*d)),
            (PrimitiveType::Boolean, Value::Boolean(_))
            | (PrimitiveType::DateTime, Value::DateTime(_)) => None,
            _ => return Err(self.field_type_violation(ctx, property, value)),
        };

        if !self.options.run_field_validators {
            return Ok(());
        }
        match (property.validator(), scalar) {
            (Some(validator), Some(scalar)) => {
                validator.validate(ctx.root_identifier(), property.name(), scalar)
            }
            _ => Ok(()),
        }
    }

    fn visit_relationship<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        property: &Property,
    ) -> Result<(), ValidationError> {
        let value = ctx.pop();
        if !property.is_array() {
            return self.check_relationship(ctx, property, value);
        }
        let Value::Array(items) = value else {
            return Err(ValidationError::InvalidFieldAssignment {
                resource_id: ctx.root_identifier().to_string(),
                property: property.name().to_string(),
                actual_type: value.type_name(),
                expected_type: property.display_type(),
            });
        };
        for item in items {
            self.check_relationship(ctx, property, item)?;
        }
        Ok(())
    }

    fn check_relationship<'a>(
        &self,
        ctx: &mut ValidationContext<'a, R>,
        property: &Property,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let registry = ctx.registry();
        let declared = property
            .fully_qualified_type_name(registry)
            .unwrap_or_else(|| property.type_name().unwrap_or_default().to_string());

        let Value::Relationship(relationship) = value else {
            return Err(ValidationError::NotARelationship {
                resource_id: ctx.root_identifier().to_string(),
                class_name: declared,
                value: self.render(value),
            });
        };

        let claimed = relationship.fully_qualified_type();
        let known = registry.get_type(&claimed).is_some();
        if !known || !hierarchy::is_assignable_to(registry, &claimed, &declared) {
            return Err(ValidationError::InvalidFieldAssignment {
                resource_id: ctx.root_identifier().to_string(),
                property: property.name().to_string(),
                actual_type: claimed,
                expected_type: declared,
            });
        }
        Ok(())
    }

    fn field_type_violation(
        &self,
        ctx: &ValidationContext<'_, R>,
        property: &Property,
        value: &Value,
    ) -> ValidationError {
        ValidationError::FieldTypeViolation {
            resource_id: ctx.root_identifier().to_string(),
            property: property.name().to_string(),
            expected_type: property.display_type(),
            value: self.render(value),
            actual_type: value.type_name(),
        }
    }

    fn render(&self, value: &Value) -> String {
        render_value(value, self.options.max_rendered_value_len)
    }
}
