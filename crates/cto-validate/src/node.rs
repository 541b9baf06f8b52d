//! The closed set of model elements the validator can visit.

use std::fmt;

use cto_introspect::{Declaration, Property, PropertyKind};

/// A model element paired with the value on top of the validation stack.
#[derive(Debug, Clone, Copy)]
pub enum Node<'m> {
    /// An enumeration declaration; the value must be one of its literals.
    Enumeration(&'m Declaration),
    /// A class declaration; the value must be a conforming resource.
    Class(&'m Declaration),
    /// A relationship property.
    Relationship(&'m Property),
    /// A field property.
    Field(&'m Property),
}

impl<'m> Node<'m> {
    pub fn of_declaration(decl: &'m Declaration) -> Self {
        if decl.is_enum() {
            Node::Enumeration(decl)
        } else {
            Node::Class(decl)
        }
    }

    pub fn of_property(property: &'m Property) -> Self {
        match property.kind() {
            PropertyKind::Relationship => Node::Relationship(property),
            PropertyKind::Field | PropertyKind::EnumValue => Node::Field(property),
        }
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Enumeration(d) => write!(f, "enumeration {}", d.fully_qualified_name()),
            Node::Class(d) => write!(f, "class {}", d.fully_qualified_name()),
            Node::Relationship(p) => write!(f, "relationship {}.{}", p.declaring_type(), p.name()),
            Node::Field(p) => write!(f, "field {}.{}", p.declaring_type(), p.name()),
        }
    }
}
