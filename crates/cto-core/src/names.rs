//! # Qualified Names and Primitive Types
//!
//! A declaration is addressed either by its short name (`Vehicle`) inside its
//! own namespace, or by its fully-qualified name (`org.acme.Vehicle`) from
//! anywhere. The namespace is everything before the last dot.
//!
//! Primitive type names (`String`, `Boolean`, `DateTime`, `Integer`, `Long`,
//! `Double`) have no namespace and never require a declaration lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The built-in scalar types of the modeling language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    String,
    Boolean,
    DateTime,
    Integer,
    Long,
    Double,
}

impl PrimitiveType {
    /// Every primitive, in declaration order.
    pub const ALL: [PrimitiveType; 6] = [
        PrimitiveType::String,
        PrimitiveType::Boolean,
        PrimitiveType::DateTime,
        PrimitiveType::Integer,
        PrimitiveType::Long,
        PrimitiveType::Double,
    ];

    /// The name used for this primitive in model source.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "String",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::DateTime => "DateTime",
            PrimitiveType::Integer => "Integer",
            PrimitiveType::Long => "Long",
            PrimitiveType::Double => "Double",
        }
    }

    /// Look up a primitive by its exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// True for `Integer`, `Long` and `Double`.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Integer | PrimitiveType::Long | PrimitiveType::Double
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `name` is one of the primitive type names.
pub fn is_primitive_type(name: &str) -> bool {
    PrimitiveType::from_name(name).is_some()
}

/// The short name of a (possibly) qualified type name.
///
/// `org.acme.Vehicle` → `Vehicle`; `Vehicle` → `Vehicle`.
pub fn short_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// The namespace of a qualified type name, or `""` for an unqualified one.
pub fn namespace_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => "",
    }
}

/// Returns true if `name` carries a namespace prefix.
pub fn is_qualified(name: &str) -> bool {
    name.contains('.')
}

/// Join a namespace and a short name into a fully-qualified name.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}
