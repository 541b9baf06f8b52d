//! # Instance Model
//!
//! The data side of validation: a [`Value`] tree handed over by the data
//! layer. Two variants are special:
//!
//! - [`Resource`]: an embedded instance with a claimed type, an optional
//!   identifier and named property values.
//! - [`Relationship`]: a reference to an identifiable instance by type and
//!   identifier. It has no properties and is never validated structurally.
//!
//! Property names starting with `$` are system properties and are ignored by
//! the undeclared-field check.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use cto_core::names;
use indexmap::IndexMap;

/// A runtime value under validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Array(Vec<Value>),
    Resource(Resource),
    Relationship(Relationship),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The claimed fully-qualified type of a resource or relationship.
    pub fn claimed_type(&self) -> Option<String> {
        match self {
            Value::Resource(r) => Some(r.fully_qualified_type()),
            Value::Relationship(r) => Some(r.fully_qualified_type()),
            _ => None,
        }
    }

    /// Runtime type used in messages: the claimed type for resources and
    /// relationships, a lowercase shape name otherwise.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(_) => "boolean".to_string(),
            Value::Integer(_) => "integer".to_string(),
            Value::Double(_) => "double".to_string(),
            Value::String(_) => "string".to_string(),
            Value::DateTime(_) => "date-time".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Resource(r) => r.fully_qualified_type(),
            Value::Relationship(r) => r.fully_qualified_type(),
        }
    }

    /// Convert to JSON. Returns `None` if the tree holds a non-finite double.
    ///
    /// Resources and relationships become their fully-qualified identifier.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        Some(match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Double(d) => serde_json::Number::from_f64(*d).map(serde_json::Value::Number)?,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Array(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Option<Vec<_>>>()?,
            ),
            Value::Resource(r) => serde_json::Value::String(r.fully_qualified_identifier()),
            Value::Relationship(r) => serde_json::Value::String(r.fully_qualified_identifier()),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Resource(r) => f.write_str(&r.fully_qualified_identifier()),
            Value::Relationship(r) => f.write_str(&r.fully_qualified_identifier()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Resource> for Value {
    fn from(r: Resource) -> Self {
        Value::Resource(r)
    }
}

impl From<Relationship> for Value {
    fn from(r: Relationship) -> Self {
        Value::Relationship(r)
    }
}

/// Returns true for property names reserved for system use.
pub fn is_system_property(name: &str) -> bool {
    name.starts_with('$')
}

/// An instance claiming conformance to a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    namespace: String,
    type_name: String,
    identifier: Option<String>,
    properties: IndexMap<String, Value>,
}

impl Resource {
    /// An identifiable instance (asset, transaction, participant).
    ///
    /// The identifier is a system property; set the identifying field
    /// separately with [`Resource::with`].
    pub fn new(namespace: &str, type_name: &str, identifier: impl Into<String>) -> Self {
        Self {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            identifier: Some(identifier.into()),
            properties: IndexMap::new(),
        }
    }

    /// A concept instance, which has no identifier.
    pub fn concept(namespace: &str, type_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            identifier: None,
            properties: IndexMap::new(),
        }
    }

    /// Set a property and return `self`.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property. Replacing a value keeps its original position.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.properties.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.properties.shift_remove(name)
    }

    /// Property names in the order they were first set.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn fully_qualified_type(&self) -> String {
        names::qualify(&self.namespace, &self.type_name)
    }

    /// `org.acme.Vehicle#1HG` for identifiable instances, the type alone otherwise.
    pub fn fully_qualified_identifier(&self) -> String {
        match &self.identifier {
            Some(id) => format!("{}#{id}", self.fully_qualified_type()),
            None => self.fully_qualified_type(),
        }
    }
}

/// A typed reference to an identifiable instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    namespace: String,
    type_name: String,
    identifier: String,
}

impl Relationship {
    pub fn new(namespace: &str, type_name: &str, identifier: impl Into<String>) -> Self {
        Self {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            identifier: identifier.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn fully_qualified_type(&self) -> String {
        names::qualify(&self.namespace, &self.type_name)
    }

    pub fn fully_qualified_identifier(&self) -> String {
        format!("{}#{}", self.fully_qualified_type(), self.identifier)
    }
}
