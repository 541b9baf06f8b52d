//! Per-call validation state.
//!
//! A fresh [`ValidationContext`] is created for every top-level call and
//! dropped when it returns, so one validator can serve concurrent callers.

use cto_introspect::ModelRegistry;

use crate::instance::Value;

static NULL: Value = Value::Null;

/// State threaded through one validation walk.
pub struct ValidationContext<'a, R: ModelRegistry + ?Sized> {
    registry: &'a R,
    stack: Vec<&'a Value>,
    root_identifier: String,
    current_field: String,
}

impl<'a, R: ModelRegistry + ?Sized> ValidationContext<'a, R> {
    pub fn new(registry: &'a R, root_identifier: impl Into<String>) -> Self {
        Self {
            registry,
            stack: Vec::new(),
            root_identifier: root_identifier.into(),
            current_field: String::new(),
        }
    }

    pub fn registry(&self) -> &'a R {
        self.registry
    }

    pub fn push(&mut self, value: &'a Value) {
        self.stack.push(value);
    }

    /// Pop the value under examination. An empty stack yields `Null`.
    pub fn pop(&mut self) -> &'a Value {
        self.stack.pop().unwrap_or(&NULL)
    }

    pub fn peek(&self) -> Option<&'a Value> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn root_identifier(&self) -> &str {
        &self.root_identifier
    }

    /// Replace the root identifier, returning the previous one for
    /// [`ValidationContext::restore_root_identifier`].
    pub fn enter_resource(&mut self, identifier: String) -> String {
        std::mem::replace(&mut self.root_identifier, identifier)
    }

    pub fn restore_root_identifier(&mut self, previous: String) {
        self.root_identifier = previous;
    }

    pub fn current_field(&self) -> &str {
        &self.current_field
    }

    pub fn set_current_field(&mut self, name: &str) {
        name.clone_into(&mut self.current_field);
    }
}
