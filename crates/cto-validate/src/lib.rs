//! # cto-validate: Resource Validation
//!
//! Checks data instances against the declarations held by a
//! [`cto_introspect::ModelRegistry`].
//!
//! ## Components
//!
//! - [`Value`], [`Resource`], [`Relationship`]: the instance model handed
//!   over by the data layer.
//! - [`ResourceValidator`]: the recursive visitor. Stateless between calls;
//!   every entry point builds a fresh [`ValidationContext`].
//! - [`Node`]: the closed set of model elements a visit step dispatches on.
//! - [`EngineConfig`]: options for the model manager and the validator.
//!
//! ## Example
//!
//! ```no_run
//! use cto_introspect::ModelManager;
//! use cto_validate::{Resource, ResourceValidator};
//!
//! let mut models = ModelManager::new();
//! models.load_dir("models").unwrap();
//!
//! let car = Resource::new("org.acme", "Vehicle", "1HG").with("vin", "1HG");
//! ResourceValidator::new(&models).validate_resource(&car).unwrap();
//! ```

pub mod config;
pub mod context;
pub mod instance;
pub mod node;
pub mod render;
pub mod resource_validator;

pub use config::{EngineConfig, ValidatorOptions};
pub use context::ValidationContext;
pub use instance::{is_system_property, Relationship, Resource, Value};
pub use node::Node;
pub use render::render_value;
pub use resource_validator::ResourceValidator;
