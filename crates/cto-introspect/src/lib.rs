//! # cto-introspect: Declaration Graph & Namespace Resolution
//!
//! Turns per-namespace declaration records into an immutable declaration
//! graph and resolves type names across namespaces.
//!
//! ## Components
//!
//! - [`Declaration`] / [`Property`]: the passive declaration graph. Built
//!   once from records and read-only afterwards.
//! - [`ModelFile`]: the resolver for one namespace: primitive, then local,
//!   then imported lookup.
//! - [`ModelRegistry`]: lookup of model files by namespace. Every
//!   cross-namespace reference goes through it by name.
//! - [`ModelManager`]: the owning in-memory registry, with eager or deferred
//!   import validation.
//! - [`hierarchy`]: super-type chains, inherited properties and nominal
//!   assignability.
//!
//! ## Crate Policy
//!
//! - Depends only on `cto-core` internally.
//! - Nothing here knows about data instances; that is `cto-validate`.
//! - Schema errors are `cto_core::ModelError` and are fatal to the namespace
//!   that raised them.

pub mod declaration;
pub mod hierarchy;
pub mod model_file;
pub mod model_manager;
pub mod property;
pub mod record;
pub mod registry;
pub mod validator;

pub use declaration::{Declaration, DeclarationKind};
pub use model_file::ModelFile;
pub use model_manager::{ImportValidation, ModelManager, ModelManagerOptions};
pub use property::{Property, PropertyKind};
pub use record::{DeclarationRecord, NamespaceRecord, PropertyRecord, RangeRecord, ValidatorRecord};
pub use registry::{ModelRegistry, TypeRef};
pub use validator::{FieldValidator, Scalar};
