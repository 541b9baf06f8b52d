//! # cto-core: Foundational Types for the CTO Modeling Stack
//!
//! This crate is the leaf of the workspace. It defines the vocabulary every
//! other crate shares: how fully-qualified type names are split and joined,
//! which type names are primitive, and the two error families raised while
//! loading a model (`ModelError`) or checking data against it
//! (`ValidationError`).
//!
//! ## Key Design Principles
//!
//! 1. **One primitive enum.** `PrimitiveType` has exactly six variants and is
//!    matched exhaustively wherever scalar values are checked.
//!
//! 2. **Names are plain strings, split in one place.** All namespace/short-name
//!    arithmetic goes through [`names`], so a qualified name is always
//!    `<namespace>.<ShortName>` with the namespace being everything before the
//!    last dot.
//!
//! 3. **Errors carry context, not prose.** Every error variant keeps the
//!    structured fields (resource identifier, property, expected type, rendered
//!    value) so callers can assert on them without parsing messages.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cto-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod names;

pub use error::{CtoError, ModelError, ValidationError};
pub use names::{is_primitive_type, namespace_of, qualify, short_name, PrimitiveType};
