//! # Type Hierarchy Queries
//!
//! Single-inheritance queries over declarations: the super-type chain, the
//! effective property list (own first, then inherited), and nominal
//! assignability.
//!
//! Each hop of a super-type chain is resolved through the namespace that
//! declared the subtype, so an `extends` naming an imported type follows the
//! import. A malformed model can contain an inheritance cycle when validation
//! is deferred; every walk here stops at the first repeated declaration.

use std::collections::HashSet;

use cto_core::names;

use crate::declaration::Declaration;
use crate::property::Property;
use crate::registry::ModelRegistry;

/// The direct super type of `decl`, if it has one and it resolves.
pub fn super_type<'r, R>(registry: &'r R, decl: &Declaration) -> Option<&'r Declaration>
where
    R: ModelRegistry + ?Sized,
{
    let super_name = decl.super_type()?;
    let fqn = registry
        .model_file(decl.namespace())?
        .get_fully_qualified_type_name(registry, super_name)?;
    registry.get_type(&fqn)
}

/// All super types of `decl`, nearest first.
pub fn super_types<'r, R>(registry: &'r R, decl: &Declaration) -> Vec<&'r Declaration>
where
    R: ModelRegistry + ?Sized,
{
    let mut seen = HashSet::from([decl.fully_qualified_name()]);
    let mut chain = Vec::new();
    let mut next = super_type(registry, decl);
    while let Some(parent) = next {
        if !seen.insert(parent.fully_qualified_name()) {
            break;
        }
        chain.push(parent);
        next = super_type(registry, parent);
    }
    chain
}

/// True if following super types from `decl` leads back to a declaration
/// already on the chain.
pub fn has_cyclic_inheritance<R>(registry: &R, decl: &Declaration) -> bool
where
    R: ModelRegistry + ?Sized,
{
    let mut seen = HashSet::from([decl.fully_qualified_name()]);
    let mut next = super_type(registry, decl);
    while let Some(parent) = next {
        if !seen.insert(parent.fully_qualified_name()) {
            return true;
        }
        next = super_type(registry, parent);
    }
    false
}

/// Own properties of `decl` followed by those of each super type.
pub fn properties<'a, R>(registry: &'a R, decl: &'a Declaration) -> Vec<&'a Property>
where
    R: ModelRegistry + ?Sized,
{
    let mut result: Vec<&Property> = decl.own_properties().iter().collect();
    for parent in super_types(registry, decl) {
        result.extend(parent.own_properties());
    }
    result
}

/// The property called `name` on `decl` or its nearest super type declaring it.
pub fn property<'a, R>(registry: &'a R, decl: &'a Declaration, name: &str) -> Option<&'a Property>
where
    R: ModelRegistry + ?Sized,
{
    decl.own_property(name).or_else(|| {
        super_types(registry, decl)
            .into_iter()
            .find_map(|parent| parent.own_property(name))
    })
}

/// The identifying field name of `decl`, looking up the super-type chain.
pub fn identifier_field<'a, R>(registry: &'a R, decl: &'a Declaration) -> Option<&'a str>
where
    R: ModelRegistry + ?Sized,
{
    decl.id_field().or_else(|| {
        super_types(registry, decl)
            .into_iter()
            .find_map(|parent| parent.id_field())
    })
}

/// True if a value of type `type_name` may be stored where `declared_type`
/// is expected: the names are equal, or `declared_type` is on the super-type
/// chain of `type_name`. Both names are fully qualified. Primitives are only
/// assignable to themselves.
pub fn is_assignable_to<R>(registry: &R, type_name: &str, declared_type: &str) -> bool
where
    R: ModelRegistry + ?Sized,
{
    if type_name == declared_type {
        return true;
    }
    if names::is_primitive_type(type_name) || names::is_primitive_type(declared_type) {
        return false;
    }
    let Some(decl) = registry.get_type(type_name) else {
        return false;
    };
    super_types(registry, decl)
        .iter()
        .any(|parent| parent.fully_qualified_name() == declared_type)
}
