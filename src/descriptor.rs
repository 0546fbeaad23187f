//! Fuzzy method descriptors
//!
//! A fuzzy descriptor is a method descriptor in which every type defined inside
//! the analyzed unit is replaced by a fixed placeholder, so that renaming
//! classes does not change the descriptor. External types and primitives are
//! kept verbatim.
//!
//! Constructors of anonymous inner classes get extra treatment. Some compiler
//! backends pass the superclass of the enclosing class as an additional
//! synthetic argument while others do not; that argument is elided so both
//! builds produce the same descriptor. Constructors of anonymous classes nested
//! in anonymous classes have a compiler-internal shape and are collapsed to
//! [`NESTED_ANONYMOUS_CTOR`].

use crate::hierarchy::{ClassHierarchy, ClassInfo, MethodInfo, TypeRef};
use tracing::trace;

/// Replacement token for internal types
pub const PLACEHOLDER: &str = "X";

/// Descriptor for constructors of anonymous classes inside anonymous classes
pub const NESTED_ANONYMOUS_CTOR: &str = "(X)V";

/// Compute the fuzzy descriptor of `method` declared in `class`.
///
/// Total: falls back to the plain fuzzy descriptor whenever a normalization
/// heuristic does not apply.
pub fn fuzzy_descriptor(method: &MethodInfo, class: &ClassInfo, hierarchy: &ClassHierarchy) -> String {
    if let Some(desc) = normalize_anonymous_constructor(method, class, hierarchy) {
        trace!(
            method = %method.signature(class),
            fuzzy = %desc,
            "anonymous constructor normalized"
        );
        return desc;
    }

    let mut desc = String::from("(");
    for param in &method.parameter_types {
        desc.push_str(render(param, hierarchy));
    }
    desc.push(')');
    desc.push_str(render(&method.return_type, hierarchy));
    desc
}

fn render<'a>(ty: &'a TypeRef, hierarchy: &ClassHierarchy) -> &'a str {
    if hierarchy.is_internal(ty) {
        PLACEHOLDER
    } else {
        ty.as_str()
    }
}

/// Returns `None` if no normalization applies.
fn normalize_anonymous_constructor(
    method: &MethodInfo,
    class: &ClassInfo,
    hierarchy: &ClassHierarchy,
) -> Option<String> {
    if !method.is_constructor() {
        return None;
    }
    let params = &method.parameter_types;

    if class.is_anonymous_in_anonymous() && !params.is_empty() {
        return Some(NESTED_ANONYMOUS_CTOR.to_string());
    }

    // needs the enclosing instance and the injected superclass reference
    if !class.is_anonymous() || params.len() < 2 {
        return None;
    }
    if !hierarchy.is_internal(&params[0]) || !hierarchy.is_internal(&params[1]) {
        return None;
    }

    let enclosing_name = class.enclosing_class_name()?;
    let enclosing = match hierarchy.lookup(enclosing_name) {
        Some(c) => c,
        None => {
            trace!("Could not look up enclosing class {}", enclosing_name);
            return None;
        }
    };
    let enclosing_super = enclosing.superclass.as_deref()?;

    let first = params[0].class_name()?;
    let second = params[1].class_name()?;
    if first != enclosing_name || second != enclosing_super {
        return None;
    }

    // Dropping either of the two leading arguments is equivalent since both
    // render as the placeholder; the enclosing instance is dropped here.
    let mut desc = String::from("(");
    for param in &params[1..] {
        desc.push_str(render(param, hierarchy));
    }
    desc.push_str(")V");
    Some(desc)
}
