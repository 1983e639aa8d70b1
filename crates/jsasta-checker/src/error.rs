//! Type-inference diagnostic helpers.

use jsasta_common::diagnostics::{codes, Diagnostic};
use jsasta_common::span::SourceLocation;

use crate::consteval::ConstEvalResult;

#[must_use]
pub fn undefined_identifier(loc: SourceLocation, name: &str) -> Diagnostic {
    Diagnostic::error(codes::TYPE_UNDEFINED_IDENTIFIER, loc, format!("cannot find `{name}` in this scope"))
}

#[must_use]
pub fn type_mismatch(loc: SourceLocation, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(codes::TYPE_MISMATCH, loc, format!("expected type `{expected}`, found `{found}`"))
}

#[must_use]
pub fn unknown_property(loc: SourceLocation, property: &str, type_name: &str) -> Diagnostic {
    Diagnostic::error(codes::TYPE_UNKNOWN_PROPERTY, loc, format!("no property `{property}` on `{type_name}`"))
}

#[must_use]
pub fn missing_field(loc: SourceLocation, field: &str, struct_name: &str) -> Diagnostic {
    Diagnostic::error(
        codes::TYPE_MISSING_FIELD,
        loc,
        format!("missing field `{field}` in initializer for `{struct_name}` (no default value)"),
    )
}

#[must_use]
pub fn trait_not_implemented(loc: SourceLocation, trait_name: &str, type_name: &str) -> Diagnostic {
    Diagnostic::error(
        codes::TYPE_TRAIT_NOT_IMPLEMENTED,
        loc,
        format!("`{type_name}` does not implement `{trait_name}`"),
    )
}

#[must_use]
pub fn method_not_found(loc: SourceLocation, method: &str, type_name: &str) -> Diagnostic {
    Diagnostic::error(codes::TYPE_METHOD_NOT_FOUND, loc, format!("no method `{method}` on `{type_name}`"))
}

#[must_use]
pub fn not_callable(loc: SourceLocation, type_name: &str) -> Diagnostic {
    Diagnostic::error(codes::TYPE_NOT_CALLABLE, loc, format!("`{type_name}` is not callable"))
}

#[must_use]
pub fn deep_namespace_path(loc: SourceLocation) -> Diagnostic {
    Diagnostic::error(
        codes::TYPE_DEEP_NAMESPACE_PATH,
        loc,
        "namespaced type paths may have at most one `.`",
    )
}

#[must_use]
pub fn unresolved_namespaced_type(loc: SourceLocation, namespace: &str, member: &str) -> Diagnostic {
    Diagnostic::error(
        codes::TYPE_UNRESOLVED_NAMESPACED_TYPE,
        loc,
        format!("`{namespace}.{member}` does not name an exported type"),
    )
}

#[must_use]
pub fn argument_mismatch(loc: SourceLocation, func_name: &str, expected: usize, found: usize) -> Diagnostic {
    Diagnostic::error(
        codes::TYPE_ARGUMENT_MISMATCH,
        loc,
        format!("`{func_name}` expects {expected} argument(s), found {found}"),
    )
}

#[must_use]
pub fn delete_non_ref(loc: SourceLocation) -> Diagnostic {
    Diagnostic::error(codes::TYPE_DELETE_NON_REF, loc, "`delete` requires a `ref` value")
}

/// A struct field's declared type never became resolvable across every
/// Pass 0 sweep (struct declarations iterate to a fixed point the same way
/// const declarations do).
#[must_use]
pub fn unresolved_struct_field_type(loc: SourceLocation, field: &str, struct_name: &str) -> Diagnostic {
    Diagnostic::error(
        codes::TYPE_MISMATCH,
        loc,
        format!("could not resolve the type of field `{field}` on `{struct_name}`"),
    )
}

#[must_use]
pub fn unresolved_const(loc: SourceLocation, name: &str) -> Diagnostic {
    Diagnostic::error(
        codes::CONST_EVAL_UNRESOLVED,
        loc,
        format!("could not resolve the constant expression for `{name}` (cyclic or missing dependency)"),
    )
}

/// Lower a non-`Success` [`ConstEvalResult`] into the matching diagnostic
/// code. Panics on `Success`/`Waiting` —
/// callers only reach here once a sweep has stalled or genuinely failed.
#[must_use]
pub fn const_eval_diagnostic(result: &ConstEvalResult) -> Diagnostic {
    match result {
        ConstEvalResult::Cycle(loc, msg) => Diagnostic::error(codes::CONST_EVAL_UNRESOLVED, loc.clone(), msg.clone()),
        ConstEvalResult::Error(loc, msg) => {
            let code = classify_const_error(msg);
            Diagnostic::error(code, loc.clone(), msg.clone())
        }
        ConstEvalResult::Success(_) | ConstEvalResult::Waiting(..) => {
            unreachable!("const_eval_diagnostic called on a resolvable result")
        }
    }
}

fn classify_const_error(msg: &str) -> u32 {
    if msg.contains("not a compile-time constant") {
        codes::CONST_EVAL_NOT_CONST
    } else if msg.contains("division") || msg.contains("modulo") {
        codes::CONST_EVAL_DIV_BY_ZERO
    } else if msg.contains("positive integer") {
        codes::CONST_EVAL_NON_POSITIVE
    } else if msg.contains("unsupported") || msg.contains("only + - * / %") {
        codes::CONST_EVAL_UNSUPPORTED
    } else {
        codes::CONST_EVAL_TYPE_MISMATCH
    }
}
