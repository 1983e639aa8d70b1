//! `TypeExpr` -> `TypeId` resolution, including namespaced type paths.
//!
//! Two entry points share one recursive core. [`resolve`] is the "one
//! resolution attempt, report what fails" form used once Pass 0 has already
//! brought every struct declaration to a fixed point (signatures, local
//! `var` annotations, casts). [`try_resolve`] is the soft form Pass 0 itself
//! uses while iterating struct declarations: a same-module struct name not
//! yet interned is "not ready yet", not an error, so the caller can retry on
//! the next sweep instead of reporting a spurious diagnostic.
//!
//! Callers pass `type_ctx`/`symtab`/`arena` as separate borrows of a
//! module's fields rather than one `&mut Module`, so a call site can hold
//! `&mut module.type_ctx` and `&module.arena` at once (the array-size branch
//! needs both at the same time, and `Module`'s fields borrow disjointly only
//! when taken directly rather than through a single `&mut Module`).

use jsasta_binder::{ModuleRegistry, SymbolKind, SymbolTableArena, SymbolTableId};
use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_common::span::SourceLocation;
use jsasta_parser::{NodeArena, TypeExpr};
use jsasta_solver::{TypeContext, TypeId};

use crate::consteval::{eval_size_expr, ConstEvalContext, ConstEvalResult};
use crate::error;

enum Resolution {
    Ready(TypeId),
    Waiting,
}

/// Hard resolution: always returns a `TypeId`, falling back to
/// `type_ctx.unknown()` (with a diagnostic, unless the failure was already
/// reported by an earlier Pass 0 sweep) when a name cannot be resolved.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn resolve(
    type_ctx: &mut TypeContext,
    symtab: &SymbolTableArena,
    registry: &ModuleRegistry,
    scope: SymbolTableId,
    arena: &NodeArena,
    type_expr: &TypeExpr,
    loc: &SourceLocation,
    const_ctx: &ConstEvalContext,
    diag: &mut DiagnosticSink,
) -> TypeId {
    match resolve_inner(type_ctx, symtab, registry, scope, arena, type_expr, loc, const_ctx, diag, false) {
        Resolution::Ready(id) => id,
        Resolution::Waiting => type_ctx.unknown(),
    }
}

/// Soft resolution for Pass 0's struct-field iteration: `None` means "retry
/// on a later sweep", not failure.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn try_resolve(
    type_ctx: &mut TypeContext,
    symtab: &SymbolTableArena,
    registry: &ModuleRegistry,
    scope: SymbolTableId,
    arena: &NodeArena,
    type_expr: &TypeExpr,
    loc: &SourceLocation,
    const_ctx: &ConstEvalContext,
    diag: &mut DiagnosticSink,
) -> Option<TypeId> {
    match resolve_inner(type_ctx, symtab, registry, scope, arena, type_expr, loc, const_ctx, diag, true) {
        Resolution::Ready(id) => Some(id),
        Resolution::Waiting => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_inner(
    type_ctx: &mut TypeContext,
    symtab: &SymbolTableArena,
    registry: &ModuleRegistry,
    scope: SymbolTableId,
    arena: &NodeArena,
    type_expr: &TypeExpr,
    loc: &SourceLocation,
    const_ctx: &ConstEvalContext,
    diag: &mut DiagnosticSink,
    soft: bool,
) -> Resolution {
    match type_expr {
        TypeExpr::Primitive(kind) => Resolution::Ready(type_ctx.primitive(*kind)),
        TypeExpr::Named(name) => {
            if let Some(id) = type_ctx.lookup_name(name) {
                return Resolution::Ready(id);
            }
            if soft {
                return Resolution::Waiting;
            }
            // Pass 0 already reports unresolvable struct names; a later
            // pass seeing the same miss treats it as permanently Unknown
            // rather than re-diagnosing it.
            Resolution::Ready(type_ctx.unknown())
        }
        TypeExpr::Namespaced(ns, member) => {
            let Some(symbol_id) = symtab.lookup(scope, ns) else {
                diag.push(error::unresolved_namespaced_type(loc.clone(), ns, member));
                return Resolution::Ready(type_ctx.unknown());
            };
            let entry = symtab.get(symbol_id);
            let (SymbolKind::NamespaceImport, Some(target_id)) = (entry.kind, entry.imported_module) else {
                diag.push(error::unresolved_namespaced_type(loc.clone(), ns, member));
                return Resolution::Ready(type_ctx.unknown());
            };
            let target_module = registry.get(target_id);
            match target_module.type_ctx.lookup_name(member) {
                // Cross-module type references hold the *foreign* TypeId
                // directly rather than re-interning a copy — a deliberate
                // exception to "never reference a type from a different
                // TypeContext" (see DESIGN.md).
                Some(foreign_id) => Resolution::Ready(foreign_id),
                None => {
                    diag.push(error::unresolved_namespaced_type(loc.clone(), ns, member));
                    Resolution::Ready(type_ctx.unknown())
                }
            }
        }
        TypeExpr::Array(inner, size_expr) => {
            let inner_id = match resolve_inner(type_ctx, symtab, registry, scope, arena, inner, loc, const_ctx, diag, soft) {
                Resolution::Ready(id) => id,
                Resolution::Waiting => return Resolution::Waiting,
            };
            let size = match size_expr {
                None => None,
                Some(node) => match eval_size_expr(const_ctx, arena, *node) {
                    ConstEvalResult::Success(n) => Some(n as u64),
                    ConstEvalResult::Waiting(..) if soft => return Resolution::Waiting,
                    ConstEvalResult::Waiting(wait_loc, name) => {
                        diag.push(error::unresolved_const(wait_loc, &name));
                        Some(0)
                    }
                    result @ (ConstEvalResult::Cycle(..) | ConstEvalResult::Error(..)) => {
                        diag.push(error::const_eval_diagnostic(&result));
                        Some(0)
                    }
                },
            };
            Resolution::Ready(type_ctx.intern_array(inner_id, size))
        }
        TypeExpr::Ref(inner, mutable) => {
            let inner_id = match resolve_inner(type_ctx, symtab, registry, scope, arena, inner, loc, const_ctx, diag, soft) {
                Resolution::Ready(id) => id,
                Resolution::Waiting => return Resolution::Waiting,
            };
            Resolution::Ready(type_ctx.intern_ref(inner_id, *mutable))
        }
    }
}
