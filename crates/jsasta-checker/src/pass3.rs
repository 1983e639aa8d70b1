//! Pass 3/4 — analyze call sites: resolve the callee, type its arguments,
//! find-or-create the specialization they demand, and recurse into the
//! cloned body right away so the call expression's own type is available on
//! first creation rather than waiting for the driver's next fixed-point
//! sweep.

use std::cell::Cell;

use jsasta_binder::{ModuleId, SymbolEntry, SymbolKind, SymbolTableId};
use jsasta_common::span::SourceLocation;
use jsasta_parser::{NodeArena, NodeId, NodeKind};
use jsasta_solver::{SpecializationId, SpecializedBody, TypeContext, TypeData, TypeId};

use crate::clone_body;
use crate::consteval::ConstEvalContext;
use crate::error;
use crate::pass2::{infer_expr, infer_stmt, type_name, InferCtx};
use crate::state::CheckState;

/// Borrows the clone out of its `RefCell` for the duration of `f`, so `ctx`
/// stays freely mutable (creating further specializations, say) while the
/// walk has a plain `&NodeArena` to read. See [`crate::pass1`] for why the
/// body lives behind a `RefCell` in the first place.
pub(crate) fn with_cloned_arena(ctx: &mut InferCtx, spec_id: SpecializationId, f: impl FnOnce(&mut InferCtx, &NodeArena, NodeId)) {
    let body = std::mem::take(&mut *ctx.specializations.get(spec_id).specialized_body.borrow_mut());
    if let SpecializedBody::Cloned { arena, root } = body {
        f(ctx, &arena, root);
        *ctx.specializations.get(spec_id).specialized_body.borrow_mut() = SpecializedBody::Cloned { arena, root };
    }
}

pub(crate) fn analyze_call(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: SymbolTableId,
    call_node: NodeId,
    callee: NodeId,
    args: Vec<NodeId>,
) -> TypeId {
    let loc = arena[call_node].loc.clone();

    if let NodeKind::MemberAccess { object, property } = &arena[callee].kind {
        if let NodeKind::Identifier { name } = &arena[*object].kind {
            if let Some(sym_id) = ctx.symtab.lookup(scope, name) {
                let entry = ctx.symtab.get(sym_id);
                if entry.kind == SymbolKind::NamespaceImport {
                    return match entry.imported_module {
                        Some(target_id) => analyze_cross_module_call(ctx, const_ctx, arena, scope, &loc, target_id, property, &args),
                        None => {
                            ctx.diag.push(error::unresolved_namespaced_type(loc.clone(), name, property));
                            ctx.type_ctx.unknown()
                        }
                    };
                }
            }
        }
        // Not a namespace: a member expression that is not also a
        // recognized static/instance method dispatch is not callable here.
        // `MethodCall` (handled below) is how the parser represents ordinary
        // `receiver.method(args)` syntax; a bare `Call` whose callee is a
        // `MemberAccess` falls outside that, e.g. calling a function stored
        // in a struct field.
        ctx.diag.push(error::not_callable(loc.clone(), property));
        for &a in &args {
            infer_expr(ctx, const_ctx, arena, scope, a, None);
        }
        return ctx.type_ctx.unknown();
    }

    let NodeKind::Identifier { name } = arena[callee].kind.clone() else {
        ctx.diag.push(error::not_callable(loc.clone(), "expression"));
        for &a in &args {
            infer_expr(ctx, const_ctx, arena, scope, a, None);
        }
        return ctx.type_ctx.unknown();
    };

    analyze_local_call(ctx, const_ctx, arena, scope, &loc, &name, &args, None)
}

pub(crate) fn analyze_method_call(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: SymbolTableId,
    call_node: NodeId,
    receiver: NodeId,
    method: String,
    args: Vec<NodeId>,
) -> TypeId {
    let loc = arena[call_node].loc.clone();
    let receiver_ty = infer_expr(ctx, const_ctx, arena, scope, receiver, None);
    let receiver_unwrapped = ctx.type_ctx.unwrap_ref(receiver_ty);

    let struct_name = match ctx.type_ctx.get(receiver_unwrapped).clone() {
        TypeData::Object(object) => object.name,
        _ => {
            ctx.diag.push(error::method_not_found(loc.clone(), &method, &type_name(ctx.type_ctx, receiver_unwrapped)));
            for &a in &args {
                infer_expr(ctx, const_ctx, arena, scope, a, None);
            }
            return ctx.type_ctx.unknown();
        }
    };

    let qualified = format!("{struct_name}.{method}");
    if !ctx.check_state.fn_decls.contains_key(&qualified) {
        ctx.diag.push(error::method_not_found(loc.clone(), &method, &struct_name));
        for &a in &args {
            infer_expr(ctx, const_ctx, arena, scope, a, None);
        }
        return ctx.type_ctx.unknown();
    }

    let self_ty = ctx.type_ctx.intern_ref(receiver_unwrapped, true);
    analyze_local_call(ctx, const_ctx, arena, scope, &loc, &qualified, &args, Some(self_ty))
}

#[allow(clippy::too_many_arguments)]
fn analyze_local_call(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: SymbolTableId,
    loc: &SourceLocation,
    name: &str,
    args: &[NodeId],
    self_arg: Option<TypeId>,
) -> TypeId {
    let unknown = ctx.type_ctx.unknown();

    let Some(info) = ctx.check_state.fn_decls.get(name).copied() else {
        ctx.diag.push(error::undefined_identifier(loc.clone(), name));
        for &a in args {
            infer_expr(ctx, const_ctx, arena, scope, a, None);
        }
        return unknown;
    };
    let Some(func_ty_id) = ctx.type_ctx.lookup_name(name) else {
        return unknown;
    };
    let TypeData::Function(func) = ctx.type_ctx.get(func_ty_id).clone() else {
        return unknown;
    };

    let declared_rest: Vec<TypeId> =
        if info.self_type.is_some() { func.param_types.iter().skip(1).copied().collect() } else { func.param_types.clone() };

    if !func.variadic && args.len() != declared_rest.len() {
        ctx.diag.push(error::argument_mismatch(loc.clone(), name, declared_rest.len(), args.len()));
    }

    let mut arg_types = Vec::with_capacity(args.len());
    for (i, &arg) in args.iter().enumerate() {
        let expected = declared_rest.get(i).copied().filter(|&t| t != unknown);
        let arg_ty = infer_expr(ctx, const_ctx, arena, scope, arg, expected);
        if let Some(expected_ty) = expected {
            if arg_ty != expected_ty && unknown != arg_ty && !ctx.type_ctx.numeric_promotion_allowed(arg_ty, expected_ty) {
                ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, expected_ty), &type_name(ctx.type_ctx, arg_ty)));
            }
        }
        arg_types.push(arg_ty);
    }

    let mut final_params = Vec::with_capacity(arg_types.len() + 1);
    if let Some(self_ty) = self_arg {
        final_params.push(self_ty);
    }
    for (i, arg_ty) in arg_types.into_iter().enumerate() {
        let declared = declared_rest.get(i).copied().unwrap_or(unknown);
        final_params.push(if declared != unknown { declared } else { arg_ty });
    }

    if let Some(existing) = ctx.specializations.find_by_types(name, &final_params) {
        return ctx.specializations.get(existing).return_type.get().unwrap_or(unknown);
    }

    let spec_id = ctx.specializations.add_by_types(ctx.type_ctx, name, final_params.clone());

    if info.is_external || func.variadic {
        let ret = if func.return_type != unknown { func.return_type } else { unknown };
        ctx.specializations.get(spec_id).return_type.set(Some(ret));
        return ret;
    }

    let NodeKind::FunctionDecl { body: Some(body), params, .. } = ctx.module_arena[info.node].kind.clone() else {
        ctx.specializations.get(spec_id).return_type.set(Some(unknown));
        return unknown;
    };

    let (cloned_arena, cloned_root) = clone_body::clone_subtree(ctx.module_arena, body);
    let child_scope = ctx.symtab.new_scope(Some(ctx.module_scope));
    let offset = if info.self_type.is_some() { 1 } else { 0 };
    if info.self_type.is_some() {
        ctx.symtab.declare(
            child_scope,
            SymbolEntry {
                name: "self".to_string(),
                type_id: Cell::new(final_params[0]),
                is_const: true,
                kind: SymbolKind::Parameter,
                declaring_node: info.node,
                param_index: Some(0),
                imported_module: None,
            },
        );
    }
    for (i, param) in params.iter().enumerate() {
        ctx.symtab.declare(
            child_scope,
            SymbolEntry {
                name: param.name.clone(),
                type_id: Cell::new(final_params[i + offset]),
                is_const: false,
                kind: SymbolKind::Parameter,
                declaring_node: info.node,
                param_index: Some(u32::try_from(i + offset).unwrap_or(u32::MAX)),
                imported_module: None,
            },
        );
    }

    *ctx.specializations.get(spec_id).specialized_body.borrow_mut() = SpecializedBody::Cloned { arena: cloned_arena, root: cloned_root };
    ctx.check_state.note_specialization(spec_id, child_scope);

    let mut inferred_return = unknown;
    with_cloned_arena(ctx, spec_id, |ctx, body_arena, body_root| {
        infer_stmt(ctx, const_ctx, body_arena, child_scope, body_root);
        if let Some(found) = extract_return_type(ctx.type_ctx, body_arena, body_root) {
            inferred_return = found;
        }
    });

    let declared_return = func.return_type;
    let final_return = if declared_return != unknown {
        if inferred_return != unknown && inferred_return != declared_return && !ctx.type_ctx.numeric_promotion_allowed(inferred_return, declared_return)
        {
            ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, declared_return), &type_name(ctx.type_ctx, inferred_return)));
        }
        declared_return
    } else {
        inferred_return
    };
    ctx.specializations.get(spec_id).return_type.set(Some(final_return));
    final_return
}

/// Cross-module call through a namespace import: resolve the exported
/// function and use its module's `TypeContext` for the specialization.
/// [`ModuleRegistry::take_module`] checks the callee's module out so it can
/// be mutated (a not-yet-typed callee still needs a specialization created
/// in *its own* `TypeContext`) while `ctx.registry` stays free for namespace
/// resolution inside the cloned body itself.
#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
fn analyze_cross_module_call(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: SymbolTableId,
    loc: &SourceLocation,
    target_id: ModuleId,
    func_name: &str,
    args: &[NodeId],
) -> TypeId {
    let local_unknown = ctx.type_ctx.unknown();
    let arg_types: Vec<TypeId> = args.iter().map(|&a| infer_expr(ctx, const_ctx, arena, scope, a, None)).collect();

    let mut target = ctx.registry.take_module(target_id);

    let Some(&decl_node) = target.exported_names.get(func_name) else {
        ctx.registry.put_module(target_id, target);
        ctx.diag.push(error::unresolved_namespaced_type(loc.clone(), func_name, func_name));
        return local_unknown;
    };
    let Some(func_ty_id) = target.type_ctx.lookup_name(func_name) else {
        ctx.registry.put_module(target_id, target);
        return local_unknown;
    };
    let TypeData::Function(func) = target.type_ctx.get(func_ty_id).clone() else {
        ctx.registry.put_module(target_id, target);
        return local_unknown;
    };

    if !func.variadic && arg_types.len() != func.param_types.len() {
        ctx.diag.push(error::argument_mismatch(loc.clone(), func_name, func.param_types.len(), arg_types.len()));
    }

    let translated_args: Vec<TypeId> = arg_types.iter().map(|&t| translate_type(&mut target.type_ctx, ctx.type_ctx, t)).collect();
    let target_unknown = target.type_ctx.unknown();
    let mut final_params = Vec::with_capacity(translated_args.len());
    for (i, &arg_ty) in translated_args.iter().enumerate() {
        let declared = func.param_types.get(i).copied().unwrap_or(target_unknown);
        final_params.push(if declared != target_unknown { declared } else { arg_ty });
    }

    if let Some(existing) = target.specializations.find_by_types(func_name, &final_params) {
        let ret = target.specializations.get(existing).return_type.get().unwrap_or(target_unknown);
        let result = translate_type(ctx.type_ctx, &target.type_ctx, ret);
        ctx.registry.put_module(target_id, target);
        return result;
    }

    let spec_id = target.specializations.add_by_types(&target.type_ctx, func_name, final_params.clone());

    let NodeKind::FunctionDecl { body, params, is_external, is_variadic, .. } = target.arena[decl_node].kind.clone() else {
        ctx.registry.put_module(target_id, target);
        return local_unknown;
    };

    if is_external || is_variadic || body.is_none() {
        let ret = if func.return_type != target_unknown { func.return_type } else { target_unknown };
        target.specializations.get(spec_id).return_type.set(Some(ret));
        let result = translate_type(ctx.type_ctx, &target.type_ctx, ret);
        ctx.registry.put_module(target_id, target);
        return result;
    }
    let body = body.unwrap();

    let (cloned_arena, cloned_root) = clone_body::clone_subtree(&target.arena, body);
    let child_scope = target.symtab.new_scope(Some(target.module_scope));
    for (i, param) in params.iter().enumerate() {
        target.symtab.declare(
            child_scope,
            SymbolEntry {
                name: param.name.clone(),
                type_id: Cell::new(final_params[i]),
                is_const: false,
                kind: SymbolKind::Parameter,
                declaring_node: decl_node,
                param_index: Some(u32::try_from(i).unwrap_or(u32::MAX)),
                imported_module: None,
            },
        );
    }

    let empty_const_inits = Default::default();
    let empty_non_const = Default::default();
    let target_const_ctx =
        ConstEvalContext { const_inits: &empty_const_inits, non_const_names: &empty_non_const, max_depth: ctx.options.max_const_eval_recursion };
    let mut target_check_state = CheckState::new();
    let mut inferred_return = target.type_ctx.unknown();
    {
        let mut inner = InferCtx {
            type_ctx: &mut target.type_ctx,
            trait_registry: &mut target.trait_registry,
            specializations: &mut target.specializations,
            symtab: &mut target.symtab,
            module_arena: &target.arena,
            module_scope: target.module_scope,
            registry: ctx.registry,
            check_state: &mut target_check_state,
            diag: ctx.diag,
            options: ctx.options,
        };
        infer_stmt(&mut inner, &target_const_ctx, &cloned_arena, child_scope, cloned_root);
        if let Some(found) = extract_return_type(inner.type_ctx, &cloned_arena, cloned_root) {
            inferred_return = found;
        }
    }

    let declared_return = func.return_type;
    let final_return = if declared_return != target_unknown { declared_return } else { inferred_return };

    *target.specializations.get(spec_id).specialized_body.borrow_mut() = SpecializedBody::Cloned { arena: cloned_arena, root: cloned_root };
    target.specializations.get(spec_id).return_type.set(Some(final_return));

    let result = translate_type(ctx.type_ctx, &target.type_ctx, final_return);
    ctx.registry.put_module(target_id, target);
    result
}

/// Reconstructs `ty` (owned by `src`) inside `dst` by walking its structure,
/// since a `TypeId` is only meaningful within the `TypeContext` that interned
/// it. Primitives land on the same id in both contexts —
/// every `TypeContext::new()` interns `ALL_PRIMITIVES` in the same fixed
/// order — but arrays/refs/objects must be re-interned structurally.
fn translate_type(dst: &mut TypeContext, src: &TypeContext, ty: TypeId) -> TypeId {
    match src.get(ty).clone() {
        TypeData::Primitive(kind) => dst.primitive(kind),
        TypeData::Unknown => dst.unknown(),
        TypeData::Array { element, size } => {
            let translated = translate_type(dst, src, element);
            dst.intern_array(translated, size)
        }
        TypeData::Ref { target, mutable } => {
            let translated = translate_type(dst, src, target);
            dst.intern_ref(translated, mutable)
        }
        TypeData::Object(object) => dst.lookup_name(&object.name).unwrap_or_else(|| dst.unknown()),
        TypeData::Function(_) => dst.unknown(),
    }
}

/// Scans a function body's `return` statements for the type annotated on
/// each returned expression, settling on the first non-`unknown` type found
/// (mismatches between multiple return sites are left to later diagnostics;
/// this is only ever used to fill in a specialization's return type when no
/// declared annotation pins it down).
fn extract_return_type(type_ctx: &TypeContext, arena: &NodeArena, root: NodeId) -> Option<TypeId> {
    let mut found = None;
    collect_returns(arena, root, &mut |ty| {
        if found.is_none() || found == Some(type_ctx.unknown()) {
            found = Some(ty);
        }
    });
    found
}

fn collect_returns(arena: &NodeArena, node: NodeId, f: &mut impl FnMut(TypeId)) {
    match &arena[node].kind {
        NodeKind::Program { statements } | NodeKind::Block { statements } => {
            for &s in statements {
                collect_returns(arena, s, f);
            }
        }
        NodeKind::If { then_branch, else_branch, .. } => {
            collect_returns(arena, *then_branch, f);
            if let Some(e) = else_branch {
                collect_returns(arena, *e, f);
            }
        }
        NodeKind::For { body, .. } | NodeKind::While { body, .. } => collect_returns(arena, *body, f),
        NodeKind::Return { value: Some(v) } => {
            if let Some(raw) = arena[*v].type_id.get() {
                f(TypeId::from_raw(raw));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsasta_solver::PrimitiveKind;

    #[test]
    fn translate_primitive_lines_up_across_fresh_contexts() {
        let src = TypeContext::new();
        let mut dst = TypeContext::new();
        let translated = translate_type(&mut dst, &src, src.int());
        assert_eq!(translated, dst.int());
    }

    #[test]
    fn translate_array_reconstructs_structurally() {
        let mut src = TypeContext::new();
        let mut dst = TypeContext::new();
        let src_arr = src.intern_array(src.primitive(PrimitiveKind::Int), Some(4));
        let translated = translate_type(&mut dst, &src, src_arr);
        let expected = dst.intern_array(dst.primitive(PrimitiveKind::Int), Some(4));
        assert_eq!(translated, expected);
    }
}
