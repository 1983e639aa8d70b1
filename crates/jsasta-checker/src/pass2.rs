//! Passes 2 and 5 — infer literal/local types and propagate with
//! specializations.
//!
//! Both passes are the same recursive-descent walk over expressions and
//! statements: the first run leaves every `Call`/`MethodCall` node's type at
//! `unknown` until [`crate::pass3`] (invoked inline, from right here, once a
//! call's arguments are typed) creates or finds its specialization; a later
//! fixed-point iteration's re-walk is simply running [`infer_module`] again
//! now that more specializations exist, so a `var` whose initializer called a
//! not-yet-resolved recursive function sees the real return type the second
//! time around. There is no separate code path for the later pass:
//! re-invoking this walk from the driver's loop body *is* that pass.

use jsasta_binder::{ModuleRegistry, SymbolKind};
use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_common::options::CompileOptions;
use jsasta_common::span::SourceLocation;
use jsasta_parser::{BinaryOp, NodeArena, NodeId, NodeKind, UnaryOp};
use jsasta_solver::{BuiltinTrait, SpecializationStore, TraitRegistry, TypeContext, TypeData, TypeId};

use crate::consteval::ConstEvalContext;
use crate::error;
use crate::resolve_type;
use crate::state::CheckState;

/// Everything a single module's inference walk needs, borrowed from the
/// owning [`jsasta_binder::Module`] field-by-field (rather than through one
/// `&mut Module`) so a call site can hold `&mut module.type_ctx` alongside
/// `&module.arena` — see [`resolve_type`]'s module doc for why.
pub(crate) struct InferCtx<'m> {
    pub type_ctx: &'m mut TypeContext,
    pub trait_registry: &'m mut TraitRegistry,
    pub specializations: &'m mut SpecializationStore,
    pub symtab: &'m mut jsasta_binder::SymbolTableArena,
    /// The module's own (uncloned) AST, used to read struct-field defaults
    /// and original function bodies regardless of which arena (module-level
    /// or a cloned specialization body) the current walk is over.
    pub module_arena: &'m NodeArena,
    pub module_scope: jsasta_binder::SymbolTableId,
    pub registry: &'m mut ModuleRegistry,
    pub check_state: &'m mut CheckState,
    pub diag: &'m mut DiagnosticSink,
    pub options: &'m CompileOptions,
}

/// Walks every top-level statement, then every noted specialization's cloned
/// body, re-inferring each from scratch (literal/local inference on the
/// first pass, propagation across specializations on later iterations).
pub(crate) fn infer_module(ctx: &mut InferCtx, const_ctx: &ConstEvalContext, arena: &NodeArena, root: NodeId) {
    infer_stmt(ctx, const_ctx, arena, ctx.module_scope, root);
    let spec_ids = ctx.check_state.all_specializations.clone();
    for spec_id in spec_ids {
        let Some(&scope) = ctx.check_state.spec_scopes.get(&spec_id) else { continue };
        // The cloned body lives behind a `RefCell` inside `specializations`,
        // but the walk needs `&mut ctx` (it may create further
        // specializations via `pass3::analyze_call`) at the same time as a
        // plain `&NodeArena` borrow of that same body. `with_cloned_arena`
        // takes the arena out of the cell for the walk's duration and puts
        // it back after, so the two borrows never overlap.
        crate::pass3::with_cloned_arena(ctx, spec_id, |ctx, body_arena, body_root| {
            infer_stmt(ctx, const_ctx, body_arena, scope, body_root);
        });
    }
}

pub(crate) fn infer_stmt(ctx: &mut InferCtx, const_ctx: &ConstEvalContext, arena: &NodeArena, scope: jsasta_binder::SymbolTableId, node: NodeId) {
    let loc = arena[node].loc.clone();
    match &arena[node].kind {
        NodeKind::Program { statements } | NodeKind::Block { statements } => {
            for &stmt in statements {
                infer_stmt(ctx, const_ctx, arena, scope, stmt);
            }
        }
        NodeKind::Export { decl } => infer_stmt(ctx, const_ctx, arena, scope, *decl),
        NodeKind::Import { .. } | NodeKind::StructDecl { .. } | NodeKind::FunctionDecl { .. } => {}
        NodeKind::VarDecl { name, init, type_ann, .. } => {
            let declared = type_ann.as_ref().map(|t| {
                resolve_type::resolve(ctx.type_ctx, ctx.symtab, ctx.registry, scope, arena, t, &loc, const_ctx, ctx.diag)
            });
            let init_ty = init.map(|n| infer_expr(ctx, const_ctx, arena, scope, n, declared));
            let final_ty = match (declared, init_ty) {
                (Some(d), Some(i)) => {
                    if d != i && !ctx.type_ctx.numeric_promotion_allowed(i, d) {
                        ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, d), &type_name(ctx.type_ctx, i)));
                    }
                    d
                }
                (Some(d), None) => d,
                (None, Some(i)) => i,
                (None, None) => ctx.type_ctx.unknown(),
            };
            arena[node].type_id.set(Some(final_ty.to_raw()));
            declare_or_update(ctx, scope, name, final_ty, node);
        }
        NodeKind::If { cond, then_branch, else_branch } => {
            infer_expr(ctx, const_ctx, arena, scope, *cond, None);
            infer_stmt(ctx, const_ctx, arena, scope, *then_branch);
            if let Some(else_branch) = else_branch {
                infer_stmt(ctx, const_ctx, arena, scope, *else_branch);
            }
        }
        NodeKind::For { init, cond, step, body } => {
            if let Some(init) = init {
                infer_stmt(ctx, const_ctx, arena, scope, *init);
            }
            if let Some(cond) = cond {
                infer_expr(ctx, const_ctx, arena, scope, *cond, None);
            }
            if let Some(step) = step {
                infer_expr(ctx, const_ctx, arena, scope, *step, None);
            }
            infer_stmt(ctx, const_ctx, arena, scope, *body);
        }
        NodeKind::While { cond, body } => {
            infer_expr(ctx, const_ctx, arena, scope, *cond, None);
            infer_stmt(ctx, const_ctx, arena, scope, *body);
        }
        NodeKind::Break | NodeKind::Continue => {}
        NodeKind::Return { value } => {
            if let Some(value) = value {
                infer_expr(ctx, const_ctx, arena, scope, *value, None);
            }
        }
        NodeKind::ExprStmt { expr } => {
            infer_expr(ctx, const_ctx, arena, scope, *expr, None);
        }
        NodeKind::Error => {}
        _ => {
            infer_expr(ctx, const_ctx, arena, scope, node, None);
        }
    }
}

fn declare_or_update(ctx: &mut InferCtx, scope: jsasta_binder::SymbolTableId, name: &str, ty: TypeId, node: NodeId) {
    if let Some(sym_id) = ctx.symtab.lookup_local(scope, name) {
        ctx.symtab.get(sym_id).type_id.set(ty);
    } else {
        ctx.symtab.declare(
            scope,
            jsasta_binder::SymbolEntry {
                name: name.to_string(),
                type_id: std::cell::Cell::new(ty),
                is_const: matches!(&ctx.module_arena[node].kind, NodeKind::VarDecl { is_const: true, .. }),
                kind: SymbolKind::Variable,
                declaring_node: node,
                param_index: None,
                imported_module: None,
            },
        );
    }
}

#[allow(clippy::too_many_lines)]
pub(crate) fn infer_expr(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    node: NodeId,
    expected: Option<TypeId>,
) -> TypeId {
    let loc = arena[node].loc.clone();
    let result = match &arena[node].kind {
        NodeKind::NumberLiteral { is_float_hint, .. } => {
            if *is_float_hint {
                ctx.type_ctx.double()
            } else if matches!(expected, Some(t) if ctx.type_ctx.numeric_promotion_allowed(ctx.type_ctx.int(), t)) {
                expected.unwrap()
            } else {
                ctx.type_ctx.int()
            }
        }
        NodeKind::StringLiteral { .. } => ctx.type_ctx.string(),
        NodeKind::BoolLiteral { .. } => ctx.type_ctx.bool_(),
        NodeKind::Identifier { name } => match ctx.symtab.lookup(scope, name) {
            Some(sym_id) => {
                let entry = ctx.symtab.get(sym_id);
                arena[node].symbol_id.set(Some(sym_id.to_raw()));
                entry.type_id.get()
            }
            None => {
                ctx.diag.push(error::undefined_identifier(loc.clone(), name));
                ctx.type_ctx.unknown()
            }
        },
        NodeKind::Binary { op, left, right } => infer_binary(ctx, const_ctx, arena, scope, *op, *left, *right, &loc),
        NodeKind::Unary { op, operand } => infer_unary(ctx, const_ctx, arena, scope, *op, *operand, &loc),
        NodeKind::Prefix { operand, .. } | NodeKind::Postfix { operand, .. } => {
            infer_expr(ctx, const_ctx, arena, scope, *operand, None)
        }
        NodeKind::Assign { target, value, .. } => {
            let target_ty = infer_expr(ctx, const_ctx, arena, scope, *target, None);
            let value_ty = infer_expr(ctx, const_ctx, arena, scope, *value, Some(target_ty));
            if target_ty != value_ty && !ctx.type_ctx.numeric_promotion_allowed(value_ty, target_ty) {
                ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, target_ty), &type_name(ctx.type_ctx, value_ty)));
            }
            target_ty
        }
        NodeKind::Call { callee, args } => crate::pass3::analyze_call(ctx, const_ctx, arena, scope, node, *callee, args.clone()),
        NodeKind::MethodCall { receiver, method, args } => {
            crate::pass3::analyze_method_call(ctx, const_ctx, arena, scope, node, *receiver, method.clone(), args.clone())
        }
        NodeKind::MemberAccess { object, property } => infer_member_access(ctx, const_ctx, arena, scope, *object, property, &loc),
        NodeKind::MemberAssignment { object, property, value } => {
            infer_member_assignment(ctx, const_ctx, arena, scope, *object, property, *value, &loc)
        }
        NodeKind::IndexAccess { object, index } => infer_index_access(ctx, const_ctx, arena, scope, *object, *index, &loc),
        NodeKind::IndexAssignment { object, index, value } => {
            infer_index_assignment(ctx, const_ctx, arena, scope, *object, *index, *value, &loc)
        }
        NodeKind::ObjectLiteral { fields } => infer_object_literal(ctx, const_ctx, arena, scope, fields.clone(), expected, &loc),
        NodeKind::ArrayLiteral { elements } => infer_array_literal(ctx, const_ctx, arena, scope, elements.clone(), &loc),
        NodeKind::NewExpr { elem_type, size } => {
            let elem_ty = resolve_type::resolve(ctx.type_ctx, ctx.symtab, ctx.registry, scope, arena, elem_type, &loc, const_ctx, ctx.diag);
            let size_ty = infer_expr(ctx, const_ctx, arena, scope, *size, None);
            if !is_integer(ctx.type_ctx, size_ty) {
                ctx.diag.push(error::type_mismatch(loc.clone(), "int", &type_name(ctx.type_ctx, size_ty)));
            }
            let array_ty = ctx.type_ctx.intern_array(elem_ty, None);
            ctx.type_ctx.intern_ref(array_ty, true)
        }
        NodeKind::DeleteExpr { operand } => {
            let operand_ty = infer_expr(ctx, const_ctx, arena, scope, *operand, None);
            if !ctx.type_ctx.is_ref(operand_ty) {
                ctx.diag.push(error::delete_non_ref(loc.clone()));
            }
            ctx.type_ctx.void()
        }
        NodeKind::RefExpr { operand } => {
            let operand_ty = infer_expr(ctx, const_ctx, arena, scope, *operand, None);
            ctx.type_ctx.intern_ref(operand_ty, true)
        }
        NodeKind::Ternary { cond, then_expr, else_expr } => {
            infer_expr(ctx, const_ctx, arena, scope, *cond, None);
            let then_ty = infer_expr(ctx, const_ctx, arena, scope, *then_expr, expected);
            let else_ty = infer_expr(ctx, const_ctx, arena, scope, *else_expr, expected);
            if then_ty == else_ty {
                then_ty
            } else if ctx.type_ctx.numeric_promotion_allowed(then_ty, else_ty) {
                else_ty
            } else if ctx.type_ctx.numeric_promotion_allowed(else_ty, then_ty) {
                then_ty
            } else {
                ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, then_ty), &type_name(ctx.type_ctx, else_ty)));
                then_ty
            }
        }
        NodeKind::Cast { expr, target } => {
            infer_expr(ctx, const_ctx, arena, scope, *expr, None);
            resolve_type::resolve(ctx.type_ctx, ctx.symtab, ctx.registry, scope, arena, target, &loc, const_ctx, ctx.diag)
        }
        NodeKind::InstanceOf { expr, target } => {
            infer_expr(ctx, const_ctx, arena, scope, *expr, None);
            resolve_type::resolve(ctx.type_ctx, ctx.symtab, ctx.registry, scope, arena, target, &loc, const_ctx, ctx.diag);
            ctx.type_ctx.bool_()
        }
        NodeKind::Error => ctx.type_ctx.unknown(),
        _ => ctx.type_ctx.unknown(),
    };
    arena[node].type_id.set(Some(result.to_raw()));
    result
}

fn infer_binary(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    op: BinaryOp,
    left: NodeId,
    right: NodeId,
    loc: &SourceLocation,
) -> TypeId {
    let lt = infer_expr(ctx, const_ctx, arena, scope, left, None);
    let rt = infer_expr(ctx, const_ctx, arena, scope, right, None);

    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        return ctx.type_ctx.bool_();
    }

    let lt_u = ctx.type_ctx.unwrap_ref(lt);
    let rt_u = ctx.type_ctx.unwrap_ref(rt);

    if op == BinaryOp::Add && is_string_like(ctx.type_ctx, lt_u) && is_string_like(ctx.type_ctx, rt_u) {
        return ctx.type_ctx.string();
    }

    let Some(trait_) = jsasta_solver::operator_to_trait(op) else {
        return ctx.type_ctx.unknown();
    };

    let Some(common) = promote(ctx.type_ctx, lt_u, rt_u) else {
        ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, lt_u), &type_name(ctx.type_ctx, rt_u)));
        return ctx.type_ctx.unknown();
    };

    if !ensure_impl(ctx.type_ctx, ctx.trait_registry, trait_, common, &[common]) {
        ctx.diag.push(error::trait_not_implemented(loc.clone(), trait_.name(), &type_name(ctx.type_ctx, common)));
        return ctx.type_ctx.unknown();
    }

    match trait_ {
        BuiltinTrait::Eq | BuiltinTrait::Ord => ctx.type_ctx.bool_(),
        _ => ctx
            .trait_registry
            .get_assoc_type(trait_, common, &[common], "Output")
            .unwrap_or_else(|| ctx.type_ctx.unknown()),
    }
}

fn infer_unary(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    op: UnaryOp,
    operand: NodeId,
    loc: &SourceLocation,
) -> TypeId {
    let ot = infer_expr(ctx, const_ctx, arena, scope, operand, None);
    let ot_u = ctx.type_ctx.unwrap_ref(ot);
    let trait_ = jsasta_solver::unary_operator_to_trait(op);
    if !ensure_impl(ctx.type_ctx, ctx.trait_registry, trait_, ot_u, &[]) {
        ctx.diag.push(error::trait_not_implemented(loc.clone(), trait_.name(), &type_name(ctx.type_ctx, ot_u)));
        return ctx.type_ctx.unknown();
    }
    ctx.trait_registry.get_assoc_type(trait_, ot_u, &[], "Output").unwrap_or(ot_u)
}

fn infer_member_access(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    object: NodeId,
    property: &str,
    loc: &SourceLocation,
) -> TypeId {
    if let NodeKind::Identifier { name } = &arena[object].kind {
        if let Some(sym_id) = ctx.symtab.lookup(scope, name) {
            let entry = ctx.symtab.get(sym_id);
            if entry.kind == SymbolKind::NamespaceImport {
                let Some(target_id) = entry.imported_module else {
                    ctx.diag.push(error::unresolved_namespaced_type(loc.clone(), name, property));
                    return ctx.type_ctx.unknown();
                };
                let target = ctx.registry.get(target_id);
                return match target.exported_names.get(property) {
                    Some(&decl) => match target.arena[decl].type_id.get() {
                        Some(raw) => TypeId::from_raw(raw),
                        None => target.type_ctx.unknown(),
                    },
                    None => {
                        ctx.diag.push(error::unresolved_namespaced_type(loc.clone(), name, property));
                        ctx.type_ctx.unknown()
                    }
                };
            }
        }
    }

    let obj_ty = infer_expr(ctx, const_ctx, arena, scope, object, None);
    let obj_u = ctx.type_ctx.unwrap_ref(obj_ty);

    if property == "length" {
        if ensure_impl(ctx.type_ctx, ctx.trait_registry, BuiltinTrait::Length, obj_u, &[]) {
            return ctx.trait_registry.get_assoc_type(BuiltinTrait::Length, obj_u, &[], "Output").unwrap_or_else(|| ctx.type_ctx.unknown());
        }
        ctx.diag.push(error::trait_not_implemented(loc.clone(), "Length", &type_name(ctx.type_ctx, obj_u)));
        return ctx.type_ctx.unknown();
    }

    match ctx.type_ctx.get(obj_u).clone() {
        TypeData::Object(object_ty) => match object_ty.fields.iter().position(|f| f.name == property) {
            Some(idx) => {
                arena[object].property_index.set(Some(u32::try_from(idx).unwrap_or(0)));
                object_ty.fields[idx].type_id
            }
            None => {
                ctx.diag.push(error::unknown_property(loc.clone(), property, &object_ty.name));
                ctx.type_ctx.unknown()
            }
        },
        other => {
            ctx.diag.push(error::unknown_property(loc.clone(), property, &type_name_for(&other, ctx.type_ctx)));
            ctx.type_ctx.unknown()
        }
    }
}

fn infer_member_assignment(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    object: NodeId,
    property: &str,
    value: NodeId,
    loc: &SourceLocation,
) -> TypeId {
    let field_ty = infer_member_access(ctx, const_ctx, arena, scope, object, property, loc);
    let value_ty = infer_expr(ctx, const_ctx, arena, scope, value, Some(field_ty));
    if field_ty != value_ty && !ctx.type_ctx.numeric_promotion_allowed(value_ty, field_ty) {
        ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, field_ty), &type_name(ctx.type_ctx, value_ty)));
    }
    field_ty
}

fn infer_index_access(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    object: NodeId,
    index: NodeId,
    loc: &SourceLocation,
) -> TypeId {
    let obj_ty = infer_expr(ctx, const_ctx, arena, scope, object, None);
    let idx_ty = infer_expr(ctx, const_ctx, arena, scope, index, None);
    let obj_u = ctx.type_ctx.unwrap_ref(obj_ty);
    let trait_ = if ctx.type_ctx.is_ref(obj_ty) { BuiltinTrait::RefIndex } else { BuiltinTrait::Index };
    if !ensure_impl(ctx.type_ctx, ctx.trait_registry, trait_, obj_u, &[idx_ty]) {
        ctx.diag.push(error::trait_not_implemented(loc.clone(), trait_.name(), &type_name(ctx.type_ctx, obj_u)));
        return ctx.type_ctx.unknown();
    }
    ctx.trait_registry.get_assoc_type(trait_, obj_u, &[idx_ty], "Output").unwrap_or_else(|| ctx.type_ctx.unknown())
}

fn infer_index_assignment(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    object: NodeId,
    index: NodeId,
    value: NodeId,
    loc: &SourceLocation,
) -> TypeId {
    let element_ty = infer_index_access(ctx, const_ctx, arena, scope, object, index, loc);
    let value_ty = infer_expr(ctx, const_ctx, arena, scope, value, Some(element_ty));
    if element_ty != value_ty && !ctx.type_ctx.numeric_promotion_allowed(value_ty, element_ty) {
        ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, element_ty), &type_name(ctx.type_ctx, value_ty)));
    }
    element_ty
}

/// Contextual object-literal typing: when an expected struct type is
/// available, every omitted field
/// falls back to its declared default rather than the literal becoming an
/// anonymous structural type.
fn infer_object_literal(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    fields: Vec<(String, NodeId)>,
    expected: Option<TypeId>,
    loc: &SourceLocation,
) -> TypeId {
    let struct_ty = expected.filter(|&t| matches!(ctx.type_ctx.get(t), TypeData::Object(_)));
    let Some(struct_ty) = struct_ty else {
        for (_, value) in &fields {
            infer_expr(ctx, const_ctx, arena, scope, *value, None);
        }
        ctx.diag.push(error::type_mismatch(loc.clone(), "a struct type", "an object literal with no expected type"));
        return ctx.type_ctx.unknown();
    };

    let TypeData::Object(object_ty) = ctx.type_ctx.get(struct_ty).clone() else { unreachable!() };

    for (name, value) in &fields {
        match object_ty.fields.iter().find(|f| &f.name == name) {
            Some(field) => {
                let value_ty = infer_expr(ctx, const_ctx, arena, scope, *value, Some(field.type_id));
                if value_ty != field.type_id && !ctx.type_ctx.numeric_promotion_allowed(value_ty, field.type_id) {
                    ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, field.type_id), &type_name(ctx.type_ctx, value_ty)));
                }
            }
            None => {
                infer_expr(ctx, const_ctx, arena, scope, *value, None);
                ctx.diag.push(error::unknown_property(loc.clone(), name, &object_ty.name));
            }
        }
    }

    for field in &object_ty.fields {
        if fields.iter().any(|(name, _)| name == &field.name) {
            continue;
        }
        match default_node_for(ctx.module_arena, object_ty.declaring_struct, &field.name) {
            Some(default_node) => {
                infer_expr(ctx, const_ctx, ctx.module_arena, scope, default_node, Some(field.type_id));
            }
            None => ctx.diag.push(error::missing_field(loc.clone(), &field.name, &object_ty.name)),
        }
    }

    struct_ty
}

fn default_node_for(module_arena: &NodeArena, declaring_struct: Option<NodeId>, field_name: &str) -> Option<NodeId> {
    let decl = declaring_struct?;
    let NodeKind::StructDecl { fields, .. } = &module_arena[decl].kind else { return None };
    fields.iter().find(|f| f.name == field_name)?.default
}

fn infer_array_literal(
    ctx: &mut InferCtx,
    const_ctx: &ConstEvalContext,
    arena: &NodeArena,
    scope: jsasta_binder::SymbolTableId,
    elements: Vec<NodeId>,
    loc: &SourceLocation,
) -> TypeId {
    if elements.is_empty() {
        let unknown = ctx.type_ctx.unknown();
        return ctx.type_ctx.intern_array(unknown, Some(0));
    }
    let mut element_ty = infer_expr(ctx, const_ctx, arena, scope, elements[0], None);
    for &el in &elements[1..] {
        let ty = infer_expr(ctx, const_ctx, arena, scope, el, Some(element_ty));
        if ty != element_ty {
            if let Some(common) = promote(ctx.type_ctx, element_ty, ty) {
                element_ty = common;
            } else {
                ctx.diag.push(error::type_mismatch(loc.clone(), &type_name(ctx.type_ctx, element_ty), &type_name(ctx.type_ctx, ty)));
            }
        }
    }
    ctx.type_ctx.intern_array(element_ty, Some(elements.len() as u64))
}

fn ensure_impl(type_ctx: &mut TypeContext, trait_registry: &mut TraitRegistry, trait_: BuiltinTrait, self_type: TypeId, params: &[TypeId]) -> bool {
    if trait_registry.find_impl(trait_, self_type, params).is_some() {
        return true;
    }
    trait_registry.auto_impl(type_ctx, trait_, self_type).is_some()
}

fn promote(type_ctx: &TypeContext, a: TypeId, b: TypeId) -> Option<TypeId> {
    if a == b {
        return Some(a);
    }
    if type_ctx.numeric_promotion_allowed(a, b) {
        return Some(b);
    }
    if type_ctx.numeric_promotion_allowed(b, a) {
        return Some(a);
    }
    None
}

fn is_integer(type_ctx: &TypeContext, ty: TypeId) -> bool {
    matches!(type_ctx.get(ty), TypeData::Primitive(kind) if kind.is_integer())
}

fn is_string_like(type_ctx: &TypeContext, ty: TypeId) -> bool {
    matches!(
        type_ctx.get(ty),
        TypeData::Primitive(jsasta_parser::PrimitiveKind::String | jsasta_parser::PrimitiveKind::Str)
    )
}

pub(crate) fn type_name(type_ctx: &TypeContext, ty: TypeId) -> String {
    type_name_for(type_ctx.get(ty), type_ctx)
}

fn type_name_for(data: &TypeData, type_ctx: &TypeContext) -> String {
    match data {
        TypeData::Primitive(kind) => kind.name().to_string(),
        TypeData::Object(object) => object.name.clone(),
        TypeData::Array { element, size } => match size {
            Some(n) => format!("{}[{n}]", type_name(type_ctx, *element)),
            None => format!("{}[]", type_name(type_ctx, *element)),
        },
        TypeData::Ref { target, .. } => format!("ref {}", type_name(type_ctx, *target)),
        TypeData::Function(_) => "fn".to_string(),
        TypeData::Unknown => "unknown".to_string(),
    }
}

