//! Pass 0 — collect top-level `const`/`var` names and iterate struct
//! declarations to a fixed point.
//!
//! Const collection is a single sweep: every top-level `const`'s initializer
//! is recorded before any of them are evaluated, so `const B = A + 1; const
//! A = 1;` resolves regardless of declaration order — [`crate::consteval`]
//! recurses through `const_inits` on demand and only the *use* of a const
//! (a struct field's size expression, say) ever actually evaluates it.
//!
//! Struct declarations are genuinely iterative: a field whose type names
//! another not-yet-interned struct must wait for a later sweep, so this
//! module loops until a full pass interns nothing new, bounded by
//! `options.max_const_eval_iterations` as a backstop.

use jsasta_binder::{Module, ModuleRegistry};
use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_common::options::CompileOptions;
use jsasta_parser::{NodeKind, PrimitiveKind};
use jsasta_solver::{ObjectField, ObjectType, TypeData};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::consteval::ConstEvalContext;
use crate::error;
use crate::resolve_type;
use crate::state::{CheckState, FnDeclInfo};

pub struct ConstNames {
    pub const_inits: FxHashMap<String, jsasta_parser::NodeId>,
    pub non_const_names: FxHashSet<String>,
}

/// Runs Pass 0 over `module`'s own top-level declarations (never a cloned
/// specialization body: struct/const declarations only ever occur at module
/// scope).
pub fn collect(
    module: &mut Module,
    registry: &ModuleRegistry,
    diag: &mut DiagnosticSink,
    options: &CompileOptions,
    check_state: &mut CheckState,
) -> ConstNames {
    let mut const_inits = FxHashMap::default();
    let mut non_const_names = FxHashSet::default();
    let top_level = top_level_decls(module);
    for &decl in &top_level {
        if let NodeKind::VarDecl { name, is_const, init, .. } = &module.arena[decl].kind {
            if *is_const {
                if let Some(init) = init {
                    const_inits.insert(name.clone(), *init);
                }
            } else {
                non_const_names.insert(name.clone());
            }
        }
    }

    let mut pending: Vec<jsasta_parser::NodeId> =
        top_level.iter().copied().filter(|&id| matches!(module.arena[id].kind, NodeKind::StructDecl { .. })).collect();

    for _ in 0..options.max_const_eval_iterations {
        if pending.is_empty() {
            break;
        }
        let const_ctx = ConstEvalContext { const_inits: &const_inits, non_const_names: &non_const_names, max_depth: options.max_const_eval_recursion };
        let mut still_pending = Vec::new();
        let mut progressed = false;
        for decl in pending {
            if try_intern_struct(module, registry, &const_ctx, diag, decl, check_state) {
                progressed = true;
            } else {
                still_pending.push(decl);
            }
        }
        pending = still_pending;
        if !progressed {
            break;
        }
    }

    if !pending.is_empty() {
        let const_ctx = ConstEvalContext { const_inits: &const_inits, non_const_names: &non_const_names, max_depth: options.max_const_eval_recursion };
        for decl in pending {
            finalize_unresolved_struct(module, registry, &const_ctx, diag, decl, check_state);
        }
    }

    ConstNames { const_inits, non_const_names }
}

pub(crate) fn top_level_decls(module: &Module) -> Vec<jsasta_parser::NodeId> {
    let NodeKind::Program { statements } = &module.arena[module.ast_root].kind else {
        return Vec::new();
    };
    statements
        .iter()
        .map(|&stmt| match &module.arena[stmt].kind {
            NodeKind::Export { decl } => *decl,
            _ => stmt,
        })
        .collect()
}

/// Attempts to intern one struct declaration; returns `false` (without
/// diagnosing anything) if any field's type is not yet resolvable.
fn try_intern_struct(
    module: &mut Module,
    registry: &ModuleRegistry,
    const_ctx: &ConstEvalContext,
    diag: &mut DiagnosticSink,
    decl: jsasta_parser::NodeId,
    check_state: &mut CheckState,
) -> bool {
    let NodeKind::StructDecl { name, fields, methods } = module.arena[decl].kind.clone() else {
        return true;
    };
    if module.type_ctx.lookup_name(&name).is_some() {
        return true;
    }

    let mut resolved_fields = Vec::with_capacity(fields.len());
    for field in &fields {
        match resolve_type::try_resolve(
            &mut module.type_ctx,
            &module.symtab,
            registry,
            module.module_scope,
            &module.arena,
            &field.type_ann,
            &field.loc,
            const_ctx,
            diag,
        ) {
            Some(ty) => resolved_fields.push(ObjectField { name: field.name.clone(), type_id: ty }),
            None => return false,
        }
    }

    let object = ObjectType { name: name.clone(), fields: resolved_fields, declaring_struct: Some(decl) };
    let struct_ty = module.type_ctx.intern_object(object);

    validate_defaults(module, &fields, struct_ty, diag);
    globalize_methods(module, &name, &methods, struct_ty, check_state);
    true
}

fn finalize_unresolved_struct(
    module: &mut Module,
    registry: &ModuleRegistry,
    const_ctx: &ConstEvalContext,
    diag: &mut DiagnosticSink,
    decl: jsasta_parser::NodeId,
    check_state: &mut CheckState,
) {
    let NodeKind::StructDecl { name, fields, methods } = module.arena[decl].kind.clone() else {
        return;
    };
    let mut resolved_fields = Vec::with_capacity(fields.len());
    for field in &fields {
        match resolve_type::try_resolve(
            &mut module.type_ctx,
            &module.symtab,
            registry,
            module.module_scope,
            &module.arena,
            &field.type_ann,
            &field.loc,
            const_ctx,
            diag,
        ) {
            Some(ty) => resolved_fields.push(ObjectField { name: field.name.clone(), type_id: ty }),
            None => {
                diag.push(error::unresolved_struct_field_type(field.loc.clone(), &field.name, &name));
                resolved_fields.push(ObjectField { name: field.name.clone(), type_id: module.type_ctx.unknown() });
            }
        }
    }
    let object = ObjectType { name: name.clone(), fields: resolved_fields, declaring_struct: Some(decl) };
    let struct_ty = module.type_ctx.intern_object(object);
    globalize_methods(module, &name, &methods, struct_ty, check_state);
}

/// Validates literal default values against their declared field type.
/// Non-literal defaults are left to the general inference walk when the field is
/// actually used, since a full expression inferencer is not available yet
/// this early in the pipeline.
fn validate_defaults(
    module: &Module,
    fields: &[jsasta_parser::StructFieldDecl],
    struct_ty: jsasta_solver::TypeId,
    diag: &mut DiagnosticSink,
) {
    let TypeData::Object(object) = module.type_ctx.get(struct_ty) else {
        return;
    };
    for (field, object_field) in fields.iter().zip(object.fields.iter()) {
        let Some(default) = field.default else { continue };
        let literal_ty = match &module.arena[default].kind {
            NodeKind::NumberLiteral { is_float_hint: true, .. } => Some(module.type_ctx.double()),
            NodeKind::NumberLiteral { is_float_hint: false, .. } => Some(module.type_ctx.int()),
            NodeKind::StringLiteral { .. } => Some(module.type_ctx.primitive(PrimitiveKind::String)),
            NodeKind::BoolLiteral { .. } => Some(module.type_ctx.primitive(PrimitiveKind::Bool)),
            _ => None,
        };
        let Some(literal_ty) = literal_ty else { continue };
        if !module.type_ctx.numeric_promotion_allowed(literal_ty, object_field.type_id) && literal_ty != object_field.type_id {
            diag.push(error::type_mismatch(
                module.arena[default].loc.clone(),
                type_name(module, object_field.type_id).as_str(),
                type_name(module, literal_ty).as_str(),
            ));
        }
        module.arena[default].type_id.set(Some(literal_ty.to_raw()));
    }
}

/// Globalizes `StructName.method` as an ordinary function name with an
/// implicit `self: ref StructName` parameter prepended, so the rest of the
/// pipeline (Pass 1 signature collection, call-site dispatch) treats methods
/// exactly like top-level functions (see `DESIGN.md` for the method/`self`
/// binding design decision).
fn globalize_methods(
    module: &mut Module,
    struct_name: &str,
    methods: &[jsasta_parser::NodeId],
    struct_ty: jsasta_solver::TypeId,
    check_state: &mut CheckState,
) {
    let self_ty = module.type_ctx.intern_ref(struct_ty, true);
    for &method_node in methods {
        let NodeKind::FunctionDecl { name, is_external, is_variadic, .. } = &module.arena[method_node].kind else {
            continue;
        };
        let qualified = format!("{struct_name}.{name}");
        check_state.fn_decls.insert(
            qualified,
            FnDeclInfo { node: method_node, is_external: *is_external, is_variadic: *is_variadic, self_type: Some(self_ty) },
        );
    }
}

fn type_name(module: &Module, ty: jsasta_solver::TypeId) -> String {
    match module.type_ctx.get(ty) {
        TypeData::Primitive(kind) => kind.name().to_string(),
        TypeData::Object(object) => object.name.clone(),
        TypeData::Array { element, size } => match size {
            Some(n) => format!("{}[{n}]", type_name(module, *element)),
            None => format!("{}[]", type_name(module, *element)),
        },
        TypeData::Ref { target, .. } => format!("ref {}", type_name(module, *target)),
        TypeData::Function(_) => "fn".to_string(),
        TypeData::Unknown => "unknown".to_string(),
    }
}
