//! Pass 1 — collect function signatures.
//!
//! For every `function-decl` — top-level functions and the struct methods
//! [`crate::pass0::collect`] already globalized into [`CheckState::fn_decls`]
//! under `StructName.method` — this: resolves namespaced names in its
//! parameter/return type annotations, interns a [`FunctionType`], registers
//! it by name, and declares the function itself in the module's symbol
//! table. A function whose every parameter and return type is known and
//! non-`unknown` is "fully typed" (the glossary's term) and gets its single
//! specialization created eagerly, right here, rather than waiting for a
//! Pass 3 call site to ask for one.

use jsasta_binder::{Module, ModuleRegistry, SymbolEntry, SymbolKind};
use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_parser::NodeKind;
use jsasta_solver::{FunctionType, TypeId};
use std::cell::Cell;

use crate::clone_body;
use crate::consteval::ConstEvalContext;
use crate::resolve_type;
use crate::state::{CheckState, FnDeclInfo};

/// Runs Pass 1 over every function `check_state` knows about: top-level
/// `function` declarations (registered here, under their bare name) and
/// struct methods (already registered by Pass 0 under `Struct.method`).
pub fn collect(module: &mut Module, registry: &ModuleRegistry, const_ctx: &ConstEvalContext, diag: &mut DiagnosticSink, check_state: &mut CheckState) {
    for decl in crate::pass0::top_level_decls(module) {
        if let NodeKind::FunctionDecl { name, is_external, is_variadic, .. } = &module.arena[decl].kind {
            let qualified = name.clone();
            check_state.fn_decls.entry(qualified).or_insert(FnDeclInfo {
                node: decl,
                is_external: *is_external,
                is_variadic: *is_variadic,
                self_type: None,
            });
        }
    }

    let names: Vec<String> = check_state.fn_decls.keys().cloned().collect();
    for name in names {
        let info = check_state.fn_decls[&name];
        process_one(module, registry, const_ctx, diag, check_state, &name, info);
    }
}

#[allow(clippy::too_many_arguments)]
fn process_one(
    module: &mut Module,
    registry: &ModuleRegistry,
    const_ctx: &ConstEvalContext,
    diag: &mut DiagnosticSink,
    check_state: &mut CheckState,
    qualified_name: &str,
    info: FnDeclInfo,
) {
    let NodeKind::FunctionDecl { params, return_type, body, .. } = module.arena[info.node].kind.clone() else {
        return;
    };

    let mut param_types: Vec<TypeId> = Vec::with_capacity(params.len() + 1);
    if let Some(self_ty) = info.self_type {
        param_types.push(self_ty);
    }
    for param in &params {
        let ty = match &param.type_ann {
            Some(type_ann) => resolve_type::resolve(
                &mut module.type_ctx,
                &module.symtab,
                registry,
                module.module_scope,
                &module.arena,
                type_ann,
                &param.loc,
                const_ctx,
                diag,
            ),
            None => module.type_ctx.unknown(),
        };
        param_types.push(ty);
    }

    let return_ty = match &return_type {
        Some(type_ann) => resolve_type::resolve(
            &mut module.type_ctx,
            &module.symtab,
            registry,
            module.module_scope,
            &module.arena,
            type_ann,
            &module.arena[info.node].loc.clone(),
            const_ctx,
            diag,
        ),
        None => module.type_ctx.unknown(),
    };

    let unknown = module.type_ctx.unknown();
    let is_fully_typed = return_ty != unknown && param_types.iter().all(|&t| t != unknown);

    let func_ty = module.type_ctx.intern_function(FunctionType {
        param_types: param_types.clone(),
        return_type: return_ty,
        variadic: info.is_variadic,
        is_fully_typed,
    });
    module.type_ctx.register_function_name(qualified_name, func_ty);

    // Methods are only reachable through `StructName.method` dispatch, never
    // through ordinary identifier lookup, so only plain top-level functions
    // get a symbol-table entry.
    if info.self_type.is_none() && module.symtab.lookup_local(module.module_scope, qualified_name).is_none() {
        module.symtab.declare(
            module.module_scope,
            SymbolEntry {
                name: qualified_name.to_string(),
                type_id: Cell::new(func_ty),
                is_const: true,
                kind: SymbolKind::Function,
                declaring_node: info.node,
                param_index: None,
                imported_module: None,
            },
        );
    }

    if !is_fully_typed {
        return;
    }

    let existing = module.specializations.find_by_types(qualified_name, &param_types);
    let spec_id = module.specializations.add_by_types(&module.type_ctx, qualified_name, param_types.clone());
    if existing.is_some() {
        return;
    }
    module.specializations.get(spec_id).return_type.set(Some(return_ty));

    if info.is_external || body.is_none() {
        return;
    }
    let body = body.unwrap();

    let (cloned_arena, cloned_root) = clone_body::clone_subtree(&module.arena, body);
    let child_scope = module.symtab.new_scope(Some(module.module_scope));
    let offset = if info.self_type.is_some() { 1 } else { 0 };
    if let Some(self_ty) = info.self_type {
        module.symtab.declare(
            child_scope,
            SymbolEntry {
                name: "self".to_string(),
                type_id: Cell::new(self_ty),
                is_const: true,
                kind: SymbolKind::Parameter,
                declaring_node: info.node,
                param_index: Some(0),
                imported_module: None,
            },
        );
    }
    for (i, param) in params.iter().enumerate() {
        module.symtab.declare(
            child_scope,
            SymbolEntry {
                name: param.name.clone(),
                type_id: Cell::new(param_types[i + offset]),
                is_const: false,
                kind: SymbolKind::Parameter,
                declaring_node: info.node,
                param_index: Some(u32::try_from(i + offset).unwrap_or(u32::MAX)),
                imported_module: None,
            },
        );
    }

    *module.specializations.get(spec_id).specialized_body.borrow_mut() =
        jsasta_solver::SpecializedBody::Cloned { arena: cloned_arena, root: cloned_root };
    check_state.note_specialization(spec_id, child_scope);
}
