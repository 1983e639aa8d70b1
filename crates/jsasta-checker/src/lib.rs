//! Multi-pass, fixed-point type inference driver and compile-time constant
//! evaluator.
//!
//! [`check_program`] is the single entry point: given a [`ModuleRegistry`]
//! already populated by `jsasta-binder` (every `import` resolved, every
//! module parsed), it runs passes 0-5 over each module in dependency order
//! and accumulates diagnostics into the caller's [`DiagnosticSink`]. No pass
//! is fatal: a module with errors is still left in as typed a state as
//! inference could manage, and the next module in dependency order is
//! checked regardless.

pub mod clone_body;
pub mod consteval;
mod error;
pub mod handoff;
pub mod pass0;
pub mod pass1;
pub mod pass2;
pub mod pass3;
pub mod resolve_type;
pub mod state;

use jsasta_binder::{ModuleId, ModuleRegistry};
use jsasta_common::diagnostics::{codes, Diagnostic, DiagnosticSink};
use jsasta_common::options::CompileOptions;

use crate::consteval::ConstEvalContext;
use crate::pass2::InferCtx;
use crate::state::CheckState;

/// Runs the full pipeline (passes 0-5, per module, in dependency order) over
/// every module `registry` already holds.
///
/// For each module, in dependency order: (a) collect consts and structs
/// iteratively, (b) collect function signatures, (c) iteratively drive
/// passes 2-5 until no new specializations are discovered.
/// `registry.iter_ids()` already yields dependency order, so this is a
/// single forward pass over it —
/// cross-module calls started from pass 3 check their *own* target module
/// out of the registry on demand (see `pass3::analyze_cross_module_call`),
/// which is how a module can gain specializations even though it was
/// already "done" by the time a later module imports it.
pub fn check_program(registry: &mut ModuleRegistry, diag: &mut DiagnosticSink, options: &CompileOptions) {
    let module_ids: Vec<ModuleId> = registry.iter_ids().collect();
    for id in module_ids {
        check_module(registry, id, diag, options);
    }
}

/// Runs passes 0-5 over exactly one module. Public (not just used by
/// [`check_program`]) so a test can exercise a single module's inference
/// without building a full registry of dependents.
pub fn check_module(registry: &mut ModuleRegistry, id: ModuleId, diag: &mut DiagnosticSink, options: &CompileOptions) {
    let mut module = registry.take_module(id);
    let mut check_state = CheckState::new();

    // Pass 0: consts and structs, iterated to a fixed point.
    let const_names = pass0::collect(&mut module, registry, diag, options, &mut check_state);
    let const_ctx = ConstEvalContext {
        const_inits: &const_names.const_inits,
        non_const_names: &const_names.non_const_names,
        max_depth: options.max_const_eval_recursion,
    };

    // Pass 1: function signatures, eagerly specializing every fully-typed
    // declaration.
    pass1::collect(&mut module, registry, &const_ctx, diag, &mut check_state);

    // Passes 2-5: re-walk the module (and every specialization discovered so
    // far) until a complete sweep adds no new specialization, bounded by
    // `max_specialization_iterations` as the backstop against a pathological
    // program that never reaches a fixed point.
    let ast_root = module.ast_root;
    let module_scope = module.module_scope;
    let mut iterations = 0u32;
    loop {
        let before = module.specializations.specialization_count();

        // Borrowing each field of `module` directly (rather than through a
        // helper taking `&mut Module`) lets `module.arena` stay borrowed
        // immutably — both as `InferCtx::module_arena` and as this call's
        // `arena` argument — at the same time every other field is borrowed
        // mutably; the borrow checker tracks disjoint struct fields
        // independently as long as nothing routes through `&mut Module`
        // itself.
        let mut ctx = InferCtx {
            type_ctx: &mut module.type_ctx,
            trait_registry: &mut module.trait_registry,
            specializations: &mut module.specializations,
            symtab: &mut module.symtab,
            module_arena: &module.arena,
            module_scope,
            registry,
            check_state: &mut check_state,
            diag,
            options,
        };
        pass2::infer_module(&mut ctx, &const_ctx, &module.arena, ast_root);

        let after = module.specializations.specialization_count();
        iterations += 1;
        if after == before {
            break;
        }
        if iterations >= options.max_specialization_iterations {
            diag.push(specialization_fixed_point_exceeded(&module.absolute_path.display().to_string()));
            break;
        }
    }

    registry.put_module(id, module);
}

fn specialization_fixed_point_exceeded(path: &str) -> Diagnostic {
    Diagnostic::warning(
        codes::INTERNAL_ERROR,
        jsasta_common::span::SourceLocation::new(std::sync::Arc::from(path), 1, 1),
        format!("type inference for `{path}` did not reach a fixed point within the iteration cap; proceeding with best-effort results"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsasta_binder::{InMemorySourceLoader, ModuleRegistry};
    use jsasta_parser::NodeKind;
    use jsasta_solver::{PrimitiveKind, TypeData};

    fn run(src: &str) -> (ModuleRegistry, DiagnosticSink, ModuleId) {
        let mut loader = InMemorySourceLoader::new();
        loader.add("main.jsa", src);
        let mut registry = ModuleRegistry::new(Box::new(loader));
        let mut diag = DiagnosticSink::new();
        let id = registry.load_entry(std::path::Path::new("main.jsa"), &mut diag).expect("module should load");
        let options = CompileOptions::default();
        check_program(&mut registry, &mut diag, &options);
        (registry, diag, id)
    }

    #[test]
    fn primitive_specialization_scenario() {
        let (registry, diag, id) = run(
            "function add(a, b) { return a + b; }\n\
             function main() { return add(1,2) + add(1.0,2.0); }",
        );
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.entries());
        let module = registry.get(id);
        let int_spec = module.specializations.find_by_types("add", &[module.type_ctx.int(), module.type_ctx.int()]);
        let double_spec = module.specializations.find_by_types("add", &[module.type_ctx.double(), module.type_ctx.double()]);
        assert!(int_spec.is_some());
        assert!(double_spec.is_some());
        assert_eq!(module.specializations.get(int_spec.unwrap()).mangled_name, "add_int_int");
        assert_eq!(module.specializations.get(double_spec.unwrap()).mangled_name, "add_double_double");

        let main_spec = module.specializations.find_by_types("main", &[]).expect("main should be specialized");
        assert_eq!(module.specializations.get(main_spec).return_type.get(), Some(module.type_ctx.double()));
    }

    #[test]
    fn struct_default_and_contextual_typing_scenario() {
        let (registry, diag, id) = run(
            "struct Vec { x: int = 0; y: int = 0; }\n\
             function main() { var v: Vec = { y: 5 }; return v.y; }",
        );
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.entries());
        let module = registry.get(id);
        let struct_ty = module.type_ctx.lookup_name("Vec").expect("Vec should be interned");
        let TypeData::Object(object) = module.type_ctx.get(struct_ty) else { panic!("expected object type") };
        assert_eq!(object.fields[0].name, "x");
        assert_eq!(object.fields[1].name, "y");

        // Walk down to the `var v: Vec = { y: 5 }` node to confirm the
        // object literal's own type is the interned `Vec`, not an anonymous
        // structural type.
        let NodeKind::Program { statements } = &module.arena[module.ast_root].kind else { unreachable!() };
        let main_decl = statements
            .iter()
            .find_map(|&s| match &module.arena[s].kind {
                NodeKind::FunctionDecl { name, body: Some(b), .. } if name == "main" => Some(*b),
                _ => None,
            })
            .expect("main should have a body");
        let spec_id = module.specializations.find_by_types("main", &[]).expect("main specialized");
        let jsasta_solver::SpecializedBody::Cloned { arena, root } = &*module.specializations.get(spec_id).specialized_body.borrow() else {
            panic!("expected cloned body")
        };
        let NodeKind::Block { statements: body_stmts } = &arena[*root].kind else { panic!("expected block") };
        let var_decl = body_stmts[0];
        let NodeKind::VarDecl { init: Some(init), .. } = &arena[var_decl].kind else { panic!("expected var decl") };
        let literal_ty = arena[*init].type_id.get().map(jsasta_solver::TypeId::from_raw);
        assert_eq!(literal_ty, Some(struct_ty));
        let _ = main_decl;
    }

    #[test]
    fn const_array_size_scenario() {
        let (registry, diag, id) = run("const W = 150; const H = 60; var grid: int[W * H];");
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.entries());
        let module = registry.get(id);
        let grid_sym = module.symtab.lookup(module.module_scope, "grid").expect("grid declared");
        let grid_ty = module.symtab.get(grid_sym).type_id.get();
        let TypeData::Array { size, .. } = module.type_ctx.get(grid_ty) else { panic!("expected array type") };
        assert_eq!(*size, Some(9000));
    }

    #[test]
    fn non_const_size_identifier_is_a_type_error_with_const_hint() {
        let (_, diag, _) = run("var w = 150; var grid: int[w];");
        assert!(diag.has_errors());
        let hint_seen = diag.entries().iter().any(|d| d.message.contains("const") || d.hint.as_deref().unwrap_or("").contains("const"));
        assert!(hint_seen, "expected a diagnostic mentioning `const`: {:?}", diag.entries());
    }

    #[test]
    fn trait_gated_indexing_scenario() {
        let (registry, diag, id) = run("var a: int[] = [1,2,3]; a[0] = a[1];");
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.entries());
        let module = registry.get(id);
        let NodeKind::Program { statements } = &module.arena[module.ast_root].kind else { unreachable!() };
        let assignment = statements
            .iter()
            .copied()
            .find(|&s| matches!(&module.arena[s].kind, NodeKind::ExprStmt { .. }))
            .expect("index assignment statement");
        let NodeKind::ExprStmt { expr } = &module.arena[assignment].kind else { unreachable!() };
        let ty = module.arena[*expr].type_id.get().map(jsasta_solver::TypeId::from_raw);
        assert_eq!(ty, Some(module.type_ctx.int()));

        let var_decl = statements[0];
        let array_ty = module.arena[var_decl].type_id.get().map(jsasta_solver::TypeId::from_raw).expect("var decl typed");
        let int_ty = module.type_ctx.int();
        assert!(module.trait_registry.find_impl(jsasta_solver::BuiltinTrait::Index, array_ty, &[int_ty]).is_some());
        assert!(module.trait_registry.find_impl(jsasta_solver::BuiltinTrait::RefIndex, array_ty, &[int_ty]).is_some());
    }

    #[test]
    fn error_accumulation_scenario_reports_multiple_diagnostics() {
        let (_, diag, _) = run(
            "function f(x: int): int { return x + y; }\n\
             var z: string = 1;",
        );
        assert!(diag.entries().len() >= 2, "expected at least 2 diagnostics, got {:?}", diag.entries());
        assert!(diag.has_errors());
    }

    #[test]
    fn running_the_pipeline_twice_is_idempotent() {
        let src = "function add(a, b) { return a + b; } function main() { return add(1,2); }";
        let (registry1, diag1, id1) = run(src);
        let (registry2, diag2, id2) = run(src);
        assert_eq!(diag1.entries().len(), diag2.entries().len());
        let m1 = registry1.get(id1);
        let m2 = registry2.get(id2);
        assert_eq!(m1.specializations.specialization_count(), m2.specializations.specialization_count());
        let _ = (id1, id2);
    }

    #[test]
    fn fully_typed_external_function_gets_a_single_eager_specialization() {
        let (registry, diag, id) = run("external function sqrt(x: double): double;");
        assert!(!diag.has_errors());
        let module = registry.get(id);
        assert_eq!(module.specializations.get_all_for("sqrt").len(), 1);
    }

    #[test]
    fn namespace_import_specializes_in_the_exporting_module() {
        let mut loader = InMemorySourceLoader::new();
        loader.add("math.jsa", "export function add(a: int, b: int): int { return a + b; }");
        loader.add("main.jsa", "import m from \"math.jsa\"; function main() { return m.add(1,2); }");
        let mut registry = ModuleRegistry::new(Box::new(loader));
        let mut diag = DiagnosticSink::new();
        let main_id = registry.load_entry(std::path::Path::new("main.jsa"), &mut diag).expect("main should load");
        let options = CompileOptions::default();
        check_program(&mut registry, &mut diag, &options);
        assert!(!diag.has_errors(), "unexpected diagnostics: {:?}", diag.entries());

        let main = registry.get(main_id);
        let main_spec = main.specializations.find_by_types("main", &[]).expect("main specialized");
        assert_eq!(main.specializations.get(main_spec).return_type.get(), Some(main.type_ctx.int()));

        let math_id = *main.imports.iter().find(|(name, _)| name == "m").map(|(_, id)| id).expect("m imported");
        let math = registry.get(math_id);
        assert_eq!(math.module_prefix, "math");
        assert_eq!(math.mangle("add"), "math__add");
        assert_eq!(math.specializations.get_all_for("add").len(), 1);
    }

    #[test]
    fn primitive_kind_name_matches_source_keyword() {
        assert_eq!(PrimitiveKind::Int.name(), "int");
        assert_eq!(PrimitiveKind::Double.name(), "double");
    }
}
