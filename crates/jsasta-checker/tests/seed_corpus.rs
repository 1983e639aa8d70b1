//! Black-box integration tests for the compiler's seed corpus, driven
//! entirely through the public `jsasta_checker`/`jsasta_binder` API rather
//! than reaching into crate-internal state (the `#[cfg(test)]` unit tests
//! in `src/lib.rs` already cover that level of detail).

use jsasta_binder::{InMemorySourceLoader, ModuleRegistry};
use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_common::options::CompileOptions;
use jsasta_solver::TypeData;
use std::path::Path;

fn check(src: &str) -> (ModuleRegistry, DiagnosticSink) {
    let mut loader = InMemorySourceLoader::new();
    loader.add("main.jsa", src);
    let mut registry = ModuleRegistry::new(Box::new(loader));
    let mut diag = DiagnosticSink::new();
    registry.load_entry(Path::new("main.jsa"), &mut diag).expect("entry should load");
    let options = CompileOptions::default();
    jsasta_checker::check_program(&mut registry, &mut diag, &options);
    (registry, diag)
}

#[test]
fn scenario_1_primitive_specialization() {
    let (registry, diag) = check(
        "function add(a, b) { return a + b; }\n\
         function main() { return add(1,2) + add(1.0,2.0); }",
    );
    assert!(!diag.has_errors());
    let module = registry.get(registry.iter_ids().last().unwrap());
    assert!(module.specializations.find_by_types("add", &[module.type_ctx.int(), module.type_ctx.int()]).is_some());
    assert!(module.specializations.find_by_types("add", &[module.type_ctx.double(), module.type_ctx.double()]).is_some());
}

#[test]
fn scenario_2_struct_defaults_and_contextual_typing() {
    let (registry, diag) = check("struct Vec { x: int = 0; y: int = 0; } function main() { var v: Vec = { y: 5 }; return v.y; }");
    assert!(!diag.has_errors());
    let module = registry.get(registry.iter_ids().last().unwrap());
    let struct_ty = module.type_ctx.lookup_name("Vec").expect("Vec interned");
    let TypeData::Object(object) = module.type_ctx.get(struct_ty) else { panic!("expected object type") };
    assert_eq!(object.fields.len(), 2);
}

#[test]
fn scenario_3_const_array_size() {
    let (registry, diag) = check("const W = 150; const H = 60; var grid: int[W * H];");
    assert!(!diag.has_errors());
    let module = registry.get(registry.iter_ids().last().unwrap());
    let grid_sym = module.symtab.lookup(module.module_scope, "grid").unwrap();
    let grid_ty = module.symtab.get(grid_sym).type_id.get();
    let TypeData::Array { size, .. } = module.type_ctx.get(grid_ty) else { panic!("expected array") };
    assert_eq!(*size, Some(9000));
}

#[test]
fn scenario_3_non_const_size_is_a_diagnostic_with_const_hint() {
    let (_, diag) = check("var w = 150; var grid: int[w];");
    assert!(diag.has_errors());
    assert!(diag.entries().iter().any(|d| d.message.contains("const") || d.hint.as_deref().unwrap_or("").contains("const")));
}

#[test]
fn scenario_4_trait_gated_indexing() {
    let (_, diag) = check("var a: int[] = [1,2,3]; a[0] = a[1];");
    assert!(!diag.has_errors());
}

#[test]
fn scenario_5_namespace_import_cross_module_specialization() {
    let mut loader = InMemorySourceLoader::new();
    loader.add("math.jsa", "export function add(a: int, b: int): int { return a + b; }");
    loader.add("main.jsa", "import m from \"math.jsa\"; function main() { return m.add(1,2); }");
    let mut registry = ModuleRegistry::new(Box::new(loader));
    let mut diag = DiagnosticSink::new();
    let main_id = registry.load_entry(Path::new("main.jsa"), &mut diag).unwrap();
    jsasta_checker::check_program(&mut registry, &mut diag, &CompileOptions::default());
    assert!(!diag.has_errors());
    let main = registry.get(main_id);
    let math_id = *main.imports.iter().find(|(name, _)| name == "m").map(|(_, id)| id).unwrap();
    let math = registry.get(math_id);
    assert_eq!(math.mangle("add"), "math__add");
    assert_eq!(math.specializations.get_all_for("add").len(), 1);
}

#[test]
fn scenario_6_error_accumulation() {
    let (_, diag) = check("function f(x: int): int { return x + y; }\nvar z: string = 1;");
    assert!(diag.entries().len() >= 2);
    assert!(diag.has_errors());
}

#[test]
fn running_twice_is_idempotent() {
    let src = "function add(a, b) { return a + b; } function main() { return add(1,2); }";
    let (r1, d1) = check(src);
    let (r2, d2) = check(src);
    assert_eq!(d1.entries().len(), d2.entries().len());
    let m1 = r1.get(r1.iter_ids().last().unwrap());
    let m2 = r2.get(r2.iter_ids().last().unwrap());
    assert_eq!(m1.specializations.specialization_count(), m2.specializations.specialization_count());
}
