//! `@builtin` namespace table: an `@name` import path maps through a fixed
//! table to an in-tree builtin module rather than being resolved on disk.
//!
//! Each builtin is synthesized as an ordinary [`Module`] whose top-level
//! declarations are `external` function signatures — there is no `.jsa`
//! source text to parse, so the nodes are built directly against a fresh
//! [`NodeArena`], the same shapes [`jsasta_parser::parse_module`] would have
//! produced for an equivalent hand-written external-function file.

use std::path::PathBuf;
use std::sync::Arc;

use jsasta_common::span::SourceLocation;
use jsasta_parser::{NodeArena, NodeKind, Param, PrimitiveKind, TypeExpr};
use jsasta_solver::{SpecializationStore, TraitRegistry, TypeContext};
use rustc_hash::FxHashMap;

use crate::module::{Module, ModuleRegistry};
use crate::symbol_table::SymbolTableArena;

/// One `external` function signature to synthesize in a builtin module.
pub struct BuiltinFn {
    pub name: &'static str,
    pub params: &'static [(&'static str, PrimitiveKind)],
    pub return_type: Option<PrimitiveKind>,
    pub variadic: bool,
}

/// A builtin module's full surface: its namespace name and the functions it
/// exports. The fixed set of namespaces is `@io`, `@test`, `@debug`, `@math`.
pub struct BuiltinSpec {
    pub namespace: &'static str,
    pub functions: &'static [BuiltinFn],
}

const IO_FUNCTIONS: &[BuiltinFn] = &[
    BuiltinFn { name: "print", params: &[("value", PrimitiveKind::String)], return_type: Some(PrimitiveKind::Void), variadic: false },
    BuiltinFn { name: "println", params: &[("value", PrimitiveKind::String)], return_type: Some(PrimitiveKind::Void), variadic: false },
    // `io.format`'s formatting semantics are left to the runtime; the
    // signature is still real so call sites type-check, it simply has
    // no script body to run.
    BuiltinFn { name: "format", params: &[("template", PrimitiveKind::String)], return_type: Some(PrimitiveKind::String), variadic: true },
];

const TEST_FUNCTIONS: &[BuiltinFn] = &[
    BuiltinFn { name: "assert", params: &[("cond", PrimitiveKind::Bool)], return_type: Some(PrimitiveKind::Void), variadic: false },
    BuiltinFn {
        name: "assert_eq",
        params: &[("left", PrimitiveKind::Int), ("right", PrimitiveKind::Int)],
        return_type: Some(PrimitiveKind::Void),
        variadic: false,
    },
];

const DEBUG_FUNCTIONS: &[BuiltinFn] = &[
    BuiltinFn { name: "log", params: &[("message", PrimitiveKind::String)], return_type: Some(PrimitiveKind::Void), variadic: false },
    BuiltinFn { name: "trace", params: &[("message", PrimitiveKind::String)], return_type: Some(PrimitiveKind::Void), variadic: false },
];

const MATH_FUNCTIONS: &[BuiltinFn] = &[
    BuiltinFn { name: "sqrt", params: &[("x", PrimitiveKind::Double)], return_type: Some(PrimitiveKind::Double), variadic: false },
    BuiltinFn { name: "abs", params: &[("x", PrimitiveKind::Double)], return_type: Some(PrimitiveKind::Double), variadic: false },
    BuiltinFn {
        name: "pow",
        params: &[("base", PrimitiveKind::Double), ("exponent", PrimitiveKind::Double)],
        return_type: Some(PrimitiveKind::Double),
        variadic: false,
    },
    BuiltinFn {
        name: "min",
        params: &[("a", PrimitiveKind::Double), ("b", PrimitiveKind::Double)],
        return_type: Some(PrimitiveKind::Double),
        variadic: false,
    },
    BuiltinFn {
        name: "max",
        params: &[("a", PrimitiveKind::Double), ("b", PrimitiveKind::Double)],
        return_type: Some(PrimitiveKind::Double),
        variadic: false,
    },
];

const BUILTIN_SPECS: &[BuiltinSpec] = &[
    BuiltinSpec { namespace: "io", functions: IO_FUNCTIONS },
    BuiltinSpec { namespace: "test", functions: TEST_FUNCTIONS },
    BuiltinSpec { namespace: "debug", functions: DEBUG_FUNCTIONS },
    BuiltinSpec { namespace: "math", functions: MATH_FUNCTIONS },
];

/// Resolve `@name` to its fixed-table spec, or `None` for an unknown
/// builtin namespace.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static BuiltinSpec> {
    BUILTIN_SPECS.iter().find(|spec| spec.namespace == name)
}

/// Build and register a [`Module`] for `spec`, with every function declared
/// `external` and pre-exported, matching how pass 1 treats an ordinary
/// external function declaration: no body to walk, just a callable signature.
pub fn synthesize_module(registry: &mut ModuleRegistry, spec: &'static BuiltinSpec) -> crate::module::ModuleId {
    let synthetic_path = PathBuf::from(format!("@{}", spec.namespace));
    let loc = SourceLocation::new(Arc::from(synthetic_path.to_string_lossy().into_owned().as_str()), 1, 1);

    let mut arena = NodeArena::new();
    let mut statements = Vec::new();
    let mut exported_names = FxHashMap::default();

    for func in spec.functions {
        let params: Vec<Param> = func
            .params
            .iter()
            .map(|(name, kind)| Param {
                name: (*name).to_string(),
                type_ann: Some(TypeExpr::Primitive(*kind)),
                loc: loc.clone(),
            })
            .collect();
        let decl = arena.alloc(
            NodeKind::FunctionDecl {
                name: func.name.to_string(),
                params,
                return_type: func.return_type.map(TypeExpr::Primitive),
                body: None,
                is_external: true,
                is_variadic: func.variadic,
            },
            loc.clone(),
        );
        let export = arena.alloc(NodeKind::Export { decl }, loc.clone());
        statements.push(export);
        exported_names.insert(func.name.to_string(), decl);
    }

    let ast_root = arena.alloc(NodeKind::Program { statements }, loc);
    let type_ctx = TypeContext::new();
    let mut trait_registry = TraitRegistry::new();
    trait_registry.preload_display_for_primitives(&type_ctx);
    trait_registry.preload_arithmetic_for_primitives(&type_ctx);
    let mut symtab = SymbolTableArena::new();
    let module_scope = symtab.new_scope(None);

    let module = Module {
        absolute_path: synthetic_path.clone(),
        relative_path: synthetic_path.clone(),
        module_prefix: spec.namespace.to_string(),
        arena,
        ast_root,
        type_ctx,
        trait_registry,
        specializations: SpecializationStore::new(),
        symtab,
        module_scope,
        exported_names,
        imports: Vec::new(),
    };

    registry.push_synthetic(synthetic_path, module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_every_documented_namespace() {
        for name in ["io", "test", "debug", "math"] {
            assert!(lookup(name).is_some(), "missing builtin @{name}");
        }
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn synthesize_module_exports_every_function_as_external() {
        let mut registry = ModuleRegistry::new(Box::new(crate::module::InMemorySourceLoader::new()));
        let spec = lookup("math").unwrap();
        let id = synthesize_module(&mut registry, spec);
        let module = registry.get(id);
        assert_eq!(module.exported_names.len(), MATH_FUNCTIONS.len());
        let sqrt_decl = module.exported_names["sqrt"];
        match &module.arena[sqrt_decl].kind {
            jsasta_parser::NodeKind::FunctionDecl { is_external, body, .. } => {
                assert!(*is_external);
                assert!(body.is_none());
            }
            other => panic!("expected FunctionDecl, got {other:?}"),
        }
    }
}
