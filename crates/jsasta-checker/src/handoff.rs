//! The downstream codegen interface.
//!
//! Code generation itself is explicitly out of scope. This module documents,
//! in typed form, exactly what [`crate::check_program`] hands a hypothetical
//! codegen crate so the contract is checkable even though nothing on the
//! other side of it is implemented here.

use jsasta_binder::{Module, ModuleRegistry};

/// A read-only view of everything a code generator needs out of one checked
/// module:
///
/// - the parsed AST, with a resolved `type_id` on every expression node;
/// - the module's own `TypeContext`, for type lookup;
/// - the per-function specialization lists, for function emission and
///   call-site dispatch (mangled names, cloned bodies);
/// - the symbol tables hanging off scopes, for variable lookups.
///
/// The codegen must respect: specialization names are already mangled
/// (`FunctionSpecialization.mangled_name`), a specialization's
/// cloned body is the body to emit (never the original declaration's body),
/// and `property_index` recorded on `MemberAccess`/`MemberAssignment` nodes
/// is the struct field's emit-time slot.
pub struct CodegenHandoff<'a> {
    pub module: &'a Module,
    pub registry: &'a ModuleRegistry,
}

impl<'a> CodegenHandoff<'a> {
    #[must_use]
    pub fn new(module: &'a Module, registry: &'a ModuleRegistry) -> Self {
        Self { module, registry }
    }

    /// Whether this module's typed AST is safe to hand to codegen: no
    /// accumulated diagnostic reached [`jsasta_common::diagnostics::DiagnosticSeverity::Error`]
    /// severity for it. Each entry point to a later phase checks
    /// `has_errors` and skips codegen accordingly. The caller supplies the
    /// sink since `jsasta-checker` itself accepts one externally rather than
    /// owning it.
    #[must_use]
    pub fn ready_for_codegen(diag: &jsasta_common::diagnostics::DiagnosticSink) -> bool {
        !diag.has_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsasta_binder::{InMemorySourceLoader, ModuleRegistry};
    use jsasta_common::diagnostics::DiagnosticSink;
    use jsasta_common::options::CompileOptions;

    #[test]
    fn ready_for_codegen_reflects_accumulated_errors() {
        let mut loader = InMemorySourceLoader::new();
        loader.add("main.jsa", "function main(): int { return y; }");
        let mut registry = ModuleRegistry::new(Box::new(loader));
        let mut diag = DiagnosticSink::new();
        let id = registry.load_entry(std::path::Path::new("main.jsa"), &mut diag).unwrap();
        crate::check_program(&mut registry, &mut diag, &CompileOptions::default());
        assert!(!CodegenHandoff::ready_for_codegen(&diag));

        let module = registry.get(id);
        let handoff = CodegenHandoff::new(module, &registry);
        assert_eq!(handoff.module.module_prefix, "main");
    }
}
