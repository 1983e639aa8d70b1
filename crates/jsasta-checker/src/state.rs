//! Per-module bookkeeping the driver threads through every pass.
//!
//! Nothing here is persisted past one `check_module` call except
//! `fn_decls`/`spec_scopes`, which a later cross-module call site rebuilds
//! cheaply on demand rather than the `Module` itself carrying checker state.

use jsasta_binder::SymbolTableId;
use jsasta_parser::NodeId;
use jsasta_solver::{SpecializationId, TypeId};
use rustc_hash::FxHashMap;

/// What Pass 1 recorded about one declared function or method, so a later
/// call site (same module or cross-module) can clone its body on demand.
#[derive(Clone, Copy, Debug)]
pub struct FnDeclInfo {
    pub node: NodeId,
    pub is_external: bool,
    pub is_variadic: bool,
    /// `Some(ref StructName)` for a method; its `self` parameter is
    /// prepended to every specialization's `param_types` (see `DESIGN.md`
    /// for the method/`self` binding design decision).
    pub self_type: Option<TypeId>,
}

#[derive(Default)]
pub struct CheckState {
    pub fn_decls: FxHashMap<String, FnDeclInfo>,
    /// The child scope each specialization's params were declared into,
    /// kept so a later fixed-point iteration can re-walk the same body
    /// without re-declaring parameters.
    pub spec_scopes: FxHashMap<SpecializationId, SymbolTableId>,
    /// Insertion order of every specialization created so far, walked by
    /// the outer fixed-point loop on each re-entry.
    pub all_specializations: Vec<SpecializationId>,
}

impl CheckState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_specialization(&mut self, id: SpecializationId, scope: SymbolTableId) {
        if !self.spec_scopes.contains_key(&id) {
            self.spec_scopes.insert(id, scope);
            self.all_specializations.push(id);
        }
    }
}
