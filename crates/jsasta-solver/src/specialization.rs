//! Per-function specialization store.
//!
//! Only the bookkeeping half lives here: identity, idempotent insertion,
//! and lookup. The `create_body` operation itself — clone the
//! original body, install parameters, recurse into inference — needs the
//! type-inference driver that sits above this crate in the dependency graph,
//! so it is implemented by `jsasta-checker` against the `SpecializedBody`
//! slot this module defines (see `DESIGN.md`).

use crate::TypeId;
use jsasta_common::limits::MAX_MANGLED_NAME_LEN;
use jsasta_parser::{NodeArena, NodeId, PrimitiveKind};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};

use crate::types::{TypeContext, TypeData};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpecializationId(u32);

impl SpecializationId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("specialization table overflow"))
    }
}

/// A specialization's body, before and after `create_body` has run.
///
/// `Cloned` bodies are owned here, not by the original module's arena:
/// a specialization's cloned body belongs to its specialization entry,
/// not to the AST it was cloned from.
#[derive(Debug, Default)]
pub enum SpecializedBody {
    /// External/variadic functions, and user functions not yet cloned.
    #[default]
    None,
    Cloned {
        arena: NodeArena,
        root: NodeId,
    },
}

/// One monomorphized instance of a function: the original name, its mangled
/// name, the concrete parameter types it was specialized for, and the
/// resulting return type and body. Membership in the owning
/// [`SpecializationStore`]'s per-name `Vec` stands in for an explicit
/// linked-list pointer.
#[derive(Debug)]
pub struct FunctionSpecialization {
    pub original_name: String,
    pub mangled_name: String,
    pub param_types: Vec<TypeId>,
    /// Filled in once inference on the cloned body completes; `None` while
    /// `create_body` is running (cycle guard for recursive functions).
    pub return_type: Cell<Option<TypeId>>,
    pub specialized_body: RefCell<SpecializedBody>,
}

impl FunctionSpecialization {
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_types.len()
    }
}

/// Per-function-name set of specializations.
///
/// Identity of a specialization is `(function_name, param_types)` compared
/// by `TypeId` equality (interned types compare by pointer/index equality),
/// so `add_by_types` is naturally idempotent: a second call with the same
/// signature returns the existing entry rather than allocating another one.
#[derive(Default)]
pub struct SpecializationStore {
    entries: Vec<FunctionSpecialization>,
    by_name: FxHashMap<String, Vec<SpecializationId>>,
}

impl SpecializationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: SpecializationId) -> &FunctionSpecialization {
        &self.entries[id.0 as usize]
    }

    /// Looks up an existing specialization by exact parameter type match.
    #[must_use]
    pub fn find_by_types(&self, name: &str, param_types: &[TypeId]) -> Option<SpecializationId> {
        let ids = self.by_name.get(name)?;
        ids.iter()
            .copied()
            .find(|&id| self.entries[id.0 as usize].param_types == param_types)
    }

    /// Idempotent: calling this twice with the same `(name, param_types)`
    /// returns the same id and never duplicates the entry.
    pub fn add_by_types(&mut self, type_ctx: &TypeContext, name: &str, param_types: Vec<TypeId>) -> SpecializationId {
        if let Some(existing) = self.find_by_types(name, &param_types) {
            return existing;
        }
        let mangled_name = mangle_specialization_name(type_ctx, name, &param_types);
        tracing::debug!(target: "jsasta_solver::specialization", name, mangled_name, "new specialization");
        let id = SpecializationId::new(self.entries.len());
        self.entries.push(FunctionSpecialization {
            original_name: name.to_string(),
            mangled_name,
            param_types,
            return_type: Cell::new(None),
            specialized_body: RefCell::new(SpecializedBody::None),
        });
        self.by_name.entry(name.to_string()).or_default().push(id);
        id
    }

    /// All specializations recorded for a given function name.
    #[must_use]
    pub fn get_all_for(&self, name: &str) -> Vec<SpecializationId> {
        self.by_name.get(name).cloned().unwrap_or_default()
    }

    /// Total count across every function name; the fixed-point loop in
    /// `jsasta-checker` compares this across inference passes to detect
    /// when no new specializations were created and inference has settled.
    #[must_use]
    pub fn specialization_count(&self) -> usize {
        self.entries.len()
    }
}

/// Builds a mangled name of the form `<func>_<t1>_<t2>...`. Truncated to
/// `MAX_MANGLED_NAME_LEN` as a hard ceiling against pathological nested array
/// types producing an unbounded fragment string.
fn mangle_specialization_name(ctx: &TypeContext, func_name: &str, param_types: &[TypeId]) -> String {
    let mut name = func_name.to_string();
    for &ty in param_types {
        name.push('_');
        name.push_str(&type_mangle_fragment(ctx, ty));
    }
    name.truncate(MAX_MANGLED_NAME_LEN);
    name
}

fn type_mangle_fragment(ctx: &TypeContext, id: TypeId) -> String {
    match ctx.get(id) {
        TypeData::Primitive(kind) => primitive_fragment(*kind).to_string(),
        TypeData::Array { element, size } => match size {
            Some(n) => format!("{}arr{n}", type_mangle_fragment(ctx, *element)),
            None => format!("{}arr", type_mangle_fragment(ctx, *element)),
        },
        TypeData::Ref { target, mutable } => {
            let prefix = if *mutable { "refmut" } else { "ref" };
            format!("{prefix}{}", type_mangle_fragment(ctx, *target))
        }
        TypeData::Object(object) => object.name.clone(),
        TypeData::Function(_) => "fn".to_string(),
        TypeData::Unknown => "unknown".to_string(),
    }
}

fn primitive_fragment(kind: PrimitiveKind) -> &'static str {
    kind.name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_by_types_is_idempotent() {
        let mut ctx = TypeContext::new();
        let mut store = SpecializationStore::new();
        let params = vec![ctx.int(), ctx.int()];
        let a = store.add_by_types(&ctx, "add", params.clone());
        let b = store.add_by_types(&ctx, "add", params);
        assert_eq!(a, b);
        assert_eq!(store.specialization_count(), 1);
    }

    #[test]
    fn distinct_signatures_mangle_distinctly() {
        let mut ctx = TypeContext::new();
        let mut store = SpecializationStore::new();
        let int_spec = store.add_by_types(&ctx, "add", vec![ctx.int(), ctx.int()]);
        let double_spec = store.add_by_types(&ctx, "add", vec![ctx.double(), ctx.double()]);
        assert_ne!(int_spec, double_spec);
        assert_eq!(store.get(int_spec).mangled_name, "add_int_int");
        assert_eq!(store.get(double_spec).mangled_name, "add_double_double");
    }

    #[test]
    fn get_all_for_returns_every_specialization_of_a_name() {
        let mut ctx = TypeContext::new();
        let mut store = SpecializationStore::new();
        store.add_by_types(&ctx, "add", vec![ctx.int(), ctx.int()]);
        store.add_by_types(&ctx, "add", vec![ctx.double(), ctx.double()]);
        store.add_by_types(&ctx, "sub", vec![ctx.int(), ctx.int()]);
        assert_eq!(store.get_all_for("add").len(), 2);
        assert_eq!(store.get_all_for("sub").len(), 1);
        assert!(store.get_all_for("missing").is_empty());
    }

    #[test]
    fn find_by_types_distinguishes_on_exact_param_vector() {
        let mut ctx = TypeContext::new();
        let mut store = SpecializationStore::new();
        store.add_by_types(&ctx, "f", vec![ctx.int()]);
        assert!(store.find_by_types("f", &[ctx.int()]).is_some());
        assert!(store.find_by_types("f", &[ctx.double()]).is_none());
        assert!(store.find_by_types("f", &[ctx.int(), ctx.int()]).is_none());
    }
}
