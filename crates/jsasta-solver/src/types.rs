//! The structural, interned type universe.
//!
//! `TypeContext` owns one arena per module. Every `TypeId` handed out by a
//! context is a stable index into that arena; because components (element
//! types, field types, parameter types) are always interned bottom-up before
//! the enclosing type is constructed, structural comparison at intern time
//! only has to compare already-interned `TypeId`s for equality rather than
//! recursively walking possibly-cyclic payloads — an in-progress visited-map
//! for cyclic structural comparison is unnecessary once every substructure is
//! required to be intern-complete before its parent is built (see `DESIGN.md`).

use jsasta_parser::{NodeId, PrimitiveKind};
use rustc_hash::FxHashMap;

/// Index into a [`TypeContext`]'s arena. Two `TypeId`s compare equal iff
/// they were structurally equal at intern time — interning is the sole
/// canonicalizer, so identity and structural equality coincide afterward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    #[must_use]
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("type arena overflow"))
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Round-trips through the raw `u32` annotation slots on [`jsasta_parser::Node`],
    /// which cannot name `TypeId` directly (the parser sits below this crate).
    #[must_use]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

/// One field of an object/struct type, in declared order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectField {
    pub name: String,
    pub type_id: TypeId,
}

/// A struct's declaration back-pointer, kept as a raw `NodeId` rather than a
/// borrowed reference: the owning `NodeArena` outlives the `TypeContext` for
/// the lifetime of one compile, and indices (unlike references) do not tie
/// `TypeData` to a lifetime parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectType {
    pub name: String,
    pub fields: Vec<ObjectField>,
    pub declaring_struct: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionType {
    pub param_types: Vec<TypeId>,
    pub return_type: TypeId,
    pub variadic: bool,
    /// Every parameter and the return type is known and non-`Unknown`: a
    /// single specialization can be created eagerly instead of waiting on
    /// a call site to supply argument types.
    pub is_fully_typed: bool,
}

/// One canonical type shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeData {
    Primitive(PrimitiveKind),
    /// `T[]` when `size` is `None`, `T[n]` otherwise.
    Array { element: TypeId, size: Option<u64> },
    /// `ref T`: the target is itself an interned type.
    Ref { target: TypeId, mutable: bool },
    Object(ObjectType),
    Function(FunctionType),
    /// The catch-all unresolved type, used when inference could not pin
    /// down a concrete shape and a diagnostic was already recorded.
    Unknown,
}

/// A module's private, structurally-interning type table.
///
/// Primitive singletons and the unknown type are created exactly once, at
/// construction — scoped per-module so each module's types live in their own
/// context, with cross-module comparison only ever happening through the
/// namespace-resolution protocol rather than shared identity.
pub struct TypeContext {
    arena: Vec<TypeData>,
    primitives: FxHashMap<PrimitiveKind, TypeId>,
    unknown: TypeId,
    /// Structural dedup tables, keyed on the already-interned components.
    arrays: FxHashMap<(TypeId, Option<u64>), TypeId>,
    refs: FxHashMap<(TypeId, bool), TypeId>,
    functions: FxHashMap<(Vec<TypeId>, TypeId, bool), TypeId>,
    /// Lookup-by-name table for struct/function types.
    names: FxHashMap<String, TypeId>,
}

impl TypeContext {
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Vec::new();
        let mut primitives = FxHashMap::default();
        for kind in ALL_PRIMITIVES {
            let id = TypeId::new(arena.len());
            arena.push(TypeData::Primitive(kind));
            primitives.insert(kind, id);
        }
        let unknown = TypeId::new(arena.len());
        arena.push(TypeData::Unknown);

        Self {
            arena,
            primitives,
            unknown,
            arrays: FxHashMap::default(),
            refs: FxHashMap::default(),
            functions: FxHashMap::default(),
            names: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.arena[id.index()]
    }

    #[must_use]
    pub fn unknown(&self) -> TypeId {
        self.unknown
    }

    #[must_use]
    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        self.primitives[&kind]
    }

    #[must_use]
    pub fn int(&self) -> TypeId {
        self.primitive(PrimitiveKind::Int)
    }

    #[must_use]
    pub fn double(&self) -> TypeId {
        self.primitive(PrimitiveKind::Double)
    }

    #[must_use]
    pub fn bool_(&self) -> TypeId {
        self.primitive(PrimitiveKind::Bool)
    }

    #[must_use]
    pub fn string(&self) -> TypeId {
        self.primitive(PrimitiveKind::String)
    }

    #[must_use]
    pub fn void(&self) -> TypeId {
        self.primitive(PrimitiveKind::Void)
    }

    /// `T[]`/`T[n]`, interned on `(element_type_identity, size)`.
    pub fn intern_array(&mut self, element: TypeId, size: Option<u64>) -> TypeId {
        if let Some(&id) = self.arrays.get(&(element, size)) {
            return id;
        }
        let id = self.push(TypeData::Array { element, size });
        self.arrays.insert((element, size), id);
        id
    }

    /// `ref T`, interned on `(target_type_identity, mutability)`.
    pub fn intern_ref(&mut self, target: TypeId, mutable: bool) -> TypeId {
        if let Some(&id) = self.refs.get(&(target, mutable)) {
            return id;
        }
        let id = self.push(TypeData::Ref { target, mutable });
        self.refs.insert((target, mutable), id);
        id
    }

    /// Function type, interned on `(param_types, return_type, variadic)`.
    /// `is_fully_typed` is not part of the dedup key: it is a derived flag
    /// of the other three, so two calls with the same signature and
    /// differing (incorrect) flag would be a caller bug, not a distinct type.
    pub fn intern_function(&mut self, func: FunctionType) -> TypeId {
        let key = (func.param_types.clone(), func.return_type, func.variadic);
        if let Some(&id) = self.functions.get(&key) {
            return id;
        }
        let id = self.push(TypeData::Function(func));
        self.functions.insert(key, id);
        id
    }

    /// Struct types are named and never structurally deduped against an
    /// unrelated anonymous shape: contextual typing of struct-literal fields
    /// reuses the declared struct type directly instead of interning a new
    /// anonymous one, so interning here is keyed on name alone.
    pub fn intern_object(&mut self, object: ObjectType) -> TypeId {
        if let Some(&id) = self.names.get(&object.name) {
            return id;
        }
        let name = object.name.clone();
        let id = self.push(TypeData::Object(object));
        self.names.insert(name, id);
        id
    }

    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// Register a function type under a name so later passes can find it by
    /// name without threading the `TypeId` through every caller.
    pub fn register_function_name(&mut self, name: impl Into<String>, id: TypeId) {
        self.names.insert(name.into(), id);
    }

    /// Structural equality after interning is index equality; exposed for
    /// callers that want to assert `a is b` explicitly rather than relying
    /// on `TypeId`'s `PartialEq`.
    #[must_use]
    pub fn is_same(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// `ref T` unwraps to `T`; returns the argument unchanged if it is
    /// not a ref type.
    #[must_use]
    pub fn unwrap_ref(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeData::Ref { target, .. } => *target,
            _ => id,
        }
    }

    #[must_use]
    pub fn is_ref(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Ref { .. })
    }

    /// Int-to-double and any-integer-to-any-integer promotion leniency used
    /// throughout inference for declared-type validation.
    #[must_use]
    pub fn numeric_promotion_allowed(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let (TypeData::Primitive(from_kind), TypeData::Primitive(to_kind)) =
            (self.get(from), self.get(to))
        else {
            return false;
        };
        if from_kind.is_integer() && *to_kind == PrimitiveKind::Double {
            return true;
        }
        from_kind.is_integer() && to_kind.is_integer()
    }

    fn push(&mut self, data: TypeData) -> TypeId {
        let id = TypeId::new(self.arena.len());
        self.arena.push(data);
        id
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

const ALL_PRIMITIVES: [PrimitiveKind; 14] = [
    PrimitiveKind::I8,
    PrimitiveKind::I16,
    PrimitiveKind::I32,
    PrimitiveKind::I64,
    PrimitiveKind::U8,
    PrimitiveKind::U16,
    PrimitiveKind::U32,
    PrimitiveKind::U64,
    PrimitiveKind::Int,
    PrimitiveKind::Double,
    PrimitiveKind::Bool,
    PrimitiveKind::String,
    PrimitiveKind::Str,
    PrimitiveKind::Void,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_pointer_comparable_singletons() {
        let ctx = TypeContext::new();
        assert_eq!(ctx.int(), ctx.primitive(PrimitiveKind::Int));
        assert_ne!(ctx.int(), ctx.double());
    }

    #[test]
    fn structurally_equal_arrays_share_one_allocation() {
        let mut ctx = TypeContext::new();
        let a = ctx.intern_array(ctx.int(), None);
        let b = ctx.intern_array(ctx.int(), None);
        assert_eq!(a, b);
        let sized = ctx.intern_array(ctx.int(), Some(10));
        assert_ne!(a, sized);
    }

    #[test]
    fn ref_interning_distinguishes_mutability() {
        let mut ctx = TypeContext::new();
        let immutable = ctx.intern_ref(ctx.int(), false);
        let mutable = ctx.intern_ref(ctx.int(), true);
        assert_ne!(immutable, mutable);
        assert_eq!(ctx.unwrap_ref(mutable), ctx.int());
    }

    #[test]
    fn function_interning_dedups_on_full_signature() {
        let mut ctx = TypeContext::new();
        let sig = FunctionType {
            param_types: vec![ctx.int(), ctx.int()],
            return_type: ctx.int(),
            variadic: false,
            is_fully_typed: true,
        };
        let a = ctx.intern_function(sig.clone());
        let b = ctx.intern_function(sig);
        assert_eq!(a, b);
    }

    #[test]
    fn object_types_are_named_and_never_duplicated() {
        let mut ctx = TypeContext::new();
        let vec_ty = ObjectType {
            name: "Vec".to_string(),
            fields: vec![
                ObjectField { name: "x".to_string(), type_id: ctx.int() },
                ObjectField { name: "y".to_string(), type_id: ctx.int() },
            ],
            declaring_struct: None,
        };
        let a = ctx.intern_object(vec_ty.clone());
        let b = ctx.intern_object(vec_ty);
        assert_eq!(a, b);
        assert_eq!(ctx.lookup_name("Vec"), Some(a));
    }

    #[test]
    fn numeric_promotion_allows_int_to_double_and_integer_widening() {
        let ctx = TypeContext::new();
        assert!(ctx.numeric_promotion_allowed(ctx.int(), ctx.double()));
        assert!(ctx.numeric_promotion_allowed(ctx.primitive(PrimitiveKind::U8), ctx.primitive(PrimitiveKind::I64)));
        assert!(!ctx.numeric_promotion_allowed(ctx.double(), ctx.int()));
        assert!(!ctx.numeric_promotion_allowed(ctx.string(), ctx.int()));
    }
}
