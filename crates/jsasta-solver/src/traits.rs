//! Trait/impl registry for operator and indexing dispatch.
//!
//! The inference driver never hard-codes "what does `+` on a string do" —
//! it asks [`operator_to_trait`] for the trait, then [`TraitRegistry::find_impl`]
//! (falling back to [`TraitRegistry::auto_impl`] for built-ins) for the impl,
//! then reads the `Output` associated type off it.

use crate::types::TypeContext;
use crate::TypeId;
use jsasta_parser::{BinaryOp, PrimitiveKind, UnaryOp};
use rustc_hash::FxHashMap;

/// The fixed set of traits initialized at registry construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinTrait {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ord,
    Not,
    Neg,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Index,
    RefIndex,
    Length,
    Display,
}

impl BuiltinTrait {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Sub => "Sub",
            Self::Mul => "Mul",
            Self::Div => "Div",
            Self::Rem => "Rem",
            Self::BitAnd => "BitAnd",
            Self::BitOr => "BitOr",
            Self::BitXor => "BitXor",
            Self::Shl => "Shl",
            Self::Shr => "Shr",
            Self::Eq => "Eq",
            Self::Ord => "Ord",
            Self::Not => "Not",
            Self::Neg => "Neg",
            Self::AddAssign => "AddAssign",
            Self::SubAssign => "SubAssign",
            Self::MulAssign => "MulAssign",
            Self::DivAssign => "DivAssign",
            Self::Index => "Index",
            Self::RefIndex => "RefIndex",
            Self::Length => "Length",
            Self::Display => "Display",
        }
    }

    /// Traits that take a type parameter (`Rhs` or `Idx`), vs. ones that
    /// only close over `Self` (`Not`, `Neg`, `Length`, `Display`).
    #[must_use]
    pub fn takes_type_param(self) -> bool {
        !matches!(self, Self::Not | Self::Neg | Self::Length | Self::Display)
    }
}

/// `op` in `a op b` dispatches through this trait.
#[must_use]
pub fn operator_to_trait(op: BinaryOp) -> Option<BuiltinTrait> {
    Some(match op {
        BinaryOp::Add => BuiltinTrait::Add,
        BinaryOp::Sub => BuiltinTrait::Sub,
        BinaryOp::Mul => BuiltinTrait::Mul,
        BinaryOp::Div => BuiltinTrait::Div,
        BinaryOp::Rem => BuiltinTrait::Rem,
        BinaryOp::BitAnd => BuiltinTrait::BitAnd,
        BinaryOp::BitOr => BuiltinTrait::BitOr,
        BinaryOp::BitXor => BuiltinTrait::BitXor,
        BinaryOp::Shl => BuiltinTrait::Shl,
        BinaryOp::Shr => BuiltinTrait::Shr,
        BinaryOp::Eq | BinaryOp::Ne => BuiltinTrait::Eq,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => BuiltinTrait::Ord,
        // `&&`/`||` short-circuit to bool directly; they never consult the registry.
        BinaryOp::And | BinaryOp::Or => return None,
    })
}

#[must_use]
pub fn unary_operator_to_trait(op: UnaryOp) -> BuiltinTrait {
    match op {
        UnaryOp::Not => BuiltinTrait::Not,
        UnaryOp::Neg => BuiltinTrait::Neg,
    }
}

/// A trait definition: name, arity of type parameters, associated type names,
/// and the method names it declares.
#[derive(Clone, Debug)]
pub struct TraitDef {
    pub trait_: BuiltinTrait,
    pub type_param_names: Vec<&'static str>,
    pub assoc_type_names: Vec<&'static str>,
    pub method_names: Vec<&'static str>,
}

/// How a trait method is realized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodImpl {
    /// A C ABI symbol name, resolved at the codegen boundary.
    External(String),
    /// A compiler-synthesized lowering; there is no AST body to walk.
    /// Codegen emission itself is out of scope here.
    Intrinsic,
    /// A user-written method body, referenced by node id in its struct's
    /// (or specialization's) own arena.
    Script(jsasta_parser::NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImplId(u32);

impl ImplId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("trait impl table overflow"))
    }
}

/// A registered impl: the trait, `Self` type, bound type parameters,
/// bound associated types, and the methods it realizes.
#[derive(Clone, Debug)]
pub struct TraitImpl {
    pub trait_: BuiltinTrait,
    pub self_type: TypeId,
    pub type_param_bindings: Vec<TypeId>,
    pub assoc_type_bindings: FxHashMap<&'static str, TypeId>,
    pub methods: Vec<(&'static str, MethodImpl)>,
}

/// Trait definitions plus the growing table of impls, including ones
/// synthesized on demand by [`TraitRegistry::auto_impl`].
pub struct TraitRegistry {
    defs: FxHashMap<BuiltinTrait, TraitDef>,
    impls: Vec<TraitImpl>,
    by_trait_self: FxHashMap<(BuiltinTrait, TypeId), Vec<ImplId>>,
}

const BUILTIN_TRAITS: &[(BuiltinTrait, &[&str], &[&str], &[&str])] = &[
    (BuiltinTrait::Add, &["Rhs"], &["Output"], &["add"]),
    (BuiltinTrait::Sub, &["Rhs"], &["Output"], &["sub"]),
    (BuiltinTrait::Mul, &["Rhs"], &["Output"], &["mul"]),
    (BuiltinTrait::Div, &["Rhs"], &["Output"], &["div"]),
    (BuiltinTrait::Rem, &["Rhs"], &["Output"], &["rem"]),
    (BuiltinTrait::BitAnd, &["Rhs"], &["Output"], &["bitand"]),
    (BuiltinTrait::BitOr, &["Rhs"], &["Output"], &["bitor"]),
    (BuiltinTrait::BitXor, &["Rhs"], &["Output"], &["bitxor"]),
    (BuiltinTrait::Shl, &["Rhs"], &["Output"], &["shl"]),
    (BuiltinTrait::Shr, &["Rhs"], &["Output"], &["shr"]),
    (BuiltinTrait::Eq, &["Rhs"], &[], &["eq"]),
    (BuiltinTrait::Ord, &["Rhs"], &[], &["cmp"]),
    (BuiltinTrait::Not, &[], &["Output"], &["not"]),
    (BuiltinTrait::Neg, &[], &["Output"], &["neg"]),
    (BuiltinTrait::AddAssign, &["Rhs"], &[], &["add_assign"]),
    (BuiltinTrait::SubAssign, &["Rhs"], &[], &["sub_assign"]),
    (BuiltinTrait::MulAssign, &["Rhs"], &[], &["mul_assign"]),
    (BuiltinTrait::DivAssign, &["Rhs"], &[], &["div_assign"]),
    (BuiltinTrait::Index, &["Idx"], &["Output"], &["index"]),
    (BuiltinTrait::RefIndex, &["Idx"], &["Output"], &["ref_index"]),
    (BuiltinTrait::Length, &[], &["Output"], &["length"]),
    (BuiltinTrait::Display, &[], &[], &["display"]),
];

impl TraitRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut defs = FxHashMap::default();
        for &(trait_, type_params, assoc_types, methods) in BUILTIN_TRAITS {
            defs.insert(
                trait_,
                TraitDef {
                    trait_,
                    type_param_names: type_params.to_vec(),
                    assoc_type_names: assoc_types.to_vec(),
                    method_names: methods.to_vec(),
                },
            );
        }
        Self { defs, impls: Vec::new(), by_trait_self: FxHashMap::default() }
    }

    #[must_use]
    pub fn def(&self, trait_: BuiltinTrait) -> &TraitDef {
        &self.defs[&trait_]
    }

    /// Installs `imp`; returns the existing impl's id instead of duplicating
    /// when one already covers `(trait_, self_type, type_param_bindings)`.
    pub fn register_impl(&mut self, imp: TraitImpl) -> ImplId {
        if let Some(existing) = self.find_impl(imp.trait_, imp.self_type, &imp.type_param_bindings) {
            return existing.0;
        }
        let key = (imp.trait_, imp.self_type);
        tracing::debug!(target: "jsasta_solver::traits", trait_ = imp.trait_.name(), "registering impl");
        let id = ImplId::new(self.impls.len());
        self.impls.push(imp);
        self.by_trait_self.entry(key).or_default().push(id);
        id
    }

    /// Looks up an impl by `(trait, self_type, type_param_bindings)`. An empty
    /// `type_param_bindings` slice matches the first impl found for
    /// `(trait, self_type)` regardless of its own bindings, which covers
    /// callers (unary traits, `Length`, `Display`) that have no `Rhs`/`Idx`.
    #[must_use]
    pub fn find_impl(
        &self,
        trait_: BuiltinTrait,
        self_type: TypeId,
        type_param_bindings: &[TypeId],
    ) -> Option<(ImplId, &TraitImpl)> {
        let ids = self.by_trait_self.get(&(trait_, self_type))?;
        for &id in ids {
            let imp = &self.impls[id.0 as usize];
            if type_param_bindings.is_empty() || imp.type_param_bindings == type_param_bindings {
                return Some((id, imp));
            }
        }
        None
    }

    /// Looks up an associated type bound on the impl matching `(trait, self_type, type_param_bindings)`.
    #[must_use]
    pub fn get_assoc_type(
        &self,
        trait_: BuiltinTrait,
        self_type: TypeId,
        type_param_bindings: &[TypeId],
        name: &str,
    ) -> Option<TypeId> {
        let (_, imp) = self.find_impl(trait_, self_type, type_param_bindings)?;
        imp.assoc_type_bindings.get(name).copied()
    }

    /// Synthesizes `Index`/`RefIndex`/`Length` for arrays and `string`/`str`,
    /// and returns the (possibly freshly-registered) impl. Returns `None` for
    /// any other combination — the caller reports a `TYPE_TRAIT_NOT_IMPLEMENTED`
    /// diagnostic in that case.
    pub fn auto_impl(
        &mut self,
        type_ctx: &mut TypeContext,
        trait_: BuiltinTrait,
        self_type: TypeId,
    ) -> Option<ImplId> {
        if let Some((id, _)) = self.find_impl(trait_, self_type, &[]) {
            return Some(id);
        }
        match trait_ {
            BuiltinTrait::Index | BuiltinTrait::RefIndex => self.auto_impl_index(type_ctx, trait_, self_type),
            BuiltinTrait::Length => self.auto_impl_length(type_ctx, self_type),
            BuiltinTrait::Display => self.auto_impl_display(self_type),
            _ => None,
        }
    }

    fn auto_impl_index(
        &mut self,
        type_ctx: &mut TypeContext,
        trait_: BuiltinTrait,
        self_type: TypeId,
    ) -> Option<ImplId> {
        use crate::types::TypeData;
        let output = match type_ctx.get(self_type) {
            TypeData::Array { element, .. } => *element,
            TypeData::Primitive(PrimitiveKind::String | PrimitiveKind::Str) => {
                type_ctx.primitive(PrimitiveKind::U8)
            }
            _ => return None,
        };
        let int_ty = type_ctx.int();
        let mut assoc = FxHashMap::default();
        assoc.insert("Output", output);
        Some(self.register_impl(TraitImpl {
            trait_,
            self_type,
            type_param_bindings: vec![int_ty],
            assoc_type_bindings: assoc,
            methods: vec![(if trait_ == BuiltinTrait::Index { "index" } else { "ref_index" }, MethodImpl::Intrinsic)],
        }))
    }

    fn auto_impl_length(&mut self, type_ctx: &mut TypeContext, self_type: TypeId) -> Option<ImplId> {
        use crate::types::TypeData;
        match type_ctx.get(self_type) {
            TypeData::Array { .. } | TypeData::Primitive(PrimitiveKind::String | PrimitiveKind::Str) => {}
            _ => return None,
        }
        let int_ty = type_ctx.int();
        let mut assoc = FxHashMap::default();
        assoc.insert("Output", int_ty);
        Some(self.register_impl(TraitImpl {
            trait_: BuiltinTrait::Length,
            self_type,
            type_param_bindings: vec![],
            assoc_type_bindings: assoc,
            methods: vec![("length", MethodImpl::Intrinsic)],
        }))
    }

    fn auto_impl_display(&mut self, self_type: TypeId) -> Option<ImplId> {
        Some(self.register_impl(TraitImpl {
            trait_: BuiltinTrait::Display,
            self_type,
            type_param_bindings: vec![],
            assoc_type_bindings: FxHashMap::default(),
            methods: vec![("display", MethodImpl::Intrinsic)],
        }))
    }

    /// Pre-implements arithmetic, comparison, and bitwise traits for every
    /// primitive, installed up front at registry construction. Unlike
    /// `Index`/`RefIndex`/`Length`, primitive arithmetic has no array/string
    /// fallback to synthesize lazily from, so it is preloaded the same way
    /// `Display` is rather than routed through [`Self::auto_impl`].
    pub fn preload_arithmetic_for_primitives(&mut self, type_ctx: &TypeContext) {
        use PrimitiveKind::{Double, I16, I32, I64, I8, Int, Str, String as Str_, U16, U32, U64, U8};

        const NUMERIC: [PrimitiveKind; 10] = [I8, I16, I32, I64, U8, U16, U32, U64, Int, Double];
        const INTEGER: [PrimitiveKind; 9] = [I8, I16, I32, I64, U8, U16, U32, U64, Int];

        for kind in NUMERIC {
            let ty = type_ctx.primitive(kind);
            for trait_ in [
                BuiltinTrait::Add,
                BuiltinTrait::Sub,
                BuiltinTrait::Mul,
                BuiltinTrait::Div,
                BuiltinTrait::Eq,
                BuiltinTrait::Ord,
                BuiltinTrait::AddAssign,
                BuiltinTrait::SubAssign,
                BuiltinTrait::MulAssign,
                BuiltinTrait::DivAssign,
            ] {
                self.register_self_op(trait_, ty, ty);
            }
            self.register_unary_op(BuiltinTrait::Neg, ty, ty);
        }
        for kind in INTEGER {
            let ty = type_ctx.primitive(kind);
            for trait_ in [BuiltinTrait::Rem, BuiltinTrait::BitAnd, BuiltinTrait::BitOr, BuiltinTrait::BitXor, BuiltinTrait::Shl, BuiltinTrait::Shr] {
                self.register_self_op(trait_, ty, ty);
            }
        }

        let bool_ty = type_ctx.bool_();
        self.register_self_op(BuiltinTrait::Eq, bool_ty, bool_ty);
        self.register_unary_op(BuiltinTrait::Not, bool_ty, bool_ty);

        for kind in [Str_, Str] {
            let ty = type_ctx.primitive(kind);
            self.register_self_op(BuiltinTrait::Add, ty, ty);
            self.register_self_op(BuiltinTrait::Eq, ty, ty);
            self.register_self_op(BuiltinTrait::Ord, ty, ty);
        }
    }

    /// Registers a binary built-in's impl with `Rhs = rhs` and, if the trait
    /// declares one, `Output = self_type` (the common "same-type in, same-type
    /// out" shape every primitive arithmetic/comparison impl shares here).
    fn register_self_op(&mut self, trait_: BuiltinTrait, self_type: TypeId, rhs: TypeId) {
        let mut assoc = FxHashMap::default();
        if self.def(trait_).assoc_type_names.contains(&"Output") {
            assoc.insert("Output", self_type);
        }
        let method = self.def(trait_).method_names[0];
        self.register_impl(TraitImpl {
            trait_,
            self_type,
            type_param_bindings: vec![rhs],
            assoc_type_bindings: assoc,
            methods: vec![(method, MethodImpl::Intrinsic)],
        });
    }

    fn register_unary_op(&mut self, trait_: BuiltinTrait, self_type: TypeId, output: TypeId) {
        let mut assoc = FxHashMap::default();
        assoc.insert("Output", output);
        let method = self.def(trait_).method_names[0];
        self.register_impl(TraitImpl {
            trait_,
            self_type,
            type_param_bindings: vec![],
            assoc_type_bindings: assoc,
            methods: vec![(method, MethodImpl::Intrinsic)],
        });
    }

    /// `Display` is pre-implemented for every primitive at startup,
    /// rather than waiting for first use.
    pub fn preload_display_for_primitives(&mut self, type_ctx: &TypeContext) {
        for kind in [
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
        ] {
            self.auto_impl_display(type_ctx.primitive(kind));
        }
    }
}

impl Default for TraitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_to_trait_maps_arithmetic_and_comparison() {
        assert_eq!(operator_to_trait(BinaryOp::Add), Some(BuiltinTrait::Add));
        assert_eq!(operator_to_trait(BinaryOp::Lt), Some(BuiltinTrait::Ord));
        assert_eq!(operator_to_trait(BinaryOp::And), None);
    }

    #[test]
    fn auto_impl_index_on_array_yields_element_output() {
        let mut ctx = TypeContext::new();
        let mut registry = TraitRegistry::new();
        let array_ty = ctx.intern_array(ctx.int(), None);
        let id = registry.auto_impl(&mut ctx, BuiltinTrait::Index, array_ty).expect("auto-impl");
        let output = registry.get_assoc_type(BuiltinTrait::Index, array_ty, &[ctx.int()], "Output");
        assert_eq!(output, Some(ctx.int()));
        // Second request reuses the same impl rather than duplicating it.
        let again = registry.auto_impl(&mut ctx, BuiltinTrait::Index, array_ty).expect("auto-impl");
        assert_eq!(id, again);
    }

    #[test]
    fn auto_impl_index_on_string_yields_u8() {
        let mut ctx = TypeContext::new();
        let mut registry = TraitRegistry::new();
        let string_ty = ctx.string();
        registry.auto_impl(&mut ctx, BuiltinTrait::Index, string_ty).expect("auto-impl");
        let output = registry.get_assoc_type(BuiltinTrait::Index, string_ty, &[ctx.int()], "Output");
        assert_eq!(output, Some(ctx.primitive(PrimitiveKind::U8)));
    }

    #[test]
    fn auto_impl_refuses_unsupported_self_type() {
        let mut ctx = TypeContext::new();
        let mut registry = TraitRegistry::new();
        assert!(registry.auto_impl(&mut ctx, BuiltinTrait::Index, ctx.bool_()).is_none());
    }

    #[test]
    fn length_auto_impl_yields_int() {
        let mut ctx = TypeContext::new();
        let mut registry = TraitRegistry::new();
        let array_ty = ctx.intern_array(ctx.int(), None);
        registry.auto_impl(&mut ctx, BuiltinTrait::Length, array_ty).expect("auto-impl");
        let output = registry.get_assoc_type(BuiltinTrait::Length, array_ty, &[], "Output");
        assert_eq!(output, Some(ctx.int()));
    }

    #[test]
    fn preload_display_covers_every_primitive() {
        let ctx = TypeContext::new();
        let mut registry = TraitRegistry::new();
        registry.preload_display_for_primitives(&ctx);
        assert!(registry.find_impl(BuiltinTrait::Display, ctx.int(), &[]).is_some());
        assert!(registry.find_impl(BuiltinTrait::Display, ctx.string(), &[]).is_some());
    }
}
