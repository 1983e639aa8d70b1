//! Structural type universe, trait registry, and specialization store:
//! structural type interning, operator/indexing trait dispatch, and
//! per-function monomorphization.

pub mod specialization;
pub mod traits;
pub mod types;

pub use specialization::{FunctionSpecialization, SpecializationId, SpecializationStore, SpecializedBody};
pub use traits::{BuiltinTrait, ImplId, MethodImpl, TraitDef, TraitImpl, TraitRegistry, operator_to_trait, unary_operator_to_trait};
pub use types::{FunctionType, ObjectField, ObjectType, TypeContext, TypeData, TypeId};
