//! Centralized numeric limits referenced by more than one crate.
//!
//! Keeping these as named constants (rather than inline magic numbers in the
//! binder and checker) makes the compiler's cancellation/timeout
//! behavior auditable from one place.

/// Maximum scope-parent walk depth before `jsasta-binder` treats further
/// lookups as a cycle rather than infinite-looping.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum module load depth before `jsasta-binder`'s DFS assumes a cycle in
/// `import` resolution that its module-cache did not otherwise catch.
pub const MAX_MODULE_LOAD_DEPTH: usize = 1_000;

/// Maximum length of a mangled specialization name before it is considered
/// an internal error (guards against runaway recursive generic expansion
/// producing absurd identifiers).
pub const MAX_MANGLED_NAME_LEN: usize = 4_096;
