//! Module loader, import resolver, and per-scope symbol tables:
//! builds the module dependency graph and wires namespaced symbol lookups.

pub mod builtins;
mod error;
pub mod module;
pub mod symbol_table;

pub use module::{
    module_prefix_from_path, normalize_path, FsSourceLoader, InMemorySourceLoader, Module,
    ModuleId, ModuleRegistry, SourceLoader,
};
pub use symbol_table::{SymbolEntry, SymbolId, SymbolKind, SymbolTableArena, SymbolTableId};
