//! Per-scope symbol tables.
//!
//! Conceptually a symbol table is a singly-linked frame of entries plus a
//! parent pointer. Here that becomes an arena of frames indexed by
//! `SymbolTableId`, each frame holding `SymbolId`s into a flat entry arena —
//! the same index-not-pointer substitution used for `NodeId`/`TypeId`.

use jsasta_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use jsasta_parser::NodeId;
use jsasta_solver::TypeId;
use rustc_hash::FxHashMap;
use std::cell::Cell;

use crate::ModuleId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("symbol table overflow"))
    }

    /// Raw index, for stashing into a `Node`'s `symbol_id` annotation cell.
    pub fn to_raw(self) -> u32 {
        self.0
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolTableId(u32);

impl SymbolTableId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("scope arena overflow"))
    }
}

/// The kinds of binding a scope can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    NamespaceImport,
    TypeAlias,
}

/// One bound name: its type, constness, kind, declaring node, and (for
/// parameters and namespace imports) an index or back-reference.
#[derive(Debug)]
pub struct SymbolEntry {
    pub name: String,
    /// Mutable because a variable's type starts `Unknown` and is filled in
    /// by later inference passes once its initializer is typed.
    pub type_id: Cell<TypeId>,
    pub is_const: bool,
    pub kind: SymbolKind,
    pub declaring_node: NodeId,
    pub param_index: Option<u32>,
    pub imported_module: Option<ModuleId>,
}

struct Frame {
    parent: Option<SymbolTableId>,
    bindings: FxHashMap<String, SymbolId>,
}

/// Owns every scope frame and symbol entry for one module; its lifetime
/// matches the `Module` that owns this arena.
#[derive(Default)]
pub struct SymbolTableArena {
    frames: Vec<Frame>,
    entries: Vec<SymbolEntry>,
}

impl SymbolTableArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Each lexical scope (program, block, for-init, function body) owns one
    /// table.
    pub fn new_scope(&mut self, parent: Option<SymbolTableId>) -> SymbolTableId {
        let id = SymbolTableId::new(self.frames.len());
        self.frames.push(Frame { parent, bindings: FxHashMap::default() });
        id
    }

    /// Binds `name` in `scope`, shadowing any binding of the same name
    /// already present in that exact frame. Returns the new entry's id.
    pub fn declare(&mut self, scope: SymbolTableId, entry: SymbolEntry) -> SymbolId {
        let name = entry.name.clone();
        let id = SymbolId::new(self.entries.len());
        self.entries.push(entry);
        self.frames[scope.0 as usize].bindings.insert(name, id);
        id
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> &SymbolEntry {
        &self.entries[id.0 as usize]
    }

    /// Walks `scope` and its parents looking for `name`, bounded by
    /// `MAX_SCOPE_WALK_ITERATIONS` as a backstop against a malformed parent
    /// chain.
    #[must_use]
    pub fn lookup(&self, scope: SymbolTableId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        let mut steps = 0;
        while let Some(id) = current {
            if steps >= MAX_SCOPE_WALK_ITERATIONS {
                tracing::warn!(target: "jsasta_binder::symbol_table", name, "scope walk exceeded iteration cap");
                return None;
            }
            let frame = &self.frames[id.0 as usize];
            if let Some(&found) = frame.bindings.get(name) {
                return Some(found);
            }
            current = frame.parent;
            steps += 1;
        }
        None
    }

    /// Looks up `name` only within `scope` itself, without walking parents.
    #[must_use]
    pub fn lookup_local(&self, scope: SymbolTableId, name: &str) -> Option<SymbolId> {
        self.frames[scope.0 as usize].bindings.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> SymbolEntry {
        SymbolEntry {
            name: name.to_string(),
            type_id: Cell::new(TypeId::from_raw(0)),
            is_const: false,
            kind: SymbolKind::Variable,
            declaring_node: NodeId::DANGLING,
            param_index: None,
            imported_module: None,
        }
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let mut arena = SymbolTableArena::new();
        let outer = arena.new_scope(None);
        arena.declare(outer, entry("x"));
        let inner = arena.new_scope(Some(outer));
        assert!(arena.lookup(inner, "x").is_some());
        assert!(arena.lookup_local(inner, "x").is_none());
    }

    #[test]
    fn shadowing_in_inner_scope_does_not_clobber_outer() {
        let mut arena = SymbolTableArena::new();
        let outer = arena.new_scope(None);
        let outer_x = arena.declare(outer, entry("x"));
        let inner = arena.new_scope(Some(outer));
        let inner_x = arena.declare(inner, entry("x"));
        assert_ne!(outer_x, inner_x);
        assert_eq!(arena.lookup(inner, "x"), Some(inner_x));
        assert_eq!(arena.lookup(outer, "x"), Some(outer_x));
    }

    #[test]
    fn lookup_of_undeclared_name_is_none() {
        let mut arena = SymbolTableArena::new();
        let scope = arena.new_scope(None);
        assert!(arena.lookup(scope, "missing").is_none());
    }
}
