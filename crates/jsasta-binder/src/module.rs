//! Module graph construction and import resolution.

use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_common::limits::MAX_MODULE_LOAD_DEPTH;
use jsasta_common::source::SourceFile;
use jsasta_common::span::SourceLocation;
use jsasta_parser::{parse_module, ImportSource, NodeArena, NodeId, NodeKind};
use jsasta_solver::{SpecializationStore, TraitRegistry, TypeContext};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use crate::builtins;
use crate::error;
use crate::symbol_table::{SymbolEntry, SymbolKind, SymbolTableArena, SymbolTableId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("module registry overflow"))
    }
}

/// One loaded module. Owns its own AST arena, type context, and
/// symbol-table arena — a module's lifetime bounds everything derived
/// from it.
pub struct Module {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    /// `<module_prefix>__<name>` mangling prefix.
    pub module_prefix: String,
    pub arena: NodeArena,
    pub ast_root: NodeId,
    pub type_ctx: TypeContext,
    /// One `TraitRegistry` per module, mirroring the per-module
    /// `TypeContext` split: impls are keyed by `TypeId`, which is only
    /// meaningful within the `TypeContext` that produced it.
    pub trait_registry: TraitRegistry,
    /// One specialization store per module: a function's specializations
    /// live alongside the `TypeContext` that interned its parameter/return
    /// types, not in a process-wide table.
    pub specializations: SpecializationStore,
    pub symtab: SymbolTableArena,
    pub module_scope: SymbolTableId,
    /// Names wrapped in `export` at the top level, mapped to their declaring
    /// node. `jsasta-checker` declares the actual `SymbolEntry` for each
    /// during Pass 0/1 and looks it up here to validate namespace access.
    pub exported_names: FxHashMap<String, NodeId>,
    pub imports: Vec<(String, ModuleId)>,
}

impl Module {
    #[must_use]
    pub fn mangle(&self, name: &str) -> String {
        format!("{}__{}", self.module_prefix, name)
    }

    /// Cheap placeholder installed in [`ModuleRegistry`] while the real
    /// `Module` is checked out for inference (see [`ModuleRegistry::take_module`]).
    /// Never observed by any pass: a module is never namespace-imported by
    /// itself, so nothing reads a module back out of the registry while it
    /// is the one currently checked out.
    fn placeholder() -> Self {
        let mut symtab = SymbolTableArena::new();
        let module_scope = symtab.new_scope(None);
        Self {
            absolute_path: PathBuf::new(),
            relative_path: PathBuf::new(),
            module_prefix: String::new(),
            arena: NodeArena::new(),
            ast_root: NodeId::DANGLING,
            type_ctx: TypeContext::new(),
            trait_registry: TraitRegistry::new(),
            specializations: SpecializationStore::new(),
            symtab,
            module_scope,
            exported_names: FxHashMap::default(),
            imports: Vec::new(),
        }
    }
}

/// Reads module source text. Production code reads from disk
/// ([`FsSourceLoader`]); tests substitute [`InMemorySourceLoader`] so the
/// module graph is exercisable without a filesystem.
pub trait SourceLoader {
    fn read(&self, path: &Path) -> std::io::Result<SourceFile>;
}

#[derive(Default)]
pub struct FsSourceLoader;

impl SourceLoader for FsSourceLoader {
    fn read(&self, path: &Path) -> std::io::Result<SourceFile> {
        SourceFile::read(path)
    }
}

#[derive(Default)]
pub struct InMemorySourceLoader {
    files: FxHashMap<PathBuf, String>,
}

impl InMemorySourceLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> &mut Self {
        self.files.insert(path.into(), text.into());
        self
    }
}

impl SourceLoader for InMemorySourceLoader {
    fn read(&self, path: &Path) -> std::io::Result<SourceFile> {
        match self.files.get(path) {
            Some(text) => Ok(SourceFile::new(path.to_string_lossy().into_owned(), text.clone())),
            None => Err(std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string())),
        }
    }
}

/// A `Vec` of `Module`, indexed by `ModuleId`. The diagnostic sink is not
/// stored here — it is owned by the driving call site, since diagnostics
/// accumulate across the whole compile while a registry only owns one
/// compile's worth of modules. Each module's own `TypeContext` plays the
/// role of a per-module primitive-type registry, rather than sharing one
/// process-wide type universe.
pub struct ModuleRegistry {
    loader: Box<dyn SourceLoader>,
    modules: Vec<Module>,
    by_path: FxHashMap<PathBuf, ModuleId>,
    builtins: FxHashMap<String, ModuleId>,
    /// Post-order completion order: a module is appended here only after
    /// every import it requested has itself finished loading. `modules`
    /// itself is indexed in *discovery* order (a module reserves its slot
    /// before recursing into its own imports, so a cyclic `import` chain
    /// finds the in-progress module instead of reloading it), which is the
    /// opposite of the dependency order later passes need — `iter_ids` walks
    /// this list instead of `0..modules.len()`.
    completion_order: Vec<ModuleId>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new(loader: Box<dyn SourceLoader>) -> Self {
        Self {
            loader,
            modules: Vec::new(),
            by_path: FxHashMap::default(),
            builtins: FxHashMap::default(),
            completion_order: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Dependency order: every dependency is yielded before its first
    /// dependent, since a module only joins `completion_order` once all of
    /// its own imports have.
    #[must_use]
    pub fn iter_ids(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.completion_order.iter().copied()
    }

    /// Entry point: load `path` and everything it transitively imports.
    pub fn load_entry(&mut self, path: &Path, diag: &mut DiagnosticSink) -> Option<ModuleId> {
        let abs_path = normalize_path(path);
        let prefix = module_prefix_from_path(&abs_path);
        self.load_module(abs_path, path.to_path_buf(), prefix, 0, diag)
    }

    fn load_module(
        &mut self,
        abs_path: PathBuf,
        rel_path: PathBuf,
        module_prefix: String,
        depth: usize,
        diag: &mut DiagnosticSink,
    ) -> Option<ModuleId> {
        if let Some(&existing) = self.by_path.get(&abs_path) {
            return Some(existing);
        }
        if depth > MAX_MODULE_LOAD_DEPTH {
            diag.push(error::module_load_depth_exceeded(
                dummy_loc(&abs_path),
                &abs_path.display().to_string(),
            ));
            return None;
        }

        let source = match self.loader.read(&abs_path) {
            Ok(source) => source,
            Err(_) => {
                diag.push(error::missing_file(dummy_loc(&abs_path), &abs_path.display().to_string()));
                return None;
            }
        };

        let (arena, ast_root) = parse_module(&source, diag);
        let type_ctx = TypeContext::new();
        let mut trait_registry = TraitRegistry::new();
        trait_registry.preload_display_for_primitives(&type_ctx);
        trait_registry.preload_arithmetic_for_primitives(&type_ctx);
        let mut symtab = SymbolTableArena::new();
        let module_scope = symtab.new_scope(None);

        let id = ModuleId::new(self.modules.len());
        // Registered before recursing into this module's own imports so a
        // cyclic `import` chain finds the in-progress module instead of
        // reloading it: if a path is already present in the registry, its
        // existing Module is reused.
        self.by_path.insert(abs_path.clone(), id);
        self.modules.push(Module {
            absolute_path: abs_path.clone(),
            relative_path: rel_path,
            module_prefix,
            arena,
            ast_root,
            type_ctx,
            trait_registry,
            specializations: SpecializationStore::new(),
            symtab,
            module_scope,
            exported_names: FxHashMap::default(),
            imports: Vec::new(),
        });

        let requests = collect_import_requests(&self.modules[id.0 as usize].arena, ast_root);
        let mut resolved = Vec::new();
        for request in requests {
            let imported = match &request.source {
                ImportSource::Relative(path_text) => {
                    let dir = abs_path.parent().unwrap_or_else(|| Path::new("."));
                    let child_abs = normalize_path(&dir.join(path_text));
                    let child_prefix = module_prefix_from_path(&child_abs);
                    self.load_module(child_abs, PathBuf::from(path_text), child_prefix, depth + 1, diag)
                }
                ImportSource::Builtin(name) => self.load_builtin(name, &request.loc, diag),
            };
            match imported {
                Some(module_id) => resolved.push((request.binding.clone(), module_id)),
                None => diag.push(error::unparseable_dependency(request.loc.clone(), &request.binding)),
            }
        }

        let module = &mut self.modules[id.0 as usize];
        for (binding, imported_id) in &resolved {
            module.symtab.declare(
                module.module_scope,
                SymbolEntry {
                    name: binding.clone(),
                    type_id: std::cell::Cell::new(module.type_ctx.unknown()),
                    is_const: true,
                    kind: SymbolKind::NamespaceImport,
                    declaring_node: ast_root,
                    param_index: None,
                    imported_module: Some(*imported_id),
                },
            );
        }
        module.imports = resolved;
        module.exported_names = collect_exported_names(&module.arena, ast_root);

        // Only now, with every import this module requested already fully
        // loaded (recursively, including *their* imports), does this module
        // itself join the dependency-ordered list.
        self.completion_order.push(id);

        Some(id)
    }

    fn load_builtin(&mut self, name: &str, loc: &SourceLocation, diag: &mut DiagnosticSink) -> Option<ModuleId> {
        if let Some(&id) = self.builtins.get(name) {
            return Some(id);
        }
        let spec = builtins::lookup(name).or_else(|| {
            diag.push(error::unknown_builtin(loc.clone(), name));
            None
        })?;
        let id = builtins::synthesize_module(self, spec);
        self.builtins.insert(name.to_string(), id);
        Some(id)
    }

    /// Used only by [`builtins::synthesize_module`] to register the freshly
    /// built in-memory module under its synthetic path.
    pub(crate) fn push_synthetic(&mut self, synthetic_path: PathBuf, module: Module) -> ModuleId {
        let id = ModuleId::new(self.modules.len());
        self.by_path.insert(synthetic_path, id);
        self.modules.push(module);
        self.completion_order.push(id);
        id
    }

    /// Checks `id` out of the registry, leaving a placeholder behind, so the
    /// inference driver can hold the module being checked by value while
    /// still freely borrowing `self` for namespaced access into *other*
    /// modules. Pair with [`Self::put_module`] once checking finishes.
    pub fn take_module(&mut self, id: ModuleId) -> Module {
        std::mem::replace(&mut self.modules[id.0 as usize], Module::placeholder())
    }

    pub fn put_module(&mut self, id: ModuleId, module: Module) {
        self.modules[id.0 as usize] = module;
    }
}

struct ImportRequest {
    binding: String,
    source: ImportSource,
    loc: SourceLocation,
}

fn collect_import_requests(arena: &NodeArena, root: NodeId) -> Vec<ImportRequest> {
    let mut out = Vec::new();
    let NodeKind::Program { statements } = &arena[root].kind else {
        return out;
    };
    for &stmt in statements {
        if let NodeKind::Import { binding, source } = &arena[stmt].kind {
            out.push(ImportRequest {
                binding: binding.clone(),
                source: source.clone(),
                loc: arena[stmt].loc.clone(),
            });
        }
    }
    out
}

fn collect_exported_names(arena: &NodeArena, root: NodeId) -> FxHashMap<String, NodeId> {
    let mut out = FxHashMap::default();
    let NodeKind::Program { statements } = &arena[root].kind else {
        return out;
    };
    for &stmt in statements {
        if let NodeKind::Export { decl } = &arena[stmt].kind {
            match &arena[*decl].kind {
                NodeKind::FunctionDecl { name, .. } | NodeKind::VarDecl { name, .. } => {
                    out.insert(name.clone(), *decl);
                }
                NodeKind::StructDecl { name, .. } => {
                    out.insert(name.clone(), *decl);
                }
                _ => {}
            }
        }
    }
    out
}

/// `<module_prefix>__<name>` derives its prefix from the file stem with path
/// separators folded to `_`.
#[must_use]
pub fn module_prefix_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['/', '\\', '.', '-'], "_"))
        .unwrap_or_else(|| "module".to_string())
}

/// Lexical normalization (no filesystem access, no symlink resolution): `..`
/// and `.` components are collapsed. This is deliberately not
/// `Path::canonicalize` so import resolution works against
/// [`InMemorySourceLoader`]'s virtual paths in tests.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn dummy_loc(path: &Path) -> SourceLocation {
    SourceLocation::new(std::sync::Arc::from(path.display().to_string().as_str()), 1, 1)
}
