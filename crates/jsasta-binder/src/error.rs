//! Binder diagnostic helpers for unresolved or unparseable imports.

use jsasta_common::diagnostics::{codes, Diagnostic};
use jsasta_common::span::SourceLocation;

#[must_use]
pub fn missing_file(loc: SourceLocation, path: &str) -> Diagnostic {
    Diagnostic::error(codes::IMPORT_MISSING_FILE, loc, format!("cannot find module `{path}`"))
}

#[must_use]
pub fn unparseable_dependency(loc: SourceLocation, path: &str) -> Diagnostic {
    Diagnostic::error(
        codes::IMPORT_UNPARSEABLE,
        loc,
        format!("module `{path}` could not be parsed"),
    )
}

#[must_use]
pub fn unknown_builtin(loc: SourceLocation, name: &str) -> Diagnostic {
    Diagnostic::error(
        codes::IMPORT_MISSING_FILE,
        loc,
        format!("no builtin module named `@{name}`"),
    )
}

#[must_use]
pub fn module_load_depth_exceeded(loc: SourceLocation, path: &str) -> Diagnostic {
    Diagnostic::error(
        codes::IMPORT_MISSING_FILE,
        loc,
        format!("module import chain exceeded the maximum depth while loading `{path}`"),
    )
}
