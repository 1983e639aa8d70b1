//! Diagnostic accumulation.
//!
//! No pass is fatal: errors and warnings are pushed onto a shared sink and
//! the current phase continues. Only before handing off to a later phase
//! does the driver check `has_errors`.

use crate::span::SourceLocation;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// Stable diagnostic codes, grouped by compiler phase.
/// Numbered loosely like `JSA1xxx` (lex), `JSA2xxx` (parse), `JSA3xxx` (type),
/// `JSA4xxx` (const eval), `JSA5xxx` (import/module).
pub mod codes {
    pub const LEX_UNKNOWN_BYTE: u32 = 1001;
    pub const LEX_UNTERMINATED_STRING: u32 = 1002;
    pub const LEX_UNTERMINATED_COMMENT: u32 = 1003;

    pub const PARSE_UNEXPECTED_TOKEN: u32 = 2001;
    pub const PARSE_STUCK_POSITION: u32 = 2002;
    pub const PARSE_INVALID_ASSIGNMENT_TARGET: u32 = 2003;
    pub const PARSE_INVALID_TYPE_PATH: u32 = 2004;
    pub const PARSE_MISSING_SEMICOLON: u32 = 2005;

    pub const TYPE_UNDEFINED_IDENTIFIER: u32 = 3001;
    pub const TYPE_MISMATCH: u32 = 3002;
    pub const TYPE_UNKNOWN_PROPERTY: u32 = 3003;
    pub const TYPE_MISSING_FIELD: u32 = 3004;
    pub const TYPE_TRAIT_NOT_IMPLEMENTED: u32 = 3005;
    pub const TYPE_METHOD_NOT_FOUND: u32 = 3006;
    pub const TYPE_NOT_CALLABLE: u32 = 3007;
    pub const TYPE_DEEP_NAMESPACE_PATH: u32 = 3008;
    pub const TYPE_UNRESOLVED_NAMESPACED_TYPE: u32 = 3009;
    pub const TYPE_ARGUMENT_MISMATCH: u32 = 3010;
    pub const TYPE_DELETE_NON_REF: u32 = 3011;

    pub const CONST_EVAL_TYPE_MISMATCH: u32 = 4001;
    pub const CONST_EVAL_NON_POSITIVE: u32 = 4002;
    pub const CONST_EVAL_DIV_BY_ZERO: u32 = 4003;
    pub const CONST_EVAL_NOT_CONST: u32 = 4004;
    pub const CONST_EVAL_UNSUPPORTED: u32 = 4005;
    pub const CONST_EVAL_UNRESOLVED: u32 = 4006;

    pub const IMPORT_MISSING_FILE: u32 = 5001;
    pub const IMPORT_UNPARSEABLE: u32 = 5002;

    pub const INTERNAL_ERROR: u32 = 9001;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: u32,
    pub location: SourceLocation,
    pub message: String,
    /// Optional hint text, e.g. pointing the user at `const` for `JSA4004`.
    pub hint: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(code: u32, location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            location,
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn warning(code: u32, location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code,
            location,
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        write!(
            f,
            "{}: {}[JSA{}]: {}",
            self.location, severity, self.code, self.message
        )?;
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// Accumulates diagnostics across every pass of a single compile.
///
/// Shared by the module registry and the inference driver: it is the one
/// piece of state every phase may append to, never remove from — diagnostic
/// count only grows across passes, never shrinks.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(code = diagnostic.code, "diagnostic emitted");
        self.entries.push(diagnostic);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Shared ownership of a source file's contents, for cheap cloning into
/// diagnostics and error locations without re-reading disk.
pub type SharedName = Arc<str>;

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("main.jsa"), 1, 1)
    }

    #[test]
    fn has_errors_ignores_warnings() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::warning(codes::PARSE_MISSING_SEMICOLON, loc(), "missing ;"));
        assert!(!sink.has_errors());
        sink.push(Diagnostic::error(codes::TYPE_MISMATCH, loc(), "bad type"));
        assert!(sink.has_errors());
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn display_includes_code_and_hint() {
        let d = Diagnostic::error(codes::CONST_EVAL_NOT_CONST, loc(), "W is not const")
            .with_hint("declare W with `const`");
        let text = d.to_string();
        assert!(text.contains("JSA4004"));
        assert!(text.contains("declare W with"));
    }
}
