//! Internal invariant-violation errors, distinct from accumulated user-facing
//! `Diagnostic`s.
//!
//! A `CompilerError` means the compiler itself reached a state its own
//! invariants rule out (a cloned specialization body missing its symbol
//! table, a dangling `TypeId`, ...). These are never shown to the end user
//! as a normal diagnostic; `jsasta-cli` reports them distinctly and exits 1.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompilerError {
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
