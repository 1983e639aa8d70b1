//! Common types and utilities for the jsasta compiler.
//!
//! This crate provides the foundations shared by every later phase
//! (scanner, parser, solver, binder, checker): source spans and
//! locations, the diagnostic sink, compiler options, iteration limits,
//! and numeric literal parsing.

pub mod diagnostics;
pub mod error;
pub mod limits;
pub mod numeric;
pub mod options;
pub mod source;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticSeverity, DiagnosticSink};
pub use error::CompilerError;
pub use options::CompileOptions;
pub use source::SourceFile;
pub use span::{SourceLocation, Span};
