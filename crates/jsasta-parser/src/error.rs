//! Parser diagnostic helpers for recoverable syntax errors.

use jsasta_common::diagnostics::{codes, Diagnostic};
use jsasta_common::span::SourceLocation;

#[must_use]
pub fn unexpected_token(loc: SourceLocation, found: impl std::fmt::Display, expected: &str) -> Diagnostic {
    Diagnostic::error(
        codes::PARSE_UNEXPECTED_TOKEN,
        loc,
        format!("unexpected token `{found}`, expected {expected}"),
    )
}

#[must_use]
pub fn stuck_position(loc: SourceLocation) -> Diagnostic {
    Diagnostic::error(
        codes::PARSE_STUCK_POSITION,
        loc,
        "parser made no progress at this position; forcibly advancing",
    )
}

#[must_use]
pub fn invalid_assignment_target(loc: SourceLocation) -> Diagnostic {
    Diagnostic::error(
        codes::PARSE_INVALID_ASSIGNMENT_TARGET,
        loc,
        "invalid assignment target",
    )
}

#[must_use]
pub fn invalid_type_path(loc: SourceLocation) -> Diagnostic {
    Diagnostic::error(
        codes::PARSE_INVALID_TYPE_PATH,
        loc,
        "type paths may have at most one `.` (`a.b`, not `a.b.c`)",
    )
}

#[must_use]
pub fn missing_semicolon(loc: SourceLocation) -> Diagnostic {
    Diagnostic::warning(codes::PARSE_MISSING_SEMICOLON, loc, "missing `;`")
}
