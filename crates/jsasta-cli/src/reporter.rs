//! Diagnostic printing: each entry renders as one line
//! (`path:line:col: severity[code]: message`), followed by a summary line.

use colored::Colorize;
use jsasta_common::diagnostics::{Diagnostic, DiagnosticSeverity, DiagnosticSink};

/// Prints every accumulated diagnostic, one per line, then a summary line.
/// Colorized to a terminal (errors red, warnings yellow); `colored`
/// auto-detects non-tty output and degrades to plain text.
pub fn report(diag: &DiagnosticSink) {
    for entry in diag.entries() {
        println!("{}", format_entry(entry));
    }
    println!("{}", summary_line(diag));
}

fn format_entry(entry: &Diagnostic) -> String {
    let location = format!("{}", entry.location);
    let (label, code) = match entry.severity {
        DiagnosticSeverity::Error => ("error".red().bold(), format!("JSA{}", entry.code)),
        DiagnosticSeverity::Warning => ("warning".yellow().bold(), format!("JSA{}", entry.code)),
    };
    let mut line = format!("{location}: {label}[{code}]: {}", entry.message);
    if let Some(hint) = &entry.hint {
        line.push_str(&format!(" ({hint})"));
    }
    line
}

fn summary_line(diag: &DiagnosticSink) -> String {
    let errors = diag.entries().iter().filter(|d| d.severity == DiagnosticSeverity::Error).count();
    let warnings = diag.entries().iter().filter(|d| d.severity == DiagnosticSeverity::Warning).count();
    if errors == 0 && warnings == 0 {
        "no diagnostics".green().to_string()
    } else {
        format!(
            "{} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsasta_common::diagnostics::codes;
    use jsasta_common::span::SourceLocation;
    use std::sync::Arc;

    #[test]
    fn summary_counts_errors_and_warnings_separately() {
        let mut sink = DiagnosticSink::new();
        let loc = SourceLocation::new(Arc::from("a.jsa"), 1, 1);
        sink.push(Diagnostic::error(codes::TYPE_MISMATCH, loc.clone(), "bad"));
        sink.push(Diagnostic::warning(codes::PARSE_MISSING_SEMICOLON, loc, "missing ;"));
        let line = summary_line(&sink);
        assert!(line.contains("1 error"));
        assert!(line.contains("1 warning"));
    }

    #[test]
    fn empty_sink_reports_no_diagnostics() {
        let sink = DiagnosticSink::new();
        assert!(summary_line(&sink).contains("no diagnostics"));
    }
}
