//! Compilation driver: wires the source reader, module registry, and
//! checker together and maps the result onto the binary's exit codes.
//!
//! `0` success; `1` usage/IO (including a codegen-only flag on an otherwise
//! clean compile, since there is no backend to hand off to); `404` missing
//! input or import; `500` parse or type error.

use std::path::Path;

use jsasta_binder::{FsSourceLoader, ModuleRegistry};
use jsasta_common::diagnostics::{codes, DiagnosticSink};
use jsasta_common::options::CompileOptions;

use crate::args::CliArgs;
use crate::reporter;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_USAGE: i32 = 1;
pub const EXIT_MISSING_INPUT: i32 = 404;
pub const EXIT_COMPILE_ERROR: i32 = 500;

/// Runs the full read -> tokens -> AST -> bind -> infer pipeline for one
/// invocation and returns the process exit code.
pub fn run(args: &CliArgs) -> i32 {
    if !args.input.exists() {
        eprintln!("jsasta: cannot find input file `{}`", args.input.display());
        return EXIT_MISSING_INPUT;
    }
    if !is_jsa_file(&args.input) {
        eprintln!("jsasta: `{}` is not a `.jsa` source file", args.input.display());
        return EXIT_USAGE;
    }

    let options = CompileOptions {
        warnings_as_errors: false,
        quiet: args.quiet,
        ..CompileOptions::default()
    };

    let mut diag = DiagnosticSink::new();
    let mut registry = ModuleRegistry::new(Box::new(FsSourceLoader));
    let entry = registry.load_entry(&args.input, &mut diag);

    let Some(entry_id) = entry else {
        reporter::report(&diag);
        return EXIT_MISSING_INPUT;
    };

    jsasta_checker::check_program(&mut registry, &mut diag, &options);

    if !args.quiet {
        reporter::report(&diag);
    }

    if diag.has_errors() {
        return exit_code_for_errors(&diag);
    }

    if args.requests_codegen() {
        eprintln!(
            "jsasta: `{}` type-checks cleanly, but code generation is not implemented by this binary",
            args.input.display()
        );
        return EXIT_USAGE;
    }

    let module = registry.get(entry_id);
    let handoff = jsasta_checker::handoff::CodegenHandoff::new(module, &registry);
    debug_assert!(jsasta_checker::handoff::CodegenHandoff::ready_for_codegen(&diag));
    let _ = handoff;

    EXIT_SUCCESS
}

/// Distinguishes "missing input or import" (404) from "parse or type error"
/// (500); both are accumulated in the same sink, so classify by whether an
/// import-family code is present among the errors.
fn exit_code_for_errors(diag: &DiagnosticSink) -> i32 {
    let import_only = diag
        .entries()
        .iter()
        .filter(|d| d.severity == jsasta_common::diagnostics::DiagnosticSeverity::Error)
        .all(|d| d.code == codes::IMPORT_MISSING_FILE || d.code == codes::IMPORT_UNPARSEABLE);
    if import_only {
        EXIT_MISSING_INPUT
    } else {
        EXIT_COMPILE_ERROR
    }
}

fn is_jsa_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "jsa")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".jsa").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn missing_input_file_exits_404() {
        let args = CliArgs::parse_from(["jsasta", "/no/such/file.jsa"]);
        assert_eq!(run(&args), EXIT_MISSING_INPUT);
    }

    #[test]
    fn clean_program_exits_0() {
        let f = write_temp("function main(): int { return 1; }");
        let args = CliArgs::parse_from(["jsasta", "-q", f.path().to_str().unwrap()]);
        assert_eq!(run(&args), EXIT_SUCCESS);
    }

    #[test]
    fn type_error_exits_500() {
        let f = write_temp("function main(): int { return y; }");
        let args = CliArgs::parse_from(["jsasta", "-q", f.path().to_str().unwrap()]);
        assert_eq!(run(&args), EXIT_COMPILE_ERROR);
    }

    #[test]
    fn codegen_flag_on_clean_program_exits_1() {
        let f = write_temp("function main(): int { return 1; }");
        let args = CliArgs::parse_from(["jsasta", "-q", "-S", f.path().to_str().unwrap()]);
        assert_eq!(run(&args), EXIT_USAGE);
    }
}
