//! Command-line argument surface for the compiler driver.

use clap::Parser;
use std::path::PathBuf;

/// JSasta ahead-of-time compiler front-end: parses, binds, and type-checks
/// a `.jsa` program. Codegen (object/assembly/LLVM-IR emission, linking) is
/// out of scope for this binary — flags that only make sense once a backend
/// exists are accepted for compatibility with the documented surface and
/// rejected with `NotImplemented` once the program is otherwise clean.
#[derive(Parser, Debug)]
#[command(name = "jsasta", version, about = "JSasta compiler front-end (type-check only, no codegen)")]
pub struct CliArgs {
    /// The single input `.jsa` file.
    pub input: PathBuf,

    /// Output file path. Codegen-only; rejected once type-checking succeeds.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Emit an object file only.
    #[arg(short = 'c')]
    pub object_only: bool,

    /// Emit assembly.
    #[arg(short = 'S')]
    pub assembly: bool,

    /// Emit LLVM IR.
    #[arg(short = 'L', long = "emit-llvm")]
    pub emit_llvm: bool,

    /// Optimization level 0-3.
    #[arg(short = 'O')]
    pub opt_level: Option<u8>,

    /// Enable a sanitizer (address/memory/thread/undefined).
    #[arg(long = "sanitize")]
    pub sanitize: Option<String>,

    /// Include debug symbols.
    #[arg(short = 'g', long = "debug")]
    pub debug_symbols: bool,

    /// Enable runtime debug asserts.
    #[arg(short = 'd', long = "debug-mode")]
    pub debug_mode: bool,

    /// Verbose diagnostic/tracing output.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Suppress all but error output.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl CliArgs {
    /// Any flag that only makes sense once a code generator exists — LLVM IR
    /// emission, the linker/assembler invocation. This binary type-checks and
    /// stops before that handoff, so these flags are accepted for surface
    /// compatibility but rejected once the type-checked program would
    /// otherwise succeed.
    #[must_use]
    pub fn requests_codegen(&self) -> bool {
        self.output.is_some()
            || self.object_only
            || self.assembly
            || self.emit_llvm
            || self.opt_level.is_some()
            || self.sanitize.is_some()
            || self.debug_symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_input() {
        let args = CliArgs::parse_from(["jsasta", "main.jsa"]);
        assert_eq!(args.input, PathBuf::from("main.jsa"));
        assert!(!args.requests_codegen());
    }

    #[test]
    fn codegen_flags_are_detected() {
        let args = CliArgs::parse_from(["jsasta", "main.jsa", "-S"]);
        assert!(args.requests_codegen());
        let args = CliArgs::parse_from(["jsasta", "main.jsa", "-O2"]);
        assert_eq!(args.opt_level, Some(2));
        assert!(args.requests_codegen());
    }

    #[test]
    fn verbose_and_quiet_are_independent_flags() {
        let args = CliArgs::parse_from(["jsasta", "main.jsa", "-v"]);
        assert!(args.verbose);
        assert!(!args.quiet);
    }
}
