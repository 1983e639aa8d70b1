//! Compiler options threaded through every phase past the parser.
//!
//! Lives in `jsasta-common` (rather than in the checker) so both `jsasta-solver`
//! and `jsasta-checker` can reference it without creating a circular
//! dependency.

/// Compile-time options independent of code generation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Cap on const-evaluator collection sweeps before declaring the
    /// remaining declarations unresolvable.
    pub max_const_eval_iterations: u32,
    /// Cap on the checker's fixed-point iterations over inference passes.
    pub max_specialization_iterations: u32,
    /// Cap on const-expression recursion depth.
    pub max_const_eval_recursion: u32,
    /// Promote warnings (e.g. `MissingSemicolon`) to errors.
    pub warnings_as_errors: bool,
    /// Suppress informational/debug logging regardless of `RUST_LOG`.
    pub quiet: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_const_eval_iterations: 100,
            max_specialization_iterations: 100,
            max_const_eval_recursion: 100,
            warnings_as_errors: false,
            quiet: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_caps() {
        let opts = CompileOptions::default();
        assert_eq!(opts.max_const_eval_iterations, 100);
        assert_eq!(opts.max_specialization_iterations, 100);
    }
}
