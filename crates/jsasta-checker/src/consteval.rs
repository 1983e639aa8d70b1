//! Compile-time constant expression evaluator.
//!
//! A small, self-contained recursive evaluator over the subset of the AST
//! legal in size position: integer literals, `const` identifiers, and
//! `+ - * / %` between them. It never walks into a referenced const's own
//! initializer more than once per call chain — `chain` is an explicit
//! visited-stack that catches a self-referential `const` instead of
//! recursing forever.

use jsasta_common::numeric::parse_numeric_literal_value;
use jsasta_common::span::SourceLocation;
use jsasta_parser::{BinaryOp, NodeArena, NodeId, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// Three-valued result: a constant may resolve successfully, be waiting on
/// a not-yet-declared identifier, or be an outright error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstEvalResult {
    Success(i64),
    /// References an identifier not yet in scope; the caller may retry in
    /// a later collection-pass iteration.
    Waiting(SourceLocation, String),
    /// A self-reference was detected by the evaluation stack.
    Cycle(SourceLocation, String),
    /// Type mismatch, non-positive result, division-by-zero, a non-`const`
    /// identifier, or an unsupported form.
    Error(SourceLocation, String),
}

impl ConstEvalResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting(..))
    }
}

/// What the evaluator knows about top-level declarations while resolving
/// one expression.
pub struct ConstEvalContext<'a> {
    /// `const` declarations' initializer expressions, by name. Absence of a
    /// name here (and from `non_const_names`) means "not declared (yet)".
    pub const_inits: &'a FxHashMap<String, NodeId>,
    /// Top-level `var`/`let` names: referencing one of these is always an
    /// error, never a forward-reference — the diagnostic hints at `const`.
    pub non_const_names: &'a FxHashSet<String>,
    pub max_depth: u32,
}

/// Evaluate `node` as a constant integer expression. `chain` accumulates the
/// names of `const`s currently being dereferenced in this call, so a
/// self-reference (`const A = A + 1;`, or `A -> B -> A`) is caught as a
/// [`ConstEvalResult::Cycle`] rather than recursing forever.
#[must_use]
pub fn eval(
    ctx: &ConstEvalContext,
    arena: &NodeArena,
    node: NodeId,
    chain: &mut Vec<String>,
    depth: u32,
) -> ConstEvalResult {
    let loc = arena[node].loc.clone();
    if depth > ctx.max_depth {
        return ConstEvalResult::Error(loc, "constant expression exceeded the maximum recursion depth".to_string());
    }

    match &arena[node].kind {
        NodeKind::NumberLiteral { text, is_float_hint } => {
            if *is_float_hint {
                return ConstEvalResult::Error(loc, "a size expression must be an integer, not a double literal".to_string());
            }
            match parse_numeric_literal_value(text) {
                Some(value) => ConstEvalResult::Success(value as i64),
                None => ConstEvalResult::Error(loc, format!("malformed integer literal `{text}`")),
            }
        }
        NodeKind::StringLiteral { .. } => ConstEvalResult::Error(loc, "a string literal cannot appear in a size expression".to_string()),
        NodeKind::BoolLiteral { .. } => ConstEvalResult::Error(loc, "a boolean literal cannot appear in a size expression".to_string()),
        NodeKind::Call { .. } | NodeKind::MethodCall { .. } => {
            ConstEvalResult::Error(loc, "a function call cannot appear in a size expression".to_string())
        }
        NodeKind::Identifier { name } => eval_identifier(ctx, arena, name, loc, chain, depth),
        NodeKind::Binary { op, left, right } => eval_binary(ctx, arena, *op, *left, *right, loc, chain, depth),
        _ => ConstEvalResult::Error(loc, "unsupported expression form in a size expression".to_string()),
    }
}

fn eval_identifier(
    ctx: &ConstEvalContext,
    arena: &NodeArena,
    name: &str,
    loc: SourceLocation,
    chain: &mut Vec<String>,
    depth: u32,
) -> ConstEvalResult {
    if chain.iter().any(|n| n == name) {
        return ConstEvalResult::Cycle(loc, format!("`{name}` is defined in terms of itself"));
    }
    if let Some(&init) = ctx.const_inits.get(name) {
        chain.push(name.to_string());
        let result = eval(ctx, arena, init, chain, depth + 1);
        chain.pop();
        return result;
    }
    if ctx.non_const_names.contains(name) {
        return ConstEvalResult::Error(loc, format!("`{name}` is not a compile-time constant"))
            .with_hint(format!("declare `{name}` with `const` to use it in a size expression"));
    }
    ConstEvalResult::Waiting(loc, format!("`{name}` is not yet defined"))
}

fn eval_binary(
    ctx: &ConstEvalContext,
    arena: &NodeArena,
    op: BinaryOp,
    left: NodeId,
    right: NodeId,
    loc: SourceLocation,
    chain: &mut Vec<String>,
    depth: u32,
) -> ConstEvalResult {
    let lhs = eval(ctx, arena, left, chain, depth + 1);
    let rhs = eval(ctx, arena, right, chain, depth + 1);
    let (l, r) = match combine(lhs, rhs) {
        Ok(pair) => pair,
        Err(result) => return result,
    };
    match op {
        BinaryOp::Add => ConstEvalResult::Success(l.wrapping_add(r)),
        BinaryOp::Sub => ConstEvalResult::Success(l.wrapping_sub(r)),
        BinaryOp::Mul => ConstEvalResult::Success(l.wrapping_mul(r)),
        BinaryOp::Div => {
            if r == 0 {
                ConstEvalResult::Error(loc, "division by zero in a size expression".to_string())
            } else {
                ConstEvalResult::Success(l / r)
            }
        }
        BinaryOp::Rem => {
            if r == 0 {
                ConstEvalResult::Error(loc, "modulo by zero in a size expression".to_string())
            } else {
                ConstEvalResult::Success(l % r)
            }
        }
        _ => ConstEvalResult::Error(loc, "only + - * / % are supported in a size expression".to_string()),
    }
}

/// Merge two sub-results into a value pair, or short-circuit to whichever
/// non-`Success` result takes precedence: a `Cycle` always wins (it is the
/// most specific diagnosis), then `Error`, then `Waiting`.
fn combine(lhs: ConstEvalResult, rhs: ConstEvalResult) -> Result<(i64, i64), ConstEvalResult> {
    use ConstEvalResult::{Cycle, Error, Success, Waiting};
    match (lhs, rhs) {
        (Success(l), Success(r)) => Ok((l, r)),
        (Cycle(loc, msg), _) | (_, Cycle(loc, msg)) => Err(Cycle(loc, msg)),
        (Error(loc, msg), _) | (_, Error(loc, msg)) => Err(Error(loc, msg)),
        (Waiting(loc, msg), _) | (_, Waiting(loc, msg)) => Err(Waiting(loc, msg)),
    }
}

impl ConstEvalResult {
    /// Appends a hint to an `Error` result; other variants pass through
    /// unchanged.
    fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            Self::Error(loc, msg) => Self::Error(loc, format!("{msg} ({})", hint.into())),
            other => other,
        }
    }
}

/// Evaluate `node` as a size expression: like [`eval`], but a non-positive
/// `Success` is downgraded to an `Error`, since an array/struct size must
/// be strictly positive.
#[must_use]
pub fn eval_size_expr(ctx: &ConstEvalContext, arena: &NodeArena, node: NodeId) -> ConstEvalResult {
    let mut chain = Vec::new();
    match eval(ctx, arena, node, &mut chain, 0) {
        ConstEvalResult::Success(value) if value <= 0 => {
            ConstEvalResult::Error(arena[node].loc.clone(), format!("size expression evaluated to {value}, expected a positive integer"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsasta_common::span::SourceLocation;
    use jsasta_parser::{NodeArena, NodeKind};
    use std::sync::Arc;

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("t.jsa"), 1, 1)
    }

    fn int_lit(arena: &mut NodeArena, text: &str) -> NodeId {
        arena.alloc(NodeKind::NumberLiteral { text: text.to_string(), is_float_hint: false }, loc())
    }

    fn ident(arena: &mut NodeArena, name: &str) -> NodeId {
        arena.alloc(NodeKind::Identifier { name: name.to_string() }, loc())
    }

    fn binary(arena: &mut NodeArena, op: BinaryOp, l: NodeId, r: NodeId) -> NodeId {
        arena.alloc(NodeKind::Binary { op, left: l, right: r }, loc())
    }

    #[test]
    fn evaluates_literal_and_arithmetic() {
        let mut arena = NodeArena::new();
        let w = int_lit(&mut arena, "150");
        let h = int_lit(&mut arena, "60");
        let expr = binary(&mut arena, BinaryOp::Mul, w, h);
        let ctx = ConstEvalContext {
            const_inits: &FxHashMap::default(),
            non_const_names: &FxHashSet::default(),
            max_depth: 100,
        };
        assert_eq!(eval_size_expr(&ctx, &arena, expr), ConstEvalResult::Success(9000));
    }

    #[test]
    fn forward_reference_to_undeclared_name_waits() {
        let mut arena = NodeArena::new();
        let expr = ident(&mut arena, "LATER");
        let ctx = ConstEvalContext { const_inits: &FxHashMap::default(), non_const_names: &FxHashSet::default(), max_depth: 100 };
        assert!(eval_size_expr(&ctx, &arena, expr).is_waiting());
    }

    #[test]
    fn non_const_identifier_is_an_error_with_hint() {
        let mut arena = NodeArena::new();
        let expr = ident(&mut arena, "W");
        let mut non_consts = FxHashSet::default();
        non_consts.insert("W".to_string());
        let ctx = ConstEvalContext { const_inits: &FxHashMap::default(), non_const_names: &non_consts, max_depth: 100 };
        match eval_size_expr(&ctx, &arena, expr) {
            ConstEvalResult::Error(_, msg) => assert!(msg.contains("const")),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut arena = NodeArena::new();
        let one = int_lit(&mut arena, "1");
        let self_ref = ident(&mut arena, "A");
        let init = binary(&mut arena, BinaryOp::Add, self_ref, one);
        let mut const_inits = FxHashMap::default();
        const_inits.insert("A".to_string(), init);
        let ctx = ConstEvalContext { const_inits: &const_inits, non_const_names: &FxHashSet::default(), max_depth: 100 };
        let use_site = ident(&mut arena, "A");
        match eval_size_expr(&ctx, &arena, use_site) {
            ConstEvalResult::Cycle(..) => {}
            other => panic!("expected Cycle, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut arena = NodeArena::new();
        let ten = int_lit(&mut arena, "10");
        let zero = int_lit(&mut arena, "0");
        let expr = binary(&mut arena, BinaryOp::Div, ten, zero);
        let ctx = ConstEvalContext { const_inits: &FxHashMap::default(), non_const_names: &FxHashSet::default(), max_depth: 100 };
        match eval_size_expr(&ctx, &arena, expr) {
            ConstEvalResult::Error(..) => {}
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_result_is_an_error() {
        let mut arena = NodeArena::new();
        let one = int_lit(&mut arena, "1");
        let two = int_lit(&mut arena, "2");
        let expr = binary(&mut arena, BinaryOp::Sub, one, two);
        let ctx = ConstEvalContext { const_inits: &FxHashMap::default(), non_const_names: &FxHashSet::default(), max_depth: 100 };
        match eval_size_expr(&ctx, &arena, expr) {
            ConstEvalResult::Error(..) => {}
            other => panic!("expected Error, got {other:?}"),
        }
    }
}
