//! Deep-clones a function body subtree into a fresh, independently-owned
//! [`NodeArena`]. A cloned specialization body is owned by the function's
//! specialization entry, not by the original declaration's AST.
//!
//! Every `NodeId` reachable from the root — including size expressions
//! nested inside a `TypeExpr` on a `var` declaration or a `new T[n]` inside
//! the body — is re-allocated in the destination arena so the clone can be
//! independently annotated (fresh `type_id`/`symbol_id` cells) without
//! disturbing the original function's own analysis.

use jsasta_parser::{Node, NodeArena, NodeId, NodeKind, TypeExpr};

#[must_use]
pub fn clone_subtree(src: &NodeArena, root: NodeId) -> (NodeArena, NodeId) {
    let mut dst = NodeArena::new();
    let new_root = clone_node(&mut dst, src, root);
    (dst, new_root)
}

fn clone_node(dst: &mut NodeArena, src: &NodeArena, id: NodeId) -> NodeId {
    let node: &Node = &src[id];
    let loc = node.loc.clone();
    let kind = match &node.kind {
        NodeKind::Program { statements } => NodeKind::Program { statements: clone_ids(dst, src, statements) },
        NodeKind::Block { statements } => NodeKind::Block { statements: clone_ids(dst, src, statements) },
        NodeKind::VarDecl { name, is_const, type_ann, init } => NodeKind::VarDecl {
            name: name.clone(),
            is_const: *is_const,
            type_ann: type_ann.as_ref().map(|t| clone_type_expr(dst, src, t)),
            init: init.map(|n| clone_node(dst, src, n)),
        },
        NodeKind::StructDecl { name, fields, methods } => NodeKind::StructDecl {
            name: name.clone(),
            fields: fields
                .iter()
                .map(|f| jsasta_parser::StructFieldDecl {
                    name: f.name.clone(),
                    type_ann: clone_type_expr(dst, src, &f.type_ann),
                    size_expr: f.size_expr.map(|n| clone_node(dst, src, n)),
                    default: f.default.map(|n| clone_node(dst, src, n)),
                    loc: f.loc.clone(),
                })
                .collect(),
            methods: clone_ids(dst, src, methods),
        },
        NodeKind::FunctionDecl { name, params, return_type, body, is_external, is_variadic } => NodeKind::FunctionDecl {
            name: name.clone(),
            params: params
                .iter()
                .map(|p| jsasta_parser::Param {
                    name: p.name.clone(),
                    type_ann: p.type_ann.as_ref().map(|t| clone_type_expr(dst, src, t)),
                    loc: p.loc.clone(),
                })
                .collect(),
            return_type: return_type.as_ref().map(|t| clone_type_expr(dst, src, t)),
            body: body.map(|n| clone_node(dst, src, n)),
            is_external: *is_external,
            is_variadic: *is_variadic,
        },
        NodeKind::Import { binding, source } => NodeKind::Import { binding: binding.clone(), source: source.clone() },
        NodeKind::Export { decl } => NodeKind::Export { decl: clone_node(dst, src, *decl) },
        NodeKind::If { cond, then_branch, else_branch } => NodeKind::If {
            cond: clone_node(dst, src, *cond),
            then_branch: clone_node(dst, src, *then_branch),
            else_branch: else_branch.map(|n| clone_node(dst, src, n)),
        },
        NodeKind::For { init, cond, step, body } => NodeKind::For {
            init: init.map(|n| clone_node(dst, src, n)),
            cond: cond.map(|n| clone_node(dst, src, n)),
            step: step.map(|n| clone_node(dst, src, n)),
            body: clone_node(dst, src, *body),
        },
        NodeKind::While { cond, body } => NodeKind::While { cond: clone_node(dst, src, *cond), body: clone_node(dst, src, *body) },
        NodeKind::Break => NodeKind::Break,
        NodeKind::Continue => NodeKind::Continue,
        NodeKind::Return { value } => NodeKind::Return { value: value.map(|n| clone_node(dst, src, n)) },
        NodeKind::Binary { op, left, right } => NodeKind::Binary { op: *op, left: clone_node(dst, src, *left), right: clone_node(dst, src, *right) },
        NodeKind::Unary { op, operand } => NodeKind::Unary { op: *op, operand: clone_node(dst, src, *operand) },
        NodeKind::Prefix { op, operand } => NodeKind::Prefix { op: *op, operand: clone_node(dst, src, *operand) },
        NodeKind::Postfix { op, operand } => NodeKind::Postfix { op: *op, operand: clone_node(dst, src, *operand) },
        NodeKind::Assign { target, op, value } => {
            NodeKind::Assign { target: clone_node(dst, src, *target), op: *op, value: clone_node(dst, src, *value) }
        }
        NodeKind::Call { callee, args } => NodeKind::Call { callee: clone_node(dst, src, *callee), args: clone_ids(dst, src, args) },
        NodeKind::MethodCall { receiver, method, args } => NodeKind::MethodCall {
            receiver: clone_node(dst, src, *receiver),
            method: method.clone(),
            args: clone_ids(dst, src, args),
        },
        NodeKind::MemberAccess { object, property } => {
            NodeKind::MemberAccess { object: clone_node(dst, src, *object), property: property.clone() }
        }
        NodeKind::MemberAssignment { object, property, value } => NodeKind::MemberAssignment {
            object: clone_node(dst, src, *object),
            property: property.clone(),
            value: clone_node(dst, src, *value),
        },
        NodeKind::IndexAccess { object, index } => {
            NodeKind::IndexAccess { object: clone_node(dst, src, *object), index: clone_node(dst, src, *index) }
        }
        NodeKind::IndexAssignment { object, index, value } => NodeKind::IndexAssignment {
            object: clone_node(dst, src, *object),
            index: clone_node(dst, src, *index),
            value: clone_node(dst, src, *value),
        },
        NodeKind::ObjectLiteral { fields } => {
            NodeKind::ObjectLiteral { fields: fields.iter().map(|(k, v)| (k.clone(), clone_node(dst, src, *v))).collect() }
        }
        NodeKind::ArrayLiteral { elements } => NodeKind::ArrayLiteral { elements: clone_ids(dst, src, elements) },
        NodeKind::NewExpr { elem_type, size } => {
            NodeKind::NewExpr { elem_type: clone_type_expr(dst, src, elem_type), size: clone_node(dst, src, *size) }
        }
        NodeKind::DeleteExpr { operand } => NodeKind::DeleteExpr { operand: clone_node(dst, src, *operand) },
        NodeKind::RefExpr { operand } => NodeKind::RefExpr { operand: clone_node(dst, src, *operand) },
        NodeKind::Ternary { cond, then_expr, else_expr } => NodeKind::Ternary {
            cond: clone_node(dst, src, *cond),
            then_expr: clone_node(dst, src, *then_expr),
            else_expr: clone_node(dst, src, *else_expr),
        },
        NodeKind::Cast { expr, target } => NodeKind::Cast { expr: clone_node(dst, src, *expr), target: clone_type_expr(dst, src, target) },
        NodeKind::InstanceOf { expr, target } => {
            NodeKind::InstanceOf { expr: clone_node(dst, src, *expr), target: clone_type_expr(dst, src, target) }
        }
        NodeKind::NumberLiteral { text, is_float_hint } => NodeKind::NumberLiteral { text: text.clone(), is_float_hint: *is_float_hint },
        NodeKind::StringLiteral { value } => NodeKind::StringLiteral { value: value.clone() },
        NodeKind::BoolLiteral { value } => NodeKind::BoolLiteral { value: *value },
        NodeKind::Identifier { name } => NodeKind::Identifier { name: name.clone() },
        NodeKind::ExprStmt { expr } => NodeKind::ExprStmt { expr: clone_node(dst, src, *expr) },
        NodeKind::Error => NodeKind::Error,
    };
    dst.alloc(kind, loc)
}

fn clone_ids(dst: &mut NodeArena, src: &NodeArena, ids: &[NodeId]) -> Vec<NodeId> {
    ids.iter().map(|&id| clone_node(dst, src, id)).collect()
}

fn clone_type_expr(dst: &mut NodeArena, src: &NodeArena, type_expr: &TypeExpr) -> TypeExpr {
    match type_expr {
        TypeExpr::Primitive(kind) => TypeExpr::Primitive(*kind),
        TypeExpr::Named(name) => TypeExpr::Named(name.clone()),
        TypeExpr::Namespaced(ns, member) => TypeExpr::Namespaced(ns.clone(), member.clone()),
        TypeExpr::Array(inner, size) => {
            TypeExpr::Array(Box::new(clone_type_expr(dst, src, inner)), size.map(|n| clone_node(dst, src, n)))
        }
        TypeExpr::Ref(inner, mutable) => TypeExpr::Ref(Box::new(clone_type_expr(dst, src, inner)), *mutable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsasta_common::span::SourceLocation;
    use std::sync::Arc;

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("t.jsa"), 1, 1)
    }

    #[test]
    fn clones_a_simple_return_body_into_an_independent_arena() {
        let mut src = NodeArena::new();
        let a = src.alloc(NodeKind::Identifier { name: "a".to_string() }, loc());
        let b = src.alloc(NodeKind::Identifier { name: "b".to_string() }, loc());
        let sum = src.alloc(NodeKind::Binary { op: jsasta_parser::BinaryOp::Add, left: a, right: b }, loc());
        let ret = src.alloc(NodeKind::Return { value: Some(sum) }, loc());
        let body = src.alloc(NodeKind::Block { statements: vec![ret] }, loc());

        let (dst, new_body) = clone_subtree(&src, body);
        assert_eq!(dst.len(), src.len());
        match &dst[new_body].kind {
            NodeKind::Block { statements } => assert_eq!(statements.len(), 1),
            other => panic!("expected Block, got {other:?}"),
        }
        // Annotating the clone must not be visible on the original.
        dst[new_body].type_id.set(Some(42));
        assert!(src[body].type_id.get().is_none());
    }
}
