use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_common::source::SourceFile;
use jsasta_parser::{parse_module, ImportSource, NodeKind, PrimitiveKind, TypeExpr};

fn parse(src: &str) -> (jsasta_parser::NodeArena, jsasta_parser::NodeId, DiagnosticSink) {
    let source = SourceFile::new("t.jsa", src);
    let mut sink = DiagnosticSink::new();
    let (arena, root) = parse_module(&source, &mut sink);
    (arena, root, sink)
}

fn statements<'a>(arena: &'a jsasta_parser::NodeArena, root: jsasta_parser::NodeId) -> &'a [jsasta_parser::NodeId] {
    match &arena[root].kind {
        NodeKind::Program { statements } => statements,
        other => panic!("expected Program, got {other:?}"),
    }
}

#[test]
fn parses_var_decl_with_type_and_init() {
    let (arena, root, sink) = parse("var x: int = 1 + 2;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    assert_eq!(stmts.len(), 1);
    match &arena[stmts[0]].kind {
        NodeKind::VarDecl { name, is_const, type_ann, init } => {
            assert_eq!(name, "x");
            assert!(!is_const);
            assert_eq!(type_ann, &Some(TypeExpr::Primitive(PrimitiveKind::Int)));
            assert!(init.is_some());
            match &arena[init.unwrap()].kind {
                NodeKind::Binary { op, .. } => assert_eq!(*op, jsasta_parser::BinaryOp::Add),
                other => panic!("expected Binary, got {other:?}"),
            }
        }
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn parses_struct_with_default_and_sized_array_field() {
    let (arena, root, sink) = parse(
        "struct Point {
            x: int = 0;
            y: int = 0;
            buf: u8[16];
        }",
    );
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::StructDecl { name, fields, methods } => {
            assert_eq!(name, "Point");
            assert_eq!(fields.len(), 3);
            assert!(methods.is_empty());
            assert_eq!(fields[0].name, "x");
            assert!(fields[0].default.is_some());
            assert!(matches!(fields[2].type_ann, TypeExpr::Array(_, Some(_))));
        }
        other => panic!("expected StructDecl, got {other:?}"),
    }
}

#[test]
fn parses_function_decl_with_params_and_return_type() {
    let (arena, root, sink) = parse("function add(a: int, b: int): int { return a + b; }");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::FunctionDecl {
            name,
            params,
            return_type,
            body,
            is_external,
            is_variadic,
        } => {
            assert_eq!(name, "add");
            assert_eq!(params.len(), 2);
            assert_eq!(return_type, &Some(TypeExpr::Primitive(PrimitiveKind::Int)));
            assert!(body.is_some());
            assert!(!is_external);
            assert!(!is_variadic);
        }
        other => panic!("expected FunctionDecl, got {other:?}"),
    }
}

#[test]
fn parses_external_function_without_body() {
    let (arena, root, sink) = parse("external function puts(s: string): void;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::FunctionDecl { is_external, body, .. } => {
            assert!(is_external);
            assert!(body.is_none());
        }
        other => panic!("expected FunctionDecl, got {other:?}"),
    }
}

#[test]
fn parses_builtin_import_with_at_sign() {
    let (arena, root, sink) = parse("import io from @io;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::Import { binding, source } => {
            assert_eq!(binding, "io");
            assert_eq!(source, &ImportSource::Builtin("io".to_string()));
        }
        other => panic!("expected Import, got {other:?}"),
    }
}

#[test]
fn parses_relative_import() {
    let (arena, root, sink) = parse(r#"import util from "./util.jsa";"#);
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::Import { source, .. } => {
            assert_eq!(source, &ImportSource::Relative("./util.jsa".to_string()));
        }
        other => panic!("expected Import, got {other:?}"),
    }
}

#[test]
fn single_dot_namespaced_type_is_accepted() {
    let (arena, root, sink) = parse("var x: io.Handle;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::VarDecl { type_ann, .. } => {
            assert_eq!(
                type_ann,
                &Some(TypeExpr::Namespaced("io".to_string(), "Handle".to_string()))
            );
        }
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn deep_namespaced_type_path_is_a_parse_error() {
    let (_, _, sink) = parse("var x: a.b.c;");
    assert!(sink.has_errors());
    assert!(sink
        .entries()
        .iter()
        .any(|d| d.code == jsasta_common::diagnostics::codes::PARSE_INVALID_TYPE_PATH));
}

#[test]
fn ref_binds_tighter_than_array_suffix() {
    let (arena, root, sink) = parse("var x: ref int[];");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::VarDecl { type_ann, .. } => match type_ann.as_ref().unwrap() {
            TypeExpr::Ref(inner, _) => {
                assert!(matches!(**inner, TypeExpr::Array(_, None)));
            }
            other => panic!("expected Ref(Array(..)), got {other:?}"),
        },
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn parses_member_and_index_assignment() {
    let (arena, root, sink) = parse("p.x = 1; arr[0] = 2;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    assert_eq!(stmts.len(), 2);
    match &arena[stmts[0]].kind {
        NodeKind::ExprStmt { expr } => {
            assert!(matches!(arena[*expr].kind, NodeKind::MemberAssignment { .. }));
        }
        other => panic!("expected ExprStmt, got {other:?}"),
    }
    match &arena[stmts[1]].kind {
        NodeKind::ExprStmt { expr } => {
            assert!(matches!(arena[*expr].kind, NodeKind::IndexAssignment { .. }));
        }
        other => panic!("expected ExprStmt, got {other:?}"),
    }
}

#[test]
fn invalid_assignment_target_is_reported() {
    let (_, _, sink) = parse("1 = 2;");
    assert!(sink
        .entries()
        .iter()
        .any(|d| d.code == jsasta_common::diagnostics::codes::PARSE_INVALID_ASSIGNMENT_TARGET));
}

#[test]
fn new_expr_and_delete_and_ref_parse() {
    let (arena, root, sink) = parse("var a: ref int[] = new int[4]; delete a;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::VarDecl { init, .. } => {
            assert!(matches!(arena[init.unwrap()].kind, NodeKind::NewExpr { .. }));
        }
        other => panic!("expected VarDecl, got {other:?}"),
    }
    match &arena[stmts[1]].kind {
        NodeKind::ExprStmt { expr } => {
            assert!(matches!(arena[*expr].kind, NodeKind::DeleteExpr { .. }));
        }
        other => panic!("expected ExprStmt, got {other:?}"),
    }
}

#[test]
fn ternary_and_cast_and_instanceof_parse() {
    let (arena, root, sink) = parse("var x = (a is Foo) ? (a as Foo) : a;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::VarDecl { init, .. } => {
            assert!(matches!(arena[init.unwrap()].kind, NodeKind::Ternary { .. }));
        }
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn operator_precedence_groups_multiplication_tighter_than_addition() {
    let (arena, root, sink) = parse("var x = 1 + 2 * 3;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::VarDecl { init, .. } => match &arena[init.unwrap()].kind {
            NodeKind::Binary { op, left, right } => {
                assert_eq!(*op, jsasta_parser::BinaryOp::Add);
                assert!(matches!(arena[*left].kind, NodeKind::NumberLiteral { .. }));
                assert!(matches!(arena[*right].kind, NodeKind::Binary { op: jsasta_parser::BinaryOp::Mul, .. }));
            }
            other => panic!("expected Binary, got {other:?}"),
        },
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn method_call_chain_parses() {
    let (arena, root, sink) = parse("obj.method(1, 2).field;");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::ExprStmt { expr } => {
            assert!(matches!(arena[*expr].kind, NodeKind::MemberAccess { .. }));
        }
        other => panic!("expected ExprStmt, got {other:?}"),
    }
}

#[test]
fn if_for_while_parse_with_block_and_bare_statement_bodies() {
    let (arena, root, sink) = parse(
        "if (x > 0) { return x; } else return 0;
         for (var i: int = 0; i < 10; i++) { continue; }
         while (x) break;",
    );
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    assert_eq!(stmts.len(), 3);
    assert!(matches!(arena[stmts[0]].kind, NodeKind::If { .. }));
    assert!(matches!(arena[stmts[1]].kind, NodeKind::For { .. }));
    assert!(matches!(arena[stmts[2]].kind, NodeKind::While { .. }));
}

#[test]
fn missing_semicolon_is_a_warning_not_an_error() {
    let (_, _, sink) = parse("var x = 1\nvar y = 2;");
    assert!(!sink.has_errors());
    assert!(sink
        .entries()
        .iter()
        .any(|d| d.code == jsasta_common::diagnostics::codes::PARSE_MISSING_SEMICOLON));
}

#[test]
fn malformed_statement_recovers_and_continues_parsing() {
    let (arena, root, sink) = parse("var x = ;\nvar y = 1;");
    assert!(sink.has_errors());
    let stmts = statements(&arena, root);
    // Recovery must not drop the well-formed statement after the bad one.
    assert!(stmts.len() >= 2);
    let last = *stmts.last().unwrap();
    match &arena[last].kind {
        NodeKind::VarDecl { name, .. } => assert_eq!(name, "y"),
        other => panic!("expected trailing VarDecl, got {other:?}"),
    }
}

#[test]
fn object_and_array_literals_parse() {
    let (arena, root, sink) = parse("var p = { x: 1, y: 2 }; var a = [1, 2, 3];");
    assert!(sink.is_empty());
    let stmts = statements(&arena, root);
    match &arena[stmts[0]].kind {
        NodeKind::VarDecl { init, .. } => match &arena[init.unwrap()].kind {
            NodeKind::ObjectLiteral { fields } => assert_eq!(fields.len(), 2),
            other => panic!("expected ObjectLiteral, got {other:?}"),
        },
        other => panic!("expected VarDecl, got {other:?}"),
    }
    match &arena[stmts[1]].kind {
        NodeKind::VarDecl { init, .. } => match &arena[init.unwrap()].kind {
            NodeKind::ArrayLiteral { elements } => assert_eq!(elements.len(), 3),
            other => panic!("expected ArrayLiteral, got {other:?}"),
        },
        other => panic!("expected VarDecl, got {other:?}"),
    }
}
