//! Recursive-descent, Pratt-style parser.
//!
//! The lexer's token stream is lazy, but the parser drains it eagerly into
//! a `Vec<Token>` up front: error recovery and the one-dot namespace-path
//! check both want unbounded lookahead, and pre-lexing keeps that simple
//! without changing what the lexer itself guarantees.

use crate::ast::{
    BinaryOp, CompoundAssignOp, IncDecOp, NodeArena, NodeId, NodeKind, Param, PrimitiveKind,
    StructFieldDecl, TypeExpr, UnaryOp, ImportSource,
};
use crate::error::{
    invalid_assignment_target, invalid_type_path, missing_semicolon, stuck_position,
    unexpected_token,
};
use jsasta_common::diagnostics::DiagnosticSink;
use jsasta_common::numeric::literal_has_fractional_part;
use jsasta_common::source::SourceFile;
use jsasta_common::span::SourceLocation;
use jsasta_scanner::{Lexer, SyntaxKind, Token};

/// Parse a whole module. Returns the arena and the `Program` node's id.
/// Never panics: lex and parse errors are pushed to `sink` and the parser
/// recovers and keeps going.
#[must_use]
pub fn parse_module(source: &SourceFile, sink: &mut DiagnosticSink) -> (NodeArena, NodeId) {
    let tokens = lex_all(source, sink);
    let mut parser = Parser {
        tokens,
        pos: 0,
        source: source.clone(),
        sink,
        arena: NodeArena::new(),
    };
    let root = parser.parse_program();
    (parser.arena, root)
}

fn lex_all(source: &SourceFile, sink: &mut DiagnosticSink) -> Vec<Token> {
    use jsasta_common::diagnostics::{codes, Diagnostic};

    let mut lexer = Lexer::new(&source.text);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(tok) => {
                let is_eof = tok.kind == SyntaxKind::Eof;
                tokens.push(tok);
                if is_eof {
                    break;
                }
            }
            Err(err) => {
                let (line, column) = source.line_col(err.offset);
                let loc = SourceLocation::new(source.filename.clone(), line, column);
                let code = if err.message.contains("unterminated string") {
                    codes::LEX_UNTERMINATED_STRING
                } else if err.message.contains("unterminated block comment") {
                    codes::LEX_UNTERMINATED_COMMENT
                } else {
                    codes::LEX_UNKNOWN_BYTE
                };
                sink.push(Diagnostic::error(code, loc, err.message));
                if err.message.contains("unterminated") {
                    // Cursor is already pinned at EOF; one more call will
                    // return the Eof token and the loop above exits.
                    continue;
                }
            }
        }
    }
    tokens
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: SourceFile,
    sink: &'a mut DiagnosticSink,
    arena: NodeArena,
}

impl<'a> Parser<'a> {
    fn peek_kind(&self) -> SyntaxKind {
        self.tokens[self.pos].kind
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_loc(&self) -> SourceLocation {
        let (line, column) = self.source.line_col(self.peek().span.start);
        SourceLocation::new(self.source.filename.clone(), line, column)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.peek_kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> Option<Token> {
        if self.peek_kind() == kind {
            Some(self.bump())
        } else {
            self.push_unexpected(kind.text_if_fixed().unwrap_or("a token"));
            None
        }
    }

    fn expect_identifier_text(&mut self) -> String {
        if self.peek_kind() == SyntaxKind::Identifier {
            self.bump().text
        } else {
            self.push_unexpected("an identifier");
            String::new()
        }
    }

    fn push_unexpected(&mut self, expected: &str) {
        let loc = self.current_loc();
        let found = self
            .peek()
            .kind
            .text_if_fixed()
            .map_or_else(|| format!("{:?}", self.peek().kind), str::to_string);
        self.sink.push(unexpected_token(loc, found, expected));
    }

    fn consume_semicolon(&mut self) {
        if !self.eat(SyntaxKind::Semicolon) {
            let loc = self.current_loc();
            self.sink.push(missing_semicolon(loc));
        }
    }

    /// Skip tokens until `;` (consumed), `}` (not consumed), or EOF.
    fn synchronize(&mut self) {
        while !matches!(
            self.peek_kind(),
            SyntaxKind::Semicolon | SyntaxKind::RBrace | SyntaxKind::Eof
        ) {
            self.bump();
        }
        self.eat(SyntaxKind::Semicolon);
    }

    fn guard_progress(&mut self, before: usize) {
        if self.pos == before && self.peek_kind() != SyntaxKind::Eof {
            let loc = self.current_loc();
            self.sink.push(stuck_position(loc));
            self.bump();
        }
    }

    // ---- Program / statements ----------------------------------------

    fn parse_program(&mut self) -> NodeId {
        let loc = self.current_loc();
        let mut statements = Vec::new();
        while self.peek_kind() != SyntaxKind::Eof {
            let before = self.pos;
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.guard_progress(before);
        }
        self.arena.alloc(NodeKind::Program { statements }, loc)
    }

    fn parse_block(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.expect(SyntaxKind::LBrace);
        let mut statements = Vec::new();
        while !matches!(self.peek_kind(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            let before = self.pos;
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.guard_progress(before);
        }
        self.expect(SyntaxKind::RBrace);
        self.arena.alloc(NodeKind::Block { statements }, loc)
    }

    fn parse_block_or_stmt(&mut self) -> NodeId {
        if self.peek_kind() == SyntaxKind::LBrace {
            self.parse_block()
        } else {
            let loc = self.current_loc();
            self.parse_statement()
                .unwrap_or_else(|| self.arena.alloc(NodeKind::Error, loc))
        }
    }

    fn parse_statement(&mut self) -> Option<NodeId> {
        match self.peek_kind() {
            SyntaxKind::Semicolon => {
                self.bump();
                None
            }
            SyntaxKind::LBrace => Some(self.parse_block()),
            SyntaxKind::Var | SyntaxKind::Let | SyntaxKind::Const => Some(self.parse_var_decl()),
            SyntaxKind::Struct => Some(self.parse_struct_decl()),
            SyntaxKind::Function => Some(self.parse_function_decl(false)),
            SyntaxKind::External => {
                self.bump();
                self.expect(SyntaxKind::Function);
                Some(self.parse_function_decl(true))
            }
            SyntaxKind::Import => Some(self.parse_import()),
            SyntaxKind::Export => Some(self.parse_export()),
            SyntaxKind::If => Some(self.parse_if()),
            SyntaxKind::For => Some(self.parse_for()),
            SyntaxKind::While => Some(self.parse_while()),
            SyntaxKind::Break => {
                let loc = self.current_loc();
                self.bump();
                self.consume_semicolon();
                Some(self.arena.alloc(NodeKind::Break, loc))
            }
            SyntaxKind::Continue => {
                let loc = self.current_loc();
                self.bump();
                self.consume_semicolon();
                Some(self.arena.alloc(NodeKind::Continue, loc))
            }
            SyntaxKind::Return => Some(self.parse_return()),
            SyntaxKind::Eof => None,
            _ => Some(self.parse_expr_stmt()),
        }
    }

    fn parse_var_decl(&mut self) -> NodeId {
        let loc = self.current_loc();
        let is_const = self.peek_kind() == SyntaxKind::Const;
        self.bump(); // var | let | const
        let name = self.expect_identifier_text();
        let type_ann = if self.eat(SyntaxKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let init = if self.eat(SyntaxKind::Equals) {
            Some(self.parse_expr())
        } else {
            None
        };
        self.consume_semicolon();
        self.arena.alloc(
            NodeKind::VarDecl {
                name,
                is_const,
                type_ann,
                init,
            },
            loc,
        )
    }

    fn parse_struct_decl(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // struct
        let name = self.expect_identifier_text();
        self.expect(SyntaxKind::LBrace);
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !matches!(self.peek_kind(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            let before = self.pos;
            if self.peek_kind() == SyntaxKind::Function {
                methods.push(self.parse_function_decl(false));
            } else {
                let field_loc = self.current_loc();
                let fname = self.expect_identifier_text();
                self.expect(SyntaxKind::Colon);
                let ftype = self.parse_type();
                let default = if self.eat(SyntaxKind::Equals) {
                    Some(self.parse_expr())
                } else {
                    None
                };
                self.consume_semicolon();
                let size_expr = match &ftype {
                    TypeExpr::Array(_, Some(sz)) => Some(*sz),
                    _ => None,
                };
                fields.push(StructFieldDecl {
                    name: fname,
                    type_ann: ftype,
                    size_expr,
                    default,
                    loc: field_loc,
                });
            }
            self.guard_progress(before);
        }
        self.expect(SyntaxKind::RBrace);
        self.arena
            .alloc(NodeKind::StructDecl { name, fields, methods }, loc)
    }

    fn parse_function_decl(&mut self, is_external: bool) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // function
        let name = self.expect_identifier_text();
        self.expect(SyntaxKind::LParen);
        let mut params = Vec::new();
        while !matches!(self.peek_kind(), SyntaxKind::RParen | SyntaxKind::Eof) {
            let before = self.pos;
            let ploc = self.current_loc();
            let pname = self.expect_identifier_text();
            let type_ann = if self.eat(SyntaxKind::Colon) {
                Some(self.parse_type())
            } else {
                None
            };
            params.push(Param {
                name: pname,
                type_ann,
                loc: ploc,
            });
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
            self.guard_progress(before);
        }
        self.expect(SyntaxKind::RParen);
        let return_type = if self.eat(SyntaxKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let body = if is_external {
            self.consume_semicolon();
            None
        } else {
            Some(self.parse_block())
        };
        self.arena.alloc(
            NodeKind::FunctionDecl {
                name,
                params,
                return_type,
                body,
                is_external,
                is_variadic: false,
            },
            loc,
        )
    }

    fn parse_import(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // import
        let binding = self.expect_identifier_text();
        self.expect(SyntaxKind::From);
        let source = match self.peek_kind() {
            SyntaxKind::StringLiteral => ImportSource::Relative(self.bump().text),
            SyntaxKind::At => {
                self.bump();
                ImportSource::Builtin(self.expect_identifier_text())
            }
            _ => {
                self.push_unexpected("a string path or `@builtin`");
                ImportSource::Relative(String::new())
            }
        };
        self.consume_semicolon();
        self.arena
            .alloc(NodeKind::Import { binding, source }, loc)
    }

    fn parse_export(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // export
        let decl = match self.peek_kind() {
            SyntaxKind::Function => self.parse_function_decl(false),
            SyntaxKind::External => {
                self.bump();
                self.expect(SyntaxKind::Function);
                self.parse_function_decl(true)
            }
            SyntaxKind::Const | SyntaxKind::Var | SyntaxKind::Let => self.parse_var_decl(),
            _ => {
                self.push_unexpected("a function or const declaration");
                self.arena.alloc(NodeKind::Error, loc)
            }
        };
        self.arena.alloc(NodeKind::Export { decl }, loc)
    }

    fn parse_if(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // if
        self.expect(SyntaxKind::LParen);
        let cond = self.parse_expr();
        self.expect(SyntaxKind::RParen);
        let then_branch = self.parse_block_or_stmt();
        let else_branch = if self.eat(SyntaxKind::Else) {
            Some(self.parse_block_or_stmt())
        } else {
            None
        };
        self.arena.alloc(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            loc,
        )
    }

    fn parse_for(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // for
        self.expect(SyntaxKind::LParen);
        let init = if self.eat(SyntaxKind::Semicolon) {
            None
        } else if matches!(
            self.peek_kind(),
            SyntaxKind::Var | SyntaxKind::Let | SyntaxKind::Const
        ) {
            Some(self.parse_var_decl())
        } else {
            let init_loc = self.current_loc();
            let expr = self.parse_expr();
            self.consume_semicolon();
            Some(self.arena.alloc(NodeKind::ExprStmt { expr }, init_loc))
        };
        let cond = if self.peek_kind() == SyntaxKind::Semicolon {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(SyntaxKind::Semicolon);
        let step = if self.peek_kind() == SyntaxKind::RParen {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(SyntaxKind::RParen);
        let body = self.parse_block_or_stmt();
        self.arena.alloc(
            NodeKind::For {
                init,
                cond,
                step,
                body,
            },
            loc,
        )
    }

    fn parse_while(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // while
        self.expect(SyntaxKind::LParen);
        let cond = self.parse_expr();
        self.expect(SyntaxKind::RParen);
        let body = self.parse_block_or_stmt();
        self.arena.alloc(NodeKind::While { cond, body }, loc)
    }

    fn parse_return(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // return
        let value = if self.peek_kind() == SyntaxKind::Semicolon {
            None
        } else {
            Some(self.parse_expr())
        };
        self.consume_semicolon();
        self.arena.alloc(NodeKind::Return { value }, loc)
    }

    fn parse_expr_stmt(&mut self) -> NodeId {
        let loc = self.current_loc();
        let before = self.pos;
        let expr = self.parse_expr();
        if self.pos == before {
            // parse_expr made no progress at all (e.g. a bare `}` reached
            // via a dangling statement context): recover instead of
            // looping forever in the caller.
            self.push_unexpected("a statement");
            self.synchronize();
            return expr;
        }
        self.consume_semicolon();
        self.arena.alloc(NodeKind::ExprStmt { expr }, loc)
    }

    // ---- Types ---------------------------------------------------------

    fn parse_type(&mut self) -> TypeExpr {
        if self.eat(SyntaxKind::Ref) {
            let inner = self.parse_type();
            return TypeExpr::Ref(Box::new(inner), true);
        }
        let mut base = self.parse_type_atom();
        while self.peek_kind() == SyntaxKind::LBracket {
            self.bump();
            let size = if self.peek_kind() == SyntaxKind::RBracket {
                None
            } else {
                Some(self.parse_expr())
            };
            self.expect(SyntaxKind::RBracket);
            base = TypeExpr::Array(Box::new(base), size);
        }
        base
    }

    fn parse_type_atom(&mut self) -> TypeExpr {
        if self.peek_kind() != SyntaxKind::Identifier {
            self.push_unexpected("a type");
            return TypeExpr::Named(String::new());
        }
        let name = self.bump().text;
        if let Some(prim) = PrimitiveKind::from_name(&name) {
            return TypeExpr::Primitive(prim);
        }
        if self.eat(SyntaxKind::Dot) {
            let member = self.expect_identifier_text();
            if self.peek_kind() == SyntaxKind::Dot {
                let loc = self.current_loc();
                self.sink.push(invalid_type_path(loc));
                while self.eat(SyntaxKind::Dot) {
                    self.expect_identifier_text();
                }
            }
            return TypeExpr::Namespaced(name, member);
        }
        TypeExpr::Named(name)
    }

    // ---- Expressions ----------------------------------------------------

    fn parse_expr(&mut self) -> NodeId {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> NodeId {
        let loc = self.current_loc();
        let lhs = self.parse_ternary();
        let op = match self.peek_kind() {
            SyntaxKind::Equals => Some(CompoundAssignOp::Assign),
            SyntaxKind::PlusEquals => Some(CompoundAssignOp::AddAssign),
            SyntaxKind::MinusEquals => Some(CompoundAssignOp::SubAssign),
            SyntaxKind::StarEquals => Some(CompoundAssignOp::MulAssign),
            SyntaxKind::SlashEquals => Some(CompoundAssignOp::DivAssign),
            _ => None,
        };
        let Some(op) = op else {
            return lhs;
        };
        self.bump();
        let value = self.parse_assignment();
        match self.arena.get(lhs).kind.clone() {
            NodeKind::MemberAccess { object, property } => self.arena.alloc(
                NodeKind::MemberAssignment {
                    object,
                    property,
                    value,
                },
                loc,
            ),
            NodeKind::IndexAccess { object, index } => {
                self.arena
                    .alloc(NodeKind::IndexAssignment { object, index, value }, loc)
            }
            NodeKind::Identifier { .. } => {
                self.arena
                    .alloc(NodeKind::Assign { target: lhs, op, value }, loc)
            }
            _ => {
                self.sink.push(invalid_assignment_target(loc));
                self.arena.alloc(NodeKind::Error, loc)
            }
        }
    }

    fn parse_ternary(&mut self) -> NodeId {
        let loc = self.current_loc();
        let cond = self.parse_logical_or();
        if self.eat(SyntaxKind::Question) {
            let then_expr = self.parse_assignment();
            self.expect(SyntaxKind::Colon);
            let else_expr = self.parse_assignment();
            self.arena.alloc(
                NodeKind::Ternary {
                    cond,
                    then_expr,
                    else_expr,
                },
                loc,
            )
        } else {
            cond
        }
    }

    fn parse_left_assoc(
        &mut self,
        next: fn(&mut Self) -> NodeId,
        ops: &[(SyntaxKind, BinaryOp)],
    ) -> NodeId {
        let loc = self.current_loc();
        let mut lhs = next(self);
        loop {
            let kind = self.peek_kind();
            let Some(&(_, op)) = ops.iter().find(|(k, _)| *k == kind) else {
                break;
            };
            self.bump();
            let rhs = next(self);
            lhs = self.arena.alloc(NodeKind::Binary { op, left: lhs, right: rhs }, loc);
        }
        lhs
    }

    fn parse_logical_or(&mut self) -> NodeId {
        self.parse_left_assoc(Self::parse_logical_and, &[(SyntaxKind::PipePipe, BinaryOp::Or)])
    }

    fn parse_logical_and(&mut self) -> NodeId {
        self.parse_left_assoc(Self::parse_bit_or, &[(SyntaxKind::AmpAmp, BinaryOp::And)])
    }

    fn parse_bit_or(&mut self) -> NodeId {
        self.parse_left_assoc(Self::parse_bit_xor, &[(SyntaxKind::Pipe, BinaryOp::BitOr)])
    }

    fn parse_bit_xor(&mut self) -> NodeId {
        self.parse_left_assoc(Self::parse_bit_and, &[(SyntaxKind::Caret, BinaryOp::BitXor)])
    }

    fn parse_bit_and(&mut self) -> NodeId {
        self.parse_left_assoc(Self::parse_equality, &[(SyntaxKind::Amp, BinaryOp::BitAnd)])
    }

    fn parse_equality(&mut self) -> NodeId {
        self.parse_left_assoc(
            Self::parse_relational,
            &[
                (SyntaxKind::EqualsEquals, BinaryOp::Eq),
                (SyntaxKind::BangEquals, BinaryOp::Ne),
            ],
        )
    }

    fn parse_relational(&mut self) -> NodeId {
        self.parse_left_assoc(
            Self::parse_shift,
            &[
                (SyntaxKind::Less, BinaryOp::Lt),
                (SyntaxKind::LessEquals, BinaryOp::Le),
                (SyntaxKind::Greater, BinaryOp::Gt),
                (SyntaxKind::GreaterEquals, BinaryOp::Ge),
            ],
        )
    }

    fn parse_shift(&mut self) -> NodeId {
        self.parse_left_assoc(
            Self::parse_additive,
            &[
                (SyntaxKind::LessLess, BinaryOp::Shl),
                (SyntaxKind::GreaterGreater, BinaryOp::Shr),
            ],
        )
    }

    fn parse_additive(&mut self) -> NodeId {
        self.parse_left_assoc(
            Self::parse_multiplicative,
            &[
                (SyntaxKind::Plus, BinaryOp::Add),
                (SyntaxKind::Minus, BinaryOp::Sub),
            ],
        )
    }

    fn parse_multiplicative(&mut self) -> NodeId {
        self.parse_left_assoc(
            Self::parse_unary,
            &[
                (SyntaxKind::Star, BinaryOp::Mul),
                (SyntaxKind::Slash, BinaryOp::Div),
                (SyntaxKind::Percent, BinaryOp::Rem),
            ],
        )
    }

    fn parse_unary(&mut self) -> NodeId {
        let loc = self.current_loc();
        match self.peek_kind() {
            SyntaxKind::Minus => {
                self.bump();
                let operand = self.parse_unary();
                self.arena.alloc(NodeKind::Unary { op: UnaryOp::Neg, operand }, loc)
            }
            SyntaxKind::Bang => {
                self.bump();
                let operand = self.parse_unary();
                self.arena.alloc(NodeKind::Unary { op: UnaryOp::Not, operand }, loc)
            }
            SyntaxKind::PlusPlus => {
                self.bump();
                let operand = self.parse_unary();
                self.arena
                    .alloc(NodeKind::Prefix { op: IncDecOp::Inc, operand }, loc)
            }
            SyntaxKind::MinusMinus => {
                self.bump();
                let operand = self.parse_unary();
                self.arena
                    .alloc(NodeKind::Prefix { op: IncDecOp::Dec, operand }, loc)
            }
            SyntaxKind::Ref => {
                self.bump();
                let operand = self.parse_unary();
                self.arena.alloc(NodeKind::RefExpr { operand }, loc)
            }
            SyntaxKind::Delete => {
                self.bump();
                let operand = self.parse_unary();
                self.arena.alloc(NodeKind::DeleteExpr { operand }, loc)
            }
            SyntaxKind::New => self.parse_new_expr(),
            _ => self.parse_postfix_and_cast(),
        }
    }

    fn parse_new_expr(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // new
        let elem_type = self.parse_type_atom();
        self.expect(SyntaxKind::LBracket);
        let size = self.parse_expr();
        self.expect(SyntaxKind::RBracket);
        self.arena.alloc(NodeKind::NewExpr { elem_type, size }, loc)
    }

    fn parse_postfix_and_cast(&mut self) -> NodeId {
        let loc = self.current_loc();
        let mut expr = self.parse_call_member_chain();
        loop {
            match self.peek_kind() {
                SyntaxKind::As => {
                    self.bump();
                    let target = self.parse_type();
                    expr = self.arena.alloc(NodeKind::Cast { expr, target }, loc);
                }
                SyntaxKind::Is => {
                    self.bump();
                    let target = self.parse_type();
                    expr = self.arena.alloc(NodeKind::InstanceOf { expr, target }, loc);
                }
                SyntaxKind::PlusPlus => {
                    self.bump();
                    expr = self
                        .arena
                        .alloc(NodeKind::Postfix { op: IncDecOp::Inc, operand: expr }, loc);
                }
                SyntaxKind::MinusMinus => {
                    self.bump();
                    expr = self
                        .arena
                        .alloc(NodeKind::Postfix { op: IncDecOp::Dec, operand: expr }, loc);
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_call_member_chain(&mut self) -> NodeId {
        let loc = self.current_loc();
        let mut expr = self.parse_primary();
        loop {
            match self.peek_kind() {
                SyntaxKind::Dot => {
                    self.bump();
                    let name = self.expect_identifier_text();
                    if self.peek_kind() == SyntaxKind::LParen {
                        let args = self.parse_call_args();
                        expr = self.arena.alloc(
                            NodeKind::MethodCall {
                                receiver: expr,
                                method: name,
                                args,
                            },
                            loc,
                        );
                    } else {
                        expr = self
                            .arena
                            .alloc(NodeKind::MemberAccess { object: expr, property: name }, loc);
                    }
                }
                SyntaxKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr();
                    self.expect(SyntaxKind::RBracket);
                    expr = self
                        .arena
                        .alloc(NodeKind::IndexAccess { object: expr, index }, loc);
                }
                SyntaxKind::LParen => {
                    let args = self.parse_call_args();
                    expr = self.arena.alloc(NodeKind::Call { callee: expr, args }, loc);
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_call_args(&mut self) -> Vec<NodeId> {
        self.bump(); // (
        let mut args = Vec::new();
        while !matches!(self.peek_kind(), SyntaxKind::RParen | SyntaxKind::Eof) {
            let before = self.pos;
            args.push(self.parse_assignment());
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
            self.guard_progress(before);
        }
        self.expect(SyntaxKind::RParen);
        args
    }

    fn parse_array_literal(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // [
        let mut elements = Vec::new();
        while !matches!(self.peek_kind(), SyntaxKind::RBracket | SyntaxKind::Eof) {
            let before = self.pos;
            elements.push(self.parse_assignment());
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
            self.guard_progress(before);
        }
        self.expect(SyntaxKind::RBracket);
        self.arena.alloc(NodeKind::ArrayLiteral { elements }, loc)
    }

    fn parse_object_literal(&mut self) -> NodeId {
        let loc = self.current_loc();
        self.bump(); // {
        let mut fields = Vec::new();
        while !matches!(self.peek_kind(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            let before = self.pos;
            let key = self.expect_identifier_text();
            self.expect(SyntaxKind::Colon);
            let value = self.parse_assignment();
            fields.push((key, value));
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
            self.guard_progress(before);
        }
        self.expect(SyntaxKind::RBrace);
        self.arena.alloc(NodeKind::ObjectLiteral { fields }, loc)
    }

    fn parse_primary(&mut self) -> NodeId {
        let loc = self.current_loc();
        match self.peek_kind() {
            SyntaxKind::NumberLiteral => {
                let tok = self.bump();
                let is_float_hint = literal_has_fractional_part(&tok.text);
                self.arena
                    .alloc(NodeKind::NumberLiteral { text: tok.text, is_float_hint }, loc)
            }
            SyntaxKind::StringLiteral => {
                let tok = self.bump();
                self.arena.alloc(NodeKind::StringLiteral { value: tok.text }, loc)
            }
            SyntaxKind::True => {
                self.bump();
                self.arena.alloc(NodeKind::BoolLiteral { value: true }, loc)
            }
            SyntaxKind::False => {
                self.bump();
                self.arena.alloc(NodeKind::BoolLiteral { value: false }, loc)
            }
            SyntaxKind::Identifier => {
                let tok = self.bump();
                self.arena.alloc(NodeKind::Identifier { name: tok.text }, loc)
            }
            SyntaxKind::LParen => {
                self.bump();
                let inner = self.parse_expr();
                self.expect(SyntaxKind::RParen);
                inner
            }
            SyntaxKind::LBracket => self.parse_array_literal(),
            SyntaxKind::LBrace => self.parse_object_literal(),
            _ => {
                self.push_unexpected("an expression");
                self.arena.alloc(NodeKind::Error, loc)
            }
        }
    }
}
