use crate::{
    ast::{
        AccessKind, Expr, ExprId, ExprKind, FnDecl, Owner, Param, PassMode, Program, ScopeId,
        Stmt, StmtId, StmtKind, TypeDecl, TypeName, TypeRef,
    },
    error::{Error, ParseError},
    lexer,
    token::{Pos, Token, TokenKind},
};

/// Parses `source` into `scope`, registering declarations and collecting
/// statements as it goes.
///
/// Several sources may be parsed into the same scope one after another;
/// the builtin prelude is loaded into the global scope this way before
/// the user program.
pub fn parse_into(program: &mut Program, scope: ScopeId, source: &str) -> Result<(), Error> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser {
        program,
        tokens,
        cursor: 0,
    };
    parser.parse_items(scope)?;
    if !parser.peek().is_eof() {
        return Err(parser.unexpected("a declaration or statement").into());
    }
    Ok(())
}

struct Parser<'p> {
    program: &'p mut Program,
    tokens: Vec<Token>,
    cursor: usize,
}

/// Left and right binding powers of the infix operators. A right power
/// lower than the left one makes the operator right-associative.
fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    let powers = match kind {
        OrOr => (1, 2),
        AndAnd => (3, 4),
        EqEq | NotEq | Less | Greater | LessEq | GreaterEq => (5, 6),
        Plus | Minus => (7, 8),
        Star | Slash => (9, 10),
        Caret => (12, 11),
        Dot | LParen => (17, 18),
        _ => return None,
    };
    Some(powers)
}

/// Binding power of the prefix `-` and `!`. Binds tighter than any binary
/// arithmetic, looser than member access and calls.
const UNARY_BP: u8 = 13;

impl Parser<'_> {
    /// Parses declarations and statements until a closing `}` or the end
    /// of input. Neither terminator is consumed.
    fn parse_items(&mut self, scope: ScopeId) -> Result<(), Error> {
        loop {
            match &self.peek().kind {
                TokenKind::Eof | TokenKind::RBrace => return Ok(()),
                TokenKind::Type => self.parse_type_decl(scope)?,
                TokenKind::Fn => self.parse_fn_decl(scope)?,
                _ => {
                    let stmt = self.parse_stmt(scope)?;
                    self.program.push_stmt(scope, stmt);
                }
            }
        }
    }

    fn parse_type_decl(&mut self, scope: ScopeId) -> Result<(), Error> {
        let pos = self.advance().pos;
        let (name, _) = self.consume_identifier("a type name")?;
        let owner = Owner::Type(self.program.next_type_id());
        let member_scope = self.program.alloc_scope(scope, Some(owner));
        self.program.register_type(
            scope,
            TypeDecl {
                name,
                pos,
                scope: member_scope,
            },
        )?;
        self.consume(TokenKind::LBrace, "`{`")?;
        self.parse_items(member_scope)?;
        self.consume(TokenKind::RBrace, "`}`")?;
        Ok(())
    }

    fn parse_fn_decl(&mut self, scope: ScopeId) -> Result<(), Error> {
        self.advance(); // `fn`
        let (name, pos) = self.consume_fn_name()?;

        let id = self.program.next_fn_id();
        let body = self.program.alloc_scope(scope, Some(Owner::Fn(id)));

        self.consume(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        while self.peek().kind != TokenKind::RParen {
            if !params.is_empty() {
                self.consume(TokenKind::Comma, "`,`")?;
            }
            params.push(self.parse_param(body)?);
        }
        self.consume(TokenKind::RParen, "`)`")?;

        let ret = if self.take(&TokenKind::Arrow) {
            let (name, pos) = self.consume_identifier("a return type")?;
            Some(TypeName { name, pos })
        } else {
            None
        };

        // Registered before the body so that the function can recurse.
        self.program.register_fn(
            scope,
            FnDecl {
                name,
                pos,
                params,
                ret,
                body,
                ctor_of: None,
            },
        )?;

        self.consume(TokenKind::LBrace, "`{`")?;
        self.parse_items(body)?;
        self.consume(TokenKind::RBrace, "`}`")?;
        Ok(())
    }

    fn parse_param(&mut self, body: ScopeId) -> Result<Param, Error> {
        let (ty_name, ty_pos) = self.consume_identifier("a parameter type")?;
        let mode = if self.take(&TokenKind::Amp) {
            PassMode::MutableBorrow
        } else {
            PassMode::ImmutableBorrow
        };
        let (name, pos) = self.consume_identifier("a parameter name")?;
        let ty = TypeName {
            name: ty_name,
            pos: ty_pos,
        };
        let var = self.program.declare_var(
            body,
            name.clone(),
            AccessKind::of_mode(mode),
            TypeRef::Named(ty.clone()),
            pos,
        );
        Ok(Param {
            ty,
            mode,
            name,
            var,
            pos,
        })
    }

    fn parse_stmt(&mut self, scope: ScopeId) -> Result<StmtId, Error> {
        match &self.peek().kind {
            TokenKind::Let => self.parse_let(scope),
            TokenKind::Return => self.parse_return(scope),
            TokenKind::If => self.parse_conditional(scope, false),
            TokenKind::Unless => self.parse_conditional(scope, true),
            TokenKind::LBrace => self.parse_block(scope),
            TokenKind::Identifier(_) if self.peek_next().kind == TokenKind::Assign => {
                self.parse_reassign(scope)
            }
            _ => self.parse_expr_stmt(scope),
        }
    }

    fn parse_let(&mut self, scope: ScopeId) -> Result<StmtId, Error> {
        let pos = self.advance().pos;
        let (name, name_pos) = self.consume_identifier("a variable name")?;
        let access = match self.peek().kind {
            TokenKind::Eq => AccessKind::ImmutableLocal,
            TokenKind::Assign => AccessKind::MutableLocal,
            _ => return Err(self.unexpected("`=` or `:=`").into()),
        };
        self.advance();
        let value = self.parse_expr(scope)?;
        self.consume(TokenKind::Semicolon, "`;`")?;
        // Declared only now, so a shadowing initializer such as
        // `let x = x + 1;` still refers to the outer `x`.
        let var = self
            .program
            .declare_var(scope, name, access, TypeRef::OfExpr(value), name_pos);
        Ok(self
            .program
            .alloc_stmt(Stmt::new(StmtKind::Let { var, value }, pos)))
    }

    fn parse_reassign(&mut self, scope: ScopeId) -> Result<StmtId, Error> {
        let (name, pos) = self.consume_identifier("a variable name")?;
        self.consume(TokenKind::Assign, "`:=`")?;
        let value = self.parse_expr(scope)?;
        self.consume(TokenKind::Semicolon, "`;`")?;
        let kind = if self.program.lookup_var(scope, &name).is_some() {
            StmtKind::Reassign {
                target: name,
                value,
            }
        } else {
            // Assigning to an unknown name declares a mutable local.
            let var = self.program.declare_var(
                scope,
                name,
                AccessKind::DynamicLocal,
                TypeRef::OfExpr(value),
                pos,
            );
            StmtKind::Let { var, value }
        };
        Ok(self.program.alloc_stmt(Stmt::new(kind, pos)))
    }

    fn parse_return(&mut self, scope: ScopeId) -> Result<StmtId, Error> {
        let pos = self.advance().pos;
        let value = if self.take(&TokenKind::Semicolon) {
            None
        } else {
            let value = self.parse_expr(scope)?;
            self.consume(TokenKind::Semicolon, "`;`")?;
            Some(value)
        };
        Ok(self.program.alloc_stmt(Stmt::new(StmtKind::Return(value), pos)))
    }

    fn parse_conditional(&mut self, scope: ScopeId, unless: bool) -> Result<StmtId, Error> {
        let pos = self.advance().pos;
        let cond = self.parse_expr(scope)?;
        let then_scope = self.parse_branch(scope, true)?;
        let else_scope = if self.take(&TokenKind::Else) {
            Some(self.parse_branch(scope, false)?)
        } else {
            None
        };
        let kind = if unless {
            StmtKind::Unless {
                cond,
                then_scope,
                else_scope,
            }
        } else {
            StmtKind::If {
                cond,
                then_scope,
                else_scope,
            }
        };
        Ok(self.program.alloc_stmt(Stmt::new(kind, pos)))
    }

    /// A branch body: either a braced block or, after `then` (or directly
    /// after `else`), a single statement. Both get their own scope.
    fn parse_branch(&mut self, parent: ScopeId, wants_then: bool) -> Result<ScopeId, Error> {
        let scope = self.program.alloc_scope(parent, None);
        if self.take(&TokenKind::LBrace) {
            self.parse_items(scope)?;
            self.consume(TokenKind::RBrace, "`}`")?;
        } else {
            if wants_then {
                self.consume(TokenKind::Then, "`then` or `{`")?;
            }
            let stmt = self.parse_stmt(scope)?;
            self.program.push_stmt(scope, stmt);
        }
        Ok(scope)
    }

    fn parse_block(&mut self, scope: ScopeId) -> Result<StmtId, Error> {
        let pos = self.advance().pos;
        let inner = self.program.alloc_scope(scope, None);
        self.parse_items(inner)?;
        self.consume(TokenKind::RBrace, "`}`")?;
        Ok(self
            .program
            .alloc_stmt(Stmt::new(StmtKind::Block(inner), pos)))
    }

    fn parse_expr_stmt(&mut self, scope: ScopeId) -> Result<StmtId, Error> {
        let expr = self.parse_expr(scope)?;
        let node = self.program.expr(expr);
        let pos = node.pos;
        // Only source-level calls and member accesses may stand alone;
        // an operator expression desugars to a call but stays illegal.
        let legal = match &node.kind {
            ExprKind::Call { .. } => !node.is_operator_call(),
            ExprKind::Member { .. } => true,
            _ => false,
        };
        if !legal {
            return Err(ParseError::InvalidExpressionStatement { pos }.into());
        }
        self.consume(TokenKind::Semicolon, "`;`")?;
        Ok(self
            .program
            .alloc_stmt(Stmt::new(StmtKind::Expr(expr), pos)))
    }

    fn parse_expr(&mut self, scope: ScopeId) -> Result<ExprId, Error> {
        self.parse_expr_bp(scope, 0)
    }

    fn parse_expr_bp(&mut self, scope: ScopeId, min_bp: u8) -> Result<ExprId, Error> {
        let token = self.advance();
        let mut lhs = self.parse_nud(scope, token)?;
        loop {
            let Some((lbp, rbp)) = infix_binding_power(&self.peek().kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            let op = self.advance();
            lhs = self.parse_led(scope, op, lhs, rbp)?;
        }
        Ok(lhs)
    }

    /// Parses a "null denotation": literals, variables, grouping and the
    /// prefix operators.
    fn parse_nud(&mut self, scope: ScopeId, token: Token) -> Result<ExprId, Error> {
        let pos = token.pos;
        let kind = match token.kind {
            TokenKind::Identifier(name) | TokenKind::MetaIdentifier(name) => ExprKind::Var(name),
            TokenKind::Int(text) => ExprKind::Int(text),
            TokenKind::Decimal(text) => ExprKind::Decimal(text),
            TokenKind::Float(text) => ExprKind::Float(text),
            TokenKind::Str(text) => ExprKind::Str(text),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::LParen => {
                let inner = self.parse_expr(scope)?;
                self.consume(TokenKind::RParen, "`)`")?;
                return Ok(inner);
            }
            // Unary minus is sugar for a call of the operator function `-`.
            TokenKind::Minus => {
                let operand = self.parse_expr_bp(scope, UNARY_BP)?;
                ExprKind::Call {
                    callee: "-".into(),
                    args: vec![operand],
                }
            }
            TokenKind::Bang => ExprKind::Not(self.parse_expr_bp(scope, UNARY_BP)?),
            kind => {
                return Err(ParseError::Unexpected {
                    expected: "an expression",
                    found: describe(&kind),
                    pos,
                }
                .into())
            }
        };
        Ok(self.program.alloc_expr(Expr::new(kind, pos)))
    }

    /// Parses a "left denotation": binary operators, member accesses and
    /// call argument lists.
    fn parse_led(&mut self, scope: ScopeId, op: Token, lhs: ExprId, rbp: u8) -> Result<ExprId, Error> {
        let pos = op.pos;
        let kind = match &op.kind {
            TokenKind::AndAnd => ExprKind::And(lhs, self.parse_expr_bp(scope, rbp)?),
            TokenKind::OrOr => ExprKind::Or(lhs, self.parse_expr_bp(scope, rbp)?),
            TokenKind::Dot => return self.parse_member(scope, lhs, pos),
            TokenKind::LParen => return self.parse_call(scope, lhs),
            kind => match kind.operator_name() {
                Some(name) => {
                    let rhs = self.parse_expr_bp(scope, rbp)?;
                    ExprKind::Call {
                        callee: name.into(),
                        args: vec![lhs, rhs],
                    }
                }
                None => unreachable!("token without a binding power in operator position"),
            },
        };
        Ok(self.program.alloc_expr(Expr::new(kind, pos)))
    }

    fn parse_member(&mut self, scope: ScopeId, lhs: ExprId, dot_pos: Pos) -> Result<ExprId, Error> {
        let (name, name_pos) = self.consume_identifier("a member name")?;
        let rhs = if self.take(&TokenKind::LParen) {
            let args = self.parse_call_args(scope)?;
            self.program
                .alloc_expr(Expr::new(ExprKind::Call { callee: name, args }, name_pos))
        } else {
            self.program
                .alloc_expr(Expr::new(ExprKind::Var(name), name_pos))
        };
        let member = self
            .program
            .alloc_expr(Expr::new(ExprKind::Member { lhs, rhs }, dot_pos));
        self.program.set_member_of(lhs, member);
        Ok(member)
    }

    fn parse_call(&mut self, scope: ScopeId, lhs: ExprId) -> Result<ExprId, Error> {
        let target = self.program.expr(lhs);
        let pos = target.pos;
        let ExprKind::Var(name) = &target.kind else {
            return Err(ParseError::Unexpected {
                expected: "a function name before `(`",
                found: "an expression".to_string(),
                pos,
            }
            .into());
        };
        let callee = name.clone();
        let args = self.parse_call_args(scope)?;
        Ok(self
            .program
            .alloc_expr(Expr::new(ExprKind::Call { callee, args }, pos)))
    }

    /// Parses a call argument list, the opening `(` already consumed.
    /// Arguments may be labeled `name: expr`; once a label appears, all
    /// following arguments must be labeled too.
    fn parse_call_args(&mut self, scope: ScopeId) -> Result<Vec<ExprId>, Error> {
        let mut args = Vec::new();
        let mut named = false;
        while self.peek().kind != TokenKind::RParen {
            if !args.is_empty() {
                self.consume(TokenKind::Comma, "`,`")?;
            }
            if matches!(self.peek().kind, TokenKind::Identifier(_))
                && self.peek_next().kind == TokenKind::Colon
            {
                let (name, name_pos) = self.consume_identifier("an argument name")?;
                self.advance(); // the `:`
                let value = self.parse_expr(scope)?;
                self.program.set_arg_name(value, name, name_pos);
                args.push(value);
                named = true;
                continue;
            }
            if named {
                return Err(ParseError::PositionalAfterNamed {
                    pos: self.peek().pos,
                }
                .into());
            }
            args.push(self.parse_expr(scope)?);
        }
        self.consume(TokenKind::RParen, "`)`")?;
        Ok(args)
    }

    fn consume_fn_name(&mut self) -> Result<(String, Pos), ParseError> {
        let token = self.peek();
        let pos = token.pos;
        let name = match &token.kind {
            TokenKind::Identifier(name) => name.clone(),
            kind => match kind.operator_name() {
                Some(op) => op.to_string(),
                None => return Err(self.unexpected("a function name")),
            },
        };
        self.advance();
        Ok((name, pos))
    }

    fn consume_identifier(&mut self, expected: &'static str) -> Result<(String, Pos), ParseError> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let pos = self.peek().pos;
                self.advance();
                Ok((name, pos))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn consume(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn take(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.cursor].clone();
        if !token.is_eof() {
            self.cursor += 1;
        }
        token
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    fn peek_next(&self) -> &Token {
        self.tokens
            .get(self.cursor + 1)
            .unwrap_or_else(|| &self.tokens[self.cursor])
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::Unexpected {
            expected,
            found: describe(&self.peek().kind),
            pos: self.peek().pos,
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    use TokenKind::*;
    let simple = match kind {
        Fn => "`fn`",
        Return => "`return`",
        Type => "`type`",
        If => "`if`",
        Unless => "`unless`",
        Then => "`then`",
        Else => "`else`",
        Let => "`let`",
        True => "`True`",
        False => "`False`",
        Plus => "`+`",
        Minus => "`-`",
        Star => "`*`",
        Slash => "`/`",
        Caret => "`^`",
        Less => "`<`",
        LessEq => "`<=`",
        EqEq => "`==`",
        NotEq => "`!=`",
        GreaterEq => "`>=`",
        Greater => "`>`",
        AndAnd => "`&&`",
        OrOr => "`||`",
        Bang => "`!`",
        Amp => "`&`",
        Assign => "`:=`",
        Eq => "`=`",
        Colon => "`:`",
        Semicolon => "`;`",
        Comma => "`,`",
        Dot => "`.`",
        Arrow => "`->`",
        LParen => "`(`",
        RParen => "`)`",
        LBrace => "`{`",
        RBrace => "`}`",
        Eof => "end of input",
        Str(_) => "a string literal",
        Identifier(name) => return format!("identifier `{name}`"),
        MetaIdentifier(name) => return format!("metafunction `{name}`"),
        Int(text) | Decimal(text) | Float(text) => return format!("number `{text}`"),
    };
    simple.to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::BindError;

    use super::*;

    fn parse(source: &str) -> Program {
        let mut program = Program::new();
        parse_into(&mut program, Program::GLOBAL, source).expect("parsing should succeed");
        program
    }

    fn parse_err(source: &str) -> Error {
        let mut program = Program::new();
        parse_into(&mut program, Program::GLOBAL, source).expect_err("parsing should fail")
    }

    fn global_fn<'p>(program: &'p Program, name: &str) -> &'p FnDecl {
        let id = program
            .scope(Program::GLOBAL)
            .fns
            .iter()
            .find(|&&id| program.func(id).name == name)
            .copied()
            .unwrap_or_else(|| panic!("no function `{name}`"));
        program.func(id)
    }

    #[test]
    fn registers_types_with_synthesized_constructors() {
        let program = parse("type Vec2 { }");
        let global = program.scope(Program::GLOBAL);
        assert_eq!(global.types.len(), 1);
        assert_eq!(program.ty(global.types[0]).name, "Vec2");

        let ctor = global_fn(&program, "Vec2");
        assert_eq!(ctor.ctor_of, Some(global.types[0]));
        assert!(ctor.params.is_empty());
        assert_eq!(ctor.ret.as_ref().map(|ty| ty.name.as_str()), Some("Vec2"));
    }

    #[test]
    fn parses_operator_function_names() {
        let program = parse("fn +(Int a, Int b) -> Int { }");
        let plus = global_fn(&program, "+");
        assert_eq!(plus.params.len(), 2);
        assert_eq!(plus.params[0].mode, PassMode::ImmutableBorrow);
        assert_eq!(plus.ret.as_ref().map(|ty| ty.name.as_str()), Some("Int"));
    }

    #[test]
    fn parses_mutably_borrowed_parameters() {
        let program = parse("fn Bump(Int& n) { }");
        let bump = global_fn(&program, "Bump");
        assert_eq!(bump.params[0].mode, PassMode::MutableBorrow);
        assert_eq!(
            program.var(bump.params[0].var).access,
            AccessKind::MutableBorrow
        );
    }

    #[test]
    fn desugars_binary_operators_to_calls() {
        let program = parse("fn Main() { let x = 1 + 2 * 3; }");
        let body = global_fn(&program, "Main").body;
        let StmtKind::Let { value, .. } = &program.stmt(program.scope(body).stmts[0]).kind else {
            panic!("expected a let statement");
        };
        let ExprKind::Call { callee, args } = &program.expr(*value).kind else {
            panic!("expected a call");
        };
        assert_eq!(callee, "+");
        assert!(matches!(&program.expr(args[0]).kind, ExprKind::Int(text) if text == "1"));
        let ExprKind::Call { callee: inner, .. } = &program.expr(args[1]).kind else {
            panic!("expected `*` to bind tighter than `+`");
        };
        assert_eq!(inner, "*");
    }

    #[test]
    fn exponentiation_is_right_associative() {
        let program = parse("fn Main() { let x = 2 ^ 3 ^ 4; }");
        let body = global_fn(&program, "Main").body;
        let StmtKind::Let { value, .. } = &program.stmt(program.scope(body).stmts[0]).kind else {
            panic!("expected a let statement");
        };
        let ExprKind::Call { callee, args } = &program.expr(*value).kind else {
            panic!("expected a call");
        };
        assert_eq!(callee, "^");
        assert!(matches!(
            &program.expr(args[1]).kind,
            ExprKind::Call { callee, .. } if callee == "^"
        ));
    }

    #[test]
    fn shadowed_variables_get_distinct_internal_names() {
        let program = parse("fn Main() { let x = 1; { let x = 2; } }");
        let body = global_fn(&program, "Main").body;
        let outer = program.scope(body).vars["x"][0];
        let StmtKind::Block(inner_scope) = &program.stmt(program.scope(body).stmts[1]).kind else {
            panic!("expected a block");
        };
        let inner = program.scope(*inner_scope).vars["x"][0];
        assert_eq!(program.var(outer).internal, "x");
        assert_eq!(program.var(inner).internal, "x_");
    }

    #[test]
    fn assignment_to_an_unknown_name_declares_a_mutable_local() {
        let program = parse("fn Main() { x := 1; x := 2; }");
        let body = global_fn(&program, "Main").body;
        let stmts = &program.scope(body).stmts;
        let StmtKind::Let { var, .. } = &program.stmt(stmts[0]).kind else {
            panic!("expected the first assignment to declare");
        };
        assert_eq!(program.var(*var).access, AccessKind::DynamicLocal);
        assert!(matches!(
            program.stmt(stmts[1]).kind,
            StmtKind::Reassign { .. }
        ));
    }

    #[test]
    fn let_forms_pick_the_access_kind() {
        let program = parse("fn Main() { let a = 1; let b := 2; }");
        let body = global_fn(&program, "Main").body;
        let a = program.scope(body).vars["a"][0];
        let b = program.scope(body).vars["b"][0];
        assert_eq!(program.var(a).access, AccessKind::ImmutableLocal);
        assert_eq!(program.var(b).access, AccessKind::MutableLocal);
    }

    #[test]
    fn rejects_positional_after_named_arguments() {
        assert_eq!(
            parse_err("fn Main() { F(a: 1, 2); }"),
            Error::Parse(ParseError::PositionalAfterNamed {
                pos: Pos::new(1, 21)
            })
        );
    }

    #[test]
    fn rejects_duplicate_declarations_in_a_scope() {
        assert!(matches!(
            parse_err("fn F() { } fn F() { }"),
            Error::Bind(BindError::AmbiguousDeclaration { name, .. }) if name == "F"
        ));
        assert!(matches!(
            parse_err("type T { } type T { }"),
            Error::Bind(BindError::AmbiguousDeclaration { name, .. }) if name == "T"
        ));
        // The synthesized constructor occupies the type's name.
        assert!(matches!(
            parse_err("type T { } fn T() -> T { }"),
            Error::Bind(BindError::AmbiguousDeclaration { name, .. }) if name == "T"
        ));
        // Overloads with different parameter types are fine, and so are
        // overloads differing in the return type alone; the mangled
        // return-type suffix keeps them apart in the output.
        parse("fn F(Int a) { } fn F(Str a) { }");
        parse("fn F() -> Int { } fn F() -> Str { } fn F() { }");
    }

    #[test]
    fn restricts_expression_statements_to_calls_and_member_accesses() {
        assert!(matches!(
            parse_err("fn Main() { 1 + 2; }"),
            Error::Parse(ParseError::InvalidExpressionStatement { .. })
        ));
        // Unary operators desugar to calls too; still not statements.
        assert!(matches!(
            parse_err("fn Main() { let x = 1; -x; }"),
            Error::Parse(ParseError::InvalidExpressionStatement { .. })
        ));
        parse("fn Main() { F(); a.b; a.F(1); F(1 + 2); }");
    }

    #[test]
    fn parses_branch_bodies_into_their_own_scopes() {
        let program = parse("fn Main() { if True then return; else { return; } }");
        let body = global_fn(&program, "Main").body;
        let StmtKind::If {
            then_scope,
            else_scope,
            ..
        } = &program.stmt(program.scope(body).stmts[0]).kind
        else {
            panic!("expected an if statement");
        };
        assert_eq!(program.scope(*then_scope).stmts.len(), 1);
        assert_eq!(program.scope(else_scope.unwrap()).stmts.len(), 1);
    }

    #[test]
    fn reports_unexpected_tokens_with_positions() {
        assert_eq!(
            parse_err("fn Main( {"),
            Error::Parse(ParseError::Unexpected {
                expected: "a parameter type",
                found: "`{`".to_string(),
                pos: Pos::new(1, 10),
            })
        );
    }
}
