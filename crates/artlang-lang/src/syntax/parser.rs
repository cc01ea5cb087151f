use crate::syntax::ast::*;
use crate::error::{Error, ErrorCode};
use crate::syntax::token::{Token, TokenKind};

/// Statements and expressions may nest this many levels before parsing fails.
pub const MAX_NESTING: usize = 100;

/// Recursive-descent parser. Blocks may be brace-delimited (`{ ... }`) or
/// keyword-delimited (`then/do ... end`); the token after each header decides.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    fn_depth: usize,
    nesting: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, fn_depth: 0, nesting: 0 }
    }

    pub fn parse(mut self) -> Result<Program, Vec<Error>> {
        let mut errors = Vec::new();
        let mut items = Vec::new();

        while !self.is_at_end() {
            let pos_before = self.pos;

            match self.peek_kind() {
                TokenKind::Semicolon => { self.advance(); }
                TokenKind::Function => match self.parse_fn_def() {
                    Ok(f) => items.push(Item::FnDef(f)),
                    Err(e) => { errors.push(e); self.recover(); }
                },
                TokenKind::Ident(_) if self.is_shorthand_fn() => match self.parse_shorthand_fn() {
                    Ok(f) => items.push(Item::FnDef(f)),
                    Err(e) => { errors.push(e); self.recover(); }
                },
                TokenKind::Eof => break,
                // closer of a block whose body already failed
                TokenKind::RBrace | TokenKind::End if !errors.is_empty() => { self.advance(); }
                _ => match self.parse_stmt() {
                    Ok(s) => items.push(Item::Stmt(s)),
                    Err(e) => { errors.push(e); self.recover(); }
                },
            }

            // guarantee progress: if nothing was consumed, force-advance
            // so an unrecognised token cannot loop forever
            if self.pos == pos_before {
                self.advance();
            }
        }

        if errors.is_empty() {
            Ok(Program { items })
        } else {
            Err(errors)
        }
    }

    // ─── Function definitions ────────────────────────────────────────────────

    /// `function name(a, b) { ... }` or `function name(a, b) ... end`
    fn parse_fn_def(&mut self) -> Result<FnDef, Error> {
        let span = self.span();
        self.expect(TokenKind::Function)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_fn_body()?;
        Ok(FnDef { name, params, body, span })
    }

    /// Top-level `name(a, b) { ... }`.
    fn parse_shorthand_fn(&mut self) -> Result<FnDef, Error> {
        let span = self.span();
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_fn_body()?;
        Ok(FnDef { name, params, body, span })
    }

    fn parse_fn_body(&mut self) -> Result<Vec<Stmt>, Error> {
        self.fn_depth += 1;
        let body = if self.check(TokenKind::LBrace) {
            self.parse_brace_block()
        } else {
            self.parse_keyword_block()
                .and_then(|body| self.expect(TokenKind::End).map(|_| body))
        };
        self.fn_depth -= 1;
        body
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, Error> {
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            let span = self.span();
            let name = self.expect_ident()?;
            params.push(Param { name, span });
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(params)
    }

    // ─── Blocks ──────────────────────────────────────────────────────────────

    fn parse_brace_block(&mut self) -> Result<Vec<Stmt>, Error> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        loop {
            while self.matches(TokenKind::Semicolon) {}
            if self.check(TokenKind::RBrace) || self.is_at_end() { break; }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    /// Statements up to (not including) `end`, `else` or `elseif`.
    fn parse_keyword_block(&mut self) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::new();
        loop {
            while self.matches(TokenKind::Semicolon) {}
            if self.peek_kind().ends_block() { break; }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    /// Body of a loop: `{ ... }` or `[do] ... end`.
    fn parse_loop_body(&mut self) -> Result<Vec<Stmt>, Error> {
        if self.check(TokenKind::LBrace) {
            return self.parse_brace_block();
        }
        self.matches(TokenKind::Do);
        let body = self.parse_keyword_block()?;
        self.expect(TokenKind::End)?;
        Ok(body)
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        self.nested(Self::parse_stmt_inner)
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, Error> {
        match self.peek_kind() {
            TokenKind::Var    => self.parse_var_decl(),
            TokenKind::If     => self.parse_if(),
            TokenKind::While  => self.parse_while(),
            TokenKind::For    => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Function => {
                let tok = self.peek().clone();
                Err(Error::new(ErrorCode::P004, tok.line, tok.column,
                    "function declarations are only allowed at the top level"))
            }
            _ => self.parse_expr_or_assign(),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Var)?;
        let name = self.expect_ident()?;
        let initializer = if self.matches(TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Stmt::VarDecl(VarDecl { name, initializer, span }))
    }

    /// An expression statement, or an assignment when the expression is
    /// followed by `=` / `+=` / `-=` / `*=` / `/=`.
    fn parse_expr_or_assign(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        let expr = self.parse_expr()?;
        let op = match self.peek_kind() {
            TokenKind::Eq      => None,
            TokenKind::PlusEq  => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq  => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            _ => return Ok(Stmt::Expr(expr)),
        };
        self.advance();
        let target = match expr {
            Expr::Ident(name, _) => AssignTarget::Name(name),
            Expr::Index { object, index, .. } => AssignTarget::Index { object: *object, index: *index },
            Expr::Field { object, field, .. } => AssignTarget::Field { object: *object, field },
            _ => return Err(Error::new(ErrorCode::P001, span.line, span.column,
                "invalid assignment target")),
        };
        let value = self.parse_expr()?;
        Ok(Stmt::Assign(Assign { target, op, value, span }))
    }

    fn parse_if(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::If)?;
        let mut branches = Vec::new();
        let mut else_block = None;
        let condition = self.parse_expr()?;

        if self.check(TokenKind::LBrace) {
            branches.push((condition, self.parse_brace_block()?));
            loop {
                if self.matches(TokenKind::ElseIf) {
                    let cond = self.parse_expr()?;
                    branches.push((cond, self.parse_brace_block()?));
                } else if self.matches(TokenKind::Else) {
                    if self.matches(TokenKind::If) {
                        let cond = self.parse_expr()?;
                        branches.push((cond, self.parse_brace_block()?));
                    } else {
                        else_block = Some(self.parse_brace_block()?);
                        break;
                    }
                } else {
                    break;
                }
            }
        } else {
            self.matches(TokenKind::Then);
            branches.push((condition, self.parse_keyword_block()?));
            loop {
                match self.peek_kind() {
                    TokenKind::ElseIf => {
                        self.advance();
                        let cond = self.parse_expr()?;
                        self.matches(TokenKind::Then);
                        branches.push((cond, self.parse_keyword_block()?));
                    }
                    TokenKind::Else => {
                        self.advance();
                        else_block = Some(self.parse_keyword_block()?);
                        self.expect(TokenKind::End)?;
                        break;
                    }
                    _ => {
                        self.expect(TokenKind::End)?;
                        break;
                    }
                }
            }
        }

        Ok(Stmt::If(IfStmt { branches, else_block, span }))
    }

    fn parse_while(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::While)?;
        let condition = self.parse_expr()?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::While(WhileStmt { condition, body, span }))
    }

    fn parse_for(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::For)?;
        if self.check(TokenKind::LParen) {
            return self.parse_c_for(span);
        }
        let var = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let start = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let stop = self.parse_expr()?;
        let step = if self.matches(TokenKind::Comma) { Some(self.parse_expr()?) } else { None };
        let body = self.parse_loop_body()?;
        Ok(Stmt::For(ForStmt { var, start, stop, step, body, span }))
    }

    /// `for (init; condition; step) body`; every clause may be empty.
    fn parse_c_for(&mut self, span: Span) -> Result<Stmt, Error> {
        self.expect(TokenKind::LParen)?;
        let init = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_stmt()?))
        };
        self.expect(TokenKind::Semicolon)?;
        let condition = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr()?) };
        self.expect(TokenKind::Semicolon)?;
        let step = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expr_or_assign()?))
        };
        self.expect(TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::CFor(CForStmt { init, condition, step, body, span }))
    }

    fn parse_return(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        if self.fn_depth == 0 {
            return Err(Error::new(ErrorCode::P003, span.line, span.column,
                "`return` outside of a function"));
        }
        self.expect(TokenKind::Return)?;
        // A bare `return` ends at a block terminator or at the end of its line.
        let next = self.peek();
        let bare = next.line != span.line
            || matches!(
                next.kind,
                TokenKind::RBrace | TokenKind::Semicolon | TokenKind::End
                | TokenKind::Else | TokenKind::ElseIf | TokenKind::Eof
            );
        let value = if bare { None } else { Some(self.parse_expr()?) };
        Ok(Stmt::Return(value, span))
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let span = self.span();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::Or, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_comparison()?;
        while self.check(TokenKind::And) {
            let span = self.span();
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::BinOp { left: Box::new(left), op: BinOp::And, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq   => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt     => BinOp::Lt,
                TokenKind::LtEq   => BinOp::LtEq,
                TokenKind::Gt     => BinOp::Gt,
                TokenKind::GtEq   => BinOp::GtEq,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let right = self.parse_addition()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_addition(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let right = self.parse_multiplication()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star    => BinOp::Mul,
                TokenKind::Slash   => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    /// Every nested expression (parens, literals, arguments, operands)
    /// passes through here, so this is where expression depth is counted.
    fn parse_unary(&mut self) -> Result<Expr, Error> {
        self.nested(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        if self.matches(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Neg, operand: Box::new(operand), span });
        }
        if self.matches(TokenKind::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr::UnOp { op: UnOp::Not, operand: Box::new(operand), span });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                // field access or method call: expr.name or expr.name(args)
                TokenKind::Dot => {
                    let span = expr.span().clone();
                    self.advance();
                    let field = self.expect_ident()?;
                    if self.check(TokenKind::LParen) {
                        self.advance();
                        let args = self.parse_arg_list()?;
                        self.expect(TokenKind::RParen)?;
                        expr = Expr::MethodCall { object: Box::new(expr), method: field, args, span };
                    } else {
                        expr = Expr::Field { object: Box::new(expr), field, span };
                    }
                }

                // index: expr[i], only when `[` continues the same line
                TokenKind::LBracket if self.peek().line == self.prev_line() => {
                    let span = self.span();
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index { object: Box::new(expr), index: Box::new(index), span };
                }

                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let tok = self.peek().clone();
        let span = Span::new(tok.line, tok.column);

        match tok.kind {
            TokenKind::Number(v)    => { self.advance(); Ok(Expr::Number(v, span)) }
            TokenKind::Bool(v)      => { self.advance(); Ok(Expr::Bool(v, span)) }
            TokenKind::StringLit(s) => { self.advance(); Ok(Expr::StringLit(s, span)) }
            TokenKind::Nil          => { self.advance(); Ok(Expr::Nil(span)) }

            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            // list literal
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                    items.push(self.parse_expr()?);
                    if !self.matches(TokenKind::Comma) { break; }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::List(items, span))
            }

            // map literal: only reachable in expression position
            TokenKind::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                    let key = self.parse_map_key()?;
                    self.expect(TokenKind::Colon)?;
                    entries.push((key, self.parse_expr()?));
                    if !self.matches(TokenKind::Comma) { break; }
                }
                self.expect(TokenKind::RBrace)?;
                Ok(Expr::Map(entries, span))
            }

            TokenKind::Ident(_) => self.parse_call_or_ident(),

            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_map_key(&mut self) -> Result<String, Error> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Ident(s) | TokenKind::StringLit(s) => Ok(s),
            TokenKind::Number(n) => Ok(crate::runtime::value::format_number(n)),
            _ => Err(self.error_at(&tok, "expected map key")),
        }
    }

    /// `name(args)` is a call only when `(` sits on the same line as `name`, so
    /// a statement starting with `(` on the next line is never swallowed.
    fn parse_call_or_ident(&mut self) -> Result<Expr, Error> {
        let tok = self.advance();
        let span = Span::new(tok.line, tok.column);
        let name = match tok.kind {
            TokenKind::Ident(s) => s,
            _ => return Err(self.error_at(&tok, "expected identifier")),
        };

        if self.check(TokenKind::LParen) && self.peek().line == tok.line {
            self.advance();
            let args = self.parse_arg_list()?;
            self.expect(TokenKind::RParen)?;
            Ok(Expr::Call { callee: name, args, span })
        } else {
            Ok(Expr::Ident(name, span))
        }
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, Error> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(args)
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn prev_line(&self) -> usize {
        self.pos.checked_sub(1).map_or(0, |i| self.tokens[i].line)
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn kind_at(&self, i: usize) -> Option<&TokenKind> {
        self.tokens.get(i).map(|t| &t.kind)
    }

    /// Returns true when the current position starts `name(a, b) {`.
    fn is_shorthand_fn(&self) -> bool {
        let mut i = self.pos;
        if !matches!(self.kind_at(i), Some(TokenKind::Ident(_))) { return false; }
        i += 1;
        if self.kind_at(i) != Some(&TokenKind::LParen) { return false; }
        i += 1;
        if matches!(self.kind_at(i), Some(TokenKind::Ident(_))) {
            i += 1;
            while self.kind_at(i) == Some(&TokenKind::Comma)
                && matches!(self.kind_at(i + 1), Some(TokenKind::Ident(_)))
            {
                i += 2;
            }
        }
        self.kind_at(i) == Some(&TokenKind::RParen)
            && self.kind_at(i + 1) == Some(&TokenKind::LBrace)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(Error::new(
                ErrorCode::P002,
                tok.line,
                tok.column,
                format!("expected {}, found {}", describe(&kind), describe(&tok.kind)),
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, Error> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Ident(s) => Ok(s),
            _ => Err(self.error_at(&tok, "expected identifier")),
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn span(&self) -> Span {
        let tok = self.peek();
        Span::new(tok.line, tok.column)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = self.peek();
        Error::new(
            ErrorCode::P001,
            tok.line,
            tok.column,
            format!("expected {}, found {}", expected, describe(&tok.kind)),
        )
    }

    fn error_at(&self, tok: &Token, msg: &str) -> Error {
        Error::new(ErrorCode::P001, tok.line, tok.column,
            format!("{msg}, found {}", describe(&tok.kind)))
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        if self.nesting >= MAX_NESTING {
            let tok = self.peek();
            return Err(Error::new(ErrorCode::P001, tok.line, tok.column,
                format!("nested more than {MAX_NESTING} levels deep")));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    /// Skip tokens until we find something that looks like a new statement.
    /// Used after a parse error to attempt recovery.
    fn recover(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof
                | TokenKind::Function
                | TokenKind::Var
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::End
                | TokenKind::RBrace => break,
                _ => { self.advance(); }
            }
        }
    }
}

/// Human-readable token name for diagnostics.
fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n)    => format!("number `{n}`"),
        TokenKind::Bool(b)      => format!("`{b}`"),
        TokenKind::Ident(s)     => format!("identifier `{s}`"),
        TokenKind::StringLit(_) => "string".into(),
        TokenKind::Nil          => "`nil`".into(),
        TokenKind::Function     => "`function`".into(),
        TokenKind::End          => "`end`".into(),
        TokenKind::If           => "`if`".into(),
        TokenKind::Then         => "`then`".into(),
        TokenKind::Else         => "`else`".into(),
        TokenKind::ElseIf       => "`elseif`".into(),
        TokenKind::For          => "`for`".into(),
        TokenKind::While        => "`while`".into(),
        TokenKind::Do           => "`do`".into(),
        TokenKind::Return       => "`return`".into(),
        TokenKind::Var          => "`var`".into(),
        TokenKind::And          => "`and`".into(),
        TokenKind::Or           => "`or`".into(),
        TokenKind::Not          => "`not`".into(),
        TokenKind::Plus         => "`+`".into(),
        TokenKind::Minus        => "`-`".into(),
        TokenKind::Star         => "`*`".into(),
        TokenKind::Slash        => "`/`".into(),
        TokenKind::Percent      => "`%`".into(),
        TokenKind::PlusEq       => "`+=`".into(),
        TokenKind::MinusEq      => "`-=`".into(),
        TokenKind::StarEq       => "`*=`".into(),
        TokenKind::SlashEq      => "`/=`".into(),
        TokenKind::Eq           => "`=`".into(),
        TokenKind::EqEq         => "`==`".into(),
        TokenKind::BangEq       => "`!=`".into(),
        TokenKind::Lt           => "`<`".into(),
        TokenKind::LtEq         => "`<=`".into(),
        TokenKind::Gt           => "`>`".into(),
        TokenKind::GtEq         => "`>=`".into(),
        TokenKind::Colon        => "`:`".into(),
        TokenKind::Comma        => "`,`".into(),
        TokenKind::Semicolon    => "`;`".into(),
        TokenKind::Dot          => "`.`".into(),
        TokenKind::LParen       => "`(`".into(),
        TokenKind::RParen       => "`)`".into(),
        TokenKind::LBrace       => "`{`".into(),
        TokenKind::RBrace       => "`}`".into(),
        TokenKind::LBracket     => "`[`".into(),
        TokenKind::RBracket     => "`]`".into(),
        TokenKind::Eof          => "end of input".into(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
