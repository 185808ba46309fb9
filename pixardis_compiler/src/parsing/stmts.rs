//! Statement parsing.
use super::Parser;
use crate::{
    ast::{
        AssignStmt, Block, Expr, ExprKind, ForStmt, FunDecl, IfStmt, LetInit, LetStmt, Param,
        ReturnStmt, Stmt, TypeSpec, WhileStmt,
    },
    diag::DiagnosticKind,
    tokens::{Builtin, Keyword, TokenKind},
};

impl<'a, 'd> Parser<'a, 'd> {
    /// Parse one statement. `top_level` gates function declarations,
    /// which may not appear inside blocks.
    pub(crate) fn parse_statement(&mut self, top_level: bool) -> Option<Stmt> {
        use Keyword as K;
        use TokenKind as T;

        match self.stream().peek_kind().clone() {
            T::Keyword(K::Let) => self.parse_let().map(Stmt::Let),
            T::Keyword(K::Fun) => {
                if !top_level {
                    self.error("function declarations are only permitted at the top level");
                    return None;
                }
                self.parse_fun().map(Stmt::Fun)
            }
            T::Keyword(K::If) => self.parse_if().map(Stmt::If),
            T::Keyword(K::While) => self.parse_while().map(Stmt::While),
            T::Keyword(K::For) => self.parse_for().map(Stmt::For),
            T::Keyword(K::Return) => self.parse_return().map(Stmt::Return),
            T::LeftBrace => self.parse_block().map(Stmt::Block),
            T::Ident(_) => self.parse_assign_or_call(),
            T::Builtin(builtin) => self.parse_builtin_statement(builtin),
            found => {
                self.error(format!("invalid statement starting at '{}'", found));
                // Consume the offending token so recovery always makes
                // progress, even on a stray '}' the synchronizer would
                // stop in front of.
                self.stream().next_token();
                None
            }
        }
    }

    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        self.consume(&TokenKind::LeftBrace)?;

        let mut stmts = Vec::new();
        loop {
            match self.stream().peek_kind() {
                TokenKind::RightBrace => {
                    self.stream().next_token();
                    return Some(Block { stmts });
                }
                TokenKind::Eof => {
                    self.error("expected '}' before end-of-file");
                    return None;
                }
                _ => match self.parse_statement(false) {
                    Some(stmt) => stmts.push(stmt),
                    None => self.synchronize(),
                },
            }
        }
    }

    /// `let name : type = expr ;`
    /// `let name : type [ N ] = [ e1, .., eN ] ;`
    fn parse_let(&mut self) -> Option<LetStmt> {
        let line = self.line();
        self.consume(&TokenKind::Keyword(Keyword::Let))?;
        let id = self.next_id();
        let name = self.consume_ident()?;
        self.consume(&TokenKind::Colon)?;
        let element = self.consume_type()?;

        // Optional array size. The size must be written out; the
        // initializer length is never used to infer it.
        let ty = if self.stream().match_token(&TokenKind::LeftBracket) {
            match self.stream().peek_kind().clone() {
                TokenKind::Int(size) if size > 0 => {
                    self.stream().next_token();
                    self.consume(&TokenKind::RightBracket)?;
                    TypeSpec::Array(element, size as usize)
                }
                TokenKind::Int(_) => {
                    self.error_kind(DiagnosticKind::Type, "array size must be positive");
                    return None;
                }
                TokenKind::RightBracket => {
                    self.error_kind(
                        DiagnosticKind::Type,
                        "array declaration requires an explicit size",
                    );
                    return None;
                }
                found => {
                    self.error(format!("expected array size, found '{}'", found));
                    return None;
                }
            }
        } else {
            TypeSpec::Scalar(element)
        };

        self.consume(&TokenKind::Assign)?;

        let init = match ty {
            TypeSpec::Scalar(_) => LetInit::Scalar(self.parse_expr()?),
            TypeSpec::Array(..) => LetInit::Array(self.parse_array_initializer()?),
        };

        self.consume(&TokenKind::Semicolon)?;

        Some(LetStmt {
            id,
            name,
            ty,
            init,
            line,
        })
    }

    /// `[ e1, e2, .., eN ]`
    fn parse_array_initializer(&mut self) -> Option<Vec<Expr>> {
        self.consume(&TokenKind::LeftBracket)?;

        let mut elements = Vec::new();
        if !self.stream().check(&TokenKind::RightBracket) {
            loop {
                elements.push(self.parse_expr()?);
                if !self.stream().match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RightBracket)?;

        Some(elements)
    }

    /// Statement headed by an identifier: scalar assignment, indexed
    /// assignment, or a call evaluated for its effect.
    fn parse_assign_or_call(&mut self) -> Option<Stmt> {
        let line = self.line();
        let name = self.consume_ident()?;

        match self.stream().peek_kind().clone() {
            TokenKind::Assign => {
                let id = self.next_id();
                self.stream().next_token();
                let value = self.parse_expr()?;
                self.consume(&TokenKind::Semicolon)?;
                Some(Stmt::Assign(AssignStmt {
                    id,
                    name,
                    index: None,
                    value,
                    line,
                }))
            }
            TokenKind::LeftBracket => {
                let id = self.next_id();
                self.stream().next_token();
                let index = self.parse_expr()?;
                self.consume(&TokenKind::RightBracket)?;
                self.consume(&TokenKind::Assign)?;
                let value = self.parse_expr()?;
                self.consume(&TokenKind::Semicolon)?;
                Some(Stmt::Assign(AssignStmt {
                    id,
                    name,
                    index: Some(index),
                    value,
                    line,
                }))
            }
            TokenKind::LeftParen => {
                let call = self.parse_call(name, line)?;
                self.consume(&TokenKind::Semicolon)?;
                Some(Stmt::Expr(call))
            }
            found => {
                self.error(format!(
                    "expected '=', '[' or '(' after identifier, found '{}'",
                    found
                ));
                None
            }
        }
    }

    /// `fun name ( p1: t1, .. ) -> type block`
    fn parse_fun(&mut self) -> Option<FunDecl> {
        let line = self.line();
        self.consume(&TokenKind::Keyword(Keyword::Fun))?;
        let id = self.next_id();
        let name = self.consume_ident()?;
        self.consume(&TokenKind::LeftParen)?;

        let mut params = Vec::new();
        if !self.stream().check(&TokenKind::RightParen) {
            loop {
                let param_line = self.line();
                let param_name = self.consume_ident()?;
                self.consume(&TokenKind::Colon)?;
                let param_ty = self.consume_type()?;
                params.push(Param {
                    name: param_name,
                    ty: param_ty,
                    line: param_line,
                });
                if !self.stream().match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RightParen)?;
        self.consume(&TokenKind::Arrow)?;
        let ret = self.consume_type()?;
        let body = self.parse_block()?;

        Some(FunDecl {
            id,
            name,
            params,
            ret,
            body,
            line,
        })
    }

    /// `if ( cond ) block [ else block ]`
    fn parse_if(&mut self) -> Option<IfStmt> {
        let line = self.line();
        self.consume(&TokenKind::Keyword(Keyword::If))?;
        self.consume(&TokenKind::LeftParen)?;
        let cond = self.parse_expr()?;
        self.consume(&TokenKind::RightParen)?;
        let then_block = self.parse_block()?;

        let else_block = if self.stream().match_token(&TokenKind::Keyword(Keyword::Else)) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Some(IfStmt {
            cond,
            then_block,
            else_block,
            line,
        })
    }

    /// `while ( cond ) block`
    fn parse_while(&mut self) -> Option<WhileStmt> {
        let line = self.line();
        self.consume(&TokenKind::Keyword(Keyword::While))?;
        self.consume(&TokenKind::LeftParen)?;
        let cond = self.parse_expr()?;
        self.consume(&TokenKind::RightParen)?;
        let body = self.parse_block()?;

        Some(WhileStmt { cond, body, line })
    }

    /// `for ( init? ; cond? ; step? ) block`
    ///
    /// The init is a `let` or an assignment, the step an assignment.
    fn parse_for(&mut self) -> Option<ForStmt> {
        let line = self.line();
        self.consume(&TokenKind::Keyword(Keyword::For))?;
        self.consume(&TokenKind::LeftParen)?;

        let init = if self.stream().check(&TokenKind::Semicolon) {
            self.stream().next_token();
            None
        } else {
            let stmt = match self.stream().peek_kind() {
                TokenKind::Keyword(Keyword::Let) => self.parse_let().map(Stmt::Let)?,
                TokenKind::Ident(_) => self.parse_for_assignment()?,
                found => {
                    let found = found.clone();
                    self.error(format!(
                        "expected 'let', assignment or ';' in for initialiser, found '{}'",
                        found
                    ));
                    return None;
                }
            };
            // parse_let consumes its trailing semicolon; assignments
            // in the header are parsed without one.
            if !matches!(stmt, Stmt::Let(_)) {
                self.consume(&TokenKind::Semicolon)?;
            }
            Some(Box::new(stmt))
        };

        let cond = if self.stream().check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume(&TokenKind::Semicolon)?;

        let step = if self.stream().check(&TokenKind::RightParen) {
            None
        } else {
            Some(Box::new(self.parse_for_assignment()?))
        };
        self.consume(&TokenKind::RightParen)?;

        let body = self.parse_block()?;

        Some(ForStmt {
            init,
            cond,
            step,
            body,
            line,
        })
    }

    /// Assignment without the trailing semicolon, for `for` headers.
    fn parse_for_assignment(&mut self) -> Option<Stmt> {
        let line = self.line();
        let name = self.consume_ident()?;

        let index = if self.stream().match_token(&TokenKind::LeftBracket) {
            let index = self.parse_expr()?;
            self.consume(&TokenKind::RightBracket)?;
            Some(index)
        } else {
            None
        };

        let id = self.next_id();
        self.consume(&TokenKind::Assign)?;
        let value = self.parse_expr()?;

        Some(Stmt::Assign(AssignStmt {
            id,
            name,
            index,
            value,
            line,
        }))
    }

    /// `return expr ;`
    fn parse_return(&mut self) -> Option<ReturnStmt> {
        let line = self.line();
        self.consume(&TokenKind::Keyword(Keyword::Return))?;
        let value = self.parse_expr()?;
        self.consume(&TokenKind::Semicolon)?;

        Some(ReturnStmt { value, line })
    }

    /// The statement-form built-ins. The expression-form ones
    /// (`__read`, `__random_int`, `__width`, `__height`) are handled
    /// by the expression parser.
    fn parse_builtin_statement(&mut self, builtin: Builtin) -> Option<Stmt> {
        use Builtin as B;

        self.stream().next_token();

        let stmt = match builtin {
            B::Print => Stmt::Print(self.parse_expr()?),
            B::Delay => Stmt::Delay(self.parse_expr()?),
            B::Clear => Stmt::Clear(self.parse_expr()?),
            B::Write => {
                let x = self.parse_expr()?;
                self.consume(&TokenKind::Comma)?;
                let y = self.parse_expr()?;
                self.consume(&TokenKind::Comma)?;
                let colour = self.parse_expr()?;
                Stmt::Write([x, y, colour])
            }
            B::WriteBox => {
                let x = self.parse_expr()?;
                self.consume(&TokenKind::Comma)?;
                let y = self.parse_expr()?;
                self.consume(&TokenKind::Comma)?;
                let w = self.parse_expr()?;
                self.consume(&TokenKind::Comma)?;
                let h = self.parse_expr()?;
                self.consume(&TokenKind::Comma)?;
                let colour = self.parse_expr()?;
                Stmt::WriteBox([x, y, w, h, colour])
            }
            B::Read | B::RandomInt | B::Width | B::Height => {
                self.error(format!("'{}' is an expression, not a statement", builtin));
                return None;
            }
        };

        self.consume(&TokenKind::Semicolon)?;
        Some(stmt)
    }

    /// Call with the callee name already consumed.
    pub(crate) fn parse_call(&mut self, name: smol_str::SmolStr, line: u32) -> Option<Expr> {
        let id = self.next_id();
        self.consume(&TokenKind::LeftParen)?;

        let mut args = Vec::new();
        if !self.stream().check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.stream().match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RightParen)?;

        Some(Expr {
            id,
            kind: ExprKind::Call(name, args),
            line,
        })
    }
}
