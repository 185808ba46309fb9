//! Expression parsing.
//!
//! Precedence climbing, one method per level, low to high:
//! `or`, `and`, equality, relational, additive, multiplicative,
//! unary, cast, primary.
use super::Parser;
use crate::{
    ast::{BinOp, Expr, ExprKind, UnOp},
    tokens::{Builtin, Keyword, TokenKind},
};

impl<'a, 'd> Parser<'a, 'd> {
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_and()?;
        while self.stream().check(&TokenKind::Or) {
            let line = self.line();
            self.stream().next_token();
            let id = self.next_id();
            let rhs = self.parse_and()?;
            lhs = Expr {
                id,
                kind: ExprKind::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs)),
                line,
            };
        }
        Some(lhs)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.stream().check(&TokenKind::And) {
            let line = self.line();
            self.stream().next_token();
            let id = self.next_id();
            let rhs = self.parse_equality()?;
            lhs = Expr {
                id,
                kind: ExprKind::Binary(BinOp::And, Box::new(lhs), Box::new(rhs)),
                line,
            };
        }
        Some(lhs)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.stream().peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            let line = self.line();
            self.stream().next_token();
            let id = self.next_id();
            let rhs = self.parse_relational()?;
            lhs = Expr {
                id,
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                line,
            };
        }
        Some(lhs)
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.stream().peek_kind() {
                TokenKind::Less => BinOp::Lt,
                TokenKind::LessEq => BinOp::Le,
                TokenKind::Greater => BinOp::Gt,
                TokenKind::GreaterEq => BinOp::Ge,
                _ => break,
            };
            let line = self.line();
            self.stream().next_token();
            let id = self.next_id();
            let rhs = self.parse_additive()?;
            lhs = Expr {
                id,
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                line,
            };
        }
        Some(lhs)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.stream().peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let line = self.line();
            self.stream().next_token();
            let id = self.next_id();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr {
                id,
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                line,
            };
        }
        Some(lhs)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.stream().peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let line = self.line();
            self.stream().next_token();
            let id = self.next_id();
            let rhs = self.parse_unary()?;
            lhs = Expr {
                id,
                kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
                line,
            };
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.stream().peek_kind() {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Not => UnOp::Not,
            _ => return self.parse_cast(),
        };
        let line = self.line();
        self.stream().next_token();
        let id = self.next_id();
        let operand = self.parse_unary()?;

        Some(Expr {
            id,
            kind: ExprKind::Unary(op, Box::new(operand)),
            line,
        })
    }

    /// `as` binds tighter than unary: `-x as float` negates the cast.
    fn parse_cast(&mut self) -> Option<Expr> {
        let mut operand = self.parse_primary()?;
        while self.stream().check(&TokenKind::Keyword(Keyword::As)) {
            let line = self.line();
            self.stream().next_token();
            let id = self.next_id();
            let target = self.consume_type()?;
            operand = Expr {
                id,
                kind: ExprKind::Cast(Box::new(operand), target),
                line,
            };
        }
        Some(operand)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        use TokenKind as T;

        let line = self.line();
        match self.stream().peek_kind().clone() {
            T::Int(value) => {
                let id = self.next_id();
                self.stream().next_token();
                Some(Expr {
                    id,
                    kind: ExprKind::Int(value),
                    line,
                })
            }
            T::Float(value) => {
                let id = self.next_id();
                self.stream().next_token();
                Some(Expr {
                    id,
                    kind: ExprKind::Float(value),
                    line,
                })
            }
            T::Colour(value) => {
                let id = self.next_id();
                self.stream().next_token();
                Some(Expr {
                    id,
                    kind: ExprKind::Colour(value),
                    line,
                })
            }
            T::Bool(value) => {
                let id = self.next_id();
                self.stream().next_token();
                Some(Expr {
                    id,
                    kind: ExprKind::Bool(value),
                    line,
                })
            }
            T::LeftParen => {
                self.stream().next_token();
                let inner = self.parse_expr()?;
                self.consume(&T::RightParen)?;
                Some(inner)
            }
            T::Ident(name) => {
                self.stream().next_token();
                match self.stream().peek_kind() {
                    T::LeftParen => self.parse_call(name, line),
                    T::LeftBracket => {
                        let id = self.next_id();
                        self.stream().next_token();
                        let index = self.parse_expr()?;
                        self.consume(&T::RightBracket)?;
                        Some(Expr {
                            id,
                            kind: ExprKind::Index(name, Box::new(index)),
                            line,
                        })
                    }
                    _ => {
                        let id = self.next_id();
                        Some(Expr {
                            id,
                            kind: ExprKind::Var(name),
                            line,
                        })
                    }
                }
            }
            T::Builtin(builtin) => self.parse_builtin_expr(builtin, line),
            found => {
                self.error(format!("expected expression, found '{}'", found));
                None
            }
        }
    }

    fn parse_builtin_expr(&mut self, builtin: Builtin, line: u32) -> Option<Expr> {
        use Builtin as B;

        match builtin {
            B::Width => {
                let id = self.next_id();
                self.stream().next_token();
                Some(Expr {
                    id,
                    kind: ExprKind::Width,
                    line,
                })
            }
            B::Height => {
                let id = self.next_id();
                self.stream().next_token();
                Some(Expr {
                    id,
                    kind: ExprKind::Height,
                    line,
                })
            }
            B::RandomInt => {
                let id = self.next_id();
                self.stream().next_token();
                let bound = self.parse_expr()?;
                Some(Expr {
                    id,
                    kind: ExprKind::RandomInt(Box::new(bound)),
                    line,
                })
            }
            B::Read => {
                let id = self.next_id();
                self.stream().next_token();
                let x = self.parse_expr()?;
                self.consume(&TokenKind::Comma)?;
                let y = self.parse_expr()?;
                Some(Expr {
                    id,
                    kind: ExprKind::ReadPixel(Box::new(x), Box::new(y)),
                    line,
                })
            }
            B::Clear | B::Write | B::WriteBox | B::Print | B::Delay => {
                self.error(format!("'{}' is a statement, not an expression", builtin));
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        ast::{BinOp, ExprKind, Program, Stmt},
        diag::Diagnostics,
        lex::tokenize,
        parsing,
        token_stream::TokenStream,
    };

    fn parse_ok(source: &str) -> Program {
        let mut diag = Diagnostics::new();
        let tokens = tokenize(source, &mut diag);
        let stream = TokenStream::new(tokens, source);
        let (program, _) = parsing::parse(stream, &mut diag);
        assert!(diag.is_empty(), "unexpected errors: {:?}", diag);
        program
    }

    fn only_let_value(program: &Program) -> &ExprKind {
        match &program.stmts[0] {
            Stmt::Let(stmt) => match &stmt.init {
                crate::ast::LetInit::Scalar(expr) => &expr.kind,
                other => panic!("unexpected init: {:?}", other),
            },
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let program = parse_ok("let x:int = 1 + 2 * 3;");
        match only_let_value(&program) {
            ExprKind::Binary(BinOp::Add, lhs, rhs) => {
                assert!(matches!(lhs.kind, ExprKind::Int(1)));
                assert!(matches!(rhs.kind, ExprKind::Binary(BinOp::Mul, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_precedence_relational_over_and() {
        let program = parse_ok("let b:bool = 1 < 2 and 3 < 4;");
        match only_let_value(&program) {
            ExprKind::Binary(BinOp::And, lhs, rhs) => {
                assert!(matches!(lhs.kind, ExprKind::Binary(BinOp::Lt, _, _)));
                assert!(matches!(rhs.kind, ExprKind::Binary(BinOp::Lt, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_cast_binds_tighter_than_unary() {
        let program = parse_ok("let y:float = -1 as float;");
        match only_let_value(&program) {
            ExprKind::Unary(crate::ast::UnOp::Neg, operand) => {
                assert!(matches!(operand.kind, ExprKind::Cast(_, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        let program = parse_ok("let x:int = 1 - 2 - 3;");
        match only_let_value(&program) {
            ExprKind::Binary(BinOp::Sub, lhs, rhs) => {
                assert!(matches!(lhs.kind, ExprKind::Binary(BinOp::Sub, _, _)));
                assert!(matches!(rhs.kind, ExprKind::Int(3)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_builtin_expressions() {
        let program = parse_ok("let c:colour = __read __width - 1, __height - 1;");
        match only_let_value(&program) {
            ExprKind::ReadPixel(x, y) => {
                assert!(matches!(x.kind, ExprKind::Binary(BinOp::Sub, _, _)));
                assert!(matches!(y.kind, ExprKind::Binary(BinOp::Sub, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }
}
