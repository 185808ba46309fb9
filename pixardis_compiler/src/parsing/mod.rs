//! Syntactic analysis.
//!
//! Recursive descent with precedence climbing for expressions. On a
//! syntax error the parser reports a diagnostic and skips ahead to the
//! next `;` or closing `}`, so several errors can be reported from a
//! single attempt.
mod expr;
mod stmts;

use smol_str::SmolStr;

use crate::{
    ast::{NodeId, Program, Type},
    diag::{DiagnosticKind, Diagnostics},
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};

/// Parse a scanned token stream into a syntax tree.
///
/// A tree is always produced; when diagnostics were reported it is
/// partial and only good for inspection, and compilation must not
/// proceed past it.
pub fn parse<'a>(
    stream: TokenStream<'a>,
    diag: &mut Diagnostics,
) -> (Program, u32) {
    let mut parser = Parser::new(stream, diag);
    let program = parser.parse_program();
    let node_count = parser.node_count();
    (program, node_count)
}

pub struct Parser<'a, 'd> {
    stream: TokenStream<'a>,
    diag: &'d mut Diagnostics,
    next_node: NodeId,
}

impl<'a, 'd> Parser<'a, 'd> {
    pub fn new(stream: TokenStream<'a>, diag: &'d mut Diagnostics) -> Self {
        Self {
            stream,
            diag,
            next_node: 0,
        }
    }

    /// Number of node ids handed out; sizes the annotation tables.
    pub fn node_count(&self) -> u32 {
        self.next_node
    }

    pub fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();

        while !self.stream.at_end() {
            match self.parse_statement(true) {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }

        Program { stmts }
    }

    // ------------------------------------------------------------------------
    // Shared machinery

    pub(crate) fn next_id(&mut self) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        id
    }

    pub(crate) fn line(&self) -> u32 {
        self.stream.line()
    }

    pub(crate) fn error(&mut self, message: impl ToString) {
        self.diag
            .report(DiagnosticKind::Syntax, self.stream.line(), message);
    }

    pub(crate) fn error_kind(&mut self, kind: DiagnosticKind, message: impl ToString) {
        self.diag.report(kind, self.stream.line(), message);
    }

    /// Consume a token of the expected kind or report a syntax error.
    pub(crate) fn consume(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.stream.check(kind) {
            Some(self.stream.next_token())
        } else {
            let found = self.stream.peek_kind().clone();
            self.error(format!("expected '{}', found '{}'", kind, found));
            None
        }
    }

    /// Consume an identifier and return its name.
    pub(crate) fn consume_ident(&mut self) -> Option<SmolStr> {
        match self.stream.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.stream.next_token();
                Some(name)
            }
            found => {
                let found = found.clone();
                self.error(format!("expected identifier, found '{}'", found));
                None
            }
        }
    }

    /// Consume a primitive type name.
    pub(crate) fn consume_type(&mut self) -> Option<Type> {
        match self.stream.peek_kind() {
            TokenKind::TypeName(ty) => {
                let ty = *ty;
                self.stream.next_token();
                Some(ty)
            }
            found => {
                let found = found.clone();
                self.error(format!("expected type, found '{}'", found));
                None
            }
        }
    }

    /// Skip to the next statement boundary: just past a `;`, or up to
    /// (not including) a closing `}`.
    pub(crate) fn synchronize(&mut self) {
        loop {
            match self.stream.peek_kind() {
                TokenKind::Semicolon => {
                    self.stream.next_token();
                    return;
                }
                TokenKind::RightBrace | TokenKind::Eof => return,
                _ => {
                    self.stream.next_token();
                }
            }
        }
    }

    pub(crate) fn stream(&mut self) -> &mut TokenStream<'a> {
        &mut self.stream
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize;

    fn parse_source(source: &str) -> (Program, Diagnostics) {
        let mut diag = Diagnostics::new();
        let tokens = tokenize(source, &mut diag);
        let stream = TokenStream::new(tokens, source);
        let (program, _) = parse(stream, &mut diag);
        (program, diag)
    }

    #[test]
    fn test_parse_recovers_at_semicolon() {
        let source = "let = 5;\nlet y:int = 2;\n__print y;";
        let (program, diag) = parse_source(source);
        assert!(!diag.is_empty());
        // The bad statement is dropped, the following two survive.
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn test_parse_error_names_line() {
        let source = "let x:int = 1;\nlet y int = 2;";
        let (_, diag) = parse_source(source);
        let rendered = diag.render(source);
        assert!(rendered[0].starts_with("In Line 2:"));
        assert!(rendered[0].contains("Syntax Error:"));
    }
}
