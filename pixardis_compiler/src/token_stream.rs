//! Peekable token stream.
use crate::tokens::{Span, Token, TokenKind};

/// Buffered stream of tokens over a fully scanned source.
///
/// The scanner guarantees the buffer ends with an end-of-file token,
/// which the stream will hand out forever rather than running off the
/// end. That keeps the parser's error recovery free of `Option`
/// plumbing.
pub struct TokenStream<'a> {
    tokens: Vec<Token>,
    cursor: usize,
    /// Keep reference to the source so the parser can slice
    /// fragments from it.
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));
        Self {
            tokens,
            cursor: 0,
            source,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.source
    }

    /// Current token without advancing the cursor.
    pub fn peek(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    pub fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Line of the current token; used to anchor diagnostics.
    pub fn line(&self) -> u32 {
        self.peek().span.line
    }

    pub fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Consume the current token regardless of type. The cursor never
    /// advances past the end-of-file token.
    pub fn next_token(&mut self) -> Token {
        let token = self.peek().clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    /// Consume the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Does not consume the token if the
    /// kinds do not match.
    pub fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// True when the current token matches, without consuming it.
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub fn span_fragment(&self, span: &Span) -> &'a str {
        span.fragment(self.source)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{diag::Diagnostics, lex::tokenize};

    #[test]
    fn test_stream_sticks_at_eof() {
        let source = "x";
        let mut diag = Diagnostics::new();
        let mut stream = TokenStream::new(tokenize(source, &mut diag), source);

        assert!(matches!(stream.next_token().kind, TokenKind::Ident(_)));
        assert!(matches!(stream.next_token().kind, TokenKind::Eof));
        // Repeated reads keep returning EOF.
        assert!(matches!(stream.next_token().kind, TokenKind::Eof));
        assert!(stream.at_end());
    }

    #[test]
    fn test_match_token() {
        let source = "; ;";
        let mut diag = Diagnostics::new();
        let mut stream = TokenStream::new(tokenize(source, &mut diag), source);

        assert!(stream.match_token(&TokenKind::Semicolon));
        assert!(!stream.match_token(&TokenKind::Comma));
        assert!(stream.match_token(&TokenKind::Semicolon));
        assert!(stream.at_end());
    }
}
