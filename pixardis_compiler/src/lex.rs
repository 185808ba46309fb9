//! Lexical analysis (tokenizer)
use std::str::CharIndices;

use itertools::{multipeek, MultiPeek};

use crate::{
    diag::{DiagnosticKind, Diagnostics},
    tokens::{classify_ident, Builtin, Span, Token, TokenKind},
};

/// Scan the whole source up front. Lexical errors go into the sink and
/// scanning resumes at the next whitespace, so one pass reports every
/// bad literal and stray character. The returned stream always ends
/// with a single end-of-file token.
pub fn tokenize(source: &str, diag: &mut Diagnostics) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        match lexer.next_token(diag) {
            Some(token) => {
                let at_end = token.kind == TokenKind::Eof;
                tokens.push(token);
                if at_end {
                    break;
                }
            }
            // An error was reported. The cursor has already been moved
            // to the synchronization point, keep scanning.
            None => continue,
        }
    }

    tokens
}

/// Lexical analyzer.
pub struct Lexer<'a> {
    source: SourceText<'a>,
    token_start: SourcePos,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: SourcePos::default(),
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    fn next_token(&mut self, diag: &mut Diagnostics) -> Option<Token> {
        use TokenKind as T;

        self.skip_trivia(diag);
        self.start_token();

        let next_char = match self.source.next_char() {
            Some((_, c)) => c,
            None => return Some(self.make_token(T::Eof)),
        };

        match next_char {
            '{' => Some(self.make_token(T::LeftBrace)),
            '}' => Some(self.make_token(T::RightBrace)),
            '(' => Some(self.make_token(T::LeftParen)),
            ')' => Some(self.make_token(T::RightParen)),
            '[' => Some(self.make_token(T::LeftBracket)),
            ']' => Some(self.make_token(T::RightBracket)),
            ',' => Some(self.make_token(T::Comma)),
            ';' => Some(self.make_token(T::Semicolon)),
            ':' => Some(self.make_token(T::Colon)),
            '+' => Some(self.make_token(T::Plus)),
            '*' => Some(self.make_token(T::Star)),
            '/' => Some(self.make_token(T::Slash)),
            '%' => Some(self.make_token(T::Percent)),
            // Two-character operators are matched greedily.
            '-' => match self.source.peek_char() {
                Some('>') => {
                    self.source.next_char();
                    Some(self.make_token(T::Arrow))
                }
                _ => Some(self.make_token(T::Minus)),
            },
            '=' => match self.source.peek_char() {
                Some('=') => {
                    self.source.next_char();
                    Some(self.make_token(T::EqEq))
                }
                _ => Some(self.make_token(T::Assign)),
            },
            '<' => match self.source.peek_char() {
                Some('=') => {
                    self.source.next_char();
                    Some(self.make_token(T::LessEq))
                }
                _ => Some(self.make_token(T::Less)),
            },
            '>' => match self.source.peek_char() {
                Some('=') => {
                    self.source.next_char();
                    Some(self.make_token(T::GreaterEq))
                }
                _ => Some(self.make_token(T::Greater)),
            },
            '!' => match self.source.peek_char() {
                Some('=') => {
                    self.source.next_char();
                    Some(self.make_token(T::NotEq))
                }
                _ => {
                    self.error_here(diag, "unknown character '!'");
                    None
                }
            },
            '#' => self.consume_colour(diag),
            '0'..='9' => self.consume_number(diag, false),
            '.' => match self.source.peek_char() {
                Some('0'..='9') => self.consume_number(diag, true),
                _ => {
                    self.error_here(diag, "unknown character '.'");
                    None
                }
            },
            '_' | 'a'..='z' | 'A'..='Z' => self.consume_ident(diag),
            c => {
                self.error_here(diag, format!("unknown character '{}'", c));
                self.sync_to_whitespace();
                None
            }
        }
    }

    /// Erase whitespace, line comments and (non-nesting) block comments.
    fn skip_trivia(&mut self, diag: &mut Diagnostics) {
        loop {
            match self.source.peek_char() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.source.next_char();
                }
                Some('/') => match self.source.peek_char2() {
                    Some('/') => {
                        // Line comment runs to the end of the line.
                        while !matches!(self.source.peek_char(), Some('\n') | None) {
                            self.source.next_char();
                        }
                    }
                    Some('*') => {
                        self.start_token();
                        self.source.next_char(); // /
                        self.source.next_char(); // *
                        if !self.skip_block_comment() {
                            self.error_here(diag, "unterminated block comment");
                            return;
                        }
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    /// Consume up to and including `*/`. Returns false when the source
    /// ends first.
    fn skip_block_comment(&mut self) -> bool {
        while let Some((_, c)) = self.source.next_char() {
            if c == '*' && self.source.peek_char() == Some('/') {
                self.source.next_char();
                return true;
            }
        }
        false
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.position();
    }

    fn make_token(&mut self, kind: TokenKind) -> Token {
        let span = Span {
            start: self.token_start.position,
            end: self.source.position().position,
            line: self.token_start.line,
            column: self.token_start.column,
        };

        Token { kind, span }
    }

    fn token_fragment(&self) -> &'a str {
        &self.source.original[self.token_start.position..self.source.position().position]
    }

    fn error_here(&mut self, diag: &mut Diagnostics, message: impl ToString) {
        diag.report(DiagnosticKind::Lexical, self.token_start.line, message);
    }

    /// Move the cursor past the current run of non-whitespace so a bad
    /// literal is reported once rather than re-lexed piecemeal.
    fn sync_to_whitespace(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c.is_whitespace() {
                break;
            }
            self.source.next_char();
        }
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    fn consume_ident(&mut self, diag: &mut Diagnostics) -> Option<Token> {
        while let Some('_' | 'a'..='z' | 'A'..='Z' | '0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        let fragment = self.token_fragment();
        if fragment.starts_with("__") {
            // Built-ins lex as identifiers but form their own token kind.
            match Builtin::parse(fragment) {
                Some(builtin) => Some(self.make_token(TokenKind::Builtin(builtin))),
                None => {
                    self.error_here(diag, format!("unknown built-in '{}'", fragment));
                    None
                }
            }
        } else {
            let kind = classify_ident(fragment);
            Some(self.make_token(kind))
        }
    }

    /// Numeric literal: `\d+` is an int, `\d*\.\d+([eE][+-]?\d+)?` a
    /// float. `leading_dot` marks the `.5` form, whose dot was already
    /// consumed by the dispatcher.
    fn consume_number(&mut self, diag: &mut Diagnostics, leading_dot: bool) -> Option<Token> {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        // A decimal point is only part of the literal when a digit
        // follows it; `1.` lexes as an int and a stray dot.
        let mut is_float = leading_dot;
        if !leading_dot && self.source.peek_char() == Some('.') {
            if let Some('0'..='9') = self.source.peek_char2() {
                is_float = true;
                self.source.next_char(); // .
                while let Some('0'..='9') = self.source.peek_char() {
                    self.source.next_char();
                }
            }
        }

        // Optional exponent, floats only.
        if is_float && matches!(self.source.peek_char(), Some('e') | Some('E')) {
            self.source.next_char();
            if let Some('+') | Some('-') = self.source.peek_char() {
                self.source.next_char();
            }
            match self.source.peek_char() {
                Some('0'..='9') => {
                    while let Some('0'..='9') = self.source.peek_char() {
                        self.source.next_char();
                    }
                }
                _ => {
                    self.error_here(diag, "malformed numeric literal: missing exponent digits");
                    self.sync_to_whitespace();
                    return None;
                }
            }
        }

        let fragment = self.token_fragment();
        if is_float {
            match fragment.parse::<f64>() {
                Ok(value) if value.is_finite() => Some(self.make_token(TokenKind::Float(value))),
                Ok(_) => {
                    self.error_here(
                        diag,
                        format!("malformed numeric literal '{}': out of range for float", fragment),
                    );
                    self.sync_to_whitespace();
                    None
                }
                Err(_) => {
                    self.error_here(diag, format!("malformed numeric literal '{}'", fragment));
                    self.sync_to_whitespace();
                    None
                }
            }
        } else {
            match fragment.parse::<i32>() {
                Ok(value) => Some(self.make_token(TokenKind::Int(value))),
                Err(_) => {
                    self.error_here(
                        diag,
                        format!("malformed numeric literal '{}': out of range for int", fragment),
                    );
                    self.sync_to_whitespace();
                    None
                }
            }
        }
    }

    /// Colour literal: `#` followed by exactly six hex digits.
    fn consume_colour(&mut self, diag: &mut Diagnostics) -> Option<Token> {
        while let Some('0'..='9' | 'a'..='f' | 'A'..='F') = self.source.peek_char() {
            self.source.next_char();
        }

        let fragment = self.token_fragment();
        let digits = &fragment[1..];
        if digits.len() != 6 {
            self.error_here(
                diag,
                format!("malformed colour literal '{}': expected six hex digits", fragment),
            );
            self.sync_to_whitespace();
            return None;
        }

        match u32::from_str_radix(digits, 16) {
            Ok(value) => Some(self.make_token(TokenKind::Colour(value))),
            Err(_) => {
                self.error_here(diag, format!("malformed colour literal '{}'", fragment));
                self.sync_to_whitespace();
                None
            }
        }
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// The `MultiPeek` wrapper allows two characters of lookahead by
/// consuming the iterator internally and buffering the result. The peek
/// cursor resets whenever a character is consumed.
struct SourceText<'a> {
    /// Keep reference to the source so tokens can slice fragments from it.
    original: &'a str,
    chars: MultiPeek<CharIndices<'a>>,
    /// Byte position of the next unconsumed character.
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            chars: multipeek(source.char_indices()),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn position(&self) -> SourcePos {
        SourcePos {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Advance the cursor and return the consumed position and character.
    fn next_char(&mut self) -> Option<(usize, char)> {
        match self.chars.next() {
            Some((index, c)) => {
                self.position = index + c.len_utf8();
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
                Some((index, c))
            }
            None => {
                self.position = self.original.len();
                None
            }
        }
    }

    /// Peek the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.reset_peek();
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Peek one character past the next one.
    fn peek_char2(&mut self) -> Option<char> {
        self.chars.reset_peek();
        self.chars.peek();
        self.chars.peek().map(|(_, c)| *c)
    }
}

#[derive(Debug, Clone, Copy)]
struct SourcePos {
    position: usize,
    line: u32,
    column: u32,
}

impl Default for SourcePos {
    fn default() -> Self {
        SourcePos {
            position: 0,
            line: 1,
            column: 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tokens::Keyword;

    fn lex_ok(source: &str) -> Vec<TokenKind> {
        let mut diag = Diagnostics::new();
        let tokens = tokenize(source, &mut diag);
        assert!(diag.is_empty(), "unexpected errors: {:?}", diag);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_literals() {
        use TokenKind as T;
        let kinds = lex_ok("12 2.5 .5 1.0e3 #FF00aa true");
        assert_eq!(
            kinds,
            vec![
                T::Int(12),
                T::Float(2.5),
                T::Float(0.5),
                T::Float(1000.0),
                T::Colour(0xFF00AA),
                T::Bool(true),
                T::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_operators_greedy() {
        use TokenKind as T;
        let kinds = lex_ok("<= < == = != -> - >= >");
        assert_eq!(
            kinds,
            vec![
                T::LessEq,
                T::Less,
                T::EqEq,
                T::Assign,
                T::NotEq,
                T::Arrow,
                T::Minus,
                T::GreaterEq,
                T::Greater,
                T::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_comments() {
        use TokenKind as T;
        let kinds = lex_ok("let // trailing\n/* block\ncomment */ x");
        assert_eq!(
            kinds,
            vec![
                T::Keyword(Keyword::Let),
                T::Ident("x".into()),
                T::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_line_and_column() {
        let mut diag = Diagnostics::new();
        let tokens = tokenize("let\n  x", &mut diag);
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.column, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 3);
    }

    #[test]
    fn test_lex_unterminated_block_comment() {
        let mut diag = Diagnostics::new();
        let _ = tokenize("let /* no end", &mut diag);
        assert_eq!(diag.len(), 1);
        let rendered = diag.render("let /* no end");
        assert!(rendered[0].contains("Lexical Error: unterminated block comment"));
    }

    #[test]
    fn test_lex_bad_colour() {
        let mut diag = Diagnostics::new();
        let tokens = tokenize("#12 #1234567", &mut diag);
        assert_eq!(diag.len(), 2);
        // Only the EOF token survives.
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_lex_multiple_errors() {
        let mut diag = Diagnostics::new();
        let _ = tokenize("? let ` x", &mut diag);
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_lex_unknown_builtin() {
        let mut diag = Diagnostics::new();
        let _ = tokenize("__write_line 0,0,0,0,#000000;", &mut diag);
        assert_eq!(diag.len(), 1);
    }
}
