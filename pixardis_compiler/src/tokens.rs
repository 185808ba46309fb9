//! Tokens
use std::fmt;

use smol_str::SmolStr;

use crate::ast::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Chunk of source code, encoded as byte positions plus the
/// line and column the token starts on. Lines and columns are
/// 1-based, matching what the diagnostics report to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start position of bytes in source.
    pub start: usize,
    /// End position of bytes in source, exclusive.
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

#[derive(Debug, Clone, PartialEq)]
#[rustfmt::skip]
pub enum TokenKind {
    // ------------------------------------------------------------------------
    // Literals and names
    Ident(SmolStr),
    Int(i32),
    Float(f64),
    /// Packed 24-bit RGB, parsed from `#RRGGBB`.
    Colour(u32),
    Bool(bool),

    /// Reserved words that head statements and expressions.
    Keyword(Keyword),
    /// The primitive type names.
    TypeName(Type),
    /// `__` prefixed built-in.
    Builtin(Builtin),

    // ------------------------------------------------------------------------
    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Semicolon,    // ;
    Colon,        // :
    Arrow,        // ->

    // ------------------------------------------------------------------------
    // Operators
    Assign,       // =
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    EqEq,         // ==
    NotEq,        // !=
    Less,         // <
    LessEq,       // <=
    Greater,      // >
    GreaterEq,    // >=
    And,          // and
    Or,           // or
    Not,          // not

    /// End-of-file
    Eof,
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;
        match self {
            T::Ident(name)    => write!(f, "{}", name),
            T::Int(value)     => write!(f, "{}", value),
            T::Float(value)   => write!(f, "{:?}", value),
            T::Colour(value)  => write!(f, "#{:06X}", value),
            T::Bool(value)    => write!(f, "{}", value),
            T::Keyword(kw)    => write!(f, "{}", kw),
            T::TypeName(ty)   => write!(f, "{}", ty),
            T::Builtin(b)     => write!(f, "{}", b),
            T::LeftBrace      => write!(f, "{{"),
            T::RightBrace     => write!(f, "}}"),
            T::LeftParen      => write!(f, "("),
            T::RightParen     => write!(f, ")"),
            T::LeftBracket    => write!(f, "["),
            T::RightBracket   => write!(f, "]"),
            T::Comma          => write!(f, ","),
            T::Semicolon      => write!(f, ";"),
            T::Colon          => write!(f, ":"),
            T::Arrow          => write!(f, "->"),
            T::Assign         => write!(f, "="),
            T::Plus           => write!(f, "+"),
            T::Minus          => write!(f, "-"),
            T::Star           => write!(f, "*"),
            T::Slash          => write!(f, "/"),
            T::Percent        => write!(f, "%"),
            T::EqEq           => write!(f, "=="),
            T::NotEq          => write!(f, "!="),
            T::Less           => write!(f, "<"),
            T::LessEq         => write!(f, "<="),
            T::Greater        => write!(f, ">"),
            T::GreaterEq      => write!(f, ">="),
            T::And            => write!(f, "and"),
            T::Or             => write!(f, "or"),
            T::Not            => write!(f, "not"),
            T::Eof            => write!(f, "end-of-file"),
        }
    }
}

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Keyword {
    Fun,     // fun
    Let,     // let
    If,      // if
    Else,    // else
    While,   // while
    For,     // for
    Return,  // return
    As,      // as
}

impl fmt::Display for Keyword {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Keyword as K;
        match self {
            K::Fun    => write!(f, "fun"),
            K::Let    => write!(f, "let"),
            K::If     => write!(f, "if"),
            K::Else   => write!(f, "else"),
            K::While  => write!(f, "while"),
            K::For    => write!(f, "for"),
            K::Return => write!(f, "return"),
            K::As     => write!(f, "as"),
        }
    }
}

/// Classify an identifier fragment as either a reserved word,
/// a type name, a boolean literal, one of the word operators,
/// or a plain user identifier.
#[rustfmt::skip]
pub fn classify_ident(fragment: &str) -> TokenKind {
    use Keyword as K;
    use TokenKind as T;
    match fragment {
        "fun"    => T::Keyword(K::Fun),
        "let"    => T::Keyword(K::Let),
        "if"     => T::Keyword(K::If),
        "else"   => T::Keyword(K::Else),
        "while"  => T::Keyword(K::While),
        "for"    => T::Keyword(K::For),
        "return" => T::Keyword(K::Return),
        "as"     => T::Keyword(K::As),
        "true"   => T::Bool(true),
        "false"  => T::Bool(false),
        "and"    => T::And,
        "or"     => T::Or,
        "not"    => T::Not,
        "int"    => T::TypeName(Type::Int),
        "float"  => T::TypeName(Type::Float),
        "bool"   => T::TypeName(Type::Bool),
        "colour" => T::TypeName(Type::Colour),
        _        => T::Ident(SmolStr::from(fragment)),
    }
}

/// The graphics, RNG, print and delay primitives. They lex like
/// identifiers but the `__` prefix puts them in their own token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Builtin {
    Clear,      // __clear
    Write,      // __write, alias __pixel
    WriteBox,   // __write_box
    Print,      // __print
    Delay,      // __delay
    Read,       // __read
    RandomInt,  // __random_int
    Width,      // __width
    Height,     // __height
}

impl Builtin {
    #[rustfmt::skip]
    pub fn parse(fragment: &str) -> Option<Self> {
        match fragment {
            "__clear"               => Some(Self::Clear),
            "__write" | "__pixel"   => Some(Self::Write),
            "__write_box"           => Some(Self::WriteBox),
            "__print"               => Some(Self::Print),
            "__delay"               => Some(Self::Delay),
            "__read"                => Some(Self::Read),
            "__random_int"          => Some(Self::RandomInt),
            "__width"               => Some(Self::Width),
            "__height"              => Some(Self::Height),
            _                       => None,
        }
    }
}

impl fmt::Display for Builtin {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Builtin as B;
        match self {
            B::Clear     => write!(f, "__clear"),
            B::Write     => write!(f, "__write"),
            B::WriteBox  => write!(f, "__write_box"),
            B::Print     => write!(f, "__print"),
            B::Delay     => write!(f, "__delay"),
            B::Read      => write!(f, "__read"),
            B::RandomInt => write!(f, "__random_int"),
            B::Width     => write!(f, "__width"),
            B::Height    => write!(f, "__height"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_reserved() {
        assert_eq!(classify_ident("while"), TokenKind::Keyword(Keyword::While));
        assert_eq!(classify_ident("colour"), TokenKind::TypeName(Type::Colour));
        assert_eq!(classify_ident("true"), TokenKind::Bool(true));
        assert_eq!(classify_ident("and"), TokenKind::And);
        assert_eq!(
            classify_ident("whiles"),
            TokenKind::Ident(SmolStr::from("whiles"))
        );
    }

    #[test]
    fn test_builtin_alias() {
        assert_eq!(Builtin::parse("__pixel"), Some(Builtin::Write));
        assert_eq!(Builtin::parse("__write"), Some(Builtin::Write));
        assert_eq!(Builtin::parse("__line"), None);
    }
}
