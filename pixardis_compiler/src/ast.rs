//! Abstract syntax tree.
//!
//! The tree is an owned enum structure. Nodes the later passes need to
//! annotate carry a [`NodeId`] assigned by the parser in traversal order;
//! semantic analysis writes its findings (expression types, resolved
//! variable sites, frame sizes) into side tables keyed by those ids
//! instead of mutating the tree.
use std::fmt;

use smol_str::SmolStr;

/// Index into the annotation side tables.
pub type NodeId = u32;

/// The primitive value types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Bool,
    Colour,
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

impl fmt::Display for Type {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Int    => write!(f, "int"),
            Type::Float  => write!(f, "float"),
            Type::Bool   => write!(f, "bool"),
            Type::Colour => write!(f, "colour"),
        }
    }
}

/// Declared shape of a variable: a scalar, or an array of a primitive
/// with a compile-time fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Scalar(Type),
    Array(Type, usize),
}

impl TypeSpec {
    /// Number of frame slots the variable occupies.
    pub fn slot_count(self) -> usize {
        match self {
            TypeSpec::Scalar(_) => 1,
            TypeSpec::Array(_, size) => size,
        }
    }

    pub fn element(self) -> Type {
        match self {
            TypeSpec::Scalar(ty) | TypeSpec::Array(ty, _) => ty,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeSpec::Scalar(ty) => write!(f, "{}", ty),
            TypeSpec::Array(ty, size) => write!(f, "{}[{}]", ty, size),
        }
    }
}

/// Root of the tree. The top-level statements form the implicit entry
/// sequence; function declarations may be interleaved among them.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Block(Block),
    /// An expression evaluated for its effect; the result is dropped.
    Expr(Expr),
    Fun(FunDecl),

    // ------------------------------------------------------------------------
    // Built-in statements
    Print(Expr),
    Delay(Expr),
    Clear(Expr),
    /// `__write x, y, colour`
    Write([Expr; 3]),
    /// `__write_box x, y, w, h, colour`
    WriteBox([Expr; 5]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub id: NodeId,
    pub name: SmolStr,
    pub ty: TypeSpec,
    pub init: LetInit,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LetInit {
    Scalar(Expr),
    Array(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub id: NodeId,
    pub name: SmolStr,
    /// Present for indexed assignment `name[expr] = value`.
    pub index: Option<Expr>,
    pub value: Expr,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub line: u32,
}

/// `for (init; cond; step) { .. }`. Every header part is optional; an
/// omitted condition loops forever.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub step: Option<Box<Stmt>>,
    pub body: Block,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Expr,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunDecl {
    pub id: NodeId,
    pub name: SmolStr,
    pub params: Vec<Param>,
    pub ret: Type,
    pub body: Block,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: SmolStr,
    pub ty: Type,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i32),
    Float(f64),
    Bool(bool),
    /// Packed 24-bit RGB literal.
    Colour(u32),
    Var(SmolStr),
    /// `name[index]`
    Index(SmolStr, Box<Expr>),
    Call(SmolStr, Vec<Expr>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// `expr as type`
    Cast(Box<Expr>, Type),

    // ------------------------------------------------------------------------
    // Built-in expressions
    Width,
    Height,
    RandomInt(Box<Expr>),
    ReadPixel(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum BinOp {
    Add, Sub, Mul, Div, Mod,
    Eq, Ne, Lt, Le, Gt, Ge,
    And, Or,
}

impl BinOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BinOp as B;
        match self {
            B::Add => write!(f, "+"),
            B::Sub => write!(f, "-"),
            B::Mul => write!(f, "*"),
            B::Div => write!(f, "/"),
            B::Mod => write!(f, "%"),
            B::Eq  => write!(f, "=="),
            B::Ne  => write!(f, "!="),
            B::Lt  => write!(f, "<"),
            B::Le  => write!(f, "<="),
            B::Gt  => write!(f, ">"),
            B::Ge  => write!(f, ">="),
            B::And => write!(f, "and"),
            B::Or  => write!(f, "or"),
        }
    }
}
