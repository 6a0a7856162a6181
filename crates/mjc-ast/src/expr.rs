//! Expression AST nodes.
//!
//! The expression grammar is a closed enum: the backend matches on it
//! exhaustively, and anything the backend cannot translate surfaces as an
//! explicit unsupported-construct error rather than a silent default.

use std::fmt;

use crate::span::Span;

/// Expression (produces a value).
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal: 42
    Int(i32),

    /// Boolean literal: true, false
    Bool(bool),

    /// Variable reference (parameter, local, or field)
    Var(String),

    /// The implicit receiver
    This,

    /// Binary operation: a + b, a < b, a && b
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation: !a
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Array element read: a[i]
    ArrayAccess { array: Box<Expr>, index: Box<Expr> },

    /// Array length: a.length
    Length { array: Box<Expr> },

    /// Method call: recv.m(args)
    Call {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },

    /// Object creation: new C()
    NewObject { class: String },

    /// Array creation: new int[len]
    NewArray { len: Box<Expr> },

    /// Array literal: [1, 2, 3]
    ArrayLit { elements: Vec<Expr> },

    /// Parenthesized expression
    Paren(Box<Expr>),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,

    // Logical (short-circuit; never reach the IR as binary ops)
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Logical not (!)
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
        }
    }
}
