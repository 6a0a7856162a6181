//! Statement AST nodes.

use crate::expr::Expr;
use crate::span::Span;

/// Statement (produces no value).
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Brace-delimited statement sequence
    Block(Vec<Stmt>),

    /// if (cond) then [else else]
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// while (cond) body
    While { cond: Expr, body: Box<Stmt> },

    /// target = value (target is a parameter, local, or field)
    Assign { target: String, value: Expr },

    /// array[index] = value
    ArrayAssign {
        array: String,
        index: Expr,
        value: Expr,
    },

    /// Expression evaluated for its side effects (a call)
    Expr(Expr),

    /// return [value]
    Return { value: Option<Expr> },
}
