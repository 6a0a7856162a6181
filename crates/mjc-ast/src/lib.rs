//! Typed AST and symbol facts for the mjc backend.
//!
//! The frontend (lexer, parser, semantic analysis) lives elsewhere; this
//! crate defines the data the backend consumes: a semantically-checked,
//! typed AST plus the read-only symbol facts gathered during analysis.

pub mod decl;
pub mod expr;
pub mod span;
pub mod stmt;
pub mod symbols;
pub mod ty;

pub use decl::{ClassDecl, ImportDecl, MethodDecl, Program, VarDecl};
pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use span::Span;
pub use stmt::{Stmt, StmtKind};
pub use symbols::{MethodFacts, Symbol, SymbolTable};
pub use ty::{Type, TypeName};
