//! Top-level declarations: program, class, method.

use crate::span::Span;
use crate::stmt::Stmt;
use crate::ty::Type;

/// A complete compilation unit: imports plus a single class.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub imports: Vec<ImportDecl>,
    pub class: ClassDecl,
}

/// import a.b.C;
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Qualified name segments; the last segment is the name callers use.
    pub path: Vec<String>,
    pub span: Span,
}

impl ImportDecl {
    pub fn new(path: Vec<String>, span: Span) -> Self {
        Self { path, span }
    }

    /// The simple name the import binds.
    pub fn base_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

/// Class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub super_class: Option<String>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// A typed name binding: field, parameter, or local declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            span,
        }
    }
}

/// Method declaration with its checked body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub params: Vec<VarDecl>,
    pub return_ty: Type,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
}
