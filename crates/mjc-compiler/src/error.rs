//! Compilation errors.
//!
//! Two families: translation errors (unsupported or unresolved shapes met
//! while lowering, fatal for the unit) and allocation capacity errors (a
//! register budget below the interference graph's chromatic number). Every error knows which stage produced it and, where one exists,
//! the originating source location, so callers get structured reports
//! instead of bare strings.

use mjc_ast::Span;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// Pipeline stage an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lowering,
    RegAlloc,
    Codegen,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lowering => write!(f, "lowering"),
            Stage::RegAlloc => write!(f, "regalloc"),
            Stage::Codegen => write!(f, "codegen"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unsupported construct: {message}")]
    Unsupported { message: String, span: Span },

    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("unknown method: {name}")]
    UnknownMethod { name: String, span: Span },

    #[error("not enough registers: need at least {needed}")]
    NotEnoughRegisters { needed: u32, method: String },

    #[error("no slot assigned to variable {name} in method {method}")]
    UnassignedVariable { name: String, method: String },

    #[error("undefined label: {label} in method {method}")]
    UndefinedLabel { label: String, method: String },

    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl CompileError {
    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        CompileError::Unsupported {
            message: message.into(),
            span,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
        }
    }

    /// Stage the error originated in. Unsupported constructs are always
    /// caught while lowering; emission-side breakage surfaces as one of
    /// the codegen variants.
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Unsupported { .. }
            | CompileError::UndefinedVariable { .. }
            | CompileError::UnknownMethod { .. } => Stage::Lowering,
            CompileError::NotEnoughRegisters { .. } => Stage::RegAlloc,
            CompileError::UnassignedVariable { .. } | CompileError::UndefinedLabel { .. } => {
                Stage::Codegen
            }
            CompileError::Internal { .. } => Stage::Codegen,
        }
    }

    /// Source location, where one exists.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Unsupported { span, .. }
            | CompileError::UndefinedVariable { span, .. }
            | CompileError::UnknownMethod { span, .. } => {
                (!span.is_synthetic()).then_some(*span)
            }
            _ => None,
        }
    }

    /// Whether this is an allocation capacity failure, as opposed to a
    /// translation failure.
    pub fn is_capacity(&self) -> bool {
        matches!(self, CompileError::NotEnoughRegisters { .. })
    }
}
