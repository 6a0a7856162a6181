//! MiniJava compiler backend.
//!
//! Takes a semantically checked AST plus symbol facts and produces textual
//! assembly for a stack-based virtual machine, in three strict stages:
//! lowering to flat three-address IR, graph-coloring register allocation,
//! and type-driven instruction selection with peephole fusion. A failure in
//! any stage aborts the unit; no partial output is ever produced.

pub mod codegen;
pub mod error;
pub mod ir;
pub mod lower;
pub mod regalloc;

pub use error::{CompileError, CompileResult, Stage};
pub use ir::ClassUnit;
pub use lower::Lowerer;
pub use regalloc::{Allocation, RegisterBudget};

use mjc_ast::{Program, SymbolTable};

/// Compiles one program to assembly text under the given register budget.
pub fn compile(
    program: &Program,
    table: &SymbolTable,
    budget: RegisterBudget,
) -> CompileResult<String> {
    let unit = Lowerer::new(table).lower_program(program)?;
    codegen::emit_class(&unit, budget)
}
