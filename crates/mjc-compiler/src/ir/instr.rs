//! IR instructions.
//!
//! Three-address code over typed operands. Instructions are created once
//! per method during lowering, read by the register allocator to build live
//! intervals, and read again by the emitter; no stage mutates them.

use mjc_ast::{BinaryOp, Type, UnaryOp};

use super::value::{Operand, Var};

/// Dispatch kind of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Static dispatch on an imported class.
    Static,
    /// Virtual dispatch on an object reference.
    Virtual,
    /// Constructor invocation.
    Special,
}

/// What a call dispatches on.
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    /// A class name (static calls).
    Class(String),
    /// An evaluated receiver (virtual and special calls).
    Object(Operand),
}

/// Condition of a conditional branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// Branch when the boolean operand is true.
    Bool(Operand),
    /// Branch when `left op right` holds; `op` is relational.
    Cmp {
        op: BinaryOp,
        left: Operand,
        right: Operand,
    },
}

/// Three-address instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// dest = value. A plain copy, or an indexed array store when `dest`
    /// is an array element.
    Assign { dest: Operand, value: Operand },

    /// dest = left op right (arithmetic or relational)
    BinaryOp {
        dest: Var,
        op: BinaryOp,
        left: Operand,
        right: Operand,
    },

    /// dest = op operand
    UnaryOp {
        dest: Var,
        op: UnaryOp,
        operand: Operand,
    },

    /// [dest =] target.method(args)
    Call {
        dest: Option<Var>,
        kind: CallKind,
        target: CallTarget,
        method: String,
        args: Vec<Operand>,
        return_ty: Type,
    },

    /// return [value]
    Return { value: Option<Operand> },

    /// Unconditional jump.
    Goto { label: String },

    /// Conditional jump.
    CondGoto { cond: Cond, label: String },

    /// dest = new class
    NewObject { dest: Var, class: String },

    /// dest = new int[len]
    NewArray { dest: Var, len: Operand },

    /// dest = this.field
    FieldGet { dest: Var, field: mjc_ast::Symbol },

    /// this.field = value
    FieldPut {
        field: mjc_ast::Symbol,
        value: Operand,
    },

    /// dest = array.length
    ArrayLength { dest: Var, array: Operand },

    /// dest = array[index]
    ArrayLoad {
        dest: Var,
        array: Var,
        index: Operand,
    },
}

impl Instr {
    /// The variable this instruction defines, if any. An assignment to an
    /// array element defines nothing: it writes through the base reference.
    pub fn dest(&self) -> Option<&Var> {
        match self {
            Instr::Assign { dest, .. } => dest.as_var(),
            Instr::BinaryOp { dest, .. }
            | Instr::UnaryOp { dest, .. }
            | Instr::NewObject { dest, .. }
            | Instr::NewArray { dest, .. }
            | Instr::FieldGet { dest, .. }
            | Instr::ArrayLength { dest, .. }
            | Instr::ArrayLoad { dest, .. } => Some(dest),
            Instr::Call { dest, .. } => dest.as_ref(),
            Instr::Return { .. }
            | Instr::Goto { .. }
            | Instr::CondGoto { .. }
            | Instr::FieldPut { .. } => None,
        }
    }

    /// Every variable this instruction reads.
    pub fn uses(&self) -> Vec<&Var> {
        let mut vars = Vec::new();
        match self {
            Instr::Assign { dest, value } => {
                // An array-element destination reads its base and index.
                if let Operand::ArrayElem(elem) = dest {
                    vars.push(&elem.array);
                    collect_vars(&elem.index, &mut vars);
                }
                collect_vars(value, &mut vars);
            }
            Instr::BinaryOp { left, right, .. } => {
                collect_vars(left, &mut vars);
                collect_vars(right, &mut vars);
            }
            Instr::UnaryOp { operand, .. } => collect_vars(operand, &mut vars),
            Instr::Call { target, args, .. } => {
                if let CallTarget::Object(recv) = target {
                    collect_vars(recv, &mut vars);
                }
                for arg in args {
                    collect_vars(arg, &mut vars);
                }
            }
            Instr::Return { value } => {
                if let Some(value) = value {
                    collect_vars(value, &mut vars);
                }
            }
            Instr::CondGoto { cond, .. } => match cond {
                Cond::Bool(operand) => collect_vars(operand, &mut vars),
                Cond::Cmp { left, right, .. } => {
                    collect_vars(left, &mut vars);
                    collect_vars(right, &mut vars);
                }
            },
            Instr::NewArray { len, .. } => collect_vars(len, &mut vars),
            Instr::FieldPut { value, .. } => collect_vars(value, &mut vars),
            Instr::ArrayLength { array, .. } => collect_vars(array, &mut vars),
            Instr::ArrayLoad { array, index, .. } => {
                vars.push(array);
                collect_vars(index, &mut vars);
            }
            Instr::Goto { .. } | Instr::NewObject { .. } | Instr::FieldGet { .. } => {}
        }
        vars
    }

    /// Labels this instruction jumps to.
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            Instr::Goto { label } | Instr::CondGoto { label, .. } => Some(label),
            _ => None,
        }
    }
}

fn collect_vars<'a>(operand: &'a Operand, out: &mut Vec<&'a Var>) {
    match operand {
        Operand::Var(var) => out.push(var),
        Operand::ArrayElem(elem) => {
            out.push(&elem.array);
            collect_vars(&elem.index, out);
        }
        Operand::Lit(_) => {}
    }
}
