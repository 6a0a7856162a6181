//! Method body emission.
//!
//! Walks a method's instruction list with its slot table and produces the
//! textual stack-machine block. Instruction selection is type driven:
//! integer and reference values use separate load/store/return families,
//! and slots 0 through 3 take the compact zero-operand forms. Two peephole
//! fusions run over adjacent instruction pairs, each guarded so it never
//! merges across a label boundary.

use std::fmt::Write;

use mjc_ast::{BinaryOp, Type, TypeName, UnaryOp};

use super::descriptor::{descriptor, method_descriptor};
use crate::error::{CompileError, CompileResult};
use crate::ir::{CallKind, CallTarget, Cond, Instr, Method, Operand, Var};
use crate::regalloc::Allocation;

/// Signed byte range accepted by the single-instruction increment.
const INC_MIN: i32 = -128;
const INC_MAX: i32 = 127;

pub struct MethodEmitter<'a> {
    method: &'a Method,
    alloc: &'a Allocation,
    class_name: &'a str,
    out: String,
    next_cmp: u32,
}

impl<'a> MethodEmitter<'a> {
    pub fn new(method: &'a Method, alloc: &'a Allocation, class_name: &'a str) -> Self {
        Self {
            method,
            alloc,
            class_name,
            out: String::new(),
            next_cmp: 0,
        }
    }

    pub fn emit(mut self) -> CompileResult<String> {
        self.check_labels()?;

        let modifier = match (self.method.is_public, self.method.is_static) {
            (true, true) => "public static",
            (true, false) => "public",
            (false, true) => "private static",
            (false, false) => "private",
        };
        writeln!(
            self.out,
            ".method {} {}{}",
            modifier,
            self.method.name,
            method_descriptor(&self.method.params, &self.method.return_ty)
        )
        .unwrap();

        // Conservative bound; exact stack-depth analysis is out of scope.
        let locals = self.alloc.slot_count().max(1);
        writeln!(self.out, "    .limit stack {}", locals.max(2)).unwrap();
        writeln!(self.out, "    .limit locals {}", locals).unwrap();

        let instrs = &self.method.instrs;
        let mut pos = 0;
        while pos < instrs.len() {
            self.bind_labels(pos);
            if pos + 1 < instrs.len() && !self.method.is_label_boundary(pos + 1) {
                if self.try_increment(&instrs[pos], &instrs[pos + 1])? {
                    pos += 2;
                    continue;
                }
                if self.try_compare_branch(&instrs[pos], &instrs[pos + 1])? {
                    pos += 2;
                    continue;
                }
            }
            self.emit_instr(&instrs[pos])?;
            pos += 1;
        }
        // A label bound past the last instruction (a non-void method
        // falling off a loop) must still precede an instruction for the
        // assembler's sake.
        if self.method.is_label_boundary(instrs.len()) {
            self.bind_labels(instrs.len());
            self.line("nop");
        }

        writeln!(self.out, ".end method").unwrap();
        Ok(self.out)
    }

    /// Every jump target must have a binding in this method.
    fn check_labels(&self) -> CompileResult<()> {
        for instr in &self.method.instrs {
            if let Some(label) = instr.jump_target() {
                if !self.method.has_label(label) {
                    return Err(CompileError::UndefinedLabel {
                        label: label.to_string(),
                        method: self.method.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn bind_labels(&mut self, pos: usize) {
        let method = self.method;
        for label in method.labels_at(pos) {
            writeln!(self.out, "{}:", label).unwrap();
        }
    }

    fn line(&mut self, text: &str) {
        writeln!(self.out, "    {}", text).unwrap();
    }

    fn slot(&self, var: &Var) -> CompileResult<u32> {
        self.alloc.slot(&var.name).ok_or_else(|| {
            CompileError::UnassignedVariable {
                name: var.name.clone(),
                method: self.method.name.clone(),
            }
        })
    }

    /// Integer constant with the smallest encoding that fits.
    fn push_int(&mut self, value: i32) {
        let text = match value {
            -1 => "iconst_m1".to_string(),
            0..=5 => format!("iconst_{}", value),
            -128..=127 => format!("bipush {}", value),
            -32768..=32767 => format!("sipush {}", value),
            _ => format!("ldc {}", value),
        };
        self.line(&text);
    }

    fn load_var(&mut self, var: &Var) -> CompileResult<()> {
        let slot = self.slot(var)?;
        let family = if var.ty.is_reference() { "a" } else { "i" };
        if slot <= 3 {
            self.line(&format!("{}load_{}", family, slot));
        } else {
            self.line(&format!("{}load {}", family, slot));
        }
        Ok(())
    }

    fn store_var(&mut self, var: &Var) -> CompileResult<()> {
        let slot = self.slot(var)?;
        let family = if var.ty.is_reference() { "a" } else { "i" };
        if slot <= 3 {
            self.line(&format!("{}store_{}", family, slot));
        } else {
            self.line(&format!("{}store {}", family, slot));
        }
        Ok(())
    }

    fn load_operand(&mut self, operand: &Operand) -> CompileResult<()> {
        match operand {
            Operand::Lit(lit) => {
                self.push_int(lit.value);
                Ok(())
            }
            Operand::Var(var) => self.load_var(var),
            Operand::ArrayElem(elem) => {
                self.load_var(&elem.array)?;
                self.load_operand(&elem.index)?;
                self.line("iaload");
                Ok(())
            }
        }
    }

    fn emit_instr(&mut self, instr: &Instr) -> CompileResult<()> {
        match instr {
            Instr::Assign { dest, value } => match dest {
                Operand::Var(var) => {
                    self.load_operand(value)?;
                    self.store_var(var)
                }
                Operand::ArrayElem(elem) => {
                    self.load_var(&elem.array)?;
                    self.load_operand(&elem.index)?;
                    self.load_operand(value)?;
                    self.line("iastore");
                    Ok(())
                }
                Operand::Lit(_) => Err(CompileError::internal("assignment to a literal")),
            },
            Instr::BinaryOp {
                dest,
                op,
                left,
                right,
            } => {
                if op.is_comparison() {
                    self.emit_compare_value(*op, left, right)?;
                } else {
                    self.load_operand(left)?;
                    self.load_operand(right)?;
                    self.line(arith_opcode(*op)?);
                }
                self.store_var(dest)
            }
            Instr::UnaryOp {
                dest,
                op: UnaryOp::Not,
                operand,
            } => {
                let (true_label, end_label) = self.fresh_branch_labels();
                self.load_operand(operand)?;
                self.line(&format!("ifeq {}", true_label));
                self.emit_diamond(&true_label, &end_label);
                self.store_var(dest)
            }
            Instr::Call {
                dest,
                kind,
                target,
                method,
                args,
                return_ty,
            } => self.emit_call(dest.as_ref(), *kind, target, method, args, return_ty),
            Instr::Return { value } => {
                match value {
                    Some(value) => {
                        self.load_operand(value)?;
                        if value.ty().is_reference() {
                            self.line("areturn");
                        } else {
                            self.line("ireturn");
                        }
                    }
                    None => self.line("return"),
                }
                Ok(())
            }
            Instr::Goto { label } => {
                self.line(&format!("goto {}", label));
                Ok(())
            }
            Instr::CondGoto { cond, label } => match cond {
                Cond::Bool(operand) => {
                    self.load_operand(operand)?;
                    self.line(&format!("ifne {}", label));
                    Ok(())
                }
                Cond::Cmp { op, left, right } => self.emit_compare_branch(*op, left, right, label),
            },
            Instr::NewObject { dest, class } => {
                self.line(&format!("new {}", class));
                self.store_var(dest)
            }
            Instr::NewArray { dest, len } => {
                self.load_operand(len)?;
                self.line("newarray int");
                self.store_var(dest)
            }
            Instr::FieldGet { dest, field } => {
                self.line("aload_0");
                self.line(&format!(
                    "getfield {}/{} {}",
                    self.class_name,
                    field.name,
                    descriptor(&field.ty)
                ));
                self.store_var(dest)
            }
            Instr::FieldPut { field, value } => {
                self.line("aload_0");
                self.load_operand(value)?;
                self.line(&format!(
                    "putfield {}/{} {}",
                    self.class_name,
                    field.name,
                    descriptor(&field.ty)
                ));
                Ok(())
            }
            Instr::ArrayLength { dest, array } => {
                self.load_operand(array)?;
                self.line("arraylength");
                self.store_var(dest)
            }
            Instr::ArrayLoad { dest, array, index } => {
                self.load_var(array)?;
                self.load_operand(index)?;
                self.line("iaload");
                self.store_var(dest)
            }
        }
    }

    fn emit_call(
        &mut self,
        dest: Option<&Var>,
        kind: CallKind,
        target: &CallTarget,
        method: &str,
        args: &[Operand],
        return_ty: &Type,
    ) -> CompileResult<()> {
        let arg_syms: Vec<mjc_ast::Symbol> = args
            .iter()
            .map(|a| mjc_ast::Symbol::new("", a.ty()))
            .collect();
        let desc = method_descriptor(&arg_syms, return_ty);

        match kind {
            CallKind::Static => {
                let class = match target {
                    CallTarget::Class(name) => name.clone(),
                    CallTarget::Object(_) => {
                        return Err(CompileError::internal("static call on an object receiver"))
                    }
                };
                for arg in args {
                    self.load_operand(arg)?;
                }
                self.line(&format!("invokestatic {}/{}{}", class, method, desc));
            }
            CallKind::Virtual => {
                let receiver = match target {
                    CallTarget::Object(operand) => operand,
                    CallTarget::Class(_) => {
                        return Err(CompileError::internal("virtual call without a receiver"))
                    }
                };
                let class = receiver_class(receiver)?;
                self.load_operand(receiver)?;
                for arg in args {
                    self.load_operand(arg)?;
                }
                self.line(&format!("invokevirtual {}/{}{}", class, method, desc));
            }
            CallKind::Special => {
                let receiver = match target {
                    CallTarget::Object(operand) => operand,
                    CallTarget::Class(_) => {
                        return Err(CompileError::internal("constructor call without a receiver"))
                    }
                };
                let class = receiver_class(receiver)?;
                self.load_operand(receiver)?;
                for arg in args {
                    self.load_operand(arg)?;
                }
                self.line(&format!("invokespecial {}/{}{}", class, method, desc));
            }
        }

        match dest {
            Some(var) => self.store_var(var),
            None => {
                if !return_ty.is_void() {
                    self.line("pop");
                }
                Ok(())
            }
        }
    }

    /// Materializes a comparison to 0/1 through a branch pair.
    fn emit_compare_value(
        &mut self,
        op: BinaryOp,
        left: &Operand,
        right: &Operand,
    ) -> CompileResult<()> {
        let (true_label, end_label) = self.fresh_branch_labels();
        self.emit_compare_branch(op, left, right, &true_label)?;
        self.emit_diamond(&true_label, &end_label);
        Ok(())
    }

    fn fresh_branch_labels(&mut self) -> (String, String) {
        let id = self.next_cmp;
        self.next_cmp += 1;
        (format!("cmptrue{}", id), format!("cmpend{}", id))
    }

    /// The 0/1 tail shared by materialized comparisons and logical not:
    /// false value on the fall-through path, true value behind the label.
    fn emit_diamond(&mut self, true_label: &str, end_label: &str) {
        self.line("iconst_0");
        self.line(&format!("goto {}", end_label));
        writeln!(self.out, "{}:", true_label).unwrap();
        self.line("iconst_1");
        writeln!(self.out, "{}:", end_label).unwrap();
    }

    /// Compare-and-branch. A literal zero right operand selects the
    /// single-operand branch family.
    fn emit_compare_branch(
        &mut self,
        op: BinaryOp,
        left: &Operand,
        right: &Operand,
        label: &str,
    ) -> CompileResult<()> {
        let suffix = compare_suffix(op)?;
        if matches!(right.as_literal(), Some(lit) if lit.value == 0) {
            self.load_operand(left)?;
            self.line(&format!("if{} {}", suffix, label));
        } else {
            self.load_operand(left)?;
            self.load_operand(right)?;
            self.line(&format!("if_icmp{} {}", suffix, label));
        }
        Ok(())
    }

    /// `t := x + k; x := t` collapses to a single increment when `k` fits
    /// the compact range and `t` has no other use.
    fn try_increment(&mut self, cur: &Instr, next: &Instr) -> CompileResult<bool> {
        let Instr::BinaryOp {
            dest: temp,
            op,
            left,
            right,
        } = cur
        else {
            return Ok(false);
        };
        let Instr::Assign {
            dest: Operand::Var(target),
            value: Operand::Var(source),
        } = next
        else {
            return Ok(false);
        };
        if source.name != temp.name || target.ty != Type::int() {
            return Ok(false);
        }

        let delta = match op {
            BinaryOp::Add => match (left, right) {
                (Operand::Var(var), Operand::Lit(lit)) if var.name == target.name => lit.value,
                (Operand::Lit(lit), Operand::Var(var)) if var.name == target.name => lit.value,
                _ => return Ok(false),
            },
            BinaryOp::Sub => match (left, right) {
                (Operand::Var(var), Operand::Lit(lit)) if var.name == target.name => {
                    match lit.value.checked_neg() {
                        Some(neg) => neg,
                        None => return Ok(false),
                    }
                }
                _ => return Ok(false),
            },
            _ => return Ok(false),
        };
        if !(INC_MIN..=INC_MAX).contains(&delta) {
            return Ok(false);
        }
        if self.use_count(&temp.name) != 1 {
            return Ok(false);
        }

        let slot = self.slot(target)?;
        self.line(&format!("iinc {} {}", slot, delta));
        Ok(true)
    }

    /// A comparison immediately consumed by a branch on its boolean result
    /// collapses to a single compare-and-branch.
    fn try_compare_branch(&mut self, cur: &Instr, next: &Instr) -> CompileResult<bool> {
        let Instr::BinaryOp {
            dest: temp,
            op,
            left,
            right,
        } = cur
        else {
            return Ok(false);
        };
        if !op.is_comparison() {
            return Ok(false);
        }
        let Instr::CondGoto {
            cond: Cond::Bool(Operand::Var(source)),
            label,
        } = next
        else {
            return Ok(false);
        };
        if source.name != temp.name || self.use_count(&temp.name) != 1 {
            return Ok(false);
        }

        self.emit_compare_branch(*op, left, right, label)?;
        Ok(true)
    }

    fn use_count(&self, name: &str) -> usize {
        self.method
            .instrs
            .iter()
            .map(|instr| {
                instr
                    .uses()
                    .iter()
                    .filter(|var| var.name == name)
                    .count()
            })
            .sum()
    }
}

fn arith_opcode(op: BinaryOp) -> CompileResult<&'static str> {
    match op {
        BinaryOp::Add => Ok("iadd"),
        BinaryOp::Sub => Ok("isub"),
        BinaryOp::Mul => Ok("imul"),
        BinaryOp::Div => Ok("idiv"),
        _ => Err(CompileError::internal(format!(
            "operator {} is not arithmetic",
            op
        ))),
    }
}

fn compare_suffix(op: BinaryOp) -> CompileResult<&'static str> {
    match op {
        BinaryOp::Lt => Ok("lt"),
        BinaryOp::Gt => Ok("gt"),
        BinaryOp::Le => Ok("le"),
        BinaryOp::Ge => Ok("ge"),
        BinaryOp::Eq => Ok("eq"),
        BinaryOp::Ne => Ok("ne"),
        _ => Err(CompileError::internal(format!(
            "operator {} is not relational",
            op
        ))),
    }
}

fn receiver_class(receiver: &Operand) -> CompileResult<String> {
    match receiver.ty().name {
        TypeName::Class(name) => Ok(name),
        TypeName::String => Ok("java/lang/String".to_string()),
        other => Err(CompileError::internal(format!(
            "call receiver of non-class type {:?}",
            other
        ))),
    }
}
