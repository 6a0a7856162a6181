//! Pretty-printing for IR
//!
//! Provides human-readable output for debugging lowered units.

use std::fmt::Write;

use super::{CallKind, CallTarget, ClassUnit, Cond, Instr, Method};

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for ClassUnit {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        for import in &self.imports {
            writeln!(output, "; import {}", import).unwrap();
        }
        writeln!(output, "; class {}", self.class_name).unwrap();
        if let Some(super_class) = &self.super_class {
            writeln!(output, "; extends {}", super_class).unwrap();
        }
        for field in &self.fields {
            writeln!(output, ";   field {}: {}", field.name, field.ty).unwrap();
        }
        writeln!(output).unwrap();

        for method in &self.methods {
            output.push_str(&method.pretty_print());
            writeln!(output).unwrap();
        }

        output
    }
}

impl PrettyPrint for Method {
    fn pretty_print(&self) -> String {
        let mut output = String::new();

        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        let modifier = if self.is_static { "static fn" } else { "fn" };
        writeln!(
            output,
            "{} {}({}) -> {} {{",
            modifier,
            self.name,
            params.join(", "),
            self.return_ty
        )
        .unwrap();

        if !self.locals.is_empty() {
            let locals: Vec<String> = self
                .locals
                .iter()
                .map(|l| format!("{}: {}", l.name, l.ty))
                .collect();
            writeln!(output, "  ; locals: {}", locals.join(", ")).unwrap();
        }

        for (pos, instr) in self.instrs.iter().enumerate() {
            for label in self.labels_at(pos) {
                writeln!(output, "{}:", label).unwrap();
            }
            writeln!(output, "  {}", format_instr(instr)).unwrap();
        }
        // Labels bound past the last instruction still print.
        for label in self.labels_at(self.instrs.len()) {
            writeln!(output, "{}:", label).unwrap();
        }

        writeln!(output, "}}").unwrap();
        output
    }
}

fn format_instr(instr: &Instr) -> String {
    match instr {
        Instr::Assign { dest, value } => {
            format!("{} = {}", dest, value)
        }
        Instr::BinaryOp {
            dest,
            op,
            left,
            right,
        } => {
            format!("{} = {} {} {}", dest, left, op, right)
        }
        Instr::UnaryOp { dest, op, operand } => {
            format!("{} = {}{}", dest, op, operand)
        }
        Instr::Call {
            dest,
            kind,
            target,
            method,
            args,
            ..
        } => {
            let args_str: Vec<String> = args.iter().map(|a| format!("{}", a)).collect();
            let kind_str = match kind {
                CallKind::Static => "call_static",
                CallKind::Virtual => "call_virtual",
                CallKind::Special => "call_special",
            };
            let target_str = match target {
                CallTarget::Class(class) => class.clone(),
                CallTarget::Object(recv) => format!("{}", recv),
            };
            if let Some(d) = dest {
                format!(
                    "{} = {} {}.{}({})",
                    d,
                    kind_str,
                    target_str,
                    method,
                    args_str.join(", ")
                )
            } else {
                format!("{} {}.{}({})", kind_str, target_str, method, args_str.join(", "))
            }
        }
        Instr::Return { value } => match value {
            Some(value) => format!("return {}", value),
            None => "return".to_string(),
        },
        Instr::Goto { label } => format!("goto {}", label),
        Instr::CondGoto { cond, label } => match cond {
            Cond::Bool(operand) => format!("if {} goto {}", operand, label),
            Cond::Cmp { op, left, right } => {
                format!("if {} {} {} goto {}", left, op, right, label)
            }
        },
        Instr::NewObject { dest, class } => {
            format!("{} = new_object {}", dest, class)
        }
        Instr::NewArray { dest, len } => {
            format!("{} = new_array int[{}]", dest, len)
        }
        Instr::FieldGet { dest, field } => {
            format!("{} = get_field this.{}", dest, field.name)
        }
        Instr::FieldPut { field, value } => {
            format!("put_field this.{} = {}", field.name, value)
        }
        Instr::ArrayLength { dest, array } => {
            format!("{} = array_len {}", dest, array)
        }
        Instr::ArrayLoad { dest, array, index } => {
            format!("{} = load_elem {}[{}]", dest, array, index)
        }
    }
}
