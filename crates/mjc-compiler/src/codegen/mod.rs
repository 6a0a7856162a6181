//! Assembly text emission
//!
//! Turns a lowered [`ClassUnit`] into one textual assembly-style program:
//! class and superclass declarations, field declarations, the implicit
//! constructor, then one method block per non-constructor method. The whole
//! unit is built in memory and returned only when every method emitted
//! cleanly; an error anywhere yields no output at all.

mod descriptor;
mod method;

pub use descriptor::{descriptor, method_descriptor};

use std::fmt::Write;

use crate::error::CompileResult;
use crate::ir::ClassUnit;
use crate::regalloc::{self, RegisterBudget};

use method::MethodEmitter;

/// Emits the full assembly text for one class.
pub fn emit_class(unit: &ClassUnit, budget: RegisterBudget) -> CompileResult<String> {
    let mut out = String::new();

    writeln!(out, ".class public {}", unit.class_name).unwrap();
    writeln!(out, ".super {}", unit.super_name()).unwrap();

    for field in &unit.fields {
        writeln!(
            out,
            ".field public {} {}",
            field.name,
            descriptor(&field.ty)
        )
        .unwrap();
    }
    writeln!(out).unwrap();

    out.push_str(&constructor_block(unit));

    for method in &unit.methods {
        if method.is_constructor {
            continue;
        }
        let alloc = regalloc::allocate(method, budget)?;
        writeln!(out).unwrap();
        out.push_str(&MethodEmitter::new(method, &alloc, &unit.class_name).emit()?);
    }

    Ok(out)
}

/// The no-argument constructor delegating to the superclass.
fn constructor_block(unit: &ClassUnit) -> String {
    let mut out = String::new();
    writeln!(out, ".method public <init>()V").unwrap();
    writeln!(out, "    aload_0").unwrap();
    writeln!(out, "    invokespecial {}/<init>()V", unit.super_name()).unwrap();
    writeln!(out, "    return").unwrap();
    writeln!(out, ".end method").unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Instr, Method, Operand};
    use mjc_ast::Type;

    #[test]
    fn test_class_header_and_constructor() {
        let unit = ClassUnit {
            class_name: "Empty".to_string(),
            super_class: None,
            fields: vec![],
            imports: vec![],
            methods: vec![],
        };
        let text = emit_class(&unit, RegisterBudget::PerVariable).unwrap();
        assert!(text.starts_with(".class public Empty\n.super java/lang/Object\n"));
        assert!(text.contains("invokespecial java/lang/Object/<init>()V"));
    }

    #[test]
    fn test_superclass_declaration() {
        let unit = ClassUnit {
            class_name: "Derived".to_string(),
            super_class: Some("Base".to_string()),
            fields: vec![],
            imports: vec![],
            methods: vec![],
        };
        let text = emit_class(&unit, RegisterBudget::PerVariable).unwrap();
        assert!(text.contains(".super Base"));
        assert!(text.contains("invokespecial Base/<init>()V"));
    }

    #[test]
    fn test_one_block_per_non_constructor_method() {
        let mut m1 = Method::new("a", false, vec![], vec![], Type::void());
        m1.push(Instr::Return { value: None });
        let mut m2 = Method::new("b", false, vec![], vec![], Type::int());
        m2.push(Instr::Return {
            value: Some(Operand::int(0)),
        });
        let unit = ClassUnit {
            class_name: "Two".to_string(),
            super_class: None,
            fields: vec![],
            imports: vec![],
            methods: vec![Method::constructor(), m1, m2],
        };
        let text = emit_class(&unit, RegisterBudget::PerVariable).unwrap();
        let blocks = text.matches(".method public ").count();
        // constructor block plus one per method
        assert_eq!(blocks, 3);
        assert!(text.contains(".method public a()V"));
        assert!(text.contains(".method public b()I"));
    }
}
