//! Statement lowering
//!
//! Control flow lowers to labels and conditional jumps. A `while` draws one
//! fresh number shared by its three labels; an if/else-if chain draws one
//! number per arm, with the first arm's number also naming the shared end
//! label.

use mjc_ast::{Expr, ExprKind, Stmt, StmtKind, Type};

use super::{Lowerer, NamePlace};
use crate::error::{CompileError, CompileResult};
use crate::ir::{Cond, Instr, Method, Operand};

impl<'a> Lowerer<'a> {
    pub(super) fn lower_stmt(&mut self, stmt: &Stmt, method: &mut Method) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.lower_stmt(stmt, method)?;
                }
                Ok(())
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(cond, then_branch, else_branch.as_deref(), method),
            StmtKind::While { cond, body } => self.lower_while(cond, body, method),
            StmtKind::Assign { target, value } => self.lower_assign(target, value, stmt, method),
            StmtKind::ArrayAssign {
                array,
                index,
                value,
            } => self.lower_array_assign(array, index, value, stmt, method),
            StmtKind::Expr(expr) => {
                // Calls in statement position discard their value; other
                // expressions lower for their side effects alone.
                if let ExprKind::Call {
                    receiver,
                    method: name,
                    args,
                } = &expr.kind
                {
                    self.lower_call(
                        receiver,
                        name,
                        args,
                        expr.span,
                        method,
                        Some(&Type::void()),
                        false,
                    )?;
                } else {
                    self.lower_expr(expr, method)?;
                }
                Ok(())
            }
            StmtKind::Return { value } => {
                let return_ty = method.return_ty.clone();
                let value = value
                    .as_ref()
                    .map(|expr| self.lower_expr_with(expr, method, Some(&return_ty)))
                    .transpose()?;
                method.push(Instr::Return { value });
                Ok(())
            }
        }
    }

    /// An if/else-if chain flattens to a linear run of conditional
    /// branches, one then label per arm and one shared end label. A later
    /// condition only evaluates when every earlier one fell through, and
    /// each arm's body ends with a jump to the shared end, so exactly one
    /// arm executes.
    fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        method: &mut Method,
    ) -> CompileResult<()> {
        let mut arms: Vec<(&Expr, &Stmt)> = vec![(cond, then_branch)];
        let mut tail = else_branch;
        while let Some(stmt) = tail {
            match &stmt.kind {
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                } => {
                    arms.push((cond, then_branch));
                    tail = else_branch.as_deref();
                }
                _ => break,
            }
        }
        let final_else = tail;

        // The first arm's number also names the shared end label.
        let first_id = self.fresh_label_id();
        let end_label = format!("endif{}", first_id);
        let mut then_labels = vec![format!("then{}", first_id)];
        for _ in 1..arms.len() {
            then_labels.push(format!("then{}", self.fresh_label_id()));
        }

        for ((cond, _), label) in arms.iter().zip(&then_labels) {
            let cond = self.lower_condition(cond, method)?;
            method.push(Instr::CondGoto {
                cond,
                label: label.clone(),
            });
        }
        if let Some(else_stmt) = final_else {
            self.lower_stmt(else_stmt, method)?;
        }
        method.push(Instr::Goto {
            label: end_label.clone(),
        });
        for ((_, body), label) in arms.iter().zip(then_labels) {
            method.bind_label(label);
            self.lower_stmt(body, method)?;
            method.push(Instr::Goto {
                label: end_label.clone(),
            });
        }
        method.bind_label(end_label);
        Ok(())
    }

    fn lower_while(&mut self, cond: &Expr, body: &Stmt, method: &mut Method) -> CompileResult<()> {
        let id = self.fresh_label_id();
        let cond_label = format!("cond{}", id);
        let body_label = format!("body{}", id);
        let end_label = format!("endwhile{}", id);

        method.bind_label(cond_label.clone());
        let cond = self.lower_condition(cond, method)?;
        method.push(Instr::CondGoto {
            cond,
            label: body_label.clone(),
        });
        method.push(Instr::Goto {
            label: end_label.clone(),
        });
        method.bind_label(body_label);
        self.lower_stmt(body, method)?;
        method.push(Instr::Goto { label: cond_label });
        method.bind_label(end_label);
        Ok(())
    }

    /// A comparison at the top of a condition branches directly on its
    /// operands; anything else materializes to a boolean first.
    fn lower_condition(&mut self, cond: &Expr, method: &mut Method) -> CompileResult<Cond> {
        let cond = peel_parens(cond);
        if let ExprKind::Binary { op, left, right } = &cond.kind {
            if op.is_comparison() {
                let left = self.lower_expr(left, method)?;
                let right = self.lower_expr(right, method)?;
                return Ok(Cond::Cmp {
                    op: *op,
                    left,
                    right,
                });
            }
        }
        let operand = self.lower_expr_with(cond, method, Some(&Type::boolean()))?;
        Ok(Cond::Bool(operand))
    }

    fn lower_assign(
        &mut self,
        target: &str,
        value: &Expr,
        stmt: &Stmt,
        method: &mut Method,
    ) -> CompileResult<()> {
        match self.resolve_name(target) {
            Some(NamePlace::Slot(sym)) => {
                let sym = sym.clone();
                let value = self.lower_expr_with(value, method, Some(&sym.ty))?;
                method.push(Instr::Assign {
                    dest: Operand::var(&sym.name, sym.ty),
                    value,
                });
                Ok(())
            }
            Some(NamePlace::Field(sym)) => {
                let sym = sym.clone();
                let value = self.lower_expr_with(value, method, Some(&sym.ty))?;
                method.push(Instr::FieldPut { field: sym, value });
                Ok(())
            }
            Some(NamePlace::Import) | None => Err(CompileError::UndefinedVariable {
                name: target.to_string(),
                span: stmt.span,
            }),
        }
    }

    fn lower_array_assign(
        &mut self,
        array: &str,
        index: &Expr,
        value: &Expr,
        stmt: &Stmt,
        method: &mut Method,
    ) -> CompileResult<()> {
        let base = match self.resolve_name(array) {
            Some(NamePlace::Slot(sym)) => crate::ir::Var::new(&sym.name, sym.ty.clone()),
            Some(NamePlace::Field(sym)) => {
                let field = sym.clone();
                let dest = self.fresh_temp(field.ty.clone());
                method.push(Instr::FieldGet {
                    dest: dest.clone(),
                    field,
                });
                dest
            }
            Some(NamePlace::Import) | None => {
                return Err(CompileError::UndefinedVariable {
                    name: array.to_string(),
                    span: stmt.span,
                })
            }
        };
        let elem_ty = base.ty.element();
        let index = self.lower_expr(index, method)?;
        let value = self.lower_expr_with(value, method, Some(&elem_ty))?;
        method.push(Instr::Assign {
            dest: Operand::elem(base, index),
            value,
        });
        Ok(())
    }
}

fn peel_parens(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Paren(inner) => peel_parens(inner),
        _ => expr,
    }
}
