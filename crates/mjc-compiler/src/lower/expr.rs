//! Expression lowering
//!
//! Every compound expression materializes its result into a fresh
//! temporary, so instruction operands are always simple. Short-circuit
//! `&&` and `||` lower to explicit branches over a boolean temporary.

use mjc_ast::{BinaryOp, Expr, ExprKind, Span, Type};

use super::{Lowerer, NamePlace};
use crate::error::{CompileError, CompileResult};
use crate::ir::{CallKind, CallTarget, Cond, Instr, Method, Operand};

impl<'a> Lowerer<'a> {
    /// Lowers an expression in value position.
    pub(super) fn lower_expr(&mut self, expr: &Expr, method: &mut Method) -> CompileResult<Operand> {
        self.lower_expr_with(expr, method, None)
    }

    /// Lowers an expression, with the type its context expects. The
    /// expected type resolves the return type of calls into classes whose
    /// signatures are not known here.
    pub(super) fn lower_expr_with(
        &mut self,
        expr: &Expr,
        method: &mut Method,
        expected: Option<&Type>,
    ) -> CompileResult<Operand> {
        match &expr.kind {
            ExprKind::Int(value) => Ok(Operand::int(*value)),
            ExprKind::Bool(value) => Ok(Operand::bool(*value)),
            ExprKind::Var(name) => self.read_var(name, expr.span, method),
            ExprKind::This => Ok(self.this_operand()),
            ExprKind::Paren(inner) => self.lower_expr_with(inner, method, expected),
            ExprKind::Binary { op, left, right } => {
                self.lower_binary(*op, left, right, method)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.lower_expr(operand, method)?;
                let dest = self.fresh_temp(Type::boolean());
                method.push(Instr::UnaryOp {
                    dest: dest.clone(),
                    op: *op,
                    operand: value,
                });
                Ok(dest.into())
            }
            ExprKind::ArrayAccess { array, index } => {
                let base = self.lower_array_base(array, method)?;
                let index = self.lower_expr(index, method)?;
                let dest = self.fresh_temp(base.ty.element());
                method.push(Instr::ArrayLoad {
                    dest: dest.clone(),
                    array: base,
                    index,
                });
                Ok(dest.into())
            }
            ExprKind::Length { array } => {
                let base = self.lower_expr(array, method)?;
                let dest = self.fresh_temp(Type::int());
                method.push(Instr::ArrayLength {
                    dest: dest.clone(),
                    array: base,
                });
                Ok(dest.into())
            }
            ExprKind::NewArray { len } => {
                let len = self.lower_expr(len, method)?;
                let dest = self.fresh_temp(Type::int_array());
                method.push(Instr::NewArray {
                    dest: dest.clone(),
                    len,
                });
                Ok(dest.into())
            }
            ExprKind::ArrayLit { elements } => {
                let dest = self.fresh_temp(Type::int_array());
                method.push(Instr::NewArray {
                    dest: dest.clone(),
                    len: Operand::int(elements.len() as i32),
                });
                for (i, element) in elements.iter().enumerate() {
                    let value = self.lower_expr(element, method)?;
                    method.push(Instr::Assign {
                        dest: Operand::elem(dest.clone(), Operand::int(i as i32)),
                        value,
                    });
                }
                Ok(dest.into())
            }
            ExprKind::NewObject { class } => {
                let dest = self.fresh_temp(Type::class(class));
                method.push(Instr::NewObject {
                    dest: dest.clone(),
                    class: class.clone(),
                });
                method.push(Instr::Call {
                    dest: None,
                    kind: CallKind::Special,
                    target: CallTarget::Object(dest.clone().into()),
                    method: "<init>".to_string(),
                    args: Vec::new(),
                    return_ty: Type::void(),
                });
                Ok(dest.into())
            }
            ExprKind::Call {
                receiver,
                method: name,
                args,
            } => {
                let result =
                    self.lower_call(receiver, name, args, expr.span, method, expected, true)?;
                result.ok_or_else(|| {
                    CompileError::unsupported("void call used as a value", expr.span)
                })
            }
        }
    }

    fn lower_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        method: &mut Method,
    ) -> CompileResult<Operand> {
        match op {
            BinaryOp::And => self.lower_and(left, right, method),
            BinaryOp::Or => self.lower_or(left, right, method),
            _ => {
                let lhs = self.lower_expr(left, method)?;
                let rhs = self.lower_expr(right, method)?;
                let ty = if op.is_comparison() {
                    Type::boolean()
                } else {
                    Type::int()
                };
                let dest = self.fresh_temp(ty);
                method.push(Instr::BinaryOp {
                    dest: dest.clone(),
                    op,
                    left: lhs,
                    right: rhs,
                });
                Ok(dest.into())
            }
        }
    }

    /// Short-circuit `&&`: the right side only evaluates when the left is
    /// true; otherwise the result is false.
    fn lower_and(
        &mut self,
        left: &Expr,
        right: &Expr,
        method: &mut Method,
    ) -> CompileResult<Operand> {
        let dest = self.fresh_temp(Type::boolean());
        let id = self.fresh_label_id();
        let then_label = format!("then{}", id);
        let end_label = format!("endif{}", id);

        let lhs = self.lower_expr(left, method)?;
        method.push(Instr::CondGoto {
            cond: Cond::Bool(lhs),
            label: then_label.clone(),
        });
        method.push(Instr::Assign {
            dest: dest.clone().into(),
            value: Operand::bool(false),
        });
        method.push(Instr::Goto {
            label: end_label.clone(),
        });
        method.bind_label(then_label);
        let rhs = self.lower_expr(right, method)?;
        method.push(Instr::Assign {
            dest: dest.clone().into(),
            value: rhs,
        });
        method.bind_label(end_label);
        Ok(dest.into())
    }

    /// Short-circuit `||`. A true left operand jumps straight to the end
    /// without writing the result temporary, leaving it unset on that
    /// path. Downstream consumers depend on this exact shape, so it is
    /// reproduced as is.
    fn lower_or(
        &mut self,
        left: &Expr,
        right: &Expr,
        method: &mut Method,
    ) -> CompileResult<Operand> {
        let dest = self.fresh_temp(Type::boolean());
        let id = self.fresh_label_id();
        let then_label = format!("then{}", id);
        let end_label = format!("endif{}", id);

        let lhs = self.lower_expr(left, method)?;
        method.push(Instr::CondGoto {
            cond: Cond::Bool(lhs),
            label: end_label.clone(),
        });
        let rhs = self.lower_expr(right, method)?;
        method.push(Instr::CondGoto {
            cond: Cond::Bool(rhs),
            label: then_label.clone(),
        });
        method.push(Instr::Assign {
            dest: dest.clone().into(),
            value: Operand::bool(false),
        });
        method.push(Instr::Goto {
            label: end_label.clone(),
        });
        method.bind_label(then_label);
        method.push(Instr::Assign {
            dest: dest.clone().into(),
            value: Operand::bool(true),
        });
        method.bind_label(end_label);
        Ok(dest.into())
    }

    /// Lowers a method call. Dispatch is static when the receiver is a
    /// bare import name not shadowed by a parameter, local, or field;
    /// virtual otherwise. Returns `None` for calls producing no value.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn lower_call(
        &mut self,
        receiver: &Expr,
        name: &str,
        args: &[Expr],
        span: Span,
        method: &mut Method,
        expected: Option<&Type>,
        want_value: bool,
    ) -> CompileResult<Option<Operand>> {
        let (kind, target, receiver_class) = self.classify_receiver(receiver, method)?;

        let arg_ops = args
            .iter()
            .map(|arg| self.lower_expr(arg, method))
            .collect::<CompileResult<Vec<_>>>()?;

        let return_ty = self.call_return_type(name, receiver_class.as_deref(), expected, span)?;

        let dest = if want_value && !return_ty.is_void() {
            Some(self.fresh_temp(return_ty.clone()))
        } else {
            None
        };

        method.push(Instr::Call {
            dest: dest.clone(),
            kind,
            target,
            method: name.to_string(),
            args: arg_ops,
            return_ty,
        });

        Ok(dest.map(Operand::from))
    }

    /// Splits a call receiver into dispatch kind, call target, and the
    /// receiver's class name where it is statically known.
    fn classify_receiver(
        &mut self,
        receiver: &Expr,
        method: &mut Method,
    ) -> CompileResult<(CallKind, CallTarget, Option<String>)> {
        if let ExprKind::Var(name) = &receiver.kind {
            if matches!(self.resolve_name(name), Some(NamePlace::Import)) {
                return Ok((
                    CallKind::Static,
                    CallTarget::Class(name.clone()),
                    Some(name.clone()),
                ));
            }
        }
        let operand = self.lower_expr(receiver, method)?;
        let class = match operand.ty().name {
            mjc_ast::TypeName::Class(ref name) => Some(name.clone()),
            _ => None,
        };
        Ok((CallKind::Virtual, CallTarget::Object(operand), class))
    }

    /// Return type of a call: the declared signature when the receiver is
    /// this class, the context's expected type otherwise. A method unknown
    /// on this class is an error unless a superclass could supply it.
    fn call_return_type(
        &self,
        name: &str,
        receiver_class: Option<&str>,
        expected: Option<&Type>,
        span: Span,
    ) -> CompileResult<Type> {
        if receiver_class == Some(self.table.class_name()) {
            if let Some(ty) = self.table.return_type(name) {
                return Ok(ty.clone());
            }
            if self.table.super_class().is_none() {
                return Err(CompileError::UnknownMethod {
                    name: name.to_string(),
                    span,
                });
            }
        }
        Ok(expected.cloned().unwrap_or_else(Type::int))
    }

    /// Lowers an expression that must denote an array, yielding its base
    /// variable.
    pub(super) fn lower_array_base(
        &mut self,
        expr: &Expr,
        method: &mut Method,
    ) -> CompileResult<crate::ir::Var> {
        let operand = self.lower_expr(expr, method)?;
        match operand {
            Operand::Var(var) => Ok(var),
            other => Err(CompileError::unsupported(
                format!("expected an array reference, found {}", other),
                expr.span,
            )),
        }
    }
}
