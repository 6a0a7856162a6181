//! Lowering tests over hand-built ASTs.

use mjc_ast::{
    BinaryOp, ClassDecl, Expr, ExprKind, ImportDecl, MethodDecl, MethodFacts, Program, Span, Stmt,
    StmtKind, Symbol, SymbolTable, Type, VarDecl,
};
use mjc_compiler::ir::{CallKind, CallTarget, Cond, Instr, Operand, PrettyPrint};
use mjc_compiler::{CompileError, Lowerer};

fn sp() -> Span {
    Span::synthetic()
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, sp())
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, sp())
}

fn var(name: &str) -> Expr {
    expr(ExprKind::Var(name.to_string()))
}

fn int(value: i32) -> Expr {
    expr(ExprKind::Int(value))
}

fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn call(receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        receiver: Box::new(receiver),
        method: method.to_string(),
        args,
    })
}

fn assign(target: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Assign {
        target: target.to_string(),
        value,
    })
}

fn ret(value: Expr) -> Stmt {
    stmt(StmtKind::Return { value: Some(value) })
}

fn method_decl(
    name: &str,
    is_static: bool,
    params: &[(&str, Type)],
    return_ty: Type,
    locals: &[(&str, Type)],
    body: Vec<Stmt>,
) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        is_public: true,
        is_static,
        params: params
            .iter()
            .map(|(n, t)| VarDecl::new(*n, t.clone(), sp()))
            .collect(),
        return_ty,
        locals: locals
            .iter()
            .map(|(n, t)| VarDecl::new(*n, t.clone(), sp()))
            .collect(),
        body,
        span: sp(),
    }
}

/// Builds a program and its matching symbol table. Imports are dotted
/// qualified names.
fn build_program(
    imports: &[&str],
    fields: &[(&str, Type)],
    methods: Vec<MethodDecl>,
) -> (Program, SymbolTable) {
    let mut table = SymbolTable::new("Main");
    for (name, ty) in fields {
        table.add_field(Symbol::new(*name, ty.clone()));
    }
    for m in &methods {
        table.add_method(
            &m.name,
            MethodFacts {
                return_ty: m.return_ty.clone(),
                params: m
                    .params
                    .iter()
                    .map(|p| Symbol::new(&p.name, p.ty.clone()))
                    .collect(),
                locals: m
                    .locals
                    .iter()
                    .map(|l| Symbol::new(&l.name, l.ty.clone()))
                    .collect(),
            },
        );
    }

    let program = Program {
        imports: imports
            .iter()
            .map(|i| ImportDecl::new(i.split('.').map(str::to_string).collect(), sp()))
            .collect(),
        class: ClassDecl {
            name: "Main".to_string(),
            super_class: None,
            fields: fields
                .iter()
                .map(|(n, t)| VarDecl::new(*n, t.clone(), sp()))
                .collect(),
            methods,
            span: sp(),
        },
    };
    (program, table)
}

#[test]
fn test_unit_has_constructor_plus_methods() {
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl("go", false, &[], Type::void(), &[], vec![])],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    assert_eq!(unit.methods.len(), 2);
    assert!(unit.methods[0].is_constructor);
    assert_eq!(unit.methods[1].name, "go");
}

#[test]
fn test_void_method_gets_implicit_return() {
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[("x", Type::int())],
            vec![assign("x", int(1))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();
    assert!(matches!(go.instrs.last(), Some(Instr::Return { value: None })));
}

#[test]
fn test_field_read_materializes_through_field_get() {
    // int bump() { return count + 1; }  with field count
    let (program, table) = build_program(
        &[],
        &[("count", Type::int())],
        vec![method_decl(
            "bump",
            false,
            &[],
            Type::int(),
            &[],
            vec![ret(bin(BinaryOp::Add, var("count"), int(1)))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let bump = unit.method("bump").unwrap();
    assert!(matches!(
        &bump.instrs[0],
        Instr::FieldGet { field, .. } if field.name == "count"
    ));
    assert!(matches!(&bump.instrs[1], Instr::BinaryOp { .. }));
}

#[test]
fn test_field_write_lowers_to_field_put() {
    let (program, table) = build_program(
        &[],
        &[("count", Type::int())],
        vec![method_decl(
            "reset",
            false,
            &[],
            Type::void(),
            &[],
            vec![assign("count", int(0))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let reset = unit.method("reset").unwrap();
    assert!(matches!(
        &reset.instrs[0],
        Instr::FieldPut { field, .. } if field.name == "count"
    ));
}

#[test]
fn test_local_shadows_field() {
    let (program, table) = build_program(
        &[],
        &[("x", Type::int())],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[("x", Type::int())],
            vec![assign("x", int(3))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();
    assert!(matches!(&go.instrs[0], Instr::Assign { .. }));
}

#[test]
fn test_import_receiver_calls_static() {
    // io.println(1);
    let (program, table) = build_program(
        &["io"],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[],
            vec![stmt(StmtKind::Expr(call(var("io"), "println", vec![int(1)])))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();
    match &go.instrs[0] {
        Instr::Call {
            kind: CallKind::Static,
            target: CallTarget::Class(class),
            dest: None,
            ..
        } => assert_eq!(class, "io"),
        other => panic!("expected a static call, got {:?}", other),
    }
}

#[test]
fn test_qualified_import_binds_its_last_segment() {
    // import java.io; ... io.println(1);
    let (program, table) = build_program(
        &["java.io"],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[],
            vec![stmt(StmtKind::Expr(call(var("io"), "println", vec![int(1)])))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();

    // The unit keeps the qualified name; calls resolve through the simple
    // name the import binds.
    assert_eq!(unit.imports, vec!["java.io".to_string()]);
    assert!(unit.pretty_print().contains("; import java.io"));
    let go = unit.method("go").unwrap();
    assert!(matches!(
        &go.instrs[0],
        Instr::Call {
            kind: CallKind::Static,
            target: CallTarget::Class(class),
            ..
        } if class == "io"
    ));
}

#[test]
fn test_array_load_temp_takes_element_type() {
    // int get(int[] xs) { return xs[0]; }
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "get",
            false,
            &[("xs", Type::int_array())],
            Type::int(),
            &[],
            vec![ret(expr(ExprKind::ArrayAccess {
                array: Box::new(var("xs")),
                index: Box::new(int(0)),
            }))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let get = unit.method("get").unwrap();
    match &get.instrs[0] {
        Instr::ArrayLoad { dest, .. } => assert_eq!(dest.ty, Type::int()),
        other => panic!("expected an array load, got {:?}", other),
    }
}

#[test]
fn test_own_method_call_uses_declared_return_type() {
    // int twice(int n) { return n + n; }  int go() { return this.twice(2); }
    let (program, table) = build_program(
        &[],
        &[],
        vec![
            method_decl(
                "twice",
                false,
                &[("n", Type::int())],
                Type::int(),
                &[],
                vec![ret(bin(BinaryOp::Add, var("n"), var("n")))],
            ),
            method_decl(
                "go",
                false,
                &[],
                Type::int(),
                &[],
                vec![ret(call(expr(ExprKind::This), "twice", vec![int(2)]))],
            ),
        ],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();
    match &go.instrs[0] {
        Instr::Call {
            kind: CallKind::Virtual,
            return_ty,
            dest: Some(_),
            ..
        } => assert_eq!(*return_ty, Type::int()),
        other => panic!("expected a virtual call, got {:?}", other),
    }
}

#[test]
fn test_unknown_method_on_own_class_fails() {
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::int(),
            &[],
            vec![ret(call(expr(ExprKind::This), "missing", vec![]))],
        )],
    );
    let err = Lowerer::new(&table).lower_program(&program).unwrap_err();
    assert!(matches!(err, CompileError::UnknownMethod { name, .. } if name == "missing"));
}

#[test]
fn test_undefined_variable_fails() {
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[],
            vec![assign("ghost", int(1))],
        )],
    );
    let err = Lowerer::new(&table).lower_program(&program).unwrap_err();
    assert!(matches!(err, CompileError::UndefinedVariable { name, .. } if name == "ghost"));
}

#[test]
fn test_while_shape() {
    // while (i < 10) i = i + 1;
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[("i", Type::int())],
            vec![stmt(StmtKind::While {
                cond: bin(BinaryOp::Lt, var("i"), int(10)),
                body: Box::new(assign("i", bin(BinaryOp::Add, var("i"), int(1)))),
            })],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();

    assert!(go.has_label("cond0"));
    assert!(go.has_label("body0"));
    assert!(go.has_label("endwhile0"));

    // Condition branches straight on the comparison.
    match &go.instrs[0] {
        Instr::CondGoto {
            cond: Cond::Cmp { op, .. },
            label,
        } => {
            assert_eq!(*op, BinaryOp::Lt);
            assert_eq!(label, "body0");
        }
        other => panic!("expected a compare branch, got {:?}", other),
    }
    // The body jumps back to the condition.
    assert!(go
        .instrs
        .iter()
        .any(|i| matches!(i, Instr::Goto { label } if label == "cond0")));
}

#[test]
fn test_if_else_arms_are_exclusive() {
    // if (flag) x = 1; else x = 2;
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[("flag", Type::boolean())],
            Type::void(),
            &[("x", Type::int())],
            vec![stmt(StmtKind::If {
                cond: var("flag"),
                then_branch: Box::new(assign("x", int(1))),
                else_branch: Some(Box::new(assign("x", int(2)))),
            })],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();

    // Branch to then arm, else arm on fall-through, jump over then arm.
    assert!(matches!(
        &go.instrs[0],
        Instr::CondGoto { label, .. } if label == "then0"
    ));
    assert!(matches!(
        &go.instrs[1],
        Instr::Assign { value: Operand::Lit(lit), .. } if lit.value == 2
    ));
    assert!(matches!(
        &go.instrs[2],
        Instr::Goto { label } if label == "endif0"
    ));
    assert!(matches!(
        &go.instrs[3],
        Instr::Assign { value: Operand::Lit(lit), .. } if lit.value == 1
    ));
    let then_pos = go
        .labels()
        .iter()
        .find(|(name, _)| name == "then0")
        .map(|(_, p)| *p)
        .unwrap();
    assert_eq!(then_pos, 3);
}

#[test]
fn test_else_if_chain_flattens_to_shared_end() {
    // if (a < 1) x = 1; else if (a < 2) x = 2; else x = 3;
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[("a", Type::int())],
            Type::void(),
            &[("x", Type::int())],
            vec![stmt(StmtKind::If {
                cond: bin(BinaryOp::Lt, var("a"), int(1)),
                then_branch: Box::new(assign("x", int(1))),
                else_branch: Some(Box::new(stmt(StmtKind::If {
                    cond: bin(BinaryOp::Lt, var("a"), int(2)),
                    then_branch: Box::new(assign("x", int(2))),
                    else_branch: Some(Box::new(assign("x", int(3)))),
                }))),
            })],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();

    // The dispatch runs top to bottom, one branch per arm, then the final
    // else on the fall-through path.
    assert!(matches!(
        &go.instrs[0],
        Instr::CondGoto { label, .. } if label == "then0"
    ));
    assert!(matches!(
        &go.instrs[1],
        Instr::CondGoto { label, .. } if label == "then1"
    ));
    assert!(matches!(
        &go.instrs[2],
        Instr::Assign { value: Operand::Lit(lit), .. } if lit.value == 3
    ));

    // Every arm ends at the one shared end label.
    let end_jumps = go
        .instrs
        .iter()
        .filter(|i| matches!(i, Instr::Goto { label } if label == "endif0"))
        .count();
    assert_eq!(end_jumps, 3);
    let end_bindings = go
        .labels()
        .iter()
        .filter(|(name, _)| name.starts_with("endif"))
        .count();
    assert_eq!(end_bindings, 1);
}

#[test]
fn test_or_true_path_skips_result_write() {
    // b = x || y; the left-true path jumps to the end without writing the
    // result temporary.
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[("x", Type::boolean()), ("y", Type::boolean())],
            Type::void(),
            &[("b", Type::boolean())],
            vec![assign("b", bin(BinaryOp::Or, var("x"), var("y")))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();

    // First branch goes straight to the end label.
    match &go.instrs[0] {
        Instr::CondGoto {
            cond: Cond::Bool(Operand::Var(v)),
            label,
        } => {
            assert_eq!(v.name, "x");
            assert_eq!(label, "endif0");
        }
        other => panic!("expected a branch on x, got {:?}", other),
    }
    // No assignment precedes it.
    assert!(!matches!(&go.instrs[0], Instr::Assign { .. }));
}

#[test]
fn test_and_right_side_only_behind_branch() {
    // b = flag && this.check();
    let (program, table) = build_program(
        &[],
        &[],
        vec![
            method_decl(
                "check",
                false,
                &[],
                Type::boolean(),
                &[],
                vec![ret(expr(ExprKind::Bool(true)))],
            ),
            method_decl(
                "go",
                false,
                &[("flag", Type::boolean())],
                Type::void(),
                &[("b", Type::boolean())],
                vec![assign(
                    "b",
                    bin(
                        BinaryOp::And,
                        var("flag"),
                        call(expr(ExprKind::This), "check", vec![]),
                    ),
                )],
            ),
        ],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();

    let call_pos = go
        .instrs
        .iter()
        .position(|i| matches!(i, Instr::Call { .. }))
        .expect("call lowered");
    let then_pos = go
        .labels()
        .iter()
        .find(|(name, _)| name == "then0")
        .map(|(_, p)| *p)
        .unwrap();
    // The call sits at or after the branch target, never on the
    // fall-through false path.
    assert!(call_pos >= then_pos);
    let goto_end = go
        .instrs
        .iter()
        .position(|i| matches!(i, Instr::Goto { label } if label == "endif0"))
        .unwrap();
    assert!(goto_end < then_pos);
}

#[test]
fn test_array_literal_fills_elements() {
    // a = [7, 8];
    let (program, table) = build_program(
        &[],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[("a", Type::int_array())],
            vec![assign(
                "a",
                expr(ExprKind::ArrayLit {
                    elements: vec![int(7), int(8)],
                }),
            )],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();
    assert!(matches!(
        &go.instrs[0],
        Instr::NewArray { len: Operand::Lit(lit), .. } if lit.value == 2
    ));
    let stores = go
        .instrs
        .iter()
        .filter(|i| matches!(i, Instr::Assign { dest: Operand::ArrayElem(_), .. }))
        .count();
    assert_eq!(stores, 2);
}

#[test]
fn test_new_object_then_constructor_call() {
    let (program, table) = build_program(
        &["Point"],
        &[],
        vec![method_decl(
            "go",
            false,
            &[],
            Type::void(),
            &[("p", Type::class("Point"))],
            vec![assign("p", expr(ExprKind::NewObject { class: "Point".to_string() }))],
        )],
    );
    let unit = Lowerer::new(&table).lower_program(&program).unwrap();
    let go = unit.method("go").unwrap();
    assert!(matches!(&go.instrs[0], Instr::NewObject { class, .. } if class == "Point"));
    assert!(matches!(
        &go.instrs[1],
        Instr::Call { kind: CallKind::Special, method, .. } if method == "<init>"
    ));
}
