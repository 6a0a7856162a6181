//! AST to IR lowering
//!
//! Converts the type-checked AST into flat three-address code, one
//! [`Method`] per source method plus the implicit constructor. Temporaries
//! and label numbers come from counters scoped to the compilation unit, so
//! every name in the lowered output is unique across the whole class.

mod expr;
mod stmt;

use mjc_ast::{Program, Span, Symbol, SymbolTable, Type};
use rustc_hash::FxHashSet;

use crate::error::{CompileError, CompileResult};
use crate::ir::{CallKind, CallTarget, ClassUnit, Instr, Method, Operand, Var};

/// Where a bare name resolves inside the current method.
enum NamePlace<'t> {
    /// A parameter or declared local; lives in a register slot.
    Slot(&'t Symbol),
    /// A field of the enclosing class; reads and writes go through
    /// explicit field instructions.
    Field(&'t Symbol),
    /// An imported class name; only meaningful as a call receiver.
    Import,
}

/// AST to IR lowerer for one compilation unit.
pub struct Lowerer<'a> {
    table: &'a SymbolTable,
    /// Simple names bound by the program's import declarations.
    imports: FxHashSet<String>,
    /// Name of the method currently being lowered.
    method_name: String,
    next_temp: u32,
    next_label: u32,
}

impl<'a> Lowerer<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            imports: FxHashSet::default(),
            method_name: String::new(),
            next_temp: 0,
            next_label: 0,
        }
    }

    /// Lowers a whole program to a [`ClassUnit`]. Fails on the first
    /// unsupported or unresolved construct; no partial unit is produced.
    pub fn lower_program(&mut self, program: &Program) -> CompileResult<ClassUnit> {
        self.imports = program
            .imports
            .iter()
            .map(|import| import.base_name().to_string())
            .collect();

        let mut methods = Vec::with_capacity(program.class.methods.len() + 1);
        methods.push(self.build_constructor());

        for decl in &program.class.methods {
            methods.push(self.lower_method(decl)?);
        }

        Ok(ClassUnit {
            class_name: self.table.class_name().to_string(),
            super_class: self.table.super_class().map(str::to_string),
            fields: self.table.fields().to_vec(),
            imports: program.imports.iter().map(|i| i.path.join(".")).collect(),
            methods,
        })
    }

    /// The implicit no-argument constructor: delegate to the superclass
    /// constructor, then return.
    fn build_constructor(&self) -> Method {
        let mut ctor = Method::constructor();
        let this = Operand::var("this", Type::class(self.table.class_name()));
        ctor.push(Instr::Call {
            dest: None,
            kind: CallKind::Special,
            target: CallTarget::Object(this),
            method: "<init>".to_string(),
            args: Vec::new(),
            return_ty: Type::void(),
        });
        ctor.push(Instr::Return { value: None });
        ctor
    }

    fn lower_method(&mut self, decl: &mjc_ast::MethodDecl) -> CompileResult<Method> {
        self.method_name = decl.name.clone();

        let params = self.table.parameters(&decl.name).to_vec();
        let locals = self.table.locals(&decl.name).to_vec();
        let return_ty = self
            .table
            .return_type(&decl.name)
            .cloned()
            .unwrap_or_else(Type::void);

        let mut method = Method::new(&decl.name, decl.is_static, params, locals, return_ty);
        method.is_public = decl.is_public;
        for stmt in &decl.body {
            self.lower_stmt(stmt, &mut method)?;
        }

        // Void methods get an implicit trailing return.
        if method.return_ty.is_void() && !matches!(method.instrs.last(), Some(Instr::Return { .. }))
        {
            method.push(Instr::Return { value: None });
        }

        Ok(method)
    }

    /// Fresh compiler temporary of the given type.
    fn fresh_temp(&mut self, ty: Type) -> Var {
        let name = format!("tmp{}", self.next_temp);
        self.next_temp += 1;
        Var::new(name, ty)
    }

    /// Fresh label number; related labels of one construct share it.
    fn fresh_label_id(&mut self) -> u32 {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    /// Resolves a bare name in the current method's scope: parameter or
    /// local first, then class field, then imported class.
    fn resolve_name(&self, name: &str) -> Option<NamePlace<'a>> {
        if let Some(sym) = self.table.param_or_local(&self.method_name, name) {
            return Some(NamePlace::Slot(sym));
        }
        if let Some(sym) = self.table.field(name) {
            return Some(NamePlace::Field(sym));
        }
        if self.imports.contains(name) {
            return Some(NamePlace::Import);
        }
        None
    }

    /// Reads a named variable as an operand, materializing fields through
    /// a field-get temporary.
    fn read_var(&mut self, name: &str, span: Span, method: &mut Method) -> CompileResult<Operand> {
        match self.resolve_name(name) {
            Some(NamePlace::Slot(sym)) => Ok(Operand::var(&sym.name, sym.ty.clone())),
            Some(NamePlace::Field(sym)) => {
                let field = sym.clone();
                let dest = self.fresh_temp(field.ty.clone());
                method.push(Instr::FieldGet {
                    dest: dest.clone(),
                    field,
                });
                Ok(dest.into())
            }
            // An import name denotes a class, not a value.
            Some(NamePlace::Import) | None => Err(CompileError::UndefinedVariable {
                name: name.to_string(),
                span,
            }),
        }
    }

    /// The operand for `this` in the current class.
    fn this_operand(&self) -> Operand {
        Operand::var("this", Type::class(self.table.class_name()))
    }
}
