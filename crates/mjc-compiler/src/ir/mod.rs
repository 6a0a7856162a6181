//! Three-address intermediate representation.
//!
//! One [`ClassUnit`] per compilation unit, holding one [`Method`] per source
//! method plus the implicit constructor. A method body is a flat instruction
//! vector; control flow is labels and jumps, with labels bound to instruction
//! positions rather than stored inline.

mod instr;
mod pretty;
mod value;

pub use instr::{CallKind, CallTarget, Cond, Instr};
pub use pretty::PrettyPrint;
pub use value::{ArrayElem, Literal, Operand, Var};

use mjc_ast::{Symbol, Type};

/// A lowered method body.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub is_constructor: bool,
    pub params: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    pub return_ty: Type,
    pub instrs: Vec<Instr>,
    /// Label bindings in insertion order. A label bound at `instrs.len()`
    /// at the time of binding attaches to the next instruction pushed, or
    /// trails the body if none follows.
    labels: Vec<(String, usize)>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        is_static: bool,
        params: Vec<Symbol>,
        locals: Vec<Symbol>,
        return_ty: Type,
    ) -> Self {
        Self {
            name: name.into(),
            is_public: true,
            is_static,
            is_constructor: false,
            params,
            locals,
            return_ty,
            instrs: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// The implicit no-argument constructor, delegating to the superclass.
    pub fn constructor() -> Self {
        let mut method = Method::new("<init>", false, Vec::new(), Vec::new(), Type::void());
        method.is_constructor = true;
        method
    }

    pub fn push(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    /// Binds `label` to the current end of the body, so it attaches to
    /// whatever instruction is pushed next.
    pub fn bind_label(&mut self, label: impl Into<String>) {
        self.labels.push((label.into(), self.instrs.len()));
    }

    /// Labels bound at instruction position `pos`, in binding order.
    pub fn labels_at(&self, pos: usize) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(move |(_, p)| *p == pos)
            .map(|(name, _)| name.as_str())
    }

    pub fn labels(&self) -> &[(String, usize)] {
        &self.labels
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|(name, _)| name == label)
    }

    /// Whether an instruction position carries a label binding. Peephole
    /// fusions must not merge across such a position.
    pub fn is_label_boundary(&self, pos: usize) -> bool {
        self.labels.iter().any(|(_, p)| *p == pos)
    }
}

/// A lowered compilation unit: the class shape plus every method body.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassUnit {
    pub class_name: String,
    pub super_class: Option<String>,
    pub fields: Vec<Symbol>,
    pub imports: Vec<String>,
    pub methods: Vec<Method>,
}

impl ClassUnit {
    /// The superclass name, defaulting to `java/lang/Object`.
    pub fn super_name(&self) -> &str {
        self.super_class.as_deref().unwrap_or("java/lang/Object")
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}
