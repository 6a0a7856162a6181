//! IR operands.
//!
//! An operand is a typed value reference: a named variable (parameter,
//! local, or compiler temporary), an immediate, or an indexed array element.
//! Types travel as structured values; nothing is ever recovered by parsing
//! a name suffix. Fields never appear here, since lowering materializes
//! them through explicit field-get instructions first.

use std::fmt;

use mjc_ast::Type;

/// A named variable: parameter, local, or temporary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: String,
    pub ty: Type,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An immediate value. Booleans encode as 0/1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: i32,
    pub ty: Type,
}

impl Literal {
    pub fn int(value: i32) -> Self {
        Self {
            value,
            ty: Type::int(),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            value: value as i32,
            ty: Type::boolean(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// An indexed array element: base variable plus index operand.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElem {
    pub array: Var,
    pub index: Box<Operand>,
}

impl fmt::Display for ArrayElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.array, self.index)
    }
}

/// A typed value reference inside an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Lit(Literal),
    Var(Var),
    ArrayElem(ArrayElem),
}

impl Operand {
    pub fn int(value: i32) -> Self {
        Operand::Lit(Literal::int(value))
    }

    pub fn bool(value: bool) -> Self {
        Operand::Lit(Literal::bool(value))
    }

    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Operand::Var(Var::new(name, ty))
    }

    pub fn elem(array: Var, index: Operand) -> Self {
        Operand::ArrayElem(ArrayElem {
            array,
            index: Box::new(index),
        })
    }

    /// Static type of the value this operand produces. Array elements are
    /// always int in this language.
    pub fn ty(&self) -> Type {
        match self {
            Operand::Lit(lit) => lit.ty.clone(),
            Operand::Var(var) => var.ty.clone(),
            Operand::ArrayElem(_) => Type::int(),
        }
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Operand::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Operand::Lit(lit) => Some(lit),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Lit(lit) => write!(f, "{}", lit),
            Operand::Var(var) => write!(f, "{}", var),
            Operand::ArrayElem(elem) => write!(f, "{}", elem),
        }
    }
}

impl From<Var> for Operand {
    fn from(var: Var) -> Self {
        Operand::Var(var)
    }
}
