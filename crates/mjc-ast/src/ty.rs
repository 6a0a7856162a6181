//! Structural types.
//!
//! Types are plain values compared structurally: a base name plus an array
//! flag. The backend never parses type information out of strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Base type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeName {
    Int,
    Boolean,
    Void,
    String,
    /// A user-declared or imported reference type.
    Class(std::string::String),
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Boolean => write!(f, "boolean"),
            TypeName::Void => write!(f, "void"),
            TypeName::String => write!(f, "String"),
            TypeName::Class(name) => write!(f, "{}", name),
        }
    }
}

/// A structural type: base name plus array flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub name: TypeName,
    pub is_array: bool,
}

impl Type {
    pub fn new(name: TypeName, is_array: bool) -> Self {
        Self { name, is_array }
    }

    pub fn int() -> Self {
        Self::new(TypeName::Int, false)
    }

    pub fn boolean() -> Self {
        Self::new(TypeName::Boolean, false)
    }

    pub fn void() -> Self {
        Self::new(TypeName::Void, false)
    }

    pub fn string() -> Self {
        Self::new(TypeName::String, false)
    }

    pub fn int_array() -> Self {
        Self::new(TypeName::Int, true)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeName::Class(name.into()), false)
    }

    /// Element type of an array type.
    pub fn element(&self) -> Type {
        Type::new(self.name.clone(), false)
    }

    /// Whether values of this type live in the integer register family on
    /// the target (int and boolean, non-array).
    pub fn is_integral(&self) -> bool {
        !self.is_array && matches!(self.name, TypeName::Int | TypeName::Boolean)
    }

    /// Whether values of this type are object references on the target.
    pub fn is_reference(&self) -> bool {
        !self.is_integral() && self.name != TypeName::Void
    }

    pub fn is_void(&self) -> bool {
        !self.is_array && self.name == TypeName::Void
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
