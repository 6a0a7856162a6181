//! Symbol facts.
//!
//! The read-only output of semantic analysis: class shape and per-method
//! signatures. Imports live on the [`Program`](crate::Program) itself. The
//! backend queries these facts but never mutates them. The facts are plain
//! data and serialize cleanly, since the frontend producing them may live
//! in a separate process.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ty::Type;

/// A name/type pair: field, parameter, or local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Per-method facts: signature plus declared locals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodFacts {
    pub return_ty: Type,
    pub params: Vec<Symbol>,
    pub locals: Vec<Symbol>,
}

/// Symbol table for one compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    class_name: String,
    super_class: Option<String>,
    fields: Vec<Symbol>,
    /// Method names in declaration order.
    methods: Vec<String>,
    facts: FxHashMap<String, MethodFacts>,
}

impl SymbolTable {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            super_class: None,
            fields: Vec::new(),
            methods: Vec::new(),
            facts: FxHashMap::default(),
        }
    }

    pub fn set_super_class(&mut self, name: impl Into<String>) {
        self.super_class = Some(name.into());
    }

    pub fn add_field(&mut self, field: Symbol) {
        self.fields.push(field);
    }

    pub fn add_method(&mut self, name: impl Into<String>, facts: MethodFacts) {
        let name = name.into();
        self.methods.push(name.clone());
        self.facts.insert(name, facts);
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_deref()
    }

    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.facts.get(method).map(|f| &f.return_ty)
    }

    pub fn parameters(&self, method: &str) -> &[Symbol] {
        self.facts.get(method).map(|f| f.params.as_slice()).unwrap_or(&[])
    }

    pub fn locals(&self, method: &str) -> &[Symbol] {
        self.facts.get(method).map(|f| f.locals.as_slice()).unwrap_or(&[])
    }

    pub fn declares_method(&self, method: &str) -> bool {
        self.facts.contains_key(method)
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks a name up in a method's scope: parameter first, then local.
    pub fn param_or_local(&self, method: &str, name: &str) -> Option<&Symbol> {
        self.parameters(method)
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.locals(method).iter().find(|l| l.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> SymbolTable {
        let mut table = SymbolTable::new("Sample");
        table.set_super_class("Base");
        table.add_field(Symbol::new("counter", Type::int()));
        table.add_method(
            "step",
            MethodFacts {
                return_ty: Type::int(),
                params: vec![Symbol::new("amount", Type::int())],
                locals: vec![Symbol::new("next", Type::int())],
            },
        );
        table
    }

    #[test]
    fn test_lookup_order() {
        let table = sample_table();
        assert_eq!(
            table.param_or_local("step", "amount").map(|s| &s.ty),
            Some(&Type::int())
        );
        assert!(table.param_or_local("step", "counter").is_none());
        assert!(table.field("counter").is_some());
    }

    #[test]
    fn test_declared_methods() {
        let table = sample_table();
        assert!(table.declares_method("step"));
        assert!(!table.declares_method("counter"));
        assert_eq!(table.methods(), &["step".to_string()]);
    }

    #[test]
    fn test_serde_round_trip() {
        let table = sample_table();
        let json = serde_json::to_string(&table).expect("serialize");
        let back: SymbolTable = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(table, back);
    }
}
