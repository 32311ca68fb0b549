//! The Symbol Table: a lexically-scoped stack of maps from name to binding.
//!
//! Scopes are bracketed: [`SymbolTable::enter_scope`] pushes a fresh map,
//! [`SymbolTable::exit_scope`] discards it unconditionally. Nothing leaks
//! across scope boundaries, including on a path where a nested analyzer has
//! already pushed diagnostics — the caller is expected to pair enter/exit
//! regardless of what happened in between.

use std::collections::HashMap;

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Val,
    Mut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Initialized,
    Deferred,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub declared_type: Type,
    pub mutability: Mutability,
    pub init_state: InitState,
}

/// Failure modes for the two mutating operations on the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    Redeclaration,
    Undefined,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Number of open scopes; used by analysis-completeness tests to assert
    /// the table is balanced after a full program walk.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn declare(
        &mut self,
        name: impl Into<String>,
        declared_type: Type,
        mutability: Mutability,
        init_state: InitState,
    ) -> Result<(), SymbolError> {
        let name = name.into();
        let scope = self.scopes.last_mut().expect("declare called outside any scope");
        if scope.contains_key(&name) {
            return Err(SymbolError::Redeclaration);
        }
        scope.insert(
            name.clone(),
            Symbol { name, declared_type, mutability, init_state },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Symbol, SymbolError> {
        for scope in self.scopes.iter().rev() {
            if let Some(symbol) = scope.get(name) {
                return Ok(symbol);
            }
        }
        Err(SymbolError::Undefined)
    }

    pub fn mark_initialized(&mut self, name: &str) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(symbol) = scope.get_mut(name) {
                symbol.init_state = InitState::Initialized;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_sees_parent_scope() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.declare("x", Type::I32, Mutability::Val, InitState::Initialized).unwrap();
        table.enter_scope();
        assert!(table.lookup("x").is_ok());
        table.exit_scope();
        table.exit_scope();
    }

    #[test]
    fn exit_scope_discards_shadowed_bindings() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.declare("x", Type::I32, Mutability::Val, InitState::Initialized).unwrap();
        table.enter_scope();
        table.declare("x", Type::F64, Mutability::Val, InitState::Initialized).unwrap();
        table.exit_scope();
        assert_eq!(table.lookup("x").unwrap().declared_type, Type::I32);
        table.exit_scope();
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.declare("x", Type::I32, Mutability::Val, InitState::Initialized).unwrap();
        let err = table.declare("x", Type::I32, Mutability::Val, InitState::Initialized).unwrap_err();
        assert_eq!(err, SymbolError::Redeclaration);
    }

    #[test]
    fn lookup_miss_is_undefined() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        assert_eq!(table.lookup("nope").unwrap_err(), SymbolError::Undefined);
    }

    #[test]
    fn mark_initialized_flips_deferred_symbol() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.declare("v", Type::I32, Mutability::Mut, InitState::Deferred).unwrap();
        table.mark_initialized("v");
        assert_eq!(table.lookup("v").unwrap().init_state, InitState::Initialized);
    }

    #[test]
    fn depth_tracks_open_scopes() {
        let mut table = SymbolTable::new();
        assert_eq!(table.depth(), 0);
        table.enter_scope();
        table.enter_scope();
        assert_eq!(table.depth(), 2);
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.depth(), 0);
    }
}
