//! Scoped name resolution for the semantic analyzer.
//!
//! A flat stack of scopes, innermost last. There is no need for a tree
//! of scopes here — the analyzer is a single recursive walk, so a scope
//! is live for exactly the duration of the subtree that opened it and a
//! stack captures that precisely.

use rustc_hash::FxHashSet;

use crate::config::MINIMUM_LIKELY_LOCALS;

pub struct SymbolTable {
    scopes: Vec<FxHashSet<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![FxHashSet::with_capacity_and_hasher(MINIMUM_LIKELY_LOCALS, Default::default())],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declares `name` in the innermost scope. Returns `false` if the name
    /// was already declared there (a redefinition); the enclosing scopes
    /// are not consulted — shadowing an outer declaration is allowed.
    pub fn declare(&mut self, name: &str) -> bool {
        self.scopes
            .last_mut()
            .expect("symbol table always has at least one scope")
            .insert(name.to_string())
    }

    /// True if `name` is visible from the current scope or any enclosing one.
    pub fn is_visible(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
