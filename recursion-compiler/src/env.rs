//! Typed symbol environments.
//!
//! One dense store per domain, indexed by the ids interned at decode time.
//! A slot is empty until the symbol is first defined; reading an empty slot
//! yields `None` and never a default value.

use crate::backend::CircuitBuilder;
use recursion_ir::{ExtId, FeltId, Symbols, VarId};

/// Id-addressed store of handles for one domain
#[derive(Debug, Clone)]
pub struct Environment<T> {
    slots: Vec<Option<T>>,
}

impl<T> Environment<T> {
    pub fn with_capacity(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self { slots }
    }

    /// Bind `index`, overwriting any earlier binding
    pub fn define(&mut self, index: usize, value: T) {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(value);
    }

    pub fn resolve(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }
}

/// The three environments of one compilation
pub struct Environments<B: CircuitBuilder> {
    pub vars: Environment<B::Var>,
    pub felts: Environment<B::Felt>,
    pub exts: Environment<B::Ext>,
}

impl<B: CircuitBuilder> Environments<B> {
    /// Empty environments sized for a program's symbol tables
    pub fn new(symbols: &Symbols) -> Self {
        Self {
            vars: Environment::with_capacity(symbols.vars.len()),
            felts: Environment::with_capacity(symbols.felts.len()),
            exts: Environment::with_capacity(symbols.exts.len()),
        }
    }

    pub fn var(&self, id: VarId) -> Option<&B::Var> {
        self.vars.resolve(id.index())
    }

    pub fn felt(&self, id: FeltId) -> Option<&B::Felt> {
        self.felts.resolve(id.index())
    }

    pub fn ext(&self, id: ExtId) -> Option<&B::Ext> {
        self.exts.resolve(id.index())
    }

    pub fn define_var(&mut self, id: VarId, value: B::Var) {
        self.vars.define(id.index(), value);
    }

    pub fn define_felt(&mut self, id: FeltId, value: B::Felt) {
        self.felts.define(id.index(), value);
    }

    pub fn define_ext(&mut self, id: ExtId, value: B::Ext) {
        self.exts.define(id.index(), value);
    }
}
