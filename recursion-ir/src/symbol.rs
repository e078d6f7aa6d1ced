//! Per-domain symbol interning.
//!
//! Names are interned once at decode time into dense indices so the compiler
//! can back each environment with a plain vector. The three domains are
//! disjoint: `"x"` as a var and `"x"` as a felt are unrelated symbols.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Operand domain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    /// Native proof-system field
    Var,
    /// BabyBear felt
    Felt,
    /// Degree-4 extension
    Ext,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Var => "var",
            Domain::Felt => "felt",
            Domain::Ext => "ext",
        };
        write!(f, "{}", name)
    }
}

macro_rules! symbol_id {
    ($(#[$meta:meta])* $name:ident, $domain:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            pub const DOMAIN: Domain = $domain;

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<$name> for Operand {
            fn from(id: $name) -> Operand {
                Operand { domain: $domain, index: id.0 }
            }
        }
    };
}

symbol_id!(
    /// Interned native symbol
    VarId,
    Domain::Var
);
symbol_id!(
    /// Interned felt symbol
    FeltId,
    Domain::Felt
);
symbol_id!(
    /// Interned extension symbol
    ExtId,
    Domain::Ext
);

/// A symbol reference in any domain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Operand {
    pub domain: Domain,
    pub index: u32,
}

/// Name ↔ index table for one domain
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning its existing index if already present
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len() as u32;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    pub fn name(&self, index: u32) -> &str {
        self.names
            .get(index as usize)
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The three symbol tables of a program
#[derive(Debug, Clone, Default)]
pub struct Symbols {
    pub vars: SymbolTable,
    pub felts: SymbolTable,
    pub exts: SymbolTable,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn var(&mut self, name: &str) -> VarId {
        VarId::new(self.vars.intern(name))
    }

    pub fn felt(&mut self, name: &str) -> FeltId {
        FeltId::new(self.felts.intern(name))
    }

    pub fn ext(&mut self, name: &str) -> ExtId {
        ExtId::new(self.exts.intern(name))
    }

    pub fn table(&self, domain: Domain) -> &SymbolTable {
        match domain {
            Domain::Var => &self.vars,
            Domain::Felt => &self.felts,
            Domain::Ext => &self.exts,
        }
    }

    /// Source name of an operand
    pub fn name(&self, operand: Operand) -> &str {
        self.table(operand.domain).name(operand.index)
    }
}
