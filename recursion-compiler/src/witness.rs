//! Witness binding.
//!
//! Each witness entry becomes a circuit variable the first time a program
//! binds it; later bindings of the same index reuse that variable. Entries
//! the program never binds are never allocated, and nothing is sized from
//! an index.

use crate::backend::{BackendError, CircuitBuilder};
use recursion_ir::{BabyBear, BabyBearExt4, Domain, NativeLiteral, Witness};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("{domain} witness index {index} out of range (length {len})")]
    OutOfRange {
        domain: Domain,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Where bound witness values come from
#[derive(Debug, Clone, Copy)]
pub enum WitnessSource<'w> {
    /// Concrete values; binding an index past the end is an error
    Values(&'w Witness),
    /// No values. Any index binds a fresh variable carrying zero, so the
    /// constraint structure can be built without knowing witness lengths.
    Unassigned,
}

impl<'w> From<&'w Witness> for WitnessSource<'w> {
    fn from(witness: &'w Witness) -> Self {
        WitnessSource::Values(witness)
    }
}

impl WitnessSource<'_> {
    pub fn vkey_hash(&self) -> NativeLiteral {
        match self {
            WitnessSource::Values(w) => w.vkey_hash.clone(),
            WitnessSource::Unassigned => NativeLiteral::zero(),
        }
    }

    pub fn committed_values_digest(&self) -> NativeLiteral {
        match self {
            WitnessSource::Values(w) => w.committed_values_digest.clone(),
            WitnessSource::Unassigned => NativeLiteral::zero(),
        }
    }
}

/// Lazily allocated witness variables for one compilation, keyed by index
pub struct WitnessBinder<'w, B: CircuitBuilder> {
    source: WitnessSource<'w>,
    vars: HashMap<usize, B::Var>,
    felts: HashMap<usize, B::Felt>,
    exts: HashMap<usize, B::Ext>,
}

impl<'w, B: CircuitBuilder> WitnessBinder<'w, B> {
    pub fn new(source: WitnessSource<'w>) -> Self {
        Self {
            source,
            vars: HashMap::new(),
            felts: HashMap::new(),
            exts: HashMap::new(),
        }
    }

    pub fn var(&mut self, builder: &mut B, index: usize) -> Result<B::Var, BindError> {
        let value = match self.source {
            WitnessSource::Values(w) => lookup(&w.vars, Domain::Var, index)?.clone(),
            WitnessSource::Unassigned => NativeLiteral::zero(),
        };
        bind(&mut self.vars, index, || builder.witness_var(&value))
    }

    pub fn felt(&mut self, builder: &mut B, index: usize) -> Result<B::Felt, BindError> {
        let value = match self.source {
            WitnessSource::Values(w) => *lookup(&w.felts, Domain::Felt, index)?,
            WitnessSource::Unassigned => BabyBear::ZERO,
        };
        bind(&mut self.felts, index, || builder.witness_felt(value))
    }

    pub fn ext(&mut self, builder: &mut B, index: usize) -> Result<B::Ext, BindError> {
        let value = match self.source {
            WitnessSource::Values(w) => *lookup(&w.exts, Domain::Ext, index)?,
            WitnessSource::Unassigned => BabyBearExt4::ZERO,
        };
        bind(&mut self.exts, index, || builder.witness_ext(value))
    }

    /// Number of distinct entries allocated so far
    pub fn allocated(&self) -> usize {
        self.vars.len() + self.felts.len() + self.exts.len()
    }
}

fn lookup<T>(values: &[T], domain: Domain, index: usize) -> Result<&T, BindError> {
    values.get(index).ok_or(BindError::OutOfRange {
        domain,
        index,
        len: values.len(),
    })
}

fn bind<T: Clone>(
    slots: &mut HashMap<usize, T>,
    index: usize,
    alloc: impl FnOnce() -> Result<T, BackendError>,
) -> Result<T, BindError> {
    if let Some(existing) = slots.get(&index) {
        return Ok(existing.clone());
    }
    let value = alloc()?;
    slots.insert(index, value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileMode;
    use crate::r1cs::{poseidon2::Poseidon2Params, R1csBuilder};
    use recursion_ir::WitnessShape;

    fn witness() -> Witness {
        let mut w = Witness::placeholder(WitnessShape {
            vars: 3,
            felts: 1,
            exts: 0,
        });
        w.vars[1] = NativeLiteral::from(42);
        w.felts[0] = BabyBear::new(9);
        w
    }

    #[test]
    fn test_out_of_range() {
        let w = witness();
        let mut builder = R1csBuilder::new(CompileMode::Prove, Poseidon2Params::default());
        let mut binder = WitnessBinder::new(WitnessSource::from(&w));
        let err = binder.var(&mut builder, 99).unwrap_err();
        assert!(matches!(
            err,
            BindError::OutOfRange { domain: Domain::Var, index: 99, len: 3 }
        ));
        assert!(binder.ext(&mut builder, 0).is_err());
        assert_eq!(binder.allocated(), 0);
    }

    #[test]
    fn test_rebinding_reuses_variable() {
        let w = witness();
        let mut builder = R1csBuilder::new(CompileMode::Prove, Poseidon2Params::default());
        let mut binder = WitnessBinder::new(WitnessSource::from(&w));
        let a = binder.var(&mut builder, 1).unwrap();
        let before = builder.cs().num_witness_variables();
        let b = binder.var(&mut builder, 1).unwrap();
        assert_eq!(builder.cs().num_witness_variables(), before);
        assert_eq!(builder.var_value(&a), builder.var_value(&b));
        assert_eq!(builder.var_value(&a).as_deref(), Some("42"));

        let f = binder.felt(&mut builder, 0).unwrap();
        assert_eq!(builder.felt_value(&f), Some(BabyBear::new(9)));
        assert_eq!(binder.allocated(), 2);
    }

    #[test]
    fn test_unassigned_binds_any_index() {
        let mut builder = R1csBuilder::new(CompileMode::Shape, Poseidon2Params::default());
        let mut binder = WitnessBinder::new(WitnessSource::Unassigned);
        let a = binder.var(&mut builder, usize::MAX).unwrap();
        let b = binder.var(&mut builder, usize::MAX).unwrap();
        binder.felt(&mut builder, u32::MAX as usize).unwrap();
        binder.ext(&mut builder, 0).unwrap();
        assert_eq!(builder.var_value(&a), builder.var_value(&b));
        assert_eq!(binder.allocated(), 3);
        assert_eq!(WitnessSource::Unassigned.vkey_hash(), NativeLiteral::zero());
    }
}
