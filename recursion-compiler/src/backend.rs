//! Arithmetic backend capability.
//!
//! The interpreter never does field arithmetic itself. Every operation is
//! routed through a [`CircuitBuilder`], which owns the constraint system and
//! decides how each domain is represented.

use ark_relations::r1cs::SynthesisError;
use recursion_ir::{BabyBear, BabyBearExt4, NativeLiteral};
use thiserror::Error;

/// Order of bits returned by the decomposition operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Output 0 carries weight 2^0
    LsbFirst,
    /// Output 0 carries the highest weight
    MsbFirst,
}

impl BitOrder {
    /// Weight exponent of output `i` in a decomposition of `width` bits
    pub fn exponent(self, i: usize, width: usize) -> usize {
        match self {
            BitOrder::LsbFirst => i,
            BitOrder::MsbFirst => width - 1 - i,
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    ArithmeticFailure(String),

    #[error("bit width {width} exceeds the maximum of {max}")]
    BitWidth { width: usize, max: usize },

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Circuit-building operations over the three value domains.
///
/// `Var` is a native field element, `Felt` a BabyBear element and `Ext` an
/// element of the degree-4 extension. Operations on compile-time constants
/// should fold without emitting constraints; assertions must always be
/// recorded, even between constants, so that a false assertion compiles and
/// only fails when the witness is solved.
pub trait CircuitBuilder {
    type Var: Clone;
    type Felt: Clone;
    type Ext: Clone;

    /// Ordering of the outputs of [`Self::var_to_bits`] and [`Self::felt_to_bits`]
    const BIT_ORDER: BitOrder;

    /// Number of outputs of [`Self::felt_to_bits`]
    const FELT_BITS: usize;

    /// Widest accepted native decomposition
    const MAX_VAR_BITS: usize;

    // ========== Native ==========

    fn constant_var(&mut self, value: &NativeLiteral) -> BackendResult<Self::Var>;
    fn add_var(&mut self, a: &Self::Var, b: &Self::Var) -> BackendResult<Self::Var>;
    fn sub_var(&mut self, a: &Self::Var, b: &Self::Var) -> BackendResult<Self::Var>;
    fn mul_var(&mut self, a: &Self::Var, b: &Self::Var) -> BackendResult<Self::Var>;

    /// `a` when `cond` is one, `b` when it is zero
    fn select_var(
        &mut self,
        cond: &Self::Var,
        a: &Self::Var,
        b: &Self::Var,
    ) -> BackendResult<Self::Var>;

    fn assert_eq_var(&mut self, a: &Self::Var, b: &Self::Var) -> BackendResult<()>;

    /// Boolean-constrained decomposition of `value` into `width` bits
    fn var_to_bits(&mut self, value: &Self::Var, width: usize) -> BackendResult<Vec<Self::Var>>;

    // ========== Felt ==========

    fn constant_felt(&mut self, value: BabyBear) -> BackendResult<Self::Felt>;
    fn add_felt(&mut self, a: &Self::Felt, b: &Self::Felt) -> BackendResult<Self::Felt>;
    fn sub_felt(&mut self, a: &Self::Felt, b: &Self::Felt) -> BackendResult<Self::Felt>;
    fn mul_felt(&mut self, a: &Self::Felt, b: &Self::Felt) -> BackendResult<Self::Felt>;
    fn select_felt(
        &mut self,
        cond: &Self::Var,
        a: &Self::Felt,
        b: &Self::Felt,
    ) -> BackendResult<Self::Felt>;
    fn assert_eq_felt(&mut self, a: &Self::Felt, b: &Self::Felt) -> BackendResult<()>;

    /// Decomposition of the canonical value into `FELT_BITS` native bits
    fn felt_to_bits(&mut self, value: &Self::Felt) -> BackendResult<Vec<Self::Var>>;

    // ========== Ext ==========

    fn constant_ext(&mut self, value: BabyBearExt4) -> BackendResult<Self::Ext>;
    fn add_ext(&mut self, a: &Self::Ext, b: &Self::Ext) -> BackendResult<Self::Ext>;
    fn sub_ext(&mut self, a: &Self::Ext, b: &Self::Ext) -> BackendResult<Self::Ext>;
    fn mul_ext(&mut self, a: &Self::Ext, b: &Self::Ext) -> BackendResult<Self::Ext>;
    fn div_ext(&mut self, a: &Self::Ext, b: &Self::Ext) -> BackendResult<Self::Ext>;
    fn neg_ext(&mut self, a: &Self::Ext) -> BackendResult<Self::Ext>;
    fn inv_ext(&mut self, a: &Self::Ext) -> BackendResult<Self::Ext>;
    fn add_ext_felt(&mut self, a: &Self::Ext, b: &Self::Felt) -> BackendResult<Self::Ext>;
    fn sub_ext_felt(&mut self, a: &Self::Ext, b: &Self::Felt) -> BackendResult<Self::Ext>;
    fn mul_ext_felt(&mut self, a: &Self::Ext, b: &Self::Felt) -> BackendResult<Self::Ext>;
    fn select_ext(
        &mut self,
        cond: &Self::Var,
        a: &Self::Ext,
        b: &Self::Ext,
    ) -> BackendResult<Self::Ext>;
    fn assert_eq_ext(&mut self, a: &Self::Ext, b: &Self::Ext) -> BackendResult<()>;
    fn ext_to_felts(&mut self, a: &Self::Ext) -> BackendResult<[Self::Felt; 4]>;
    fn felts_to_ext(&mut self, felts: &[Self::Felt; 4]) -> BackendResult<Self::Ext>;

    // ========== Permutations ==========

    fn permute_native(&mut self, state: &mut [Self::Var; 3]) -> BackendResult<()>;
    fn permute_felt(&mut self, state: &mut [Self::Felt; 16]) -> BackendResult<()>;

    // ========== Allocation ==========

    fn witness_var(&mut self, value: &NativeLiteral) -> BackendResult<Self::Var>;
    fn witness_felt(&mut self, value: BabyBear) -> BackendResult<Self::Felt>;
    fn witness_ext(&mut self, value: BabyBearExt4) -> BackendResult<Self::Ext>;
    fn public_input(&mut self, value: &NativeLiteral) -> BackendResult<Self::Var>;

    // ========== Inspection ==========

    /// Concrete values, when the builder knows them. Never adds constraints.
    fn var_value(&self, v: &Self::Var) -> Option<String>;
    fn felt_value(&self, v: &Self::Felt) -> Option<BabyBear>;
    fn ext_value(&self, v: &Self::Ext) -> Option<BabyBearExt4>;
}
