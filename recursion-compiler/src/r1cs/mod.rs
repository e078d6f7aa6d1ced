//! R1CS backend over BN254.
//!
//! Native values are BN254 scalars, used directly as [`FpVar`]s. BabyBear
//! values are emulated by [`felt::FeltChip`] and extension values by
//! [`ext::ExtChip`]. Bit decompositions are least-significant bit first.

pub mod bits;
pub mod ext;
pub mod felt;
pub mod poseidon2;

use crate::backend::{BackendError, BackendResult, BitOrder, CircuitBuilder};
use crate::config::CompileMode;
use ark_bn254::Fr;
use ark_ff::{One, PrimeField};
use ark_r1cs_std::{alloc::AllocVar, fields::fp::FpVar, prelude::Boolean};
use ark_relations::r1cs::{ConstraintSystem, ConstraintSystemRef, SynthesisMode};
use bits::{alloc_bits, constrain_eq, enforce_boolean, enforce_eq, fr_from_decimal, recompose, value_of};
use ext::{Ext, ExtChip};
use felt::{Felt, FeltChip};
use poseidon2::Poseidon2Params;
use recursion_ir::{BabyBear, BabyBearExt4, NativeLiteral, BABYBEAR_BITS, EXT_DEGREE};

/// Builds a BN254 R1CS instance
pub struct R1csBuilder {
    cs: ConstraintSystemRef<Fr>,
    felts: FeltChip,
    exts: ExtChip,
    params: Poseidon2Params,
}

impl R1csBuilder {
    pub fn new(mode: CompileMode, params: Poseidon2Params) -> Self {
        let cs = ConstraintSystem::<Fr>::new_ref();
        if mode == CompileMode::Shape {
            cs.set_mode(SynthesisMode::Setup);
        }
        let felts = FeltChip::new(cs.clone());
        Self {
            exts: ExtChip::new(felts.clone()),
            felts,
            cs,
            params,
        }
    }

    pub fn cs(&self) -> &ConstraintSystemRef<Fr> {
        &self.cs
    }

    pub fn into_cs(self) -> ConstraintSystemRef<Fr> {
        self.cs
    }

    /// Lay out little-endian bits in [`CircuitBuilder::BIT_ORDER`]
    fn ordered(bits: &[Boolean<Fr>]) -> Vec<FpVar<Fr>> {
        let width = bits.len();
        (0..width)
            .map(|i| FpVar::from(bits[Self::BIT_ORDER.exponent(i, width)].clone()))
            .collect()
    }
}

impl CircuitBuilder for R1csBuilder {
    type Var = FpVar<Fr>;
    type Felt = Felt;
    type Ext = Ext;

    const BIT_ORDER: BitOrder = BitOrder::LsbFirst;
    const FELT_BITS: usize = BABYBEAR_BITS;
    // 2^253 < r, so a 253-bit decomposition is unique
    const MAX_VAR_BITS: usize = Fr::MODULUS_BIT_SIZE as usize - 1;

    // ========== Native ==========

    fn constant_var(&mut self, value: &NativeLiteral) -> BackendResult<FpVar<Fr>> {
        Ok(FpVar::Constant(fr_from_decimal(value.as_str())))
    }

    fn add_var(&mut self, a: &FpVar<Fr>, b: &FpVar<Fr>) -> BackendResult<FpVar<Fr>> {
        Ok(a + b)
    }

    fn sub_var(&mut self, a: &FpVar<Fr>, b: &FpVar<Fr>) -> BackendResult<FpVar<Fr>> {
        Ok(a - b)
    }

    fn mul_var(&mut self, a: &FpVar<Fr>, b: &FpVar<Fr>) -> BackendResult<FpVar<Fr>> {
        Ok(a * b)
    }

    fn select_var(
        &mut self,
        cond: &FpVar<Fr>,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
    ) -> BackendResult<FpVar<Fr>> {
        enforce_boolean(&self.cs, cond)?;
        Ok(match cond {
            FpVar::Constant(c) if c.is_one() => a.clone(),
            FpVar::Constant(_) => b.clone(),
            FpVar::Var(_) => b + cond * (a - b),
        })
    }

    fn assert_eq_var(&mut self, a: &FpVar<Fr>, b: &FpVar<Fr>) -> BackendResult<()> {
        Ok(enforce_eq(&self.cs, a, b)?)
    }

    fn var_to_bits(&mut self, value: &FpVar<Fr>, width: usize) -> BackendResult<Vec<FpVar<Fr>>> {
        if width > Self::MAX_VAR_BITS {
            return Err(BackendError::BitWidth {
                width,
                max: Self::MAX_VAR_BITS,
            });
        }
        let constant = matches!(value, FpVar::Constant(_));
        let bits = alloc_bits(&self.cs, value_of(value), width, constant)?;
        constrain_eq(&self.cs, value, &recompose(&bits))?;
        Ok(Self::ordered(&bits))
    }

    // ========== Felt ==========

    fn constant_felt(&mut self, value: BabyBear) -> BackendResult<Felt> {
        Ok(Felt::constant(value))
    }

    fn add_felt(&mut self, a: &Felt, b: &Felt) -> BackendResult<Felt> {
        Ok(self.felts.add(a, b)?)
    }

    fn sub_felt(&mut self, a: &Felt, b: &Felt) -> BackendResult<Felt> {
        Ok(self.felts.sub(a, b)?)
    }

    fn mul_felt(&mut self, a: &Felt, b: &Felt) -> BackendResult<Felt> {
        Ok(self.felts.mul(a, b)?)
    }

    fn select_felt(&mut self, cond: &FpVar<Fr>, a: &Felt, b: &Felt) -> BackendResult<Felt> {
        Ok(self.felts.select(cond, a, b)?)
    }

    fn assert_eq_felt(&mut self, a: &Felt, b: &Felt) -> BackendResult<()> {
        Ok(self.felts.assert_eq(a, b)?)
    }

    fn felt_to_bits(&mut self, value: &Felt) -> BackendResult<Vec<FpVar<Fr>>> {
        let bits = self.felts.to_bits(value)?;
        Ok(Self::ordered(&bits))
    }

    // ========== Ext ==========

    fn constant_ext(&mut self, value: BabyBearExt4) -> BackendResult<Ext> {
        Ok(Ext::constant(value))
    }

    fn add_ext(&mut self, a: &Ext, b: &Ext) -> BackendResult<Ext> {
        Ok(self.exts.add(a, b)?)
    }

    fn sub_ext(&mut self, a: &Ext, b: &Ext) -> BackendResult<Ext> {
        Ok(self.exts.sub(a, b)?)
    }

    fn mul_ext(&mut self, a: &Ext, b: &Ext) -> BackendResult<Ext> {
        Ok(self.exts.mul(a, b)?)
    }

    fn div_ext(&mut self, a: &Ext, b: &Ext) -> BackendResult<Ext> {
        self.exts.div(a, b)
    }

    fn neg_ext(&mut self, a: &Ext) -> BackendResult<Ext> {
        Ok(self.exts.neg(a)?)
    }

    fn inv_ext(&mut self, a: &Ext) -> BackendResult<Ext> {
        self.exts.inv(a)
    }

    fn add_ext_felt(&mut self, a: &Ext, b: &Felt) -> BackendResult<Ext> {
        Ok(self.exts.add_base(a, b)?)
    }

    fn sub_ext_felt(&mut self, a: &Ext, b: &Felt) -> BackendResult<Ext> {
        Ok(self.exts.sub_base(a, b)?)
    }

    fn mul_ext_felt(&mut self, a: &Ext, b: &Felt) -> BackendResult<Ext> {
        Ok(self.exts.mul_base(a, b)?)
    }

    fn select_ext(&mut self, cond: &FpVar<Fr>, a: &Ext, b: &Ext) -> BackendResult<Ext> {
        Ok(self.exts.select(cond, a, b)?)
    }

    fn assert_eq_ext(&mut self, a: &Ext, b: &Ext) -> BackendResult<()> {
        Ok(self.exts.assert_eq(a, b)?)
    }

    fn ext_to_felts(&mut self, a: &Ext) -> BackendResult<[Felt; EXT_DEGREE]> {
        Ok(a.coords().clone())
    }

    fn felts_to_ext(&mut self, felts: &[Felt; EXT_DEGREE]) -> BackendResult<Ext> {
        Ok(Ext(felts.clone()))
    }

    // ========== Permutations ==========

    fn permute_native(&mut self, state: &mut [FpVar<Fr>; 3]) -> BackendResult<()> {
        Ok(poseidon2::permute_native(&self.params, state)?)
    }

    fn permute_felt(&mut self, state: &mut [Felt; 16]) -> BackendResult<()> {
        Ok(poseidon2::permute_felt(&self.felts, &self.params, state)?)
    }

    // ========== Allocation ==========

    fn witness_var(&mut self, value: &NativeLiteral) -> BackendResult<FpVar<Fr>> {
        Ok(FpVar::new_witness(self.cs.clone(), || {
            Ok(fr_from_decimal(value.as_str()))
        })?)
    }

    fn witness_felt(&mut self, value: BabyBear) -> BackendResult<Felt> {
        Ok(self.felts.witness(value)?)
    }

    fn witness_ext(&mut self, value: BabyBearExt4) -> BackendResult<Ext> {
        Ok(self.exts.witness(value)?)
    }

    fn public_input(&mut self, value: &NativeLiteral) -> BackendResult<FpVar<Fr>> {
        Ok(FpVar::new_input(self.cs.clone(), || {
            Ok(fr_from_decimal(value.as_str()))
        })?)
    }

    // ========== Inspection ==========

    fn var_value(&self, v: &FpVar<Fr>) -> Option<String> {
        value_of(v).map(|x| x.into_bigint().to_string())
    }

    fn felt_value(&self, v: &Felt) -> Option<BabyBear> {
        v.value()
    }

    fn ext_value(&self, v: &Ext) -> Option<BabyBearExt4> {
        v.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> R1csBuilder {
        R1csBuilder::new(CompileMode::Prove, Poseidon2Params::default())
    }

    #[test]
    fn test_native_arithmetic() {
        let mut b = builder();
        let x = b.witness_var(&NativeLiteral::from(6)).unwrap();
        let y = b.constant_var(&NativeLiteral::from(7)).unwrap();
        let z = b.mul_var(&x, &y).unwrap();
        let w = b.sub_var(&z, &x).unwrap();
        assert_eq!(b.var_value(&w).as_deref(), Some("36"));
        let expected = b.constant_var(&NativeLiteral::from(36)).unwrap();
        b.assert_eq_var(&w, &expected).unwrap();
        assert!(b.cs().is_satisfied().unwrap());
    }

    #[test]
    fn test_var_to_bits_lsb_first() {
        let mut b = builder();
        let x = b.witness_var(&NativeLiteral::from(6)).unwrap();
        let bits = b.var_to_bits(&x, 4).unwrap();
        let values: Vec<String> = bits.iter().filter_map(|bit| b.var_value(bit)).collect();
        assert_eq!(values, vec!["0", "1", "1", "0"]);
        assert!(b.cs().is_satisfied().unwrap());
    }

    #[test]
    fn test_var_to_bits_overflow_unsatisfied() {
        let mut b = builder();
        let x = b.witness_var(&NativeLiteral::from(16)).unwrap();
        b.var_to_bits(&x, 4).unwrap();
        assert!(!b.cs().is_satisfied().unwrap());
    }

    #[test]
    fn test_var_to_bits_width_limit() {
        let mut b = builder();
        let x = b.witness_var(&NativeLiteral::from(1)).unwrap();
        assert!(b.var_to_bits(&x, R1csBuilder::MAX_VAR_BITS).is_ok());
        assert!(matches!(
            b.var_to_bits(&x, R1csBuilder::MAX_VAR_BITS + 1),
            Err(BackendError::BitWidth { width: 254, max: 253 })
        ));
        assert!(b.var_to_bits(&x, 0).unwrap().is_empty());
    }

    #[test]
    fn test_bit_outputs_follow_bit_order() {
        let mut b = builder();
        let f = b.witness_felt(BabyBear::new(0b1011)).unwrap();
        let bits = b.felt_to_bits(&f).unwrap();
        let width = bits.len();
        assert_eq!(width, R1csBuilder::FELT_BITS);
        let value: u64 = bits
            .iter()
            .enumerate()
            .map(|(i, bit)| {
                let v: u64 = b.var_value(bit).unwrap().parse().unwrap();
                v << R1csBuilder::BIT_ORDER.exponent(i, width)
            })
            .sum();
        assert_eq!(value, 0b1011);
    }

    #[test]
    fn test_select_var_rejects_non_boolean() {
        let mut b = builder();
        let cond = b.witness_var(&NativeLiteral::from(2)).unwrap();
        let x = b.constant_var(&NativeLiteral::from(10)).unwrap();
        let y = b.constant_var(&NativeLiteral::from(20)).unwrap();
        b.select_var(&cond, &x, &y).unwrap();
        assert!(!b.cs().is_satisfied().unwrap());
    }

    #[test]
    fn test_public_inputs() {
        let mut b = builder();
        let v = b.public_input(&NativeLiteral::from(99)).unwrap();
        assert_eq!(b.var_value(&v).as_deref(), Some("99"));
        // the constant one plus the new input
        assert_eq!(b.cs().num_instance_variables(), 2);
    }

    #[test]
    fn test_shape_mode_skips_values() {
        let mut b = R1csBuilder::new(CompileMode::Shape, Poseidon2Params::default());
        let x = b.witness_var(&NativeLiteral::from(3)).unwrap();
        let y = b.mul_var(&x, &x).unwrap();
        assert_eq!(b.var_value(&y), None);
        let f = b.witness_felt(BabyBear::new(3)).unwrap();
        assert_eq!(b.felt_value(&f), None);
        assert!(b.cs().num_constraints() > 0);
    }
}
