//! Bit decomposition and equality gadgets shared by the native, felt and
//! extension chips.

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, PrimeField};
use ark_r1cs_std::{
    alloc::AllocVar,
    eq::EqGadget,
    fields::{fp::FpVar, FieldVar},
    prelude::Boolean,
    R1CSVar,
};
use ark_relations::{
    lc,
    r1cs::{ConstraintSystemRef, SynthesisError, Variable},
};

/// Parse a decimal string into the native field, reducing mod r
pub fn fr_from_decimal(s: &str) -> Fr {
    let ten = Fr::from(10u64);
    s.bytes()
        .filter(u8::is_ascii_digit)
        .fold(Fr::from(0u64), |acc, c| acc * ten + Fr::from((c - b'0') as u64))
}

/// The canonical integer of `x`, if it fits in 128 bits
pub fn fr_to_u128(x: Fr) -> Option<u128> {
    let limbs = x.into_bigint().0;
    if limbs[2] != 0 || limbs[3] != 0 {
        return None;
    }
    Some(limbs[0] as u128 | (limbs[1] as u128) << 64)
}

pub fn fr_from_u128(x: u128) -> Fr {
    Fr::from(x as u64) + Fr::from((x >> 64) as u64) * pow2(64)
}

/// 2^i in the native field
pub fn pow2(i: usize) -> Fr {
    Fr::from(2u64).pow([i as u64])
}

/// Concrete value of `v`, if the constraint system has one
pub fn value_of(v: &FpVar<Fr>) -> Option<Fr> {
    v.value().ok()
}

/// Allocate `width` little-endian bits of `value`.
///
/// Each bit is boolean constrained. The caller ties the bits to their source
/// with [`recompose`]. A constant `value` yields constant bits and no
/// constraints.
pub fn alloc_bits(
    cs: &ConstraintSystemRef<Fr>,
    value: Option<Fr>,
    width: usize,
    constant: bool,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let bits = value.map(|v| v.into_bigint());
    (0..width)
        .map(|i| {
            let bit = bits.as_ref().map(|b| b.get_bit(i));
            match (constant, bit) {
                (true, Some(bit)) => Ok(Boolean::constant(bit)),
                _ => Boolean::new_witness(cs.clone(), || {
                    bit.ok_or(SynthesisError::AssignmentMissing)
                }),
            }
        })
        .collect()
}

/// Σ bits[i] · 2^i, as a linear combination
pub fn recompose(bits: &[Boolean<Fr>]) -> FpVar<Fr> {
    bits.iter()
        .enumerate()
        .fold(FpVar::zero(), |acc, (i, bit)| {
            acc + FpVar::from(bit.clone()) * pow2(i)
        })
}

/// Record `a == b` unconditionally.
///
/// Two constants still produce one constraint, so a false constant
/// assertion is only detected when the system is checked.
pub fn enforce_eq(
    cs: &ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<(), SynthesisError> {
    match (a, b) {
        (FpVar::Constant(x), FpVar::Constant(y)) => {
            cs.enforce_constraint(lc!() + (*x - *y, Variable::One), lc!() + Variable::One, lc!())
        }
        _ => a.enforce_equal(b),
    }
}

/// Record `a == b`, skipping it when both sides are equal constants
pub fn constrain_eq(
    cs: &ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<(), SynthesisError> {
    match (a, b) {
        (FpVar::Constant(x), FpVar::Constant(y)) if x == y => Ok(()),
        _ => enforce_eq(cs, a, b),
    }
}

/// Constrain `x` to zero or one
pub fn enforce_boolean(cs: &ConstraintSystemRef<Fr>, x: &FpVar<Fr>) -> Result<(), SynthesisError> {
    match x {
        FpVar::Constant(c) => {
            let square = *c * *c;
            constrain_eq(cs, &FpVar::Constant(square), &FpVar::Constant(*c))
        }
        FpVar::Var(_) => x.mul_equals(&(x - Fr::from(1u64)), &FpVar::zero()),
    }
}
