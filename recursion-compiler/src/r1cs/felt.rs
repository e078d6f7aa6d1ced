//! BabyBear arithmetic emulated on the native field.
//!
//! A felt is a native variable holding some integer congruent to its BabyBear
//! value, together with an upper bound on that integer's bit length.
//! Additions and multiplications work on the raw integers and only grow the
//! bound; once an operation would push a bound past [`MAX_BITS`] the operand
//! is reduced first, proving `x = q·p + r` with `q` and `r` range checked by
//! bit decomposition.
//!
//! ## Bounds
//!
//! | Operation | Result bound |
//! |-----------|--------------|
//! | `a + b`   | `max(a, b) + 1` |
//! | `a - b`   | `max(a, 31 + k) + 1`, `k = b - 30` |
//! | `a · b`   | `a + b` |
//! | reduce    | 31 |
//!
//! [`MAX_BITS`] keeps every intermediate far below the native modulus, so no
//! integer identity used here can wrap.

use super::bits::{
    alloc_bits, constrain_eq, enforce_boolean, enforce_eq, fr_from_u128, fr_to_u128, recompose,
    value_of,
};
use ark_bn254::Fr;
use ark_r1cs_std::{
    fields::{fp::FpVar, FieldVar},
    prelude::Boolean,
};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use recursion_ir::{BabyBear, BABYBEAR_BITS, BABYBEAR_PRIME};

/// Largest bit bound a felt may carry
pub const MAX_BITS: u32 = 120;

const P: u128 = BABYBEAR_PRIME as u128;

/// A BabyBear element in the circuit
#[derive(Debug, Clone)]
pub struct Felt {
    pub(crate) var: FpVar<Fr>,
    /// The integer in `var` is below 2^bits
    pub(crate) bits: u32,
}

impl Felt {
    pub fn constant(value: BabyBear) -> Self {
        let v = value.value();
        Felt {
            var: FpVar::Constant(Fr::from(v as u64)),
            bits: bit_length(v as u128),
        }
    }

    /// The value, when `var` is a compile-time constant
    pub fn constant_value(&self) -> Option<BabyBear> {
        match &self.var {
            FpVar::Constant(c) => fr_to_u128(*c).map(reduce_host),
            FpVar::Var(_) => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.var, FpVar::Constant(_))
    }

    /// The BabyBear value, when the constraint system has an assignment
    pub fn value(&self) -> Option<BabyBear> {
        value_of(&self.var).and_then(fr_to_u128).map(reduce_host)
    }

    /// The raw integer held by `var`
    fn raw(&self) -> Option<u128> {
        value_of(&self.var).and_then(fr_to_u128)
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }
}

fn reduce_host(x: u128) -> BabyBear {
    BabyBear::new((x % P) as u64)
}

fn bit_length(x: u128) -> u32 {
    (128 - x.leading_zeros()).max(1)
}

/// Operations on felts within one constraint system
#[derive(Clone)]
pub struct FeltChip {
    cs: ConstraintSystemRef<Fr>,
}

impl FeltChip {
    pub fn new(cs: ConstraintSystemRef<Fr>) -> Self {
        Self { cs }
    }

    pub fn cs(&self) -> &ConstraintSystemRef<Fr> {
        &self.cs
    }

    /// Allocate a witness felt, range checked to 31 bits
    pub fn witness(&self, value: BabyBear) -> Result<Felt, SynthesisError> {
        let bits = alloc_bits(
            &self.cs,
            Some(Fr::from(value.value() as u64)),
            BABYBEAR_BITS,
            false,
        )?;
        Ok(Felt {
            var: recompose(&bits),
            bits: BABYBEAR_BITS as u32,
        })
    }

    /// Allocate a witness felt whose value is computed from other felts.
    ///
    /// `compute` only runs when the system has concrete assignments.
    pub fn witness_with(
        &self,
        compute: impl FnOnce() -> Option<BabyBear>,
    ) -> Result<Felt, SynthesisError> {
        let value = if self.cs.is_in_setup_mode() {
            None
        } else {
            compute()
        };
        let bits = alloc_bits(
            &self.cs,
            value.map(|v| Fr::from(v.value() as u64)),
            BABYBEAR_BITS,
            false,
        )?;
        Ok(Felt {
            var: recompose(&bits),
            bits: BABYBEAR_BITS as u32,
        })
    }

    pub fn add(&self, a: &Felt, b: &Felt) -> Result<Felt, SynthesisError> {
        if let (Some(x), Some(y)) = (a.constant_value(), b.constant_value()) {
            return Ok(Felt::constant(x + y));
        }
        let (a, b) = self.fit(a, b, |a, b| a.max(b) + 1)?;
        Ok(Felt {
            var: &a.var + &b.var,
            bits: a.bits.max(b.bits) + 1,
        })
    }

    pub fn sub(&self, a: &Felt, b: &Felt) -> Result<Felt, SynthesisError> {
        if let (Some(x), Some(y)) = (a.constant_value(), b.constant_value()) {
            return Ok(Felt::constant(x - y));
        }
        if let Some(y) = b.constant_value() {
            return self.add(a, &Felt::constant(-y));
        }
        // a + k·p - b with k·p ≥ 2^b.bits
        let (a, b) = self.fit(a, b, |a, b| a.max(31 + b.saturating_sub(30)) + 1)?;
        let shift = b.bits.saturating_sub(30);
        let offset = fr_from_u128(P << shift);
        Ok(Felt {
            var: &a.var + offset - &b.var,
            bits: a.bits.max(31 + shift) + 1,
        })
    }

    pub fn mul(&self, a: &Felt, b: &Felt) -> Result<Felt, SynthesisError> {
        if let (Some(x), Some(y)) = (a.constant_value(), b.constant_value()) {
            return Ok(Felt::constant(x * y));
        }
        let (a, b) = self.fit(a, b, |a, b| a + b)?;
        Ok(Felt {
            var: &a.var * &b.var,
            bits: a.bits + b.bits,
        })
    }

    /// Multiply by a small public coefficient
    pub fn scale(&self, a: &Felt, k: BabyBear) -> Result<Felt, SynthesisError> {
        self.mul(a, &Felt::constant(k))
    }

    pub fn neg(&self, a: &Felt) -> Result<Felt, SynthesisError> {
        self.sub(&Felt::constant(BabyBear::ZERO), a)
    }

    /// `a` when `cond` is one, `b` when zero; `cond` is boolean constrained
    pub fn select(&self, cond: &FpVar<Fr>, a: &Felt, b: &Felt) -> Result<Felt, SynthesisError> {
        enforce_boolean(&self.cs, cond)?;
        self.select_unchecked(cond, a, b)
    }

    /// Select with a condition already known to be boolean
    pub(crate) fn select_unchecked(
        &self,
        cond: &FpVar<Fr>,
        a: &Felt,
        b: &Felt,
    ) -> Result<Felt, SynthesisError> {
        // a non-boolean constant already failed its booleanity constraint
        if let FpVar::Constant(c) = cond {
            return Ok(if *c == Fr::from(1u64) { a.clone() } else { b.clone() });
        }
        let (a, b) = self.fit(a, b, |a, b| a.max(b))?;
        Ok(Felt {
            var: &b.var + cond * (&a.var - &b.var),
            bits: a.bits.max(b.bits),
        })
    }

    /// Constrain `a ≡ b (mod p)`.
    ///
    /// Two constants record one constant constraint. Otherwise the difference
    /// `d = a - b` is proven to be `q·p` for a range-checked `q`.
    pub fn assert_eq(&self, a: &Felt, b: &Felt) -> Result<(), SynthesisError> {
        if let (Some(x), Some(y)) = (a.constant_value(), b.constant_value()) {
            let diff = Fr::from((x - y).value() as u64);
            return enforce_eq(&self.cs, &FpVar::Constant(diff), &FpVar::zero());
        }
        let d = self.sub(a, b)?;
        let q_width = d.bits.saturating_sub(30) as usize;
        let q_value = d.raw().map(|x| fr_from_u128(x / P));
        let q_bits = alloc_bits(&self.cs, q_value, q_width, false)?;
        let q = recompose(&q_bits);
        enforce_eq(&self.cs, &d.var, &(q * fr_from_u128(P)))
    }

    /// Reduce to a 31-bit representative
    pub fn reduce(&self, x: &Felt) -> Result<Felt, SynthesisError> {
        if x.bits <= BABYBEAR_BITS as u32 {
            return Ok(x.clone());
        }
        self.decompose(x, false).map(|(r, _)| r)
    }

    /// Canonical little-endian bits of `x`
    pub fn to_bits(&self, x: &Felt) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
        self.decompose(x, true).map(|(_, bits)| bits)
    }

    /// Prove `x = q·p + r` and return `r` with its 31 bits.
    ///
    /// With `canonical`, also prove `r < p`. Since
    /// `p - 1 = 2^31 - 2^27`, `r < p` holds exactly when bits 27..31 are
    /// not all set or the low 27 bits are all clear.
    fn decompose(
        &self,
        x: &Felt,
        canonical: bool,
    ) -> Result<(Felt, Vec<Boolean<Fr>>), SynthesisError> {
        let constant = x.is_constant();
        let raw = x.raw();
        let q_width = x.bits.saturating_sub(30) as usize;

        let q_bits = alloc_bits(&self.cs, raw.map(|v| fr_from_u128(v / P)), q_width, constant)?;
        let r_bits = alloc_bits(
            &self.cs,
            raw.map(|v| fr_from_u128(v % P)),
            BABYBEAR_BITS,
            constant,
        )?;
        let q = recompose(&q_bits);
        let r = recompose(&r_bits);
        constrain_eq(&self.cs, &x.var, &(q * fr_from_u128(P) + &r))?;

        if canonical && !constant {
            let high = r_bits[27..BABYBEAR_BITS]
                .iter()
                .fold(FpVar::one(), |acc, b| acc * FpVar::from(b.clone()));
            let low = recompose(&r_bits[..27]);
            high.mul_equals(&low, &FpVar::zero())?;
        }

        Ok((
            Felt {
                var: r,
                bits: BABYBEAR_BITS as u32,
            },
            r_bits,
        ))
    }

    /// Reduce operands until `bound(a.bits, b.bits)` fits in [`MAX_BITS`]
    fn fit(
        &self,
        a: &Felt,
        b: &Felt,
        bound: impl Fn(u32, u32) -> u32,
    ) -> Result<(Felt, Felt), SynthesisError> {
        let mut a = a.clone();
        let mut b = b.clone();
        while bound(a.bits, b.bits) > MAX_BITS {
            if a.bits >= b.bits && a.bits > BABYBEAR_BITS as u32 {
                a = self.reduce(&a)?;
            } else if b.bits > BABYBEAR_BITS as u32 {
                b = self.reduce(&b)?;
            } else {
                break;
            }
        }
        Ok((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::R1CSVar;
    use ark_relations::r1cs::ConstraintSystem;

    fn chip() -> (ConstraintSystemRef<Fr>, FeltChip) {
        let cs = ConstraintSystem::<Fr>::new_ref();
        (cs.clone(), FeltChip::new(cs))
    }

    #[test]
    fn test_constant_folding() {
        let (cs, chip) = chip();
        let a = Felt::constant(BabyBear::new(BABYBEAR_PRIME as u64 - 1));
        let b = Felt::constant(BabyBear::new(5));
        let c = chip.mul(&chip.add(&a, &b).unwrap(), &b).unwrap();
        assert_eq!(c.constant_value(), Some(BabyBear::new(20)));
        assert_eq!(cs.num_constraints(), 0);
    }

    #[test]
    fn test_witness_arithmetic() {
        let (cs, chip) = chip();
        let a = chip.witness(BabyBear::new(2_000_000_000)).unwrap();
        let b = chip.witness(BabyBear::new(1_999_999_999)).unwrap();

        let sum = chip.add(&a, &b).unwrap();
        let diff = chip.sub(&b, &a).unwrap();
        let prod = chip.mul(&a, &b).unwrap();

        let ha = BabyBear::new(2_000_000_000);
        let hb = BabyBear::new(1_999_999_999);
        assert_eq!(sum.value(), Some(ha + hb));
        assert_eq!(diff.value(), Some(hb - ha));
        assert_eq!(prod.value(), Some(ha * hb));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_long_chain_stays_bounded() {
        let (cs, chip) = chip();
        let x = chip.witness(BabyBear::new(123_456_789)).unwrap();
        let mut acc = x.clone();
        let mut host = BabyBear::new(123_456_789);
        for _ in 0..10 {
            acc = chip.mul(&acc, &x).unwrap();
            host = host * BabyBear::new(123_456_789);
            assert!(acc.bits() <= MAX_BITS);
        }
        assert_eq!(acc.value(), Some(host));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_assert_eq_modular() {
        let (cs, chip) = chip();
        let a = chip.witness(BabyBear::new(7)).unwrap();
        let big = chip.add(&a, &Felt::constant(BabyBear::new(0))).unwrap();
        let shifted = chip
            .mul(&big, &Felt::constant(BabyBear::new(BABYBEAR_PRIME as u64 - 1)))
            .unwrap();
        let neg = chip.neg(&a).unwrap();
        chip.assert_eq(&shifted, &neg).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_assert_eq_detects_mismatch() {
        let (cs, chip) = chip();
        let a = chip.witness(BabyBear::new(7)).unwrap();
        let b = chip.witness(BabyBear::new(8)).unwrap();
        chip.assert_eq(&a, &b).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_canonical_bits() {
        let (cs, chip) = chip();
        let a = chip.witness(BabyBear::new(BABYBEAR_PRIME as u64 - 1)).unwrap();
        let b = chip.witness(BabyBear::new(3)).unwrap();
        // raw integer p + 2
        let sum = chip.add(&a, &b).unwrap();
        let bits = chip.to_bits(&sum).unwrap();
        let value: u64 = bits
            .iter()
            .enumerate()
            .map(|(i, b)| (b.value().unwrap() as u64) << i)
            .sum();
        assert_eq!(value, 2);
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_select() {
        let (cs, chip) = chip();
        let a = chip.witness(BabyBear::new(10)).unwrap();
        let b = chip.witness(BabyBear::new(20)).unwrap();
        let one = FpVar::Constant(Fr::from(1u64));
        let zero = FpVar::Constant(Fr::from(0u64));
        assert_eq!(chip.select(&one, &a, &b).unwrap().value(), Some(BabyBear::new(10)));
        assert_eq!(chip.select(&zero, &a, &b).unwrap().value(), Some(BabyBear::new(20)));
        assert!(cs.is_satisfied().unwrap());
    }
}
