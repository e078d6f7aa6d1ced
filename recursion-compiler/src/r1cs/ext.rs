//! Degree-4 extension arithmetic over emulated BabyBear coordinates.
//!
//! Elements are `c0 + c1·X + c2·X^2 + c3·X^3` modulo `X^4 - 11`.

use super::felt::{Felt, FeltChip};
use crate::backend::{BackendError, BackendResult};
use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::SynthesisError;
use recursion_ir::{BabyBear, BabyBearExt4, EXT_DEGREE, EXT_W};

/// An extension element in the circuit
#[derive(Debug, Clone)]
pub struct Ext(pub [Felt; EXT_DEGREE]);

impl Ext {
    pub fn constant(value: BabyBearExt4) -> Self {
        Ext(value.0.map(Felt::constant))
    }

    pub fn coords(&self) -> &[Felt; EXT_DEGREE] {
        &self.0
    }

    pub fn constant_value(&self) -> Option<BabyBearExt4> {
        let mut out = [BabyBear::ZERO; EXT_DEGREE];
        for (o, c) in out.iter_mut().zip(&self.0) {
            *o = c.constant_value()?;
        }
        Some(BabyBearExt4(out))
    }

    pub fn value(&self) -> Option<BabyBearExt4> {
        let mut out = [BabyBear::ZERO; EXT_DEGREE];
        for (o, c) in out.iter_mut().zip(&self.0) {
            *o = c.value()?;
        }
        Some(BabyBearExt4(out))
    }
}

/// Extension operations, built on a [`FeltChip`]
#[derive(Clone)]
pub struct ExtChip {
    felts: FeltChip,
}

impl ExtChip {
    pub fn new(felts: FeltChip) -> Self {
        Self { felts }
    }

    pub fn witness(&self, value: BabyBearExt4) -> Result<Ext, SynthesisError> {
        let mut coords = Vec::with_capacity(EXT_DEGREE);
        for c in value.0 {
            coords.push(self.felts.witness(c)?);
        }
        Ok(Ext(to_array(coords)))
    }

    pub fn add(&self, a: &Ext, b: &Ext) -> Result<Ext, SynthesisError> {
        self.zip(a, b, |x, y| self.felts.add(x, y))
    }

    pub fn sub(&self, a: &Ext, b: &Ext) -> Result<Ext, SynthesisError> {
        self.zip(a, b, |x, y| self.felts.sub(x, y))
    }

    pub fn neg(&self, a: &Ext) -> Result<Ext, SynthesisError> {
        self.map(a, |x| self.felts.neg(x))
    }

    /// Schoolbook product, folding `X^4 = 11`
    pub fn mul(&self, a: &Ext, b: &Ext) -> Result<Ext, SynthesisError> {
        let w = Felt::constant(BabyBear::from(EXT_W));
        let mut low: Vec<Felt> = vec![Felt::constant(BabyBear::ZERO); EXT_DEGREE];
        let mut high: Vec<Felt> = vec![Felt::constant(BabyBear::ZERO); EXT_DEGREE];
        for (i, x) in a.0.iter().enumerate() {
            for (j, y) in b.0.iter().enumerate() {
                let term = self.felts.mul(x, y)?;
                let k = i + j;
                if k < EXT_DEGREE {
                    low[k] = self.felts.add(&low[k], &term)?;
                } else {
                    high[k - EXT_DEGREE] = self.felts.add(&high[k - EXT_DEGREE], &term)?;
                }
            }
        }
        let mut out = Vec::with_capacity(EXT_DEGREE);
        for (l, h) in low.iter().zip(&high) {
            let wrapped = self.felts.mul(h, &w)?;
            out.push(self.felts.add(l, &wrapped)?);
        }
        Ok(Ext(to_array(out)))
    }

    pub fn add_base(&self, a: &Ext, b: &Felt) -> Result<Ext, SynthesisError> {
        let mut out = a.clone();
        out.0[0] = self.felts.add(&a.0[0], b)?;
        Ok(out)
    }

    pub fn sub_base(&self, a: &Ext, b: &Felt) -> Result<Ext, SynthesisError> {
        let mut out = a.clone();
        out.0[0] = self.felts.sub(&a.0[0], b)?;
        Ok(out)
    }

    pub fn mul_base(&self, a: &Ext, b: &Felt) -> Result<Ext, SynthesisError> {
        self.map(a, |x| self.felts.mul(x, b))
    }

    /// Multiplicative inverse.
    ///
    /// The inverse is a witness checked by `a · inv = 1`. An operand known
    /// to be zero fails immediately instead of yielding an unsatisfiable
    /// system.
    pub fn inv(&self, a: &Ext) -> BackendResult<Ext> {
        if let Some(value) = a.constant_value() {
            return value
                .inverse()
                .map(Ext::constant)
                .ok_or_else(zero_inverse);
        }
        let value = a.value();
        if value.is_some_and(|v| v.is_zero()) {
            return Err(zero_inverse());
        }
        let inverse = value.and_then(BabyBearExt4::inverse);

        let mut coords = Vec::with_capacity(EXT_DEGREE);
        for i in 0..EXT_DEGREE {
            coords.push(self.felts.witness_with(|| inverse.map(|v| v.0[i]))?);
        }
        let inv = Ext(to_array(coords));

        let product = self.mul(a, &inv)?;
        self.assert_eq(&product, &Ext::constant(BabyBearExt4::ONE))?;
        Ok(inv)
    }

    pub fn div(&self, a: &Ext, b: &Ext) -> BackendResult<Ext> {
        let inv = self.inv(b)?;
        Ok(self.mul(a, &inv)?)
    }

    /// Coordinate-wise select with one booleanity check on `cond`
    pub fn select(&self, cond: &FpVar<Fr>, a: &Ext, b: &Ext) -> Result<Ext, SynthesisError> {
        super::bits::enforce_boolean(self.felts.cs(), cond)?;
        self.zip(a, b, |x, y| self.felts.select_unchecked(cond, x, y))
    }

    pub fn assert_eq(&self, a: &Ext, b: &Ext) -> Result<(), SynthesisError> {
        for (x, y) in a.0.iter().zip(&b.0) {
            self.felts.assert_eq(x, y)?;
        }
        Ok(())
    }

    fn map(
        &self,
        a: &Ext,
        f: impl Fn(&Felt) -> Result<Felt, SynthesisError>,
    ) -> Result<Ext, SynthesisError> {
        let coords = a.0.iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Ext(to_array(coords)))
    }

    fn zip(
        &self,
        a: &Ext,
        b: &Ext,
        f: impl Fn(&Felt, &Felt) -> Result<Felt, SynthesisError>,
    ) -> Result<Ext, SynthesisError> {
        let coords = a
            .0
            .iter()
            .zip(&b.0)
            .map(|(x, y)| f(x, y))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Ext(to_array(coords)))
    }
}

fn zero_inverse() -> BackendError {
    BackendError::ArithmeticFailure("inverse of zero extension element".to_string())
}

fn to_array(coords: Vec<Felt>) -> [Felt; EXT_DEGREE] {
    let mut it = coords.into_iter();
    std::array::from_fn(|_| it.next().unwrap_or_else(|| Felt::constant(BabyBear::ZERO)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::{ConstraintSystem, ConstraintSystemRef};

    fn chip() -> (ConstraintSystemRef<Fr>, ExtChip) {
        let cs = ConstraintSystem::<Fr>::new_ref();
        (cs.clone(), ExtChip::new(FeltChip::new(cs)))
    }

    fn ext(c: [u64; 4]) -> BabyBearExt4 {
        BabyBearExt4(c.map(BabyBear::new))
    }

    #[test]
    fn test_mul_matches_host() {
        let (cs, chip) = chip();
        let a = ext([1, 2, 3, 4]);
        let b = ext([5, 6, 7, 2_000_000_000]);
        let x = chip.witness(a).unwrap();
        let y = chip.witness(b).unwrap();
        assert_eq!(chip.mul(&x, &y).unwrap().value(), Some(a * b));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_constants_fold() {
        let (cs, chip) = chip();
        let a = ext([1, 2, 3, 4]);
        let b = ext([9, 8, 7, 6]);
        let prod = chip.mul(&Ext::constant(a), &Ext::constant(b)).unwrap();
        assert_eq!(prod.constant_value(), Some(a * b));
        let inv = chip.inv(&Ext::constant(a)).unwrap();
        assert_eq!(inv.constant_value(), a.inverse());
        assert_eq!(cs.num_constraints(), 0);
    }

    #[test]
    fn test_inverse_and_division() {
        let (cs, chip) = chip();
        let a = ext([3, 0, 17, 1]);
        let b = ext([2, 5, 0, 0]);
        let x = chip.witness(a).unwrap();
        let y = chip.witness(b).unwrap();
        let q = chip.div(&x, &y).unwrap();
        assert_eq!(q.value().map(|q| q * b), Some(a));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_inverse_of_zero_fails() {
        let (_, chip) = chip();
        let zero = chip.witness(BabyBearExt4::ZERO).unwrap();
        assert!(matches!(chip.inv(&zero), Err(BackendError::ArithmeticFailure(_))));
        assert!(chip.inv(&Ext::constant(BabyBearExt4::ZERO)).is_err());
    }

    #[test]
    fn test_base_ops() {
        let (cs, chip) = chip();
        let a = ext([10, 20, 30, 40]);
        let x = chip.witness(a).unwrap();
        let f = chip.felts.witness(BabyBear::new(3)).unwrap();
        let sum = chip.add_base(&x, &f).unwrap();
        let diff = chip.sub_base(&x, &f).unwrap();
        let prod = chip.mul_base(&x, &f).unwrap();
        assert_eq!(sum.value(), Some(ext([13, 20, 30, 40])));
        assert_eq!(diff.value(), Some(ext([7, 20, 30, 40])));
        assert_eq!(prod.value(), Some(ext([30, 60, 90, 120])));
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_assert_eq_mismatch() {
        let (cs, chip) = chip();
        let x = chip.witness(ext([1, 2, 3, 4])).unwrap();
        let y = chip.witness(ext([1, 2, 3, 5])).unwrap();
        chip.assert_eq(&x, &y).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }
}
