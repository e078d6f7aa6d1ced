//! Degree-4 binomial extension of BabyBear: `F[X] / (X^4 - W)` with `W = 11`.

use crate::field::BabyBear;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Extension degree
pub const EXT_DEGREE: usize = 4;

/// Non-residue `W` in `X^4 = W`
pub const EXT_W: u32 = 11;

/// Extension element, coordinates ordered by ascending power of `X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BabyBearExt4(pub [BabyBear; EXT_DEGREE]);

impl BabyBearExt4 {
    pub const ZERO: Self = BabyBearExt4([BabyBear::ZERO; EXT_DEGREE]);
    pub const ONE: Self = BabyBearExt4([BabyBear::ONE, BabyBear::ZERO, BabyBear::ZERO, BabyBear::ZERO]);

    pub const fn new(coords: [BabyBear; EXT_DEGREE]) -> Self {
        BabyBearExt4(coords)
    }

    pub fn coords(&self) -> &[BabyBear; EXT_DEGREE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| c.is_zero())
    }

    /// Compute self^exp for a 128-bit exponent
    pub fn pow(self, mut exp: u128) -> Self {
        let mut base = self;
        let mut result = Self::ONE;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse `a^(p^4 - 2)`, `None` for zero.
    pub fn inverse(self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        let p = BabyBear::MODULUS as u128;
        Some(self.pow(p * p * p * p - 2))
    }
}

impl Add for BabyBearExt4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        BabyBearExt4(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for BabyBearExt4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        BabyBearExt4(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl Neg for BabyBearExt4 {
    type Output = Self;

    fn neg(self) -> Self {
        BabyBearExt4(self.0.map(|c| -c))
    }
}

impl Mul for BabyBearExt4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let w = BabyBear::from(EXT_W);
        let mut out = [BabyBear::ZERO; EXT_DEGREE];
        for i in 0..EXT_DEGREE {
            for j in 0..EXT_DEGREE {
                let term = self.0[i] * rhs.0[j];
                if i + j < EXT_DEGREE {
                    out[i + j] += term;
                } else {
                    out[i + j - EXT_DEGREE] += w * term;
                }
            }
        }
        BabyBearExt4(out)
    }
}

impl Mul<BabyBear> for BabyBearExt4 {
    type Output = Self;

    fn mul(self, rhs: BabyBear) -> Self {
        BabyBearExt4(self.0.map(|c| c * rhs))
    }
}

impl fmt::Display for BabyBearExt4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}
