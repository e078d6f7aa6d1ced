//! BabyBear field element, the secondary field of the recursion IR.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// BabyBear prime: 2^31 - 2^27 + 1
pub const BABYBEAR_PRIME: u32 = 2013265921;

/// Number of bits needed to hold any canonical BabyBear element.
pub const BABYBEAR_BITS: usize = 31;

/// A field element in the BabyBear prime field.
///
/// Values are stored in canonical form: 0 ≤ value < p
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BabyBear(u32);

impl BabyBear {
    pub const MODULUS: u32 = BABYBEAR_PRIME;
    pub const ZERO: Self = BabyBear(0);
    pub const ONE: Self = BabyBear(1);

    /// Create a new field element from a value (reduced mod p)
    #[inline]
    pub const fn new(value: u64) -> Self {
        BabyBear((value % Self::MODULUS as u64) as u32)
    }

    /// Get the canonical value
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal string of arbitrary length, reducing mod p.
    ///
    /// Returns `None` for empty strings or non-digit characters.
    pub fn from_decimal(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let mut acc: u64 = 0;
        for c in s.bytes() {
            if !c.is_ascii_digit() {
                return None;
            }
            acc = (acc * 10 + (c - b'0') as u64) % Self::MODULUS as u64;
        }
        Some(BabyBear(acc as u32))
    }

    /// Multiplicative inverse via Fermat's little theorem, `None` for zero.
    pub fn inverse(self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(self.pow(Self::MODULUS as u64 - 2))
    }

    /// Compute self^exp mod p using binary exponentiation
    pub fn pow(self, mut exp: u64) -> Self {
        let mut base = self;
        let mut result = Self::ONE;

        while exp > 0 {
            if exp & 1 == 1 {
                result *= base;
            }
            base *= base;
            exp >>= 1;
        }

        result
    }

    /// Little-endian bits of the canonical value.
    pub fn to_bits_le(self) -> [bool; BABYBEAR_BITS] {
        std::array::from_fn(|i| (self.0 >> i) & 1 == 1)
    }
}

impl From<u32> for BabyBear {
    fn from(value: u32) -> Self {
        BabyBear::new(value as u64)
    }
}

impl From<u64> for BabyBear {
    fn from(value: u64) -> Self {
        BabyBear::new(value)
    }
}

impl From<BabyBear> for u32 {
    fn from(f: BabyBear) -> u32 {
        f.0
    }
}

impl Add for BabyBear {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        BabyBear::new(self.0 as u64 + rhs.0 as u64)
    }
}

impl Sub for BabyBear {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 {
            BabyBear(self.0 - rhs.0)
        } else {
            BabyBear(Self::MODULUS - rhs.0 + self.0)
        }
    }
}

impl Mul for BabyBear {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        BabyBear::new(self.0 as u64 * rhs.0 as u64)
    }
}

impl Neg for BabyBear {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        if self.0 == 0 {
            self
        } else {
            BabyBear(Self::MODULUS - self.0)
        }
    }
}

impl AddAssign for BabyBear {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for BabyBear {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for BabyBear {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl fmt::Display for BabyBear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(BABYBEAR_PRIME, (1 << 31) - (1 << 27) + 1);
        assert!(BABYBEAR_PRIME < 1 << BABYBEAR_BITS);
        assert!(BABYBEAR_PRIME > 1 << (BABYBEAR_BITS - 1));
    }

    #[test]
    fn test_reduction() {
        assert_eq!(BabyBear::new(BABYBEAR_PRIME as u64).value(), 0);
        assert_eq!(BabyBear::new(BABYBEAR_PRIME as u64 + 5).value(), 5);
    }

    #[test]
    fn test_sub_underflow() {
        let a = BabyBear::new(5);
        let b = BabyBear::new(10);
        assert_eq!((a - b).value(), BABYBEAR_PRIME - 5);
        assert_eq!(a - b + b, a);
    }

    #[test]
    fn test_inverse() {
        let a = BabyBear::new(12345);
        let inv = a.inverse().unwrap();
        assert_eq!(a * inv, BabyBear::ONE);
        assert_eq!(BabyBear::ZERO.inverse(), None);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(BabyBear::from_decimal("42"), Some(BabyBear::new(42)));
        assert_eq!(BabyBear::from_decimal("2013265922"), Some(BabyBear::ONE));
        assert_eq!(
            BabyBear::from_decimal("340282366920938463463374607431768211456"),
            Some(BabyBear::new(2).pow(128))
        );
        assert_eq!(BabyBear::from_decimal(""), None);
        assert_eq!(BabyBear::from_decimal("-1"), None);
        assert_eq!(BabyBear::from_decimal("1e3"), None);
    }

    #[test]
    fn test_bits_le() {
        let bits = BabyBear::new(6).to_bits_le();
        assert!(!bits[0]);
        assert!(bits[1]);
        assert!(bits[2]);
        assert!(bits[3..].iter().all(|b| !b));
    }
}
