use crate::core::data::coordinate::DecimalParts;
use num::bigint::BigInt;
use num::{FromPrimitive, ToPrimitive, Zero};
use std::ops::{Add, Mul, Sub};

// Decimal exponents below the minimum produce values far under one unit in
// the last place of every supported fraction width. Larger exponents than the
// maximum are clamped to it.
const MIN_DECIMAL_EXPONENT: i32 = -2048;
const MAX_DECIMAL_EXPONENT: i32 = 2048;

/// Arbitrary-width binary fixed-point number with `FRACTION_BITS` bits
/// after the point.
///
/// Products are renormalised immediately, so the iteration kernel never
/// needs an explicit shift for these types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BigFixed<const FRACTION_BITS: u32> {
    raw: BigInt,
}

/// Extended precision types available to the kernel.
pub type CustomFloat20 = BigFixed<60>;
pub type Decimal20 = BigFixed<67>;
pub type Decimal30 = BigFixed<100>;
pub type Decimal50 = BigFixed<167>;
pub type Float80 = BigFixed<64>;
pub type Float128 = BigFixed<113>;

impl<const FRACTION_BITS: u32> BigFixed<FRACTION_BITS> {
    #[must_use]
    pub fn from_raw(raw: BigInt) -> Self {
        Self { raw }
    }

    #[must_use]
    pub fn raw(&self) -> &BigInt {
        &self.raw
    }

    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        Self {
            raw: BigInt::from(value) << FRACTION_BITS,
        }
    }

    /// Exact conversion of a finite double; non-finite input maps to zero.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        let scaled = value * 2f64.powi(FRACTION_BITS as i32);

        Self {
            raw: BigInt::from_f64(scaled).unwrap_or_default(),
        }
    }

    /// Converts decimal text, truncating toward zero below the last fraction bit.
    #[must_use]
    pub fn from_decimal(parts: &DecimalParts) -> Self {
        if parts.exponent < MIN_DECIMAL_EXPONENT {
            return Self::default();
        }

        let mut mantissa = BigInt::zero();
        for digit in parts.digits.bytes() {
            mantissa = mantissa * 10u32 + u32::from(digit - b'0');
        }

        let exponent = parts.exponent.min(MAX_DECIMAL_EXPONENT);
        let power = num::pow(BigInt::from(10u32), exponent.unsigned_abs() as usize);
        let abs = if exponent >= 0 {
            (mantissa * power) << FRACTION_BITS
        } else {
            (mantissa << FRACTION_BITS) / power
        };

        Self {
            raw: if parts.negative { -abs } else { abs },
        }
    }

    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.raw.to_f64().unwrap_or(f64::NAN) / 2f64.powi(FRACTION_BITS as i32)
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.raw.sign() == num::bigint::Sign::Minus
    }
}

impl<const FRACTION_BITS: u32> Add for &BigFixed<FRACTION_BITS> {
    type Output = BigFixed<FRACTION_BITS>;

    fn add(self, rhs: Self) -> Self::Output {
        BigFixed {
            raw: &self.raw + &rhs.raw,
        }
    }
}

impl<const FRACTION_BITS: u32> Sub for &BigFixed<FRACTION_BITS> {
    type Output = BigFixed<FRACTION_BITS>;

    fn sub(self, rhs: Self) -> Self::Output {
        BigFixed {
            raw: &self.raw - &rhs.raw,
        }
    }
}

impl<const FRACTION_BITS: u32> Mul for &BigFixed<FRACTION_BITS> {
    type Output = BigFixed<FRACTION_BITS>;

    fn mul(self, rhs: Self) -> Self::Output {
        BigFixed {
            raw: (&self.raw * &rhs.raw) >> FRACTION_BITS,
        }
    }
}
