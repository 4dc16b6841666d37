use crate::core::data::coordinate::{CoordValue, parse_decimal};
use crate::core::numeric::big_fixed::BigFixed;

/// Fixed-point magnitude headroom, in bits, reserved on each side of a square.
pub const MAGNITUDE_BITS: u32 = 3;

/// Shift used for 128-bit integers, whose parameters pass through a 64-bit
/// fixed-point intermediate rather than a float multiply.
pub const DOUBLE_TO_INT_SHIFT: u32 = 56;

/// Escape radius squared before scaling.
pub const ESCAPE_LIMIT: i64 = 4;

/// Arithmetic the iteration kernel needs from a numeric type.
///
/// Every supported type spells out `normalize` and `check_end_condition`
/// explicitly; there are no defaults to fall back on.
pub trait KernelNumber: Clone + Send + Sync + 'static {
    /// Fraction bits removed by [`KernelNumber::normalize`] after a product
    /// of two scaled values. Zero when no explicit shift is needed.
    const SCALING_SHIFT: u32;

    /// Scaled origin coordinate.
    fn from_coordinate(value: &CoordValue) -> Self;

    /// Scaled size of one pixel.
    fn from_scale(scale: f64) -> Self;

    /// Unscaled integer, used for pixel offsets and small constants.
    fn from_i64(value: i64) -> Self;

    /// Escape radius squared, pre-multiplied by the scaling squared.
    fn escape_limit() -> Self;

    fn plus(&self, rhs: &Self) -> Self;
    fn minus(&self, rhs: &Self) -> Self;
    fn times(&self, rhs: &Self) -> Self;

    /// Brings a product of two scaled values back to single scaling.
    fn normalize(&mut self);

    /// True when the squared magnitude has escaped.
    fn check_end_condition(&self, limit: &Self) -> bool;
}

macro_rules! float_kernel_number {
    ($t:ty) => {
        impl KernelNumber for $t {
            const SCALING_SHIFT: u32 = 0;

            #[inline]
            fn from_coordinate(value: &CoordValue) -> Self {
                value.approx() as $t
            }

            #[inline]
            fn from_scale(scale: f64) -> Self {
                scale as $t
            }

            #[inline]
            fn from_i64(value: i64) -> Self {
                value as $t
            }

            #[inline]
            fn escape_limit() -> Self {
                ESCAPE_LIMIT as $t
            }

            #[inline]
            fn plus(&self, rhs: &Self) -> Self {
                self + rhs
            }

            #[inline]
            fn minus(&self, rhs: &Self) -> Self {
                self - rhs
            }

            #[inline]
            fn times(&self, rhs: &Self) -> Self {
                self * rhs
            }

            #[inline]
            fn normalize(&mut self) {}

            #[inline]
            fn check_end_condition(&self, limit: &Self) -> bool {
                *self > *limit
            }
        }
    };
}

// Integers wrap on overflow; a wrapped square shows up as a negative
// magnitude and counts as escaped.
macro_rules! fixed_point_kernel_number {
    ($t:ty) => {
        impl KernelNumber for $t {
            const SCALING_SHIFT: u32 = <$t>::BITS / 2 - 2 * MAGNITUDE_BITS;

            #[inline]
            fn from_coordinate(value: &CoordValue) -> Self {
                Self::from_scale(value.approx())
            }

            #[inline]
            fn from_scale(scale: f64) -> Self {
                let scaling = (1i64 << Self::SCALING_SHIFT) as f64;
                (scaling * scale) as $t
            }

            #[inline]
            fn from_i64(value: i64) -> Self {
                value as $t
            }

            #[inline]
            fn escape_limit() -> Self {
                let scaling = 1i64 << Self::SCALING_SHIFT;
                (scaling * scaling * ESCAPE_LIMIT) as $t
            }

            #[inline]
            fn plus(&self, rhs: &Self) -> Self {
                self.wrapping_add(*rhs)
            }

            #[inline]
            fn minus(&self, rhs: &Self) -> Self {
                self.wrapping_sub(*rhs)
            }

            #[inline]
            fn times(&self, rhs: &Self) -> Self {
                self.wrapping_mul(*rhs)
            }

            #[inline]
            fn normalize(&mut self) {
                *self >>= Self::SCALING_SHIFT;
            }

            #[inline]
            fn check_end_condition(&self, limit: &Self) -> bool {
                *self > *limit || *self < 0
            }
        }
    };
}

float_kernel_number!(f32);
float_kernel_number!(f64);
fixed_point_kernel_number!(i32);
fixed_point_kernel_number!(i64);

impl KernelNumber for i128 {
    const SCALING_SHIFT: u32 = DOUBLE_TO_INT_SHIFT;

    #[inline]
    fn from_coordinate(value: &CoordValue) -> Self {
        Self::from_scale(value.approx())
    }

    #[inline]
    fn from_scale(scale: f64) -> Self {
        let fixed = (scale * (1i64 << DOUBLE_TO_INT_SHIFT) as f64) as i64;
        i128::from(fixed)
    }

    #[inline]
    fn from_i64(value: i64) -> Self {
        i128::from(value)
    }

    #[inline]
    fn escape_limit() -> Self {
        i128::from(ESCAPE_LIMIT) << (2 * DOUBLE_TO_INT_SHIFT)
    }

    #[inline]
    fn plus(&self, rhs: &Self) -> Self {
        self.wrapping_add(*rhs)
    }

    #[inline]
    fn minus(&self, rhs: &Self) -> Self {
        self.wrapping_sub(*rhs)
    }

    #[inline]
    fn times(&self, rhs: &Self) -> Self {
        self.wrapping_mul(*rhs)
    }

    #[inline]
    fn normalize(&mut self) {
        *self >>= DOUBLE_TO_INT_SHIFT;
    }

    #[inline]
    fn check_end_condition(&self, limit: &Self) -> bool {
        *self > *limit || *self < 0
    }
}

impl<const FRACTION_BITS: u32> KernelNumber for BigFixed<FRACTION_BITS> {
    const SCALING_SHIFT: u32 = 0;

    /// Reads the decimal text when present so deep zooms keep every digit.
    fn from_coordinate(value: &CoordValue) -> Self {
        match value.precise().map(parse_decimal) {
            Some(Ok(parts)) => Self::from_decimal(&parts),
            _ => Self::from_f64(value.approx()),
        }
    }

    fn from_scale(scale: f64) -> Self {
        Self::from_f64(scale)
    }

    fn from_i64(value: i64) -> Self {
        BigFixed::<FRACTION_BITS>::from_i64(value)
    }

    fn escape_limit() -> Self {
        BigFixed::<FRACTION_BITS>::from_i64(ESCAPE_LIMIT)
    }

    fn plus(&self, rhs: &Self) -> Self {
        self + rhs
    }

    fn minus(&self, rhs: &Self) -> Self {
        self - rhs
    }

    fn times(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn normalize(&mut self) {}

    fn check_end_condition(&self, limit: &Self) -> bool {
        self > limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::numeric::big_fixed::Float80;

    #[test]
    fn test_scaling_shifts() {
        assert_eq!(<f32 as KernelNumber>::SCALING_SHIFT, 0);
        assert_eq!(<f64 as KernelNumber>::SCALING_SHIFT, 0);
        assert_eq!(<i32 as KernelNumber>::SCALING_SHIFT, 10);
        assert_eq!(<i64 as KernelNumber>::SCALING_SHIFT, 26);
        assert_eq!(<i128 as KernelNumber>::SCALING_SHIFT, 56);
        assert_eq!(<Float80 as KernelNumber>::SCALING_SHIFT, 0);
    }

    #[test]
    fn test_escape_limits_are_scaled() {
        assert_eq!(<f64 as KernelNumber>::escape_limit(), 4.0);
        assert_eq!(<i32 as KernelNumber>::escape_limit(), 4 << 20);
        assert_eq!(<i64 as KernelNumber>::escape_limit(), 4i64 << 52);
        assert_eq!(<i128 as KernelNumber>::escape_limit(), 4i128 << 112);
        assert_eq!(
            <Float80 as KernelNumber>::escape_limit(),
            Float80::from_i64(4)
        );
    }

    #[test]
    fn test_fixed_point_square_normalizes_back() {
        let half = <i64 as KernelNumber>::from_scale(0.5);
        let mut square = half.times(&half);
        square.normalize();

        assert_eq!(square, <i64 as KernelNumber>::from_scale(0.25));
    }

    #[test]
    fn test_i128_bridge_scaling() {
        let value = <i128 as KernelNumber>::from_scale(-1.5);

        assert_eq!(value, -(3i128 << 55));
    }

    #[test]
    fn test_integer_end_condition_treats_negative_as_escape() {
        assert!((-1i32).check_end_condition(&100));
        assert!(101i32.check_end_condition(&100));
        assert!(!50i32.check_end_condition(&100));
        assert!(!(-1.0f64).check_end_condition(&4.0));
    }

    #[test]
    fn test_big_fixed_prefers_precise_text() {
        let precise = CoordValue::parse("0.1").unwrap();
        let approx = CoordValue::from_f64(0.1);

        let from_text = <Float80 as KernelNumber>::from_coordinate(&precise);
        let from_double = <Float80 as KernelNumber>::from_coordinate(&approx);

        assert_ne!(from_text, from_double);
        assert!((from_text.to_f64() - 0.1).abs() < 1e-17);
    }
}
