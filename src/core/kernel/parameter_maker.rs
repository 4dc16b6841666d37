use crate::core::data::region::Region;
use crate::core::numeric::kernel_number::KernelNumber;

/// Region parameters converted into the kernel's numeric type, with
/// fixed-point scaling already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelParams<T: KernelNumber> {
    pub scaling_shift: u32,
    pub origin_x: T,
    pub origin_y: T,
    pub scale: T,
    pub limit: T,
}

impl<T: KernelNumber> KernelParams<T> {
    #[must_use]
    pub fn new(region: &Region) -> Self {
        Self {
            scaling_shift: T::SCALING_SHIFT,
            origin_x: T::from_coordinate(region.origin_x()),
            origin_y: T::from_coordinate(region.origin_y()),
            scale: T::from_scale(region.scale()),
            limit: T::escape_limit(),
        }
    }

    /// Coordinate of pixel column `x`.
    #[inline]
    #[must_use]
    pub fn real_at(&self, x: i32) -> T {
        let offset = T::from_i64(i64::from(x)).times(&self.scale);
        self.origin_x.plus(&offset)
    }

    /// Coordinate of pixel row `y`.
    #[inline]
    #[must_use]
    pub fn imag_at(&self, y: i32) -> T {
        let offset = T::from_i64(i64::from(y)).times(&self.scale);
        self.origin_y.plus(&offset)
    }
}
