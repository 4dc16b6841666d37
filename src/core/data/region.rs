use crate::core::data::coordinate::{CoordValue, values_match};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("empty region bounds x:[{min_x}, {max_x}) y:[{min_y}, {max_y})")]
    EmptyBounds {
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
    },
    #[error("scale factor {0} must be finite and positive")]
    InvalidScale(f64),
}

/// A strip of pixels and the mathematical coordinates it maps onto.
///
/// Pixel coordinates are centred on the origin: column `x` maps to
/// `origin_x + x * scale`. Rows are absolute image rows in
/// `[-full_height / 2, full_height - full_height / 2)`.
#[derive(Debug, Clone)]
pub struct Region {
    scale: f64,
    origin_x: CoordValue,
    origin_y: CoordValue,
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
    full_height: i32,
}

impl Region {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scale: f64,
        origin_x: CoordValue,
        origin_y: CoordValue,
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
        full_height: i32,
    ) -> Result<Self, RegionError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RegionError::InvalidScale(scale));
        }

        if min_x >= max_x || min_y >= max_y {
            return Err(RegionError::EmptyBounds {
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }

        Ok(Self {
            scale,
            origin_x,
            origin_y,
            min_x,
            max_x,
            min_y,
            max_y,
            full_height,
        })
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn origin_x(&self) -> &CoordValue {
        &self.origin_x
    }

    #[must_use]
    pub fn origin_y(&self) -> &CoordValue {
        &self.origin_y
    }

    #[must_use]
    pub fn min_x(&self) -> i32 {
        self.min_x
    }

    #[must_use]
    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    #[must_use]
    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    #[must_use]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    #[must_use]
    pub fn full_height(&self) -> i32 {
        self.full_height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        (self.max_x - self.min_x) as usize
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        (self.max_y - self.min_y) as usize
    }

    /// Allocation size for a result buffer covering this region, with one
    /// spare row and column.
    #[must_use]
    pub fn compute_raw_data_size(&self) -> usize {
        ((self.max_x + 1 - self.min_x) * (self.max_y + 1 - self.min_y)) as usize
    }

    /// Offset of pixel `(x, y)` inside a buffer laid out for this region.
    #[must_use]
    pub fn pixel_index(&self, x: i32, y: i32) -> usize {
        (y - self.min_y) as usize * self.width() + (x - self.min_x) as usize
    }

    /// Image scanline for the absolute row `y`.
    #[must_use]
    pub fn scanline(&self, y: i32) -> i32 {
        y + self.full_height / 2
    }

    /// Splits the rows still to be computed from `current_y` at their midpoint.
    ///
    /// The lower half keeps `[boundary, max_y)` and is the part handed to
    /// another worker; the upper half keeps `[min_y, boundary)` and stays with
    /// the donor.
    pub fn adjust_y_values(&mut self, current_y: i32, is_lower_half: bool) {
        let remaining_rows = self.max_y - current_y;
        let boundary = current_y + remaining_rows / 2;

        if is_lower_half {
            self.min_y = boundary;
        } else {
            self.max_y = boundary;
        }
    }

    #[must_use]
    pub fn same_bounds(&self, other: &Region) -> bool {
        self.min_x == other.min_x
            && self.max_x == other.max_x
            && self.min_y == other.min_y
            && self.max_y == other.max_y
            && self.full_height == other.full_height
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        values_match(self.scale, other.scale)
            && self.origin_x == other.origin_x
            && self.origin_y == other.origin_y
            && self.same_bounds(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_region(min_y: i32, max_y: i32) -> Region {
        Region::new(
            0.01,
            CoordValue::from_f64(-0.5),
            CoordValue::from_f64(0.0),
            -50,
            50,
            min_y,
            max_y,
            100,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_empty_bounds() {
        let result = Region::new(
            0.01,
            CoordValue::from_f64(0.0),
            CoordValue::from_f64(0.0),
            0,
            10,
            5,
            5,
            10,
        );

        assert_eq!(
            result.unwrap_err(),
            RegionError::EmptyBounds {
                min_x: 0,
                max_x: 10,
                min_y: 5,
                max_y: 5
            }
        );
    }

    #[test]
    fn test_new_rejects_bad_scale() {
        let result = Region::new(
            0.0,
            CoordValue::from_f64(0.0),
            CoordValue::from_f64(0.0),
            0,
            10,
            0,
            10,
            10,
        );

        assert_eq!(result.unwrap_err(), RegionError::InvalidScale(0.0));
    }

    #[test]
    fn test_compute_raw_data_size_includes_spare_row_and_column() {
        let region = create_region(0, 10);

        assert_eq!(region.compute_raw_data_size(), 101 * 11);
        assert!(region.compute_raw_data_size() >= region.width() * region.rows());
    }

    #[test]
    fn test_adjust_y_values_splits_without_gap_or_overlap() {
        let original = create_region(0, 100);

        let mut donation = original.clone();
        donation.adjust_y_values(40, true);

        let mut continuation = original.clone();
        continuation.adjust_y_values(40, false);

        assert_eq!(continuation.min_y(), 0);
        assert_eq!(continuation.max_y(), 70);
        assert_eq!(donation.min_y(), 70);
        assert_eq!(donation.max_y(), 100);
        assert_eq!(continuation.max_y(), donation.min_y());
    }

    #[test]
    fn test_adjust_y_values_odd_remainder_rounds_down() {
        let mut donation = create_region(-50, 50);
        donation.adjust_y_values(-10, true);

        let mut continuation = create_region(-50, 50);
        continuation.adjust_y_values(-10, false);

        assert_eq!(continuation.max_y(), 20);
        assert_eq!(donation.min_y(), 20);
        assert_eq!(donation.max_y(), 50);
    }

    #[test]
    fn test_scanline_maps_top_row_to_zero() {
        let region = create_region(-50, 50);

        assert_eq!(region.scanline(-50), 0);
        assert_eq!(region.scanline(49), 99);
    }

    #[test]
    fn test_pixel_index_is_row_major() {
        let region = create_region(10, 20);

        assert_eq!(region.pixel_index(-50, 10), 0);
        assert_eq!(region.pixel_index(-49, 10), 1);
        assert_eq!(region.pixel_index(-50, 11), 100);
    }

    #[test]
    fn test_equality_tolerates_small_float_drift() {
        let a = create_region(0, 10);
        let b = Region::new(
            0.010000001,
            CoordValue::from_f64(-0.50000001),
            CoordValue::from_f64(0.0),
            -50,
            50,
            0,
            10,
            100,
        )
        .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, create_region(0, 11));
    }
}
