use crate::core::data::coordinate::CoordValue;
use crate::core::data::region::{Region, RegionError};

// Added to the height before dividing so the final strip reaches the bottom row.
const ROUND_OFF_CORRECTION: f64 = 0.25;

/// First row of an image `height` rows tall, with rows centred on zero.
#[must_use]
pub fn top_row(height: u32) -> i32 {
    -((height / 2) as i32)
}

/// Number of strips to cut `height` rows into; never more strips than rows.
#[must_use]
pub fn calculate_strips(max_strips: usize, height: u32) -> usize {
    max_strips.clamp(1, (height as usize).max(1))
}

/// Row ranges `[start, end)` of `strips` horizontal strips tiling an image
/// `height` rows tall, top to bottom.
#[must_use]
pub fn partition_rows(height: u32, strips: usize) -> Vec<(i32, i32)> {
    let strips = calculate_strips(strips, height);
    let top = top_row(height);
    let bottom = top + height as i32;
    let step = (f64::from(height) + ROUND_OFF_CORRECTION) / strips as f64;

    let boundary = |i: usize| -> i32 {
        if i >= strips {
            bottom
        } else {
            (top + (i as f64 * step).floor() as i32).min(bottom)
        }
    };

    (0..strips)
        .map(|i| (boundary(i), boundary(i + 1)))
        .collect()
}

/// Whole-image region for the given view; the template for every strip.
pub fn full_image_region(
    scale: f64,
    origin_x: &CoordValue,
    origin_y: &CoordValue,
    width: u32,
    height: u32,
) -> Result<Region, RegionError> {
    let min_x = -((width / 2) as i32);
    let top = top_row(height);

    Region::new(
        scale,
        origin_x.clone(),
        origin_y.clone(),
        min_x,
        min_x + width as i32,
        top,
        top + height as i32,
        height as i32,
    )
}

/// Cuts `template` into `strips` regions covering every row exactly once.
pub fn strip_regions(template: &Region, strips: usize) -> Result<Vec<Region>, RegionError> {
    let height = template.full_height() as u32;

    partition_rows(height, strips)
        .into_iter()
        .map(|(min_y, max_y)| {
            Region::new(
                template.scale(),
                template.origin_x().clone(),
                template.origin_y().clone(),
                template.min_x(),
                template.max_x(),
                min_y,
                max_y,
                template.full_height(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tiles(height: u32, strips: usize) {
        let rows = partition_rows(height, strips);
        let top = top_row(height);

        assert_eq!(rows.first().unwrap().0, top);
        assert_eq!(rows.last().unwrap().1, top + height as i32);

        for pair in rows.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }

        for (start, end) in &rows {
            assert!(start < end, "empty strip in {:?}", rows);
        }

        let total: i32 = rows.iter().map(|(s, e)| e - s).sum();
        assert_eq!(total, height as i32);
    }

    #[test]
    fn test_single_strip_covers_image() {
        assert_eq!(partition_rows(100, 1), vec![(-50, 50)]);
    }

    #[test]
    fn test_strips_tile_exactly() {
        for height in [1, 2, 3, 7, 99, 100, 101, 480, 3072] {
            for strips in 1..=10 {
                assert_tiles(height, strips);
            }
        }
    }

    #[test]
    fn test_three_strips_of_hundred_rows() {
        assert_eq!(
            partition_rows(100, 3),
            vec![(-50, -17), (-17, 16), (16, 50)]
        );
    }

    #[test]
    fn test_strips_never_exceed_rows() {
        assert_eq!(calculate_strips(10, 3), 3);
        assert_eq!(calculate_strips(4, 100), 4);
        assert_eq!(calculate_strips(0, 100), 1);
        assert_eq!(partition_rows(2, 10).len(), 2);
    }

    #[test]
    fn test_strip_regions_share_view() {
        let template = full_image_region(
            0.01,
            &CoordValue::from_f64(-0.5),
            &CoordValue::from_f64(0.25),
            101,
            40,
        )
        .unwrap();
        let strips = strip_regions(&template, 4).unwrap();

        assert_eq!(template.min_x(), -50);
        assert_eq!(template.width(), 101);
        assert_eq!(strips.len(), 4);
        for strip in &strips {
            assert_eq!(strip.width(), 101);
            assert_eq!(strip.origin_x(), template.origin_x());
            assert_eq!(strip.full_height(), 40);
        }
        assert_eq!(strips[0].min_y(), -20);
        assert_eq!(strips[3].max_y(), 20);
    }
}
