use crate::core::data::region::Region;
use rayon::prelude::*;
use std::sync::Mutex;

/// Opaque black in packed `0xAARRGGBB` form.
pub const BLACK: u32 = 0xFF00_0000;

/// Largest image the renderer accepts.
pub const MAX_RENDER_WIDTH: u32 = 4096;
pub const MAX_RENDER_HEIGHT: u32 = 3072;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderImageError {
    #[error("image size {width}x{height} is outside 1x1..={max_width}x{max_height}")]
    InvalidSize {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    #[error("segment rows [{first_scanline}, {end_scanline}) fall outside image height {height}")]
    RowsOutsideImage {
        first_scanline: i32,
        end_scanline: i32,
        height: u32,
    },
    #[error("segment width {segment_width} does not match image width {width}")]
    WidthMismatch { segment_width: usize, width: u32 },
}

pub fn validate_image_size(width: u32, height: u32) -> Result<(), RenderImageError> {
    if width == 0 || height == 0 || width > MAX_RENDER_WIDTH || height > MAX_RENDER_HEIGHT {
        return Err(RenderImageError::InvalidSize {
            width,
            height,
            max_width: MAX_RENDER_WIDTH,
            max_height: MAX_RENDER_HEIGHT,
        });
    }

    Ok(())
}

/// Destination image shared by every worker of a run.
///
/// Segments are drawn in whole rows under a short lock; rows never overlap
/// within a pass so the lock only orders whole-row copies.
#[derive(Debug)]
pub struct RenderImage {
    width: u32,
    height: u32,
    pixels: Mutex<Vec<u32>>,
}

impl RenderImage {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderImageError> {
        validate_image_size(width, height)?;

        Ok(Self {
            width,
            height,
            pixels: Mutex::new(vec![BLACK; width as usize * height as usize]),
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copies the rows of `raw_data`, laid out for `region`, onto their scanlines.
    pub fn draw_region(&self, region: &Region, raw_data: &[u32]) -> Result<(), RenderImageError> {
        let width = region.width();

        if width != self.width as usize {
            return Err(RenderImageError::WidthMismatch {
                segment_width: width,
                width: self.width,
            });
        }

        let first_scanline = region.scanline(region.min_y());
        let end_scanline = region.scanline(region.max_y());

        if first_scanline < 0 || end_scanline > self.height as i32 {
            return Err(RenderImageError::RowsOutsideImage {
                first_scanline,
                end_scanline,
                height: self.height,
            });
        }

        let rows = region.rows();
        let start = first_scanline as usize * width;
        let mut pixels = self.pixels.lock().unwrap_or_else(|e| e.into_inner());
        pixels[start..start + rows * width].copy_from_slice(&raw_data[..rows * width]);

        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> ImageSnapshot {
        let pixels = self.pixels.lock().unwrap_or_else(|e| e.into_inner());

        ImageSnapshot {
            width: self.width,
            height: self.height,
            pixels: pixels.clone(),
        }
    }
}

/// An owned copy of the image at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSnapshot {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl ImageSnapshot {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Sum of every byte of the packed pixels, little-endian.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        self.pixels
            .par_iter()
            .map(|pixel| {
                pixel
                    .to_le_bytes()
                    .iter()
                    .map(|&b| u64::from(b))
                    .sum::<u64>()
            })
            .sum()
    }

    /// Packed pixels as tightly packed RGB triples.
    #[must_use]
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .par_iter()
            .flat_map_iter(|pixel| {
                let [b, g, r, _] = pixel.to_le_bytes();
                [r, g, b]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::coordinate::CoordValue;

    fn create_region(width: i32, height: i32, min_y: i32, max_y: i32) -> Region {
        Region::new(
            0.01,
            CoordValue::from_f64(0.0),
            CoordValue::from_f64(0.0),
            -(width / 2),
            -(width / 2) + width,
            min_y,
            max_y,
            height,
        )
        .unwrap()
    }

    #[test]
    fn test_new_creates_black_image() {
        let image = RenderImage::new(4, 3).unwrap();
        let snapshot = image.snapshot();

        assert_eq!(snapshot.pixels().len(), 12);
        assert!(snapshot.pixels().iter().all(|&p| p == BLACK));
    }

    #[test]
    fn test_new_rejects_invalid_sizes() {
        assert!(RenderImage::new(0, 10).is_err());
        assert!(RenderImage::new(10, 0).is_err());
        assert!(RenderImage::new(MAX_RENDER_WIDTH + 1, 10).is_err());
        let largest = RenderImage::new(MAX_RENDER_WIDTH, MAX_RENDER_HEIGHT);
        assert!(largest.is_ok());
    }

    #[test]
    fn test_draw_region_places_rows_on_scanlines() {
        let image = RenderImage::new(4, 4).unwrap();
        let region = create_region(4, 4, 0, 1);
        let mut data = vec![BLACK; region.compute_raw_data_size()];
        data[..4].copy_from_slice(&[1, 2, 3, 4]);

        image.draw_region(&region, &data).unwrap();
        let snapshot = image.snapshot();

        assert_eq!(snapshot.pixel(0, 2), Some(1));
        assert_eq!(snapshot.pixel(3, 2), Some(4));
        assert_eq!(snapshot.pixel(0, 1), Some(BLACK));
    }

    #[test]
    fn test_draw_region_rejects_width_mismatch() {
        let image = RenderImage::new(4, 4).unwrap();
        let region = create_region(6, 4, 0, 1);
        let data = vec![BLACK; region.compute_raw_data_size()];

        assert_eq!(
            image.draw_region(&region, &data),
            Err(RenderImageError::WidthMismatch {
                segment_width: 6,
                width: 4
            })
        );
    }

    #[test]
    fn test_checksum_sums_all_bytes() {
        let image = RenderImage::new(2, 1).unwrap();
        let snapshot = image.snapshot();

        assert_eq!(snapshot.checksum(), 2 * 0xFF);
    }

    #[test]
    fn test_to_rgb_bytes_drops_alpha() {
        let image = RenderImage::new(1, 1).unwrap();
        let region = create_region(1, 1, 0, 1);
        let mut data = vec![BLACK; region.compute_raw_data_size()];
        data[0] = 0xFF11_2233;
        image.draw_region(&region, &data).unwrap();

        assert_eq!(image.snapshot().to_rgb_bytes(), vec![0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_pixel_out_of_bounds_is_none() {
        let snapshot = RenderImage::new(2, 2).unwrap().snapshot();

        assert_eq!(snapshot.pixel(2, 0), None);
        assert_eq!(snapshot.pixel(0, 2), None);
    }
}
