use crate::core::data::region::Region;
use crate::core::data::render_image::{BLACK, RenderImage};
use std::sync::Weak;

/// A buffer left over from a previous pass, with the region it was laid out for.
#[derive(Debug)]
pub struct RecycledBuffer {
    pub region: Region,
    pub raw_data: Vec<u32>,
}

/// A region plus the results computed for it so far.
///
/// Exactly one worker mutates a segment at a time; ownership moves between
/// workers through the mediator's handoff slot.
#[derive(Debug, Clone)]
pub struct Segment {
    region: Region,
    image: Weak<RenderImage>,
    raw_data: Vec<u32>,
    iteration_sum: u64,
    index: Option<usize>,
    consumed: bool,
}

impl Segment {
    #[must_use]
    pub fn new(
        region: Region,
        image: Weak<RenderImage>,
        index: usize,
        recycled: Option<RecycledBuffer>,
    ) -> Self {
        let size = region.compute_raw_data_size();

        let raw_data = match recycled {
            Some(buffer) if buffer.raw_data.len() == size && buffer.region == region => {
                buffer.raw_data
            }
            _ => vec![BLACK; size],
        };

        Self {
            region,
            image,
            raw_data,
            iteration_sum: 0,
            index: Some(index),
            consumed: false,
        }
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    #[must_use]
    pub fn image(&self) -> &Weak<RenderImage> {
        &self.image
    }

    #[must_use]
    pub fn raw_data(&self) -> &[u32] {
        &self.raw_data
    }

    #[must_use]
    pub fn iteration_sum(&self) -> u64 {
        self.iteration_sum
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = Some(index);
    }

    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    #[inline]
    pub fn set_pixel(&mut self, pixel_index: usize, colour: u32) {
        self.raw_data[pixel_index] = colour;
    }

    #[inline]
    pub fn add_iterations(&mut self, iterations: u32) {
        self.iteration_sum += u64::from(iterations);
    }

    /// Replaces the region and resizes the buffer to match in one step.
    pub fn change_region(&mut self, region: Region) {
        self.raw_data.resize(region.compute_raw_data_size(), BLACK);
        self.region = region;
    }

    pub fn clear_raw_data(&mut self) {
        self.raw_data.fill(BLACK);
        self.iteration_sum = 0;
    }

    /// Hands the rows below the midpoint of `[current_y, max_y)` to a new
    /// segment with a cleared buffer and keeps the rows above it.
    #[must_use]
    pub fn split_off_lower_half(&mut self, current_y: i32) -> Segment {
        let mut donation = self.clone();

        let mut donated_region = self.region.clone();
        donated_region.adjust_y_values(current_y, true);
        donation.change_region(donated_region);
        donation.clear_raw_data();

        let mut kept_region = self.region.clone();
        kept_region.adjust_y_values(current_y, false);
        self.change_region(kept_region);

        donation
    }

    /// Moves the results out. A segment is consumed at most once.
    pub fn take_raw_data(&mut self) -> Option<RecycledBuffer> {
        if self.consumed {
            return None;
        }

        self.consumed = true;

        Some(RecycledBuffer {
            region: self.region.clone(),
            raw_data: std::mem::take(&mut self.raw_data),
        })
    }
}
