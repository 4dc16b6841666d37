use crate::core::data::coordinate::{CoordValue, values_match};
use crate::core::data::render_image::{MAX_RENDER_HEIGHT, MAX_RENDER_WIDTH};
use crate::core::numeric::numeric_type::NumericType;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum RenderStateError {
    #[error("failed to encode render state: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode render state: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("render size {width}x{height} is not between 1x1 and {max_width}x{max_height}")]
    IllegalSize {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
}

/// Everything needed to show a view again: where it was, how it was
/// rendered and how the window was laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderState {
    pub detailed_display: bool,
    pub width: u32,
    pub height: u32,
    pub position_x: i32,
    pub position_y: i32,
    pub origin_x: CoordValue,
    pub origin_y: CoordValue,
    pub scale: f64,
    pub pixmap_scale: f64,
    pub dynamic_allocation: bool,
    pub colour_map_size: usize,
    pub numeric_type: NumericType,
}

impl RenderState {
    pub fn check_legality(&self) -> Result<(), RenderStateError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_RENDER_WIDTH
            || self.height > MAX_RENDER_HEIGHT
        {
            return Err(RenderStateError::IllegalSize {
                width: self.width,
                height: self.height,
                max_width: MAX_RENDER_WIDTH,
                max_height: MAX_RENDER_HEIGHT,
            });
        }

        Ok(())
    }

    pub fn encode(&self) -> Result<String, RenderStateError> {
        serde_json::to_string(self).map_err(RenderStateError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, RenderStateError> {
        serde_json::from_str(text).map_err(RenderStateError::Decode)
    }
}

impl PartialEq for RenderState {
    fn eq(&self, other: &Self) -> bool {
        self.detailed_display == other.detailed_display
            && self.width == other.width
            && self.height == other.height
            && self.position_x == other.position_x
            && self.position_y == other.position_y
            && self.origin_x == other.origin_x
            && self.origin_y == other.origin_y
            && values_match(self.scale, other.scale)
            && values_match(self.pixmap_scale, other.pixmap_scale)
            && self.dynamic_allocation == other.dynamic_allocation
            && self.colour_map_size == other.colour_map_size
            && self.numeric_type == other.numeric_type
    }
}
