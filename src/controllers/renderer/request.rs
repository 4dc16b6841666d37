use crate::controllers::renderer::errors::RenderRequestError;
use crate::core::data::coordinate::CoordValue;
use crate::core::data::render_image::validate_image_size;
use crate::core::kernel::compute_task::FractalSet;

/// What to render: the view into the complex plane and the image size.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub width: u32,
    pub height: u32,
    pub origin_x: CoordValue,
    pub origin_y: CoordValue,
    /// Distance between neighbouring pixels in the complex plane.
    pub scale: f64,
    pub set: FractalSet,
}

impl RenderRequest {
    #[must_use]
    pub fn mandelbrot(
        width: u32,
        height: u32,
        origin_x: CoordValue,
        origin_y: CoordValue,
        scale: f64,
    ) -> Self {
        Self {
            width,
            height,
            origin_x,
            origin_y,
            scale,
            set: FractalSet::Mandelbrot,
        }
    }

    #[must_use]
    pub fn with_set(mut self, set: FractalSet) -> Self {
        self.set = set;
        self
    }

    pub fn validate(&self) -> Result<(), RenderRequestError> {
        validate_image_size(self.width, self.height)?;

        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RenderRequestError::InvalidScale(self.scale));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::render_image::{MAX_RENDER_HEIGHT, MAX_RENDER_WIDTH};

    fn create_request(width: u32, height: u32, scale: f64) -> RenderRequest {
        RenderRequest::mandelbrot(
            width,
            height,
            CoordValue::from_f64(-0.5),
            CoordValue::from_f64(0.0),
            scale,
        )
    }

    #[test]
    fn test_valid_request() {
        assert!(create_request(100, 100, 0.01).validate().is_ok());
        assert!(
            create_request(MAX_RENDER_WIDTH, MAX_RENDER_HEIGHT, 0.01)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_invalid_size_rejected() {
        assert!(matches!(
            create_request(0, 100, 0.01).validate(),
            Err(RenderRequestError::InvalidSize(_))
        ));
        assert!(matches!(
            create_request(100, MAX_RENDER_HEIGHT + 1, 0.01).validate(),
            Err(RenderRequestError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                create_request(10, 10, scale).validate(),
                Err(RenderRequestError::InvalidScale(_))
            ));
        }
    }

    #[test]
    fn test_with_set_switches_to_julia() {
        let set = FractalSet::Julia {
            seed_x: CoordValue::from_f64(-0.8),
            seed_y: CoordValue::from_f64(0.156),
        };
        let request = create_request(10, 10, 0.01).with_set(set.clone());

        assert_eq!(request.set, set);
    }
}
