use crate::core::actions::cancellation::{CANCEL_CHECK_INTERVAL_PIXELS, CancelToken};
use crate::core::actions::render_pass::ports::row_kernel::RowKernel;
use crate::core::colour::colour_map::ColourMap;
use crate::core::data::coordinate::CoordValue;
use crate::core::data::region::Region;
use crate::core::data::segment::Segment;
use crate::core::kernel::parameter_maker::KernelParams;
use crate::core::numeric::kernel_number::KernelNumber;
use std::sync::Arc;

/// Iteration budget for a zero-based pass number.
#[must_use]
pub const fn calc_max_iterations(pass: u32) -> u32 {
    (1 << (2 * pass + 6)) + 32
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FractalSet {
    #[default]
    Mandelbrot,
    Julia {
        seed_x: CoordValue,
        seed_y: CoordValue,
    },
}

/// Escape-time kernel for one pass, computed in numeric type `T`.
#[derive(Debug, Clone)]
pub struct ComputeTask<T: KernelNumber> {
    params: KernelParams<T>,
    julia_seed: Option<(T, T)>,
    two: T,
    max_iterations: u32,
    colour_map: Arc<ColourMap>,
}

impl<T: KernelNumber> ComputeTask<T> {
    /// `template` supplies the origin and scale shared by every segment of the pass.
    #[must_use]
    pub fn new(template: &Region, set: &FractalSet, pass: u32, colour_map: Arc<ColourMap>) -> Self {
        let julia_seed = match set {
            FractalSet::Mandelbrot => None,
            FractalSet::Julia { seed_x, seed_y } => {
                Some((T::from_coordinate(seed_x), T::from_coordinate(seed_y)))
            }
        };

        Self {
            params: KernelParams::new(template),
            julia_seed,
            two: T::from_i64(2),
            max_iterations: calc_max_iterations(pass),
            colour_map,
        }
    }

    #[inline]
    fn iterate(&self, pixel_x: &T, pixel_y: &T) -> u32 {
        let (cx, cy) = match &self.julia_seed {
            Some((seed_x, seed_y)) => (seed_x, seed_y),
            None => (pixel_x, pixel_y),
        };
        let limit = &self.params.limit;

        let mut a1 = pixel_x.clone();
        let mut b1 = pixel_y.clone();
        let mut iterations: u32 = 0;

        loop {
            iterations += 1;
            let mut a2 = a1.times(&a1).minus(&b1.times(&b1));
            a2.normalize();
            let a2 = a2.plus(cx);

            let mut b2 = self.two.times(&a1).times(&b1);
            b2.normalize();
            let b2 = b2.plus(cy);

            if a2
                .times(&a2)
                .plus(&b2.times(&b2))
                .check_end_condition(limit)
            {
                break;
            }

            iterations += 1;
            a1 = a2.times(&a2).minus(&b2.times(&b2));
            a1.normalize();
            a1 = a1.plus(cx);

            b1 = self.two.times(&a2).times(&b2);
            b1.normalize();
            b1 = b1.plus(cy);

            if a1
                .times(&a1)
                .plus(&b1.times(&b1))
                .check_end_condition(limit)
            {
                break;
            }

            if iterations >= self.max_iterations {
                break;
            }
        }

        iterations
    }
}

impl<T: KernelNumber> RowKernel for ComputeTask<T> {
    fn compute_row(&self, segment: &mut Segment, y: i32, cancel: &dyn CancelToken) {
        let min_x = segment.region().min_x();
        let max_x = segment.region().max_x();
        let mut pixel_index = segment.region().pixel_index(min_x, y);
        let pixel_y = self.params.imag_at(y);

        for (column, x) in (min_x..max_x).enumerate() {
            if column % CANCEL_CHECK_INTERVAL_PIXELS == 0 && column > 0 && cancel.is_cancelled() {
                return;
            }

            let iterations = self.iterate(&self.params.real_at(x), &pixel_y);

            if iterations < self.max_iterations {
                segment.set_pixel(pixel_index, self.colour_map.colour_for(iterations));
            }

            segment.add_iterations(iterations);
            pixel_index += 1;
        }
    }
}
