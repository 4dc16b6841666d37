use crate::core::kernel::compute_task::calc_max_iterations;

pub const MIN_COLOUR_MAP_SIZE: usize = 128;
pub const MAX_COLOUR_MAP_SIZE: usize = 32768;
pub const DEFAULT_COLOUR_MAP_SIZE: usize = 4096;

const MIN_WAVELENGTH_NM: f64 = 380.0;
const WAVELENGTH_SPAN_NM: f64 = 400.0;
const GAMMA: f64 = 0.8;

/// Packs 8-bit channels as opaque `0xFFRRGGBB`.
#[must_use]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Approximate RGB of visible light at `wavelength` nanometres.
#[must_use]
pub fn rgb_from_wavelength(wavelength: f64) -> u32 {
    let (r, g, b) = if (380.0..=440.0).contains(&wavelength) {
        (-(wavelength - 440.0) / (440.0 - 380.0), 0.0, 1.0)
    } else if (440.0..=490.0).contains(&wavelength) {
        (0.0, (wavelength - 440.0) / (490.0 - 440.0), 1.0)
    } else if (490.0..=510.0).contains(&wavelength) {
        (0.0, 1.0, -(wavelength - 510.0) / (510.0 - 490.0))
    } else if (510.0..=580.0).contains(&wavelength) {
        ((wavelength - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if (580.0..=645.0).contains(&wavelength) {
        (1.0, -(wavelength - 645.0) / (645.0 - 580.0), 0.0)
    } else if (645.0..=780.0).contains(&wavelength) {
        (1.0, 0.0, 0.0)
    } else {
        (0.0, 0.0, 0.0)
    };

    // intensity falls off towards the edges of vision
    let s = if wavelength > 700.0 {
        0.3 + 0.7 * (780.0 - wavelength) / (780.0 - 700.0)
    } else if wavelength < 420.0 {
        0.3 + 0.7 * (wavelength - 380.0) / (420.0 - 380.0)
    } else {
        1.0
    };

    let channel = |value: f64| ((value * s).powf(GAMMA) * 255.0) as u8;

    pack_rgb(channel(r), channel(g), channel(b))
}

/// Spectrum colour map indexed by scaled iteration count.
#[derive(Debug, Clone, PartialEq)]
pub struct ColourMap {
    colours: Vec<u32>,
    iteration_colour_scale: f64,
}

impl ColourMap {
    /// Builds a map of `size` spectrum entries spread so that the final
    /// pass's iteration budget spans the whole table.
    #[must_use]
    pub fn new(size: usize, final_pass: u32) -> Self {
        let size = size.max(1);

        let step = WAVELENGTH_SPAN_NM / size as f64;
        let colours = (0..size)
            .map(|i| rgb_from_wavelength(MIN_WAVELENGTH_NM + i as f64 * step))
            .collect();

        Self {
            colours,
            iteration_colour_scale: f64::from(calc_max_iterations(final_pass)) / size as f64,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    #[must_use]
    pub fn iteration_colour_scale(&self) -> f64 {
        self.iteration_colour_scale
    }

    #[inline]
    #[must_use]
    pub fn colour_for(&self, iterations: u32) -> u32 {
        let index = (f64::from(iterations) * self.iteration_colour_scale) as usize;
        self.colours[index % self.colours.len()]
    }
}
