use crate::controllers::renderer::errors::ConfigError;
use crate::core::actions::render_pass::mediator::MAX_NUM_WORKER_THREADS;
use crate::core::colour::colour_map::{
    DEFAULT_COLOUR_MAP_SIZE, MAX_COLOUR_MAP_SIZE, MIN_COLOUR_MAP_SIZE,
};
use crate::core::numeric::numeric_type::NumericType;
use std::thread;

/// Pass counts a run may be configured with.
pub const PASS_COUNT_MENU: [u32; 4] = [4, 6, 7, 8];
pub const MAX_PASSES: u32 = 8;
pub const DEFAULT_PASSES: u32 = 6;

// Threads left over for the caller and the orchestrator itself.
const RESERVED_HARDWARE_THREADS: usize = 2;

/// Most worker threads worth running on `hardware_threads` cores.
#[must_use]
pub fn max_worker_threads(hardware_threads: usize) -> usize {
    hardware_threads
        .saturating_sub(RESERVED_HARDWARE_THREADS)
        .clamp(1, MAX_NUM_WORKER_THREADS)
}

pub fn validate_worker_threads(
    requested: usize,
    hardware_threads: usize,
) -> Result<usize, ConfigError> {
    let max = max_worker_threads(hardware_threads);

    if requested == 0 || requested > max {
        return Err(ConfigError::ThreadCountOutOfRange { requested, max });
    }

    Ok(requested)
}

pub fn validate_passes(requested: u32) -> Result<u32, ConfigError> {
    if !PASS_COUNT_MENU.contains(&requested) {
        return Err(ConfigError::PassCountNotAllowed {
            requested,
            allowed: &PASS_COUNT_MENU,
        });
    }

    Ok(requested)
}

pub fn validate_colour_map_size(requested: usize) -> Result<usize, ConfigError> {
    if !(MIN_COLOUR_MAP_SIZE..=MAX_COLOUR_MAP_SIZE).contains(&requested) {
        return Err(ConfigError::ColourMapSizeOutOfRange {
            requested,
            min: MIN_COLOUR_MAP_SIZE,
            max: MAX_COLOUR_MAP_SIZE,
        });
    }

    Ok(requested)
}

pub fn validate_numeric_type(numeric_type: NumericType) -> Result<NumericType, ConfigError> {
    if !numeric_type.is_supported() {
        return Err(ConfigError::UnsupportedNumericType(numeric_type));
    }

    Ok(numeric_type)
}

pub fn numeric_type_from_code(code: i32) -> Result<NumericType, ConfigError> {
    let numeric_type =
        NumericType::from_code(code).map_err(|_| ConfigError::UnknownNumericType(code))?;

    validate_numeric_type(numeric_type)
}

/// Settings the orchestrator starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    pub hardware_threads: usize,
    pub worker_threads: usize,
    pub passes: u32,
    pub dynamic_allocation: bool,
    pub colour_map_size: usize,
    pub numeric_type: NumericType,
}

impl Default for RendererConfig {
    fn default() -> Self {
        let hardware_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            hardware_threads,
            worker_threads: max_worker_threads(hardware_threads),
            passes: DEFAULT_PASSES,
            dynamic_allocation: true,
            colour_map_size: DEFAULT_COLOUR_MAP_SIZE,
            numeric_type: NumericType::default(),
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_worker_threads(self.worker_threads, self.hardware_threads)?;
        validate_passes(self.passes)?;
        validate_colour_map_size(self.colour_map_size)?;
        validate_numeric_type(self.numeric_type)?;

        Ok(())
    }
}
