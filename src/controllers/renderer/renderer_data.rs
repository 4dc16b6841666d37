use crate::controllers::renderer::config::RendererConfig;
use crate::core::numeric::numeric_type::NumericType;

/// Settings a run is started with. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub worker_threads: usize,
    pub passes: u32,
    pub dynamic_allocation: bool,
    pub colour_map_size: usize,
    pub numeric_type: NumericType,
}

/// Renderer settings shared between the orchestrator and its callers.
///
/// Callers change the pending values at any time; they are copied into
/// the active values when the next run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererData {
    pub hardware_threads: usize,
    pub pending_worker_threads: usize,
    pub active_worker_threads: usize,
    pub next_passes: u32,
    pub current_passes: u32,
    pub dynamic_allocation: bool,
    pub colour_map_size: usize,
    pub numeric_type: NumericType,
    /// Iterations summed over every pixel of the last finished run.
    pub iteration_sum: u64,
}

impl RendererData {
    #[must_use]
    pub fn from_config(config: &RendererConfig) -> Self {
        Self {
            hardware_threads: config.hardware_threads,
            pending_worker_threads: config.worker_threads,
            active_worker_threads: config.worker_threads,
            next_passes: config.passes,
            current_passes: config.passes,
            dynamic_allocation: config.dynamic_allocation,
            colour_map_size: config.colour_map_size,
            numeric_type: config.numeric_type,
            iteration_sum: 0,
        }
    }

    /// Applies the pending values and returns what the new run uses.
    pub fn begin_run(&mut self) -> RunSettings {
        self.active_worker_threads = self.pending_worker_threads;
        self.current_passes = self.next_passes;

        RunSettings {
            worker_threads: self.active_worker_threads,
            passes: self.current_passes,
            dynamic_allocation: self.dynamic_allocation,
            colour_map_size: self.colour_map_size,
            numeric_type: self.numeric_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_config() -> RendererConfig {
        RendererConfig {
            hardware_threads: 8,
            worker_threads: 2,
            passes: 4,
            dynamic_allocation: false,
            colour_map_size: 512,
            numeric_type: NumericType::Int64,
        }
    }

    #[test]
    fn test_pending_values_apply_at_run_start() {
        let mut data = RendererData::from_config(&create_config());
        data.pending_worker_threads = 5;
        data.next_passes = 8;

        assert_eq!(data.active_worker_threads, 2);
        assert_eq!(data.current_passes, 4);

        let settings = data.begin_run();

        assert_eq!(settings.worker_threads, 5);
        assert_eq!(settings.passes, 8);
        assert_eq!(settings.numeric_type, NumericType::Int64);
        assert!(!settings.dynamic_allocation);
        assert_eq!(data.active_worker_threads, 5);
        assert_eq!(data.current_passes, 8);
    }
}
