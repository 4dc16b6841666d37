use crate::core::numeric::numeric_type::NumericType;

/// A configuration value was refused at the call boundary; the previous
/// value stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("worker thread count {requested} is outside 1..={max}")]
    ThreadCountOutOfRange { requested: usize, max: usize },
    #[error("numeric type code {0} is not known")]
    UnknownNumericType(i32),
    #[error("numeric type {0} is not supported in this build")]
    UnsupportedNumericType(NumericType),
    #[error("pass count {requested} is not one of {allowed:?}")]
    PassCountNotAllowed {
        requested: u32,
        allowed: &'static [u32],
    },
    #[error("colour map size {requested} is outside {min}..={max}")]
    ColourMapSizeOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderRequestError {
    #[error(transparent)]
    InvalidSize(#[from] crate::core::data::render_image::RenderImageError),
    #[error("scale {0} must be finite and positive")]
    InvalidScale(f64),
    #[error("orchestrator has shut down")]
    ShutDown,
}
