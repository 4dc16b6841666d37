use crate::core::actions::cancellation::CancelToken;
use crate::core::data::segment::Segment;

/// Computes one row of a segment into the segment's own buffer.
pub trait RowKernel: Send {
    fn compute_row(&self, segment: &mut Segment, y: i32, cancel: &dyn CancelToken);
}
