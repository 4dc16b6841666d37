//! One render pass: the image is cut into horizontal strips, one worker
//! thread computes each strip, and workers that run dry take over half of
//! what a busy worker has left.
//!
//! The caller drives passes with [`run_pass`] (any row kernel) or
//! [`run_numeric_pass`] (the escape-time kernel in a chosen numeric type).

pub mod barrier;
pub mod collector;
pub mod handoff;
pub mod mediator;
pub mod partition;
pub mod pause;
pub mod ports;
pub mod worker;

use crate::core::actions::render_pass::collector::SegmentCollector;
use crate::core::actions::render_pass::mediator::MAX_NUM_WORKER_THREADS;
use crate::core::actions::render_pass::partition::strip_regions;
use crate::core::actions::render_pass::ports::row_kernel::RowKernel;
use crate::core::actions::render_pass::worker::{PassResources, Worker};
use crate::core::colour::colour_map::ColourMap;
use crate::core::data::region::{Region, RegionError};
use crate::core::data::render_image::RenderImage;
use crate::core::data::segment::Segment;
use crate::core::kernel::compute_task::{ComputeTask, FractalSet};
use crate::core::numeric::big_fixed::{
    CustomFloat20, Decimal20, Decimal30, Decimal50, Float80, Float128,
};
use crate::core::numeric::kernel_number::KernelNumber;
use crate::core::numeric::numeric_type::NumericType;
use log::debug;
use std::io;
use std::panic;
use std::sync::Arc;

/// What the escape-time kernel needs to know for one pass.
#[derive(Debug, Clone)]
pub struct KernelPlan {
    pub template: Region,
    pub set: FractalSet,
    pub pass: u32,
    pub colour_map: Arc<ColourMap>,
}

/// One segment per strip of `template`, reusing the buffers the collector
/// kept from the previous pass where the geometry still matches.
pub fn prepare_segments(
    template: &Region,
    workers: usize,
    image: &Arc<RenderImage>,
    collector: &SegmentCollector,
) -> Result<Vec<Segment>, RegionError> {
    let regions = strip_regions(template, workers)?;

    Ok(regions
        .into_iter()
        .enumerate()
        .map(|(slot, region)| {
            Segment::new(
                region,
                Arc::downgrade(image),
                slot,
                collector.take_recycled(slot),
            )
        })
        .collect())
}

/// Runs one worker per segment and returns once every worker has stopped.
///
/// Segment `i` goes to worker slot `i`. A worker panic is re-raised on the
/// calling thread after the remaining workers have stopped.
pub fn run_pass<K, F>(
    resources: &PassResources,
    segments: Vec<Segment>,
    make_kernel: F,
) -> io::Result<()>
where
    K: RowKernel + 'static,
    F: Fn() -> K,
{
    let workers = segments.len();

    if workers == 0 {
        return Ok(());
    }

    if workers > MAX_NUM_WORKER_THREADS
        || workers > resources.barrier.capacity()
        || workers > resources.pause.slots()
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{workers} segments exceed the worker slots of this pass"),
        ));
    }

    resources.mediator.reset(workers);
    resources.barrier.drain(workers);

    let mut handles = Vec::with_capacity(workers);
    let mut spawn_error = None;
    let mut segments = segments.into_iter().enumerate();

    for (slot, segment) in segments.by_ref() {
        match Worker::spawn(slot, make_kernel(), segment, resources.clone()) {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                // The failed closure already gave back its barrier unit.
                resources.mediator.segment_finished();
                resources.mediator.mark_done(slot);
                spawn_error = Some(err);
                break;
            }
        }
    }

    for (slot, _) in segments {
        resources.barrier.release();
        resources.mediator.segment_finished();
        resources.mediator.mark_done(slot);
    }

    resources.barrier.wait_full();

    for handle in handles {
        if let Err(payload) = handle.join() {
            panic::resume_unwind(payload);
        }
    }

    spawn_error.map_or(Ok(()), Err)
}

/// Runs a pass of the escape-time kernel computed in `numeric_type`.
pub fn run_numeric_pass(
    numeric_type: NumericType,
    resources: &PassResources,
    segments: Vec<Segment>,
    plan: &KernelPlan,
) -> io::Result<()> {
    debug!(
        "pass {} starting, {} workers, numeric type {}",
        plan.pass,
        segments.len(),
        numeric_type.short_name()
    );

    match numeric_type {
        NumericType::SinglePrecisionFloat => run_typed::<f32>(resources, segments, plan),
        NumericType::DoublePrecisionFloat => run_typed::<f64>(resources, segments, plan),
        NumericType::CustomFloat20 => run_typed::<CustomFloat20>(resources, segments, plan),
        NumericType::Decimal20 => run_typed::<Decimal20>(resources, segments, plan),
        NumericType::Decimal30 => run_typed::<Decimal30>(resources, segments, plan),
        NumericType::Decimal50 => run_typed::<Decimal50>(resources, segments, plan),
        NumericType::Float80 => run_typed::<Float80>(resources, segments, plan),
        NumericType::Float128 => run_typed::<Float128>(resources, segments, plan),
        NumericType::Int32 => run_typed::<i32>(resources, segments, plan),
        NumericType::Int64 => run_typed::<i64>(resources, segments, plan),
        NumericType::Int128 => run_typed::<i128>(resources, segments, plan),
    }
}

fn run_typed<T: KernelNumber>(
    resources: &PassResources,
    segments: Vec<Segment>,
    plan: &KernelPlan,
) -> io::Result<()> {
    let task = ComputeTask::<T>::new(
        &plan.template,
        &plan.set,
        plan.pass,
        Arc::clone(&plan.colour_map),
    );

    run_pass(resources, segments, || task.clone())
}
